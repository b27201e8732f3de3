//! Features page: mean-feature scatter for one day, plus two per-country
//! smoothed time series driven by clicks on the scatter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    BindingResult, ControlEvent, InputId, OutputBinding, OutputId, OutputPayload, ReactivePage,
    RenderContext, Selection,
};
use crate::charts::{feature_scatter, feature_time_series, AxisScale};
use crate::db::ChartRepository;
use crate::models::Feature;
use crate::routes::PageId;
use crate::services::features::validate_window;
use crate::services::{feature_series, mean_features_by_country_date, AnalysisError, AnalysisResult};

/// Country whose series are shown before any click.
pub const DEFAULT_CLICKED_COUNTRY: &str = "Japan";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesControls {
    pub x_column: Feature,
    pub y_column: Feature,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub date: Option<NaiveDate>,
    pub window: usize,
    /// Country last clicked on the scatter.
    pub country: String,
}

const BINDINGS: &[OutputBinding] = &[
    OutputBinding {
        output: OutputId::FeatureScatter,
        inputs: &[
            InputId::XColumn,
            InputId::YColumn,
            InputId::XScale,
            InputId::YScale,
            InputId::Date,
        ],
    },
    OutputBinding {
        output: OutputId::XTimeSeries,
        inputs: &[InputId::ChartClick, InputId::XColumn, InputId::XScale, InputId::Window],
    },
    OutputBinding {
        output: OutputId::YTimeSeries,
        inputs: &[InputId::ChartClick, InputId::YColumn, InputId::YScale, InputId::Window],
    },
];

#[derive(Debug, Default, Clone, Copy)]
pub struct FeaturesPage;

impl ReactivePage for FeaturesPage {
    type Controls = FeaturesControls;

    fn page(&self) -> PageId {
        PageId::Features
    }

    fn bindings(&self) -> &'static [OutputBinding] {
        BINDINGS
    }

    fn defaults(&self, repository: &dyn ChartRepository) -> FeaturesControls {
        FeaturesControls {
            x_column: Feature::Danceability,
            y_column: Feature::Liveness,
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
            date: repository.date_span().map(|(start, _)| start),
            window: 1,
            country: DEFAULT_CLICKED_COUNTRY.to_string(),
        }
    }

    fn apply(&self, controls: &mut FeaturesControls, event: &ControlEvent) -> BindingResult<Option<InputId>> {
        let input = match event {
            ControlEvent::Initial => return Ok(None),
            ControlEvent::DateChanged { start, .. } => {
                controls.date = *start;
                InputId::Date
            }
            ControlEvent::SelectionChanged(selection) => match selection {
                Selection::XColumn(f) => {
                    controls.x_column = *f;
                    InputId::XColumn
                }
                Selection::YColumn(f) => {
                    controls.y_column = *f;
                    InputId::YColumn
                }
                Selection::XScale(s) => {
                    controls.x_scale = *s;
                    InputId::XScale
                }
                Selection::YScale(s) => {
                    controls.y_scale = *s;
                    InputId::YScale
                }
                Selection::Window(w) => {
                    controls.window = *w;
                    InputId::Window
                }
                _ => return Err(self.unsupported(event)),
            },
            ControlEvent::ChartClicked(point) => {
                // Clicks off a labelled point keep the current country
                if let Some(country) = point.hovertext.as_deref().filter(|c| !c.is_empty()) {
                    controls.country = country.to_string();
                }
                InputId::ChartClick
            }
            other => return Err(self.unsupported(other)),
        };
        Ok(Some(input))
    }

    fn validate(&self, controls: &FeaturesControls) -> AnalysisResult<()> {
        for feature in [controls.x_column, controls.y_column] {
            if !feature.is_offered() {
                return Err(AnalysisError::invalid(format!("Feature '{}' is not offered", feature)));
            }
        }
        validate_window(controls.window)?;
        Ok(())
    }

    fn render(
        &self,
        output: OutputId,
        _input: Option<InputId>,
        controls: &FeaturesControls,
        ctx: &RenderContext<'_>,
    ) -> AnalysisResult<Option<OutputPayload>> {
        let figure = match output {
            OutputId::FeatureScatter => {
                // A cleared picker shows the latest chart day
                let day = controls
                    .date
                    .or_else(|| ctx.repository.date_span().map(|(_, last)| last));
                let means = mean_features_by_country_date(ctx.snapshot.rows(), day);
                feature_scatter(
                    &means,
                    controls.x_column,
                    controls.y_column,
                    controls.x_scale,
                    controls.y_scale,
                )
            }
            OutputId::XTimeSeries | OutputId::YTimeSeries => {
                let (feature, scale) = if output == OutputId::XTimeSeries {
                    (controls.x_column, controls.x_scale)
                } else {
                    (controls.y_column, controls.y_scale)
                };
                let series = feature_series(ctx.snapshot.rows(), &controls.country, feature, controls.window)?;
                feature_time_series(&series, &controls.country, feature, scale)
            }
            _ => return Ok(None),
        };
        Ok(Some(OutputPayload::Figure { figure }))
    }
}

//! Ranking page: daily rank lines of the best sustained tracks, and the
//! chart of one day picked by clicking a line.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    control_range, BindingError, BindingResult, ControlEvent, InputId, OutputBinding, OutputId,
    OutputPayload, ReactivePage, RenderContext, Selection,
};
use crate::charts::ranking_lines;
use crate::db::ChartRepository;
use crate::routes::PageId;
use crate::services::ranking::DISPLAY_DATE_FORMAT;
use crate::services::{
    filter_rows, rank_table, top_sustained_tracks, AnalysisResult, CountrySelector, FilterParams, GLOBAL_CHART,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingControls {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub country: String,
    /// Day picked on the rank chart; the table falls back to `start_date`.
    pub clicked_date: Option<NaiveDate>,
}

const BINDINGS: &[OutputBinding] = &[
    OutputBinding {
        output: OutputId::RankChart,
        inputs: &[InputId::DateRange, InputId::Country],
    },
    OutputBinding {
        output: OutputId::RankTable,
        inputs: &[InputId::DateRange, InputId::Country, InputId::ChartClick],
    },
];

/// Title of the one-day chart table.
pub fn rank_table_title(country: &str, date: NaiveDate) -> String {
    format!("Top Songs in {} {}", country, date.format(DISPLAY_DATE_FORMAT))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RankingPage;

impl ReactivePage for RankingPage {
    type Controls = RankingControls;

    fn page(&self) -> PageId {
        PageId::Ranking
    }

    fn bindings(&self) -> &'static [OutputBinding] {
        BINDINGS
    }

    fn defaults(&self, repository: &dyn ChartRepository) -> RankingControls {
        let span = repository.date_span();
        let options = repository.ranking_options();
        let country = if options.iter().any(|o| o.value == GLOBAL_CHART) {
            GLOBAL_CHART.to_string()
        } else {
            options
                .into_iter()
                .next()
                .map(|o| o.value)
                .unwrap_or_else(|| GLOBAL_CHART.to_string())
        };
        RankingControls {
            start_date: span.map(|(start, _)| start),
            end_date: span.map(|(_, end)| end),
            country,
            clicked_date: None,
        }
    }

    fn apply(&self, controls: &mut RankingControls, event: &ControlEvent) -> BindingResult<Option<InputId>> {
        let input = match event {
            ControlEvent::Initial => return Ok(None),
            ControlEvent::DateChanged { start, end } => {
                if start.is_some() {
                    controls.start_date = *start;
                }
                if end.is_some() {
                    controls.end_date = *end;
                }
                InputId::DateRange
            }
            ControlEvent::SelectionChanged(Selection::Country(country)) => {
                controls.country = country.clone();
                InputId::Country
            }
            ControlEvent::ChartClicked(point) => {
                let day = point
                    .x_date()
                    .ok_or_else(|| BindingError::InvalidControls("clicked point carries no date".to_string()))?;
                controls.clicked_date = Some(day);
                InputId::ChartClick
            }
            other => return Err(self.unsupported(other)),
        };
        Ok(Some(input))
    }

    fn render(
        &self,
        output: OutputId,
        _input: Option<InputId>,
        controls: &RankingControls,
        ctx: &RenderContext<'_>,
    ) -> AnalysisResult<Option<OutputPayload>> {
        match output {
            OutputId::RankChart => {
                let range = control_range(controls.start_date, controls.end_date);
                let params = FilterParams::new(Some(range), CountrySelector::one(controls.country.as_str()));
                let set = filter_rows(ctx.snapshot.rows(), &params);
                let series = top_sustained_tracks(set.iter())?;
                Ok(Some(OutputPayload::Figure {
                    figure: ranking_lines(&series, &controls.country),
                }))
            }
            OutputId::RankTable => {
                let Some(day) = controls.clicked_date.or(controls.start_date) else {
                    return Ok(Some(OutputPayload::empty_for(output)));
                };
                Ok(Some(OutputPayload::Table {
                    title: rank_table_title(&controls.country, day),
                    records: rank_table(ctx.snapshot.rows(), &controls.country, day),
                }))
            }
            _ => Ok(None),
        }
    }
}

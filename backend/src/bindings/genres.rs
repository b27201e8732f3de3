//! Genres page: genre-space facets per selected country or playlist, the
//! drill-down table, and playlist submission.
//!
//! The facet figure, the country options and the warning modal are driven by
//! one combined handler, since a playlist submission and a selection change
//! both rewrite the options the multi-select offers.

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    control_range, parse_controls, recompute, BindingError, BindingResult, ChartPoint, ControlEvent,
    Dashboard, InputId, OutputBinding, OutputId, OutputPayload, PageUpdate, ReactivePage,
    RenderContext, Selection,
};
use crate::charts::{genre_facets, FACET_WRAP};
use crate::db::ChartRepository;
use crate::models::{split_list, DropdownOption};
use crate::routes::PageId;
use crate::services::{
    genre_counts_by_country, genre_table, AnalysisError, AnalysisResult, GenreTableQuery, GLOBAL_CHART,
};

/// Countries preselected on first load, when present in the dataset.
pub const DEFAULT_COUNTRIES: [&str; 3] = ["Global", "Brazil", "Iceland"];

/// Allowed multipliers of the largest marker size.
pub const SCALING_FACTORS: std::ops::RangeInclusive<u8> = 1..=4;

/// Text of the modal raised when the selection is emptied.
pub const NO_COUNTRY_WARNING: &str = "You must select at least one country.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenresControls {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Selected countries and playlist labels, in selection order.
    pub countries: Vec<String>,
    pub scaling_factor: u8,
    /// Options currently offered by the multi-select.
    pub options: Vec<DropdownOption>,
    /// Last clicked genre point.
    pub clicked: ChartPoint,
    /// Last box selection; empty when cleared.
    pub selected: Vec<ChartPoint>,
}

const BINDINGS: &[OutputBinding] = &[
    OutputBinding {
        output: OutputId::GenreSpace,
        inputs: &[
            InputId::DateRange,
            InputId::Countries,
            InputId::ScalingFactor,
            InputId::Submit,
            InputId::Dismiss,
        ],
    },
    OutputBinding {
        output: OutputId::GenreTable,
        inputs: &[InputId::DateRange, InputId::ChartClick, InputId::ChartSelection],
    },
];

#[derive(Debug, Default, Clone, Copy)]
pub struct GenresPage;

impl GenresPage {
    /// Combined handler: modal, submission and option bookkeeping first,
    /// then the regular recompute for whatever still needs rendering.
    pub async fn handle(
        &self,
        dashboard: &Dashboard,
        controls: Option<Value>,
        event: ControlEvent,
    ) -> BindingResult<PageUpdate> {
        let repository = dashboard.repository();
        let mut state = parse_controls(self, repository.as_ref(), controls)?;
        let input = self.apply(&mut state, &event)?;

        let mut update = PageUpdate::default();
        match (input, &event) {
            (Some(InputId::Dismiss), _) => update.modal_open = Some(false),
            (
                Some(InputId::Submit),
                ControlEvent::SubmitClicked {
                    n_clicks,
                    label,
                    playlist_id,
                },
            ) => {
                if *n_clicks > 0 {
                    self.submit(dashboard, &mut state, label, playlist_id, &mut update)
                        .await;
                }
            }
            _ => {
                self.validate(&state)?;
                let mut skip = Vec::new();
                if BINDINGS[0].is_triggered_by(input) {
                    if state.countries.is_empty() {
                        update.modal_open = Some(true);
                        update.warnings.push(NO_COUNTRY_WARNING.to_string());
                        skip.push(OutputId::GenreSpace);
                    } else {
                        reconcile_options(repository.as_ref(), &mut state);
                    }
                }
                recompute(self, dashboard, &state, input, &skip, &mut update)?;
            }
        }

        update.controls =
            serde_json::to_value(&state).map_err(|e| BindingError::InvalidControls(e.to_string()))?;
        debug!(
            "genres {} -> {:?}",
            event.name(),
            update.outputs.keys().map(OutputId::as_str).collect::<Vec<_>>()
        );
        Ok(update)
    }

    /// Resolve and append a playlist. Every failure leaves the dataset and
    /// the options untouched and is reported as a warning.
    async fn submit(
        &self,
        dashboard: &Dashboard,
        state: &mut GenresControls,
        label: &str,
        playlist_id: &str,
        update: &mut PageUpdate,
    ) {
        let label = label.trim();
        let playlist_id = playlist_id.trim();
        if label.is_empty() || playlist_id.is_empty() {
            update
                .warnings
                .push("Both a playlist name and a playlist id are required.".to_string());
            return;
        }

        let offered = state
            .options
            .iter()
            .any(|o| o.label == label || o.value == playlist_id);
        if offered || dashboard.repository().has_label(label) {
            info!("Playlist '{}' is already loaded, ignoring submission", label);
            update.warnings.push(format!("'{}' is already loaded.", label));
            return;
        }

        let rows = match dashboard.resolver().resolve(playlist_id, label).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Failed to resolve playlist {}: {}", playlist_id, e);
                update
                    .warnings
                    .push(format!("Could not load playlist '{}': {}", label, e));
                return;
            }
        };

        match dashboard.repository().append_playlist(label, rows) {
            Ok(snapshot) => {
                debug!("Dataset now at overlay version {}", snapshot.version());
                if state.countries.len() < FACET_WRAP {
                    state.options.push(DropdownOption::named(label));
                }
            }
            Err(e) => {
                warn!("Failed to append playlist '{}': {}", label, e);
                update.warnings.push(e.to_string());
            }
        }
    }
}

/// Cap the selection at [`FACET_WRAP`] entries; at the cap the options
/// shrink to the selection, below it the full list comes back.
fn reconcile_options(repository: &dyn ChartRepository, state: &mut GenresControls) {
    if state.countries.len() >= FACET_WRAP {
        state.countries.truncate(FACET_WRAP);
        state.options = state
            .countries
            .iter()
            .map(|c| DropdownOption::named(c.as_str()))
            .collect();
    } else if state.options.len() == FACET_WRAP {
        state.options = repository.country_options();
    }
}

/// Table query for a box selection, `None` when nothing usable was selected.
pub fn selection_query(points: &[ChartPoint]) -> Option<GenreTableQuery> {
    let mut genres: Vec<String> = Vec::new();
    let mut countries: Vec<String> = Vec::new();
    for point in points {
        if let Some(text) = point.hovertext.as_deref() {
            for genre in split_list(text) {
                if !genres.iter().any(|g| g == genre) {
                    genres.push(genre.to_string());
                }
            }
        }
        if let Some(country) = point.country_label() {
            if !countries.iter().any(|c| c == country) {
                countries.push(country.to_string());
            }
        }
    }
    if genres.is_empty() || countries.is_empty() {
        return None;
    }
    Some(GenreTableQuery::Selection { genres, countries })
}

/// Table query for a click: a genre point narrows to that genre, anything
/// else shows the whole country.
pub fn click_query(point: &ChartPoint) -> GenreTableQuery {
    let country = point.country_label().unwrap_or(GLOBAL_CHART).to_string();
    match point.hovertext.as_deref().filter(|g| !g.is_empty()) {
        Some(genre) => GenreTableQuery::Genre {
            genre: genre.to_string(),
            country,
        },
        None => GenreTableQuery::Country(country),
    }
}

impl ReactivePage for GenresPage {
    type Controls = GenresControls;

    fn page(&self) -> PageId {
        PageId::Genres
    }

    fn bindings(&self) -> &'static [OutputBinding] {
        BINDINGS
    }

    fn defaults(&self, repository: &dyn ChartRepository) -> GenresControls {
        let span = repository.date_span();
        let options = repository.country_options();
        let mut countries: Vec<String> = DEFAULT_COUNTRIES
            .iter()
            .filter(|c| options.iter().any(|o| o.value == **c))
            .map(|c| c.to_string())
            .collect();
        if countries.is_empty() {
            countries.extend(options.first().map(|o| o.value.clone()));
        }
        GenresControls {
            start_date: span.map(|(start, _)| start),
            end_date: span.map(|(_, end)| end),
            countries,
            scaling_factor: *SCALING_FACTORS.start(),
            options,
            clicked: ChartPoint::country(GLOBAL_CHART),
            selected: Vec::new(),
        }
    }

    fn apply(&self, controls: &mut GenresControls, event: &ControlEvent) -> BindingResult<Option<InputId>> {
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
            ControlEvent::SelectionChanged(Selection::Countries(countries)) => {
                controls.countries = countries.clone();
                InputId::Countries
            }
            ControlEvent::SelectionChanged(Selection::ScalingFactor(factor)) => {
                controls.scaling_factor = *factor;
                InputId::ScalingFactor
            }
            ControlEvent::SubmitClicked { .. } => InputId::Submit,
            ControlEvent::DismissClicked => InputId::Dismiss,
            ControlEvent::ChartClicked(point) => {
                controls.clicked = point.clone();
                InputId::ChartClick
            }
            ControlEvent::ChartSelected { points } => {
                controls.selected = points.clone();
                InputId::ChartSelection
            }
            other => return Err(self.unsupported(other)),
        };
        Ok(Some(input))
    }

    fn validate(&self, controls: &GenresControls) -> AnalysisResult<()> {
        if !SCALING_FACTORS.contains(&controls.scaling_factor) {
            return Err(AnalysisError::invalid(format!(
                "Scaling factor must be between {} and {}, got {}",
                SCALING_FACTORS.start(),
                SCALING_FACTORS.end(),
                controls.scaling_factor
            )));
        }
        Ok(())
    }

    // The facet figure depends on the dataset overlay as much as on the
    // controls; it is always rebuilt.
    fn memoize(&self, output: OutputId) -> bool {
        output != OutputId::GenreSpace
    }

    fn render(
        &self,
        output: OutputId,
        input: Option<InputId>,
        controls: &GenresControls,
        ctx: &RenderContext<'_>,
    ) -> AnalysisResult<Option<OutputPayload>> {
        let range = control_range(controls.start_date, controls.end_date);
        match output {
            OutputId::GenreSpace => {
                let space = ctx.repository.genre_space();
                let counts = genre_counts_by_country(ctx.snapshot.rows(), range, &controls.countries, &space);
                Ok(Some(OutputPayload::Figure {
                    figure: genre_facets(&counts, &controls.countries, space.boundary(), controls.scaling_factor),
                }))
            }
            OutputId::GenreTable => {
                let query = match input {
                    Some(InputId::ChartSelection) => match selection_query(&controls.selected) {
                        Some(query) => query,
                        None => return Ok(None),
                    },
                    Some(InputId::ChartClick) => click_query(&controls.clicked),
                    _ => GenreTableQuery::Country(
                        controls.clicked.country_label().unwrap_or(GLOBAL_CHART).to_string(),
                    ),
                };
                let table = genre_table(ctx.snapshot.rows(), range, &query);
                Ok(Some(OutputPayload::Table {
                    title: table.title,
                    records: table.records,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "genres_tests.rs"]
mod genres_tests;

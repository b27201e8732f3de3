//! Reactive binding layer.
//!
//! Each page declares which outputs depend on which controls. A request
//! carries the page's current control state plus one tagged [`ControlEvent`];
//! the event is folded into the state, and exactly the outputs whose inputs
//! include the fired control are recomputed from scratch:
//!
//! ```text
//! ControlEvent ──► apply() ──► InputId ──► affected OutputBindings
//!                                               │
//!                 DatasetSnapshot ◄─────────────┤ filter → aggregate → build
//!                                               ▼
//!                                          PageUpdate
//! ```
//!
//! Outputs missing from a [`PageUpdate`] are "no update": the front end keeps
//! whatever it rendered before.

pub mod artists;
pub mod event;
pub mod features;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod genres;
pub mod home;
pub mod memo;
pub mod ranking;

pub use artists::ArtistsPage;
pub use event::{ChartPoint, ControlEvent, Selection};
pub use features::FeaturesPage;
pub use genres::GenresPage;
pub use home::HomePage;
pub use memo::MemoCache;
pub use ranking::RankingPage;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::charts::Figure;
use crate::db::{ChartRepository, DatasetSnapshot, RepositoryError};
use crate::playlist::PlaylistResolver;
use crate::routes::PageId;
use crate::services::{AnalysisError, AnalysisResult, DateRange, TableRecord};

/// Control identifiers that can trigger a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputId {
    DateRange,
    Date,
    Countries,
    Country,
    XColumn,
    YColumn,
    XScale,
    YScale,
    Window,
    ScalingFactor,
    Submit,
    Dismiss,
    ChartClick,
    ChartSelection,
}

impl InputId {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputId::DateRange => "date_range",
            InputId::Date => "date",
            InputId::Countries => "countries",
            InputId::Country => "country",
            InputId::XColumn => "x_column",
            InputId::YColumn => "y_column",
            InputId::XScale => "x_scale",
            InputId::YScale => "y_scale",
            InputId::Window => "window",
            InputId::ScalingFactor => "scaling_factor",
            InputId::Submit => "submit",
            InputId::Dismiss => "dismiss",
            InputId::ChartClick => "chart_click",
            InputId::ChartSelection => "chart_selection",
        }
    }
}

/// Output slots across all pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputId {
    Overview,
    WorldMap,
    FeatureScatter,
    XTimeSeries,
    YTimeSeries,
    GenreSpace,
    GenreTable,
    RankChart,
    RankTable,
}

impl OutputId {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputId::Overview => "overview",
            OutputId::WorldMap => "world_map",
            OutputId::FeatureScatter => "feature_scatter",
            OutputId::XTimeSeries => "x_time_series",
            OutputId::YTimeSeries => "y_time_series",
            OutputId::GenreSpace => "genre_space",
            OutputId::GenreTable => "genre_table",
            OutputId::RankChart => "rank_chart",
            OutputId::RankTable => "rank_table",
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, OutputId::GenreTable | OutputId::RankTable)
    }
}

/// One output and the full set of controls it is a function of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputBinding {
    pub output: OutputId,
    pub inputs: &'static [InputId],
}

impl OutputBinding {
    /// Whether `input` firing recomputes this output. `None` is page load.
    pub fn is_triggered_by(&self, input: Option<InputId>) -> bool {
        match input {
            None => true,
            Some(input) => self.inputs.contains(&input),
        }
    }
}

/// Rendered content of one output slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputPayload {
    Figure { figure: Figure },
    /// Precomputed chart description served verbatim.
    Static { figure: Value },
    Table {
        title: String,
        records: Vec<TableRecord>,
    },
}

impl OutputPayload {
    /// Empty chart or table for `output`.
    pub fn empty_for(output: OutputId) -> Self {
        if output.is_table() {
            OutputPayload::Table {
                title: String::new(),
                records: Vec::new(),
            }
        } else {
            OutputPayload::Figure {
                figure: Figure::default(),
            }
        }
    }

    pub fn figure(&self) -> Option<&Figure> {
        match self {
            OutputPayload::Figure { figure } => Some(figure),
            _ => None,
        }
    }
}

/// Response to one control event.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PageUpdate {
    /// Control state after the event, including any options the page changed.
    pub controls: Value,
    pub outputs: BTreeMap<OutputId, OutputPayload>,
    /// `None` leaves the warning modal as it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal_open: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl PageUpdate {
    pub fn output(&self, output: OutputId) -> Option<&OutputPayload> {
        self.outputs.get(&output)
    }
}

/// Error type for binding dispatch
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Invalid controls: {0}")]
    InvalidControls(String),

    #[error("Event '{event}' is not handled by the {page} page")]
    UnsupportedEvent { page: PageId, event: &'static str },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type BindingResult<T> = Result<T, BindingError>;

/// What a page's renderers may read.
pub struct RenderContext<'a> {
    pub snapshot: &'a DatasetSnapshot,
    pub repository: &'a dyn ChartRepository,
}

/// A page whose outputs are pure functions of its control state.
pub trait ReactivePage: Send + Sync {
    type Controls: Serialize + DeserializeOwned + Send + Sync;

    fn page(&self) -> PageId;

    fn bindings(&self) -> &'static [OutputBinding];

    /// Control state on first load, seeded from the dataset.
    fn defaults(&self, repository: &dyn ChartRepository) -> Self::Controls;

    /// Fold `event` into `controls` and name the input that fired
    /// (`None` for page load).
    fn apply(&self, controls: &mut Self::Controls, event: &ControlEvent) -> BindingResult<Option<InputId>>;

    fn validate(&self, _controls: &Self::Controls) -> AnalysisResult<()> {
        Ok(())
    }

    fn memoize(&self, _output: OutputId) -> bool {
        true
    }

    /// Render one output. `Ok(None)` means no update for this event.
    fn render(
        &self,
        output: OutputId,
        input: Option<InputId>,
        controls: &Self::Controls,
        ctx: &RenderContext<'_>,
    ) -> AnalysisResult<Option<OutputPayload>>;

    fn unsupported(&self, event: &ControlEvent) -> BindingError {
        BindingError::UnsupportedEvent {
            page: self.page(),
            event: event.name(),
        }
    }
}

/// Inclusive range from optional picker values; a missing side is unbounded.
pub fn control_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateRange {
    DateRange::new(start.unwrap_or(NaiveDate::MIN), end.unwrap_or(NaiveDate::MAX))
}

/// Overlay the provided control values on the page defaults.
fn parse_controls<P: ReactivePage>(
    page: &P,
    repository: &dyn ChartRepository,
    provided: Option<Value>,
) -> BindingResult<P::Controls> {
    let mut merged = serde_json::to_value(page.defaults(repository))
        .map_err(|e| BindingError::InvalidControls(e.to_string()))?;
    match (provided, &mut merged) {
        (Some(Value::Object(provided)), Value::Object(base)) => {
            for (key, value) in provided {
                base.insert(key, value);
            }
        }
        (Some(Value::Null), _) | (None, _) => {}
        (Some(other), _) => {
            return Err(BindingError::InvalidControls(format!(
                "controls must be an object, got {}",
                other
            )))
        }
    }
    serde_json::from_value(merged).map_err(|e| BindingError::InvalidControls(e.to_string()))
}

/// Recompute every output of `page` triggered by `input`, except `skip`.
fn recompute<P: ReactivePage>(
    page: &P,
    dashboard: &Dashboard,
    controls: &P::Controls,
    input: Option<InputId>,
    skip: &[OutputId],
    update: &mut PageUpdate,
) -> BindingResult<()> {
    let snapshot = dashboard.repository.snapshot();
    let ctx = RenderContext {
        snapshot: &snapshot,
        repository: dashboard.repository.as_ref(),
    };
    let controls_json =
        serde_json::to_value(controls).map_err(|e| BindingError::InvalidControls(e.to_string()))?;

    for binding in page.bindings() {
        if !binding.is_triggered_by(input) || skip.contains(&binding.output) {
            continue;
        }
        let output = binding.output;
        let key = page
            .memoize(output)
            .then(|| MemoCache::key(page.page(), output, input, &controls_json, snapshot.version()));

        if let Some(hit) = key.as_deref().and_then(|k| dashboard.memo.get(k)) {
            update.outputs.insert(output, hit);
            continue;
        }

        match page.render(output, input, controls, &ctx) {
            Ok(Some(payload)) => {
                if let Some(key) = key {
                    dashboard.memo.insert(key, payload.clone());
                }
                update.outputs.insert(output, payload);
            }
            Ok(None) => {}
            Err(err @ AnalysisError::InsufficientData { .. }) => {
                warn!("{} {}: {}", page.page(), output.as_str(), err);
                update.warnings.push(err.to_string());
                update.outputs.insert(output, OutputPayload::empty_for(output));
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Generic event handling for pages without side effects.
fn dispatch<P: ReactivePage>(
    page: &P,
    dashboard: &Dashboard,
    controls: Option<Value>,
    event: &ControlEvent,
) -> BindingResult<PageUpdate> {
    let mut state = parse_controls(page, dashboard.repository.as_ref(), controls)?;
    let input = page.apply(&mut state, event)?;
    page.validate(&state)?;

    let mut update = PageUpdate::default();
    recompute(page, dashboard, &state, input, &[], &mut update)?;
    update.controls =
        serde_json::to_value(&state).map_err(|e| BindingError::InvalidControls(e.to_string()))?;

    debug!(
        "{} {} -> {:?}",
        page.page(),
        event.name(),
        update.outputs.keys().map(OutputId::as_str).collect::<Vec<_>>()
    );
    Ok(update)
}

/// Entry point of the binding layer: the dataset store, the playlist
/// resolver and the memo cache shared by every page.
pub struct Dashboard {
    repository: Arc<dyn ChartRepository>,
    resolver: Arc<dyn PlaylistResolver>,
    memo: MemoCache,
}

impl Dashboard {
    pub fn new(
        repository: Arc<dyn ChartRepository>,
        resolver: Arc<dyn PlaylistResolver>,
        memo: MemoCache,
    ) -> Self {
        Self {
            repository,
            resolver,
            memo,
        }
    }

    pub fn repository(&self) -> &Arc<dyn ChartRepository> {
        &self.repository
    }

    pub fn resolver(&self) -> &Arc<dyn PlaylistResolver> {
        &self.resolver
    }

    pub fn memo(&self) -> &MemoCache {
        &self.memo
    }

    /// Initial control state of `page`.
    pub fn default_controls(&self, page: PageId) -> BindingResult<Value> {
        let repo = self.repository.as_ref();
        let value = match page {
            PageId::Home => serde_json::to_value(HomePage.defaults(repo)),
            PageId::Artists => serde_json::to_value(ArtistsPage.defaults(repo)),
            PageId::Features => serde_json::to_value(FeaturesPage.defaults(repo)),
            PageId::Genres => serde_json::to_value(GenresPage.defaults(repo)),
            PageId::Ranking => serde_json::to_value(RankingPage.defaults(repo)),
        };
        value.map_err(|e| BindingError::InvalidControls(e.to_string()))
    }

    /// Output bindings declared by `page`.
    pub fn bindings(&self, page: PageId) -> &'static [OutputBinding] {
        match page {
            PageId::Home => HomePage.bindings(),
            PageId::Artists => ArtistsPage.bindings(),
            PageId::Features => FeaturesPage.bindings(),
            PageId::Genres => GenresPage.bindings(),
            PageId::Ranking => RankingPage.bindings(),
        }
    }

    /// Handle one control event on `page`. Missing control values take
    /// their defaults.
    pub async fn handle(
        &self,
        page: PageId,
        controls: Option<Value>,
        event: ControlEvent,
    ) -> BindingResult<PageUpdate> {
        match page {
            PageId::Home => dispatch(&HomePage, self, controls, &event),
            PageId::Artists => dispatch(&ArtistsPage, self, controls, &event),
            PageId::Features => dispatch(&FeaturesPage, self, controls, &event),
            PageId::Ranking => dispatch(&RankingPage, self, controls, &event),
            PageId::Genres => GenresPage.handle(self, controls, event).await,
        }
    }
}

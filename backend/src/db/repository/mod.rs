//! Dataset store abstraction.
//!
//! The chart history is an immutable base snapshot loaded once at startup plus
//! an append-only overlay of playlist rows. Readers take a [`DatasetSnapshot`]
//! and pass it explicitly through the filter and aggregation calls; appends
//! never alter a snapshot that has already been handed out.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{ChartRow, DropdownOption, GenreSpace};

/// Point-in-time view of the dataset: base rows followed by overlay rows.
#[derive(Debug, Clone, Default)]
pub struct DatasetSnapshot {
    base: Arc<Vec<ChartRow>>,
    overlay: Arc<Vec<ChartRow>>,
    version: u64,
}

impl DatasetSnapshot {
    pub fn new(base: Arc<Vec<ChartRow>>, overlay: Arc<Vec<ChartRow>>, version: u64) -> Self {
        Self {
            base,
            overlay,
            version,
        }
    }

    /// Snapshot over owned rows with an empty overlay.
    pub fn from_rows(rows: Vec<ChartRow>) -> Self {
        Self::new(Arc::new(rows), Arc::new(Vec::new()), 0)
    }

    /// Iterate base rows, then overlay rows.
    pub fn rows(&self) -> impl Iterator<Item = &ChartRow> + Clone {
        self.base.iter().chain(self.overlay.iter())
    }

    pub fn base(&self) -> &[ChartRow] {
        &self.base
    }

    pub fn overlay(&self) -> &[ChartRow] {
        &self.overlay
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.overlay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotonic counter, bumped on every overlay append.
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Row and label counts reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub base_rows: usize,
    pub overlay_rows: usize,
    pub countries: usize,
    pub playlists: Vec<String>,
    pub genres: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub version: u64,
}

/// Process-wide dataset store.
///
/// Implementations must be safe to share across request handlers. The only
/// mutation is [`ChartRepository::append_playlist`].
pub trait ChartRepository: Send + Sync {
    /// Current snapshot of chart rows.
    fn snapshot(&self) -> DatasetSnapshot;

    /// Genre reference table and boundary curve.
    fn genre_space(&self) -> Arc<GenreSpace>;

    /// Static overview figure served on the home page.
    fn overview_figure(&self) -> Arc<serde_json::Value>;

    /// Options for the genre page's country selector: base countries in
    /// first-seen order, then accepted playlist labels.
    fn country_options(&self) -> Vec<DropdownOption>;

    /// Options for the ranking page's country selector (base countries only).
    fn ranking_options(&self) -> Vec<DropdownOption>;

    /// Whether `label` already names a country or an accepted playlist.
    fn has_label(&self, label: &str) -> bool;

    /// Append resolved playlist rows under `label`.
    ///
    /// Fails without mutating anything when the label is already taken or the
    /// row set is empty. Returns the snapshot that includes the new rows.
    fn append_playlist(&self, label: &str, rows: Vec<ChartRow>) -> RepositoryResult<DatasetSnapshot>;

    /// Earliest and latest snapshot dates of the dated rows.
    fn date_span(&self) -> Option<(NaiveDate, NaiveDate)>;

    fn summary(&self) -> DatasetSummary;
}

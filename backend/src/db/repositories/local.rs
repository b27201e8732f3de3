//! In-memory dataset store.

use chrono::NaiveDate;
use log::info;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::repository::{
    ChartRepository, DatasetSnapshot, DatasetSummary, ErrorContext, RepositoryError,
    RepositoryResult,
};
use crate::models::{ChartRow, DropdownOption, GenreSpace};

#[derive(Debug, Default)]
struct Overlay {
    rows: Arc<Vec<ChartRow>>,
    labels: Vec<String>,
    version: u64,
}

/// Immutable base rows plus a copy-on-write overlay of playlist rows.
pub struct LocalRepository {
    base: Arc<Vec<ChartRow>>,
    base_countries: Vec<String>,
    date_span: Option<(NaiveDate, NaiveDate)>,
    genre_space: Arc<GenreSpace>,
    overview: Arc<serde_json::Value>,
    overlay: RwLock<Overlay>,
}

impl LocalRepository {
    pub fn new(rows: Vec<ChartRow>, genre_space: GenreSpace, overview: serde_json::Value) -> Self {
        let mut seen = HashSet::new();
        let base_countries: Vec<String> = rows
            .iter()
            .filter(|r| !r.is_undated())
            .filter(|r| seen.insert(r.country_name.as_str()))
            .map(|r| r.country_name.clone())
            .collect();

        let date_span = rows
            .iter()
            .filter_map(|r| r.snapshot_date)
            .fold(None, |span: Option<(NaiveDate, NaiveDate)>, d| match span {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            });

        Self {
            base: Arc::new(rows),
            base_countries,
            date_span,
            genre_space: Arc::new(genre_space),
            overview: Arc::new(overview),
            overlay: RwLock::new(Overlay::default()),
        }
    }

    /// Repository over chart rows only, with no genre reference data.
    pub fn from_rows(rows: Vec<ChartRow>) -> Self {
        Self::new(rows, GenreSpace::default(), serde_json::Value::Null)
    }
}

impl ChartRepository for LocalRepository {
    fn snapshot(&self) -> DatasetSnapshot {
        let overlay = self.overlay.read();
        DatasetSnapshot::new(Arc::clone(&self.base), Arc::clone(&overlay.rows), overlay.version)
    }

    fn genre_space(&self) -> Arc<GenreSpace> {
        Arc::clone(&self.genre_space)
    }

    fn overview_figure(&self) -> Arc<serde_json::Value> {
        Arc::clone(&self.overview)
    }

    fn country_options(&self) -> Vec<DropdownOption> {
        let overlay = self.overlay.read();
        self.base_countries
            .iter()
            .chain(overlay.labels.iter())
            .map(|name| DropdownOption::named(name.as_str()))
            .collect()
    }

    fn ranking_options(&self) -> Vec<DropdownOption> {
        self.base_countries
            .iter()
            .map(|name| DropdownOption::named(name.as_str()))
            .collect()
    }

    fn has_label(&self, label: &str) -> bool {
        self.base_countries.iter().any(|c| c == label)
            || self.overlay.read().labels.iter().any(|l| l == label)
    }

    fn append_playlist(&self, label: &str, rows: Vec<ChartRow>) -> RepositoryResult<DatasetSnapshot> {
        let context = || {
            ErrorContext::new("append_playlist")
                .with_entity("playlist")
                .with_entity_id(label)
        };

        if label.trim().is_empty() {
            return Err(RepositoryError::validation_with_context(
                "Playlist label must not be empty",
                context(),
            ));
        }
        if rows.is_empty() {
            return Err(RepositoryError::validation_with_context(
                "Playlist resolved to no tracks",
                context(),
            ));
        }

        // Check and append under one write lock so two submissions of the same
        // label cannot both succeed.
        let mut overlay = self.overlay.write();
        if self.base_countries.iter().any(|c| c == label) || overlay.labels.iter().any(|l| l == label) {
            return Err(RepositoryError::validation_with_context(
                format!("Label '{}' is already present", label),
                context(),
            ));
        }

        let added = rows.len();
        let mut next: Vec<ChartRow> = Vec::with_capacity(overlay.rows.len() + added);
        next.extend(overlay.rows.iter().cloned());
        next.extend(rows);
        overlay.rows = Arc::new(next);
        overlay.labels.push(label.to_string());
        overlay.version += 1;

        info!(
            "Appended playlist '{}' ({} rows, overlay version {})",
            label, added, overlay.version
        );

        Ok(DatasetSnapshot::new(
            Arc::clone(&self.base),
            Arc::clone(&overlay.rows),
            overlay.version,
        ))
    }

    fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_span
    }

    fn summary(&self) -> DatasetSummary {
        let overlay = self.overlay.read();
        DatasetSummary {
            base_rows: self.base.len(),
            overlay_rows: overlay.rows.len(),
            countries: self.base_countries.len(),
            playlists: overlay.labels.clone(),
            genres: self.genre_space.len(),
            first_date: self.date_span.map(|(lo, _)| lo),
            last_date: self.date_span.map(|(_, hi)| hi),
            version: overlay.version,
        }
    }
}

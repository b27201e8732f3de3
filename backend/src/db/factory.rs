//! Repository factory.
//!
//! Builds the process-wide dataset store from the configured data files.

use log::info;
use std::collections::HashSet;
use std::sync::Arc;

use super::loader::DatasetLoader;
use super::repositories::LocalRepository;
use super::repository::{ChartRepository, RepositoryResult};
use crate::charts::genre_overview;
use crate::config::DataSettings;
use crate::models::{ChartRow, GenreSpace};
use crate::services::genre_boundary;

/// Factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use top50_rust::config::DashboardConfig;
/// use top50_rust::db::RepositoryFactory;
///
/// let config = DashboardConfig::from_default_location()?;
/// let repo = RepositoryFactory::from_settings(&config.data)?;
/// println!("{} rows", repo.snapshot().len());
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Load every data file named by `settings` and build a [`LocalRepository`].
    ///
    /// The chart history and genre reference files are required. A missing
    /// boundary file falls back to the convex hull of the genre points; a
    /// missing overview file falls back to a figure built from the genre space.
    pub fn from_settings(settings: &DataSettings) -> RepositoryResult<Arc<dyn ChartRepository>> {
        let rows = DatasetLoader::load_chart_rows(&settings.chart_path())?;
        let points = DatasetLoader::load_genre_points(&settings.genre_path())?;

        let boundary = match DatasetLoader::load_boundary(&settings.boundary_path())? {
            Some(boundary) => boundary,
            None => {
                info!("Computing genre boundary from {} points", points.len());
                genre_boundary(&points)
            }
        };
        let space = GenreSpace::new(points, boundary);

        let overview = match DatasetLoader::load_overview(&settings.overview_path())? {
            Some(value) => value,
            None => genre_overview(&space).to_value(),
        };

        Ok(Self::create_local(rows, space, overview))
    }

    /// Wrap already-loaded data in a shared repository.
    pub fn create_local(
        rows: Vec<ChartRow>,
        space: GenreSpace,
        overview: serde_json::Value,
    ) -> Arc<dyn ChartRepository> {
        log_dataset(&rows, &space);
        Arc::new(LocalRepository::new(rows, space, overview))
    }

    /// Repository with an empty dataset, for tests and smoke runs.
    pub fn create_empty() -> Arc<dyn ChartRepository> {
        Arc::new(LocalRepository::from_rows(Vec::new()))
    }
}

fn log_dataset(rows: &[ChartRow], space: &GenreSpace) {
    let countries: HashSet<&str> = rows.iter().map(|r| r.country_name.as_str()).collect();
    let first = rows.iter().filter_map(|r| r.snapshot_date).min();
    let last = rows.iter().filter_map(|r| r.snapshot_date).max();
    match (first, last) {
        (Some(first), Some(last)) => info!(
            "Loaded {} chart rows across {} countries ({} to {}), {} genres",
            rows.len(),
            countries.len(),
            first,
            last,
            space.len()
        ),
        _ => info!(
            "Loaded {} chart rows with no dated snapshots, {} genres",
            rows.len(),
            space.len()
        ),
    }
}

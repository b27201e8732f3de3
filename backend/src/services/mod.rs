//! Filter and aggregation layer.
//!
//! Every function here is pure over the rows it is handed: callers take a
//! dataset snapshot, narrow it with [`filter::filter_rows`] and pass the
//! result to one of the aggregation recipes. Empty inputs yield empty outputs.

pub mod artists;
pub mod error;
pub mod features;
pub mod filter;
pub mod genres;
pub mod geometry;
pub mod ranking;

pub use artists::{top_artist_per_country, ArtistShare, GLOBAL_CHART};
pub use error::{AnalysisError, AnalysisResult};
pub use features::{feature_series, mean_features_by_country_date, rolling_mean, CountryFeatureMean, SeriesPoint};
pub use filter::{filter_rows, Column, CountrySelector, DateRange, DedupeKey, FilterParams, RowSet, TableRecord};
pub use genres::{genre_counts, genre_counts_by_country, genre_table, GenreCount, GenreTable, GenreTableQuery};
pub use geometry::{convex_hull, genre_boundary};
pub use ranking::{rank_table, top_sustained_tracks, RankPoint, TrackRankSeries};

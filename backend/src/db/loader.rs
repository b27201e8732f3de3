//! Flat-file loaders for the chart history and genre-space reference data.
//!
//! Every loader has a reader-based variant so tests can feed in-memory
//! content; the path-based variants attach the file name to load errors.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{split_list, AudioFeatures, BoundaryCurve, ChartRow, GenrePoint, CHART_SIZE};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw chart-history record as it appears in the CSV file.
#[derive(Debug, Deserialize)]
struct ChartRecord {
    spotify_id: String,
    track_name: String,
    #[serde(default)]
    artists: String,
    #[serde(default)]
    daily_rank: Option<u8>,
    #[serde(default)]
    daily_movement: Option<i32>,
    #[serde(default)]
    country: String,
    #[serde(default)]
    snapshot_date: String,
    #[serde(default)]
    album_release_date: String,
    #[serde(default)]
    danceability: Option<f64>,
    #[serde(default)]
    energy: Option<f64>,
    #[serde(default)]
    loudness: Option<f64>,
    #[serde(default)]
    speechiness: Option<f64>,
    #[serde(default)]
    acousticness: Option<f64>,
    #[serde(default)]
    instrumentalness: Option<f64>,
    #[serde(default)]
    liveness: Option<f64>,
    #[serde(default)]
    valence: Option<f64>,
    country_name: String,
    #[serde(default)]
    country_region: String,
    #[serde(default)]
    genres: String,
}

impl ChartRecord {
    fn into_row(self) -> Result<ChartRow, String> {
        let snapshot_date = parse_optional_date(&self.snapshot_date)?;

        let audio = match (
            self.danceability,
            self.energy,
            self.loudness,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.valence,
        ) {
            (
                Some(danceability),
                Some(energy),
                Some(loudness),
                Some(speechiness),
                Some(acousticness),
                Some(instrumentalness),
                Some(liveness),
                Some(valence),
            ) => Some(AudioFeatures {
                danceability,
                energy,
                loudness,
                speechiness,
                acousticness,
                instrumentalness,
                liveness,
                valence,
            }),
            _ => None,
        };

        if let Some(rank) = self.daily_rank {
            if rank == 0 || rank as usize > CHART_SIZE {
                return Err(format!("daily_rank {} outside 1..=50", rank));
            }
        }

        Ok(ChartRow {
            track_id: self.spotify_id,
            track_name: self.track_name,
            artists: split_list(&self.artists).map(str::to_string).collect(),
            country: self.country,
            country_name: self.country_name,
            country_region: self.country_region,
            snapshot_date,
            daily_rank: self.daily_rank,
            daily_movement: self.daily_movement,
            album_release_date: self.album_release_date,
            genres: self.genres,
            audio,
        })
    }
}

fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| format!("invalid snapshot_date '{}': {}", raw, e))
}

/// Raw genre reference record (`genre, left, top, size, color`).
#[derive(Debug, Deserialize)]
struct GenreRecord {
    genre: String,
    left: f64,
    top: f64,
    #[serde(default)]
    size: Option<f64>,
    #[serde(default)]
    color: String,
}

#[derive(Debug, Deserialize)]
struct BoundaryRecord {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Loaders for the flat files read once at startup.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Parse chart-history rows from any CSV reader.
    pub fn chart_rows_from_reader<R: Read>(reader: R) -> RepositoryResult<Vec<ChartRow>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (i, record) in rdr.deserialize::<ChartRecord>().enumerate() {
            let record = record?;
            let row = record.into_row().map_err(|msg| {
                RepositoryError::load_with_context(
                    msg,
                    ErrorContext::new("load_chart_rows")
                        .with_entity("chart_history")
                        .with_details(format!("record={}", i + 1)),
                )
            })?;
            rows.push(row);
        }
        check_partitions(&rows)?;
        Ok(rows)
    }

    pub fn load_chart_rows(path: &Path) -> RepositoryResult<Vec<ChartRow>> {
        let file = open(path, "load_chart_rows")?;
        let rows = Self::chart_rows_from_reader(file)
            .map_err(|e| e.with_operation(format!("load_chart_rows({})", path.display())))?;
        debug!("Loaded {} chart rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Parse genre points from any CSV reader.
    pub fn genre_points_from_reader<R: Read>(reader: R) -> RepositoryResult<Vec<GenrePoint>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut points = Vec::new();
        for record in rdr.deserialize::<GenreRecord>() {
            let record = record?;
            points.push(GenrePoint {
                genre: record.genre,
                x: record.left,
                y: record.top,
                size: record.size.unwrap_or(1.0),
                color: record.color,
            });
        }
        Ok(points)
    }

    pub fn load_genre_points(path: &Path) -> RepositoryResult<Vec<GenrePoint>> {
        let file = open(path, "load_genre_points")?;
        let points = Self::genre_points_from_reader(file)
            .map_err(|e| e.with_operation(format!("load_genre_points({})", path.display())))?;
        debug!("Loaded {} genre points from {}", points.len(), path.display());
        Ok(points)
    }

    /// Parse a boundary curve from `{ "x": [...], "y": [...] }`.
    pub fn boundary_from_reader<R: Read>(reader: R) -> RepositoryResult<BoundaryCurve> {
        let record: BoundaryRecord = serde_json::from_reader(reader)?;
        BoundaryCurve::new(record.x, record.y).map_err(|msg| {
            RepositoryError::load_with_context(
                msg,
                ErrorContext::new("load_boundary").with_entity("boundary_curve"),
            )
        })
    }

    /// Load the boundary curve, or `None` when the file does not exist.
    pub fn load_boundary(path: &Path) -> RepositoryResult<Option<BoundaryCurve>> {
        if !path.exists() {
            warn!("Boundary file {} not found", path.display());
            return Ok(None);
        }
        let file = open(path, "load_boundary")?;
        Self::boundary_from_reader(file).map(Some)
    }

    /// Load the precomputed overview figure, or `None` when the file does not exist.
    pub fn load_overview(path: &Path) -> RepositoryResult<Option<serde_json::Value>> {
        if !path.exists() {
            warn!("Overview figure {} not found", path.display());
            return Ok(None);
        }
        let file = open(path, "load_overview")?;
        let value = serde_json::from_reader(file)
            .map_err(|e| RepositoryError::from(e).with_operation("load_overview"))?;
        Ok(Some(value))
    }
}

/// Every (country, date) chart holds at most [`CHART_SIZE`] rows, each
/// with a distinct rank. Countries are keyed by code, or by name where the
/// code is blank (the global chart). Undated rows are not charts.
fn check_partitions(rows: &[ChartRow]) -> RepositoryResult<()> {
    let mut partitions: HashMap<(&str, NaiveDate), (usize, u64)> = HashMap::new();
    for row in rows {
        let Some(date) = row.snapshot_date else {
            continue;
        };
        let country = if row.country.is_empty() {
            row.country_name.as_str()
        } else {
            row.country.as_str()
        };
        let (count, ranks) = partitions.entry((country, date)).or_insert((0, 0));
        *count += 1;
        let violation = if *count > CHART_SIZE {
            Some(format!("more than {} rows", CHART_SIZE))
        } else {
            row.daily_rank.and_then(|rank| {
                let bit = 1u64 << rank;
                let repeated = *ranks & bit != 0;
                *ranks |= bit;
                repeated.then(|| format!("daily_rank {} repeated", rank))
            })
        };
        if let Some(violation) = violation {
            return Err(RepositoryError::load_with_context(
                format!("chart for {} on {} has {}", country, date, violation),
                ErrorContext::new("load_chart_rows")
                    .with_entity("chart_history")
                    .with_entity_id(format!("{}/{}", country, date)),
            ));
        }
    }
    Ok(())
}

fn open(path: &Path, operation: &str) -> RepositoryResult<File> {
    File::open(path).map_err(|e| {
        RepositoryError::load_with_context(
            e.to_string(),
            ErrorContext::new(operation).with_entity_id(path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CHART_CSV: &str = "\
spotify_id,track_name,artists,daily_rank,daily_movement,weekly_movement,country,snapshot_date,album_release_date,danceability,energy,loudness,speechiness,acousticness,instrumentalness,liveness,valence,country_name,country_region,genres
id1,Song A,\"Artist One, Artist Two\",1,0,3,BRA,2023-10-18,2023-09-01,0.8,0.7,-5.0,0.05,0.1,0.0,0.12,0.6,Brazil,South America,\"funk carioca, pop\"
id2,Song B,Artist Three,2,-1,0,BRA,2023-10-18,2019,0.5,0.4,-8.0,0.03,0.4,0.01,0.2,0.3,Brazil,South America,
";

    #[test]
    fn test_chart_rows_from_reader() {
        let rows = DatasetLoader::chart_rows_from_reader(CHART_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.track_id, "id1");
        assert_eq!(first.artists, vec!["Artist One", "Artist Two"]);
        assert_eq!(first.snapshot_date, NaiveDate::from_ymd_opt(2023, 10, 18));
        assert_eq!(first.daily_rank, Some(1));
        assert_eq!(first.audio.unwrap().energy, 0.7);
        assert_eq!(first.genre_list().collect::<Vec<_>>(), vec!["funk carioca", "pop"]);

        assert_eq!(rows[1].daily_movement, Some(-1));
        assert_eq!(rows[1].album_release_date, "2019");
        assert_eq!(rows[1].genre_list().count(), 0);
    }

    #[test]
    fn test_undated_row_without_features() {
        let csv = "spotify_id,track_name,artists,snapshot_date,country_name,genres\n\
                   p1,Mine,Someone,,My Mix,indie\n";
        let rows = DatasetLoader::chart_rows_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_undated());
        assert!(rows[0].audio.is_none());
        assert!(rows[0].daily_rank.is_none());
    }

    #[test]
    fn test_rejects_bad_date() {
        let csv = "spotify_id,track_name,snapshot_date,country_name\nid,Song,18/10/2023,Brazil\n";
        let err = DatasetLoader::chart_rows_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid snapshot_date"));
    }

    #[test]
    fn test_rejects_rank_out_of_range() {
        let csv = "spotify_id,track_name,daily_rank,snapshot_date,country_name\nid,Song,51,2023-10-18,Brazil\n";
        assert!(DatasetLoader::chart_rows_from_reader(csv.as_bytes()).is_err());
    }

    fn chart_csv(rows: impl IntoIterator<Item = (&'static str, &'static str, u8)>) -> String {
        let mut csv = String::from("spotify_id,track_name,artists,daily_rank,country,snapshot_date,country_name\n");
        for (i, (code, day, rank)) in rows.into_iter().enumerate() {
            csv.push_str(&format!("id{i},Song {i},Solo,{rank},{code},{day},Country {code}\n"));
        }
        csv
    }

    #[test]
    fn test_rejects_oversized_chart() {
        let csv = chart_csv((0..60).map(|i| ("BRA", "2023-10-18", (i % 50) as u8 + 1)));
        let err = DatasetLoader::chart_rows_from_reader(csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("BRA on 2023-10-18"), "{}", message);
        assert!(matches!(err, RepositoryError::LoadError { .. }));
    }

    #[test]
    fn test_rejects_repeated_rank() {
        let csv = chart_csv([("BRA", "2023-10-18", 1), ("BRA", "2023-10-18", 2), ("BRA", "2023-10-18", 1)]);
        let err = DatasetLoader::chart_rows_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("daily_rank 1 repeated"));
    }

    #[test]
    fn test_full_charts_per_partition_load() {
        // 50 ranks in each of two countries and two days, plus a blank-code global chart
        let csv = chart_csv(
            ["BRA", "JPN", ""]
                .into_iter()
                .flat_map(|c| ["2023-10-17", "2023-10-18"].into_iter().map(move |d| (c, d)))
                .flat_map(|(c, d)| (1..=50u8).map(move |r| (c, d, r))),
        );
        let rows = DatasetLoader::chart_rows_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 300);
        let shares = crate::services::top_artist_per_country(&rows);
        assert!(shares.iter().all(|s| s.percentage == 100.0));
    }

    #[test]
    fn test_genre_points_from_reader() {
        let csv = "color,top,left,size,genre\n#a0b0c0,21000,300,12,pop\n#102030,500,1400,,drone\n";
        let points = DatasetLoader::genre_points_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].genre, "pop");
        assert_eq!(points[0].x, 300.0);
        assert_eq!(points[0].y, 21000.0);
        assert_eq!(points[1].size, 1.0);
    }

    #[test]
    fn test_boundary_from_reader() {
        let curve = DatasetLoader::boundary_from_reader(r#"{"x":[0,1,0],"y":[0,0,1]}"#.as_bytes())
            .unwrap();
        assert_eq!(curve.len(), 3);

        let err = DatasetLoader::boundary_from_reader(r#"{"x":[0,1],"y":[0]}"#.as_bytes());
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_optional_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DatasetLoader::load_boundary(&dir.path().join("none.json"))
            .unwrap()
            .is_none());
        assert!(DatasetLoader::load_overview(&dir.path().join("none.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_chart_rows_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CHART_CSV.as_bytes()).unwrap();
        let rows = DatasetLoader::load_chart_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);

        let missing = DatasetLoader::load_chart_rows(Path::new("/nonexistent/chart.csv"));
        assert!(missing.is_err());
    }
}

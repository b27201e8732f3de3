//! Genre counts placed in the genre space, and the genre drill-down table.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::filter::{filter_rows, Column, CountrySelector, DateRange, DedupeKey, FilterParams, TableRecord};
use crate::models::{ChartRow, GenreSpace};

/// Columns shown in the genre drill-down table.
pub const GENRE_TABLE_COLUMNS: [Column; 4] = [
    Column::TrackName,
    Column::Artists,
    Column::Genres,
    Column::CountryName,
];

/// Number of unique tracks carrying one genre for one country or playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreCount {
    pub country: String,
    pub genre: String,
    pub song_count: usize,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

/// Count genres over unique tracks and join them with the genre space.
///
/// Rows are deduplicated by track id first. Genres with no reference point
/// are dropped. Output is ordered by count descending, then genre name.
pub fn genre_counts<'a, I>(rows: I, space: &GenreSpace, label: &str) -> Vec<GenreCount>
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    let mut seen_tracks = HashSet::new();
    let mut counts: HashMap<&'a str, usize> = HashMap::new();

    for row in rows {
        if !seen_tracks.insert(row.track_id.as_str()) {
            continue;
        }
        for genre in row.genre_list() {
            *counts.entry(genre).or_insert(0) += 1;
        }
    }

    let mut out: Vec<GenreCount> = counts
        .into_iter()
        .filter_map(|(genre, song_count)| {
            space.point(genre).map(|p| GenreCount {
                country: label.to_string(),
                genre: genre.to_string(),
                song_count,
                x: p.x,
                y: p.y,
                color: p.color.clone(),
            })
        })
        .collect();
    out.sort_by(|a, b| b.song_count.cmp(&a.song_count).then_with(|| a.genre.cmp(&b.genre)));
    out
}

/// Genre counts for each selected country or playlist label, concatenated
/// in selection order.
pub fn genre_counts_by_country<'a, I>(
    rows: I,
    range: DateRange,
    countries: &[String],
    space: &GenreSpace,
) -> Vec<GenreCount>
where
    I: IntoIterator<Item = &'a ChartRow> + Clone,
{
    countries
        .iter()
        .flat_map(|country| {
            let params = FilterParams::new(Some(range), CountrySelector::one(country.as_str()))
                .dedupe(DedupeKey::TrackId);
            let set = filter_rows(rows.clone(), &params);
            genre_counts(set.iter(), space, country)
        })
        .collect()
}

/// What the genre drill-down table is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreTableQuery {
    /// Region selection over genre points, possibly across facets.
    Selection {
        genres: Vec<String>,
        countries: Vec<String>,
    },
    /// A single clicked genre point.
    Genre { genre: String, country: String },
    /// Every track of one country.
    Country(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreTable {
    pub title: String,
    pub records: Vec<TableRecord>,
}

/// Build the drill-down table for a query over the date range.
pub fn genre_table<'a, I>(rows: I, range: DateRange, query: &GenreTableQuery) -> GenreTable
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    match query {
        GenreTableQuery::Selection { genres, countries } => {
            let params = FilterParams::new(Some(range), CountrySelector::Many(countries.clone()))
                .dedupe(DedupeKey::TrackId)
                .columns(&GENRE_TABLE_COLUMNS);
            let set = filter_rows(rows, &params)
                .retain(|row| row.has_any_genre(genres.iter().map(String::as_str)))
                .dedupe(DedupeKey::TrackName);
            GenreTable {
                title: format!("Selected genres Songs in {}", countries.join(", ")),
                records: set.records(),
            }
        }
        GenreTableQuery::Genre { genre, country } => {
            let params = FilterParams::new(Some(range), CountrySelector::one(country.as_str()))
                .dedupe(DedupeKey::TrackId)
                .columns(&GENRE_TABLE_COLUMNS);
            let set = filter_rows(rows, &params).retain(|row| row.has_genre(genre));
            GenreTable {
                title: format!("{} Songs in {}", genre, country),
                records: set.records(),
            }
        }
        GenreTableQuery::Country(country) => {
            let params = FilterParams::new(Some(range), CountrySelector::one(country.as_str()))
                .dedupe(DedupeKey::TrackId)
                .columns(&GENRE_TABLE_COLUMNS);
            GenreTable {
                title: format!("Songs in {}", country),
                records: filter_rows(rows, &params).records(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundaryCurve, GenrePoint};
    use serde_json::json;

    fn space() -> GenreSpace {
        let point = |genre: &str, x: f64| GenrePoint {
            genre: genre.to_string(),
            x,
            y: 100.0,
            size: 1.0,
            color: "#ff0000".to_string(),
        };
        GenreSpace::new(
            vec![point("pop", 10.0), point("samba", 20.0), point("rock", 30.0)],
            BoundaryCurve::default(),
        )
    }

    fn row(id: &str, name: &str, country: &str, date: Option<&str>, genres: &str) -> ChartRow {
        ChartRow {
            track_id: id.to_string(),
            track_name: name.to_string(),
            artists: vec!["Someone".to_string()],
            country: String::new(),
            country_name: country.to_string(),
            country_region: String::new(),
            snapshot_date: date.map(|d| d.parse().unwrap()),
            daily_rank: None,
            daily_movement: None,
            album_release_date: String::new(),
            genres: genres.to_string(),
            audio: None,
        }
    }

    fn rows() -> Vec<ChartRow> {
        vec![
            row("1", "A", "Brazil", Some("2023-10-01"), "pop, samba"),
            row("1", "A", "Brazil", Some("2023-10-02"), "pop, samba"),
            row("2", "B", "Brazil", Some("2023-10-02"), "pop, k-pop"),
            row("3", "C", "Japan", Some("2023-10-02"), "j-pop"),
            row("4", "D", "Mix", None, "rock"),
        ]
    }

    fn range() -> DateRange {
        DateRange::new("2023-10-01".parse().unwrap(), "2023-10-31".parse().unwrap())
    }

    #[test]
    fn test_counts_unique_tracks_and_inner_join() {
        let rows = rows();
        let counts = genre_counts(rows.iter().filter(|r| r.country_name == "Brazil"), &space(), "Brazil");
        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.genre.as_str(), c.song_count)).collect();
        assert_eq!(pairs, vec![("pop", 2), ("samba", 1)]);
        assert!(counts.iter().all(|c| c.country == "Brazil"));
    }

    #[test]
    fn test_counts_by_country_include_playlists() {
        let rows = rows();
        let countries = vec!["Brazil".to_string(), "Japan".to_string(), "Mix".to_string()];
        let counts = genre_counts_by_country(&rows, range(), &countries, &space());
        let labels: Vec<&str> = counts.iter().map(|c| c.country.as_str()).collect();
        // Japan has no genre in the reference space
        assert_eq!(labels, vec!["Brazil", "Brazil", "Mix"]);
    }

    #[test]
    fn test_genre_click_table() {
        let rows = rows();
        let table = genre_table(
            &rows,
            range(),
            &GenreTableQuery::Genre {
                genre: "samba".to_string(),
                country: "Brazil".to_string(),
            },
        );
        assert_eq!(table.title, "samba Songs in Brazil");
        assert_eq!(table.records.len(), 1);
        assert_eq!(
            serde_json::to_value(&table.records[0]).unwrap(),
            json!({"track_name": "A", "artists": "Someone", "genres": "pop, samba", "country_name": "Brazil"})
        );
    }

    #[test]
    fn test_selection_table_across_countries() {
        let rows = rows();
        let table = genre_table(
            &rows,
            range(),
            &GenreTableQuery::Selection {
                genres: vec!["pop".to_string(), "rock".to_string()],
                countries: vec!["Brazil".to_string(), "Mix".to_string()],
            },
        );
        assert_eq!(table.title, "Selected genres Songs in Brazil, Mix");
        assert_eq!(table.records.len(), 3);
    }

    #[test]
    fn test_country_table() {
        let rows = rows();
        let table = genre_table(&rows, range(), &GenreTableQuery::Country("Brazil".to_string()));
        assert_eq!(table.title, "Songs in Brazil");
        assert_eq!(table.records.len(), 2);
    }
}

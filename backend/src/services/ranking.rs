//! Top tracks by sustained chart presence, and the daily rank table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

use super::error::{AnalysisError, AnalysisResult};
use super::filter::{filter_rows, Column, CountrySelector, DateRange, DedupeKey, FilterParams, TableRecord};
use crate::models::ChartRow;

/// Tracks ranked by staying power must number at least this many; the
/// threshold is the day count of the track at this position.
pub const STAYING_POWER_POSITION: usize = 31;

/// Tracks shown in the ranking chart.
pub const TOP_TRACKS: usize = 10;

pub const RANK_TABLE_COLUMNS: [Column; 5] = [
    Column::TrackName,
    Column::Artists,
    Column::AlbumReleaseDate,
    Column::DailyRank,
    Column::DailyMovement,
];

/// Display format for dates in table titles and cells.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPoint {
    pub date: NaiveDate,
    pub daily_rank: u8,
}

/// One top track with its date-ordered daily ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRankSeries {
    pub track_name: String,
    pub artists: String,
    /// Mean daily rank over the window, rounded to 2 decimals.
    pub mean_rank: f64,
    /// Staying power: distinct days in the window.
    pub days_in: usize,
    pub points: Vec<RankPoint>,
}

struct TrackStats {
    artists: String,
    dates: BTreeSet<NaiveDate>,
    ranks: Vec<(NaiveDate, u8)>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Best-ranked tracks among those with the most staying power.
///
/// Tracks are keyed by name. Rows without a date or a rank are ignored.
/// Fails with [`AnalysisError::InsufficientData`] when fewer than
/// [`STAYING_POWER_POSITION`] distinct tracks are present.
pub fn top_sustained_tracks<'a, I>(rows: I) -> AnalysisResult<Vec<TrackRankSeries>>
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    let mut stats: HashMap<&'a str, TrackStats> = HashMap::new();

    for row in rows {
        let (Some(date), Some(rank)) = (row.snapshot_date, row.daily_rank) else {
            continue;
        };
        let entry = stats.entry(row.track_name.as_str()).or_insert_with(|| TrackStats {
            artists: row.artists_joined(),
            dates: BTreeSet::new(),
            ranks: Vec::new(),
        });
        entry.dates.insert(date);
        entry.ranks.push((date, rank));
    }

    if stats.len() < STAYING_POWER_POSITION {
        return Err(AnalysisError::InsufficientData {
            required: STAYING_POWER_POSITION,
            available: stats.len(),
        });
    }

    let mut days: Vec<usize> = stats.values().map(|s| s.dates.len()).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    let threshold = days[STAYING_POWER_POSITION - 1];

    let mut kept: Vec<(&'a str, TrackStats, f64)> = stats
        .into_iter()
        .filter(|(_, s)| s.dates.len() >= threshold)
        .map(|(name, s)| {
            let total: u32 = s.ranks.iter().map(|(_, r)| u32::from(*r)).sum();
            let mean = round2(total as f64 / s.ranks.len() as f64);
            (name, s, mean)
        })
        .collect();

    kept.sort_by(|a, b| {
        a.2.partial_cmp(&b.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    kept.truncate(TOP_TRACKS);

    Ok(kept
        .into_iter()
        .map(|(name, mut s, mean_rank)| {
            s.ranks.sort_by_key(|(date, _)| *date);
            TrackRankSeries {
                track_name: name.to_string(),
                artists: s.artists,
                mean_rank,
                days_in: s.dates.len(),
                points: s
                    .ranks
                    .into_iter()
                    .map(|(date, daily_rank)| RankPoint { date, daily_rank })
                    .collect(),
            }
        })
        .collect())
}

/// Reformat an ISO release date for display; partial dates are kept as-is.
pub fn display_release_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Tracks charted in one country on one day, one row per track.
pub fn rank_table<'a, I>(rows: I, country: &str, date: NaiveDate) -> Vec<TableRecord>
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    let params = FilterParams::new(Some(DateRange::day(date)), CountrySelector::one(country))
        .dedupe(DedupeKey::TrackId)
        .columns(&RANK_TABLE_COLUMNS);

    let mut records = filter_rows(rows, &params).records();
    for record in records.iter_mut() {
        let display = record
            .get(Column::AlbumReleaseDate)
            .and_then(Value::as_str)
            .map(display_release_date);
        if let Some(display) = display {
            record.set(Column::AlbumReleaseDate, Value::from(display));
        }
    }
    records
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod ranking_tests;

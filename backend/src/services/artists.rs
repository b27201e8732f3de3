//! Most-charted artist per country.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{ChartRow, CHART_SIZE};

/// Name of the aggregate chart that is not a country.
pub const GLOBAL_CHART: &str = "Global";

/// A country's top artist and the share of chart placements they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistShare {
    /// ISO-3 country code, used as the map location.
    pub country: String,
    pub country_name: String,
    pub artist: String,
    pub placements: usize,
    /// Distinct chart days for the country times the chart size.
    pub total_placements: usize,
    pub percentage: f64,
}

#[derive(Default)]
struct CountryTally<'a> {
    country_name: &'a str,
    dates: HashSet<chrono::NaiveDate>,
    placements: HashMap<&'a str, usize>,
}

/// For each country, the primary artist with the highest share of
/// placements over the rows given.
///
/// The global chart and undated rows are skipped. Ties on percentage go to
/// the alphabetically first artist. Output is ordered by country code.
pub fn top_artist_per_country<'a, I>(rows: I) -> Vec<ArtistShare>
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    let mut tallies: BTreeMap<&'a str, CountryTally<'a>> = BTreeMap::new();

    for row in rows {
        if row.country_name == GLOBAL_CHART {
            continue;
        }
        let Some(date) = row.snapshot_date else {
            continue;
        };
        let tally = tallies.entry(row.country.as_str()).or_default();
        if tally.country_name.is_empty() {
            tally.country_name = row.country_name.as_str();
        }
        tally.dates.insert(date);
        if let Some(artist) = row.primary_artist() {
            *tally.placements.entry(artist).or_insert(0) += 1;
        }
    }

    tallies
        .into_iter()
        .filter_map(|(country, tally)| {
            let total = tally.dates.len() * CHART_SIZE;
            let (artist, placements) = tally
                .placements
                .iter()
                .max_by(|(a_name, a_count), (b_name, b_count)| {
                    a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
                })
                .map(|(name, count)| (*name, *count))?;
            Some(ArtistShare {
                country: country.to_string(),
                country_name: tally.country_name.to_string(),
                artist: artist.to_string(),
                placements,
                total_placements: total,
                percentage: placements as f64 / total as f64 * 100.0,
            })
        })
        .collect()
}

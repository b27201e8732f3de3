//! Chart history rows and audio features.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of positions in a daily Top 50 chart.
pub const CHART_SIZE: usize = 50;

/// Separator used for the joined `artists` and `genres` columns.
pub const LIST_SEPARATOR: &str = ", ";

/// Audio-feature scalars attached to a charted track.
///
/// All values are nominally in `[0.0, 1.0]` except `loudness`, which is in dB.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
}

impl AudioFeatures {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Danceability => self.danceability,
            Feature::Energy => self.energy,
            Feature::Loudness => self.loudness,
            Feature::Speechiness => self.speechiness,
            Feature::Acousticness => self.acousticness,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Liveness => self.liveness,
            Feature::Valence => self.valence,
        }
    }
}

/// Audio-feature axis selectable on the features page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Acousticness,
    Danceability,
    Energy,
    Instrumentalness,
    Liveness,
    Loudness,
    Speechiness,
    Valence,
}

impl Feature {
    /// Every feature carried by a chart row.
    pub const ALL: [Feature; 8] = [
        Feature::Acousticness,
        Feature::Danceability,
        Feature::Energy,
        Feature::Instrumentalness,
        Feature::Liveness,
        Feature::Loudness,
        Feature::Speechiness,
        Feature::Valence,
    ];

    /// Features offered as scatter axes. Loudness is not on the unit scale and stays out.
    pub const OFFERED: [Feature; 7] = [
        Feature::Acousticness,
        Feature::Danceability,
        Feature::Energy,
        Feature::Instrumentalness,
        Feature::Liveness,
        Feature::Speechiness,
        Feature::Valence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Acousticness => "acousticness",
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Liveness => "liveness",
            Feature::Loudness => "loudness",
            Feature::Speechiness => "speechiness",
            Feature::Valence => "valence",
        }
    }

    pub fn is_offered(&self) -> bool {
        Self::OFFERED.contains(self)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown audio feature '{}'", s))
    }
}

/// One (track, country, date) observation from the chart history.
///
/// Rows resolved from a user playlist carry no snapshot date, rank or audio
/// features; an absent `snapshot_date` is what marks a row as undated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub track_id: String,
    pub track_name: String,
    /// Ordered artist list, the first entry is the primary artist.
    pub artists: Vec<String>,
    pub country: String,
    pub country_name: String,
    pub country_region: String,
    pub snapshot_date: Option<NaiveDate>,
    pub daily_rank: Option<u8>,
    pub daily_movement: Option<i32>,
    /// Raw release date as published; precision varies (year, month or day).
    pub album_release_date: String,
    /// Comma-joined genre list, parsed on demand.
    pub genres: String,
    pub audio: Option<AudioFeatures>,
}

impl ChartRow {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }

    pub fn artists_joined(&self) -> String {
        self.artists.join(LIST_SEPARATOR)
    }

    pub fn is_undated(&self) -> bool {
        self.snapshot_date.is_none()
    }

    /// Iterate the parsed genre list.
    pub fn genre_list(&self) -> impl Iterator<Item = &str> {
        split_list(&self.genres)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre_list().any(|g| g == genre)
    }

    pub fn has_any_genre<'a, I>(&self, genres: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let own: Vec<&str> = self.genre_list().collect();
        genres.into_iter().any(|g| own.contains(&g))
    }
}

/// Split a joined list column into trimmed, non-empty entries.
pub fn split_list(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(',').map(str::trim).filter(|s| !s.is_empty())
}

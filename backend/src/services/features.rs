//! Mean audio features per country and date, and smoothed per-country series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{AnalysisError, AnalysisResult};
use crate::models::{AudioFeatures, ChartRow, Feature};

/// Rolling-window sizes offered on the features page.
pub const ROLLING_WINDOWS: [usize; 3] = [1, 3, 5];

/// Arithmetic mean of every audio feature for one (country, date, region) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFeatureMean {
    pub country_name: String,
    pub country_region: String,
    pub date: NaiveDate,
    pub tracks: usize,
    pub features: AudioFeatures,
}

/// One point of a smoothed series. `value` is `None` while the rolling
/// window lacks history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    sums: AudioFeatures,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, audio: &AudioFeatures) {
        let s = &mut self.sums;
        s.danceability += audio.danceability;
        s.energy += audio.energy;
        s.loudness += audio.loudness;
        s.speechiness += audio.speechiness;
        s.acousticness += audio.acousticness;
        s.instrumentalness += audio.instrumentalness;
        s.liveness += audio.liveness;
        s.valence += audio.valence;
        self.count += 1;
    }

    fn mean(&self) -> AudioFeatures {
        let n = self.count as f64;
        let s = &self.sums;
        AudioFeatures {
            danceability: s.danceability / n,
            energy: s.energy / n,
            loudness: s.loudness / n,
            speechiness: s.speechiness / n,
            acousticness: s.acousticness / n,
            instrumentalness: s.instrumentalness / n,
            liveness: s.liveness / n,
            valence: s.valence / n,
        }
    }
}

/// Group rows by (country, date, region) and average their audio features.
///
/// Only dated rows carrying audio features take part. With `on` set, only
/// that date's groups are returned. Output is ordered by country, date, region.
pub fn mean_features_by_country_date<'a, I>(rows: I, on: Option<NaiveDate>) -> Vec<CountryFeatureMean>
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    let mut groups: BTreeMap<(&'a str, NaiveDate, &'a str), Accumulator> = BTreeMap::new();

    for row in rows {
        let (Some(date), Some(audio)) = (row.snapshot_date, row.audio.as_ref()) else {
            continue;
        };
        if on.is_some_and(|d| d != date) {
            continue;
        }
        groups
            .entry((row.country_name.as_str(), date, row.country_region.as_str()))
            .or_default()
            .add(audio);
    }

    groups
        .into_iter()
        .map(|((country, date, region), acc)| CountryFeatureMean {
            country_name: country.to_string(),
            country_region: region.to_string(),
            date,
            tracks: acc.count,
            features: acc.mean(),
        })
        .collect()
}

/// Trailing rolling mean. The first `window - 1` values are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            if window == 1 {
                out.push(Some(*v));
            } else {
                out.push(Some(sum / window as f64));
            }
        } else {
            out.push(None);
        }
    }
    out
}

pub fn validate_window(window: usize) -> AnalysisResult<usize> {
    if ROLLING_WINDOWS.contains(&window) {
        Ok(window)
    } else {
        Err(AnalysisError::invalid(format!(
            "Window size must be one of {:?}, got {}",
            ROLLING_WINDOWS, window
        )))
    }
}

/// Date-sorted daily mean of `feature` for one country, smoothed by a
/// trailing window of `window` days.
pub fn feature_series<'a, I>(
    rows: I,
    country_name: &str,
    feature: Feature,
    window: usize,
) -> AnalysisResult<Vec<SeriesPoint>>
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    let window = validate_window(window)?;

    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for row in rows {
        if row.country_name != country_name {
            continue;
        }
        let (Some(date), Some(audio)) = (row.snapshot_date, row.audio.as_ref()) else {
            continue;
        };
        let entry = by_date.entry(date).or_insert((0.0, 0));
        entry.0 += audio.get(feature);
        entry.1 += 1;
    }

    let dates: Vec<NaiveDate> = by_date.keys().copied().collect();
    let means: Vec<f64> = by_date.values().map(|(sum, n)| sum / *n as f64).collect();
    let smoothed = rolling_mean(&means, window);

    Ok(dates
        .into_iter()
        .zip(smoothed)
        .map(|(date, value)| SeriesPoint { date, value })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: &str, date: &str, danceability: f64) -> ChartRow {
        ChartRow {
            track_id: "id".to_string(),
            track_name: "t".to_string(),
            artists: vec![],
            country: String::new(),
            country_name: country.to_string(),
            country_region: "Asia".to_string(),
            snapshot_date: Some(date.parse().unwrap()),
            daily_rank: Some(1),
            daily_movement: None,
            album_release_date: String::new(),
            genres: String::new(),
            audio: Some(AudioFeatures {
                danceability,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_rolling_mean_window_one_is_identity() {
        let values = [0.1, 0.5, 0.3];
        let out = rolling_mean(&values, 1);
        assert_eq!(out, vec![Some(0.1), Some(0.5), Some(0.3)]);
    }

    #[test]
    fn test_rolling_mean_leading_points_undefined() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = rolling_mean(&values, 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((out[4].unwrap() - 4.0).abs() < 1e-12);

        assert!(rolling_mean(&values[..2], 5).iter().all(Option::is_none));
    }

    #[test]
    fn test_mean_by_country_date() {
        let rows = vec![
            row("Japan", "2023-10-01", 0.2),
            row("Japan", "2023-10-01", 0.4),
            row("Japan", "2023-10-02", 0.9),
            row("Korea", "2023-10-01", 0.5),
        ];
        let all = mean_features_by_country_date(&rows, None);
        assert_eq!(all.len(), 3);
        assert!((all[0].features.danceability - 0.3).abs() < 1e-12);
        assert_eq!(all[0].tracks, 2);

        let one_day = mean_features_by_country_date(&rows, Some("2023-10-01".parse().unwrap()));
        let names: Vec<&str> = one_day.iter().map(|m| m.country_name.as_str()).collect();
        assert_eq!(names, vec!["Japan", "Korea"]);
    }

    #[test]
    fn test_feature_series_sorted_and_smoothed() {
        let rows = vec![
            row("Japan", "2023-10-03", 0.6),
            row("Japan", "2023-10-01", 0.2),
            row("Japan", "2023-10-02", 0.4),
            row("Korea", "2023-10-02", 1.0),
        ];
        let raw = feature_series(&rows, "Japan", Feature::Danceability, 1).unwrap();
        let values: Vec<Option<f64>> = raw.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(0.2), Some(0.4), Some(0.6)]);

        let smooth = feature_series(&rows, "Japan", Feature::Danceability, 3).unwrap();
        assert_eq!(smooth[0].value, None);
        assert!((smooth[2].value.unwrap() - 0.4).abs() < 1e-12);

        assert!(matches!(
            feature_series(&rows, "Japan", Feature::Danceability, 2),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}

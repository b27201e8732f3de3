//! Shared in-memory dataset for binding tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

use super::{Dashboard, MemoCache};
use crate::db::RepositoryFactory;
use crate::models::{AudioFeatures, BoundaryCurve, ChartRow, GenrePoint, GenreSpace};
use crate::playlist::{PlaylistError, PlaylistResolver, PlaylistResult};

pub(crate) fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub(crate) fn audio(danceability: f64, liveness: f64) -> AudioFeatures {
    AudioFeatures {
        danceability,
        liveness,
        energy: 0.5,
        loudness: -6.0,
        ..Default::default()
    }
}

pub(crate) fn row(track: &str, artist: &str, country: &str, day: &str, rank: u8, genres: &str) -> ChartRow {
    let (code, region) = match country {
        "Brazil" => ("BRA", "South America"),
        "Japan" => ("JPN", "Asia"),
        "Iceland" => ("ISL", "Europe"),
        _ => ("", "Global"),
    };
    ChartRow {
        track_id: format!("{}-id", track),
        track_name: track.to_string(),
        artists: vec![artist.to_string()],
        country: code.to_string(),
        country_name: country.to_string(),
        country_region: region.to_string(),
        snapshot_date: Some(date(day)),
        daily_rank: Some(rank),
        daily_movement: Some(0),
        album_release_date: "2023-01-15".to_string(),
        genres: genres.to_string(),
        audio: Some(audio(0.1 * f64::from(rank % 10), 0.2)),
    }
}

/// Global charts 35 tracks over two days; the countries chart a handful.
pub(crate) fn rows() -> Vec<ChartRow> {
    let mut rows = Vec::new();
    for day in ["2023-10-17", "2023-10-18"] {
        for rank in 1..=35u8 {
            rows.push(row(&format!("Song {:02}", rank), "Star", "Global", day, rank, "pop"));
        }
        rows.push(row("Samba", "Ana", "Brazil", day, 1, "samba, pop"));
        rows.push(row("Funk", "Bia", "Brazil", day, 2, "funk carioca"));
        rows.push(row("City", "Ken", "Japan", day, 1, "j-pop"));
        rows.push(row("Ice", "Bjork", "Iceland", day, 1, "art pop"));
    }
    rows
}

pub(crate) fn genre_space() -> GenreSpace {
    let point = |genre: &str, x: f64, y: f64| GenrePoint {
        genre: genre.to_string(),
        x,
        y,
        size: 10.0,
        color: "#1db954".to_string(),
    };
    GenreSpace::new(
        vec![
            point("pop", 600.0, 12000.0),
            point("samba", 300.0, 8000.0),
            point("funk carioca", 900.0, 15000.0),
            point("j-pop", 700.0, 14000.0),
            point("art pop", 500.0, 9000.0),
            point("indie", 400.0, 10000.0),
        ],
        BoundaryCurve::from_vertices(&[(0.0, 0.0), (1500.0, 0.0), (1500.0, 23000.0), (0.0, 0.0)]),
    )
}

/// Resolver returning a fixed outcome and counting calls.
pub(crate) struct StubResolver {
    outcome: PlaylistResult<Vec<(String, String)>>,
    pub calls: Mutex<usize>,
}

impl StubResolver {
    /// Resolves to one undated track per `(name, genres)` pair.
    pub(crate) fn tracks(tracks: &[(&str, &str)]) -> Self {
        Self {
            outcome: Ok(tracks
                .iter()
                .map(|(name, genres)| (name.to_string(), genres.to_string()))
                .collect()),
            calls: Mutex::new(0),
        }
    }

    pub(crate) fn failing(err: PlaylistError) -> Self {
        Self {
            outcome: Err(err),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PlaylistResolver for StubResolver {
    async fn resolve(&self, _playlist_id: &str, label: &str) -> PlaylistResult<Vec<ChartRow>> {
        *self.calls.lock() += 1;
        let tracks = self.outcome.clone()?;
        Ok(tracks
            .into_iter()
            .map(|(name, genres)| ChartRow {
                track_id: format!("{}-id", name),
                track_name: name,
                artists: vec!["Someone".to_string()],
                country: String::new(),
                country_name: label.to_string(),
                country_region: String::new(),
                snapshot_date: None,
                daily_rank: None,
                daily_movement: None,
                album_release_date: "2020".to_string(),
                genres,
                audio: None,
            })
            .collect())
    }
}

pub(crate) fn dashboard_with(resolver: Arc<dyn PlaylistResolver>) -> Dashboard {
    let repo = RepositoryFactory::create_local(rows(), genre_space(), json!({"data": [], "layout": {}}));
    Dashboard::new(repo, resolver, MemoCache::new(64))
}

pub(crate) fn dashboard() -> Dashboard {
    dashboard_with(Arc::new(StubResolver::failing(PlaylistError::NotConfigured)))
}

//! Synthetic datasets shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use top50_rust::models::{AudioFeatures, BoundaryCurve, ChartRow, GenrePoint, GenreSpace};
use top50_rust::playlist::{PlaylistResolver, PlaylistResult};

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

pub fn chart_row(track: &str, country: &str, day: Option<NaiveDate>, rank: Option<u8>, genres: &str) -> ChartRow {
    ChartRow {
        track_id: format!("{}-{}", track, country),
        track_name: track.to_string(),
        artists: vec![format!("{} Artist", track)],
        country: country.chars().take(3).collect::<String>().to_uppercase(),
        country_name: country.to_string(),
        country_region: "Region".to_string(),
        snapshot_date: day,
        daily_rank: rank,
        daily_movement: rank.map(|_| 0),
        album_release_date: "2023-01-01".to_string(),
        genres: genres.to_string(),
        audio: day.map(|_| AudioFeatures {
            danceability: f64::from(rank.unwrap_or(1)) / 50.0,
            ..Default::default()
        }),
    }
}

/// Three countries, two days, a full 50-track chart per country and day.
/// Day one charts `A01..A50`, day two `B01..B50`.
pub fn ranking_dataset() -> Vec<ChartRow> {
    let mut rows = Vec::new();
    for country in ["Global", "Brazil", "Japan"] {
        for (prefix, day) in [("A", "2023-10-17"), ("B", "2023-10-18")] {
            for rank in 1..=50u8 {
                rows.push(chart_row(
                    &format!("{}{:02}", prefix, rank),
                    country,
                    Some(date(day)),
                    Some(rank),
                    if rank % 2 == 0 { "pop" } else { "rock, indie" },
                ));
            }
        }
    }
    rows
}

pub fn genre_space() -> GenreSpace {
    let point = |genre: &str, x: f64, y: f64| GenrePoint {
        genre: genre.to_string(),
        x,
        y,
        size: 10.0,
        color: "#336699".to_string(),
    };
    GenreSpace::new(
        vec![point("pop", 600.0, 12000.0), point("rock", 200.0, 4000.0), point("indie", 400.0, 9000.0)],
        BoundaryCurve::from_vertices(&[(0.0, 0.0), (1000.0, 0.0), (500.0, 20000.0), (0.0, 0.0)]),
    )
}

/// Write the chart history and genre reference files into `dir`.
pub fn write_data_files(dir: &Path) {
    let mut chart = String::from(
        "spotify_id,track_name,artists,daily_rank,daily_movement,country,snapshot_date,album_release_date,\
         danceability,energy,loudness,speechiness,acousticness,instrumentalness,liveness,valence,\
         country_name,country_region,genres\n",
    );
    for rank in 1..=35u8 {
        for day in ["2023-10-17", "2023-10-18"] {
            chart.push_str(&format!(
                "id{r},Song {r:02},\"Artist {r}, Guest\",{r},0,,{day},2023-01-15,0.5,0.6,-5.0,0.1,0.2,0.0,0.3,0.4,Global,Global,pop\n",
                r = rank,
                day = day
            ));
        }
    }
    chart.push_str(
        "br1,Samba,Ana,1,0,BR,2023-10-17,2022,0.7,0.6,-4.0,0.1,0.2,0.0,0.3,0.9,Brazil,South America,\"pop, rock\"\n",
    );
    std::fs::write(dir.join("universal_top_spotify_songs.csv"), chart).expect("write chart file");

    let genres = "genre,left,top,size,color\npop,600,12000,10,#ff0000\nrock,200,4000,8,#00ff00\nindie,400,9000,5,#0000ff\n";
    std::fs::write(dir.join("genres.csv"), genres).expect("write genre file");
}

/// Resolver that always returns the same tracks and counts its calls.
pub struct FixedResolver {
    pub tracks: Vec<(&'static str, &'static str)>,
    pub calls: AtomicUsize,
}

impl FixedResolver {
    pub fn new(tracks: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            tracks,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistResolver for FixedResolver {
    async fn resolve(&self, _playlist_id: &str, label: &str) -> PlaylistResult<Vec<ChartRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tracks
            .iter()
            .map(|(name, genres)| chart_row(name, label, None, None, genres))
            .collect())
    }
}

//! External playlist resolution.
//!
//! A resolver turns an opaque playlist identifier and a display label into
//! undated chart rows that can be appended to the dataset overlay. Failures
//! are reported as [`PlaylistError`] and never mutate anything.

pub mod spotify;

pub use spotify::SpotifyPlaylistResolver;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::PlaylistSettings;
use crate::models::ChartRow;

/// Playlist resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaylistError {
    #[error("Playlist resolution is not configured")]
    NotConfigured,

    #[error("Invalid playlist identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Playlist {0} has no tracks")]
    Empty(String),
}

pub type PlaylistResult<T> = Result<T, PlaylistError>;

/// Resolves a playlist into chart rows labelled with `label`.
///
/// Returned rows carry `country_name = label`, no snapshot date, no rank and
/// no audio features. An empty playlist is an error, not an empty `Ok`.
#[async_trait]
pub trait PlaylistResolver: Send + Sync {
    async fn resolve(&self, playlist_id: &str, label: &str) -> PlaylistResult<Vec<ChartRow>>;
}

/// Resolver used when no credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledResolver;

#[async_trait]
impl PlaylistResolver for DisabledResolver {
    async fn resolve(&self, _playlist_id: &str, _label: &str) -> PlaylistResult<Vec<ChartRow>> {
        Err(PlaylistError::NotConfigured)
    }
}

/// Pick the resolver matching `settings`.
pub fn resolver_from_settings(settings: &PlaylistSettings) -> PlaylistResult<Arc<dyn PlaylistResolver>> {
    if !settings.is_configured() {
        log::warn!("Playlist credentials not configured, playlist submission disabled");
        return Ok(Arc::new(DisabledResolver));
    }
    Ok(Arc::new(SpotifyPlaylistResolver::new(settings.clone())?))
}

/// Extract the bare playlist id from an id, a `spotify:playlist:` URI or an
/// `open.spotify.com/playlist/` link.
pub fn parse_playlist_id(raw: &str) -> PlaylistResult<String> {
    let raw = raw.trim();
    let id = if let Some(rest) = raw.strip_prefix("spotify:playlist:") {
        rest
    } else if let Some(pos) = raw.find("/playlist/") {
        let rest = &raw[pos + "/playlist/".len()..];
        rest.split(['?', '/', '#']).next().unwrap_or_default()
    } else {
        raw
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PlaylistError::InvalidIdentifier(raw.to_string()));
    }
    Ok(id.to_string())
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackObject {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumObject {
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Build an undated row for one playlist track.
pub(crate) fn playlist_row(track: &TrackObject, genres: &[String], label: &str) -> ChartRow {
    ChartRow {
        track_id: track.id.clone().unwrap_or_default(),
        track_name: track.name.clone(),
        artists: track.artists.iter().map(|a| a.name.clone()).collect(),
        country: String::new(),
        country_name: label.to_string(),
        country_region: String::new(),
        snapshot_date: None,
        daily_rank: None,
        daily_movement: None,
        album_release_date: track
            .album
            .as_ref()
            .and_then(|a| a.release_date.clone())
            .unwrap_or_default(),
        genres: genres.join(crate::models::LIST_SEPARATOR),
        audio: None,
    }
}

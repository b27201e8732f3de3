//! Spotify Web API playlist resolver (client-credentials flow).

use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{parse_playlist_id, playlist_row, PlaylistError, PlaylistResolver, PlaylistResult, TrackObject};
use crate::config::PlaylistSettings;
use crate::models::ChartRow;

/// Tokens are refreshed this long before they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Upper bound on followed `next` pages (100 tracks each).
const MAX_PAGES: usize = 20;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct PlaylistPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    #[serde(default)]
    genres: Vec<String>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct SpotifyPlaylistResolver {
    http_client: reqwest::Client,
    settings: PlaylistSettings,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyPlaylistResolver {
    pub fn new(settings: PlaylistSettings) -> PlaylistResult<Self> {
        if !settings.is_configured() {
            return Err(PlaylistError::NotConfigured);
        }
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| PlaylistError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> PlaylistResult<String> {
        let cached = {
            let guard = self.token.lock();
            guard
                .as_ref()
                .filter(|t| t.expires_at > Instant::now())
                .map(|t| t.value.clone())
        };
        if let Some(token) = cached {
            return Ok(token);
        }

        debug!("Requesting Spotify access token");
        let response = self
            .http_client
            .post(&self.settings.auth_url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PlaylistError::Transport(e.to_string()))?;
        let token: TokenResponse = read_json(response).await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *self.token.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> PlaylistResult<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PlaylistError::Transport(e.to_string()))?;
        read_json(response).await
    }

    async fn artist_genres(&self, artist_id: &str, token: &str) -> PlaylistResult<Vec<String>> {
        let url = format!("{}/artists/{}", self.settings.api_base, artist_id);
        let artist: ArtistObject = self.get(&url, token).await?;
        Ok(artist.genres)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> PlaylistResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(PlaylistError::Upstream {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json()
        .await
        .map_err(|e| PlaylistError::Transport(e.to_string()))
}

#[async_trait]
impl PlaylistResolver for SpotifyPlaylistResolver {
    async fn resolve(&self, playlist_id: &str, label: &str) -> PlaylistResult<Vec<ChartRow>> {
        let id = parse_playlist_id(playlist_id)?;
        let token = self.access_token().await?;

        let mut url = Some(format!("{}/playlists/{}/tracks", self.settings.api_base, id));
        let mut tracks = Vec::new();
        let mut pages = 0;
        while let Some(next) = url.take() {
            let page: PlaylistPage = self.get(&next, &token).await?;
            tracks.extend(page.items.into_iter().filter_map(|item| item.track));
            pages += 1;
            if pages >= MAX_PAGES {
                if page.next.is_some() {
                    warn!("Playlist {} truncated after {} pages", id, pages);
                }
                break;
            }
            url = page.next;
        }

        // Genres come from the first artist of each track
        let mut genre_cache: HashMap<String, Vec<String>> = HashMap::new();
        let mut rows = Vec::with_capacity(tracks.len());
        for track in &tracks {
            let artist_id = track.artists.first().and_then(|a| a.id.as_deref());
            let genres = match artist_id {
                Some(artist_id) => match genre_cache.get(artist_id) {
                    Some(genres) => genres.clone(),
                    None => {
                        let genres = self.artist_genres(artist_id, &token).await?;
                        genre_cache.insert(artist_id.to_string(), genres.clone());
                        genres
                    }
                },
                None => Vec::new(),
            };
            rows.push(playlist_row(track, &genres, label));
        }

        if rows.is_empty() {
            return Err(PlaylistError::Empty(id));
        }
        info!("Resolved playlist {} as '{}' with {} tracks", id, label, rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PlaylistSettings {
        PlaylistSettings {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_credentials() {
        assert!(matches!(
            SpotifyPlaylistResolver::new(PlaylistSettings::default()),
            Err(PlaylistError::NotConfigured)
        ));
        assert!(SpotifyPlaylistResolver::new(configured()).is_ok());
    }

    #[test]
    fn test_playlist_page_skips_missing_tracks() {
        let page: PlaylistPage = serde_json::from_str(
            r#"{"items":[{"track":null},{"track":{"id":"t","name":"Song","artists":[]}}],"next":null}"#,
        )
        .unwrap();
        let tracks: Vec<TrackObject> = page.items.into_iter().filter_map(|i| i.track).collect();
        assert_eq!(tracks.len(), 1);
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn test_invalid_identifier_fails_before_network() {
        let resolver = SpotifyPlaylistResolver::new(configured()).unwrap();
        let err = resolver.resolve("bad id!", "Mix").await.unwrap_err();
        assert!(matches!(err, PlaylistError::InvalidIdentifier(_)));
    }
}

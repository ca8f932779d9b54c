//! Video metadata lookups against the YouTube Data API.
//!
//! One `videos.list` call with `part=snippet,contentDetails` returns the
//! channel name, the title, the ISO-8601 duration and the thumbnails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::errors::AppError;
use crate::videos::duration::parse_iso8601_duration;

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// What the submission flow needs to know about a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub channel_name: String,
    pub title: String,
    pub duration_seconds: u64,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait MetadataFetcher: Send + Sync + 'static {
    /// Looks up `video_id`. Fails with [`AppError::NotFound`] when the video
    /// does not exist or is not accessible.
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, AppError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: VideoSnippet,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
    standard: Option<Thumbnail>,
    maxres: Option<Thumbnail>,
}

impl Thumbnails {
    fn best(self) -> Option<String> {
        self.maxres
            .or(self.standard)
            .or(self.high)
            .or(self.medium)
            .or(self.default)
            .map(|thumbnail| thumbnail.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

pub struct YoutubeClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl YoutubeClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl MetadataFetcher for YoutubeClient {
    #[tracing::instrument(name = "Fetch YouTube video metadata", skip(self))]
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, AppError> {
        let url = format!("{}/videos", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", video_id),
                ("key", self.api_key.expose_secret().as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("YouTube API error {}: {}", status, error_text);
            return Err(AppError::ExternalService(anyhow::anyhow!(
                "YouTube API responded with {}",
                status
            )));
        }

        let data: VideoListResponse = response.json().await?;

        let Some(item) = data.items.into_iter().next() else {
            tracing::info!("No video found for id {}", video_id);
            return Err(AppError::NotFound(format!(
                "No video found or access denied for video ID: {}",
                video_id
            )));
        };

        let duration_seconds =
            parse_iso8601_duration(&item.content_details.duration).ok_or_else(|| {
                AppError::ExternalService(anyhow::anyhow!(
                    "Unrecognized duration '{}' for video {}",
                    item.content_details.duration,
                    video_id
                ))
            })?;

        tracing::debug!(
            channel = %item.snippet.channel_title,
            duration_seconds,
            "Fetched video metadata"
        );

        Ok(VideoMetadata {
            channel_name: item.snippet.channel_title,
            title: item.snippet.title,
            duration_seconds,
            image_url: item.snippet.thumbnails.best(),
        })
    }
}

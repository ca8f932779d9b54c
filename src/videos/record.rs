use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::videos::duration::format_duration;

/// Accepted length of a Long submission: 2.5 to 3 hours.
pub const LONG_DURATION_SECONDS: RangeInclusive<u64> = 9_000..=10_800;

/// Submission path that created a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Long,
    Short,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Long => "long",
            Category::Short => "short",
        }
    }

    /// Applies the duration rule of this submission path.
    pub fn check_duration(&self, duration_seconds: u64) -> Result<(), AppError> {
        match self {
            Category::Long => check_long_duration(duration_seconds),
            Category::Short => check_short_duration(duration_seconds),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "long" => Ok(Category::Long),
            "short" => Ok(Category::Short),
            other => Err(AppError::Database(anyhow::anyhow!(
                "Unknown video category '{}'",
                other
            ))),
        }
    }
}

pub fn check_long_duration(duration_seconds: u64) -> Result<(), AppError> {
    if LONG_DURATION_SECONDS.contains(&duration_seconds) {
        return Ok(());
    }

    Err(AppError::Validation(format!(
        "Long videos must last between {} and {}, this one lasts {}",
        format_duration(*LONG_DURATION_SECONDS.start()),
        format_duration(*LONG_DURATION_SECONDS.end()),
        format_duration(duration_seconds)
    )))
}

/// Short submissions have no length band. Any non-negative duration, which
/// `u64` already guarantees, is accepted.
pub fn check_short_duration(_duration_seconds: u64) -> Result<(), AppError> {
    Ok(())
}

/// A persisted video submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    pub url: String,
    pub video_id: String,
    pub channel_name: String,
    pub title: String,
    pub image_url: Option<String>,
    pub category: Category,
    pub duration_seconds: u64,
    pub duration_human: String,
    pub added_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated record ready for insertion. `duration_human` is derived here
/// and cannot be set on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    url: String,
    video_id: String,
    channel_name: String,
    title: String,
    image_url: Option<String>,
    category: Category,
    duration_seconds: u64,
    duration_human: String,
    added_by: Option<String>,
}

impl NewVideo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: String,
        video_id: String,
        channel_name: String,
        title: String,
        image_url: Option<String>,
        category: Category,
        duration_seconds: u64,
        added_by: Option<String>,
    ) -> Result<Self, AppError> {
        if channel_name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Video {} has no channel name",
                video_id
            )));
        }

        Ok(Self {
            url,
            video_id,
            channel_name,
            title,
            image_url,
            category,
            duration_seconds,
            duration_human: format_duration(duration_seconds),
            added_by,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn duration_human(&self) -> &str {
        &self.duration_human
    }

    pub fn added_by(&self) -> Option<&str> {
        self.added_by.as_deref()
    }

    /// Turns the pending record into a persisted one.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> VideoRecord {
        VideoRecord {
            id,
            url: self.url,
            video_id: self.video_id,
            channel_name: self.channel_name,
            title: self.title,
            image_url: self.image_url,
            category: self.category,
            duration_seconds: self.duration_seconds,
            duration_human: self.duration_human,
            added_by: self.added_by,
            created_at,
        }
    }
}

/// Row shape of the `videos` table.
#[derive(Debug, FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub url: String,
    pub video_id: String,
    pub channel_name: String,
    pub title: String,
    pub image_url: Option<String>,
    pub category: String,
    pub duration_seconds: i64,
    pub duration_human: String,
    pub added_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<VideoRow> for VideoRecord {
    type Error = AppError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        let duration_seconds = u64::try_from(row.duration_seconds).map_err(|e| {
            AppError::Database(anyhow::Error::new(e).context(format!(
                "Video {} has a negative duration",
                row.video_id
            )))
        })?;

        Ok(VideoRecord {
            id: row.id,
            url: row.url,
            video_id: row.video_id,
            channel_name: row.channel_name,
            title: row.title,
            image_url: row.image_url,
            category: row.category.parse()?,
            duration_seconds,
            duration_human: row.duration_human,
            added_by: row.added_by,
            created_at: row.created_at,
        })
    }
}

/// Narrows a listing to one submission path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoFilter {
    pub category: Option<Category>,
}

impl VideoFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
        }
    }

    #[cfg(test)]
    pub fn matches(&self, record: &VideoRecord) -> bool {
        self.category
            .map(|category| record.category == category)
            .unwrap_or(true)
    }
}

/// Per-channel totals reported after a Short submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub channel_name: String,
    pub video_count: u64,
    pub total_duration_seconds: u64,
    pub total_duration_human: String,
}

impl ChannelStats {
    pub fn new(channel_name: String, video_count: u64, total_duration_seconds: u64) -> Self {
        Self {
            channel_name,
            video_count,
            total_duration_seconds,
            total_duration_human: format_duration(total_duration_seconds),
        }
    }

    /// Totals once one more video of `duration_seconds` joins the channel.
    pub fn including(self, duration_seconds: u64) -> Self {
        Self::new(
            self.channel_name,
            self.video_count + 1,
            self.total_duration_seconds + duration_seconds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_video(category: Category, duration_seconds: u64) -> Result<NewVideo, AppError> {
        NewVideo::new(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s".to_string(),
            "dQw4w9WgXcQ".to_string(),
            "Rick Astley".to_string(),
            "Never Gonna Give You Up".to_string(),
            None,
            category,
            duration_seconds,
            None,
        )
    }

    #[test]
    fn long_rule_bounds_are_inclusive() {
        assert!(check_long_duration(9_000).is_ok());
        assert!(check_long_duration(10_800).is_ok());
        assert!(matches!(check_long_duration(8_999), Err(AppError::Validation(_))));
        assert!(matches!(check_long_duration(10_801), Err(AppError::Validation(_))));
    }

    #[test]
    fn short_rule_accepts_any_length() {
        assert!(Category::Short.check_duration(0).is_ok());
        assert!(Category::Short.check_duration(60).is_ok());
        assert!(Category::Short.check_duration(50_000).is_ok());
        assert!(Category::Long.check_duration(60).is_err());
    }

    #[test]
    fn human_duration_is_derived_at_construction() {
        let video = new_video(Category::Long, 9_263).unwrap();
        assert_eq!(video.duration_human(), "2h 34m 23s");

        let record = video.into_record(Uuid::new_v4(), Utc::now());
        assert_eq!(record.duration_human, format_duration(record.duration_seconds));
    }

    #[test]
    fn blank_channel_name_is_rejected() {
        let result = NewVideo::new(
            "https://youtu.be/dQw4w9WgXcQ?si=abcdefghijklmnop".to_string(),
            "dQw4w9WgXcQ".to_string(),
            "  ".to_string(),
            "title".to_string(),
            None,
            Category::Short,
            60,
            None,
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn category_round_trips_through_text() {
        assert_eq!("long".parse::<Category>().unwrap(), Category::Long);
        assert_eq!(Category::Short.to_string(), "short");
        assert!("medium".parse::<Category>().is_err());
    }

    #[test]
    fn negative_row_duration_is_rejected() {
        let row = VideoRow {
            id: Uuid::new_v4(),
            url: "https://youtu.be/dQw4w9WgXcQ?si=abcdefghijklmnop".to_string(),
            video_id: "dQw4w9WgXcQ".to_string(),
            channel_name: "A".to_string(),
            title: "t".to_string(),
            image_url: None,
            category: "short".to_string(),
            duration_seconds: -1,
            duration_human: "0s".to_string(),
            added_by: None,
            created_at: Utc::now(),
        };
        assert!(matches!(VideoRecord::try_from(row), Err(AppError::Database(_))));
    }
}

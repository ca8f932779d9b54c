//! Persistence for video records.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{timeout_query, QUERY_TIMEOUT};
use crate::errors::AppError;
use crate::videos::record::{ChannelStats, NewVideo, VideoFilter, VideoRecord, VideoRow};

const VIDEO_ID_CONSTRAINT: &str = "videos_video_id_key";
const UNIQUE_VIOLATION: &str = "23505";

/// Storage used by the submission flow and the listing pages.
///
/// `insert` must enforce uniqueness of `video_id` on its own, the
/// `exists_by_video_id` pre-check is only there for a friendlier message.
#[async_trait]
pub trait VideoStore: Send + Sync + 'static {
    async fn exists_by_video_id(&self, video_id: &str) -> Result<bool, AppError>;

    /// Persists `video`. Fails with [`AppError::Uniqueness`] when a record
    /// with the same video id already exists.
    async fn insert(&self, video: NewVideo) -> Result<VideoRecord, AppError>;

    /// Records matching `filter`, oldest first.
    async fn find_all(&self, filter: VideoFilter) -> Result<Vec<VideoRecord>, AppError>;

    /// Count and total duration of every record for `channel_name`.
    async fn channel_stats(&self, channel_name: &str) -> Result<ChannelStats, AppError>;
}

#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error, video_id: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        let is_video_id_constraint = db_err.constraint() == Some(VIDEO_ID_CONSTRAINT);
        let is_unique_violation = db_err.code().as_deref() == Some(UNIQUE_VIOLATION);
        if is_video_id_constraint || is_unique_violation {
            tracing::warn!("Concurrent insert detected for video {}", video_id);
            return AppError::Uniqueness(format!(
                "Video {} was added by another submission",
                video_id
            ));
        }
    }

    AppError::Database(anyhow::Error::new(err).context("Failed to insert video"))
}

#[async_trait]
impl VideoStore for PgVideoStore {
    #[tracing::instrument(name = "Check video exists", skip(self))]
    async fn exists_by_video_id(&self, video_id: &str) -> Result<bool, AppError> {
        timeout_query(
            QUERY_TIMEOUT,
            sqlx::query_scalar::<_, bool>(
                r#"SELECT EXISTS(SELECT 1 FROM videos WHERE video_id = $1)"#,
            )
            .bind(video_id)
            .fetch_one(&self.pool),
        )
        .await
    }

    #[tracing::instrument(name = "Insert video", skip(self, video), fields(video_id = %video.video_id()))]
    async fn insert(&self, video: NewVideo) -> Result<VideoRecord, AppError> {
        let duration_seconds = i64::try_from(video.duration_seconds()).map_err(|_| {
            AppError::Validation(format!(
                "Duration of video {} is out of range",
                video.video_id()
            ))
        })?;

        let result = tokio::time::timeout(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, VideoRow>(
                r#"INSERT INTO videos
                    (id, url, video_id, channel_name, title, image_url, category,
                     duration_seconds, duration_human, added_by)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                   RETURNING *"#,
            )
            .bind(Uuid::new_v4())
            .bind(video.url())
            .bind(video.video_id())
            .bind(video.channel_name())
            .bind(video.title())
            .bind(video.image_url())
            .bind(video.category().as_str())
            .bind(duration_seconds)
            .bind(video.duration_human())
            .bind(video.added_by())
            .fetch_one(&self.pool),
        )
        .await?;

        let row = result.map_err(|e| map_insert_error(e, video.video_id()))?;
        tracing::info!("Inserted video {}", row.video_id);
        VideoRecord::try_from(row)
    }

    #[tracing::instrument(name = "Find videos", skip(self))]
    async fn find_all(&self, filter: VideoFilter) -> Result<Vec<VideoRecord>, AppError> {
        let category = filter.category.map(|category| category.as_str());

        let rows = timeout_query(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, VideoRow>(
                r#"SELECT * FROM videos
                   WHERE ($1::TEXT IS NULL OR category = $1)
                   ORDER BY created_at, id"#,
            )
            .bind(category)
            .fetch_all(&self.pool),
        )
        .await?;

        tracing::debug!("Fetched {} videos", rows.len());
        rows.into_iter().map(VideoRecord::try_from).collect()
    }

    #[tracing::instrument(name = "Channel stats", skip(self))]
    async fn channel_stats(&self, channel_name: &str) -> Result<ChannelStats, AppError> {
        let (video_count, total_duration_seconds) = timeout_query(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, (i64, i64)>(
                r#"SELECT COUNT(*), COALESCE(SUM(duration_seconds), 0)::BIGINT
                   FROM videos WHERE channel_name = $1"#,
            )
            .bind(channel_name)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(ChannelStats::new(
            channel_name.to_string(),
            video_count.max(0) as u64,
            total_duration_seconds.max(0) as u64,
        ))
    }
}

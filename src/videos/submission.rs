use serde::Serialize;

use crate::errors::AppError;
use crate::videos::link::validate_link;
use crate::videos::metadata::MetadataFetcher;
use crate::videos::record::{Category, ChannelStats, NewVideo, VideoRecord};
use crate::videos::store::VideoStore;

#[derive(Debug, Clone)]
pub struct Submission {
    pub url: String,
    pub category: Category,
    pub added_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub video: VideoRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_stats: Option<ChannelStats>,
}

/// Validates, enriches and stores one submitted link.
///
/// Every failure returns before the insert, so a rejected submission never
/// leaves a partial record behind.
#[tracing::instrument(
    name = "Submit video",
    skip(store, fetcher, submission),
    fields(url = %submission.url, category = %submission.category)
)]
pub async fn submit_video(
    store: &dyn VideoStore,
    fetcher: &dyn MetadataFetcher,
    submission: Submission,
) -> Result<SubmissionOutcome, AppError> {
    let video_id = validate_link(&submission.url)?;

    if store.exists_by_video_id(&video_id).await? {
        tracing::info!("Video {} already listed", video_id);
        return Err(AppError::Duplicate(
            "This video already exists in the list".to_string(),
        ));
    }

    let metadata = fetcher.fetch_metadata(&video_id).await?;
    submission.category.check_duration(metadata.duration_seconds)?;

    let new_video = NewVideo::new(
        submission.url,
        video_id,
        metadata.channel_name,
        metadata.title,
        metadata.image_url,
        submission.category,
        metadata.duration_seconds,
        submission.added_by,
    )?;

    // No fallible call may follow the insert.
    let prior_stats = match submission.category {
        Category::Short => Some(store.channel_stats(new_video.channel_name()).await?),
        Category::Long => None,
    };

    let video = store.insert(new_video).await?;
    tracing::info!(
        video_id = %video.video_id,
        channel = %video.channel_name,
        "Link successfully added to the list"
    );

    let channel_stats = prior_stats.map(|stats| {
        let stats = stats.including(video.duration_seconds);
        tracing::info!(
            "The {} channel has total {} videos with total duration {}",
            stats.channel_name,
            stats.video_count,
            stats.total_duration_human
        );
        stats
    });

    Ok(SubmissionOutcome {
        video,
        channel_stats,
    })
}

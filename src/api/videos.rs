use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Form, Json};
use serde::Deserialize;

use crate::api::common::identity::submitter_id;
use crate::errors::AppError;
use crate::videos::aggregate::{
    group_by_channel, group_by_date, summarize, ChannelGroups, DateGroups, VideoListing,
};
use crate::videos::submission::SubmissionOutcome;
use crate::videos::{submit_video, Category, Submission, VideoFilter};
use crate::InnerState;

#[derive(Debug, Deserialize)]
pub struct LinkForm {
    pub link: String,
}

async fn submit(
    inner: InnerState,
    headers: &HeaderMap,
    form: LinkForm,
    category: Category,
) -> Result<(StatusCode, Json<SubmissionOutcome>), AppError> {
    let added_by = submitter_id(headers, inner.token_key.as_ref());
    tracing::debug!(anonymous = added_by.is_none(), "Resolved submitter");

    let outcome = submit_video(
        inner.store.as_ref(),
        inner.fetcher.as_ref(),
        Submission {
            url: form.link,
            category,
            added_by,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

#[tracing::instrument(name = "Submit long video", skip(inner, headers, form))]
pub async fn submit_long_video(
    State(inner): State<InnerState>,
    headers: HeaderMap,
    Form(form): Form<LinkForm>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), AppError> {
    submit(inner, &headers, form, Category::Long).await
}

#[tracing::instrument(name = "Submit short video", skip(inner, headers, form))]
pub async fn submit_short_video(
    State(inner): State<InnerState>,
    headers: HeaderMap,
    Form(form): Form<LinkForm>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), AppError> {
    submit(inner, &headers, form, Category::Short).await
}

#[tracing::instrument(name = "List all videos", skip(inner))]
pub async fn list_videos(State(inner): State<InnerState>) -> Result<Json<VideoListing>, AppError> {
    let records = inner.store.find_all(VideoFilter::all()).await?;
    Ok(Json(summarize(&records)))
}

#[tracing::instrument(name = "List long videos by date", skip(inner))]
pub async fn videos_by_date(State(inner): State<InnerState>) -> Result<Json<DateGroups>, AppError> {
    let records = inner
        .store
        .find_all(VideoFilter::category(Category::Long))
        .await?;
    let grouped = group_by_date(&records);
    tracing::debug!(
        empty = grouped.is_empty(),
        "Grouped {} long videos into {} dates",
        records.len(),
        grouped.groups.len()
    );
    Ok(Json(grouped))
}

#[tracing::instrument(name = "List short videos by channel", skip(inner))]
pub async fn videos_by_channel(
    State(inner): State<InnerState>,
) -> Result<Json<ChannelGroups>, AppError> {
    let records = inner
        .store
        .find_all(VideoFilter::category(Category::Short))
        .await?;
    let grouped = group_by_channel(&records);
    tracing::debug!(
        empty = grouped.is_empty(),
        "Grouped {} short videos into {} channels",
        records.len(),
        grouped.groups.len()
    );
    Ok(Json(grouped))
}

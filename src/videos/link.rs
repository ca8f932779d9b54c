//! Submitted link checks and video id extraction.

use url::Url;

use crate::errors::AppError;

/// Shortest accepted link, in characters. Tuned to typical YouTube link
/// lengths and kept as-is for compatibility with existing submissions.
pub const MIN_LINK_LEN: usize = 45;
/// Longest accepted link, in characters.
pub const MAX_LINK_LEN: usize = 64;
/// Length of a canonical YouTube video id.
pub const VIDEO_ID_LEN: usize = 11;

const ALLOWED_HOSTS: [&str; 3] = ["youtube.com", "www.youtube.com", "youtu.be"];

/// Returns `true` when `link` is an admissible YouTube video link.
pub fn is_valid(link: &str) -> bool {
    let length = link.chars().count();
    if !(MIN_LINK_LEN..=MAX_LINK_LEN).contains(&length) {
        return false;
    }

    let Ok(parsed) = Url::parse(link) else {
        return false;
    };

    match parsed.host_str() {
        Some(host) if ALLOWED_HOSTS.contains(&host) => {}
        _ => return false,
    }

    extract_video_id(link)
        .map(|video_id| video_id.chars().count() == VIDEO_ID_LEN)
        .unwrap_or(false)
}

/// Extracts the video id from a `youtu.be/<id>` or `youtube.com/watch?v=<id>` link.
///
/// Does not check the host or the id length, see [`is_valid`] for that.
pub fn extract_video_id(link: &str) -> Result<String, AppError> {
    let parsed = Url::parse(link)
        .map_err(|e| AppError::Extraction(format!("'{}' is not a valid URL: {}", link, e)))?;

    let is_short_link = parsed
        .host_str()
        .map(|host| host.contains("youtu.be"))
        .unwrap_or(false);

    let video_id = if is_short_link {
        parsed.path().trim_start_matches('/').to_string()
    } else {
        parsed
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default()
    };

    if video_id.is_empty() {
        return Err(AppError::Extraction(format!(
            "Could not find a video id in '{}'",
            link
        )));
    }

    Ok(video_id)
}

/// Validates `link` and returns its video id.
#[tracing::instrument(name = "Validate submitted link")]
pub fn validate_link(link: &str) -> Result<String, AppError> {
    if !is_valid(link) {
        tracing::debug!("Rejected link");
        return Err(AppError::Validation(
            "Invalid Youtube video link. Enter a valid one.".to_string(),
        ));
    }

    extract_video_id(link)
}

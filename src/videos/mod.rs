//! Submitted YouTube videos: link checks, metadata enrichment, storage and
//! the grouped listings shown to users.

pub mod aggregate;
pub mod duration;
pub mod link;
pub mod metadata;
pub mod record;
pub mod store;
pub mod submission;

pub use metadata::{MetadataFetcher, YoutubeClient};
pub use record::{Category, VideoFilter};
pub use store::{PgVideoStore, VideoStore};
pub use submission::{submit_video, Submission};

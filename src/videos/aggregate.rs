//! Display groupings over persisted records.
//!
//! All functions are pure. Ordering is established here from `created_at`
//! and `channel_name`, never inherited from the order of the input slice.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::videos::duration::format_duration;
use crate::videos::record::{Category, VideoRecord};

#[derive(Debug, Clone, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub videos: Vec<VideoRecord>,
}

/// Long submissions grouped by the UTC calendar date they were created on.
#[derive(Debug, Clone, Serialize)]
pub struct DateGroups {
    pub groups: Vec<DateGroup>,
    pub empty: bool,
}

impl DateGroups {
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelGroup {
    pub channel_name: String,
    pub videos: Vec<VideoRecord>,
    pub total_duration_seconds: u64,
    pub total_duration_human: String,
}

/// Short submissions grouped by channel, with per-channel totals.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelGroups {
    pub groups: Vec<ChannelGroup>,
    pub empty: bool,
}

impl ChannelGroups {
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

/// Every record with the overall running time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListing {
    pub videos: Vec<VideoRecord>,
    pub total_duration_seconds: u64,
    pub total_duration_human: String,
    pub empty: bool,
}

fn in_creation_order<'a>(records: impl Iterator<Item = &'a VideoRecord>) -> Vec<VideoRecord> {
    let mut ordered: Vec<VideoRecord> = records.cloned().collect();
    // Stable, so records sharing a timestamp keep their input order.
    ordered.sort_by_key(|record| record.created_at);
    ordered
}

fn total_seconds(records: &[VideoRecord]) -> u64 {
    records.iter().map(|record| record.duration_seconds).sum()
}

pub fn group_by_date(records: &[VideoRecord]) -> DateGroups {
    let ordered = in_creation_order(
        records
            .iter()
            .filter(|record| record.category == Category::Long),
    );

    let mut groups: Vec<DateGroup> = Vec::new();
    for record in ordered {
        let date = record.created_at.date_naive();
        match groups.last_mut() {
            Some(group) if group.date == date => group.videos.push(record),
            _ => groups.push(DateGroup {
                date,
                videos: vec![record],
            }),
        }
    }

    DateGroups {
        empty: groups.is_empty(),
        groups,
    }
}

pub fn group_by_channel(records: &[VideoRecord]) -> ChannelGroups {
    let mut by_channel: BTreeMap<&str, Vec<&VideoRecord>> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| record.category == Category::Short)
    {
        by_channel
            .entry(record.channel_name.as_str())
            .or_default()
            .push(record);
    }

    let groups: Vec<ChannelGroup> = by_channel
        .into_iter()
        .map(|(channel_name, channel_records)| {
            let videos = in_creation_order(channel_records.into_iter());
            let total_duration_seconds = total_seconds(&videos);
            ChannelGroup {
                channel_name: channel_name.to_string(),
                videos,
                total_duration_seconds,
                total_duration_human: format_duration(total_duration_seconds),
            }
        })
        .collect();

    ChannelGroups {
        empty: groups.is_empty(),
        groups,
    }
}

pub fn summarize(records: &[VideoRecord]) -> VideoListing {
    let videos = in_creation_order(records.iter());
    let total_duration_seconds = total_seconds(&videos);

    VideoListing {
        empty: videos.is_empty(),
        total_duration_human: format_duration(total_duration_seconds),
        total_duration_seconds,
        videos,
    }
}

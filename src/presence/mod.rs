//! Live roster of devices currently in range. Signal strength is smoothed with a
//! fixed-weight EMA and entries silent for more than a minute are swept out.

use std::collections::HashMap;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::device::{ClassificationResult, DeviceType, HardwareAddress};
use crate::probe::RadioType;

/// Seconds without a report after which an entry is evicted
pub const STALE_AFTER_SECS: i64 = 60;

const EMA_OLD_WEIGHT: f64 = 0.4;
const EMA_NEW_WEIGHT: f64 = 0.6;

/// One tracked device. Field names follow the dashboard's JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceEntry {
    #[serde(rename = "mac")]
    pub address: HardwareAddress,
    #[serde(rename = "rssi")]
    pub smoothed_rssi: i32,
    pub manufacturer: String,
    pub model: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(rename = "last_src")]
    pub last_source: RadioType,
    pub first_seen: i64,
    pub last_seen: i64,
    /// Local wall-clock time of `last_seen`
    pub timestamp: String,
    #[serde(rename = "samples")]
    pub sample_count: u64,
}

impl PresenceEntry {
    fn new(address: HardwareAddress, rssi: i32, classification: &ClassificationResult, now: i64) -> Self {
        Self {
            address,
            smoothed_rssi: rssi,
            manufacturer: classification.manufacturer.clone(),
            model: classification.model.clone(),
            device_type: classification.device_type,
            last_source: RadioType::default(),
            first_seen: now,
            last_seen: now,
            timestamp: format_timestamp(now),
            sample_count: 0,
        }
    }

    pub fn age_secs(&self, now: i64) -> i64 {
        now - self.last_seen
    }
}

/// `YYYY-MM-DD HH:MM:SS` in server local time
pub fn format_timestamp(epoch_secs: i64) -> String {
    Local
        .timestamp_opt(epoch_secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Fixed-coefficient EMA, rounded to whole dBm
pub fn smooth_rssi(previous: i32, sample: i32) -> i32 {
    (previous as f64 * EMA_OLD_WEIGHT + sample as f64 * EMA_NEW_WEIGHT).round() as i32
}

/// Devices currently seen, keyed by address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceRegistry {
    entries: HashMap<HardwareAddress, PresenceEntry>,
}

impl PresenceRegistry {
    /// Merge one accepted sighting into the roster
    pub fn update(
        &mut self,
        address: HardwareAddress,
        rssi: i32,
        classification: &ClassificationResult,
        radio_type: RadioType,
        now: i64,
    ) -> &PresenceEntry {
        let entry = self
            .entries
            .entry(address)
            .and_modify(|e| e.smoothed_rssi = smooth_rssi(e.smoothed_rssi, rssi))
            .or_insert_with(|| PresenceEntry::new(address, rssi, classification, now));

        entry.manufacturer.clone_from(&classification.manufacturer);
        entry.model.clone_from(&classification.model);
        entry.device_type = classification.device_type;
        entry.last_source = radio_type;
        entry.last_seen = now;
        entry.timestamp = format_timestamp(now);
        entry.sample_count += 1;

        entry
    }

    /// Drop every entry silent for more than `STALE_AFTER_SECS`. Returns how many went.
    pub fn evict(&mut self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.age_secs(now) <= STALE_AFTER_SECS);
        before - self.entries.len()
    }

    pub fn get(&self, address: &HardwareAddress) -> Option<&PresenceEntry> {
        self.entries.get(address)
    }

    /// Unordered copy of every entry
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(HardwareAddress, PresenceEntry)> for PresenceRegistry {
    fn from_iter<I: IntoIterator<Item = (HardwareAddress, PresenceEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

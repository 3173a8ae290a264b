//! Log-distance path loss estimate for the dashboard. Indoor calibration:
//! -55 dBm at one meter, path loss exponent 3.0.

use serde::Serialize;

use crate::device::DeviceType;
use crate::presence::PresenceEntry;

pub const TX_POWER_AT_1M: f64 = -55.0;
pub const PATH_LOSS_EXPONENT: f64 = 3.0;

const NEAR_LIMIT_M: f64 = 1.5;
const MEDIUM_LIMIT_M: f64 = 5.0;

/// Estimated distance in meters for a (smoothed) RSSI
pub fn estimate_distance_m(rssi: i32) -> f64 {
    10f64.powf((TX_POWER_AT_1M - rssi as f64) / (10.0 * PATH_LOSS_EXPONENT))
}

/// Under a meter in whole centimeters, otherwise meters with one decimal
pub fn format_distance(meters: f64) -> String {
    if meters < 1.0 {
        format!("{:.0} cm", meters * 100.0)
    } else {
        format!("{:.1} m", meters)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityBand {
    Near,
    Medium,
    Far,
}

impl ProximityBand {
    pub fn from_distance(meters: f64) -> Self {
        if meters < NEAR_LIMIT_M {
            ProximityBand::Near
        } else if meters < MEDIUM_LIMIT_M {
            ProximityBand::Medium
        } else {
            ProximityBand::Far
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProximityDevice {
    #[serde(flatten)]
    pub entry: PresenceEntry,
    pub distance_m: f64,
    pub distance_text: String,
    pub band: ProximityBand,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProximitySummary {
    pub total: usize,
    pub phones: usize,
    pub computers: usize,
    pub devices: Vec<ProximityDevice>,
}

/// Strongest signal first, with per-type counts
pub fn summarize(mut entries: Vec<PresenceEntry>) -> ProximitySummary {
    entries.sort_by(|a, b| b.smoothed_rssi.cmp(&a.smoothed_rssi));

    let phones = entries
        .iter()
        .filter(|e| e.device_type == DeviceType::Phone)
        .count();
    let computers = entries
        .iter()
        .filter(|e| e.device_type == DeviceType::Computer)
        .count();

    let devices: Vec<ProximityDevice> = entries
        .into_iter()
        .map(|entry| {
            let distance_m = estimate_distance_m(entry.smoothed_rssi);
            ProximityDevice {
                entry,
                distance_m,
                distance_text: format_distance(distance_m),
                band: ProximityBand::from_distance(distance_m),
            }
        })
        .collect();

    ProximitySummary {
        total: devices.len(),
        phones,
        computers,
        devices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ClassificationResult, normalize};
    use crate::presence::PresenceRegistry;
    use crate::probe::RadioType;

    #[test]
    fn test_distance_calibration() {
        assert!((estimate_distance_m(-55) - 1.0).abs() < 1e-9);
        // 30 dB below reference is 10 m with n = 3
        assert!((estimate_distance_m(-85) - 10.0).abs() < 1e-9);
        assert!(estimate_distance_m(-45) < 1.0);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.5), "50 cm");
        assert_eq!(format_distance(3.24), "3.2 m");
        assert_eq!(format_distance(1.0), "1.0 m");
    }

    #[test]
    fn test_bands() {
        assert_eq!(ProximityBand::from_distance(0.3), ProximityBand::Near);
        assert_eq!(ProximityBand::from_distance(1.5), ProximityBand::Medium);
        assert_eq!(ProximityBand::from_distance(12.0), ProximityBand::Far);
    }

    #[test]
    fn test_summarize_orders_and_counts() {
        let mut registry = PresenceRegistry::default();
        let phone = ClassificationResult::new("Xiaomi", "Redmi", DeviceType::Phone);
        let pc = ClassificationResult::new("Intel", "PC/Laptop", DeviceType::Computer);
        let iot = ClassificationResult::new("Espressif", "ESP32/IoT", DeviceType::Other);
        registry.update(normalize("00:00:00:00:00:01").unwrap(), -80, &phone, RadioType::Wifi, 1);
        registry.update(normalize("00:00:00:00:00:02").unwrap(), -50, &pc, RadioType::Wifi, 1);
        registry.update(normalize("00:00:00:00:00:03").unwrap(), -65, &iot, RadioType::Ble, 1);

        let summary = summarize(registry.snapshot());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.phones, 1);
        assert_eq!(summary.computers, 1);
        let rssis: Vec<i32> = summary.devices.iter().map(|d| d.entry.smoothed_rssi).collect();
        assert_eq!(rssis, vec![-50, -65, -80]);
        assert_eq!(summary.devices[0].band, ProximityBand::Near);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["devices"][0]["mac"], "00:00:00:00:00:02");
        assert_eq!(json["devices"][0]["band"], "near");
    }
}

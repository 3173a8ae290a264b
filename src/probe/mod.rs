//! Probe scan reports. The wire shape is what the ESP32 sniffers POST:
//! `{ "devices": [ { "mac", "rssi", "type"?, "manuf"?, "name"? }, ... ] }`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Radio that produced a sighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RadioType {
    #[default]
    #[serde(rename = "WIFI")]
    Wifi,
    #[serde(rename = "BLE")]
    Ble,
}

impl RadioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadioType::Wifi => "WIFI",
            RadioType::Ble => "BLE",
        }
    }
}

impl std::fmt::Display for RadioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for RadioType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(RadioType::Wifi),
            Some(s) if s.eq_ignore_ascii_case("WIFI") => Ok(RadioType::Wifi),
            Some(s) if s.eq_ignore_ascii_case("BLE") => Ok(RadioType::Ble),
            Some(other) => Err(serde::de::Error::custom(format!(
                "unknown radio type '{}'",
                other
            ))),
        }
    }
}

/// One sighting from a probe. The address is still raw here; it is
/// normalized by the ingest coordinator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanReport {
    #[serde(rename = "mac")]
    pub address: String,
    #[serde(deserialize_with = "lenient_rssi")]
    pub rssi: i32,
    #[serde(rename = "type", default)]
    pub radio_type: RadioType,
    /// BLE manufacturer-specific data as a hex string
    #[serde(rename = "manuf", default, deserialize_with = "non_empty")]
    pub manufacturer_data: Option<String>,
    #[serde(rename = "name", default, deserialize_with = "non_empty")]
    pub advertised_name: Option<String>,
}

/// Probes send RSSI as an integer, but some firmware builds send floats or strings.
fn lenient_rssi<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    };

    parsed
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid rssi: {}", value)))
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Default, Deserialize)]
struct RawBatch {
    #[serde(default)]
    devices: Vec<Value>,
}

/// A decoded ingest body. Entries that do not have the report shape are
/// counted and dropped so one bad entry never costs the rest of the batch.
#[derive(Debug, Default)]
pub struct ScanBatch {
    pub reports: Vec<ScanReport>,
    pub malformed: usize,
}

impl ScanBatch {
    pub fn new(reports: Vec<ScanReport>) -> Self {
        Self {
            reports,
            malformed: 0,
        }
    }

    /// Decode a request body. Anything that is not a JSON object with a
    /// `devices` array is an empty batch.
    pub fn from_json(body: &[u8]) -> Self {
        let raw: RawBatch = match serde_json::from_slice(body) {
            Ok(raw) => raw,
            Err(e) => {
                if !body.is_empty() {
                    tracing::debug!("Unparseable scan body treated as empty batch: {}", e);
                }
                RawBatch::default()
            }
        };

        let mut batch = ScanBatch::default();
        for entry in raw.devices {
            match serde_json::from_value::<ScanReport>(entry) {
                Ok(report) => batch.reports.push(report),
                Err(e) => {
                    tracing::debug!("Skipping malformed scan report: {}", e);
                    batch.malformed += 1;
                }
            }
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_defaults() {
        let report: ScanReport =
            serde_json::from_value(json!({"mac": "d8:0d:17:aa:bb:cc", "rssi": -60})).unwrap();
        assert_eq!(report.radio_type, RadioType::Wifi);
        assert_eq!(report.manufacturer_data, None);
        assert_eq!(report.advertised_name, None);
    }

    #[test]
    fn test_report_full() {
        let report: ScanReport = serde_json::from_value(json!({
            "mac": "11:22:33:44:55:66",
            "rssi": -70,
            "type": "BLE",
            "manuf": "4C000215",
            "name": "Redmi Note 11S"
        }))
        .unwrap();
        assert_eq!(report.radio_type, RadioType::Ble);
        assert_eq!(report.manufacturer_data.as_deref(), Some("4C000215"));
        assert_eq!(report.advertised_name.as_deref(), Some("Redmi Note 11S"));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let report: ScanReport = serde_json::from_value(json!({
            "mac": "11:22:33:44:55:66", "rssi": -70, "type": "BLE", "manuf": "", "name": ""
        }))
        .unwrap();
        assert_eq!(report.manufacturer_data, None);
        assert_eq!(report.advertised_name, None);
    }

    #[test]
    fn test_lenient_rssi() {
        let as_string: ScanReport =
            serde_json::from_value(json!({"mac": "x", "rssi": "-71"})).unwrap();
        assert_eq!(as_string.rssi, -71);
        let as_float: ScanReport =
            serde_json::from_value(json!({"mac": "x", "rssi": -71.8})).unwrap();
        assert_eq!(as_float.rssi, -71);
        assert!(serde_json::from_value::<ScanReport>(json!({"mac": "x", "rssi": "loud"})).is_err());
        assert!(serde_json::from_value::<ScanReport>(json!({"mac": "x"})).is_err());
    }

    #[test]
    fn test_batch_skips_malformed_entries() {
        let body = json!({
            "devices": [
                {"mac": "d8:0d:17:aa:bb:cc", "rssi": -60},
                {"rssi": -60},
                "not an object",
                {"mac": "aa:bb:cc:dd:ee:ff", "rssi": -50, "type": "ZIGBEE"},
                {"mac": "aa:bb:cc:dd:ee:01", "rssi": -50, "type": "ble"}
            ]
        });
        let batch = ScanBatch::from_json(body.to_string().as_bytes());
        assert_eq!(batch.reports.len(), 2);
        assert_eq!(batch.malformed, 3);
        assert_eq!(batch.reports[1].radio_type, RadioType::Ble);
    }

    #[test]
    fn test_batch_garbage_is_empty() {
        assert!(ScanBatch::from_json(b"").is_empty());
        assert!(ScanBatch::from_json(b"not json").is_empty());
        assert!(ScanBatch::from_json(b"{}").is_empty());
        assert!(ScanBatch::from_json(b"{\"devices\": 5}").is_empty());
    }
}

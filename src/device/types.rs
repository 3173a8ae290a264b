use serde::{Deserialize, Serialize};

/// Coarse device category shown on the dashboard badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Phone or tablet
    #[serde(rename = "CEL")]
    Phone,
    #[serde(rename = "PC")]
    Computer,
    /// IoT and everything else we can attribute to a vendor
    #[serde(rename = "OTR")]
    Other,
    /// BLE advertiser we know nothing about
    #[serde(rename = "BLE")]
    BleGeneric,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Phone => "CEL",
            DeviceType::Computer => "PC",
            DeviceType::Other => "OTR",
            DeviceType::BleGeneric => "BLE",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Manufacturer / model / type triple attached to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub manufacturer: String,
    pub model: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

impl ClassificationResult {
    pub fn new(manufacturer: &str, model: &str, device_type: DeviceType) -> Self {
        Self {
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            device_type,
        }
    }

    /// Unknown and randomized-MAC results are guesses; anything else came
    /// from a vendor table, advertisement data or the device's own name.
    pub fn is_definitive(&self) -> bool {
        self.manufacturer != super::patterns::MANUFACTURER_UNKNOWN
            && self.manufacturer != super::patterns::MANUFACTURER_PRIVATE
    }
}

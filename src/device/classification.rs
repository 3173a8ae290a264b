//! Device classification from a normalized address plus whatever evidence the probe
//! captured (BLE manufacturer data, advertised name). Results are cached per address
//! so a device keeps its identity across sightings and presence evictions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::address::HardwareAddress;
use super::patterns::{
    BLE_RULES, MANUFACTURER_PRIVATE, MANUFACTURER_RECOGNIZED, MANUFACTURER_UNKNOWN,
    MODEL_GENERIC, MODEL_RANDOMIZED, lookup_oui, manufacturer_from_name,
};
use super::types::{ClassificationResult, DeviceType};
use crate::probe::RadioType;

/// Last known classification per address. Outlives presence entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationCache {
    entries: HashMap<HardwareAddress, ClassificationResult>,
}

impl ClassificationCache {
    pub fn get(&self, address: &HardwareAddress) -> Option<&ClassificationResult> {
        self.entries.get(address)
    }

    /// Write a classification back; callers only do this when `should_persist` was set.
    pub fn record(&mut self, address: HardwareAddress, result: ClassificationResult) {
        self.entries.insert(address, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(HardwareAddress, ClassificationResult)> for ClassificationCache {
    fn from_iter<I: IntoIterator<Item = (HardwareAddress, ClassificationResult)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Outcome of a classification. `should_persist` is set when the cache needs the
/// result written back (fresh computation or name override).
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub result: ClassificationResult,
    pub should_persist: bool,
}

/// Evidence accompanying an address in a single report
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    pub radio_type: RadioType,
    pub manufacturer_data: Option<&'a str>,
    pub advertised_name: Option<&'a str>,
}

impl<'a> Evidence<'a> {
    fn ble_manufacturer_data(&self) -> Option<&'a str> {
        match self.radio_type {
            RadioType::Ble => self.manufacturer_data.filter(|d| !d.trim().is_empty()),
            RadioType::Wifi => None,
        }
    }

    fn advertised_name(&self) -> Option<&'a str> {
        self.advertised_name.filter(|n| !n.trim().is_empty())
    }
}

/// Classify an address. Does not touch the cache.
pub fn classify(
    cache: &ClassificationCache,
    address: &HardwareAddress,
    evidence: Evidence<'_>,
) -> Classification {
    let ble_data = evidence.ble_manufacturer_data();

    let cached = cache
        .get(address)
        .filter(|c| c.is_definitive() && ble_data.is_none());

    let mut classification = match cached {
        Some(result) => Classification {
            result: result.clone(),
            should_persist: false,
        },
        None => Classification {
            result: classify_fresh(address, evidence.radio_type, ble_data),
            should_persist: true,
        },
    };

    if let Some(name) = evidence.advertised_name() {
        classification.result = apply_name_override(classification.result, name);
        classification.should_persist = true;
    }

    classification
}

/// Steps that run when the cache has nothing definitive: BLE payload, OUI table,
/// randomized-MAC heuristic, generic fallback.
fn classify_fresh(
    address: &HardwareAddress,
    radio_type: RadioType,
    ble_data: Option<&str>,
) -> ClassificationResult {
    if let Some(data) = ble_data
        && let Some(result) = classify_by_ble_data(data)
    {
        return result;
    }

    if let Some((manufacturer, model, device_type)) = lookup_oui(&address.oui()) {
        return ClassificationResult::new(manufacturer, model, device_type);
    }

    if address.is_locally_administered() {
        return ClassificationResult::new(MANUFACTURER_PRIVATE, MODEL_RANDOMIZED, DeviceType::Phone);
    }

    let device_type = match radio_type {
        RadioType::Wifi => DeviceType::Phone,
        RadioType::Ble => DeviceType::BleGeneric,
    };
    ClassificationResult::new(MANUFACTURER_UNKNOWN, MODEL_GENERIC, device_type)
}

/// Match BLE manufacturer-specific data against known company identifiers
pub(crate) fn classify_by_ble_data(data: &str) -> Option<ClassificationResult> {
    let data_upper = data.trim().to_uppercase();
    BLE_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| p.matches(&data_upper)))
        .map(|rule| ClassificationResult::new(rule.manufacturer, rule.model, rule.device_type))
}

/// The device told us its name: that beats every heuristic. Device type is kept.
fn apply_name_override(result: ClassificationResult, name: &str) -> ClassificationResult {
    let manufacturer = manufacturer_from_name(name).unwrap_or(MANUFACTURER_RECOGNIZED);
    ClassificationResult {
        manufacturer: manufacturer.to_string(),
        model: name.to_string(),
        device_type: result.device_type,
    }
}

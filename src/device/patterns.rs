//! Classification rule tables. Vendor OUI prefixes, BLE company-identifier patterns
//! and advertised-name keywords, each checked in table order.

use std::collections::HashMap;

use super::types::DeviceType;

pub(crate) const MANUFACTURER_UNKNOWN: &str = "Unknown";
pub(crate) const MANUFACTURER_PRIVATE: &str = "Private Smartphone";
pub(crate) const MANUFACTURER_RECOGNIZED: &str = "Recognized Device";

pub(crate) const MODEL_GENERIC: &str = "Generic Device";
pub(crate) const MODEL_RANDOMIZED: &str = "Randomized MAC (likely Xiaomi/Samsung)";

/// Static vendor-prefix table: (OUI, manufacturer, model, type)
pub(crate) const OUI_TABLE: &[(&str, &str, &str, DeviceType)] = &[
    // Xiaomi / Redmi / POCO
    ("D8:0D:17", "Xiaomi", "Redmi/Mi Device", DeviceType::Phone),
    ("70:5F:A3", "Xiaomi", "Redmi/POCO (Detected)", DeviceType::Phone),
    ("C0:E4:34", "Xiaomi", "POCO X3/X4", DeviceType::Phone),
    ("AC:67:B2", "POCO", "M4 Pro/F3", DeviceType::Phone),
    ("50:7B:9D", "Realme", "Realme Device", DeviceType::Phone),
    // Samsung
    ("88:DE:7C", "Samsung", "Galaxy Device", DeviceType::Phone),
    ("BC:6E:E2", "Samsung", "Galaxy Device", DeviceType::Phone),
    ("3C:7A:AA", "Samsung", "Galaxy Device (New)", DeviceType::Phone),
    ("50:5B:1D", "Samsung", "Galaxy Device (New)", DeviceType::Phone),
    ("4C:50:DD", "Samsung", "Galaxy Device (New)", DeviceType::Phone),
    ("70:B1:3D", "Samsung", "Galaxy Device", DeviceType::Phone),
    // Apple
    ("44:3B:14", "Apple", "iPhone/iPad/Mac", DeviceType::Phone),
    ("CC:20:E8", "Apple", "iPhone/iPad/Mac", DeviceType::Phone),
    ("F8:E7:B5", "Apple", "iPhone/iPad/Mac", DeviceType::Phone),
    // IoT / other
    ("E8:6D:E9", "Tuya/SmartLife", "IoT Device", DeviceType::Other),
    ("2C:96:82", "Espressif", "ESP32/IoT", DeviceType::Other),
    ("36:6B:44", "Microsoft", "Windows Device", DeviceType::Computer),
    ("08:33:ED", "Intel", "PC/Laptop", DeviceType::Computer),
];

lazy_static::lazy_static! {
    static ref OUI_INDEX: HashMap<&'static str, (&'static str, &'static str, DeviceType)> =
        OUI_TABLE
            .iter()
            .map(|(oui, manufacturer, model, device_type)| (*oui, (*manufacturer, *model, *device_type)))
            .collect();
}

/// Exact lookup of a canonical `AA:BB:CC` prefix
pub(crate) fn lookup_oui(oui: &str) -> Option<(&'static str, &'static str, DeviceType)> {
    OUI_INDEX.get(oui).copied()
}

/// How a company-identifier pattern must appear in the manufacturer data hex string
#[derive(Debug, Clone, Copy)]
pub(crate) enum HexPattern {
    Leading(&'static str),
    Anywhere(&'static str),
}

impl HexPattern {
    pub(crate) fn matches(&self, data_upper: &str) -> bool {
        match self {
            HexPattern::Leading(p) => data_upper.starts_with(p),
            HexPattern::Anywhere(p) => data_upper.contains(p),
        }
    }
}

pub(crate) struct BleRule {
    pub patterns: &'static [HexPattern],
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub device_type: DeviceType,
}

/// BLE manufacturer-data rules, first match wins. The company identifier is
/// little-endian on air, so Apple (0x004C) shows up as `4C00` at the start of
/// the payload; some probes forward it byte-swapped.
pub(crate) const BLE_RULES: &[BleRule] = &[
    BleRule {
        patterns: &[HexPattern::Leading("4C00"), HexPattern::Anywhere("004C")],
        manufacturer: "Apple",
        model: "iBeacon / iPhone",
        device_type: DeviceType::Phone,
    },
    BleRule {
        patterns: &[HexPattern::Leading("0600")],
        manufacturer: "Microsoft",
        model: "Windows Device",
        device_type: DeviceType::Computer,
    },
];

/// Advertised-name keywords (lowercase) mapped to a manufacturer.
/// Order matters: Xiaomi family, then Samsung, then Apple.
pub(crate) const NAME_KEYWORD_RULES: &[(&[&str], &str)] = &[
    (&["redmi", "poco", "mi "], "Xiaomi"),
    (&["galaxy", "samsung"], "Samsung"),
    (&["iphone", "ipad"], "Apple"),
];

/// Map an advertised device name to a manufacturer via case-insensitive substring match
pub(crate) fn manufacturer_from_name(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();

    for (keywords, manufacturer) in NAME_KEYWORD_RULES {
        for keyword in *keywords {
            if lower.contains(keyword) {
                return Some(manufacturer);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_oui() {
        assert_eq!(
            lookup_oui("D8:0D:17"),
            Some(("Xiaomi", "Redmi/Mi Device", DeviceType::Phone))
        );
        assert_eq!(
            lookup_oui("08:33:ED"),
            Some(("Intel", "PC/Laptop", DeviceType::Computer))
        );
        assert_eq!(lookup_oui("00:00:00"), None);
        // Exact match only, canonical form
        assert_eq!(lookup_oui("d8:0d:17"), None);
    }

    #[test]
    fn test_oui_table_has_no_duplicate_prefixes() {
        assert_eq!(OUI_INDEX.len(), OUI_TABLE.len());
    }

    #[test]
    fn test_manufacturer_from_name() {
        assert_eq!(manufacturer_from_name("Redmi Note 11S"), Some("Xiaomi"));
        assert_eq!(manufacturer_from_name("POCO F5"), Some("Xiaomi"));
        assert_eq!(manufacturer_from_name("Mi Band"), Some("Xiaomi"));
        assert_eq!(manufacturer_from_name("Galaxy Buds2"), Some("Samsung"));
        assert_eq!(manufacturer_from_name("[TV] Samsung Q60"), Some("Samsung"));
        assert_eq!(manufacturer_from_name("Ana's iPhone"), Some("Apple"));
        assert_eq!(manufacturer_from_name("JBL Flip 5"), None);
        // "mi " needs the trailing space
        assert_eq!(manufacturer_from_name("Miband"), None);
    }

    #[test]
    fn test_name_priority_order() {
        // Xiaomi keywords are checked before Apple ones
        assert_eq!(manufacturer_from_name("Redmi iPhone clone"), Some("Xiaomi"));
        assert_eq!(manufacturer_from_name("Galaxy iPad case"), Some("Samsung"));
    }

    #[test]
    fn test_hex_patterns() {
        assert!(HexPattern::Leading("4C00").matches("4C000215"));
        assert!(!HexPattern::Leading("4C00").matches("FF4C00"));
        assert!(HexPattern::Anywhere("004C").matches("FF004C12"));
    }
}

//! Hardware address normalization. Probes report MACs in whatever shape their
//! radio stack hands them over (lowercase, dash separated, bare hex); everything
//! downstream keys on the canonical `AA:BB:CC:DD:EE:FF` form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RadarError;

/// Canonical 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HardwareAddress([u8; 6]);

impl HardwareAddress {
    /// Vendor prefix (first three octets) in canonical form, e.g. `D8:0D:17`
    pub fn oui(&self) -> String {
        format!("{:02X}:{:02X}:{:02X}", self.0[0], self.0[1], self.0[2])
    }

    /// Locally administered addresses have bit 0x02 of the first octet set.
    /// Phones randomize their MAC this way, so the OUI says nothing about the vendor.
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

/// Strip everything that is not a hex digit, uppercase, and require exactly 12 digits.
pub fn normalize(raw: &str) -> Result<HardwareAddress, RadarError> {
    let nibbles: Vec<u8> = raw
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| d as u8)
        .collect();

    if nibbles.len() != 12 {
        return Err(RadarError::InvalidAddress(raw.to_string()));
    }

    let mut octets = [0u8; 6];
    for (octet, pair) in octets.iter_mut().zip(nibbles.chunks(2)) {
        *octet = (pair[0] << 4) | pair[1];
    }

    Ok(HardwareAddress(octets))
}

impl FromStr for HardwareAddress {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

impl Serialize for HardwareAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HardwareAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        normalize(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercase_colon() {
        let addr = normalize("d8:0d:17:aa:bb:cc").unwrap();
        assert_eq!(addr.to_string(), "D8:0D:17:AA:BB:CC");
    }

    #[test]
    fn test_normalize_other_separators() {
        assert_eq!(
            normalize("d8-0d-17-aa-bb-cc").unwrap().to_string(),
            "D8:0D:17:AA:BB:CC"
        );
        assert_eq!(
            normalize("d80d17aabbcc").unwrap().to_string(),
            "D8:0D:17:AA:BB:CC"
        );
        assert_eq!(
            normalize(" D8.0D.17 AA.BB.CC ").unwrap().to_string(),
            "D8:0D:17:AA:BB:CC"
        );
    }

    #[test]
    fn test_normalize_rejects_wrong_length() {
        assert!(normalize("xyz").is_err());
        assert!(normalize("").is_err());
        assert!(normalize("d8:0d:17:aa:bb").is_err());
        assert!(normalize("d8:0d:17:aa:bb:cc:dd").is_err());
    }

    #[test]
    fn test_oui_and_local_bit() {
        let addr = normalize("d8:0d:17:11:22:33").unwrap();
        assert_eq!(addr.oui(), "D8:0D:17");
        assert!(!addr.is_locally_administered());

        // 0xDA = 1101_1010, bit 0x02 set
        let random = normalize("da:11:22:33:44:55").unwrap();
        assert!(random.is_locally_administered());
        assert!(normalize("02:00:00:00:00:01").unwrap().is_locally_administered());
    }

    #[test]
    fn test_serde_as_string() {
        let addr = normalize("aa:bb:cc:dd:ee:ff").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"AA:BB:CC:DD:EE:FF\"");
        let back: HardwareAddress = serde_json::from_str("\"aa-bb-cc-dd-ee-ff\"").unwrap();
        assert_eq!(back, addr);
    }
}

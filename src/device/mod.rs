mod address;
mod classification;
mod patterns;
mod types;

pub use address::{HardwareAddress, normalize};
pub use classification::{Classification, ClassificationCache, Evidence, classify};
pub use types::{ClassificationResult, DeviceType};

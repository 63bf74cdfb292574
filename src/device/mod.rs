pub mod fingerprint;

pub use fingerprint::{DeviceAttributes, DeviceClass, DeviceFingerprint, classify, fingerprint};

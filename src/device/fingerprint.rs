//! Coarse device identification.
//!
//! Hashes the attributes a browser exposes about its device into a short,
//! stable identifier. Good enough to tell "same phone as last week" apart
//! from "new laptop"; not a tracking-grade fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use strum::Display;

const FINGERPRINT_LEN: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAttributes {
    pub user_agent: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub color_depth: u8,
    #[serde(default)]
    pub hardware_concurrency: u16,
    #[serde(default)]
    pub touch_support: bool,
}

impl DeviceAttributes {
    /// Stable text form; every field is normalised so cosmetic differences
    /// (case, surrounding whitespace) hash identically.
    fn canonical(&self) -> String {
        // Screens report portrait or landscape depending on rotation.
        let (short, long) = if self.screen_width <= self.screen_height {
            (self.screen_width, self.screen_height)
        } else {
            (self.screen_height, self.screen_width)
        };
        [
            normalise(&self.user_agent),
            normalise(&self.platform),
            normalise(&self.language),
            normalise(&self.timezone),
            format!("{short}x{long}"),
            self.color_depth.to_string(),
            self.hardware_concurrency.to_string(),
            u8::from(self.touch_support).to_string(),
        ]
        .join("|")
    }
}

fn normalise(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn fingerprint(attributes: &DeviceAttributes) -> DeviceFingerprint {
    let digest = hex::encode(Sha256::digest(attributes.canonical().as_bytes()));
    DeviceFingerprint(digest[..FINGERPRINT_LEN].to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

pub fn classify(attributes: &DeviceAttributes) -> DeviceClass {
    let ua = attributes.user_agent.to_lowercase();

    if ua.contains("ipad") || ua.contains("tablet") || (ua.contains("android") && !ua.contains("mobile"))
    {
        return DeviceClass::Tablet;
    }
    if ua.contains("iphone") || ua.contains("mobile") || ua.contains("android") {
        return DeviceClass::Mobile;
    }
    // iPadOS reports a desktop Safari user agent but exposes touch.
    if ua.contains("macintosh") && attributes.touch_support {
        return DeviceClass::Tablet;
    }
    DeviceClass::Desktop
}

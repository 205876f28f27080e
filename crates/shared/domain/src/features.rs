use crate::constants::{ASSETS, PROJECTS, SHARE, SIGNER, VERSIONS};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;

bitflags! {
    /// Represents a set of enabled feature slices.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FeatureSet: u32 {
        const ASSETS = 1 << 0;
        const PROJECTS = 1 << 1;
        const VERSIONS = 1 << 2;
        const SIGNER = 1 << 3;
        const SHARE = 1 << 4;

        const ALL = Self::ASSETS.bits()
            | Self::PROJECTS.bits()
            | Self::VERSIONS.bits()
            | Self::SIGNER.bits()
            | Self::SHARE.bits();
    }
}

impl From<&str> for FeatureSet {
    fn from(s: &str) -> Self {
        match s {
            ASSETS => Self::ASSETS,
            PROJECTS => Self::PROJECTS,
            VERSIONS => Self::VERSIONS,
            SIGNER => Self::SIGNER,
            SHARE => Self::SHARE,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

impl From<u32> for FeatureSet {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl Serialize for FeatureSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}

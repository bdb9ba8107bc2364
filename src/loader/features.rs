use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Optional data sources the current account is licensed for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Deserialize, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AvailableFeature {
    RecordingsPerformance,
}

/// Capability gate consulted once metadata has loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableFeatures {
    enabled: BTreeSet<AvailableFeature>,
}

impl AvailableFeatures {
    #[must_use]
    pub fn new<I>(features: I) -> Self
    where
        I: IntoIterator<Item = AvailableFeature>,
    {
        Self {
            enabled: features.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn has(&self, feature: AvailableFeature) -> bool {
        self.enabled.contains(&feature)
    }

    #[must_use]
    pub fn performance_events_enabled(&self) -> bool {
        self.has(AvailableFeature::RecordingsPerformance)
    }
}

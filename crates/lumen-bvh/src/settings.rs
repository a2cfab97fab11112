//! Builder selection settings.

use serde::{Deserialize, Serialize};

use crate::build::SortPool;
use crate::error::{BvhError, Result};
use crate::registry::{BuilderRegistry, SAH_MA};

/// Settings controlling how a scene's hierarchy is built.
///
/// Deserializes from the settings block of a scene file, where the builder
/// id lives under `bvhImplementation`. Missing keys take their defaults and
/// unrelated keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BvhSettings {
    /// Builder id, as registered in a [`BuilderRegistry`].
    pub bvh_implementation: String,
    /// Worker count for the sort pool. `None` sorts on rayon's global pool.
    pub sort_threads: Option<usize>,
}

impl Default for BvhSettings {
    fn default() -> Self {
        Self {
            bvh_implementation: SAH_MA.to_string(),
            sort_threads: None,
        }
    }
}

impl BvhSettings {
    /// Parse settings from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON object, such as a scene file.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.bvh_implementation.trim().is_empty() {
            return Err(BvhError::InvalidSettings(
                "bvhImplementation must not be empty".into(),
            ));
        }
        if self.sort_threads == Some(0) {
            return Err(BvhError::InvalidSettings(
                "sortThreads must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Check that `registry` knows the configured builder.
    ///
    /// Lookups fall back to the default builder, so this is the only place
    /// an unknown id surfaces as an error.
    pub fn validate_against(&self, registry: &BuilderRegistry) -> Result<()> {
        self.validate()?;
        if registry.contains(&self.bvh_implementation) {
            Ok(())
        } else {
            Err(BvhError::UnknownBuilder(self.bvh_implementation.clone()))
        }
    }

    /// The sort pool these settings ask for.
    pub fn sort_pool(&self) -> Result<SortPool> {
        match self.sort_threads {
            Some(threads) => SortPool::with_threads(threads),
            None => Ok(SortPool::global()),
        }
    }
}

use serde::{Deserialize, Serialize};
use vol_types::AddressWidth;

use crate::error::{ConfigError, ConfigResult};

/// Settings for the native connector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    /// Address width of containers created without an explicit width.
    pub default_address_width: AddressWidth,
    /// Whether new groups keep a creation-order link index by default.
    pub track_creation_order: bool,
    /// Soft and external link hops allowed while resolving one path.
    pub max_soft_link_traversals: usize,
    /// Address of the first object in a new container.
    pub superblock_size: u64,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            default_address_width: AddressWidth::EIGHT,
            track_creation_order: false,
            max_soft_link_traversals: 16,
            superblock_size: 96,
        }
    }
}

impl NativeConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: NativeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.superblock_size == 0 {
            return Err(ConfigError::Invalid(
                "superblock_size must be non-zero".into(),
            ));
        }
        if self.superblock_size > self.default_address_width.max_address() {
            return Err(ConfigError::Invalid(format!(
                "superblock_size {} does not fit in {}-byte addresses",
                self.superblock_size, self.default_address_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = NativeConfig::default();
        assert_eq!(c.default_address_width, AddressWidth::EIGHT);
        assert!(!c.track_creation_order);
        assert_eq!(c.max_soft_link_traversals, 16);
        assert_eq!(c.superblock_size, 96);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = NativeConfig::from_toml_str("default_address_width = 4\n").unwrap();
        assert_eq!(c.default_address_width, AddressWidth::FOUR);
        assert_eq!(c.max_soft_link_traversals, 16);
    }

    #[test]
    fn out_of_range_width_is_rejected() {
        assert!(NativeConfig::from_toml_str("default_address_width = 9\n").is_err());
        assert!(NativeConfig::from_toml_str("default_address_width = 1\n").is_err());
    }

    #[test]
    fn zero_superblock_is_invalid() {
        let err = NativeConfig::from_toml_str("superblock_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let c = NativeConfig {
            track_creation_order: true,
            ..Default::default()
        };
        let text = toml::to_string(&c).unwrap();
        assert_eq!(NativeConfig::from_toml_str(&text).unwrap(), c);
    }
}

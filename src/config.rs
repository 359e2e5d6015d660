//! Driver configuration
//!
//! Read from `$XDG_CONFIG_HOME/nattiq/driver.toml`. Every field is optional;
//! a missing file means builtin defaults.
//!
//! ```toml
//! device = "usb:"
//! default_profile = "note"
//!
//! [profiles.mokey]
//! default_cell_count = 20
//!
//! [[profiles.mokey.key_table_overrides]]
//! columns = 14
//! from = "mokey"
//! to = "note"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use nattiq_braille::{
    BrailleError, DeviceIdentity, DotTable, KeyTableOverride, ProtocolProfile, ProtocolSet,
};
use nattiq_transport::{DeviceLocator, TransportError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors loading or applying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown profile in configuration: {0}")]
    UnknownProfile(String),

    #[error(transparent)]
    Protocol(#[from] BrailleError),

    #[error("device: {0}")]
    Device(#[from] TransportError),
}

/// Per-profile adjustments; unset fields keep the builtin value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub model_name: Option<String>,
    pub resource_name_prefix: Option<String>,
    pub default_cell_count: Option<u8>,
    /// Replaces the probe list; an empty list disables probing
    pub identities: Option<Vec<DeviceIdentity>>,
    #[serde(default)]
    pub key_table_overrides: Vec<KeyTableOverride>,
    pub dot_table: Option<DotTable>,
}

impl ProfileConfig {
    fn apply(&self, profile: &mut ProtocolProfile) {
        if let Some(name) = &self.model_name {
            profile.model_name = name.clone();
        }
        if let Some(prefix) = &self.resource_name_prefix {
            profile.resource_name_prefix = Some(prefix.clone());
        }
        if let Some(cells) = self.default_cell_count {
            profile.default_cell_count = cells;
        }
        if let Some(ids) = &self.identities {
            profile.identities = if ids.is_empty() {
                None
            } else {
                Some(ids.clone())
            };
        }
        profile
            .key_table_overrides
            .extend(self.key_table_overrides.iter().copied());
        if let Some(dots) = self.dot_table {
            profile.dot_table = dots;
        }
    }
}

/// Top-level driver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Device locator used when `--device` is not given
    pub device: Option<String>,
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

impl DriverConfig {
    /// Parse from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load an explicit file, or the default file if it exists
    ///
    /// An explicit path must exist; the default path may be absent.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    debug!("loading {}", path.display());
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// The configured device locator, `Any` when unset
    pub fn locator(&self) -> Result<DeviceLocator, ConfigError> {
        match &self.device {
            Some(device) => Ok(device.parse()?),
            None => Ok(DeviceLocator::Any),
        }
    }

    /// Builtin profiles with this configuration applied
    pub fn protocol_set(&self) -> Result<ProtocolSet, ConfigError> {
        let builtin = ProtocolSet::builtin();
        let mut profiles = builtin.profiles().to_vec();

        for (name, overrides) in &self.profiles {
            let profile = profiles
                .iter_mut()
                .find(|p| p.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?;
            overrides.apply(profile);
        }

        let default = self
            .default_profile
            .clone()
            .unwrap_or_else(|| builtin.default_profile().name.clone());
        Ok(ProtocolSet::new(profiles, &default)?)
    }
}

/// Path to the default configuration file
pub fn default_config_path() -> PathBuf {
    config_dir().join("driver.toml")
}

fn config_dir() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("nattiq")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config/nattiq")
    } else {
        PathBuf::from("/etc/nattiq")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nattiq_braille::KeyTableId;

    #[test]
    fn empty_config_is_builtin() {
        let config = DriverConfig::from_toml("").unwrap();
        assert_eq!(config, DriverConfig::default());
        let set = config.protocol_set().unwrap();
        assert_eq!(set.default_profile().name, "note");
        assert_eq!(set.profiles().len(), 2);
        assert_eq!(config.locator().unwrap(), DeviceLocator::Any);
    }

    #[test]
    fn profile_overrides_apply() {
        let config = DriverConfig::from_toml(
            r#"
            device = "usb:ABC123"
            default_profile = "mokey"

            [profiles.mokey]
            default_cell_count = 20
            identities = [
                { id1 = 0x10, id2 = 0x20, key_table = "mokey" },
                { id1 = 0, id2 = 0, key_table = "mokey" },
            ]

            [[profiles.mokey.key_table_overrides]]
            columns = 14
            from = "mokey"
            to = "note"
            "#,
        )
        .unwrap();

        let set = config.protocol_set().unwrap();
        let mokey = set.default_profile();
        assert_eq!(mokey.name, "mokey");
        assert_eq!(mokey.default_cell_count, 20);
        assert_eq!(mokey.identities.as_ref().map(Vec::len), Some(2));
        assert_eq!(mokey.bind_key_table(None, 14), KeyTableId::Note);
        // Note is untouched
        assert_eq!(set.find("note"), Some(&ProtocolProfile::note()));
        assert_eq!(
            config.locator().unwrap(),
            DeviceLocator::Usb {
                serial: Some("ABC123".into())
            }
        );
    }

    #[test]
    fn empty_identity_list_disables_probing() {
        let config = DriverConfig::from_toml("[profiles.note]\nidentities = []\n").unwrap();
        let set = config.protocol_set().unwrap();
        assert_eq!(set.find("note").and_then(|p| p.identities.clone()), None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let unknown = DriverConfig::from_toml("[profiles.beetle]\ndefault_cell_count = 14\n")
            .unwrap();
        assert!(matches!(
            unknown.protocol_set(),
            Err(ConfigError::UnknownProfile(_))
        ));

        let too_wide = DriverConfig::from_toml("[profiles.note]\ndefault_cell_count = 80\n")
            .unwrap();
        assert!(matches!(too_wide.protocol_set(), Err(ConfigError::Protocol(_))));

        let wildcard_first = DriverConfig::from_toml(
            "[profiles.note]\nidentities = [{ id1 = 0, id2 = 0, key_table = \"note\" }, { id1 = 1, id2 = 2, key_table = \"note\" }]\n",
        )
        .unwrap();
        assert!(wildcard_first.protocol_set().is_err());

        assert!(matches!(
            DriverConfig::from_toml("colour = \"blue\"\n"),
            Err(ConfigError::Parse(_))
        ));

        let bad_device = DriverConfig::from_toml("device = \"carrier-pigeon:1\"\n").unwrap();
        assert!(matches!(bad_device.locator(), Err(ConfigError::Device(_))));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/nattiq/driver.toml");
        assert!(matches!(
            DriverConfig::load_or_default(Some(missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}

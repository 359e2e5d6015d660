//! Protocol profiles and their selection
//!
//! A [`ProtocolSet`] is built once, validated, and handed to the driver at
//! construction. Nothing in it changes while a display is connected.

use nattiq_transport::ChannelInfo;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dots::{DotTable, ISO_11548_1};
use crate::error::BrailleError;
use crate::keys::KeyTableId;
use crate::protocol::MAXIMUM_CELL_COUNT;

/// Identity bytes a device echoes back when probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub id1: u8,
    pub id2: u8,
    /// Key table to bind when this identity is confirmed
    pub key_table: KeyTableId,
}

impl DeviceIdentity {
    pub const fn new(id1: u8, id2: u8, key_table: KeyTableId) -> Self {
        Self { id1, id2, key_table }
    }

    /// Accepted without asking the device
    pub const fn wildcard(key_table: KeyTableId) -> Self {
        Self::new(0, 0, key_table)
    }

    pub fn is_wildcard(&self) -> bool {
        self.id1 == 0 && self.id2 == 0
    }
}

/// Builtin identity bytes
pub mod identity {
    use super::DeviceIdentity;
    use crate::keys::KeyTableId;

    /// "MK"
    pub const MOKEY: DeviceIdentity = DeviceIdentity::new(0x4D, 0x4B, KeyTableId::Mokey);
    /// "NT"
    pub const NOTE: DeviceIdentity = DeviceIdentity::new(0x4E, 0x54, KeyTableId::Note);
}

/// Replace a key table on displays of a given width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTableOverride {
    pub columns: u8,
    pub from: KeyTableId,
    pub to: KeyTableId,
}

/// Everything the driver needs to know about one device model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolProfile {
    /// Short lowercase name used by hints and configuration
    pub name: String,
    /// Name reported to the user
    pub model_name: String,
    /// Resource names starting with this (any case) select the profile
    pub resource_name_prefix: Option<String>,
    pub key_table: KeyTableId,
    /// Identities to probe, in order; `None` skips probing
    pub identities: Option<Vec<DeviceIdentity>>,
    /// Cell count used when the device does not report one
    pub default_cell_count: u8,
    pub key_table_overrides: Vec<KeyTableOverride>,
    pub dot_table: DotTable,
}

impl ProtocolProfile {
    /// Nattiq Note
    pub fn note() -> Self {
        Self {
            name: "note".into(),
            model_name: "Nattiq Note".into(),
            resource_name_prefix: Some("Note".into()),
            key_table: KeyTableId::Note,
            identities: Some(vec![
                identity::MOKEY,
                identity::NOTE,
                DeviceIdentity::wildcard(KeyTableId::Note),
            ]),
            default_cell_count: 32,
            key_table_overrides: Vec::new(),
            dot_table: ISO_11548_1,
        }
    }

    /// Nattiq Mokey
    pub fn mokey() -> Self {
        Self {
            name: "mokey".into(),
            model_name: "Nattiq Mokey".into(),
            resource_name_prefix: Some("Mokey".into()),
            key_table: KeyTableId::Mokey,
            identities: None,
            default_cell_count: 32,
            key_table_overrides: Vec::new(),
            dot_table: ISO_11548_1,
        }
    }

    /// Choose the key table for a connected display
    ///
    /// Starts from the probed table, else the profile's own, then applies the
    /// first override matching the display width.
    pub fn bind_key_table(&self, probed: Option<KeyTableId>, columns: u8) -> KeyTableId {
        let table = probed.unwrap_or(self.key_table);
        match self
            .key_table_overrides
            .iter()
            .find(|o| o.columns == columns && o.from == table)
        {
            Some(o) => {
                info!(
                    "{} columns: key table {} replaced by {}",
                    columns, o.from, o.to
                );
                o.to
            }
            None => table,
        }
    }

    fn validate(&self) -> Result<(), BrailleError> {
        let invalid = |msg: String| BrailleError::InvalidConfig(format!("{}: {}", self.name, msg));

        if self.name.is_empty() {
            return Err(BrailleError::InvalidConfig("profile with empty name".into()));
        }
        if !(1..=MAXIMUM_CELL_COUNT).contains(&self.default_cell_count) {
            return Err(invalid(format!(
                "default cell count {} outside 1..={}",
                self.default_cell_count, MAXIMUM_CELL_COUNT
            )));
        }
        if let Some(ids) = &self.identities {
            if let Some(pos) = ids.iter().position(|i| i.is_wildcard()) {
                if pos != ids.len() - 1 {
                    return Err(invalid("wildcard identity must be last".into()));
                }
            }
        }
        if !self.dot_table.is_permutation() {
            return Err(invalid("dot table is not a permutation".into()));
        }
        if let Some(prefix) = &self.resource_name_prefix {
            if prefix.is_empty() {
                return Err(invalid("empty resource name prefix".into()));
            }
        }
        Ok(())
    }
}

/// The profiles a driver may choose from
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolSet {
    profiles: Vec<ProtocolProfile>,
    default_profile: String,
}

impl Default for ProtocolSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProtocolSet {
    /// Note and Mokey, Note by default
    pub fn builtin() -> Self {
        Self {
            profiles: vec![ProtocolProfile::note(), ProtocolProfile::mokey()],
            default_profile: "note".into(),
        }
    }

    /// Build a validated set
    pub fn new(profiles: Vec<ProtocolProfile>, default_profile: &str) -> Result<Self, BrailleError> {
        if profiles.is_empty() {
            return Err(BrailleError::InvalidConfig("no profiles".into()));
        }
        for (i, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if profiles[..i]
                .iter()
                .any(|p| p.name.eq_ignore_ascii_case(&profile.name))
            {
                return Err(BrailleError::InvalidConfig(format!(
                    "duplicate profile: {}",
                    profile.name
                )));
            }
        }

        let set = Self {
            profiles,
            default_profile: default_profile.to_string(),
        };
        if set.find(default_profile).is_none() {
            return Err(BrailleError::InvalidConfig(format!(
                "default profile '{}' does not exist",
                default_profile
            )));
        }
        Ok(set)
    }

    pub fn profiles(&self) -> &[ProtocolProfile] {
        &self.profiles
    }

    /// Look up a profile by name, ignoring case
    pub fn find(&self, name: &str) -> Option<&ProtocolProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn default_profile(&self) -> &ProtocolProfile {
        self.find(&self.default_profile)
            .unwrap_or(&self.profiles[0])
    }

    /// Pick the profile for a connected channel
    ///
    /// The discovery hint wins, then the first profile whose prefix starts
    /// the resource name, then the default.
    pub fn select(&self, info: &ChannelInfo) -> &ProtocolProfile {
        if let Some(hint) = info.profile_hint.as_deref() {
            match self.find(hint) {
                Some(profile) => {
                    debug!("profile from channel hint: {}", profile.name);
                    return profile;
                }
                None => debug!("channel hint names unknown profile: {}", hint),
            }
        }

        if let Some(resource) = info.resource_name.as_deref() {
            let matched = self.profiles.iter().find(|p| {
                p.resource_name_prefix
                    .as_deref()
                    .is_some_and(|prefix| starts_with_ignore_case(resource, prefix))
            });
            if let Some(profile) = matched {
                debug!("profile from resource name '{}': {}", resource, profile.name);
                return profile;
            }
        }

        self.default_profile()
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nattiq_transport::TransportType;

    fn info(resource: Option<&str>, hint: Option<&str>) -> ChannelInfo {
        ChannelInfo {
            vid: 0x04D8,
            pid: 0xEB69,
            transport_type: TransportType::Mock,
            device_path: "test".into(),
            serial: None,
            resource_name: resource.map(String::from),
            profile_hint: hint.map(String::from),
        }
    }

    #[test]
    fn builtin_set_is_valid() {
        let builtin = ProtocolSet::builtin();
        let rebuilt = ProtocolSet::new(builtin.profiles().to_vec(), "note").unwrap();
        assert_eq!(rebuilt.default_profile().model_name, "Nattiq Note");
        assert!(builtin.find("MOKEY").is_some());
    }

    #[test]
    fn hint_wins_over_resource_name() {
        let set = ProtocolSet::builtin();
        let p = set.select(&info(Some("Note 40"), Some("mokey")));
        assert_eq!(p.name, "mokey");
    }

    #[test]
    fn resource_prefix_is_case_insensitive() {
        let set = ProtocolSet::builtin();
        assert_eq!(set.select(&info(Some("MOKEY-20"), None)).name, "mokey");
        assert_eq!(set.select(&info(Some("note"), None)).name, "note");
    }

    #[test]
    fn falls_back_to_default() {
        let set = ProtocolSet::builtin();
        assert_eq!(set.select(&info(None, None)).name, "note");
        assert_eq!(set.select(&info(Some("Mo"), None)).name, "note");
        assert_eq!(set.select(&info(Some("Üñí"), None)).name, "note");
        assert_eq!(set.select(&info(None, Some("beetle"))).name, "note");
    }

    #[test]
    fn rejects_misplaced_wildcard() {
        let mut note = ProtocolProfile::note();
        note.identities = Some(vec![
            DeviceIdentity::wildcard(KeyTableId::Note),
            identity::NOTE,
        ]);
        assert!(matches!(
            ProtocolSet::new(vec![note], "note"),
            Err(BrailleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_bad_cell_count_and_missing_default() {
        let mut mokey = ProtocolProfile::mokey();
        mokey.default_cell_count = 41;
        assert!(ProtocolSet::new(vec![mokey], "mokey").is_err());

        assert!(ProtocolSet::new(vec![ProtocolProfile::mokey()], "note").is_err());
        assert!(ProtocolSet::new(vec![], "note").is_err());
        assert!(ProtocolSet::new(
            vec![ProtocolProfile::note(), ProtocolProfile::note()],
            "note"
        )
        .is_err());
    }

    #[test]
    fn binds_probed_table_first() {
        let note = ProtocolProfile::note();
        assert_eq!(note.bind_key_table(None, 32), KeyTableId::Note);
        assert_eq!(
            note.bind_key_table(Some(KeyTableId::Mokey), 32),
            KeyTableId::Mokey
        );
    }

    #[test]
    fn overrides_apply_by_width() {
        let mut mokey = ProtocolProfile::mokey();
        mokey.key_table_overrides.push(KeyTableOverride {
            columns: 14,
            from: KeyTableId::Mokey,
            to: KeyTableId::Note,
        });
        assert_eq!(mokey.bind_key_table(None, 14), KeyTableId::Note);
        assert_eq!(mokey.bind_key_table(None, 32), KeyTableId::Mokey);
        // Overrides are scoped to their profile
        assert_eq!(
            ProtocolProfile::note().bind_key_table(Some(KeyTableId::Mokey), 14),
            KeyTableId::Mokey
        );
    }
}

//! Key names and key tables
//!
//! Navigation keys arrive as a 32-bit set, one bit per key. Routing keys
//! arrive one at a time as a cell index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Navigation key bit numbers
pub mod key {
    pub const DOT1: u8 = 0;
    pub const DOT2: u8 = 1;
    pub const DOT3: u8 = 2;
    pub const DOT4: u8 = 3;
    pub const DOT5: u8 = 4;
    pub const DOT6: u8 = 5;
    pub const DOT7: u8 = 6;
    pub const DOT8: u8 = 7;
    pub const SPACE: u8 = 8;
    pub const F1: u8 = 9;
    pub const F2: u8 = 10;
    pub const F3: u8 = 11;
    pub const F4: u8 = 12;
    pub const BACKWARD: u8 = 13;
    pub const FORWARD: u8 = 14;
}

/// Key groups reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum KeyGroup {
    NavigationKeys = 0,
    RoutingKeys = 1,
}

/// A named navigation key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyName {
    pub number: u8,
    pub name: &'static str,
}

const fn k(number: u8, name: &'static str) -> KeyName {
    KeyName { number, name }
}

const BRAILLE_KEYS: &[KeyName] = &[
    k(key::DOT1, "Dot1"),
    k(key::DOT2, "Dot2"),
    k(key::DOT3, "Dot3"),
    k(key::DOT4, "Dot4"),
    k(key::DOT5, "Dot5"),
    k(key::DOT6, "Dot6"),
    k(key::DOT7, "Dot7"),
    k(key::DOT8, "Dot8"),
    k(key::SPACE, "Space"),
];

const PAN_KEYS: &[KeyName] = &[k(key::BACKWARD, "Backward"), k(key::FORWARD, "Forward")];

const FUNCTION_KEYS: &[KeyName] = &[
    k(key::F1, "F1"),
    k(key::F2, "F2"),
    k(key::F3, "F3"),
    k(key::F4, "F4"),
];

/// Name of the routing key group
pub const ROUTING_KEY_NAME: &str = "RoutingKey";

/// Key tables the devices use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyTableId {
    /// Routing keys plus panning keys
    Note,
    /// Braille keyboard plus function keys
    Mokey,
}

impl KeyTableId {
    pub const ALL: [KeyTableId; 2] = [KeyTableId::Note, KeyTableId::Mokey];

    pub fn name(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Mokey => "mokey",
        }
    }

    /// Key name sections making up this table
    fn sections(self) -> &'static [&'static [KeyName]] {
        match self {
            Self::Note => &[PAN_KEYS],
            Self::Mokey => &[BRAILLE_KEYS, FUNCTION_KEYS],
        }
    }

    pub fn has_routing_keys(self) -> bool {
        matches!(self, Self::Note)
    }

    /// Navigation keys this table knows, in table order
    pub fn navigation_keys(self) -> impl Iterator<Item = KeyName> {
        self.sections().iter().flat_map(|s| s.iter().copied())
    }

    pub fn key_name(self, number: u8) -> Option<&'static str> {
        self.sections()
            .iter()
            .flat_map(|s| s.iter())
            .find(|k| k.number == number)
            .map(|k| k.name)
    }

    /// Names of the keys set in `bits`, lowest bit first
    ///
    /// Bits this table has no name for are reported as `Key<N>`.
    pub fn pressed_keys(self, bits: u32) -> Vec<String> {
        (0..32u8)
            .filter(|n| bits & (1 << n) != 0)
            .map(|n| match self.key_name(n) {
                Some(name) => name.to_string(),
                None => format!("Key{n}"),
            })
            .collect()
    }
}

impl fmt::Display for KeyTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyTableId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "mokey" => Ok(Self::Mokey),
            _ => Err(format!("Unknown key table: {}", s)),
        }
    }
}

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

pub const GUID_LENGTH: usize = 16;
pub const GUID_STRING_LENGTH: usize = GUID_LENGTH * 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuidError {
    #[error("expected 32 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex digit {0:?}")]
    InvalidDigit(char),
}

/// Identifier keying every engine entity; printed as 32 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Guid([u8; GUID_LENGTH]);

impl Guid {
    pub fn new() -> Self {
        Self(*Uuid::new_v4().as_bytes())
    }

    pub const fn nil() -> Self {
        Self([0; GUID_LENGTH])
    }

    pub const fn from_bytes(bytes: [u8; GUID_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; GUID_LENGTH] {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Guid({})", self)
    }
}

impl FromStr for Guid {
    type Err = GuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != GUID_STRING_LENGTH {
            return Err(GuidError::InvalidLength(len));
        }

        let mut bytes = [0u8; GUID_LENGTH];
        let mut digits = s.chars();
        for byte in bytes.iter_mut() {
            let hi = hex_value(digits.next())?;
            let lo = hex_value(digits.next())?;
            *byte = (hi << 4) | lo;
        }
        Ok(Guid(bytes))
    }
}

fn hex_value(c: Option<char>) -> Result<u8, GuidError> {
    let c = c.ok_or(GuidError::InvalidLength(0))?;
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or(GuidError::InvalidDigit(c))
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "engine")]
impl From<gnucash_sys::GncGUID> for Guid {
    fn from(g: gnucash_sys::GncGUID) -> Self {
        Guid(g.reserved)
    }
}

#[cfg(feature = "engine")]
impl From<Guid> for gnucash_sys::GncGUID {
    fn from(g: Guid) -> Self {
        gnucash_sys::GncGUID { reserved: g.0 }
    }
}

//! Louver position codes understood by the unit.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Vertical louver position.
///
/// `0` lets the unit pick automatically; `1..=8` are fixed mechanical
/// positions, `1` highest and `5` lowest. `7` and `8` form the default
/// cycling pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LouverPosition(u8);

impl LouverPosition {
    pub const MAX_CODE: u8 = 8;

    pub fn new(code: u8) -> Result<Self, ConfigError> {
        if code > Self::MAX_CODE {
            return Err(ConfigError::invalid(format!(
                "louver position {} is outside 0..={}",
                code,
                Self::MAX_CODE
            )));
        }
        Ok(Self(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Wire representation used for the device property value.
    pub fn as_value(self) -> String {
        self.0.to_string()
    }
}

impl FromStr for LouverPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .parse::<u8>()
            .map_err(|_| ConfigError::invalid(format!("invalid louver position '{}'", s)))?;
        Self::new(code)
    }
}

impl fmt::Display for LouverPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

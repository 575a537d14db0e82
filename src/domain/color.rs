use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not a #RRGGBB color")]
pub struct ColorError(pub String);

/// Calendar color of a courier or manager, kept as upper-case `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayColor(String);

impl DisplayColor {
    pub fn parse(raw: &str) -> Result<Self, ColorError> {
        let value = raw.trim();
        let hex = value
            .strip_prefix('#')
            .ok_or_else(|| ColorError(raw.to_string()))?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError(raw.to_string()));
        }
        Ok(DisplayColor(format!("#{}", hex.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }
}

impl Default for DisplayColor {
    fn default() -> Self {
        DisplayColor("#FFFFFF".to_string())
    }
}

impl FromStr for DisplayColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayColor::parse(s)
    }
}

impl TryFrom<String> for DisplayColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DisplayColor::parse(&value)
    }
}

impl From<DisplayColor> for String {
    fn from(color: DisplayColor) -> Self {
        color.0
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

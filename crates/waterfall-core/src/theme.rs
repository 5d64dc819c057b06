//! Chart color theme
//!
//! A theme carries the canvas background, the label color and six named
//! colors used for delay severity callouts and axis decoration. Themes load
//! from TOML; every key is required.
//!
//! ```toml
//! bg = "#23272A"
//! text = "#FFFDE0"
//! black = "#000000"
//! white = "#FFFFFF"
//! red = "#FFB8B8"
//! green = "#B8FFB8"
//! blue = "#B8B8FF"
//! yellow = "#FFFFB8"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Theme loading error
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Theme is missing required color `{0}`")]
    MissingKey(&'static str),

    #[error("Invalid color for `{key}`: {value:?} (expected #RGB or #RRGGBB)")]
    InvalidColor { key: &'static str, value: String },

    #[error("Theme TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// An opaque RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB` (case-insensitive)
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut it = hex.chars().map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
                Some(Self::new(it.next()??, it.next()??, it.next()??))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        }
    }

    /// Uppercase `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s).ok_or_else(|| format!("invalid color {:?}", s))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Color theme for the Gantt chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThemeTable")]
pub struct ColorTheme {
    /// Canvas background
    pub bg: Rgb,
    /// Label and title color
    pub text: Rgb,
    pub black: Rgb,
    pub white: Rgb,
    pub red: Rgb,
    pub green: Rgb,
    pub blue: Rgb,
    pub yellow: Rgb,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorTheme {
    pub fn dark() -> Self {
        Self {
            bg: Rgb::new(0x23, 0x27, 0x2A),
            text: Rgb::new(0xFF, 0xFD, 0xE0),
            black: Rgb::new(0x00, 0x00, 0x00),
            white: Rgb::new(0xFF, 0xFF, 0xFF),
            red: Rgb::new(0xFF, 0xB8, 0xB8),
            green: Rgb::new(0xB8, 0xFF, 0xB8),
            blue: Rgb::new(0xB8, 0xB8, 0xFF),
            yellow: Rgb::new(0xFF, 0xFF, 0xB8),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Rgb::new(0xFF, 0xFF, 0xFF),
            text: Rgb::new(0x2C, 0x3E, 0x50),
            black: Rgb::new(0x00, 0x00, 0x00),
            white: Rgb::new(0x7F, 0x8C, 0x8D),
            red: Rgb::new(0xC0, 0x39, 0x2B),
            green: Rgb::new(0x27, 0xAE, 0x60),
            blue: Rgb::new(0x29, 0x80, 0xB9),
            yellow: Rgb::new(0xD4, 0xAC, 0x0D),
        }
    }

    /// Parse a theme from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self, ThemeError> {
        let table: ThemeTable = toml::from_str(input)?;
        table.into_theme()
    }

    /// Serialize as TOML (for `waterfall theme` output)
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Unvalidated theme as read from a config file
#[derive(Debug, Default, Deserialize)]
struct ThemeTable {
    bg: Option<String>,
    text: Option<String>,
    black: Option<String>,
    white: Option<String>,
    red: Option<String>,
    green: Option<String>,
    blue: Option<String>,
    yellow: Option<String>,
}

impl ThemeTable {
    fn into_theme(self) -> Result<ColorTheme, ThemeError> {
        fn color(key: &'static str, value: Option<String>) -> Result<Rgb, ThemeError> {
            let value = value.ok_or(ThemeError::MissingKey(key))?;
            Rgb::parse_hex(&value).ok_or(ThemeError::InvalidColor { key, value })
        }

        Ok(ColorTheme {
            bg: color("bg", self.bg)?,
            text: color("text", self.text)?,
            black: color("black", self.black)?,
            white: color("white", self.white)?,
            red: color("red", self.red)?,
            green: color("green", self.green)?,
            blue: color("blue", self.blue)?,
            yellow: color("yellow", self.yellow)?,
        })
    }
}

impl TryFrom<ThemeTable> for ColorTheme {
    type Error = ThemeError;

    fn try_from(table: ThemeTable) -> Result<Self, Self::Error> {
        table.into_theme()
    }
}

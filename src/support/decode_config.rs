//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of Fxics.
//
// Fxics is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Fxics is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Fxics. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::Error;

/// The configuration for the `fxics` tool.
///
/// This is stored in a TOML file passed with `--config`. Every table is
/// optional; an empty file is equivalent to the defaults.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DecodeConfig {
    /// Options which change how the stream is decoded.
    #[serde(default)]
    pub stream: DecodeOptions,

    /// Options for the console logger used when no log4rs configuration is
    /// given.
    #[serde(default)]
    pub log: LogConfig,
}

/// Width of the length prefix in front of variable-size values and of the
/// count in front of multi-valued properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPrefix {
    U16,
    U32,
}

impl Default for LengthPrefix {
    fn default() -> Self {
        LengthPrefix::U16
    }
}

impl LengthPrefix {
    pub fn width(self) -> usize {
        match self {
            LengthPrefix::U16 => 2,
            LengthPrefix::U32 => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// The width of length prefixes and multi-value counts.
    ///
    /// Streams captured from a live server use `u32`.
    pub length_prefix: LengthPrefix,

    /// If true, the tool records every property list decoded and reports the
    /// count along with the result.
    ///
    /// This only affects the command-line tool; library callers install a
    /// capture sink on the stream themselves.
    pub capture_prop_lists: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_owned(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl DecodeConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

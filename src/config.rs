// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Configuration utils.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Encountered when the configuration cannot be loaded.
#[derive(Error, Debug)]
#[error("Configuration Error: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

/// Default configuration TOML string.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Represents a piece of configuration that can be merged with another one.
trait MergeableConfig {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self;
}

/// Analysis-file tier, selecting which `.DAT`/`.EXT`/`.2EX` variants are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// `.DAT` only, 3 hot cues.
    TierA,
    /// `.DAT` + `.EXT`, 8 hot cues, colour waveform.
    TierB,
    /// `.DAT` + `.EXT` + `.2EX`, phrase structure.
    TierC,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::TierA => "tier-a",
            Tier::TierB => "tier-b",
            Tier::TierC => "tier-c",
        };
        f.write_str(s)
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tier-a" => Ok(Tier::TierA),
            "tier-b" => Ok(Tier::TierB),
            "tier-c" => Ok(Tier::TierC),
            other => Err(format!("unknown tier {other:?}")),
        }
    }
}

/// Notation used when rendering a key in the interchange XML `Tonality` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyNotation {
    /// Camelot / Open-Key wheel notation (e.g. `8A`).
    OpenKey,
    /// Classical notation (e.g. `Am`).
    Classical,
    /// Classical notation using flats instead of sharps.
    FlatClassical,
}

impl FromStr for KeyNotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open-key" => Ok(KeyNotation::OpenKey),
            "classical" => Ok(KeyNotation::Classical),
            "flat-classical" => Ok(KeyNotation::FlatClassical),
            other => Err(format!("unknown key notation {other:?}")),
        }
    }
}

/// Target format selected for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetFormat {
    /// Paged binary database + analysis files consumed directly by hardware players.
    CdjHardware,
    /// The second vendor's interchange XML format.
    InterchangeXml,
    /// Plain-text `.m3u8` playlists.
    M3u,
    /// Alias of `interchange-xml` kept for CLI compatibility (see A6).
    DatabaseSoftware,
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cdj-hardware" => Ok(TargetFormat::CdjHardware),
            "interchange-xml" => Ok(TargetFormat::InterchangeXml),
            "m3u" => Ok(TargetFormat::M3u),
            "database-software" => Ok(TargetFormat::DatabaseSoftware),
            other => Err(format!("unknown target format {other:?}")),
        }
    }
}

/// Export options, merged from the default config, an optional user file, and CLI flags.
#[expect(missing_copy_implementations)]
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ExportOptions {
    /// Which writer to dispatch to.
    pub target_format: Option<TargetFormat>,
    /// Analysis-file tier (hardware export only).
    pub tier: Option<Tier>,
    /// Copy audio files into `Contents/`.
    pub copy_audio: Option<bool>,
    /// Verify copied audio files with a SHA-256 comparison.
    pub verify_copy: Option<bool>,
    /// Clear a pre-existing, non-empty `PIONEER/` tree before exporting.
    pub overwrite: Option<bool>,
    /// Key notation used in the interchange XML `Tonality` attribute.
    pub key_notation: Option<KeyNotation>,
    /// Maximum number of entries retained in the filename index.
    pub filename_index_cap: Option<usize>,
}

impl MergeableConfig for ExportOptions {
    fn merge(&self, other: &Self) -> Self {
        ExportOptions {
            target_format: self.target_format.or(other.target_format),
            tier: self.tier.or(other.tier),
            copy_audio: self.copy_audio.or(other.copy_audio),
            verify_copy: self.verify_copy.or(other.verify_copy),
            overwrite: self.overwrite.or(other.overwrite),
            key_notation: self.key_notation.or(other.key_notation),
            filename_index_cap: self.filename_index_cap.or(other.filename_index_cap),
        }
    }
}

/// The main configuration struct.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Export option defaults.
    pub export: ExportOptions,
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: Option<String>,
}

impl MergeableConfig for Config {
    fn merge(&self, other: &Self) -> Self {
        Config {
            export: self.export.merge(&other.export),
            log_level: self.log_level.clone().or_else(|| other.log_level.clone()),
        }
    }
}

impl Config {
    /// Load the configuration from a string slice.
    fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load the bundled default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_str(DEFAULT_CONFIG)
    }

    /// Load the configuration from a file located at the given path.
    ///
    /// # Errors
    ///
    /// This method can fail if the file cannot be accessed or if it contains malformed
    /// configuration markup.
    pub fn load_from_path<T: AsRef<Path>>(path: T) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::load_from_str(&text)?;
        Ok(config)
    }

    /// Merge this configuration struct with the bundled defaults, filling in any field left unset.
    #[must_use]
    pub fn with_defaults(&self) -> Self {
        let default = Self::load_default().expect("failed to load default config");
        self.merge(&default)
    }

    /// Apply CLI-flag overrides, the highest-precedence layer (A1): any field
    /// set in `overrides` wins over whatever this config already carries.
    #[must_use]
    pub fn with_cli_overrides(&self, overrides: &ExportOptions) -> Self {
        Config {
            export: overrides.merge(&self.export),
            log_level: self.log_level.clone(),
        }
    }

    /// Load the bundled default, an optional XDG user config, and an optional
    /// explicit config path, each layer taking precedence over the one before
    /// (A1). CLI-flag overrides are applied separately via
    /// [`Config::with_cli_overrides`], after this layered load.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be read or contains
    /// malformed TOML.
    pub fn load_layered(user_config_path: Option<&Path>, explicit_path: Option<&Path>) -> crate::Result<Self> {
        let mut config = Self::load_default().map_err(crate::ErrorType::Config)?;
        if let Some(path) = user_config_path {
            config = Self::load_from_path(path)?.merge(&config);
        }
        if let Some(path) = explicit_path {
            config = Self::load_from_path(path)?.merge(&config);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::load_default().expect("bundled default_config.toml must parse");
        assert_eq!(config.export.tier, Some(Tier::TierB));
        assert_eq!(config.export.filename_index_cap, Some(30_000));
    }

    #[test]
    fn merge_prefers_self_then_other() {
        let mine = ExportOptions {
            copy_audio: Some(true),
            ..ExportOptions::default()
        };
        let theirs = ExportOptions {
            copy_audio: Some(false),
            verify_copy: Some(true),
            ..ExportOptions::default()
        };
        let merged = mine.merge(&theirs);
        assert_eq!(merged.copy_audio, Some(true));
        assert_eq!(merged.verify_copy, Some(true));
    }

    #[test]
    fn merge_with_all_none_returns_other() {
        let empty = ExportOptions::default();
        let concrete = ExportOptions {
            copy_audio: Some(true),
            tier: Some(Tier::TierC),
            ..ExportOptions::default()
        };
        let merged = empty.merge(&concrete);
        assert_eq!(merged.copy_audio, concrete.copy_audio);
        assert_eq!(merged.tier, concrete.tier);
    }
}

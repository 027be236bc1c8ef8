// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with emulator configuration files.

use std::path::PathBuf;

use thiserror::Error;

use super::CONFIG_FILE_TYPES_COMMA_SEPARATED;
use crate::ErrorKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file '{}' doesn't have a recognised file extension! Valid extensions are: {}", .0.display(), *CONFIG_FILE_TYPES_COMMA_SEPARATED)]
    UnrecognisedExtension(PathBuf),

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    Toml { file: String, err: toml::de::Error },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    Json {
        file: String,
        err: serde_json::Error,
    },

    #[error("Couldn't encode the config as toml: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::UnrecognisedExtension(_)
            | ConfigError::Toml { .. }
            | ConfigError::Json { .. }
            | ConfigError::TomlEncode(_) => ErrorKind::Configuration,
            ConfigError::IO(_) => ErrorKind::Io,
        }
    }
}

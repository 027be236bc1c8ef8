// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Emulator configuration, and reading it from argument files.
//!
//! Configurations can be written as toml or json; the file extension decides
//! which. An example toml file:
//!
//! ```toml
//! coefficient_order = 20
//! return_beam_above_horizon = true
//!
//! [interpolation]
//! method = "gaussian_process"
//! kernel = "Matern_2_5"
//! regressor = "MultiOutput"
//! ```

mod error;

pub use error::ConfigError;

use std::{fs::File, io::Read, path::Path, str::FromStr};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::InterpolationStrategy;

/// Options for a [`crate::BeamEmulator`]. Every field has a default, so a
/// config file only needs what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Only use the first `coefficient_order` basis coefficients. If not
    /// given, all coefficients are used.
    #[serde(default)]
    pub coefficient_order: Option<usize>,

    /// If true, queries return only the above-horizon (unmasked) pixels, in
    /// basis order. Otherwise, queries return the full sky, with zeros below
    /// the horizon.
    #[serde(default)]
    pub return_beam_above_horizon: bool,

    /// Are the unmasked pixel indices one-based?
    #[serde(default = "default_one_based_indices")]
    pub one_based_indices: bool,

    /// How coefficients are interpolated across hyper-parameters. Defaults to
    /// a cubic spline.
    #[serde(default)]
    pub interpolation: InterpolationStrategy,
}

fn default_one_based_indices() -> bool {
    true
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            coefficient_order: None,
            return_beam_above_horizon: false,
            one_based_indices: default_one_based_indices(),
            interpolation: InterpolationStrategy::default(),
        }
    }
}

impl EmulatorConfig {
    pub fn from_toml_str(s: &str) -> Result<EmulatorConfig, ConfigError> {
        toml::from_str(s).map_err(|err| ConfigError::Toml {
            file: "<string>".to_string(),
            err,
        })
    }

    pub fn from_json_str(s: &str) -> Result<EmulatorConfig, ConfigError> {
        serde_json::from_str(s).map_err(|err| ConfigError::Json {
            file: "<string>".to_string(),
            err,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

#[derive(Debug, Display, EnumIter, EnumString)]
enum ConfigFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

lazy_static::lazy_static! {
    static ref CONFIG_FILE_TYPES_COMMA_SEPARATED: String = ConfigFileType::iter().join(", ");
}

/// Read an [`EmulatorConfig`] from a toml or json file.
pub fn read_config_file(file: &Path) -> Result<EmulatorConfig, ConfigError> {
    debug!("Attempting to parse config file {}", file.display());

    let file_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| ConfigFileType::from_str(&e).ok());

    let mut contents = String::new();
    let config = match file_type {
        Some(ConfigFileType::Toml) => {
            debug!("Parsing toml file...");
            let mut fh = File::open(file)?;
            fh.read_to_string(&mut contents)?;
            toml::from_str(&contents).map_err(|err| ConfigError::Toml {
                file: file.display().to_string(),
                err,
            })?
        }

        Some(ConfigFileType::Json) => {
            debug!("Parsing json file...");
            let mut fh = File::open(file)?;
            fh.read_to_string(&mut contents)?;
            serde_json::from_str(&contents).map_err(|err| ConfigError::Json {
                file: file.display().to_string(),
                err,
            })?
        }

        None => return Err(ConfigError::UnrecognisedExtension(file.to_path_buf())),
    };

    debug!("{config:?}");
    Ok(config)
}

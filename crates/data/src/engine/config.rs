// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

use std::path::Path;

use ahash::AHashMap;
use anyhow::Context;
use renko_model::{enums::PriceType, identifiers::InstrumentId};
use serde::{Deserialize, Serialize};

use crate::{aggregation::brick_size_checked, error::BrickError};

const fn default_price_precision() -> u8 {
    2
}

const fn default_price_type() -> PriceType {
    PriceType::Mid
}

/// Per-instrument overrides of the engine defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentBrickConfig {
    /// The brick size for the instrument.
    pub brick_size: f64,
    /// The price precision for the instrument (engine default when absent).
    #[serde(default)]
    pub price_precision: Option<u8>,
    /// The size precision for the instrument (engine default when absent).
    #[serde(default)]
    pub size_precision: Option<u8>,
}

/// Configuration for `BrickEngine` instances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrickEngineConfig {
    /// The default brick size, in the same units as the selected value.
    pub brick_size: f64,
    /// The default precision of brick prices. Observed values must lie on this grid.
    #[serde(default = "default_price_precision")]
    pub price_precision: u8,
    /// The default precision of brick volumes. Observed volumes must lie on this grid.
    #[serde(default)]
    pub size_precision: u8,
    /// The side of the book used when aggregating quotes.
    #[serde(default = "default_price_type")]
    pub price_type: PriceType,
    /// If invalid or out-of-order updates are logged and skipped rather than returned as errors.
    #[serde(default)]
    pub skip_invalid: bool,
    /// Overrides keyed by instrument ID.
    #[serde(default)]
    pub instruments: AHashMap<InstrumentId, InstrumentBrickConfig>,
}

impl BrickEngineConfig {
    /// Creates a new [`BrickEngineConfig`] with the given defaults and no overrides.
    #[must_use]
    pub fn new(brick_size: f64, price_precision: u8, size_precision: u8) -> Self {
        Self {
            brick_size,
            price_precision,
            size_precision,
            price_type: default_price_type(),
            skip_invalid: false,
            instruments: AHashMap::new(),
        }
    }

    /// Returns this config with invalid updates skipped instead of propagated.
    #[must_use]
    pub const fn with_skip_invalid(mut self, skip_invalid: bool) -> Self {
        self.skip_invalid = skip_invalid;
        self
    }

    /// Returns this config with the quote price type set.
    #[must_use]
    pub const fn with_price_type(mut self, price_type: PriceType) -> Self {
        self.price_type = price_type;
        self
    }

    /// Returns this config with an override for `instrument_id`.
    #[must_use]
    pub fn with_instrument(
        mut self,
        instrument_id: InstrumentId,
        override_config: InstrumentBrickConfig,
    ) -> Self {
        self.instruments.insert(instrument_id, override_config);
        self
    }

    /// Returns the `(brick_size, price_precision, size_precision)` applying to `instrument_id`.
    #[must_use]
    pub fn resolve(&self, instrument_id: &InstrumentId) -> (f64, u8, u8) {
        match self.instruments.get(instrument_id) {
            Some(config) => (
                config.brick_size,
                config.price_precision.unwrap_or(self.price_precision),
                config.size_precision.unwrap_or(self.size_precision),
            ),
            None => (self.brick_size, self.price_precision, self.size_precision),
        }
    }

    /// Validates the defaults and every instrument override.
    ///
    /// # Errors
    ///
    /// Returns [`BrickError::InvalidConfiguration`] if any brick size is not positive or not
    /// representable at its price precision, or if any precision is out of range.
    pub fn validate(&self) -> Result<(), BrickError> {
        brick_size_checked(self.brick_size, self.price_precision)?;
        check_size_precision(self.size_precision)?;

        for instrument_id in self.instruments.keys() {
            let (brick_size, price_precision, size_precision) = self.resolve(instrument_id);
            brick_size_checked(brick_size, price_precision).map_err(|e| {
                BrickError::InvalidConfiguration(format!("instrument {instrument_id}: {e}"))
            })?;
            check_size_precision(size_precision)?;
        }
        Ok(())
    }

    /// Parses and validates a config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the config fails [`Self::validate`].
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse brick engine config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config from the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`Self::from_toml_str`] fails.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&input).with_context(|| format!("invalid config file {}", path.display()))
    }
}

fn check_size_precision(size_precision: u8) -> Result<(), BrickError> {
    renko_model::types::fixed::check_fixed_precision(size_precision)
        .map_err(|e| BrickError::InvalidConfiguration(format!("size_precision: {e}")))
}

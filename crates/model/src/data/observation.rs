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

//! An `Observation` data type representing a single timestamped value for an instrument.

use std::fmt::Display;

use renko_core::UnixNanos;
use serde::{Deserialize, Serialize};

use super::MarketUpdate;
use crate::identifiers::InstrumentId;

/// Represents a timestamped scalar value (and optional volume) for an instrument.
///
/// The fields are plain `f64` and are not validated on construction: validation happens when
/// the observation is fed to an aggregator, which rejects non-finite values and negative volume.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The instrument ID for the observation.
    pub instrument_id: InstrumentId,
    /// UNIX timestamp (nanoseconds) when the observation occurred.
    pub ts_event: UnixNanos,
    /// The observed value.
    pub value: f64,
    /// The observed volume (zero when absent).
    #[serde(default)]
    pub volume: f64,
}

impl Observation {
    /// Creates a new [`Observation`] instance.
    #[must_use]
    pub const fn new(
        instrument_id: InstrumentId,
        value: f64,
        volume: f64,
        ts_event: UnixNanos,
    ) -> Self {
        Self {
            instrument_id,
            ts_event,
            value,
            volume,
        }
    }

    /// Creates a new [`Observation`] instance with zero volume.
    #[must_use]
    pub const fn from_value(instrument_id: InstrumentId, value: f64, ts_event: UnixNanos) -> Self {
        Self::new(instrument_id, value, 0.0, ts_event)
    }
}

impl MarketUpdate for Observation {
    fn instrument_id(&self) -> InstrumentId {
        self.instrument_id
    }

    fn ts_event(&self) -> UnixNanos {
        self.ts_event
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

impl Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.instrument_id, self.value, self.volume, self.ts_event,
        )
    }
}

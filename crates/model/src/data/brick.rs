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

//! A `Brick` data type representing a completed fixed-magnitude (Renko) bar.

use std::fmt::Display;

use renko_core::{UnixNanos, correctness::FAILED};
use serde::{Deserialize, Serialize};

use crate::{
    enums::BrickDirection,
    identifiers::InstrumentId,
    types::{Price, Quantity},
};

/// Represents a completed brick: a bar spanning a fixed price move rather than a fixed interval.
///
/// A brick is an immutable snapshot. Consumers may retain it indefinitely.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Brick {
    /// The instrument ID the brick was aggregated for.
    pub instrument_id: InstrumentId,
    /// The direction of the move the brick represents.
    pub direction: BrickDirection,
    /// The brick open price (the previous brick's close).
    pub open: Price,
    /// The highest price traded while the brick was forming.
    pub high: Price,
    /// The lowest price traded while the brick was forming.
    pub low: Price,
    /// The brick close price (`open` plus or minus one brick size).
    pub close: Price,
    /// The volume absorbed while the brick was forming.
    pub volume: Quantity,
    /// UNIX timestamp (nanoseconds) when the brick began forming.
    pub ts_open: UnixNanos,
    /// UNIX timestamp (nanoseconds) of the observation which closed the brick.
    pub ts_close: UnixNanos,
}

impl Brick {
    /// Creates a new [`Brick`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `close` equals `open`, or `direction` disagrees with the sign of `close - open`.
    /// - `high` is below `open` or `close`.
    /// - `low` is above `open` or `close`.
    /// - `ts_close` is earlier than `ts_open`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_checked(
        instrument_id: InstrumentId,
        direction: BrickDirection,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
        ts_open: UnixNanos,
        ts_close: UnixNanos,
    ) -> anyhow::Result<Self> {
        let expected = match close.raw.cmp(&open.raw) {
            std::cmp::Ordering::Greater => BrickDirection::Up,
            std::cmp::Ordering::Less => BrickDirection::Down,
            std::cmp::Ordering::Equal => {
                anyhow::bail!("{FAILED}: brick `close` {close} was equal to `open` {open}")
            }
        };
        if direction != expected {
            anyhow::bail!(
                "{FAILED}: brick `direction` {direction} inconsistent with open {open} and close {close}"
            );
        }
        if high < open || high < close {
            anyhow::bail!("{FAILED}: brick `high` {high} was below `open` or `close`");
        }
        if low > open || low > close {
            anyhow::bail!("{FAILED}: brick `low` {low} was above `open` or `close`");
        }
        if ts_close < ts_open {
            anyhow::bail!("{FAILED}: brick `ts_close` {ts_close} was before `ts_open` {ts_open}");
        }

        Ok(Self {
            instrument_id,
            direction,
            open,
            high,
            low,
            close,
            volume,
            ts_open,
            ts_close,
        })
    }

    /// Creates a new [`Brick`] instance.
    ///
    /// # Panics
    ///
    /// Panics if a correctness check fails. See [`Brick::new_checked`] for more details.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        instrument_id: InstrumentId,
        direction: BrickDirection,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
        ts_open: UnixNanos,
        ts_close: UnixNanos,
    ) -> Self {
        Self::new_checked(
            instrument_id,
            direction,
            open,
            high,
            low,
            close,
            volume,
            ts_open,
            ts_close,
        )
        .expect(FAILED)
    }

    /// Returns the absolute size of the brick (`|close - open|`).
    #[must_use]
    pub fn size(&self) -> Price {
        Price::from_raw((self.close.raw - self.open.raw).abs(), self.close.precision)
    }

    /// Returns `true` if the brick represents an upward move.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.direction == BrickDirection::Up
    }
}

impl Display for Brick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{}",
            self.instrument_id,
            self.direction,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.ts_open,
            self.ts_close,
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::stubs::{instrument_id_audusd_sim, stub_brick_up};

    #[rstest]
    fn test_brick_properties(stub_brick_up: Brick) {
        assert!(stub_brick_up.is_up());
        assert_eq!(stub_brick_up.size(), Price::from("2.5"));
    }

    #[rstest]
    fn test_display(stub_brick_up: Brick) {
        assert_eq!(
            stub_brick_up.to_string(),
            "AUD/USD.SIM,UP,100.0,102.5,99.5,102.5,30,0,3"
        );
    }

    #[rstest]
    fn test_new_checked_rejects_flat_brick(instrument_id_audusd_sim: InstrumentId) {
        let price = Price::from("100.0");
        let result = Brick::new_checked(
            instrument_id_audusd_sim,
            BrickDirection::Up,
            price,
            price,
            price,
            price,
            Quantity::zero(0),
            UnixNanos::default(),
            UnixNanos::default(),
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_new_checked_rejects_wrong_direction(instrument_id_audusd_sim: InstrumentId) {
        let result = Brick::new_checked(
            instrument_id_audusd_sim,
            BrickDirection::Down,
            Price::from("100.0"),
            Price::from("102.5"),
            Price::from("100.0"),
            Price::from("102.5"),
            Quantity::zero(0),
            UnixNanos::default(),
            UnixNanos::default(),
        );
        assert!(result.is_err());
    }

    #[rstest]
    #[case("102.4", "100.0")] // <-- high below close
    #[case("102.5", "100.1")] // <-- low above open
    fn test_new_checked_rejects_invalid_extremes(
        instrument_id_audusd_sim: InstrumentId,
        #[case] high: &str,
        #[case] low: &str,
    ) {
        let result = Brick::new_checked(
            instrument_id_audusd_sim,
            BrickDirection::Up,
            Price::from("100.0"),
            Price::from(high),
            Price::from(low),
            Price::from("102.5"),
            Quantity::zero(0),
            UnixNanos::default(),
            UnixNanos::default(),
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_new_checked_rejects_reversed_timestamps(instrument_id_audusd_sim: InstrumentId) {
        let result = Brick::new_checked(
            instrument_id_audusd_sim,
            BrickDirection::Down,
            Price::from("100.0"),
            Price::from("100.0"),
            Price::from("97.5"),
            Price::from("97.5"),
            Quantity::zero(0),
            UnixNanos::from(2),
            UnixNanos::from(1),
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_serde_roundtrip(stub_brick_up: Brick) {
        let json = serde_json::to_string(&stub_brick_up).unwrap();
        assert!(json.contains("\"direction\":\"UP\""));
        assert!(json.contains("\"close\":\"102.5\""));
        let parsed: Brick = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stub_brick_up);
    }
}

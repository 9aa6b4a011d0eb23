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

//! A `QuoteTick` data type representing a top-of-book state.

use std::{cmp, fmt::Display};

use renko_core::UnixNanos;
use serde::{Deserialize, Serialize};

use super::MarketUpdate;
use crate::{
    enums::PriceType,
    identifiers::InstrumentId,
    types::{Price, Quantity, fixed::FIXED_PRECISION},
};

/// Represents a quote tick in a market.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteTick {
    /// The quotes instrument ID.
    pub instrument_id: InstrumentId,
    /// The top-of-book bid price.
    pub bid_price: Price,
    /// The top-of-book ask price.
    pub ask_price: Price,
    /// The top-of-book bid size.
    pub bid_size: Quantity,
    /// The top-of-book ask size.
    pub ask_size: Quantity,
    /// UNIX timestamp (nanoseconds) when the quote event occurred.
    pub ts_event: UnixNanos,
}

impl QuoteTick {
    /// Creates a new [`QuoteTick`] instance.
    #[must_use]
    pub const fn new(
        instrument_id: InstrumentId,
        bid_price: Price,
        ask_price: Price,
        bid_size: Quantity,
        ask_size: Quantity,
        ts_event: UnixNanos,
    ) -> Self {
        Self {
            instrument_id,
            bid_price,
            ask_price,
            bid_size,
            ask_size,
            ts_event,
        }
    }

    /// Returns the [`Price`] for this quote depending on the given `price_type`.
    ///
    /// Returns `None` for [`PriceType::Last`], which a quote does not carry.
    #[must_use]
    pub fn extract_price(&self, price_type: PriceType) -> Option<Price> {
        match price_type {
            PriceType::Bid => Some(self.bid_price),
            PriceType::Ask => Some(self.ask_price),
            PriceType::Mid => Some(Price::from_raw(
                (self.bid_price.raw + self.ask_price.raw) / 2,
                cmp::min(self.bid_price.precision + 1, FIXED_PRECISION),
            )),
            PriceType::Last => None,
        }
    }

    /// Returns the [`Quantity`] for this quote depending on the given `price_type`.
    ///
    /// Returns `None` for [`PriceType::Last`], which a quote does not carry.
    #[must_use]
    pub fn extract_size(&self, price_type: PriceType) -> Option<Quantity> {
        match price_type {
            PriceType::Bid => Some(self.bid_size),
            PriceType::Ask => Some(self.ask_size),
            PriceType::Mid => Some(Quantity::from_raw(
                self.bid_size.raw / 2 + self.ask_size.raw / 2,
                cmp::min(self.bid_size.precision + 1, FIXED_PRECISION),
            )),
            PriceType::Last => None,
        }
    }
}

impl MarketUpdate for QuoteTick {
    fn instrument_id(&self) -> InstrumentId {
        self.instrument_id
    }

    fn ts_event(&self) -> UnixNanos {
        self.ts_event
    }

    fn value(&self) -> f64 {
        self.extract_price(PriceType::Mid)
            .map_or(f64::NAN, |price| price.as_f64())
    }

    fn volume(&self) -> f64 {
        self.extract_size(PriceType::Mid)
            .map_or(f64::NAN, |size| size.as_f64())
    }
}

impl Display for QuoteTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.instrument_id,
            self.bid_price,
            self.ask_price,
            self.bid_size,
            self.ask_size,
            self.ts_event,
        )
    }
}

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

//! Type stubs to facilitate testing.

use rstest::fixture;

use crate::{
    data::{Brick, QuoteTick, TradeTick},
    enums::BrickDirection,
    identifiers::InstrumentId,
    types::{Price, Quantity},
};

// ---- InstrumentId ----

#[fixture]
pub fn instrument_id_audusd_sim() -> InstrumentId {
    InstrumentId::from("AUD/USD.SIM")
}

#[fixture]
pub fn instrument_id_ethusdt_binance() -> InstrumentId {
    InstrumentId::from("ETHUSDT-PERP.BINANCE")
}

// ---- Market data ----

#[fixture]
pub fn stub_trade_audusd(instrument_id_audusd_sim: InstrumentId) -> TradeTick {
    TradeTick {
        instrument_id: instrument_id_audusd_sim,
        price: Price::from("1.00001"),
        size: Quantity::from(100_000),
        ts_event: 1.into(),
    }
}

#[fixture]
pub fn stub_quote_audusd(instrument_id_audusd_sim: InstrumentId) -> QuoteTick {
    QuoteTick {
        instrument_id: instrument_id_audusd_sim,
        bid_price: Price::from("1.00000"),
        ask_price: Price::from("1.00002"),
        bid_size: Quantity::from(100_000),
        ask_size: Quantity::from(300_000),
        ts_event: 0.into(),
    }
}

// ---- Brick ----

#[fixture]
pub fn stub_brick_up(instrument_id_audusd_sim: InstrumentId) -> Brick {
    Brick {
        instrument_id: instrument_id_audusd_sim,
        direction: BrickDirection::Up,
        open: Price::from("100.0"),
        high: Price::from("102.5"),
        low: Price::from("99.5"),
        close: Price::from("102.5"),
        volume: Quantity::from(30),
        ts_open: 0.into(),
        ts_close: 3.into(),
    }
}

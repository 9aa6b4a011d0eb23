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

//! Data types for the domain model: inbound market updates and outbound bricks.

pub mod brick;
pub mod observation;
pub mod quote;
pub mod trade;

use renko_core::UnixNanos;

use crate::identifiers::InstrumentId;

// Re-exports
pub use brick::Brick;
pub use observation::Observation;
pub use quote::QuoteTick;
pub use trade::TradeTick;

/// A raw market update which can be fed to a brick aggregator.
///
/// `value` and `volume` are the default selectors: the scalar used for brick math ("close", or
/// the last traded price) and the volume contribution ("traded quantity"). Implementations
/// return plain `f64` so callers can surface non-finite or negative inputs for validation
/// instead of failing at conversion.
pub trait MarketUpdate {
    /// Returns the instrument ID this update belongs to.
    fn instrument_id(&self) -> InstrumentId;
    /// Returns the UNIX timestamp (nanoseconds) when the update occurred.
    fn ts_event(&self) -> UnixNanos;
    /// Returns the default scalar value for brick math.
    fn value(&self) -> f64;
    /// Returns the default volume contribution.
    fn volume(&self) -> f64;
}

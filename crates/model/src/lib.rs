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

//! The domain model for Renko brick aggregation.
//!
//! - Instrument identifiers.
//! - Fixed-point `Price` and `Quantity` value types, so brick arithmetic is exact.
//! - Inbound market data (`Observation`, `TradeTick`, `QuoteTick`) behind the `MarketUpdate` trait.
//! - The outbound `Brick` bar.
//!
//! # Feature flags
//!
//! - `stubs`: Enables `rstest` fixtures for testing in downstream crates.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod data;
pub mod enums;
pub mod identifiers;
pub mod types;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

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

//! Streaming Renko brick aggregation.
//!
//! The `renko-data` crate turns ordered streams of market updates into fixed-magnitude bricks:
//!
//! - [`aggregation::BrickAggregator`] consumes updates for a single instrument and pushes each
//!   completed [`Brick`](renko_model::data::Brick) to a handler.
//! - [`engine::BrickEngine`] owns one aggregator per instrument and routes updates by ID.
//! - [`engine::config::BrickEngineConfig`] is loaded from TOML.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod aggregation;
pub mod engine;
pub mod error;

pub use crate::error::BrickError;

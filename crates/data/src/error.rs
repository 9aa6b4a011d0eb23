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

//! Errors associated with brick aggregation.

use renko_core::UnixNanos;

/// An error raised while configuring an aggregator or applying an update to it.
///
/// Update errors are recoverable: a rejected update leaves the aggregator untouched and the
/// caller may continue with the next update.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BrickError {
    /// The brick specification or engine configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The selected value or volume of an update is unusable.
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),
    /// The update timestamp is earlier than the last accepted timestamp.
    #[error("Out-of-order observation: ts_event={ts_event} < ts_last={ts_last}")]
    OutOfOrderObservation {
        /// The timestamp of the rejected update.
        ts_event: UnixNanos,
        /// The timestamp of the last accepted update.
        ts_last: UnixNanos,
    },
}

impl BrickError {
    /// Returns `true` if the error was raised by an update (rather than by configuration).
    #[must_use]
    pub const fn is_update_error(&self) -> bool {
        !matches!(self, Self::InvalidConfiguration(_))
    }
}

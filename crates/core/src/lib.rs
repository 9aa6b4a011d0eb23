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

//! Core foundational types for Renko brick aggregation.
//!
//! The `renko-core` crate is kept small and dependency-light. It supplies the building blocks
//! shared by the model and data crates:
//!
//! - `UnixNanos`, a strongly-typed timestamp in nanoseconds since the UNIX epoch.
//! - Correctness validation functions used to check preconditions at construction time.
//! - Parsing helpers for inferring decimal precision from numeric strings.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod correctness;
pub mod nanos;
pub mod parsing;

pub use crate::nanos::UnixNanos;

/// The message used when a mutex guarded value is poisoned.
pub const MUTEX_POISONED: &str = "Mutex poisoned";

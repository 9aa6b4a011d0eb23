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

//! Functions for handling fixed-point arithmetic.
//!
//! Every value type stores a raw integer scaled by [`FIXED_SCALAR`], regardless of its display
//! precision. Values of different precisions therefore compare and subtract directly on their
//! raw representation.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

/// The maximum fixed-point precision.
pub const FIXED_PRECISION: u8 = 9;

/// The scalar value corresponding to the maximum precision (10^9).
pub const FIXED_SCALAR: f64 = 1_000_000_000.0; // 10.0**FIXED_PRECISION

/// Checks if a given `precision` value is within the allowed fixed-point precision range.
///
/// # Errors
///
/// Returns an error if `precision` exceeds [`FIXED_PRECISION`].
pub fn check_fixed_precision(precision: u8) -> anyhow::Result<()> {
    if precision > FIXED_PRECISION {
        anyhow::bail!(
            "`precision` exceeded maximum `FIXED_PRECISION` ({FIXED_PRECISION}), was {precision}"
        )
    }
    Ok(())
}

/// Returns the raw increment for one unit of the last decimal place at `precision`.
///
/// For example a precision of 2 yields the raw value of `0.01`.
#[must_use]
pub fn raw_increment(precision: u8) -> i64 {
    debug_assert!(precision <= FIXED_PRECISION);
    10_i64.pow(u32::from(FIXED_PRECISION.saturating_sub(precision)))
}

/// Returns `true` if `value` lies on the decimal grid of `precision`, allowing for the
/// representation error of binary floating point.
///
/// A `value` of `102.6` is on the grid at precision 1, while `102.499` is not on the grid at
/// precision 2 and would be rounded by [`f64_to_fixed_i64`].
#[must_use]
pub fn is_on_fixed_grid(value: f64, precision: u8) -> bool {
    debug_assert!(precision <= FIXED_PRECISION);
    let scaled = value * 10_f64.powi(i32::from(precision));
    (scaled - scaled.round()).abs() <= scaled.abs().max(1.0) * 4.0 * f64::EPSILON
}

/// Converts an `f64` value to a raw fixed-point `i64` representation rounded to `precision`.
///
/// The caller is responsible for checking `precision` and the range of `value`.
#[must_use]
pub fn f64_to_fixed_i64(value: f64, precision: u8) -> i64 {
    debug_assert!(precision <= FIXED_PRECISION);
    let pow1 = 10_i64.pow(u32::from(precision));
    let rounded = (value * pow1 as f64).round() as i64;
    rounded * raw_increment(precision)
}

/// Converts an `f64` value to a raw fixed-point `u64` representation rounded to `precision`.
///
/// The caller is responsible for checking `precision` and the range of `value`.
#[must_use]
pub fn f64_to_fixed_u64(value: f64, precision: u8) -> u64 {
    debug_assert!(precision <= FIXED_PRECISION);
    let pow1 = 10_u64.pow(u32::from(precision));
    let pow2 = 10_u64.pow(u32::from(FIXED_PRECISION - precision));
    let rounded = (value * pow1 as f64).round() as u64;
    rounded * pow2
}

/// Converts a raw fixed-point `i64` value back to an `f64` value.
#[must_use]
pub fn fixed_i64_to_f64(value: i64) -> f64 {
    (value as f64) / FIXED_SCALAR
}

/// Converts a raw fixed-point `u64` value back to an `f64` value.
#[must_use]
pub fn fixed_u64_to_f64(value: u64) -> f64 {
    (value as f64) / FIXED_SCALAR
}

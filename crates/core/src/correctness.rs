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

//! Functions for correctness checks similar to the *design by contract* philosophy.
//!
//! Each check returns an [`anyhow::Result`] so callers decide whether a failed condition is
//! fatal. The error messages all start with [`FAILED`].

use anyhow::bail;

/// A message prefix that can be used with calls to `expect` or other assertion-related functions.
pub const FAILED: &str = "Condition failed";

/// Checks the string `s` has semantic meaning and contains only ASCII characters.
///
/// # Errors
///
/// Returns an error if:
/// - `s` is an empty string.
/// - `s` consists solely of whitespace characters.
/// - `s` contains one or more non-ASCII characters.
pub fn check_valid_string(s: &str, param: &str) -> anyhow::Result<()> {
    if s.is_empty() {
        bail!("{FAILED}: invalid string for '{param}', was empty");
    }
    if s.chars().all(char::is_whitespace) {
        bail!("{FAILED}: invalid string for '{param}', was all whitespace");
    }
    if !s.is_ascii() {
        bail!("{FAILED}: invalid string for '{param}' contained a non-ASCII char, was '{s}'");
    }
    Ok(())
}

/// Checks the `f64` value is finite (not NaN or infinite).
///
/// # Errors
///
/// Returns an error if `value` is NaN or infinite.
pub fn check_finite_f64(value: f64, param: &str) -> anyhow::Result<()> {
    if !value.is_finite() {
        bail!("{FAILED}: invalid f64 for '{param}', was {value}");
    }
    Ok(())
}

/// Checks the `f64` value is finite and strictly positive.
///
/// # Errors
///
/// Returns an error if `value` is not finite or is not greater than zero.
pub fn check_positive_f64(value: f64, param: &str) -> anyhow::Result<()> {
    check_finite_f64(value, param)?;
    if value <= 0.0 {
        bail!("{FAILED}: invalid f64 for '{param}' not positive, was {value}");
    }
    Ok(())
}

/// Checks the `f64` value is finite and within the inclusive range [`l`, `r`].
///
/// # Errors
///
/// Returns an error if `value` is not finite or falls outside the range.
pub fn check_in_range_inclusive_f64(value: f64, l: f64, r: f64, param: &str) -> anyhow::Result<()> {
    check_finite_f64(value, param)?;
    if value < l || value > r {
        bail!("{FAILED}: invalid f64 for '{param}' not in range [{l}, {r}], was {value}");
    }
    Ok(())
}

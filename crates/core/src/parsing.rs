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

//! Core parsing functions.

/// Returns the decimal precision inferred from the given string.
///
/// Scientific notation with a negative exponent (e.g. `1e-8`) yields the exponent, clamped to
/// `u8::MAX`. Malformed exponents yield zero.
#[must_use]
pub fn precision_from_str(s: &str) -> u8 {
    let s = s.trim().to_ascii_lowercase();

    if let Some((_, exponent)) = s.split_once("e-") {
        return exponent
            .parse::<u64>()
            .map_or(0, |exp| u8::try_from(exp).unwrap_or(u8::MAX));
    }

    match s.split_once('.') {
        Some((_, fraction)) => u8::try_from(fraction.len()).unwrap_or(u8::MAX),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 0)]
    #[case("0", 0)]
    #[case("100", 0)]
    #[case("2.5", 1)]
    #[case("1.00010", 5)]
    #[case(" 102.60 ", 2)]
    #[case("1e-8", 8)]
    #[case("1E-3", 3)]
    #[case("1e-x", 0)]
    fn test_precision_from_str(#[case] input: &str, #[case] expected: u8) {
        assert_eq!(precision_from_str(input), expected);
    }
}

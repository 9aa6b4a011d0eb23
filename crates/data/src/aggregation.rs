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

//! Brick aggregation machinery.
//!
//! Defines the [`BrickSpec`] describing how bricks are formed and the [`BrickAggregator`]
//! which consumes ordered market updates for one instrument and emits completed bricks.

use std::{fmt::Debug, sync::Arc};

use renko_core::{
    UnixNanos,
    correctness::{check_in_range_inclusive_f64, check_positive_f64},
};
use renko_model::{
    data::{Brick, MarketUpdate, QuoteTick},
    enums::{BrickDirection, PriceType},
    identifiers::InstrumentId,
    types::{
        Price, Quantity,
        fixed::{check_fixed_precision, f64_to_fixed_i64, f64_to_fixed_u64, is_on_fixed_grid},
        price::{PRICE_MAX, PRICE_MIN, PriceRaw},
        quantity::{QUANTITY_MAX, QuantityRaw},
    },
};

use crate::error::BrickError;

/// A pure function selecting a scalar (value or volume) from a raw market update.
pub type Selector<T> = Arc<dyn Fn(&T) -> f64 + Send + Sync>;

/// Returns a value selector for quotes using the given `price_type`.
///
/// # Errors
///
/// Returns [`BrickError::InvalidConfiguration`] for [`PriceType::Last`], which quotes do not carry.
pub fn quote_value_selector(price_type: PriceType) -> Result<Selector<QuoteTick>, BrickError> {
    check_quote_price_type(price_type)?;
    Ok(Arc::new(move |quote: &QuoteTick| {
        quote
            .extract_price(price_type)
            .map_or(f64::NAN, |price| price.as_f64())
    }))
}

/// Returns a volume selector for quotes using the size on the side given by `price_type`.
///
/// # Errors
///
/// Returns [`BrickError::InvalidConfiguration`] for [`PriceType::Last`], which quotes do not carry.
pub fn quote_volume_selector(price_type: PriceType) -> Result<Selector<QuoteTick>, BrickError> {
    check_quote_price_type(price_type)?;
    Ok(Arc::new(move |quote: &QuoteTick| {
        quote
            .extract_size(price_type)
            .map_or(f64::NAN, |size| size.as_f64())
    }))
}

fn check_quote_price_type(price_type: PriceType) -> Result<(), BrickError> {
    if price_type == PriceType::Last {
        return Err(BrickError::InvalidConfiguration(format!(
            "price type {price_type} is not available for quotes"
        )));
    }
    Ok(())
}

/// Describes how bricks are formed: the brick size, output precisions and the selectors used to
/// read a value and a volume from each raw update.
///
/// A spec is immutable once built. Changing the brick size requires a new aggregator.
pub struct BrickSpec<T> {
    brick_size: Price,
    price_precision: u8,
    size_precision: u8,
    value_selector: Selector<T>,
    volume_selector: Selector<T>,
}

impl<T> Clone for BrickSpec<T> {
    fn clone(&self) -> Self {
        Self {
            brick_size: self.brick_size,
            price_precision: self.price_precision,
            size_precision: self.size_precision,
            value_selector: Arc::clone(&self.value_selector),
            volume_selector: Arc::clone(&self.volume_selector),
        }
    }
}

impl<T> Debug for BrickSpec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(BrickSpec))
            .field("brick_size", &self.brick_size)
            .field("price_precision", &self.price_precision)
            .field("size_precision", &self.size_precision)
            .finish_non_exhaustive()
    }
}

impl<T: MarketUpdate + 'static> BrickSpec<T> {
    /// Creates a new [`BrickSpec`] using the default [`MarketUpdate`] value and volume selectors.
    ///
    /// # Errors
    ///
    /// Returns [`BrickError::InvalidConfiguration`] if:
    /// - `brick_size` is not positive and finite, or rounds to zero at `price_precision`.
    /// - `price_precision` or `size_precision` exceeds the fixed-point maximum.
    pub fn new(brick_size: f64, price_precision: u8, size_precision: u8) -> Result<Self, BrickError> {
        Self::with_selectors(
            brick_size,
            price_precision,
            size_precision,
            Arc::new(T::value),
            Arc::new(T::volume),
        )
    }
}

impl BrickSpec<QuoteTick> {
    /// Creates a new [`BrickSpec`] for quotes, selecting values and sizes by `price_type`.
    ///
    /// # Errors
    ///
    /// Returns [`BrickError::InvalidConfiguration`] if the brick size or precisions are invalid,
    /// or if `price_type` is [`PriceType::Last`].
    pub fn for_quotes(
        brick_size: f64,
        price_precision: u8,
        size_precision: u8,
        price_type: PriceType,
    ) -> Result<Self, BrickError> {
        Self::with_selectors(
            brick_size,
            price_precision,
            size_precision,
            quote_value_selector(price_type)?,
            quote_volume_selector(price_type)?,
        )
    }
}

impl<T> BrickSpec<T> {
    /// Creates a new [`BrickSpec`] with the given selectors.
    ///
    /// Selectors must be pure: the same update always yields the same scalar.
    ///
    /// # Errors
    ///
    /// Returns [`BrickError::InvalidConfiguration`] if the brick size or precisions are invalid.
    pub fn with_selectors(
        brick_size: f64,
        price_precision: u8,
        size_precision: u8,
        value_selector: Selector<T>,
        volume_selector: Selector<T>,
    ) -> Result<Self, BrickError> {
        let brick_size = brick_size_checked(brick_size, price_precision)?;
        check_fixed_precision(size_precision)
            .map_err(|e| BrickError::InvalidConfiguration(format!("size_precision: {e}")))?;

        Ok(Self {
            brick_size,
            price_precision,
            size_precision,
            value_selector,
            volume_selector,
        })
    }

    /// Returns this spec with the value selector replaced.
    #[must_use]
    pub fn with_value_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.value_selector = Arc::new(selector);
        self
    }

    /// Returns this spec with the volume selector replaced.
    #[must_use]
    pub fn with_volume_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.volume_selector = Arc::new(selector);
        self
    }

    /// Returns the brick size.
    #[must_use]
    pub const fn brick_size(&self) -> Price {
        self.brick_size
    }

    /// Returns the precision of brick prices.
    #[must_use]
    pub const fn price_precision(&self) -> u8 {
        self.price_precision
    }

    /// Returns the precision of brick volumes.
    #[must_use]
    pub const fn size_precision(&self) -> u8 {
        self.size_precision
    }

    /// Applies the value selector to `raw`.
    pub fn select_value(&self, raw: &T) -> f64 {
        (self.value_selector)(raw)
    }

    /// Applies the volume selector to `raw`.
    pub fn select_volume(&self, raw: &T) -> f64 {
        (self.volume_selector)(raw)
    }
}

/// Validates `brick_size` and converts it to a [`Price`] at `price_precision`.
///
/// # Errors
///
/// Returns [`BrickError::InvalidConfiguration`] if the size is not positive, exceeds the price
/// range, rounds to zero at `price_precision`, or if `price_precision` is out of range.
pub fn brick_size_checked(brick_size: f64, price_precision: u8) -> Result<Price, BrickError> {
    check_fixed_precision(price_precision)
        .map_err(|e| BrickError::InvalidConfiguration(format!("price_precision: {e}")))?;
    check_positive_f64(brick_size, "brick_size")
        .and_then(|()| check_in_range_inclusive_f64(brick_size, 0.0, PRICE_MAX, "brick_size"))
        .map_err(|e| BrickError::InvalidConfiguration(e.to_string()))?;

    let raw = f64_to_fixed_i64(brick_size, price_precision);
    if raw <= 0 {
        return Err(BrickError::InvalidConfiguration(format!(
            "brick_size {brick_size} is smaller than one increment at precision {price_precision}"
        )));
    }
    Ok(Price::from_raw(raw, price_precision))
}

/// A read-only snapshot of the brick currently forming inside an aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingBrick {
    /// The instrument ID the aggregator was seeded with.
    pub instrument_id: InstrumentId,
    /// The open of the forming brick (the last brick close, or the seed value).
    pub open: Price,
    /// The highest value seen while the brick was forming.
    pub high: Price,
    /// The lowest value seen while the brick was forming.
    pub low: Price,
    /// The volume absorbed but not yet attributed to an emitted brick.
    pub volume: Quantity,
    /// UNIX timestamp (nanoseconds) when the brick began forming.
    pub ts_open: UnixNanos,
    /// UNIX timestamp (nanoseconds) of the last accepted update.
    pub ts_last: UnixNanos,
    /// The direction of the most recently emitted brick, `None` until the first brick.
    pub last_direction: Option<BrickDirection>,
}

#[derive(Clone, Copy, Debug)]
struct AggregatorState {
    instrument_id: InstrumentId,
    open: PriceRaw,
    high: PriceRaw,
    low: PriceRaw,
    volume: QuantityRaw,
    ts_open: UnixNanos,
    ts_last: UnixNanos,
    last_direction: Option<BrickDirection>,
}

impl AggregatorState {
    const fn seed(
        instrument_id: InstrumentId,
        value: PriceRaw,
        volume: QuantityRaw,
        ts_event: UnixNanos,
    ) -> Self {
        Self {
            instrument_id,
            open: value,
            high: value,
            low: value,
            volume,
            ts_open: ts_event,
            ts_last: ts_event,
            last_direction: None,
        }
    }

    fn reset(&mut self, close: PriceRaw, ts_event: UnixNanos, direction: BrickDirection) {
        self.open = close;
        self.high = close;
        self.low = close;
        self.volume = 0;
        self.ts_open = ts_event;
        self.last_direction = Some(direction);
    }
}

/// Routes emitted bricks to the live handler, or to a batch handler while batch mode is active.
struct BrickSender<H>
where
    H: FnMut(Brick),
{
    handler: H,
    batch_handler: Option<Box<dyn FnMut(Brick) + Send>>,
}

impl<H: FnMut(Brick)> BrickSender<H> {
    fn send(&mut self, brick: Brick) {
        if let Some(handler) = &mut self.batch_handler {
            handler(brick);
        } else {
            (self.handler)(brick);
        }
    }
}

/// Consumes an ordered stream of updates for a single instrument and emits a [`Brick`] each time
/// the selected value has moved one brick size away from the current brick open.
///
/// Bricks are pushed synchronously to the handler, in chronological close order, one call per
/// brick. When a single update crosses several brick boundaries, every brick is emitted from
/// that one call; all volume accumulated since the previous brick is attributed to the first of
/// them and the remaining bricks carry zero volume.
///
/// All brick arithmetic is performed on raw fixed-point integers, so every emitted brick spans
/// exactly the brick size.
pub struct BrickAggregator<T, H>
where
    H: FnMut(Brick),
{
    spec: BrickSpec<T>,
    sender: BrickSender<H>,
    state: Option<AggregatorState>,
    brick_count: usize,
}

impl<T, H: FnMut(Brick)> Debug for BrickAggregator<T, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(BrickAggregator))
            .field("spec", &self.spec)
            .field("state", &self.state)
            .field("brick_count", &self.brick_count)
            .field("batch_mode", &self.is_batch_mode())
            .finish()
    }
}

impl<T, H> BrickAggregator<T, H>
where
    H: FnMut(Brick),
{
    /// Creates a new [`BrickAggregator`] instance.
    pub fn new(spec: BrickSpec<T>, handler: H) -> Self {
        Self {
            spec,
            sender: BrickSender {
                handler,
                batch_handler: None,
            },
            state: None,
            brick_count: 0,
        }
    }

    /// Returns the brick spec for the aggregator.
    pub const fn spec(&self) -> &BrickSpec<T> {
        &self.spec
    }

    /// Returns the brick size.
    pub const fn brick_size(&self) -> Price {
        self.spec.brick_size
    }

    /// Returns the instrument ID the aggregator was seeded with, `None` before the first update.
    pub fn instrument_id(&self) -> Option<InstrumentId> {
        self.state.map(|state| state.instrument_id)
    }

    /// Returns the direction of the most recently emitted brick.
    pub fn last_direction(&self) -> Option<BrickDirection> {
        self.state.and_then(|state| state.last_direction)
    }

    /// Returns the total number of bricks emitted over the life of the aggregator.
    pub const fn brick_count(&self) -> usize {
        self.brick_count
    }

    /// Returns `true` once the first valid update has been applied.
    pub const fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Returns `true` while bricks are routed to a batch handler.
    pub const fn is_batch_mode(&self) -> bool {
        self.sender.batch_handler.is_some()
    }

    /// Returns a snapshot of the brick currently forming, `None` before the first update.
    pub fn pending(&self) -> Option<PendingBrick> {
        let precision = self.spec.price_precision;
        self.state.map(|state| PendingBrick {
            instrument_id: state.instrument_id,
            open: Price::from_raw(state.open, precision),
            high: Price::from_raw(state.high, precision),
            low: Price::from_raw(state.low, precision),
            volume: Quantity::from_raw(state.volume, self.spec.size_precision),
            ts_open: state.ts_open,
            ts_last: state.ts_last,
            last_direction: state.last_direction,
        })
    }

    /// Routes bricks to `handler` instead of the live handler until [`Self::stop_batch_update`].
    ///
    /// Aggregation state carries across the switch in both directions.
    pub fn start_batch_update(&mut self, handler: Box<dyn FnMut(Brick) + Send>) {
        self.sender.batch_handler = Some(handler);
    }

    /// Drops the batch handler and resumes sending bricks to the live handler.
    pub fn stop_batch_update(&mut self) {
        self.sender.batch_handler = None;
    }
}

impl<T, H> BrickAggregator<T, H>
where
    T: MarketUpdate,
    H: FnMut(Brick),
{
    /// Applies the given update to the aggregator, returning the number of bricks emitted.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the aggregator unchanged if:
    /// - The selected value is not finite, is outside the representable price range, or is not
    ///   on the grid of the price precision.
    /// - The selected volume is negative, not finite, outside the representable range, or not on
    ///   the grid of the size precision.
    /// - The update is for a different instrument than the one the aggregator was seeded with.
    /// - The update timestamp is earlier than the last accepted timestamp.
    /// - The accumulated volume or the number of bricks crossed cannot be represented.
    pub fn update(&mut self, raw: &T) -> Result<usize, BrickError> {
        let instrument_id = raw.instrument_id();
        let ts_event = raw.ts_event();
        let (value, volume) = self.validate(raw, instrument_id, ts_event)?;
        let brick_size = self.spec.brick_size.raw;

        let Some(state) = self.state.as_mut() else {
            log::debug!(
                "Seeded brick aggregator for {instrument_id} at {} (brick_size={})",
                Price::from_raw(value, self.spec.price_precision),
                self.spec.brick_size,
            );
            self.state = Some(AggregatorState::seed(instrument_id, value, volume, ts_event));
            return Ok(0);
        };

        // Checked before mutating so a rejected update leaves the state unchanged
        let total_volume = state.volume.checked_add(volume).ok_or_else(|| {
            BrickError::InvalidObservation(format!(
                "volume {volume} overflows the accumulated volume {}",
                state.volume
            ))
        })?;
        let diff = i128::from(value) - i128::from(state.open);
        let count = crossed_bricks(diff, brick_size)?;

        state.high = state.high.max(value);
        state.low = state.low.min(value);
        state.volume = total_volume;
        state.ts_last = ts_event;

        if count == 0 {
            return Ok(0);
        }

        let direction = if diff > 0 {
            BrickDirection::Up
        } else {
            BrickDirection::Down
        };
        let step = direction.sign() * brick_size;
        let price_precision = self.spec.price_precision;
        let size_precision = self.spec.size_precision;

        for _ in 0..count {
            let open = state.open;
            let close = open + step;
            let (high, low) = match direction {
                BrickDirection::Up => (close, state.low.min(open)),
                BrickDirection::Down => (state.high.max(open), close),
            };

            let brick = Brick {
                instrument_id,
                direction,
                open: Price::from_raw(open, price_precision),
                high: Price::from_raw(high, price_precision),
                low: Price::from_raw(low, price_precision),
                close: Price::from_raw(close, price_precision),
                volume: Quantity::from_raw(state.volume, size_precision),
                ts_open: state.ts_open,
                ts_close: ts_event,
            };

            state.reset(close, ts_event, direction);
            self.brick_count += 1;
            log::trace!("Brick {brick}");
            self.sender.send(brick);
        }

        // Residual move since the last close belongs to the brick now forming
        state.high = state.high.max(value);
        state.low = state.low.min(value);

        Ok(count)
    }

    fn validate(
        &self,
        raw: &T,
        instrument_id: InstrumentId,
        ts_event: UnixNanos,
    ) -> Result<(PriceRaw, QuantityRaw), BrickError> {
        let price_precision = self.spec.price_precision;
        let size_precision = self.spec.size_precision;

        let value = self.spec.select_value(raw);
        check_in_range_inclusive_f64(value, PRICE_MIN, PRICE_MAX, "value")
            .map_err(|e| BrickError::InvalidObservation(e.to_string()))?;
        if !is_on_fixed_grid(value, price_precision) {
            return Err(BrickError::InvalidObservation(format!(
                "value {value} is not on the grid of price precision {price_precision}"
            )));
        }

        let volume = self.spec.select_volume(raw);
        check_in_range_inclusive_f64(volume, 0.0, QUANTITY_MAX, "volume")
            .map_err(|e| BrickError::InvalidObservation(e.to_string()))?;
        if !is_on_fixed_grid(volume, size_precision) {
            return Err(BrickError::InvalidObservation(format!(
                "volume {volume} is not on the grid of size precision {size_precision}"
            )));
        }

        if let Some(state) = &self.state {
            if state.instrument_id != instrument_id {
                return Err(BrickError::InvalidObservation(format!(
                    "instrument {instrument_id} does not match aggregator instrument {}",
                    state.instrument_id
                )));
            }
            if ts_event < state.ts_last {
                return Err(BrickError::OutOfOrderObservation {
                    ts_event,
                    ts_last: state.ts_last,
                });
            }
        }

        Ok((
            f64_to_fixed_i64(value, price_precision),
            f64_to_fixed_u64(volume, size_precision),
        ))
    }
}

/// Returns the number of whole bricks spanned by the raw move `diff`.
///
/// The move is taken in `i128` since two in-range prices can be further apart than `i64::MAX`.
fn crossed_bricks(diff: i128, brick_size: PriceRaw) -> Result<usize, BrickError> {
    let count = diff.unsigned_abs() / u128::from(brick_size.unsigned_abs());
    usize::try_from(count).map_err(|_| {
        BrickError::InvalidObservation(format!("move of {count} bricks cannot be emitted"))
    })
}

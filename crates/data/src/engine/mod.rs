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

//! Provides a `BrickEngine` which routes market updates to one brick aggregator per instrument.
//!
//! Aggregators are created lazily on the first update for an instrument, using the instrument
//! override from [`BrickEngineConfig`] when present and the engine defaults otherwise. Every
//! brick emitted by any aggregator is forwarded to the single engine handler in emission order.

pub mod config;

use std::{cell::RefCell, collections::hash_map::Entry, fmt::Debug, rc::Rc, sync::Arc};

use ahash::AHashMap;
use config::BrickEngineConfig;
use renko_model::{
    data::{Brick, MarketUpdate, QuoteTick},
    identifiers::InstrumentId,
};

use crate::{
    aggregation::{BrickAggregator, BrickSpec, Selector, quote_value_selector, quote_volume_selector},
    error::BrickError,
};

/// The aggregator type owned by a [`BrickEngine`] for each instrument.
pub type EngineAggregator<T> = BrickAggregator<T, Box<dyn FnMut(Brick)>>;

/// Routes market updates to per-instrument [`BrickAggregator`]s and forwards their bricks.
pub struct BrickEngine<T, H>
where
    H: FnMut(Brick),
{
    config: BrickEngineConfig,
    value_selector: Selector<T>,
    volume_selector: Selector<T>,
    aggregators: AHashMap<InstrumentId, EngineAggregator<T>>,
    buffer: Rc<RefCell<Vec<Brick>>>,
    handler: H,
    rejected_count: usize,
}

impl<T, H: FnMut(Brick)> Debug for BrickEngine<T, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(BrickEngine))
            .field("config", &self.config)
            .field("aggregators", &self.aggregators.len())
            .field("rejected_count", &self.rejected_count)
            .finish()
    }
}

impl<T, H> BrickEngine<T, H>
where
    T: MarketUpdate + 'static,
    H: FnMut(Brick),
{
    /// Creates a new [`BrickEngine`] using the default [`MarketUpdate`] selectors.
    ///
    /// # Errors
    ///
    /// Returns [`BrickError::InvalidConfiguration`] if `config` fails validation.
    pub fn new(config: BrickEngineConfig, handler: H) -> Result<Self, BrickError> {
        Self::with_selectors(config, Arc::new(T::value), Arc::new(T::volume), handler)
    }
}

impl<H: FnMut(Brick)> BrickEngine<QuoteTick, H> {
    /// Creates a new [`BrickEngine`] for quotes, selecting by `config.price_type`.
    ///
    /// # Errors
    ///
    /// Returns [`BrickError::InvalidConfiguration`] if `config` fails validation or its price
    /// type is not available for quotes.
    pub fn for_quotes(config: BrickEngineConfig, handler: H) -> Result<Self, BrickError> {
        let value_selector = quote_value_selector(config.price_type)?;
        let volume_selector = quote_volume_selector(config.price_type)?;
        Self::with_selectors(config, value_selector, volume_selector, handler)
    }
}

impl<T, H> BrickEngine<T, H>
where
    T: MarketUpdate,
    H: FnMut(Brick),
{
    /// Creates a new [`BrickEngine`] sharing the given selectors across all aggregators.
    ///
    /// # Errors
    ///
    /// Returns [`BrickError::InvalidConfiguration`] if `config` fails validation.
    pub fn with_selectors(
        config: BrickEngineConfig,
        value_selector: Selector<T>,
        volume_selector: Selector<T>,
        handler: H,
    ) -> Result<Self, BrickError> {
        config.validate()?;

        Ok(Self {
            config,
            value_selector,
            volume_selector,
            aggregators: AHashMap::new(),
            buffer: Rc::new(RefCell::new(Vec::new())),
            handler,
            rejected_count: 0,
        })
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &BrickEngineConfig {
        &self.config
    }

    /// Returns the aggregator for `instrument_id`, if one has been created.
    #[must_use]
    pub fn aggregator(&self, instrument_id: &InstrumentId) -> Option<&EngineAggregator<T>> {
        self.aggregators.get(instrument_id)
    }

    /// Returns the IDs of all instruments with an aggregator, sorted.
    #[must_use]
    pub fn instrument_ids(&self) -> Vec<InstrumentId> {
        let mut ids: Vec<InstrumentId> = self.aggregators.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Removes and returns the aggregator for `instrument_id`, discarding its pending brick.
    pub fn remove(&mut self, instrument_id: &InstrumentId) -> Option<EngineAggregator<T>> {
        let aggregator = self.aggregators.remove(instrument_id);
        if aggregator.is_some() {
            log::debug!("Removed brick aggregator for {instrument_id}");
        }
        aggregator
    }

    /// Returns the number of aggregators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aggregators.len()
    }

    /// Returns `true` if no aggregator has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aggregators.is_empty()
    }

    /// Returns the number of updates rejected so far, skipped or not.
    #[must_use]
    pub const fn rejected_count(&self) -> usize {
        self.rejected_count
    }

    /// Routes `raw` to the aggregator for its instrument, returning the number of bricks emitted.
    ///
    /// # Errors
    ///
    /// Returns the aggregator error for a rejected update, unless `skip_invalid` is configured,
    /// in which case the update is logged and skipped. Configuration errors always propagate.
    pub fn process(&mut self, raw: &T) -> Result<usize, BrickError> {
        let result = self.route(raw);

        for brick in self.buffer.borrow_mut().drain(..) {
            (self.handler)(brick);
        }

        match result {
            Ok(count) => Ok(count),
            Err(e) => {
                self.rejected_count += 1;
                if self.config.skip_invalid && e.is_update_error() {
                    log::warn!("Skipped update for {}: {e}", raw.instrument_id());
                    Ok(0)
                } else {
                    Err(e)
                }
            }
        }
    }

    fn route(&mut self, raw: &T) -> Result<usize, BrickError> {
        let instrument_id = raw.instrument_id();
        let aggregator = match self.aggregators.entry(instrument_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let (brick_size, price_precision, size_precision) =
                    self.config.resolve(&instrument_id);
                let spec = BrickSpec::with_selectors(
                    brick_size,
                    price_precision,
                    size_precision,
                    Arc::clone(&self.value_selector),
                    Arc::clone(&self.volume_selector),
                )?;
                log::debug!("Creating brick aggregator for {instrument_id}: {spec:?}");

                let buffer = Rc::clone(&self.buffer);
                let handler: Box<dyn FnMut(Brick)> =
                    Box::new(move |brick: Brick| buffer.borrow_mut().push(brick));
                entry.insert(BrickAggregator::new(spec, handler))
            }
        };

        aggregator.update(raw)
    }
}

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

//! Integration tests for brick aggregation invariants over arbitrary observation streams.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use renko_core::{MUTEX_POISONED, UnixNanos};
use renko_data::{
    BrickError,
    aggregation::{BrickAggregator, BrickSpec, PendingBrick},
};
use renko_model::{
    data::{Brick, Observation},
    identifiers::InstrumentId,
    stubs::instrument_id_audusd_sim,
    types::{
        Price, Quantity,
        price::{PRICE_MAX, PriceRaw},
    },
};
use rstest::rstest;

const BRICK_SIZE: f64 = 2.5;
const PRICE_PRECISION: u8 = 2;
const SIZE_PRECISION: u8 = 1;

/// The outcome of replaying a sequence of updates through one aggregator.
struct Replayed {
    bricks: Vec<Brick>,
    pending: Option<PendingBrick>,
    accepted: Vec<(f64, f64)>,
}

/// Replays `(value, volume)` pairs with increasing timestamps through an aggregator built with
/// the given brick size and precisions.
fn replay_with(
    instrument_id: InstrumentId,
    brick_size: f64,
    price_precision: u8,
    updates: &[(f64, f64)],
) -> Replayed {
    let spec =
        BrickSpec::<Observation>::new(brick_size, price_precision, SIZE_PRECISION).unwrap();
    let bricks = Arc::new(Mutex::new(Vec::new()));
    let bricks_clone = Arc::clone(&bricks);
    let mut aggregator = BrickAggregator::new(spec, move |brick: Brick| {
        bricks_clone.lock().expect(MUTEX_POISONED).push(brick);
    });

    let mut accepted = Vec::new();
    for (i, (value, volume)) in updates.iter().enumerate() {
        let obs = Observation::new(instrument_id, *value, *volume, UnixNanos::from(i as u64));
        if aggregator.update(&obs).is_ok() {
            accepted.push((*value, *volume));
        }
    }

    let bricks = bricks.lock().expect(MUTEX_POISONED).clone();
    Replayed {
        bricks,
        pending: aggregator.pending(),
        accepted,
    }
}

fn replay(
    instrument_id: InstrumentId,
    updates: &[(f64, f64)],
) -> (Vec<Brick>, Option<PendingBrick>) {
    let replayed = replay_with(instrument_id, BRICK_SIZE, PRICE_PRECISION, updates);
    (replayed.bricks, replayed.pending)
}

fn brick_size_raw() -> PriceRaw {
    Price::new(BRICK_SIZE, PRICE_PRECISION).raw
}

/// Values in thousandths and volumes in hundredths, so roughly nine in ten values and volumes
/// fall between the grid points of the aggregator precisions.
fn updates_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((50_000_i64..150_000, 0_u32..10_000), 1..200).prop_map(|v| {
        v.into_iter()
            .map(|(mills, hundredths)| (mills as f64 / 1000.0, f64::from(hundredths) / 100.0))
            .collect()
    })
}

/// Integer values spanning the whole representable price range.
fn extreme_updates_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    let bound = PRICE_MAX as i64;
    prop::collection::vec(
        prop_oneof![Just(-bound), Just(bound), -bound..=bound],
        1..20,
    )
    .prop_map(|v| v.into_iter().map(|value| (value as f64, 0.0)).collect())
}

fn on_grid(value: f64, precision: u8) -> bool {
    let scale = 10_f64.powi(i32::from(precision));
    ((value * scale).round() / scale - value).abs() < 1e-9
}

#[rstest]
fn test_gap_of_three_brick_sizes_emits_three_bricks() {
    let (bricks, pending) = replay(instrument_id_audusd_sim(), &[(100.0, 1.0), (107.5, 1.0)]);

    assert_eq!(bricks.len(), 3);
    assert_eq!(bricks[2].close, Price::from("107.50"));
    assert_eq!(pending.unwrap().open, Price::from("107.50"));
}

#[rstest]
fn test_scenario_up_then_down() {
    let updates = [(100.0, 0.0), (101.0, 0.0), (102.6, 0.0), (105.3, 0.0), (99.9, 0.0)];
    let (bricks, pending) = replay(instrument_id_audusd_sim(), &updates);

    let path: Vec<(Price, Price)> = bricks.iter().map(|b| (b.open, b.close)).collect();
    assert_eq!(
        path,
        vec![
            (Price::from("100.00"), Price::from("102.50")),
            (Price::from("102.50"), Price::from("105.00")),
            (Price::from("105.00"), Price::from("102.50")),
            (Price::from("102.50"), Price::from("100.00")),
        ]
    );
    // Third brick (first of the down move) carries the pre-move high
    assert_eq!(bricks[2].high, Price::from("105.30"));
    assert_eq!(pending.unwrap().low, Price::from("99.90"));
}

proptest! {
    #[rstest]
    fn prop_bricks_have_fixed_magnitude_and_valid_extremes(updates in updates_strategy()) {
        let (bricks, _) = replay(instrument_id_audusd_sim(), &updates);

        for brick in &bricks {
            prop_assert_eq!((brick.close.raw - brick.open.raw).abs(), brick_size_raw());
            prop_assert!(brick.high >= brick.open && brick.high >= brick.close);
            prop_assert!(brick.low <= brick.open && brick.low <= brick.close);
            prop_assert!(brick.ts_open <= brick.ts_close);
            prop_assert!(Brick::new_checked(
                brick.instrument_id,
                brick.direction,
                brick.open,
                brick.high,
                brick.low,
                brick.close,
                brick.volume,
                brick.ts_open,
                brick.ts_close,
            )
            .is_ok());
        }
    }

    #[rstest]
    fn prop_bricks_are_contiguous_and_chronological(updates in updates_strategy()) {
        let (bricks, pending) = replay(instrument_id_audusd_sim(), &updates);

        for pair in bricks.windows(2) {
            prop_assert_eq!(pair[1].open, pair[0].close);
            prop_assert!(pair[1].ts_close >= pair[0].ts_close);
            prop_assert!(pair[1].ts_open >= pair[0].ts_open);
        }
        if let (Some(last), Some(pending)) = (bricks.last(), pending) {
            prop_assert_eq!(pending.open, last.close);
            prop_assert_eq!(pending.last_direction, Some(last.direction));
        }
    }

    #[rstest]
    fn prop_only_off_grid_updates_are_rejected(updates in updates_strategy()) {
        let replayed =
            replay_with(instrument_id_audusd_sim(), BRICK_SIZE, PRICE_PRECISION, &updates);

        let expected: Vec<(f64, f64)> = updates
            .iter()
            .copied()
            .filter(|(value, volume)| {
                on_grid(*value, PRICE_PRECISION) && on_grid(*volume, SIZE_PRECISION)
            })
            .collect();
        prop_assert_eq!(replayed.accepted, expected);
    }

    #[rstest]
    fn prop_volume_is_conserved(updates in updates_strategy()) {
        let replayed =
            replay_with(instrument_id_audusd_sim(), BRICK_SIZE, PRICE_PRECISION, &updates);

        let input: u64 = replayed
            .accepted
            .iter()
            .map(|(_, volume)| Quantity::new(*volume, SIZE_PRECISION).raw)
            .sum();
        let emitted: u64 = replayed.bricks.iter().map(|b| b.volume.raw).sum();
        let pending = replayed.pending.map_or(0, |p| p.volume.raw);
        prop_assert_eq!(emitted + pending, input);
    }

    #[rstest]
    fn prop_pending_move_stays_below_brick_size(updates in updates_strategy()) {
        let replayed =
            replay_with(instrument_id_audusd_sim(), BRICK_SIZE, PRICE_PRECISION, &updates);
        let Some(&(last, _)) = replayed.accepted.last() else {
            prop_assert!(replayed.pending.is_none());
            return Ok(());
        };
        let pending = replayed.pending.unwrap();
        let last = Price::new(last, PRICE_PRECISION);

        prop_assert!((last.raw - pending.open.raw).abs() < brick_size_raw());
        prop_assert!(pending.high.raw - pending.open.raw < brick_size_raw());
        prop_assert!(pending.open.raw - pending.low.raw < brick_size_raw());
    }

    #[rstest]
    fn prop_extreme_values_are_aggregated(updates in extreme_updates_strategy()) {
        let replayed = replay_with(instrument_id_audusd_sim(), 100_000_000.0, 0, &updates);

        prop_assert_eq!(replayed.accepted.len(), updates.len());
        let brick_size = Price::new(100_000_000.0, 0).raw;
        for brick in &replayed.bricks {
            prop_assert_eq!((brick.close.raw - brick.open.raw).abs(), brick_size);
        }
        for pair in replayed.bricks.windows(2) {
            prop_assert_eq!(pair[1].open, pair[0].close);
        }
    }

    #[rstest]
    fn prop_rejected_updates_do_not_change_output(
        updates in updates_strategy(),
        insert_at in any::<prop::sample::Index>(),
    ) {
        let clean = replay(instrument_id_audusd_sim(), &updates);

        let mut polluted = updates.clone();
        let at = insert_at.index(polluted.len() + 1);
        polluted.insert(at, (f64::NAN, 1.0));
        polluted.insert(at, (100.0, -1.0));

        // Timestamps shift with the inserted rows, which leaves ordering intact
        let dirty = replay(instrument_id_audusd_sim(), &polluted);

        let strip = |bricks: &[Brick]| -> Vec<(Price, Price, u64)> {
            bricks.iter().map(|b| (b.open, b.close, b.volume.raw)).collect()
        };
        prop_assert_eq!(strip(&clean.0), strip(&dirty.0));
        prop_assert_eq!(clean.1.map(|p| (p.open, p.high, p.low, p.volume)),
            dirty.1.map(|p| (p.open, p.high, p.low, p.volume)));
    }
}

#[rstest]
fn test_out_of_order_update_is_rejected_without_side_effects() {
    let spec = BrickSpec::<Observation>::new(BRICK_SIZE, PRICE_PRECISION, 0).unwrap();
    let mut aggregator = BrickAggregator::new(spec, |_: Brick| panic!("no brick expected"));
    let id = instrument_id_audusd_sim();

    aggregator
        .update(&Observation::new(id, 100.0, 1.0, UnixNanos::from(5)))
        .unwrap();
    let before = aggregator.pending();
    let result = aggregator.update(&Observation::new(id, 200.0, 1.0, UnixNanos::from(4)));

    assert!(matches!(result, Err(BrickError::OutOfOrderObservation { .. })));
    assert_eq!(aggregator.pending(), before);
}

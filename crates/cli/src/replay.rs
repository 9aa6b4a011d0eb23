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

//! Replays an observations CSV through a `BrickEngine` and writes the emitted bricks.

use std::{
    cell::RefCell,
    fs::File,
    io::{self, BufWriter, Read, Write},
    rc::Rc,
};

use anyhow::Context;
use renko_core::{UnixNanos, nanos::DurationNanos};
use renko_data::engine::{BrickEngine, config::BrickEngineConfig};
use renko_model::{
    data::{Brick, Observation},
    identifiers::InstrumentId,
};
use serde::Deserialize;

use crate::opt::{BricksOpt, OutputFormat};

/// A row of the input CSV.
#[derive(Debug, Deserialize)]
struct ObservationRecord {
    instrument_id: String,
    ts_event: String,
    value: f64,
    #[serde(default)]
    volume: Option<f64>,
}

impl ObservationRecord {
    fn into_observation(self) -> anyhow::Result<Observation> {
        let instrument_id: InstrumentId = self.instrument_id.parse()?;
        let ts_event: UnixNanos = self.ts_event.parse()?;
        Ok(Observation::new(
            instrument_id,
            self.value,
            self.volume.unwrap_or_default(),
            ts_event,
        ))
    }
}

/// Counts reported at the end of a replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Observations read from the input.
    pub processed: usize,
    /// Bricks written to the output.
    pub emitted: usize,
    /// Observations rejected by the engine (skipped or not).
    pub rejected: usize,
    /// Instruments seen.
    pub instruments: usize,
    /// Earliest observation timestamp read.
    pub first_ts: Option<UnixNanos>,
    /// Latest observation timestamp read.
    pub last_ts: Option<UnixNanos>,
}

impl ReplaySummary {
    fn record_ts(&mut self, ts: UnixNanos) {
        self.first_ts = Some(self.first_ts.map_or(ts, |first| first.min(ts)));
        self.last_ts = Some(self.last_ts.map_or(ts, |last| last.max(ts)));
    }

    /// Returns the time spanned by the observations read, `None` when nothing was read.
    #[must_use]
    pub fn span(&self) -> Option<DurationNanos> {
        let (first, last) = (self.first_ts?, self.last_ts?);
        last.duration_since(&first)
    }
}

enum BrickWriter<W: Write> {
    Csv(csv::Writer<W>),
    Json(W),
}

impl<W: Write> BrickWriter<W> {
    fn new(writer: W, format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => Self::Csv(csv::Writer::from_writer(writer)),
            OutputFormat::Json => Self::Json(writer),
        }
    }

    fn write(&mut self, brick: &Brick) -> anyhow::Result<()> {
        match self {
            Self::Csv(writer) => writer.serialize(brick)?,
            Self::Json(writer) => {
                serde_json::to_writer(&mut *writer, brick)?;
                writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Csv(writer) => writer.flush(),
            Self::Json(writer) => writer.flush(),
        }
    }
}

/// Builds the engine config from the options, loading `--config` when given.
///
/// # Errors
///
/// Returns an error if the config file is invalid, if no brick size is available, or if the
/// resulting config fails validation.
pub fn resolve_config(opt: &BricksOpt) -> anyhow::Result<BrickEngineConfig> {
    let mut config = match (&opt.config, opt.brick_size) {
        (Some(path), _) => BrickEngineConfig::from_toml_file(path)?,
        (None, Some(brick_size)) => BrickEngineConfig::new(brick_size, 2, 0),
        (None, None) => anyhow::bail!("either `--config` or `--brick-size` is required"),
    };

    if let Some(brick_size) = opt.brick_size {
        config.brick_size = brick_size;
    }
    if let Some(price_precision) = opt.price_precision {
        config.price_precision = price_precision;
    }
    if let Some(size_precision) = opt.size_precision {
        config.size_precision = size_precision;
    }
    if opt.skip_invalid {
        config.skip_invalid = true;
    }

    config.validate()?;
    Ok(config)
}

/// Replays observations from `input` through an engine built from `config`, writing bricks to
/// `output` in the given `format`.
///
/// # Errors
///
/// Returns an error if a row cannot be parsed, an update is rejected while `skip_invalid` is
/// off, or writing fails.
pub fn replay<R: Read, W: Write>(
    config: BrickEngineConfig,
    input: R,
    output: W,
    format: OutputFormat,
) -> anyhow::Result<ReplaySummary> {
    let buffer: Rc<RefCell<Vec<Brick>>> = Rc::new(RefCell::new(Vec::new()));
    let buffer_clone = Rc::clone(&buffer);
    let mut engine = BrickEngine::<Observation, _>::new(config, move |brick: Brick| {
        buffer_clone.borrow_mut().push(brick);
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut writer = BrickWriter::new(output, format);
    let mut summary = ReplaySummary::default();

    for (i, record) in reader.deserialize::<ObservationRecord>().enumerate() {
        // Header is line 1
        let line = i + 2;
        let obs = record
            .map_err(anyhow::Error::from)
            .and_then(ObservationRecord::into_observation)
            .with_context(|| format!("invalid observation on line {line}"))?;
        summary.processed += 1;
        summary.record_ts(obs.ts_event);

        engine
            .process(&obs)
            .with_context(|| format!("rejected observation on line {line}"))?;

        for brick in buffer.borrow_mut().drain(..) {
            writer.write(&brick)?;
            summary.emitted += 1;
        }
    }

    writer.flush()?;
    summary.rejected = engine.rejected_count();
    summary.instruments = engine.len();
    Ok(summary)
}

/// Runs the `bricks` command.
///
/// # Errors
///
/// Returns an error if the config cannot be resolved, the input cannot be opened, or the replay
/// fails.
pub fn run_bricks_command(opt: BricksOpt) -> anyhow::Result<()> {
    let config = resolve_config(&opt)?;
    log::info!(
        "Replaying {} (brick_size={}, price_precision={}, size_precision={}, skip_invalid={})",
        opt.input.display(),
        config.brick_size,
        config.price_precision,
        config.size_precision,
        config.skip_invalid,
    );

    let input = File::open(&opt.input)
        .with_context(|| format!("failed to open input {}", opt.input.display()))?;
    let output: Box<dyn Write> = match &opt.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = replay(config, input, output, opt.format)?;
    log::info!(
        "Processed {} observations for {} instruments, emitted {} bricks, rejected {}",
        summary.processed,
        summary.instruments,
        summary.emitted,
        summary.rejected,
    );
    if let (Some(first), Some(last), Some(span)) =
        (summary.first_ts, summary.last_ts, summary.span())
    {
        log::info!(
            "Observations span {} to {} ({span}ns)",
            first.to_rfc3339(),
            last.to_rfc3339(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;

    use super::*;

    const INPUT: &str = "\
instrument_id,ts_event,value,volume
AUD/USD.SIM,1,100.0,1
AUD/USD.SIM,2,101.0,1
AUD/USD.SIM,3,102.6,1
AUD/USD.SIM,4,105.3,1
";

    fn run_replay(
        input: &str,
        config: BrickEngineConfig,
        format: OutputFormat,
    ) -> (ReplaySummary, String) {
        let mut output = Vec::new();
        let summary = replay(config, input.as_bytes(), &mut output, format).unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    fn bricks_opt() -> BricksOpt {
        BricksOpt {
            input: PathBuf::from("obs.csv"),
            config: None,
            brick_size: None,
            price_precision: None,
            size_precision: None,
            skip_invalid: false,
            output: None,
            format: OutputFormat::Csv,
        }
    }

    #[rstest]
    fn test_replay_csv() {
        let (summary, output) =
            run_replay(INPUT, BrickEngineConfig::new(2.5, 1, 0), OutputFormat::Csv);

        assert_eq!(
            summary,
            ReplaySummary {
                processed: 4,
                emitted: 2,
                rejected: 0,
                instruments: 1,
                first_ts: Some(UnixNanos::from(1)),
                last_ts: Some(UnixNanos::from(4)),
            }
        );
        assert_eq!(summary.span(), Some(3));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "instrument_id,direction,open,high,low,close,volume,ts_open,ts_close"
        );
        assert_eq!(lines[1], "AUD/USD.SIM,UP,100.0,102.5,100.0,102.5,3,1,3");
        assert_eq!(lines[2], "AUD/USD.SIM,UP,102.5,105.0,102.5,105.0,1,3,4");
    }

    #[rstest]
    fn test_replay_json_lines() {
        let (_, output) = run_replay(INPUT, BrickEngineConfig::new(2.5, 1, 0), OutputFormat::Json);

        let bricks: Vec<Brick> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(bricks.len(), 2);
        assert_eq!(bricks[1].close.to_string(), "105.0");
    }

    #[rstest]
    fn test_replay_without_volume_column_and_rfc3339_timestamps() {
        let input = "\
instrument_id,ts_event,value
ETHUSDT-PERP.BINANCE,2024-01-01T00:00:00Z,1500
ETHUSDT-PERP.BINANCE,2024-01-01T00:00:01Z,1520
";
        let (summary, output) =
            run_replay(input, BrickEngineConfig::new(10.0, 2, 0), OutputFormat::Csv);

        assert_eq!(summary.emitted, 2);
        assert_eq!(summary.span(), Some(1_000_000_000));
        assert_eq!(
            summary.first_ts.map(|ts| ts.to_rfc3339()),
            Some("2024-01-01T00:00:00+00:00".to_string())
        );
        assert!(output.contains(",0,1704067200000000000,1704067201000000000"));
    }

    #[rstest]
    fn test_replay_rejects_out_of_order() {
        let input = "\
instrument_id,ts_event,value
AUD/USD.SIM,2,100.0
AUD/USD.SIM,1,101.0
";
        let mut output = Vec::new();
        let result = replay(
            BrickEngineConfig::new(2.5, 1, 0),
            input.as_bytes(),
            &mut output,
            OutputFormat::Csv,
        );

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
    }

    #[rstest]
    fn test_replay_skips_invalid_when_configured() {
        let input = "\
instrument_id,ts_event,value
AUD/USD.SIM,2,100.0
AUD/USD.SIM,1,101.0
AUD/USD.SIM,3,NaN
AUD/USD.SIM,4,102.5
";
        let config = BrickEngineConfig::new(2.5, 1, 0).with_skip_invalid(true);
        let (summary, _) = run_replay(input, config, OutputFormat::Csv);

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.emitted, 1);
    }

    #[rstest]
    fn test_replay_rejects_values_off_the_price_grid() {
        let input = "\
instrument_id,ts_event,value,volume
AUD/USD.SIM,1,100.0,1
AUD/USD.SIM,2,102.499,1
";
        let mut output = Vec::new();
        let result = replay(
            BrickEngineConfig::new(2.5, 2, 0),
            input.as_bytes(),
            &mut output,
            OutputFormat::Csv,
        );
        assert!(format!("{:#}", result.unwrap_err()).contains("line 3"));

        let (summary, _) = run_replay(input, BrickEngineConfig::new(2.5, 3, 0), OutputFormat::Csv);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.emitted, 0);
    }

    #[rstest]
    fn test_replay_fractional_volumes_with_size_precision() {
        let input = "\
instrument_id,ts_event,value,volume
AUD/USD.SIM,1,100.0,0.4
AUD/USD.SIM,2,101.0,0.4
AUD/USD.SIM,3,102.5,0.4
";
        let (_, output) = run_replay(input, BrickEngineConfig::new(2.5, 1, 1), OutputFormat::Csv);
        assert_eq!(
            output.lines().nth(1),
            Some("AUD/USD.SIM,UP,100.0,102.5,100.0,102.5,1.2,1,3")
        );
    }

    #[rstest]
    fn test_replay_fails_on_malformed_row() {
        let input = "\
instrument_id,ts_event,value
AUD/USD.SIM,1,abc
";
        let mut output = Vec::new();
        let result = replay(
            BrickEngineConfig::new(2.5, 1, 0),
            input.as_bytes(),
            &mut output,
            OutputFormat::Csv,
        );
        assert!(format!("{:#}", result.unwrap_err()).contains("line 2"));
    }

    #[rstest]
    fn test_resolve_config_requires_brick_size() {
        assert!(resolve_config(&bricks_opt()).is_err());
    }

    #[rstest]
    fn test_resolve_config_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"brick_size = 1.0\nprice_precision = 4\n").unwrap();

        let opt = BricksOpt {
            config: Some(file.path().to_path_buf()),
            brick_size: Some(0.5),
            size_precision: Some(3),
            skip_invalid: true,
            ..bricks_opt()
        };
        let config = resolve_config(&opt).unwrap();

        assert_eq!(config.brick_size, 0.5);
        assert_eq!(config.price_precision, 4);
        assert_eq!(config.size_precision, 3);
        assert!(config.skip_invalid);
    }

    #[rstest]
    fn test_run_bricks_command_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("obs.csv");
        let output = dir.path().join("bricks.jsonl");
        std::fs::write(&input, INPUT).unwrap();

        let opt = BricksOpt {
            input,
            brick_size: Some(2.5),
            price_precision: Some(1),
            output: Some(output.clone()),
            format: OutputFormat::Json,
            ..bricks_opt()
        };
        run_bricks_command(opt).unwrap();

        let written = std::fs::read_to_string(output).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}

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

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Main CLI structure for parsing command-line arguments and options.
///
/// This is the entry point for the Renko command-line interface.
#[derive(Debug, Parser)]
#[clap(version, about, author)]
pub struct RenkoCli {
    /// Maximum log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info", env = "RENKO_LOG_LEVEL")]
    pub log_level: LevelFilter,
    #[clap(subcommand)]
    pub command: Commands,
}

/// Available top-level commands for the Renko CLI.
#[derive(Parser, Debug)]
pub enum Commands {
    Bricks(BricksOpt),
}

/// Output encodings for emitted bricks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// One JSON object per line.
    Json,
}

/// Options for replaying an observations file into bricks.
#[derive(Parser, Debug, Clone)]
#[command(about = "Replay a CSV of observations into Renko bricks", long_about = None)]
pub struct BricksOpt {
    /// Path to the input CSV with columns `instrument_id,ts_event,value[,volume]`.
    #[arg(long)]
    pub input: PathBuf,
    /// Path to a TOML engine config.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Default brick size (required without `--config`, overrides the config default otherwise).
    #[arg(long)]
    pub brick_size: Option<f64>,
    /// Default price precision (overrides the config default). Values must lie on this grid.
    #[arg(long)]
    pub price_precision: Option<u8>,
    /// Default size precision (overrides the config default). Volumes must lie on this grid.
    #[arg(long)]
    pub size_precision: Option<u8>,
    /// Log and skip invalid or out-of-order observations instead of failing.
    #[arg(long)]
    pub skip_invalid: bool,
    /// Path to write bricks to (stdout when absent).
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_parse_bricks_defaults() {
        let cli = RenkoCli::try_parse_from(["renko", "bricks", "--input", "obs.csv"]).unwrap();

        assert_eq!(cli.log_level, LevelFilter::Info);
        let Commands::Bricks(opt) = cli.command;
        assert_eq!(opt.input, PathBuf::from("obs.csv"));
        assert_eq!(opt.brick_size, None);
        assert_eq!(opt.format, OutputFormat::Csv);
        assert!(!opt.skip_invalid);
    }

    #[rstest]
    fn test_parse_bricks_all_options() {
        let cli = RenkoCli::try_parse_from([
            "renko",
            "bricks",
            "--input",
            "obs.csv",
            "--config",
            "renko.toml",
            "--brick-size",
            "2.5",
            "--price-precision",
            "1",
            "--size-precision",
            "2",
            "--skip-invalid",
            "--output",
            "bricks.jsonl",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level, LevelFilter::Debug);
        let Commands::Bricks(opt) = cli.command;
        assert_eq!(opt.config, Some(PathBuf::from("renko.toml")));
        assert_eq!(opt.brick_size, Some(2.5));
        assert_eq!(opt.price_precision, Some(1));
        assert_eq!(opt.size_precision, Some(2));
        assert!(opt.skip_invalid);
        assert_eq!(opt.output, Some(PathBuf::from("bricks.jsonl")));
        assert_eq!(opt.format, OutputFormat::Json);
    }

    #[rstest]
    fn test_parse_requires_input() {
        assert!(RenkoCli::try_parse_from(["renko", "bricks"]).is_err());
    }
}

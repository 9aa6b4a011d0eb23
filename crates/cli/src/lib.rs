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

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]

pub mod opt;
pub mod replay;

use crate::{
    opt::{Commands, RenkoCli},
    replay::run_bricks_command,
};

/// Runs the command selected on the command line.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run(opt: RenkoCli) -> anyhow::Result<()> {
    match opt.command {
        Commands::Bricks(bricks_opt) => run_bricks_command(bricks_opt)?,
    }
    Ok(())
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # scnn
//!
//! Command-line driver for the SCNN CPU reference model.
//!
//! ## Usage
//! ```bash
//! # Execute a network over its captured traces and validate the outputs
//! scnn run --network bvlc_alexnet --traces net_traces
//!
//! # Count validation violations instead of aborting on the first layer
//! scnn run --network vgg_cnn_s --no-strict
//!
//! # Print the layer table (and trace shapes, when present)
//! scnn inspect --network bvlc_alexnet
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scnn",
    about = "SCNN dataflow reference model over captured network traces",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Defaults to `run` with the built-in configuration when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute every layer of a network and validate against the golden
    /// outputs.
    Run {
        /// Network table to execute.
        #[arg(short, long)]
        network: Option<String>,

        /// Directory holding the captured traces.
        #[arg(short, long)]
        traces: Option<std::path::PathBuf>,

        /// Worker threads for the tile dispatch.
        #[arg(long)]
        threads: Option<usize>,

        /// Count validation violations instead of aborting on the first.
        #[arg(long)]
        no_strict: bool,

        /// Process every captured image instead of only image 0.
        #[arg(long)]
        all_images: bool,

        /// Emit the run report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Print a network's layer table, with trace shapes when available.
    Inspect {
        /// Network table to inspect.
        #[arg(short, long)]
        network: Option<String>,

        /// Directory holding the captured traces.
        #[arg(short, long)]
        traces: Option<std::path::PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config = commands::base_config(cli.config.as_deref())?;

    // Bare `scnn` behaves like the reference driver: run the default
    // network over its traces.
    let command = cli.command.unwrap_or(Commands::Run {
        network: None,
        traces: None,
        threads: None,
        no_strict: false,
        all_images: false,
        json: false,
    });

    match command {
        Commands::Run {
            network,
            traces,
            threads,
            no_strict,
            all_images,
            json,
        } => commands::run::execute(config, network, traces, threads, no_strict, all_images, json),
        Commands::Inspect { network, traces } => {
            commands::inspect::execute(config, network, traces)
        }
    }
}

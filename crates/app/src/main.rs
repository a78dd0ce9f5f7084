//! hufflimit: compress and decompress files with a length-limited canonical
//! Huffman code.
//!
//! # Example
//!
//! ```bash
//! hufflimit compress -i book.txt -o book.huf -l 12 --print-table
//! hufflimit decompress -i book.huf -o book.txt --stats-format text
//! ```
//!
//! Reports (code table, tree, summary) go to stdout; logs go to stderr.

mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use hufflimit_core::{compress_file, decompress_file, CompressOptions, Report};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{Config, Mode, StatsFormat};

fn main() -> ExitCode {
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(e) => e.exit(),
    };

    init_logging(config.verbose);
    debug!(?config, "resolved configuration");

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "hufflimit=debug,hufflimit_core=debug"
    } else {
        "hufflimit=info,hufflimit_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(config: &Config) -> Result<()> {
    let report = match config.mode {
        Mode::Compress => {
            let options = CompressOptions {
                length_limit: config.limit,
                render_tree: config.print_tree,
            };
            compress_file(&config.input, &config.output, &options).with_context(|| {
                format!(
                    "failed to compress {} into {}",
                    config.input.display(),
                    config.output.display()
                )
            })?
        }
        Mode::Decompress => decompress_file(&config.input, &config.output).with_context(|| {
            format!(
                "failed to decompress {} into {}",
                config.input.display(),
                config.output.display()
            )
        })?,
    };

    print_report(config, &report);
    Ok(())
}

fn print_report(config: &Config, report: &Report) {
    if let Some(tree) = &report.tree {
        println!("=== Huffman Tree ===");
        print!("{}", tree);
        println!();
    }

    if config.print_table {
        println!("=== Code Table ===");
        if report.codebook.is_empty() {
            println!("(no symbols)");
        } else {
            print!("{}", report.codebook.render_table());
        }
    }

    if config.print_stats {
        match config.stats_format {
            StatsFormat::Summary => report.stats.print_summary(),
            StatsFormat::Text => print!("{}", report.stats.export_text()),
        }
    }
}

//! Configuration for the hufflimit application.
//!
//! Command-line arguments are parsed with clap into `Cli`, then flattened
//! into a `Config` that the rest of the binary consumes. Usage errors
//! (missing mode or paths, `--limit` on decompress, a limit above 255) are
//! rejected by clap before any file is touched.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Length-limited canonical Huffman compressor
#[derive(Parser, Debug)]
#[command(name = "hufflimit", version)]
#[command(about = "Compress files with a length-limited canonical Huffman code")]
#[command(arg_required_else_help = true, subcommand_required = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the canonical code table after the run
    #[arg(long, global = true)]
    pub print_table: bool,

    /// Don't print the run summary
    #[arg(long, global = true)]
    pub no_stats: bool,

    /// How to print the run summary
    #[arg(long, global = true, value_enum, default_value_t = StatsFormat::Summary)]
    pub stats_format: StatsFormat,
}

/// Run summary layout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFormat {
    /// Human-readable report
    Summary,
    /// `key=value` lines
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a file
    Compress {
        #[command(flatten)]
        paths: Paths,

        /// Maximum code length in bits (0 = unlimited)
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=255))]
        limit: u32,

        /// Render the Huffman tree before lengths are limited
        #[arg(long)]
        print_tree: bool,
    },

    /// Decompress a file produced by `compress`
    Decompress {
        #[command(flatten)]
        paths: Paths,
    },
}

#[derive(Args, Debug)]
pub struct Paths {
    /// Input file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Which way to run the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}

/// Complete configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    // === Files ===
    /// Input file path
    pub input: PathBuf,

    /// Output file path
    pub output: PathBuf,

    // === Codec ===
    /// Maximum code length (0 = unlimited, always 0 for decompress)
    pub limit: u32,

    // === Reporting ===
    /// Whether to print the code table
    pub print_table: bool,

    /// Whether to render the Huffman tree (compress only)
    pub print_tree: bool,

    /// Whether to print the run summary
    pub print_stats: bool,

    /// Layout of the run summary
    pub stats_format: StatsFormat,

    /// Whether debug logging is on
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command-line arguments (program name first).
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Self::from_cli)
    }

    pub fn from_cli(cli: Cli) -> Self {
        let (mode, paths, limit, print_tree) = match cli.command {
            Command::Compress {
                paths,
                limit,
                print_tree,
            } => (Mode::Compress, paths, limit, print_tree),
            Command::Decompress { paths } => (Mode::Decompress, paths, 0, false),
        };

        Config {
            mode,
            input: paths.input,
            output: paths.output,
            limit,
            print_table: cli.print_table,
            print_tree,
            print_stats: !cli.no_stats,
            stats_format: cli.stats_format,
            verbose: cli.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::from_args(std::iter::once("hufflimit").chain(args.iter().copied()))
    }

    #[test]
    fn test_compress_defaults() {
        let config = parse(&["compress", "-i", "in.txt", "-o", "out.huf"]).unwrap();
        assert_eq!(config.mode, Mode::Compress);
        assert_eq!(config.input, PathBuf::from("in.txt"));
        assert_eq!(config.output, PathBuf::from("out.huf"));
        assert_eq!(config.limit, 0);
        assert!(config.print_stats);
        assert_eq!(config.stats_format, StatsFormat::Summary);
        assert!(!config.print_table);
        assert!(!config.print_tree);
        assert!(!config.verbose);
    }

    #[test]
    fn test_compress_with_limit_and_flags() {
        let config = parse(&[
            "compress",
            "--input",
            "a",
            "--output",
            "b",
            "-l",
            "12",
            "--print-tree",
            "--print-table",
            "--no-stats",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.limit, 12);
        assert!(config.print_tree);
        assert!(config.print_table);
        assert!(!config.print_stats);
        assert!(config.verbose);
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let config = parse(&["-v", "--print-table", "decompress", "-i", "a", "-o", "b"]).unwrap();
        assert_eq!(config.mode, Mode::Decompress);
        assert!(config.verbose);
        assert!(config.print_table);
        assert_eq!(config.limit, 0);
    }

    #[test]
    fn test_stats_format() {
        let config = parse(&["decompress", "-i", "a", "-o", "b", "--stats-format", "text"]).unwrap();
        assert_eq!(config.stats_format, StatsFormat::Text);

        let err = parse(&["compress", "-i", "a", "-o", "b", "--stats-format", "json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_decompress_rejects_limit() {
        let err = parse(&["decompress", "-i", "a", "-o", "b", "-l", "8"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_limit_must_fit_header() {
        assert!(parse(&["compress", "-i", "a", "-o", "b", "-l", "255"]).is_ok());
        let err = parse(&["compress", "-i", "a", "-o", "b", "-l", "256"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_limit_must_be_numeric() {
        assert!(parse(&["compress", "-i", "a", "-o", "b", "-l", "-3"]).is_err());
        assert!(parse(&["compress", "-i", "a", "-o", "b", "-l", "eight"]).is_err());
    }

    #[test]
    fn test_missing_paths() {
        let err = parse(&["compress", "-i", "a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["decompress", "-o", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_missing_mode() {
        assert!(parse(&[]).is_err());
        let err = parse(&["-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSubcommand);
    }

    #[test]
    fn test_unknown_mode() {
        assert!(parse(&["squash", "-i", "a", "-o", "b"]).is_err());
    }
}

//! Per-run statistics.
//!
//! One `Stats` value is filled in by each compress or decompress call and
//! handed back to the caller for reporting.

use std::time::{Duration, Instant};

/// Which way the codec ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
}

/// Sizes, code shape and timing for a single run.
#[derive(Debug, Clone)]
pub struct Stats {
    pub direction: Direction,

    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Sizes ===
    /// Bytes consumed from the source
    pub input_bytes: u64,

    /// Bytes produced into the sink
    pub output_bytes: u64,

    /// Uncompressed size recorded in the header
    pub original_size: u64,

    /// Header bytes (magic, sizes, symbol table)
    pub header_bytes: u64,

    /// Packed bitstream bytes
    pub payload_bytes: u64,

    // === Code shape ===
    /// Symbols present in the input
    pub distinct_symbols: usize,

    /// Longest assigned code
    pub max_code_length: u8,

    /// Configured length limit (0 = none)
    pub length_limit: u8,
}

impl Stats {
    /// Create stats with start time set to now.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            original_size: 0,
            header_bytes: 0,
            payload_bytes: 0,
            distinct_symbols: 0,
            max_code_length: 0,
            length_limit: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Container size over original size; 0.0 for empty input.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            (self.header_bytes + self.payload_bytes) as f64 / self.original_size as f64
        }
    }

    /// Average payload bits per original byte.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            (self.payload_bytes * 8) as f64 / self.original_size as f64
        }
    }

    /// Uncompressed bytes handled per second.
    pub fn throughput_bps(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.original_size as f64 / secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        let title = match self.direction {
            Direction::Compress => "Compression",
            Direction::Decompress => "Decompression",
        };

        println!("\n=== {} Summary ===", title);
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Input:  {} bytes", self.input_bytes);
        println!("Output: {} bytes", self.output_bytes);
        println!();
        println!("Original size: {} bytes", self.original_size);
        println!("Header: {} bytes", self.header_bytes);
        println!("Payload: {} bytes", self.payload_bytes);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!("Bits/symbol: {:.3}", self.bits_per_symbol());
        println!();
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!("Max code length: {} bits", self.max_code_length);
        if self.length_limit == 0 {
            println!("Length limit: none");
        } else {
            println!("Length limit: {} bits", self.length_limit);
        }
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }

    /// Export stats as `key=value` lines.
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             original_size={}\n\
             header_bytes={}\n\
             payload_bytes={}\n\
             compression_ratio={:.4}\n\
             distinct_symbols={}\n\
             max_code_length={}\n\
             length_limit={}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.original_size,
            self.header_bytes,
            self.payload_bytes,
            self.compression_ratio(),
            self.distinct_symbols,
            self.max_code_length,
            self.length_limit,
        )
    }
}

//! Compress and decompress orchestration.
//!
//! Compression makes two passes over a seekable source: one to count
//! frequencies, one to emit codes. Everything that can fail for
//! configuration reasons is decided in between, before the first output
//! byte, so an infeasible length limit never leaves a partial file behind.
//!
//! File operations write through a temporary file that is moved into place
//! only once the run succeeds.
//!
//! Decompression reads the header, rebuilds the canonical codes from the
//! length table and walks a decode trie until `original_size` bytes have
//! been produced. The bitstream is never touched for an empty file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, ErrorKind, Read, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::bitio::{BitReader, BitWriter};
use crate::codebook::Codebook;
use crate::container::Header;
use crate::error::{ConfigError, Error, FormatError, Result};
use crate::frequency::FrequencyTable;
use crate::lengths::LengthTable;
use crate::limit::{check_feasible, limit_lengths};
use crate::stats::{Direction, Stats};
use crate::trie::DecodeTrie;
use crate::tree::HuffmanTree;

const READ_CHUNK: usize = 64 * 1024;

/// Settings for a compression run.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    /// Maximum code length in bits; 0 means unlimited
    pub length_limit: u32,

    /// Keep a text rendering of the Huffman tree in the report
    pub render_tree: bool,
}

impl CompressOptions {
    pub fn with_limit(length_limit: u32) -> Self {
        Self {
            length_limit,
            ..Self::default()
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Report {
    pub stats: Stats,

    /// Canonical codes used for the run
    pub codebook: Codebook,

    /// Tree rendering, when requested at compression time
    pub tree: Option<String>,
}

/// Everything decided from the frequency table, before any output.
#[derive(Debug, Clone)]
pub struct Plan {
    header: Header,
    codebook: Codebook,
    tree: Option<String>,
}

impl Plan {
    /// Run the tree, length and limiting stages.
    ///
    /// # Errors
    /// - `ConfigError::LimitTooLarge` for a limit above 255
    /// - `ConfigError::InfeasibleLimit` when the symbols cannot fit
    /// - `FormatError::InputTooLarge` for more than `u32::MAX` bytes
    pub fn new(freqs: &FrequencyTable, options: &CompressOptions) -> Result<Self> {
        let limit = options.length_limit;
        let limit_byte =
            u8::try_from(limit).map_err(|_| ConfigError::LimitTooLarge(limit))?;
        let original_size = u32::try_from(freqs.total())
            .map_err(|_| FormatError::InputTooLarge(freqs.total()))?;
        check_feasible(freqs.distinct(), limit)?;

        let (lengths, tree) = match HuffmanTree::build(freqs) {
            Some(tree) => {
                let initial = tree.code_lengths()?;
                debug!(
                    symbols = initial.symbol_count(),
                    max_length = initial.max_length(),
                    "extracted code lengths"
                );
                let rendering = options.render_tree.then(|| tree.render());
                (limit_lengths(&initial, limit, freqs)?, rendering)
            }
            None => (LengthTable::empty(), None),
        };

        let codebook = Codebook::from_lengths(lengths.clone());
        let header = Header::new(original_size, limit_byte, lengths);
        Ok(Self {
            header,
            codebook,
            tree,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }
}

/// Compress a seekable source into `output`.
pub fn compress<R, W>(input: &mut R, output: &mut W, options: &CompressOptions) -> Result<Report>
where
    R: Read + Seek,
    W: Write,
{
    let (plan, stats) = prepare(input, options)?;
    emit(plan, input, output, stats)
}

/// Decompress a container from `input` into `output`.
pub fn decompress<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<Report> {
    let stats = Stats::new(Direction::Decompress);
    let header = Header::read_from(input)?;
    decode_payload(header, input, output, stats)
}

/// Compress an in-memory buffer.
pub fn compress_bytes(data: &[u8], length_limit: u32) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    compress(
        &mut Cursor::new(data),
        &mut output,
        &CompressOptions::with_limit(length_limit),
    )?;
    Ok(output)
}

/// Decompress an in-memory container.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    decompress(&mut Cursor::new(data), &mut output)?;
    Ok(output)
}

/// Compress `input` into a new file at `output`.
///
/// The code is planned before anything is written. Output goes to a
/// temporary file next to `output` that only replaces it on success, so a
/// failed run leaves no partial file and never clobbers an existing one.
///
/// # Errors
/// `ConfigError::SameFile` if `input` and `output` name the same file.
pub fn compress_file(input: &Path, output: &Path, options: &CompressOptions) -> Result<Report> {
    ensure_distinct(input, output)?;
    let mut source = BufReader::new(File::open(input)?);
    let (plan, stats) = prepare(&mut source, options)?;

    let report = write_atomically(output, |sink| emit(plan, &mut source, sink, stats))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        original = report.stats.original_size,
        compressed = report.stats.output_bytes,
        "compressed file"
    );
    Ok(report)
}

/// Decompress the container at `input` into a new file at `output`.
///
/// The header is validated before any output exists; a corrupt bitstream
/// leaves `output` untouched.
///
/// # Errors
/// `ConfigError::SameFile` if `input` and `output` name the same file.
pub fn decompress_file(input: &Path, output: &Path) -> Result<Report> {
    ensure_distinct(input, output)?;
    let stats = Stats::new(Direction::Decompress);
    let mut source = BufReader::new(File::open(input)?);
    let header = Header::read_from(&mut source)?;

    let report = write_atomically(output, |sink| {
        decode_payload(header, &mut source, sink, stats)
    })?;
    info!(
        input = %input.display(),
        output = %output.display(),
        restored = report.stats.output_bytes,
        "decompressed file"
    );
    Ok(report)
}

fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    let source = fs::canonicalize(input)?;
    match fs::canonicalize(output) {
        Ok(target) if target == source => Err(ConfigError::SameFile(source).into()),
        _ => Ok(()),
    }
}

/// Run `write` against a temporary file beside `output`, then move it into
/// place. On error the temporary file is dropped and deleted.
fn write_atomically<F>(output: &Path, write: F) -> Result<Report>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<Report>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;

    let result = {
        let mut sink = BufWriter::new(temp.as_file_mut());
        write(&mut sink).and_then(|report| {
            sink.flush()?;
            Ok(report)
        })
    };

    match result {
        Ok(report) => {
            temp.persist(output).map_err(|e| e.error)?;
            Ok(report)
        }
        Err(e) => {
            debug!(path = %temp.path().display(), "discarding partial output");
            Err(e)
        }
    }
}

fn prepare<R: Read + Seek>(input: &mut R, options: &CompressOptions) -> Result<(Plan, Stats)> {
    let stats = Stats::new(Direction::Compress);
    input.rewind()?;
    let freqs = FrequencyTable::count(&mut *input)?;
    debug!(
        bytes = freqs.total(),
        distinct = freqs.distinct(),
        "counted frequencies"
    );
    let plan = Plan::new(&freqs, options)?;
    Ok((plan, stats))
}

fn emit<R, W>(plan: Plan, input: &mut R, output: &mut W, mut stats: Stats) -> Result<Report>
where
    R: Read + Seek,
    W: Write,
{
    let Plan {
        header,
        codebook,
        tree,
    } = plan;

    let header_bytes = header.write_to(output)?;
    debug!(header_bytes, symbols = codebook.symbol_count(), "wrote header");

    input.rewind()?;
    let mut writer = BitWriter::new(&mut *output);
    let encoded = encode_stream(&codebook, input, &mut writer)?;
    if encoded != header.original_size as u64 {
        return Err(Error::Io(std::io::Error::new(
            ErrorKind::InvalidData,
            format!(
                "input changed between passes: counted {} bytes, encoded {}",
                header.original_size, encoded
            ),
        )));
    }
    let payload_bits = writer.bit_len();
    writer.finish()?;

    let payload_bytes = payload_bits.div_ceil(8);
    debug!(payload_bits, payload_bytes, "wrote bitstream");

    stats.input_bytes = encoded;
    stats.original_size = encoded;
    stats.header_bytes = header_bytes as u64;
    stats.payload_bytes = payload_bytes;
    stats.output_bytes = header_bytes as u64 + payload_bytes;
    stats.distinct_symbols = codebook.symbol_count();
    stats.max_code_length = codebook.lengths().max_length();
    stats.length_limit = header.length_limit;
    stats.complete();

    Ok(Report {
        stats,
        codebook,
        tree,
    })
}

fn encode_stream<R: Read, W: Write>(
    codebook: &Codebook,
    input: &mut R,
    writer: &mut BitWriter<W>,
) -> Result<u64> {
    let mut buf = vec![0u8; READ_CHUNK];
    let mut encoded = 0u64;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        codebook.encode(&buf[..n], writer)?;
        encoded += n as u64;
    }
    Ok(encoded)
}

fn decode_payload<R: Read, W: Write>(
    header: Header,
    input: &mut R,
    output: &mut W,
    mut stats: Stats,
) -> Result<Report> {
    let header_bytes = header.encoded_len() as u64;
    let original_size = header.original_size as u64;
    let codebook = Codebook::from_lengths(header.lengths);
    debug!(
        original_size,
        symbols = codebook.symbol_count(),
        limit = header.length_limit,
        "read header"
    );

    let mut payload_bytes = 0;
    if original_size > 0 {
        let trie = DecodeTrie::from_codebook(&codebook)?;
        let mut reader = BitReader::new(&mut *input);
        trie.decode(&mut reader, output, original_size)?;
        payload_bytes = reader.position().div_ceil(8);
        debug!(bits = reader.position(), trie_nodes = trie.len(), "decoded bitstream");
    }
    output.flush()?;

    stats.input_bytes = header_bytes + payload_bytes;
    stats.output_bytes = original_size;
    stats.original_size = original_size;
    stats.header_bytes = header_bytes;
    stats.payload_bytes = payload_bytes;
    stats.distinct_symbols = codebook.symbol_count();
    stats.max_code_length = codebook.lengths().max_length();
    stats.length_limit = header.length_limit;
    stats.complete();

    Ok(Report {
        stats,
        codebook,
        tree: None,
    })
}

/*!
 * File Helpers
 *
 * Thin plumbing binding a filesystem path to an encode sink or decode
 * source. The codec core never touches paths; these helpers own the file
 * handles, the buffering, and the final flush.
 */

use crate::core::limits::SLOW_FILE_OPERATION_MS;
use crate::core::CodecResult;
use crate::decode::{self, Decoded, DecodeOptions};
use crate::encode::{self, EncodeOptions};
use crate::registry::ClassRegistry;
use crate::value::{Value, ValueGraph};
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Encode a value into a binary-form file
pub fn write_binary_file(
    path: impl AsRef<Path>,
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
) -> CodecResult<()> {
    let path = path.as_ref();
    let started = Instant::now();
    let file = File::create(path)?;
    encode::binary::to_writer(graph, value, registry, options, file)?;
    log_duration("write_binary_file", path, started);
    Ok(())
}

/// Decode a binary-form file
pub fn read_binary_file(
    path: impl AsRef<Path>,
    registry: Option<&ClassRegistry>,
    options: &DecodeOptions,
) -> CodecResult<Decoded> {
    let path = path.as_ref();
    let started = Instant::now();
    let file = File::open(path)?;
    let decoded = decode::binary::from_reader(file, registry, options)?;
    log_duration("read_binary_file", path, started);
    Ok(decoded)
}

/// Encode a value into a textual-form file
pub fn write_text_file(
    path: impl AsRef<Path>,
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
) -> CodecResult<()> {
    let path = path.as_ref();
    let started = Instant::now();
    let encoded = encode::text::to_string(graph, value, registry, options)?;
    std::fs::write(path, encoded)?;
    log_duration("write_text_file", path, started);
    Ok(())
}

/// Decode a textual-form file
pub fn read_text_file(
    path: impl AsRef<Path>,
    registry: Option<&ClassRegistry>,
    options: &DecodeOptions,
) -> CodecResult<Decoded> {
    let path = path.as_ref();
    let started = Instant::now();
    let contents = std::fs::read_to_string(path)?;
    let decoded = decode::text::from_str(&contents, registry, options)?;
    log_duration("read_text_file", path, started);
    Ok(decoded)
}

fn log_duration(operation: &str, path: &Path, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if elapsed_ms > SLOW_FILE_OPERATION_MS {
        warn!(operation, path = %path.display(), elapsed_ms, "slow file operation");
    } else {
        debug!(operation, path = %path.display(), elapsed_ms, "file operation complete");
    }
}

/*!
 * Wire Limits and Constants
 *
 * Centralized location for all wire-format limits, thresholds, and magic numbers.
 *
 * ## Design Philosophy
 * - All values include rationale comments explaining WHY they exist
 * - Length classes are part of the wire contract and must never change
 * - Performance-related constants are marked with [PERF]
 */

// =============================================================================
// STRING LENGTH CLASSES (binary form)
// =============================================================================

/// Largest string payload the 1-byte length class can carry (255 bytes)
/// Short strings are the common case; they pay 1 byte of overhead instead of 4
pub const LEN8_MAX: usize = u8::MAX as usize;

/// Largest string payload the 2-byte length class can carry (64KB - 1)
pub const LEN16_MAX: usize = u16::MAX as usize;

/// Largest string payload the 4-byte length class can carry (~4GB)
/// This is the escalation ceiling; longer payloads are a hard error
pub const LEN32_MAX: u64 = u32::MAX as u64;

// =============================================================================
// TEXTUAL NUMERAL SCANNING
// =============================================================================

/// Bounded lookahead when scanning for a numeral separator (512 characters)
/// The longest decimal expansion of an f64 (subnormals near 5e-324) is about
/// 345 characters; 512 covers it with slack while still bounding the scan
/// on corrupt input
pub const NUMERAL_LOOKAHEAD_MAX: usize = 512;

// =============================================================================
// BUFFERS
// =============================================================================

/// Initial capacity for in-memory binary encode buffers (256 bytes)
/// [PERF] Covers small documents without reallocation
pub const ENCODE_BUFFER_INITIAL: usize = 256;

/// Buffered reader/writer capacity for stream-backed sources and sinks (8KB)
/// [PERF] Amortizes transport syscalls across many primitive reads/writes
pub const STREAM_BUFFER_SIZE: usize = 8192;

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Slow file operation threshold (100ms)
/// Operations taking longer trigger performance logging
pub const SLOW_FILE_OPERATION_MS: u64 = 100;

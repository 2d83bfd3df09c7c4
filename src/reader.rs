//! Incremental line reading from a byte offset.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Result of reading one file for one poll cycle.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    /// Complete lines read, and the offset just past the last one consumed.
    Lines {
        offset: u64,
        lines: Vec<String>,
        /// The file had shrunk below the requested offset and was read from 0.
        truncated: bool,
    },
    /// Opening failed with a permission error. The caller keeps its offset.
    SkippedPermission,
    /// Any other I/O failure. The caller keeps its offset.
    SkippedTransient(std::io::Error),
}

/// Read every complete line available in `path` after `offset`.
///
/// A trailing line without a terminator is left in place for a later read.
/// The whole backlog since `offset` is buffered before any line is returned,
/// and an unterminated tail is read again on every call until its
/// separator arrives, so a writer that never ends its last line costs one
/// re-read of that line per poll.
pub(crate) async fn read_from(path: &Path, offset: u64, separator: u8) -> ReadOutcome {
    match read_complete_lines(path, offset, separator).await {
        Ok(outcome) => outcome,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => ReadOutcome::SkippedPermission,
        Err(e) => ReadOutcome::SkippedTransient(e),
    }
}

async fn read_complete_lines(
    path: &Path,
    offset: u64,
    separator: u8,
) -> std::io::Result<ReadOutcome> {
    let mut file = File::open(path).await?;
    let current_size = file.metadata().await?.len();

    // Handle file truncation
    let truncated = detect_file_truncation(current_size, offset);
    let start = if truncated { 0 } else { offset };

    let bytes_to_read = match calculate_bytes_to_read(current_size, start) {
        Some(bytes) => bytes,
        None => {
            return Ok(ReadOutcome::Lines {
                offset: start,
                lines: Vec::new(),
                truncated,
            });
        }
    };

    file.seek(std::io::SeekFrom::Start(start)).await?;

    let mut buf = Vec::with_capacity(bytes_to_read as usize);
    file.take(bytes_to_read).read_to_end(&mut buf).await?;

    let (lines, consumed) = split_complete_lines(&buf, separator);

    Ok(ReadOutcome::Lines {
        offset: start + consumed as u64,
        lines,
        truncated,
    })
}

/// Split `buf` into terminated lines, returning them and the bytes they covered.
///
/// Bytes after the last separator are not part of any returned line.
fn split_complete_lines(buf: &[u8], separator: u8) -> (Vec<String>, usize) {
    let Some(last) = buf.iter().rposition(|&b| b == separator) else {
        return (Vec::new(), 0);
    };

    let lines = buf[..last]
        .split(|&b| b == separator)
        .map(|raw| decode_line(raw, separator))
        .collect();

    (lines, last + 1)
}

fn decode_line(raw: &[u8], separator: u8) -> String {
    let raw = match raw {
        [rest @ .., b'\r'] if separator == b'\n' => rest,
        _ => raw,
    };
    String::from_utf8_lossy(raw).into_owned()
}

/// Detect if the file was truncated by comparing current size with last position
fn detect_file_truncation(current_size: u64, last_position: u64) -> bool {
    current_size < last_position
}

/// Calculate bytes to read based on current size and last position
fn calculate_bytes_to_read(current_size: u64, last_position: u64) -> Option<u64> {
    if current_size <= last_position {
        None
    } else {
        Some(current_size - last_position)
    }
}

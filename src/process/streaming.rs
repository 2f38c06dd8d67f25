//! Streaming helpers for subprocess output forwarding.

use std::io::{self, Read, Write};

/// How forwarding a child stream ended.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(super) enum Forwarded {
    /// Every byte reached the writer.
    Complete,
    /// The writer closed early; the rest was read and discarded.
    Truncated,
}

/// Copy `reader` into `writer`, draining the reader if the writer closes.
///
/// A closed parent pipe must not block the child, so remaining bytes are
/// read and discarded once a write fails.
pub(super) fn forward_child_output<R, W>(
    mut reader: R,
    mut writer: W,
    stream_name: &'static str,
) -> Forwarded
where
    R: Read,
    W: Write,
{
    let Err(err) = io::copy(&mut reader, &mut writer) else {
        return Forwarded::Complete;
    };
    tracing::debug!("Failed to write child {stream_name} output: {err}; discarding the rest");
    if let Err(drain_err) = io::copy(&mut reader, &mut io::sink()) {
        tracing::debug!("Failed to drain child {stream_name} output: {drain_err}");
    }
    Forwarded::Truncated
}

/// Write a fully captured stream in one locked burst.
///
/// Parallel compiles finish in any order; writing each child's output under
/// a single lock keeps diagnostics from different units apart.
pub(super) fn replay_captured<W: Write>(bytes: &[u8], mut writer: W, stream_name: &'static str) {
    if bytes.is_empty() {
        return;
    }
    if let Err(err) = writer.write_all(bytes).and_then(|()| writer.flush()) {
        tracing::debug!("Failed to replay captured {stream_name} output: {err}");
    }
}

//! Contract interface decoding from a raw `contractspecv0` payload.

use crate::xdr::{read_limits, Limited, ReadXdr, ScSpecEntry};

/// Decode back-to-back spec entries by scanning record lengths.
///
/// At each offset, lengths `1..` are tried until one slice parses as a whole
/// `ScSpecEntry`. Decoding stops at the end of the buffer or at the first
/// offset where no length parses; entries read so far are returned.
///
/// Quadratic in the record size. See [`decode_spec_entries_streaming`].
pub fn decode_spec_entries(buf: &[u8]) -> Vec<ScSpecEntry> {
    let mut entries = Vec::new();
    let mut offset = 0;

    'records: while offset < buf.len() {
        for end in offset + 1..=buf.len() {
            if let Ok(entry) = ScSpecEntry::from_xdr(&buf[offset..end], read_limits()) {
                entries.push(entry);
                offset = end;
                continue 'records;
            }
        }
        tracing::debug!(
            offset,
            remaining = buf.len() - offset,
            "No spec entry parses at offset; stopping"
        );
        break;
    }

    entries
}

/// Decode back-to-back spec entries in a single pass.
///
/// Yields the same entries as [`decode_spec_entries`] for well-formed input.
pub fn decode_spec_entries_streaming(buf: &[u8]) -> Vec<ScSpecEntry> {
    let mut rest = buf;
    let mut entries = Vec::new();

    while !rest.is_empty() {
        let offset = buf.len() - rest.len();
        let mut reader = Limited::new(&mut rest, read_limits());
        match ScSpecEntry::read_xdr(&mut reader) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::debug!(offset, error = %e, "Spec entry decode failed; stopping");
                break;
            }
        }
    }

    entries
}

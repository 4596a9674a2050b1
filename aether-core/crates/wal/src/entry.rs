//! The WAL entry value type and the file-backed record codec (§4.9).
//!
//! The record layout is a stability surface: `[entry_id:u64 BE |
//! committed:u8 | timestamp_ns:u64 BE | hash_len:u32 BE | hash |
//! signed_len:u32 BE | signed | merkle_len:u32 BE | merkle]`. Every length
//! consumed while decoding is read directly from the preceding header
//! field — never recomputed from a second formula — so there is no seam
//! for an off-by-one between "how many bytes this record claims to have"
//! and "how many bytes we actually skip".

use crate::errors::WalError;

/// One durable record. Immutable once constructed; `commit` produces a new
/// value with `committed: true` rather than mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub entry_id: u64,
    pub hash: [u8; 32],
    pub signed_entry_bytes: Vec<u8>,
    pub merkle_state: Vec<u8>,
    pub committed: bool,
    pub timestamp_ns: u64,
}

impl Entry {
    pub(crate) fn committed(&self) -> Self {
        Entry {
            committed: true,
            ..self.clone()
        }
    }
}

const HEADER_MIN_LEN: usize = 8 + 1 + 8 + 4;

pub(crate) fn encode_record(entry: &Entry) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        HEADER_MIN_LEN + 32 + 8 + entry.signed_entry_bytes.len() + entry.merkle_state.len(),
    );
    buf.extend_from_slice(&entry.entry_id.to_be_bytes());
    buf.push(entry.committed as u8);
    buf.extend_from_slice(&entry.timestamp_ns.to_be_bytes());
    buf.extend_from_slice(&(entry.hash.len() as u32).to_be_bytes());
    buf.extend_from_slice(&entry.hash);
    buf.extend_from_slice(&(entry.signed_entry_bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(&entry.signed_entry_bytes);
    buf.extend_from_slice(&(entry.merkle_state.len() as u32).to_be_bytes());
    buf.extend_from_slice(&entry.merkle_state);
    buf
}

/// Attempts to decode one record from the start of `buf`.
///
/// Returns `Ok(None)` when `buf` holds fewer bytes than a complete record
/// declares — the torn tail left by a write that was interrupted before
/// its `fsync`, which recovery treats as "never durably written" rather
/// than an error. Returns `Err` only for a header that parses but is
/// internally inconsistent (a hash field not exactly 32 bytes), which is
/// genuine on-disk corruption.
pub(crate) fn try_decode_record(buf: &[u8]) -> Result<Option<(Entry, usize)>, WalError> {
    if buf.len() < HEADER_MIN_LEN {
        return Ok(None);
    }

    let mut pos = 0usize;
    let entry_id = u64::from_be_bytes(buf[pos..pos + 8].try_into().unwrap());
    pos += 8;
    let committed = buf[pos] != 0;
    pos += 1;
    let timestamp_ns = u64::from_be_bytes(buf[pos..pos + 8].try_into().unwrap());
    pos += 8;
    let hash_len = u32::from_be_bytes(buf[pos..pos + 4].try_into().unwrap()) as usize;
    pos += 4;

    if hash_len != 32 {
        return Err(WalError::CorruptedEntry {
            entry_id,
            reason: format!("hash field is {hash_len} bytes, expected 32"),
        });
    }

    if buf.len() < pos + hash_len + 4 {
        return Ok(None);
    }
    let hash_bytes = &buf[pos..pos + hash_len];
    pos += hash_len;
    let signed_len = u32::from_be_bytes(buf[pos..pos + 4].try_into().unwrap()) as usize;
    pos += 4;

    if buf.len() < pos + signed_len + 4 {
        return Ok(None);
    }
    let signed_entry_bytes = buf[pos..pos + signed_len].to_vec();
    pos += signed_len;
    let merkle_len = u32::from_be_bytes(buf[pos..pos + 4].try_into().unwrap()) as usize;
    pos += 4;

    if buf.len() < pos + merkle_len {
        return Ok(None);
    }
    let merkle_state = buf[pos..pos + merkle_len].to_vec();
    pos += merkle_len;

    let mut hash = [0u8; 32];
    hash.copy_from_slice(hash_bytes);

    Ok(Some((
        Entry {
            entry_id,
            hash,
            signed_entry_bytes,
            merkle_state,
            committed,
            timestamp_ns,
        },
        pos,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        Entry {
            entry_id: 7,
            hash: [9u8; 32],
            signed_entry_bytes: b"signed-bytes".to_vec(),
            merkle_state: b"merkle-state".to_vec(),
            committed: false,
            timestamp_ns: 123_456,
        }
    }

    #[test]
    fn test_round_trip_encode_decode() {
        let entry = sample_entry();
        let bytes = encode_record(&entry);
        let (decoded, consumed) = try_decode_record(&bytes).unwrap().unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_truncated_tail_is_none_not_error() {
        let entry = sample_entry();
        let bytes = encode_record(&entry);
        for cut in 1..bytes.len() {
            assert_eq!(try_decode_record(&bytes[..cut]).unwrap(), None, "cut={cut}");
        }
    }

    #[test]
    fn test_two_records_decode_sequentially() {
        let a = sample_entry();
        let mut b = sample_entry();
        b.entry_id = 8;
        b.committed = true;

        let mut buf = encode_record(&a);
        buf.extend_from_slice(&encode_record(&b));

        let (first, consumed1) = try_decode_record(&buf).unwrap().unwrap();
        assert_eq!(first, a);
        let (second, consumed2) = try_decode_record(&buf[consumed1..]).unwrap().unwrap();
        assert_eq!(second, b);
        assert_eq!(consumed1 + consumed2, buf.len());
    }

    #[test]
    fn test_corrupted_hash_length_is_error() {
        let entry = sample_entry();
        let mut bytes = encode_record(&entry);
        // Header hash_len field lives at byte offset 8+1+8 = 17.
        bytes[17..21].copy_from_slice(&31u32.to_be_bytes());
        let err = try_decode_record(&bytes).unwrap_err();
        assert!(matches!(err, WalError::CorruptedEntry { .. }));
    }
}

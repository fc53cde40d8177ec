//! Request and response body encodings.
//!
//! Batch uploads are a msgpack map of block id (str) to block data (bin).
//! Offset assignment is a JSON array of `[block_id, offset]` pairs. Listing
//! responses are JSON.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use blockvault_model::{validation::validate_offset, BlockId, VaultId};

use crate::error::{ProtocolError, ProtocolResult};

/// Encode `(block id, data)` pairs as a msgpack map of str to bin.
pub fn encode_block_batch<'a, I>(entries: I) -> ProtocolResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a BlockId, &'a [u8])>,
{
    let entries: Vec<(&BlockId, &[u8])> = entries.into_iter().collect();
    let len = u32::try_from(entries.len()).map_err(|_| {
        ProtocolError::Encode(format!("{} entries exceed a msgpack map", entries.len()))
    })?;
    let payload: usize = entries.iter().map(|(id, data)| id.as_str().len() + data.len()).sum();

    let mut buf = Vec::with_capacity(payload + 16 * entries.len() + 5);
    rmp::encode::write_map_len(&mut buf, len).map_err(|e| ProtocolError::Encode(e.to_string()))?;
    for (block_id, data) in entries {
        rmp::encode::write_str(&mut buf, block_id.as_str())
            .map_err(|e| ProtocolError::Encode(e.to_string()))?;
        let data_len = u32::try_from(data.len())
            .map_err(|_| ProtocolError::Encode(format!("block {block_id} exceeds a msgpack bin")))?;
        rmp::encode::write_bin_len(&mut buf, data_len)
            .map_err(|e| ProtocolError::Encode(e.to_string()))?;
        buf.extend_from_slice(data);
    }
    Ok(buf)
}

fn take<'a>(rd: &mut &'a [u8], len: usize) -> ProtocolResult<&'a [u8]> {
    if rd.len() < len {
        return Err(ProtocolError::MalformedBody(format!(
            "truncated: need {len} bytes, have {}",
            rd.len()
        )));
    }
    let (head, tail) = rd.split_at(len);
    *rd = tail;
    Ok(head)
}

/// Decode a msgpack map of str to bin, in encoded order.
pub fn decode_block_batch(data: &[u8]) -> ProtocolResult<Vec<(String, Vec<u8>)>> {
    let mut rd = data;
    let len = rmp::decode::read_map_len(&mut rd)
        .map_err(|e| ProtocolError::MalformedBody(e.to_string()))?;
    // Each entry takes at least a str and a bin header.
    let mut entries = Vec::with_capacity((len as usize).min(rd.len() / 2));
    for _ in 0..len {
        let key_len = rmp::decode::read_str_len(&mut rd)
            .map_err(|e| ProtocolError::MalformedBody(e.to_string()))?;
        let key = take(&mut rd, key_len as usize)?;
        let key = String::from_utf8(key.to_vec())
            .map_err(|e| ProtocolError::MalformedBody(e.to_string()))?;
        let value_len = rmp::decode::read_bin_len(&mut rd)
            .map_err(|e| ProtocolError::MalformedBody(e.to_string()))?;
        let value = take(&mut rd, value_len as usize)?;
        entries.push((key, value.to_vec()));
    }
    if !rd.is_empty() {
        return Err(ProtocolError::MalformedBody(format!("{} trailing bytes", rd.len())));
    }
    Ok(entries)
}

/// Encode an offset assignment as `[[block_id, offset], ...]`.
pub fn encode_assignment(pairs: &[(BlockId, u64)]) -> ProtocolResult<Vec<u8>> {
    serde_json::to_vec(pairs).map_err(|e| ProtocolError::Encode(e.to_string()))
}

pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> ProtocolResult<T> {
    serde_json::from_slice(body).map_err(|e| ProtocolError::MalformedBody(e.to_string()))
}

/// Vault listing: an object keyed by vault id, in response order.
pub fn decode_vault_listing(body: &[u8]) -> ProtocolResult<Vec<VaultId>> {
    let listing: Map<String, Value> = decode_json(body)?;
    listing
        .into_iter()
        .map(|(name, _)| VaultId::new(name).map_err(ProtocolError::from))
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireOffset {
    Number(u64),
    Text(String),
}

/// File-block listing: `[[block_id, offset], ...]`, offsets as numbers or decimal strings.
pub fn decode_file_blocks(body: &[u8]) -> ProtocolResult<Vec<(BlockId, u64)>> {
    let entries: Vec<(BlockId, WireOffset)> = decode_json(body)?;
    entries
        .into_iter()
        .map(|(block_id, offset)| -> ProtocolResult<(BlockId, u64)> {
            let offset = match offset {
                WireOffset::Number(n) => n,
                WireOffset::Text(raw) => validate_offset(&raw)?,
            };
            Ok((block_id, offset))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(n: u8) -> BlockId {
        BlockId::new(hex::encode([n; 20])).unwrap()
    }

    #[test]
    fn batch_encodes_map_of_bin() {
        let a = bid(1);
        let b = bid(2);
        let encoded = encode_block_batch(vec![(&a, &b"alpha"[..]), (&b, &[0u8, 255][..])]).unwrap();
        // fixmap with two entries
        assert_eq!(encoded[0], 0x82);
        let decoded = decode_block_batch(&encoded).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], (a.to_string(), b"alpha".to_vec()));
        assert_eq!(decoded[1], (b.to_string(), vec![0u8, 255]));
    }

    #[test]
    fn empty_batch() {
        let encoded = encode_block_batch(Vec::new()).unwrap();
        assert_eq!(encoded, vec![0x80]);
    }

    #[test]
    fn truncated_batch_fails() {
        let a = bid(1);
        let encoded = encode_block_batch(vec![(&a, &b"alpha"[..])]).unwrap();
        let err = decode_block_batch(&encoded[..encoded.len() - 1]).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedBody(_)));
    }

    #[test]
    fn oversized_map_header_is_rejected() {
        let err = decode_block_batch(&[0xdf, 0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedBody(_)));
    }

    #[test]
    fn assignment_is_array_of_pairs() {
        let body = encode_assignment(&[(bid(1), 0), (bid(2), 4096)]).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!([[bid(1).as_str(), 0], [bid(2).as_str(), 4096]])
        );
    }

    #[test]
    fn vault_listing_keys() {
        let body = br#"{"alpha": {"url": "x"}, "beta": {}}"#;
        let ids = decode_vault_listing(body).unwrap();
        let names: Vec<&str> = ids.iter().map(VaultId::as_str).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn vault_listing_keeps_response_order() {
        let body = br#"{"zeta": {}, "alpha": {}, "mid": {}}"#;
        let ids = decode_vault_listing(body).unwrap();
        let names: Vec<&str> = ids.iter().map(VaultId::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn vault_listing_rejects_bad_names() {
        let body = br#"{"not valid": {}}"#;
        assert!(matches!(decode_vault_listing(body), Err(ProtocolError::Model(_))));
    }

    #[test]
    fn file_blocks_accept_both_offset_forms() {
        let body = format!(r#"[["{}", 0], ["{}", "4096"]]"#, bid(1), bid(2));
        let entries = decode_file_blocks(body.as_bytes()).unwrap();
        assert_eq!(entries, vec![(bid(1), 0), (bid(2), 4096)]);
    }

    #[test]
    fn file_blocks_reject_bad_offsets() {
        let body = format!(r#"[["{}", "-3"]]"#, bid(1));
        assert!(decode_file_blocks(body.as_bytes()).is_err());
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(decode_json::<Vec<String>>(b"{"), Err(ProtocolError::MalformedBody(_))));
    }
}

//! Record codec: normalizes hex-encoded wire entries into [`Record`]s.

use crate::error::DecodeError;
use crate::hash::Hash;
use crate::types::{RawRecord, Record};

/// Decode a wire-format entry. Pure; fails only on malformed hex.
pub fn decode_record(raw: &RawRecord) -> Result<Record, DecodeError> {
    let chain_id = raw
        .chain_id
        .parse::<Hash>()
        .map_err(|source| DecodeError::InvalidHash {
            field: "chainid".into(),
            source,
        })?;

    let ext_ids = raw
        .ext_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            hex::decode(id).map_err(|source| DecodeError::InvalidHex {
                field: format!("extids[{i}]"),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let content = hex::decode(&raw.content).map_err(|source| DecodeError::InvalidHex {
        field: "content".into(),
        source,
    })?;

    Ok(Record { chain_id, ext_ids, content })
}

impl TryFrom<&RawRecord> for Record {
    type Error = DecodeError;

    fn try_from(raw: &RawRecord) -> Result<Self, Self::Error> {
        decode_record(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(chain: &str, ext_ids: &[&str], content: &str) -> RawRecord {
        RawRecord {
            chain_id: chain.into(),
            ext_ids: ext_ids.iter().map(|s| s.to_string()).collect(),
            content: content.into(),
        }
    }

    const CHAIN: &str = "f48d2160c5d8178720d8c83b89a62599ab6a8b9dbec9fbece5229f787d1e8b44";

    #[test]
    fn decodes_all_fields() {
        // "PrimeNumbers.txt", "2", content "hello"
        let r = decode_record(&raw(
            CHAIN,
            &["5072696d654e756d626572732e747874", "32"],
            "68656c6c6f",
        ))
        .unwrap();
        assert_eq!(r.chain_id.to_string(), CHAIN);
        assert_eq!(r.ext_ids_lossy(), vec!["PrimeNumbers.txt", "2"]);
        assert_eq!(r.content, b"hello");
    }

    #[test]
    fn empty_fields_are_valid() {
        let r = decode_record(&raw(CHAIN, &[""], "")).unwrap();
        assert_eq!(r.ext_ids, vec![Vec::<u8>::new()]);
        assert!(r.content.is_empty());
    }

    #[test]
    fn bad_ext_id_names_its_index() {
        let err = decode_record(&raw(CHAIN, &["00", "0g"], "")).unwrap_err();
        match err {
            DecodeError::InvalidHex { field, .. } => assert_eq!(field, "extids[1]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn odd_length_content_rejected() {
        let err = decode_record(&raw(CHAIN, &[], "abc")).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHex { ref field, .. } if field == "content"));
    }

    #[test]
    fn short_chain_id_rejected() {
        let err = Record::try_from(&raw("abcd", &[], "")).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHash { .. }));
    }
}

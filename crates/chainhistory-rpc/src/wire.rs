//! factomd v2 response shapes and their conversion into core types.

use serde::{Deserialize, Serialize};

use chainhistory_core::{Block, ChainHead, Hash, TransportError};

/// Result of `chain-head`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainHeadResponse {
    /// KeyMR of the newest block, empty if none is confirmed yet.
    #[serde(rename = "chainhead", default)]
    pub chain_head: String,
    #[serde(rename = "chaininprocesslist", default)]
    pub in_process_list: bool,
}

impl ChainHeadResponse {
    pub fn into_chain_head(self) -> Result<ChainHead, TransportError> {
        let head = if self.chain_head.is_empty() {
            None
        } else {
            Some(parse_hash("chainhead", &self.chain_head)?)
        };
        Ok(ChainHead { head, in_process_list: self.in_process_list })
    }
}

/// Header of an `entry-block` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryBlockHeader {
    #[serde(rename = "prevkeymr")]
    pub prev_keymr: String,
    #[serde(rename = "chainid")]
    pub chain_id: String,
    #[serde(rename = "blocksequencenumber", default)]
    pub sequence: u32,
    #[serde(rename = "dbheight", default)]
    pub db_height: u32,
    #[serde(default)]
    pub timestamp: u64,
}

/// One member of an `entry-block` entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryListItem {
    #[serde(rename = "entryhash")]
    pub entry_hash: String,
    #[serde(default)]
    pub timestamp: u64,
}

/// Result of `entry-block`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryBlockResponse {
    pub header: EntryBlockHeader,
    #[serde(rename = "entrylist", default)]
    pub entry_list: Vec<EntryListItem>,
}

impl EntryBlockResponse {
    /// Convert into a [`Block`]. The node does not echo the KeyMR, so the
    /// requested one is used.
    pub fn into_block(self, keymr: Hash) -> Result<Block, TransportError> {
        let entries = self
            .entry_list
            .iter()
            .enumerate()
            .map(|(i, item)| parse_hash(&format!("entrylist[{i}].entryhash"), &item.entry_hash))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Block {
            keymr,
            prev_keymr: parse_hash("header.prevkeymr", &self.header.prev_keymr)?,
            chain_id: parse_hash("header.chainid", &self.header.chain_id)?,
            sequence: self.header.sequence,
            entries,
        })
    }
}

fn parse_hash(field: &str, value: &str) -> Result<Hash, TransportError> {
    value
        .parse()
        .map_err(|e| TransportError::Malformed(format!("{field}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainhistory_core::NULL_HASH;

    const KEYMR: &str = "3b2a0d1e7a8c4f5b6d9e0f1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e";
    const CHAIN: &str = "f48d2160c5d8178720d8c83b89a62599ab6a8b9dbec9fbece5229f787d1e8b44";
    const ENTRY: &str = "ec92aa51b34b992b3472c54ce005a3baf7fbdddd8bb6d786aad19304830559b0";

    #[test]
    fn empty_chain_head_is_none() {
        let resp: ChainHeadResponse =
            serde_json::from_str(r#"{"chainhead":"","chaininprocesslist":true}"#).unwrap();
        let head = resp.into_chain_head().unwrap();
        assert_eq!(head, ChainHead::pending());
    }

    #[test]
    fn chain_head_parses_keymr() {
        let raw = format!(r#"{{"chainhead":"{KEYMR}","chaininprocesslist":false}}"#);
        let head = serde_json::from_str::<ChainHeadResponse>(&raw)
            .unwrap()
            .into_chain_head()
            .unwrap();
        assert_eq!(head.head.unwrap().to_string(), KEYMR);
    }

    #[test]
    fn entry_block_converts() {
        let raw = format!(
            r#"{{
                "header": {{
                    "blocksequencenumber": 0,
                    "chainid": "{CHAIN}",
                    "prevkeymr": "{null}",
                    "timestamp": 1487042820,
                    "dbheight": 75893
                }},
                "entrylist": [
                    {{"entryhash": "{ENTRY}", "timestamp": 1487043240}}
                ]
            }}"#,
            null = "0".repeat(64)
        );
        let resp: EntryBlockResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(resp.header.db_height, 75893);

        let keymr: Hash = KEYMR.parse().unwrap();
        let block = resp.into_block(keymr).unwrap();
        assert_eq!(block.keymr, keymr);
        assert_eq!(block.prev_keymr, NULL_HASH);
        assert!(block.is_oldest());
        assert_eq!(block.chain_id.to_string(), CHAIN);
        assert_eq!(block.entries.len(), 1);
        assert_eq!(block.entries[0].to_string(), ENTRY);
    }

    #[test]
    fn bad_entry_hash_is_malformed_response() {
        let raw = format!(
            r#"{{"header":{{"chainid":"{CHAIN}","prevkeymr":"{KEYMR}"}},"entrylist":[{{"entryhash":"nope"}}]}}"#
        );
        let resp: EntryBlockResponse = serde_json::from_str(&raw).unwrap();
        let err = resp.into_block(KEYMR.parse().unwrap()).unwrap_err();
        match err {
            TransportError::Malformed(msg) => assert!(msg.starts_with("entrylist[0].entryhash")),
            other => panic!("unexpected error: {other}"),
        }
    }
}

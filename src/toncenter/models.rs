use crate::address::Address;
use crate::ledger::{AccountState, HeadRef, ItemContent, ItemMetadata, OutboundMessage, Transaction};
use serde::{Deserialize, Deserializer, de};
use tracing::debug;

// TON Center sends 64-bit counters as strings, older deployments as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Counter {
    Number(u64),
    Text(String),
}

impl Counter {
    fn into_u64<E: de::Error>(self) -> Result<u64, E> {
        match self {
            Counter::Number(n) => Ok(n),
            Counter::Text(s) => s.parse().map_err(E::custom),
        }
    }
}

fn counter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Counter::deserialize(deserializer)?.into_u64()
}

fn optional_counter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<Counter>::deserialize(deserializer)?
        .map(Counter::into_u64)
        .transpose()
}

#[derive(Debug, Deserialize)]
pub struct MasterchainInfo {
    pub last: BlockRef,
}

#[derive(Debug, Deserialize)]
pub struct BlockRef {
    pub workchain: i32,
    pub shard: String,
    #[serde(deserialize_with = "counter")]
    pub seqno: u64,
}

impl From<BlockRef> for HeadRef {
    fn from(block: BlockRef) -> Self {
        HeadRef {
            workchain: block.workchain,
            shard: block.shard,
            seqno: block.seqno,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    #[serde(default, deserialize_with = "optional_counter")]
    pub last_transaction_lt: Option<u64>,
    #[serde(default)]
    pub last_transaction_hash: Option<String>,
}

impl From<AccountResponse> for AccountState {
    fn from(account: AccountResponse) -> Self {
        AccountState {
            last_tx_hash: account.last_transaction_hash.unwrap_or_default(),
            last_tx_lt: account.last_transaction_lt.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    #[serde(deserialize_with = "counter")]
    pub lt: u64,
    #[serde(default)]
    pub prev_trans_hash: Option<String>,
    #[serde(default, deserialize_with = "optional_counter")]
    pub prev_trans_lt: Option<u64>,
    #[serde(default)]
    pub out_msgs: Vec<MessageRecord>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub destination: Option<String>,
}

impl From<TransactionRecord> for Transaction {
    fn from(tx: TransactionRecord) -> Self {
        Transaction {
            hash: tx.hash,
            lt: tx.lt,
            prev_hash: tx.prev_trans_hash.unwrap_or_default(),
            prev_lt: tx.prev_trans_lt.unwrap_or(0),
            out_msgs: tx.out_msgs.into_iter().map(OutboundMessage::from).collect(),
        }
    }
}

impl From<MessageRecord> for OutboundMessage {
    fn from(msg: MessageRecord) -> Self {
        let destination = msg
            .destination
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match raw.parse::<Address>() {
                Ok(address) => Some(address),
                Err(e) => {
                    debug!("Ignoring unparseable destination {}: {}", raw, e);
                    None
                }
            });
        OutboundMessage { destination }
    }
}

#[derive(Debug, Deserialize)]
pub struct NftItemsResponse {
    pub nft_items: Vec<NftItemRecord>,
}

#[derive(Debug, Deserialize)]
pub struct NftItemRecord {
    pub init: bool,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

impl From<NftItemRecord> for ItemMetadata {
    fn from(item: NftItemRecord) -> Self {
        // Semi-chain content carries `uri` next to on-chain fields and stays `Other`.
        let content = item
            .content
            .as_ref()
            .and_then(serde_json::Value::as_object)
            .filter(|fields| fields.len() == 1)
            .and_then(|fields| fields.get("uri"))
            .and_then(serde_json::Value::as_str)
            .map(|uri| ItemContent::Offchain(uri.to_string()))
            .unwrap_or(ItemContent::Other);
        ItemMetadata {
            initialized: item.init,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_masterchain_head() {
        let info: MasterchainInfo = serde_json::from_value(json!({
            "last": {
                "workchain": -1,
                "shard": "8000000000000000",
                "seqno": 41923711,
                "root_hash": "yS3xZ0r9XbQ1mQ4cJ+u0xjNuwghq3P0oY0x1q3vQm3E=",
                "file_hash": "B2oKxOQrq0D53ayzBeeRQCqAv2ffts7tW7u+kpxA5ls="
            },
            "first": { "workchain": -1, "shard": "8000000000000000", "seqno": 1 }
        }))
        .unwrap();

        let head = HeadRef::from(info.last);
        assert_eq!(head.workchain, -1);
        assert_eq!(head.seqno, 41923711);
    }

    #[test]
    fn decodes_account_with_string_lt() {
        let account: AccountResponse = serde_json::from_value(json!({
            "balance": "1250000000",
            "last_transaction_lt": "47010344000003",
            "last_transaction_hash": "Qm8X0m1WgkOY3wJ0f2J3uEukYkpXJk5dNfpdmZcKlq8=",
            "status": "active"
        }))
        .unwrap();

        let state = AccountState::from(account);
        assert_eq!(state.last_tx_lt, 47010344000003);
        assert_eq!(state.last_tx_hash, "Qm8X0m1WgkOY3wJ0f2J3uEukYkpXJk5dNfpdmZcKlq8=");
    }

    #[test]
    fn account_without_history_starts_exhausted() {
        let account: AccountResponse = serde_json::from_value(json!({
            "balance": "0",
            "last_transaction_lt": null,
            "status": "uninit"
        }))
        .unwrap();

        assert!(AccountState::from(account).cursor().is_exhausted());
    }

    #[test]
    fn decodes_transaction_page() {
        let page: TransactionsResponse = serde_json::from_value(json!({
            "transactions": [{
                "account": "0:0E41DC1DC3C9067ED24248580E12B3359818D83DEE0304FABCF80845EAFAFDB2",
                "hash": "b1bnmCZUuXKzK1t9ZW7n0e6Kc2+vQqP1S2b0A8qVt4c=",
                "lt": "47010344000003",
                "prev_trans_hash": "3l7r7Ih3Y7F1cQbwGbXa2Yc7rY7kB8vUawv0s1nqJmU=",
                "prev_trans_lt": "47010300000001",
                "out_msgs": [
                    { "destination": format!("0:{}", "11".repeat(32)) },
                    { "destination": null },
                    { "destination": "" }
                ]
            }],
            "address_book": {}
        }))
        .unwrap();

        let tx = Transaction::from(page.transactions.into_iter().next().unwrap());
        assert_eq!(tx.lt, 47010344000003);
        assert_eq!(tx.prev_lt, 47010300000001);
        assert_eq!(tx.out_msgs.len(), 3);
        assert_eq!(tx.out_msgs[0].destination, Some(Address::new(0, [0x11; 32])));
        assert_eq!(tx.out_msgs[1].destination, None);
        assert_eq!(tx.out_msgs[2].destination, None);
    }

    #[test]
    fn first_transaction_has_zero_back_pointer() {
        let tx: TransactionRecord = serde_json::from_value(json!({
            "hash": "AAAA",
            "lt": 1000,
            "prev_trans_hash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
            "prev_trans_lt": "0"
        }))
        .unwrap();

        assert!(Transaction::from(tx).previous().is_exhausted());
    }

    #[test]
    fn decodes_offchain_item_content() {
        let items: NftItemsResponse = serde_json::from_value(json!({
            "nft_items": [{
                "address": format!("0:{}", "22".repeat(32)),
                "init": true,
                "index": "77",
                "content": { "uri": "https://nft.fragment.com/number/88800000077.json" }
            }]
        }))
        .unwrap();

        let metadata = ItemMetadata::from(items.nft_items.into_iter().next().unwrap());
        assert!(metadata.initialized);
        assert_eq!(
            metadata.content,
            ItemContent::Offchain("https://nft.fragment.com/number/88800000077.json".to_string())
        );
    }

    #[test]
    fn onchain_item_content_is_other() {
        let item: NftItemRecord = serde_json::from_value(json!({
            "init": true,
            "content": { "name": "Item", "image": "ipfs://x" }
        }))
        .unwrap();
        assert_eq!(ItemMetadata::from(item).content, ItemContent::Other);

        let bare: NftItemRecord = serde_json::from_value(json!({ "init": false })).unwrap();
        let metadata = ItemMetadata::from(bare);
        assert!(!metadata.initialized);
        assert_eq!(metadata.content, ItemContent::Other);
    }

    #[test]
    fn semichain_item_content_is_other() {
        let item: NftItemRecord = serde_json::from_value(json!({
            "init": true,
            "content": {
                "uri": "https://nft.fragment.com/number/88800000077.json",
                "name": "+888 0000 0077"
            }
        }))
        .unwrap();
        assert_eq!(ItemMetadata::from(item).content, ItemContent::Other);
    }

    #[test]
    fn unparseable_destination_is_ignored() {
        let tx: TransactionRecord = serde_json::from_value(json!({
            "hash": "AAAA",
            "lt": 1000,
            "prev_trans_lt": "0",
            "out_msgs": [
                { "destination": "0:zz" },
                { "destination": format!("0:{}", "33".repeat(32)) }
            ]
        }))
        .unwrap();

        let tx = Transaction::from(tx);
        assert_eq!(tx.out_msgs[0].destination, None);
        assert_eq!(tx.out_msgs[1].destination, Some(Address::new(0, [0x33; 32])));
    }
}

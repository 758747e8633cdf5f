use crate::address::Address;

/// Masterchain block the scan reads against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRef {
    pub workchain: i32,
    pub shard: String,
    pub seqno: u64,
}

/// Position in an account's history, naming the newest transaction not yet read.
///
/// A logical time of zero means there is nothing older left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub hash: String,
    pub lt: u64,
}

impl Cursor {
    pub fn new(hash: impl Into<String>, lt: u64) -> Self {
        Cursor {
            hash: hash.into(),
            lt,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.lt == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub last_tx_hash: String,
    pub last_tx_lt: u64,
}

impl AccountState {
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.last_tx_hash.clone(), self.last_tx_lt)
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub hash: String,
    pub lt: u64,
    pub prev_hash: String,
    pub prev_lt: u64,
    pub out_msgs: Vec<OutboundMessage>,
}

impl Transaction {
    /// Back-pointer to the transaction preceding this one.
    pub fn previous(&self) -> Cursor {
        Cursor::new(self.prev_hash.clone(), self.prev_lt)
    }
}

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// `None` for external outbound messages.
    pub destination: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemContent {
    Offchain(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMetadata {
    pub initialized: bool,
    pub content: ItemContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lt_cursor_is_exhausted() {
        assert!(Cursor::new("", 0).is_exhausted());
        assert!(!Cursor::new("abc=", 1).is_exhausted());
    }

    #[test]
    fn previous_uses_back_pointer() {
        let tx = Transaction {
            hash: "new=".to_string(),
            lt: 200,
            prev_hash: "old=".to_string(),
            prev_lt: 100,
            out_msgs: vec![],
        };
        assert_eq!(tx.previous(), Cursor::new("old=", 100));
    }
}

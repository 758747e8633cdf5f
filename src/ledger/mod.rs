//! Collaborator seams for reading the ledger.
//!
//! The scanner only talks to these traits, so a scan can run against
//! [`crate::toncenter::TonCenterClient`] or a scripted fake.

mod error;
mod types;

pub use error::LedgerError;
pub use types::{
    AccountState, Cursor, HeadRef, ItemContent, ItemMetadata, OutboundMessage, Transaction,
};

use crate::address::Address;
use async_trait::async_trait;

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Latest masterchain block.
    async fn current_head(&self) -> Result<HeadRef, LedgerError>;

    /// Last transaction pointer of `address` as of `head`.
    async fn account_state(
        &self,
        head: &HeadRef,
        address: &Address,
    ) -> Result<AccountState, LedgerError>;

    /// Up to `limit` transactions of `address`, starting at `cursor` and going back.
    async fn list_transactions(
        &self,
        address: &Address,
        limit: u32,
        cursor: &Cursor,
    ) -> Result<Vec<Transaction>, LedgerError>;
}

#[async_trait]
pub trait ItemInspector: Send + Sync {
    /// NFT data of the item contract at `address`.
    async fn nft_data(&self, address: &Address) -> Result<ItemMetadata, LedgerError>;
}

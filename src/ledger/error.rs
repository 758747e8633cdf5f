use crate::address::Address;

/// Failures reported by the ledger collaborators.
///
/// The variant tells the scanner which tier the failure belongs to: every
/// variant except `Inspection` aborts a scan.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Connectivity(String),

    #[error("account {address} lookup failed: {reason}")]
    Lookup { address: Address, reason: String },

    #[error("transaction page fetch failed: {0}")]
    Fetch(String),

    #[error("item {address} inspection failed: {reason}")]
    Inspection { address: Address, reason: String },
}

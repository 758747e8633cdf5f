use crate::address::Address;
use crate::ledger::{ItemContent, ItemMetadata};

pub const NUMBER_URI_PREFIX: &str = "https://nft.fragment.com/number/";
pub const NUMBER_URI_SUFFIX: &str = ".json";
pub const EXPLORER_URL_PREFIX: &str = "https://tonscan.org/address/";

/// A collection item whose content points at a Fragment number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub identifier: String,
    pub address: Address,
}

impl ItemRecord {
    pub fn explorer_url(&self) -> String {
        format!("{}{}", EXPLORER_URL_PREFIX, self.address)
    }
}

/// Number embedded in `https://nft.fragment.com/number/{X}.json`.
///
/// Returns `None` unless both affixes match exactly and `X` is non-empty.
pub fn extract_identifier(uri: &str) -> Option<&str> {
    uri.strip_prefix(NUMBER_URI_PREFIX)?
        .strip_suffix(NUMBER_URI_SUFFIX)
        .filter(|id| !id.is_empty())
}

/// Decides whether an inspected item belongs in the report. Never fails;
/// anything that is not an initialized off-chain number item is skipped.
pub fn classify(address: &Address, metadata: &ItemMetadata) -> Option<ItemRecord> {
    if !metadata.initialized {
        return None;
    }

    match &metadata.content {
        ItemContent::Offchain(uri) => extract_identifier(uri).map(|identifier| ItemRecord {
            identifier: identifier.to_string(),
            address: *address,
        }),
        ItemContent::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(initialized: bool, content: ItemContent) -> ItemMetadata {
        ItemMetadata {
            initialized,
            content,
        }
    }

    #[test]
    fn extracts_number_between_affixes() {
        assert_eq!(
            extract_identifier("https://nft.fragment.com/number/88888888888.json"),
            Some("88888888888")
        );
    }

    #[test]
    fn extracted_identifier_rewraps_to_original_uri() {
        for id in ["88800000000", "8881234567", "x", "888 0000 0000"] {
            let uri = format!("{NUMBER_URI_PREFIX}{id}{NUMBER_URI_SUFFIX}");
            let extracted = extract_identifier(&uri).unwrap();
            assert_eq!(extracted, id);
            assert_eq!(
                format!("{NUMBER_URI_PREFIX}{extracted}{NUMBER_URI_SUFFIX}"),
                uri
            );
        }
    }

    #[test]
    fn rejects_uris_without_exact_affixes() {
        assert_eq!(extract_identifier("https://nft.fragment.com/username/durov.json"), None);
        assert_eq!(extract_identifier("https://nft.fragment.com/number/888"), None);
        assert_eq!(extract_identifier("http://nft.fragment.com/number/888.json"), None);
        assert_eq!(extract_identifier("https://nft.fragment.com/number/.json"), None);
        assert_eq!(extract_identifier(""), None);
    }

    #[test]
    fn classify_keeps_initialized_number_items() {
        let address = Address::new(0, [7; 32]);
        let metadata = item(
            true,
            ItemContent::Offchain("https://nft.fragment.com/number/88812345678.json".to_string()),
        );

        let record = classify(&address, &metadata).unwrap();
        assert_eq!(record.identifier, "88812345678");
        assert_eq!(record.address, address);
        assert_eq!(
            record.explorer_url(),
            format!("https://tonscan.org/address/{address}")
        );
    }

    #[test]
    fn classify_skips_uninitialized_items() {
        let metadata = item(
            false,
            ItemContent::Offchain("https://nft.fragment.com/number/88812345678.json".to_string()),
        );
        assert_eq!(classify(&Address::new(0, [1; 32]), &metadata), None);
    }

    #[test]
    fn classify_skips_non_uri_content() {
        let metadata = item(true, ItemContent::Other);
        assert_eq!(classify(&Address::new(0, [1; 32]), &metadata), None);
    }
}

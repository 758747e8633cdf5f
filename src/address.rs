use anyhow::{Result, bail};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use crc::{CRC_16_XMODEM, Crc};
use std::fmt;
use std::str::FromStr;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;
const FRIENDLY_LEN: usize = 36;

/// Standard TON account address: workchain plus 256-bit account id.
///
/// Accepts raw (`0:83DF...`) and user-friendly (`EQ...`) input. Displays as the
/// bounceable, mainnet, url-safe user-friendly form used by explorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    workchain: i8,
    hash: [u8; 32],
}

impl Address {
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Address { workchain, hash }
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode_upper(self.hash))
    }

    fn parse_raw(s: &str) -> Result<Self> {
        let (wc, id) = s
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid raw address: {}", s))?;
        let workchain: i8 = wc
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid workchain in address: {}", s))?;
        let mut hash = [0u8; 32];
        hex::decode_to_slice(id, &mut hash)
            .map_err(|e| anyhow::anyhow!("Invalid account id in address {}: {}", s, e))?;
        Ok(Address { workchain, hash })
    }

    fn parse_friendly(s: &str) -> Result<Self> {
        let engine = if s.contains(['-', '_']) { &URL_SAFE } else { &STANDARD };
        let bytes = engine
            .decode(s)
            .map_err(|e| anyhow::anyhow!("Invalid base64 address {}: {}", s, e))?;
        if bytes.len() != FRIENDLY_LEN {
            bail!("Invalid address length {} for {}", bytes.len(), s);
        }

        let tag = bytes[0] & !TAG_TESTNET;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            bail!("Unknown address tag {:#04x} in {}", bytes[0], s);
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        if CRC16.checksum(&bytes[..34]) != expected {
            bail!("Address checksum mismatch for {}", s);
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);
        Ok(Address {
            workchain: bytes[1] as i8,
            hash,
        })
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains(':') {
            Self::parse_raw(s)
        } else {
            Self::parse_friendly(s)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = [0u8; FRIENDLY_LEN];
        bytes[0] = TAG_BOUNCEABLE;
        bytes[1] = self.workchain as u8;
        bytes[2..34].copy_from_slice(&self.hash);
        let crc = CRC16.checksum(&bytes[..34]);
        bytes[34..].copy_from_slice(&crc.to_be_bytes());
        f.write_str(&URL_SAFE.encode(bytes))
    }
}

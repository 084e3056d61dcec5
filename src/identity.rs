//! On-chain identifier conversions
//!
//! Registry ids are fixed-width `bytes32` values, right-padded with NUL bytes.
//! Owners are 20-byte addresses displayed in EIP-55 mixed-case hex.

use sha3::{Digest, Keccak256};

/// Fixed-width identifier as stored by the registry contract.
pub type OnChainId = [u8; 32];

/// Ethereum account address.
pub type Address = [u8; 20];

/// Display identity for an on-chain id: the UTF-8 text with NUL padding removed.
pub fn display_identity(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).replace('\0', "")
}

/// Inverse of [`display_identity`] for ids that fit in 32 bytes.
///
/// Returns `None` when the identity is longer than the fixed width.
pub fn to_on_chain_id(identity: &str) -> Option<OnChainId> {
    let bytes = identity.as_bytes();
    if bytes.len() > 32 {
        return None;
    }
    let mut id = [0u8; 32];
    id[..bytes.len()].copy_from_slice(bytes);
    Some(id)
}

/// Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// EIP-55 checksummed `0x` hex form of an address.
pub fn checksum_address(address: &Address) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a `0x`-prefixed (or bare) hex address.
pub fn parse_address(s: &str) -> Option<Address> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}

//! Minimal Solidity ABI codec for the registry contract calls
//!
//! Only the shapes the registry returns are supported: static words
//! (`bool`, `bytes32`, `address`), dynamic `bytes`, and dynamic arrays of
//! `bytes32` / `address`.

use crate::error::{Error, Result};
use crate::identity::{keccak256, Address, OnChainId};

use super::{OrganizationRecord, ServiceRecord};

const WORD: usize = 32;

pub const LIST_ORGANIZATIONS: &str = "listOrganizations()";
pub const GET_ORGANIZATION_BY_ID: &str = "getOrganizationById(bytes32)";
pub const GET_SERVICE_REGISTRATION_BY_ID: &str = "getServiceRegistrationById(bytes32,bytes32)";

/// First four bytes of the Keccak-256 of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for a function whose arguments are all `bytes32`.
pub fn encode_call(signature: &str, args: &[&OnChainId]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg[..]);
    }
    data
}

/// Cursor over ABI-encoded return data.
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8]> {
        let end = start
            .checked_add(len)
            .ok_or_else(|| Error::Abi("offset overflow".to_string()))?;
        self.data.get(start..end).ok_or_else(|| {
            Error::Abi(format!(
                "need bytes {}..{}, have {}",
                start,
                end,
                self.data.len()
            ))
        })
    }

    fn word_at(&self, pos: usize) -> Result<&'a [u8]> {
        self.slice(pos, WORD)
    }

    /// Word at byte position `pos` interpreted as a length or offset.
    fn usize_at(&self, pos: usize) -> Result<usize> {
        let word = self.word_at(pos)?;
        if word[..WORD - 8].iter().any(|b| *b != 0) {
            return Err(Error::Abi(format!("integer at {} does not fit in 64 bits", pos)));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&word[WORD - 8..]);
        usize::try_from(u64::from_be_bytes(buf))
            .map_err(|_| Error::Abi(format!("integer at {} does not fit in usize", pos)))
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        let word = self.word_at(index * WORD)?;
        Ok(word.iter().any(|b| *b != 0))
    }

    pub fn bytes32(&self, index: usize) -> Result<OnChainId> {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.word_at(index * WORD)?);
        Ok(out)
    }

    pub fn address(&self, index: usize) -> Result<Address> {
        let word = self.word_at(index * WORD)?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&word[12..]);
        Ok(out)
    }

    /// Dynamic `bytes` whose head slot is `index`.
    pub fn bytes(&self, index: usize) -> Result<Vec<u8>> {
        let offset = self.usize_at(index * WORD)?;
        let len = self.usize_at(offset)?;
        Ok(self.slice(offset + WORD, len)?.to_vec())
    }

    /// Dynamic `bytes32[]` whose head slot is `index`.
    pub fn bytes32_array(&self, index: usize) -> Result<Vec<OnChainId>> {
        let (start, len) = self.array_bounds(index)?;
        (0..len)
            .map(|i| {
                let mut out = [0u8; 32];
                out.copy_from_slice(self.word_at(start + i * WORD)?);
                Ok(out)
            })
            .collect()
    }

    /// Dynamic `address[]` whose head slot is `index`.
    pub fn address_array(&self, index: usize) -> Result<Vec<Address>> {
        let (start, len) = self.array_bounds(index)?;
        (0..len)
            .map(|i| {
                let word = self.word_at(start + i * WORD)?;
                let mut out = [0u8; 20];
                out.copy_from_slice(&word[12..]);
                Ok(out)
            })
            .collect()
    }

    fn array_bounds(&self, index: usize) -> Result<(usize, usize)> {
        let offset = self.usize_at(index * WORD)?;
        let len = self.usize_at(offset)?;
        // Reject lengths the payload cannot hold before allocating.
        let needed = len
            .checked_mul(WORD)
            .ok_or_else(|| Error::Abi("array length overflow".to_string()))?;
        self.slice(offset + WORD, needed)?;
        Ok((offset + WORD, len))
    }
}

/// `listOrganizations() returns (bytes32[])`
pub fn decode_organization_ids(data: &[u8]) -> Result<Vec<OnChainId>> {
    AbiReader::new(data).bytes32_array(0)
}

/// `getOrganizationById(bytes32) returns (bool, bytes32, bytes, address, address[], bytes32[])`
pub fn decode_organization(data: &[u8]) -> Result<Option<OrganizationRecord>> {
    let reader = AbiReader::new(data);
    if !reader.bool(0)? {
        return Ok(None);
    }
    Ok(Some(OrganizationRecord {
        id: reader.bytes32(1)?,
        metadata_uri: reader.bytes(2)?,
        owner: reader.address(3)?,
        members: reader.address_array(4)?,
        service_ids: reader.bytes32_array(5)?,
    }))
}

/// `getServiceRegistrationById(bytes32, bytes32) returns (bool, bytes32, bytes)`
pub fn decode_service(data: &[u8]) -> Result<Option<ServiceRecord>> {
    let reader = AbiReader::new(data);
    if !reader.bool(0)? {
        return Ok(None);
    }
    Ok(Some(ServiceRecord {
        id: reader.bytes32(1)?,
        metadata_uri: reader.bytes(2)?,
    }))
}

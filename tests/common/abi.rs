//! ABI encoding of registry return tuples, for mock nodes and decode tests

use registry_sync::identity::{Address, OnChainId};

const WORD: usize = 32;

/// Head/tail element of a return tuple.
pub enum Token<'a> {
    Bool(bool),
    Bytes32(&'a OnChainId),
    Address(&'a Address),
    Bytes(&'a [u8]),
    Bytes32Array(&'a [OnChainId]),
    AddressArray(&'a [Address]),
}

fn uint_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address);
    word
}

pub fn tuple(tokens: &[Token<'_>]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for token in tokens {
        match token {
            Token::Bool(b) => head.extend_from_slice(&uint_word(usize::from(*b))),
            Token::Bytes32(id) => head.extend_from_slice(&id[..]),
            Token::Address(a) => head.extend_from_slice(&address_word(a)),
            Token::Bytes(bytes) => {
                head.extend_from_slice(&uint_word(head_len + tail.len()));
                tail.extend_from_slice(&uint_word(bytes.len()));
                tail.extend_from_slice(bytes);
                let pad = (WORD - bytes.len() % WORD) % WORD;
                tail.resize(tail.len() + pad, 0);
            }
            Token::Bytes32Array(ids) => {
                head.extend_from_slice(&uint_word(head_len + tail.len()));
                tail.extend_from_slice(&uint_word(ids.len()));
                for id in ids.iter() {
                    tail.extend_from_slice(&id[..]);
                }
            }
            Token::AddressArray(addresses) => {
                head.extend_from_slice(&uint_word(head_len + tail.len()));
                tail.extend_from_slice(&uint_word(addresses.len()));
                for a in addresses.iter() {
                    tail.extend_from_slice(&address_word(a));
                }
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

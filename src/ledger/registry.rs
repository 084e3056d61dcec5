//! JSON-RPC client for the registry contract
//!
//! Issues `eth_call` requests against the configured contract address at the
//! `latest` block and decodes the returned tuples with [`super::abi`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::abi;
use super::{Ledger, OrganizationRecord, ServiceRecord};
use crate::error::{Error, Result};
use crate::identity::{checksum_address, display_identity, parse_address, Address, OnChainId};

#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Registry contract client over Ethereum JSON-RPC
pub struct EthRegistryClient {
    client: reqwest::Client,
    rpc_url: String,
    contract: Address,
}

impl EthRegistryClient {
    pub fn new(rpc_url: &str, contract_address: &str, timeout: Duration) -> Result<Self> {
        let contract = parse_address(contract_address).ok_or_else(|| {
            Error::Config(format!("invalid registry address: {}", contract_address))
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            contract,
        })
    }

    /// Perform an `eth_call` and return the raw return data.
    async fn call(&self, calldata: Vec<u8>) -> Result<Vec<u8>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: json!([
                {
                    "to": checksum_address(&self.contract),
                    "data": format!("0x{}", hex::encode(&calldata)),
                },
                "latest"
            ]),
        };

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(Error::Ledger(format!("HTTP {}", response.status())));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(Error::Ledger(format!("RPC error {}: {}", err.code, err.message)));
        }

        let result = body
            .result
            .ok_or_else(|| Error::Ledger("response has neither result nor error".to_string()))?;
        let hex_str = result.strip_prefix("0x").unwrap_or(&result);
        let data = hex::decode(hex_str).map_err(|e| Error::Abi(format!("invalid hex result: {}", e)))?;

        debug!(bytes = data.len(), "eth_call returned");
        Ok(data)
    }
}

#[async_trait]
impl Ledger for EthRegistryClient {
    async fn list_organization_ids(&self) -> Result<Vec<OnChainId>> {
        let data = self
            .call(abi::encode_call(abi::LIST_ORGANIZATIONS, &[]))
            .await?;
        abi::decode_organization_ids(&data)
    }

    async fn get_organization(&self, org_id: &OnChainId) -> Result<OrganizationRecord> {
        let data = self
            .call(abi::encode_call(abi::GET_ORGANIZATION_BY_ID, &[org_id]))
            .await?;
        abi::decode_organization(&data)?
            .ok_or_else(|| Error::NotFound(format!("organization {}", display_identity(org_id))))
    }

    async fn get_service(&self, org_id: &OnChainId, service_id: &OnChainId) -> Result<ServiceRecord> {
        let data = self
            .call(abi::encode_call(
                abi::GET_SERVICE_REGISTRATION_BY_ID,
                &[org_id, service_id],
            ))
            .await?;
        abi::decode_service(&data)?.ok_or_else(|| {
            Error::NotFound(format!(
                "service {}/{}",
                display_identity(org_id),
                display_identity(service_id)
            ))
        })
    }
}

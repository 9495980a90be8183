use alloy_primitives::U256;
use async_trait::async_trait;
use crate::application::errors::RpcError;
use crate::domain::entities::ChainAddress;

/// Read-only access to chain state
///
/// Amounts are returned in the smallest unit (wei).
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn get_balance(&self, address: &ChainAddress) -> Result<U256, RpcError>;

    async fn get_gas_price(&self) -> Result<U256, RpcError>;

    async fn get_transaction_count(&self, address: &ChainAddress) -> Result<u64, RpcError>;

    async fn get_block_number(&self) -> Result<u64, RpcError>;
}

//! Chat bot that answers chain queries (balances, gas price, transaction
//! counts, latest block) from a JSON-RPC endpoint.

pub mod domain;
pub mod application;
pub mod infrastructure;

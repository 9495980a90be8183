//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Rpc: Chain JSON-RPC client
//! - Adapters: Platform integrations (Telegram, console)
//! - Http: Auxiliary HTTP listener

pub mod config;
pub mod rpc;
pub mod adapters;
pub mod http;

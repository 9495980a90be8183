//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (Command, IncomingMessage, ChainAddress)
//! - Units: Smallest-unit to display-unit conversion
//! - Traits: Abstractions for infrastructure (Bot, ChainReader)

pub mod entities;
pub mod traits;
pub mod units;

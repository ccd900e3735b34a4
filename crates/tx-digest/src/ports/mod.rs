//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: [`TransactionDigestApi`], consumed by callers
//! - **Driven Ports (Outbound)**: [`GroupRootStore`], implemented by adapters

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

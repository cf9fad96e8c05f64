//! Estate Sandbox
//!
//! In-memory collaborators for running an estate without a chain:
//!
//! - [`SimulatedReserve`]: principal/position accounting with simple interest
//! - [`AttestationBook`]: latest death attestation per owner
//! - [`SimulatedToken`]: per-address balances and a custody account
//!
//! A [`Deployment`] persists all of it, with the estate state, to one JSON file.

pub mod deployment;
pub mod oracle;
pub mod reserve;
pub mod token;

pub use deployment::{Deployment, DeploymentError, SandboxCustody};
pub use oracle::{proof_digest, AttestationBook};
pub use reserve::{SimulatedReserve, YEAR};
pub use token::SimulatedToken;

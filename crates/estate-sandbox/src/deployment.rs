//! Persisted sandbox deployment.
//!
//! One JSON file holds the estate state, its event log and the three
//! simulated collaborators. Loaded into a [`SandboxCustody`] for a call and
//! saved back afterwards.

use crate::oracle::AttestationBook;
use crate::reserve::SimulatedReserve;
use crate::token::SimulatedToken;
use estate_custody::{Custody, CustodyError, CustodyEvent, CustodyState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// An estate wired to the simulated collaborators.
pub type SandboxCustody = Custody<SimulatedReserve, AttestationBook, SimulatedToken>;

#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid estate state: {0}")]
    Invalid(#[from] CustodyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub state: CustodyState,
    #[serde(default)]
    pub events: Vec<CustodyEvent>,
    pub reserve: SimulatedReserve,
    pub oracle: AttestationBook,
    pub token: SimulatedToken,
}

impl Deployment {
    /// Load a deployment. A missing or empty file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, DeploymentError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Self::from_slice(contents.as_bytes()).map(Some)
    }

    /// Parse a deployment and check the estate state it carries.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DeploymentError> {
        let deployment: Deployment = serde_json::from_slice(bytes)?;
        deployment.state.validate()?;
        Ok(deployment)
    }

    pub fn save(&self, path: &Path) -> Result<(), DeploymentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn into_custody(self) -> SandboxCustody {
        Custody::from_parts(self.state, self.events, self.reserve, self.oracle, self.token)
    }

    pub fn from_custody(custody: SandboxCustody) -> Self {
        let (state, events, reserve, oracle, token) = custody.into_parts();
        Self {
            state,
            events,
            reserve,
            oracle,
            token,
        }
    }
}

//! Primitive types shared by every custody component.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Value in the smallest unit of the settlement asset.
pub type Amount = u64;

/// Seconds since the Unix epoch, as read by the substrate for one call.
pub type Timestamp = u64;

/// One day in seconds. The default "time-unit" for check-in thresholds.
pub const DAY: u64 = 86_400;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// A payout or identity address.
///
/// The all-zero address is the "no address" sentinel used by empty
/// beneficiary slots and is never a valid identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The empty sentinel.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        let array: [u8; ADDRESS_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of the estate. `Distribution` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// Owner is checking in on schedule.
    Active,
    /// Check-in period missed; grace period running.
    Warning,
    /// Grace period over; waiting for a death attestation.
    Verification,
    /// Funds have been liquidated and paid out.
    Distribution,
}

impl State {
    pub fn is_terminal(self) -> bool {
        self == State::Distribution
    }

    /// Whether the owner may still edit beneficiaries and check in.
    pub fn admits_owner_changes(self) -> bool {
        matches!(self, State::Active | State::Warning)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Active => "ACTIVE",
            State::Warning => "WARNING",
            State::Verification => "VERIFICATION",
            State::Distribution => "DISTRIBUTION",
        };
        f.write_str(name)
    }
}

/// Context the substrate supplies with every call: who is calling, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    /// Authenticated caller identity.
    pub caller: Address,
    /// Clock reading for this call.
    pub now: Timestamp,
}

impl Invocation {
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_and_parse() {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[19] = 0xab;
        let addr = Address::new(bytes);

        let s = addr.to_string();
        assert_eq!(s, "0x00000000000000000000000000000000000000ab");
        assert_eq!(Address::from_str(&s).unwrap(), addr);
        // prefix is optional
        assert_eq!(Address::from_str(&s[2..]).unwrap(), addr);
    }

    #[test]
    fn test_address_parse_errors() {
        assert!(matches!(
            Address::from_str("0xzz"),
            Err(AddressParseError::InvalidHex(_))
        ));
        assert_eq!(
            Address::from_str("0xabcd"),
            Err(AddressParseError::InvalidLength(2))
        );
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::default().is_zero());
        assert!(!Address::new([1u8; ADDRESS_LEN]).is_zero());
    }

    #[test]
    fn test_address_serde_as_string() {
        let addr = Address::new([0x11; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));

        let restored: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, addr);
    }

    #[test]
    fn test_state_guards() {
        assert!(State::Active.admits_owner_changes());
        assert!(State::Warning.admits_owner_changes());
        assert!(!State::Verification.admits_owner_changes());
        assert!(!State::Distribution.admits_owner_changes());
        assert!(State::Distribution.is_terminal());
        assert_eq!(State::Verification.to_string(), "VERIFICATION");
    }
}

//! One-step transition rule.
//!
//! `evaluate()` applies [`next_state`] repeatedly until it returns `None`,
//! so a single call can cascade ACTIVE -> WARNING -> VERIFICATION ->
//! DISTRIBUTION. WARNING -> ACTIVE is not here: only a check-in does that.

use crate::checkin::CustodyConfig;
use crate::types::State;

/// Facts a transition may depend on, as of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facts {
    /// Seconds since the last check-in.
    pub elapsed: u64,
    /// Oracle's answer for the owner.
    pub deceased: bool,
}

/// The state reachable from `current` in one step, if any.
pub fn next_state(current: State, facts: &Facts, config: &CustodyConfig) -> Option<State> {
    match current {
        State::Active if facts.elapsed > config.warning_threshold() => Some(State::Warning),
        State::Warning if facts.elapsed > config.verification_threshold() => {
            Some(State::Verification)
        }
        State::Verification if facts.deceased => Some(State::Distribution),
        _ => None,
    }
}

//! Read-only liveness report.
//!
//! Pure logic, same shape as a heartbeat check: takes the timer and current
//! state, returns how close the estate is to its next deadline. Callers
//! (UI, keeper daemon) decide whether to act.

use crate::checkin::{CheckInTimer, CustodyConfig};
use crate::transition::{next_state, Facts};
use crate::types::{State, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessStatus {
    pub state: State,
    pub last_check_in: Timestamp,
    /// Seconds since the last check-in.
    pub elapsed: u64,
    /// Seconds until the WARNING threshold is crossed (0 once crossed).
    pub until_warning: u64,
    /// Seconds until the VERIFICATION threshold is crossed (0 once crossed).
    pub until_verification: u64,
    /// State `evaluate()` would settle in now, absent a death attestation.
    pub projected: State,
    pub payout_completed: bool,
}

impl LivenessStatus {
    pub fn compute(
        state: State,
        timer: &CheckInTimer,
        config: &CustodyConfig,
        payout_completed: bool,
        now: Timestamp,
    ) -> Self {
        let elapsed = timer.elapsed(now);
        let facts = Facts {
            elapsed,
            deceased: false,
        };
        let mut projected = state;
        while let Some(next) = next_state(projected, &facts, config) {
            projected = next;
        }

        Self {
            state,
            last_check_in: timer.last_check_in(),
            elapsed,
            until_warning: timer.remaining(now, config.warning_threshold()),
            until_verification: timer.remaining(now, config.verification_threshold()),
            projected,
            payout_completed,
        }
    }

    /// Whether the next `evaluate()` would move the state.
    pub fn is_transition_pending(&self) -> bool {
        self.projected != self.state
    }

    /// Seconds until the nearest deadline still ahead, if any.
    pub fn next_deadline_in(&self) -> Option<u64> {
        match self.state {
            State::Active if self.until_warning > 0 => Some(self.until_warning),
            State::Active | State::Warning if self.until_verification > 0 => {
                Some(self.until_verification)
            }
            _ => None,
        }
    }
}

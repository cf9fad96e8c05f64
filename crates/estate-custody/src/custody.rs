//! The estate instance.
//!
//! Owns all durable state and the three external collaborators. Every
//! mutating call runs against a checkpoint of the state and of each
//! collaborator: on error all four are restored and the call's events are
//! dropped, so a failed call leaves no trace. Events of a successful call
//! are appended to the event log and returned in its [`Receipt`].

use crate::access::AccessControl;
use crate::attestation::DeathAttestationAdapter;
use crate::checkin::{CheckInTimer, CustodyConfig};
use crate::distribution::plan_payouts;
use crate::error::CustodyError;
use crate::events::CustodyEvent;
use crate::ledger::FundsLedger;
use crate::registry::{Beneficiary, BeneficiaryRegistry, EditOutcome, MAX_BENEFICIARIES};
use crate::reserve::{ReserveAdapter, ReserveError};
use crate::settlement::SettlementAsset;
use crate::status::LivenessStatus;
use crate::transition::{next_state, Facts};
use crate::types::{Address, Amount, Invocation, State, Timestamp};
use serde::{Deserialize, Serialize};

/// Durable state of one estate, excluding collaborators and the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyState {
    access: AccessControl,
    config: CustodyConfig,
    timer: CheckInTimer,
    registry: BeneficiaryRegistry,
    ledger: FundsLedger,
    state: State,
    payout_completed: bool,
    /// Value held in custody outside the reserve: yield retained from
    /// withdrawals, and truncation dust after distribution.
    retained: Amount,
}

impl CustodyState {
    pub fn new(
        owner: Address,
        notary: Address,
        config: CustodyConfig,
        created_at: Timestamp,
    ) -> Result<Self, CustodyError> {
        config.validate()?;
        Ok(Self {
            access: AccessControl::new(owner, notary)?,
            config,
            timer: CheckInTimer::new(created_at),
            registry: BeneficiaryRegistry::new(),
            ledger: FundsLedger::new(),
            state: State::Active,
            payout_completed: false,
            retained: 0,
        })
    }

    /// Check a state that was deserialized rather than built by [`CustodyState::new`].
    pub fn validate(&self) -> Result<(), CustodyError> {
        self.config.validate()?;
        self.access.validate()?;
        self.registry.validate()?;
        if self.payout_completed != (self.state == State::Distribution) {
            return Err(CustodyError::InconsistentState(
                "payout flag disagrees with lifecycle state",
            ));
        }
        Ok(())
    }
}

/// What a successful call returned, and the events it emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    pub outcome: T,
    pub events: Vec<CustodyEvent>,
}

pub struct Custody<R, A, S> {
    state: CustodyState,
    events: Vec<CustodyEvent>,
    reserve: R,
    oracle: A,
    settlement: S,
}

/// Snapshot taken before a mutating call.
struct Checkpoint<R, A, S> {
    state: CustodyState,
    reserve: R,
    oracle: A,
    settlement: S,
}

impl<R, A, S> Custody<R, A, S>
where
    R: ReserveAdapter + Clone,
    A: DeathAttestationAdapter + Clone,
    S: SettlementAsset + Clone,
{
    /// Create an estate. The check-in clock starts at `created_at`.
    pub fn new(
        owner: Address,
        notary: Address,
        config: CustodyConfig,
        created_at: Timestamp,
        reserve: R,
        oracle: A,
        settlement: S,
    ) -> Result<Self, CustodyError> {
        let state = CustodyState::new(owner, notary, config, created_at)?;
        log::info!(
            "Estate created: owner {}, notary {}, state {}",
            owner,
            notary,
            state.state
        );
        Ok(Self::from_parts(state, Vec::new(), reserve, oracle, settlement))
    }

    /// Reassemble a previously persisted estate.
    pub fn from_parts(
        state: CustodyState,
        events: Vec<CustodyEvent>,
        reserve: R,
        oracle: A,
        settlement: S,
    ) -> Self {
        Self {
            state,
            events,
            reserve,
            oracle,
            settlement,
        }
    }

    pub fn into_parts(self) -> (CustodyState, Vec<CustodyEvent>, R, A, S) {
        (
            self.state,
            self.events,
            self.reserve,
            self.oracle,
            self.settlement,
        )
    }

    // ========================================================================
    // Owner operations
    // ========================================================================

    /// Confirm liveness. Returns the estate to ACTIVE if it was in WARNING.
    pub fn check_in(&mut self, call: &Invocation) -> Result<Receipt<()>, CustodyError> {
        self.transact("check_in", |this, events| {
            this.state.access.require_owner(call)?;
            let current = this.state.state;
            if !current.admits_owner_changes() {
                return Err(CustodyError::InvalidState {
                    operation: "check-in",
                    state: current,
                });
            }

            this.state.timer.record(call.now);
            if current == State::Warning {
                this.state.state = State::Active;
                events.push(CustodyEvent::StateChanged {
                    from: State::Warning,
                    to: State::Active,
                });
            }
            events.push(CustodyEvent::CheckedIn {
                at: this.state.timer.last_check_in(),
            });
            Ok(())
        })
    }

    pub fn add_beneficiary(
        &mut self,
        call: &Invocation,
        address: Address,
        percentage: u8,
    ) -> Result<Receipt<EditOutcome>, CustodyError> {
        self.transact("add_beneficiary", |this, events| {
            this.require_admin_change(call)?;
            let outcome = this.state.registry.add(address, percentage)?;
            match outcome {
                EditOutcome::Applied => events.push(CustodyEvent::BeneficiaryAdded {
                    address,
                    percentage,
                }),
                EditOutcome::Rejected(reason) => {
                    log::info!("Beneficiary {} not added: {}", address, reason)
                }
            }
            Ok(outcome)
        })
    }

    pub fn remove_beneficiary(
        &mut self,
        call: &Invocation,
        address: Address,
    ) -> Result<Receipt<EditOutcome>, CustodyError> {
        self.transact("remove_beneficiary", |this, events| {
            this.require_admin_change(call)?;
            let outcome = this.state.registry.remove(&address);
            match outcome {
                EditOutcome::Applied => events.push(CustodyEvent::BeneficiaryRemoved { address }),
                EditOutcome::Rejected(reason) => {
                    log::info!("Beneficiary {} not removed: {}", address, reason)
                }
            }
            Ok(outcome)
        })
    }

    /// Move `amount` from the owner into the reserve. ACTIVE only.
    pub fn deposit(&mut self, call: &Invocation, amount: Amount) -> Result<Receipt<()>, CustodyError> {
        self.transact("deposit", |this, events| {
            this.state.access.require_owner(call)?;
            match this.state.state {
                State::Active => {}
                State::Distribution => return Err(CustodyError::PostDistributionLock),
                state => {
                    return Err(CustodyError::InvalidState {
                        operation: "deposit",
                        state,
                    })
                }
            }
            if amount == 0 {
                return Err(CustodyError::InvalidAmount(amount));
            }

            this.state.ledger.credit(amount)?;
            this.settlement.pull(&this.state.access.owner(), amount)?;
            this.reserve.deposit(amount)?;
            events.push(CustodyEvent::Deposited { amount });
            Ok(())
        })
    }

    /// Return `amount` of principal to the owner.
    ///
    /// The reserve hands back the principal with its share of yield; only
    /// the principal leaves custody; the surplus is retained for the
    /// eventual distribution.
    pub fn withdraw(&mut self, call: &Invocation, amount: Amount) -> Result<Receipt<()>, CustodyError> {
        self.transact("withdraw", |this, events| {
            this.state.access.require_owner(call)?;
            if this.state.state.is_terminal() {
                return Err(CustodyError::PostDistributionLock);
            }
            if amount == 0 {
                return Err(CustodyError::InvalidAmount(amount));
            }

            this.state.ledger.debit(amount)?;
            let returned = this.reserve.withdraw(amount)?;
            let surplus = returned.checked_sub(amount).ok_or(ReserveError::Shortfall {
                requested: amount,
                returned,
            })?;
            this.settlement.push(&this.state.access.owner(), amount)?;
            this.state.retained = this
                .state
                .retained
                .checked_add(surplus)
                .ok_or(CustodyError::ArithmeticOverflow)?;
            if surplus > 0 {
                log::debug!("Retained {} of yield from withdrawal", surplus);
            }
            events.push(CustodyEvent::Withdrawn { amount });
            Ok(())
        })
    }

    // ========================================================================
    // Notary operations
    // ========================================================================

    /// Forward an attestation about the owner to the oracle.
    ///
    /// Accepted in any state and for either value of `deceased`; only
    /// `evaluate()` interprets it.
    pub fn upload_attestation(
        &mut self,
        call: &Invocation,
        deceased: bool,
        proof: Vec<u8>,
    ) -> Result<Receipt<()>, CustodyError> {
        self.transact("upload_attestation", |this, _events| {
            this.state.access.require_notary(call)?;
            let owner = this.state.access.owner();
            let proof_len = proof.len();
            this.oracle.record(owner, deceased, proof, call.now)?;
            log::info!(
                "Attestation recorded for {}: deceased={} ({} proof bytes)",
                owner,
                deceased,
                proof_len
            );
            Ok(())
        })
    }

    // ========================================================================
    // Evaluation (any caller)
    // ========================================================================

    /// Re-derive the state from elapsed time and attested facts.
    ///
    /// Applies transitions until none apply. Entering DISTRIBUTION runs the
    /// payout in the same call. Fails with `PayoutAlreadyCompleted` once
    /// the estate is distributed.
    pub fn evaluate(&mut self, call: &Invocation) -> Result<Receipt<State>, CustodyError> {
        self.transact("evaluate", |this, events| {
            if this.state.payout_completed || this.state.state.is_terminal() {
                return Err(CustodyError::PayoutAlreadyCompleted);
            }

            let elapsed = this.state.timer.elapsed(call.now);
            let mut deceased: Option<bool> = None;
            loop {
                let current = this.state.state;
                if current == State::Verification && deceased.is_none() {
                    deceased = Some(this.oracle.is_deceased(&this.state.access.owner())?);
                }
                let facts = Facts {
                    elapsed,
                    deceased: deceased.unwrap_or(false),
                };
                let Some(next) = next_state(current, &facts, &this.state.config) else {
                    break;
                };

                this.state.state = next;
                events.push(CustodyEvent::StateChanged {
                    from: current,
                    to: next,
                });

                if next == State::Distribution {
                    this.distribute(events)?;
                    this.state.payout_completed = true;
                }
            }
            Ok(this.state.state)
        })
    }

    /// Liquidate everything and pay out. Called once, on entering DISTRIBUTION.
    fn distribute(&mut self, events: &mut Vec<CustodyEvent>) -> Result<(), CustodyError> {
        let liquidated = self.reserve.withdraw_all()?;
        let total = liquidated
            .checked_add(self.state.retained)
            .ok_or(CustodyError::ArithmeticOverflow)?;
        let plan = plan_payouts(total, &self.state.registry, self.state.access.notary())?;

        for payout in plan.payouts() {
            self.settlement.push(&payout.recipient, payout.amount)?;
            events.push(CustodyEvent::PayoutMade {
                amount: payout.amount,
                recipient: payout.recipient,
            });
        }

        self.state.ledger.clear();
        self.state.retained = plan.dust();
        log::info!(
            "Distributed {} of {} ({} from reserve, {} dust retained)",
            plan.distributed(),
            total,
            liquidated,
            plan.dust()
        );
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> State {
        self.state.state
    }

    /// Tracked principal, not the actual holding.
    pub fn balance(&self) -> Amount {
        self.state.ledger.balance()
    }

    pub fn last_check_in(&self) -> Timestamp {
        self.state.timer.last_check_in()
    }

    /// Full slot table, empty slots included.
    pub fn beneficiaries(&self) -> [Beneficiary; MAX_BENEFICIARIES] {
        self.state.registry.snapshot()
    }

    /// Occupied slots in slot order.
    pub fn active_beneficiaries(&self) -> Vec<Beneficiary> {
        self.state.registry.active()
    }

    pub fn active_count(&self) -> usize {
        self.state.registry.active_count()
    }

    pub fn determined_payout_percentage(&self) -> u32 {
        self.state.registry.determined_percentage()
    }

    pub fn is_payout_fully_determined(&self) -> bool {
        self.state.registry.is_fully_determined()
    }

    pub fn check_if_owner_deceased(&self) -> Result<bool, CustodyError> {
        Ok(self.oracle.is_deceased(&self.state.access.owner())?)
    }

    pub fn owner(&self) -> Address {
        self.state.access.owner()
    }

    pub fn notary(&self) -> Address {
        self.state.access.notary()
    }

    pub fn config(&self) -> &CustodyConfig {
        &self.state.config
    }

    pub fn is_payout_completed(&self) -> bool {
        self.state.payout_completed
    }

    /// Value held in custody outside the reserve.
    pub fn custody_holding(&self) -> Amount {
        self.state.retained
    }

    /// Committed events, oldest first.
    pub fn events(&self) -> &[CustodyEvent] {
        &self.events
    }

    pub fn status(&self, now: Timestamp) -> LivenessStatus {
        LivenessStatus::compute(
            self.state.state,
            &self.state.timer,
            &self.state.config,
            self.state.payout_completed,
            now,
        )
    }

    pub fn reserve(&self) -> &R {
        &self.reserve
    }

    pub fn reserve_mut(&mut self) -> &mut R {
        &mut self.reserve
    }

    pub fn oracle(&self) -> &A {
        &self.oracle
    }

    pub fn settlement(&self) -> &S {
        &self.settlement
    }

    pub fn settlement_mut(&mut self) -> &mut S {
        &mut self.settlement
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_admin_change(&self, call: &Invocation) -> Result<(), CustodyError> {
        self.state.access.require_owner(call)?;
        if !self.state.state.admits_owner_changes() {
            return Err(CustodyError::AdministrativeChangeBlocked(self.state.state));
        }
        Ok(())
    }

    fn transact<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self, &mut Vec<CustodyEvent>) -> Result<T, CustodyError>,
    ) -> Result<Receipt<T>, CustodyError> {
        let checkpoint = Checkpoint {
            state: self.state.clone(),
            reserve: self.reserve.clone(),
            oracle: self.oracle.clone(),
            settlement: self.settlement.clone(),
        };
        let mut pending = Vec::new();

        match op(self, &mut pending) {
            Ok(outcome) => {
                for event in &pending {
                    log::info!("[{}] {}", operation, event);
                }
                self.events.extend(pending.iter().cloned());
                Ok(Receipt {
                    outcome,
                    events: pending,
                })
            }
            Err(e) => {
                self.state = checkpoint.state;
                self.reserve = checkpoint.reserve;
                self.oracle = checkpoint.oracle;
                self.settlement = checkpoint.settlement;
                log::warn!("{} failed: {}", operation, e);
                Err(e)
            }
        }
    }
}

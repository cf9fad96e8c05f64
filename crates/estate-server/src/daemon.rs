//! The keeper loop: periodically accrues reserve yield and evaluates the estate.

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use estate_custody::{Address, CustodyError, CustodyEvent, Invocation, State, Timestamp, DAY};
use estate_sandbox::{AttestationBook, Deployment, SandboxCustody, SimulatedReserve, SimulatedToken};
use std::time::Duration;

/// Caller identity used for keeper evaluations. `evaluate()` is open to anyone.
const KEEPER: Address = Address::ZERO;

/// Warn when a deadline is closer than this.
const DEADLINE_WARNING_WINDOW: u64 = 7 * DAY;

/// What one check cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// `evaluate()` ran.
    Evaluated {
        from: State,
        to: State,
        payouts: usize,
    },
    /// The estate was distributed in an earlier cycle.
    AlreadyCompleted,
}

/// Run the daemon loop. Blocks forever (until shutdown signal).
pub async fn run(config: ServerConfig) -> Result<()> {
    log::info!("Estate keeper starting…");
    log::info!("  Owner:      {}", config.estate.owner);
    log::info!("  Notary:     {}", config.estate.notary);
    log::info!(
        "  Interval:   {} seconds ({:.1} hours)",
        config.server.check_interval_secs,
        config.server.check_interval_secs as f64 / 3600.0
    );
    log::info!("  Data dir:   {}", config.server.data_dir.display());

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data dir: {}",
            config.server.data_dir.display()
        )
    })?;

    let interval = Duration::from_secs(config.server.check_interval_secs);
    let mut completion_logged = false;

    // Run first check immediately, then loop
    let mut first = true;
    loop {
        if !first {
            log::debug!(
                "Sleeping {} seconds until next check…",
                config.server.check_interval_secs
            );
            tokio::time::sleep(interval).await;
        }
        first = false;

        let cycle = unix_now().and_then(|now| run_check_cycle(&config, now));
        match cycle {
            Ok(CycleOutcome::Evaluated { .. }) => {
                log::info!("Check cycle completed successfully.")
            }
            Ok(CycleOutcome::AlreadyCompleted) => {
                if !completion_logged {
                    log::info!("Estate already distributed. Keeper is idle.");
                    completion_logged = true;
                }
            }
            Err(e) => log::error!("Check cycle failed: {:#}", e),
        }
    }
}

/// Execute a single check cycle: load, accrue yield, evaluate, report, save.
pub fn run_check_cycle(config: &ServerConfig, now: Timestamp) -> Result<CycleOutcome> {
    log::debug!("Starting check cycle at {}…", format_timestamp(now));

    let path = config.deployment_path();
    let deployment = match Deployment::load(&path)
        .with_context(|| format!("Failed to load deployment from {}", path.display()))?
    {
        Some(deployment) => deployment,
        None => {
            log::info!("No deployment at {}. Creating one.", path.display());
            create_deployment(config, now)?
        }
    };

    let mut estate = deployment.into_custody();
    let owner = config.owner()?;
    let notary = config.notary()?;
    anyhow::ensure!(
        estate.owner() == owner,
        "Deployment at {} belongs to {}, not the configured owner {}",
        path.display(),
        estate.owner(),
        owner
    );
    anyhow::ensure!(
        estate.notary() == notary,
        "Deployment at {} names notary {}, not the configured notary {}",
        path.display(),
        estate.notary(),
        notary
    );

    let accrued = estate.reserve_mut().accrue(now);
    if accrued > 0 {
        log::info!("Reserve accrued {} of yield", accrued);
    }

    let from = estate.state();
    let outcome = match estate.evaluate(&Invocation::new(KEEPER, now)) {
        Ok(receipt) => {
            let mut payouts = 0;
            for event in &receipt.events {
                match event {
                    CustodyEvent::StateChanged { from, to } => {
                        log::warn!("Estate moved {} -> {}", from, to)
                    }
                    CustodyEvent::PayoutMade { amount, recipient } => {
                        payouts += 1;
                        log::info!("Paid {} to {}", amount, recipient);
                    }
                    other => log::debug!("{}", other),
                }
            }
            CycleOutcome::Evaluated {
                from,
                to: receipt.outcome,
                payouts,
            }
        }
        Err(CustodyError::PayoutAlreadyCompleted) => CycleOutcome::AlreadyCompleted,
        Err(e) => return Err(e).context("Evaluation failed"),
    };

    report_status(&estate, now);

    Deployment::from_custody(estate)
        .save(&path)
        .with_context(|| format!("Failed to save deployment to {}", path.display()))?;

    Ok(outcome)
}

fn create_deployment(config: &ServerConfig, now: Timestamp) -> Result<Deployment> {
    let owner = config.owner()?;
    let mut token = SimulatedToken::new();
    token.mint(owner, config.estate.owner_funds);

    let estate: SandboxCustody = SandboxCustody::new(
        owner,
        config.notary()?,
        config.custody_config()?,
        now,
        SimulatedReserve::new(config.reserve.annual_rate_bps),
        AttestationBook::new(),
        token,
    )
    .context("Failed to create estate")?;

    Ok(Deployment::from_custody(estate))
}

/// Log how close the estate is to its next deadline.
fn report_status(estate: &SandboxCustody, now: Timestamp) {
    let status = estate.status(now);
    log::info!(
        "State: {}  |  Balance: {}  |  Last check-in: {}",
        status.state,
        estate.balance(),
        format_timestamp(status.last_check_in)
    );

    if status.state == State::Verification {
        log::warn!("Awaiting death attestation from notary {}", estate.notary());
        return;
    }

    if let Some(remaining) = status.next_deadline_in() {
        let days = remaining as f64 / DAY as f64;
        if remaining < DEADLINE_WARNING_WINDOW {
            log::warn!("⚠️  Next deadline in ~{:.1} days. Owner should check in.", days);
        } else {
            log::info!("Next deadline in ~{:.1} days", days);
        }
    }
}

/// Current wall-clock time as a Unix timestamp.
pub fn unix_now() -> Result<Timestamp> {
    let secs = chrono::Utc::now().timestamp();
    Timestamp::try_from(secs).context("System clock is before the Unix epoch")
}

fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EstateSection, ReserveSection, ServerSection};
    use estate_custody::DeathAttestationAdapter;
    use tempfile::tempdir;

    const START: Timestamp = 1_700_000_000;

    fn test_config(data_dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            server: ServerSection {
                data_dir: data_dir.to_path_buf(),
                check_interval_secs: 3600,
                log_level: "info".into(),
            },
            estate: EstateSection {
                owner: "0x0100000000000000000000000000000000000001".into(),
                notary: "0x0100000000000000000000000000000000000002".into(),
                check_in_period_days: 90,
                grace_period_days: 30,
                owner_funds: 1_000,
            },
            reserve: ReserveSection { annual_rate_bps: 0 },
        }
    }

    fn at(days: u64) -> Timestamp {
        START + days * DAY
    }

    #[test]
    fn test_first_cycle_creates_deployment() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let outcome = run_check_cycle(&config, START).unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Evaluated {
                from: State::Active,
                to: State::Active,
                payouts: 0
            }
        );

        let deployment = Deployment::load(&config.deployment_path()).unwrap().unwrap();
        let estate = deployment.into_custody();
        assert_eq!(estate.owner(), config.owner().unwrap());
        assert_eq!(estate.last_check_in(), START);
        assert_eq!(estate.settlement().balance_of(&estate.owner()), 1_000);
    }

    #[test]
    fn test_silence_moves_estate_forward() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        run_check_cycle(&config, START).unwrap();

        let outcome = run_check_cycle(&config, at(91)).unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Evaluated {
                from: State::Active,
                to: State::Warning,
                payouts: 0
            }
        );

        let outcome = run_check_cycle(&config, at(200)).unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Evaluated {
                to: State::Verification,
                ..
            }
        ));
    }

    #[test]
    fn test_distribution_then_idle() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let path = config.deployment_path();
        run_check_cycle(&config, START).unwrap();

        // owner and notary act between cycles
        let mut estate = Deployment::load(&path).unwrap().unwrap().into_custody();
        let owner = estate.owner();
        let notary = estate.notary();
        let heir: Address = "0x01000000000000000000000000000000000000aa".parse().unwrap();
        estate.deposit(&Invocation::new(owner, START), 1_000).unwrap();
        estate.add_beneficiary(&Invocation::new(owner, START), heir, 70).unwrap();
        estate
            .upload_attestation(&Invocation::new(notary, at(1)), true, b"cert".to_vec())
            .unwrap();
        assert!(estate.oracle().is_deceased(&owner).unwrap());
        Deployment::from_custody(estate).save(&path).unwrap();

        let outcome = run_check_cycle(&config, at(121)).unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Evaluated {
                from: State::Active,
                to: State::Distribution,
                payouts: 2
            }
        );

        let estate = Deployment::load(&path).unwrap().unwrap().into_custody();
        assert_eq!(estate.settlement().balance_of(&heir), 700);
        assert_eq!(estate.settlement().balance_of(&notary), 300);

        assert_eq!(
            run_check_cycle(&config, at(122)).unwrap(),
            CycleOutcome::AlreadyCompleted
        );
    }

    #[test]
    fn test_owner_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        run_check_cycle(&config, START).unwrap();

        config.estate.owner = "0x0100000000000000000000000000000000000003".into();
        assert!(run_check_cycle(&config, at(1)).is_err());
    }

    #[test]
    fn test_notary_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        run_check_cycle(&config, START).unwrap();
        let saved = std::fs::read(config.deployment_path()).unwrap();

        config.estate.notary = "0x0100000000000000000000000000000000000003".into();
        let err = run_check_cycle(&config, at(91)).unwrap_err();
        assert!(err.to_string().contains("notary"));

        // nothing evaluated or written
        assert_eq!(std::fs::read(config.deployment_path()).unwrap(), saved);
    }

    #[test]
    fn test_tampered_deployment_is_not_evaluated() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let path = config.deployment_path();
        run_check_cycle(&config, START).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        value["state"]["payout_completed"] = true.into();
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        assert!(run_check_cycle(&config, at(1)).is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
        assert_eq!(format_timestamp(u64::MAX), u64::MAX.to_string());
    }
}

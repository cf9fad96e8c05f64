//! Keeper configuration: a TOML file, then `ESTATE_*` environment overrides.

use anyhow::{Context, Result};
use estate_custody::checkin::{DEFAULT_CHECK_IN_PERIOD_DAYS, DEFAULT_GRACE_PERIOD_DAYS};
use estate_custody::{Address, Amount, CustodyConfig, DAY};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Upper bound on the simulated yield: 100% a year.
pub const MAX_ANNUAL_RATE_BPS: u32 = 10_000;

/// Shortest accepted gap between keeper cycles.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 60;

/// File name of the deployment inside the data directory.
const DEPLOYMENT_FILE: &str = "estate.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    /// Required: there is no sensible default owner or notary.
    pub estate: EstateSection,
    #[serde(default)]
    pub reserve: ReserveSection,
}

/// Where the deployment lives and how often the keeper wakes up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub data_dir: PathBuf,
    pub check_interval_secs: u64,
    /// A level name (`error` .. `trace`); `RUST_LOG` still takes precedence.
    pub log_level: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data"),
            check_interval_secs: 6 * 3600,
            log_level: "info".into(),
        }
    }
}

/// Identities and timing of the estate the keeper looks after. Used to
/// create the deployment, and checked against an existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstateSection {
    /// `0x`-prefixed or bare hex, 20 bytes.
    pub owner: String,
    pub notary: String,
    #[serde(default = "EstateSection::default_check_in_days")]
    pub check_in_period_days: u64,
    #[serde(default = "EstateSection::default_grace_days")]
    pub grace_period_days: u64,
    /// Tokens minted to the owner when a fresh deployment is created.
    #[serde(default)]
    pub owner_funds: Amount,
}

impl EstateSection {
    fn default_check_in_days() -> u64 {
        DEFAULT_CHECK_IN_PERIOD_DAYS
    }

    fn default_grace_days() -> u64 {
        DEFAULT_GRACE_PERIOD_DAYS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReserveSection {
    /// Simple annual yield, basis points.
    pub annual_rate_bps: u32,
}

impl Default for ReserveSection {
    fn default() -> Self {
        Self {
            annual_rate_bps: 400,
        }
    }
}

/// Overwrite `target` with the parsed value of `key`, if set and parseable.
fn env_override<T: FromStr>(key: &str, target: &mut T) {
    if let Some(value) = std::env::var(key).ok().and_then(|v| v.parse().ok()) {
        *target = value;
    }
}

fn days_to_secs(days: u64, field: &str) -> Result<u64> {
    days.checked_mul(DAY)
        .with_context(|| format!("estate.{} = {} days does not fit in seconds", field, days))
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Cannot parse {}", path.display()))
    }

    /// `ESTATE_DATA_DIR`, `ESTATE_CHECK_INTERVAL`, `ESTATE_LOG_LEVEL`,
    /// `ESTATE_OWNER`, `ESTATE_NOTARY`, `ESTATE_CHECK_IN_DAYS`,
    /// `ESTATE_GRACE_DAYS`, `ESTATE_RESERVE_RATE_BPS`. Values that do not
    /// parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        env_override("ESTATE_DATA_DIR", &mut self.server.data_dir);
        env_override("ESTATE_CHECK_INTERVAL", &mut self.server.check_interval_secs);
        env_override("ESTATE_LOG_LEVEL", &mut self.server.log_level);
        env_override("ESTATE_OWNER", &mut self.estate.owner);
        env_override("ESTATE_NOTARY", &mut self.estate.notary);
        env_override("ESTATE_CHECK_IN_DAYS", &mut self.estate.check_in_period_days);
        env_override("ESTATE_GRACE_DAYS", &mut self.estate.grace_period_days);
        env_override("ESTATE_RESERVE_RATE_BPS", &mut self.reserve.annual_rate_bps);
    }

    pub fn owner(&self) -> Result<Address> {
        self.estate
            .owner
            .parse()
            .with_context(|| format!("estate.owner is not an address: {}", self.estate.owner))
    }

    pub fn notary(&self) -> Result<Address> {
        self.estate
            .notary
            .parse()
            .with_context(|| format!("estate.notary is not an address: {}", self.estate.notary))
    }

    /// Periods in seconds. Fails if a day count overflows.
    pub fn custody_config(&self) -> Result<CustodyConfig> {
        Ok(CustodyConfig {
            check_in_period: days_to_secs(self.estate.check_in_period_days, "check_in_period_days")?,
            grace_period: days_to_secs(self.estate.grace_period_days, "grace_period_days")?,
        })
    }

    pub fn log_filter(&self) -> Result<LevelFilter> {
        self.server
            .log_level
            .parse()
            .ok()
            .with_context(|| format!("server.log_level is not a level: {}", self.server.log_level))
    }

    pub fn deployment_path(&self) -> PathBuf {
        self.server.data_dir.join(DEPLOYMENT_FILE)
    }

    pub fn validate(&self) -> Result<()> {
        let owner = self.owner()?;
        let notary = self.notary()?;
        anyhow::ensure!(!owner.is_zero(), "estate.owner is the zero address");
        anyhow::ensure!(!notary.is_zero(), "estate.notary is the zero address");
        anyhow::ensure!(
            owner != notary,
            "estate.owner and estate.notary are both {}",
            owner
        );

        self.custody_config()?
            .validate()
            .context("estate timing is unusable")?;

        anyhow::ensure!(
            self.reserve.annual_rate_bps <= MAX_ANNUAL_RATE_BPS,
            "reserve.annual_rate_bps is {}, above {}",
            self.reserve.annual_rate_bps,
            MAX_ANNUAL_RATE_BPS
        );
        anyhow::ensure!(
            self.server.check_interval_secs >= MIN_CHECK_INTERVAL_SECS,
            "server.check_interval_secs is {}, below {}",
            self.server.check_interval_secs,
            MIN_CHECK_INTERVAL_SECS
        );
        self.log_filter()?;
        Ok(())
    }
}

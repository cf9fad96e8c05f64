//! estate-server keeps one sandbox estate moving on a timer.
//!
//! It reads a TOML config, applies `ESTATE_*` overrides, and then does one
//! of three things: prints the checked configuration, runs a single keeper
//! cycle (for cron), or loops until interrupted.

mod config;
mod daemon;

use anyhow::{bail, Context, Result};
use config::ServerConfig;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "/config/estate-server.toml";

const USAGE: &str = "\
estate-server: evaluates a sandbox estate on a schedule

usage: estate-server [-c PATH] [--once | --validate]

  -c, --config PATH   config file (default /config/estate-server.toml)
      --once          run one keeper cycle and exit (alias: --check)
      --validate      check the config, print it, and exit
  -h, --help          print this text
  -V, --version       print the version

Any of these environment variables replaces the matching config entry:
  ESTATE_DATA_DIR ESTATE_CHECK_INTERVAL ESTATE_LOG_LEVEL
  ESTATE_OWNER ESTATE_NOTARY ESTATE_CHECK_IN_DAYS ESTATE_GRACE_DAYS
  ESTATE_RESERVE_RATE_BPS
";

/// What to do once the config is loaded. When several flags are given the
/// highest one wins, so `--validate` never touches the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Mode {
    Daemon,
    Once,
    Validate,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run { config: PathBuf, mode: Mode },
    Help,
    Version,
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut mode = Mode::Daemon;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => match args.next() {
                Some(path) => config = PathBuf::from(path),
                None => bail!("{} needs a path", arg),
            },
            "--once" | "--check" => mode = mode.max(Mode::Once),
            "--validate" => mode = mode.max(Mode::Validate),
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            other => bail!("unrecognised argument {:?}, see --help", other),
        }
    }
    Ok(Command::Run { config, mode })
}

fn load_config(path: &Path) -> Result<ServerConfig> {
    let mut config = ServerConfig::from_file(path)?;
    config.apply_env_overrides();
    config
        .validate()
        .with_context(|| format!("{} is not a usable configuration", path.display()))?;
    Ok(config)
}

fn print_summary(config: &ServerConfig) -> Result<()> {
    let timing = config.custody_config()?;
    println!("configuration ok");
    println!("owner        {}", config.owner()?);
    println!("notary       {}", config.notary()?);
    println!(
        "warning      after {} days of silence",
        config.estate.check_in_period_days
    );
    println!(
        "verification after {} days of silence",
        timing.verification_threshold() / estate_custody::DAY
    );
    println!("reserve      {} bps a year", config.reserve.annual_rate_bps);
    println!("cycle        every {} s", config.server.check_interval_secs);
    println!("deployment   {}", config.deployment_path().display());
    Ok(())
}

fn run_until_interrupted(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Cannot start the async runtime")?;

    runtime.block_on(async {
        tokio::select! {
            result = daemon::run(config) => result,
            signal = tokio::signal::ctrl_c() => {
                signal.context("Cannot listen for Ctrl-C")?;
                log::info!("Interrupted, keeper stopping");
                Ok(())
            }
        }
    })
}

fn main() -> Result<()> {
    let (path, mode) = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            print!("{}", USAGE);
            return Ok(());
        }
        Command::Version => {
            println!("estate-server {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Run { config, mode } => (config, mode),
    };

    let config = load_config(&path)?;
    env_logger::Builder::new()
        .filter_level(config.log_filter()?)
        .parse_default_env()
        .init();

    match mode {
        Mode::Validate => print_summary(&config),
        Mode::Once => {
            let outcome = daemon::run_check_cycle(&config, daemon::unix_now()?)?;
            log::info!("Single cycle finished: {:?}", outcome);
            Ok(())
        }
        Mode::Daemon => run_until_interrupted(config),
    }
}

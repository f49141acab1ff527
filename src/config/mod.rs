use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use runtime_core::domain_service::{OptionSelectorConfig, PositionSizingConfig};
use runtime_core::engine::BarInterval;
use runtime_core::value_objects::{GammaScalpConfig, HedgingConfig, OrderExecutionConfig, RiskThresholds};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub strategy: StrategyConfig,
    pub risk: RiskConfig,
    pub execution: OrderExecutionConfig,
    pub hedging: HedgingConfig,
    pub gamma_scalp: GammaScalpConfig,
    pub persistence: PersistenceConfig,
    pub database: DatabaseConfig,
    pub notifier: NotifierSettings,
    pub logging: LoggingConfig,
    pub supervisor: SupervisorConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Environment {
    Development,
    CI,
    Production,
}

/// Strategy group (§6): concurrent-position cap, virtual-OTM rank and the
/// bar-windowing settings consumed by `BarPipeline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub max_positions: usize,
    /// Kept for compatibility; not used by the fixed-1-lot sizer.
    pub position_ratio: f64,
    pub strike_level: usize,
    pub bar_window: u32,
    pub bar_interval: BarIntervalConfig,
    pub products: Vec<String>,
    pub contracts: Vec<ContractSeed>,
}

/// One tradable contract the paper/live gateway is seeded with at startup,
/// in the absence of a real gateway's own contract discovery (`get_all_contracts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSeed {
    pub vt_symbol: String,
    pub size: f64,
    pub pricetick: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarIntervalConfig {
    Minute,
    Hour,
    Daily,
}

impl From<BarIntervalConfig> for BarInterval {
    fn from(value: BarIntervalConfig) -> Self {
        match value {
            BarIntervalConfig::Minute => BarInterval::Minute,
            BarIntervalConfig::Hour => BarInterval::Hour,
            BarIntervalConfig::Daily => BarInterval::Daily,
        }
    }
}

/// Risk group (§6): position- and portfolio-level Greeks thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskConfig {
    pub position_limits: GreeksLimits,
    pub portfolio_limits: GreeksLimits,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GreeksLimits {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
}

impl From<RiskConfig> for RiskThresholds {
    fn from(value: RiskConfig) -> Self {
        RiskThresholds {
            position_delta_limit: value.position_limits.delta,
            position_gamma_limit: value.position_limits.gamma,
            position_vega_limit: value.position_limits.vega,
            portfolio_delta_limit: value.portfolio_limits.delta,
            portfolio_gamma_limit: value.portfolio_limits.gamma,
            portfolio_vega_limit: value.portfolio_limits.vega,
        }
    }
}

/// Snapshot file location and the autosave cadence (§4.F, §6 "Persistence layout").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub snapshot_path: PathBuf,
    pub autosave_interval_secs: u64,
}

/// Historical bar store location (`runtime_data::Database`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub warm_up_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierSettings {
    pub webhook_url: String,
    pub min_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}

/// Exit codes and signals (§6): the parent supervisor's restart policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub max_restarts: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
    pub reset_after_secs: u64,
    pub shutdown_grace_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self { max_restarts: 10, base_delay_secs: 5, max_delay_secs: 300, reset_after_secs: 3600, shutdown_grace_secs: 15 }
    }
}

impl SupervisorConfig {
    /// Exponential backoff `d_n = min(max_delay, base * 2^(n-1))` (§6).
    pub fn restart_delay(&self, restart_count: u32) -> Duration {
        if restart_count == 0 {
            return Duration::ZERO;
        }
        let scaled = self.base_delay_secs.saturating_mul(1u64 << (restart_count - 1).min(32));
        Duration::from_secs(scaled.min(self.max_delay_secs))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_file = match env::var("STRANGLE_ENV").as_deref() {
            Ok("production") => ".env.production",
            Ok("ci") => ".env.ci",
            _ => ".env.development",
        };
        dotenv::from_filename(env_file).ok();

        let config = Config {
            environment: Self::parse_environment()?,
            strategy: Self::parse_strategy_config()?,
            risk: Self::parse_risk_config()?,
            execution: Self::parse_execution_config()?,
            hedging: Self::parse_hedging_config()?,
            gamma_scalp: Self::parse_gamma_scalp_config()?,
            persistence: Self::parse_persistence_config()?,
            database: Self::parse_database_config()?,
            notifier: Self::parse_notifier_config()?,
            logging: Self::parse_logging_config()?,
            supervisor: Self::parse_supervisor_config()?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        match env::var("STRANGLE_ENV").as_deref() {
            Ok("production") => Ok(Environment::Production),
            Ok("ci") => Ok(Environment::CI),
            _ => Ok(Environment::Development),
        }
    }

    fn parse_strategy_config() -> Result<StrategyConfig> {
        let bar_interval = match env::var("STRATEGY_BAR_INTERVAL").as_deref() {
            Ok("HOUR") => BarIntervalConfig::Hour,
            Ok("DAILY") => BarIntervalConfig::Daily,
            _ => BarIntervalConfig::Minute,
        };
        let products = env::var("STRATEGY_PRODUCTS")
            .unwrap_or_else(|_| "rb,IO".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let contracts = parse_contract_seeds(&env::var("STRATEGY_CONTRACTS").unwrap_or_default())?;

        Ok(StrategyConfig {
            max_positions: env::var("STRATEGY_MAX_POSITIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid STRATEGY_MAX_POSITIONS")?,
            position_ratio: env::var("STRATEGY_POSITION_RATIO")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .context("Invalid STRATEGY_POSITION_RATIO")?,
            strike_level: env::var("STRATEGY_STRIKE_LEVEL")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("Invalid STRATEGY_STRIKE_LEVEL")?,
            bar_window: env::var("STRATEGY_BAR_WINDOW")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("Invalid STRATEGY_BAR_WINDOW")?,
            bar_interval,
            products,
            contracts,
        })
    }

    fn parse_risk_config() -> Result<RiskConfig> {
        let defaults = RiskThresholds::default();
        Ok(RiskConfig {
            position_limits: GreeksLimits {
                delta: env_f64("RISK_POSITION_DELTA_LIMIT", defaults.position_delta_limit)?,
                gamma: env_f64("RISK_POSITION_GAMMA_LIMIT", defaults.position_gamma_limit)?,
                vega: env_f64("RISK_POSITION_VEGA_LIMIT", defaults.position_vega_limit)?,
            },
            portfolio_limits: GreeksLimits {
                delta: env_f64("RISK_PORTFOLIO_DELTA_LIMIT", defaults.portfolio_delta_limit)?,
                gamma: env_f64("RISK_PORTFOLIO_GAMMA_LIMIT", defaults.portfolio_gamma_limit)?,
                vega: env_f64("RISK_PORTFOLIO_VEGA_LIMIT", defaults.portfolio_vega_limit)?,
            },
        })
    }

    fn parse_execution_config() -> Result<OrderExecutionConfig> {
        let defaults = OrderExecutionConfig::default();
        Ok(OrderExecutionConfig {
            timeout_seconds: env_i64("EXEC_TIMEOUT_SECONDS", defaults.timeout_seconds)?,
            max_retries: env::var("EXEC_MAX_RETRIES")
                .unwrap_or_else(|_| defaults.max_retries.to_string())
                .parse()
                .context("Invalid EXEC_MAX_RETRIES")?,
            slippage_ticks: env_i64("EXEC_SLIPPAGE_TICKS", defaults.slippage_ticks)?,
            price_tick: env_f64("EXEC_PRICE_TICK", defaults.price_tick)?,
        })
    }

    fn parse_hedging_config() -> Result<HedgingConfig> {
        let defaults = HedgingConfig::default();
        Ok(HedgingConfig {
            target_delta: env_f64("HEDGING_TARGET_DELTA", defaults.target_delta)?,
            hedging_band: env_f64("HEDGING_BAND", defaults.hedging_band)?,
            hedge_instrument_vt_symbol: env::var("HEDGING_INSTRUMENT_VT_SYMBOL").unwrap_or_default(),
            hedge_instrument_delta: env_f64("HEDGING_INSTRUMENT_DELTA", defaults.hedge_instrument_delta)?,
            hedge_instrument_multiplier: env_f64("HEDGING_INSTRUMENT_MULTIPLIER", defaults.hedge_instrument_multiplier)?,
        })
    }

    fn parse_gamma_scalp_config() -> Result<GammaScalpConfig> {
        let defaults = GammaScalpConfig::default();
        Ok(GammaScalpConfig {
            rebalance_threshold: env_f64("SCALP_REBALANCE_THRESHOLD", defaults.rebalance_threshold)?,
            hedge_instrument_vt_symbol: env::var("SCALP_INSTRUMENT_VT_SYMBOL").unwrap_or_default(),
            hedge_instrument_delta: env_f64("SCALP_INSTRUMENT_DELTA", defaults.hedge_instrument_delta)?,
            hedge_instrument_multiplier: env_f64("SCALP_INSTRUMENT_MULTIPLIER", defaults.hedge_instrument_multiplier)?,
        })
    }

    fn parse_persistence_config() -> Result<PersistenceConfig> {
        Ok(PersistenceConfig {
            snapshot_path: PathBuf::from(
                env::var("PERSISTENCE_SNAPSHOT_PATH").unwrap_or_else(|_| "data/state/strategy.state.json".to_string()),
            ),
            autosave_interval_secs: env::var("PERSISTENCE_AUTOSAVE_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("Invalid PERSISTENCE_AUTOSAVE_INTERVAL_SECS")?,
        })
    }

    fn parse_database_config() -> Result<DatabaseConfig> {
        Ok(DatabaseConfig {
            path: PathBuf::from(env::var("DATABASE_PATH").unwrap_or_else(|_| "data/history.sqlite".to_string())),
            warm_up_days: env::var("DATABASE_WARM_UP_DAYS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_WARM_UP_DAYS")?,
        })
    }

    fn parse_notifier_config() -> Result<NotifierSettings> {
        Ok(NotifierSettings {
            webhook_url: env::var("NOTIFIER_WEBHOOK_URL").unwrap_or_default(),
            min_interval_secs: env::var("NOTIFIER_MIN_INTERVAL_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid NOTIFIER_MIN_INTERVAL_SECS")?,
        })
    }

    fn parse_logging_config() -> Result<LoggingConfig> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            dir: PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "data/logs".to_string())),
        })
    }

    fn parse_supervisor_config() -> Result<SupervisorConfig> {
        let defaults = SupervisorConfig::default();
        Ok(SupervisorConfig {
            max_restarts: env::var("SUPERVISOR_MAX_RESTARTS")
                .unwrap_or_else(|_| defaults.max_restarts.to_string())
                .parse()
                .context("Invalid SUPERVISOR_MAX_RESTARTS")?,
            base_delay_secs: env::var("SUPERVISOR_BASE_DELAY_SECS")
                .unwrap_or_else(|_| defaults.base_delay_secs.to_string())
                .parse()
                .context("Invalid SUPERVISOR_BASE_DELAY_SECS")?,
            max_delay_secs: env::var("SUPERVISOR_MAX_DELAY_SECS")
                .unwrap_or_else(|_| defaults.max_delay_secs.to_string())
                .parse()
                .context("Invalid SUPERVISOR_MAX_DELAY_SECS")?,
            reset_after_secs: env::var("SUPERVISOR_RESET_AFTER_SECS")
                .unwrap_or_else(|_| defaults.reset_after_secs.to_string())
                .parse()
                .context("Invalid SUPERVISOR_RESET_AFTER_SECS")?,
            shutdown_grace_secs: env::var("SUPERVISOR_SHUTDOWN_GRACE_SECS")
                .unwrap_or_else(|_| defaults.shutdown_grace_secs.to_string())
                .parse()
                .context("Invalid SUPERVISOR_SHUTDOWN_GRACE_SECS")?,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.strategy.max_positions == 0 {
            anyhow::bail!("strategy.max_positions must be > 0");
        }
        if self.strategy.bar_window == 0 {
            anyhow::bail!("strategy.bar_window must be > 0");
        }
        if self.execution.timeout_seconds <= 0 {
            anyhow::bail!("execution.timeout_seconds must be > 0");
        }
        if self.supervisor.shutdown_grace_secs < 15 {
            anyhow::bail!("supervisor.shutdown_grace_secs must be >= 15");
        }
        Ok(())
    }

    pub fn option_selector_config(&self) -> OptionSelectorConfig {
        OptionSelectorConfig { strike_level: self.strategy.strike_level, ..OptionSelectorConfig::default() }
    }

    pub fn position_sizing_config(&self) -> PositionSizingConfig {
        PositionSizingConfig { max_positions: self.strategy.max_positions, ..PositionSizingConfig::default() }
    }
}

/// Parses `"vt_symbol:size:pricetick,..."` into contract seeds. Blank input
/// yields an empty list rather than an error, since no-contracts is a valid
/// (if idle) startup state.
fn parse_contract_seeds(raw: &str) -> Result<Vec<ContractSeed>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let vt_symbol = parts.next().unwrap_or_default().to_string();
            let size: f64 = parts
                .next()
                .context("contract seed missing size")?
                .parse()
                .with_context(|| format!("invalid size in contract seed {entry}"))?;
            let pricetick: f64 = parts
                .next()
                .context("contract seed missing pricetick")?
                .parse()
                .with_context(|| format!("invalid pricetick in contract seed {entry}"))?;
            Ok(ContractSeed { vt_symbol, size, pricetick })
        })
        .collect()
}

fn env_f64(key: &str, default: f64) -> Result<f64> {
    env::var(key).unwrap_or_else(|_| default.to_string()).parse().with_context(|| format!("Invalid {key}"))
}

fn env_i64(key: &str, default: i64) -> Result<i64> {
    env::var(key).unwrap_or_else(|_| default.to_string()).parse().with_context(|| format!("Invalid {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_with_defaults_when_no_env_vars_are_set() {
        let config = Config::load();
        assert!(config.is_ok());
    }

    #[test]
    fn restart_delay_follows_exponential_backoff() {
        let supervisor = SupervisorConfig::default();
        assert_eq!(supervisor.restart_delay(0), Duration::ZERO);
        assert_eq!(supervisor.restart_delay(1), Duration::from_secs(5));
        assert_eq!(supervisor.restart_delay(2), Duration::from_secs(10));
        assert_eq!(supervisor.restart_delay(3), Duration::from_secs(20));
    }

    #[test]
    fn restart_delay_is_capped_at_max_delay() {
        let supervisor = SupervisorConfig::default();
        assert_eq!(supervisor.restart_delay(10), Duration::from_secs(300));
    }

    #[test]
    fn parses_contract_seeds_from_a_comma_separated_list() {
        let seeds = parse_contract_seeds("rb2601.SHFE:10:1.0, IO2501.CFFEX:100:0.2").unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].vt_symbol, "rb2601.SHFE");
        assert_eq!(seeds[1].pricetick, 0.2);
    }

    #[test]
    fn blank_contract_seed_string_yields_an_empty_list() {
        assert!(parse_contract_seeds("").unwrap().is_empty());
    }

    #[test]
    fn rejects_a_shutdown_grace_below_the_minimum() {
        let mut config = Config::load().unwrap();
        config.supervisor.shutdown_grace_secs = 5;
        assert!(config.validate().is_err());
    }
}

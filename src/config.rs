use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::indicator::IndicatorConfig;
use crate::lifecycle::ExitRules;
use crate::model::tick::PriceSource;
use crate::strategy::{ConfirmationRules, EngineConfig};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub kalshi: KalshiConfig,
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub exit: ExitRules,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KalshiConfig {
    pub rest_base_url: String,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(skip)]
    pub email: String,
    #[serde(skip)]
    pub password: String,
}

fn default_page_limit() -> u32 {
    200
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub poll_interval: String,
    pub market_refresh_interval: String,
    pub volume_threshold: u64,
    #[serde(default)]
    pub price_source: PriceSource,
    #[serde(default)]
    pub record_key: PriceSource,
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_backoff_initial_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    pub auto_trading_enabled: bool,
    pub max_contracts: u32,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            auto_trading_enabled: false,
            max_contracts: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineSection {
    #[serde(flatten)]
    pub indicators: IndicatorConfig,
    #[serde(flatten)]
    pub confirmation: ConfirmationRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub telegram_base_url: String,
    pub telegram_chat_id: String,
    pub queue_capacity: usize,
    #[serde(skip)]
    pub telegram_token: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            telegram_base_url: "https://api.telegram.org".to_string(),
            telegram_chat_id: String::new(),
            queue_capacity: 64,
            telegram_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub tick_log_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tick_log_path: "data/tick_log.sqlite".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Parse a duration string such as "500ms", "60s", "5m" or "1h".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let split_at = s
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("invalid duration '{}': missing unit (ms/s/m/h)", s))?;
    let (num_str, unit) = s.split_at(split_at);
    if num_str.is_empty() {
        bail!("invalid duration '{}': expected format like '60s'", s);
    }
    let n: u64 = num_str
        .parse()
        .with_context(|| format!("invalid duration '{}': quantity must be a positive integer", s))?;
    if n == 0 {
        bail!("invalid duration '{}': quantity must be > 0", s);
    }

    let unit_ms: u64 = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        _ => bail!(
            "invalid duration '{}': unsupported unit '{}', expected one of ms/s/m/h",
            s,
            unit
        ),
    };

    let ms = n
        .checked_mul(unit_ms)
        .with_context(|| format!("invalid duration '{}': value is too large", s))?;
    Ok(Duration::from_millis(ms))
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration(&self.poll_interval)
    }

    pub fn market_refresh_interval(&self) -> Result<Duration> {
        parse_duration(&self.market_refresh_interval)
    }

    pub fn backoff_initial(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms.max(1))
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms.max(self.backoff_initial_ms).max(1))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config = Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        config.kalshi.email = std::env::var("KALSHI_EMAIL")
            .context("KALSHI_EMAIL not set in .env or environment")?;
        config.kalshi.password = std::env::var("KALSHI_PASSWORD")
            .context("KALSHI_PASSWORD not set in .env or environment")?;
        config.notify.telegram_token = std::env::var("TELEGRAM_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(config)
    }

    /// Parse and validate without touching the environment.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("invalid config toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("kalshi.rest_base_url", &self.kalshi.rest_base_url),
            ("notify.telegram_base_url", &self.notify.telegram_base_url),
        ] {
            let parsed = url::Url::parse(value)
                .with_context(|| format!("{} is not a valid URL: '{}'", key, value))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("{} must use http or https, got '{}'", key, value);
            }
        }
        self.monitor
            .poll_interval()
            .context("monitor.poll_interval is invalid")?;
        self.monitor
            .market_refresh_interval()
            .context("monitor.market_refresh_interval is invalid")?;
        if self.monitor.fetch_attempts == 0 {
            bail!("monitor.fetch_attempts must be > 0");
        }

        let ind = &self.engine.indicators;
        if ind.sma_period == 0
            || ind.rsi_period == 0
            || ind.bollinger_period == 0
            || ind.history_len == 0
        {
            bail!("engine periods and history_len must be > 0");
        }
        if ind.smoothing_window < 5 {
            bail!(
                "engine.smoothing_window must be >= 5 for pattern detection, got {}",
                ind.smoothing_window
            );
        }
        if ind.bollinger_k.is_nan() || ind.bollinger_k <= 0.0 {
            bail!("engine.bollinger_k must be > 0");
        }

        let (lower, upper) = self.engine.confirmation.gate.confidences();
        let in_range = |c: f64| c > 0.0 && c < 1.0;
        if !in_range(lower) || !in_range(upper) {
            bail!("engine.gate confidences must be in (0, 1), got {lower} / {upper}");
        }

        if let Some([low, high]) = self.exit.rsi_neutral_band {
            if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low > high {
                bail!("exit.rsi_neutral_band must satisfy 0 <= low <= high <= 100");
            }
        }
        if self.trading.max_contracts == 0 {
            bail!("trading.max_contracts must be > 0");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            indicators: self.engine.indicators.clone(),
            confirmation: self.engine.confirmation,
            exit: self.exit,
            record_key: self.monitor.record_key,
        }
    }
}

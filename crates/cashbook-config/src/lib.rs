//! Configuration management for cashbook
//!
//! This module handles loading, validation, and management of
//! cashbook configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; `*` allows any
    #[serde(default = "default_cors_allow")]
    pub cors_allow: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allow: default_cors_allow(),
        }
    }
}

fn default_cors_allow() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Telegram bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; empty means "not configured"
    #[serde(default)]
    pub bot_token: String,
    /// Bot API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Parse mode used for outbound messages
    #[serde(default = "default_parse_mode")]
    pub parse_mode: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_api_base(),
            parse_mode: default_parse_mode(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_parse_mode() -> String {
    "HTML".to_string()
}

/// Settings for the per-user lendings ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingsConfig {
    /// Name of the ledger lending messages are recorded in
    #[serde(default = "default_ledger_name")]
    pub ledger_name: String,
    /// Categories the ledger is created with
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Payment modes the ledger is created with
    #[serde(default = "default_payment_modes")]
    pub payment_modes: Vec<String>,
    /// Payment mode for chat entries (the message grammar has none)
    #[serde(default = "default_payment_mode")]
    pub default_payment_mode: String,
    /// Group name for transactions without a person
    #[serde(default = "default_unknown_person")]
    pub unknown_person: String,
}

impl Default for LendingsConfig {
    fn default() -> Self {
        Self {
            ledger_name: default_ledger_name(),
            categories: default_categories(),
            payment_modes: default_payment_modes(),
            default_payment_mode: default_payment_mode(),
            unknown_person: default_unknown_person(),
        }
    }
}

fn default_ledger_name() -> String {
    "LENDINGS".to_string()
}

fn default_categories() -> Vec<String> {
    vec!["Lending".to_string(), "Repayment".to_string(), "Borrowing".to_string()]
}

fn default_payment_modes() -> Vec<String> {
    vec!["Cash".to_string(), "UPI".to_string(), "Bank Transfer".to_string()]
}

fn default_payment_mode() -> String {
    "Cash".to_string()
}

fn default_unknown_person() -> String {
    "Unknown".to_string()
}

/// Chat account linking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkingConfig {
    /// Lifetime of a link code in seconds
    #[serde(default = "default_code_ttl")]
    pub code_ttl_secs: u64,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl(),
        }
    }
}

fn default_code_ttl() -> u64 {
    600
}

/// Digit grouping style for displayed amounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitGrouping {
    /// 1,00,000
    Indian,
    /// 100,000
    Western,
}

impl Default for DigitGrouping {
    fn default() -> Self {
        DigitGrouping::Indian
    }
}

impl std::str::FromStr for DigitGrouping {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indian" => Ok(DigitGrouping::Indian),
            "western" => Ok(DigitGrouping::Western),
            _ => Err(format!("Invalid digit grouping: {}", s)),
        }
    }
}

impl std::fmt::Display for DigitGrouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigitGrouping::Indian => write!(f, "indian"),
            DigitGrouping::Western => write!(f, "western"),
        }
    }
}

/// Currency display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Symbol prefixed to amounts in replies
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Thousands grouping style
    #[serde(default)]
    pub grouping: DigitGrouping,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            grouping: DigitGrouping::Indian,
        }
    }
}

fn default_symbol() -> String {
    "₹".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Telegram bot settings
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Lendings ledger settings
    #[serde(default)]
    pub lendings: LendingsConfig,
    /// Account linking settings
    #[serde(default)]
    pub linking: LinkingConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        // An empty document means "all defaults"
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.lendings.ledger_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "lendings.ledger_name".to_string(),
            });
        }

        if !self
            .lendings
            .payment_modes
            .iter()
            .any(|m| m == &self.lendings.default_payment_mode)
        {
            return Err(ConfigError::InvalidValue {
                field: "lendings.default_payment_mode".to_string(),
                reason: format!(
                    "'{}' must be one of lendings.payment_modes",
                    self.lendings.default_payment_mode
                ),
            });
        }

        if self.lendings.unknown_person.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "lendings.unknown_person".to_string(),
            });
        }

        if self.linking.code_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "linking.code_ttl_secs".to_string(),
                reason: "Link codes must live at least one second".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "logging.level must be one of {}",
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Bot token, `None` when not configured
    pub fn bot_token(&self) -> Option<&str> {
        let token = self.telegram.bot_token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

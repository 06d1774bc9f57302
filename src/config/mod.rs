//! Environment-backed configuration.
//!
//! Every setting but the research question has a default. Override with `LITSCREEN_*` environment
//! variables; the oracle key is read from `ANTHROPIC_API_KEY`.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_FLUSH_EVERY, DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE,
    DEFAULT_WORKERS,
};
use crate::dedup::DedupConfig;
use crate::oracle::{DEFAULT_ORACLE_MODEL, DEFAULT_ORACLE_URL, OracleConfig};
use crate::screening::{ProjectType, ScreeningPolicy};

/// Question used by stub-oracle dry runs when none is configured.
pub const DRY_RUN_RESEARCH_QUESTION: &str = "Dry run with the stub oracle";

/// Run configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults, then
/// [`Config::validate`] before starting a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Thresholds for zone routing. Default: strict (40 / 20).
    pub policy: ScreeningPolicy,

    /// Title similarity at or above which records are duplicates. Default: `0.85`.
    pub duplicate_threshold: f64,

    /// Question the oracle scores relevance against. Required for live runs.
    pub research_question: Option<String>,

    /// Concurrent oracle calls. Default: `8`.
    pub workers: usize,

    /// Retry, pacing and memoization settings.
    pub oracle: OracleConfig,

    /// Oracle credential. Only needed for live runs.
    pub api_key: Option<String>,

    pub oracle_url: String,
    pub oracle_model: String,

    /// Use the deterministic stub oracle (dry runs). Default: `false`.
    pub mock_oracle: bool,

    /// Progress-log appends between flushes. Default: `50`.
    pub flush_every: usize,

    /// Validation sample size and seed. Defaults: `50`, `42`.
    pub sample_size: usize,
    pub sample_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: ScreeningPolicy::strict(),
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            research_question: None,
            workers: DEFAULT_WORKERS,
            oracle: OracleConfig::default(),
            api_key: None,
            oracle_url: DEFAULT_ORACLE_URL.to_string(),
            oracle_model: DEFAULT_ORACLE_MODEL.to_string(),
            mock_oracle: false,
            flush_every: DEFAULT_FLUSH_EVERY,
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl Config {
    const ENV_PROJECT_TYPE: &'static str = "LITSCREEN_PROJECT_TYPE";
    const ENV_INCLUDE_THRESHOLD: &'static str = "LITSCREEN_INCLUDE_THRESHOLD";
    const ENV_EXCLUDE_THRESHOLD: &'static str = "LITSCREEN_EXCLUDE_THRESHOLD";
    const ENV_DUPLICATE_THRESHOLD: &'static str = "LITSCREEN_DUPLICATE_THRESHOLD";
    const ENV_RESEARCH_QUESTION: &'static str = "LITSCREEN_RESEARCH_QUESTION";
    const ENV_WORKERS: &'static str = "LITSCREEN_WORKERS";
    const ENV_MAX_ATTEMPTS: &'static str = "LITSCREEN_MAX_ATTEMPTS";
    const ENV_BACKOFF_BASE_MS: &'static str = "LITSCREEN_BACKOFF_BASE_MS";
    const ENV_REQUESTS_PER_MINUTE: &'static str = "LITSCREEN_REQUESTS_PER_MINUTE";
    const ENV_CALL_TIMEOUT_SECS: &'static str = "LITSCREEN_CALL_TIMEOUT_SECS";
    const ENV_API_KEY: &'static str = "ANTHROPIC_API_KEY";
    const ENV_ORACLE_URL: &'static str = "LITSCREEN_ORACLE_URL";
    const ENV_ORACLE_MODEL: &'static str = "LITSCREEN_ORACLE_MODEL";
    const ENV_MOCK_ORACLE: &'static str = "LITSCREEN_MOCK_ORACLE";
    const ENV_FLUSH_EVERY: &'static str = "LITSCREEN_FLUSH_EVERY";
    const ENV_SAMPLE_SIZE: &'static str = "LITSCREEN_SAMPLE_SIZE";
    const ENV_SAMPLE_SEED: &'static str = "LITSCREEN_SAMPLE_SEED";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let policy = Self::parse_policy_from_env()?;
        let duplicate_threshold =
            Self::parse_from_env(Self::ENV_DUPLICATE_THRESHOLD, defaults.duplicate_threshold)?;
        let research_question = Self::parse_optional_string_from_env(Self::ENV_RESEARCH_QUESTION);
        let workers = Self::parse_from_env(Self::ENV_WORKERS, defaults.workers)?;

        let oracle = OracleConfig {
            max_attempts: Self::parse_from_env(Self::ENV_MAX_ATTEMPTS, defaults.oracle.max_attempts)?,
            backoff_base: Duration::from_millis(Self::parse_from_env(
                Self::ENV_BACKOFF_BASE_MS,
                defaults.oracle.backoff_base.as_millis() as u64,
            )?),
            requests_per_minute: Self::parse_from_env(
                Self::ENV_REQUESTS_PER_MINUTE,
                defaults.oracle.requests_per_minute,
            )?,
            call_timeout: Duration::from_secs(Self::parse_from_env(
                Self::ENV_CALL_TIMEOUT_SECS,
                defaults.oracle.call_timeout.as_secs(),
            )?),
            ..defaults.oracle
        };

        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY);
        let oracle_url = Self::parse_string_from_env(Self::ENV_ORACLE_URL, defaults.oracle_url);
        let oracle_model = Self::parse_string_from_env(Self::ENV_ORACLE_MODEL, defaults.oracle_model);
        let mock_oracle = Self::parse_bool_from_env(Self::ENV_MOCK_ORACLE, defaults.mock_oracle)?;
        let flush_every = Self::parse_from_env(Self::ENV_FLUSH_EVERY, defaults.flush_every)?;
        let sample_size = Self::parse_from_env(Self::ENV_SAMPLE_SIZE, defaults.sample_size)?;
        let sample_seed = Self::parse_from_env(Self::ENV_SAMPLE_SEED, defaults.sample_seed)?;

        Ok(Self {
            policy,
            duplicate_threshold,
            research_question,
            workers,
            oracle,
            api_key,
            oracle_url,
            oracle_model,
            mock_oracle,
            flush_every,
            sample_size,
            sample_seed,
        })
    }

    /// Checks thresholds and counts. Does not check the API key; see
    /// [`Config::require_api_key`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;

        if !(self.duplicate_threshold > 0.0 && self.duplicate_threshold <= 1.0) {
            return Err(ConfigError::InvalidDuplicateThreshold {
                value: self.duplicate_threshold,
            });
        }

        for (name, value) in [
            (Self::ENV_WORKERS, self.workers as u64),
            (Self::ENV_MAX_ATTEMPTS, u64::from(self.oracle.max_attempts)),
            (Self::ENV_REQUESTS_PER_MINUTE, u64::from(self.oracle.requests_per_minute)),
            (Self::ENV_FLUSH_EVERY, self.flush_every as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCount { name });
            }
        }

        Ok(())
    }

    /// The API key, required unless the stub oracle is selected.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_API_KEY,
            })
    }

    /// The research question. Stub-oracle runs fall back to
    /// [`DRY_RUN_RESEARCH_QUESTION`]; live runs must set one.
    pub fn require_research_question(&self) -> Result<&str, ConfigError> {
        match (self.research_question.as_deref(), self.mock_oracle) {
            (Some(question), _) => Ok(question),
            (None, true) => Ok(DRY_RUN_RESEARCH_QUESTION),
            (None, false) => Err(ConfigError::MissingEnvVar {
                name: Self::ENV_RESEARCH_QUESTION,
            }),
        }
    }

    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            duplicate_threshold: self.duplicate_threshold,
            ..DedupConfig::default()
        }
    }

    /// Preset from `LITSCREEN_PROJECT_TYPE`, with either threshold overridable.
    /// Any override makes the policy custom.
    fn parse_policy_from_env() -> Result<ScreeningPolicy, ConfigError> {
        let mut policy = match env::var(Self::ENV_PROJECT_TYPE) {
            Ok(value) => {
                let project_type = ProjectType::parse(&value)
                    .ok_or(ConfigError::UnknownProjectType { value })?;
                ScreeningPolicy::for_project(project_type)
            }
            Err(_) => ScreeningPolicy::strict(),
        };

        let include = Self::parse_optional_from_env::<i32>(Self::ENV_INCLUDE_THRESHOLD)?;
        let exclude = Self::parse_optional_from_env::<i32>(Self::ENV_EXCLUDE_THRESHOLD)?;
        if let Some(include) = include {
            policy.include_threshold = include;
        }
        if let Some(exclude) = exclude {
            policy.exclude_threshold = exclude;
        }
        if include.is_some() || exclude.is_some() {
            policy.project_type = ProjectType::Custom;
        }

        Ok(policy)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(Self::parse_optional_from_env(var_name)?.unwrap_or(default))
    }

    fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    reason: e.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected true or false".to_string(),
                }),
            },
            None => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }
}

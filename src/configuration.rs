//! Config for the scheduler behaviors
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional and case-insensitive.
//!
//! - `COURTS_POLICY` — `round-robin` or `fixed-case` (default: `round-robin`)
//! - `COURTS_SEED` — seed of the random source (default: drawn from the OS)
//! - `COURTS_LOG` — set to `"true"` to log to a file (default: `false`)
//! - `COURTS_MAX_PLAYERS` — largest accepted roster (default: no limit besides the policy's)

use anyhow::Context;
use tracing::warn;

use crate::scheduling_policy::PolicyKind;

/// Configuration for scheduler behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub(crate) policy: PolicyKind,
    pub(crate) seed: Option<u64>,
    pub(crate) log: bool,
    pub(crate) max_players: Option<usize>,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Rounds are built by the round-robin policy.
    /// - The random source is seeded from the OS.
    /// - Logging to file is disabled.
    /// - Roster size is only limited by the policy.
    pub fn new() -> Self {
        Self {
            policy: PolicyKind::RoundRobin,
            seed: None,
            log: false,
            max_players: None,
        }
    }

    /// Create configuration from environment variables, falling back to the default of any
    /// missing or malformed value (malformed values are logged).
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|err| {
            warn!("invalid scheduler configuration, using defaults: {err:#}");
            Self::new()
        })
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    /// Fails if a variable is set to a value that cannot be parsed.
    pub fn try_from_env() -> anyhow::Result<Self> {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        let mut config = Self::new();
        if let Some(policy) = var("COURTS_POLICY") {
            config.policy = policy
                .trim()
                .parse()
                .map_err(anyhow::Error::msg)
                .context("COURTS_POLICY")?;
        }
        if let Some(seed) = var("COURTS_SEED") {
            config.seed = Some(
                seed.trim()
                    .parse()
                    .with_context(|| format!("COURTS_SEED is not a number: '{seed}'"))?,
            );
        }
        if let Some(log) = var("COURTS_LOG") {
            config.log = log.trim().eq_ignore_ascii_case("true");
        }
        if let Some(max) = var("COURTS_MAX_PLAYERS") {
            config.max_players = Some(
                max.trim()
                    .parse()
                    .with_context(|| format!("COURTS_MAX_PLAYERS is not a number: '{max}'"))?,
            );
        }
        Ok(config)
    }

    /// Select the scheduling policy.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Fix the seed of the random source, making every round reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Reject rosters larger than `max`.
    pub fn with_max_players(mut self, max: usize) -> Self {
        self.max_players = Some(max);
        self
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

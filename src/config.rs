#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::Result;

use crate::util::install_dir_from_env;

/// Runtime configuration shared across the crate.
pub struct ConfigState {
    /// Absolute path to the pipeline installation directory.
    install_dir:    PathBuf,
    /// Required Java major version.
    required_java:  u32,
    /// Preferred Java distribution, matched against the version banner.
    preferred_dist: String,
    /// Deadline applied to each metric subprocess.
    metric_timeout: Duration,
    /// Deadline applied to git and toolchain probe subprocesses.
    git_timeout:    Duration,
}

impl ConfigState {
    /// Construct a new configuration instance from the environment.
    fn new() -> Result<Self> {
        let install_dir = install_dir_from_env()?;

        let required_java = std::env::var("D2G_JAVA_VERSION")
            .ok()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(17);
        let preferred_dist = std::env::var("D2G_JAVA_DISTRIBUTION")
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_else(|_| "temurin".to_string());

        Ok(Self {
            install_dir,
            required_java,
            preferred_dist,
            metric_timeout: read_timeout_secs("D2G_METRIC_TIMEOUT_SECS", 300),
            git_timeout: read_timeout_secs("D2G_GIT_TIMEOUT_SECS", 60),
        })
    }

    /// Returns the absolute installation directory.
    pub fn install_dir(&self) -> &PathBuf {
        &self.install_dir
    }

    /// Returns the required Java major version.
    pub fn required_java(&self) -> u32 {
        self.required_java
    }

    /// Returns the preferred Java distribution identifier.
    pub fn preferred_dist(&self) -> &str {
        &self.preferred_dist
    }

    /// Returns the configured metric timeout duration.
    pub fn metric_timeout(&self) -> Duration {
        self.metric_timeout
    }

    /// Returns the configured git timeout duration.
    pub fn git_timeout(&self) -> Duration {
        self.git_timeout
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let slot = slot();
    let mut guard = slot.lock().expect("config slot poisoned");
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = ConfigState::new().map(Arc::new)?;
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Returns the active configuration, initializing it on demand.
pub fn get() -> ConfigHandle {
    ensure_initialized().expect("configuration initialization failed")
}

/// Returns the absolute pipeline installation directory.
pub fn install_dir() -> PathBuf {
    get().install_dir().clone()
}

/// Returns the required Java major version.
pub fn required_java() -> u32 {
    get().required_java()
}

/// Returns the preferred Java distribution identifier.
pub fn preferred_dist() -> String {
    get().preferred_dist().to_string()
}

/// Returns the configured metric timeout duration.
pub fn metric_timeout() -> Duration {
    get().metric_timeout()
}

/// Returns the configured git timeout duration.
pub fn git_timeout() -> Duration {
    get().git_timeout()
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

use std::fmt;
use std::time::Duration;

use crate::error::LifecycleError;
use crate::error::LifecycleResult;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_NAME_PREFIX: &str = "agent-";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("agentkit/", env!("CARGO_PKG_VERSION"));

/// Wrapper that keeps a credential out of logs and error messages.
///
/// Formatting through `Debug` or `Display` always yields `[REDACTED]`; the
/// value is only reachable through [`Secret::expose_secret`]. Deliberately
/// not `Clone`.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Prefix marking resources created through this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    prefix: String,
}

impl NamingPolicy {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the namespaced form of `name`. A name that already carries
    /// the prefix is returned unchanged.
    pub fn apply(&self, name: &str) -> LifecycleResult<String> {
        let trimmed = validate_name(name)?;
        if trimmed.starts_with(&self.prefix) {
            Ok(trimmed.to_string())
        } else {
            Ok(format!("{}{trimmed}", self.prefix))
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PREFIX)
    }
}

/// Trims `name` and rejects values that cannot be a single path segment.
pub(crate) fn validate_name(name: &str) -> LifecycleResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LifecycleError::invalid_name(name, "name must not be empty"));
    }
    if trimmed.contains('/') || trimmed.chars().any(char::is_whitespace) {
        return Err(LifecycleError::invalid_name(
            name,
            "name must not contain `/` or whitespace",
        ));
    }
    Ok(trimmed)
}

/// Settings for [`crate::ResourceLifecycleManager`].
///
/// Resolved once by the caller (typically from the process environment at
/// startup) and injected; nothing in this crate reads environment variables.
#[derive(Debug)]
pub struct LifecycleConfig {
    pub api_base: String,
    pub credential: Option<Secret<String>>,
    pub naming: NamingPolicy,
    pub timeout: Duration,
    pub user_agent: String,
}

impl LifecycleConfig {
    pub fn new(credential: Option<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            credential: credential
                .filter(|value| !value.trim().is_empty())
                .map(Secret::new),
            naming: NamingPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

use crate::services::dispatch::contains_loopback;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("API_BASE must use https:// outside local development: {0}")]
    InsecureApiBase(String),
    #[error("API_BASE must not point at a loopback host outside local development: {0}")]
    LoopbackApiBase(String),
    #[error("API_BASE is not configured")]
    MissingApiBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Development,
    Production,
}

impl AppMode {
    pub fn is_development(self) -> bool {
        self == AppMode::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppMode::Development => "development",
            AppMode::Production => "production",
        }
    }
}

/// Immutable snapshot of the process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub mode: AppMode,
    pub api_base: Option<String>,
    pub allowed_emails: Vec<String>,
    pub tenant_default: Option<String>,
    /// Host the console itself is served from; gates the local-dev bypass.
    pub origin: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        let mode = match std::env::var("STAYDESK_ENV").ok().as_deref() {
            Some("production") => AppMode::Production,
            _ => AppMode::Development,
        };
        Self {
            mode,
            api_base: read_nonempty("API_BASE"),
            allowed_emails: std::env::var("ALLOWED_EMAILS")
                .map(|raw| parse_allowed_emails(&raw))
                .unwrap_or_default(),
            tenant_default: read_nonempty("TENANT_SLUG"),
            origin: read_nonempty("STAYDESK_ORIGIN"),
        }
    }

    /// Resolve the API base URL, failing closed on insecure production
    /// configuration. Trailing slashes are stripped so path joining stays
    /// predictable.
    pub fn resolve_api_base(&self) -> Result<String, ConfigError> {
        let base = self
            .api_base
            .as_deref()
            .ok_or(ConfigError::MissingApiBase)?
            .trim()
            .trim_end_matches('/')
            .to_string();
        if insecure_api_base(self.mode, &base) {
            return Err(ConfigError::InsecureApiBase(base));
        }
        if !self.mode.is_development() && contains_loopback(&base) {
            return Err(ConfigError::LoopbackApiBase(base));
        }
        Ok(base)
    }

    /// Warn about absent required keys without failing, so local development
    /// is never blocked by an incomplete environment.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_base.is_none() {
            missing.push("API_BASE");
        }
        if self.tenant_default.is_none() {
            missing.push("TENANT_SLUG");
        }
        for key in missing.iter().copied() {
            tracing::warn!(key, "required environment key is not set");
        }
        missing
    }
}

/// Guard predicate: outside development the API base must be https. The
/// build script applies the same check before a binary is produced.
pub fn insecure_api_base(mode: AppMode, base: &str) -> bool {
    !mode.is_development() && !base.trim().starts_with("https://")
}

/// Accepts either a JSON-array-encoded string or a comma-separated list.
/// Both encodings of the same logical sequence parse identically.
pub fn parse_allowed_emails(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }
    }
    trimmed
        .split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

fn read_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

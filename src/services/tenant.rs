use crate::services::env::EnvConfig;
use crate::services::identity::AuthState;

/// Single-value store for the active tenant slug.
///
/// Owned by the process entry point and injected into the dispatch path, so
/// tests construct their own instance instead of sharing process state.
/// Value is either `None` or a non-empty trimmed string; never sourced from
/// URLs or free-form request input.
#[derive(Debug, Default)]
pub struct TenantContext {
    slug: Option<String>,
}

impl TenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    /// Trims the input; whitespace-only values store as `None`. Total and
    /// idempotent.
    pub fn set_slug(&mut self, value: Option<&str>) {
        self.slug = value
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    /// Assigns the configured default only when nothing has been set yet.
    /// An explicit or profile-sourced value is never silently overwritten.
    pub fn init_from_env(&mut self, env: &EnvConfig) {
        if self.slug.is_none() {
            if let Some(default) = env.tenant_default.as_deref() {
                self.set_slug(Some(default));
            }
        }
    }

    /// Re-evaluated on every authentication-state change: a non-empty
    /// profile tenant claim overrides the current value, an absent or empty
    /// claim leaves it untouched.
    pub fn sync_from_auth(&mut self, auth: &AuthState) {
        if !auth.is_authenticated {
            return;
        }
        if let Some(claim) = auth.tenant_claim() {
            if !claim.trim().is_empty() {
                self.set_slug(Some(claim));
            }
        }
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum IdentityError {
    #[error("email is not on the allowed list: {0}")]
    EmailNotAllowed(String),
    #[error("account is billing-locked; mutating operations are disabled")]
    BillingLocked,
    #[error("profile is not authenticated")]
    NotAuthenticated,
}

/// Authentication state as supplied by the identity provider, persisted as
/// the session between invocations. `tenant_override` is the console's own
/// addition for explicit `tenant set` mutations.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct AuthState {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub billing_locked: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub tenant_override: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: Option<AppMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppMetadata {
    #[serde(default)]
    pub tenant_slug: Option<String>,
}

impl AuthState {
    pub fn tenant_claim(&self) -> Option<&str> {
        self.user
            .as_ref()?
            .app_metadata
            .as_ref()?
            .tenant_slug
            .as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref()?.email.as_deref()
    }

    pub fn require_billing_unlocked(&self) -> Result<(), IdentityError> {
        if self.billing_locked {
            return Err(IdentityError::BillingLocked);
        }
        Ok(())
    }
}

pub fn email_allowed(email: Option<&str>, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let Some(email) = email else {
        return false;
    };
    allowed.iter().any(|a| a.eq_ignore_ascii_case(email))
}

/// Validates a profile file, enforces the allowed-email list, and persists
/// the resulting session. Any prior explicit tenant override is cleared so
/// the fresh profile claim wins.
pub fn login_from_profile(path: &Path, allowed: &[String]) -> anyhow::Result<AuthState> {
    let raw = std::fs::read_to_string(path)?;
    let mut auth: AuthState = serde_json::from_str(&raw)?;
    if !auth.is_authenticated {
        return Err(IdentityError::NotAuthenticated.into());
    }
    if !email_allowed(auth.email(), allowed) {
        let email = auth.email().unwrap_or("<none>").to_string();
        return Err(IdentityError::EmailNotAllowed(email).into());
    }
    auth.tenant_override = None;
    save_session(&auth)?;
    Ok(auth)
}

pub fn load_session() -> anyhow::Result<AuthState> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(AuthState::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_session(auth: &AuthState) -> anyhow::Result<()> {
    let path = session_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(auth)?)?;
    Ok(())
}

pub fn clear_session() -> anyhow::Result<bool> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)?;
    Ok(true)
}

fn session_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config/staydesk/session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_claim_reads_nested_metadata() {
        let auth: AuthState = serde_json::from_str(
            r#"{"is_authenticated": true, "user": {"app_metadata": {"tenant_slug": "sunrise"}}}"#,
        )
        .unwrap();
        assert_eq!(auth.tenant_claim(), Some("sunrise"));
    }

    #[test]
    fn tenant_claim_absent_when_metadata_missing() {
        let auth: AuthState =
            serde_json::from_str(r#"{"is_authenticated": true, "user": {}}"#).unwrap();
        assert_eq!(auth.tenant_claim(), None);
    }

    #[test]
    fn empty_allowlist_admits_everyone() {
        assert!(email_allowed(Some("anyone@x.test"), &[]));
        assert!(email_allowed(None, &[]));
    }

    #[test]
    fn allowlist_match_is_case_insensitive() {
        let allowed = vec!["Ops@Example.com".to_string()];
        assert!(email_allowed(Some("ops@example.com"), &allowed));
        assert!(!email_allowed(Some("other@example.com"), &allowed));
        assert!(!email_allowed(None, &allowed));
    }

    #[test]
    fn billing_lock_blocks_mutations() {
        let auth = AuthState {
            billing_locked: true,
            ..AuthState::default()
        };
        assert!(matches!(
            auth.require_billing_unlocked(),
            Err(IdentityError::BillingLocked)
        ));
    }
}

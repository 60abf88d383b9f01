use crate::services::env::EnvConfig;
use crate::services::identity::AuthState;
use crate::services::tenant::TenantContext;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;

const TENANT_HEADER: &str = "x-tenant-slug";
const LOOPBACK_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("loopback request blocked outside local development: {0}")]
    Security(String),
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid request header: {0}")]
    Header(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// True when the URL references a loopback host anywhere, case-insensitive.
pub fn contains_loopback(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    LOOPBACK_HOSTS.iter().any(|host| lower.contains(host))
}

pub fn has_explicit_scheme(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Collapse leading separators to exactly one.
pub fn normalize_path(target: &str) -> String {
    format!("/{}", target.trim_start_matches('/'))
}

/// Ephemeral per-call request shape; constructed, resolved, dispatched,
/// discarded.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Wraps outbound HTTP calls: resolves the final URL, injects credentials
/// and the tenant header, and enforces the loopback security gate.
pub struct Dispatcher {
    api_base: String,
    development: bool,
    origin: Option<String>,
    access_token: Option<String>,
    client: Client,
}

impl Dispatcher {
    pub fn new(env: &EnvConfig, auth: &AuthState) -> anyhow::Result<Self> {
        let api_base = env.resolve_api_base()?;
        // Cookie store stays on for every dispatch; callers cannot opt out.
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            api_base,
            development: env.mode.is_development(),
            origin: env.origin.clone(),
            access_token: auth.access_token.clone(),
            client,
        })
    }

    /// Loopback targets are permitted only when the build runs in
    /// development mode AND the console itself is served from a loopback
    /// host.
    pub fn local_dev_bypass(&self) -> bool {
        self.development
            && self
                .origin
                .as_deref()
                .map(contains_loopback)
                .unwrap_or(false)
    }

    /// Resolve a path or absolute URL to the final URL, then apply the
    /// security gate on the resolved form.
    pub fn resolve_url(&self, target: &str) -> Result<String, DispatchError> {
        let bypass = self.local_dev_bypass();
        let resolved = if has_explicit_scheme(target) {
            target.to_string()
        } else {
            let path = normalize_path(target);
            if bypass {
                match self.origin.as_deref() {
                    Some(origin) => format!("{}{}", origin.trim_end_matches('/'), path),
                    None => path,
                }
            } else {
                format!("{}{}", self.api_base, path)
            }
        };
        if !bypass && contains_loopback(&resolved) {
            return Err(DispatchError::Security(resolved));
        }
        Ok(resolved)
    }

    /// Issue exactly one network call. Caller headers merge in first; the
    /// tenant and authorization headers are inserted with replace semantics
    /// afterwards, so a caller-supplied value of either name never reaches
    /// the wire. No retries, no caching.
    pub fn dispatch(
        &self,
        tenant: &TenantContext,
        target: &str,
        options: RequestOptions,
    ) -> Result<Response, DispatchError> {
        let url = self.resolve_url(target)?;
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| DispatchError::Header(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| DispatchError::Header(name.to_string()))?;
            headers.append(name, value);
        }
        // HeaderMap::insert drops every prior value of the name, including
        // caller-appended duplicates.
        if let Some(slug) = tenant.slug() {
            let value = HeaderValue::from_str(slug)
                .map_err(|_| DispatchError::Header(TENANT_HEADER.to_string()))?;
            headers.insert(TENANT_HEADER, value);
        }
        if let Some(token) = self.access_token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| DispatchError::Header(AUTHORIZATION.as_str().to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        let mut req = self.client.request(options.method, url.as_str()).headers(headers);
        if let Some(body) = &options.body {
            req = req.json(body);
        }
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            // Body read is best-effort; its failure never masks the status.
            let body = resp.text().unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        tenant: &TenantContext,
        path: &str,
    ) -> anyhow::Result<T> {
        let resp = self.dispatch(tenant, path, RequestOptions::default())?;
        Ok(resp.json().map_err(DispatchError::Transport)?)
    }

    pub fn post_json<T: DeserializeOwned>(
        &self,
        tenant: &TenantContext,
        path: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<T> {
        let options = RequestOptions {
            method: Method::POST,
            headers: vec![],
            body: Some(body),
        };
        let resp = self.dispatch(tenant, path, options)?;
        Ok(resp.json().map_err(DispatchError::Transport)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::env::AppMode;

    fn dispatcher(mode: AppMode, api_base: &str, origin: Option<&str>) -> Dispatcher {
        let env = EnvConfig {
            mode,
            api_base: Some(api_base.to_string()),
            allowed_emails: vec![],
            tenant_default: None,
            origin: origin.map(str::to_string),
        };
        Dispatcher::new(&env, &AuthState::default()).expect("dispatcher")
    }

    #[test]
    fn scheme_detection_is_prefix_based() {
        assert!(has_explicit_scheme("https://api.test/x"));
        assert!(has_explicit_scheme("HTTP://api.test"));
        assert!(!has_explicit_scheme("/guests"));
        assert!(!has_explicit_scheme("guests"));
    }

    #[test]
    fn paths_normalize_to_single_leading_slash() {
        assert_eq!(normalize_path("guests"), "/guests");
        assert_eq!(normalize_path("/guests"), "/guests");
        assert_eq!(normalize_path("///guests"), "/guests");
    }

    #[test]
    fn relative_path_joins_api_base() {
        let d = dispatcher(AppMode::Development, "https://api.test", None);
        assert_eq!(d.resolve_url("/foo").unwrap(), "https://api.test/foo");
        assert_eq!(d.resolve_url("foo").unwrap(), "https://api.test/foo");
    }

    #[test]
    fn loopback_target_rejected_without_bypass_in_any_mode() {
        for mode in [AppMode::Development, AppMode::Production] {
            let d = dispatcher(mode, "https://api.test", Some("https://admin.example.com"));
            let err = d.resolve_url("http://localhost:1234").unwrap_err();
            assert!(matches!(err, DispatchError::Security(_)), "mode {mode:?}");
        }
    }

    #[test]
    fn loopback_api_base_rejected_without_bypass() {
        let d = dispatcher(AppMode::Development, "http://127.0.0.1:4000", None);
        assert!(matches!(
            d.resolve_url("/guests"),
            Err(DispatchError::Security(_))
        ));
    }

    #[test]
    fn bypass_requires_development_and_loopback_origin() {
        let d = dispatcher(
            AppMode::Development,
            "https://api.test",
            Some("http://localhost:3000"),
        );
        assert!(d.local_dev_bypass());

        let prod = dispatcher(
            AppMode::Production,
            "https://api.test",
            Some("http://localhost:3000"),
        );
        assert!(!prod.local_dev_bypass());

        let remote = dispatcher(
            AppMode::Development,
            "https://api.test",
            Some("https://admin.example.com"),
        );
        assert!(!remote.local_dev_bypass());
    }

    #[test]
    fn bypass_resolves_paths_against_origin() {
        let d = dispatcher(
            AppMode::Development,
            "https://api.test",
            Some("http://localhost:3000"),
        );
        assert_eq!(d.resolve_url("/foo").unwrap(), "http://localhost:3000/foo");
        assert_eq!(
            d.resolve_url("http://localhost:1234/x").unwrap(),
            "http://localhost:1234/x"
        );
    }

    #[test]
    fn caller_headers_cannot_shadow_tenant_header() {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture");
        let addr = listener.local_addr().expect("fixture addr");
        let captured = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream);
            let mut lines = Vec::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                    break;
                }
                lines.push(line.trim().to_string());
            }
            let mut stream = reader.into_inner();
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
            );
            lines
        });

        let base = format!("http://{addr}");
        let d = dispatcher(AppMode::Development, "https://api.test", Some(base.as_str()));
        let mut tenant = TenantContext::new();
        tenant.set_slug(Some("good"));
        let options = RequestOptions {
            headers: vec![("x-tenant-slug".to_string(), "evil".to_string())],
            ..RequestOptions::default()
        };
        d.dispatch(&tenant, "/guests", options).expect("dispatch");

        let lines = captured.join().expect("fixture thread");
        let slugs: Vec<&String> = lines
            .iter()
            .filter(|l| l.to_ascii_lowercase().starts_with("x-tenant-slug:"))
            .collect();
        // Exactly one value reaches the wire, and it is never the caller's.
        assert_eq!(slugs.len(), 1, "headers sent: {lines:?}");
        assert!(slugs[0].ends_with("good"));
    }

    #[test]
    fn invalid_caller_header_is_rejected() {
        let d = dispatcher(AppMode::Development, "https://api.test", None);
        let options = RequestOptions {
            headers: vec![("bad header".to_string(), "x".to_string())],
            ..RequestOptions::default()
        };
        let err = d
            .dispatch(&TenantContext::new(), "/guests", options)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Header(_)));
    }

    #[test]
    fn loopback_detection_is_case_insensitive_and_positional() {
        assert!(contains_loopback("https://LocalHost/api"));
        assert!(contains_loopback("https://api.test/?next=http%3A//127.0.0.1"));
        assert!(!contains_loopback("https://api.test/guests"));
    }
}

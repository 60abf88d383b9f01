//! Service layer containing the API boundary logic and side-effect helpers.
//!
//! ## Service map
//! - `env.rs` — environment snapshot + api-base/allowed-emails resolution.
//! - `tenant.rs` — single-value tenant context store and its precedence.
//! - `identity.rs` — session persistence, login allow-list, tenant sync.
//! - `dispatch.rs` — outbound HTTP: URL resolution, loopback gate, headers.
//! - `search.rs` — guest fuzzy scoring + worker thread.
//! - `hygiene.rs` — insecure-loopback literal scan for `check`.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod dispatch;
pub mod env;
pub mod hygiene;
pub mod identity;
pub mod output;
pub mod search;
pub mod tenant;

//! Repository hygiene guard.
//!
//! Fails the build when a production configuration points at an insecure
//! API base, and when a non-test source file carries a literal
//! insecure-loopback URL. The same scan is available at runtime via
//! `staydesk check`.

use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-env-changed=STAYDESK_ENV");
    println!("cargo:rerun-if-env-changed=API_BASE");
    println!("cargo:rerun-if-changed=src");

    let mode = std::env::var("STAYDESK_ENV").unwrap_or_default();
    if let Ok(base) = std::env::var("API_BASE") {
        if insecure_api_base(&mode, &base) {
            panic!("API_BASE must start with https:// in production builds, got: {base}");
        }
    }

    // Needles are assembled at runtime so this file passes its own scan.
    let needles = [
        format!("http://{}", "localhost"),
        format!("http://{}", "127.0.0.1"),
    ];
    let mut violations = Vec::new();
    scan_sources(Path::new("src"), &needles, &mut violations);
    if !violations.is_empty() {
        panic!(
            "insecure loopback URL literal in non-test sources:\n{}",
            violations.join("\n")
        );
    }
}

// Mirrors `services::env::insecure_api_base`, which carries the unit tests;
// build scripts compile apart from the crate and cannot import it.
fn insecure_api_base(mode: &str, base: &str) -> bool {
    mode == "production" && !base.trim().starts_with("https://")
}

fn scan_sources(dir: &Path, needles: &[String], violations: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_sources(&path, needles, violations);
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }
        let Ok(text) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in text.lines().enumerate() {
            // Everything below the in-file test module marker is test code.
            if line.trim() == "#[cfg(test)]" {
                break;
            }
            if needles.iter().any(|n| line.contains(n.as_str())) {
                violations.push(format!("{}:{}", path.display(), idx + 1));
            }
        }
    }
}

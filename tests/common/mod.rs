#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use tempfile::TempDir;

const STAYDESK_KEYS: [&str; 5] = [
    "API_BASE",
    "ALLOWED_EMAILS",
    "TENANT_SLUG",
    "STAYDESK_ENV",
    "STAYDESK_ORIGIN",
];

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self { _tmp: tmp, home }
    }

    pub fn cmd(&self, envs: &[(&str, &str)]) -> Command {
        let mut cmd = cargo_bin_cmd!("staydesk");
        cmd.env("HOME", &self.home);
        for key in STAYDESK_KEYS {
            cmd.env_remove(key);
        }
        for (key, value) in envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn run_json(&self, envs: &[(&str, &str)], args: &[&str]) -> Value {
        let mut cmd = self.cmd(envs);
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_failure(&self, envs: &[(&str, &str)], args: &[&str]) -> Value {
        let mut cmd = self.cmd(envs);
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("error json output")
    }

    pub fn write_profile(&self, name: &str, profile: &Value) -> PathBuf {
        let path = self.home.join(name);
        fs::write(&path, serde_json::to_string_pretty(profile).expect("profile json"))
            .expect("write profile");
        path
    }

    pub fn write_session(&self, session: &Value) {
        let dir = self.home.join(".config/staydesk");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(
            dir.join("session.json"),
            serde_json::to_string_pretty(session).expect("session json"),
        )
        .expect("write session");
    }

    pub fn session_exists(&self) -> bool {
        self.home.join(".config/staydesk/session.json").exists()
    }
}

/// Minimal loopback HTTP fixture serving canned JSON per path. Runs on its
/// own thread for the lifetime of the test process.
pub fn spawn_fixture_api(routes: Vec<(&'static str, Value)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture api");
    let addr = listener.local_addr().expect("fixture addr");
    let routes: Vec<(String, String)> = routes
        .into_iter()
        .map(|(path, body)| (path.to_string(), body.to_string()))
        .collect();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let routes = routes.clone();
            std::thread::spawn(move || handle_connection(stream, &routes));
        }
    });

    format!("http://{addr}")
}

fn handle_connection(stream: std::net::TcpStream, routes: &[(String, String)]) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }
    if content_length > 0 {
        let mut body = vec![0u8; content_length];
        let _ = reader.read_exact(&mut body);
    }

    let (status, body) = match routes.iter().find(|(p, _)| *p == path) {
        Some((_, body)) => ("200 OK", body.clone()),
        None => ("404 Not Found", r#"{"error":"not found"}"#.to_string()),
    };
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
         content-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
}

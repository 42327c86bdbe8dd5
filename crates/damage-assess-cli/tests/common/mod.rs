//! Shared helpers for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, deprecated)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_cmd::Command;
use damage_assess_test_support::{SeverityArtifactBuilder, SyntheticImageBuilder};

/// Environment variable the stub server's key is read from.
pub const TEST_KEY_ENV: &str = "DAMAGE_ASSESS_TEST_KEY";

/// A `damage-assess` command isolated from the user's config, data and key.
pub fn command(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("damage-assess").unwrap();
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove(TEST_KEY_ENV)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .current_dir(home);
    cmd
}

/// Writes two photos of one incident and returns their directory.
pub fn write_incident(root: &Path) -> PathBuf {
    let dir = root.join("incident");
    std::fs::create_dir_all(&dir).unwrap();
    SyntheticImageBuilder::write_png(&dir, "front.png", &SyntheticImageBuilder::scratched_panel(64, 64))
        .unwrap();
    SyntheticImageBuilder::write_png(&dir, "rear.png", &SyntheticImageBuilder::checkerboard(64, 64, 8))
        .unwrap();
    dir
}

/// Writes severity artifacts favouring `03-severe` and returns their directory.
pub fn write_artifacts(root: &Path) -> PathBuf {
    let dir = root.join("severity");
    std::fs::create_dir_all(&dir).unwrap();
    SeverityArtifactBuilder::new()
        .favoring(2, 3.0)
        .write(&dir)
        .unwrap();
    dir
}

/// Minimal chat-completions endpoint answering every request with `content`.
pub struct StubServer {
    /// Endpoint URL.
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    pub fn start(content: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!(
            "http://{}/v1/chat/completions",
            listener.local_addr().unwrap()
        );
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                    let lower = line.to_ascii_lowercase();
                    if let Some(v) = lower.strip_prefix("content-length:") {
                        content_length = v.trim().parse().unwrap_or(0);
                    }
                }
                let mut request_body = vec![0; content_length];
                let _ = reader.read_exact(&mut request_body);
                counter.fetch_add(1, Ordering::SeqCst);

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { url, hits }
    }

    /// Requests answered so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Writes a project config pointing the completion client at this server.
    pub fn write_project_config(&self, dir: &Path, extra: &str) {
        std::fs::write(
            dir.join(".damage-assess.toml"),
            format!(
                "[completion]\nendpoint = \"{}\"\napi_key_env = \"{TEST_KEY_ENV}\"\ntimeout_secs = 10\n\n{extra}",
                self.url
            ),
        )
        .unwrap();
    }
}

/// Model reply carrying both a vision assessment and a cost estimate.
pub const FULL_REPLY: &str = r#"{"vehicle_type": "Car", "damage_type": "Dent", "severity": "Severe",
 "damage_description": "Dented rear door", "affected_areas": ["rear door"], "confidence": 0.9,
 "total_cost": 12000, "cost_breakdown": {"parts_cost": 6000, "labor_cost": 4000, "paint_cost": 1000,
 "taxes": 800, "overhead_cost": 200}, "repair_time_days": 4, "recommendations": ["Use an OEM door skin"]}"#;

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Nothing listens on the discard port, so live sources fail fast.
pub const DEAD_URL: &str = "http://127.0.0.1:9";

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
    pub db: PathBuf,
    pub bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_endpoints(DEAD_URL)
    }

    /// Points the official, AUR and icon endpoints at `base`.
    pub fn with_endpoints(base: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let home = root.join("home");
        let bin = root.join("bin");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&bin).expect("create fake bin dir");

        let db = root.join("db").join("real_db.json");
        write_fixture_index(&db);
        write_config(&home, base);

        Self {
            _tmp: tmp,
            root,
            home,
            db,
            bin,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("aura-find");
        cmd.env("HOME", &self.home)
            .env("PATH", &self.bin)
            .env_remove("AURA_FIND_LOG");
        for proxy in [
            "HTTP_PROXY",
            "HTTPS_PROXY",
            "ALL_PROXY",
            "http_proxy",
            "https_proxy",
            "all_proxy",
        ] {
            cmd.env_remove(proxy);
        }
        cmd
    }

    pub fn cmd_db(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--db").arg(&self.db);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd_db()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    #[cfg(unix)]
    pub fn tool(&self, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = self.bin.join(name);
        fs::write(&path, script).expect("write fake tool");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    }

    /// sudo that checks `-S` passwords against `hunter2` and then execs.
    #[cfg(unix)]
    pub fn fake_sudo_and_pacman(&self) {
        self.tool(
            "sudo",
            r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -S)
      read -r pw
      echo "[sudo] password for tester:"
      if [ "$pw" != "hunter2" ]; then echo "sudo: 1 incorrect password attempt" >&2; exit 1; fi
      ;;
    -k) ;;
    *) break ;;
  esac
  shift
done
exec "$@"
"#,
        );
        self.tool(
            "pacman",
            r#"#!/bin/sh
case "$1" in
  -Q)
    [ "$2" = "present-pkg" ] && exit 0
    exit 1
    ;;
  -S)
    if [ "$3" = "broken" ]; then echo "error: target not found: broken" >&2; exit 1; fi
    echo "resolving dependencies..."
    echo "installing $3"
    exit 0
    ;;
  -Rns)
    echo "removing $3"
    exit 0
    ;;
esac
exit 2
"#,
        );
    }

    pub fn audit_lines(&self) -> Vec<Value> {
        let path = self.home.join(".config/aura-find/audit.jsonl");
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).expect("audit line is json"))
            .collect()
    }
}

fn write_config(home: &Path, base: &str) {
    let dir = home.join(".config/aura-find");
    fs::create_dir_all(&dir).expect("create config dir");
    let cfg = format!(
        r#"
[search]
official_url = "{base}/packages/search/json/"
aur_url = "{base}/rpc/"
timeout_ms = 2000

[icons]
endpoint = "{base}/ip3"
timeout_ms = 1000
"#
    );
    fs::write(dir.join("config.toml"), cfg).expect("write config");
}

pub fn write_fixture_index(path: &Path) {
    fs::create_dir_all(path.parent().expect("index parent")).expect("create index dir");
    let db = serde_json::json!({
        "apps": [
            {"name": "kdenlive", "desc": "Non-linear video editor designed for basic to semi-professional work.", "category": "Video editors"},
            {"name": "shotcut", "desc": "Cross-platform Qt based video editor.", "category": "Video editors"},
            {"name": "gimp", "desc": "Image manipulation program for photo retouching.", "category": "Raster graphics editors"},
            {"name": "pinta", "desc": "Drawing and image editing program modeled on Paint.NET.", "category": "Raster graphics editors"},
            {"name": "mpv", "desc": "Media player based on MPlayer and mplayer2.", "category": "Video players"}
        ]
    });
    fs::write(path, serde_json::to_string_pretty(&db).expect("serialize index"))
        .expect("write index");
}

pub struct Route {
    pub prefix: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub fn json(prefix: &str, body: Value) -> Self {
        Self {
            prefix: prefix.to_string(),
            status: 200,
            body: body.to_string().into_bytes(),
        }
    }

    pub fn bytes(prefix: &str, body: Vec<u8>) -> Self {
        Self {
            prefix: prefix.to_string(),
            status: 200,
            body,
        }
    }
}

/// Minimal HTTP/1.1 responder on 127.0.0.1. Unrouted paths get a 404 and
/// every request target is recorded.
pub struct MockServer {
    pub url: String,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf).to_string();
                let target = head
                    .lines()
                    .next()
                    .and_then(|l| l.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                log.lock().expect("mock log").push(target.clone());

                let (status, body) = routes
                    .iter()
                    .find(|r| target.starts_with(&r.prefix))
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, b"not found".to_vec()));
                let reason = if status == 200 { "OK" } else { "Not Found" };
                let header = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    reason,
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });

        Self { url, seen }
    }

    pub fn requests(&self) -> Vec<String> {
        self.seen.lock().expect("mock log").clone()
    }
}

/// A 400-byte ICO whose first directory entry is `width` pixels wide.
pub fn fake_ico(width: u8) -> Vec<u8> {
    let mut b = vec![0, 0, 1, 0, 1, 0, width, width];
    b.resize(400, 0);
    b
}

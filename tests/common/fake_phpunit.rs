//! Scripted stand-ins for a PHPUnit binary.
//!
//! Each script is run through `sh`, so no executable bit is needed.

#![allow(dead_code)]

use phpunit_driver::config::{Config, ExecutionMode};
use std::path::PathBuf;
use tempfile::TempDir;

pub const BANNER: &str = "PHPUnit 10.5.3 by Sebastian Bergmann and contributors.";

/// A shell script in its own temp directory.
pub struct FakePhpunit {
    pub dir: TempDir,
    pub script: PathBuf,
}

impl FakePhpunit {
    /// Write `body` as the script.
    pub fn new(body: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let script = dir.path().join("phpunit.sh");
        std::fs::write(&script, body).expect("Failed to write script");
        Self { dir, script }
    }

    /// A script that prints `lines` to stdout after the version banner and
    /// exits with `code`.
    pub fn printing(lines: &[&str], code: i32) -> Self {
        let mut body = format!("echo \"{BANNER}\"\n");
        for line in lines {
            body.push_str(&format!("printf '%s\\n' \"{line}\"\n"));
        }
        body.push_str(&format!("exit {code}\n"));
        Self::new(&body)
    }

    pub fn workspace(&self) -> String {
        self.dir.path().display().to_string()
    }

    /// Run `sh <script>` on this host, in the script's directory.
    pub fn direct_config(&self) -> Config {
        Config {
            php: Some("sh".into()),
            phpunit: Some(self.script.display().to_string()),
            cwd: Some(self.dir.path().to_path_buf()),
            ..Config::default()
        }
    }

    /// Run the invocation through `sh -c`, with the script directory
    /// mapped to `/app`.
    pub fn indirect_config(&self) -> Config {
        let mut config = Config {
            command: Some("sh -c".into()),
            mode: ExecutionMode::Indirect,
            ..self.direct_config()
        };
        config.paths.insert(self.workspace(), "/app");
        config
    }
}

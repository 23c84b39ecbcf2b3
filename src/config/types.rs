use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Root configuration for one PHPUnit invocation.
///
/// Every field is optional: a missing value degrades to an empty token when
/// the command is assembled, it never fails the build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base command tokens placed before the PHP binary (e.g. `docker exec -t app`).
    pub command: Option<String>,
    /// PHP binary.
    pub php: Option<String>,
    /// PHPUnit (or ParaTest) entry path.
    pub phpunit: Option<String>,
    /// Extra arguments appended to every run.
    pub args: Vec<String>,
    /// Local → remote path prefixes, in document order.
    pub paths: PathTable,
    /// Whether the test framework runs on this host or behind `command`.
    pub mode: ExecutionMode,
    /// Working directory; also the value of `${workspaceFolder}`.
    pub cwd: Option<PathBuf>,
    /// Extra environment for the child process.
    pub env: BTreeMap<String, String>,
}

impl Config {
    /// Raw lookup by key, mirroring the editor-style `get(key)` interface.
    ///
    /// List-valued keys (`args`) are joined with spaces; `paths` and `env`
    /// have no string form and always return `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "command" => self.command.clone(),
            "php" => self.php.clone(),
            "phpunit" => self.phpunit.clone(),
            "args" if !self.args.is_empty() => Some(self.args.join(" ")),
            "mode" => Some(self.mode.as_str().to_string()),
            "cwd" => self.cwd.as_ref().map(|p| p.display().to_string()),
            _ => None,
        }
    }
}

/// Where the test framework process executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Spawned on this host as-is.
    #[default]
    Direct,
    /// Spawned through `command` (container, SSH, ...), with path translation.
    Indirect,
}

/// What the command builder does differently for an execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Rewrite local path tokens to remote ones and load the `paths` table.
    pub translate_paths: bool,
    /// Join the PHPUnit invocation into one quoted string after `command`.
    pub wrap_invocation: bool,
}

impl ExecutionMode {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Direct => Capabilities {
                translate_paths: false,
                wrap_invocation: false,
            },
            Self::Indirect => Capabilities {
                translate_paths: true,
                wrap_invocation: true,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
        }
    }
}

/// Ordered `local = "remote"` table.
///
/// TOML tables have no inherent order once loaded into a map, so this keeps
/// the pairs as a vector in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable(Vec<(String, String)>);

impl PathTable {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a pair, keeping insertion order.
    pub fn insert(&mut self, local: impl Into<String>, remote: impl Into<String>) {
        self.0.push((local.into(), remote.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, r)| (l.as_str(), r.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<L: Into<String>, R: Into<String>> FromIterator<(L, R)> for PathTable {
    fn from_iter<I: IntoIterator<Item = (L, R)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(l, r)| (l.into(), r.into())).collect())
    }
}

impl Serialize for PathTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(l, r)| (l, r)))
    }
}

impl<'de> Deserialize<'de> for PathTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathTableVisitor;

        impl<'de> Visitor<'de> for PathTableVisitor {
            type Value = PathTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of local path = remote path")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut table = PathTable::new();
                while let Some((local, remote)) = map.next_entry::<String, String>()? {
                    table.insert(local, remote);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(PathTableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_capabilities() {
        assert!(!ExecutionMode::Direct.capabilities().translate_paths);
        assert!(!ExecutionMode::Direct.capabilities().wrap_invocation);
        assert!(ExecutionMode::Indirect.capabilities().translate_paths);
        assert!(ExecutionMode::Indirect.capabilities().wrap_invocation);
    }

    #[test]
    fn get_returns_raw_values() {
        let config = Config {
            phpunit: Some("vendor/bin/phpunit".into()),
            args: vec!["--stop-on-failure".into(), "--group=unit".into()],
            ..Config::default()
        };
        assert_eq!(config.get("phpunit").as_deref(), Some("vendor/bin/phpunit"));
        assert_eq!(
            config.get("args").as_deref(),
            Some("--stop-on-failure --group=unit")
        );
        assert_eq!(config.get("php"), None);
        assert_eq!(config.get("paths"), None);
        assert_eq!(config.get("mode").as_deref(), Some("direct"));
    }
}

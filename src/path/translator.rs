//! Bidirectional local ↔ remote path rewriting.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::config::PathTable;

/// `${workspaceFolder}` / `${PWD}`, braces optional.
static WORKSPACE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?(?:workspaceFolder|PWD)\}?").expect("workspace variable pattern")
});

/// A drive-letter path up to the next `:` (which starts a `::Class::method` suffix).
static DRIVE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]:[\\/][^:]*").expect("drive path pattern"));

/// A leading `scheme://` marker such as `php_qn://`.
static SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+._-]+://").expect("scheme pattern")
});

/// Composer's virtual filesystem wrapper around vendor binaries.
const VFS_WRAPPER: &str = "phpvfscomposer://";

/// Ordered local → remote prefix pairs, workspace variables already substituted.
///
/// Entries apply in insertion order. Overlapping prefixes are not resolved
/// by length; whichever entry comes first rewrites first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapping {
    entries: Vec<(String, String)>,
}

impl PathMapping {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, r)| (l.as_str(), r.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Rewrites paths between the caller's filesystem and the one PHPUnit runs in.
///
/// Stateless after construction: the same input always yields the same output.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    workspace: String,
    mapping: PathMapping,
}

impl PathTranslator {
    /// Translator with no mapping: only workspace substitution and
    /// native-form fix-ups apply.
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            mapping: PathMapping::default(),
        }
    }

    /// Translator with a mapping table. Both sides of every entry are
    /// workspace-substituted once, here.
    pub fn with_mapping(workspace: impl Into<String>, table: &PathTable) -> Self {
        let mut translator = Self::new(workspace);
        let entries = table
            .iter()
            .filter(|(local, remote)| !local.is_empty() && !remote.is_empty())
            .map(|(local, remote)| {
                (
                    trim_separator(&translator.substitute_workspace_variable(local)),
                    trim_separator(&translator.substitute_workspace_variable(remote)),
                )
            })
            .collect();
        translator.mapping = PathMapping { entries };
        translator
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn mapping(&self) -> &PathMapping {
        &self.mapping
    }

    /// Replace `${workspaceFolder}` and `${PWD}` with the working directory.
    pub fn substitute_workspace_variable(&self, path: &str) -> String {
        WORKSPACE_VARIABLE
            .replace_all(path, NoExpand(&self.workspace))
            .into_owned()
    }

    /// Rewrite a path reported by PHPUnit into one the caller can open.
    pub fn remote_to_local(&self, path: &str) -> String {
        let unwrapped = path.replace(VFS_WRAPPER, "");
        let mapped = self
            .mapping
            .iter()
            .fold(unwrapped, |path, (local, remote)| {
                replace_remote_prefix(&path, local, remote)
            });
        to_native_form(&mapped)
    }

    /// Rewrite a caller path into the form PHPUnit sees remotely.
    pub fn local_to_remote(&self, path: &str) -> String {
        let substituted = self.substitute_workspace_variable(path);
        let mapped = self
            .mapping
            .iter()
            .fold(substituted, |path, (local, remote)| {
                path.replacen(local, remote, 1)
            });
        to_native_form(&mapped.replace('\\', "/"))
    }

    /// Whether a token refers to a caller-side path worth translating.
    ///
    /// True for tokens carrying a workspace variable, a configured local
    /// prefix, or an absolute POSIX / drive-letter path, including after a
    /// `--flag=` prefix.
    pub fn is_local_path(&self, token: &str) -> bool {
        if WORKSPACE_VARIABLE.is_match(token) {
            return true;
        }
        if self.mapping.iter().any(|(local, _)| token.contains(local)) {
            return true;
        }
        let value = match token.split_once('=') {
            Some((flag, value)) if flag.starts_with('-') => value,
            _ => token,
        };
        value.starts_with('/') || is_drive_path(value)
    }
}

fn is_drive_path(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Drop one trailing separator so `/app/` and `/app` map identically.
fn trim_separator(path: &str) -> String {
    if path.len() > 1 && (path.ends_with('/') || path.ends_with('\\')) {
        path[..path.len() - 1].to_string()
    } else {
        path.to_string()
    }
}

/// Replace `remote/` with `local/` everywhere, plus a bare remote root at
/// the end of the path (`php_qn:///app` or `/app` itself).
fn replace_remote_prefix(path: &str, local: &str, remote: &str) -> String {
    let replaced = path.replace(&format!("{remote}/"), &format!("{local}/"));
    match replaced.strip_suffix(remote) {
        Some(head) if head.is_empty() || head.ends_with(|c| c == '/' || c == ':') => {
            format!("{head}{local}")
        }
        _ => replaced,
    }
}

/// Give drive-letter paths backslash separators, leaving a leading
/// `scheme://` marker untouched.
fn to_native_form(path: &str) -> String {
    let (scheme, rest) = match SCHEME.find(path) {
        Some(m) => path.split_at(m.end()),
        None => ("", path),
    };
    let fixed = DRIVE_PATH.replace_all(rest, |caps: &regex::Captures<'_>| caps[0].replace('/', "\\"));
    format!("{scheme}{fixed}")
}

//! Flag registry and classifier for caller-supplied PHPUnit arguments.

/// How the builder treats a flag found in caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagBehavior {
    /// Owned by the builder: stripped from input, the canonical form is
    /// appended unconditionally.
    Forced,
    /// Forwarded to PHPUnit, normalized to the long form.
    Passthrough,
}

/// Whether a flag takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagArity {
    /// Boolean flag (e.g. `--teamcity`).
    NoValue,
    /// Value in the next token or after `=` (e.g. `--filter <pattern>`).
    RequiresValue,
    /// Value only after `=` (e.g. `--colors=never`); a bare flag is valid.
    InlineValue,
}

/// A single flag definition.
#[derive(Debug, Clone)]
pub struct FlagDef {
    pub long: &'static str,
    pub short: Option<&'static str>,
    pub arity: FlagArity,
    pub behavior: FlagBehavior,
    pub description: &'static str,
}

/// The canonical machine-readable output flag.
pub const TEAMCITY_FLAG: &str = "--teamcity";
/// The canonical color suppression flag.
pub const NO_COLORS_FLAG: &str = "--colors=never";

/// Build the complete flag registry.
pub fn flag_registry() -> Vec<FlagDef> {
    vec![
        // === Forced (output format is owned by the driver) ===
        FlagDef {
            long: "--teamcity",
            short: None,
            arity: FlagArity::NoValue,
            behavior: FlagBehavior::Forced,
            description: "Report progress in TeamCity format",
        },
        FlagDef {
            long: "--colors",
            short: None,
            arity: FlagArity::InlineValue,
            behavior: FlagBehavior::Forced,
            description: "Use colors in output",
        },
        FlagDef {
            long: "--testdox",
            short: None,
            arity: FlagArity::NoValue,
            behavior: FlagBehavior::Forced,
            description: "Report progress in TestDox format",
        },
        FlagDef {
            long: "--testdox-html",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Forced,
            description: "Write TestDox report in HTML format",
        },
        FlagDef {
            long: "--testdox-text",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Forced,
            description: "Write TestDox report in text format",
        },
        FlagDef {
            long: "--testdox-xml",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Forced,
            description: "Write TestDox report in XML format",
        },
        FlagDef {
            long: "--log-teamcity",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Forced,
            description: "Write TeamCity log to file",
        },
        // === Passthrough ===
        FlagDef {
            long: "--configuration",
            short: Some("-c"),
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Passthrough,
            description: "Read configuration from XML file",
        },
        FlagDef {
            long: "--filter",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Passthrough,
            description: "Filter which tests to run",
        },
        FlagDef {
            long: "--group",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Passthrough,
            description: "Only run tests from the specified group(s)",
        },
        FlagDef {
            long: "--exclude-group",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Passthrough,
            description: "Exclude tests from the specified group(s)",
        },
        FlagDef {
            long: "--testsuite",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Passthrough,
            description: "Filter which testsuite to run",
        },
        FlagDef {
            long: "--bootstrap",
            short: None,
            arity: FlagArity::RequiresValue,
            behavior: FlagBehavior::Passthrough,
            description: "A PHP script that is included before the tests run",
        },
    ]
}

impl FlagDef {
    /// Check if this definition matches the given argument, returning the
    /// inline `=value` part when present.
    pub fn matches<'a>(&self, arg: &'a str) -> Option<Option<&'a str>> {
        if arg == self.long || self.short == Some(arg) {
            return Some(None);
        }
        arg.strip_prefix(self.long)
            .and_then(|rest| rest.strip_prefix('='))
            .map(Some)
    }
}

/// A classified argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedArg {
    /// Forced flag supplied by the caller; dropped.
    Forced {
        flag: String,
        value: Option<String>,
    },
    /// Known passthrough flag.
    Known {
        flag: String, // normalized to long form
        value: Option<String>,
        /// Value was written as `--flag=value`.
        inline: bool,
    },
    /// Unknown flag, forwarded verbatim.
    Unknown(String),
    /// Positional argument (test file or directory).
    Positional(String),
}

/// Result of classifying raw arguments.
#[derive(Debug, Clone)]
pub struct ClassifyResult {
    /// Classified arguments in order.
    pub args: Vec<ClassifiedArg>,
    /// Notes about dropped or malformed input.
    pub warnings: Vec<String>,
}

/// Classify raw args against the registry.
pub fn classify(raw_args: &[String], registry: &[FlagDef]) -> ClassifyResult {
    let mut args = Vec::new();
    let mut warnings = Vec::new();
    let mut iter = raw_args.iter().peekable();

    while let Some(arg) = iter.next() {
        if !arg.starts_with('-') {
            args.push(ClassifiedArg::Positional(arg.clone()));
            continue;
        }

        let Some((def, inline)) = registry
            .iter()
            .find_map(|d| d.matches(arg).map(|inline| (d, inline)))
        else {
            args.push(ClassifiedArg::Unknown(arg.clone()));
            continue;
        };

        let flag = def.long.to_string();
        let value = match (def.arity, inline) {
            (FlagArity::NoValue, _) => None,
            (_, Some(inline)) => Some(inline.to_string()),
            (FlagArity::InlineValue, None) => None,
            (FlagArity::RequiresValue, None) => match iter.peek() {
                Some(next) if !next.starts_with('-') => iter.next().cloned(),
                Some(_) | None => {
                    warnings.push(format!("{}: missing required value", flag));
                    None
                }
            },
        };

        let classified = match def.behavior {
            FlagBehavior::Forced => {
                warnings.push(format!(
                    "{} ({}): output format is forced, ignoring",
                    flag, def.description
                ));
                ClassifiedArg::Forced { flag, value }
            }
            FlagBehavior::Passthrough => ClassifiedArg::Known {
                flag,
                value,
                inline: inline.is_some(),
            },
        };
        args.push(classified);
    }

    ClassifyResult { args, warnings }
}

//! Argument assembler: caller args in, canonical PHPUnit args out.

use crate::command::flags::{ClassifiedArg, NO_COLORS_FLAG, TEAMCITY_FLAG};
use crate::path::PathTranslator;

/// ParaTest's switch to run each test group in a single process.
pub const PARATEST_FUNCTIONAL_FLAG: &str = "-f";

/// Builder for the PHPUnit argument list.
#[derive(Debug, Clone)]
pub struct ArgAssembler {
    args: Vec<String>,
}

impl ArgAssembler {
    /// Start with passthrough args (filtered from classified args).
    ///
    /// Forced flags are excluded; [`Self::with_forced_flags`] re-adds the
    /// canonical forms.
    pub fn from_passthrough(classified: &[ClassifiedArg]) -> Self {
        let args = classified
            .iter()
            .filter_map(|a| match a {
                ClassifiedArg::Known {
                    flag,
                    value: Some(val),
                    inline: true,
                } => Some(vec![format!("{flag}={val}")]),
                ClassifiedArg::Known { flag, value, .. } => {
                    let mut v = vec![flag.clone()];
                    if let Some(val) = value {
                        v.push(val.clone());
                    }
                    Some(v)
                }
                ClassifiedArg::Unknown(s) => Some(vec![s.clone()]),
                ClassifiedArg::Positional(s) => Some(vec![s.clone()]),
                ClassifiedArg::Forced { .. } => None,
            })
            .flatten()
            .collect();
        Self { args }
    }

    /// Rewrite local-looking path tokens into their remote form.
    pub fn with_remote_paths(mut self, translator: Option<&PathTranslator>) -> Self {
        if let Some(translator) = translator {
            for arg in &mut self.args {
                if translator.is_local_path(arg) {
                    let remote = translator.local_to_remote(arg);
                    if remote != *arg {
                        tracing::debug!(local = %arg, remote = %remote, "translated argument path");
                    }
                    *arg = remote;
                }
            }
        }
        self
    }

    /// Append `--teamcity --colors=never`.
    pub fn with_forced_flags(mut self) -> Self {
        self.args.push(TEAMCITY_FLAG.into());
        self.args.push(NO_COLORS_FLAG.into());
        self
    }

    /// ParaTest cannot combine its parallel mode with `--filter`; switch it
    /// to functional mode when both apply.
    pub fn with_parallel_guard(mut self, entry: &str) -> Self {
        let filtered = self.args.iter().any(|a| a.contains("--filter"));
        if entry.contains("paratest") && filtered {
            self.args.push(PARATEST_FUNCTIONAL_FLAG.into());
        }
        self
    }

    /// Build the final argument list.
    pub fn build(self) -> Vec<String> {
        self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::flags::{classify, flag_registry};

    fn assemble(args: &[&str]) -> ArgAssembler {
        let raw: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        ArgAssembler::from_passthrough(&classify(&raw, &flag_registry()).args)
    }

    #[test]
    fn forced_flags_replace_caller_variants() {
        let args = assemble(&["--teamcity", "--colors=always", "--testdox", "tests"])
            .with_forced_flags()
            .build();
        assert_eq!(args, vec!["tests", "--teamcity", "--colors=never"]);
    }

    #[test]
    fn keeps_separate_and_inline_values() {
        let args = assemble(&["--filter", "testFoo", "--group=unit"]).build();
        assert_eq!(args, vec!["--filter", "testFoo", "--group=unit"]);
    }

    #[test]
    fn parallel_guard_only_for_paratest_with_filter() {
        let guarded = assemble(&["--filter", "testFoo"])
            .with_forced_flags()
            .with_parallel_guard("vendor/bin/paratest")
            .build();
        assert_eq!(guarded.last().map(String::as_str), Some("-f"));

        let unfiltered = assemble(&["tests"])
            .with_parallel_guard("vendor/bin/paratest")
            .build();
        assert!(!unfiltered.contains(&"-f".to_string()));

        let phpunit = assemble(&["--filter", "testFoo"])
            .with_parallel_guard("vendor/bin/phpunit")
            .build();
        assert!(!phpunit.contains(&"-f".to_string()));
    }
}

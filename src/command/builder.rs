//! Turns configuration plus ad hoc arguments into an executable command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::command::assembler::ArgAssembler;
use crate::command::flags::{classify, flag_registry};
use crate::config::{Capabilities, Config};
use crate::path::PathTranslator;
use crate::result::{ParsedResult, TestDetail};

/// Process options carried alongside the argument vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOptions {
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

/// A fully resolved invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub executable: String,
    pub arguments: Vec<String>,
    pub options: SpawnOptions,
}

impl CommandSpec {
    /// `executable arg1 arg2 ...`, as announced to `run` observers.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One logical PHPUnit command: configuration, caller arguments and the
/// path translator derived from them.
///
/// Reusable: [`TestCommand::apply`] and [`TestCommand::mapping`] take `&self`
/// and may be called from concurrent runs.
#[derive(Debug, Clone)]
pub struct TestCommand {
    config: Config,
    arguments: String,
    capabilities: Capabilities,
    translator: PathTranslator,
}

impl TestCommand {
    pub fn new(config: Config) -> Self {
        let capabilities = config.mode.capabilities();
        let workspace = config
            .cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let translator = if capabilities.translate_paths {
            PathTranslator::with_mapping(workspace, &config.paths)
        } else {
            PathTranslator::new(workspace)
        };
        Self {
            config,
            arguments: String::new(),
            capabilities,
            translator,
        }
    }

    /// Set the caller's free-form argument string (e.g. `--filter testFoo`).
    pub fn set_arguments(&mut self, args: &str) -> &mut Self {
        self.arguments = args.trim().to_string();
        self
    }

    pub fn with_arguments(mut self, args: &str) -> Self {
        self.set_arguments(args);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    /// Resolve the executable, argument vector and spawn options.
    ///
    /// Empty tokens are dropped and every token gets workspace-variable
    /// substitution. Missing configuration never fails here; an empty
    /// executable surfaces later as a spawn failure.
    pub fn apply(&self) -> CommandSpec {
        let mut tokens = self.base_command();
        tokens.extend(self.invocation());

        let mut tokens = tokens
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(|t| self.translator.substitute_workspace_variable(&t));

        let executable = tokens.next().unwrap_or_default();
        let arguments = tokens.collect();

        CommandSpec {
            executable,
            arguments,
            options: SpawnOptions {
                cwd: self.config.cwd.clone(),
                env: self.config.env.clone(),
            },
        }
    }

    /// Rewrite the path-bearing fields of a result from remote to local form.
    ///
    /// Results without `location_hint`, `file` or `details` come back unchanged.
    pub fn mapping(&self, mut result: ParsedResult) -> ParsedResult {
        if let ParsedResult::Test(test) = &mut result {
            let translator = &self.translator;
            test.location_hint = test
                .location_hint
                .as_deref()
                .map(|hint| translator.remote_to_local(hint));
            test.file = test.file.as_deref().map(|file| translator.remote_to_local(file));
            test.details = test.details.as_ref().map(|details| {
                details
                    .iter()
                    .map(|d| TestDetail {
                        file: translator.remote_to_local(&d.file),
                        line: d.line,
                    })
                    .collect()
            });
        }
        result
    }

    fn base_command(&self) -> Vec<String> {
        self.config
            .command
            .as_deref()
            .unwrap_or_default()
            .split(' ')
            .map(str::to_string)
            .collect()
    }

    fn entry_path(&self) -> &str {
        self.config.phpunit.as_deref().unwrap_or_default()
    }

    /// `[php, phpunit, args...]`, joined into one quoted token when the
    /// invocation passes through another shell.
    fn invocation(&self) -> Vec<String> {
        let mut invocation = vec![
            self.config.php.clone().unwrap_or_default(),
            self.entry_path().to_string(),
        ];
        invocation.extend(self.arguments());

        if !self.capabilities.wrap_invocation {
            return invocation;
        }

        let joined = invocation
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| quote_flag(t))
            .collect::<Vec<_>>()
            .join(" ");
        vec![joined]
    }

    fn arguments(&self) -> Vec<String> {
        let raw = tokenize(&self.merged_arguments());
        let classified = classify(&raw, &flag_registry());
        for warning in &classified.warnings {
            tracing::debug!(%warning, "dropped caller argument");
        }

        let translator = self.capabilities.translate_paths.then_some(&self.translator);
        ArgAssembler::from_passthrough(&classified.args)
            .with_remote_paths(translator)
            .with_forced_flags()
            .with_parallel_guard(self.entry_path())
            .build()
    }

    /// Caller arguments first, then the configured defaults.
    fn merged_arguments(&self) -> String {
        std::iter::once(self.arguments.as_str())
            .chain(self.config.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Split on whitespace outside quotes and strip the quotes.
///
/// Backslashes are literal (`Tests\Unit\FooTest`, `C:\proj`), so they are
/// doubled before the shell-style split undoes them. Unbalanced quotes fall
/// back to whitespace splitting.
fn tokenize(args: &str) -> Vec<String> {
    match shell_words::split(&escape_backslashes(args)) {
        Ok(tokens) => tokens,
        Err(err) => {
            tracing::debug!(error = %err, "argument string is not shell-quoted, splitting on whitespace");
            args.split_whitespace().map(str::to_string).collect()
        }
    }
}

/// Double every backslash outside single quotes, where the shell-style
/// splitter would treat it as an escape.
fn escape_backslashes(args: &str) -> String {
    let mut escaped = String::with_capacity(args.len());
    let mut single = false;
    let mut double = false;
    for c in args.chars() {
        match c {
            '\'' if !double => single = !single,
            '"' if !single => double = !double,
            '\\' if !single => escaped.push('\\'),
            _ => {}
        }
        escaped.push(c);
    }
    escaped
}

fn quote_flag(token: &str) -> String {
    if token.starts_with('-') {
        format!("'{token}'")
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::result::{TestCount, TestResult, TestResultKind};

    #[test]
    fn tokenize_honours_quotes() {
        assert_eq!(
            tokenize(r#"--filter "test Foo" tests"#),
            vec!["--filter", "test Foo", "tests"]
        );
    }

    #[test]
    fn tokenize_keeps_backslashes_literal() {
        assert_eq!(
            tokenize(r"--filter Tests\Unit\FooTest C:\proj\tests\FooTest.php"),
            vec!["--filter", r"Tests\Unit\FooTest", r"C:\proj\tests\FooTest.php"]
        );
        assert_eq!(
            tokenize(r#"--filter "Tests\Unit\Foo Test" 'C:\my proj\x.php'"#),
            vec!["--filter", r"Tests\Unit\Foo Test", r"C:\my proj\x.php"]
        );
    }

    #[test]
    fn tokenize_falls_back_on_unbalanced_quotes() {
        assert_eq!(tokenize("--filter 'oops"), vec!["--filter", "'oops"]);
    }

    #[test]
    fn quote_flag_only_quotes_dashes() {
        assert_eq!(quote_flag("--teamcity"), "'--teamcity'");
        assert_eq!(quote_flag("tests/Unit"), "tests/Unit");
    }

    #[test]
    fn command_line_joins_with_spaces() {
        let resolved = CommandSpec {
            executable: "php".into(),
            arguments: vec!["vendor/bin/phpunit".into(), "--teamcity".into()],
            options: SpawnOptions::default(),
        };
        assert_eq!(resolved.command_line(), "php vendor/bin/phpunit --teamcity");
    }

    #[test]
    fn mapping_leaves_summary_results_alone() {
        let mut config = Config {
            mode: ExecutionMode::Indirect,
            command: Some("docker exec app".into()),
            ..Config::default()
        };
        config.paths.insert("/home/dev/project", "/app");
        let command = TestCommand::new(config);

        let count = ParsedResult::Count(TestCount {
            count: 1,
            flow_id: None,
            text: "/app/".into(),
        });
        assert_eq!(command.mapping(count.clone()), count);

        let bare = ParsedResult::from(TestResult::new(TestResultKind::TestStarted, "testFoo"));
        assert_eq!(command.mapping(bare.clone()), bare);
    }
}

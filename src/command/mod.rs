//! Command construction for PHPUnit runs.
//!
//! ```text
//! Config + caller args → Tokenize → Classify → Assemble → CommandSpec
//! ```
//!
//! The output format flags are owned here: whatever the caller passes,
//! the final argument vector ends with `--teamcity --colors=never` so the
//! line classifier always sees machine-readable output.

mod assembler;
mod builder;
mod flags;

pub use assembler::{ArgAssembler, PARATEST_FUNCTIONAL_FLAG};
pub use builder::{CommandSpec, SpawnOptions, TestCommand};
pub use flags::{
    classify, flag_registry, ClassifiedArg, ClassifyResult, FlagArity, FlagBehavior, FlagDef,
    NO_COLORS_FLAG, TEAMCITY_FLAG,
};

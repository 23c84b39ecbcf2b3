//! Path translation between the caller's environment and the one PHPUnit runs in.

mod translator;

pub use translator::{PathMapping, PathTranslator};

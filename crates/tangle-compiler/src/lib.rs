//! TNGL source to bytecode.
//!
//! Compilation is a two-stage pipeline: [`tokenize`] splits the source into
//! classified tokens, then [`Compiler`] walks them and emits flag-tagged
//! bytecode terminated by `END_OF_TNGL_BYTES`.
//!
//! Token-level problems (unknown identifiers, bare numbers) never abort
//! compilation; they are collected as [`Diagnostic`]s and the offending
//! token contributes no bytes.

pub mod compiler;
pub mod config;
pub mod error;
pub mod keywords;
pub mod literal;
pub mod tokenizer;

pub use compiler::{compile, CompiledTngl, Compiler, Diagnostic, Severity};
pub use config::CompilerConfig;
pub use error::{CompileError, Result};
pub use tokenizer::{tokenize, Token, TokenKind};

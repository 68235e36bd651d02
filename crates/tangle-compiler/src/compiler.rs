use bytes::Bytes;
use serde::Serialize;
use tangle_frame::flags::tngl;
use tangle_frame::BufferWriter;
use tracing::{debug, error, warn};

use crate::config::CompilerConfig;
use crate::error::{CompileError, Result};
use crate::keywords;
use crate::literal;
use crate::tokenizer::{tokenize, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A token-level problem found during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Source text of the offending token.
    pub token: String,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

/// Output of a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledTngl {
    #[serde(serialize_with = "serialize_hex")]
    pub bytecode: Bytes,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledTngl {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

fn serialize_hex<S>(bytes: &Bytes, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    serializer.serialize_str(&hex)
}

/// TNGL compiler.
///
/// The bytecode buffer is allocated once and reused across compilations; the
/// cursor is rewound but old contents are not cleared.
#[derive(Debug)]
pub struct Compiler {
    writer: BufferWriter,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            writer: BufferWriter::new(config.max_bytecode_size),
            diagnostics: Vec::new(),
        }
    }

    /// Compile `source` into bytecode terminated by `END_OF_TNGL_BYTES`.
    ///
    /// Only running out of buffer space fails the call. Anything wrong with
    /// an individual token becomes a [`Diagnostic`] and the token emits no
    /// bytes.
    pub fn compile(&mut self, source: &str) -> Result<CompiledTngl> {
        self.writer.reset();
        self.diagnostics.clear();

        for token in tokenize(source) {
            self.compile_token(&token)?;
        }
        self.writer.write_flag(tngl::END_OF_TNGL_BYTES)?;

        debug!(
            bytes = self.writer.written(),
            diagnostics = self.diagnostics.len(),
            "compiled TNGL"
        );

        Ok(CompiledTngl {
            bytecode: self.writer.to_bytes(),
            diagnostics: std::mem::take(&mut self.diagnostics),
        })
    }

    fn compile_token(&mut self, token: &Token<'_>) -> Result<()> {
        let encoded = match token.kind {
            TokenKind::Timestamp => literal::compile_timestamp(&mut self.writer, token.text),
            TokenKind::Infinity => literal::compile_infinity(&mut self.writer, token.text),
            TokenKind::Color => literal::compile_color(&mut self.writer, token.text),
            TokenKind::Percentage => literal::compile_percentage(&mut self.writer, token.text),
            TokenKind::Label => literal::compile_label(&mut self.writer, token.text),
            TokenKind::Pixels => literal::compile_pixels(&mut self.writer, token.text),
            TokenKind::Byte => literal::compile_byte(&mut self.writer, token.text),
            TokenKind::Char => literal::compile_char(&mut self.writer, token.text),
            TokenKind::String => literal::compile_string(&mut self.writer, token.text),
            TokenKind::Identifier => {
                match keywords::lookup(token.text) {
                    Some(flag) => self.writer.write_flag(flag)?,
                    None => self.report(
                        Severity::Warning,
                        format!("unknown identifier '{}'", token.text),
                        token,
                    ),
                }
                Ok(())
            }
            TokenKind::Float | TokenKind::Integer => {
                self.report(
                    Severity::Error,
                    format!(
                        "bare number '{}' needs a unit (s, %, px, ...)",
                        token.text
                    ),
                    token,
                );
                Ok(())
            }
            TokenKind::Punctuation if token.text == "}" => {
                self.writer.write_flag(tngl::END_OF_STATEMENT)?;
                Ok(())
            }
            TokenKind::Unknown => {
                self.report(
                    Severity::Warning,
                    format!("unrecognized input '{}'", token.text),
                    token,
                );
                Ok(())
            }
            TokenKind::Comment
            | TokenKind::Whitespace
            | TokenKind::Punctuation
            | TokenKind::Arrow => Ok(()),
        };

        match encoded {
            Err(CompileError::InvalidLiteral { kind, text }) => {
                self.report(
                    Severity::Error,
                    format!("invalid {kind} literal '{text}'"),
                    token,
                );
                Ok(())
            }
            other => other,
        }
    }

    fn report(&mut self, severity: Severity, message: String, token: &Token<'_>) {
        match severity {
            Severity::Warning => warn!(offset = token.offset, token = token.text, "{message}"),
            Severity::Error => error!(offset = token.offset, token = token.text, "{message}"),
        }
        self.diagnostics.push(Diagnostic {
            severity,
            message,
            token: token.text.to_string(),
            offset: token.offset,
        });
    }
}

/// Compile `source` with a fresh default compiler.
pub fn compile(source: &str) -> Result<CompiledTngl> {
    Compiler::new().compile(source)
}

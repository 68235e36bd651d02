use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Token classes, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Comment,
    Color,
    Infinity,
    String,
    Timestamp,
    Label,
    Char,
    Byte,
    Pixels,
    Percentage,
    Float,
    Integer,
    Arrow,
    Identifier,
    Whitespace,
    Punctuation,
    /// Text no pattern claimed.
    Unknown,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Color => "color",
            Self::Infinity => "infinity",
            Self::String => "string",
            Self::Timestamp => "timestamp",
            Self::Label => "label",
            Self::Char => "char",
            Self::Byte => "byte",
            Self::Pixels => "pixels",
            Self::Percentage => "percentage",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Arrow => "arrow",
            Self::Identifier => "identifier",
            Self::Whitespace => "whitespace",
            Self::Punctuation => "punctuation",
            Self::Unknown => "unknown",
        }
    }
}

/// A classified slice of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

static PATTERNS: LazyLock<Vec<(TokenKind, Regex)>> = LazyLock::new(|| {
    [
        (TokenKind::Comment, r"//[^\n]*|/\*(?s:.*?)\*/"),
        (TokenKind::Color, r"#[0-9a-fA-F]{6}\b"),
        (TokenKind::Infinity, r"[+-]?Infinity\b"),
        (TokenKind::String, r#""[^"\n]*""#),
        (
            TokenKind::Timestamp,
            r"(?:[+-]?(?:\d+\.\d+|\d+|\.\d+)[dhmst])+\b",
        ),
        (TokenKind::Label, r"\$\w+"),
        (TokenKind::Char, r"'.'"),
        (TokenKind::Byte, r"0x[0-9a-fA-F]{2}\b"),
        (TokenKind::Pixels, r"[+-]?\d+px\b"),
        (TokenKind::Percentage, r"[+-]?\d+(?:\.\d+)?%"),
        (TokenKind::Float, r"[+-]?\d+\.\d+"),
        (TokenKind::Integer, r"[+-]?\d+"),
        (TokenKind::Arrow, r"->"),
        (TokenKind::Identifier, r"[A-Za-z_]\w*"),
        (TokenKind::Whitespace, r"\s+"),
        (TokenKind::Punctuation, r"[^\w\s]"),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let regex = Regex::new(pattern).unwrap_or_else(|err| panic!("bad {kind:?} pattern: {err}"));
        (kind, regex)
    })
    .collect()
});

/// Split `source` into tokens.
///
/// At each step the match starting earliest in the remaining text wins; ties
/// go to the pattern listed first in [`TokenKind`]. Text before the winning
/// match becomes an [`TokenKind::Unknown`] token, so every byte of the input
/// ends up in exactly one token.
///
/// Each pattern's next match is cached and only searched again once the
/// cursor moves past its start, so the source is scanned a bounded number of
/// times per pattern rather than once per token.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut next: Vec<Option<(usize, usize)>> = PATTERNS
        .iter()
        .map(|(_, regex)| find_from(regex, source, 0))
        .collect();

    while pos < source.len() {
        let mut best: Option<(TokenKind, usize, usize)> = None;

        for ((kind, regex), cached) in PATTERNS.iter().zip(next.iter_mut()) {
            // no match from an earlier cursor means no match from this one
            if cached.is_some_and(|(start, _)| start < pos) {
                *cached = find_from(regex, source, pos);
            }
            let Some((start, end)) = *cached else {
                continue;
            };
            if best.is_none_or(|(_, best_start, _)| start < best_start) {
                best = Some((*kind, start, end));
            }
        }

        let Some((kind, start, end)) = best else {
            tokens.push(Token {
                kind: TokenKind::Unknown,
                text: &source[pos..],
                offset: pos,
            });
            break;
        };

        if start > pos {
            tokens.push(Token {
                kind: TokenKind::Unknown,
                text: &source[pos..start],
                offset: pos,
            });
        }
        tokens.push(Token {
            kind,
            text: &source[start..end],
            offset: start,
        });
        pos = end;
    }

    tokens
}

/// Leftmost non-empty match at or after `pos`, searched with the full source
/// as context.
fn find_from(regex: &Regex, source: &str, pos: usize) -> Option<(usize, usize)> {
    regex
        .find_at(source, pos)
        .filter(|m| !m.is_empty())
        .map(|m| (m.start(), m.end()))
}

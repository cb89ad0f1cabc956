//! Delimiter Matcher
//!
//! Balanced-pair matching on top of the [`Scanner`]. The matcher assumes the
//! opener has already been consumed (the scanner's current token) and walks
//! forward until the depth returns to zero.

use crate::scanner::{Scanner, SyntaxKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Byte range inside a scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub length: usize,
}

impl TextSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Advance to the next token of kind `kind`, if any.
/// Returns false when the end of input is reached first.
pub fn find(kind: SyntaxKind, scanner: &mut Scanner<'_>) -> bool {
    loop {
        let token = scanner.advance();
        if token == kind {
            return true;
        }
        if token == SyntaxKind::EndOfFile {
            return false;
        }
    }
}

/// Match the `open`/`close` pair whose opener is the scanner's current token.
///
/// The returned span starts just after the opener and ends just after the
/// matching closer. With `reset_on_return` the whole walk runs as a lookahead
/// and the cursor stays on the opener; otherwise the cursor is left on the
/// closer so the caller can keep scanning past the block.
///
/// Running out of input, or meeting a token the lexer could not classify,
/// yields `None`.
pub fn delimited(
    open: SyntaxKind,
    close: SyntaxKind,
    scanner: &mut Scanner<'_>,
    reset_on_return: bool,
) -> Option<TextSpan> {
    if reset_on_return {
        scanner.look_ahead(|scanner| span(open, close, scanner))
    } else {
        span(open, close, scanner)
    }
}

fn span(open: SyntaxKind, close: SyntaxKind, scanner: &mut Scanner<'_>) -> Option<TextSpan> {
    let start = scanner.token_end();
    let mut depth = 1usize;

    while depth != 0 {
        match scanner.advance() {
            token if token == open => depth += 1,
            token if token == close => depth -= 1,
            SyntaxKind::EndOfFile => {
                debug!(target: "odoo", depth, "input ended before the block closed");
                return None;
            }
            SyntaxKind::Unknown => {
                warn!(
                    target: "odoo",
                    token = scanner.token_text(),
                    offset = scanner.token_pos(),
                    "unexpected token while matching delimiters"
                );
                return None;
            }
            _ => {}
        }
    }

    Some(TextSpan::new(start, scanner.token_end() - start))
}

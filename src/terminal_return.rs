//! Terminal-Return Locator
//!
//! Finds the `return` that produces a classic module's value: the last
//! top-level `return <expr>` inside the first balanced `{ ... }` block of the
//! text, which for `odoo.define(name, function (require) { ... })` is the
//! factory body. Returns inside nested blocks are skipped wholesale.

use crate::delimited::{delimited, find};
use crate::scanner::{Scanner, SyntaxKind};
use tracing::debug;

/// Length of the `return` keyword in bytes.
pub const RETURN_KEYWORD_LEN: usize = "return".len();

/// Byte offset of the terminal `return` keyword in `file`, if there is one.
///
/// A bare `return;` at the top level means the factory exports nothing
/// usable, and the search gives up.
pub fn find_final_return(file: &str) -> Option<usize> {
    let mut scanner = Scanner::new(file);
    if !find(SyntaxKind::OpenBrace, &mut scanner) {
        return None;
    }
    let body = delimited(SyntaxKind::OpenBrace, SyntaxKind::CloseBrace, &mut scanner, true)?;

    // Interior only, without the closing brace.
    let offset = body.start;
    let contents = &file[offset..body.end() - 1];

    let mut scanner = Scanner::new(contents);
    let mut previous = SyntaxKind::EndOfFile;
    let mut found = None;
    loop {
        let token = scanner.advance();
        match token {
            SyntaxKind::ReturnKeyword if previous != SyntaxKind::Dot => {
                if scanner.peek_ahead(SyntaxKind::Semicolon, 1)
                    || scanner.peek_ahead(SyntaxKind::EndOfFile, 1)
                {
                    debug!(target: "odoo", offset = offset + scanner.token_pos(), "bare return in module body");
                    return None;
                }
                found = Some(offset + scanner.token_pos());
            }
            SyntaxKind::OpenBrace => {
                delimited(SyntaxKind::OpenBrace, SyntaxKind::CloseBrace, &mut scanner, false)?;
            }
            SyntaxKind::EndOfFile => return found,
            _ => {}
        }
        previous = token;
    }
}

//! Scanner Module
//!
//! A dumb token cursor over a script buffer. It knows nothing about nesting
//! or statements; callers drive it one token at a time and probe ahead with
//! [`Scanner::look_ahead`], which always restores the committed position.

use logos::Logos;
use std::ops::Range;

/// Raw lexemes produced by logos. Trivia (whitespace, BOM and comments) is skipped.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[\p{White_Space}\u{FEFF}]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum LexToken {
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=>")]
    Arrow,
    #[token("return")]
    Return,

    #[regex(r"[\p{XID_Start}_$][\p{XID_Continue}$]*")]
    Identifier,

    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,

    #[regex(r#""([^"\\\n]|\\[\s\S])*""#)]
    #[regex(r"'([^'\\\n]|\\[\s\S])*'")]
    String,

    // Interpolations stay inside the literal so their braces never reach the matcher.
    #[regex(r"`([^`\\]|\\[\s\S])*`")]
    Template,

    // A quote that opens no literal on its line (regex bodies such as `/'/g`)
    // and a stray backslash are plain punctuation.
    #[regex(r"[=!<>+\-*/%&|^~?:@#]")]
    #[regex(r#"['"`\\]"#)]
    Punctuation,
}

/// Token kinds reported by the [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Comma,
    Dot,
    Arrow,
    ReturnKeyword,
    Identifier,
    NumericLiteral,
    StringLiteral,
    TemplateLiteral,
    Punctuation,
    /// Input the lexer could not classify (control characters, stray symbols).
    Unknown,
    EndOfFile,
}

impl From<LexToken> for SyntaxKind {
    fn from(token: LexToken) -> Self {
        match token {
            LexToken::OpenBrace => SyntaxKind::OpenBrace,
            LexToken::CloseBrace => SyntaxKind::CloseBrace,
            LexToken::OpenParen => SyntaxKind::OpenParen,
            LexToken::CloseParen => SyntaxKind::CloseParen,
            LexToken::OpenBracket => SyntaxKind::OpenBracket,
            LexToken::CloseBracket => SyntaxKind::CloseBracket,
            LexToken::Semicolon => SyntaxKind::Semicolon,
            LexToken::Comma => SyntaxKind::Comma,
            LexToken::Dot => SyntaxKind::Dot,
            LexToken::Arrow => SyntaxKind::Arrow,
            LexToken::Return => SyntaxKind::ReturnKeyword,
            LexToken::Identifier => SyntaxKind::Identifier,
            LexToken::Number => SyntaxKind::NumericLiteral,
            LexToken::String => SyntaxKind::StringLiteral,
            LexToken::Template => SyntaxKind::TemplateLiteral,
            LexToken::Punctuation => SyntaxKind::Punctuation,
        }
    }
}

/// Committed cursor state over a single buffer.
pub struct Scanner<'src> {
    lexer: logos::Lexer<'src, LexToken>,
    token: SyntaxKind,
    span: Range<usize>,
}

impl<'src> Scanner<'src> {
    /// Creates a scanner positioned before the first token of `text`.
    pub fn new(text: &'src str) -> Self {
        Self {
            lexer: LexToken::lexer(text),
            token: SyntaxKind::Unknown,
            span: 0..0,
        }
    }

    /// Moves to the next token and returns its kind.
    pub fn advance(&mut self) -> SyntaxKind {
        self.token = match self.lexer.next() {
            Some(Ok(token)) => {
                self.span = self.lexer.span();
                token.into()
            }
            Some(Err(())) => {
                self.span = self.lexer.span();
                SyntaxKind::Unknown
            }
            None => {
                let end = self.lexer.source().len();
                self.span = end..end;
                SyntaxKind::EndOfFile
            }
        };
        self.token
    }

    /// Runs `probe` against the scanner and then restores the committed state,
    /// however far the probe advanced.
    pub fn look_ahead<T>(&mut self, probe: impl FnOnce(&mut Self) -> T) -> T {
        let lexer = self.lexer.clone();
        let token = self.token;
        let span = self.span.clone();

        let result = probe(self);

        self.lexer = lexer;
        self.token = token;
        self.span = span;
        result
    }

    /// True when the `count`-th token after the current one has kind `kind`.
    /// The committed cursor is left untouched.
    pub fn peek_ahead(&mut self, kind: SyntaxKind, count: usize) -> bool {
        self.look_ahead(|scanner| {
            let mut token = scanner.token;
            for _ in 0..count {
                token = scanner.advance();
            }
            token == kind
        })
    }

    /// Kind of the current token.
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Byte offset where the current token starts.
    pub fn token_pos(&self) -> usize {
        self.span.start
    }

    /// Byte offset just past the current token.
    pub fn token_end(&self) -> usize {
        self.span.end
    }

    /// Raw lexeme of the current token.
    pub fn token_text(&self) -> &'src str {
        &self.lexer.source()[self.span.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        let mut scanner = Scanner::new(text);
        let mut out = Vec::new();
        loop {
            let kind = scanner.advance();
            if kind == SyntaxKind::EndOfFile {
                break;
            }
            out.push(kind);
        }
        out
    }

    #[test]
    fn test_skips_trivia_and_keeps_literals_whole() {
        let text = "// head\nfoo(\"{\", '}', `${a}`) /* { */ { return x; }";
        assert_eq!(
            kinds(text),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::OpenParen,
                SyntaxKind::StringLiteral,
                SyntaxKind::Comma,
                SyntaxKind::StringLiteral,
                SyntaxKind::Comma,
                SyntaxKind::TemplateLiteral,
                SyntaxKind::CloseParen,
                SyntaxKind::OpenBrace,
                SyntaxKind::ReturnKeyword,
                SyntaxKind::Identifier,
                SyntaxKind::Semicolon,
                SyntaxKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_return_prefix_is_an_identifier() {
        assert_eq!(kinds("returned"), vec![SyntaxKind::Identifier]);
        assert_eq!(
            kinds("(a) => b"),
            vec![
                SyntaxKind::OpenParen,
                SyntaxKind::Identifier,
                SyntaxKind::CloseParen,
                SyntaxKind::Arrow,
                SyntaxKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_peek_ahead_does_not_commit() {
        let mut scanner = Scanner::new("return ; x");
        assert_eq!(scanner.advance(), SyntaxKind::ReturnKeyword);
        assert!(scanner.peek_ahead(SyntaxKind::Semicolon, 1));
        assert!(scanner.peek_ahead(SyntaxKind::Identifier, 2));
        assert!(scanner.peek_ahead(SyntaxKind::EndOfFile, 3));
        assert_eq!(scanner.token(), SyntaxKind::ReturnKeyword);
        assert_eq!(scanner.token_pos(), 0);
        assert_eq!(scanner.token_text(), "return");
        assert_eq!(scanner.advance(), SyntaxKind::Semicolon);
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let mut scanner = Scanner::new("  {  }");
        scanner.advance();
        assert_eq!(scanner.token_pos(), 2);
        assert_eq!(scanner.token_end(), 3);
        scanner.advance();
        assert_eq!(scanner.token_pos(), 5);
        assert_eq!(scanner.advance(), SyntaxKind::EndOfFile);
        assert_eq!(scanner.token_pos(), 6);
    }

    #[test]
    fn test_unterminated_quote_is_punctuation() {
        assert_eq!(
            kinds("\"abc\nx"),
            vec![SyntaxKind::Punctuation, SyntaxKind::Identifier, SyntaxKind::Identifier]
        );
        assert_eq!(
            kinds("x.replace(/'/g, '')"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::Dot,
                SyntaxKind::Identifier,
                SyntaxKind::OpenParen,
                SyntaxKind::Punctuation,
                SyntaxKind::StringLiteral,
                SyntaxKind::Punctuation,
                SyntaxKind::CloseParen,
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers_and_whitespace() {
        assert_eq!(
            kinds("\u{FEFF}var caf\u{e9}\u{a0}= \u{3b1}\u{3b2};"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::Identifier,
                SyntaxKind::Punctuation,
                SyntaxKind::Identifier,
                SyntaxKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_control_character_is_unknown() {
        let mut scanner = Scanner::new("\u{1}");
        assert_eq!(scanner.advance(), SyntaxKind::Unknown);
    }
}

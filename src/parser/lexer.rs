use super::Span;
use crate::{Error, Result};
use std::iter::FusedIterator;

const KEYWORDS: &[&str] = &[
    "typedef",
    "enum",
    "union",
    "class",
    "struct",
    "public",
    "protected",
    "private",
    "namespace",
    "template",
    "extern",
    "static",
    "inline",
    "const",
    "volatile",
];

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `/* ... */`; `doc` is set for `/**` and `/*!`
    BlockComment { doc: bool },
    /// `// ...` up to the end of the line; `doc` is set for `///` and `//!`
    LineComment { doc: bool },
    /// A reserved word or a preprocessor directive such as `#define`
    Keyword,
    Identifier,
    Punctuation,
    /// Number, string or character literal
    Literal,
    Newline,
}

/// A single token with its kind, text and source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::BlockComment { .. } | TokenKind::LineComment { .. }
        )
    }

    pub fn is_doc_comment(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::BlockComment { doc: true } | TokenKind::LineComment { doc: true }
        )
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

/// Lazy tokenizer over a source buffer.
///
/// Whitespace other than newlines is skipped. After the first error the lexer is
/// exhausted.
///
/// # Examples
///
/// ```
/// use doxycheck::{tokenize, TokenKind};
///
/// let kinds: Vec<TokenKind> = tokenize("/// doc\nint x;")
///     .map(|t| t.unwrap().kind)
///     .collect();
/// assert_eq!(kinds[0], TokenKind::LineComment { doc: true });
/// assert_eq!(kinds[1], TokenKind::Newline);
/// assert_eq!(kinds[2], TokenKind::Identifier);
/// ```
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line_start: bool,
    failed: bool,
}

/// Start tokenizing `source`. Calling it again restarts from the beginning.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer {
        source,
        pos: 0,
        line_start: true,
        failed: false,
    }
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token<'a> {
        self.line_start = kind == TokenKind::Newline;
        Token {
            kind,
            text: &self.source[start..self.pos],
            span: Span {
                start,
                end: self.pos,
            },
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            let rest = self.rest();
            if rest.starts_with("\\\n") {
                self.pos += 2;
            } else if rest.starts_with("\\\r\n") {
                self.pos += 3;
            } else if let Some(c) = rest
                .chars()
                .next()
                .filter(|c| *c != '\n' && c.is_whitespace())
            {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        let len = self
            .rest()
            .find(|c: char| !pred(c))
            .unwrap_or(self.rest().len());
        self.pos += len;
    }

    fn block_comment(&mut self, start: usize) -> Result<Token<'a>> {
        let body = &self.source[start + 2..];
        let Some(close) = body.find("*/") else {
            self.failed = true;
            return Err(Error::UnterminatedComment { offset: start });
        };
        self.pos = start + 2 + close + 2;
        // `/**/` is an empty plain comment
        let doc = (body.starts_with('*') || body.starts_with('!')) && close > 0;
        Ok(self.token(TokenKind::BlockComment { doc }, start))
    }

    fn line_comment(&mut self, start: usize) -> Token<'a> {
        let text = self.rest();
        let doc = (text.starts_with("///") && !text.starts_with("////"))
            || text.starts_with("//!");
        self.eat_while(|c| c != '\n');
        if self.source[start..self.pos].ends_with('\r') {
            self.pos -= 1;
        }
        self.token(TokenKind::LineComment { doc }, start)
    }

    fn quoted(&mut self, start: usize, quote: char) -> Token<'a> {
        self.pos += 1;
        let mut escaped = false;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += c.len_utf8();
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                break;
            }
        }
        self.token(TokenKind::Literal, start)
    }

    fn number(&mut self, start: usize) -> Token<'a> {
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-') && matches!(prev, 'e' | 'E' | 'p' | 'P');
            if !(c.is_ascii_alphanumeric() || c == '.' || c == '\'' || exponent_sign) {
                break;
            }
            // a hex digit `e` is not an exponent
            let seen = &self.source[start..self.pos];
            let hex = seen.starts_with("0x") || seen.starts_with("0X");
            prev = if hex && matches!(c, 'e' | 'E') {
                '\0'
            } else {
                c
            };
            self.pos += 1;
        }
        self.token(TokenKind::Literal, start)
    }

    fn word(&mut self, start: usize) -> Token<'a> {
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let kind = if KEYWORDS.contains(&&self.source[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.token(kind, start)
    }

    fn directive(&mut self, start: usize) -> Token<'a> {
        self.pos += 1;
        self.eat_while(|c| c == ' ' || c == '\t');
        let name_start = self.pos;
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if self.pos == name_start {
            return self.token(TokenKind::Punctuation, start);
        }
        self.token(TokenKind::Keyword, start)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_whitespace();
        let start = self.pos;
        let rest = self.rest();
        let c = rest.chars().next()?;

        let token = match c {
            '\n' => {
                self.pos += 1;
                self.token(TokenKind::Newline, start)
            }
            '/' if rest.starts_with("/*") => return Some(self.block_comment(start)),
            '/' if rest.starts_with("//") => self.line_comment(start),
            '#' if self.line_start => self.directive(start),
            '"' | '\'' => self.quoted(start, c),
            '0'..='9' => self.number(start),
            '.' if rest[1..].starts_with(|d: char| d.is_ascii_digit()) => self.number(start),
            c if c.is_ascii_alphabetic() || c == '_' => self.word(start),
            ':' if rest.starts_with("::") => {
                self.pos += 2;
                self.token(TokenKind::Punctuation, start)
            }
            c => {
                self.pos += c.len_utf8();
                self.token(TokenKind::Punctuation, start)
            }
        };
        Some(Ok(token))
    }
}

impl FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .map(|t| t.unwrap())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_comment_markers() {
        let tokens = lex("/** doc */ /* plain */ /*! qt */ /**/ /// line\n// plain\n//! qt\n//// rule");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::BlockComment { doc: true }, "/** doc */"),
                (TokenKind::BlockComment { doc: false }, "/* plain */"),
                (TokenKind::BlockComment { doc: true }, "/*! qt */"),
                (TokenKind::BlockComment { doc: false }, "/**/"),
                (TokenKind::LineComment { doc: true }, "/// line"),
                (TokenKind::Newline, "\n"),
                (TokenKind::LineComment { doc: false }, "// plain"),
                (TokenKind::Newline, "\n"),
                (TokenKind::LineComment { doc: true }, "//! qt"),
                (TokenKind::Newline, "\n"),
                (TokenKind::LineComment { doc: false }, "//// rule"),
            ]
        );
    }

    #[test]
    fn test_block_comment_does_not_nest() {
        let tokens = lex("/* a /* b */ c */");
        assert_eq!(tokens[0], (TokenKind::BlockComment { doc: false }, "/* a /* b */"));
        assert_eq!(tokens[1], (TokenKind::Identifier, "c"));
        assert_eq!(tokens[2], (TokenKind::Punctuation, "*"));
        assert_eq!(tokens[3], (TokenKind::Punctuation, "/"));
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = tokenize("int x; /* open");
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_ok());
        let err = lexer.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::UnterminatedComment { offset: 7 }));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_directives_and_keywords() {
        let tokens = lex("#define A 0xABCD\n  # include <x.h>\nx # y");
        assert_eq!(tokens[0], (TokenKind::Keyword, "#define"));
        assert_eq!(tokens[1], (TokenKind::Identifier, "A"));
        assert_eq!(tokens[2], (TokenKind::Literal, "0xABCD"));
        assert_eq!(tokens[4], (TokenKind::Keyword, "# include"));
        // `#` in the middle of a line is not a directive
        assert!(tokens.contains(&(TokenKind::Punctuation, "#")));

        let tokens = lex("typedef enum seasons");
        assert!(tokens.iter().take(2).all(|(kind, _)| *kind == TokenKind::Keyword));
        assert_eq!(tokens[2].0, TokenKind::Identifier);
    }

    #[test]
    fn test_literals() {
        let tokens = lex(r#"1.5e-3 0x1e+2 'a' "str \" ing" 10u"#);
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Literal, "1.5e-3"),
                (TokenKind::Literal, "0x1e"),
                (TokenKind::Punctuation, "+"),
                (TokenKind::Literal, "2"),
                (TokenKind::Literal, "'a'"),
                (TokenKind::Literal, r#""str \" ing""#),
                (TokenKind::Literal, "10u"),
            ]
        );
    }

    #[test]
    fn test_upper_case_hex_digit_is_not_an_exponent() {
        let tokens = lex("0X1E+2");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Literal, "0X1E"),
                (TokenKind::Punctuation, "+"),
                (TokenKind::Literal, "2"),
            ]
        );
    }

    #[test]
    fn test_line_continuation_is_whitespace() {
        let tokens = lex("#define X \\\n  1\nY");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "#define"),
                (TokenKind::Identifier, "X"),
                (TokenKind::Literal, "1"),
                (TokenKind::Newline, "\n"),
                (TokenKind::Identifier, "Y"),
            ]
        );
    }

    #[test]
    fn test_spans_and_scope_operator() {
        let tokens: Vec<Token> = tokenize("a::b").map(|t| t.unwrap()).collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text, "::");
        assert_eq!(tokens[2].span, Span { start: 3, end: 4 });
    }

    #[test]
    fn test_restartable() {
        let source = "int a; // c\n";
        let first: Vec<_> = tokenize(source).map(|t| t.unwrap()).collect();
        let second: Vec<_> = tokenize(source).map(|t| t.unwrap()).collect();
        assert_eq!(first, second);
    }
}

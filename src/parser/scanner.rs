use super::{Access, Declaration, DeclarationKind, Member, Span, Token, TokenKind};
use tracing::trace;

/// Locate the declarations in a token sequence.
///
/// Comment tokens are ignored. Anything that does not look like a define, typedef,
/// enum, union, class, struct or function is skipped; scanning never fails.
///
/// # Examples
///
/// ```
/// use doxycheck::{scan, tokenize, DeclarationKind};
///
/// let source = "enum seasons { spring = 3, summer };\nint area(int w);";
/// let tokens: Vec<_> = tokenize(source).collect::<Result<_, _>>().unwrap();
/// let declarations = scan(source, &tokens);
///
/// assert_eq!(declarations[0].kind, DeclarationKind::Enum);
/// assert_eq!(declarations[0].members[1].value, Some(4));
/// assert_eq!(declarations[1].kind, DeclarationKind::Function);
/// assert_eq!(declarations[1].text, "int area(int w)");
/// ```
pub fn scan(source: &str, tokens: &[Token]) -> Vec<Declaration> {
    let mut scanner = Scanner {
        source,
        tokens: tokens.iter().filter(|t| !t.is_comment()).copied().collect(),
        pos: 0,
        pending_start: None,
    };

    let mut declarations = Vec::new();
    while scanner.peek().is_some() {
        let mark = scanner.pos;
        if let Some(declaration) = scanner.declaration() {
            trace!(kind = ?declaration.kind, name = %declaration.name, "declaration");
            declarations.push(declaration);
        } else if scanner.pos == mark {
            scanner.pos += 1;
        }
    }
    declarations
}

struct Scanner<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Start of a `template<...>` or `extern "C"` prefix owned by the next declaration
    pending_start: Option<usize>,
}

impl<'a> Scanner<'a> {
    fn peek_nth(&self, n: usize) -> Option<Token<'a>> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .nth(n)
            .copied()
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.peek_nth(0)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            if token.kind != TokenKind::Newline {
                return Some(*token);
            }
        }
        None
    }

    fn eat(&mut self, text: &str) -> Option<Token<'a>> {
        if self.peek()?.is(text) {
            self.next()
        } else {
            None
        }
    }

    /// Consume the rest of the current line, including the newline.
    fn rest_of_line(&mut self) -> Vec<Token<'a>> {
        let mut line = Vec::new();
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            if token.kind == TokenKind::Newline {
                break;
            }
            line.push(*token);
        }
        line
    }

    /// Collect tokens until one of `stops` appears outside any bracket pair.
    ///
    /// The stop token is consumed and returned. An unbalanced closing bracket or a
    /// preprocessor directive outside brackets ends the collection without being
    /// consumed.
    fn collect_until(&mut self, stops: &[&str]) -> (Vec<Token<'a>>, Option<Token<'a>>) {
        let mut collected = Vec::new();
        let mut depth = 0usize;
        loop {
            let mark = self.pos;
            let Some(token) = self.next() else {
                return (collected, None);
            };
            if depth == 0 && stops.contains(&token.text) {
                return (collected, Some(token));
            }
            if depth == 0 && is_directive(&token) {
                self.pos = mark;
                return (collected, None);
            }
            match token.text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" if depth == 0 => {
                    self.pos = mark;
                    return (collected, None);
                }
                ")" | "]" | "}" => depth -= 1,
                _ => {}
            }
            collected.push(token);
        }
    }

    /// Skip to the brace matching an already consumed `{` and return it.
    fn skip_braces(&mut self) -> Option<Token<'a>> {
        loop {
            match self.collect_until(&["}"]) {
                (_, Some(close)) => return Some(close),
                _ if self.at_directive() => self.skip_directive(),
                _ => return None,
            }
        }
    }

    fn at_directive(&self) -> bool {
        self.peek().is_some_and(|t| is_directive(&t))
    }

    /// Consume the next directive line, continuation lines included.
    fn skip_directive(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.kind == TokenKind::Newline)
        {
            self.pos += 1;
        }
        let line = self.rest_of_line();
        trace!(directive = ?line.first().map(|t| t.text), "skipped directive");
    }

    /// Skip to the `>` matching an already consumed `<`.
    fn skip_angles(&mut self) {
        let mut depth = 1usize;
        while let Some(token) = self.next() {
            match token.text {
                "<" => depth += 1,
                ">" => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn declaration(&mut self) -> Option<Declaration> {
        let token = self.peek()?;
        if is_directive(&token) {
            self.pending_start = None;
            return self.directive();
        }

        let start = self.pending_start.take().unwrap_or(token.span.start);
        match token.text {
            "typedef" => self.typedef(start),
            "enum" => self.enumeration(start),
            "union" | "class" | "struct" => self.compound(start),
            "namespace" => {
                // step into the namespace body
                self.next();
                self.collect_until(&["{", ";"]);
                None
            }
            "extern" if self.peek_nth(1)?.kind == TokenKind::Literal => {
                self.next();
                self.next();
                if self.eat("{").is_none() {
                    self.pending_start = Some(start);
                }
                None
            }
            "template" => {
                self.next();
                if self.eat("<").is_some() {
                    self.skip_angles();
                }
                self.pending_start = Some(start);
                None
            }
            "{" => {
                self.next();
                self.skip_braces();
                None
            }
            _ if matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword) => {
                self.function(start)
            }
            _ => {
                trace!(token = token.text, offset = token.span.start, "skipped token");
                self.next();
                None
            }
        }
    }

    fn directive(&mut self) -> Option<Declaration> {
        let hash = self.next()?;
        if hash.text[1..].trim_start() != "define" {
            self.rest_of_line();
            return None;
        }

        let name = match self.tokens.get(self.pos) {
            Some(t) if matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword) => *t,
            _ => {
                self.rest_of_line();
                return None;
            }
        };
        self.pos += 1;
        let line = self.rest_of_line();
        let end = line.last().map_or(name.span.end, |t| t.span.end);

        Some(Declaration {
            kind: DeclarationKind::Define,
            name: name.text.to_string(),
            span: Span {
                start: hash.span.start,
                end,
            },
            text: squash(&self.source[name.span.end..end]),
            members: Vec::new(),
        })
    }

    fn typedef(&mut self, start: usize) -> Option<Declaration> {
        self.next()?;
        let head_start = self.peek()?.span.start;
        let mut members = Vec::new();
        let mut head_end = None;

        let mark = self.pos;
        if let Some(tag) = self
            .peek()
            .filter(|t| matches!(t.text, "enum" | "struct" | "union" | "class"))
        {
            self.next();
            match self.collect_until(&["{", ";", "("]) {
                (_, Some(brace)) if brace.is("{") => {
                    members = match tag.text {
                        "enum" => self.enumerators(),
                        "union" => self.fields(None),
                        "class" => self.fields(Some(Access::Private)),
                        _ => self.fields(Some(Access::Public)),
                    };
                    head_end = Some(brace.span.start);
                }
                _ => self.pos = mark,
            }
        }

        let (declarator, semicolon) = self.collect_until(&[";"]);
        let (name, pointer) = declarator_name(&declarator)?;
        let end = semicolon
            .or(declarator.last().copied())
            .map_or(name.span.end, |t| t.span.end);

        let text_end = match head_end {
            Some(brace) => brace,
            None if pointer => declarator.last().map_or(name.span.end, |t| t.span.end),
            None => name.span.start,
        };

        Some(Declaration {
            kind: DeclarationKind::Typedef,
            name: name.text.to_string(),
            span: Span { start, end },
            text: squash(&self.source[head_start..text_end]),
            members,
        })
    }

    fn enumeration(&mut self, start: usize) -> Option<Declaration> {
        let mark = self.pos;
        let keyword = self.next()?;
        let (head, stop) = self.collect_until(&["{", ";", "("]);
        let brace = match stop {
            Some(brace) if brace.is("{") && !head.iter().any(|t| t.is("=")) => brace,
            _ => {
                self.pos = mark;
                return self.function(start);
            }
        };

        let name = head
            .iter()
            .take_while(|t| !t.is(":"))
            .filter(|t| t.kind == TokenKind::Identifier)
            .last()
            .map_or_else(anonymous, |t| t.text.to_string());
        let members = self.enumerators();
        let end = self.finish_declarators();

        Some(Declaration {
            kind: DeclarationKind::Enum,
            name,
            span: Span { start, end },
            text: squash(&self.source[keyword.span.start..brace.span.start]),
            members,
        })
    }

    fn compound(&mut self, start: usize) -> Option<Declaration> {
        let mark = self.pos;
        let keyword = self.next()?;
        let (head, stop) = self.collect_until(&["{", ";", "("]);
        let brace = match stop {
            Some(brace) if brace.is("{") && !head.iter().any(|t| t.is("=")) => brace,
            _ => {
                self.pos = mark;
                return self.function(start);
            }
        };

        let (kind, access) = match keyword.text {
            "union" => (DeclarationKind::Union, None),
            "class" => (DeclarationKind::Class, Some(Access::Private)),
            _ => (DeclarationKind::Struct, Some(Access::Public)),
        };
        let name = head
            .iter()
            .take_while(|t| !t.is(":"))
            .filter(|t| t.kind == TokenKind::Identifier && !t.is("final"))
            .last()
            .map_or_else(anonymous, |t| t.text.to_string());
        let members = self.fields(access);
        let end = self.finish_declarators();

        Some(Declaration {
            kind,
            name,
            span: Span { start, end },
            text: squash(&self.source[keyword.span.start..brace.span.start]),
            members,
        })
    }

    /// Consume what follows a closing `}`: declarators and the final `;`.
    fn finish_declarators(&mut self) -> usize {
        let closing = self.pos.checked_sub(1).and_then(|i| self.tokens.get(i));
        let closing_end = closing.map_or(self.source.len(), |t| t.span.end);
        match self.peek() {
            Some(t) if t.is(";") => {
                self.next();
                t.span.end
            }
            Some(t) if t.kind == TokenKind::Identifier || t.is("*") => {
                let (declarator, semicolon) = self.collect_until(&[";"]);
                semicolon
                    .or(declarator.last().copied())
                    .map_or(closing_end, |t| t.span.end)
            }
            _ => closing_end,
        }
    }

    /// Parse enumerators after a consumed `{`, through the closing `}`.
    fn enumerators(&mut self) -> Vec<Member> {
        let mut members: Vec<Member> = Vec::new();
        let mut next_value = Some(0i64);
        loop {
            let (tokens, stop) = self.collect_until(&[",", "}"]);
            if let (Some(first), Some(last)) = (tokens.first(), tokens.last()) {
                let assign = tokens.iter().position(|t| t.is("="));
                let declared = assign
                    .map(|i| token_text(&tokens[i + 1..]))
                    .unwrap_or_default();
                let value = match assign {
                    Some(_) => evaluate(&declared, &members),
                    None => next_value,
                };
                next_value = value.and_then(|v| v.checked_add(1));

                members.push(Member {
                    name: first.text.to_string(),
                    declared,
                    value,
                    access: None,
                    span: Span {
                        start: first.span.start,
                        end: last.span.end,
                    },
                    anchor: match stop {
                        Some(comma) if comma.is(",") => comma.span.end,
                        _ => last.span.end,
                    },
                });
            }
            match stop {
                Some(comma) if comma.is(",") => {}
                None if self.at_directive() => self.skip_directive(),
                _ => return members,
            }
        }
    }

    /// Parse union, class or struct members after a consumed `{`, through the
    /// closing `}`.
    fn fields(&mut self, default_access: Option<Access>) -> Vec<Member> {
        let mut access = default_access;
        let mut members = Vec::new();
        while let Some(token) = self.peek() {
            if is_directive(&token) {
                self.skip_directive();
                continue;
            }
            match token.text {
                "}" => {
                    self.next();
                    break;
                }
                ";" => {
                    self.next();
                    continue;
                }
                "public" | "protected" | "private"
                    if self.peek_nth(1).is_some_and(|t| t.is(":")) =>
                {
                    self.next();
                    self.next();
                    access = Some(match token.text {
                        "public" => Access::Public,
                        "protected" => Access::Protected,
                        _ => Access::Private,
                    });
                    continue;
                }
                _ => {}
            }

            let mark = self.pos;
            let (tokens, terminator) = self.member_statement();
            members.extend(self.members_from(&tokens, terminator, access));
            if self.pos == mark {
                self.next();
            }
        }
        members
    }

    /// Collect one member statement, skipping method bodies and nested aggregates.
    ///
    /// Returns the statement tokens and the token that terminated it.
    fn member_statement(&mut self) -> (Vec<Token<'a>>, Option<Token<'a>>) {
        let mut statement = Vec::new();
        loop {
            let (tokens, stop) = self.collect_until(&[";", "{", "}"]);
            statement.extend(tokens);
            match stop {
                Some(brace) if brace.is("{") => {
                    let close = self.skip_braces();
                    if statement.iter().any(|t| t.is("(")) {
                        let semicolon = self.eat(";");
                        return (statement, semicolon.or(close));
                    }
                }
                Some(close) if close.is("}") => {
                    self.pos -= 1;
                    return (statement, None);
                }
                stop => return (statement, stop),
            }
        }
    }

    fn members_from(
        &self,
        tokens: &[Token<'a>],
        terminator: Option<Token<'a>>,
        access: Option<Access>,
    ) -> Vec<Member> {
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Vec::new();
        };
        if matches!(
            first.text,
            "friend" | "using" | "typedef" | "static_assert" | "template"
        ) {
            return Vec::new();
        }
        let anchor = terminator.map_or(last.span.end, |t| t.span.end);

        if let Some(paren) = tokens.iter().position(|t| t.is("(")) {
            if let Some(name) = method_name(tokens, paren) {
                return vec![Member {
                    name,
                    declared: squash(&self.source[first.span.start..last.span.end]),
                    value: None,
                    access,
                    span: Span {
                        start: first.span.start,
                        end: anchor,
                    },
                    anchor,
                }];
            }
        }

        let segments = split_declarators(tokens);
        let Some((first_name, pointer)) = segments
            .first()
            .and_then(|(segment, _)| declarator_name(segment))
        else {
            return Vec::new();
        };
        let declared = if pointer {
            squash(&self.source[first.span.start..last.span.end])
        } else {
            squash(&self.source[first.span.start..first_name.span.start])
        };

        segments
            .iter()
            .filter_map(|(segment, comma)| {
                let (name, _) = declarator_name(segment)?;
                let start = if segment[0].span.start == first.span.start {
                    first.span.start
                } else {
                    name.span.start
                };
                let end = segment.last().map_or(name.span.end, |t| t.span.end);
                Some(Member {
                    name: name.text.to_string(),
                    declared: declared.clone(),
                    value: None,
                    access,
                    span: Span { start, end },
                    anchor: comma.map_or(anchor, |c| c.span.end),
                })
            })
            .collect()
    }

    fn function(&mut self, start: usize) -> Option<Declaration> {
        let (tokens, stop) = self.collect_until(&[";", "{"]);
        let stop = stop?;
        let assign = tokens.iter().position(|t| t.is("="));
        let paren = tokens.iter().position(|t| t.is("("));
        let name = paren
            .filter(|p| assign.is_none_or(|a| a > *p))
            .and_then(|p| function_name(&tokens, p));

        let mut end = stop.span.end;
        if stop.is("{") {
            let close = self.skip_braces();
            if name.is_none() {
                if assign.is_some() {
                    self.collect_until(&[";"]);
                }
                return None;
            }
            end = close.map_or(self.source.len(), |t| t.span.end);
        }

        let name = name?;
        let last = tokens.last()?;
        Some(Declaration {
            kind: DeclarationKind::Function,
            name,
            span: Span { start, end },
            text: squash(&self.source[start..last.span.end]),
            members: Vec::new(),
        })
    }
}

fn is_directive(token: &Token) -> bool {
    token.kind == TokenKind::Keyword && token.text.starts_with('#')
}

/// Join tokens as written, with a single space wherever the source separated them.
fn token_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && tokens[i - 1].span.end != token.span.start {
            text.push(' ');
        }
        text.push_str(token.text);
    }
    text
}

fn anonymous() -> String {
    "(anonymous)".to_string()
}

/// Collapse whitespace and line continuations into single spaces.
fn squash(text: &str) -> String {
    text.replace("\\\r\n", " ")
        .replace("\\\n", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The identifier a declarator declares, and whether it is a function pointer.
///
/// Without a `(*name)` form this is the last identifier before any initializer,
/// bit-field width or array bound.
fn declarator_name<'a>(tokens: &[Token<'a>]) -> Option<(Token<'a>, bool)> {
    let pointer = tokens.windows(3).find_map(|w| {
        (w[0].is("(")
            && matches!(w[1].text, "*" | "&" | "^")
            && w[2].kind == TokenKind::Identifier)
            .then_some(w[2])
    });
    if let Some(name) = pointer {
        return Some((name, true));
    }
    tokens
        .iter()
        .take_while(|t| !matches!(t.text, "=" | ":" | "[" | "{"))
        .filter(|t| t.kind == TokenKind::Identifier)
        .last()
        .map(|t| (*t, false))
}

/// Split a member statement on top-level commas: `int a, b;`.
fn split_declarators<'t, 'a>(
    tokens: &'t [Token<'a>],
) -> Vec<(&'t [Token<'a>], Option<Token<'a>>)> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut begin = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.text {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                if i > begin {
                    segments.push((&tokens[begin..i], Some(*token)));
                }
                begin = i + 1;
            }
            _ => {}
        }
    }
    if begin < tokens.len() {
        segments.push((&tokens[begin..], None));
    }
    segments
}

/// Name of a function whose parameter list opens at `paren`, if the tokens form
/// a function declarator rather than a parenthesized variable declarator.
fn function_name(tokens: &[Token], paren: usize) -> Option<String> {
    let before = tokens.get(paren.checked_sub(1)?)?;
    if before.kind != TokenKind::Identifier {
        return None;
    }
    if tokens
        .get(paren + 1)
        .is_some_and(|t| matches!(t.text, "*" | "&" | "^"))
    {
        return None;
    }

    // qualified names: `Shape::area`, `Shape::~Shape`
    let mut begin = paren - 1;
    if begin >= 1 && tokens[begin - 1].is("~") {
        begin -= 1;
    }
    while begin >= 2
        && tokens[begin - 1].is("::")
        && tokens[begin - 2].kind == TokenKind::Identifier
    {
        begin -= 2;
    }
    Some(tokens[begin..paren].iter().map(|t| t.text).collect())
}

fn method_name(tokens: &[Token], paren: usize) -> Option<String> {
    if let Some(operator) = tokens[..paren].iter().position(|t| t.is("operator")) {
        return Some(tokens[operator..paren].iter().map(|t| t.text).collect());
    }
    function_name(tokens, paren)
}

/// Evaluate an enumerator initializer: an integer literal, or the name of an
/// earlier enumerator.
fn evaluate(text: &str, previous: &[Member]) -> Option<i64> {
    parse_integer(text).or_else(|| {
        previous
            .iter()
            .find(|m| m.name == text.trim())
            .and_then(|m| m.value)
    })
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text)
        .trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text.strip_prefix('+').unwrap_or(text).trim_start()),
    };

    let value = if let Some(quoted) = digits.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        char_value(quoted)?
    } else {
        let digits = digits
            .trim_end_matches(['u', 'U', 'l', 'L'])
            .replace('\'', "");
        if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok()?
        } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
            i64::from_str_radix(bin, 2).ok()?
        } else if digits.len() > 1 && digits.starts_with('0') {
            i64::from_str_radix(&digits[1..], 8).ok()?
        } else {
            digits.parse().ok()?
        }
    };
    Some(if negative { -value } else { value })
}

fn char_value(quoted: &str) -> Option<i64> {
    let value = match quoted {
        r"\n" => '\n',
        r"\t" => '\t',
        r"\r" => '\r',
        r"\0" => '\0',
        r"\\" => '\\',
        r"\'" => '\'',
        _ => {
            let mut chars = quoted.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            c
        }
    };
    Some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    fn scan_source(source: &str) -> Vec<Declaration> {
        let tokens: Vec<Token> = tokenize(source).map(|t| t.unwrap()).collect();
        scan(source, &tokens)
    }

    fn values(declaration: &Declaration) -> Vec<(&str, Option<i64>)> {
        declaration
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.value))
            .collect()
    }

    #[test]
    fn test_enum_auto_increment() {
        let declarations =
            scan_source("enum seasons { spring = 3, summer, autumn = 7, winter };");
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].kind, DeclarationKind::Enum);
        assert_eq!(declarations[0].name, "seasons");
        assert_eq!(
            values(&declarations[0]),
            vec![
                ("spring", Some(3)),
                ("summer", Some(4)),
                ("autumn", Some(7)),
                ("winter", Some(8)),
            ]
        );
    }

    #[test]
    fn test_enum_values() {
        let declarations = scan_source(
            "enum class flags : unsigned {\n  none,\n  a = 0x10u,\n  b = -(2),\n  c = a,\n  d = 'A',\n  e = 010,\n  f = 1 << 3,\n  g,\n  h = 0b11,\n};",
        );
        let enumeration = &declarations[0];
        assert_eq!(enumeration.name, "flags");
        assert_eq!(enumeration.text, "enum class flags : unsigned");
        assert_eq!(
            values(enumeration),
            vec![
                ("none", Some(0)),
                ("a", Some(16)),
                ("b", None),
                ("c", Some(16)),
                ("d", Some(65)),
                ("e", Some(8)),
                ("f", None),
                ("g", None),
                ("h", Some(3)),
            ]
        );
        assert_eq!(enumeration.members[2].declared, "-(2)");
    }

    #[test]
    fn test_directives_inside_enum_body() {
        let declarations =
            scan_source("enum e {\n  a,\n#ifdef X\n  b,\n#endif\n  c\n#if Y\n#define D 1\n#endif\n};\n");
        assert_eq!(declarations.len(), 1);
        assert_eq!(
            values(&declarations[0]),
            vec![("a", Some(0)), ("b", Some(1)), ("c", Some(2))]
        );
    }

    #[test]
    fn test_directives_inside_union_and_class_bodies() {
        let declarations = scan_source(
            "union u {\n  int a;\n#if WIDE\n  long b;\n#else\n  int b;\n#endif\n};\nclass K {\n  void run() {\n#ifdef DEBUG\n    log();\n#endif\n  }\n  int n;\n};\n",
        );
        let names = |d: &Declaration| -> Vec<String> {
            d.members.iter().map(|m| m.name.clone()).collect()
        };
        assert_eq!(declarations.len(), 2);
        assert_eq!(names(&declarations[0]), vec!["a", "b", "b"]);
        assert_eq!(declarations[0].members[1].declared, "long");
        assert_eq!(names(&declarations[1]), vec!["run", "n"]);
    }

    #[test]
    fn test_unterminated_statement_stops_at_directive() {
        let declarations =
            scan_source("EXTERN_C_BEGIN\n\n#define MAX 10\n\nint add(int a, int b);\nEXTERN_C_END\n");
        let names: Vec<(&str, DeclarationKind)> = declarations
            .iter()
            .map(|d| (d.name.as_str(), d.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("MAX", DeclarationKind::Define),
                ("add", DeclarationKind::Function),
            ]
        );
        assert_eq!(declarations[1].text, "int add(int a, int b)");
    }

    #[test]
    fn test_comments_are_dropped_from_initializers() {
        let declarations =
            scan_source("enum e {\n  a = /* base */ 5,\n  b,\n  c = 1 << /* shift */ 3\n};\n");
        let members: Vec<(&str, &str, Option<i64>)> = declarations[0]
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.declared.as_str(), m.value))
            .collect();
        assert_eq!(
            members,
            vec![("a", "5", Some(5)), ("b", "", Some(6)), ("c", "1 << 3", None)]
        );
    }

    #[test]
    fn test_defines() {
        let declarations = scan_source(
            "#include <stdio.h>\n#define EMPTY\n#define VALUE 0xABCD\n#define MIN(a, b) \\\n  ((a) < (b) ? (a) : (b))\n#pragma once\n",
        );
        let defines: Vec<(&str, &str)> = declarations
            .iter()
            .map(|d| (d.name.as_str(), d.text.as_str()))
            .collect();
        assert_eq!(
            defines,
            vec![
                ("EMPTY", ""),
                ("VALUE", "0xABCD"),
                ("MIN", "(a, b) ((a) < (b) ? (a) : (b))"),
            ]
        );
        assert!(declarations.iter().all(|d| d.kind == DeclarationKind::Define));
    }

    #[test]
    fn test_typedefs() {
        let declarations = scan_source(
            "typedef int my_var;\ntypedef unsigned long sizes[4];\ntypedef int (*callback)(void *);\ntypedef struct point { int x; int y; } point_t;\n",
        );
        let typedefs: Vec<(&str, &str)> = declarations
            .iter()
            .map(|d| (d.name.as_str(), d.text.as_str()))
            .collect();
        assert_eq!(
            typedefs,
            vec![
                ("my_var", "int"),
                ("sizes", "unsigned long"),
                ("callback", "int (*callback)(void *)"),
                ("point_t", "struct point"),
            ]
        );
        let names: Vec<&str> = declarations[3].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_union_members_in_order() {
        let declarations = scan_source(
            "union box {\n  int var1;\n  double var2;\n  enum seasons var3;\n  char name[16];\n};",
        );
        let union_box = &declarations[0];
        assert_eq!(union_box.kind, DeclarationKind::Union);
        let members: Vec<(&str, &str, Option<Access>)> = union_box
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.declared.as_str(), m.access))
            .collect();
        assert_eq!(
            members,
            vec![
                ("var1", "int", None),
                ("var2", "double", None),
                ("var3", "enum seasons", None),
                ("name", "char", None),
            ]
        );
    }

    #[test]
    fn test_class_members_and_access() {
        let declarations = scan_source(
            "class Circle : public Shape {\n  double radius;\npublic:\n  Circle(double r) : radius(r) {}\n  double area() const override { return radius; }\n  virtual ~Circle();\nprotected:\n  int a, b;\n  void (*hook)(int);\n};",
        );
        let class = &declarations[0];
        assert_eq!(class.kind, DeclarationKind::Class);
        assert_eq!(class.name, "Circle");
        assert_eq!(class.text, "class Circle : public Shape");
        let members: Vec<(&str, Option<Access>)> = class
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.access))
            .collect();
        assert_eq!(
            members,
            vec![
                ("radius", Some(Access::Private)),
                ("Circle", Some(Access::Public)),
                ("area", Some(Access::Public)),
                ("~Circle", Some(Access::Public)),
                ("a", Some(Access::Protected)),
                ("b", Some(Access::Protected)),
                ("hook", Some(Access::Protected)),
            ]
        );
        assert_eq!(class.members[2].declared, "double area() const override");
        assert_eq!(class.members[4].declared, "int");
    }

    #[test]
    fn test_struct_defaults_to_public() {
        let declarations = scan_source("struct point { int x; };");
        assert_eq!(declarations[0].kind, DeclarationKind::Struct);
        assert_eq!(declarations[0].members[0].access, Some(Access::Public));
    }

    #[test]
    fn test_functions() {
        let declarations = scan_source(
            "static int add(int a, int b);\nint my_function(int a) {\n  printf(\"}\");\n}\nvoid Shape::draw() const {}\ntemplate <typename T>\nT max(T a, T b) { return a > b ? a : b; }\n",
        );
        let functions: Vec<(&str, &str)> = declarations
            .iter()
            .map(|d| (d.name.as_str(), d.text.as_str()))
            .collect();
        assert_eq!(
            functions,
            vec![
                ("add", "static int add(int a, int b)"),
                ("my_function", "int my_function(int a)"),
                ("Shape::draw", "void Shape::draw() const"),
                ("max", "template <typename T> T max(T a, T b)"),
            ]
        );
        assert!(declarations.iter().all(|d| d.kind == DeclarationKind::Function));
    }

    #[test]
    fn test_unrecognized_constructs_are_skipped() {
        let declarations = scan_source(
            "int counter = 0;\nint table[] = { 1, 2 };\nstruct point origin;\nenum seasons current;\nclass Forward;\nint (*fp)(int);\n} ) ;\nnamespace ns {\nint inside(void);\n}\nextern \"C\" {\nint c_api(void);\n}\nenum seasons next(enum seasons s);\n",
        );
        let names: Vec<(&str, DeclarationKind)> = declarations
            .iter()
            .map(|d| (d.name.as_str(), d.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("inside", DeclarationKind::Function),
                ("c_api", DeclarationKind::Function),
                ("next", DeclarationKind::Function),
            ]
        );
    }

    #[test]
    fn test_comments_do_not_split_declarations() {
        let declarations = scan_source("int /* inline */ f(/** doc */ int a); // tail\n");
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "f");
    }

    #[test]
    fn test_member_anchors() {
        let source = "enum e {\n  a = 1, ///< A\n  b      ///< B\n};";
        let declarations = scan_source(source);
        let members = &declarations[0].members;
        assert_eq!(&source[members[0].anchor - 1..members[0].anchor], ",");
        assert_eq!(&source[members[1].anchor - 1..members[1].anchor], "b");
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("0xABCD"), Some(0xABCD));
        assert_eq!(parse_integer("1'000"), Some(1000));
        assert_eq!(parse_integer("-7L"), Some(-7));
        assert_eq!(parse_integer("'\\n'"), Some(10));
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("A + 1"), None);
    }
}

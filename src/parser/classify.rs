use super::{DocComment, DocForm, Placement, Span, Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static BRIEF_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[@\\]brief\b[ \t]*").expect("valid brief tag pattern"));

static DETAILS_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[@\\]details?\b[ \t]*").expect("valid details tag pattern"));

/// Classify a single comment token.
///
/// Returns `None` for anything that is not a documentation comment.
///
/// # Examples
///
/// ```
/// use doxycheck::{classify, tokenize, DocForm};
///
/// let token = tokenize("/** Brief.\n *\n * Detail.\n */").next().unwrap().unwrap();
/// let doc = classify(&token).unwrap();
/// assert_eq!(doc.form, DocForm::Block);
/// assert_eq!(doc.brief, "Brief.");
/// assert_eq!(doc.detail, "Detail.");
///
/// let token = tokenize("// plain").next().unwrap().unwrap();
/// assert!(classify(&token).is_none());
/// ```
pub fn classify(token: &Token) -> Option<DocComment> {
    match token.kind {
        TokenKind::LineComment { doc: true } => Some(line_doc(token)),
        TokenKind::BlockComment { doc: true } => Some(block_doc(token)),
        _ => None,
    }
}

/// Classify every documentation comment in `tokens`, in source order.
///
/// Consecutive `///` lines with the same placement collapse into one comment. A run
/// of several lines is split into brief and detail the same way a block is.
pub fn collect_doc_comments(tokens: &[Token]) -> Vec<DocComment> {
    let mut docs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;
        if !matches!(token.kind, TokenKind::LineComment { doc: true }) {
            docs.extend(classify(token));
            continue;
        }

        let (_, placement) = line_text(token);
        let mut run = vec![token];
        while let [newline, next, ..] = &tokens[i..] {
            let continues = newline.kind == TokenKind::Newline
                && matches!(next.kind, TokenKind::LineComment { doc: true })
                && line_text(next).1 == placement;
            if !continues {
                break;
            }
            run.push(next);
            i += 2;
        }

        if run.len() == 1 {
            docs.push(line_doc(token));
        } else {
            let lines: Vec<&str> = run.iter().map(|t| line_text(t).0.trim()).collect();
            let span = Span {
                start: token.span.start,
                end: run[run.len() - 1].span.end,
            };
            docs.push(paragraphs(&lines, DocForm::Block, placement, span));
        }
    }
    docs
}

/// Text after the `///` marker and the placement it implies
fn line_text<'a>(token: &Token<'a>) -> (&'a str, Placement) {
    split_placement(&token.text[3..])
}

fn split_placement(text: &str) -> (&str, Placement) {
    match text.strip_prefix('<') {
        Some(rest) => (rest, Placement::Trailing),
        None => (text, Placement::Leading),
    }
}

fn line_doc(token: &Token) -> DocComment {
    let (text, placement) = line_text(token);
    let text = text.trim();
    DocComment {
        brief: BRIEF_TAG.replace(text, "").trim().to_string(),
        detail: String::new(),
        form: DocForm::OneLine,
        placement,
        span: token.span,
        multiline_brief: false,
    }
}

fn block_doc(token: &Token) -> DocComment {
    let inner = &token.text[3..token.text.len() - 2];
    let (inner, placement) = split_placement(inner);
    let lines: Vec<&str> = inner.lines().map(destar).collect();
    paragraphs(&lines, DocForm::Block, placement, token.span)
}

/// Strip the decoration of one line inside a block comment
fn destar(line: &str) -> &str {
    let line = line.trim();
    match line.strip_prefix('*') {
        Some(rest) => rest.trim(),
        None => line,
    }
}

/// Split cleaned comment lines into the brief paragraph and the detailed description.
fn paragraphs(lines: &[&str], form: DocForm, placement: Placement, span: Span) -> DocComment {
    let mut rest = lines.iter().copied().skip_while(|l| l.is_empty()).peekable();

    let mut brief = Vec::new();
    let mut brief_lines = 0;
    while let Some(line) = rest.next_if(|l| !l.is_empty() && !DETAILS_TAG.is_match(l)) {
        let line = if brief_lines == 0 {
            BRIEF_TAG.replace(line, "")
        } else {
            line.into()
        };
        brief_lines += 1;
        if !line.trim().is_empty() {
            brief.push(line.trim().to_string());
        }
    }

    let mut detail: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    for line in rest {
        if line.is_empty() {
            if !paragraph.is_empty() {
                detail.push(paragraph.join("\n"));
                paragraph.clear();
            }
            continue;
        }
        if detail.is_empty() && paragraph.is_empty() {
            let stripped = DETAILS_TAG.find(line).map_or(line, |m| &line[m.end()..]);
            if !stripped.is_empty() {
                paragraph.push(stripped);
            }
        } else {
            paragraph.push(line);
        }
    }
    if !paragraph.is_empty() {
        detail.push(paragraph.join("\n"));
    }

    DocComment {
        brief: brief.join(" "),
        multiline_brief: brief_lines > 1 && detail.is_empty(),
        detail: detail.join("\n\n"),
        form,
        placement,
        span,
    }
}

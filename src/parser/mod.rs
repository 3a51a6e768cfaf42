mod associate;
mod classify;
mod lexer;
mod model;
mod scanner;
mod units;

use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use associate::associate;
pub use classify::{classify, collect_doc_comments};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use model::build;
pub use scanner::scan;

/// A half-open range of byte offsets into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Offset of the first byte
    pub start: usize,

    /// Offset one past the last byte
    pub end: usize,
}

/// Shape of a documentation comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocForm {
    /// `/// text`, brief only
    OneLine,

    /// `/** ... */`, brief plus an optional detailed description
    Block,
}

/// Where a documentation comment sits relative to what it documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    /// Before the declaration (`///`, `/**`)
    Leading,

    /// After a member on the same line (`///<`, `/**<`)
    Trailing,
}

/// A classified documentation comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocComment {
    /// The short, single-paragraph summary
    pub brief: String,

    /// The detailed description, empty if absent
    pub detail: String,

    /// One-line or block form
    pub form: DocForm,

    /// Leading or trailing placement
    pub placement: Placement,

    /// Source range covered by the comment tokens
    pub span: Span,

    /// The brief paragraph spanned several source lines without a blank line after it
    pub multiline_brief: bool,
}

/// The kinds of declarations documentation may attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclarationKind {
    Define,
    Typedef,
    Enum,
    Union,
    Class,
    Struct,
    Function,
}

/// Access level recorded on class and struct members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    Public,
    Protected,
    Private,
}

/// A recognized top-level declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The kind of the declaration
    pub kind: DeclarationKind,

    /// The declared identifier
    pub name: String,

    /// Source range of the declaration
    pub span: Span,

    /// Define value, typedef'd type or function signature; empty if none
    pub text: String,

    /// Enumerators, union fields or class members in declaration order
    pub members: Vec<Member>,
}

/// A member of an enum, union, class or struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// The member identifier
    pub name: String,

    /// Enumerator initializer, or the member's declared type or signature
    pub declared: String,

    /// Resolved enumerator value
    pub value: Option<i64>,

    /// Access level for class and struct members
    pub access: Option<Access>,

    /// Source range of the member
    pub span: Span,

    /// Offset right after the member's terminator where a trailing comment may begin
    pub anchor: usize,
}

/// What a documentation record documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    /// Index into the scanned declarations
    Declaration(usize),

    /// A member of a scanned declaration
    Member { declaration: usize, member: usize },
}

/// The association of a declaration or member with its documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentationRecord {
    pub target: Target,
    pub doc: Option<DocComment>,
}

/// Output of the associator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Association {
    /// One record per declaration, plus one per documented member
    pub records: Vec<DocumentationRecord>,

    /// Documentation comments no record consumed, in source order
    pub unbound: Vec<DocComment>,
}

/// A member together with its documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberEntry {
    pub member: Member,
    pub doc: Option<DocComment>,
}

/// A declaration together with its documentation and documented members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    pub kind: DeclarationKind,
    pub name: String,
    pub span: Span,
    pub text: String,
    pub doc: Option<DocComment>,
    pub members: Vec<MemberEntry>,
}

/// The read-only documentation model of one source text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    /// Declarations in source order
    pub entries: Vec<DocumentEntry>,

    /// Documentation comments not attached to anything
    pub unbound: Vec<DocComment>,
}

/// A parsed source file
#[derive(Debug, Clone, Serialize)]
pub struct FileUnit {
    /// The path to the file
    pub path: PathBuf,

    /// Source code of the entire file
    #[serde(skip)]
    pub source: String,

    /// The documentation model of the file
    pub model: DocumentModel,
}

/// Parse source text into its documentation model.
///
/// # Errors
///
/// Returns [`Error::UnterminatedComment`] when a block comment is never closed.
///
/// # Examples
///
/// ```
/// use doxycheck::{parse_source, DeclarationKind};
///
/// # fn main() -> doxycheck::Result<()> {
/// let model = parse_source("/// @brief Maximum size\n#define MAX_SIZE 100\n")?;
/// let entry = model.get("MAX_SIZE").unwrap();
/// assert_eq!(entry.kind, DeclarationKind::Define);
/// assert_eq!(entry.doc.as_ref().unwrap().brief, "Maximum size");
/// # Ok(())
/// # }
/// ```
pub fn parse_source(source: &str) -> Result<DocumentModel> {
    let tokens = tokenize(source).collect::<Result<Vec<_>>>()?;
    let docs = collect_doc_comments(&tokens);
    let declarations = scan(source, &tokens);
    debug!(
        tokens = tokens.len(),
        docs = docs.len(),
        declarations = declarations.len(),
        "scanned source"
    );
    let association = associate(source, &declarations, docs);
    Ok(build(declarations, association))
}

/// Read and parse a single source file.
pub fn parse_file(path: &Path) -> Result<FileUnit> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    let model = parse_source(&source)?;
    Ok(FileUnit {
        path: path.to_path_buf(),
        source,
        model,
    })
}

use super::{DeclarationKind, DocComment, DocumentEntry, MemberEntry, Placement, Span};
use std::fmt;

/// Implementation of Span.
///
/// # Examples
///
/// ```
/// use doxycheck::Span;
///
/// let span = Span::new(4, 10);
/// assert_eq!(span.len(), 6);
/// assert!(span.contains(4));
/// assert!(!span.contains(10));
/// ```
impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// 1-based line number of the span start within `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use doxycheck::Span;
    ///
    /// let source = "int a;\nint b;\n";
    /// assert_eq!(Span::new(0, 3).line(source), 1);
    /// assert_eq!(Span::new(7, 10).line(source), 2);
    /// ```
    pub fn line(&self, source: &str) -> usize {
        let end = self.start.min(source.len());
        source.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
    }
}

impl DeclarationKind {
    /// The keyword-like name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Define => "define",
            DeclarationKind::Typedef => "typedef",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Union => "union",
            DeclarationKind::Class => "class",
            DeclarationKind::Struct => "struct",
            DeclarationKind::Function => "function",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Examples
///
/// ```
/// use doxycheck::parse_source;
///
/// # fn main() -> doxycheck::Result<()> {
/// let model = parse_source("/** Brief\n *\n * Detail\n */\nunion u {\n  int a; ///< A\n};\n")?;
/// let entry = model.get("u").unwrap();
/// assert!(entry.doc.as_ref().unwrap().has_detail());
/// assert!(entry.members[0].doc.as_ref().unwrap().is_trailing());
/// # Ok(())
/// # }
/// ```
impl DocComment {
    pub fn has_detail(&self) -> bool {
        !self.detail.is_empty()
    }

    pub fn is_trailing(&self) -> bool {
        self.placement == Placement::Trailing
    }
}

/// Implementation of DocumentEntry.
///
/// # Examples
///
/// ```
/// use doxycheck::parse_source;
///
/// # fn main() -> doxycheck::Result<()> {
/// let model = parse_source("/// Seasons\nenum seasons {\n  spring, ///< Spring\n  summer\n};\n")?;
/// let seasons = model.get("seasons").unwrap();
///
/// assert!(seasons.is_documented());
/// let missing: Vec<&str> = seasons
///     .undocumented_members()
///     .map(|m| m.member.name.as_str())
///     .collect();
/// assert_eq!(missing, vec!["summer"]);
/// # Ok(())
/// # }
/// ```
impl DocumentEntry {
    pub fn is_documented(&self) -> bool {
        self.doc.is_some()
    }

    /// Members without documentation, in declaration order
    pub fn undocumented_members(&self) -> impl Iterator<Item = &MemberEntry> {
        self.members.iter().filter(|m| m.doc.is_none())
    }

    pub fn member(&self, name: &str) -> Option<&MemberEntry> {
        self.members.iter().find(|m| m.member.name == name)
    }
}

use super::{
    Association, Declaration, DocComment, DocumentationRecord, Placement, Span, Target,
    TokenKind, tokenize,
};
use tracing::debug;

/// Bind documentation comments to the declarations and members they document.
///
/// A leading comment documents the declaration that follows it, separated only by
/// whitespace or ordinary comments. A trailing comment documents the member whose
/// terminator it follows on the same line. Every declaration gets a record, with
/// `doc` left empty when nothing documents it; members only get one when documented.
///
/// # Examples
///
/// ```
/// use doxycheck::{associate, collect_doc_comments, scan, tokenize, Target};
///
/// let source = "/// A box\nunion box {\n  int var1; ///< first\n};\nint f(void);";
/// let tokens: Vec<_> = tokenize(source).collect::<Result<_, _>>().unwrap();
/// let declarations = scan(source, &tokens);
/// let association = associate(source, &declarations, collect_doc_comments(&tokens));
///
/// assert_eq!(association.records.len(), 3);
/// assert_eq!(association.records[0].doc.as_ref().unwrap().brief, "A box");
/// assert_eq!(association.records[1].target, Target::Member { declaration: 0, member: 0 });
/// assert!(association.records[2].doc.is_none());
/// ```
pub fn associate(
    source: &str,
    declarations: &[Declaration],
    docs: Vec<DocComment>,
) -> Association {
    let mut pool = DocPool::new(source, docs);
    let mut records = Vec::new();

    for (index, declaration) in declarations.iter().enumerate() {
        let doc = pool
            .take_leading(declaration.span.start)
            .or_else(|| pool.take_trailing(declaration.span.end));
        records.push(DocumentationRecord {
            target: Target::Declaration(index),
            doc,
        });

        for (position, member) in declaration.members.iter().enumerate() {
            let doc = pool
                .take_trailing(member.anchor)
                .or_else(|| pool.take_leading(member.span.start));
            if doc.is_some() {
                records.push(DocumentationRecord {
                    target: Target::Member {
                        declaration: index,
                        member: position,
                    },
                    doc,
                });
            }
        }
    }

    let unbound: Vec<DocComment> = pool.slots.into_iter().flatten().collect();
    for doc in &unbound {
        debug!(
            offset = doc.span.start,
            brief = %doc.brief,
            "documentation comment not attached to any declaration"
        );
    }
    Association { records, unbound }
}

/// Documentation comments in source order; a slot is emptied once consumed.
struct DocPool<'a> {
    source: &'a str,
    spans: Vec<Span>,
    slots: Vec<Option<DocComment>>,
}

impl<'a> DocPool<'a> {
    fn new(source: &'a str, mut docs: Vec<DocComment>) -> Self {
        docs.sort_by_key(|d| d.span.start);
        Self {
            source,
            spans: docs.iter().map(|d| d.span).collect(),
            slots: docs.into_iter().map(Some).collect(),
        }
    }

    /// Take the leading comment closest before `start`, if only whitespace and
    /// ordinary comments separate them.
    fn take_leading(&mut self, start: usize) -> Option<DocComment> {
        let index = self.spans.partition_point(|s| s.end <= start).checked_sub(1)?;
        let slot = self.slots.get_mut(index)?;
        let doc = slot.as_ref()?;
        if doc.placement != Placement::Leading || !is_blank_gap(&self.source[doc.span.end..start]) {
            return None;
        }
        slot.take()
    }

    /// Take the trailing comment starting right after `anchor` on the same line.
    fn take_trailing(&mut self, anchor: usize) -> Option<DocComment> {
        let index = self.spans.partition_point(|s| s.start < anchor);
        let slot = self.slots.get_mut(index)?;
        let doc = slot.as_ref()?;
        let gap = &self.source[anchor..doc.span.start];
        if doc.placement != Placement::Trailing || !gap.chars().all(|c| c == ' ' || c == '\t') {
            return None;
        }
        slot.take()
    }
}

/// Whether `gap` holds nothing but whitespace and ordinary comments.
fn is_blank_gap(gap: &str) -> bool {
    tokenize(gap).all(|token| match token {
        Ok(token) => {
            token.kind == TokenKind::Newline || (token.is_comment() && !token.is_doc_comment())
        }
        Err(_) => false,
    })
}

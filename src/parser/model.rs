use super::{
    Association, DeclarationKind, DocComment, Declaration, DocumentEntry, DocumentModel,
    MemberEntry, Target,
};

/// Assemble the documentation model from scanned declarations and their records.
///
/// Entries keep source order and members keep declaration order, so identical input
/// always yields an identical model.
pub fn build(declarations: Vec<Declaration>, association: Association) -> DocumentModel {
    let mut docs: Vec<Option<DocComment>> = vec![None; declarations.len()];
    let mut member_docs: Vec<Vec<Option<DocComment>>> = declarations
        .iter()
        .map(|d| vec![None; d.members.len()])
        .collect();

    for record in association.records {
        let slot = match record.target {
            Target::Declaration(index) => docs.get_mut(index),
            Target::Member {
                declaration,
                member,
            } => member_docs
                .get_mut(declaration)
                .and_then(|members| members.get_mut(member)),
        };
        if let Some(slot) = slot {
            *slot = record.doc;
        }
    }

    let entries = declarations
        .into_iter()
        .zip(docs)
        .zip(member_docs)
        .map(|((declaration, doc), member_docs)| DocumentEntry {
            kind: declaration.kind,
            name: declaration.name,
            span: declaration.span,
            text: declaration.text,
            doc,
            members: declaration
                .members
                .into_iter()
                .zip(member_docs)
                .map(|(member, doc)| MemberEntry { member, doc })
                .collect(),
        })
        .collect();

    DocumentModel {
        entries,
        unbound: association.unbound,
    }
}

impl DocumentModel {
    /// First entry declaring `name`.
    pub fn get(&self, name: &str) -> Option<&DocumentEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// First entry of the given kind declaring `name`.
    pub fn find(&self, kind: DeclarationKind, name: &str) -> Option<&DocumentEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries without documentation of their own, in source order.
    pub fn undocumented(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter().filter(|e| e.doc.is_none())
    }
}

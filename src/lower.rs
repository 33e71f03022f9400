use crate::inference::obj::merge_fields;
use crate::inference::{Arena, Entry};
use crate::ir::{Shape, TypeDecl};

/// Collapse every arena entry into its final declaration, ascending by id.
/// Struct entries with several contributions are merged here and nowhere else.
pub fn lower(arena: Arena) -> Vec<TypeDecl> {
    let decls = arena
        .into_entries()
        .map(|(id, entry)| {
            let shape = match entry {
                Entry::Plain(shape) => shape,
                Entry::Struct(contributions) => {
                    if contributions.len() > 1 {
                        tracing::trace!(%id, contributions = contributions.len(), "merging field sets");
                    }
                    Shape::Struct(merge_fields(contributions))
                }
            };
            TypeDecl { id, shape }
        })
        .collect::<Vec<_>>();
    tracing::debug!(declarations = decls.len(), "lowered declarations");
    decls
}

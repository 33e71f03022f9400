use crate::ir::TypeRef;

/// Element type of a non-empty array: the common type when every element
/// agrees, `Any` otherwise. An empty iterator also yields `Any`.
pub fn unify_elements<I>(items: I) -> TypeRef
where
    I: IntoIterator<Item = TypeRef>,
{
    let mut it = items.into_iter();
    let Some(first) = it.next() else {
        return TypeRef::Any;
    };
    it.fold(first, |acc, ty| acc.unify(&ty))
}

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::ir::{Field, TypeRef};

/// Merge the field sets of every object that contributed to one declaration.
///
/// One output field per distinct key. Its type is the common type of all
/// occurrences (`Any` on conflict) and it is optional unless every
/// contribution carries the key. Output keeps first-seen key order; rendering
/// sorts.
pub fn merge_fields(contributions: Vec<Vec<Field>>) -> Vec<Field> {
    let total = contributions.len();
    let mut merged: IndexMap<String, (Field, usize)> = IndexMap::new();

    for fields in contributions {
        for field in fields {
            match merged.entry(field.key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert((field, 1));
                }
                Entry::Occupied(mut slot) => {
                    let (seen, count) = slot.get_mut();
                    *count += 1;
                    let ty = std::mem::replace(&mut seen.ty, TypeRef::Any);
                    seen.ty = ty.unify(&field.ty);
                }
            }
        }
    }

    merged
        .into_values()
        .map(|(mut field, count)| {
            field.optional = count != total;
            field
        })
        .collect()
}

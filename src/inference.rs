//! Value tree → declaration arena.
//!
//! One depth-first pass over the document. Every object found contributes its
//! field set to a declaration id; which id depends on the object's *slot*, its
//! structural position in the document (root, key `k` under a slot, element of
//! a slot). Objects sharing a slot share an id, so the elements of an array of
//! objects, or the same key across those elements, end up in one declaration
//! whose contributions are merged later by [`crate::lower`].
//!
//! Design goals:
//! - Ids follow first-encounter order; keys are visited sorted, so numbering
//!   never depends on the source key order.
//! - No shared state: the id counter and arena live in an explicit context
//!   created per run.
//! - The walk only records; merging is a separate, testable pass.
pub mod arr;
pub mod obj;
pub mod scalar;

use std::collections::BTreeMap;

use crate::ir::{Field, Shape, TypeDecl, TypeId, TypeRef};
use crate::value::Value;

pub use scalar::{classify_number, classify_scalar};

// ------------------------------- Policy ---------------------------------- //

/// How objects pick their declaration id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// objects at the same slot share one id and get merged
    #[default]
    Unified,
    /// every object gets its own id; nothing merges
    Legacy,
}

// -------------------------------- Arena ---------------------------------- //

#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// fully known body (root scalars and aliases)
    Plain(Shape),
    /// one field set per contributing object, merged during lowering
    Struct(Vec<Vec<Field>>),
}

/// Declarations recorded during one walk, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct Arena {
    entries: BTreeMap<TypeId, Entry>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TypeId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// Entries in ascending id order.
    pub fn into_entries(self) -> impl Iterator<Item = (TypeId, Entry)> {
        self.entries.into_iter()
    }

    fn declare(&mut self, id: TypeId, shape: Shape) {
        self.entries.insert(id, Entry::Plain(shape));
    }

    fn contribute(&mut self, id: TypeId, fields: Vec<Field>) {
        match self.entries.entry(id).or_insert_with(|| Entry::Struct(Vec::new())) {
            Entry::Struct(contributions) => contributions.push(fields),
            // ids handed to objects are never declared plain
            Entry::Plain(_) => unreachable!("struct contribution to plain declaration {id}"),
        }
    }
}

// -------------------------------- Slots ---------------------------------- //

#[derive(Debug, Default)]
struct Slot {
    id: Option<TypeId>,
    fields: BTreeMap<String, Slot>,
    items: Option<Box<Slot>>,
}

impl Slot {
    fn root() -> Self {
        Self { id: Some(TypeId::ROOT), ..Self::default() }
    }

    fn field(&mut self, key: &str) -> &mut Slot {
        self.fields.entry(key.to_owned()).or_default()
    }

    fn items(&mut self) -> &mut Slot {
        self.items.get_or_insert_with(Box::default)
    }
}

// ------------------------------- Context --------------------------------- //

/// Per-run state: id counter, arena and policy.
#[derive(Debug)]
struct InferCtx {
    next: TypeId,
    arena: Arena,
    mode: Mode,
}

impl InferCtx {
    fn new(mode: Mode) -> Self {
        Self { next: TypeId::ROOT.succ(), arena: Arena::default(), mode }
    }

    fn alloc(&mut self) -> TypeId {
        let id = self.next;
        self.next = id.succ();
        tracing::trace!(%id, "allocated type id");
        id
    }

    fn object_id(&mut self, slot: &mut Slot) -> TypeId {
        match self.mode {
            Mode::Unified => match slot.id {
                Some(id) => id,
                None => {
                    let id = self.alloc();
                    slot.id = Some(id);
                    id
                }
            },
            // only the root's preassigned id is ever reused
            Mode::Legacy => match slot.id.take() {
                Some(id) => id,
                None => self.alloc(),
            },
        }
    }

    fn infer(&mut self, slot: &mut Slot, v: &Value) -> TypeRef {
        match v {
            Value::Null => TypeRef::Any,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                classify_scalar(v).map_or(TypeRef::Any, TypeRef::Scalar)
            }
            Value::Array(xs) => self.infer_array(slot.items(), xs),
            Value::Object(map) => self.infer_object(slot, map),
        }
    }

    fn infer_array(&mut self, items: &mut Slot, xs: &[Value]) -> TypeRef {
        // every element is visited so that all object elements contribute
        let tys = xs.iter().map(|x| self.infer(items, x)).collect::<Vec<_>>();
        TypeRef::seq(arr::unify_elements(tys))
    }

    fn infer_object(&mut self, slot: &mut Slot, map: &BTreeMap<String, Value>) -> TypeRef {
        let id = self.object_id(slot);
        let fields = map
            .iter()
            .map(|(key, v)| Field {
                key: key.clone(),
                ty: self.infer(slot.field(key), v),
                optional: false,
            })
            .collect();
        self.arena.contribute(id, fields);
        TypeRef::Named(id)
    }
}

// ------------------------------- Front API -------------------------------- //

/// Entry point for one document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inference {
    mode: Mode,
}

impl Inference {
    pub fn new() -> Self {
        Self { mode: Mode::Unified }
    }

    pub fn legacy() -> Self {
        Self { mode: Mode::Legacy }
    }

    /// Walk `root` and return the raw arena. The root always lands at id 1.
    pub fn run(&self, root: &Value) -> Arena {
        let mut ctx = InferCtx::new(self.mode);
        let mut slot = Slot::root();
        match ctx.infer(&mut slot, root) {
            // objects contributed to id 1 themselves
            TypeRef::Named(_) => {}
            TypeRef::Scalar(s) => ctx.arena.declare(TypeId::ROOT, Shape::Scalar(s)),
            other => ctx.arena.declare(TypeId::ROOT, Shape::Alias(other)),
        }
        tracing::debug!(mode = ?self.mode, declarations = ctx.arena.len(), "inference finished");
        ctx.arena
    }

    /// Walk and merge: the ordered declarations ready for codegen.
    pub fn solve(&self, root: &Value) -> Vec<TypeDecl> {
        crate::lower::lower(self.run(root))
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Scalar;

    fn run(text: &str) -> Arena {
        Inference::new().run(&Value::parse(text).unwrap())
    }

    fn contributions(arena: &Arena, id: u32) -> &[Vec<Field>] {
        match arena.get(TypeId(id)) {
            Some(Entry::Struct(c)) => c,
            other => panic!("expected struct at {id}, got {other:?}"),
        }
    }

    #[test]
    fn root_scalars_are_plain() {
        for (text, scalar) in [("true", Scalar::Bool), ("12345", Scalar::Int), ("12.345", Scalar::Float)] {
            let arena = run(text);
            assert_eq!(arena.len(), 1);
            assert_eq!(arena.get(TypeId::ROOT), Some(&Entry::Plain(Shape::Scalar(scalar))));
        }
        let arena = run("null");
        assert_eq!(arena.get(TypeId::ROOT), Some(&Entry::Plain(Shape::Alias(TypeRef::Any))));
    }

    #[test]
    fn empty_collections() {
        let arena = run("{}");
        assert_eq!(contributions(&arena, 1), &[Vec::<Field>::new()]);

        let arena = run("[]");
        assert_eq!(
            arena.get(TypeId::ROOT),
            Some(&Entry::Plain(Shape::Alias(TypeRef::seq(TypeRef::Any))))
        );
    }

    #[test]
    fn nested_objects_get_fresh_ids_in_order() {
        let arena = run(r#"{"test":{"hoge":{"fuga":"12345"}}}"#);
        assert_eq!(arena.len(), 3);
        assert_eq!(contributions(&arena, 1)[0][0].ty, TypeRef::Named(TypeId(2)));
        assert_eq!(contributions(&arena, 2)[0][0].ty, TypeRef::Named(TypeId(3)));
        assert_eq!(contributions(&arena, 3)[0][0].ty, TypeRef::Scalar(Scalar::String));
    }

    #[test]
    fn sibling_keys_get_distinct_ids() {
        let arena = run(r#"{"b":{"y":1},"a":{"x":1}}"#);
        let root = &contributions(&arena, 1)[0];
        assert_eq!(root[0].key, "a");
        assert_eq!(root[0].ty, TypeRef::Named(TypeId(2)));
        assert_eq!(root[1].ty, TypeRef::Named(TypeId(3)));
    }

    #[test]
    fn array_elements_share_one_id() {
        let arena = run(r#"[{"test":"1"},{"test":"2","food":"apple"},{"test":"2","drink":"beer"}]"#);
        assert_eq!(arena.len(), 2);
        assert_eq!(
            arena.get(TypeId::ROOT),
            Some(&Entry::Plain(Shape::Alias(TypeRef::seq(TypeRef::Named(TypeId(2))))))
        );
        assert_eq!(contributions(&arena, 2).len(), 3);
    }

    #[test]
    fn same_key_across_elements_shares_id() {
        let arena = run(r#"[{"a":{"x":1}},{"a":{"y":true}}]"#);
        assert_eq!(arena.len(), 3);
        assert_eq!(contributions(&arena, 2).len(), 2);
        assert_eq!(contributions(&arena, 3).len(), 2);
    }

    #[test]
    fn nested_arrays_share_element_slot() {
        let arena = run(r#"[[{"a":1}],[{"b":2}]]"#);
        assert_eq!(
            arena.get(TypeId::ROOT),
            Some(&Entry::Plain(Shape::Alias(TypeRef::seq(TypeRef::seq(TypeRef::Named(TypeId(2)))))))
        );
        assert_eq!(contributions(&arena, 2).len(), 2);
    }

    #[test]
    fn mixed_array_still_records_objects() {
        let arena = run(r#"["x", {"a":1}, null]"#);
        assert_eq!(arena.get(TypeId::ROOT), Some(&Entry::Plain(Shape::Alias(TypeRef::seq(TypeRef::Any)))));
        assert_eq!(contributions(&arena, 2).len(), 1);
    }

    #[test]
    fn array_of_objects_inside_field() {
        let arena = run(r#"{"test":[{"fuga":"12345"}]}"#);
        let root = &contributions(&arena, 1)[0];
        assert_eq!(root[0].ty, TypeRef::seq(TypeRef::Named(TypeId(2))));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn legacy_mode_never_shares() {
        let arena = Inference::legacy().run(&Value::parse(r#"[{"a":1},{"a":2}]"#).unwrap());
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(TypeId::ROOT), Some(&Entry::Plain(Shape::Alias(TypeRef::seq(TypeRef::Any)))));
        assert_eq!(contributions(&arena, 2).len(), 1);
        assert_eq!(contributions(&arena, 3).len(), 1);
    }

    #[test]
    fn legacy_root_object_keeps_id_one() {
        let arena = Inference::legacy().run(&Value::parse(r#"{"a":{"b":{}}}"#).unwrap());
        assert_eq!(contributions(&arena, 1)[0][0].ty, TypeRef::Named(TypeId(2)));
        assert_eq!(contributions(&arena, 2)[0][0].ty, TypeRef::Named(TypeId(3)));
    }

    #[test]
    fn runs_are_independent() {
        let v = Value::parse(r#"{"a":[{"b":1}]}"#).unwrap();
        let inf = Inference::new();
        assert_eq!(inf.solve(&v), inf.solve(&v));
    }
}

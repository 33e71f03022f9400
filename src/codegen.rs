//! Go source emission for lowered declarations.
use std::fmt::Write as _;

use crate::config::{OmitEmpty, Options};
use crate::gofmt::{self, FormatError};
use crate::ident::derive_identifier;
use crate::ir::{Field, Scalar, Shape, TypeDecl, TypeRef};

const OMITEMPTY: &str = ",omitempty";

pub fn scalar_name(s: Scalar) -> &'static str {
    match s {
        Scalar::Bool => "bool",
        Scalar::Int => "int",
        Scalar::Float => "float64",
        Scalar::String => "string",
    }
}

pub fn type_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Scalar(s) => scalar_name(*s).to_owned(),
        TypeRef::Any => "interface{}".to_owned(),
        TypeRef::Named(id) => id.to_string(),
        TypeRef::Seq(item) => format!("[]{}", type_name(item)),
    }
}

/// Accumulates unformatted declarations; see [`render`] for the finished text.
pub struct Codegen<'a> {
    opts: &'a Options,
    out: String,
}

impl<'a> Codegen<'a> {
    pub fn new(opts: &'a Options) -> Self {
        Self { opts, out: String::new() }
    }

    pub fn emit(&mut self, decls: &[TypeDecl]) {
        for decl in decls {
            self.emit_decl(decl);
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn emit_decl(&mut self, decl: &TypeDecl) {
        if !self.out.is_empty() {
            self.out.push_str("\n\n");
        }
        let _ = write!(self.out, "type {} ", decl.id);
        match &decl.shape {
            Shape::Scalar(s) => self.out.push_str(scalar_name(*s)),
            Shape::Alias(ty) => self.out.push_str(&type_name(ty)),
            Shape::Struct(fields) => self.emit_struct(fields),
        }
    }

    fn emit_struct(&mut self, fields: &[Field]) {
        let mut sorted: Vec<&Field> = fields.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));

        self.out.push_str("struct {\n");
        for field in sorted {
            let ptr = if field.optional { "*" } else { "" };
            let _ = writeln!(
                self.out,
                "{} {ptr}{}{}",
                derive_identifier(&field.key),
                type_name(&field.ty),
                self.tag(field),
            );
        }
        self.out.push('}');
    }

    fn tag(&self, field: &Field) -> String {
        if !self.opts.use_tag {
            return String::new();
        }
        let omit = match self.opts.omit_empty {
            OmitEmpty::None => "",
            OmitEmpty::AllFields => OMITEMPTY,
            OmitEmpty::OptionalFieldsOnly if field.optional => OMITEMPTY,
            OmitEmpty::OptionalFieldsOnly => "",
        };
        format!(" `{}:\"{}{omit}\"`", self.opts.tag_name(), field.key)
    }
}

/// Emit and canonically format `decls`. The text carries no trailing newline.
pub fn render(decls: &[TypeDecl], opts: &Options) -> Result<String, FormatError> {
    let mut cg = Codegen::new(opts);
    cg.emit(decls);
    let src = cg.into_string();
    tracing::trace!(bytes = src.len(), "emitted raw source");
    let formatted = gofmt::format_source(&src)?;
    Ok(formatted.trim().to_owned())
}

//! Schema graph walker
//!
//! Visits every type position of an IDL document in document order:
//! instruction args then returns, type definitions (struct fields, enum
//! variant fields, aliases), then constants. Nested types (option, vec,
//! array element, generic arguments) are visited right after their parent.

use std::fmt;
use std::ops::ControlFlow;

use super::types::{Idl, IdlDefinedFields, IdlGenericArg, IdlType, IdlTypeDefTy};

/// One access step from the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

/// Access path from the document root, rendered like `/idl/instructions/[2]/args/[0]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePath {
    segments: Vec<PathSegment>,
}

impl TypePath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/idl")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, "/{}", key)?,
                PathSegment::Index(i) => write!(f, "/[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// Walk every type position of `idl`.
///
/// `visit` receives the path and the type (`None` where the document holds
/// `null`); returning `false` stops the walk. Returns `true` when the walk
/// ran to completion.
pub fn walk_types<F>(idl: &Idl, visit: F) -> bool
where
    F: FnMut(&TypePath, Option<&IdlType>) -> bool,
{
    let mut walker = Walker {
        path: TypePath::default(),
        visit,
    };
    walker.idl(idl).is_continue()
}

struct Walker<F> {
    path: TypePath,
    visit: F,
}

impl<F> Walker<F>
where
    F: FnMut(&TypePath, Option<&IdlType>) -> bool,
{
    fn scoped(
        &mut self,
        segment: PathSegment,
        inner: impl FnOnce(&mut Self) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.path.push(segment);
        let flow = inner(self);
        self.path.pop();
        flow
    }

    fn at(
        &mut self,
        key: &'static str,
        index: usize,
        inner: impl FnOnce(&mut Self) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.scoped(PathSegment::Key(key), |w| {
            w.scoped(PathSegment::Index(index), inner)
        })
    }

    fn idl(&mut self, idl: &Idl) -> ControlFlow<()> {
        for (i, ix) in idl.instructions.iter().enumerate() {
            self.at("instructions", i, |w| {
                for (j, arg) in ix.args.iter().enumerate() {
                    w.at("args", j, |w| w.ty(Some(&arg.ty)))?;
                }
                if let Some(returns) = &ix.returns {
                    w.scoped(PathSegment::Key("returns"), |w| w.ty(Some(returns)))?;
                }
                ControlFlow::Continue(())
            })?;
        }

        for (i, def) in idl.types.iter().enumerate() {
            self.at("types", i, |w| match &def.ty {
                IdlTypeDefTy::Struct { fields } => match fields {
                    Some(fields) => w.fields(fields),
                    None => ControlFlow::Continue(()),
                },
                IdlTypeDefTy::Enum { variants } => {
                    for (k, variant) in variants.iter().enumerate() {
                        if let Some(fields) = &variant.fields {
                            w.at("variants", k, |w| w.fields(fields))?;
                        }
                    }
                    ControlFlow::Continue(())
                }
                IdlTypeDefTy::Type { alias } => {
                    w.scoped(PathSegment::Key("alias"), |w| w.ty(Some(alias)))
                }
            })?;
        }

        for (i, constant) in idl.constants.iter().enumerate() {
            self.at("constants", i, |w| w.ty(Some(&constant.ty)))?;
        }

        ControlFlow::Continue(())
    }

    fn fields(&mut self, fields: &IdlDefinedFields) -> ControlFlow<()> {
        match fields {
            IdlDefinedFields::Named(named) => {
                for (j, field) in named.iter().enumerate() {
                    self.at("fields", j, |w| w.ty(Some(&field.ty)))?;
                }
            }
            IdlDefinedFields::Tuple(types) => {
                for (j, ty) in types.iter().enumerate() {
                    self.at("fields", j, |w| w.ty(Some(ty)))?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn ty(&mut self, ty: Option<&IdlType>) -> ControlFlow<()> {
        if !(self.visit)(&self.path, ty) {
            return ControlFlow::Break(());
        }

        match ty {
            Some(IdlType::Option(inner)) => {
                self.scoped(PathSegment::Key("option"), |w| w.ty(inner.as_deref()))
            }
            Some(IdlType::COption(inner)) => {
                self.scoped(PathSegment::Key("coption"), |w| w.ty(inner.as_deref()))
            }
            Some(IdlType::Vec(inner)) => {
                self.scoped(PathSegment::Key("vec"), |w| w.ty(inner.as_deref()))
            }
            Some(IdlType::Array(inner, _)) => {
                self.scoped(PathSegment::Key("array"), |w| w.ty(inner.as_deref()))
            }
            Some(IdlType::Defined { generics, .. }) => {
                for (i, arg) in generics.iter().enumerate() {
                    if let IdlGenericArg::Type { ty } = arg {
                        self.at("generics", i, |w| w.ty(Some(ty)))?;
                    }
                }
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::parse_idl;

    const DOC: &str = r#"{
        "metadata": {"name": "walk", "version": "0.1.0", "spec": "0.1.0"},
        "instructions": [
            {
                "name": "first",
                "discriminator": [1, 2, 3, 4, 5, 6, 7, 8],
                "accounts": [],
                "args": [
                    {"name": "a", "type": "u8"},
                    {"name": "b", "type": {"vec": {"defined": {"name": "Foo"}}}}
                ],
                "returns": "u64"
            }
        ],
        "types": [
            {
                "name": "Foo",
                "type": {"kind": "struct", "fields": [{"name": "x", "type": {"option": null}}]}
            },
            {
                "name": "Choice",
                "type": {"kind": "enum", "variants": [{"name": "A"}, {"name": "B", "fields": ["bool"]}]}
            }
        ],
        "constants": [{"name": "MAX", "type": "u16", "value": "10"}]
    }"#;

    fn collect(idl: &Idl) -> Vec<(String, Option<IdlType>)> {
        let mut seen = Vec::new();
        walk_types(idl, |path, ty| {
            seen.push((path.to_string(), ty.cloned()));
            true
        });
        seen
    }

    #[test]
    fn test_document_order_and_paths() {
        let idl = parse_idl(DOC).unwrap();
        let paths: Vec<String> = collect(&idl).into_iter().map(|(p, _)| p).collect();

        assert_eq!(
            paths,
            vec![
                "/idl/instructions/[0]/args/[0]",
                "/idl/instructions/[0]/args/[1]",
                "/idl/instructions/[0]/args/[1]/vec",
                "/idl/instructions/[0]/returns",
                "/idl/types/[0]/fields/[0]",
                "/idl/types/[0]/fields/[0]/option",
                "/idl/types/[1]/variants/[1]/fields/[0]",
                "/idl/constants/[0]",
            ]
        );
    }

    #[test]
    fn test_null_slot_passed_through() {
        let idl = parse_idl(DOC).unwrap();
        let seen = collect(&idl);
        let (path, ty) = &seen[5];
        assert_eq!(path, "/idl/types/[0]/fields/[0]/option");
        assert!(ty.is_none());
    }

    #[test]
    fn test_short_circuit() {
        let idl = parse_idl(DOC).unwrap();
        let mut visited = 0;
        let completed = walk_types(&idl, |_, ty| {
            visited += 1;
            !matches!(ty, Some(IdlType::Vec(_)))
        });
        assert!(!completed);
        assert_eq!(visited, 2);
    }
}

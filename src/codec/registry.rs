//! Immutable lookup of type definitions by name
//!
//! Built once from `idl.types` before any derivation; nothing mutates it
//! afterwards, so derivation order never changes what it reports.

use std::collections::{HashMap, HashSet};

use crate::idl::{Idl, IdlTypeDef};

#[derive(Debug, Clone)]
pub struct TypeRegistry<'a> {
    ordered: Vec<&'a IdlTypeDef>,
    defs: HashMap<&'a str, &'a IdlTypeDef>,
    complex_enums: HashSet<&'a str>,
}

impl<'a> TypeRegistry<'a> {
    /// Index type definitions; on duplicate names the first definition wins
    pub fn new(types: &'a [IdlTypeDef]) -> Self {
        let mut ordered = Vec::with_capacity(types.len());
        let mut defs = HashMap::with_capacity(types.len());
        let mut complex_enums = HashSet::new();

        for def in types {
            if defs.contains_key(def.name.as_str()) {
                continue;
            }
            defs.insert(def.name.as_str(), def);
            ordered.push(def);
            if def.ty.is_complex_enum() {
                complex_enums.insert(def.name.as_str());
            }
        }

        Self {
            ordered,
            defs,
            complex_enums,
        }
    }

    pub fn from_idl(idl: &'a Idl) -> Self {
        Self::new(&idl.types)
    }

    pub fn get(&self, name: &str) -> Option<&'a IdlTypeDef> {
        self.defs.get(name).copied()
    }

    /// Definitions in document order
    pub fn iter(&self) -> impl Iterator<Item = &'a IdlTypeDef> + '_ {
        self.ordered.iter().copied()
    }

    /// True when `name` is an enum with at least one payload-carrying variant
    pub fn is_complex_enum(&self, name: &str) -> bool {
        self.complex_enums.contains(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

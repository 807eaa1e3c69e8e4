//! Whole-document IDL validation
//!
//! All checks run independently and accumulate into one `ValidationErrors`
//! so a single pass reports every problem.

use std::collections::{BTreeMap, BTreeSet};

use heck::ToUpperCamelCase;
use log::debug;

use super::types::{Idl, IdlType};
use super::walk::walk_types;
use crate::discriminator::DISCRIMINATOR_LEN;
use crate::error::{DiscriminatorIssue, ValidationErrors};

/// Validate an IDL document.
pub fn validate(idl: &Idl) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_references(idl, &mut errors);
    check_type_names(idl, &mut errors);
    check_discriminators(idl, &mut errors);
    check_instruction_names(idl, &mut errors);

    if errors.is_empty() {
        debug!("IDL `{}` passed validation", idl.metadata.name);
        Ok(())
    } else {
        debug!(
            "IDL `{}` failed validation with {} problem(s)",
            idl.metadata.name,
            errors.len()
        );
        Err(errors)
    }
}

/// Every referenced name (defined types, accounts, events) must have a type definition
fn check_references(idl: &Idl, errors: &mut ValidationErrors) {
    let mut wanted = BTreeSet::new();

    walk_types(idl, |path, ty| {
        match ty {
            Some(IdlType::Defined { name, .. }) => {
                wanted.insert(name.clone());
            }
            None => errors.missing_types.push(path.to_string()),
            _ => {}
        }
        true
    });

    wanted.extend(idl.accounts.iter().map(|a| a.name.clone()));
    wanted.extend(idl.events.iter().map(|e| e.name.clone()));

    let defined: BTreeSet<&str> = idl.types.iter().map(|t| t.name.as_str()).collect();
    errors.not_resolved_types = wanted
        .into_iter()
        .filter(|name| !defined.contains(name.as_str()))
        .collect();
}

fn check_type_names(idl: &Idl, errors: &mut ValidationErrors) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for def in &idl.types {
        *counts.entry(def.name.as_str()).or_default() += 1;
    }

    errors.duplicate_defined_type_names = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(name, _)| name.to_string())
        .collect();

    errors.invalid_type_names = counts
        .keys()
        .filter(|name| !is_valid_type_name(name))
        .map(|name| name.to_string())
        .collect();
}

/// Matches `[A-Za-z0-9_:]+`
pub fn is_valid_type_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Supplied discriminators must be 8 bytes; an empty one means "compute it"
fn check_discriminators(idl: &Idl, errors: &mut ValidationErrors) {
    let supplied = idl
        .accounts
        .iter()
        .map(|a| ("account", &a.name, &a.discriminator))
        .chain(
            idl.events
                .iter()
                .map(|e| ("event", &e.name, &e.discriminator)),
        )
        .chain(
            idl.instructions
                .iter()
                .map(|ix| ("instruction", &ix.name, &ix.discriminator)),
        );

    for (kind, name, discriminator) in supplied {
        if !discriminator.is_empty() && discriminator.len() != DISCRIMINATOR_LEN {
            errors.invalid_discriminators.push(DiscriminatorIssue {
                kind,
                name: name.clone(),
                len: discriminator.len(),
            });
        }
    }
}

/// Instruction names must be unique raw and after camel-case normalization
fn check_instruction_names(idl: &Idl, errors: &mut ValidationErrors) {
    let mut raw_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut normalized: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();

    for ix in &idl.instructions {
        *raw_counts.entry(ix.name.as_str()).or_default() += 1;
        normalized
            .entry(ix.name.to_upper_camel_case())
            .or_default()
            .insert(ix.name.as_str());
    }

    for (name, count) in raw_counts {
        if count > 1 {
            errors.duplicate_instruction_names.push(name.to_string());
        }
    }

    for (ident, raw_names) in normalized {
        if raw_names.len() > 1 {
            let names: Vec<&str> = raw_names.into_iter().collect();
            errors
                .duplicate_instruction_names
                .push(format!("{} (all normalize to {})", names.join(" / "), ident));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::parse_idl;

    fn doc(instructions: &str, accounts: &str, types: &str) -> Idl {
        parse_idl(&format!(
            r#"{{
                "metadata": {{"name": "v", "version": "0.1.0", "spec": "0.1.0"}},
                "instructions": {instructions},
                "accounts": {accounts},
                "types": {types}
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_clean_document() {
        let idl = doc(
            r#"[{"name": "init", "accounts": [], "args": [{"name": "cfg", "type": {"defined": {"name": "Config"}}}]}]"#,
            r#"[{"name": "Config", "discriminator": [1,2,3,4,5,6,7,8]}]"#,
            r#"[{"name": "Config", "type": {"kind": "struct", "fields": [{"name": "admin", "type": "pubkey"}]}}]"#,
        );
        assert_eq!(validate(&idl), Ok(()));
    }

    #[test]
    fn test_not_resolved() {
        let idl = doc(
            r#"[{"name": "init", "accounts": [], "args": [{"name": "f", "type": {"option": {"defined": {"name": "Foo"}}}}]}]"#,
            r#"[{"name": "Vault", "discriminator": [1,2,3,4,5,6,7,8]}]"#,
            "[]",
        );
        let errors = validate(&idl).unwrap_err();
        assert_eq!(errors.not_resolved_types, vec!["Foo", "Vault"]);
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let idl = doc(
            "[]",
            "[]",
            r#"[
                {"name": "Bar", "type": {"kind": "struct"}},
                {"name": "Bar", "type": {"kind": "struct"}},
                {"name": "Bad-Name", "type": {"kind": "struct"}}
            ]"#,
        );
        let errors = validate(&idl).unwrap_err();
        assert_eq!(errors.duplicate_defined_type_names, vec!["Bar"]);
        assert_eq!(errors.invalid_type_names, vec!["Bad-Name"]);
    }

    #[test]
    fn test_discriminator_length() {
        let idl = doc(
            "[]",
            r#"[{"name": "Short", "discriminator": [1,2,3]}]"#,
            r#"[{"name": "Short", "type": {"kind": "struct"}}]"#,
        );
        let errors = validate(&idl).unwrap_err();
        assert_eq!(errors.invalid_discriminators.len(), 1);
        assert_eq!(errors.invalid_discriminators[0].len, 3);
    }

    #[test]
    fn test_instruction_name_collisions() {
        let idl = doc(
            r#"[
                {"name": "initialize_pool", "accounts": [], "args": []},
                {"name": "initializePool", "accounts": [], "args": []},
                {"name": "close", "accounts": [], "args": []},
                {"name": "close", "accounts": [], "args": []}
            ]"#,
            "[]",
            "[]",
        );
        let errors = validate(&idl).unwrap_err();
        assert_eq!(errors.duplicate_instruction_names.len(), 2);
        assert_eq!(errors.duplicate_instruction_names[0], "close");
        assert!(errors.duplicate_instruction_names[1].contains("InitializePool"));
    }

    #[test]
    fn test_missing_type_reported() {
        let idl = doc(
            r#"[{"name": "init", "accounts": [], "args": [{"name": "v", "type": {"vec": null}}]}]"#,
            "[]",
            "[]",
        );
        let errors = validate(&idl).unwrap_err();
        assert_eq!(
            errors.missing_types,
            vec!["/idl/instructions/[0]/args/[0]/vec"]
        );
    }

    #[test]
    fn test_all_problems_reported_together() {
        let idl = doc(
            r#"[{"name": "a", "accounts": [], "args": [{"name": "x", "type": {"defined": {"name": "Missing"}}}]},
                {"name": "a", "accounts": [], "args": []}]"#,
            r#"[{"name": "Dup", "discriminator": [1]}]"#,
            r#"[{"name": "Dup", "type": {"kind": "struct"}}, {"name": "Dup", "type": {"kind": "struct"}}]"#,
        );
        let errors = validate(&idl).unwrap_err();
        assert_eq!(errors.not_resolved_types, vec!["Missing"]);
        assert_eq!(errors.duplicate_defined_type_names, vec!["Dup"]);
        assert_eq!(errors.invalid_discriminators.len(), 1);
        assert_eq!(errors.duplicate_instruction_names, vec!["a"]);
        assert_eq!(errors.len(), 4);
    }
}

//! Flattening of nested instruction account groups

use super::types::{IdlInstructionAccount, IdlInstructionAccountItem};

/// One account slot with the names of the groups enclosing it
#[derive(Debug, Clone, PartialEq)]
pub struct FlatAccount<'a> {
    pub groups: Vec<&'a str>,
    pub account: &'a IdlInstructionAccount,
}

impl FlatAccount<'_> {
    /// Group path and account name joined with `.`
    pub fn qualified_name(&self) -> String {
        let mut parts = self.groups.clone();
        parts.push(&self.account.name);
        parts.join(".")
    }
}

/// Flatten an account tree depth-first, in declaration order
pub fn flatten_accounts(items: &[IdlInstructionAccountItem]) -> Vec<FlatAccount<'_>> {
    let mut flat = Vec::new();
    let mut groups = Vec::new();
    collect(items, &mut groups, &mut flat);
    flat
}

fn collect<'a>(
    items: &'a [IdlInstructionAccountItem],
    groups: &mut Vec<&'a str>,
    flat: &mut Vec<FlatAccount<'a>>,
) {
    for item in items {
        match item {
            IdlInstructionAccountItem::Single(account) => flat.push(FlatAccount {
                groups: groups.clone(),
                account,
            }),
            IdlInstructionAccountItem::Composite(group) => {
                groups.push(&group.name);
                collect(&group.accounts, groups, flat);
                groups.pop();
            }
        }
    }
}

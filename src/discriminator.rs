//! Discriminator derivation
//!
//! A discriminator is the first 8 bytes of `sha256("<namespace>:<name>")`.
//! Instructions use the `global` namespace with the name normalized to
//! snake_case; accounts and events hash their declared name as-is.

use log::debug;
use sha2::{Digest, Sha256};

use crate::error::DerivationError;

/// Length of every discriminator
pub const DISCRIMINATOR_LEN: usize = 8;

pub type Discriminator = [u8; DISCRIMINATOR_LEN];

/// What a discriminator identifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscriminatorKind {
    Account,
    Event,
    Instruction,
}

impl DiscriminatorKind {
    /// Hash namespace for this kind
    pub fn namespace(self) -> &'static str {
        match self {
            DiscriminatorKind::Account => "account",
            DiscriminatorKind::Event => "event",
            DiscriminatorKind::Instruction => "global",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscriminatorKind::Account => "account",
            DiscriminatorKind::Event => "event",
            DiscriminatorKind::Instruction => "instruction",
        }
    }
}

/// First 8 bytes of `sha256("<namespace>:<name>")`
pub fn sighash(namespace: &str, name: &str) -> Discriminator {
    let preimage = format!("{}:{}", namespace, name);
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    let hash = hasher.finalize();

    let mut result = [0u8; DISCRIMINATOR_LEN];
    result.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    result
}

/// Compute the discriminator for a named account, event or instruction
pub fn compute(kind: DiscriminatorKind, name: &str) -> Discriminator {
    match kind {
        DiscriminatorKind::Instruction => sighash(kind.namespace(), &to_snake_case(name)),
        DiscriminatorKind::Account | DiscriminatorKind::Event => sighash(kind.namespace(), name),
    }
}

/// Use the supplied discriminator when present, otherwise compute one.
pub fn resolve(
    kind: DiscriminatorKind,
    name: &str,
    supplied: &[u8],
) -> Result<Discriminator, DerivationError> {
    if supplied.is_empty() {
        debug!("No discriminator supplied for {} `{}`, computing", kind.label(), name);
        return Ok(compute(kind, name));
    }

    supplied
        .try_into()
        .map_err(|_| DerivationError::DiscriminatorLength {
            kind: kind.label(),
            name: name.to_string(),
            len: supplied.len(),
        })
}

#[derive(Clone, Copy, PartialEq)]
enum WordMode {
    /// No lowercase or uppercase characters seen in the current word yet
    Boundary,
    /// Previous cased character was lowercase
    Lowercase,
    /// Previous cased character was uppercase
    Uppercase,
}

/// Normalize an identifier to snake_case.
///
/// The input is split into words at non-alphanumeric characters. Inside a
/// word a break is inserted after a lowercase run followed by an uppercase
/// character, and before the last capital of an uppercase run that is
/// followed by a lowercase character, so acronyms split as
/// `XMLHttpRequest` -> `xml_http_request`.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut first_word = true;

    let mut emit = |word: &str, out: &mut String| {
        if !first_word {
            out.push('_');
        }
        first_word = false;
        out.extend(word.chars().flat_map(char::to_lowercase));
    };

    for word in s.split(|c: char| !c.is_alphanumeric()) {
        let mut char_indices = word.char_indices().peekable();
        let mut init = 0;
        let mut mode = WordMode::Boundary;

        while let Some((i, c)) = char_indices.next() {
            if c == '_' {
                if init == i {
                    init += 1;
                }
                continue;
            }

            if let Some(&(next_i, next)) = char_indices.peek() {
                let next_mode = if c.is_lowercase() {
                    WordMode::Lowercase
                } else if c.is_uppercase() {
                    WordMode::Uppercase
                } else {
                    mode
                };

                if next == '_' || (next_mode == WordMode::Lowercase && next.is_uppercase()) {
                    emit(&word[init..next_i], &mut out);
                    init = next_i;
                    mode = WordMode::Boundary;
                } else if mode == WordMode::Uppercase && c.is_uppercase() && next.is_lowercase() {
                    emit(&word[init..i], &mut out);
                    init = i;
                    mode = WordMode::Boundary;
                } else {
                    mode = next_mode;
                }
            } else {
                emit(&word[init..], &mut out);
                break;
            }
        }
    }

    out
}

//! IDL model, parsing and validation
//!
//! This module turns Anchor IDL JSON into typed schema values and checks
//! the document as a whole before codecs are derived from it.

pub mod accounts;
pub mod decode;
mod legacy;
mod source;
pub mod trial;
mod types;
pub mod validate;
pub mod walk;

pub use accounts::{flatten_accounts, FlatAccount};
pub use decode::FromValue;
pub use legacy::{legacy_marker, reject_legacy};
pub use source::*;
pub use types::*;
pub use validate::validate;
pub use walk::{walk_types, PathSegment, TypePath};

// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A three-way merge engine for Gettext translation catalogs.
//!
//! Given a local catalog, a remote catalog and their common ancestor, the
//! merge keeps the local structure, integrates the changes the remote
//! side made relative to the ancestor, and renders genuine conflicts as
//! fuzzy entries holding `#-#-#-#-#`-delimited alternatives, in the style
//! `msgcat` uses. The typical front end is a version-control merge driver
//! that wants `.po` conflicts resolved entry by entry instead of line by
//! line.
//!
//! Reading PO syntax is delegated to `polib` through
//! [`reader::read_catalog`]; writing the merged catalog back out is the
//! caller's business. Before anything is compared, the inputs are brought
//! to one encoding: each domain's `charset=` declaration is
//! canonicalized, a target is negotiated from the local side and the
//! message lists are re-encoded (failing hard if that would alter any
//! msgid or msgctxt).
//!
//! ```no_run
//! use std::path::Path;
//! use po_3way_merge::{merge_3way, CatalogSyntax};
//!
//! # fn main() -> Result<(), po_3way_merge::MergeError> {
//! let outcome = merge_3way(
//!     Path::new("local.po"),
//!     Path::new("remote.po"),
//!     Path::new("ancestor.po"),
//!     CatalogSyntax::Po,
//!     None,
//! )?;
//! if outcome.has_merges {
//!     eprintln!("catalogs disagreed; conflict entries are marked fuzzy");
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod merge;
pub mod reader;

mod alternative;
mod charset;
mod header;
mod ident;

pub use catalog::{Catalog, Domain, Message, MessageKey, MessageList, DEFAULT_DOMAIN};
pub use error::MergeError;
pub use merge::{merge_3way, merge_catalogs, MergeInput, MergeOutcome};
pub use reader::{read_catalog, CatalogSyntax};

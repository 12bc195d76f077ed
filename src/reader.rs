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

//! Adapter around the external catalog parser.
//!
//! Parsing PO syntax is `polib`'s job; this module only maps what it
//! produces onto the engine's model. polib parses the header entry into a
//! metadata struct, so the header is re-serialized into the message the
//! engine expects, with the `charset=` and `Project-Id-Version:` fields
//! where the charset resolver and the identification builder look for
//! them.
//!
//! Known limits of the polib model: obsolete entries, header comments and
//! header fields outside its metadata set don't survive the trip from
//! disk. The value-based merge API has no such limits.

use std::path::Path;

use polib::metadata::CatalogMetadata;
use polib::po_file;

use crate::catalog::{Catalog, Domain, Message, DEFAULT_DOMAIN};
use crate::error::MergeError;

/// Which catalog dialect to parse. Passed through untouched to the
/// reader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CatalogSyntax {
    /// GNU Gettext PO files.
    #[default]
    Po,
}

/// Parse the catalog at `path`.
pub fn read_catalog(path: &Path, syntax: CatalogSyntax) -> Result<Catalog, MergeError> {
    match syntax {
        CatalogSyntax::Po => read_po(path),
    }
}

fn read_po(path: &Path) -> Result<Catalog, MergeError> {
    let parse_error = |message: String| MergeError::Parse {
        file: path.display().to_string(),
        message,
    };
    let parsed = po_file::parse(path).map_err(|err| parse_error(err.to_string()))?;

    let mut domain = Domain::new(DEFAULT_DOMAIN);
    if let Some(header) = header_message(&parsed.metadata) {
        domain.messages.push(header);
    }
    for view in parsed.messages() {
        // Singular access fails on plural messages and vice versa.
        let translation = match view.msgstr() {
            Ok(singular) => singular.as_bytes().to_vec(),
            Err(_) => view
                .msgstr_plural()
                .map_err(|err| parse_error(err.to_string()))?
                .join("\0")
                .into_bytes(),
        };
        let context = view.msgctxt();
        domain.messages.push(Message {
            context: context
                .filter(|context| !context.is_empty())
                .map(String::from),
            id: String::from(view.msgid()),
            translation,
            is_fuzzy: view.is_fuzzy(),
            obsolete: false,
            comments: split_lines(view.translator_comments()),
            extracted_comments: Vec::new(),
        });
    }

    Ok(Catalog {
        domains: vec![domain],
        encoding: None,
    })
}

/// Rebuild the header entry from polib's metadata.
///
/// Only non-empty fields are emitted, in the usual PO order. A catalog
/// with no metadata at all gets no header entry.
fn header_message(metadata: &CatalogMetadata) -> Option<Message> {
    let fields = [
        ("Project-Id-Version", metadata.project_id_version.as_str()),
        ("POT-Creation-Date", metadata.pot_creation_date.as_str()),
        ("PO-Revision-Date", metadata.po_revision_date.as_str()),
        ("Language", metadata.language.as_str()),
        ("MIME-Version", metadata.mime_version.as_str()),
        ("Content-Type", metadata.content_type.as_str()),
        (
            "Content-Transfer-Encoding",
            metadata.content_transfer_encoding.as_str(),
        ),
    ];
    let mut header = String::new();
    for (name, value) in fields {
        if value.is_empty() {
            continue;
        }
        header.push_str(name);
        header.push_str(": ");
        header.push_str(value);
        header.push('\n');
    }
    if header.is_empty() {
        return None;
    }
    Some(Message {
        translation: header.into_bytes(),
        ..Message::default()
    })
}

fn split_lines(comments: &str) -> Vec<String> {
    if comments.is_empty() {
        return Vec::new();
    }
    comments.lines().map(String::from).collect()
}

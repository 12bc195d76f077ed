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

//! Identification labels for conflict markers.
//!
//! When the merge records a conflict it labels each contender with a short
//! human-readable tag naming the side it came from: the file's basename,
//! the domain for secondary domains, and the `Project-Id-Version` of the
//! header when one is declared.

use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::catalog::{Catalog, MessageList};

fn project_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Project-Id-Version: *([^\n]*)").unwrap())
}

/// The `Project-Id-Version` value of the first non-obsolete header that
/// carries the field, if it is non-empty.
fn project_id(messages: &MessageList) -> Option<String> {
    for message in messages {
        if !message.is_header() || message.obsolete {
            continue;
        }
        if let Some(value) = project_id_pattern()
            .captures(&message.translation)
            .and_then(|captures| captures.get(1))
        {
            let value = value.as_bytes();
            if value.is_empty() {
                return None;
            }
            return Some(String::from_utf8_lossy(value).into_owned());
        }
    }
    None
}

/// Build the label for every domain of one input.
pub(crate) fn identifications(catalog: &Catalog, file: &Path) -> Vec<String> {
    let basename = file.file_name().map_or_else(
        || file.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    catalog
        .domains
        .iter()
        .enumerate()
        .map(
            |(index, domain)| match (project_id(&domain.messages), index) {
                (Some(project_id), 0) => format!("{basename} ({project_id})"),
                (Some(project_id), _) => format!("{basename}:{} ({project_id})", domain.name),
                (None, 0) => basename.clone(),
                (None, _) => format!("{basename}:{}", domain.name),
            },
        )
        .collect()
}

/// Decorate an identification as a conflict-marker line.
pub(crate) fn conflict_marker(identification: &str) -> String {
    format!("#-#-#-#-#  {identification}  #-#-#-#-#")
}

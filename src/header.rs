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

//! Header-entry reconciliation.
//!
//! Header entries are merged apart from ordinary messages: copyright
//! comments from both sides are unioned, and the translation of the side
//! with the later `PO-Revision-Date` wins.

use crate::catalog::Message;

const REVISION_DATE_FIELD: &[u8] = b"PO-Revision-Date:";

/// Merge the remote header entry into the local one.
pub(crate) fn reconcile(local: &mut Message, remote: &Message) {
    for line in &remote.comments {
        if line.to_ascii_lowercase().contains("copyright") && !local.comments.contains(line) {
            local.comments.push(line.clone());
        }
    }

    if remote.translation.is_empty() {
        return;
    }
    if local.translation.is_empty() || remote_is_newer(&local.translation, &remote.translation) {
        local.translation = remote.translation.clone();
    }
}

/// The revision-date text: everything after `PO-Revision-Date:` up to the
/// end of the line. Leading whitespace is stripped on both sides so that
/// differing field spacing cannot skew the comparison.
fn revision_date(header: &[u8]) -> Option<&[u8]> {
    let start = find(header, REVISION_DATE_FIELD)? + REVISION_DATE_FIELD.len();
    let rest = &header[start..];
    let end = rest.iter().position(|&byte| byte == b'\n').unwrap_or(rest.len());
    Some(rest[..end].trim_ascii_start())
}

/// Revision dates are ISO-ordered, so a byte-wise comparison picks the
/// more recent side. A missing field on either side, and a tie, keep the
/// local side.
fn remote_is_newer(local: &[u8], remote: &[u8]) -> bool {
    match (revision_date(local), revision_date(remote)) {
        (Some(local), Some(remote)) => remote > local,
        _ => false,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

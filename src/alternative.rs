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

//! Reduction of recorded alternatives into final entries.
//!
//! When both sides changed the same entry, the merge pass records each
//! contender as an [`Alternative`] and leaves the entry itself empty. This
//! module runs afterwards and collapses every alternative set: agreeing
//! alternatives reduce to their common value, disagreeing ones become a
//! conflict block of `#-#-#-#-#` marker lines and the entry is marked
//! fuzzy.

use std::mem;

use crate::catalog::{plural_forms, Message};

/// One contender for a conflicting entry.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Alternative {
    /// Decorated marker line naming the side this contender came from.
    pub(crate) id: String,
    pub(crate) translation: Vec<u8>,
    pub(crate) comments: Vec<String>,
    pub(crate) extracted_comments: Vec<String>,
}

impl Alternative {
    /// Move the message's translation and comments into a new alternative,
    /// leaving the message empty.
    pub(crate) fn capture(id: String, message: &mut Message) -> Alternative {
        Alternative {
            id,
            translation: mem::take(&mut message.translation),
            comments: mem::take(&mut message.comments),
            extracted_comments: mem::take(&mut message.extracted_comments),
        }
    }

    /// Copy a counterpart message from the other side.
    pub(crate) fn snapshot(id: String, message: &Message) -> Alternative {
        Alternative {
            id,
            translation: message.translation.clone(),
            comments: message.comments.clone(),
            extracted_comments: message.extracted_comments.clone(),
        }
    }
}

/// Collapse `alternatives` into `message`.
///
/// Returns true when any conflict block was emitted, for the translation,
/// the comments or the extracted comments.
pub(crate) fn resolve(message: &mut Message, alternatives: Vec<Alternative>) -> bool {
    let Some(first) = alternatives.first() else {
        return false;
    };
    let mut merged = false;

    if alternatives
        .iter()
        .all(|alternative| alternative.translation == first.translation)
    {
        message.translation = first.translation.clone();
    } else {
        message.translation = concat_translations(&alternatives);
        message.is_fuzzy = true;
        merged = true;
    }

    merged |= reduce_comment_lists(&mut message.comments, &alternatives, |alternative| {
        alternative.comments.as_slice()
    });
    merged |= reduce_comment_lists(
        &mut message.extracted_comments,
        &alternatives,
        |alternative| alternative.extracted_comments.as_slice(),
    );
    merged
}

/// Concatenate disagreeing translations, plural index by plural index.
///
/// Every plural index present in any alternative yields one marker-plus-
/// form block per alternative that has a form there, then a NUL closes
/// the plural. A newline separates blocks whose predecessor ends in
/// neither NUL nor newline.
fn concat_translations(alternatives: &[Alternative]) -> Vec<u8> {
    let mut forms: Vec<_> = alternatives
        .iter()
        .map(|alternative| plural_forms(&alternative.translation).peekable())
        .collect();
    let mut buffer = Vec::new();
    loop {
        if forms.iter_mut().all(|forms| forms.peek().is_none()) {
            break;
        }
        for (alternative, forms) in alternatives.iter().zip(&mut forms) {
            let Some(form) = forms.next() else { continue };
            if buffer
                .last()
                .is_some_and(|&last| last != 0 && last != b'\n')
            {
                buffer.push(b'\n');
            }
            buffer.extend_from_slice(alternative.id.as_bytes());
            buffer.push(b'\n');
            buffer.extend_from_slice(form);
        }
        buffer.push(0);
    }
    if buffer.last() == Some(&0) {
        buffer.pop();
    }
    buffer
}

/// Shared reduction for comments and extracted comments: adopt the common
/// list when all alternatives agree on a non-empty one, otherwise
/// concatenate the non-empty lists behind their marker lines.
fn reduce_comment_lists<'a>(
    target: &mut Vec<String>,
    alternatives: &'a [Alternative],
    lines: impl Fn(&'a Alternative) -> &'a [String],
) -> bool {
    let Some(first) = alternatives.first() else {
        return false;
    };
    let first = lines(first);
    if alternatives
        .iter()
        .all(|alternative| !lines(alternative).is_empty() && lines(alternative) == first)
    {
        *target = first.to_vec();
        return false;
    }
    let mut emitted = false;
    for alternative in alternatives {
        let lines = lines(alternative);
        if lines.is_empty() {
            continue;
        }
        target.push(alternative.id.clone());
        target.extend(lines.iter().cloned());
        emitted = true;
    }
    emitted
}

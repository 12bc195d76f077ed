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

//! The three-way merge passes and the public entry points.
//!
//! The merge runs as a single-threaded pipeline: read the three catalogs,
//! normalize their charsets, walk the local side (pass 1), append what the
//! remote side added (pass 2), then collapse recorded alternatives.
//!
//! Pass 1 decides, entry by entry, whether to keep the local translation,
//! adopt the remote one, propagate a remote deletion, or record both sides
//! as alternatives. Pass 2 picks up remote entries pass 1 never consumed.
//! The merged catalog is self-contained: every translation it holds is a
//! copy, never a borrow from an input.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::alternative::{self, Alternative};
use crate::catalog::{Catalog, Domain, Message, MessageKey, MessageList};
use crate::charset;
use crate::error::MergeError;
use crate::header;
use crate::ident;
use crate::reader::{self, CatalogSyntax};

/// One side of the merge: a parsed catalog plus the path it came from.
///
/// The path supplies the basename for conflict markers and the `.pot`
/// special case during charset detection.
#[derive(Clone, Debug)]
pub struct MergeInput {
    pub catalog: Catalog,
    pub path: PathBuf,
}

impl MergeInput {
    pub fn new(catalog: Catalog, path: impl Into<PathBuf>) -> MergeInput {
        MergeInput {
            catalog,
            path: path.into(),
        }
    }

    /// Parse the catalog at `path` with the external reader.
    pub fn read(path: &Path, syntax: CatalogSyntax) -> Result<MergeInput, MergeError> {
        Ok(MergeInput {
            catalog: reader::read_catalog(path, syntax)?,
            path: path.to_path_buf(),
        })
    }
}

/// The result of a merge.
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    /// The merged catalog, with every alternative set resolved.
    pub catalog: Catalog,
    /// True when at least one conflict block was emitted. Serializers use
    /// this to warn that the output contains fuzzy conflict entries.
    pub has_merges: bool,
    /// Non-fatal diagnostics, currently only charset-mixture notices.
    pub warnings: Vec<String>,
}

/// Three-way merge of the catalogs at the given paths.
///
/// `a_path` is the local side whose structure the result keeps, `b_path`
/// the remote side whose changes relative to `origin_path` (the common
/// ancestor) are integrated. `target_code` forces an output encoding;
/// without it the local side's charsets negotiate one.
pub fn merge_3way(
    a_path: &Path,
    b_path: &Path,
    origin_path: &Path,
    syntax: CatalogSyntax,
    target_code: Option<&str>,
) -> Result<MergeOutcome, MergeError> {
    let a = MergeInput::read(a_path, syntax)?;
    let b = MergeInput::read(b_path, syntax)?;
    let origin = MergeInput::read(origin_path, syntax)?;
    merge_catalogs(a, b, origin, target_code)
}

/// Three-way merge of already-parsed catalogs.
pub fn merge_catalogs(
    mut a: MergeInput,
    mut b: MergeInput,
    mut origin: MergeInput,
    target_code: Option<&str>,
) -> Result<MergeOutcome, MergeError> {
    let mut warnings = Vec::new();

    let a_charsets = charset::resolve_charsets(&a.catalog, &a.path)?;
    let b_charsets = charset::resolve_charsets(&b.catalog, &b.path)?;
    let origin_charsets = charset::resolve_charsets(&origin.catalog, &origin.path)?;

    let a_idents = ident::identifications(&a.catalog, &a.path);
    let b_idents = ident::identifications(&b.catalog, &b.path);

    if let Some(target) = charset::select_target(target_code, &a_charsets, &mut warnings)? {
        let explicit = target_code.is_some();
        charset::convert_catalog(&mut a.catalog, &a_charsets, target, explicit, &a.path)?;
        charset::convert_catalog(&mut b.catalog, &b_charsets, target, explicit, &b.path)?;
        charset::convert_catalog(
            &mut origin.catalog,
            &origin_charsets,
            target,
            explicit,
            &origin.path,
        )?;
    }

    let mut merged: Vec<WorkDomain> = Vec::new();
    let mut consumed: Vec<Vec<bool>> = b
        .catalog
        .domains
        .iter()
        .map(|domain| vec![false; domain.messages.len()])
        .collect();

    pass_local(
        &a,
        &b,
        &origin,
        &a_idents,
        &b_idents,
        &mut merged,
        &mut consumed,
    );
    pass_remote(&b, &origin, &consumed, &mut merged)?;

    let mut has_merges = false;
    let mut catalog = Catalog::default();
    for work_domain in merged {
        let mut messages = MessageList::default();
        for mut entry in work_domain.entries {
            has_merges |= alternative::resolve(&mut entry.message, entry.alternatives);
            messages.push(entry.message);
        }
        catalog.domains.push(Domain {
            name: work_domain.name,
            messages,
        });
    }

    Ok(MergeOutcome {
        catalog,
        has_merges,
        warnings,
    })
}

/// Consumption bookkeeping for a merged entry, the safe rendition of the
/// original signed counter: strong uses lock the counter non-negative,
/// weak uses only accumulate while no strong use was seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Usage {
    strong: u32,
    weak: u32,
}

impl Usage {
    fn note_strong(&mut self) {
        self.weak = 0;
        self.strong += 1;
    }

    fn note_weak(&mut self) {
        if self.strong == 0 {
            self.weak += 1;
        }
    }

    fn reset(&mut self) {
        *self = Usage::default();
    }
}

/// A merged entry under construction.
#[derive(Clone, Debug)]
struct WorkEntry {
    message: Message,
    usage: Usage,
    alternatives: Vec<Alternative>,
}

/// A merged domain under construction. The key index stands in for the
/// per-message back-pointers of the original design.
#[derive(Clone, Debug)]
struct WorkDomain {
    name: String,
    entries: Vec<WorkEntry>,
    index: HashMap<MessageKey, usize>,
}

impl WorkDomain {
    fn new(name: &str) -> WorkDomain {
        WorkDomain {
            name: String::from(name),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn position(&self, key: &MessageKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Find the entry for `message`'s key, appending a copy when absent.
    fn ensure(&mut self, message: &Message) -> usize {
        let key = message.key();
        if let Some(&index) = self.index.get(&key) {
            return index;
        }
        let index = self.entries.len();
        self.entries.push(WorkEntry {
            message: message.clone(),
            usage: Usage::default(),
            alternatives: Vec::new(),
        });
        self.index.insert(key, index);
        index
    }
}

fn ensure_domain(merged: &mut Vec<WorkDomain>, name: &str) -> usize {
    if let Some(index) = merged.iter().position(|domain| domain.name == name) {
        return index;
    }
    merged.push(WorkDomain::new(name));
    merged.len() - 1
}

fn key_index(messages: &MessageList) -> HashMap<MessageKey, usize> {
    let mut index = HashMap::with_capacity(messages.len());
    for (position, message) in messages.iter().enumerate() {
        index.entry(message.key()).or_insert(position);
    }
    index
}

/// Pass 1: the local side drives.
///
/// Every local entry lands in the output. When a remote counterpart
/// exists and differs from the ancestor, the remote translation is either
/// adopted (local untranslated, local fuzzy against a confident remote,
/// or local unchanged from the ancestor) or recorded as a conflict. A
/// remote deletion is propagated only when the local side still matches
/// the ancestor.
fn pass_local(
    a: &MergeInput,
    b: &MergeInput,
    origin: &MergeInput,
    a_idents: &[String],
    b_idents: &[String],
    merged: &mut Vec<WorkDomain>,
    consumed: &mut [Vec<bool>],
) {
    for (a_index, a_domain) in a.catalog.domains.iter().enumerate() {
        let target_domain = ensure_domain(merged, &a_domain.name);
        let b_side = b.catalog.domain_position(&a_domain.name).map(|index| {
            let messages = &b.catalog.domains[index].messages;
            (index, messages, key_index(messages))
        });
        let origin_side = origin
            .catalog
            .domain(&a_domain.name)
            .map(|domain| (&domain.messages, key_index(&domain.messages)));

        for message in &a_domain.messages {
            let key = message.key();
            let entry_index = merged[target_domain].ensure(message);

            // Fuzzy non-headers and untranslated entries only count as
            // weak uses.
            let weak = (!message.is_header() && message.is_fuzzy) || message.is_untranslated();
            let usage = &mut merged[target_domain].entries[entry_index].usage;
            if weak {
                usage.note_weak();
            } else {
                usage.note_strong();
            }

            // A remote counterpart is consumed even when its empty
            // translation makes it count as absent below.
            let mut remote = None;
            if let Some((b_index, b_messages, b_keys)) = &b_side {
                if let Some(&position) = b_keys.get(&key) {
                    consumed[*b_index][position] = true;
                    remote = b_messages.get(position).map(|remote| (*b_index, remote));
                }
            }
            let remote = remote.filter(|(_, remote)| !remote.is_untranslated());
            let ancestor = origin_side
                .as_ref()
                .and_then(|(messages, keys)| {
                    keys.get(&key).and_then(|&position| messages.get(position))
                })
                .filter(|ancestor| !ancestor.is_untranslated());

            let entry = &mut merged[target_domain].entries[entry_index];

            if message.is_header() {
                if let Some((_, remote)) = remote {
                    header::reconcile(&mut entry.message, remote);
                    continue;
                }
            }

            match (remote, ancestor) {
                (Some((b_index, remote)), ancestor) => {
                    let remote_changed = ancestor
                        .map_or(true, |ancestor| remote.translation != ancestor.translation);
                    if !remote_changed {
                        // Remote agrees with the ancestor; the local entry
                        // stands as copied.
                        continue;
                    }
                    let local_unchanged = ancestor
                        .is_some_and(|ancestor| message.translation == ancestor.translation);
                    if entry.message.is_untranslated()
                        || (entry.message.is_fuzzy && !remote.is_fuzzy)
                        || local_unchanged
                    {
                        entry.message.translation = remote.translation.clone();
                        entry.message.is_fuzzy = remote.is_fuzzy;
                    } else {
                        // Both sides changed the entry: record the two
                        // contenders for the resolver.
                        let local_marker = ident::conflict_marker(&a_idents[a_index]);
                        let remote_marker = ident::conflict_marker(&b_idents[b_index]);
                        let local = Alternative::capture(local_marker, &mut entry.message);
                        entry.alternatives.push(local);
                        entry
                            .alternatives
                            .push(Alternative::snapshot(remote_marker, remote));
                    }
                }
                (None, Some(ancestor)) => {
                    // Remote deleted the entry. Adopt the deletion only
                    // when the local side still matches the ancestor.
                    if entry.message.translation == ancestor.translation {
                        entry.message.translation.clear();
                        entry.usage.reset();
                    }
                }
                (None, None) => {}
            }
        }
    }
}

/// Pass 2: remote entries the first pass never consumed.
///
/// Entries the remote side added or changed relative to the ancestor are
/// appended; entries identical to the ancestor are stale leftovers the
/// local side dropped, and are skipped.
fn pass_remote(
    b: &MergeInput,
    origin: &MergeInput,
    consumed: &[Vec<bool>],
    merged: &mut Vec<WorkDomain>,
) -> Result<(), MergeError> {
    for (b_index, b_domain) in b.catalog.domains.iter().enumerate() {
        let target_domain = ensure_domain(merged, &b_domain.name);
        let origin_side = origin
            .catalog
            .domain(&b_domain.name)
            .map(|domain| (&domain.messages, key_index(&domain.messages)));

        for (position, message) in b_domain.messages.iter().enumerate() {
            if consumed[b_index][position] || message.is_untranslated() {
                continue;
            }
            let key = message.key();
            if merged[target_domain].position(&key).is_some() {
                // Pass 1 marked every key it touched as consumed, so an
                // unconsumed key cannot be in the output already.
                return Err(MergeError::AlgorithmInvariant {
                    id: message.id.clone(),
                });
            }
            let ancestor = origin_side.as_ref().and_then(|(messages, keys)| {
                keys.get(&key).and_then(|&position| messages.get(position))
            });
            if ancestor.map_or(true, |ancestor| message.translation != ancestor.translation) {
                merged[target_domain].ensure(message);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_DOMAIN;
    use pretty_assertions::assert_eq;

    fn message(id: &str, translation: &str) -> Message {
        Message {
            id: String::from(id),
            translation: translation.as_bytes().to_vec(),
            ..Message::default()
        }
    }

    fn fuzzy(mut message: Message) -> Message {
        message.is_fuzzy = true;
        message
    }

    fn catalog(messages: Vec<Message>) -> Catalog {
        let mut domain = Domain::new(DEFAULT_DOMAIN);
        for message in messages {
            domain.messages.push(message);
        }
        Catalog {
            domains: vec![domain],
            encoding: None,
        }
    }

    fn input(name: &str, messages: Vec<Message>) -> MergeInput {
        MergeInput::new(catalog(messages), name)
    }

    fn merge(a: MergeInput, b: MergeInput, origin: MergeInput) -> MergeOutcome {
        merge_catalogs(a, b, origin, None).unwrap()
    }

    fn merged_messages(outcome: &MergeOutcome) -> &MessageList {
        assert_eq!(outcome.catalog.domains.len(), 1);
        &outcome.catalog.domains[0].messages
    }

    #[test]
    fn test_identical_inputs_copy_the_local_side() {
        let entries = vec![message("hello", "bonjour")];
        let a = input("a.po", entries.clone());
        let expected = a.catalog.clone();
        let outcome = merge(
            a,
            input("b.po", entries.clone()),
            input("origin.po", entries),
        );
        assert_eq!(outcome.catalog, expected);
        assert!(!outcome.has_merges);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_remote_addition_is_appended() {
        let outcome = merge(
            input("a.po", vec![]),
            input("b.po", vec![message("cat", "chat")]),
            input("origin.po", vec![]),
        );
        let merged = merged_messages(&outcome);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.find(None, "cat").unwrap().translation, b"chat");
        assert!(!outcome.has_merges);
    }

    #[test]
    fn test_remote_deletion_is_adopted_when_local_agrees_with_ancestor() {
        let outcome = merge(
            input("a.po", vec![message("x", "y")]),
            input("b.po", vec![]),
            input("origin.po", vec![message("x", "y")]),
        );
        let merged = merged_messages(&outcome);
        assert_eq!(merged.len(), 1);
        assert!(merged.find(None, "x").unwrap().translation.is_empty());
    }

    #[test]
    fn test_remote_deletion_is_dropped_when_local_diverged() {
        let outcome = merge(
            input("a.po", vec![message("x", "Y!")]),
            input("b.po", vec![]),
            input("origin.po", vec![message("x", "y")]),
        );
        assert_eq!(
            merged_messages(&outcome).find(None, "x").unwrap().translation,
            b"Y!"
        );
    }

    #[test]
    fn test_both_sides_changed_produces_a_conflict_block() {
        let outcome = merge(
            input("a.po", vec![message("k", "a")]),
            input("b.po", vec![message("k", "b")]),
            input("origin.po", vec![message("k", "o")]),
        );
        let merged = merged_messages(&outcome).find(None, "k").unwrap();
        assert_eq!(
            merged.translation,
            b"#-#-#-#-#  a.po  #-#-#-#-#\na\n#-#-#-#-#  b.po  #-#-#-#-#\nb"
        );
        assert!(merged.is_fuzzy);
        assert!(outcome.has_merges);
    }

    #[test]
    fn test_confident_remote_replaces_fuzzy_local() {
        let outcome = merge(
            input("a.po", vec![fuzzy(message("k", "a"))]),
            input("b.po", vec![message("k", "b")]),
            input("origin.po", vec![message("k", "o")]),
        );
        let merged = merged_messages(&outcome).find(None, "k").unwrap();
        assert_eq!(merged.translation, b"b");
        assert!(!merged.is_fuzzy);
        assert!(!outcome.has_merges);
    }

    #[test]
    fn test_remote_change_over_unchanged_local_is_adopted() {
        let outcome = merge(
            input("a.po", vec![message("k", "o")]),
            input("b.po", vec![message("k", "b")]),
            input("origin.po", vec![message("k", "o")]),
        );
        assert_eq!(
            merged_messages(&outcome).find(None, "k").unwrap().translation,
            b"b"
        );
        assert!(!outcome.has_merges);
    }

    #[test]
    fn test_untranslated_local_adopts_remote() {
        let outcome = merge(
            input("a.po", vec![message("k", "")]),
            input("b.po", vec![message("k", "b")]),
            input("origin.po", vec![]),
        );
        assert_eq!(
            merged_messages(&outcome).find(None, "k").unwrap().translation,
            b"b"
        );
    }

    #[test]
    fn test_identical_changes_do_not_conflict() {
        let outcome = merge(
            input("a.po", vec![message("k", "same")]),
            input("b.po", vec![message("k", "same")]),
            input("origin.po", vec![]),
        );
        let merged = merged_messages(&outcome).find(None, "k").unwrap();
        assert_eq!(merged.translation, b"same");
        assert!(!merged.is_fuzzy);
        assert!(!outcome.has_merges);
    }

    #[test]
    fn test_stale_remote_entry_is_skipped() {
        // The ancestor and the remote agree on an entry the local side
        // dropped entirely; it stays dropped.
        let outcome = merge(
            input("a.po", vec![]),
            input("b.po", vec![message("x", "y")]),
            input("origin.po", vec![message("x", "y")]),
        );
        assert_eq!(merged_messages(&outcome).len(), 0);
    }

    #[test]
    fn test_untranslated_remote_entry_is_not_appended() {
        let outcome = merge(
            input("a.po", vec![]),
            input("b.po", vec![message("x", "")]),
            input("origin.po", vec![]),
        );
        assert_eq!(merged_messages(&outcome).len(), 0);
    }

    #[test]
    fn test_context_distinguishes_entries() {
        let mut in_menu = message("open", "ouvrir");
        in_menu.context = Some(String::from("menu"));
        let plain = message("open", "ouvert");
        let outcome = merge(
            input("a.po", vec![plain.clone(), in_menu.clone()]),
            input("b.po", vec![plain.clone(), in_menu.clone()]),
            input("origin.po", vec![plain, in_menu]),
        );
        let merged = merged_messages(&outcome);
        assert_eq!(merged.find(None, "open").unwrap().translation, b"ouvert");
        assert_eq!(
            merged.find(Some("menu"), "open").unwrap().translation,
            b"ouvrir"
        );
    }

    #[test]
    fn test_merged_keys_are_unique() {
        let outcome = merge(
            input("a.po", vec![message("k", "a"), message("only-a", "x")]),
            input("b.po", vec![message("k", "b"), message("only-b", "y")]),
            input("origin.po", vec![message("k", "o")]),
        );
        let merged = merged_messages(&outcome);
        let mut keys: Vec<_> = merged.iter().map(Message::key).collect();
        let total = keys.len();
        keys.sort_by(|left, right| (&left.context, &left.id).cmp(&(&right.context, &right.id)));
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(total, 3);
    }

    #[test]
    fn test_obsolete_flag_survives_the_merge() {
        let mut obsolete = message("old", "ancien");
        obsolete.obsolete = true;
        let outcome = merge(
            input("a.po", vec![obsolete.clone()]),
            input("b.po", vec![]),
            input("origin.po", vec![]),
        );
        assert!(merged_messages(&outcome).find(None, "old").unwrap().obsolete);
    }

    #[test]
    fn test_comments_follow_the_conflict() {
        let mut local = message("k", "a");
        local.comments = vec![String::from("local note")];
        let mut remote = message("k", "b");
        remote.comments = vec![String::from("remote note")];
        let outcome = merge(
            input("a.po", vec![local]),
            input("b.po", vec![remote]),
            input("origin.po", vec![message("k", "o")]),
        );
        let merged = merged_messages(&outcome).find(None, "k").unwrap();
        assert_eq!(
            merged.comments,
            vec![
                String::from("#-#-#-#-#  a.po  #-#-#-#-#"),
                String::from("local note"),
                String::from("#-#-#-#-#  b.po  #-#-#-#-#"),
                String::from("remote note"),
            ]
        );
    }

    #[test]
    fn test_plural_conflict_interleaves_per_form() {
        let mut local = message("k", "");
        local.translation = b"a1\0a2".to_vec();
        let mut remote = message("k", "");
        remote.translation = b"b1\0b2".to_vec();
        let outcome = merge(
            input("a.po", vec![local]),
            input("b.po", vec![remote]),
            input("origin.po", vec![message("k", "o")]),
        );
        let merged = merged_messages(&outcome).find(None, "k").unwrap();
        assert_eq!(
            merged.translation,
            b"#-#-#-#-#  a.po  #-#-#-#-#\na1\n#-#-#-#-#  b.po  #-#-#-#-#\nb1\0\
              #-#-#-#-#  a.po  #-#-#-#-#\na2\n#-#-#-#-#  b.po  #-#-#-#-#\nb2"
                .to_vec()
        );
        assert!(outcome.has_merges);
    }

    #[test]
    fn test_project_id_appears_in_markers() {
        let header = |project: &str| Message {
            translation: format!(
                "Project-Id-Version: {project}\nContent-Type: text/plain; charset=UTF-8\n"
            )
            .into_bytes(),
            ..Message::default()
        };
        let outcome = merge(
            input("a.po", vec![header("alpha 1"), message("k", "a")]),
            input("b.po", vec![header("beta 2"), message("k", "b")]),
            input("origin.po", vec![message("k", "o")]),
        );
        let merged = merged_messages(&outcome).find(None, "k").unwrap();
        assert_eq!(
            merged.translation,
            b"#-#-#-#-#  a.po (alpha 1)  #-#-#-#-#\na\n#-#-#-#-#  b.po (beta 2)  #-#-#-#-#\nb"
        );
    }

    #[test]
    fn test_header_reconciliation_prefers_newer_revision() {
        let header = |date: &str| Message {
            translation: format!(
                "PO-Revision-Date: {date}\nContent-Type: text/plain; charset=UTF-8\n"
            )
            .into_bytes(),
            ..Message::default()
        };
        let mut remote_header = header("2011-06-15 12:00+0300");
        remote_header.comments = vec![String::from("Copyright (C) 2011 Beta Translators")];
        let outcome = merge(
            input("a.po", vec![header("2010-01-01 10:00+0000")]),
            input("b.po", vec![remote_header.clone()]),
            input("origin.po", vec![header("2010-01-01 10:00+0000")]),
        );
        let merged = merged_messages(&outcome).find(None, "").unwrap();
        assert_eq!(merged.translation, remote_header.translation);
        assert_eq!(merged.comments, remote_header.comments);
        assert!(!outcome.has_merges);
    }

    #[test]
    fn test_domains_only_in_remote_are_appended() {
        let mut b = input("b.po", vec![message("k", "v")]);
        let mut extra = Domain::new("extra");
        extra.messages.push(message("added", "ajouté"));
        extra.messages.push(Message {
            translation: b"Content-Type: text/plain; charset=UTF-8\n".to_vec(),
            ..Message::default()
        });
        b.catalog.domains.push(extra);
        let outcome = merge(
            input("a.po", vec![message("k", "v")]),
            b,
            input("origin.po", vec![message("k", "v")]),
        );
        assert_eq!(outcome.catalog.domains.len(), 2);
        assert_eq!(outcome.catalog.domains[0].name, DEFAULT_DOMAIN);
        assert_eq!(outcome.catalog.domains[1].name, "extra");
        assert_eq!(
            outcome.catalog.domains[1]
                .messages
                .find(None, "added")
                .unwrap()
                .translation,
            "ajouté".as_bytes()
        );
    }

    #[test]
    fn test_charset_mixture_produces_warning_and_utf8_output() {
        let header = |charset: &str| Message {
            translation: format!("Content-Type: text/plain; charset={charset}\n").into_bytes(),
            ..Message::default()
        };
        let mut a = input("a.po", vec![header("windows-1252")]);
        let mut latin1_domain = Domain::new("latin1");
        latin1_domain.messages.push(header("UTF-8"));
        latin1_domain
            .messages
            .push(message("coffee", "café"));
        a.catalog.domains.push(latin1_domain);
        let outcome = merge(
            a,
            input("b.po", vec![]),
            input("origin.po", vec![]),
        );
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("different encodings"));
        // Both headers now declare the negotiated target.
        for domain in &outcome.catalog.domains {
            let header = domain.messages.find(None, "").unwrap();
            assert!(String::from_utf8_lossy(&header.translation).contains("charset=UTF-8"));
        }
    }

    #[test]
    fn test_usage_counter_transitions() {
        let mut usage = Usage::default();
        usage.note_weak();
        usage.note_weak();
        assert_eq!(usage, Usage { strong: 0, weak: 2 });
        usage.note_strong();
        assert_eq!(usage, Usage { strong: 1, weak: 0 });
        usage.note_weak();
        assert_eq!(usage, Usage { strong: 1, weak: 0 });
        usage.reset();
        assert_eq!(usage, Usage::default());
    }

    #[test]
    fn test_merge_3way_reads_po_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let write = |name: &str, body: &str| -> anyhow::Result<PathBuf> {
            let path = dir.path().join(name);
            let header = "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\n";
            std::fs::write(&path, format!("{header}{body}"))?;
            Ok(path)
        };
        let a = write("a.po", "msgid \"hello\"\nmsgstr \"bonjour\"\n")?;
        let b = write(
            "b.po",
            "msgid \"hello\"\nmsgstr \"bonjour\"\n\nmsgid \"cat\"\nmsgstr \"chat\"\n",
        )?;
        let origin = write("origin.po", "msgid \"hello\"\nmsgstr \"bonjour\"\n")?;

        let outcome = merge_3way(&a, &b, &origin, CatalogSyntax::Po, None)?;
        assert!(!outcome.has_merges);
        let merged = &outcome.catalog.domains[0].messages;
        assert_eq!(merged.find(None, "hello").unwrap().translation, b"bonjour");
        assert_eq!(merged.find(None, "cat").unwrap().translation, b"chat");
        Ok(())
    }
}

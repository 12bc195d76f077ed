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

//! The catalog data model.
//!
//! A [`Catalog`] is an ordered sequence of [`Domain`]s, each holding an
//! ordered [`MessageList`] of [`Message`]s keyed by `(context, id)`. PO
//! input produces a single domain named [`DEFAULT_DOMAIN`].
//!
//! Translations are byte buffers with NUL-separated plural forms. The
//! separator convention means an empty buffer is the untranslated state
//! and a buffer starting with NUL has an empty first form; embedded NULs
//! are structural and survive every comparison and copy.

/// Name of the default Gettext domain.
pub const DEFAULT_DOMAIN: &str = "messages";

/// A parsed catalog: an ordered sequence of domains.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub domains: Vec<Domain>,
    /// Encoding label pre-declared by the parser, if any. Used as a
    /// fallback when no header entry declares a charset.
    pub encoding: Option<String>,
}

impl Catalog {
    /// Look up a domain by name.
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.name == name)
    }

    /// Index of the domain called `name`, if present.
    pub fn domain_position(&self, name: &str) -> Option<usize> {
        self.domains.iter().position(|domain| domain.name == name)
    }
}

/// A named group of messages within a catalog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Domain {
    pub name: String,
    pub messages: MessageList,
}

impl Domain {
    pub fn new(name: &str) -> Domain {
        Domain {
            name: String::from(name),
            messages: MessageList::default(),
        }
    }
}

/// An ordered list of messages.
///
/// `(context, id)` is unique within a list; the constructors of this crate
/// maintain that invariant rather than the list itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Message> {
        self.messages.iter_mut()
    }

    /// Index of the message with the given key.
    pub fn position(&self, context: Option<&str>, id: &str) -> Option<usize> {
        self.messages
            .iter()
            .position(|message| message.context.as_deref() == context && message.id == id)
    }

    /// The message with the given key.
    pub fn find(&self, context: Option<&str>, id: &str) -> Option<&Message> {
        self.position(context, id).and_then(|index| self.get(index))
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// The unique key of a message within a list.
///
/// The presence or absence of a context is part of the key.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct MessageKey {
    pub context: Option<String>,
    pub id: String,
}

/// One translation entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    pub context: Option<String>,
    pub id: String,
    /// NUL-separated plural forms; empty means untranslated.
    pub translation: Vec<u8>,
    pub is_fuzzy: bool,
    pub obsolete: bool,
    /// Translator comment lines.
    pub comments: Vec<String>,
    /// Comment lines extracted by the source scanner.
    pub extracted_comments: Vec<String>,
}

impl Message {
    /// Create an entry with the given key and no translation.
    pub fn new(context: Option<&str>, id: &str) -> Message {
        Message {
            context: context.map(String::from),
            id: String::from(id),
            ..Message::default()
        }
    }

    /// The header entry is the context-less message with an empty id.
    pub fn is_header(&self) -> bool {
        self.id.is_empty() && self.context.is_none()
    }

    /// True when the first plural form is empty.
    pub fn is_untranslated(&self) -> bool {
        self.translation.first().map_or(true, |&byte| byte == 0)
    }

    /// Iterate over the NUL-separated plural forms.
    pub fn plural_forms(&self) -> impl Iterator<Item = &[u8]> + '_ {
        plural_forms(&self.translation)
    }

    /// The `(context, id)` key of this entry.
    pub fn key(&self) -> MessageKey {
        MessageKey {
            context: self.context.clone(),
            id: self.id.clone(),
        }
    }
}

/// Split a translation buffer into its plural forms.
///
/// The empty buffer has no forms at all, not one empty form.
pub(crate) fn plural_forms(translation: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    (!translation.is_empty())
        .then(|| translation.split(|&byte| byte == 0))
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plural_forms_splits_on_nul() {
        let message = Message {
            translation: b"un\0deux".to_vec(),
            ..Message::default()
        };
        assert_eq!(
            message.plural_forms().collect::<Vec<_>>(),
            vec![b"un".as_slice(), b"deux".as_slice()]
        );
    }

    #[test]
    fn test_plural_forms_of_empty_translation() {
        let message = Message::new(None, "x");
        assert_eq!(message.plural_forms().count(), 0);
    }

    #[test]
    fn test_plural_forms_keeps_trailing_empty_form() {
        assert_eq!(
            plural_forms(b"un\0").collect::<Vec<_>>(),
            vec![b"un".as_slice(), b"".as_slice()]
        );
    }

    #[test]
    fn test_is_untranslated() {
        let mut message = Message::new(None, "x");
        assert!(message.is_untranslated());
        message.translation = b"\0plural only".to_vec();
        assert!(message.is_untranslated());
        message.translation = b"y".to_vec();
        assert!(!message.is_untranslated());
    }

    #[test]
    fn test_is_header() {
        assert!(Message::new(None, "").is_header());
        assert!(!Message::new(None, "greeting").is_header());
        assert!(!Message::new(Some("menu"), "").is_header());
    }

    #[test]
    fn test_position_distinguishes_contexts() {
        let mut list = MessageList::default();
        list.push(Message::new(None, "open"));
        list.push(Message::new(Some("menu"), "open"));
        assert_eq!(list.position(None, "open"), Some(0));
        assert_eq!(list.position(Some("menu"), "open"), Some(1));
        assert_eq!(list.position(Some("dialog"), "open"), None);
    }
}

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

//! Charset detection, target negotiation and re-encoding.
//!
//! The merge passes compare translations byte by byte, so the three inputs
//! must agree on one encoding first. Each domain declares its charset in
//! the `charset=` parameter of the header's `Content-Type` field; this
//! module canonicalizes the declarations, negotiates a uniform target and
//! re-encodes the message lists through `encoding_rs`.

use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

use crate::catalog::{plural_forms, Catalog, MessageList};
use crate::error::MergeError;

/// A canonical character encoding.
///
/// `encoding_rs` resolves labels against the WHATWG registry, which has no
/// US-ASCII entry (the `ascii` label maps to windows-1252), so ASCII is
/// carried as its own case and checked before label resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Charset {
    Ascii,
    Encoded(&'static Encoding),
}

const ASCII_ALIASES: &[&str] = &["ascii", "us-ascii", "ansi_x3.4-1968", "csascii"];

impl Charset {
    /// Normalize an encoding label to a canonical charset.
    pub(crate) fn canonicalize(label: &str) -> Option<Charset> {
        let label = label.trim();
        if ASCII_ALIASES
            .iter()
            .any(|alias| label.eq_ignore_ascii_case(alias))
        {
            return Some(Charset::Ascii);
        }
        Encoding::for_label(label.as_bytes()).map(Charset::Encoded)
    }

    pub(crate) fn utf8() -> Charset {
        Charset::Encoded(UTF_8)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Charset::Ascii => "US-ASCII",
            Charset::Encoded(encoding) => encoding.name(),
        }
    }

    pub(crate) fn is_utf8(self) -> bool {
        self == Charset::utf8()
    }

    pub(crate) fn is_ascii_compatible(self) -> bool {
        match self {
            Charset::Ascii => true,
            Charset::Encoded(encoding) => encoding.is_ascii_compatible(),
        }
    }
}

fn charset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"charset=([^ \t\n]*)").unwrap())
}

/// The raw `charset=` token declared by a header translation.
fn declared_charset(header: &[u8]) -> Option<String> {
    charset_pattern()
        .captures(header)
        .and_then(|captures| captures.get(1))
        .map(|token| String::from_utf8_lossy(token.as_bytes()).into_owned())
}

/// True when every identifier, translation and comment in the list is
/// plain ASCII.
pub(crate) fn is_all_ascii(list: &MessageList) -> bool {
    list.iter().all(|message| {
        message.id.is_ascii()
            && message.context.as_deref().map_or(true, |c| c.is_ascii())
            && message.translation.is_ascii()
            && message.comments.iter().all(|line| line.is_ascii())
            && message.extracted_comments.iter().all(|line| line.is_ascii())
    })
}

/// Determine the canonical charset of every domain in `catalog`.
///
/// A domain with no usable declaration falls back to ASCII when its whole
/// list is ASCII, then to the parser's pre-declared encoding, and fails
/// otherwise. Empty domains resolve to no charset at all.
pub(crate) fn resolve_charsets(
    catalog: &Catalog,
    file: &Path,
) -> Result<Vec<Option<Charset>>, MergeError> {
    let mut charsets = Vec::with_capacity(catalog.domains.len());
    for (index, domain) in catalog.domains.iter().enumerate() {
        if domain.messages.is_empty() {
            charsets.push(None);
            continue;
        }
        let mut canonical: Option<Charset> = None;
        for message in &domain.messages {
            if !message.is_header() || message.obsolete {
                continue;
            }
            let Some(token) = declared_charset(&message.translation) else {
                continue;
            };
            let charset = match Charset::canonicalize(&token) {
                Some(charset) => charset,
                // POT templates leave the placeholder in and usually
                // contain only ASCII msgids.
                None if token == "CHARSET" && has_pot_extension(file) => Charset::Ascii,
                None => return Err(MergeError::NonPortableCharset { charset: token }),
            };
            match canonical {
                None => canonical = Some(charset),
                Some(previous) if previous != charset => {
                    return Err(MergeError::ConflictingCharsets {
                        first: previous.name().into(),
                        second: charset.name().into(),
                        file: file.display().to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        if canonical.is_none() {
            canonical = if is_all_ascii(&domain.messages) {
                Some(Charset::Ascii)
            } else if let Some(label) = &catalog.encoding {
                match Charset::canonicalize(label) {
                    Some(charset) => Some(charset),
                    None => {
                        return Err(MergeError::NonPortableCharset {
                            charset: label.clone(),
                        })
                    }
                }
            } else if index == 0 {
                return Err(MergeError::MissingCharset {
                    file: file.display().to_string(),
                });
            } else {
                return Err(MergeError::MissingCharsetInDomain {
                    domain: domain.name.clone(),
                    file: file.display().to_string(),
                });
            };
        }
        charsets.push(canonical);
    }
    Ok(charsets)
}

fn has_pot_extension(file: &Path) -> bool {
    file.extension().is_some_and(|extension| extension == "pot")
}

/// Pick the encoding the merge will run in.
///
/// An explicit request wins. Otherwise the local side's declared charsets
/// decide: a mixture forces UTF-8 with a warning, ASCII plus one
/// ASCII-compatible charset converts to that charset (a no-op that still
/// validates the input), and a uniform input needs no conversion.
pub(crate) fn select_target(
    target_code: Option<&str>,
    local_charsets: &[Option<Charset>],
    warnings: &mut Vec<String>,
) -> Result<Option<Charset>, MergeError> {
    if let Some(code) = target_code {
        return match Charset::canonicalize(code) {
            Some(charset) => Ok(Some(charset)),
            None => Err(MergeError::NonPortableCharset {
                charset: code.into(),
            }),
        };
    }

    let mut first = None;
    let mut second = None;
    let mut with_ascii = false;
    let mut with_utf8 = false;
    let mut all_ascii_compatible = true;

    for &charset in local_charsets.iter().flatten() {
        if charset == Charset::Ascii {
            with_ascii = true;
            continue;
        }
        if first.is_none() {
            first = Some(charset);
        } else if first != Some(charset) && second.is_none() {
            second = Some(charset);
        }
        if charset.is_utf8() {
            with_utf8 = true;
        }
        if !charset.is_ascii_compatible() {
            all_ascii_compatible = false;
        }
    }

    // ASCII text cannot be left as-is next to a charset that doesn't
    // contain it, so it counts as a second encoding.
    if with_ascii && !all_ascii_compatible && second.is_none() {
        second = Some(Charset::Ascii);
    }

    if second.is_some() {
        // The caller didn't ask for a conversion; warn before doing one.
        if with_utf8 {
            warnings.push(String::from(
                "Input files contain messages in different encodings, UTF-8 among others.\n\
                 Converting the output to UTF-8.",
            ));
        } else if let (Some(first), Some(second)) = (first, second) {
            warnings.push(format!(
                "Input files contain messages in different encodings, {} and {} among others.\n\
                 Converting the output to UTF-8.\n\
                 To select a different output encoding, pass an explicit target encoding.",
                first.name(),
                second.name()
            ));
        }
        Ok(Some(Charset::utf8()))
    } else if first.is_some() && with_ascii && all_ascii_compatible {
        Ok(first)
    } else {
        Ok(None)
    }
}

/// Re-encode every domain of `catalog` whose charset differs from `target`.
///
/// With an explicit user request the conversion also runs when the charset
/// already matches, to validate the input.
pub(crate) fn convert_catalog(
    catalog: &mut Catalog,
    charsets: &[Option<Charset>],
    target: Charset,
    explicit: bool,
    file: &Path,
) -> Result<(), MergeError> {
    for (domain, charset) in catalog.domains.iter_mut().zip(charsets) {
        let Some(from) = *charset else { continue };
        if !explicit && from == target {
            continue;
        }
        convert_list(&mut domain.messages, from, target, file)?;
    }
    Ok(())
}

/// Re-encode one message list from `from` to `to`.
///
/// Identifiers are primary keys downstream, so a conversion that alters
/// them is fatal. Header entries get their `charset=` declaration pointed
/// at the new encoding.
fn convert_list(
    list: &mut MessageList,
    from: Charset,
    to: Charset,
    file: &Path,
) -> Result<(), MergeError> {
    for message in list.iter_mut() {
        for identifier in std::iter::once(&message.id).chain(&message.context) {
            let converted = convert_bytes(identifier.as_bytes(), from, to, file)?;
            if converted != identifier.as_bytes() {
                return Err(MergeError::EncodingChangesIdentifiers {
                    file: file.display().to_string(),
                    from: from.name().into(),
                    to: to.name().into(),
                });
            }
        }
        if !message.translation.is_empty() {
            let mut converted = Vec::with_capacity(message.translation.len());
            for (index, form) in plural_forms(&message.translation).enumerate() {
                if index > 0 {
                    converted.push(0);
                }
                converted.extend_from_slice(&convert_bytes(form, from, to, file)?);
            }
            message.translation = converted;
        }
        if message.is_header() {
            rewrite_declared_charset(&mut message.translation, to);
        }
    }
    Ok(())
}

fn rewrite_declared_charset(header: &mut Vec<u8>, to: Charset) {
    let range = match charset_pattern()
        .captures(header.as_slice())
        .and_then(|captures| captures.get(1))
    {
        Some(token) => token.range(),
        None => return,
    };
    header.splice(range, to.name().bytes());
}

fn convert_bytes(
    bytes: &[u8],
    from: Charset,
    to: Charset,
    file: &Path,
) -> Result<Vec<u8>, MergeError> {
    let fail = || MergeError::ConversionFailed {
        file: file.display().to_string(),
        from: from.name().into(),
        to: to.name().into(),
    };
    let decoded: Cow<'_, str> = match from {
        Charset::Ascii => {
            if !bytes.is_ascii() {
                return Err(fail());
            }
            Cow::Borrowed(std::str::from_utf8(bytes).map_err(|_| fail())?)
        }
        Charset::Encoded(encoding) => {
            let (decoded, had_errors) = encoding.decode_without_bom_handling(bytes);
            if had_errors {
                return Err(fail());
            }
            decoded
        }
    };
    match to {
        Charset::Ascii => {
            if !decoded.is_ascii() {
                return Err(fail());
            }
            Ok(decoded.into_owned().into_bytes())
        }
        Charset::Encoded(encoding) => {
            let (encoded, _, had_unmappable) = encoding.encode(&decoded);
            if had_unmappable {
                return Err(fail());
            }
            Ok(encoded.into_owned())
        }
    }
}

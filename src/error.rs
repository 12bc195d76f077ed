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

//! Fatal merge errors. None of these are recovered locally.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("could not parse {file} as a catalog: {message}")]
    Parse { file: String, message: String },

    #[error("input file {file} doesn't contain a header entry with a charset specification")]
    MissingCharset { file: String },

    #[error(
        "domain \"{domain}\" in input file {file} doesn't contain a header entry \
         with a charset specification"
    )]
    MissingCharsetInDomain { domain: String, file: String },

    #[error("two different charsets \"{first}\" and \"{second}\" in input file {file}")]
    ConflictingCharsets {
        first: String,
        second: String,
        file: String,
    },

    #[error("charset \"{charset}\" is not a portable encoding name")]
    NonPortableCharset { charset: String },

    #[error(
        "conversion of file {file} from {from} encoding to {to} encoding \
         changes some msgids or msgctxts"
    )]
    EncodingChangesIdentifiers {
        file: String,
        from: String,
        to: String,
    },

    #[error("cannot convert file {file} from {from} encoding to {to} encoding")]
    ConversionFailed {
        file: String,
        from: String,
        to: String,
    },

    /// A remote-side entry marked unconsumed was already present in the
    /// merged output. This indicates a bug in the merge, not bad input.
    #[error("three-way merge inconsistency: remote message \"{id}\" reappeared")]
    AlgorithmInvariant { id: String },
}

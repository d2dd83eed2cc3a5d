// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Error and result types.

use std::io;
use thiserror::Error;

/// Main error type.
#[derive(Error, Debug)]
pub enum ErrorType {
    /// Configuration error.
    #[error("Configuration Error ({0})")]
    Config(#[from] crate::config::ConfigError),
    /// I/O Error.
    #[error("Input/Output error ({:?})", .0)]
    Io(#[from] io::Error),
    /// XDG BaseDirectories error.
    #[error("BaseDirectories error ({:?})", .0)]
    BaseDirectoriesError(#[from] xdg::BaseDirectoriesError),
    /// The source collection file could not be read.
    #[error("Source collection unreadable: {0}")]
    SourceUnreadable(String),
    /// The source collection could not be parsed, even in recovery mode.
    #[error("Source collection unparseable: {0}")]
    SourceUnparseable(String),
    /// Encoding of the source collection could not be determined with confidence.
    #[error("Encoding undetermined, falling back to UTF-8")]
    EncodingUndetermined,
    /// A single entry in the source collection was malformed and was dropped.
    #[error("Entry malformed and dropped: {0}")]
    EntryMalformed(String),
    /// A path could not be sanitised into a representable basename.
    #[error("Path unrepresentable: {0}")]
    PathUnrepresentable(String),
    /// A key index outside of 0..23 was supplied to the key translator.
    #[error("Invalid key index: {0}")]
    InvalidKeyIndex(i32),
    /// The filename index could not be built from the given root.
    #[error("Filename index unusable, repair disabled: {0}")]
    IndexUnusable(String),
    /// Copying an audio file to the export target failed.
    #[error("Failed to copy audio file {path}: {source}")]
    AudioCopyFailed {
        /// Path of the file that failed to copy.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Post-copy verification detected a mismatch between source and destination.
    #[error("Verification mismatch for {0}")]
    VerifyMismatch(String),
    /// A fatal write failure while emitting an output file.
    #[error("Write failed: {0}")]
    WriteFailed(String),
    /// The collection exceeds the hardware's track-count limit.
    #[error("Collection too large: {0} tracks exceed the hardware limit")]
    CollectionTooLarge(usize),
    /// A string could not be represented after sanitisation failed.
    #[error("String unrepresentable: {0}")]
    StringUnrepresentable(String),
    /// A track's duration is too short to contain a single beat.
    #[error("Track too short for beat grid: {0}")]
    TrackTooShortForGrid(String),
    /// The caller requested cancellation.
    #[error("Conversion cancelled")]
    CancelRequested,
}

/// Convenience type.
pub type Result<T> = std::result::Result<T, ErrorType>;

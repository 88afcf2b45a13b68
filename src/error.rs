//! Failure modes of dataset loading
//!
//! Everything in here aborts a load. Problems that only affect one record
//! are [`RecordError`](crate::record::RecordError)s, which get logged and
//! skipped instead.

use std::{io, path::Path};
use thiserror::Error;

/// Fatal dataset loading error
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset could not be made available locally
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// The dataset is not text in the expected encoding
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The caller asked for a category that the dataset does not have
    #[error("unknown category {requested:?}, expected one of {known:?}")]
    UnknownCategory {
        requested: Box<str>,
        known: &'static [&'static str],
    },

    /// The local dataset file could not be read
    #[error("failed to read dataset file {}", path.display())]
    Read {
        path: Box<Path>,
        #[source]
        source: io::Error,
    },

    /// The local review archive is not a readable zip file
    #[error("failed to read review archive {}", path.display())]
    Archive {
        path: Box<Path>,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Failure to download the dataset or store it locally
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Network failure or non-success HTTP status
    #[error("failed to download {url}")]
    Download {
        url: Box<str>,
        #[source]
        source: reqwest::Error,
    },

    /// Local storage failure
    #[error("failed to write downloaded data to {}", path.display())]
    Write {
        path: Box<Path>,
        #[source]
        source: io::Error,
    },
}

/// Failure to decode the dataset as text
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Encoding label is not known to the WHATWG encoding standard
    #[error("unknown text encoding {0:?}")]
    UnknownLabel(Box<str>),

    /// Records are scanned line by line, which needs ASCII-compatible text
    #[error("text encoding {0} is not ASCII-compatible")]
    NotAsciiCompatible(&'static str),

    /// NUL bytes never appear in the dataset's text, only in binary data
    #[error("line {line} contains binary data, is this really a text dataset?")]
    Binary { line: u64 },
}

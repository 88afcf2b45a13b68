//! Dataset loading configuration

use crate::{catalog::DatasetInfo, error::EncodingError};
use directories::ProjectDirs;
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

/// Where a dataset comes from, where it lives locally, and how to decode it
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Dataset being loaded
    pub dataset: DatasetInfo,

    /// Local copy of the dataset file
    pub data_file: Box<Path>,

    /// Where the dataset file is downloaded from if there is no local copy
    pub url: Box<str>,

    /// Text encoding of the dataset, by default the one of its format
    pub encoding: &'static Encoding,
}
//
impl Config {
    /// Default configuration for a dataset
    ///
    /// The data file is looked up in the working directory first, then in the
    /// per-user data directory, which is also where it gets downloaded if it
    /// is not found anywhere.
    pub fn new(dataset: DatasetInfo) -> Self {
        Self {
            dataset,
            data_file: default_data_file(&dataset).into(),
            url: dataset.url.into(),
            encoding: dataset.format.default_encoding(),
        }
    }

    /// Use a specific local data file
    pub fn with_data_file(self, data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into().into(),
            ..self
        }
    }

    /// Download the dataset from a different location
    pub fn with_url(self, url: impl Into<Box<str>>) -> Self {
        Self {
            url: url.into(),
            ..self
        }
    }

    /// Decode the dataset using a different text encoding
    ///
    /// The encoding is specified by its WHATWG label, e.g. "latin1" or
    /// "utf-8". Since records are scanned line by line, the encoding must be
    /// ASCII-compatible.
    pub fn with_encoding(self, label: &str) -> Result<Self, EncodingError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| EncodingError::UnknownLabel(label.into()))?;
        if !encoding.is_ascii_compatible() {
            return Err(EncodingError::NotAsciiCompatible(encoding.name()));
        }
        Ok(Self { encoding, ..self })
    }
}

/// Look up where a dataset file is, or should be downloaded to
fn default_data_file(dataset: &DatasetInfo) -> PathBuf {
    let local = Path::new(".").join(dataset.file_name);
    if local.exists() {
        return local;
    }
    match ProjectDirs::from("", "", env!("CARGO_PKG_NAME")) {
        Some(dirs) => dirs.data_dir().join(dataset.file_name),
        None => {
            log::warn!("Failed to determine the user data directory, falling back to the working directory");
            local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DatasetFormat, AMAZON_REVIEWS};

    #[test]
    fn defaults() {
        let config = Config::new(AMAZON_REVIEWS);
        assert_eq!(&*config.url, AMAZON_REVIEWS.url);
        assert_eq!(config.encoding, encoding_rs::UTF_8);
        assert!(config.data_file.ends_with("AmazonReviews.zip"));
    }

    #[test]
    fn default_encoding_follows_format() {
        let text = DatasetInfo {
            format: DatasetFormat::Text,
            ..AMAZON_REVIEWS
        };
        assert_eq!(Config::new(text).encoding, encoding_rs::WINDOWS_1252);
        assert_eq!(Config::new(AMAZON_REVIEWS).encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn encoding_labels() {
        let config = Config::new(AMAZON_REVIEWS);
        let latin1 = config.clone().with_encoding("latin1").unwrap();
        assert_eq!(latin1.encoding, encoding_rs::WINDOWS_1252);
        let utf8 = config.clone().with_encoding("UTF-8").unwrap();
        assert_eq!(utf8.encoding, encoding_rs::UTF_8);
        assert!(matches!(
            config.clone().with_encoding("klingon"),
            Err(EncodingError::UnknownLabel(_))
        ));
        assert!(matches!(
            config.with_encoding("utf-16le"),
            Err(EncodingError::NotAsciiCompatible("UTF-16LE"))
        ));
    }

    #[test]
    fn overrides() {
        let config = Config::new(AMAZON_REVIEWS)
            .with_data_file("/tmp/reviews.zip")
            .with_url("http://localhost/reviews.zip");
        assert_eq!(&*config.data_file, Path::new("/tmp/reviews.zip"));
        assert_eq!(&*config.url, "http://localhost/reviews.zip");
    }
}

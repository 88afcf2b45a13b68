//! Processing of text dataset files
//!
//! Records are blocks of `label: value` lines separated by blank lines. The
//! file may be gzipped, and its text uses a legacy single-byte encoding.

use crate::{
    catalog::DatasetInfo,
    config::Config,
    error::{EncodingError, Error},
    graph::ReviewGraph,
    loader::Loader,
    progress::{ProgressConfig, ProgressReport, Work},
    record::{ParsedReview, RawRecord, RecordError},
};
use async_compression::tokio::bufread::GzipDecoder;
use encoding_rs::Encoding;
use std::{io, path::Path};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tokio_util::io::InspectReader;

/// Load every record of a text dataset file
pub async fn load<G: ReviewGraph>(
    config: &Config,
    loader: &mut Loader<'_, G>,
    report: &ProgressReport,
) -> Result<(), Error> {
    let path = &*config.data_file;
    let read_error = |source: io::Error| Error::Read {
        path: path.into(),
        source,
    };

    // Track progress through the file, as stored on disk
    let file = File::open(path).await.map_err(read_error)?;
    let file_len = file.metadata().await.map_err(read_error)?.len();
    let progress = report.add(
        format!("Loading {}", path.display()),
        ProgressConfig::new(Work::Bytes(file_len)),
    );
    let tracker = progress.clone();
    let file = InspectReader::new(file, move |bytes: &[u8]| {
        tracker.make_progress(bytes.len() as u64);
    });

    // Decompress gzipped files
    let text_bytes: Box<dyn AsyncBufRead + Send + Unpin> = if is_gzipped(path) {
        let mut decoder = GzipDecoder::new(BufReader::new(file));
        decoder.multiple_members(true);
        Box::new(BufReader::new(decoder))
    } else {
        Box::new(BufReader::new(file))
    };

    // Scan records line by line
    let mut lines = text_bytes.split(b'\n');
    let mut scanner = RecordScanner::new(config.dataset, config.encoding);
    while let Some(line) = lines.next_segment().await.map_err(read_error)? {
        if let Some((line_number, record)) = scanner.push_line(&line)? {
            loader.submit(format_args!("{}:{line_number}", path.display()), record);
        }
    }
    if let Some((line_number, record)) = scanner.finish() {
        loader.submit(format_args!("{}:{line_number}", path.display()), record);
    }
    progress.finish();
    Ok(())
}

/// Truth that a data file is gzipped, judging by its extension
fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("gz"))
}

/// Splitter of decoded lines into records
///
/// Each record goes through field extraction as its lines come in, then gets
/// validated once the blank line that ends it is reached.
#[derive(Debug)]
pub struct RecordScanner {
    /// Dataset whose records are being scanned
    dataset: DatasetInfo,

    /// Text encoding of the dataset
    encoding: &'static Encoding,

    /// Number of lines seen so far
    line_number: u64,

    /// Record being extracted, if any, and line number where it started
    current: Option<(u64, RawRecord)>,
}
//
impl RecordScanner {
    /// Prepare to scan records from a dataset
    pub fn new(dataset: DatasetInfo, encoding: &'static Encoding) -> Self {
        Self {
            dataset,
            encoding,
            line_number: 0,
            current: None,
        }
    }

    /// Feed the next line, without its line feed
    ///
    /// Returns the previous record, and the line on which it started, if this
    /// line ended it.
    pub fn push_line(
        &mut self,
        line: &[u8],
    ) -> Result<Option<(u64, Result<ParsedReview, RecordError>)>, EncodingError> {
        self.line_number += 1;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.contains(&0) {
            return Err(EncodingError::Binary {
                line: self.line_number,
            });
        }
        let (text, had_errors) = if self.line_number == 1 {
            self.encoding.decode_with_bom_removal(line)
        } else {
            self.encoding.decode_without_bom_handling(line)
        };
        if had_errors {
            log::warn!(
                "Line {} is not valid {} text, undecodable bytes were replaced",
                self.line_number,
                self.encoding.name()
            );
        }

        if text.trim().is_empty() {
            Ok(self.finish())
        } else {
            self.current
                .get_or_insert_with(|| (self.line_number, RawRecord::new()))
                .1
                .push_line(&text);
            Ok(None)
        }
    }

    /// Validate the record being extracted, if any
    ///
    /// Must be called once the end of the input is reached, so that a last
    /// record without a terminating blank line is not lost.
    pub fn finish(&mut self) -> Option<(u64, Result<ParsedReview, RecordError>)> {
        let (start, record) = self.current.take()?;
        Some((start, record.finish(&self.dataset)))
    }
}

//! Processing of review archives
//!
//! A review archive is a zip file with one directory per product category,
//! each holding one JSON document per product:
//!
//! ```json
//! {
//!     "ProductInfo": {"ProductID": "B00005ARK3", "Name": "Canon PowerShot A70"},
//!     "Reviews": [
//!         {
//!             "ReviewID": "A2JXAZZI9PHK9Z",
//!             "Author": "Billy Bob",
//!             "Overall": "4.0",
//!             "Date": "June 13, 2003",
//!             "Title": "Nice camera",
//!             "Content": "It takes nice pictures."
//!         }
//!     ]
//! }
//! ```

use crate::{
    catalog::Category,
    config::Config,
    error::Error,
    graph::ReviewGraph,
    loader::Loader,
    progress::{ProgressConfig, ProgressReport, Work},
    record::{normalize_date, ParsedReview, Rating, RecordError},
};
use encoding_rs::Encoding;
use serde::Deserialize;
use serde_json::Value;
use std::{fs::File, io::Read};
use zip::ZipArchive;

/// Product document from a review archive
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProductDocument {
    product_info: ProductInfo,
    #[serde(default)]
    reviews: Vec<ArchivedReview>,
}

/// Product description from a review archive
#[derive(Debug, Deserialize)]
struct ProductInfo {
    #[serde(rename = "ProductID")]
    product_id: Option<Box<str>>,
    #[serde(rename = "Name")]
    name: Option<Box<str>>,
}

/// Review from a review archive
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ArchivedReview {
    #[serde(rename = "ReviewID")]
    review_id: Option<Box<str>>,
    author: Option<Box<str>>,
    #[serde(default)]
    overall: Value,
    date: Option<Box<str>>,
    title: Option<Box<str>>,
    content: Option<Box<str>>,
}

/// Load every review of a review archive
///
/// Zip archives are read synchronously, as the zip crate has no async API.
/// On a multi-threaded runtime, [`load_with()`](crate::load_with) runs this
/// under `block_in_place`.
pub fn load<G: ReviewGraph>(
    config: &Config,
    loader: &mut Loader<'_, G>,
    report: &ProgressReport,
) -> Result<(), Error> {
    let path = &*config.data_file;
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.into(),
        source,
    })?;
    let archive_error = |source| Error::Archive {
        path: path.into(),
        source,
    };
    let mut archive = ZipArchive::new(file).map_err(archive_error)?;
    let progress = report.add(
        format!("Loading {}", path.display()),
        ProgressConfig::new(Work::Steps(archive.len() as u64)).dont_show_rate(),
    );

    for idx in 0..archive.len() {
        let mut entry = archive.by_index(idx).map_err(archive_error)?;
        progress.make_progress(1);
        if entry.is_dir() || entry.size() == 0 {
            continue;
        }
        let name = entry.name().to_owned();

        // Category is given by the top-level directory
        let category_name = name.split('/').next().unwrap_or_default();
        let Some(category) = config.dataset.category(category_name) else {
            loader.submit(
                &name,
                Err(RecordError::UnknownCategory(category_name.into())),
            );
            continue;
        };
        if !loader.accepts(category) {
            loader.skip_filtered(&name, category);
            continue;
        }

        // Decode the product document
        let mut bytes = Vec::new();
        let document = entry
            .read_to_end(&mut bytes)
            .map_err(|e| RecordError::InvalidDocument(e.to_string().into()))
            .and_then(|_| parse_document(&bytes, config.encoding, &name));
        let document = match document {
            Ok(document) => document,
            Err(e) => {
                loader.submit(&name, Err(e));
                continue;
            }
        };

        // Submit its reviews
        let Some(product_id) = document
            .product_info
            .product_id
            .filter(|id| !id.trim().is_empty())
        else {
            loader.submit(&name, Err(RecordError::MissingField("ProductID")));
            continue;
        };
        let product_title = document.product_info.name;
        for (review_idx, review) in document.reviews.into_iter().enumerate() {
            let review = convert_review(
                category,
                &product_id,
                product_title.as_deref(),
                review,
            );
            loader.submit(format_args!("{name}#{review_idx}"), review);
        }
    }
    progress.finish();
    Ok(())
}

/// Decode a product document
fn parse_document(
    bytes: &[u8],
    encoding: &'static Encoding,
    name: &str,
) -> Result<ProductDocument, RecordError> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        log::warn!(
            "{name} is not valid {} text, undecodable bytes were replaced",
            encoding.name()
        );
    }
    serde_json::from_str(&text).map_err(|e| RecordError::InvalidDocument(e.to_string().into()))
}

/// Turn an archived review into a dataset record
fn convert_review(
    category: Category,
    product_id: &str,
    product_title: Option<&str>,
    review: ArchivedReview,
) -> Result<ParsedReview, RecordError> {
    let reviewer_id = review
        .review_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(RecordError::MissingField("ReviewID"))?;
    let rating = match review.overall {
        Value::String(overall) => overall.parse::<Rating>()?,
        Value::Number(overall) => {
            let stars = overall
                .as_f64()
                .ok_or_else(|| RecordError::NonNumericRating(overall.to_string().into()))?;
            Rating::new(stars).ok_or(RecordError::RatingOutOfScale(stars))?
        }
        Value::Null => return Err(RecordError::MissingField("Overall")),
        other => return Err(RecordError::NonNumericRating(other.to_string().into())),
    };
    Ok(ParsedReview {
        product_id: product_id.into(),
        product_title: product_title.map(Into::into),
        category,
        reviewer_id,
        reviewer_name: review.author,
        helpfulness: None,
        rating,
        date: review.date.and_then(|date| normalize_date(&date)),
        summary: review.title,
        text: review.content.unwrap_or_default(),
    })
}

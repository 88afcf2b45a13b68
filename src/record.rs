//! Individual review records and their validation

use crate::catalog::{Category, DatasetInfo};
use chrono::NaiveDate;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Date format used by the dataset, e.g. "June 13, 2003"
const DATASET_DATE_FORMAT: &str = "%B %d, %Y";

/// Date format that dataset dates are normalized into, e.g. "20030613"
const NORMALIZED_DATE_FORMAT: &str = "%Y%m%d";

/// Review that went through validation
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReview {
    /// Identifier of the reviewed product
    pub product_id: Box<str>,

    /// Human-readable product name
    pub product_title: Option<Box<str>>,

    /// Category that the product belongs to
    pub category: Category,

    /// Identifier of the author of the review
    pub reviewer_id: Box<str>,

    /// Display name of the author of the review
    pub reviewer_name: Option<Box<str>>,

    /// How many readers found the review helpful
    pub helpfulness: Option<Helpfulness>,

    /// Star rating given to the product
    pub rating: Rating,

    /// Publication date, normalized to YYYYMMDD when recognized
    pub date: Option<Box<str>>,

    /// Title of the review
    pub summary: Option<Box<str>>,

    /// Body of the review
    pub text: Box<str>,
}
//
/// Re-encode the review in the text dataset format, without the terminating
/// blank line
impl fmt::Display for ParsedReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let helpfulness = self.helpfulness.map(|h| h.to_string());
        let rating = self.rating.to_string();
        let fields = [
            (Field::ProductId, Some(&*self.product_id)),
            (Field::ProductTitle, self.product_title.as_deref()),
            (Field::Category, Some(self.category.as_str())),
            (Field::ReviewerId, Some(&*self.reviewer_id)),
            (Field::ReviewerName, self.reviewer_name.as_deref()),
            (Field::Helpfulness, helpfulness.as_deref()),
            (Field::Rating, Some(rating.as_str())),
            (Field::Date, self.date.as_deref()),
            (Field::Summary, self.summary.as_deref()),
            (Field::Text, Some(&*self.text)),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                writeln!(f, "{}: {value}", field.label())?;
            }
        }
        Ok(())
    }
}

/// Star rating, on the dataset's fixed 1 to 5 scale
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Rating(f64);
//
impl Rating {
    /// Lowest possible rating
    pub const MIN: f64 = 1.0;

    /// Highest possible rating
    pub const MAX: f64 = 5.0;

    /// Validate a star rating
    pub fn new(stars: f64) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&stars).then_some(Self(stars))
    }

    /// Number of stars
    pub fn stars(self) -> f64 {
        self.0
    }

    /// Rating mapped onto the [0, 1] range
    pub fn normalized(self) -> f64 {
        (self.0 - Self::MIN) / (Self::MAX - Self::MIN)
    }
}
//
impl FromStr for Rating {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stars = s
            .trim()
            .parse::<f64>()
            .map_err(|_| RecordError::NonNumericRating(s.into()))?;
        Self::new(stars).ok_or(RecordError::RatingOutOfScale(stars))
    }
}
//
impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Helpfulness votes, as in "7 out of 9 readers found this helpful"
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Helpfulness {
    /// Readers who found the review helpful
    pub helpful: u32,

    /// Readers who voted
    pub total: u32,
}
//
impl FromStr for Helpfulness {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let (helpful, total) = s.trim().split_once('/').ok_or(())?;
        let helpful = helpful.trim().parse().map_err(|_| ())?;
        let total = total.trim().parse().map_err(|_| ())?;
        if helpful > total {
            return Err(());
        }
        Ok(Self { helpful, total })
    }
}
//
impl fmt::Display for Helpfulness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.helpful, self.total)
    }
}

/// Normalize a dataset date to YYYYMMDD
///
/// Dates that do not follow the dataset's usual format are kept verbatim, and
/// empty dates are treated as absent.
pub fn normalize_date(raw: &str) -> Option<Box<str>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATASET_DATE_FORMAT) {
        Ok(date) => Some(date.format(NORMALIZED_DATE_FORMAT).to_string().into()),
        Err(_) => Some(raw.into()),
    }
}

/// Reasons why a record gets skipped
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecordError {
    /// Line is not of the `label: value` form
    #[error("line {0:?} is not a `label: value` field")]
    UnlabeledLine(Box<str>),

    /// Same field specified twice
    #[error("field {0} appears more than once")]
    DuplicateField(&'static str),

    /// Required field is absent or blank
    #[error("required field {0} is missing or empty")]
    MissingField(&'static str),

    /// Rating could not be parsed
    #[error("rating {0:?} is not a number")]
    NonNumericRating(Box<str>),

    /// Rating is not on the 1-5 star scale
    #[error("rating {0} is outside of the 1-5 star scale")]
    RatingOutOfScale(f64),

    /// Product category does not belong to the dataset
    #[error("category {0:?} is not part of this dataset")]
    UnknownCategory(Box<str>),

    /// Archive entry is not a valid product document
    #[error("invalid product document: {0}")]
    InvalidDocument(Box<str>),
}

/// Field of a text record
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
enum Field {
    ProductId,
    ProductTitle,
    Category,
    ReviewerId,
    ReviewerName,
    Helpfulness,
    Rating,
    Date,
    Summary,
    Text,
}
//
impl Field {
    /// Number of distinct fields
    const COUNT: usize = 10;

    /// Label of this field in text records
    fn label(self) -> &'static str {
        match self {
            Self::ProductId => "product/productId",
            Self::ProductTitle => "product/title",
            Self::Category => "product/category",
            Self::ReviewerId => "review/userId",
            Self::ReviewerName => "review/profileName",
            Self::Helpfulness => "review/helpfulness",
            Self::Rating => "review/score",
            Self::Date => "review/date",
            Self::Summary => "review/summary",
            Self::Text => "review/text",
        }
    }

    /// Field associated with a text record label, if any
    fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "product/productId" => Self::ProductId,
            "product/title" => Self::ProductTitle,
            "product/category" => Self::Category,
            "review/userId" => Self::ReviewerId,
            "review/profileName" => Self::ReviewerName,
            "review/helpfulness" => Self::Helpfulness,
            "review/score" => Self::Rating,
            "review/date" => Self::Date,
            "review/summary" => Self::Summary,
            "review/text" => Self::Text,
            _ => return None,
        })
    }
}

/// Fields of a text record, as they are being extracted
#[derive(Clone, Debug, Default)]
pub struct RawRecord {
    /// Field values, indexed by `Field as usize`
    fields: [Option<Box<str>>; Field::COUNT],

    /// First problem encountered while extracting fields, if any
    problem: Option<RecordError>,
}
//
impl RawRecord {
    /// Start extracting a new record
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract a field from a non-blank record line
    ///
    /// Once a record is known to be invalid, further lines are ignored: the
    /// caller just needs to keep feeding them until the next record boundary.
    pub fn push_line(&mut self, line: &str) {
        if self.problem.is_some() {
            return;
        }
        let Some((label, value)) = line.split_once(':') else {
            self.problem = Some(RecordError::UnlabeledLine(line.into()));
            return;
        };
        let Some(field) = Field::from_label(label.trim()) else {
            log::trace!("Ignoring unsupported record field {label:?}");
            return;
        };
        let slot = &mut self.fields[field as usize];
        if slot.is_some() {
            self.problem = Some(RecordError::DuplicateField(field.label()));
            return;
        }
        *slot = Some(value.strip_prefix(' ').unwrap_or(value).into());
    }

    /// Validate the extracted fields
    pub fn finish(mut self, dataset: &DatasetInfo) -> Result<ParsedReview, RecordError> {
        if let Some(problem) = self.problem {
            return Err(problem);
        }
        let mut take = |field: Field| {
            self.fields[field as usize]
                .take()
                .filter(|value| !value.trim().is_empty())
        };
        let mut required = |field: Field| {
            take(field).ok_or(RecordError::MissingField(field.label()))
        };
        let product_id = Box::<str>::from(required(Field::ProductId)?.trim());
        let reviewer_id = Box::<str>::from(required(Field::ReviewerId)?.trim());
        let rating = required(Field::Rating)?.parse::<Rating>()?;
        let category_name = required(Field::Category)?;
        let category = dataset
            .category(&category_name)
            .ok_or(RecordError::UnknownCategory(category_name))?;
        let helpfulness = take(Field::Helpfulness).and_then(|raw| {
            raw.parse::<Helpfulness>()
                .map_err(|()| log::debug!("Ignoring malformed helpfulness {raw:?}"))
                .ok()
        });
        Ok(ParsedReview {
            product_id,
            product_title: take(Field::ProductTitle),
            category,
            reviewer_id,
            reviewer_name: take(Field::ReviewerName),
            helpfulness,
            rating,
            date: take(Field::Date).and_then(|raw| normalize_date(&raw)),
            summary: take(Field::Summary),
            text: take(Field::Text).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AMAZON_REVIEWS;

    fn parse(lines: &[&str]) -> Result<ParsedReview, RecordError> {
        let mut record = RawRecord::new();
        for line in lines {
            record.push_line(line);
        }
        record.finish(&AMAZON_REVIEWS)
    }

    const CAMERA_REVIEW: &[&str] = &[
        "product/productId: B00005ARK3",
        "product/title: Canon PowerShot A70",
        "product/category: cameras",
        "review/userId: A2JXAZZI9PHK9Z",
        "review/profileName: Billy Bob",
        "review/helpfulness: 7/9",
        "review/score: 4.0",
        "review/date: June 13, 2003",
        "review/summary: Nice camera",
        "review/text: It takes nice pictures: sharp, bright.",
    ];

    #[test]
    fn full_record() {
        let review = parse(CAMERA_REVIEW).unwrap();
        assert_eq!(&*review.product_id, "B00005ARK3");
        assert_eq!(review.product_title.as_deref(), Some("Canon PowerShot A70"));
        assert_eq!(review.category.as_str(), "cameras");
        assert_eq!(&*review.reviewer_id, "A2JXAZZI9PHK9Z");
        assert_eq!(review.reviewer_name.as_deref(), Some("Billy Bob"));
        assert_eq!(review.helpfulness, Some(Helpfulness { helpful: 7, total: 9 }));
        assert_eq!(review.rating.stars(), 4.0);
        assert_eq!(review.date.as_deref(), Some("20030613"));
        assert_eq!(review.summary.as_deref(), Some("Nice camera"));
        assert_eq!(&*review.text, "It takes nice pictures: sharp, bright.");
    }

    #[test]
    fn identifiers_ignore_surrounding_whitespace() {
        let padded = parse(&[
            "product/productId:  B00005ARK3 ",
            "product/category: cameras",
            "review/userId: A2JXAZZI9PHK9Z\t",
            "review/score: 4.0",
        ])
        .unwrap();
        let plain = parse(CAMERA_REVIEW).unwrap();
        assert_eq!(padded.product_id, plain.product_id);
        assert_eq!(padded.reviewer_id, plain.reviewer_id);
    }

    #[test]
    fn reencoding_is_lossless() {
        let review = parse(CAMERA_REVIEW).unwrap();
        let reencoded = review.to_string();
        let lines = reencoded.lines().collect::<Vec<_>>();
        assert_eq!(parse(&lines).unwrap(), review);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let review = parse(&[
            "product/productId: P1",
            "product/category: TVs",
            "review/userId: U1",
            "review/score: 1",
        ])
        .unwrap();
        assert_eq!(review.product_title, None);
        assert_eq!(review.reviewer_name, None);
        assert_eq!(review.date, None);
        assert_eq!(&*review.text, "");
        assert_eq!(review.rating.normalized(), 0.0);
    }

    #[test]
    fn non_numeric_rating() {
        let mut lines = CAMERA_REVIEW.to_vec();
        lines[6] = "review/score: N/A";
        assert_eq!(parse(&lines), Err(RecordError::NonNumericRating("N/A".into())));
    }

    #[test]
    fn rating_out_of_scale() {
        let mut lines = CAMERA_REVIEW.to_vec();
        lines[6] = "review/score: 6";
        assert_eq!(parse(&lines), Err(RecordError::RatingOutOfScale(6.0)));
        assert!("NaN".parse::<Rating>().is_err());
    }

    #[test]
    fn missing_or_blank_identifiers() {
        let without_rating = CAMERA_REVIEW
            .iter()
            .copied()
            .filter(|line| !line.starts_with("review/score"))
            .collect::<Vec<_>>();
        assert_eq!(
            parse(&without_rating),
            Err(RecordError::MissingField("review/score"))
        );

        let mut lines = CAMERA_REVIEW.to_vec();
        lines[3] = "review/userId:   ";
        assert_eq!(parse(&lines), Err(RecordError::MissingField("review/userId")));
    }

    #[test]
    fn structural_problems() {
        let mut lines = CAMERA_REVIEW.to_vec();
        lines.push("product/productId: B00005ARK4");
        assert_eq!(
            parse(&lines),
            Err(RecordError::DuplicateField("product/productId"))
        );

        let mut lines = CAMERA_REVIEW.to_vec();
        lines.insert(2, "this line has no label");
        assert!(matches!(parse(&lines), Err(RecordError::UnlabeledLine(_))));

        let mut lines = CAMERA_REVIEW.to_vec();
        lines[2] = "product/category: Books";
        assert_eq!(parse(&lines), Err(RecordError::UnknownCategory("Books".into())));
    }

    #[test]
    fn unsupported_fields_are_ignored() {
        let mut lines = CAMERA_REVIEW.to_vec();
        lines.push("review/time: 1055462400");
        assert!(parse(&lines).is_ok());
    }

    #[test]
    fn date_normalization() {
        assert_eq!(normalize_date("January 5, 2012").as_deref(), Some("20120105"));
        assert_eq!(normalize_date("2012-01-05").as_deref(), Some("2012-01-05"));
        assert_eq!(normalize_date("  "), None);
    }

    #[test]
    fn helpfulness_parsing() {
        assert_eq!("0/0".parse(), Ok(Helpfulness { helpful: 0, total: 0 }));
        assert!("3/2".parse::<Helpfulness>().is_err());
        assert!("lots".parse::<Helpfulness>().is_err());
    }
}

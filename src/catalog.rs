//! Supported review datasets and their product categories

use crate::error::Error;
use dialoguer::MultiSelect;
use encoding_rs::Encoding;
use std::{collections::HashSet, fmt};
use unicase::UniCase;

/// The Amazon product review corpus used for review graph mining
///
/// Reviews of products from six categories, distributed as a zip archive
/// holding one JSON document per product.
pub const AMAZON_REVIEWS: DatasetInfo = DatasetInfo {
    name: "Amazon product reviews",
    file_name: "AmazonReviews.zip",
    url: "http://times.cs.uiuc.edu/~wang296/Data/LARA/Amazon/AmazonReviews.zip",
    format: DatasetFormat::Archive,
    categories: &[
        "cameras",
        "laptops",
        "mobilephone",
        "tablets",
        "TVs",
        "video_surveillance",
    ],
};

/// What we know about a review dataset
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DatasetInfo {
    /// Human-readable name
    pub name: &'static str,

    /// Name of the data file once stored locally
    pub file_name: &'static str,

    /// Where the data file can be downloaded from
    pub url: &'static str,

    /// Layout of the data file
    pub format: DatasetFormat,

    /// Every product category that records may belong to
    pub categories: &'static [&'static str],
}
//
impl DatasetInfo {
    /// Look up one of this dataset's categories, ignoring case
    pub fn category(&self, name: &str) -> Option<Category> {
        let name = UniCase::new(name.trim());
        self.categories
            .iter()
            .find(|known| UniCase::new(*known) == name)
            .map(|known| Category(*known))
    }

    /// Every category of this dataset
    pub fn all_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().map(|known| Category(*known))
    }
}

/// Layout of a dataset file
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum DatasetFormat {
    /// Blank-line separated records of `label: value` lines, optionally
    /// gzipped
    Text,

    /// Zip archive of per-product JSON documents, one directory per category
    Archive,
}
//
impl DatasetFormat {
    /// Text encoding of datasets in this format, unless told otherwise
    ///
    /// Text datasets use a legacy single-byte encoding, while JSON documents
    /// are UTF-8.
    pub fn default_encoding(self) -> &'static Encoding {
        match self {
            DatasetFormat::Text => encoding_rs::WINDOWS_1252,
            DatasetFormat::Archive => encoding_rs::UTF_8,
        }
    }
}

/// Product category, spelled the way its dataset spells it
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Category(&'static str);
//
impl Category {
    /// Canonical category name
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}
//
impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        self.0
    }
}
//
impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Set of categories that a load is restricted to
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CategoryFilter(HashSet<Category>);
//
impl CategoryFilter {
    /// Resolve user-requested category names against a dataset
    ///
    /// An empty request means that every category is accepted, which is
    /// expressed as the absence of a filter.
    pub fn new<S: AsRef<str>>(
        dataset: &DatasetInfo,
        requested: impl IntoIterator<Item = S>,
    ) -> Result<Option<Self>, Error> {
        let categories = requested
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                dataset.category(name).ok_or_else(|| Error::UnknownCategory {
                    requested: name.into(),
                    known: dataset.categories,
                })
            })
            .collect::<Result<HashSet<_>, _>>()?;
        Ok((!categories.is_empty()).then_some(Self(categories)))
    }

    /// Truth that records from this category should be loaded
    pub fn accepts(&self, category: Category) -> bool {
        self.0.contains(&category)
    }
}

/// Ask the user which categories of a dataset should be loaded
///
/// Selecting nothing means loading every category.
pub fn prompt(dataset: &DatasetInfo) -> dialoguer::Result<Vec<Category>> {
    let selection = MultiSelect::new()
        .with_prompt(format!(
            "Which categories of the {} dataset should I load? (none = all)",
            dataset.name
        ))
        .items(dataset.categories)
        .interact()?;
    Ok(selection
        .into_iter()
        .map(|idx| Category(dataset.categories[idx]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_lookup_ignores_case() {
        let tvs = AMAZON_REVIEWS.category("tvs").unwrap();
        assert_eq!(tvs.as_str(), "TVs");
        assert_eq!(AMAZON_REVIEWS.category(" Cameras "), AMAZON_REVIEWS.category("cameras"));
        assert!(AMAZON_REVIEWS.category("Books").is_none());
        assert_eq!(AMAZON_REVIEWS.all_categories().count(), 6);
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let none: [&str; 0] = [];
        assert_eq!(CategoryFilter::new(&AMAZON_REVIEWS, none).unwrap(), None);
    }

    #[test]
    fn filter_restricts_to_requested_categories() {
        let filter = CategoryFilter::new(&AMAZON_REVIEWS, ["laptops", "TABLETS"])
            .unwrap()
            .unwrap();
        assert!(filter.accepts(AMAZON_REVIEWS.category("laptops").unwrap()));
        assert!(filter.accepts(AMAZON_REVIEWS.category("tablets").unwrap()));
        assert!(!filter.accepts(AMAZON_REVIEWS.category("cameras").unwrap()));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = CategoryFilter::new(&AMAZON_REVIEWS, ["cameras", "Books"]).unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { ref requested, .. } if &**requested == "Books"));
    }
}

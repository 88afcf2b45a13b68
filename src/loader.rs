//! Submission of parsed records to a review graph

use crate::{
    catalog::{Category, CategoryFilter},
    graph::ReviewGraph,
    record::{ParsedReview, RecordError},
};
use std::fmt::Display;

/// What happened to the records of a dataset during a load
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LoadStats {
    /// Records that were added to the graph
    pub loaded: u64,

    /// Records that were skipped because of their category
    ///
    /// Review archives are filtered before their product documents are
    /// parsed, so for them this counts product documents, not reviews.
    pub filtered: u64,

    /// Records that were skipped because they are malformed
    pub malformed: u64,
}
//
impl LoadStats {
    /// Records that were seen, whatever happened to them
    pub fn seen(&self) -> u64 {
        self.loaded + self.filtered + self.malformed
    }
}

/// Sink of parsed records, which applies the category filter and feeds the
/// surviving records into a review graph
pub struct Loader<'graph, G: ReviewGraph> {
    /// Graph being populated
    graph: &'graph mut G,

    /// Categories that records must belong to, if restricted
    filter: Option<&'graph CategoryFilter>,

    /// Statistics accumulated so far
    stats: LoadStats,
}
//
impl<'graph, G: ReviewGraph> Loader<'graph, G> {
    /// Prepare to populate a graph
    pub fn new(graph: &'graph mut G, filter: Option<&'graph CategoryFilter>) -> Self {
        Self {
            graph,
            filter,
            stats: LoadStats::default(),
        }
    }

    /// Truth that records from a certain category should be loaded
    ///
    /// Formats which group records by category can use this to skip a whole
    /// group at once. In that case, they should report it via
    /// [`skip_filtered()`](Self::skip_filtered).
    pub fn accepts(&self, category: Category) -> bool {
        self.filter.map_or(true, |filter| filter.accepts(category))
    }

    /// Record that a group of records was skipped because of its category
    pub fn skip_filtered(&mut self, location: impl Display, category: Category) {
        log::trace!("Skipped {location} because category {category} is not selected");
        self.stats.filtered += 1;
    }

    /// Submit the outcome of parsing a record
    ///
    /// `location` tells where the record comes from in log messages.
    pub fn submit(&mut self, location: impl Display, record: Result<ParsedReview, RecordError>) {
        let review = match record {
            Ok(review) => review,
            Err(e) => {
                log::warn!("Skipped malformed record at {location}: {e}");
                self.stats.malformed += 1;
                return;
            }
        };
        if !self.accepts(review.category) {
            log::trace!(
                "Rejected record at {location} because category {} is not selected",
                review.category
            );
            self.stats.filtered += 1;
            return;
        }
        self.emit(&review);
    }

    /// Add a review and its endpoints to the graph
    fn emit(&mut self, review: &ParsedReview) {
        let reviewer = self
            .graph
            .add_or_get_reviewer(&review.reviewer_id, review.reviewer_name.as_deref());
        let product = self.graph.add_or_get_product(
            &review.product_id,
            review.product_title.as_deref(),
            review.category,
        );
        self.graph.add_review(
            &reviewer,
            &product,
            review.rating,
            review.date.as_deref(),
            &review.text,
        );
        self.stats.loaded += 1;
    }

    /// Statistics about the records submitted so far
    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::AMAZON_REVIEWS,
        graph::MemoryGraph,
        record::{Rating, RecordError},
    };

    fn review(reviewer_id: &str, product_id: &str, category: &str) -> ParsedReview {
        ParsedReview {
            product_id: product_id.into(),
            product_title: None,
            category: AMAZON_REVIEWS.category(category).unwrap(),
            reviewer_id: reviewer_id.into(),
            reviewer_name: None,
            helpfulness: None,
            rating: Rating::new(5.0).unwrap(),
            date: Some("20120105".into()),
            summary: None,
            text: "Works".into(),
        }
    }

    #[test]
    fn accepted_records_reach_the_graph() {
        let mut graph = MemoryGraph::new();
        let mut loader = Loader::new(&mut graph, None);
        loader.submit("record 1", Ok(review("U1", "P1", "cameras")));
        loader.submit("record 2", Ok(review("U1", "P2", "TVs")));
        loader.submit("record 3", Err(RecordError::MissingField("review/score")));
        assert_eq!(
            loader.stats(),
            LoadStats {
                loaded: 2,
                filtered: 0,
                malformed: 1
            }
        );
        assert_eq!(loader.stats().seen(), 3);
        assert_eq!(graph.reviewers().len(), 1);
        assert_eq!(graph.products().len(), 2);
        assert_eq!(graph.reviews().len(), 2);
        assert_eq!(graph.reviews()[0].date.as_deref(), Some("20120105"));
    }

    #[test]
    fn filtered_records_never_reach_the_graph() {
        let filter = CategoryFilter::new(&AMAZON_REVIEWS, ["TVs"]).unwrap();
        let mut graph = MemoryGraph::new();
        let mut loader = Loader::new(&mut graph, filter.as_ref());
        assert!(!loader.accepts(AMAZON_REVIEWS.category("cameras").unwrap()));
        loader.submit("record 1", Ok(review("U1", "P1", "cameras")));
        loader.submit("record 2", Ok(review("U2", "P2", "TVs")));
        assert_eq!(loader.stats().filtered, 1);
        assert_eq!(loader.stats().loaded, 1);
        assert_eq!(&*graph.reviewers()[0].id, "U2");
        assert_eq!(graph.products().len(), 1);
    }
}

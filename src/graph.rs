//! Review graph capability consumed by the loader, and a simple in-memory
//! implementation of it

use crate::{
    catalog::Category,
    record::Rating,
    state::{GraphState, ProductState, ReviewerState},
};
use std::collections::{hash_map, HashMap};

/// Bipartite graph of reviewers and products, connected by reviews
///
/// Node insertion has create-if-absent semantics: asking for a node that
/// already exists returns a handle to the existing node. Reviews are always
/// appended, even if the same reviewer already reviewed the same product; it
/// is up to the implementation to deduplicate them if it so desires.
pub trait ReviewGraph {
    /// Handle to a reviewer node
    type Reviewer;

    /// Handle to a product node
    type Product;

    /// Get the reviewer with a certain identifier, creating it if needed
    fn add_or_get_reviewer(&mut self, id: &str, name: Option<&str>) -> Self::Reviewer;

    /// Get the product with a certain identifier, creating it if needed
    fn add_or_get_product(
        &mut self,
        id: &str,
        title: Option<&str>,
        category: Category,
    ) -> Self::Product;

    /// Record that a reviewer reviewed a product
    fn add_review(
        &mut self,
        reviewer: &Self::Reviewer,
        product: &Self::Product,
        rating: Rating,
        date: Option<&str>,
        text: &str,
    );
}

/// Index of a reviewer within a [`MemoryGraph`]
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ReviewerIdx(usize);

/// Index of a product within a [`MemoryGraph`]
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProductIdx(usize);

/// Reviewer node
#[derive(Clone, Debug, PartialEq)]
pub struct Reviewer {
    pub id: Box<str>,
    pub name: Option<Box<str>>,
}

/// Product node
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: Box<str>,
    pub title: Option<Box<str>>,
    pub category: Category,
}

/// Review edge
#[derive(Clone, Debug, PartialEq)]
pub struct Review {
    pub reviewer: ReviewerIdx,
    pub product: ProductIdx,
    pub rating: Rating,
    pub date: Option<Box<str>>,
    pub text: Box<str>,
}

/// In-memory review graph
///
/// Nodes and edges are kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemoryGraph {
    reviewers: Vec<Reviewer>,
    reviewer_indices: HashMap<Box<str>, ReviewerIdx>,
    products: Vec<Product>,
    product_indices: HashMap<Box<str>, ProductIdx>,
    reviews: Vec<Review>,

    /// Sum of normalized ratings and number of reviews, for each product
    product_ratings: Vec<(f64, usize)>,
}
//
impl MemoryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Reviewers, in order of creation
    pub fn reviewers(&self) -> &[Reviewer] {
        &self.reviewers
    }

    /// Products, in order of creation
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Reviews, in order of creation
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Look up a reviewer
    pub fn reviewer(&self, idx: ReviewerIdx) -> &Reviewer {
        &self.reviewers[idx.0]
    }

    /// Look up a product
    pub fn product(&self, idx: ProductIdx) -> &Product {
        &self.products[idx.0]
    }

    /// Mean normalized rating of a product, if it has been reviewed
    pub fn mean_rating(&self, idx: ProductIdx) -> Option<f64> {
        let (sum, count) = self.product_ratings[idx.0];
        (count > 0).then(|| sum / count as f64)
    }
}
//
impl ReviewGraph for MemoryGraph {
    type Reviewer = ReviewerIdx;
    type Product = ProductIdx;

    fn add_or_get_reviewer(&mut self, id: &str, name: Option<&str>) -> ReviewerIdx {
        match self.reviewer_indices.entry(id.into()) {
            hash_map::Entry::Occupied(o) => *o.get(),
            hash_map::Entry::Vacant(v) => {
                let idx = ReviewerIdx(self.reviewers.len());
                self.reviewers.push(Reviewer {
                    id: id.into(),
                    name: name.map(Into::into),
                });
                *v.insert(idx)
            }
        }
    }

    fn add_or_get_product(
        &mut self,
        id: &str,
        title: Option<&str>,
        category: Category,
    ) -> ProductIdx {
        match self.product_indices.entry(id.into()) {
            hash_map::Entry::Occupied(o) => *o.get(),
            hash_map::Entry::Vacant(v) => {
                let idx = ProductIdx(self.products.len());
                self.products.push(Product {
                    id: id.into(),
                    title: title.map(Into::into),
                    category,
                });
                self.product_ratings.push((0.0, 0));
                *v.insert(idx)
            }
        }
    }

    fn add_review(
        &mut self,
        reviewer: &ReviewerIdx,
        product: &ProductIdx,
        rating: Rating,
        date: Option<&str>,
        text: &str,
    ) {
        let (sum, count) = &mut self.product_ratings[product.0];
        *sum += rating.normalized();
        *count += 1;
        self.reviews.push(Review {
            reviewer: *reviewer,
            product: *product,
            rating,
            date: date.map(Into::into),
            text: text.into(),
        });
    }
}
//
impl GraphState for MemoryGraph {
    fn reviewer_states(&self) -> impl Iterator<Item = ReviewerState<'_>> {
        // Reviewer anomaly scores come from mining algorithms, which this
        // graph does not run
        self.reviewers.iter().map(|reviewer| ReviewerState {
            reviewer_id: &reviewer.id,
            score: None,
        })
    }

    fn product_states(&self) -> impl Iterator<Item = ProductState<'_>> {
        self.products.iter().enumerate().map(|(idx, product)| ProductState {
            product_id: &product.id,
            summary: self.mean_rating(ProductIdx(idx)).unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AMAZON_REVIEWS;

    #[test]
    fn nodes_are_created_once() {
        let mut graph = MemoryGraph::new();
        let cameras = AMAZON_REVIEWS.category("cameras").unwrap();
        let alice = graph.add_or_get_reviewer("A1", Some("Alice"));
        let again = graph.add_or_get_reviewer("A1", Some("Someone else"));
        assert_eq!(alice, again);
        assert_eq!(graph.reviewer(alice).name.as_deref(), Some("Alice"));

        let camera = graph.add_or_get_product("P1", None, cameras);
        assert_eq!(graph.add_or_get_product("P1", Some("Camera"), cameras), camera);
        assert_eq!(graph.reviewers().len(), 1);
        assert_eq!(graph.products().len(), 1);
        assert_eq!(graph.product(camera).title, None);
    }

    #[test]
    fn duplicate_reviews_are_appended() {
        let mut graph = MemoryGraph::new();
        let tvs = AMAZON_REVIEWS.category("TVs").unwrap();
        let reviewer = graph.add_or_get_reviewer("A1", None);
        let product = graph.add_or_get_product("P1", None, tvs);
        graph.add_review(&reviewer, &product, Rating::new(5.0).unwrap(), None, "Great");
        graph.add_review(&reviewer, &product, Rating::new(3.0).unwrap(), None, "Meh");
        assert_eq!(graph.reviews().len(), 2);
        assert_eq!(graph.mean_rating(product), Some(0.75));
    }

    #[test]
    fn unreviewed_product_has_no_mean_rating() {
        let mut graph = MemoryGraph::new();
        let laptops = AMAZON_REVIEWS.category("laptops").unwrap();
        let product = graph.add_or_get_product("P1", None, laptops);
        assert_eq!(graph.mean_rating(product), None);
    }
}

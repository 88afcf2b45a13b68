//! JSON lines dump of a review graph's state
//!
//! Review graph mining algorithms iteratively update an anomaly score for each
//! reviewer and a rating summary for each product. This module outputs those
//! after each iteration, one JSON object per line:
//!
//! ```text
//! {"iteration":0,"reviewer":{"reviewer_id":"A1","score":0.2}}
//! {"iteration":0,"product":{"product_id":"P1","summary":0.75}}
//! ```

use serde::{Serialize, Serializer};
use std::io::{self, Write};

/// Graph that can report its mining state
pub trait GraphState {
    /// Current state of every reviewer
    fn reviewer_states(&self) -> impl Iterator<Item = ReviewerState<'_>>;

    /// Current state of every product
    fn product_states(&self) -> impl Iterator<Item = ProductState<'_>>;
}

/// Mining state of a reviewer
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReviewerState<'graph> {
    pub reviewer_id: &'graph str,

    /// Anomaly score, if the graph computes one
    pub score: Option<f64>,
}

/// Mining state of a product
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProductState<'graph> {
    pub product_id: &'graph str,

    /// Summary of the product's ratings
    pub summary: f64,
}

/// Mining iteration that a state dump is associated with
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Iteration {
    /// Numbered iteration, 0 being the initial state
    Step(u64),

    /// State after the last iteration
    Final,
}
//
impl Serialize for Iteration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Step(step) => serializer.serialize_u64(*step),
            Self::Final => serializer.serialize_str("final"),
        }
    }
}

/// Line of the dump about a reviewer
#[derive(Serialize)]
struct ReviewerLine<'graph> {
    iteration: Iteration,
    reviewer: ReviewerState<'graph>,
}

/// Line of the dump about a product
#[derive(Serialize)]
struct ProductLine<'graph> {
    iteration: Iteration,
    product: ProductState<'graph>,
}

/// Write the state of every reviewer, then every product
pub fn print_state(
    graph: &impl GraphState,
    iteration: Iteration,
    mut output: impl Write,
) -> io::Result<()> {
    for reviewer in graph.reviewer_states() {
        serde_json::to_writer(&mut output, &ReviewerLine { iteration, reviewer })?;
        output.write_all(b"\n")?;
    }
    for product in graph.product_states() {
        serde_json::to_writer(&mut output, &ProductLine { iteration, product })?;
        output.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::AMAZON_REVIEWS,
        graph::{MemoryGraph, ReviewGraph},
        record::Rating,
    };

    #[test]
    fn dump_lists_reviewers_then_products() {
        let mut graph = MemoryGraph::new();
        let tablets = AMAZON_REVIEWS.category("tablets").unwrap();
        let reviewer = graph.add_or_get_reviewer("A1", None);
        let product = graph.add_or_get_product("P1", None, tablets);
        graph.add_review(&reviewer, &product, Rating::new(4.0).unwrap(), None, "");

        let mut output = Vec::new();
        print_state(&graph, Iteration::Step(3), &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"iteration\":3,\"reviewer\":{\"reviewer_id\":\"A1\",\"score\":null}}\n\
             {\"iteration\":3,\"product\":{\"product_id\":\"P1\",\"summary\":0.75}}\n"
        );
    }

    #[test]
    fn final_iteration_is_labeled() {
        let mut graph = MemoryGraph::new();
        graph.add_or_get_reviewer("A1", None);
        let mut output = Vec::new();
        print_state(&graph, Iteration::Final, &mut output).unwrap();
        let line: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(line["iteration"], "final");
        assert_eq!(line["reviewer"]["reviewer_id"], "A1");
    }
}

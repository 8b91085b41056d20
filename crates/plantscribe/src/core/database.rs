//! Element/relation store abstraction
//!
//! Uniform node/edge access over a diagram model. [`EntityModel`] is the
//! implementation used by the pipeline.
//!
//! [`EntityModel`]: super::EntityModel

use super::error::PipelineError;

/// Ordered, checked storage of diagram nodes and edges
///
/// Insertions are checked: implementations reject nodes and edges that
/// would break the model's invariants instead of storing them.
pub trait Database: Send + Sync {
    type Node: Clone + Send + Sync;
    type Edge: Clone + Send + Sync;

    /// Insert a node; a duplicate or illegal node is an error
    fn add_node(&mut self, node: Self::Node) -> Result<(), PipelineError>;

    /// Insert an edge; both endpoints must already be stored
    fn add_edge(&mut self, edge: Self::Edge) -> Result<(), PipelineError>;

    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Nodes in insertion order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Edges in insertion order
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Drop every node and edge
    fn clear(&mut self);

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;
}

//! Entity co-occurrence graph for the Graph RAG exercises.
//!
//! The builder turns corpus records into an undirected entity graph and
//! materialises it as `nodes.jsonl` / `edges.jsonl` artifacts that the
//! Graph RAG pipeline (a workshop exercise) retrieves from.

pub mod builder;
pub mod extract;

pub use builder::{CooccurrenceGraph, GraphSummary};
pub use extract::extract_entities;

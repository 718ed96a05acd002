use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;

use super::extract::extract_entities;
use crate::core::errors::ApiError;
use crate::corpus::CorpusRecord;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Clone)]
struct EntityNode {
    label: String,
    frequency: u64,
}

/// Undirected entity co-occurrence graph.
///
/// Every record contributes one frequency count per entity it mentions,
/// and one weight unit per unordered entity pair it mentions together.
pub struct CooccurrenceGraph {
    graph: UnGraph<EntityNode, u64>,
    // lowercased label -> node
    index: HashMap<String, NodeIndex>,
}

impl CooccurrenceGraph {
    pub fn from_records(records: &[CorpusRecord]) -> Self {
        let mut builder = Self {
            graph: UnGraph::default(),
            index: HashMap::new(),
        };

        for record in records {
            let entities = extract_entities(&record.message);
            if entities.is_empty() {
                continue;
            }

            let nodes: Vec<NodeIndex> = entities
                .iter()
                .map(|entity| builder.touch_node(entity))
                .collect();

            for (i, &source) in nodes.iter().enumerate() {
                for &target in &nodes[i + 1..] {
                    builder.touch_edge(source, target);
                }
            }
        }

        builder
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn frequency(&self, entity: &str) -> u64 {
        self.index
            .get(&entity.to_lowercase())
            .map(|&idx| self.graph[idx].frequency)
            .unwrap_or(0)
    }

    pub fn edge_weight(&self, a: &str, b: &str) -> u64 {
        let Some(&left) = self.index.get(&a.to_lowercase()) else {
            return 0;
        };
        let Some(&right) = self.index.get(&b.to_lowercase()) else {
            return 0;
        };
        self.graph
            .find_edge(left, right)
            .map(|edge| self.graph[edge])
            .unwrap_or(0)
    }

    /// Write `nodes.jsonl` and `edges.jsonl` under `output_dir` and return
    /// the graph size summary. Edge endpoints are emitted in
    /// lexicographic order so re-runs produce identical artifacts.
    pub fn write_artifacts(&self, output_dir: &Path) -> Result<GraphSummary, ApiError> {
        fs::create_dir_all(output_dir).map_err(ApiError::internal)?;

        let mut nodes_file =
            fs::File::create(output_dir.join("nodes.jsonl")).map_err(ApiError::internal)?;
        for node in self.graph.node_weights() {
            let line = serde_json::json!({
                "id": node.label,
                "label": node.label,
                "frequency": node.frequency,
            });
            writeln!(nodes_file, "{}", line).map_err(ApiError::internal)?;
        }

        let mut edges_file =
            fs::File::create(output_dir.join("edges.jsonl")).map_err(ApiError::internal)?;
        for edge in self.graph.edge_indices() {
            let (a, b) = self
                .graph
                .edge_endpoints(edge)
                .ok_or_else(|| ApiError::Internal("edge without endpoints".to_string()))?;
            let weight = self.graph[edge];

            let mut source = self.graph[a].label.as_str();
            let mut target = self.graph[b].label.as_str();
            if source > target {
                std::mem::swap(&mut source, &mut target);
            }

            let line = serde_json::json!({
                "source": source,
                "target": target,
                "weight": weight,
            });
            writeln!(edges_file, "{}", line).map_err(ApiError::internal)?;
        }

        Ok(GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
        })
    }

    fn touch_node(&mut self, entity: &str) -> NodeIndex {
        let key = entity.to_lowercase();
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(EntityNode {
                    label: entity.to_string(),
                    frequency: 0,
                });
                self.index.insert(key, idx);
                idx
            }
        };
        self.graph[idx].frequency += 1;
        idx
    }

    fn touch_edge(&mut self, source: NodeIndex, target: NodeIndex) {
        if let Some(edge) = self.graph.find_edge(source, target) {
            self.graph[edge] += 1;
        } else {
            self.graph.add_edge(source, target, 1);
        }
    }
}

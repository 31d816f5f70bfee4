//! Project Overview
//!
//! The project-wide view handed to the visualization: every entrypoint and
//! the connector usages ("connections") they share. Built by
//! [`OverviewAggregator`] from the per-entrypoint dependency trees.

pub mod aggregator;

pub use aggregator::{Candidate, DirectoryResourceFinder, OverviewAggregator, ResourceFinder};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::artifact::EntrypointType;

/// An artifact that receives external traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrypoint {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entrypoint_type: EntrypointType,
    pub path: String,
    pub connection_ids: Vec<String>,
}

/// One distinct connector usage across the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
}

/// Entrypoints and shared connections of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewModel {
    pub project_name: String,
    pub entrypoints: Vec<Entrypoint>,
    pub connections: Vec<Connection>,
}

/// Node of the overview graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverviewNode {
    Entrypoint { id: String, name: String, entrypoint_type: EntrypointType },
    Connection { id: String, name: String },
}

impl OverviewNode {
    fn dot_id(&self) -> String {
        match self {
            OverviewNode::Entrypoint { id, .. } => format!("entrypoint_{}", id),
            OverviewNode::Connection { id, .. } => format!("connection_{}", id),
        }
    }

    fn label(&self) -> &str {
        match self {
            OverviewNode::Entrypoint { name, .. } | OverviewNode::Connection { name, .. } => name,
        }
    }
}

impl OverviewModel {
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn entrypoint(&self, name: &str) -> Option<&Entrypoint> {
        self.entrypoints.iter().find(|e| e.name == name)
    }

    /// Entrypoint → connection graph
    pub fn to_graph(&self) -> DiGraph<OverviewNode, ()> {
        let mut graph = DiGraph::with_capacity(
            self.entrypoints.len() + self.connections.len(),
            self.entrypoints.iter().map(|e| e.connection_ids.len()).sum(),
        );

        let mut connection_idx: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.connections.len());
        for connection in &self.connections {
            let idx = graph.add_node(OverviewNode::Connection {
                id: connection.id.clone(),
                name: connection.name.clone(),
            });
            connection_idx.insert(connection.id.as_str(), idx);
        }

        for entrypoint in &self.entrypoints {
            let from = graph.add_node(OverviewNode::Entrypoint {
                id: entrypoint.id.clone(),
                name: entrypoint.name.clone(),
                entrypoint_type: entrypoint.entrypoint_type,
            });
            for id in &entrypoint.connection_ids {
                if let Some(&to) = connection_idx.get(id.as_str()) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        graph
    }

    /// Graphviz rendering of the overview graph
    pub fn to_dot(&self) -> String {
        let graph = self.to_graph();
        let mut output = String::new();

        output.push_str(&format!("digraph \"{}\" {{\n", escape(&self.project_name)));
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push('\n');

        for node in graph.node_weights() {
            let color = match node {
                OverviewNode::Entrypoint { entrypoint_type: EntrypointType::Service, .. } => "#2196F3",
                OverviewNode::Entrypoint { entrypoint_type: EntrypointType::ScheduledTask, .. } => "#FF9800",
                OverviewNode::Entrypoint { entrypoint_type: EntrypointType::Trigger, .. } => "#9C27B0",
                OverviewNode::Connection { .. } => "#4CAF50",
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                node.dot_id(),
                escape(node.label()),
                color
            ));
        }

        output.push('\n');

        for edge in graph.edge_references() {
            if let (Some(source), Some(target)) =
                (graph.node_weight(edge.source()), graph.node_weight(edge.target()))
            {
                output.push_str(&format!("  \"{}\" -> \"{}\";\n", source.dot_id(), target.dot_id()));
            }
        }

        output.push_str("}\n");
        output
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

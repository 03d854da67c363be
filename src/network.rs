//! The network model the diagram consumes.
//!
//! The diagram engine does not own the river network topology; it reads and
//! mutates it through [`NetworkModel`]. [`StreamNetwork`] is the in-memory
//! implementation used by the application and tests, loadable from JSON.

use crate::coords::{Buffer, DataPoint, DataRect};
use crate::error::Result;
use crate::types::{Annotation, Legend, Link, Node, PageLayout};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Read/mutate interface over a river network.
pub trait NetworkModel: std::fmt::Debug {
    /// Id of the node at which the computational ordering starts.
    fn most_upstream(&self) -> Option<&str>;

    /// Id of the node following `id` in computational (upstream to downstream) order.
    fn next_in_order(&self, id: &str) -> Option<&str>;

    /// Id of the node physically downstream of `id`.
    fn downstream_of(&self, id: &str) -> Option<&str>;

    /// All nodes, in storage order.
    fn nodes(&self) -> &[Node];

    /// All nodes, mutable. Ids may be rewritten by the diagram to make them unique.
    fn nodes_mut(&mut self) -> &mut [Node];

    /// Adds a node.
    fn add_node(&mut self, node: Node);

    /// Removes the node with `id`, returning it.
    fn remove_node(&mut self, id: &str) -> Option<Node>;

    /// Re-derives the computational order after ids or downstream references changed.
    fn refresh_topology(&mut self);

    /// Links between nodes.
    fn links(&self) -> &[Link];

    /// Links between nodes, mutable.
    fn links_mut(&mut self) -> &mut Vec<Link>;

    /// Free-text annotations.
    fn annotations(&self) -> &[Annotation];

    /// Free-text annotations, mutable.
    fn annotations_mut(&mut self) -> &mut Vec<Annotation>;

    /// The legend.
    fn legend(&self) -> &Legend;

    /// The legend, mutable.
    fn legend_mut(&mut self) -> &mut Legend;

    /// Bounding box of the diagram content in data units.
    fn bounds(&self) -> DataRect;

    /// Padding between the content and the edge of the page.
    fn edge_buffer(&self) -> Buffer {
        Buffer::default()
    }

    /// Page layout presets.
    fn layouts(&self) -> &[PageLayout];

    /// Looks up a page layout by name.
    fn layout(&self, name: &str) -> Option<&PageLayout> {
        self.layouts().iter().find(|l| l.name == name)
    }

    /// Clones the model into a new box (used to isolate print/export passes).
    fn clone_box(&self) -> Box<dyn NetworkModel>;

    /// Serializes the network, including edited positions, for saving.
    fn save_json(&self) -> Result<String>;
}

impl Clone for Box<dyn NetworkModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// In-memory river network.
///
/// Computational order visits every tributary before the node it flows into,
/// starting from the most upstream headwater of the first tributary in storage
/// order and ending at the outlet.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StreamNetwork {
    /// Stations
    pub nodes: Vec<Node>,
    /// Extra connections drawn between stations
    pub links: Vec<Link>,
    /// Free-text annotations
    pub annotations: Vec<Annotation>,
    /// Legend placement
    pub legend: Legend,
    /// Explicit document bounds; derived from content when absent
    pub bounds: Option<DataRect>,
    /// Padding between content and page edge
    pub edge_buffer: Buffer,
    /// Page layout presets
    pub layouts: Vec<PageLayout>,
    #[serde(skip)]
    order: Vec<String>,
    #[serde(skip)]
    order_index: HashMap<String, usize>,
}

impl StreamNetwork {
    /// Creates a network from nodes and links and derives its computational order.
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let mut network = Self {
            nodes,
            links,
            layouts: vec![PageLayout::default()],
            ..Default::default()
        };
        network.refresh_topology();
        network
    }

    /// Parses a network from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut network: Self = serde_json::from_str(json)?;
        if network.layouts.is_empty() {
            network.layouts.push(PageLayout::default());
        }
        network.refresh_topology();
        Ok(network)
    }

    /// Serializes the network to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Node ids in computational order.
    pub fn computational_order(&self) -> &[String] {
        &self.order
    }

    fn compute_order(&self) -> Vec<String> {
        let ids: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .rev()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        // Upstream adjacency in storage order.
        let mut upstream: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut downstream: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut outlets = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            match node.downstream.as_deref().and_then(|d| ids.get(d)) {
                Some(&d) if d != i => {
                    upstream[d].push(i);
                    downstream[i] = Some(d);
                }
                _ => outlets.push(i),
            }
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        for outlet in outlets {
            self.post_order(outlet, &upstream, &mut visited, &mut order);
        }

        // Components draining into a cycle have no outlet. Root each at the
        // first node its downstream chain revisits.
        for start in 0..self.nodes.len() {
            if visited[start] {
                continue;
            }
            let mut seen = HashSet::new();
            let mut root = start;
            while seen.insert(root) {
                match downstream[root] {
                    Some(d) if !visited[d] => root = d,
                    _ => break,
                }
            }
            log::debug!("node {} drains into a cycle", self.nodes[root].id);
            self.post_order(root, &upstream, &mut visited, &mut order);
        }
        order
    }

    /// Iterative post-order from `root`: tributaries first, then the node itself.
    fn post_order(
        &self,
        root: usize,
        upstream: &[Vec<usize>],
        visited: &mut [bool],
        order: &mut Vec<String>,
    ) {
        let mut stack = vec![(root, 0usize)];
        visited[root] = true;
        while let Some((node, child)) = stack.pop() {
            if let Some(&up) = upstream[node].get(child) {
                stack.push((node, child + 1));
                if !visited[up] {
                    visited[up] = true;
                    stack.push((up, 0));
                }
            } else {
                order.push(self.nodes[node].id.clone());
            }
        }
    }

    fn content_bounds(&self) -> Option<DataRect> {
        let points = self
            .nodes
            .iter()
            .map(|n| n.position)
            .chain(self.annotations.iter().map(|a| a.anchor))
            .chain(std::iter::once(self.legend.anchor).filter(|_| !self.nodes.is_empty()));
        DataRect::bounding(points)
    }
}

impl NetworkModel for StreamNetwork {
    fn most_upstream(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    fn next_in_order(&self, id: &str) -> Option<&str> {
        let i = *self.order_index.get(id)?;
        self.order.get(i + 1).map(String::as_str)
    }

    fn downstream_of(&self, id: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.downstream.as_deref())
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
        self.refresh_topology();
    }

    fn remove_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let removed = self.nodes.remove(index);
        // Reconnect upstream neighbours to the removed node's downstream.
        for node in &mut self.nodes {
            if node.downstream.as_deref() == Some(id) {
                node.downstream = removed.downstream.clone();
            }
        }
        self.refresh_topology();
        Some(removed)
    }

    fn refresh_topology(&mut self) {
        self.order = self.compute_order();
        self.order_index = self
            .order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
    }

    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        &mut self.annotations
    }

    fn legend(&self) -> &Legend {
        &self.legend
    }

    fn legend_mut(&mut self) -> &mut Legend {
        &mut self.legend
    }

    fn bounds(&self) -> DataRect {
        self.bounds
            .or_else(|| self.content_bounds())
            .filter(DataRect::is_positive)
            .unwrap_or_else(|| {
                // Degenerate content (a single point): give it some room.
                let c = self
                    .content_bounds()
                    .map(|r| r.center())
                    .unwrap_or(DataPoint::new(50.0, 50.0));
                DataRect::from_center(c, 100.0, 100.0)
            })
    }

    fn edge_buffer(&self) -> Buffer {
        self.edge_buffer
    }

    fn layouts(&self) -> &[PageLayout] {
        &self.layouts
    }

    fn clone_box(&self) -> Box<dyn NetworkModel> {
        Box::new(self.clone())
    }

    fn save_json(&self) -> Result<String> {
        self.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeCategory;

    fn node(id: &str, down: Option<&str>) -> Node {
        let n = Node::new(id, NodeCategory::StreamGage, DataPoint::new(0.0, 0.0));
        match down {
            Some(d) => n.with_downstream(d),
            None => n,
        }
    }

    #[test]
    fn tributaries_come_before_their_confluence() {
        // A -> C, B -> C, C -> END
        let net = StreamNetwork::new(
            vec![
                node("END", None),
                node("C", Some("END")),
                node("A", Some("C")),
                node("B", Some("C")),
            ],
            vec![],
        );
        assert_eq!(net.computational_order(), ["A", "B", "C", "END"]);
        assert_eq!(net.most_upstream(), Some("A"));
        assert_eq!(net.next_in_order("B"), Some("C"));
        assert_eq!(net.next_in_order("END"), None);
        assert_eq!(net.downstream_of("A"), Some("C"));
    }

    #[test]
    fn nodes_draining_into_a_cycle_stay_in_order() {
        // D -> A, A -> B, B -> A; plus an unrelated reach E -> F
        let net = StreamNetwork::new(
            vec![
                node("D", Some("A")),
                node("A", Some("B")),
                node("B", Some("A")),
                node("E", Some("F")),
                node("F", None),
            ],
            vec![],
        );
        assert_eq!(net.computational_order(), ["E", "F", "D", "B", "A"]);

        let model = crate::diagram::DiagramModel::new(Box::new(net));
        let drawn: Vec<&str> = model.ordered_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(drawn, ["E", "F", "D", "B", "A"]);
    }

    #[test]
    fn removing_a_node_reconnects_upstream() {
        let mut net = StreamNetwork::new(
            vec![node("A", Some("B")), node("B", Some("C")), node("C", None)],
            vec![],
        );
        net.remove_node("B");
        assert_eq!(net.downstream_of("A"), Some("C"));
        assert_eq!(net.computational_order(), ["A", "C"]);
    }

    #[test]
    fn json_round_trip_restores_order() {
        let net = StreamNetwork::new(vec![node("A", Some("B")), node("B", None)], vec![]);
        let json = net.to_json().unwrap();
        let loaded = StreamNetwork::from_json(&json).unwrap();
        assert_eq!(loaded.computational_order(), ["A", "B"]);
        assert_eq!(loaded.layouts().len(), 1);
    }

    #[test]
    fn explicit_bounds_win_over_content() {
        let mut net = StreamNetwork::new(vec![node("A", None)], vec![]);
        net.bounds = Some(DataRect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(net.bounds(), DataRect::new(0.0, 0.0, 1000.0, 1000.0));
    }
}

//! Flat, traversal-ordered view over the network model.
//!
//! [`DiagramModel`] wraps a [`NetworkModel`] and caches the node indices in
//! computational order so drawing and hit-testing do not walk the network on
//! every frame. The cache is rebuilt whenever topology changes.

use crate::coords::{DataPoint, DataRect};
use crate::network::NetworkModel;
use crate::types::{Annotation, Legend, Node, NodeCategory};
use std::collections::HashSet;

/// What lies under a data-space point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Node at the given storage index
    Node(usize),
    /// Annotation at the given index
    Annotation(usize),
    /// The legend block
    Legend,
}

/// Walks a chain of ids from `start` using `next`, stopping at the end of the
/// chain or when an id repeats.
pub fn traversal_order<'a>(
    start: Option<&'a str>,
    mut next: impl FnMut(&str) -> Option<&'a str>,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut current = start;
    while let Some(id) = current {
        if !seen.insert(id) {
            log::debug!("traversal revisited node {id}; stopping");
            break;
        }
        order.push(id);
        current = next(id);
    }
    order
}

/// Renames duplicate ids so every id is unique.
///
/// The first occurrence keeps its id; later occurrences get `_2`, `_3`, ...
/// appended, skipping suffixes that are already taken.
///
/// # Returns
///
/// The number of ids that were changed.
pub fn assign_unique_ids(nodes: &mut [Node]) -> usize {
    let mut taken: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut renamed = 0;
    for node in nodes.iter_mut() {
        if seen.insert(node.id.clone()) {
            continue;
        }
        let mut counter = 2;
        let unique = loop {
            let candidate = format!("{}_{}", node.id, counter);
            if !taken.contains(&candidate) {
                break candidate;
            }
            counter += 1;
        };
        log::warn!("duplicate node id {} renamed to {}", node.id, unique);
        taken.insert(unique.clone());
        seen.insert(unique.clone());
        node.id = unique;
        renamed += 1;
    }
    renamed
}

/// Cached accessor over a network model.
#[derive(Debug, Clone)]
pub struct DiagramModel {
    network: Box<dyn NetworkModel>,
    order: Vec<usize>,
    icon_diameter: f64,
}

impl DiagramModel {
    /// Wraps `network` and builds the traversal cache.
    pub fn new(network: Box<dyn NetworkModel>) -> Self {
        let mut model = Self {
            network,
            order: Vec::new(),
            icon_diameter: 0.0,
        };
        model.rebuild();
        model
    }

    /// Read access to the underlying network.
    pub fn network(&self) -> &dyn NetworkModel {
        self.network.as_ref()
    }

    /// Replaces the underlying network and rebuilds the cache.
    pub fn replace_network(&mut self, network: Box<dyn NetworkModel>) {
        self.network = network;
        self.rebuild();
    }

    /// Rebuilds the traversal cache: unique ids, computational order, icon sizes.
    pub fn rebuild(&mut self) {
        if assign_unique_ids(self.network.nodes_mut()) > 0 {
            self.network.refresh_topology();
        }

        let net = self.network.as_ref();
        let ids = traversal_order(net.most_upstream(), |id| net.next_in_order(id));
        let nodes = net.nodes();
        self.order = ids
            .into_iter()
            .filter_map(|id| nodes.iter().position(|n| n.id == id))
            .filter(|&i| nodes[i].category != NodeCategory::Unknown)
            .collect();

        let diameter = self.icon_diameter;
        self.set_icon_diameter(diameter);
        log::debug!("diagram cache rebuilt with {} nodes", self.order.len());
    }

    /// Assigns the derived icon diameter (data units) to every node.
    pub fn set_icon_diameter(&mut self, diameter: f64) {
        self.icon_diameter = diameter;
        for node in self.network.nodes_mut() {
            node.icon_diameter = diameter;
        }
    }

    /// Current derived icon diameter in data units.
    pub fn icon_diameter(&self) -> f64 {
        self.icon_diameter
    }

    /// Storage indices of drawn nodes, in traversal order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Drawn nodes in traversal order.
    pub fn ordered_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        let nodes = self.network.nodes();
        self.order.iter().map(move |&i| &nodes[i])
    }

    /// All nodes in storage order.
    pub fn nodes(&self) -> &[Node] {
        self.network.nodes()
    }

    /// Node at a storage index.
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.network.nodes().get(index)
    }

    /// Mutable node at a storage index. Position edits only; use the topology
    /// methods to change ids.
    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.network.nodes_mut().get_mut(index)
    }

    /// Storage index of the node with `id` (linear scan).
    pub fn find_node(&self, id: &str) -> Option<usize> {
        self.network.nodes().iter().position(|n| n.id == id)
    }

    /// Node with `id`.
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.network.nodes().iter().find(|n| n.id == id)
    }

    /// Storage indices of drawn nodes of the given category.
    pub fn nodes_of(&self, category: NodeCategory) -> Vec<usize> {
        let nodes = self.network.nodes();
        self.order
            .iter()
            .copied()
            .filter(|&i| nodes[i].category == category)
            .collect()
    }

    /// Topmost node under `p`; later nodes in traversal order are on top.
    pub fn node_at(&self, p: DataPoint) -> Option<usize> {
        let nodes = self.network.nodes();
        self.order.iter().rev().copied().find(|&i| nodes[i].contains(p))
    }

    /// Topmost annotation under `p`.
    pub fn annotation_at(&self, p: DataPoint) -> Option<usize> {
        self.network
            .annotations()
            .iter()
            .rposition(|a| a.contains(p))
    }

    /// Classifies what lies under `p`: nodes first, then annotations, then the legend.
    pub fn hit_test(&self, p: DataPoint) -> Option<Hit> {
        self.node_at(p)
            .map(Hit::Node)
            .or_else(|| self.annotation_at(p).map(Hit::Annotation))
            .or_else(|| self.network.legend().contains(p).then_some(Hit::Legend))
    }

    /// Links, annotations and legend.
    pub fn annotations(&self) -> &[Annotation] {
        self.network.annotations()
    }

    /// Mutable annotations.
    pub fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        self.network.annotations_mut()
    }

    /// The legend.
    pub fn legend(&self) -> &Legend {
        self.network.legend()
    }

    /// The legend, mutable.
    pub fn legend_mut(&mut self) -> &mut Legend {
        self.network.legend_mut()
    }

    /// Bounding box of the content as reported by the network.
    pub fn data_bounds(&self) -> DataRect {
        self.network.bounds()
    }

    /// Adds a node and rebuilds the cache.
    pub fn add_node(&mut self, node: Node) {
        self.network.add_node(node);
        self.rebuild();
    }

    /// Removes a node and rebuilds the cache. Links pointing at it are kept and
    /// simply stop being drawn.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let removed = self.network.remove_node(id);
        if removed.is_some() {
            self.rebuild();
        }
        removed
    }

    /// Renames a node, updating downstream references, and rebuilds the cache.
    ///
    /// # Returns
    ///
    /// `false` if `old` does not exist or `new` is already taken.
    pub fn rename_node(&mut self, old: &str, new: &str) -> bool {
        if self.find_node(new).is_some() {
            return false;
        }
        let Some(index) = self.find_node(old) else {
            return false;
        };
        let nodes = self.network.nodes_mut();
        nodes[index].id = new.to_string();
        for node in nodes.iter_mut() {
            if node.downstream.as_deref() == Some(old) {
                node.downstream = Some(new.to_string());
            }
        }
        self.network.refresh_topology();
        self.rebuild();
        true
    }

    /// Clears selection flags on all nodes and annotations.
    pub fn clear_selection(&mut self) {
        for node in self.network.nodes_mut() {
            node.selected = false;
        }
        for a in self.network.annotations_mut() {
            a.selected = false;
        }
    }

    /// Storage indices of selected nodes, in traversal order.
    pub fn selected_nodes(&self) -> Vec<usize> {
        let nodes = self.network.nodes();
        self.order
            .iter()
            .copied()
            .filter(|&i| nodes[i].selected)
            .collect()
    }

    /// Whether any node, annotation or the legend has unsaved position edits.
    pub fn is_dirty(&self) -> bool {
        self.network.nodes().iter().any(|n| n.dirty)
            || self.network.annotations().iter().any(|a| a.dirty)
            || self.network.legend().dirty
    }

    /// Clears dirty flags after a save.
    pub fn mark_clean(&mut self) {
        for node in self.network.nodes_mut() {
            node.dirty = false;
        }
        for a in self.network.annotations_mut() {
            a.dirty = false;
        }
        self.network.legend_mut().dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::StreamNetwork;
    use crate::types::TextPosition;
    use std::collections::HashMap;

    fn chain() -> StreamNetwork {
        StreamNetwork::new(
            vec![
                Node::new("A", NodeCategory::StreamGage, DataPoint::new(0.0, 0.0)).with_downstream("B"),
                Node::new("B", NodeCategory::Diversion, DataPoint::new(10.0, 0.0)).with_downstream("U"),
                Node::new("U", NodeCategory::Unknown, DataPoint::new(15.0, 0.0)).with_downstream("C"),
                Node::new("C", NodeCategory::Diversion, DataPoint::new(20.0, 0.0)),
            ],
            vec![],
        )
    }

    #[test]
    fn duplicate_ids_get_stable_suffixes() {
        let mut nodes = vec![
            Node::new("X", NodeCategory::Well, DataPoint::default()),
            Node::new("X", NodeCategory::Well, DataPoint::default()),
            Node::new("X_2", NodeCategory::Well, DataPoint::default()),
            Node::new("X", NodeCategory::Well, DataPoint::default()),
        ];
        assert_eq!(assign_unique_ids(&mut nodes), 2);
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["X", "X_3", "X_2", "X_4"]);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), nodes.len());
    }

    #[test]
    fn traversal_halts_on_cycle() {
        let next: HashMap<&str, &str> = [("A", "B"), ("B", "C"), ("C", "A")].into_iter().collect();
        let order = traversal_order(Some("A"), |id| next.get(id).copied());
        assert_eq!(order, ["A", "B", "C"]);
    }

    #[test]
    fn cache_skips_unknown_nodes_and_follows_order() {
        let model = DiagramModel::new(Box::new(chain()));
        let ids: Vec<&str> = model.ordered_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(model.nodes_of(NodeCategory::Diversion).len(), 2);
    }

    #[test]
    fn loading_duplicates_rebuilds_unique_ids() {
        let net = StreamNetwork::new(
            vec![
                Node::new("A", NodeCategory::StreamGage, DataPoint::default()).with_downstream("B"),
                Node::new("A", NodeCategory::StreamGage, DataPoint::default()).with_downstream("B"),
                Node::new("B", NodeCategory::EndOfNetwork, DataPoint::default()),
            ],
            vec![],
        );
        let model = DiagramModel::new(Box::new(net));
        let ids: Vec<&str> = model.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "A_2", "B"]);
        assert_eq!(model.order().len(), 3);
    }

    #[test]
    fn hit_test_prefers_topmost_node_then_annotation() {
        let mut net = chain();
        // C overlaps B when icons are large
        net.annotations
            .push(Annotation::new("note", DataPoint::new(100.0, 100.0), TextPosition::Center));
        let mut model = DiagramModel::new(Box::new(net));
        model.set_icon_diameter(12.0);
        assert_eq!(model.hit_test(DataPoint::new(15.0, 0.0)), Some(Hit::Node(3)));
        assert_eq!(model.hit_test(DataPoint::new(0.0, 1.0)), Some(Hit::Node(0)));

        // Annotation bounds only exist once computed by a render pass.
        assert_eq!(model.hit_test(DataPoint::new(100.0, 100.0)), None);
        model.annotations_mut()[0].bounds = Some(DataRect::new(90.0, 95.0, 110.0, 105.0));
        assert_eq!(model.hit_test(DataPoint::new(100.0, 100.0)), Some(Hit::Annotation(0)));
    }

    #[test]
    fn rename_updates_downstream_references() {
        let mut model = DiagramModel::new(Box::new(chain()));
        assert!(model.rename_node("C", "OUT"));
        assert!(!model.rename_node("A", "B"));
        assert_eq!(model.network().downstream_of("U"), Some("OUT"));
        let ids: Vec<&str> = model.ordered_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "OUT"]);
    }

    #[test]
    fn removing_a_node_shrinks_the_cache() {
        let mut model = DiagramModel::new(Box::new(chain()));
        assert!(model.remove_node("B").is_some());
        let ids: Vec<&str> = model.ordered_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "C"]);
    }
}

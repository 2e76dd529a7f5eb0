//! R-tree index over graph nodes.

use std::collections::HashMap;

use geo::{Distance, Euclidean, Point};
use rstar::{AABB, Envelope, RTree};
use tracing::{debug, trace};

use crate::domain::{Node, NodeId};
use crate::wfs::WfsError;

use super::NodeResolver;

/// A node stored in the R-tree.
#[derive(Debug, Clone)]
struct IndexedNode(Node);

impl rstar::RTreeObject for IndexedNode {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.0.position)
    }
}

impl rstar::PointDistance for IndexedNode {
    fn distance_2(
        &self,
        point: &<Self::Envelope as Envelope>::Point,
    ) -> <<Self::Envelope as Envelope>::Point as rstar::Point>::Scalar {
        Euclidean.distance(self.0.position, *point).powi(2)
    }
}

/// In-memory spatial index of every node in the network.
///
/// Built once from the node layer; nodes never change afterwards.
#[derive(Debug)]
pub struct NodeIndex {
    tree: RTree<IndexedNode>,
    by_id: HashMap<NodeId, Node>,
}

impl NodeIndex {
    /// Bulk-load an index from a set of nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        let by_id = nodes.iter().map(|n| (n.id, n.clone())).collect();
        let tree = RTree::bulk_load(nodes.into_iter().map(IndexedNode).collect());
        debug!(nodes = tree.size(), "built node index");

        Self { tree, by_id }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.by_id.get(&id)
    }

    /// Iterate over every node, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.by_id.values()
    }

    /// Where to put the markers when a session starts: the two highest
    /// ranked nodes, source first. Equal ranks go to the lower id.
    pub fn initial_pair(&self) -> Option<(Node, Node)> {
        let mut ranked: Vec<&Node> = self.by_id.values().collect();
        ranked.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.id.cmp(&b.id)));
        match ranked.as_slice() {
            [source, target, ..] => Some(((*source).clone(), (*target).clone())),
            _ => None,
        }
    }

    /// The nearest node within `tolerance` of `position`.
    ///
    /// When several nodes sit at exactly the same distance the one with the
    /// lowest id wins, so answers are stable for a fixed dataset.
    pub fn nearest_within(&self, position: Point, tolerance: f64) -> Option<&Node> {
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&position);
        let (first, best) = candidates.next()?;

        if best > tolerance * tolerance {
            trace!(?position, tolerance, "no node within tolerance");
            return None;
        }

        let winner = candidates
            .take_while(|(_, d2)| *d2 == best)
            .map(|(n, _)| n)
            .fold(first, |a, b| if b.0.id < a.0.id { b } else { a });

        Some(&winner.0)
    }
}

impl NodeResolver for NodeIndex {
    async fn nearest_node(&self, position: Point, tolerance: f64) -> Result<Option<Node>, WfsError> {
        Ok(self.nearest_within(position, tolerance).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::point;

    fn node(id: u64, name: &str, x: f64, y: f64) -> Node {
        Node::new(NodeId(id), name, 5, point!(x: x, y: y))
    }

    fn index() -> NodeIndex {
        NodeIndex::new(vec![
            node(1, "Istanbul", 0.0, 0.0),
            node(2, "Izmit", 100.0, 0.0),
            node(3, "Bursa", 0.0, 100.0),
        ])
    }

    #[test]
    fn nearest_within_tolerance() {
        let index = index();
        let hit = index.nearest_within(point!(x: 90.0, y: 5.0), 20.0).unwrap();
        assert_eq!(hit.name, "Izmit");
    }

    #[test]
    fn nothing_within_tolerance() {
        let index = index();
        assert!(index.nearest_within(point!(x: 50.0, y: 50.0), 20.0).is_none());
    }

    #[test]
    fn tolerance_is_inclusive() {
        let index = index();
        let hit = index.nearest_within(point!(x: 0.0, y: 20.0), 20.0).unwrap();
        assert_eq!(hit.id, NodeId(1));
    }

    #[test]
    fn equal_distance_prefers_lowest_id() {
        let index = NodeIndex::new(vec![
            node(9, "East", 10.0, 0.0),
            node(4, "West", -10.0, 0.0),
            node(7, "North", 0.0, 10.0),
        ]);

        for _ in 0..5 {
            let hit = index.nearest_within(point!(x: 0.0, y: 0.0), 15.0).unwrap();
            assert_eq!(hit.id, NodeId(4));
        }
    }

    #[test]
    fn empty_index() {
        let index = NodeIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(index.nearest_within(point!(x: 0.0, y: 0.0), 1e9).is_none());
    }

    #[test]
    fn lookup_by_id() {
        let index = index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(NodeId(3)).map(|n| n.name.as_str()), Some("Bursa"));
        assert!(index.get(NodeId(42)).is_none());
    }

    #[test]
    fn initial_pair_prefers_rank_then_id() {
        let mut capital = node(5, "Constantinople", 0.0, 0.0);
        capital.rank = 10;
        let mut port = node(8, "Smyrna", 50.0, 0.0);
        port.rank = 8;
        let mut rival = node(2, "Salonica", 90.0, 0.0);
        rival.rank = 8;
        let index = NodeIndex::new(vec![port, node(1, "Village", 1.0, 1.0), capital, rival]);

        let (source, target) = index.initial_pair().unwrap();
        assert_eq!(source.id, NodeId(5));
        assert_eq!(target.id, NodeId(2));
    }

    #[test]
    fn initial_pair_needs_two_nodes() {
        let index = NodeIndex::new(vec![node(1, "Alone", 0.0, 0.0)]);
        assert!(index.initial_pair().is_none());
    }

    #[tokio::test]
    async fn resolver_returns_owned_node() {
        let index = index();
        let found = index
            .nearest_node(point!(x: 1.0, y: 99.0), 5.0)
            .await
            .unwrap();
        assert_eq!(found.map(|n| n.id), Some(NodeId(3)));
    }
}

//! Transitive reduction of a conflict graph

use crate::graph::{Graph, Node};
use blockpar_primitives::TxIndex;
use std::collections::HashSet;
use tracing::debug;

/// Drop every edge implied by a longer path, keeping reachability intact.
///
/// Nodes are resolved from the highest index down, so every child's
/// reachable set is final before its parents are visited. Edges of a node
/// are walked in increasing index order: an edge is kept only when its
/// target is not already reachable through edges kept before it. The input
/// graph is left untouched; the result shares the transaction payloads.
pub fn reduce(graph: &Graph) -> Graph {
    let len = graph.len();
    let mut reachable: Vec<HashSet<TxIndex>> = vec![HashSet::new(); len];
    let mut nodes: Vec<Node> = graph.nodes().iter().map(Node::detached).collect();
    let mut kept_edges: Vec<Vec<TxIndex>> = vec![Vec::new(); len];

    for index in (0..len).rev() {
        let mut reach = HashSet::from([index]);
        for &child in graph.nodes()[index].edges() {
            if reach.contains(&child) {
                continue;
            }
            kept_edges[index].push(child);
            reach.extend(reachable[child].iter().copied());
        }
        reachable[index] = reach;
    }

    for (index, children) in kept_edges.iter().enumerate() {
        for &child in children {
            nodes[index].push_edge(child);
            nodes[child].push_parent(index);
        }
    }

    let reduced = Graph::from_nodes(nodes);
    debug!(
        txs = len,
        edges = graph.edge_count(),
        kept = reduced.edge_count(),
        "Reduced conflict graph"
    );
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use blockpar_primitives::Address;
    use blockpar_types::TxTrace;

    fn addr(id: u8) -> Address {
        Address::from_bytes([id; 20])
    }

    fn edges(graph: &Graph) -> Vec<(TxIndex, TxIndex)> {
        graph
            .nodes()
            .iter()
            .flat_map(|n| n.edges().iter().map(move |&c| (n.index(), c)))
            .collect()
    }

    #[test]
    fn test_reduce_empty() {
        let reduced = reduce(&Graph::default());
        assert!(reduced.is_empty());
    }

    #[test]
    fn test_drops_transitive_edge() {
        // every transaction writes the same address: a full chain 0 -> 1 -> 2
        let txs: Vec<_> = (0..3).map(|i| TxTrace::new(i, 10).writes(addr(1))).collect();
        let graph = GraphBuilder::default().build(&txs).unwrap();
        assert_eq!(graph.edge_count(), 3);

        let reduced = reduce(&graph);
        assert_eq!(edges(&reduced), vec![(0, 1), (1, 2)]);
        assert!(reduced.check_invariants().is_ok());
        // input untouched
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_keeps_diamond() {
        let txs = vec![
            TxTrace::new(0, 1).writes(addr(1)).writes(addr(2)),
            TxTrace::new(1, 1).reads(addr(1)).writes(addr(3)),
            TxTrace::new(2, 1).reads(addr(2)).writes(addr(4)),
            TxTrace::new(3, 1).reads(addr(3)).reads(addr(4)),
        ];
        let graph = GraphBuilder::default().build(&txs).unwrap();
        let reduced = reduce(&graph);

        assert_eq!(edges(&reduced), vec![(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(reduced.node(3).unwrap().parents(), &[1, 2]);
    }

    #[test]
    fn test_idempotent() {
        let txs: Vec<_> = (0..6)
            .map(|i| TxTrace::new(i, 5).writes(addr((i % 2) as u8)).reads(addr(7)))
            .chain(std::iter::once(TxTrace::new(6, 5).writes(addr(7))))
            .collect();
        let graph = GraphBuilder::default().build(&txs).unwrap();
        let once = reduce(&graph);
        let twice = reduce(&once);

        assert_eq!(edges(&once), edges(&twice));
    }

    #[test]
    fn test_preserves_payload() {
        let txs = vec![TxTrace::new(0, 42).writes(addr(1)), TxTrace::new(1, 7)];
        let reduced = reduce(&GraphBuilder::default().build(&txs).unwrap());

        assert_eq!(reduced.node(0).unwrap().cost(), 42);
        assert_eq!(reduced.node(1).unwrap().tx(), &txs[1]);
    }
}

//! Conflict graph over the transactions of a block
//!
//! Nodes live in a single arena indexed by transaction index. An edge
//! `p -> c` means `c` must not start before `p` finishes; edges always
//! point from an earlier to a later transaction, so the graph is acyclic
//! by construction.

use crate::conflict::{self, ConflictCounts};
use crate::error::{InvariantViolation, SchedulerResult};
use crate::footprint::{ConflictPolicy, Footprint};
use blockpar_primitives::{Gas, TxIndex};
use blockpar_types::{TxTrace, TypesError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// One transaction in the graph
#[derive(Clone, Debug)]
pub struct Node {
    tx: Arc<TxTrace>,
    footprint: Arc<Footprint>,
    /// Children, in increasing index order
    edges: Vec<TxIndex>,
    /// Parents, in increasing index order
    parents: Vec<TxIndex>,
}

impl Node {
    fn new(tx: Arc<TxTrace>, footprint: Arc<Footprint>) -> Self {
        Self {
            tx,
            footprint,
            edges: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Copy of the node sharing its payload, without any links
    pub(crate) fn detached(&self) -> Self {
        Self::new(Arc::clone(&self.tx), Arc::clone(&self.footprint))
    }

    pub(crate) fn push_edge(&mut self, child: TxIndex) {
        self.edges.push(child);
    }

    pub(crate) fn push_parent(&mut self, parent: TxIndex) {
        self.parents.push(parent);
    }

    /// Transaction index
    pub fn index(&self) -> TxIndex {
        self.tx.index
    }

    /// Execution cost
    pub fn cost(&self) -> Gas {
        self.tx.gas_used
    }

    /// Underlying transaction
    pub fn tx(&self) -> &TxTrace {
        &self.tx
    }

    /// Derived conflict sets
    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Nodes that must start no earlier than this one finishes
    pub fn edges(&self) -> &[TxIndex] {
        &self.edges
    }

    /// Nodes this one waits for
    pub fn parents(&self) -> &[TxIndex] {
        &self.parents
    }

    /// Check if nothing waits for this node
    pub fn is_sink(&self) -> bool {
        self.edges.is_empty()
    }

    /// Check if this node waits for nothing
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Dependency DAG of a block
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node for a transaction index
    pub fn node(&self, index: TxIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// All nodes in block order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Nodes without parents
    pub fn roots(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.is_root())
    }

    /// Nodes without children
    pub fn sinks(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.is_sink())
    }

    /// Sum of all node costs (fully serial execution time), saturating at `Gas::MAX`
    pub fn total_cost(&self) -> Gas {
        self.nodes.iter().map(Node::cost).fold(0, Gas::saturating_add)
    }

    /// Check if `to` is reachable from `from` through one or more edges
    pub fn reaches(&self, from: TxIndex, to: TxIndex) -> bool {
        if from >= to || to >= self.nodes.len() {
            return false;
        }

        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            for &child in &self.nodes[current].edges {
                if child == to {
                    return true;
                }
                // nothing past `to` can lead back to it
                if child < to && seen.insert(child) {
                    stack.push(child);
                }
            }
        }
        false
    }

    /// Link `from -> to`, keeping both sides in sync
    pub(crate) fn connect(&mut self, from: TxIndex, to: TxIndex) {
        self.nodes[from].push_edge(to);
        self.nodes[to].push_parent(from);
    }

    /// Verify the structural invariants of the graph
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (position, node) in self.nodes.iter().enumerate() {
            if node.index() != position {
                return Err(InvariantViolation::NodeIndexMismatch {
                    position,
                    index: node.index(),
                });
            }

            for &child in &node.edges {
                if child <= position {
                    return Err(InvariantViolation::BackwardEdge {
                        from: position,
                        to: child,
                    });
                }
                let target = self.nodes.get(child).ok_or(InvariantViolation::DanglingEdge {
                    from: position,
                    to: child,
                })?;
                if !target.parents.contains(&position) {
                    return Err(InvariantViolation::AsymmetricEdge {
                        from: position,
                        to: child,
                    });
                }
            }

            for &parent in &node.parents {
                let source = self.nodes.get(parent).ok_or(InvariantViolation::DanglingEdge {
                    from: parent,
                    to: position,
                })?;
                if !source.edges.contains(&position) {
                    return Err(InvariantViolation::AsymmetricEdge {
                        from: parent,
                        to: position,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builds the conflict graph of a block
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    policy: ConflictPolicy,
    counts: ConflictCounts,
}

impl GraphBuilder {
    /// Create a builder applying `policy` to every transaction
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            counts: ConflictCounts::default(),
        }
    }

    /// Edges created by the last build, per conflict rule
    pub fn counts(&self) -> ConflictCounts {
        self.counts
    }

    /// Build the graph of `txs`, taken in the given order.
    ///
    /// Each transaction is compared with every earlier one; the first
    /// matching conflict rule adds a single edge from the earlier to the
    /// later transaction.
    pub fn build(&mut self, txs: &[TxTrace]) -> SchedulerResult<Graph> {
        self.counts = ConflictCounts::default();
        let mut graph = Graph::from_nodes(Vec::with_capacity(txs.len()));

        for (position, tx) in txs.iter().enumerate() {
            if tx.index != position {
                return Err(TypesError::IndexMismatch {
                    position,
                    declared: tx.index,
                }
                .into());
            }

            let footprint = Footprint::from_access(&tx.access, &self.policy);
            let mut parents = Vec::new();
            for earlier in &graph.nodes {
                if let Some(kind) = conflict::detect(&earlier.footprint, &footprint) {
                    self.counts.record(kind);
                    parents.push(earlier.index());
                }
            }

            graph
                .nodes
                .push(Node::new(Arc::new(tx.clone()), Arc::new(footprint)));
            // ascending parents keep every edge list in increasing order
            for parent in parents {
                graph.connect(parent, position);
            }
        }

        debug!(
            txs = graph.len(),
            edges = graph.edge_count(),
            "Built conflict graph"
        );
        Ok(graph)
    }
}

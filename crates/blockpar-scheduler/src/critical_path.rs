//! Critical paths and parallelism width of a conflict graph

use crate::graph::Graph;
use blockpar_primitives::{Gas, TxIndex};

/// Memoized longest downstream cost per node.
///
/// The critical path of a node is its own cost plus the largest critical
/// path among its children (zero for a sink): the work still ahead once
/// the node starts. Results are cached per transaction index, so repeated
/// queries against one graph are cheap.
#[derive(Debug)]
pub struct CriticalPath<'g> {
    graph: &'g Graph,
    memo: Vec<Option<Gas>>,
    in_progress: Vec<bool>,
}

impl<'g> CriticalPath<'g> {
    /// Create an empty memo table for `graph`
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            memo: vec![None; graph.len()],
            in_progress: vec![false; graph.len()],
        }
    }

    /// Critical path starting at `index`, or `None` if the node does not exist
    pub fn of(&mut self, index: TxIndex) -> Option<Gas> {
        if index >= self.graph.len() {
            return None;
        }

        // children are resolved before their parent; no recursion so long
        // chains cannot exhaust the stack
        let mut stack = vec![index];
        while let Some(&current) = stack.last() {
            if self.memo[current].is_some() {
                stack.pop();
                continue;
            }

            self.in_progress[current] = true;
            let node = &self.graph.nodes()[current];
            let mut longest_child: Gas = 0;
            let mut child_without_value = false;
            for &child in node.edges() {
                match self.memo[child] {
                    Some(value) => longest_child = longest_child.max(value),
                    // only a cycle leads back to a node still waiting on its children
                    None if self.in_progress[child] => {}
                    None => {
                        child_without_value = true;
                        stack.push(child);
                    }
                }
            }

            if !child_without_value {
                self.memo[current] = Some(node.cost().saturating_add(longest_child));
                self.in_progress[current] = false;
                stack.pop();
            }
        }

        self.memo[index]
    }

    /// Critical path of every node, in index order
    pub fn all(&mut self) -> Vec<Gas> {
        (0..self.graph.len())
            .map(|index| self.of(index).unwrap_or_default())
            .collect()
    }

    /// Completion time with unlimited lanes: the largest critical path
    /// over all root nodes, zero for an empty graph
    pub fn longest(&mut self) -> Gas {
        let roots: Vec<TxIndex> = self.graph.roots().map(|n| n.index()).collect();
        roots
            .into_iter()
            .filter_map(|index| self.of(index))
            .max()
            .unwrap_or(0)
    }
}

/// Completion time of the graph with unlimited parallel lanes
pub fn highest_cost_path(graph: &Graph) -> Gas {
    CriticalPath::new(graph).longest()
}

/// Number of independent chains starting at time zero (root count)
pub fn level_of_parallelization(graph: &Graph) -> usize {
    graph.roots().count()
}

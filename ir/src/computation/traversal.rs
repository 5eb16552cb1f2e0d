//! Post-order traversal over data and control edges.

use std::collections::HashSet;

use crate::computation::Computation;
use crate::types::NodeId;

impl Computation {
    /// All live nodes, each after its operands and control predecessors.
    ///
    /// Roots of the traversal are visited in iteration order, so the result is
    /// deterministic for a given graph.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut visited: HashSet<NodeId> = HashSet::with_capacity(self.node_count());
        let mut result = Vec::with_capacity(self.node_count());
        // (node, dependencies expanded)
        let mut stack: Vec<(NodeId, bool)> = Vec::new();

        for (root, _) in self.nodes() {
            if visited.contains(&root) {
                continue;
            }
            stack.push((root, false));
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    result.push(id);
                    continue;
                }
                if !visited.insert(id) {
                    continue;
                }
                stack.push((id, true));
                let Ok(node) = self.node(id) else { continue };
                let dependencies = node.operands().iter().chain(node.control_predecessors()).rev();
                for &dependency in dependencies {
                    if !visited.contains(&dependency) {
                        stack.push((dependency, false));
                    }
                }
            }
        }
        result
    }

    /// Every node that must run before `id`, through data or control edges.
    pub fn dependencies_of(&self, id: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut worklist = vec![id];
        while let Some(current) = worklist.pop() {
            let Ok(node) = self.node(current) else { continue };
            for &dependency in node.operands().iter().chain(node.control_predecessors()) {
                if seen.insert(dependency) {
                    worklist.push(dependency);
                }
            }
        }
        seen
    }
}

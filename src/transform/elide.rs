use std::collections::HashSet;

use itertools::Itertools;

use crate::error::GraphError;
use crate::graph::{Graph, GraphNodeId};

/// How a removal set is elided.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElisionStrategy {
    /// Bypass edges come from the original edges only. Connectivity through a
    /// chain of two or more removed nodes is dropped.
    #[default]
    SinglePass,
    /// Nodes are elided one at a time, each seeing the bypass edges of the
    /// ones before it, so chains are bridged.
    Sequential,
}

impl Graph {
    /// Removes every node in `removal`, connecting each predecessor of a
    /// removed node to each of its successors.
    ///
    /// Each distinct predecessor is joined once to each distinct successor,
    /// however many edges link them to the removed node. Bypass edges coming
    /// from different removed nodes are kept side by side.
    ///
    /// Fails without touching the graph if an id is not in the graph.
    pub fn elide(
        &mut self,
        removal: &HashSet<GraphNodeId>,
        strategy: ElisionStrategy,
    ) -> Result<(), GraphError> {
        if let Some(missing) = removal.iter().filter(|id| !self.contains(id)).min() {
            return Err(GraphError::NodeNotFound(missing.clone()));
        }

        if removal.is_empty() {
            return Ok(());
        }

        match strategy {
            ElisionStrategy::SinglePass => self.elide_single_pass(removal),
            ElisionStrategy::Sequential => self.elide_sequential(removal),
        }

        Ok(())
    }

    // removal members in node insertion order
    fn removal_order(&self, removal: &HashSet<GraphNodeId>) -> Vec<GraphNodeId> {
        self.node_ids()
            .filter(|id| removal.contains(*id))
            .map(str::to_string)
            .collect()
    }

    fn elide_single_pass(&mut self, removal: &HashSet<GraphNodeId>) {
        // edges landing on a removed node would be deleted with it
        let bypasses = self
            .removal_order(removal)
            .iter()
            .filter_map(|id| self.node(id))
            .flat_map(|node| {
                node.inputs()
                    .iter()
                    .filter(|id| !removal.contains(*id))
                    .unique()
                    .cartesian_product(
                        node.outputs()
                            .iter()
                            .filter(|id| !removal.contains(*id))
                            .unique()
                            .collect_vec(),
                    )
                    .map(|(from, to)| (from.clone(), to.clone()))
                    .collect_vec()
            })
            .collect_vec();

        tracing::debug!(
            "eliding {} nodes, inserting {} bypass edges",
            removal.len(),
            bypasses.len()
        );

        for (from, to) in bypasses {
            self.add_edge(from, to);
        }

        self.remove_nodes(removal);
    }

    fn elide_sequential(&mut self, removal: &HashSet<GraphNodeId>) {
        for id in self.removal_order(removal) {
            let Some(node) = self.node(&id) else {
                continue;
            };

            let bypasses = node
                .inputs()
                .iter()
                .filter(|from| **from != id)
                .unique()
                .cartesian_product(
                    node.outputs()
                        .iter()
                        .filter(|to| **to != id)
                        .unique()
                        .collect_vec(),
                )
                .map(|(from, to)| (from.clone(), to.clone()))
                .collect_vec();

            for (from, to) in bypasses {
                self.add_edge(from, to);
            }

            self.remove_nodes(&HashSet::from([id]));
        }
    }
}

/// Owning form of [`Graph::elide`].
pub fn elide(
    mut graph: Graph,
    removal: &HashSet<GraphNodeId>,
    strategy: ElisionStrategy,
) -> Result<Graph, GraphError> {
    graph.elide(removal, strategy)?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{elide, ElisionStrategy};
    use crate::error::GraphError;
    use crate::graph::{Graph, GraphNodeId};

    fn graph_from_edges(edges: &[(&str, &str)]) -> Graph {
        let mut g = Graph::new();
        for (from, to) in edges {
            g.add_edge(*from, *to);
        }
        g
    }

    fn ids(ids: &[&str]) -> HashSet<GraphNodeId> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn unittest_elide_reroutes_around_node() -> eyre::Result<()> {
        let g = graph_from_edges(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "B")]);

        let g = elide(g, &ids(&["B"]), ElisionStrategy::SinglePass)?;

        assert_eq!(g.node_ids().collect_vec(), vec!["A", "C", "D"]);
        assert_eq!(
            g.edges().collect_vec(),
            vec![("A", "C"), ("C", "D"), ("D", "C")]
        );

        Ok(())
    }

    #[test]
    fn unittest_elide_empty_removal_is_noop() -> eyre::Result<()> {
        let g = graph_from_edges(&[("a", "b"), ("b", "c"), ("a", "b")]);

        let elided = elide(g.clone(), &HashSet::new(), ElisionStrategy::SinglePass)?;

        assert_eq!(elided, g);
        Ok(())
    }

    #[test]
    fn unittest_elide_missing_node_leaves_graph() {
        let mut g = graph_from_edges(&[("a", "b"), ("b", "c")]);
        let before = g.clone();

        let result = g.elide(&ids(&["b", "x"]), ElisionStrategy::SinglePass);

        assert_eq!(result, Err(GraphError::NodeNotFound("x".to_string())));
        assert_eq!(g, before);
    }

    #[test]
    fn unittest_elide_keeps_parallel_edges() -> eyre::Result<()> {
        // two routes from a to c through different wires
        let g = graph_from_edges(&[("a", "w1"), ("a", "w2"), ("w1", "c"), ("w2", "c")]);

        let g = elide(g, &ids(&["w1", "w2"]), ElisionStrategy::SinglePass)?;

        assert_eq!(g.edges().collect_vec(), vec![("a", "c"), ("a", "c")]);
        Ok(())
    }

    #[test]
    fn unittest_elide_joins_distinct_neighbours_once() -> eyre::Result<()> {
        // one wire driving two ports of the same cell
        let g = graph_from_edges(&[("a", "b"), ("a", "b"), ("b", "c"), ("b", "c"), ("c", "d")]);

        for strategy in [ElisionStrategy::SinglePass, ElisionStrategy::Sequential] {
            let elided = elide(g.clone(), &ids(&["b"]), strategy)?;
            assert_eq!(elided.edges().collect_vec(), vec![("a", "c"), ("c", "d")]);
        }
        Ok(())
    }

    #[test]
    fn unittest_elide_fanout() -> eyre::Result<()> {
        let g = graph_from_edges(&[("a", "n"), ("b", "n"), ("n", "x"), ("n", "y")]);

        let g = elide(g, &ids(&["n"]), ElisionStrategy::SinglePass)?;

        assert_eq!(
            g.edges().collect_vec(),
            vec![("a", "x"), ("a", "y"), ("b", "x"), ("b", "y")]
        );
        Ok(())
    }

    #[test]
    fn unittest_elide_self_loop_on_removed_node() -> eyre::Result<()> {
        let g = graph_from_edges(&[("a", "n"), ("n", "n"), ("n", "b")]);

        for strategy in [ElisionStrategy::SinglePass, ElisionStrategy::Sequential] {
            let elided = elide(g.clone(), &ids(&["n"]), strategy)?;
            assert_eq!(elided.edges().collect_vec(), vec![("a", "b")]);
        }
        Ok(())
    }

    #[test]
    fn unittest_elide_chain_single_pass_drops_connectivity() -> eyre::Result<()> {
        let g = graph_from_edges(&[("a", "n1"), ("n1", "n2"), ("n2", "b")]);

        let g = elide(g, &ids(&["n1", "n2"]), ElisionStrategy::SinglePass)?;

        assert_eq!(g.node_ids().collect_vec(), vec!["a", "b"]);
        assert_eq!(g.edge_count(), 0);
        Ok(())
    }

    #[test]
    fn unittest_elide_chain_sequential_bridges() -> eyre::Result<()> {
        let g = graph_from_edges(&[("a", "n1"), ("n1", "n2"), ("n2", "n3"), ("n3", "b")]);

        let g = elide(g, &ids(&["n3", "n1", "n2"]), ElisionStrategy::Sequential)?;

        assert_eq!(g.edges().collect_vec(), vec![("a", "b")]);
        Ok(())
    }

    #[test]
    fn unittest_elide_strategies_agree_without_chains() -> eyre::Result<()> {
        let g = graph_from_edges(&[
            ("a", "n1"),
            ("n1", "b"),
            ("b", "n2"),
            ("n2", "a"),
            ("n2", "c"),
        ]);
        let removal = ids(&["n1", "n2"]);

        let single = elide(g.clone(), &removal, ElisionStrategy::SinglePass)?;
        let sequential = elide(g, &removal, ElisionStrategy::Sequential)?;

        assert_eq!(single, sequential);
        Ok(())
    }

    fn random_graph(rng: &mut StdRng, nodes: usize, edges: usize) -> Graph {
        let mut g = Graph::new();
        for index in 0..nodes {
            g.add_node(format!("v{index}"), Default::default());
        }
        for _ in 0..edges {
            let from = rng.gen_range(0..nodes);
            let to = rng.gen_range(0..nodes);
            g.add_edge(format!("v{from}"), format!("v{to}"));
        }
        g
    }

    #[test]
    fn unittest_elide_random_invariants() -> eyre::Result<()> {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..64 {
            let g = random_graph(&mut rng, 12, 30);
            let removal: HashSet<GraphNodeId> = g
                .node_ids()
                .filter(|_| rng.gen_bool(0.3))
                .map(str::to_string)
                .collect();

            let elided = elide(g.clone(), &removal, ElisionStrategy::SinglePass)?;

            // removed nodes are gone, others untouched
            for id in g.node_ids() {
                assert_eq!(elided.contains(id), !removal.contains(id));
            }
            assert!(elided
                .edges()
                .all(|(from, to)| !removal.contains(from) && !removal.contains(to)));

            let kept = elided.edges().counts();
            let original = g.edges().counts();

            // edges between kept nodes survive with their multiplicity
            for ((from, to), count) in &original {
                if !removal.contains(*from) && !removal.contains(*to) {
                    assert!(kept[&(*from, *to)] >= *count);
                }
            }

            // every one-hop route through a removed node is bridged
            for id in &removal {
                let node = g.node(id).unwrap();
                for from in node.inputs().iter().filter(|id| !removal.contains(*id)) {
                    for to in node.outputs().iter().filter(|id| !removal.contains(*id)) {
                        assert!(kept.contains_key(&(from.as_str(), to.as_str())));
                    }
                }
            }
        }

        Ok(())
    }

    #[test]
    fn unittest_elide_sequential_preserves_reachability() -> eyre::Result<()> {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..32 {
            let g = random_graph(&mut rng, 10, 18);
            let removal: HashSet<GraphNodeId> = g
                .node_ids()
                .filter(|_| rng.gen_bool(0.4))
                .map(str::to_string)
                .collect();

            let elided = elide(g.clone(), &removal, ElisionStrategy::Sequential)?;

            let kept = g.node_ids().filter(|id| !removal.contains(*id)).collect_vec();
            for (from, to) in kept.iter().cartesian_product(kept.iter()) {
                if from != to {
                    assert_eq!(
                        elided.is_reachable(from, to),
                        g.is_reachable(from, to),
                        "{from} -> {to}"
                    );
                }
            }
        }

        Ok(())
    }
}

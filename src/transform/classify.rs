use std::collections::HashSet;

use crate::graph::{Graph, GraphNodeId};

impl Graph {
    /// Ids of every node drawn as a wire (`diamond` or `point` shape).
    pub fn internal_nets(&self) -> HashSet<GraphNodeId> {
        self.nodes()
            .filter(|node| node.kind().is_net())
            .map(|node| node.id().to_string())
            .collect()
    }

    /// Edges that join two members of `removal` directly, self loops excluded.
    ///
    /// A single elision pass loses connectivity through each of these.
    pub fn net_chains(&self, removal: &HashSet<GraphNodeId>) -> Vec<(GraphNodeId, GraphNodeId)> {
        self.edges()
            .filter(|(from, to)| from != to && removal.contains(*from) && removal.contains(*to))
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::graph::{Attributes, Graph};

    fn shaped(shape: &str) -> Attributes {
        Attributes::from([("shape".to_string(), shape.to_string())])
    }

    #[test]
    fn unittest_classify_internal_nets() {
        let mut g = Graph::new();
        g.add_node("d", shaped("diamond"));
        g.add_node("p", shaped("point"));
        g.add_node("b", shaped("box"));
        g.add_node("o", shaped("octagon"));
        g.add_node("x", shaped("squiggle"));
        g.add_node("bare", Attributes::new());
        g.add_edge("b", "d");

        let nets = g.internal_nets();
        assert_eq!(nets, HashSet::from(["d".to_string(), "p".to_string()]));
        // classification reads only
        assert_eq!(g.node_count(), 6);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn unittest_classify_empty_graph() {
        assert!(Graph::new().internal_nets().is_empty());
    }

    #[test]
    fn unittest_classify_net_chains() {
        let mut g = Graph::new();
        g.add_node("n1", shaped("point"));
        g.add_node("n2", shaped("diamond"));
        g.add_edge("c1", "n1");
        g.add_edge("n1", "n2");
        g.add_edge("n2", "n2");
        g.add_edge("n2", "c2");

        let nets = g.internal_nets();
        assert_eq!(
            g.net_chains(&nets),
            vec![("n1".to_string(), "n2".to_string())]
        );
    }
}

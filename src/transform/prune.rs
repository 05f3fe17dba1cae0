use super::elide::ElisionStrategy;
use crate::error::GraphError;
use crate::graph::Graph;

/// Removes the internal nets of a Yosys graph, leaving cell-to-cell edges.
#[derive(Default, Debug, Clone, Copy)]
pub struct NetPruner {
    strategy: ElisionStrategy,
}

impl NetPruner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: ElisionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn prune(&self, mut graph: Graph) -> Result<Graph, GraphError> {
        let nets = graph.internal_nets();

        if self.strategy == ElisionStrategy::SinglePass {
            let chains = graph.net_chains(&nets);
            if !chains.is_empty() {
                tracing::warn!(
                    "{} net-to-net edges found, connectivity through them is dropped (first: {} -> {})",
                    chains.len(),
                    chains[0].0,
                    chains[0].1
                );
            }
        }

        tracing::debug!("pruning {} internal nets", nets.len());
        graph.elide(&nets, self.strategy)?;

        Ok(graph)
    }
}

/// Prunes with the default single pass.
pub fn prune(graph: Graph) -> Result<Graph, GraphError> {
    NetPruner::default().prune(graph)
}

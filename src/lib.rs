//! Cell-to-cell connectivity graphs from Yosys `show` output.
//!
//! Yosys draws wires as `diamond` (named) and `point` (anonymous) nodes.
//! [`transform::NetPruner`] removes them and reconnects every driver of a
//! wire to every reader, leaving a graph of cells and ports only.

pub mod cli;
pub mod error;
pub mod export;
pub mod graph;
pub mod pipeline;
pub mod transform;
pub mod yosys;

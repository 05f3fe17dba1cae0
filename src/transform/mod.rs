pub mod classify;
pub mod elide;
pub mod prune;

pub use elide::{elide, ElisionStrategy};
pub use prune::{prune, NetPruner};

//! The asset location tree: nodes, root scoping and the query engine

mod engine;
mod node;
mod scope;
mod traverse;

#[cfg(test)]
mod tests;

pub use engine::{Corruption, LocationDisplay, TreeEngine, TreeError, TreeResult, SEARCH_LIMIT};
pub use node::{NewNode, Node, NodeId};
pub use scope::{KindClass, RootScope, ScopeRules};

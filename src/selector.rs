//! Cascading location picker
//!
//! The UI shows one drop-down per tree level. [`SelectorState`] is the
//! value the UI keeps between interactions; [`Selector::walk`] replays the
//! cascade over the current tree and says which levels to show and what is
//! finally selected.

use crate::tree::{Node, NodeId, RootScope, TreeEngine, TreeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Picks per level plus the resulting selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorState {
    /// Level index to picked node; `None` is an explicit "nothing selected"
    #[serde(default)]
    pub picks: BTreeMap<usize, Option<NodeId>>,
    #[serde(default)]
    pub final_selected: Option<NodeId>,
}

impl SelectorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every pick, e.g. after the form was submitted
    pub fn reset(&mut self) {
        self.picks.clear();
        self.final_selected = None;
    }

    pub fn pick_at(&self, level: usize) -> Option<NodeId> {
        self.picks.get(&level).copied().flatten()
    }
}

/// One drop-down of the cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorLevel {
    pub index: usize,
    pub options: Vec<Node>,
    /// The recorded pick, when it is still one of `options`
    pub picked: Option<NodeId>,
}

/// The cascade as it stands for a given state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorWalk {
    pub levels: Vec<SelectorLevel>,
    pub final_selection: Option<NodeId>,
    /// The depth ceiling stopped the walk before a leaf was reached
    pub truncated: bool,
}

impl SelectorWalk {
    /// Store the walk's outcome as the state's final selection
    pub fn resolve(&self, state: &mut SelectorState) {
        state.final_selected = self.final_selection;
    }
}

pub struct Selector<'a> {
    engine: &'a TreeEngine,
    scope: RootScope,
    max_depth: usize,
}

impl<'a> Selector<'a> {
    pub fn new(engine: &'a TreeEngine, scope: RootScope) -> Self {
        Self {
            engine,
            scope,
            max_depth: engine.config().max_selector_depth,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn scope(&self) -> RootScope {
        self.scope
    }

    /// Replay the cascade for `state`.
    ///
    /// A level without options makes the previous pick final. A level
    /// without a usable pick ends the walk with nothing selected.
    pub fn walk(&self, state: &SelectorState) -> TreeResult<SelectorWalk> {
        let mut levels = Vec::new();
        let mut parent: Option<NodeId> = None;

        for index in 0..self.max_depth {
            let options = self.engine.children_of(parent, self.scope)?;
            if options.is_empty() {
                return Ok(SelectorWalk {
                    levels,
                    final_selection: parent,
                    truncated: false,
                });
            }

            let picked = state
                .pick_at(index)
                .filter(|id| options.iter().any(|n| n.id == *id));
            levels.push(SelectorLevel { index, options, picked });

            match picked {
                Some(id) => parent = Some(id),
                None => {
                    return Ok(SelectorWalk {
                        levels,
                        final_selection: None,
                        truncated: false,
                    })
                }
            }
        }

        tracing::warn!(max_depth = self.max_depth, "selector reached maximum depth");
        Ok(SelectorWalk {
            levels,
            final_selection: parent,
            truncated: true,
        })
    }

    /// Record `pick` at `level`.
    ///
    /// A changed pick discards every deeper pick and becomes the final
    /// selection. Returns whether the state changed.
    pub fn pick(&self, state: &mut SelectorState, level: usize, pick: Option<NodeId>) -> bool {
        if state.picks.get(&level) == Some(&pick) {
            return false;
        }

        state.picks.insert(level, pick);
        state.picks.retain(|&l, _| l <= level);
        state.final_selected = pick;
        tracing::debug!(level, ?pick, "selector pick changed");
        true
    }
}

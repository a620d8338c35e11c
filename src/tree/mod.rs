//! Exhaustive probability tree over the combat phases
//!
//! Every node is a [`BattleState`] reached with some probability from its
//! parent. Nodes are expanded depth-first; each finished child is folded into
//! its parent's [`NodeResults`] and, unless the tree is kept for inspection,
//! dropped from the arena straight away.
//!
//! At the start of every round (the `AaAttacker` phase) a node is checked for
//! the end of the battle and then looked up in the state cache. A state that
//! was already resolved is reused; a state that is still being expanded higher
//! up in the tree closes a loop and is estimated with a geometric series.

mod cycle;
pub mod node_results;
pub mod outcomes;
pub mod terminal;

use ahash::AHashMap;
use serde::Serialize;

use crate::context::BattleContext;
use crate::core::config::CalculatorConfig;
use crate::core::types::Side;
use crate::dice::HitProbabilityMemo;
use crate::state::{BattleState, Phase, StateKey};
use crate::targeting::{
    remove_undefended_transports, remove_units_that_cannot_roll, submerge_evaders_vs_only_air,
};

pub use node_results::NodeResults;
pub use outcomes::fight_outcomes;
pub use terminal::{check_end_of_battle, BattleEnd};

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// How a node got its results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Terminal(BattleEnd),
    /// Below the prune threshold; all mass is indeterminate
    Pruned,
    /// Copied from an identical state resolved earlier
    Cached,
    /// Estimated from an identical ancestor still being expanded
    Loop,
    /// Aggregated from its children
    Expanded,
    /// No fire outcome existed, counted as a tie
    Stalled,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub state: BattleState,
    /// Completed rounds when this node was reached
    pub round: u32,
    /// Probability relative to the parent
    pub probability: f64,
    pub parent: Option<NodeId>,
    /// Only filled when children are retained
    pub children: Vec<NodeId>,
    pub results: NodeResults,
    pub resolution: Option<Resolution>,
}

/// Counters describing one expansion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub nodes_created: usize,
    pub pruned: usize,
    pub cache_hits: usize,
    pub loops_closed: usize,
    pub terminals: usize,
    /// Largest arena size during the expansion
    pub peak_nodes: usize,
}

#[derive(Debug, Clone)]
enum CacheEntry {
    InProgress(NodeId),
    /// Results with rounds relative to the node's own round
    Resolved(NodeResults),
}

/// One calculation's tree, caches included
pub struct BattleTree<'c, 'a> {
    context: &'c BattleContext<'a>,
    config: CalculatorConfig,
    nodes: Vec<TreeNode>,
    cache: AHashMap<StateKey, CacheEntry>,
    memo: HitProbabilityMemo,
    stats: TreeStats,
}

impl<'c, 'a> BattleTree<'c, 'a> {
    pub fn new(context: &'c BattleContext<'a>, config: CalculatorConfig) -> Self {
        Self {
            context,
            config,
            nodes: Vec::new(),
            cache: AHashMap::new(),
            memo: HitProbabilityMemo::new(),
            stats: TreeStats::default(),
        }
    }

    /// Expand the whole tree from the context's initial state
    pub fn calculate(&mut self) -> &NodeResults {
        self.nodes.clear();
        self.cache.clear();
        self.stats = TreeStats::default();

        let initial = self.context.initial_state();
        let root = self.push_node(initial, 0, 1.0, None);
        self.expand(root);

        tracing::debug!(
            attackers = self.context.unit_count(Side::Attacker),
            defenders = self.context.unit_count(Side::Defender),
            nodes = self.stats.nodes_created,
            pruned = self.stats.pruned,
            cache_entries = self.cache.len(),
            memo_entries = self.memo.len(),
            "battle tree expanded"
        );
        &self.nodes[root.0].results
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Every node still in the arena; the whole tree when children are retained
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    fn push_node(&mut self, state: BattleState, round: u32, probability: f64, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            state,
            round,
            probability,
            parent,
            children: Vec::new(),
            results: NodeResults::default(),
            resolution: None,
        });
        self.stats.nodes_created += 1;
        self.stats.peak_nodes = self.stats.peak_nodes.max(self.nodes.len());
        id
    }

    fn expand(&mut self, id: NodeId) {
        let (phase, round) = {
            let node = &self.nodes[id.0];
            (node.state.phase(), node.round)
        };
        let context = self.context;
        let mut units = self.nodes[id.0].state.clone();

        match phase {
            Phase::AaAttacker => {
                units.remove_waiting_to_die();
                if self.resolve_round_start(id, &units, round) {
                    return;
                }
            }
            Phase::SubAttacker => {
                units.remove_waiting_to_die();
                submerge_evaders_vs_only_air(context, &mut units);
            }
            Phase::Attacker if context.rules.transport_casualties_restricted => {
                remove_undefended_transports(context, &mut units, Side::Defender);
                remove_undefended_transports(context, &mut units, Side::Attacker);
                remove_units_that_cannot_roll(context, &mut units, Side::Attacker);
                remove_units_that_cannot_roll(context, &mut units, Side::Defender);
            }
            _ => {}
        }

        let child_round = if phase.ends_round() { round + 1 } else { round };
        let children = fight_outcomes(context, &mut self.memo, &units, round);
        if children.is_empty() {
            let node = &mut self.nodes[id.0];
            node.results.tie = 1.0;
            node.results.rounds = round as f64;
            node.resolution = Some(Resolution::Stalled);
            return;
        }

        for child in children {
            let probability = child.probability();
            let child_id = self.push_node(child, child_round, probability, Some(id));
            if probability < self.config.prune_threshold {
                self.stats.pruned += 1;
                tracing::trace!(probability, round = child_round, "pruned branch");
                let node = &mut self.nodes[child_id.0];
                node.results.indeterminate = 1.0;
                node.results.rounds = child_round as f64;
                node.resolution = Some(Resolution::Pruned);
            } else {
                self.expand(child_id);
            }
            self.fold_child(id, child_id);
        }

        self.nodes[id.0].resolution = Some(Resolution::Expanded);
        if phase == Phase::AaAttacker {
            let key = units.key(context.round_bucket(round));
            let relative = self.nodes[id.0].results.relative_to(round);
            self.cache.insert(key, CacheEntry::Resolved(relative));
        }
    }

    /// Terminal check and cache lookup; true when the node needs no children
    fn resolve_round_start(&mut self, id: NodeId, units: &BattleState, round: u32) -> bool {
        let context = self.context;
        if let Some(end) = check_end_of_battle(context, units, round) {
            let survivors = terminal::final_units(context, units, end);
            let node = &mut self.nodes[id.0];
            match end {
                BattleEnd::AttackerWins => node.results.win = 1.0,
                BattleEnd::DefenderWins => node.results.lose = 1.0,
                BattleEnd::Draw => node.results.tie = 1.0,
                BattleEnd::Truncated => node.results.indeterminate = 1.0,
            }
            node.results.rounds = round as f64;
            node.results.record_survivors(&survivors, 1.0);
            node.resolution = Some(Resolution::Terminal(end));
            self.stats.terminals += 1;
            return true;
        }

        let key = units.key(context.round_bucket(round));
        match self.cache.get(&key) {
            Some(CacheEntry::Resolved(cached)) => {
                let results = cached.shifted(round);
                let node = &mut self.nodes[id.0];
                node.results = results;
                node.resolution = Some(Resolution::Cached);
                self.stats.cache_hits += 1;
                true
            }
            Some(&CacheEntry::InProgress(ancestor)) => {
                let results = cycle::estimate_loop(
                    &self.nodes,
                    id,
                    ancestor,
                    units,
                    self.config.cycle_series_terms,
                );
                self.cache
                    .insert(key, CacheEntry::Resolved(results.relative_to(round)));
                let node = &mut self.nodes[id.0];
                node.results = results;
                node.resolution = Some(Resolution::Loop);
                self.stats.loops_closed += 1;
                true
            }
            None => {
                self.cache.insert(key, CacheEntry::InProgress(id));
                false
            }
        }
    }

    fn fold_child(&mut self, parent: NodeId, child: NodeId) {
        let probability = self.nodes[child.0].probability;
        let (head, tail) = self.nodes.split_at_mut(child.0);
        head[parent.0].results.add_scaled(&tail[0].results, probability);
        if self.config.retain_children {
            head[parent.0].children.push(child);
        } else {
            self.nodes.truncate(child.0);
        }
    }
}

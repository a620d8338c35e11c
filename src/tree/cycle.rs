//! Closing a loop in the tree with a truncated geometric series

use crate::state::BattleState;
use crate::tree::node_results::NodeResults;
use crate::tree::{NodeId, TreeNode};

/// Results for `current`, a state that repeats its in-progress `ancestor`
///
/// Walking down from the ancestor, every node on the path contributes the
/// results its finished children have accumulated so far, weighted by the
/// probability of reaching it. That partial `S` is what one trip around the
/// loop yields; the loop itself is taken with mass `s`, the product of the
/// path probabilities. The returned results are `Σ_{k<terms} s^k · S`, with
/// the unexplained remainder reported as indeterminate at the units of
/// `current`.
pub(super) fn estimate_loop(
    nodes: &[TreeNode],
    current: NodeId,
    ancestor: NodeId,
    units: &BattleState,
    terms: u32,
) -> NodeResults {
    let current_round = nodes[current.0].round;
    let ancestor_round = nodes[ancestor.0].round;

    let mut path = Vec::new();
    let mut cursor = current;
    while cursor != ancestor {
        path.push(cursor);
        match nodes[cursor.0].parent {
            Some(parent) => cursor = parent,
            None => break,
        }
    }

    let mut partial = NodeResults::default();
    let mut loop_mass = 1.0;
    if cursor == ancestor {
        partial.add_scaled(&nodes[ancestor.0].results, 1.0);
        for node in path.iter().rev() {
            loop_mass *= nodes[node.0].probability;
            partial.add_scaled(&nodes[node.0].results, loop_mass);
        }
    } else {
        tracing::warn!(?current, ?ancestor, "cached ancestor is not on the path");
        loop_mass = 0.0;
    }

    let loop_rounds = current_round.saturating_sub(ancestor_round) as f64;
    let partial_mass = partial.total();
    let partial_rounds = partial.rounds - ancestor_round as f64 * partial_mass;

    let mut results = NodeResults::default();
    let mut rounds = 0.0;
    let mut scale = 1.0;
    for k in 0..terms {
        results.add_scaled(&partial, scale);
        let start = current_round as f64 + k as f64 * loop_rounds;
        rounds += scale * (partial_rounds + start * partial_mass);
        scale *= loop_mass;
    }
    results.rounds = rounds;

    let remainder = (1.0 - results.total()).max(0.0);
    results.indeterminate += remainder;
    results.rounds += remainder * (current_round as f64 + terms as f64 * loop_rounds);
    results.record_survivors(units, remainder);

    tracing::trace!(
        ?current,
        ?ancestor,
        loop_mass,
        remainder,
        "closed loop with geometric series"
    );
    results
}

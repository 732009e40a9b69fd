//! The registry diff engine.

use crate::agent::AgentId;
use crate::snapshot::RegistrySnapshot;
use std::collections::BTreeSet;

/// Computes the set of agents that must be purged locally.
///
/// An id from `previous` lands in the result iff it is missing from
/// `current`, or still present but marked disabled. Ids that only
/// appear in `current` can never trigger a removal: an agent unknown
/// before cannot be "removed".
///
/// The result is independent of line order in either snapshot, and an
/// empty `previous` always yields an empty result.
pub fn removed_agents(
    previous: &RegistrySnapshot,
    current: &RegistrySnapshot,
) -> BTreeSet<AgentId> {
    let current_enabled = current.enabled_by_id();

    previous
        .records()
        .iter()
        .filter(|record| !current_enabled.get(&record.id).copied().unwrap_or(false))
        .map(|record| record.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OLD_BASIC: &str = "\
001 edge-1 any 54cfda3bfcc817aadc8f317b3f05d676d174cdf893aa2f9ee2a302ef17ae6794
002 edge-2 any 7a9c0990dadeca159c239a06031b04d462d6d28dd59628b41dc7e13cc4d3a344
003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5";

    fn ids(raw: &[&str]) -> BTreeSet<AgentId> {
        raw.iter().map(|id| AgentId::parse(id).unwrap()).collect()
    }

    fn diff(previous: &str, current: &str) -> BTreeSet<AgentId> {
        removed_agents(
            &RegistrySnapshot::parse(previous),
            &RegistrySnapshot::parse(current),
        )
    }

    #[test]
    fn missing_agent_is_removed() {
        let current = "\
003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5
002 edge-2 any 7a9c0990dadeca159c239a06031b04d462d6d28dd59628b41dc7e13cc4d3a344";

        assert_eq!(diff(OLD_BASIC, current), ids(&["001"]));
    }

    #[test]
    fn single_survivor_purges_the_rest() {
        let current =
            "003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5\n";

        assert_eq!(diff(OLD_BASIC, current), ids(&["001", "002"]));
    }

    #[test]
    fn disabled_agent_is_removed() {
        let current = "\
001 !edge-1 any 54cfda3bfcc817aadc8f317b3f05d676d174cdf893aa2f9ee2a302ef17ae6794
002 edge-2 any 7a9c0990dadeca159c239a06031b04d462d6d28dd59628b41dc7e13cc4d3a344
003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5";

        assert_eq!(diff(OLD_BASIC, current), ids(&["001"]));
    }

    #[test]
    fn two_disabled_agents_are_removed() {
        let current = "\
001 !edge-1 any 54cfda3bfcc817aadc8f317b3f05d676d174cdf893aa2f9ee2a302ef17ae6794
002 !edge-2 any 7a9c0990dadeca159c239a06031b04d462d6d28dd59628b41dc7e13cc4d3a344
003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5";

        assert_eq!(diff(OLD_BASIC, current), ids(&["001", "002"]));
    }

    #[test]
    fn blank_current_purges_everything() {
        assert_eq!(diff(OLD_BASIC, "\n"), ids(&["001", "002", "003"]));
    }

    #[test]
    fn blank_previous_removes_nothing() {
        assert_eq!(diff("\n", OLD_BASIC), BTreeSet::new());
    }

    #[test]
    fn new_agents_never_appear_in_result() {
        let current = "\
001 edge-1 any 54cfda3bfcc817aadc8f317b3f05d676d174cdf893aa2f9ee2a302ef17ae6794
002 edge-2 any 7a9c0990dadeca159c239a06031b04d462d6d28dd59628b41dc7e13cc4d3a344
003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5
004 edge-4 any d7ae2f7fe182d202f9088ecb7a0f8899fee7f192c0c0d2d4db906dtfc22a7ad5";

        assert_eq!(diff(OLD_BASIC, current), BTreeSet::new());
    }

    #[test]
    fn new_agent_alongside_a_removal() {
        let current = "\
003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5
002 edge-2 any 7a9c0990dadeca159c239a06031b04d462d6d28dd59628b41dc7e13cc4d3a344
004 edge-4 any d7ae2f7fe182d202f9088ecb7a0f8899fee7f192c0c0d2d4db906dtfc22a7ad5";

        assert_eq!(diff(OLD_BASIC, current), ids(&["001"]));
    }

    #[test]
    fn new_agent_alongside_a_disable() {
        let current = "\
001 !edge-1 any 54cfda3bfcc817aadc8f317b3f05d676d174cdf893aa2f9ee2a302ef17ae6794
002 edge-2 any 7a9c0990dadeca159c239a06031b04d462d6d28dd59628b41dc7e13cc4d3a344
003 edge-3 any d7ae2f7fe182d202f9088ecb7a0c8899fee7f192c0c0d2d4db906d5fc22a7ad5
004 edge-4 any d7ae2f7fe182d202f9088ecb7a0f8899fee7f192c0c0d2d4db906dtfc22a7ad5";

        assert_eq!(diff(OLD_BASIC, current), ids(&["001"]));
    }

    /// Strategy producing agent lines with ids in 000..=019 so that
    /// overlap between the two snapshots is common.
    fn line_strategy() -> impl Strategy<Value = String> {
        (0u32..20, any::<bool>()).prop_map(|(n, enabled)| {
            let marker = if enabled { "" } else { "!" };
            format!("{n:03} {marker}agent-{n} any cafe{n:04x}")
        })
    }

    fn snapshot_strategy() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(line_strategy(), 0..12)
    }

    proptest! {
        #[test]
        fn diff_is_permutation_invariant(
            previous in snapshot_strategy(),
            current in snapshot_strategy(),
            seed in any::<u64>(),
        ) {
            // Deterministic shuffle driven by the seed.
            let shuffle = |lines: &[String], mut seed: u64| {
                let mut shuffled = lines.to_vec();
                for i in (1..shuffled.len()).rev() {
                    seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                    let j = (seed >> 33) as usize % (i + 1);
                    shuffled.swap(i, j);
                }
                shuffled
            };

            let baseline = diff(&previous.join("\n"), &current.join("\n"));
            let permuted = diff(
                &shuffle(&previous, seed).join("\n"),
                &shuffle(&current, seed ^ 0x9e3779b9).join("\n"),
            );

            // Permutation invariance holds whenever no id is duplicated
            // within a snapshot (duplicates are last-wins by order).
            let unique = |lines: &[String]| {
                let ids: Vec<&str> = lines.iter().map(|l| &l[..3]).collect();
                let set: BTreeSet<&str> = ids.iter().copied().collect();
                set.len() == ids.len()
            };
            if unique(&previous) && unique(&current) {
                prop_assert_eq!(baseline, permuted);
            }
        }

        #[test]
        fn result_is_subset_of_previous(
            previous in snapshot_strategy(),
            current in snapshot_strategy(),
        ) {
            let previous_snapshot = RegistrySnapshot::parse(&previous.join("\n"));
            let current_snapshot = RegistrySnapshot::parse(&current.join("\n"));

            let previous_ids: BTreeSet<AgentId> = previous_snapshot
                .records()
                .iter()
                .map(|r| r.id.clone())
                .collect();

            let removed = removed_agents(&previous_snapshot, &current_snapshot);
            prop_assert!(removed.is_subset(&previous_ids));
        }
    }
}

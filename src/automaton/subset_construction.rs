//! Determinization of an ε-NFA by subset construction.

use crate::automaton::dfa::Dfa;
use crate::automaton::epsilon_nfa::EpsilonNfa;
use crate::automaton::state::{StateId, StateSet};
use indexmap::IndexMap;
use log::trace;

/// Convert an ε-NFA into an equivalent DFA.
///
/// Each DFA state stands for a set of NFA states. The construction starts
/// from the ε-closure of the NFA start state and expands one subset at a
/// time: for every alphabet symbol, the ε-closed move of the subset either
/// names an existing DFA state or creates a new one. Moves with an empty
/// result get no transition at all, which the matcher reads as failure.
///
/// Subsets are identified by their sorted member list, so two subsets with
/// the same members always map to the same DFA state. A DFA state is
/// accepting iff its subset contains the NFA accept state. The subsets
/// themselves are discarded once construction finishes; only the dense
/// integer states remain.
pub fn subset_construction(nfa: &EpsilonNfa) -> Dfa {
    debug_assert!(nfa.num_states() > 0);

    let mut dfa = Dfa::new();
    // Sorted member list -> DFA state id.
    let mut subset_ids: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let mut worklist: Vec<(StateSet, StateId)> = Vec::new();

    let initial = nfa.epsilon_closure(&StateSet::singleton(nfa.start()));
    let initial_id = dfa.add_state();
    dfa.set_start(initial_id);
    if initial.contains(nfa.accept()) {
        dfa.mark_accepting(initial_id);
    }
    subset_ids.insert(initial.to_vec(), initial_id);
    worklist.push((initial, initial_id));

    while let Some((subset, subset_id)) = worklist.pop() {
        for &symbol in nfa.alphabet() {
            let next = nfa.move_on(&subset, symbol);
            if next.is_empty() {
                continue;
            }

            let key = next.to_vec();
            let next_id = match subset_ids.get(&key) {
                Some(&existing) => existing,
                None => {
                    let id = dfa.add_state();
                    trace!("dfa state {id} <- nfa subset {key:?}");
                    if next.contains(nfa.accept()) {
                        dfa.mark_accepting(id);
                    }
                    subset_ids.insert(key, id);
                    worklist.push((next, id));
                    id
                }
            };

            dfa.add_transition(subset_id, symbol, next_id);
        }
    }

    dfa
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nondeterministic_branch_collapses() {
        // 0 -a-> 1 and 0 -a-> 2; 1 -b-> 3, 2 -c-> 3. Accepts {ab, ac}.
        let mut nfa = EpsilonNfa::new();
        let states: Vec<_> = (0..4).map(|_| nfa.fresh_state()).collect();
        nfa.set_endpoints(states[0], states[3]);
        nfa.add_edge(states[0], 0, states[1]);
        nfa.add_edge(states[0], 0, states[2]);
        nfa.add_edge(states[1], 1, states[3]);
        nfa.add_edge(states[2], 2, states[3]);

        let dfa = subset_construction(&nfa);

        // {0}, {1,2}, {3}: the a-branch fuses into one subset.
        assert_eq!(dfa.num_states(), 3);
        assert!(dfa.accepts([0, 1]));
        assert!(dfa.accepts([0, 2]));
        assert!(!dfa.accepts([0]));
        assert!(!dfa.accepts([0, 1, 2]));
    }

    #[test]
    fn test_epsilon_closure_seeds_the_start() {
        // 0 -ε-> 1 -a-> 2(accept), and 0 -ε-> 2 makes ε acceptable too.
        let mut nfa = EpsilonNfa::new();
        let s0 = nfa.fresh_state();
        let s1 = nfa.fresh_state();
        let s2 = nfa.fresh_state();
        nfa.set_endpoints(s0, s2);
        nfa.add_epsilon(s0, s1);
        nfa.add_epsilon(s0, s2);
        nfa.add_edge(s1, 0, s2);

        let dfa = subset_construction(&nfa);
        assert!(dfa.is_accepting(dfa.start()));
        assert!(dfa.accepts([]));
        assert!(dfa.accepts([0]));
        assert!(!dfa.accepts([0, 0]));
    }

    #[test]
    fn test_no_epsilon_left_and_deterministic() {
        // a* over a single symbol.
        let mut nfa = EpsilonNfa::new();
        let start = nfa.fresh_state();
        let inner = nfa.fresh_state();
        let accept = nfa.fresh_state();
        nfa.set_endpoints(start, accept);
        nfa.add_epsilon(start, accept);
        nfa.add_edge(start, 0, inner);
        nfa.add_epsilon(inner, start);

        let dfa = subset_construction(&nfa);

        // Determinism: every (state, symbol) pair resolves to at most one
        // successor by construction; check the table is total over what it
        // accepts and loops on 'a'.
        assert!(dfa.accepts([]));
        assert!(dfa.accepts([0]));
        assert!(dfa.accepts([0, 0, 0]));
        for (_, symbol, _) in dfa.transitions() {
            assert_ne!(symbol, crate::automaton::symbol::EPSILON);
        }
    }
}

//! Nondeterministic finite automaton with ε-transitions.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{is_epsilon, SymbolId, EPSILON};
use std::collections::{HashMap, HashSet, VecDeque};

/// An NFA with ε-transitions, built by Thompson construction.
///
/// States are allocated densely through [`fresh_state`] and edges added as
/// the expression tree is lowered. The automaton has a single start state
/// and a single accept state, fixed once lowering finishes; every composed
/// fragment keeps that one-entry/one-exit shape, which is what lets the
/// compiler glue fragments together with ε-edges and no rewiring.
///
/// [`fresh_state`]: EpsilonNfa::fresh_state
#[derive(Debug, Clone)]
pub struct EpsilonNfa {
    /// States are 0..num_states.
    num_states: StateId,
    start: StateId,
    accept: StateId,
    /// (source, symbol) -> destinations. ε-edges use the [`EPSILON`] id.
    transitions: HashMap<(StateId, SymbolId), StateSet>,
    /// Every non-ε symbol appearing on some edge.
    alphabet: HashSet<SymbolId>,
    /// Per-state ε-closures, memoized before determinization.
    epsilon_closures: Option<Vec<StateSet>>,
}

impl EpsilonNfa {
    /// An automaton with no states and no edges.
    pub fn new() -> Self {
        Self {
            num_states: 0,
            start: 0,
            accept: 0,
            transitions: HashMap::new(),
            alphabet: HashSet::new(),
            epsilon_closures: None,
        }
    }

    /// Allocate a new state and return its id.
    pub fn fresh_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        self.epsilon_closures = None;
        id
    }

    /// Add an edge from `source` to `destination` labeled `symbol`.
    pub fn add_edge(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        debug_assert!(source < self.num_states && destination < self.num_states);

        if !is_epsilon(symbol) {
            self.alphabet.insert(symbol);
        }
        self.transitions
            .entry((source, symbol))
            .or_default()
            .insert(destination);
        self.epsilon_closures = None;
    }

    /// Add an ε-edge from `source` to `destination`.
    pub fn add_epsilon(&mut self, source: StateId, destination: StateId) {
        self.add_edge(source, EPSILON, destination);
    }

    /// Fix the start and accept states of the finished automaton.
    pub fn set_endpoints(&mut self, start: StateId, accept: StateId) {
        debug_assert!(start < self.num_states && accept < self.num_states);
        self.start = start;
        self.accept = accept;
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accept(&self) -> StateId {
        self.accept
    }

    pub fn num_states(&self) -> StateId {
        self.num_states
    }

    /// Every non-ε symbol appearing on some edge.
    pub fn alphabet(&self) -> &HashSet<SymbolId> {
        &self.alphabet
    }

    /// Destinations of the edges leaving `source` on `symbol`, if any.
    pub fn targets(&self, source: StateId, symbol: SymbolId) -> Option<&StateSet> {
        self.transitions.get(&(source, symbol))
    }

    /// ε-closure of a single state: the state itself plus everything
    /// reachable through ε-edges alone.
    fn closure_of(&self, state: StateId) -> StateSet {
        let mut closure = StateSet::new();
        let mut stack = vec![state];

        while let Some(s) = stack.pop() {
            if closure.contains(s) {
                continue;
            }
            closure.insert(s);
            if let Some(dests) = self.transitions.get(&(s, EPSILON)) {
                for dest in dests.iter() {
                    if !closure.contains(dest) {
                        stack.push(dest);
                    }
                }
            }
        }

        closure
    }

    /// Memoize the ε-closure of every state.
    ///
    /// Subset construction queries closures for overlapping sets over and
    /// over; computing them once up front keeps it from re-walking ε-chains.
    pub fn compute_epsilon_closures(&mut self) {
        if self.epsilon_closures.is_some() {
            return;
        }
        let closures = (0..self.num_states).map(|s| self.closure_of(s)).collect();
        self.epsilon_closures = Some(closures);
    }

    /// ε-closure of a set of states.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::new();

        if let Some(cached) = &self.epsilon_closures {
            for state in states.iter() {
                closure.union_with(&cached[state as usize]);
            }
        } else {
            let mut stack: Vec<StateId> = states.iter().collect();
            while let Some(s) = stack.pop() {
                if closure.contains(s) {
                    continue;
                }
                closure.insert(s);
                if let Some(dests) = self.transitions.get(&(s, EPSILON)) {
                    for dest in dests.iter() {
                        if !closure.contains(dest) {
                            stack.push(dest);
                        }
                    }
                }
            }
        }

        closure
    }

    /// States reachable from `states` by consuming `symbol`, ε-closed.
    pub fn move_on(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        debug_assert!(!is_epsilon(symbol));

        let mut reached = StateSet::new();
        for state in states.iter() {
            if let Some(dests) = self.transitions.get(&(state, symbol)) {
                reached.union_with(dests);
            }
        }
        self.epsilon_closure(&reached)
    }

    /// Whether the automaton accepts no string at all, i.e. the accept
    /// state is unreachable from the start state.
    pub fn is_empty(&self) -> bool {
        if self.num_states == 0 {
            return true;
        }

        let mut visited = StateSet::new();
        let mut queue: VecDeque<StateId> = self.epsilon_closure(&StateSet::singleton(self.start))
            .iter()
            .collect();

        while let Some(state) = queue.pop_front() {
            if visited.contains(state) {
                continue;
            }
            visited.insert(state);

            if state == self.accept {
                return false;
            }
            for &symbol in &self.alphabet {
                if let Some(dests) = self.transitions.get(&(state, symbol)) {
                    for dest in self.epsilon_closure(dests).iter() {
                        if !visited.contains(dest) {
                            queue.push_back(dest);
                        }
                    }
                }
            }
        }

        true
    }
}

impl Default for EpsilonNfa {
    fn default() -> Self {
        Self::new()
    }
}

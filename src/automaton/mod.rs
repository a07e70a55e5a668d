//! Finite automata underlying the engine.
//!
//! The compiler lowers an expression tree into an [`EpsilonNfa`], the
//! determinizer turns that into a [`Dfa`] by subset construction, and the
//! matcher walks the DFA's transition table. States and symbols are dense
//! integers throughout; [`SymbolTable`] maps them back to characters.

mod dfa;
mod epsilon_nfa;
mod state;
mod subset_construction;
mod symbol;

pub use dfa::Dfa;
pub use epsilon_nfa::EpsilonNfa;
pub use state::{StateId, StateSet};
pub use subset_construction::subset_construction;
pub use symbol::{is_epsilon, SymbolId, SymbolTable, EPSILON};

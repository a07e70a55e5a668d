//! Regular expressions composed as trees of operators, compiled to DFAs.
//!
//! Instead of parsing a textual pattern, callers assemble an [`Expr`] from
//! literals and the `cat`/`or`/`star`/`plus`/`opt` combinators. Every
//! subexpression is a plain value: it can be bound to a name, pushed into a
//! collection, and reused inside larger expressions. [`Regex::compile`]
//! lowers the tree into a Thompson ε-NFA, determinizes it by subset
//! construction, and returns a [`Regex`] whose matcher runs in time linear
//! in the query.
//!
//! Matching is whole-string: the query must be consumed entirely and end in
//! an accepting state.
//!
//! ```
//! use treegex::{cat, lit, plus, Regex};
//!
//! // 0, then one or more 1s, then 0.
//! let expr = cat([lit("0"), plus(lit("1")), lit("0")]);
//! let re = Regex::compile(&expr)?;
//! assert!(re.is_match("0110"));
//! assert!(!re.is_match("00"));
//! # Ok::<(), treegex::CompileError>(())
//! ```

pub mod automaton;
mod compiler;
mod error;
pub mod expr;


pub use error::CompileError;
pub use expr::{cat, int, lit, n_or_more, opt, or, plus, star, Expr};

use automaton::{subset_construction, Dfa, SymbolTable};
use compiler::Compiler;
use log::debug;

/// A compiled regular expression.
///
/// Holds the determinized automaton together with the symbol table mapping
/// query characters onto the automaton's alphabet. Immutable after
/// compilation; matching takes `&self` and keeps no state beyond its loop
/// cursor, so one `Regex` may serve concurrent matches from many threads.
#[derive(Debug, Clone)]
pub struct Regex {
    dfa: Dfa,
    symbols: SymbolTable,
}

impl Regex {
    /// Compile an expression tree into a matchable automaton.
    ///
    /// Fails if the tree contains an empty string literal or an operator
    /// node without operands; a failed compile produces no automaton.
    pub fn compile(expr: &Expr) -> Result<Self, CompileError> {
        let (nfa, symbols) = Compiler::new().compile(expr)?;
        let dfa = subset_construction(&nfa);
        debug!(
            "compiled dfa: {} states, {} alphabet symbols",
            dfa.num_states(),
            symbols.len()
        );
        Ok(Self { dfa, symbols })
    }

    /// Whether `query`, consumed in full, is in the expression's language.
    ///
    /// Characters the compiled expression never mentioned have no symbol id
    /// and therefore cannot match; they make this return `false`, never an
    /// error.
    pub fn is_match(&self, query: &str) -> bool {
        let mut input = Vec::with_capacity(query.len());
        for ch in query.chars() {
            match self.symbols.lookup(ch) {
                Some(symbol) => input.push(symbol),
                None => return false,
            }
        }
        self.dfa.accepts(input)
    }

    /// A language-equivalent regex over the minimal DFA.
    pub fn minimize(&self) -> Self {
        Self {
            dfa: self.dfa.minimize(),
            symbols: self.symbols.clone(),
        }
    }

    /// The underlying automaton.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// The table interning this regex's alphabet.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

/// Compile `expr` and match `query` against it in one step.
///
/// The intermediate automaton is dropped on return; compile once via
/// [`Regex::compile`] when matching the same expression repeatedly.
pub fn matches(expr: &Expr, query: &str) -> Result<bool, CompileError> {
    Ok(Regex::compile(expr)?.is_match(query))
}

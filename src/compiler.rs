//! Lowering of expression trees into Thompson-style ε-NFAs.

use crate::automaton::{EpsilonNfa, StateId, SymbolTable};
use crate::error::CompileError;
use crate::expr::Expr;
use log::debug;

/// A one-entry/one-exit slice of the NFA under construction.
///
/// Every lowered subexpression is such a fragment: a fresh start state, a
/// fresh accept state, and whatever lies between. Combinators only ever
/// touch a fragment's two endpoint states, gluing with ε-edges, so
/// composing fragments never rewires their interior.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    accept: StateId,
}

/// Lowers one expression tree into an ε-NFA.
///
/// The compiler owns the NFA being built and the symbol table interning
/// the characters encountered in literals. Both are handed to the caller
/// when lowering finishes; the compiler itself is consumed.
pub(crate) struct Compiler {
    nfa: EpsilonNfa,
    symbols: SymbolTable,
}

impl Compiler {
    pub(crate) fn new() -> Self {
        Self {
            nfa: EpsilonNfa::new(),
            symbols: SymbolTable::new(),
        }
    }

    /// Lower `expr` and return the finished NFA with its symbol table.
    pub(crate) fn compile(
        mut self,
        expr: &Expr,
    ) -> Result<(EpsilonNfa, SymbolTable), CompileError> {
        let fragment = self.lower(expr)?;
        self.nfa.set_endpoints(fragment.start, fragment.accept);
        self.nfa.compute_epsilon_closures();
        debug!(
            "lowered expression into {} nfa states over {} symbols",
            self.nfa.num_states(),
            self.symbols.len()
        );
        Ok((self.nfa, self.symbols))
    }

    /// Post-order walk: every child is lowered to a fragment before the
    /// operator that combines them.
    fn lower(&mut self, expr: &Expr) -> Result<Fragment, CompileError> {
        match expr {
            Expr::Lit(text) => self.literal(text),
            // An integer matches its decimal rendering, which is never empty.
            Expr::Int(n) => self.literal(&n.to_string()),
            Expr::Cat(children) => self.fold(children, "cat", Self::concat),
            Expr::Or(children) => self.fold(children, "or", Self::alternate),
            Expr::Star(child) => {
                let inner = self.lower(child)?;
                Ok(self.repeat_star(inner))
            }
            Expr::Plus(child) => {
                let inner = self.lower(child)?;
                Ok(self.repeat_plus(inner))
            }
            Expr::Opt(child) => {
                let inner = self.lower(child)?;
                Ok(self.optional(inner))
            }
        }
    }

    /// Left-fold a variadic operator over its binary form. A single child
    /// degenerates to that child's fragment unchanged.
    fn fold(
        &mut self,
        children: &[Expr],
        operator: &'static str,
        combine: fn(&mut Self, Fragment, Fragment) -> Fragment,
    ) -> Result<Fragment, CompileError> {
        let mut iter = children.iter();
        let Some(first) = iter.next() else {
            return Err(CompileError::EmptyOperator { operator });
        };
        let mut acc = self.lower(first)?;
        for child in iter {
            let next = self.lower(child)?;
            acc = combine(self, acc, next);
        }
        Ok(acc)
    }

    /// A literal is the concatenation of its one-character fragments.
    fn literal(&mut self, text: &str) -> Result<Fragment, CompileError> {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return Err(CompileError::EmptyLiteral);
        };
        let mut acc = self.symbol(first);
        for ch in chars {
            let next = self.symbol(ch);
            acc = self.concat(acc, next);
        }
        Ok(acc)
    }

    /// `start --ch--> accept`
    fn symbol(&mut self, ch: char) -> Fragment {
        let start = self.nfa.fresh_state();
        let accept = self.nfa.fresh_state();
        let symbol = self.symbols.intern(ch);
        self.nfa.add_edge(start, symbol, accept);
        Fragment { start, accept }
    }

    /// `start ·ε· a ·ε· b ·ε· accept`
    fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let start = self.nfa.fresh_state();
        let accept = self.nfa.fresh_state();
        self.nfa.add_epsilon(start, a.start);
        self.nfa.add_epsilon(a.accept, b.start);
        self.nfa.add_epsilon(b.accept, accept);
        Fragment { start, accept }
    }

    /// `start ·ε· a ·ε· accept` and `start ·ε· b ·ε· accept`
    fn alternate(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let start = self.nfa.fresh_state();
        let accept = self.nfa.fresh_state();
        self.nfa.add_epsilon(start, a.start);
        self.nfa.add_epsilon(start, b.start);
        self.nfa.add_epsilon(a.accept, accept);
        self.nfa.add_epsilon(b.accept, accept);
        Fragment { start, accept }
    }

    /// `start ·ε· accept` and `start ·ε· a ·ε· accept`
    fn optional(&mut self, a: Fragment) -> Fragment {
        let start = self.nfa.fresh_state();
        let accept = self.nfa.fresh_state();
        self.nfa.add_epsilon(start, accept);
        self.nfa.add_epsilon(start, a.start);
        self.nfa.add_epsilon(a.accept, accept);
        Fragment { start, accept }
    }

    /// `start ·ε· accept`, with `a` looping back through the new start.
    fn repeat_star(&mut self, a: Fragment) -> Fragment {
        let start = self.nfa.fresh_state();
        let accept = self.nfa.fresh_state();
        self.nfa.add_epsilon(start, accept);
        self.nfa.add_epsilon(start, a.start);
        self.nfa.add_epsilon(a.accept, start);
        Fragment { start, accept }
    }

    /// Like star, but the only path to `accept` runs through `a` once.
    fn repeat_plus(&mut self, a: Fragment) -> Fragment {
        let start = self.nfa.fresh_state();
        let accept = self.nfa.fresh_state();
        self.nfa.add_epsilon(start, a.start);
        self.nfa.add_epsilon(a.accept, accept);
        self.nfa.add_epsilon(a.accept, start);
        Fragment { start, accept }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{cat, lit, or, star};

    #[test]
    fn test_single_character_literal() {
        let (nfa, symbols) = Compiler::new().compile(&lit("a")).unwrap();
        // One fragment: start --a--> accept.
        assert_eq!(nfa.num_states(), 2);
        assert_eq!(symbols.len(), 1);
        assert_eq!(nfa.alphabet().len(), 1);
        assert!(!nfa.is_empty());
    }

    #[test]
    fn test_multi_character_literal_is_a_chain() {
        let (nfa, symbols) = Compiler::new().compile(&lit("ab")).unwrap();
        // Two symbol fragments glued by one concat fragment.
        assert_eq!(nfa.num_states(), 6);
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn test_repeated_characters_share_a_symbol() {
        let (_, symbols) = Compiler::new().compile(&lit("aaa")).unwrap();
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_empty_literal_is_rejected() {
        let err = Compiler::new().compile(&lit("")).unwrap_err();
        assert_eq!(err, CompileError::EmptyLiteral);

        // Nested deep inside an operator, still rejected.
        let expr = cat([star(lit("a")), lit("")]);
        let err = Compiler::new().compile(&expr).unwrap_err();
        assert_eq!(err, CompileError::EmptyLiteral);
    }

    #[test]
    fn test_empty_operator_is_rejected() {
        let err = Compiler::new().compile(&Expr::Cat(vec![])).unwrap_err();
        assert_eq!(err, CompileError::EmptyOperator { operator: "cat" });

        let err = Compiler::new().compile(&Expr::Or(vec![])).unwrap_err();
        assert_eq!(err, CompileError::EmptyOperator { operator: "or" });
    }

    #[test]
    fn test_single_child_operators_degenerate() {
        // cat(a) and a produce the same number of states: no glue fragment.
        let (plain, _) = Compiler::new().compile(&lit("a")).unwrap();
        let (wrapped, _) = Compiler::new().compile(&cat([lit("a")])).unwrap();
        assert_eq!(plain.num_states(), wrapped.num_states());

        let (wrapped, _) = Compiler::new().compile(&or([lit("a")])).unwrap();
        assert_eq!(plain.num_states(), wrapped.num_states());
    }

    #[test]
    fn test_integer_literal_lowers_as_decimal() {
        let (_, symbols) = Compiler::new().compile(&Expr::Int(120)).unwrap();
        // '1', '2', '0'
        assert_eq!(symbols.len(), 3);
        assert!(symbols.lookup('1').is_some());
        assert!(symbols.lookup('2').is_some());
        assert!(symbols.lookup('0').is_some());

        let (_, symbols) = Compiler::new().compile(&Expr::Int(-7)).unwrap();
        assert!(symbols.lookup('-').is_some());
        assert!(symbols.lookup('7').is_some());
    }
}

//! Composable hard-constraint filters.
//!
//! Every candidate action enumerated by a phase passes through a
//! [`RuleSet`]; an action is legal only if all rules accept it. Rules are
//! read-only: they see the action, the state it would be applied to and
//! the phase's precomputed context, and never mutate anything.

use std::fmt;
use std::sync::Arc;

/// A hard constraint over candidate actions.
///
/// `C` is the phase context (the dense, precomputed input view),
/// `S` the search state and `A` the action type.
pub trait Rule<C, S, A>: Send + Sync {
    /// Short rule identifier.
    fn name(&self) -> &'static str;

    /// Whether `action` may be applied to `state`.
    fn passes(&self, action: &A, state: &S, context: &C) -> bool;

    /// Human-readable description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// The rule that rejected an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// [`Rule::name`] of the rejecting rule.
    pub rule: &'static str,
    /// [`Rule::description`] of the rejecting rule.
    pub description: &'static str,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.description)
    }
}

/// An ordered conjunction of [`Rule`]s.
///
/// Cheap rules should come first; evaluation stops at the first rejection.
pub struct RuleSet<C, S, A> {
    rules: Vec<Arc<dyn Rule<C, S, A>>>,
}

impl<C, S, A> RuleSet<C, S, A> {
    /// Creates an empty rule set that accepts everything.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule.
    pub fn with_rule<R: Rule<C, S, A> + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Whether every rule accepts `action`.
    #[inline]
    pub fn passes_all(&self, action: &A, state: &S, context: &C) -> bool {
        self.rules.iter().all(|r| r.passes(action, state, context))
    }

    /// The first rule that rejects `action`, if any.
    pub fn first_violation(&self, action: &A, state: &S, context: &C) -> Option<Violation> {
        self.rules
            .iter()
            .find(|r| !r.passes(action, state, context))
            .map(|r| Violation {
                rule: r.name(),
                description: r.description(),
            })
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<C, S, A> Clone for RuleSet<C, S, A> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<C, S, A> Default for RuleSet<C, S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, S, A> fmt::Debug for RuleSet<C, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.names())
            .finish()
    }
}

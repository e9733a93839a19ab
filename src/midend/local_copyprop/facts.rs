//! Per-action dataflow facts for local copy propagation

use crate::analysis::expr_uses;
use crate::error::{Error, Result};
use crate::ir::Expression;
use crate::visitor::FlowState;
use std::collections::btree_map::{self, BTreeMap};

/// What is known about one variable at a program point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableFact {
    /// Last side-effect free expression assigned, if still valid
    pub value: Option<Expression>,
    /// Declared inside the action being analysed
    pub local: bool,
    /// Read somewhere without a substitution
    pub live: bool,
}

impl VariableFact {
    fn merge(mut self, other: VariableFact) -> VariableFact {
        if self.value != other.value {
            self.value = None;
        }
        self.local &= other.local;
        self.live |= other.live;
        self
    }

    /// The same fact with its value forgotten
    fn without_value(mut self) -> VariableFact {
        self.value = None;
        self
    }
}

/// Variable name to facts, scoped to a single action body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactTable {
    facts: BTreeMap<String, VariableFact>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn get(&self, name: &str) -> Option<&VariableFact> {
        self.facts.get(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, VariableFact> {
        self.facts.iter()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    /// Start tracking a variable declared in the current action
    pub fn declare_local(&mut self, name: &str) -> Result<&mut VariableFact> {
        match self.facts.entry(name.to_string()) {
            btree_map::Entry::Occupied(_) => Err(Error::internal(format!(
                "duplicate declaration of `{}` in one action",
                name
            ))),
            btree_map::Entry::Vacant(slot) => Ok(slot.insert(VariableFact {
                local: true,
                ..VariableFact::default()
            })),
        }
    }

    /// Facts for `name`, tracking it as a non-local on first sight
    pub fn entry(&mut self, name: &str) -> &mut VariableFact {
        self.facts.entry(name.to_string()).or_default()
    }

    /// Known value of `name`, if any
    pub fn value(&self, name: &str) -> Option<&Expression> {
        self.facts.get(name)?.value.as_ref()
    }

    pub fn mark_live(&mut self, name: &str) {
        self.entry(name).live = true;
    }

    /// `name` is about to be overwritten: forget its value and every value
    /// computed from it
    pub fn drop_values_using(&mut self, name: &str) {
        for (var, fact) in self.facts.iter_mut() {
            let stale = var == name
                || fact
                    .value
                    .as_ref()
                    .map_or(false, |value| expr_uses(value, name));
            if stale && fact.value.is_some() {
                log::trace!("dropping value of {} (write to {})", var, name);
                fact.value = None;
            }
        }
    }

    /// Combine the tables reaching a join point along two paths.
    ///
    /// A value survives only if both paths agree on it; liveness on either
    /// path makes the variable live. A name seen on one path only keeps its
    /// flags but loses its value.
    pub fn merge(self, other: FactTable) -> FactTable {
        let mut merged = BTreeMap::new();
        let mut other = other.facts;
        for (name, fact) in self.facts {
            let fact = match other.remove(&name) {
                Some(theirs) => fact.merge(theirs),
                None => fact.without_value(),
            };
            merged.insert(name, fact);
        }
        for (name, fact) in other {
            merged.insert(name, fact.without_value());
        }
        FactTable { facts: merged }
    }
}

/// Flow state of local copy propagation
#[derive(Debug, Clone, Default)]
pub struct CopyPropState {
    pub in_action: bool,
    pub available: FactTable,
}

impl FlowState for CopyPropState {
    fn flow_merge(&mut self, other: Self) -> Result<()> {
        if self.in_action != other.in_action {
            return Err(Error::internal(
                "merging copy propagation states from inside and outside an action",
            ));
        }
        let available = std::mem::take(&mut self.available);
        self.available = available.merge(other.available);
        Ok(())
    }
}

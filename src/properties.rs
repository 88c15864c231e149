//! Conditional property resolution.
//!
//! Every `<PropertyGroup>` child of the root `<Project>` is flattened into a
//! [`PropertyTable`] entry carrying its own `Condition` and its group's
//! `Condition`, parsed once with [`crate::condition`]. Output paths and
//! scalar properties of both dialects are resolved through the same
//! [`PropertyTable::resolve`] rule:
//!
//! 1. among entries whose conditions all evaluate true, the one referencing
//!    the most distinct variables wins (first in document order on ties),
//! 2. otherwise the first entry with no condition at all,
//! 3. otherwise nothing.

use std::collections::HashMap;

use roxmltree::Node;

use crate::condition::{self, Expression};
use crate::xml::{self, Scope};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Parsed `Condition` attribute(s) guarding a property or group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Guard {
    conditions: Vec<Expression>,
    /// A condition was present but could not be parsed; never matches.
    malformed: bool,
}

impl Guard {
    fn from_raw<'s>(raw: impl IntoIterator<Item = &'s str>) -> Self {
        let mut guard = Self::default();
        for text in raw {
            match condition::parse_condition(text) {
                Ok(expr) => guard.conditions.push(expr),
                Err(err) => {
                    log::debug!("ignoring unparseable condition: {err}");
                    guard.malformed = true;
                }
            }
        }
        guard
    }

    /// No condition applies.
    pub fn is_unconditioned(&self) -> bool {
        self.conditions.is_empty() && !self.malformed
    }

    /// Conditions exist and all of them hold for `vars`.
    pub fn matches(&self, vars: &HashMap<String, String>) -> bool {
        !self.malformed
            && !self.conditions.is_empty()
            && self.conditions.iter().all(|c| condition::evaluate(c, vars))
    }

    /// Number of distinct variables referenced by the conditions.
    pub fn specificity(&self) -> usize {
        let mut names: Vec<String> = Vec::new();
        for c in &self.conditions {
            for v in c.variables() {
                let v = v.to_ascii_lowercase();
                if !names.contains(&v) {
                    names.push(v);
                }
            }
        }
        names.len()
    }

    /// Some condition mentions `$(variable)`.
    pub fn references(&self, variable: &str) -> bool {
        self.conditions
            .iter()
            .any(|c| c.variables().iter().any(|v| v.eq_ignore_ascii_case(variable)))
    }
}

/// A `<PropertyGroup>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyGroup {
    pub guard: Guard,
}

/// One property element inside a `<PropertyGroup>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    /// Raw text content, trimmed. Empty elements yield an empty string.
    pub value: String,
    /// Index of the owning group in [`PropertyTable::groups`].
    pub group: usize,
    /// Element and group conditions combined.
    pub guard: Guard,
}

/// All properties of a project, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTable {
    pub groups: Vec<PropertyGroup>,
    pub properties: Vec<Property>,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Construction
// ═══════════════════════════════════════════════════════════════════════════════

impl PropertyTable {
    /// Collect every `<PropertyGroup>` directly under `root`.
    pub fn from_root(root: Node, scope: Scope) -> Self {
        let mut table = Self::default();

        for group_node in scope.children(root, "PropertyGroup") {
            let group_condition = xml::condition(&group_node);
            let group = table.groups.len();
            table.groups.push(PropertyGroup {
                guard: Guard::from_raw(group_condition.as_deref()),
            });

            for child in group_node.children().filter(|n| scope.is_element(n)) {
                let own_condition = xml::condition(&child);
                let raw = group_condition.as_deref().into_iter().chain(own_condition.as_deref());
                table.properties.push(Property {
                    name: child.tag_name().name().to_string(),
                    value: child.text().unwrap_or("").trim().to_string(),
                    group,
                    guard: Guard::from_raw(raw),
                });
            }
        }

        table
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Resolution
// ═══════════════════════════════════════════════════════════════════════════════

impl PropertyTable {
    fn named<'t>(&'t self, name: &str) -> impl Iterator<Item = &'t Property> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// The most specific conditioned `name` property whose conditions hold.
    pub fn conditioned(&self, name: &str, vars: &HashMap<String, String>) -> Option<&Property> {
        let mut best: Option<&Property> = None;
        for p in self.named(name).filter(|p| p.guard.matches(vars)) {
            match best {
                Some(b) if b.guard.specificity() >= p.guard.specificity() => {}
                _ => best = Some(p),
            }
        }
        best
    }

    /// The first `name` property with no condition at all.
    pub fn unconditioned(&self, name: &str) -> Option<&Property> {
        self.named(name).find(|p| p.guard.is_unconditioned())
    }

    /// Resolve `name`: matching conditioned entry, else unconditioned entry.
    pub fn resolve(&self, name: &str, vars: &HashMap<String, String>) -> Option<&str> {
        self.conditioned(name, vars)
            .or_else(|| self.unconditioned(name))
            .map(|p| p.value.as_str())
    }

    /// Index of the first `<PropertyGroup>` without a `Condition`.
    pub fn first_unconditioned_group(&self) -> Option<usize> {
        self.groups.iter().position(|g| g.guard.is_unconditioned())
    }

    /// Properties declared directly in group `index`.
    pub fn in_group(&self, index: usize) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(move |p| p.group == index)
    }

    /// Value of `name` inside group `index`, ignoring element conditions.
    pub fn group_value(&self, index: usize, name: &str) -> Option<&str> {
        self.in_group(index)
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Some `<PropertyGroup>` conditioned on `$(variable)` holds for `vars`.
    pub fn any_group_matches(&self, variable: &str, vars: &HashMap<String, String>) -> bool {
        self.groups
            .iter()
            .any(|g| g.guard.references(variable) && g.guard.matches(vars))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

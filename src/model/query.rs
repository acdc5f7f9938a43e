//! Name-pattern lookup over a [`Model`].
//!
//! Patterns are case-insensitive globs where `*` matches any run of
//! characters and `?` a single character. Every other character, brackets
//! included, matches literally.

use super::{
    Model,
    application::{ApplicationAttribute, ElementId, RelationEnd},
    instance::InstanceRef,
};
use crate::{Error, Result};
use glob::{MatchOptions, Pattern};

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compile a name pattern, escaping glob syntax other than `*` and `?`.
fn compile(pattern: &str) -> Result<Pattern> {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' => escaped.push_str("[[]"),
            ']' => escaped.push_str("[]]"),
            other => escaped.push(other),
        }
    }
    Pattern::new(&escaped)
        .map_err(|e| Error::MalformedValue(format!("name pattern {pattern:?}: {}", e.msg)))
}

/// Introspection of application schema and instances by name pattern.
pub trait ModelQuery {
    fn find_elements(&self, pattern: &str) -> Result<Vec<ElementId>>;

    fn find_attributes(
        &self,
        element: ElementId,
        pattern: &str,
    ) -> Result<Vec<&ApplicationAttribute>>;

    /// Relation ends of `element` whose name matches.
    fn find_relations(&self, element: ElementId, pattern: &str) -> Result<Vec<(RelationEnd, &str)>>;

    fn find_instances(&self, element: ElementId, pattern: &str) -> Result<Vec<InstanceRef>>;

    /// Follow every relation of `instance` whose name matches.
    fn navigate(&self, instance: InstanceRef, relation_pattern: &str) -> Result<Vec<InstanceRef>>;
}

impl ModelQuery for Model {
    fn find_elements(&self, pattern: &str) -> Result<Vec<ElementId>> {
        let pattern = compile(pattern)?;
        Ok(self
            .elements()
            .iter()
            .filter(|e| pattern.matches_with(&e.name, MATCH))
            .map(|e| e.id)
            .collect())
    }

    fn find_attributes(
        &self,
        element: ElementId,
        pattern: &str,
    ) -> Result<Vec<&ApplicationAttribute>> {
        let pattern = compile(pattern)?;
        Ok(self
            .element(element)?
            .attributes
            .iter()
            .filter(|a| pattern.matches_with(&a.name, MATCH))
            .collect())
    }

    fn find_relations(&self, element: ElementId, pattern: &str) -> Result<Vec<(RelationEnd, &str)>> {
        self.element(element)?;
        let pattern = compile(pattern)?;
        Ok(self
            .relation_ends(element)
            .filter(|(_, name)| pattern.matches_with(name, MATCH))
            .collect())
    }

    fn find_instances(&self, element: ElementId, pattern: &str) -> Result<Vec<InstanceRef>> {
        let pattern = compile(pattern)?;
        let mut found = Vec::new();
        for instance in self.instances(element)? {
            if pattern.matches_with(&self.instance(instance)?.name, MATCH) {
                found.push(instance);
            }
        }
        Ok(found)
    }

    fn navigate(&self, instance: InstanceRef, relation_pattern: &str) -> Result<Vec<InstanceRef>> {
        let mut found = Vec::new();
        for (_, name) in self.find_relations(instance.element, relation_pattern)? {
            found.extend(self.related(instance, name)?);
        }
        Ok(found)
    }
}

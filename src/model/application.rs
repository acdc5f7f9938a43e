//! The application schema: user-named elements anchored to base elements.

use super::value::DataType;
use std::fmt;

/// Index of an application element within its [`Model`](super::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

/// Index of an application relation within its [`Model`](super::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(pub u32);

/// Allowed number of related instances seen from one side of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

impl Cardinality {
    pub const ZERO_OR_ONE: Cardinality = Cardinality { min: 0, max: Some(1) };
    pub const EXACTLY_ONE: Cardinality = Cardinality { min: 1, max: Some(1) };
    pub const MANY: Cardinality = Cardinality { min: 0, max: None };

    pub(crate) fn from_base(min: u32, max: i32) -> Self {
        Self {
            min,
            max: u32::try_from(max).ok(),
        }
    }

    pub fn allows(&self, count: usize) -> bool {
        self.max.is_none_or(|max| count <= max as usize)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{max}", self.min),
            None => write!(f, "{}..n", self.min),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationAttribute {
    pub name: String,
    /// Name of the base attribute this one derives from.
    pub base_name: Option<String>,
    pub data_type: DataType,
    /// Enumeration constraining `DT_ENUM`/`DS_ENUM` values.
    pub enumeration: Option<String>,
    pub obligatory: bool,
}

#[derive(Debug, Clone)]
pub struct ApplicationElement {
    pub id: ElementId,
    pub name: String,
    /// Name of the base element, e.g. `AoSubMatrix`.
    pub base_name: String,
    pub attributes: Vec<ApplicationAttribute>,
}

impl ApplicationElement {
    pub fn attribute(&self, name: &str) -> Option<&ApplicationAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_by_base(&self, base_name: &str) -> Option<&ApplicationAttribute> {
        self.attributes
            .iter()
            .find(|a| a.base_name.as_deref() == Some(base_name))
    }
}

/// A bidirectional relation between two application elements.
///
/// `name` is seen from `from` and points at `to`; `inverse_name` is seen
/// from `to` and points back.
#[derive(Debug, Clone)]
pub struct ApplicationRelation {
    pub id: RelationId,
    pub from: ElementId,
    pub to: ElementId,
    pub name: String,
    pub inverse_name: String,
    pub base_name: Option<String>,
    pub inverse_base_name: Option<String>,
    /// `to` instances per `from` instance.
    pub cardinality: Cardinality,
    /// `from` instances per `to` instance.
    pub inverse_cardinality: Cardinality,
}

/// One direction of an application relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationEnd {
    pub relation: RelationId,
    /// `true` when traversed from `from` to `to`.
    pub forward: bool,
}

impl RelationEnd {
    pub fn inverse(self) -> Self {
        Self {
            relation: self.relation,
            forward: !self.forward,
        }
    }
}

impl ApplicationRelation {
    pub fn end_name(&self, end: RelationEnd) -> &str {
        if end.forward {
            &self.name
        } else {
            &self.inverse_name
        }
    }

    pub fn end_base_name(&self, end: RelationEnd) -> Option<&str> {
        if end.forward {
            self.base_name.as_deref()
        } else {
            self.inverse_base_name.as_deref()
        }
    }

    pub fn end_cardinality(&self, end: RelationEnd) -> Cardinality {
        if end.forward {
            self.cardinality
        } else {
            self.inverse_cardinality
        }
    }

    /// Element an instance must belong to in order to traverse `end`.
    pub fn source(&self, end: RelationEnd) -> ElementId {
        if end.forward { self.from } else { self.to }
    }

    pub fn target(&self, end: RelationEnd) -> ElementId {
        if end.forward { self.to } else { self.from }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_bounds() {
        assert!(Cardinality::EXACTLY_ONE.allows(1));
        assert!(!Cardinality::EXACTLY_ONE.allows(2));
        assert!(Cardinality::MANY.allows(usize::MAX));
        assert_eq!(Cardinality::from_base(0, -1), Cardinality::MANY);
        assert_eq!(Cardinality::ZERO_OR_ONE.to_string(), "0..1");
        assert_eq!(Cardinality::MANY.to_string(), "0..n");
    }
}

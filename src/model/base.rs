//! The version-pinned base vocabulary.
//!
//! Each supported base model version ships as a JSON document embedded in
//! the library. It is deserialized on first use and shared read-only for the
//! rest of the process.

use super::{application::Cardinality, value::DataType};
use crate::{Error, Result};
use serde::Deserialize;
use std::sync::OnceLock;

const ASAM35: &str = include_str!("../../base_model/asam35.json");

#[derive(Debug, Clone, Deserialize)]
pub struct EnumerationItem {
    pub name: String,
    pub value: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumerationDefinition {
    pub name: String,
    pub items: Vec<EnumerationItem>,
}

impl EnumerationDefinition {
    pub fn contains(&self, value: i32) -> bool {
        self.items.iter().any(|item| item.value == value)
    }

    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
            .map(|item| item.value)
    }

    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.value == value)
            .map(|item| item.name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseAttribute {
    pub name: String,
    pub datatype: DataType,
    #[serde(default)]
    pub enumeration: Option<String>,
    #[serde(default)]
    pub obligatory: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseElement {
    pub name: String,
    pub attributes: Vec<BaseAttribute>,
}

impl BaseElement {
    pub fn attribute(&self, name: &str) -> Option<&BaseAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A base relation and its inverse, declared once. `max == -1` means many.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseRelation {
    pub from: String,
    pub name: String,
    pub to: String,
    pub inverse_name: String,
    pub min: u32,
    pub max: i32,
    pub inverse_min: u32,
    pub inverse_max: i32,
}

impl BaseRelation {
    /// How many `to` instances one `from` instance may reference.
    pub fn cardinality(&self) -> Cardinality {
        Cardinality::from_base(self.min, self.max)
    }

    pub fn inverse_cardinality(&self) -> Cardinality {
        Cardinality::from_base(self.inverse_min, self.inverse_max)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseModel {
    pub version: String,
    pub enumerations: Vec<EnumerationDefinition>,
    pub elements: Vec<BaseElement>,
    pub relations: Vec<BaseRelation>,
}

impl BaseModel {
    pub fn element(&self, name: &str) -> Option<&BaseElement> {
        self.elements
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumerationDefinition> {
        self.enumerations.iter().find(|e| e.name == name)
    }

    /// Base relations touching `element`, from either side.
    pub fn relations_of<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a BaseRelation> {
        self.relations
            .iter()
            .filter(move |r| r.from == element || r.to == element)
    }

    fn validate(&self) -> Result<()> {
        for relation in &self.relations {
            for end in [&relation.from, &relation.to] {
                if self.element(end).is_none() {
                    return Err(Error::BaseModel(format!(
                        "relation {} references unknown element {end}",
                        relation.name
                    )));
                }
            }
        }
        for element in &self.elements {
            for attribute in &element.attributes {
                if let Some(name) = &attribute.enumeration {
                    if self.enumeration(name).is_none() {
                        return Err(Error::BaseModel(format!(
                            "{}.{} references unknown enumeration {name}",
                            element.name, attribute.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn load(json: &str) -> Result<BaseModel> {
    let model: BaseModel =
        serde_json::from_str(json).map_err(|e| Error::BaseModel(e.to_string()))?;
    model.validate()?;
    log::debug!(
        "loaded base model {}: {} elements, {} relations",
        model.version,
        model.elements.len(),
        model.relations.len()
    );
    Ok(model)
}

/// The cached base model for `version`.
pub fn base_model(version: &str) -> Result<&'static BaseModel> {
    static ASAM35_MODEL: OnceLock<std::result::Result<BaseModel, String>> = OnceLock::new();
    match version {
        "asam35" => ASAM35_MODEL
            .get_or_init(|| load(ASAM35).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| Error::BaseModel(e.clone())),
        other => Err(Error::UnsupportedVersion(format!(
            "base model version {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_model_loads_once() {
        let first = base_model("asam35").unwrap();
        let second = base_model("asam35").unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(first.element("aolocalcolumn").is_some());
        let seq_rep = first.enumeration("seq_rep_enum").unwrap();
        assert_eq!(seq_rep.value_of("external_component"), Some(7));
        assert_eq!(seq_rep.name_of(8), Some("raw_linear_external"));
        assert_eq!(first.enumeration("typespec_enum").unwrap().items.len(), 33);
    }

    #[test]
    fn unknown_version_is_unsupported() {
        let err = base_model("asam29").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedVersion);
    }

    #[test]
    fn dangling_relation_is_rejected() {
        let json = r#"{ "version": "t", "enumerations": [], "elements": [],
            "relations": [{ "from": "AoTest", "name": "x", "to": "AoUnit", "inverse_name": "y",
                "min": 0, "max": 1, "inverse_min": 0, "inverse_max": 1 }] }"#;
        assert!(matches!(load(json), Err(Error::BaseModel(_))));
    }
}

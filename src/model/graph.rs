use super::{
    application::{
        ApplicationAttribute, ApplicationElement, ApplicationRelation, Cardinality, ElementId,
        RelationEnd, RelationId,
    },
    base::{BaseModel, base_model},
    instance::{AttributeValue, InstanceElement, InstanceRef},
    value::{DataType, Sequence, Validity, Value},
};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Application schema plus instance graph over one base model.
///
/// Relation edges are stored on both instances and always change as a pair;
/// a failed operation leaves the graph untouched.
#[derive(Debug, Clone)]
pub struct Model {
    base: &'static BaseModel,
    elements: Vec<ApplicationElement>,
    relations: Vec<ApplicationRelation>,
    instances: Vec<BTreeMap<u64, InstanceElement>>,
    next_instance_id: Vec<u64>,
}

impl Model {
    /// An empty schema over the cached base model `base_version`.
    pub fn new(base_version: &str) -> Result<Self> {
        Ok(Self {
            base: base_model(base_version)?,
            elements: Vec::new(),
            relations: Vec::new(),
            instances: Vec::new(),
            next_instance_id: Vec::new(),
        })
    }

    pub fn base(&self) -> &'static BaseModel {
        self.base
    }

    // ---- schema ------------------------------------------------------------

    pub fn elements(&self) -> &[ApplicationElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Result<&ApplicationElement> {
        self.elements
            .get(id.0 as usize)
            .ok_or_else(|| Error::UnknownElement(format!("#{}", id.0)))
    }

    pub fn element_by_name(&self, name: &str) -> Result<ElementId> {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.id)
            .ok_or_else(|| Error::UnknownElement(name.to_string()))
    }

    pub fn elements_by_base(&self, base_name: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.base_name.eq_ignore_ascii_case(base_name))
            .map(|e| e.id)
            .collect()
    }

    pub fn relations(&self) -> &[ApplicationRelation] {
        &self.relations
    }

    pub fn relation(&self, id: RelationId) -> Result<&ApplicationRelation> {
        self.relations
            .get(id.0 as usize)
            .ok_or_else(|| Error::UnknownRelation {
                element: String::new(),
                relation: format!("#{}", id.0),
            })
    }

    /// Relation ends an instance of `element` can traverse, with their names.
    pub fn relation_ends(&self, element: ElementId) -> impl Iterator<Item = (RelationEnd, &str)> {
        self.relations.iter().flat_map(move |r| {
            let forward = RelationEnd {
                relation: r.id,
                forward: true,
            };
            let backward = forward.inverse();
            [
                (r.from == element).then(|| (forward, r.name.as_str())),
                (r.to == element).then(|| (backward, r.inverse_name.as_str())),
            ]
            .into_iter()
            .flatten()
        })
    }

    pub fn relation_end(&self, element: ElementId, name: &str) -> Result<RelationEnd> {
        self.relation_ends(element)
            .find(|(_, n)| *n == name)
            .map(|(end, _)| end)
            .ok_or_else(|| Error::UnknownRelation {
                element: self.element_name(element),
                relation: name.to_string(),
            })
    }

    fn element_name(&self, id: ElementId) -> String {
        self.element(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|_| format!("#{}", id.0))
    }

    fn has_relation_named(&self, element: ElementId, name: &str) -> bool {
        self.relation_ends(element).any(|(_, n)| n == name)
    }

    /// Create an application element derived from `base_type`.
    ///
    /// The element starts with the obligatory attributes of its base element.
    /// Base relations are added for every counterpart base element that has
    /// exactly one application element so far.
    pub fn create_application_element(&mut self, name: &str, base_type: &str) -> Result<ElementId> {
        if self.elements.iter().any(|e| e.name == name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        let base = self.base;
        let base_element = base
            .element(base_type)
            .ok_or_else(|| Error::UnknownElement(base_type.to_string()))?;

        let id = ElementId(self.elements.len() as u32);
        self.elements.push(ApplicationElement {
            id,
            name: name.to_string(),
            base_name: base_element.name.clone(),
            attributes: base_element
                .attributes
                .iter()
                .filter(|a| a.obligatory)
                .map(|a| ApplicationAttribute {
                    name: a.name.clone(),
                    base_name: Some(a.name.clone()),
                    data_type: a.datatype,
                    enumeration: a.enumeration.clone(),
                    obligatory: true,
                })
                .collect(),
        });
        self.instances.push(BTreeMap::new());
        self.next_instance_id.push(1);

        for relation in base.relations_of(&base_element.name) {
            let outgoing = relation.from == base_element.name;
            let counterpart = if outgoing { &relation.to } else { &relation.from };
            let candidates: Vec<ElementId> = self
                .elements_by_base(counterpart)
                .into_iter()
                .filter(|e| *e != id)
                .collect();
            let &[other] = candidates.as_slice() else {
                continue;
            };
            let (from, to) = if outgoing { (id, other) } else { (other, id) };
            if self.has_relation_named(from, &relation.name)
                || self.has_relation_named(to, &relation.inverse_name)
            {
                log::debug!(
                    "base relation {}.{} already taken between {} and {}",
                    relation.from,
                    relation.name,
                    self.element_name(from),
                    self.element_name(to)
                );
                continue;
            }
            let rid = RelationId(self.relations.len() as u32);
            self.relations.push(ApplicationRelation {
                id: rid,
                from,
                to,
                name: relation.name.clone(),
                inverse_name: relation.inverse_name.clone(),
                base_name: Some(relation.name.clone()),
                inverse_base_name: Some(relation.inverse_name.clone()),
                cardinality: relation.cardinality(),
                inverse_cardinality: relation.inverse_cardinality(),
            });
        }
        Ok(id)
    }

    /// Add a free-form extension attribute.
    pub fn create_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        data_type: DataType,
        enumeration: Option<&str>,
    ) -> Result<()> {
        if let Some(enumeration) = enumeration {
            if self.base.enumeration(enumeration).is_none() {
                return Err(Error::UnknownElement(format!("enumeration {enumeration}")));
            }
        }
        let el = self.element_mut(element)?;
        if el.attribute(name).is_some() {
            return Err(Error::DuplicateName(format!("{}.{name}", el.name)));
        }
        el.attributes.push(ApplicationAttribute {
            name: name.to_string(),
            base_name: None,
            data_type,
            enumeration: enumeration.map(str::to_string),
            obligatory: false,
        });
        Ok(())
    }

    /// Add a non-obligatory attribute of the base element. Adding one that is
    /// already present does nothing.
    pub fn add_base_attribute(&mut self, element: ElementId, base_attribute: &str) -> Result<()> {
        let base = self.base;
        let el = self.element_mut(element)?;
        if el.attribute_by_base(base_attribute).is_some() {
            return Ok(());
        }
        let definition = base
            .element(&el.base_name)
            .and_then(|b| b.attribute(base_attribute))
            .ok_or_else(|| Error::UnknownAttribute {
                element: el.name.clone(),
                attribute: base_attribute.to_string(),
            })?;
        if el.attribute(base_attribute).is_some() {
            return Err(Error::DuplicateName(format!("{}.{base_attribute}", el.name)));
        }
        el.attributes.push(ApplicationAttribute {
            name: definition.name.clone(),
            base_name: Some(definition.name.clone()),
            data_type: definition.datatype,
            enumeration: definition.enumeration.clone(),
            obligatory: false,
        });
        Ok(())
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut ApplicationElement> {
        self.elements
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::UnknownElement(format!("#{}", id.0)))
    }

    /// Define an explicit relation between two application elements.
    pub fn create_application_relation(
        &mut self,
        from: ElementId,
        to: ElementId,
        name: &str,
        inverse_name: &str,
        cardinality: Cardinality,
        inverse_cardinality: Cardinality,
    ) -> Result<RelationId> {
        self.element(from)?;
        self.element(to)?;
        if self.has_relation_named(from, name) {
            return Err(Error::DuplicateName(format!("{}.{name}", self.element_name(from))));
        }
        if self.has_relation_named(to, inverse_name) || (from == to && name == inverse_name) {
            return Err(Error::DuplicateName(format!(
                "{}.{inverse_name}",
                self.element_name(to)
            )));
        }
        let id = RelationId(self.relations.len() as u32);
        self.relations.push(ApplicationRelation {
            id,
            from,
            to,
            name: name.to_string(),
            inverse_name: inverse_name.to_string(),
            base_name: None,
            inverse_base_name: None,
            cardinality,
            inverse_cardinality,
        });
        Ok(id)
    }

    // ---- instances ---------------------------------------------------------

    /// Create an instance with an id unique within `element`.
    pub fn create_instance(&mut self, element: ElementId, name: &str) -> Result<InstanceRef> {
        self.element(element)?;
        let idx = element.0 as usize;
        let id = self.next_instance_id[idx];
        self.next_instance_id[idx] += 1;
        let mut instance = InstanceElement::new(id, name.to_string());
        instance.values.insert(
            "id".to_string(),
            AttributeValue {
                value: Value::LongLong(id as i64),
                validity: Validity::default(),
            },
        );
        instance.values.insert(
            "name".to_string(),
            AttributeValue {
                value: Value::String(name.to_string()),
                validity: Validity::default(),
            },
        );
        self.instances[idx].insert(id, instance);
        Ok(InstanceRef { element, id })
    }

    pub fn instance(&self, instance: InstanceRef) -> Result<&InstanceElement> {
        self.instances
            .get(instance.element.0 as usize)
            .and_then(|m| m.get(&instance.id))
            .ok_or_else(|| self.unknown_instance(instance))
    }

    fn instance_mut(&mut self, instance: InstanceRef) -> Result<&mut InstanceElement> {
        let err = self.unknown_instance(instance);
        self.instances
            .get_mut(instance.element.0 as usize)
            .and_then(|m| m.get_mut(&instance.id))
            .ok_or(err)
    }

    fn unknown_instance(&self, instance: InstanceRef) -> Error {
        Error::UnknownInstance {
            element: self.element_name(instance.element),
            id: instance.id,
        }
    }

    pub fn instances(&self, element: ElementId) -> Result<impl Iterator<Item = InstanceRef> + '_> {
        self.element(element)?;
        Ok(self.instances[element.0 as usize]
            .keys()
            .map(move |id| InstanceRef { element, id: *id }))
    }

    pub fn instance_count(&self) -> usize {
        self.instances.iter().map(BTreeMap::len).sum()
    }

    /// Store `value` in `attribute` after checking the attribute exists and
    /// the value matches its datatype and enumeration.
    pub fn set_value(
        &mut self,
        instance: InstanceRef,
        attribute: &str,
        value: Value,
        validity: Validity,
    ) -> Result<()> {
        let element = self.element(instance.element)?;
        let definition = element
            .attribute(attribute)
            .ok_or_else(|| Error::UnknownAttribute {
                element: element.name.clone(),
                attribute: attribute.to_string(),
            })?;
        let mismatch = |expected: String| Error::TypeMismatch {
            attribute: format!("{}.{attribute}", element.name),
            expected,
            found: value.data_type().to_string(),
        };
        if attribute == "id" {
            return Err(mismatch("read-only instance id".to_string()));
        }
        if !definition.data_type.accepts(&value) {
            return Err(mismatch(definition.data_type.to_string()));
        }
        if let Some(name) = &definition.enumeration {
            let items: &[i32] = match &value {
                Value::Enum(v) => std::slice::from_ref(v),
                Value::Sequence(Sequence::Enum(v)) => v.as_slice(),
                _ => &[],
            };
            let enumeration = self.base.enumeration(name);
            if let Some(bad) = items
                .iter()
                .find(|v| !enumeration.is_some_and(|e| e.contains(**v)))
            {
                return Err(Error::TypeMismatch {
                    attribute: format!("{}.{attribute}", element.name),
                    expected: name.clone(),
                    found: bad.to_string(),
                });
            }
        }
        if let (Validity::PerElement(flags), Value::Sequence(seq)) = (&validity, &value) {
            if flags.len() != seq.len() {
                return Err(Error::MalformedValue(format!(
                    "{} flags for {} values of {attribute}",
                    flags.len(),
                    seq.len()
                )));
            }
        }

        let target = self.instance_mut(instance)?;
        if attribute == "name" {
            if let Some(name) = value.as_str() {
                target.name = name.to_string();
            }
        }
        target
            .values
            .insert(attribute.to_string(), AttributeValue { value, validity });
        Ok(())
    }

    /// `set_value` with every flag valid.
    pub fn set(&mut self, instance: InstanceRef, attribute: &str, value: Value) -> Result<()> {
        self.set_value(instance, attribute, value, Validity::default())
    }

    /// Stored value of `attribute`; `None` when defined but never set.
    pub fn value(&self, instance: InstanceRef, attribute: &str) -> Result<Option<&AttributeValue>> {
        let element = self.element(instance.element)?;
        if element.attribute(attribute).is_none() {
            return Err(Error::UnknownAttribute {
                element: element.name.clone(),
                attribute: attribute.to_string(),
            });
        }
        Ok(self.instance(instance)?.value(attribute))
    }

    /// Connect two instances through the relation `relation` of `from`.
    pub fn create_relation(
        &mut self,
        from: InstanceRef,
        relation: &str,
        to: InstanceRef,
    ) -> Result<()> {
        let end = self.relation_end(from.element, relation)?;
        let rel = self.relation(end.relation)?;
        if rel.target(end) != to.element {
            return Err(Error::TypeMismatch {
                attribute: relation.to_string(),
                expected: self.element_name(rel.target(end)),
                found: self.element_name(to.element),
            });
        }
        let source = self.instance(from)?;
        let target = self.instance(to)?;
        if source.related(end).any(|id| id == to.id) {
            return Ok(());
        }
        for (inst, side) in [(source, end), (target, end.inverse())] {
            let cardinality = rel.end_cardinality(side);
            if !cardinality.allows(inst.related_count(side) + 1) {
                return Err(Error::CardinalityExceeded {
                    relation: rel.end_name(side).to_string(),
                    max: cardinality.max.unwrap_or(u32::MAX),
                });
            }
        }
        self.instance_mut(from)?.link(end, to.id);
        self.instance_mut(to)?.link(end.inverse(), from.id);
        Ok(())
    }

    pub fn remove_relation(
        &mut self,
        from: InstanceRef,
        relation: &str,
        to: InstanceRef,
    ) -> Result<()> {
        let end = self.relation_end(from.element, relation)?;
        self.instance(from)?;
        self.instance(to)?;
        self.instance_mut(from)?.unlink(end, to.id);
        self.instance_mut(to)?.unlink(end.inverse(), from.id);
        Ok(())
    }

    /// Instances reachable from `instance` through `relation`, in id order.
    pub fn related(&self, instance: InstanceRef, relation: &str) -> Result<Vec<InstanceRef>> {
        let end = self.relation_end(instance.element, relation)?;
        let element = self.relation(end.relation)?.target(end);
        Ok(self
            .instance(instance)?
            .related(end)
            .map(|id| InstanceRef { element, id })
            .collect())
    }

    /// Relation end of `element` derived from the base relation `base_relation`.
    pub fn relation_end_by_base(
        &self,
        element: ElementId,
        base_relation: &str,
    ) -> Result<(RelationEnd, &str)> {
        self.relation_ends(element)
            .find(|(end, _)| {
                self.relation(end.relation).is_ok_and(|r| {
                    r.end_base_name(*end)
                        .is_some_and(|n| n.eq_ignore_ascii_case(base_relation))
                })
            })
            .ok_or_else(|| Error::UnknownRelation {
                element: self.element_name(element),
                relation: base_relation.to_string(),
            })
    }

    /// Like [`Model::related`], addressing the relation by its base name.
    pub fn related_by_base(
        &self,
        instance: InstanceRef,
        base_relation: &str,
    ) -> Result<Vec<InstanceRef>> {
        let (_, name) = self.relation_end_by_base(instance.element, base_relation)?;
        self.related(instance, name)
    }

    /// Like [`Model::create_relation`], addressing the relation by its base name.
    pub fn create_relation_by_base(
        &mut self,
        from: InstanceRef,
        base_relation: &str,
        to: InstanceRef,
    ) -> Result<()> {
        let (_, name) = self.relation_end_by_base(from.element, base_relation)?;
        let name = name.to_string();
        self.create_relation(from, &name, to)
    }

    /// Like [`Model::set`], addressing the attribute by its base name.
    pub fn set_by_base(
        &mut self,
        instance: InstanceRef,
        base_attribute: &str,
        value: Value,
    ) -> Result<()> {
        let element = self.element(instance.element)?;
        let name = element
            .attribute_by_base(base_attribute)
            .map(|a| a.name.clone())
            .ok_or_else(|| Error::UnknownAttribute {
                element: element.name.clone(),
                attribute: base_attribute.to_string(),
            })?;
        self.set(instance, &name, value)
    }

    /// Stored value of the attribute derived from `base_attribute`.
    pub fn value_by_base(
        &self,
        instance: InstanceRef,
        base_attribute: &str,
    ) -> Result<Option<&AttributeValue>> {
        let element = self.element(instance.element)?;
        let attribute = element.attribute_by_base(base_attribute).ok_or_else(|| {
            Error::UnknownAttribute {
                element: element.name.clone(),
                attribute: base_attribute.to_string(),
            }
        })?;
        Ok(self.instance(instance)?.value(&attribute.name))
    }

    /// Remove an instance and every edge pointing at it.
    pub fn remove_instance(&mut self, instance: InstanceRef) -> Result<()> {
        let err = self.unknown_instance(instance);
        let removed = self
            .instances
            .get_mut(instance.element.0 as usize)
            .and_then(|m| m.remove(&instance.id))
            .ok_or(err)?;
        for (end, ids) in &removed.edges {
            let element = self.relation(end.relation)?.target(*end);
            for id in ids {
                if let Some(other) = self.instances[element.0 as usize].get_mut(id) {
                    other.unlink(end.inverse(), instance.id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn schema() -> (Model, ElementId, ElementId, ElementId) {
        let mut model = Model::new("asam35").unwrap();
        let meas = model.create_application_element("Measurement", "AoMeasurement").unwrap();
        let sm = model.create_application_element("SubMatrix", "AoSubMatrix").unwrap();
        let lc = model.create_application_element("LocalColumn", "AoLocalColumn").unwrap();
        (model, meas, sm, lc)
    }

    #[test]
    fn obligatory_attributes_and_base_relations_are_seeded() {
        let (model, meas, sm, lc) = schema();
        let submatrix = model.element(sm).unwrap();
        assert!(submatrix.attribute("number_of_rows").is_some());
        assert!(submatrix.attribute("description").is_none());
        assert!(model.relation_end(meas, "submatrices").is_ok());
        assert!(model.relation_end(sm, "measurement").is_ok());
        assert!(model.relation_end(sm, "local_columns").is_ok());
        assert!(model.relation_end(lc, "submatrix").is_ok());
        // no MeaQuantity element yet
        assert!(model.relation_end(lc, "measurement_quantity").is_err());
    }

    #[test]
    fn duplicate_element_name() {
        let (mut model, ..) = schema();
        let err = model.create_application_element("SubMatrix", "AoSubMatrix").unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
        assert!(matches!(
            model.create_application_element("X", "AoNothing"),
            Err(Error::UnknownElement(_))
        ));
    }

    #[test]
    fn set_value_checks_type_and_enumeration() {
        let (mut model, _, sm, lc) = schema();
        let matrix = model.create_instance(sm, "cg0").unwrap();
        model.set(matrix, "number_of_rows", Value::Long(100)).unwrap();
        let err = model.set(matrix, "number_of_rows", Value::Double(1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = model.set(matrix, "colour", Value::Long(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAttribute);

        let column = model.create_instance(lc, "speed").unwrap();
        model.set(column, "sequence_representation", Value::Enum(7)).unwrap();
        let err = model
            .set(column, "sequence_representation", Value::Enum(42))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            model.value(column, "sequence_representation").unwrap().unwrap().value,
            Value::Enum(7)
        );
    }

    #[test]
    fn optional_and_extension_attributes() {
        let (mut model, meas, ..) = schema();
        model.add_base_attribute(meas, "measurement_begin").unwrap();
        model.add_base_attribute(meas, "measurement_begin").unwrap();
        assert!(model.add_base_attribute(meas, "nonsense").is_err());
        model
            .create_attribute(meas, "driver", DataType::String, None)
            .unwrap();
        assert!(matches!(
            model.create_attribute(meas, "driver", DataType::String, None),
            Err(Error::DuplicateName(_))
        ));
        let m = model.create_instance(meas, "run").unwrap();
        model
            .set(m, "measurement_begin", Value::Date("20240101120000".into()))
            .unwrap();
        model.set(m, "driver", Value::String("J. Doe".into())).unwrap();
    }

    #[test]
    fn instance_ids_are_unique_per_element() {
        let (mut model, meas, sm, _) = schema();
        let a = model.create_instance(sm, "a").unwrap();
        let b = model.create_instance(sm, "b").unwrap();
        let m = model.create_instance(meas, "m").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(m.id, 1);
        assert_eq!(
            model.value(b, "id").unwrap().unwrap().value,
            Value::LongLong(b.id as i64)
        );
        assert!(model.set(b, "id", Value::LongLong(9)).is_err());
    }

    #[test]
    fn cardinality_exceeded_leaves_graph_unchanged() {
        let (mut model, meas, sm, _) = schema();
        let m1 = model.create_instance(meas, "m1").unwrap();
        let m2 = model.create_instance(meas, "m2").unwrap();
        let matrix = model.create_instance(sm, "cg").unwrap();

        model.create_relation(matrix, "measurement", m1).unwrap();
        let err = model.create_relation(matrix, "measurement", m2).unwrap_err();
        assert!(matches!(err, Error::CardinalityExceeded { max: 1, .. }));

        assert_eq!(model.related(matrix, "measurement").unwrap(), vec![m1]);
        assert_eq!(model.related(m1, "submatrices").unwrap(), vec![matrix]);
        assert!(model.related(m2, "submatrices").unwrap().is_empty());
    }

    #[test]
    fn remove_relation_and_instance_clear_both_sides() {
        let (mut model, meas, sm, _) = schema();
        let m = model.create_instance(meas, "m").unwrap();
        let a = model.create_instance(sm, "a").unwrap();
        let b = model.create_instance(sm, "b").unwrap();
        model.create_relation(m, "submatrices", a).unwrap();
        model.create_relation(m, "submatrices", b).unwrap();

        model.remove_relation(a, "measurement", m).unwrap();
        assert_eq!(model.related(m, "submatrices").unwrap(), vec![b]);

        model.remove_instance(m).unwrap();
        assert!(model.related(b, "measurement").unwrap().is_empty());
        assert!(model.instance(m).is_err());
        assert_eq!(model.instance_count(), 2);
    }

    #[test]
    fn explicit_relation() {
        let (mut model, meas, ..) = schema();
        let unit = model.create_application_element("Unit", "AoUnit").unwrap();
        let rid = model
            .create_application_relation(
                meas,
                unit,
                "display_unit",
                "displayed_in",
                Cardinality::ZERO_OR_ONE,
                Cardinality::MANY,
            )
            .unwrap();
        assert_eq!(model.relation(rid).unwrap().base_name, None);
        let foreign = RelationId(model.relations().len() as u32);
        assert!(matches!(
            model.relation(foreign),
            Err(Error::UnknownRelation { .. })
        ));
        assert!(matches!(
            model.create_application_relation(
                meas,
                unit,
                "display_unit",
                "other",
                Cardinality::MANY,
                Cardinality::MANY
            ),
            Err(Error::DuplicateName(_))
        ));
        let m = model.create_instance(meas, "m").unwrap();
        let m2 = model.create_instance(meas, "m2").unwrap();
        let err = model.create_relation(m, "display_unit", m2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}

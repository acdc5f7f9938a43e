use crate::{
    Result,
    external::{CONVERSION_RULE, INVALIDATION_BIT, INVALIDATION_BYTE_OFFSET},
    model::{DataType, ElementId, Model},
};

/// Application elements the importer writes into.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub environment: ElementId,
    pub test: ElementId,
    pub measurement: ElementId,
    pub mea_quantity: ElementId,
    pub submatrix: ElementId,
    pub local_column: ElementId,
    pub external_component: ElementId,
    pub unit: ElementId,
    pub phys_dimension: ElementId,
}

/// Creation order matters: base relations are seeded towards elements that
/// already exist.
const ELEMENTS: [(&str, &str); 9] = [
    ("Environment", "AoEnvironment"),
    ("Test", "AoSubTest"),
    ("Measurement", "AoMeasurement"),
    ("MeaQuantity", "AoMeasurementQuantity"),
    ("SubMatrix", "AoSubMatrix"),
    ("LocalColumn", "AoLocalColumn"),
    ("ExternalComponent", "AoExternalComponent"),
    ("Unit", "AoUnit"),
    ("PhysDimension", "AoPhysicalDimension"),
];

fn element(model: &mut Model, name: &str, base: &str) -> Result<ElementId> {
    match model.element_by_name(name) {
        Ok(id) => {
            let existing = &model.element(id)?.base_name;
            if !existing.eq_ignore_ascii_case(base) {
                return Err(crate::Error::TypeMismatch {
                    attribute: name.to_string(),
                    expected: base.to_string(),
                    found: existing.clone(),
                });
            }
            Ok(id)
        }
        Err(_) => model.create_application_element(name, base),
    }
}

fn extension(model: &mut Model, element: ElementId, name: &str, data_type: DataType) -> Result<()> {
    if model.element(element)?.attribute(name).is_none() {
        model.create_attribute(element, name, data_type, None)?;
    }
    Ok(())
}

impl Schema {
    /// Create the importer's elements, or reuse them when a previous import
    /// already did.
    pub fn ensure(model: &mut Model) -> Result<Self> {
        let mut ids = [ElementId(0); ELEMENTS.len()];
        for (slot, (name, base)) in ids.iter_mut().zip(ELEMENTS) {
            *slot = element(model, name, base)?;
        }
        let [
            environment,
            test,
            measurement,
            mea_quantity,
            submatrix,
            local_column,
            external_component,
            unit,
            phys_dimension,
        ] = ids;

        for (el, attribute) in [
            (test, "description"),
            (measurement, "description"),
            (measurement, "measurement_begin"),
            (mea_quantity, "description"),
            (submatrix, "description"),
            (local_column, "generation_parameters"),
            (local_column, "flags"),
            (external_component, "ao_bit_offset"),
            (external_component, "ao_bit_count"),
        ] {
            model.add_base_attribute(el, attribute)?;
        }
        extension(model, local_column, CONVERSION_RULE, DataType::String)?;
        extension(model, external_component, INVALIDATION_BYTE_OFFSET, DataType::LongLong)?;
        extension(model, external_component, INVALIDATION_BIT, DataType::Short)?;

        Ok(Self {
            environment,
            test,
            measurement,
            mea_quantity,
            submatrix,
            local_column,
            external_component,
            unit,
            phys_dimension,
        })
    }
}

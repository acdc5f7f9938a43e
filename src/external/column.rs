use super::component::ExternalComponent;
use crate::{
    Error, Result,
    conversion::ConversionRule,
    model::{Flag, InstanceRef, Model, Sequence, Validity, Value},
};

/// Extension attribute holding a column's conversion rule as JSON.
pub const CONVERSION_RULE: &str = "conversion_rule";

/// Storage modes of the ODS `seq_rep_enum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceRepresentation {
    Explicit,
    ImplicitConstant,
    ImplicitLinear,
    ImplicitSaw,
    RawLinear,
    RawPolynomial,
    Formula,
    ExternalComponent,
    RawLinearExternal,
    RawPolynomialExternal,
    RawLinearCalibrated,
    RawLinearCalibratedExternal,
}

impl SequenceRepresentation {
    pub fn from_code(code: i32) -> Result<Self> {
        use SequenceRepresentation::*;
        Ok(match code {
            0 => Explicit,
            1 => ImplicitConstant,
            2 => ImplicitLinear,
            3 => ImplicitSaw,
            4 => RawLinear,
            5 => RawPolynomial,
            6 => Formula,
            7 => ExternalComponent,
            8 => RawLinearExternal,
            9 => RawPolynomialExternal,
            10 => RawLinearCalibrated,
            11 => RawLinearCalibratedExternal,
            other => {
                return Err(Error::UnsupportedDataType(format!(
                    "sequence representation {other}"
                )));
            }
        })
    }

    pub fn code(self) -> i32 {
        use SequenceRepresentation::*;
        match self {
            Explicit => 0,
            ImplicitConstant => 1,
            ImplicitLinear => 2,
            ImplicitSaw => 3,
            RawLinear => 4,
            RawPolynomial => 5,
            Formula => 6,
            ExternalComponent => 7,
            RawLinearExternal => 8,
            RawPolynomialExternal => 9,
            RawLinearCalibrated => 10,
            RawLinearCalibratedExternal => 11,
        }
    }

    pub fn is_external(self) -> bool {
        matches!(
            self,
            SequenceRepresentation::ExternalComponent
                | SequenceRepresentation::RawLinearExternal
                | SequenceRepresentation::RawPolynomialExternal
                | SequenceRepresentation::RawLinearCalibratedExternal
        )
    }
}

/// Everything the decoder needs to know about one `AoLocalColumn` instance.
#[derive(Debug, Clone)]
pub struct LocalColumn {
    pub instance: InstanceRef,
    pub name: String,
    pub representation: SequenceRepresentation,
    pub global_flag: Flag,
    pub generation_parameters: Vec<f64>,
    /// Row count of the owning SubMatrix.
    pub rows: u64,
    pub conversion: ConversionRule,
    /// Materialized values and their flags (explicit and raw_linear).
    pub explicit: Option<(Sequence, Validity)>,
    /// Fragments sorted by ordinal number.
    pub components: Vec<ExternalComponent>,
}

impl LocalColumn {
    pub fn load(model: &Model, column: InstanceRef) -> Result<Self> {
        let instance = model.instance(column)?;
        let element = model.element(column.element)?;

        let representation = model
            .value_by_base(column, "sequence_representation")?
            .and_then(|v| v.value.as_i64())
            .ok_or_else(|| {
                Error::MalformedValue(format!(
                    "{} {:?} has no sequence representation",
                    element.name, instance.name
                ))
            })?;
        let representation = SequenceRepresentation::from_code(representation as i32)?;

        let global_flag = model
            .value_by_base(column, "global_flag")?
            .and_then(|v| v.value.as_i64())
            .map_or(Flag::VALID, |f| Flag(f as u16));

        let generation_parameters = match element.attribute_by_base("generation_parameters") {
            Some(attr) => match model.value(column, &attr.name)?.map(|v| &v.value) {
                Some(Value::Sequence(Sequence::Double(p))) => p.clone(),
                Some(Value::Sequence(seq)) => (0..seq.len()).filter_map(|i| seq.get_f64(i)).collect(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        };

        let conversion = match element.attribute(CONVERSION_RULE) {
            Some(_) => match model.value(column, CONVERSION_RULE)?.and_then(|v| v.value.as_str()) {
                Some(json) => ConversionRule::from_json(json)?,
                None => ConversionRule::Identity,
            },
            None => ConversionRule::Identity,
        };

        let submatrix = model.related_by_base(column, "submatrix")?;
        let [submatrix] = submatrix.as_slice() else {
            return Err(Error::MalformedValue(format!(
                "{} {:?} belongs to {} submatrices",
                element.name,
                instance.name,
                submatrix.len()
            )));
        };
        let rows = model
            .value_by_base(*submatrix, "number_of_rows")?
            .and_then(|v| v.value.as_i64())
            .unwrap_or(0);
        let rows = u64::try_from(rows)
            .map_err(|_| Error::MalformedValue(format!("negative row count {rows}")))?;

        let explicit = match model.value_by_base(column, "values")? {
            Some(stored) => match &stored.value {
                Value::Sequence(seq) => Some((seq.clone(), stored.validity.clone())),
                _ => None,
            },
            None => None,
        };

        let mut components = Vec::new();
        if representation.is_external() {
            for component in model.related_by_base(column, "external_component")? {
                components.push(ExternalComponent::load(model, component)?);
            }
            components.sort_by_key(|c| c.ordinal);
        }

        Ok(Self {
            instance: column,
            name: instance.name.clone(),
            representation,
            global_flag,
            generation_parameters,
            rows,
            conversion,
            explicit,
            components,
        })
    }

    /// `(offset, factor)` from the generation parameters.
    pub fn linear_parameters(&self) -> Result<(f64, f64)> {
        match self.generation_parameters.as_slice() {
            [offset, factor, ..] => Ok((*offset, *factor)),
            other => Err(Error::MalformedValue(format!(
                "{} needs 2 generation parameters, has {}",
                self.name,
                other.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representation_codes() {
        for code in 0..12 {
            assert_eq!(SequenceRepresentation::from_code(code).unwrap().code(), code);
        }
        assert!(SequenceRepresentation::from_code(12).is_err());
        assert!(SequenceRepresentation::RawLinearExternal.is_external());
        assert!(!SequenceRepresentation::ImplicitLinear.is_external());
    }
}

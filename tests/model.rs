use mdf_ods::model::{Cardinality, DataType, Flag, Model, Sequence, Validity, Value};
use mdf_ods::{Error, ErrorKind, ModelQuery, Result};

#[test]
fn schema_over_base_model() -> Result<()> {
    let mut model = Model::new("asam35")?;
    assert_eq!(model.base().version, "asam35");
    let test = model.create_application_element("Test", "AoSubTest")?;
    let meas = model.create_application_element("Measurement", "AoMeasurement")?;

    let element = model.element(meas)?;
    assert_eq!(element.base_name, "AoMeasurement");
    assert!(element.attribute("measurement_begin").is_none());
    model.add_base_attribute(meas, "measurement_begin")?;
    model.add_base_attribute(meas, "measurement_begin")?;
    assert_eq!(
        model.element(meas)?.attribute("measurement_begin").map(|a| a.data_type),
        Some(DataType::Date)
    );

    model.create_attribute(meas, "driver", DataType::String, None)?;
    let err = model
        .create_attribute(meas, "driver", DataType::Long, None)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));

    // base relation seeded between the two anchored elements
    let (_, name) = model.relation_end_by_base(meas, "test")?;
    assert_eq!(name, "test");
    assert!(model.relation_end(test, "children").is_ok());
    Ok(())
}

#[test]
fn unknown_base_model_version() {
    let err = Model::new("asam99").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
}

#[test]
fn values_are_type_checked() -> Result<()> {
    let mut model = Model::new("asam35")?;
    let sm = model.create_application_element("SubMatrix", "AoSubMatrix")?;
    let lc = model.create_application_element("LocalColumn", "AoLocalColumn")?;
    let matrix = model.create_instance(sm, "cg 0")?;
    let column = model.create_instance(lc, "speed")?;

    model.set(matrix, "number_of_rows", Value::Long(3))?;
    let err = model
        .set(matrix, "number_of_rows", Value::Double(3.0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    let err = model.set(matrix, "nonexistent", Value::Long(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownAttribute);

    // enumeration items are validated
    model.set(column, "sequence_representation", Value::Enum(7))?;
    let err = model
        .set(column, "sequence_representation", Value::Enum(99))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    // values take any sequence, with one flag per element
    let values = Sequence::Double(vec![1.0, 2.0, 3.0]);
    let flags = vec![Flag::VALID, Flag::INVALID, Flag::VALID];
    model.set_value(
        column,
        "values",
        Value::Sequence(values.clone()),
        Validity::PerElement(flags),
    )?;
    let stored = model.value(column, "values")?.unwrap();
    assert_eq!(stored.value, Value::Sequence(values));
    assert!(!stored.validity.flag(1).is_valid());
    assert!(stored.validity.flag(2).is_valid());

    let err = model
        .set_value(
            column,
            "values",
            Value::Sequence(Sequence::Long(vec![1, 2])),
            Validity::PerElement(vec![Flag::VALID]),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedValue);
    Ok(())
}

#[test]
fn renaming_through_the_name_attribute() -> Result<()> {
    let mut model = Model::new("asam35")?;
    let unit = model.create_application_element("Unit", "AoUnit")?;
    let rpm = model.create_instance(unit, "rpm")?;
    model.set(rpm, "name", Value::String("1/min".into()))?;
    assert_eq!(model.instance(rpm)?.name, "1/min");
    assert!(model.set(rpm, "id", Value::LongLong(5)).is_err());
    Ok(())
}

#[test]
fn cardinality_exceeded_leaves_graph_unchanged() -> Result<()> {
    let mut model = Model::new("asam35")?;
    let mq = model.create_application_element("MeaQuantity", "AoMeasurementQuantity")?;
    let unit = model.create_application_element("Unit", "AoUnit")?;
    let speed = model.create_instance(mq, "speed")?;
    let kmh = model.create_instance(unit, "km/h")?;
    let mph = model.create_instance(unit, "mph")?;

    model.create_relation(speed, "unit", kmh)?;
    // linking the same pair again is a no-op
    model.create_relation(speed, "unit", kmh)?;
    let err = model.create_relation(speed, "unit", mph).unwrap_err();
    assert!(matches!(err, Error::CardinalityExceeded { max: 1, .. }));

    assert_eq!(model.related(speed, "unit")?, vec![kmh]);
    assert_eq!(model.related(kmh, "measurement_quantities")?, vec![speed]);
    assert!(model.related(mph, "measurement_quantities")?.is_empty());

    model.remove_relation(speed, "unit", kmh)?;
    assert!(model.related(kmh, "measurement_quantities")?.is_empty());
    model.create_relation(speed, "unit", mph)?;
    Ok(())
}

#[test]
fn explicit_relations_and_removal() -> Result<()> {
    let mut model = Model::new("asam35")?;
    let unit = model.create_application_element("Unit", "AoUnit")?;
    let dim = model.create_application_element("PhysDimension", "AoPhysicalDimension")?;
    model.create_application_relation(
        unit,
        dim,
        "alternatives",
        "alternative_units",
        Cardinality::MANY,
        Cardinality::MANY,
    )?;
    let err = model
        .create_application_relation(
            unit,
            dim,
            "alternatives",
            "other",
            Cardinality::MANY,
            Cardinality::MANY,
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));

    let volt = model.create_instance(unit, "V")?;
    let length = model.create_instance(dim, "length")?;
    model.create_relation(volt, "alternatives", length)?;
    model.create_relation(volt, "phys_dimension", length)?;
    assert_eq!(model.related(length, "alternative_units")?, vec![volt]);

    let err = model.create_relation(volt, "alternatives", volt).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    model.remove_instance(volt)?;
    assert!(model.related(length, "alternative_units")?.is_empty());
    assert!(model.related(length, "units")?.is_empty());
    assert_eq!(model.instance(volt).unwrap_err().kind(), ErrorKind::UnknownAttribute);
    Ok(())
}

#[test]
fn queries_by_pattern() -> Result<()> {
    let mut model = Model::new("asam35")?;
    let sm = model.create_application_element("SubMatrix", "AoSubMatrix")?;
    let lc = model.create_application_element("LocalColumn", "AoLocalColumn")?;
    let matrix = model.create_instance(sm, "engine")?;
    for name in ["Engine.Speed", "Engine.Torque", "Vehicle.Speed"] {
        let column = model.create_instance(lc, name)?;
        model.create_relation(column, "submatrix", matrix)?;
    }

    assert_eq!(model.find_elements("local*")?, vec![lc]);
    assert_eq!(model.find_instances(lc, "engine.*")?.len(), 2);
    assert_eq!(model.find_instances(lc, "*.speed")?.len(), 2);
    assert_eq!(model.navigate(matrix, "local_*")?.len(), 3);
    assert!(model.navigate(matrix, "nothing")?.is_empty());
    assert_eq!(model.find_relations(lc, "sub*")?.len(), 1);
    Ok(())
}

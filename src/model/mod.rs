//! ODS-style data model: base vocabulary, application schema and instances.
//!
//! A [`Model`] is created against one base model version. Application
//! elements are derived from base elements, instances hold typed attribute
//! values with validity [`Flag`]s and are connected through bidirectional
//! relations whose cardinality is enforced on every edge.
//!
//! ```
//! use mdf_ods::model::{Model, Value};
//!
//! let mut model = Model::new("asam35").unwrap();
//! let meas = model.create_application_element("Measurement", "AoMeasurement").unwrap();
//! let sm = model.create_application_element("SubMatrix", "AoSubMatrix").unwrap();
//! let m = model.create_instance(meas, "run 1").unwrap();
//! let matrix = model.create_instance(sm, "group 0").unwrap();
//! model.set(matrix, "number_of_rows", Value::Long(100)).unwrap();
//! model.create_relation(matrix, "measurement", m).unwrap();
//! assert_eq!(model.related(m, "submatrices").unwrap(), vec![matrix]);
//! ```

mod application;
pub mod base;
mod graph;
mod instance;
mod query;
mod value;

pub use application::{
    ApplicationAttribute, ApplicationElement, ApplicationRelation, Cardinality, ElementId,
    RelationEnd, RelationId,
};
pub use graph::Model;
pub use instance::{AttributeValue, InstanceElement, InstanceRef};
pub use query::ModelQuery;
pub use value::{DataType, Flag, Sequence, Validity, Value};

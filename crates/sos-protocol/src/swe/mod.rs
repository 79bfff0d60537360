//! SWE Common data components.
//!
//! A result structure is a tree of components: scalars at the leaves and
//! records, vectors, choices and arrays above them. Each component may carry
//! a `definition` URI naming the phenomenon it represents; pruning selects a
//! subtree by definition.

pub mod prune;
pub mod xml;

use serde::Serialize;

pub use prune::{prune, DefinitionSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataComponent {
    Scalar(Scalar),
    Record(DataRecord),
    Vector(Vector),
    Choice(DataChoice),
    Array(DataArray),
}

impl DataComponent {
    pub fn definition(&self) -> Option<&str> {
        match self {
            DataComponent::Scalar(c) => c.definition.as_deref(),
            DataComponent::Record(c) => c.definition.as_deref(),
            DataComponent::Vector(c) => c.definition.as_deref(),
            DataComponent::Choice(c) => c.definition.as_deref(),
            DataComponent::Array(c) => c.definition.as_deref(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            DataComponent::Scalar(c) => c.label.as_deref(),
            DataComponent::Record(c) => c.label.as_deref(),
            DataComponent::Vector(c) => c.label.as_deref(),
            DataComponent::Choice(c) => c.label.as_deref(),
            DataComponent::Array(c) => c.label.as_deref(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, DataComponent::Scalar(_))
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        match self {
            DataComponent::Scalar(_) => 0,
            DataComponent::Record(c) => c.fields.len(),
            DataComponent::Vector(c) => c.coordinates.len(),
            DataComponent::Choice(c) => c.items.len(),
            DataComponent::Array(_) => 1,
        }
    }

    /// Definitions of this component and every descendant, depth first.
    pub fn definitions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_definitions(&mut out);
        out
    }

    fn collect_definitions<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(definition) = self.definition() {
            out.push(definition);
        }
        match self {
            DataComponent::Scalar(_) => {}
            DataComponent::Record(c) => {
                c.fields.iter().for_each(|f| f.component.collect_definitions(out))
            }
            DataComponent::Choice(c) => {
                c.items.iter().for_each(|f| f.component.collect_definitions(out))
            }
            DataComponent::Vector(c) => out.extend(
                c.coordinates
                    .iter()
                    .filter_map(|coord| coord.scalar.definition.as_deref()),
            ),
            DataComponent::Array(c) => c.element_type.component.collect_definitions(out),
        }
    }

    /// See [`prune`].
    pub fn pruned(&self, selected: &DefinitionSet) -> Option<DataComponent> {
        prune(self, selected)
    }
}

// === Scalars ===

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scalar {
    pub kind: ScalarKind,
    pub definition: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScalarKind {
    Quantity { uom: Option<String> },
    Count,
    Boolean,
    Text,
    Category { code_space: Option<String> },
    Time { uom: Option<String> },
}

impl ScalarKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            ScalarKind::Quantity { .. } => "Quantity",
            ScalarKind::Count => "Count",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Text => "Text",
            ScalarKind::Category { .. } => "Category",
            ScalarKind::Time { .. } => "Time",
        }
    }
}

impl Scalar {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            definition: None,
            label: None,
        }
    }

    pub fn quantity(definition: &str, uom: &str) -> Self {
        Self::new(ScalarKind::Quantity {
            uom: Some(uom.to_string()),
        })
        .with_definition(definition)
    }

    pub fn time(definition: &str) -> Self {
        Self::new(ScalarKind::Time {
            uom: Some(ISO_8601_UOM.to_string()),
        })
        .with_definition(definition)
    }

    pub fn with_definition(mut self, definition: &str) -> Self {
        self.definition = Some(definition.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Unit reference used for ISO 8601 time values.
pub const ISO_8601_UOM: &str = "http://www.opengis.net/def/uom/ISO-8601/0/Gregorian";

// === Composites ===

/// A named child of a record or choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub component: DataComponent,
}

impl Field {
    pub fn new(name: impl Into<String>, component: DataComponent) -> Self {
        Self {
            name: name.into(),
            component,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataRecord {
    pub definition: Option<String>,
    pub label: Option<String>,
    pub fields: Vec<Field>,
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, definition: &str) -> Self {
        self.definition = Some(definition.to_string());
        self
    }

    pub fn field(mut self, name: &str, component: impl Into<DataComponent>) -> Self {
        self.fields.push(Field::new(name, component.into()));
        self
    }
}

/// A vector whose coordinates are scalars in one reference frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Vector {
    pub definition: Option<String>,
    pub label: Option<String>,
    pub reference_frame: Option<String>,
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinate {
    pub name: String,
    pub scalar: Scalar,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataChoice {
    pub definition: Option<String>,
    pub label: Option<String>,
    pub items: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataArray {
    pub definition: Option<String>,
    pub label: Option<String>,
    pub element_count: ElementCount,
    /// The single element type every array entry conforms to.
    pub element_type: Box<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementCount {
    Fixed(u64),
    /// Count given by the encoded data.
    Runtime,
}

impl From<Scalar> for DataComponent {
    fn from(scalar: Scalar) -> Self {
        DataComponent::Scalar(scalar)
    }
}

impl From<DataRecord> for DataComponent {
    fn from(record: DataRecord) -> Self {
        DataComponent::Record(record)
    }
}

impl From<Vector> for DataComponent {
    fn from(vector: Vector) -> Self {
        DataComponent::Vector(vector)
    }
}

impl From<DataChoice> for DataComponent {
    fn from(choice: DataChoice) -> Self {
        DataComponent::Choice(choice)
    }
}

impl From<DataArray> for DataComponent {
    fn from(array: DataArray) -> Self {
        DataComponent::Array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_walk_whole_tree() {
        let record: DataComponent = DataRecord::new()
            .with_definition("urn:record")
            .field("time", Scalar::time("urn:time"))
            .field(
                "inner",
                DataRecord::new().field("t", Scalar::quantity("urn:temp", "Cel")),
            )
            .into();

        assert_eq!(record.definitions(), vec!["urn:record", "urn:time", "urn:temp"]);
        assert_eq!(record.child_count(), 2);
        assert!(!record.is_scalar());
    }
}

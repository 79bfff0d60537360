//! Definition-based pruning of result structures.
//!
//! Rules, applied bottom-up to a copy of the tree:
//! 1. A component whose definition is selected is kept whole.
//! 2. A child with a definition that is not selected is dropped without
//!    looking inside it.
//! 3. A child without a definition is kept; a composite child is pruned
//!    first and dropped when nothing is left in it.
//!
//! Scalars are never emptied, so a scalar reached by rule 3 always survives.

use std::collections::HashSet;

use super::{DataArray, DataChoice, DataComponent, DataRecord, Field, Vector};

/// Definitions the caller asked for.
pub type DefinitionSet = HashSet<String>;

/// Prune `component` against `selected`. `None` means the component ended
/// up with no children; the input is never modified.
pub fn prune(component: &DataComponent, selected: &DefinitionSet) -> Option<DataComponent> {
    if is_selected(component.definition(), selected) {
        return Some(component.clone());
    }

    match component {
        DataComponent::Scalar(_) => Some(component.clone()),
        DataComponent::Record(record) => {
            let fields = prune_fields(&record.fields, selected);
            (!fields.is_empty()).then(|| {
                DataComponent::Record(DataRecord {
                    definition: record.definition.clone(),
                    label: record.label.clone(),
                    fields,
                })
            })
        }
        DataComponent::Choice(choice) => {
            let items = prune_fields(&choice.items, selected);
            (!items.is_empty()).then(|| {
                DataComponent::Choice(DataChoice {
                    definition: choice.definition.clone(),
                    label: choice.label.clone(),
                    items,
                })
            })
        }
        DataComponent::Vector(vector) => {
            let coordinates: Vec<_> = vector
                .coordinates
                .iter()
                .filter(|coord| accepts(coord.scalar.definition.as_deref(), selected))
                .cloned()
                .collect();
            (!coordinates.is_empty()).then(|| {
                DataComponent::Vector(Vector {
                    definition: vector.definition.clone(),
                    label: vector.label.clone(),
                    reference_frame: vector.reference_frame.clone(),
                    coordinates,
                })
            })
        }
        DataComponent::Array(array) => prune_field(&array.element_type, selected).map(|element| {
            DataComponent::Array(DataArray {
                definition: array.definition.clone(),
                label: array.label.clone(),
                element_count: array.element_count,
                element_type: Box::new(element),
            })
        }),
    }
}

fn prune_fields(fields: &[Field], selected: &DefinitionSet) -> Vec<Field> {
    fields
        .iter()
        .filter_map(|field| prune_field(field, selected))
        .collect()
}

fn prune_field(field: &Field, selected: &DefinitionSet) -> Option<Field> {
    if !accepts(field.component.definition(), selected) {
        return None;
    }
    prune(&field.component, selected).map(|component| Field {
        name: field.name.clone(),
        component,
    })
}

fn is_selected(definition: Option<&str>, selected: &DefinitionSet) -> bool {
    definition.is_some_and(|d| selected.contains(d))
}

/// Children without a definition pass; the rest must be selected.
fn accepts(definition: Option<&str>, selected: &DefinitionSet) -> bool {
    definition.map_or(true, |d| selected.contains(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swe::{Coordinate, ElementCount, Scalar, ScalarKind};

    fn set(definitions: &[&str]) -> DefinitionSet {
        definitions.iter().map(|d| d.to_string()).collect()
    }

    fn weather_record() -> DataComponent {
        DataRecord::new()
            .with_definition("urn:weather")
            .field("phenomenonTime", Scalar::time("urn:time"))
            .field("temperature", Scalar::quantity("urn:temp", "Cel"))
            .field("humidity", Scalar::quantity("urn:hum", "%"))
            .into()
    }

    #[test]
    fn test_selected_root_is_kept_whole() {
        let tree = weather_record();
        assert_eq!(prune(&tree, &set(&["urn:weather"])), Some(tree));
    }

    #[test]
    fn test_unselected_children_are_dropped() {
        let pruned = prune(&weather_record(), &set(&["urn:temp"])).unwrap();
        match pruned {
            DataComponent::Record(record) => {
                assert_eq!(record.fields.len(), 1);
                assert_eq!(record.fields[0].name, "temperature");
                assert_eq!(record.definition.as_deref(), Some("urn:weather"));
            }
            other => panic!("Expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_nothing_selected_prunes_to_none() {
        assert_eq!(prune(&weather_record(), &set(&["urn:other"])), None);
        assert_eq!(prune(&weather_record(), &DefinitionSet::new()), None);
    }

    #[test]
    fn test_undefined_scalar_always_survives() {
        let tree: DataComponent = DataRecord::new()
            .field("id", Scalar::new(ScalarKind::Text))
            .field("temperature", Scalar::quantity("urn:temp", "Cel"))
            .into();
        let pruned = prune(&tree, &DefinitionSet::new()).unwrap();
        assert_eq!(pruned.child_count(), 1);
        assert_eq!(pruned.definitions(), Vec::<&str>::new());
    }

    #[test]
    fn test_unselected_composite_is_not_searched() {
        // The nested temperature is selected, but its parent is not.
        let tree: DataComponent = DataRecord::new()
            .field("time", Scalar::time("urn:time"))
            .field(
                "station",
                DataRecord::new()
                    .with_definition("urn:station")
                    .field("temperature", Scalar::quantity("urn:temp", "Cel")),
            )
            .into();
        let pruned = prune(&tree, &set(&["urn:time", "urn:temp"])).unwrap();
        assert_eq!(pruned.definitions(), vec!["urn:time"]);
    }

    #[test]
    fn test_emptied_inner_record_is_removed() {
        let tree: DataComponent = DataRecord::new()
            .field("time", Scalar::time("urn:time"))
            .field(
                "inner",
                DataRecord::new().field("humidity", Scalar::quantity("urn:hum", "%")),
            )
            .into();
        let pruned = prune(&tree, &set(&["urn:time"])).unwrap();
        assert_eq!(pruned.child_count(), 1);
    }

    #[test]
    fn test_vector_and_array() {
        let vector = Vector {
            reference_frame: Some("http://www.opengis.net/def/crs/EPSG/0/4979".to_string()),
            coordinates: vec![
                Coordinate {
                    name: "lat".to_string(),
                    scalar: Scalar::quantity("urn:lat", "deg"),
                },
                Coordinate {
                    name: "lon".to_string(),
                    scalar: Scalar::quantity("urn:lon", "deg"),
                },
            ],
            ..Default::default()
        };
        let array: DataComponent = DataArray {
            definition: None,
            label: None,
            element_count: ElementCount::Runtime,
            element_type: Box::new(Field::new(
                "point",
                DataRecord::new().field("location", vector).into(),
            )),
        }
        .into();

        let pruned = prune(&array, &set(&["urn:lat"])).unwrap();
        assert_eq!(pruned.definitions(), vec!["urn:lat"]);
        assert_eq!(prune(&array, &set(&["urn:alt"])), None);
    }

    #[test]
    fn test_input_is_unchanged() {
        let tree = weather_record();
        let before = tree.clone();
        let _ = prune(&tree, &set(&["urn:temp"]));
        assert_eq!(tree, before);
    }
}

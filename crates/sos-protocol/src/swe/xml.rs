//! SWE Common 2.0 XML sub-reader and sub-writer.
//!
//! Used by the result template and coverage range type codecs. The writer
//! emits `swe:` and `xlink:` prefixed names; callers register both prefixes.

use ows_common::{CodecError, CodecResult, XmlElement};

use super::{
    Coordinate, DataArray, DataChoice, DataComponent, DataRecord, ElementCount, Field, Scalar,
    ScalarKind, Vector,
};
use crate::model::TextEncoding;

/// Read the component rooted at `element`.
pub fn read_component(element: &XmlElement) -> CodecResult<DataComponent> {
    let definition = element.attribute("definition").map(str::to_string);
    let label = element.text_at("swe:label").map(str::to_string);

    let component = match element.local_name() {
        "DataRecord" => DataComponent::Record(DataRecord {
            definition,
            label,
            fields: read_fields(element, "swe:field")?,
        }),
        "DataChoice" => DataComponent::Choice(DataChoice {
            definition,
            label,
            items: read_fields(element, "swe:item")?,
        }),
        "Vector" => {
            let mut coordinates = Vec::new();
            for coordinate in element.children_at("swe:coordinate") {
                let name = required_name(coordinate)?;
                let scalar = match read_component(only_child(coordinate)?)? {
                    DataComponent::Scalar(scalar) => scalar,
                    _ => {
                        return Err(CodecError::Malformed(format!(
                            "Vector coordinate '{}' must be a scalar",
                            name
                        )))
                    }
                };
                coordinates.push(Coordinate { name, scalar });
            }
            DataComponent::Vector(Vector {
                definition,
                label,
                reference_frame: element.attribute("referenceFrame").map(str::to_string),
                coordinates,
            })
        }
        "DataArray" => {
            let element_type = element
                .child("swe:elementType")
                .ok_or_else(|| CodecError::MissingElement("swe:elementType".to_string()))?;
            let element_count = match element.text_at("swe:elementCount/swe:Count/swe:value") {
                Some(value) => ElementCount::Fixed(value.parse().map_err(|_| {
                    CodecError::Malformed(format!("Invalid element count '{}'", value))
                })?),
                None => ElementCount::Runtime,
            };
            DataComponent::Array(DataArray {
                definition,
                label,
                element_count,
                element_type: Box::new(Field {
                    name: required_name(element_type)?,
                    component: read_component(only_child(element_type)?)?,
                }),
            })
        }
        local => {
            let kind = read_scalar_kind(local, element)?;
            DataComponent::Scalar(Scalar {
                kind,
                definition,
                label,
            })
        }
    };
    Ok(component)
}

fn read_scalar_kind(local: &str, element: &XmlElement) -> CodecResult<ScalarKind> {
    let uom = || {
        element.child("swe:uom").and_then(|uom| {
            uom.attribute("code")
                .or_else(|| uom.attribute("xlink:href"))
                .map(str::to_string)
        })
    };
    match local {
        "Quantity" => Ok(ScalarKind::Quantity { uom: uom() }),
        "Count" => Ok(ScalarKind::Count),
        "Boolean" => Ok(ScalarKind::Boolean),
        "Text" => Ok(ScalarKind::Text),
        "Category" => Ok(ScalarKind::Category {
            code_space: element
                .child("swe:codeSpace")
                .and_then(|cs| cs.attribute("xlink:href"))
                .map(str::to_string),
        }),
        "Time" => Ok(ScalarKind::Time { uom: uom() }),
        other => Err(CodecError::UnexpectedElement {
            expected: "a SWE data component".to_string(),
            found: other.to_string(),
        }),
    }
}

fn read_fields(element: &XmlElement, path: &str) -> CodecResult<Vec<Field>> {
    element
        .children_at(path)
        .into_iter()
        .map(|field| {
            Ok(Field {
                name: required_name(field)?,
                component: read_component(only_child(field)?)?,
            })
        })
        .collect()
}

fn required_name(element: &XmlElement) -> CodecResult<String> {
    element
        .attribute("name")
        .map(str::to_string)
        .ok_or_else(|| CodecError::Malformed(format!("'{}' has no name attribute", element.name())))
}

fn only_child(element: &XmlElement) -> CodecResult<&XmlElement> {
    match element.elements() {
        [child] => Ok(child),
        [] => Err(CodecError::MissingElement(format!(
            "component inside '{}'",
            element.name()
        ))),
        _ => Err(CodecError::Malformed(format!(
            "'{}' must hold exactly one component",
            element.name()
        ))),
    }
}

/// Write `component` as a `swe:` element tree.
pub fn write_component(component: &DataComponent) -> XmlElement {
    let (name, definition, label) = match component {
        DataComponent::Scalar(c) => (c.kind.element_name(), &c.definition, &c.label),
        DataComponent::Record(c) => ("DataRecord", &c.definition, &c.label),
        DataComponent::Vector(c) => ("Vector", &c.definition, &c.label),
        DataComponent::Choice(c) => ("DataChoice", &c.definition, &c.label),
        DataComponent::Array(c) => ("DataArray", &c.definition, &c.label),
    };

    let mut element = XmlElement::new(format!("swe:{}", name));
    if let Some(definition) = definition {
        element.set_attribute("definition", definition.as_str());
    }
    if let DataComponent::Vector(vector) = component {
        if let Some(frame) = &vector.reference_frame {
            element.set_attribute("referenceFrame", frame.as_str());
        }
    }
    if let Some(label) = label {
        element.add_text("swe:label", label.as_str());
    }

    match component {
        DataComponent::Scalar(scalar) => write_scalar_body(&mut element, &scalar.kind),
        DataComponent::Record(record) => write_fields(&mut element, "swe:field", &record.fields),
        DataComponent::Choice(choice) => write_fields(&mut element, "swe:item", &choice.items),
        DataComponent::Vector(vector) => {
            for coordinate in &vector.coordinates {
                let wrapper = element.add_path("swe:coordinate");
                wrapper.set_attribute("name", coordinate.name.as_str());
                wrapper.push(write_component(&DataComponent::Scalar(coordinate.scalar.clone())));
            }
        }
        DataComponent::Array(array) => {
            let count = element.add_path("swe:elementCount");
            if let ElementCount::Fixed(n) = array.element_count {
                count.add_text("swe:Count/swe:value", n.to_string());
            }
            let element_type = element.add_path("swe:elementType");
            element_type.set_attribute("name", array.element_type.name.as_str());
            element_type.push(write_component(&array.element_type.component));
        }
    }
    element
}

fn write_scalar_body(element: &mut XmlElement, kind: &ScalarKind) {
    match kind {
        ScalarKind::Quantity { uom: Some(uom) } | ScalarKind::Time { uom: Some(uom) } => {
            let uom_element = element.add_path("swe:uom");
            if uom.contains(':') {
                uom_element.set_attribute("xlink:href", uom.as_str());
            } else {
                uom_element.set_attribute("code", uom.as_str());
            }
        }
        ScalarKind::Category {
            code_space: Some(code_space),
        } => {
            element
                .add_path("swe:codeSpace")
                .set_attribute("xlink:href", code_space.as_str());
        }
        _ => {}
    }
}

fn write_fields(element: &mut XmlElement, path: &str, fields: &[Field]) {
    for field in fields {
        let wrapper = element.add_path(path);
        wrapper.set_attribute("name", field.name.as_str());
        wrapper.push(write_component(&field.component));
    }
}

/// Read `swe:TextEncoding` attributes.
pub fn read_text_encoding(element: &XmlElement) -> CodecResult<TextEncoding> {
    if element.local_name() != "TextEncoding" {
        return Err(CodecError::UnexpectedElement {
            expected: "swe:TextEncoding".to_string(),
            found: element.name().to_string(),
        });
    }
    let separator = |name: &str| {
        element
            .attribute(name)
            .map(str::to_string)
            .ok_or_else(|| CodecError::Malformed(format!("swe:TextEncoding has no {}", name)))
    };
    Ok(TextEncoding {
        token_separator: separator("tokenSeparator")?,
        block_separator: separator("blockSeparator")?,
        decimal_separator: element.attribute("decimalSeparator").map(str::to_string),
    })
}

pub fn write_text_encoding(encoding: &TextEncoding) -> XmlElement {
    let mut element = XmlElement::new("swe:TextEncoding");
    if let Some(decimal) = &encoding.decimal_separator {
        element.set_attribute("decimalSeparator", decimal.as_str());
    }
    element.set_attribute("tokenSeparator", encoding.token_separator.as_str());
    element.set_attribute("blockSeparator", encoding.block_separator.as_str());
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_common::namespaces::{SWE_20, XLINK};
    use ows_common::NamespaceContext;

    const RECORD: &str = r#"<swe:DataRecord xmlns:swe="http://www.opengis.net/swe/2.0"
        xmlns:xlink="http://www.w3.org/1999/xlink" definition="urn:weather">
      <swe:field name="phenomenonTime">
        <swe:Time definition="http://www.opengis.net/def/property/OGC/0/PhenomenonTime">
          <swe:uom xlink:href="http://www.opengis.net/def/uom/ISO-8601/0/Gregorian"/>
        </swe:Time>
      </swe:field>
      <swe:field name="air_temperature">
        <swe:Quantity definition="http://sweet.jpl.nasa.gov/2.0/atmoThermo.owl#Temperature">
          <swe:label>Air temperature</swe:label>
          <swe:uom code="Cel"/>
        </swe:Quantity>
      </swe:field>
      <swe:field name="quality">
        <swe:Category>
          <swe:codeSpace xlink:href="urn:quality-flags"/>
        </swe:Category>
      </swe:field>
    </swe:DataRecord>"#;

    #[test]
    fn test_read_record() {
        let element = XmlElement::parse(RECORD).unwrap();
        let component = read_component(&element).unwrap();
        let record = match &component {
            DataComponent::Record(record) => record,
            other => panic!("Expected record, got {:?}", other),
        };
        assert_eq!(record.definition.as_deref(), Some("urn:weather"));
        assert_eq!(record.fields.len(), 3);
        assert_eq!(component.label(), None);
        assert_eq!(record.fields[1].component.label(), Some("Air temperature"));
        match &record.fields[1].component {
            DataComponent::Scalar(Scalar {
                kind: ScalarKind::Quantity { uom },
                ..
            }) => assert_eq!(uom.as_deref(), Some("Cel")),
            other => panic!("Expected quantity, got {:?}", other),
        }
        match &record.fields[2].component {
            DataComponent::Scalar(Scalar {
                kind: ScalarKind::Category { code_space },
                definition,
                ..
            }) => {
                assert_eq!(code_space.as_deref(), Some("urn:quality-flags"));
                assert!(definition.is_none());
            }
            other => panic!("Expected category, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_read_keeps_tree() {
        let element = XmlElement::parse(RECORD).unwrap();
        let component = read_component(&element).unwrap();

        let mut ns = NamespaceContext::new();
        ns.register("swe", SWE_20);
        ns.register("xlink", XLINK);
        let xml = write_component(&component).to_xml_string(&ns).unwrap();
        let reread = read_component(&XmlElement::parse(&xml).unwrap()).unwrap();
        assert_eq!(reread, component);
    }

    #[test]
    fn test_array_with_fixed_count() {
        let xml = r#"<swe:DataArray xmlns:swe="http://www.opengis.net/swe/2.0">
            <swe:elementCount><swe:Count><swe:value>24</swe:value></swe:Count></swe:elementCount>
            <swe:elementType name="hour"><swe:Count definition="urn:hour"/></swe:elementType>
        </swe:DataArray>"#;
        match read_component(&XmlElement::parse(xml).unwrap()).unwrap() {
            DataComponent::Array(array) => {
                assert_eq!(array.element_count, ElementCount::Fixed(24));
                assert_eq!(array.element_type.name, "hour");
            }
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_structural_errors() {
        let unnamed = r#"<swe:DataRecord xmlns:swe="http://www.opengis.net/swe/2.0">
            <swe:field><swe:Count/></swe:field></swe:DataRecord>"#;
        assert!(matches!(
            read_component(&XmlElement::parse(unnamed).unwrap()),
            Err(CodecError::Malformed(_))
        ));

        let unknown = r#"<swe:Matrix xmlns:swe="http://www.opengis.net/swe/2.0"/>"#;
        assert!(matches!(
            read_component(&XmlElement::parse(unknown).unwrap()),
            Err(CodecError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn test_text_encoding() {
        let encoding = TextEncoding {
            token_separator: ",".to_string(),
            block_separator: "@@".to_string(),
            decimal_separator: Some(".".to_string()),
        };
        let element = write_text_encoding(&encoding);
        assert_eq!(read_text_encoding(&element).unwrap(), encoding);
    }
}

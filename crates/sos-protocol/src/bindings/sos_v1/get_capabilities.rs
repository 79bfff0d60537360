//! SOS 1.0 capabilities have no service-level content lists. The defaults
//! offerings inherit from are the allowed values of the operation
//! parameters: GetObservation `responseFormat` and `resultModel`, and
//! DescribeSensor `outputFormat`.

use ows_common::namespaces::{GML_311, SOS_10};
use ows_common::{
    CodecError, CodecResult, KvpParams, NamespaceContext, ReadResult, ValidationReport, XmlElement,
};

use super::register;
use crate::bindings::common::{self, expect_root};
use crate::bindings::filters::{
    find_gml_time, read_gml_envelope, read_gml_time, write_gml_envelope, write_gml_time,
};
use crate::bindings::ows::{self, ENVELOPE};
use crate::capabilities::{CapabilityLists, OfferingCapabilities, ServiceCapabilities};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{operations, versions, GetCapabilitiesRequest, GetCapabilitiesResponse};

const OFFERINGS: &str = "sos:Contents/sos:ObservationOfferingList/sos:ObservationOffering";

/// SOS 1.0 GetCapabilities.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetCapabilitiesV1;

impl Codec for GetCapabilitiesV1 {
    fn operation(&self) -> &'static str {
        operations::GET_CAPABILITIES
    }

    fn version(&self) -> &'static str {
        versions::SOS_100
    }
}

impl Reader<GetCapabilitiesRequest> for GetCapabilitiesV1 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<GetCapabilitiesRequest> {
        let mut report = ValidationReport::new();
        let request = ows::read_get_capabilities_kvp(self, params, &mut report);
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetCapabilitiesRequest> {
        let mut report = ValidationReport::new();
        let mut request = GetCapabilitiesRequest {
            common: common::read_xml_common(self, ENVELOPE, SOS_10, element, &mut report)?,
            ..Default::default()
        };
        ows::read_get_capabilities_body(element, &mut request);
        report.process()?;
        Ok(request)
    }
}

impl Writer<GetCapabilitiesRequest> for GetCapabilitiesV1 {
    fn write_kvp(&self, request: &GetCapabilitiesRequest) -> CodecResult<KvpParams> {
        ows::write_get_capabilities_kvp(self, request)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &GetCapabilitiesRequest,
    ) -> CodecResult<XmlElement> {
        common::refuse_extensions(self, &request.common.extensions)?;
        register(ns);
        let mut root = common::write_xml_common(self, ENVELOPE, ns, "sos", SOS_10, &request.common);
        ows::write_get_capabilities_body(ns, &mut root, request);
        Ok(root)
    }
}

impl Reader<GetCapabilitiesResponse> for GetCapabilitiesV1 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetCapabilitiesResponse> {
        expect_root(element, "Capabilities", SOS_10)?;
        let mut capabilities = ServiceCapabilities {
            version: element.attribute("version").unwrap_or(versions::SOS_100).to_string(),
            update_sequence: element.attribute("updateSequence").map(str::to_string),
            ..Default::default()
        };
        ows::read_service_sections(element, &mut capabilities);
        capabilities.defaults = defaults_from_operations(&capabilities);

        for offering in element.children_at(OFFERINGS) {
            capabilities.offerings.push(read_offering(offering)?);
        }
        capabilities.resolve();

        Ok(GetCapabilitiesResponse { capabilities })
    }
}

impl Writer<GetCapabilitiesResponse> for GetCapabilitiesV1 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &GetCapabilitiesResponse,
    ) -> CodecResult<XmlElement> {
        let capabilities = &response.capabilities;
        register(ns);
        ns.register("gml", GML_311);

        let mut root = XmlElement::new("sos:Capabilities");
        root.set_attribute("version", versions::SOS_100);
        if let Some(sequence) = &capabilities.update_sequence {
            root.set_attribute("updateSequence", sequence.as_str());
        }
        ows::write_service_sections(ns, &mut root, capabilities);

        let list = root.add_path("sos:Contents/sos:ObservationOfferingList");
        for (index, (offering, lists)) in capabilities.resolve_offerings().into_iter().enumerate() {
            write_offering(list.add_path("sos:ObservationOffering"), offering, &lists, index + 1);
        }
        Ok(root)
    }
}

fn defaults_from_operations(capabilities: &ServiceCapabilities) -> CapabilityLists {
    let allowed = |operation: &str, parameter: &str| {
        capabilities
            .operation(operation)
            .and_then(|op| op.parameter(parameter))
            .map(|p| p.allowed_values.clone())
            .unwrap_or_default()
    };

    CapabilityLists {
        response_formats: allowed(operations::GET_OBSERVATION, "responseFormat"),
        observation_types: allowed(operations::GET_OBSERVATION, "resultModel"),
        feature_of_interest_types: Vec::new(),
        encodings: allowed(operations::DESCRIBE_SENSOR, "outputFormat"),
    }
}

fn read_offering(element: &XmlElement) -> CodecResult<OfferingCapabilities> {
    let identifier = element
        .attribute("gml:id")
        .ok_or_else(|| CodecError::Malformed("sos:ObservationOffering without gml:id".to_string()))?;

    let mut offering = OfferingCapabilities::new(identifier);
    offering.name = element.text_at("gml:name").map(str::to_string);
    offering.procedures = common::text_list(element, "sos:procedure");
    offering.observable_properties = common::text_list(element, "sos:observedProperty");
    offering.lists.response_formats = common::text_list(element, "sos:responseFormat");
    offering.lists.observation_types = common::text_list(element, "sos:resultModel");

    if let Some(envelope) = element.child("gml:boundedBy/gml:Envelope") {
        offering.extent.envelope = Some(
            read_gml_envelope(envelope).map_err(|e| CodecError::Malformed(e.to_string()))?,
        );
    }
    if let Some(time) = element.child("sos:time").and_then(find_gml_time) {
        offering.extent.phenomenon_time =
            Some(read_gml_time(time).map_err(|e| CodecError::Malformed(e.to_string()))?);
    }
    Ok(offering)
}

fn write_offering(
    element: &mut XmlElement,
    offering: &OfferingCapabilities,
    lists: &CapabilityLists,
    index: usize,
) {
    element.set_attribute("gml:id", offering.identifier.as_str());
    if let Some(name) = &offering.name {
        element.add_text("gml:name", name.as_str());
    }
    if let Some(envelope) = &offering.extent.envelope {
        element
            .add_path("gml:boundedBy")
            .push(write_gml_envelope(envelope));
    }
    if let Some(time) = &offering.extent.phenomenon_time {
        element
            .add_path("sos:time")
            .push(write_gml_time(time, &format!("phenomenonTime_{}", index)));
    }
    for procedure in &offering.procedures {
        element
            .add_path("sos:procedure")
            .set_attribute("xlink:href", procedure.as_str());
    }
    for property in &offering.observable_properties {
        element
            .add_path("sos:observedProperty")
            .set_attribute("xlink:href", property.as_str());
    }
    element.add_texts("sos:responseFormat", &lists.response_formats);
    element.add_texts("sos:resultModel", &lists.observation_types);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{OperationMetadata, OperationParameter};
    use ows_common::{Envelope, TimeValue};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn operation(name: &str, parameters: Vec<(&str, Vec<&str>)>) -> OperationMetadata {
        OperationMetadata {
            name: name.to_string(),
            get_url: Some("http://localhost:8080/sos/kvp?".to_string()),
            post_url: Some("http://localhost:8080/sos/pox".to_string()),
            parameters: parameters
                .into_iter()
                .map(|(name, values)| OperationParameter {
                    name: name.to_string(),
                    allowed_values: strings(&values),
                })
                .collect(),
        }
    }

    fn sample() -> ServiceCapabilities {
        let operations = vec![
            operation(
                "GetObservation",
                vec![
                    ("responseFormat", vec!["text/xml;subtype=\"om/1.0.0\""]),
                    ("resultModel", vec!["om:Measurement", "om:Observation"]),
                ],
            ),
            operation(
                "DescribeSensor",
                vec![("outputFormat", vec!["text/xml;subtype=\"sensorML/1.0.1\""])],
            ),
        ];

        let mut inherited = OfferingCapabilities::new("Temperature");
        inherited.name = Some("Air temperature".to_string());
        inherited.procedures = strings(&["urn:ogc:object:feature:Sensor:IFGI:ifgi-sensor-1"]);
        inherited.observable_properties = strings(&["urn:ogc:def:phenomenon:OGC:1.0.30:temperature"]);
        inherited.extent.envelope = Some(
            Envelope::new(7.5, 51.9, 7.7, 52.1).with_crs("urn:ogc:def:crs:EPSG::4326"),
        );
        inherited.extent.phenomenon_time =
            Some(TimeValue::parse("2008-04-01T17:44:15Z/2008-05-20T17:44:15Z").unwrap());

        let mut own = OfferingCapabilities::new("Humidity");
        own.procedures = strings(&["urn:ogc:object:feature:Sensor:IFGI:ifgi-sensor-2"]);
        own.observable_properties = strings(&["urn:ogc:def:phenomenon:OGC:1.0.30:humidity"]);
        own.lists.observation_types = strings(&["om:Measurement"]);

        let mut capabilities = ServiceCapabilities {
            version: "1.0.0".to_string(),
            operations,
            offerings: vec![inherited, own],
            ..Default::default()
        };
        capabilities.defaults = defaults_from_operations(&capabilities);
        capabilities
    }

    #[test]
    fn test_defaults_come_from_operation_parameters() {
        let defaults = defaults_from_operations(&sample());
        assert_eq!(defaults.response_formats, strings(&["text/xml;subtype=\"om/1.0.0\""]));
        assert_eq!(defaults.observation_types.len(), 2);
        assert_eq!(defaults.encodings, strings(&["text/xml;subtype=\"sensorML/1.0.1\""]));
        assert!(defaults.feature_of_interest_types.is_empty());
    }

    #[test]
    fn test_offerings_carry_resolved_lists() {
        let mut ns = NamespaceContext::new();
        let element = GetCapabilitiesV1
            .write_xml(&mut ns, &GetCapabilitiesResponse { capabilities: sample() })
            .unwrap();
        let offerings = element.children_at(OFFERINGS);
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0].texts_at("sos:resultModel").len(), 2);
        assert_eq!(offerings[1].texts_at("sos:resultModel"), vec!["om:Measurement"]);
        assert_eq!(
            offerings[0].child("sos:procedure").and_then(|p| p.attribute("xlink:href")),
            Some("urn:ogc:object:feature:Sensor:IFGI:ifgi-sensor-1")
        );
    }

    #[test]
    fn test_capabilities_roundtrip_through_xml() {
        let response = GetCapabilitiesResponse {
            capabilities: sample(),
        };
        let mut ns = NamespaceContext::new();
        let xml = GetCapabilitiesV1
            .write_xml(&mut ns, &response)
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        let read: GetCapabilitiesResponse =
            GetCapabilitiesV1.read_xml(&XmlElement::parse(&xml).unwrap()).unwrap();
        let mut expected = response.capabilities;
        expected.resolve();
        assert_eq!(read.capabilities, expected);
    }

    #[test]
    fn test_explicit_lists_equal_to_defaults_are_kept() {
        let mut ns = NamespaceContext::new();
        let xml = GetCapabilitiesV1
            .write_xml(&mut ns, &GetCapabilitiesResponse { capabilities: sample() })
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        let read: GetCapabilitiesResponse =
            GetCapabilitiesV1.read_xml(&XmlElement::parse(&xml).unwrap()).unwrap();

        let capabilities = &read.capabilities;
        let inherited = capabilities.offering("Temperature").unwrap();
        assert_eq!(inherited.lists.response_formats, capabilities.defaults.response_formats);
        assert_eq!(inherited.lists.observation_types, capabilities.defaults.observation_types);
        assert_eq!(inherited.lists.encodings, capabilities.defaults.encodings);

        let own = capabilities.offering("Humidity").unwrap();
        assert_eq!(own.lists.observation_types, strings(&["om:Measurement"]));
    }

    #[test]
    fn test_xml_request_refuses_extensions() {
        let mut request = GetCapabilitiesRequest::new(versions::SOS_100);
        request
            .common
            .extensions
            .insert("language".to_string(), "ger".to_string());
        let mut ns = NamespaceContext::new();
        assert!(matches!(
            GetCapabilitiesV1.write_xml(&mut ns, &request),
            Err(CodecError::Unrepresentable { .. })
        ));
        // KVP carries them as plain parameters.
        let params = GetCapabilitiesV1.write_kvp(&request).unwrap();
        assert_eq!(params.get("language"), Some("ger"));
    }

    #[test]
    fn test_request_xml_roundtrip() {
        let mut request = GetCapabilitiesRequest::new(versions::SOS_100);
        request.sections = strings(&["Contents"]);
        request.accept_versions = strings(&["1.0.0"]);

        let mut ns = NamespaceContext::new();
        let xml = GetCapabilitiesV1
            .write_xml(&mut ns, &request)
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        let read: GetCapabilitiesRequest =
            GetCapabilitiesV1.read_xml(&XmlElement::parse(&xml).unwrap()).unwrap();
        assert_eq!(read, request);
    }
}

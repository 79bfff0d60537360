//! Transcoding requests between encodings and versions.

use ows_common::{CodecError, KvpParams, XmlElement};
use sos_protocol::model::{versions, GetObservationRequest, Request};
use sos_protocol::{CodecRegistry, Message};
use test_utils::fixtures::{documents, kvp};
use test_utils::{assert_contains_all, read_test_file};

fn kvp_to_xml_to_kvp(registry: &CodecRegistry, query: &str) -> (Request, Request) {
    let request = registry
        .read_kvp_request(&KvpParams::parse(query).unwrap())
        .unwrap();
    let xml = registry.write_xml_request(&request).unwrap();
    let from_xml = registry
        .read_xml_request(&XmlElement::parse(&xml).unwrap())
        .unwrap();
    let params = registry.write_kvp_request(&from_xml).unwrap();
    let from_kvp = registry.read_kvp_request(&params).unwrap();
    assert_eq!(from_kvp, from_xml);
    (request, from_xml)
}

#[test]
fn test_kvp_requests_survive_xml() {
    let registry = CodecRegistry::with_defaults();
    for query in [
        kvp::SOS2_GET_OBSERVATION,
        kvp::SOS2_GET_OBSERVATION_EXTENDED,
        kvp::SOS1_GET_OBSERVATION,
        kvp::SOS2_GET_RESULT,
        kvp::SOS2_DESCRIBE_SENSOR,
        kvp::WCS201_DESCRIBE_COVERAGE,
    ] {
        let (original, transcoded) = kvp_to_xml_to_kvp(&registry, query);
        assert_eq!(original, transcoded, "{}", query);
    }
}

#[test]
fn test_xml_fixture_survives_kvp() {
    let registry = CodecRegistry::with_defaults();
    let element = XmlElement::parse(&read_test_file(documents::SOS2_GET_OBSERVATION)).unwrap();
    let request = registry.read_xml_request(&element).unwrap();

    let params = registry.write_kvp_request(&request).unwrap();
    assert_eq!(params.get("MergeObservationsIntoDataArray"), Some("true"));
    assert_eq!(
        params.get("temporalFilter"),
        Some("phenomenonTime,2012-11-19T13:00:00Z/2012-11-19T14:00:00Z")
    );

    let reread = registry.read_kvp_request(&params).unwrap();
    assert_eq!(reread, request);
}

#[test]
fn test_extension_goes_to_swes_extension() {
    let registry = CodecRegistry::with_defaults();
    let request = registry
        .read_kvp_request(&KvpParams::parse(kvp::SOS2_GET_OBSERVATION_EXTENDED).unwrap())
        .unwrap();
    let xml = registry.write_xml_request(&request).unwrap();
    assert_contains_all!(
        xml,
        "<swes:extension>",
        r#"definition="MergeObservationsIntoDataArray""#,
        "<swe:value>true</swe:value>"
    );
}

#[test]
fn test_extension_names_differing_by_case_survive_kvp() {
    let registry = CodecRegistry::with_defaults();
    let query = format!("{}&foo=1&FOO=2", kvp::SOS2_GET_OBSERVATION);
    let request = registry
        .read_kvp_request(&KvpParams::parse(&query).unwrap())
        .unwrap();
    let extensions = &request.common().extensions;
    assert_eq!(extensions.len(), 1);
    assert_eq!(extensions.get("FOO").map(String::as_str), Some("2"));

    let params = registry.write_kvp_request(&request).unwrap();
    assert_eq!(params.get("foo"), Some("2"));
    assert_eq!(registry.read_kvp_request(&params).unwrap(), request);
}

#[test]
fn test_sos1_xml_refuses_extensions() {
    let registry = CodecRegistry::with_defaults();
    let query = format!("{}&vendorFlag=1", kvp::SOS1_GET_OBSERVATION);
    let request = registry
        .read_kvp_request(&KvpParams::parse(&query).unwrap())
        .unwrap();
    assert_eq!(
        request.common().extensions.get("vendorFlag").map(String::as_str),
        Some("1")
    );

    // KVP keeps the parameter, the 1.0 schema has nowhere to put it.
    let params = registry.write_kvp_request(&request).unwrap();
    assert_eq!(params.get("vendorFlag"), Some("1"));
    assert!(matches!(
        registry.write_xml_request(&request),
        Err(CodecError::Unrepresentable { field, .. }) if field.contains("vendorFlag")
    ));
}

#[test]
fn test_sos1_spatial_filter_has_no_kvp_form() {
    let registry = CodecRegistry::with_defaults();
    let element = XmlElement::parse(&read_test_file(documents::SOS1_GET_OBSERVATION)).unwrap();
    let request = registry.read_xml_request(&element).unwrap();

    match registry.write_kvp_request(&request) {
        Err(CodecError::Unrepresentable {
            field,
            operation,
            version,
            ..
        }) => {
            assert_eq!(field, "spatialFilter");
            assert_eq!(operation, "GetObservation");
            assert_eq!(version, "1.0.0");
        }
        other => panic!("Expected Unrepresentable, got {:?}", other),
    }

    let mut without_bbox = GetObservationRequest::unwrap_ref(&request).unwrap().clone();
    without_bbox.spatial_filter = None;
    let request = Request::GetObservation(without_bbox);
    let params = registry.write_kvp_request(&request).unwrap();
    assert_eq!(params.get("eventTime"), Some("2012-11-19T13:00:00Z/2012-11-19T14:00:00Z"));
    assert_eq!(registry.read_kvp_request(&params).unwrap(), request);
}

#[test]
fn test_sos1_request_as_sos2() {
    let registry = CodecRegistry::with_defaults();
    let request = registry
        .read_kvp_request(&KvpParams::parse(kvp::SOS1_GET_OBSERVATION).unwrap())
        .unwrap();
    let mut upgraded = GetObservationRequest::unwrap_ref(&request).unwrap().clone();
    upgraded.common.version = versions::SOS_200.to_string();

    // resultModel has no 2.0 parameter.
    let as_v2 = Request::GetObservation(upgraded.clone());
    assert!(matches!(
        registry.write_kvp_request(&as_v2),
        Err(CodecError::Unrepresentable { field, .. }) if field == "resultModel"
    ));

    upgraded.result_model = None;
    let params = registry
        .write_kvp_request(&Request::GetObservation(upgraded))
        .unwrap();
    assert_eq!(params.get("version"), Some("2.0.0"));
    assert_eq!(
        params.get("temporalFilter"),
        Some("om:samplingTime,2012-11-19T13:00:00Z/2012-11-19T14:00:00Z")
    );
}

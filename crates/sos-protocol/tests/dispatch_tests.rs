//! Registry dispatch over the shared fixture documents.

use ows_common::{CodecError, ExceptionCode, KvpParams, XmlElement};
use sos_protocol::model::{
    versions, DescribeCoverageRequest, DescribeSensorRequest, GetCapabilitiesRequest,
    GetObservationRequest, GetResultRequest, InsertSensorRequest, SpatialOperator,
    TemporalOperator,
};
use sos_protocol::{CodecRegistry, Message, MessageEnvelope, Request};
use test_utils::fixtures::{documents, formats, ids, kvp};
use test_utils::{assert_approx_eq, assert_contains_all, assert_locators, read_test_file};

fn registry() -> CodecRegistry {
    CodecRegistry::with_defaults()
}

fn read_kvp(query: &str) -> Request {
    registry()
        .read_kvp_request(&KvpParams::parse(query).unwrap())
        .unwrap()
}

fn read_xml_fixture(name: &str) -> Request {
    let element = XmlElement::parse(&read_test_file(name)).unwrap();
    registry().read_xml_request(&element).unwrap()
}

// ============================================================================
// KVP dispatch
// ============================================================================

#[test]
fn test_kvp_get_observation_v2() {
    let request = read_kvp(kvp::SOS2_GET_OBSERVATION);
    assert_eq!(request.operation(), "GetObservation");
    assert_eq!(request.version(), versions::SOS_200);

    let read = GetObservationRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.offerings, vec![ids::OFFERING_1]);
    assert_eq!(read.observed_properties, vec![ids::PROPERTY_1]);
    assert_eq!(read.response_format.as_deref(), Some(formats::OM_20));

    let temporal = read.temporal_filter.as_ref().unwrap();
    assert_eq!(temporal.operator, TemporalOperator::During);
    assert_eq!(temporal.value_reference, "om:phenomenonTime");

    let spatial = read.spatial_filter.as_ref().unwrap();
    assert_eq!(spatial.operator, SpatialOperator::BBox);
    assert_approx_eq!(spatial.value.min_x, 51.9, 1e-9);
    assert_approx_eq!(spatial.value.max_y, 7.7, 1e-9);
}

#[test]
fn test_kvp_get_observation_v1() {
    let request = read_kvp(kvp::SOS1_GET_OBSERVATION);
    assert_eq!(request.version(), versions::SOS_100);

    let read = GetObservationRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.offerings, vec![ids::LEGACY_OFFERING]);
    assert_eq!(read.result_model.as_deref(), Some("om:Measurement"));
    assert_eq!(read.response_format.as_deref(), Some(formats::OM_10));
    let event_time = read.temporal_filter.as_ref().unwrap();
    assert_eq!(event_time.value_reference, "om:samplingTime");
    assert!(event_time.value.is_period());
}

#[test]
fn test_kvp_other_operations() {
    let request = read_kvp(kvp::SOS2_GET_RESULT);
    let read = GetResultRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.offering.as_deref(), Some(ids::OFFERING_1));
    assert_eq!(
        read.temporal_filter.as_ref().map(|f| f.operator),
        Some(TemporalOperator::Equals)
    );

    let request = read_kvp(kvp::SOS2_DESCRIBE_SENSOR);
    let read = DescribeSensorRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.procedure.as_deref(), Some(ids::PROCEDURE_1));
    assert_eq!(
        read.procedure_description_format.as_deref(),
        Some(formats::SENSORML_20)
    );

    let request = read_kvp(kvp::WCS201_DESCRIBE_COVERAGE);
    assert_eq!(request.service(), "WCS");
    let read = DescribeCoverageRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.coverage_ids, vec![ids::COVERAGE_1]);
}

#[test]
fn test_kvp_get_capabilities_negotiates() {
    let request = read_kvp(kvp::SOS2_GET_CAPABILITIES);
    let read = GetCapabilitiesRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.common.version, versions::SOS_200);
    assert_eq!(read.accept_versions, vec!["2.0.0"]);
    assert_eq!(read.sections, vec!["Contents"]);

    let request = read_kvp("service=SOS&request=GetCapabilities&acceptVersions=1.0.0");
    assert_eq!(request.version(), versions::SOS_100);
}

#[test]
fn test_kvp_names_are_case_insensitive() {
    let request = read_kvp(
        "SERVICE=SOS&VERSION=2.0.0&REQUEST=GetObservation\
         &OFFERING=http://www.52north.org/test/offering/1",
    );
    let read = GetObservationRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.offerings, vec![ids::OFFERING_1]);
}

// ============================================================================
// XML dispatch
// ============================================================================

#[test]
fn test_xml_get_observation_v2() {
    let request = read_xml_fixture(documents::SOS2_GET_OBSERVATION);
    let read = GetObservationRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.offerings, vec![ids::OFFERING_1, ids::OFFERING_2]);
    assert_eq!(read.procedures, vec![ids::PROCEDURE_1]);
    assert_eq!(read.features_of_interest, vec![ids::FEATURE_1]);
    assert_eq!(
        read.spatial_filter.as_ref().and_then(|f| f.value.crs.as_deref()),
        Some("http://www.opengis.net/def/crs/EPSG/0/4326")
    );
    assert_eq!(
        read.common
            .extensions
            .get("MergeObservationsIntoDataArray")
            .map(String::as_str),
        Some("true")
    );
}

#[test]
fn test_xml_get_observation_v1() {
    let request = read_xml_fixture(documents::SOS1_GET_OBSERVATION);
    assert_eq!(request.version(), versions::SOS_100);
    let read = GetObservationRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.offerings, vec![ids::LEGACY_OFFERING]);
    assert_eq!(read.procedures, vec![ids::LEGACY_PROCEDURE]);
    assert_eq!(read.observed_properties, vec![ids::LEGACY_PROPERTY]);
    assert_eq!(read.response_mode.as_deref(), Some("inline"));
    assert_eq!(read.srs_name.as_deref(), Some("urn:ogc:def:crs:EPSG::4326"));
    assert_eq!(
        read.temporal_filter.as_ref().map(|f| f.operator),
        Some(TemporalOperator::During)
    );
    assert_eq!(
        read.spatial_filter.as_ref().map(|f| f.value_reference.as_str()),
        Some("urn:ogc:data:location")
    );
}

#[test]
fn test_xml_insert_sensor() {
    let request = read_xml_fixture(documents::SOS2_INSERT_SENSOR);
    let read = InsertSensorRequest::unwrap_ref(&request).unwrap();
    assert_eq!(read.observable_properties, vec![ids::PROPERTY_1]);
    assert_eq!(read.observation_types, vec![formats::MEASUREMENT]);
    assert_eq!(read.feature_of_interest_types, vec![formats::SAMPLING_POINT]);
    let description = read.procedure_description.as_ref().unwrap();
    assert_eq!(description.local_name(), "PhysicalSystem");
    assert_eq!(description.text_at("identifier"), Some(ids::PROCEDURE_1));
}

#[test]
fn test_xml_get_capabilities_by_namespace() {
    let element = XmlElement::parse(
        r#"<GetCapabilities xmlns="http://www.opengis.net/sos/2.0"
            xmlns:ows="http://www.opengis.net/ows/1.1" service="SOS">
            <ows:AcceptVersions><ows:Version>2.0.0</ows:Version></ows:AcceptVersions>
        </GetCapabilities>"#,
    )
    .unwrap();
    let request = registry().read_xml_request(&element).unwrap();
    assert_eq!(request.version(), versions::SOS_200);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_version_is_unsupported() {
    let params =
        KvpParams::parse("service=SOS&version=3.0.0&request=GetObservation&offering=o").unwrap();
    let err = registry().read_kvp_request(&params).unwrap_err();
    match err.as_structural() {
        Some(CodecError::UnsupportedBinding {
            service,
            operation,
            version,
        }) => {
            assert_eq!(service, "SOS");
            assert_eq!(operation, "GetObservation");
            assert_eq!(version, "3.0.0");
        }
        other => panic!("Expected UnsupportedBinding, got {:?}", other),
    }
}

#[test]
fn test_invalid_request_reports_every_problem() {
    let params = KvpParams::parse(kvp::SOS2_GET_OBSERVATION_INVALID).unwrap();
    // The envelope is checked first; nothing else is read without a version.
    assert_locators!(registry().read_kvp_request(&params), ["version"]);

    let with_version = format!("{}&version=2.0.0", kvp::SOS2_GET_OBSERVATION_INVALID);
    let params = KvpParams::parse(&with_version).unwrap();
    let err = registry().read_kvp_request(&params).unwrap_err();
    let failure = err.as_validation().unwrap();
    assert_eq!(failure.locators(), vec!["offering", "temporalFilter"]);
    assert_eq!(failure.violations()[0].code, ExceptionCode::MissingParameterValue);
    assert_eq!(failure.violations()[1].code, ExceptionCode::InvalidParameterValue);
}

#[test]
fn test_kvp_only_operation_rejects_kvp() {
    let params = KvpParams::parse(
        "service=SOS&version=2.0.0&request=InsertSensor&procedureDescriptionFormat=x",
    )
    .unwrap();
    let err = registry().read_kvp_request(&params).unwrap_err();
    assert!(matches!(
        err.as_structural(),
        Some(CodecError::UnsupportedEncoding { .. })
    ));
}

// ============================================================================
// Writing through the registry
// ============================================================================

#[test]
fn test_xml_write_uses_request_version() {
    let registry = registry();
    let request = read_kvp(kvp::SOS2_GET_RESULT);
    let xml = registry.write_xml_request(&request).unwrap();
    assert_contains_all!(
        xml,
        "sos:GetResult",
        r#"version="2.0.0""#,
        "fes:TEquals",
        "gml:TimeInstant"
    );

    let reread = registry
        .read_xml_request(&XmlElement::parse(&xml).unwrap())
        .unwrap();
    assert_eq!(reread, request);
}

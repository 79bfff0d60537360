//! Common test fixtures for the SOS/WCS bindings.
//!
//! Identifiers follow the 52°North test dataset so fixtures read like
//! requests a real client would send.

/// Identifiers of the test offerings, procedures and phenomena.
pub mod ids {
    pub const OFFERING_1: &str = "http://www.52north.org/test/offering/1";
    pub const OFFERING_2: &str = "http://www.52north.org/test/offering/2";
    pub const PROCEDURE_1: &str = "http://www.52north.org/test/procedure/1";
    pub const PROPERTY_1: &str = "http://www.52north.org/test/observableProperty/1";
    pub const PROPERTY_2: &str = "http://www.52north.org/test/observableProperty/2";
    pub const FEATURE_1: &str = "http://www.52north.org/test/featureOfInterest/1";

    /// SOS 1.0 style identifiers
    pub const LEGACY_OFFERING: &str = "ATMOSPHERIC_TEMPERATURE";
    pub const LEGACY_PROCEDURE: &str = "urn:ogc:object:feature:Sensor:IFGI:ifgi-sensor-1";
    pub const LEGACY_PROPERTY: &str = "urn:ogc:def:property:OGC:1.0.30:temperature";

    pub const COVERAGE_1: &str = "temperature_2m";
}

/// Format and type URIs.
pub mod formats {
    pub const OM_20: &str = "http://www.opengis.net/om/2.0";
    pub const OM_10: &str = "text/xml;subtype=\"om/1.0.0\"";
    pub const SENSORML_20: &str = "http://www.opengis.net/sensorml/2.0";
    pub const SENSORML_101: &str = "text/xml;subtype=\"sensorML/1.0.1\"";
    pub const MEASUREMENT: &str =
        "http://www.opengis.net/def/observationType/OGC-OM/2.0/OM_Measurement";
    pub const SAMPLING_POINT: &str =
        "http://www.opengis.net/def/samplingFeatureType/OGC-OM/2.0/SF_SamplingPoint";
}

/// Time values for filters.
pub mod time {
    /// A fixed reference instant (2012-11-19T13:00:00Z)
    pub const INSTANT: &str = "2012-11-19T13:00:00Z";

    /// One hour starting at [`INSTANT`]
    pub const PERIOD: &str = "2012-11-19T13:00:00Z/2012-11-19T14:00:00Z";

    /// Not a time at all
    pub const INVALID: &str = "yesterday";
}

/// Key-value-pair request query strings.
pub mod kvp {
    pub const SOS2_GET_CAPABILITIES: &str =
        "service=SOS&request=GetCapabilities&acceptVersions=2.0.0&sections=Contents";

    pub const SOS2_GET_OBSERVATION: &str = "service=SOS&version=2.0.0&request=GetObservation\
        &offering=http://www.52north.org/test/offering/1\
        &observedProperty=http://www.52north.org/test/observableProperty/1\
        &temporalFilter=om:phenomenonTime,2012-11-19T13:00:00Z/2012-11-19T14:00:00Z\
        &spatialFilter=om:featureOfInterest/*/sams:shape,51.9,7.5,52.1,7.7\
        &responseFormat=http://www.opengis.net/om/2.0";

    /// Same request with a vendor parameter the codec does not know.
    pub const SOS2_GET_OBSERVATION_EXTENDED: &str = "service=SOS&version=2.0.0&request=GetObservation\
        &offering=http://www.52north.org/test/offering/1\
        &observedProperty=http://www.52north.org/test/observableProperty/1\
        &MergeObservationsIntoDataArray=true";

    pub const SOS1_GET_OBSERVATION: &str = "service=SOS&version=1.0.0&request=GetObservation\
        &offering=ATMOSPHERIC_TEMPERATURE\
        &eventTime=2012-11-19T13:00:00Z/2012-11-19T14:00:00Z\
        &observedProperty=urn:ogc:def:property:OGC:1.0.30:temperature\
        &responseFormat=text/xml;subtype=\"om/1.0.0\"\
        &resultModel=om:Measurement";

    pub const SOS2_GET_RESULT: &str = "service=SOS&version=2.0.0&request=GetResult\
        &offering=http://www.52north.org/test/offering/1\
        &observedProperty=http://www.52north.org/test/observableProperty/1\
        &temporalFilter=om:phenomenonTime,2012-11-19T13:00:00Z";

    pub const SOS2_DESCRIBE_SENSOR: &str = "service=SOS&version=2.0.0&request=DescribeSensor\
        &procedure=http://www.52north.org/test/procedure/1\
        &procedureDescriptionFormat=http://www.opengis.net/sensorml/2.0";

    pub const WCS201_DESCRIBE_COVERAGE: &str =
        "service=WCS&version=2.0.1&request=DescribeCoverage&coverageId=temperature_2m";

    /// Missing version, offering value and a broken temporal filter.
    pub const SOS2_GET_OBSERVATION_INVALID: &str = "service=SOS&request=GetObservation\
        &offering=&temporalFilter=om:phenomenonTime,yesterday";
}

/// Names of the XML documents in `testdata/`.
pub mod documents {
    pub const SOS2_GET_OBSERVATION: &str = "sos2_get_observation.xml";
    pub const SOS1_GET_OBSERVATION: &str = "sos1_get_observation.xml";
    pub const SOS2_INSERT_SENSOR: &str = "sos2_insert_sensor.xml";
    pub const SOS2_CAPABILITIES: &str = "sos2_capabilities.xml";
    pub const RESULT_STRUCTURE: &str = "result_structure.xml";
    pub const BINDINGS_CONFIG: &str = "bindings.yaml";

    pub const ALL: [&str; 6] = [
        SOS2_GET_OBSERVATION,
        SOS1_GET_OBSERVATION,
        SOS2_INSERT_SENSOR,
        SOS2_CAPABILITIES,
        RESULT_STRUCTURE,
        BINDINGS_CONFIG,
    ];
}

/// Definitions used by the result structure fixture.
pub mod definitions {
    pub const PHENOMENON_TIME: &str = "http://www.opengis.net/def/property/OGC/0/PhenomenonTime";
    pub const AIR_TEMPERATURE: &str = "http://www.52north.org/test/observableProperty/1";
    pub const WIND_SPEED: &str = "http://www.52north.org/test/observableProperty/2";
    pub const WIND_DIRECTION: &str = "http://www.52north.org/test/observableProperty/3";
    pub const WIND: &str = "http://www.52north.org/test/wind";
}

//! SOS 2.0.0 bindings (OGC 12-006).
//!
//! Operation elements live in the SOS 2.0 namespace except DescribeSensor
//! and InsertSensor, which SOS 2.0 inherits from SWES 2.0. Filters are
//! FES 2.0 over GML 3.2; vendor extensions use `swes:extension`.

mod describe_sensor;
mod get_capabilities;
mod get_observation;
mod get_result;
mod insert_sensor;

pub use describe_sensor::DescribeSensorV2;
pub use get_capabilities::GetCapabilitiesV2;
pub use get_observation::GetObservationV2;
pub use get_result::{GetResultTemplateV2, GetResultV2};
pub use insert_sensor::InsertSensorV2;

use ows_common::namespaces::{SOS_20, SWES_20};
use ows_common::{
    CodecError, CodecResult, Envelope, KvpParams, NamespaceContext, TimeValue, ValidationReport,
    Violation, XmlElement,
};

use super::common::{self, at_most_one, unrepresentable, EnvelopeSpec};
use super::filters::FES;
use crate::codec::Codec;
use crate::model::{
    BinaryFilter, RequestCommon, SpatialFilter, SpatialOperator, TemporalFilter,
    TemporalOperator, SOS,
};

pub(crate) const ENVELOPE: EnvelopeSpec = EnvelopeSpec::new(SOS);

pub(crate) const TEMPORAL_FILTER: &str = "temporalFilter";
pub(crate) const SPATIAL_FILTER: &str = "spatialFilter";

/// Register the prefixes every SOS 2.0 document uses.
fn register(ns: &mut NamespaceContext) {
    ns.register("sos", SOS_20);
    ns.register("swes", SWES_20);
}

/// Read the envelope of an XML request rooted in `namespace`, including
/// its `swes:extension` children.
fn read_xml_envelope(
    codec: &dyn Codec,
    namespace: &str,
    element: &XmlElement,
    report: &mut ValidationReport,
) -> CodecResult<RequestCommon> {
    let mut common = common::read_xml_common(codec, ENVELOPE, namespace, element, report)?;
    common::read_swes_extensions(element, &mut common.extensions);
    Ok(common)
}

/// Create the root of an XML request and write its extensions.
fn write_xml_envelope(
    codec: &dyn Codec,
    ns: &mut NamespaceContext,
    prefix: &str,
    namespace: &str,
    common: &RequestCommon,
) -> XmlElement {
    register(ns);
    let mut root = common::write_xml_common(codec, ENVELOPE, ns, prefix, namespace, common);
    common::write_swes_extensions(ns, &mut root, &common.extensions);
    root
}

// === KVP filters ===

/// `temporalFilter=<valueReference>,<instant>|<begin>/<end>`. An instant
/// means `TEquals`, a period means `During`.
fn read_temporal_kvp(params: &KvpParams, report: &mut ValidationReport) -> Option<TemporalFilter> {
    let raw = params.get(TEMPORAL_FILTER)?;
    let Some((value_reference, time)) = raw
        .split_once(',')
        .map(|(r, t)| (r.trim(), t.trim()))
        .filter(|(r, t)| !r.is_empty() && !t.is_empty())
    else {
        report.add(Violation::invalid(
            TEMPORAL_FILTER,
            format!("Expected '<valueReference>,<time>', got '{}'", raw),
        ));
        return None;
    };

    match TimeValue::parse(time) {
        Ok(value) => {
            let operator = if value.is_period() {
                TemporalOperator::During
            } else {
                TemporalOperator::Equals
            };
            Some(BinaryFilter::new(operator, value_reference, value))
        }
        Err(e) => {
            report.add(Violation::invalid(TEMPORAL_FILTER, e.to_string()));
            None
        }
    }
}

fn write_temporal_kvp(codec: &dyn Codec, filter: &TemporalFilter) -> CodecResult<String> {
    match (filter.operator, filter.value.is_period()) {
        (TemporalOperator::During, true) | (TemporalOperator::Equals, false) => Ok(format!(
            "{},{}",
            filter.value_reference,
            filter.value.to_kvp_string()
        )),
        (TemporalOperator::During, false) => Err(unrepresentable(
            codec,
            TEMPORAL_FILTER,
            "During needs a period",
        )),
        (TemporalOperator::Equals, true) => Err(unrepresentable(
            codec,
            TEMPORAL_FILTER,
            "a KVP period always means During",
        )),
        (operator, _) => Err(CodecError::UnsupportedOperator {
            field: TEMPORAL_FILTER.to_string(),
            operator: operator.fes_name().to_string(),
            operation: codec.operation().to_string(),
            version: codec.version().to_string(),
        }),
    }
}

/// `spatialFilter=<valueReference>,<minx>,<miny>,<maxx>,<maxy>[,<crs>]`.
fn read_spatial_kvp(params: &KvpParams, report: &mut ValidationReport) -> Option<SpatialFilter> {
    let raw = params.get(SPATIAL_FILTER)?;
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let Some((value_reference, values)) = parts.split_first().filter(|(r, _)| !r.is_empty()) else {
        report.add(Violation::invalid(SPATIAL_FILTER, "The value reference is missing"));
        return None;
    };

    match Envelope::from_kvp_values(values) {
        Ok(envelope) => Some(BinaryFilter::new(
            SpatialOperator::BBox,
            *value_reference,
            envelope,
        )),
        Err(e) => {
            report.add(Violation::invalid(SPATIAL_FILTER, e.to_string()));
            None
        }
    }
}

fn write_spatial_kvp(codec: &dyn Codec, filter: &SpatialFilter) -> CodecResult<String> {
    if filter.operator != SpatialOperator::BBox {
        return Err(CodecError::UnsupportedOperator {
            field: SPATIAL_FILTER.to_string(),
            operator: filter.operator.element_name().to_string(),
            operation: codec.operation().to_string(),
            version: codec.version().to_string(),
        });
    }
    let mut value = format!("{},{}", filter.value_reference, filter.value.to_kvp_values());
    if let Some(crs) = &filter.value.crs {
        value.push(',');
        value.push_str(crs);
    }
    Ok(value)
}

// === XML filters ===

/// At most one `sos:temporalFilter`, holding one FES temporal operator.
fn read_temporal_xml(
    codec: &dyn Codec,
    element: &XmlElement,
    report: &mut ValidationReport,
) -> CodecResult<Option<TemporalFilter>> {
    match at_most_one(element, "sos:temporalFilter", TEMPORAL_FILTER, report) {
        Some(wrapper) => {
            let operator = wrapper
                .first_element()
                .ok_or_else(|| CodecError::MissingElement("fes temporal operator".to_string()))?;
            FES.read_temporal(codec, operator, TEMPORAL_FILTER, report)
        }
        None => Ok(None),
    }
}

fn read_spatial_xml(
    codec: &dyn Codec,
    element: &XmlElement,
    report: &mut ValidationReport,
) -> CodecResult<Option<SpatialFilter>> {
    match at_most_one(element, "sos:spatialFilter", SPATIAL_FILTER, report) {
        Some(wrapper) => {
            let operator = wrapper
                .first_element()
                .ok_or_else(|| CodecError::MissingElement("fes spatial operator".to_string()))?;
            FES.read_spatial(codec, operator, SPATIAL_FILTER, report)
        }
        None => Ok(None),
    }
}

fn write_temporal_xml(ns: &mut NamespaceContext, root: &mut XmlElement, filter: &TemporalFilter) {
    FES.register(ns);
    root.add_path("sos:temporalFilter")
        .push(FES.write_temporal(filter, "tf_1"));
}

fn write_spatial_xml(ns: &mut NamespaceContext, root: &mut XmlElement, filter: &SpatialFilter) {
    FES.register(ns);
    root.add_path("sos:spatialFilter")
        .push(FES.write_spatial(filter));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCodec;

    impl Codec for TestCodec {
        fn operation(&self) -> &'static str {
            "GetObservation"
        }

        fn version(&self) -> &'static str {
            "2.0.0"
        }
    }

    #[test]
    fn test_temporal_kvp_operator_follows_value() {
        let params = KvpParams::parse(
            "temporalFilter=om:phenomenonTime,2012-11-19T13:00:00Z/2012-11-19T14:00:00Z",
        )
        .unwrap();
        let mut report = ValidationReport::new();
        let filter = read_temporal_kvp(&params, &mut report).unwrap();
        assert_eq!(filter.operator, TemporalOperator::During);
        assert_eq!(filter.value_reference, "om:phenomenonTime");

        let params = KvpParams::parse("temporalFilter=om:resultTime,2012-11-19T13:00:00Z").unwrap();
        let filter = read_temporal_kvp(&params, &mut report).unwrap();
        assert_eq!(filter.operator, TemporalOperator::Equals);
        assert!(report.is_empty());
    }

    #[test]
    fn test_temporal_kvp_rejects_other_operators() {
        let filter = BinaryFilter::new(
            TemporalOperator::After,
            "om:phenomenonTime",
            TimeValue::parse("2012-11-19T13:00:00Z").unwrap(),
        );
        match write_temporal_kvp(&TestCodec, &filter) {
            Err(CodecError::UnsupportedOperator {
                field,
                operator,
                operation,
                version,
            }) => {
                assert_eq!(field, "temporalFilter");
                assert_eq!(operator, "After");
                assert_eq!(operation, "GetObservation");
                assert_eq!(version, "2.0.0");
            }
            other => panic!("Expected UnsupportedOperator, got {:?}", other),
        }
    }

    #[test]
    fn test_spatial_kvp_with_crs() {
        let raw = "om:featureOfInterest/*/sams:shape,0,0,60,60,http://www.opengis.net/def/crs/EPSG/0/4326";
        let params: KvpParams = vec![("spatialFilter", raw)].into_iter().collect();
        let mut report = ValidationReport::new();
        let filter = read_spatial_kvp(&params, &mut report).unwrap();
        assert_eq!(filter.operator, SpatialOperator::BBox);
        assert_eq!(
            filter.value.crs.as_deref(),
            Some("http://www.opengis.net/def/crs/EPSG/0/4326")
        );
        assert_eq!(write_spatial_kvp(&TestCodec, &filter).unwrap(), raw);
    }

    #[test]
    fn test_malformed_filters_are_violations() {
        let params = KvpParams::parse("temporalFilter=om:phenomenonTime&spatialFilter=x,1,2").unwrap();
        let mut report = ValidationReport::new();
        assert!(read_temporal_kvp(&params, &mut report).is_none());
        assert!(read_spatial_kvp(&params, &mut report).is_none());
        assert_eq!(report.len(), 2);
    }
}

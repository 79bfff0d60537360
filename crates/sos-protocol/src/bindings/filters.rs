//! FES 2.0 and OGC Filter 1.1 sub-codecs plus the GML time and envelope
//! primitives they carry.
//!
//! SOS 2.0 and WCS 2.0 use FES 2.0 with GML 3.2; SOS 1.0 uses OGC Filter
//! with GML 3.1.1. The element layouts are the same apart from names, so
//! one sub-codec is parameterized by a [`FilterDialect`].

use ows_common::namespaces::{FES_20, GML_311, GML_32, OGC};
use ows_common::{
    CodecError, CodecResult, Envelope, EnvelopeParseError, NamespaceContext, TimeParseError,
    TimeValue, ValidationReport, Violation, XmlElement,
};
use ows_common::time::format_instant;

use crate::codec::Codec;
use crate::model::{BinaryFilter, SpatialFilter, SpatialOperator, TemporalFilter, TemporalOperator};

pub(crate) struct FilterDialect {
    pub prefix: &'static str,
    pub namespace: &'static str,
    /// `ValueReference` in FES 2.0, `PropertyName` in OGC Filter.
    pub property_element: &'static str,
    pub gml_namespace: &'static str,
    temporal_name: fn(&TemporalOperator) -> &'static str,
    parse_temporal: fn(&str) -> Option<TemporalOperator>,
}

pub(crate) const FES: FilterDialect = FilterDialect {
    prefix: "fes",
    namespace: FES_20,
    property_element: "ValueReference",
    gml_namespace: GML_32,
    temporal_name: TemporalOperator::fes_name,
    parse_temporal: TemporalOperator::from_fes_name,
};

pub(crate) const OGC_FILTER: FilterDialect = FilterDialect {
    prefix: "ogc",
    namespace: OGC,
    property_element: "PropertyName",
    gml_namespace: GML_311,
    temporal_name: TemporalOperator::ogc_name,
    parse_temporal: TemporalOperator::from_ogc_name,
};

impl FilterDialect {
    pub fn register(&self, ns: &mut NamespaceContext) {
        ns.register(self.prefix, self.namespace);
        ns.register("gml", self.gml_namespace);
    }

    /// Read a temporal operator element such as `fes:During`.
    ///
    /// Unknown operators and missing time primitives are structural errors;
    /// a missing property or an unparsable time is added to `report`.
    pub fn read_temporal(
        &self,
        codec: &dyn Codec,
        operator_element: &XmlElement,
        locator: &str,
        report: &mut ValidationReport,
    ) -> CodecResult<Option<TemporalFilter>> {
        let name = operator_element.local_name();
        let operator = (self.parse_temporal)(name)
            .ok_or_else(|| unsupported_operator(codec, locator, name))?;
        let value_reference = self.read_property(operator_element, locator, report);

        let time_element = find_gml_time(operator_element)
            .ok_or_else(|| CodecError::MissingElement("gml:TimeInstant or gml:TimePeriod".to_string()))?;
        let value = match read_gml_time(time_element) {
            Ok(value) => Some(value),
            Err(e) => {
                report.add(Violation::invalid(locator, e.to_string()));
                None
            }
        };

        Ok(value_reference
            .zip(value)
            .map(|(value_reference, value)| BinaryFilter::new(operator, value_reference, value)))
    }

    /// Read a spatial operator element such as `fes:BBOX`.
    pub fn read_spatial(
        &self,
        codec: &dyn Codec,
        operator_element: &XmlElement,
        locator: &str,
        report: &mut ValidationReport,
    ) -> CodecResult<Option<SpatialFilter>> {
        let name = operator_element.local_name();
        let operator = SpatialOperator::from_element_name(name)
            .ok_or_else(|| unsupported_operator(codec, locator, name))?;
        let value_reference = self.read_property(operator_element, locator, report);

        let envelope_element = operator_element
            .child("gml:Envelope")
            .ok_or_else(|| CodecError::MissingElement("gml:Envelope".to_string()))?;
        let value = match read_gml_envelope(envelope_element) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                report.add(Violation::invalid(locator, e.to_string()));
                None
            }
        };

        Ok(value_reference
            .zip(value)
            .map(|(value_reference, value)| BinaryFilter::new(operator, value_reference, value)))
    }

    fn read_property(
        &self,
        operator_element: &XmlElement,
        locator: &str,
        report: &mut ValidationReport,
    ) -> Option<String> {
        let value = operator_element.text_at(self.property_element).map(str::to_string);
        if value.is_none() {
            report.add(Violation::invalid(
                locator,
                format!("{}:{} is missing", self.prefix, self.property_element),
            ));
        }
        value
    }

    pub fn write_temporal(&self, filter: &TemporalFilter, gml_id: &str) -> XmlElement {
        let mut element =
            XmlElement::new(format!("{}:{}", self.prefix, (self.temporal_name)(&filter.operator)));
        self.write_property(&mut element, &filter.value_reference);
        element.push(write_gml_time(&filter.value, gml_id));
        element
    }

    pub fn write_spatial(&self, filter: &SpatialFilter) -> XmlElement {
        let mut element =
            XmlElement::new(format!("{}:{}", self.prefix, filter.operator.element_name()));
        self.write_property(&mut element, &filter.value_reference);
        element.push(write_gml_envelope(&filter.value));
        element
    }

    fn write_property(&self, element: &mut XmlElement, value_reference: &str) {
        element.add_text(
            &format!("{}:{}", self.prefix, self.property_element),
            value_reference,
        );
    }
}

fn unsupported_operator(codec: &dyn Codec, field: &str, operator: &str) -> CodecError {
    CodecError::UnsupportedOperator {
        field: field.to_string(),
        operator: operator.to_string(),
        operation: codec.operation().to_string(),
        version: codec.version().to_string(),
    }
}

// === GML ===

/// First `gml:TimeInstant` or `gml:TimePeriod` child of `parent`.
pub(crate) fn find_gml_time(parent: &XmlElement) -> Option<&XmlElement> {
    parent
        .elements()
        .iter()
        .find(|el| matches!(el.local_name(), "TimeInstant" | "TimePeriod"))
}

/// Read a `gml:TimeInstant` or `gml:TimePeriod`. Periods may use
/// `beginPosition`/`endPosition` or nested `begin`/`end` instants.
pub(crate) fn read_gml_time(element: &XmlElement) -> Result<TimeValue, TimeParseError> {
    let text = |path: &str| element.text_at(path).unwrap_or_default();
    match element.local_name() {
        "TimePeriod" => {
            let begin = element
                .text_at("gml:beginPosition")
                .unwrap_or_else(|| text("gml:begin/gml:TimeInstant/gml:timePosition"));
            let end = element
                .text_at("gml:endPosition")
                .unwrap_or_else(|| text("gml:end/gml:TimeInstant/gml:timePosition"));
            TimeValue::period(begin, end)
        }
        _ => {
            let position = text("gml:timePosition");
            if position.contains('/') {
                return Err(TimeParseError::InvalidFormat(position.to_string()));
            }
            TimeValue::parse(position)
        }
    }
}

pub(crate) fn write_gml_time(value: &TimeValue, gml_id: &str) -> XmlElement {
    match value {
        TimeValue::Instant(t) => {
            let mut element = XmlElement::new("gml:TimeInstant");
            element.set_attribute("gml:id", gml_id);
            element.add_text("gml:timePosition", format_instant(t));
            element
        }
        TimeValue::Period { begin, end } => {
            let mut element = XmlElement::new("gml:TimePeriod");
            element.set_attribute("gml:id", gml_id);
            element.add_text("gml:beginPosition", format_instant(begin));
            element.add_text("gml:endPosition", format_instant(end));
            element
        }
    }
}

/// Read a `gml:Envelope` with its `srsName`.
pub(crate) fn read_gml_envelope(element: &XmlElement) -> Result<Envelope, EnvelopeParseError> {
    let lower = element.text_at("gml:lowerCorner");
    let upper = element.text_at("gml:upperCorner");
    let (lower, upper) = lower
        .zip(upper)
        .ok_or_else(|| EnvelopeParseError::InvalidFormat("gml:Envelope without corners".to_string()))?;
    let mut envelope = Envelope::from_corners(lower, upper)?;
    envelope.crs = element.attribute("srsName").map(str::to_string);
    Ok(envelope)
}

pub(crate) fn write_gml_envelope(envelope: &Envelope) -> XmlElement {
    let mut element = XmlElement::new("gml:Envelope");
    if let Some(crs) = &envelope.crs {
        element.set_attribute("srsName", crs.as_str());
    }
    element.add_text("gml:lowerCorner", envelope.lower_corner());
    element.add_text("gml:upperCorner", envelope.upper_corner());
    element
}

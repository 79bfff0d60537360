//! WCS DescribeCoverage bindings for 1.0.0 and 2.0.1.
//!
//! Neither version has a vendor extension point in XML, and WCS 1.0 has no
//! range type model compatible with SWE records.

use ows_common::namespaces::{GMLCOV_10, GML_311, GML_32, SWE_20, WCS_10, WCS_20, XLINK};
use ows_common::{
    CodecError, CodecResult, Envelope, KvpParams, NamespaceContext, ReadResult, ValidationReport,
    XmlElement,
};

use super::common::{
    self, expect_root, refuse_extensions, required_list, unrepresentable, EnvelopeSpec,
};
use super::filters::{read_gml_envelope, write_gml_envelope};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{
    operations, versions, CoverageDescription, DescribeCoverageRequest, DescribeCoverageResponse,
    WCS,
};
use crate::swe::xml::{read_component, write_component};

const ENVELOPE: EnvelopeSpec = EnvelopeSpec::new(WCS);

fn malformed(e: impl ToString) -> CodecError {
    CodecError::Malformed(e.to_string())
}

// === WCS 1.0.0 ===

const COVERAGE: &str = "coverage";

/// WCS 1.0.0 DescribeCoverage.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescribeCoverageV1;

impl Codec for DescribeCoverageV1 {
    fn operation(&self) -> &'static str {
        operations::DESCRIBE_COVERAGE
    }

    fn version(&self) -> &'static str {
        versions::WCS_100
    }
}

impl Reader<DescribeCoverageRequest> for DescribeCoverageV1 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<DescribeCoverageRequest> {
        let mut report = ValidationReport::new();
        let request = DescribeCoverageRequest {
            common: common::read_kvp_common(self, ENVELOPE, params, &[COVERAGE], &mut report),
            coverage_ids: required_list(params, COVERAGE, &mut report),
        };
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeCoverageRequest> {
        let mut report = ValidationReport::new();
        let common = common::read_xml_common(self, ENVELOPE, WCS_10, element, &mut report)?;
        let coverage_ids = common::text_list(element, "wcs:Coverage");
        report.require(!coverage_ids.is_empty(), COVERAGE);
        report.process()?;
        Ok(DescribeCoverageRequest {
            common,
            coverage_ids,
        })
    }
}

impl Writer<DescribeCoverageRequest> for DescribeCoverageV1 {
    fn write_kvp(&self, request: &DescribeCoverageRequest) -> CodecResult<KvpParams> {
        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_list(COVERAGE, &request.coverage_ids);
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, &[COVERAGE])?;
        Ok(params)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &DescribeCoverageRequest,
    ) -> CodecResult<XmlElement> {
        refuse_extensions(self, &request.common.extensions)?;
        let mut root = common::write_xml_common(self, ENVELOPE, ns, "wcs", WCS_10, &request.common);
        root.add_texts("wcs:Coverage", &request.coverage_ids);
        Ok(root)
    }
}

impl Reader<DescribeCoverageResponse> for DescribeCoverageV1 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeCoverageResponse> {
        expect_root(element, "CoverageDescription", WCS_10)?;
        let mut descriptions = Vec::new();
        for offering in element.children_at("wcs:CoverageOffering") {
            let id = offering
                .text_at("wcs:name")
                .ok_or_else(|| CodecError::MissingElement("wcs:name".to_string()))?;
            let mut description = CoverageDescription::new(id);
            if let Some(envelope) = offering.child("wcs:lonLatEnvelope") {
                description.envelope = Some(read_lon_lat_envelope(envelope)?);
            }
            descriptions.push(description);
        }
        Ok(DescribeCoverageResponse { descriptions })
    }
}

impl Writer<DescribeCoverageResponse> for DescribeCoverageV1 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &DescribeCoverageResponse,
    ) -> CodecResult<XmlElement> {
        if response.descriptions.iter().any(|d| d.range_type.is_some()) {
            return Err(unrepresentable(
                self,
                "rangeType",
                "WCS 1.0 range sets are not SWE records",
            ));
        }

        ns.register("wcs", WCS_10);
        ns.register("gml", GML_311);
        let mut root = XmlElement::new("wcs:CoverageDescription");
        root.set_attribute("version", versions::WCS_100);
        for description in &response.descriptions {
            let offering = root.add_path("wcs:CoverageOffering");
            offering.add_text("wcs:name", description.id.as_str());
            if let Some(envelope) = &description.envelope {
                offering.push(write_lon_lat_envelope(envelope));
            }
        }
        Ok(root)
    }
}

/// `wcs:lonLatEnvelope` holds two `gml:pos` corners.
fn read_lon_lat_envelope(element: &XmlElement) -> CodecResult<Envelope> {
    let corners = element.texts_at("gml:pos");
    let [lower, upper] = corners.as_slice() else {
        return Err(malformed(format!(
            "wcs:lonLatEnvelope needs two gml:pos, got {}",
            corners.len()
        )));
    };
    let mut envelope = Envelope::from_corners(lower, upper).map_err(malformed)?;
    envelope.crs = element.attribute("srsName").map(str::to_string);
    Ok(envelope)
}

fn write_lon_lat_envelope(envelope: &Envelope) -> XmlElement {
    let mut element = XmlElement::new("wcs:lonLatEnvelope");
    if let Some(crs) = &envelope.crs {
        element.set_attribute("srsName", crs.as_str());
    }
    element.add_text("gml:pos", envelope.lower_corner());
    element.add_text("gml:pos", envelope.upper_corner());
    element
}

// === WCS 2.0.1 ===

const COVERAGE_ID: &str = "coverageId";

/// WCS 2.0.1 DescribeCoverage. Range types are written as SWE records.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescribeCoverageV2;

impl Codec for DescribeCoverageV2 {
    fn operation(&self) -> &'static str {
        operations::DESCRIBE_COVERAGE
    }

    fn version(&self) -> &'static str {
        versions::WCS_201
    }
}

impl Reader<DescribeCoverageRequest> for DescribeCoverageV2 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<DescribeCoverageRequest> {
        let mut report = ValidationReport::new();
        let request = DescribeCoverageRequest {
            common: common::read_kvp_common(self, ENVELOPE, params, &[COVERAGE_ID], &mut report),
            coverage_ids: required_list(params, COVERAGE_ID, &mut report),
        };
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeCoverageRequest> {
        let mut report = ValidationReport::new();
        let common = common::read_xml_common(self, ENVELOPE, WCS_20, element, &mut report)?;
        let coverage_ids = common::text_list(element, "wcs:CoverageId");
        report.require(!coverage_ids.is_empty(), COVERAGE_ID);
        report.process()?;
        Ok(DescribeCoverageRequest {
            common,
            coverage_ids,
        })
    }
}

impl Writer<DescribeCoverageRequest> for DescribeCoverageV2 {
    fn write_kvp(&self, request: &DescribeCoverageRequest) -> CodecResult<KvpParams> {
        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_list(COVERAGE_ID, &request.coverage_ids);
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, &[COVERAGE_ID])?;
        Ok(params)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &DescribeCoverageRequest,
    ) -> CodecResult<XmlElement> {
        refuse_extensions(self, &request.common.extensions)?;
        let mut root = common::write_xml_common(self, ENVELOPE, ns, "wcs", WCS_20, &request.common);
        root.add_texts("wcs:CoverageId", &request.coverage_ids);
        Ok(root)
    }
}

impl Reader<DescribeCoverageResponse> for DescribeCoverageV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeCoverageResponse> {
        expect_root(element, "CoverageDescriptions", WCS_20)?;
        let mut descriptions = Vec::new();
        for item in element.children_at("wcs:CoverageDescription") {
            let id = item
                .text_at("wcs:CoverageId")
                .ok_or_else(|| CodecError::MissingElement("wcs:CoverageId".to_string()))?;
            let mut description = CoverageDescription::new(id);
            if let Some(envelope) = item.child("gml:boundedBy/gml:Envelope") {
                description.envelope = Some(read_gml_envelope(envelope).map_err(malformed)?);
            }
            if let Some(record) = item
                .child("gmlcov:rangeType")
                .and_then(XmlElement::first_element)
            {
                description.range_type = Some(read_component(record)?);
            }
            descriptions.push(description);
        }
        Ok(DescribeCoverageResponse { descriptions })
    }
}

impl Writer<DescribeCoverageResponse> for DescribeCoverageV2 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &DescribeCoverageResponse,
    ) -> CodecResult<XmlElement> {
        ns.register("wcs", WCS_20);
        ns.register("gml", GML_32);
        ns.register("gmlcov", GMLCOV_10);
        ns.register("swe", SWE_20);
        ns.register("xlink", XLINK);

        let mut root = XmlElement::new("wcs:CoverageDescriptions");
        for description in &response.descriptions {
            let item = root.add_path("wcs:CoverageDescription");
            item.set_attribute("gml:id", description.id.as_str());
            if let Some(envelope) = &description.envelope {
                item.add_path("gml:boundedBy")
                    .push(write_gml_envelope(envelope));
            }
            item.add_text("wcs:CoverageId", description.id.as_str());
            if let Some(range_type) = &description.range_type {
                item.add_path("gmlcov:rangeType")
                    .push(write_component(range_type));
            }
        }
        Ok(root)
    }
}

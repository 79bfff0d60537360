use ows_common::namespaces::{SOS_20, SWE_20, XLINK};
use ows_common::{
    CodecError, CodecResult, KvpParams, NamespaceContext, ReadResult, ValidationReport, XmlElement,
};

use super::{
    read_spatial_kvp, read_spatial_xml, read_temporal_kvp, read_temporal_xml, read_xml_envelope,
    register, write_spatial_kvp, write_spatial_xml, write_temporal_kvp, write_temporal_xml,
    write_xml_envelope, ENVELOPE, SPATIAL_FILTER, TEMPORAL_FILTER,
};
use crate::bindings::common::{self, expect_root, list_param, required_param, required_text};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{
    operations, versions, GetResultRequest, GetResultResponse, GetResultTemplateRequest,
    GetResultTemplateResponse,
};
use crate::swe::xml::{read_component, read_text_encoding, write_component, write_text_encoding};

const OFFERING: &str = "offering";
const OBSERVED_PROPERTY: &str = "observedProperty";
const FEATURE_OF_INTEREST: &str = "featureOfInterest";

const RESULT_KNOWN: &[&str] = &[
    OFFERING,
    OBSERVED_PROPERTY,
    FEATURE_OF_INTEREST,
    TEMPORAL_FILTER,
    SPATIAL_FILTER,
];

const TEMPLATE_KNOWN: &[&str] = &[OFFERING, OBSERVED_PROPERTY];

/// SOS 2.0 GetResult.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetResultV2;

impl Codec for GetResultV2 {
    fn operation(&self) -> &'static str {
        operations::GET_RESULT
    }

    fn version(&self) -> &'static str {
        versions::SOS_200
    }
}

impl Reader<GetResultRequest> for GetResultV2 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<GetResultRequest> {
        let mut report = ValidationReport::new();
        let request = GetResultRequest {
            common: common::read_kvp_common(self, ENVELOPE, params, RESULT_KNOWN, &mut report),
            offering: required_param(params, OFFERING, &mut report),
            observed_property: required_param(params, OBSERVED_PROPERTY, &mut report),
            features_of_interest: list_param(params, FEATURE_OF_INTEREST, &mut report),
            temporal_filter: read_temporal_kvp(params, &mut report),
            spatial_filter: read_spatial_kvp(params, &mut report),
        };
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetResultRequest> {
        let mut report = ValidationReport::new();
        let request = GetResultRequest {
            common: read_xml_envelope(self, SOS_20, element, &mut report)?,
            offering: required_text(element, "sos:offering", OFFERING, &mut report),
            observed_property: required_text(
                element,
                "sos:observedProperty",
                OBSERVED_PROPERTY,
                &mut report,
            ),
            temporal_filter: read_temporal_xml(self, element, &mut report)?,
            features_of_interest: common::text_list(element, "sos:featureOfInterest"),
            spatial_filter: read_spatial_xml(self, element, &mut report)?,
        };
        report.process()?;
        Ok(request)
    }
}

impl Writer<GetResultRequest> for GetResultV2 {
    fn write_kvp(&self, request: &GetResultRequest) -> CodecResult<KvpParams> {
        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_opt(OFFERING, request.offering.as_deref());
        params.insert_opt(OBSERVED_PROPERTY, request.observed_property.as_deref());
        params.insert_list(FEATURE_OF_INTEREST, &request.features_of_interest);
        if let Some(filter) = &request.temporal_filter {
            params.insert(TEMPORAL_FILTER, write_temporal_kvp(self, filter)?);
        }
        if let Some(filter) = &request.spatial_filter {
            params.insert(SPATIAL_FILTER, write_spatial_kvp(self, filter)?);
        }
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, RESULT_KNOWN)?;
        Ok(params)
    }

    fn write_xml(&self, ns: &mut NamespaceContext, request: &GetResultRequest) -> CodecResult<XmlElement> {
        let mut root = write_xml_envelope(self, ns, "sos", SOS_20, &request.common);
        if let Some(offering) = &request.offering {
            root.add_text("sos:offering", offering.as_str());
        }
        if let Some(property) = &request.observed_property {
            root.add_text("sos:observedProperty", property.as_str());
        }
        if let Some(filter) = &request.temporal_filter {
            write_temporal_xml(ns, &mut root, filter);
        }
        root.add_texts("sos:featureOfInterest", &request.features_of_interest);
        if let Some(filter) = &request.spatial_filter {
            write_spatial_xml(ns, &mut root, filter);
        }
        Ok(root)
    }
}

impl Reader<GetResultResponse> for GetResultV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetResultResponse> {
        expect_root(element, "GetResultResponse", SOS_20)?;
        Ok(GetResultResponse {
            result_values: element.text_at("sos:resultValues").map(str::to_string),
        })
    }
}

impl Writer<GetResultResponse> for GetResultV2 {
    fn write_xml(&self, ns: &mut NamespaceContext, response: &GetResultResponse) -> CodecResult<XmlElement> {
        register(ns);
        let mut root = XmlElement::new("sos:GetResultResponse");
        if let Some(values) = &response.result_values {
            root.add_text("sos:resultValues", values.as_str());
        }
        Ok(root)
    }
}

/// SOS 2.0 GetResultTemplate.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetResultTemplateV2;

impl Codec for GetResultTemplateV2 {
    fn operation(&self) -> &'static str {
        operations::GET_RESULT_TEMPLATE
    }

    fn version(&self) -> &'static str {
        versions::SOS_200
    }
}

impl Reader<GetResultTemplateRequest> for GetResultTemplateV2 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<GetResultTemplateRequest> {
        let mut report = ValidationReport::new();
        let request = GetResultTemplateRequest {
            common: common::read_kvp_common(self, ENVELOPE, params, TEMPLATE_KNOWN, &mut report),
            offering: required_param(params, OFFERING, &mut report),
            observed_property: required_param(params, OBSERVED_PROPERTY, &mut report),
        };
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetResultTemplateRequest> {
        let mut report = ValidationReport::new();
        let request = GetResultTemplateRequest {
            common: read_xml_envelope(self, SOS_20, element, &mut report)?,
            offering: required_text(element, "sos:offering", OFFERING, &mut report),
            observed_property: required_text(
                element,
                "sos:observedProperty",
                OBSERVED_PROPERTY,
                &mut report,
            ),
        };
        report.process()?;
        Ok(request)
    }
}

impl Writer<GetResultTemplateRequest> for GetResultTemplateV2 {
    fn write_kvp(&self, request: &GetResultTemplateRequest) -> CodecResult<KvpParams> {
        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_opt(OFFERING, request.offering.as_deref());
        params.insert_opt(OBSERVED_PROPERTY, request.observed_property.as_deref());
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, TEMPLATE_KNOWN)?;
        Ok(params)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &GetResultTemplateRequest,
    ) -> CodecResult<XmlElement> {
        let mut root = write_xml_envelope(self, ns, "sos", SOS_20, &request.common);
        if let Some(offering) = &request.offering {
            root.add_text("sos:offering", offering.as_str());
        }
        if let Some(property) = &request.observed_property {
            root.add_text("sos:observedProperty", property.as_str());
        }
        Ok(root)
    }
}

impl Reader<GetResultTemplateResponse> for GetResultTemplateV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetResultTemplateResponse> {
        expect_root(element, "GetResultTemplateResponse", SOS_20)?;
        let structure = element
            .child("sos:resultStructure")
            .and_then(XmlElement::first_element)
            .ok_or_else(|| CodecError::MissingElement("sos:resultStructure".to_string()))?;
        let encoding = element
            .child("sos:resultEncoding")
            .and_then(XmlElement::first_element)
            .ok_or_else(|| CodecError::MissingElement("sos:resultEncoding".to_string()))?;

        Ok(GetResultTemplateResponse {
            result_structure: read_component(structure)?,
            result_encoding: read_text_encoding(encoding)?,
        })
    }
}

impl Writer<GetResultTemplateResponse> for GetResultTemplateV2 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &GetResultTemplateResponse,
    ) -> CodecResult<XmlElement> {
        register(ns);
        ns.register("swe", SWE_20);
        ns.register("xlink", XLINK);

        let mut root = XmlElement::new("sos:GetResultTemplateResponse");
        root.add_path("sos:resultStructure")
            .push(write_component(&response.result_structure));
        root.add_path("sos:resultEncoding")
            .push(write_text_encoding(&response.result_encoding));
        Ok(root)
    }
}

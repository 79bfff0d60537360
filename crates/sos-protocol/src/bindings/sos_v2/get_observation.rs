use ows_common::namespaces::SOS_20;
use ows_common::{
    CodecResult, KvpParams, NamespaceContext, ReadResult, ValidationReport, XmlElement,
};

use super::{
    read_spatial_kvp, read_spatial_xml, read_temporal_kvp, read_temporal_xml, read_xml_envelope,
    register, write_spatial_kvp, write_spatial_xml, write_temporal_kvp, write_temporal_xml,
    write_xml_envelope, ENVELOPE, SPATIAL_FILTER, TEMPORAL_FILTER,
};
use crate::bindings::common::{self, expect_root, list_param, opt_param, opt_text, unrepresentable};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{operations, versions, GetObservationRequest, GetObservationResponse};

const OFFERING: &str = "offering";
const PROCEDURE: &str = "procedure";
const OBSERVED_PROPERTY: &str = "observedProperty";
const FEATURE_OF_INTEREST: &str = "featureOfInterest";
const RESPONSE_FORMAT: &str = "responseFormat";

const KNOWN: &[&str] = &[
    OFFERING,
    PROCEDURE,
    OBSERVED_PROPERTY,
    FEATURE_OF_INTEREST,
    TEMPORAL_FILTER,
    SPATIAL_FILTER,
    RESPONSE_FORMAT,
];

/// SOS 2.0 GetObservation.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetObservationV2;

impl Codec for GetObservationV2 {
    fn operation(&self) -> &'static str {
        operations::GET_OBSERVATION
    }

    fn version(&self) -> &'static str {
        versions::SOS_200
    }
}

impl GetObservationV2 {
    /// SOS 1.0 only fields have no SOS 2.0 encoding.
    fn check_representable(&self, request: &GetObservationRequest) -> CodecResult<()> {
        let legacy = [
            ("resultModel", &request.result_model),
            ("responseMode", &request.response_mode),
            ("srsName", &request.srs_name),
        ];
        match legacy.iter().find(|(_, value)| value.is_some()) {
            Some((field, _)) => Err(unrepresentable(self, field, "SOS 2.0 has no such parameter")),
            None => Ok(()),
        }
    }
}

impl Reader<GetObservationRequest> for GetObservationV2 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<GetObservationRequest> {
        let mut report = ValidationReport::new();
        let request = GetObservationRequest {
            common: common::read_kvp_common(self, ENVELOPE, params, KNOWN, &mut report),
            offerings: list_param(params, OFFERING, &mut report),
            procedures: list_param(params, PROCEDURE, &mut report),
            observed_properties: list_param(params, OBSERVED_PROPERTY, &mut report),
            features_of_interest: list_param(params, FEATURE_OF_INTEREST, &mut report),
            temporal_filter: read_temporal_kvp(params, &mut report),
            spatial_filter: read_spatial_kvp(params, &mut report),
            response_format: opt_param(params, RESPONSE_FORMAT, &mut report),
            ..Default::default()
        };
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetObservationRequest> {
        let mut report = ValidationReport::new();
        let common = read_xml_envelope(self, SOS_20, element, &mut report)?;
        let request = GetObservationRequest {
            common,
            procedures: common::text_list(element, "sos:procedure"),
            offerings: common::text_list(element, "sos:offering"),
            observed_properties: common::text_list(element, "sos:observedProperty"),
            temporal_filter: read_temporal_xml(self, element, &mut report)?,
            features_of_interest: common::text_list(element, "sos:featureOfInterest"),
            spatial_filter: read_spatial_xml(self, element, &mut report)?,
            response_format: opt_text(element, "sos:responseFormat", RESPONSE_FORMAT, &mut report),
            ..Default::default()
        };
        report.process()?;
        Ok(request)
    }
}

impl Writer<GetObservationRequest> for GetObservationV2 {
    fn write_kvp(&self, request: &GetObservationRequest) -> CodecResult<KvpParams> {
        self.check_representable(request)?;
        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_list(OFFERING, &request.offerings);
        params.insert_list(PROCEDURE, &request.procedures);
        params.insert_list(OBSERVED_PROPERTY, &request.observed_properties);
        params.insert_list(FEATURE_OF_INTEREST, &request.features_of_interest);
        if let Some(filter) = &request.temporal_filter {
            params.insert(TEMPORAL_FILTER, write_temporal_kvp(self, filter)?);
        }
        if let Some(filter) = &request.spatial_filter {
            params.insert(SPATIAL_FILTER, write_spatial_kvp(self, filter)?);
        }
        params.insert_opt(RESPONSE_FORMAT, request.response_format.as_deref());
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, KNOWN)?;
        Ok(params)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &GetObservationRequest,
    ) -> CodecResult<XmlElement> {
        self.check_representable(request)?;
        let mut root = write_xml_envelope(self, ns, "sos", SOS_20, &request.common);
        root.add_texts("sos:procedure", &request.procedures);
        root.add_texts("sos:offering", &request.offerings);
        root.add_texts("sos:observedProperty", &request.observed_properties);
        if let Some(filter) = &request.temporal_filter {
            write_temporal_xml(ns, &mut root, filter);
        }
        root.add_texts("sos:featureOfInterest", &request.features_of_interest);
        if let Some(filter) = &request.spatial_filter {
            write_spatial_xml(ns, &mut root, filter);
        }
        if let Some(format) = &request.response_format {
            root.add_text("sos:responseFormat", format.as_str());
        }
        Ok(root)
    }
}

impl Reader<GetObservationResponse> for GetObservationV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetObservationResponse> {
        expect_root(element, "GetObservationResponse", SOS_20)?;
        let observations = element
            .children_at("sos:observationData")
            .into_iter()
            .filter_map(|data| data.first_element().cloned())
            .collect();
        Ok(GetObservationResponse { observations })
    }
}

impl Writer<GetObservationResponse> for GetObservationV2 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &GetObservationResponse,
    ) -> CodecResult<XmlElement> {
        register(ns);
        let mut root = XmlElement::new("sos:GetObservationResponse");
        for observation in &response.observations {
            root.add_path("sos:observationData").push(observation.clone());
        }
        Ok(root)
    }
}

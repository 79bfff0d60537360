use ows_common::namespaces::{GML_311, OM_10, SOS_10};
use ows_common::{
    CodecError, CodecResult, KvpParams, NamespaceContext, ReadResult, TimeValue, ValidationReport,
    Violation, XmlElement,
};

use super::{register, ENVELOPE};
use crate::bindings::common::{
    self, at_most_one, expect_root, opt_param, opt_text, refuse_extensions, required_list,
    required_param, required_text, single_param, unrepresentable,
};
use crate::bindings::filters::OGC_FILTER;
use crate::codec::{Codec, Reader, Writer};
use crate::model::{
    operations, versions, BinaryFilter, GetObservationRequest, GetObservationResponse,
    TemporalFilter, TemporalOperator,
};

const OFFERING: &str = "offering";
const EVENT_TIME: &str = "eventTime";
const PROCEDURE: &str = "procedure";
const OBSERVED_PROPERTY: &str = "observedProperty";
const FEATURE_OF_INTEREST: &str = "featureOfInterest";
const RESPONSE_FORMAT: &str = "responseFormat";
const RESULT_MODEL: &str = "resultModel";
const RESPONSE_MODE: &str = "responseMode";
const SRS_NAME: &str = "srsName";

const KNOWN: &[&str] = &[
    OFFERING,
    EVENT_TIME,
    PROCEDURE,
    OBSERVED_PROPERTY,
    FEATURE_OF_INTEREST,
    RESPONSE_FORMAT,
    RESULT_MODEL,
    RESPONSE_MODE,
    SRS_NAME,
];

/// The only property a KVP `eventTime` can address.
const SAMPLING_TIME: &str = "om:samplingTime";

/// SOS 1.0 GetObservation.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetObservationV1;

impl Codec for GetObservationV1 {
    fn operation(&self) -> &'static str {
        operations::GET_OBSERVATION
    }

    fn version(&self) -> &'static str {
        versions::SOS_100
    }
}

impl GetObservationV1 {
    fn check_offerings(&self, request: &GetObservationRequest) -> CodecResult<()> {
        if request.offerings.len() > 1 {
            return Err(unrepresentable(
                self,
                OFFERING,
                "SOS 1.0 queries exactly one offering",
            ));
        }
        Ok(())
    }

    /// `eventTime=<instant>|<begin>/<end>` against `om:samplingTime`.
    fn read_event_time_kvp(params: &KvpParams, report: &mut ValidationReport) -> Option<TemporalFilter> {
        let raw = opt_param(params, EVENT_TIME, report)?;
        match TimeValue::parse(&raw) {
            Ok(value) => {
                let operator = if value.is_period() {
                    TemporalOperator::During
                } else {
                    TemporalOperator::Equals
                };
                Some(BinaryFilter::new(operator, SAMPLING_TIME, value))
            }
            Err(e) => {
                report.add(Violation::invalid(EVENT_TIME, e.to_string()));
                None
            }
        }
    }

    fn write_event_time_kvp(&self, filter: &TemporalFilter) -> CodecResult<String> {
        if filter.value_reference != SAMPLING_TIME {
            return Err(unrepresentable(
                self,
                EVENT_TIME,
                format!("KVP eventTime only addresses {}", SAMPLING_TIME),
            ));
        }
        match (filter.operator, filter.value.is_period()) {
            (TemporalOperator::During, true) | (TemporalOperator::Equals, false) => {
                Ok(filter.value.to_kvp_string())
            }
            (TemporalOperator::During, false) | (TemporalOperator::Equals, true) => Err(
                unrepresentable(self, EVENT_TIME, "operator and time value do not match"),
            ),
            (operator, _) => Err(CodecError::UnsupportedOperator {
                field: EVENT_TIME.to_string(),
                operator: operator.ogc_name().to_string(),
                operation: self.operation().to_string(),
                version: self.version().to_string(),
            }),
        }
    }
}

impl Reader<GetObservationRequest> for GetObservationV1 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<GetObservationRequest> {
        let mut report = ValidationReport::new();
        let common = common::read_kvp_common(self, ENVELOPE, params, KNOWN, &mut report);
        let request = GetObservationRequest {
            common,
            offerings: single_param(params, OFFERING, &mut report).into_iter().collect(),
            temporal_filter: Self::read_event_time_kvp(params, &mut report),
            procedures: common::list_param(params, PROCEDURE, &mut report),
            observed_properties: required_list(params, OBSERVED_PROPERTY, &mut report),
            features_of_interest: common::list_param(params, FEATURE_OF_INTEREST, &mut report),
            spatial_filter: None,
            response_format: required_param(params, RESPONSE_FORMAT, &mut report),
            result_model: opt_param(params, RESULT_MODEL, &mut report),
            response_mode: opt_param(params, RESPONSE_MODE, &mut report),
            srs_name: opt_param(params, SRS_NAME, &mut report),
        };
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetObservationRequest> {
        let mut report = ValidationReport::new();
        let common = common::read_xml_common(self, ENVELOPE, SOS_10, element, &mut report)?;

        let offerings = common::text_list(element, "sos:offering");
        match offerings.len() {
            0 => report.add(Violation::missing(OFFERING)),
            1 => {}
            n => report.add(Violation::invalid(
                OFFERING,
                format!("Only one value is allowed, got {}", n),
            )),
        }

        let temporal_filter = match at_most_one(element, "sos:eventTime", EVENT_TIME, &mut report) {
            Some(event_time) => {
                let operator = event_time
                    .first_element()
                    .ok_or_else(|| CodecError::MissingElement("ogc temporal operator".to_string()))?;
                OGC_FILTER.read_temporal(self, operator, EVENT_TIME, &mut report)?
            }
            None => None,
        };

        let foi = element.child("sos:featureOfInterest");
        let spatial_filter = match foi.and_then(|f| f.first_element()) {
            Some(operator) if operator.local_name() != "ObjectID" => {
                OGC_FILTER.read_spatial(self, operator, FEATURE_OF_INTEREST, &mut report)?
            }
            _ => None,
        };
        let features_of_interest = foi
            .map(|f| common::text_list(f, "sos:ObjectID"))
            .unwrap_or_default();

        let observed_properties = common::text_list(element, "sos:observedProperty");
        report.require(!observed_properties.is_empty(), OBSERVED_PROPERTY);

        let request = GetObservationRequest {
            common,
            offerings,
            temporal_filter,
            procedures: common::text_list(element, "sos:procedure"),
            observed_properties,
            features_of_interest,
            spatial_filter,
            response_format: required_text(element, "sos:responseFormat", RESPONSE_FORMAT, &mut report),
            result_model: opt_text(element, "sos:resultModel", RESULT_MODEL, &mut report),
            response_mode: opt_text(element, "sos:responseMode", RESPONSE_MODE, &mut report),
            srs_name: element.attribute(SRS_NAME).map(str::to_string),
        };
        report.process()?;
        Ok(request)
    }
}

impl Writer<GetObservationRequest> for GetObservationV1 {
    fn write_kvp(&self, request: &GetObservationRequest) -> CodecResult<KvpParams> {
        self.check_offerings(request)?;
        if request.spatial_filter.is_some() {
            return Err(unrepresentable(
                self,
                "spatialFilter",
                "SOS 1.0 KVP has no spatial filter",
            ));
        }

        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_list(OFFERING, &request.offerings);
        if let Some(filter) = &request.temporal_filter {
            params.insert(EVENT_TIME, self.write_event_time_kvp(filter)?);
        }
        params.insert_list(PROCEDURE, &request.procedures);
        params.insert_list(OBSERVED_PROPERTY, &request.observed_properties);
        params.insert_list(FEATURE_OF_INTEREST, &request.features_of_interest);
        params.insert_opt(RESPONSE_FORMAT, request.response_format.as_deref());
        params.insert_opt(RESULT_MODEL, request.result_model.as_deref());
        params.insert_opt(RESPONSE_MODE, request.response_mode.as_deref());
        params.insert_opt(SRS_NAME, request.srs_name.as_deref());
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, KNOWN)?;
        Ok(params)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &GetObservationRequest,
    ) -> CodecResult<XmlElement> {
        self.check_offerings(request)?;
        refuse_extensions(self, &request.common.extensions)?;
        if request.spatial_filter.is_some() && !request.features_of_interest.is_empty() {
            return Err(unrepresentable(
                self,
                FEATURE_OF_INTEREST,
                "featureOfInterest holds either ObjectIDs or a spatial operator",
            ));
        }

        register(ns);
        let mut root = common::write_xml_common(self, ENVELOPE, ns, "sos", SOS_10, &request.common);
        if let Some(srs_name) = &request.srs_name {
            root.set_attribute(SRS_NAME, srs_name.as_str());
        }
        root.add_texts("sos:offering", &request.offerings);
        if let Some(filter) = &request.temporal_filter {
            OGC_FILTER.register(ns);
            root.add_path("sos:eventTime")
                .push(OGC_FILTER.write_temporal(filter, "eventTime_1"));
        }
        root.add_texts("sos:procedure", &request.procedures);
        root.add_texts("sos:observedProperty", &request.observed_properties);
        if let Some(filter) = &request.spatial_filter {
            OGC_FILTER.register(ns);
            root.add_path("sos:featureOfInterest")
                .push(OGC_FILTER.write_spatial(filter));
        } else if !request.features_of_interest.is_empty() {
            root.add_path("sos:featureOfInterest")
                .add_texts("sos:ObjectID", &request.features_of_interest);
        }
        if let Some(format) = &request.response_format {
            root.add_text("sos:responseFormat", format.as_str());
        }
        if let Some(model) = &request.result_model {
            root.add_text("sos:resultModel", model.as_str());
        }
        if let Some(mode) = &request.response_mode {
            root.add_text("sos:responseMode", mode.as_str());
        }
        Ok(root)
    }
}

impl Reader<GetObservationResponse> for GetObservationV1 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetObservationResponse> {
        expect_root(element, "ObservationCollection", OM_10)?;
        let observations = element
            .children_at("om:member")
            .into_iter()
            .filter_map(|member| member.first_element().cloned())
            .collect();
        Ok(GetObservationResponse { observations })
    }
}

impl Writer<GetObservationResponse> for GetObservationV1 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &GetObservationResponse,
    ) -> CodecResult<XmlElement> {
        ns.register("om", OM_10);
        ns.register("gml", GML_311);
        let mut root = XmlElement::new("om:ObservationCollection");
        root.set_attribute("gml:id", "oc_0");
        for observation in &response.observations {
            root.add_path("om:member").push(observation.clone());
        }
        Ok(root)
    }
}

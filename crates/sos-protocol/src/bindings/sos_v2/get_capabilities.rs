use ows_common::namespaces::SOS_20;
use ows_common::{
    CodecError, CodecResult, KvpParams, NamespaceContext, ReadResult, ValidationReport, XmlElement,
};

use super::register;
use crate::bindings::common::{self, expect_root};
use crate::bindings::filters::{
    find_gml_time, read_gml_envelope, read_gml_time, write_gml_envelope, write_gml_time, FES,
};
use crate::bindings::ows::{self, ENVELOPE};
use crate::capabilities::{CapabilityLists, OfferingCapabilities, ServiceCapabilities};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{operations, versions, GetCapabilitiesRequest, GetCapabilitiesResponse};

/// SOS 2.0 GetCapabilities.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetCapabilitiesV2;

impl Codec for GetCapabilitiesV2 {
    fn operation(&self) -> &'static str {
        operations::GET_CAPABILITIES
    }

    fn version(&self) -> &'static str {
        versions::SOS_200
    }
}

impl Reader<GetCapabilitiesRequest> for GetCapabilitiesV2 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<GetCapabilitiesRequest> {
        let mut report = ValidationReport::new();
        let request = ows::read_get_capabilities_kvp(self, params, &mut report);
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetCapabilitiesRequest> {
        let mut report = ValidationReport::new();
        let mut request = GetCapabilitiesRequest {
            common: common::read_xml_common(self, ENVELOPE, SOS_20, element, &mut report)?,
            ..Default::default()
        };
        common::read_swes_extensions(element, &mut request.common.extensions);
        ows::read_get_capabilities_body(element, &mut request);
        report.process()?;
        Ok(request)
    }
}

impl Writer<GetCapabilitiesRequest> for GetCapabilitiesV2 {
    fn write_kvp(&self, request: &GetCapabilitiesRequest) -> CodecResult<KvpParams> {
        ows::write_get_capabilities_kvp(self, request)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &GetCapabilitiesRequest,
    ) -> CodecResult<XmlElement> {
        register(ns);
        let mut root = common::write_xml_common(self, ENVELOPE, ns, "sos", SOS_20, &request.common);
        common::write_swes_extensions(ns, &mut root, &request.common.extensions);
        ows::write_get_capabilities_body(ns, &mut root, request);
        Ok(root)
    }
}

impl Reader<GetCapabilitiesResponse> for GetCapabilitiesV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<GetCapabilitiesResponse> {
        expect_root(element, "Capabilities", SOS_20)?;
        let mut capabilities = ServiceCapabilities {
            version: element.attribute("version").unwrap_or(versions::SOS_200).to_string(),
            update_sequence: element.attribute("updateSequence").map(str::to_string),
            ..Default::default()
        };
        ows::read_service_sections(element, &mut capabilities);

        if let Some(contents) = element.child("sos:contents/sos:Contents") {
            capabilities.defaults = read_lists(contents);
            for offering in contents.children_at("swes:offering/sos:ObservationOffering") {
                capabilities.offerings.push(read_offering(offering)?);
            }
        }
        capabilities.resolve();

        Ok(GetCapabilitiesResponse { capabilities })
    }
}

impl Writer<GetCapabilitiesResponse> for GetCapabilitiesV2 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &GetCapabilitiesResponse,
    ) -> CodecResult<XmlElement> {
        let capabilities = &response.capabilities;
        register(ns);
        FES.register(ns);

        let mut root = XmlElement::new("sos:Capabilities");
        root.set_attribute("version", versions::SOS_200);
        if let Some(sequence) = &capabilities.update_sequence {
            root.set_attribute("updateSequence", sequence.as_str());
        }
        ows::write_service_sections(ns, &mut root, capabilities);

        let contents = root.add_path("sos:contents/sos:Contents");
        contents.add_texts("swes:procedureDescriptionFormat", &capabilities.defaults.encodings);
        for (index, (offering, _)) in capabilities.resolve_offerings().into_iter().enumerate() {
            let element = contents.add_path("swes:offering/sos:ObservationOffering");
            write_offering(element, offering, &capabilities.defaults, index + 1);
        }
        write_contents_lists(contents, &capabilities.defaults);

        Ok(root)
    }
}

fn read_lists(element: &XmlElement) -> CapabilityLists {
    CapabilityLists {
        response_formats: common::text_list(element, "sos:responseFormat"),
        observation_types: common::text_list(element, "sos:observationType"),
        feature_of_interest_types: common::text_list(element, "sos:featureOfInterestType"),
        encodings: common::text_list(element, "swes:procedureDescriptionFormat"),
    }
}

fn write_contents_lists(element: &mut XmlElement, lists: &CapabilityLists) {
    element.add_texts("sos:responseFormat", &lists.response_formats);
    element.add_texts("sos:observationType", &lists.observation_types);
    element.add_texts("sos:featureOfInterestType", &lists.feature_of_interest_types);
}

fn read_offering(element: &XmlElement) -> CodecResult<OfferingCapabilities> {
    let identifier = element
        .text_at("swes:identifier")
        .ok_or_else(|| CodecError::MissingElement("swes:identifier".to_string()))?;

    let mut offering = OfferingCapabilities::new(identifier);
    offering.name = element.text_at("swes:name").map(str::to_string);
    offering.procedures = common::text_list(element, "swes:procedure");
    offering.observable_properties = common::text_list(element, "swes:observableProperty");
    offering.lists = read_lists(element);

    if let Some(envelope) = element.child("sos:observedArea/gml:Envelope") {
        offering.extent.envelope = Some(
            read_gml_envelope(envelope).map_err(|e| CodecError::Malformed(e.to_string()))?,
        );
    }
    if let Some(time) = element
        .child("sos:phenomenonTime")
        .and_then(find_gml_time)
    {
        offering.extent.phenomenon_time =
            Some(read_gml_time(time).map_err(|e| CodecError::Malformed(e.to_string()))?);
    }
    Ok(offering)
}

/// Lists equal to the service-level list are left out; readers inherit
/// them back.
fn write_offering(
    element: &mut XmlElement,
    offering: &OfferingCapabilities,
    defaults: &CapabilityLists,
    index: usize,
) {
    let own = |list: &[String], inherited: &[String]| -> Vec<String> {
        if list == inherited {
            Vec::new()
        } else {
            list.to_vec()
        }
    };

    element.add_text("swes:identifier", offering.identifier.as_str());
    if let Some(name) = &offering.name {
        element.add_text("swes:name", name.as_str());
    }
    element.add_texts("swes:procedure", &offering.procedures);
    element.add_texts(
        "swes:procedureDescriptionFormat",
        &own(&offering.lists.encodings, &defaults.encodings),
    );
    element.add_texts("swes:observableProperty", &offering.observable_properties);

    if let Some(envelope) = &offering.extent.envelope {
        element
            .add_path("sos:observedArea")
            .push(write_gml_envelope(envelope));
    }
    if let Some(time) = &offering.extent.phenomenon_time {
        element
            .add_path("sos:phenomenonTime")
            .push(write_gml_time(time, &format!("phenomenonTime_{}", index)));
    }

    element.add_texts(
        "sos:responseFormat",
        &own(&offering.lists.response_formats, &defaults.response_formats),
    );
    element.add_texts(
        "sos:observationType",
        &own(&offering.lists.observation_types, &defaults.observation_types),
    );
    element.add_texts(
        "sos:featureOfInterestType",
        &own(
            &offering.lists.feature_of_interest_types,
            &defaults.feature_of_interest_types,
        ),
    );
}

//! OWS 1.1 pieces shared by the SOS 1.0 and 2.0 GetCapabilities codecs:
//! the request body and the ServiceIdentification, ServiceProvider and
//! OperationsMetadata sections.

use ows_common::namespaces::{OWS_11, XLINK};
use ows_common::{KvpParams, NamespaceContext, ValidationReport, XmlElement};

use super::common::{self, opt_param, EnvelopeSpec, VERSION};
use crate::capabilities::{
    OperationMetadata, OperationParameter, ServiceCapabilities, ServiceIdentification,
};
use crate::codec::Codec;
use crate::model::{dedup_list, GetCapabilitiesRequest, SOS};

pub(crate) const ENVELOPE: EnvelopeSpec = EnvelopeSpec::without_version(SOS);

const ACCEPT_VERSIONS: &str = "acceptVersions";
const SECTIONS: &str = "sections";
const ACCEPT_FORMATS: &str = "acceptFormats";
const UPDATE_SEQUENCE: &str = "updateSequence";

const KNOWN: &[&str] = &[ACCEPT_VERSIONS, SECTIONS, ACCEPT_FORMATS, UPDATE_SEQUENCE];

// === GetCapabilities request ===

/// Read a KVP GetCapabilities. A `version` parameter naming this codec's
/// version is what selected the codec and is not kept; any other value is
/// carried as a vendor extension.
pub(crate) fn read_get_capabilities_kvp(
    codec: &dyn Codec,
    params: &KvpParams,
    report: &mut ValidationReport,
) -> GetCapabilitiesRequest {
    let mut known = KNOWN.to_vec();
    if params.get(VERSION).map(str::trim) == Some(codec.version()) {
        known.push(VERSION);
    }

    GetCapabilitiesRequest {
        common: common::read_kvp_common(codec, ENVELOPE, params, &known, report),
        accept_versions: common::list_param(params, ACCEPT_VERSIONS, report),
        sections: common::list_param(params, SECTIONS, report),
        accept_formats: common::list_param(params, ACCEPT_FORMATS, report),
        update_sequence: opt_param(params, UPDATE_SEQUENCE, report),
    }
}

pub(crate) fn write_get_capabilities_kvp(
    codec: &dyn Codec,
    request: &GetCapabilitiesRequest,
) -> ows_common::CodecResult<KvpParams> {
    let mut params = common::write_kvp_common(codec, ENVELOPE, &request.common);
    params.insert_list(ACCEPT_VERSIONS, &request.accept_versions);
    params.insert_list(SECTIONS, &request.sections);
    params.insert_list(ACCEPT_FORMATS, &request.accept_formats);
    params.insert_opt(UPDATE_SEQUENCE, request.update_sequence.as_deref());
    common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, KNOWN)?;
    Ok(params)
}

/// Read the OWS body of an XML GetCapabilities into `request`.
pub(crate) fn read_get_capabilities_body(element: &XmlElement, request: &mut GetCapabilitiesRequest) {
    request.accept_versions = dedup_list(element.texts_at("ows:AcceptVersions/ows:Version"));
    request.sections = dedup_list(element.texts_at("ows:Sections/ows:Section"));
    request.accept_formats = dedup_list(element.texts_at("ows:AcceptFormats/ows:OutputFormat"));
    request.update_sequence = element.attribute(UPDATE_SEQUENCE).map(str::to_string);
}

pub(crate) fn write_get_capabilities_body(
    ns: &mut NamespaceContext,
    root: &mut XmlElement,
    request: &GetCapabilitiesRequest,
) {
    ns.register("ows", OWS_11);
    if let Some(sequence) = &request.update_sequence {
        root.set_attribute(UPDATE_SEQUENCE, sequence.as_str());
    }
    if !request.accept_versions.is_empty() {
        root.add_path("ows:AcceptVersions")
            .add_texts("ows:Version", &request.accept_versions);
    }
    if !request.sections.is_empty() {
        root.add_path("ows:Sections")
            .add_texts("ows:Section", &request.sections);
    }
    if !request.accept_formats.is_empty() {
        root.add_path("ows:AcceptFormats")
            .add_texts("ows:OutputFormat", &request.accept_formats);
    }
}

// === Capabilities sections ===

/// Read ServiceIdentification, ServiceProvider and OperationsMetadata.
pub(crate) fn read_service_sections(root: &XmlElement, capabilities: &mut ServiceCapabilities) {
    capabilities.identification = root.child("ows:ServiceIdentification").map(|si| {
        ServiceIdentification {
            title: si.text_at("ows:Title").map(str::to_string),
            abstract_text: si.text_at("ows:Abstract").map(str::to_string),
            service_type: si.text_at("ows:ServiceType").unwrap_or_default().to_string(),
            service_type_versions: si.texts_at("ows:ServiceTypeVersion"),
            profiles: si.texts_at("ows:Profile"),
        }
    });

    capabilities.provider_name = root
        .text_at("ows:ServiceProvider/ows:ProviderName")
        .map(str::to_string);

    capabilities.operations = root
        .children_at("ows:OperationsMetadata/ows:Operation")
        .into_iter()
        .map(|op| OperationMetadata {
            name: op.attribute("name").unwrap_or_default().to_string(),
            get_url: op
                .child("ows:DCP/ows:HTTP/ows:Get")
                .and_then(|get| get.attribute("xlink:href"))
                .map(str::to_string),
            post_url: op
                .child("ows:DCP/ows:HTTP/ows:Post")
                .and_then(|post| post.attribute("xlink:href"))
                .map(str::to_string),
            parameters: op
                .children_at("ows:Parameter")
                .into_iter()
                .map(|param| OperationParameter {
                    name: param.attribute("name").unwrap_or_default().to_string(),
                    allowed_values: param.texts_at("ows:AllowedValues/ows:Value"),
                })
                .collect(),
        })
        .collect();
}

pub(crate) fn write_service_sections(
    ns: &mut NamespaceContext,
    root: &mut XmlElement,
    capabilities: &ServiceCapabilities,
) {
    ns.register("ows", OWS_11);

    if let Some(si) = &capabilities.identification {
        let element = root.add_path("ows:ServiceIdentification");
        if let Some(title) = &si.title {
            element.add_text("ows:Title", title.as_str());
        }
        if let Some(abstract_text) = &si.abstract_text {
            element.add_text("ows:Abstract", abstract_text.as_str());
        }
        element
            .add_text("ows:ServiceType", si.service_type.as_str())
            .set_attribute("codeSpace", "http://opengeospatial.net");
        element.add_texts("ows:ServiceTypeVersion", &si.service_type_versions);
        element.add_texts("ows:Profile", &si.profiles);
    }

    if let Some(provider) = &capabilities.provider_name {
        root.add_text("ows:ServiceProvider/ows:ProviderName", provider.as_str());
    }

    if !capabilities.operations.is_empty() {
        ns.register("xlink", XLINK);
        let metadata = root.add_path("ows:OperationsMetadata");
        for operation in &capabilities.operations {
            let element = metadata.add_path("ows:Operation");
            element.set_attribute("name", operation.name.as_str());
            let http = element.add_path("ows:DCP/ows:HTTP");
            if let Some(url) = &operation.get_url {
                http.add_path("ows:Get").set_attribute("xlink:href", url.as_str());
            }
            if let Some(url) = &operation.post_url {
                http.add_path("ows:Post").set_attribute("xlink:href", url.as_str());
            }
            for parameter in &operation.parameters {
                let param = element.add_path("ows:Parameter");
                param.set_attribute("name", parameter.name.as_str());
                param
                    .add_path("ows:AllowedValues")
                    .add_texts("ows:Value", &parameter.allowed_values);
            }
        }
    }
}

//! Transcoding commands on top of the codec registry.

use anyhow::{Context, Result};
use ows_common::namespaces::{SWE_20, XLINK};
use ows_common::{KvpParams, NamespaceContext, ReadError, ValidationFailure, XmlElement};
use serde::Serialize;
use sos_protocol::swe::xml::{read_component, write_component};
use sos_protocol::{CodecRegistry, DefinitionSet, Request};
use tracing::{debug, info};

/// Version stamped on exception reports when the input names none.
const DEFAULT_REPORT_VERSION: &str = "2.0.0";

/// A request that failed validation; carries every violation.
#[derive(Debug, thiserror::Error)]
#[error("{failure}")]
pub struct InvalidRequest {
    pub version: String,
    pub failure: ValidationFailure,
}

impl InvalidRequest {
    /// Render as an OWS ExceptionReport document.
    pub fn exception_report(&self) -> Result<String> {
        Ok(self.failure.to_exception_report(&self.version)?)
    }
}

/// Input encoding, detected from the first non-blank character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Kvp,
    Xml,
}

impl InputKind {
    pub fn detect(input: &str) -> Self {
        if input.trim_start().starts_with('<') {
            InputKind::Xml
        } else {
            InputKind::Kvp
        }
    }
}

/// Read a request in either encoding.
pub fn read_request(registry: &CodecRegistry, input: &str) -> Result<Request> {
    match InputKind::detect(input) {
        InputKind::Kvp => {
            let params = KvpParams::parse(input.trim()).context("Failed to parse KVP request")?;
            let version = params.get("version").map(str::to_string);
            registry
                .read_kvp_request(&params)
                .map_err(|e| reject(e, version))
        }
        InputKind::Xml => {
            let element = XmlElement::parse(input).context("Failed to parse XML request")?;
            let version = element.attribute("version").map(str::to_string);
            registry
                .read_xml_request(&element)
                .map_err(|e| reject(e, version))
        }
    }
}

fn reject(error: ReadError, version: Option<String>) -> anyhow::Error {
    match error {
        ReadError::Invalid(failure) => InvalidRequest {
            version: version.unwrap_or_else(|| DEFAULT_REPORT_VERSION.to_string()),
            failure,
        }
        .into(),
        ReadError::Structural(err) => anyhow::Error::new(err).context("Failed to read request"),
    }
}

/// Point the request at another protocol version before writing.
fn retarget(mut request: Request, to_version: Option<&str>) -> Request {
    if let Some(version) = to_version {
        debug!(from = request.version(), to = version, "Retargeting request");
        request.common_mut().version = version.to_string();
    }
    request
}

/// Read a request in either encoding and write it as XML.
pub fn to_xml(registry: &CodecRegistry, input: &str, to_version: Option<&str>) -> Result<String> {
    let request = retarget(read_request(registry, input)?, to_version);
    let xml = registry
        .write_xml_request(&request)
        .with_context(|| format!("Failed to write {} {} as XML", request.service(), request.version()))?;
    info!(
        service = request.service(),
        version = request.version(),
        bytes = xml.len(),
        "Wrote XML request"
    );
    Ok(xml)
}

/// Read a request in either encoding and write it as a KVP query string.
pub fn to_kvp(registry: &CodecRegistry, input: &str, to_version: Option<&str>) -> Result<String> {
    let request = retarget(read_request(registry, input)?, to_version);
    let params = registry
        .write_kvp_request(&request)
        .with_context(|| format!("Failed to write {} {} as KVP", request.service(), request.version()))?;
    info!(
        service = request.service(),
        version = request.version(),
        params = params.len(),
        "Wrote KVP request"
    );
    Ok(params.to_query_string())
}

/// Parsed request as JSON.
pub fn inspect(registry: &CodecRegistry, input: &str) -> Result<String> {
    let request = read_request(registry, input)?;
    serde_json::to_string_pretty(&request).context("Failed to serialize request")
}

#[derive(Debug, Serialize)]
struct BindingRow<'a> {
    service: &'a str,
    operation: &'a str,
    version: &'a str,
}

/// Registered bindings as a JSON array.
pub fn list_bindings(registry: &CodecRegistry) -> Result<String> {
    let rows: Vec<BindingRow<'_>> = registry
        .keys()
        .map(|key| BindingRow {
            service: &key.service,
            operation: &key.operation,
            version: &key.version,
        })
        .collect();
    serde_json::to_string_pretty(&rows).context("Failed to serialize bindings")
}

/// Prune a SWE data component document to the selected definitions.
///
/// Returns `None` when nothing of the structure is left.
pub fn prune_structure(input: &str, definitions: &[String]) -> Result<Option<String>> {
    let element = XmlElement::parse(input).context("Failed to parse result structure")?;
    let component = read_component(&element).context("Failed to read SWE data component")?;

    let selected: DefinitionSet = definitions.iter().cloned().collect();
    let Some(pruned) = component.pruned(&selected) else {
        info!(selected = selected.len(), "Result structure pruned away entirely");
        return Ok(None);
    };
    info!(
        before = component.definitions().len(),
        after = pruned.definitions().len(),
        "Pruned result structure"
    );

    let mut ns = NamespaceContext::new();
    ns.register("swe", SWE_20);
    ns.register("xlink", XLINK);
    let xml = write_component(&pruned)
        .to_xml_string(&ns)
        .context("Failed to write result structure")?;
    Ok(Some(xml))
}

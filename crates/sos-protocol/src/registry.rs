//! Codec registry keyed by (service, operation, version), and the dispatch
//! entry points that pick a codec from the envelope of an incoming message.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use ows_common::kvp::split_list;
use ows_common::{
    CodecError, CodecResult, KvpParams, NamespaceContext, ReadError, ReadResult, ValidationReport,
    XmlElement,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bindings::DEFAULT_BINDINGS;
use crate::codec::Binding;
use crate::model::{operations, MessageEnvelope, Request, Response};

const SERVICE: &str = "service";
const REQUEST: &str = "request";
const VERSION: &str = "version";
const ACCEPT_VERSIONS: &str = "acceptVersions";

/// Which bindings to enable. An empty configuration means none; use
/// [`CodecRegistry::with_defaults`] for the full table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    #[serde(default)]
    pub services: Vec<ServiceBindings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBindings {
    pub service: String,
    pub versions: Vec<String>,
    /// Operations to enable; empty enables every operation of each version.
    #[serde(default)]
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BindingKey {
    pub service: String,
    pub operation: String,
    pub version: String,
}

impl BindingKey {
    pub fn new(service: &str, operation: &str, version: &str) -> Self {
        Self {
            service: service.to_string(),
            operation: operation.to_string(),
            version: version.to_string(),
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.service, self.operation, self.version)
    }
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    bindings: BTreeMap<BindingKey, Binding>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in binding.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for entry in DEFAULT_BINDINGS {
            registry.register(entry.service, (entry.build)());
        }
        info!(bindings = registry.len(), "Registered default bindings");
        registry
    }

    /// Registry holding the configured subset of the built-in bindings.
    /// A configured service, version or operation without a built-in
    /// binding is an error.
    pub fn from_config(config: &BindingConfig) -> CodecResult<Self> {
        let mut registry = Self::new();

        for service in &config.services {
            for version in &service.versions {
                let available: Vec<_> = DEFAULT_BINDINGS
                    .iter()
                    .filter(|e| e.service == service.service && e.version == version.as_str())
                    .collect();
                if available.is_empty() {
                    return Err(CodecError::unsupported_binding(
                        &service.service,
                        "*",
                        version,
                    ));
                }

                if service.operations.is_empty() {
                    for entry in available {
                        registry.register(entry.service, (entry.build)());
                    }
                    continue;
                }

                for operation in &service.operations {
                    let entry = available
                        .iter()
                        .find(|e| e.operation == operation.as_str())
                        .ok_or_else(|| {
                            CodecError::unsupported_binding(&service.service, operation, version)
                        })?;
                    registry.register(entry.service, (entry.build)());
                }
            }
        }

        info!(
            bindings = registry.len(),
            services = config.services.len(),
            "Registered configured bindings"
        );
        Ok(registry)
    }

    /// Add a binding, replacing any binding with the same key.
    pub fn register(&mut self, service: &str, binding: Binding) -> Option<Binding> {
        let key = BindingKey::new(service, binding.operation(), binding.version());
        debug!(binding = %key, "Registering binding");
        self.bindings.insert(key, binding)
    }

    /// Exact lookup; there is no fallback to another version.
    pub fn resolve(&self, service: &str, operation: &str, version: &str) -> CodecResult<&Binding> {
        let key = BindingKey::new(service, operation, version);
        match self.bindings.get(&key) {
            Some(binding) => {
                debug!(binding = %key, "Resolved binding");
                Ok(binding)
            }
            None => {
                debug!(binding = %key, "No binding registered");
                Err(CodecError::unsupported_binding(service, operation, version))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered keys in (service, operation, version) order.
    pub fn keys(&self) -> impl Iterator<Item = &BindingKey> {
        self.bindings.keys()
    }

    /// Registered versions of an operation, lowest first.
    pub fn versions(&self, service: &str, operation: &str) -> Vec<&str> {
        let mut versions: Vec<&str> = self
            .bindings
            .keys()
            .filter(|k| k.service == service && k.operation == operation)
            .map(|k| k.version.as_str())
            .collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }

    /// GetCapabilities versions to try, most preferred first: accepted
    /// versions in client order, then the `version` parameter, then every
    /// registered version from the highest down.
    fn negotiation_order(&self, service: &str, accepted: &[String], version: Option<&str>) -> Vec<String> {
        let registered = self.versions(service, operations::GET_CAPABILITIES);
        let mut order: Vec<String> = Vec::new();
        let mut offer = |candidate: &str| {
            if registered.iter().any(|v| *v == candidate) && !order.iter().any(|v| v == candidate) {
                order.push(candidate.to_string());
            }
        };

        for candidate in accepted {
            offer(candidate.as_str());
        }
        if let Some(candidate) = version {
            offer(candidate);
        }
        for candidate in registered.iter().rev() {
            offer(*candidate);
        }
        order
    }

    // === Dispatch ===

    /// Read a KVP request, choosing the codec from `service`, `request` and
    /// `version`. Missing envelope parameters are reported together.
    pub fn read_kvp_request(&self, params: &KvpParams) -> ReadResult<Request> {
        let mut report = ValidationReport::new();
        let service = non_empty(params.get(SERVICE));
        let operation = non_empty(params.get(REQUEST));
        report.require(service.is_some(), SERVICE);
        report.require(operation.is_some(), REQUEST);

        let version = if operation == Some(operations::GET_CAPABILITIES) {
            let accepted = params.get(ACCEPT_VERSIONS).map(split_list).unwrap_or_default();
            service.and_then(|service| {
                self.negotiation_order(service, &accepted, non_empty(params.get(VERSION)))
                    .into_iter()
                    .next()
            })
        } else {
            let version = non_empty(params.get(VERSION)).map(str::to_string);
            report.require(version.is_some(), VERSION);
            version
        };
        report.process()?;

        let (Some(service), Some(operation)) = (service, operation) else {
            return Err(CodecError::Malformed("Incomplete request envelope".to_string()).into());
        };
        // Only GetCapabilities can get here without a version: nothing is
        // registered for the service.
        let version = version.unwrap_or_default();

        debug!(service, operation, version = %version, "Dispatching KVP request");
        self.resolve(service, operation, &version)?
            .request_reader()
            .read_kvp(params)
    }

    /// Read an XML request. The operation is the root element's local name;
    /// `service` and `version` come from its attributes.
    pub fn read_xml_request(&self, element: &XmlElement) -> ReadResult<Request> {
        let operation = element.local_name();
        let mut report = ValidationReport::new();
        let service = non_empty(element.attribute(SERVICE));
        report.require(service.is_some(), SERVICE);

        if operation == operations::GET_CAPABILITIES {
            report.process()?;
            let service = service.unwrap_or_default();
            return self.read_xml_get_capabilities(service, element);
        }

        let version = non_empty(element.attribute(VERSION));
        report.require(version.is_some(), VERSION);
        report.process()?;

        let service = service.unwrap_or_default();
        let version = version.unwrap_or_default();
        debug!(service, operation, version, "Dispatching XML request");
        self.resolve(service, operation, version)?
            .request_reader()
            .read_xml(element)
    }

    /// Versions share the GetCapabilities element name, so a codec that
    /// rejects the root namespace hands over to the next candidate.
    fn read_xml_get_capabilities(&self, service: &str, element: &XmlElement) -> ReadResult<Request> {
        let accepted = element.texts_at("AcceptVersions/Version");
        let order = self.negotiation_order(service, &accepted, non_empty(element.attribute(VERSION)));

        let mut last = None;
        for version in &order {
            debug!(service, version = %version, "Trying XML GetCapabilities");
            let binding = self.resolve(service, operations::GET_CAPABILITIES, version)?;
            match binding.request_reader().read_xml(element) {
                Err(ReadError::Structural(CodecError::UnexpectedElement { expected, found })) => {
                    last = Some(CodecError::UnexpectedElement { expected, found });
                }
                result => return result,
            }
        }

        Err(last
            .unwrap_or_else(|| CodecError::unsupported_binding(service, operations::GET_CAPABILITIES, ""))
            .into())
    }

    /// Write a request with the codec of its own service, operation and version.
    pub fn write_kvp_request(&self, request: &Request) -> CodecResult<KvpParams> {
        self.resolve(request.service(), request.operation(), request.version())?
            .request_writer()
            .write_kvp(request)
    }

    pub fn write_xml_request(&self, request: &Request) -> CodecResult<String> {
        let binding = self.resolve(request.service(), request.operation(), request.version())?;
        let mut ns = NamespaceContext::new();
        let element = binding.request_writer().write_xml(&mut ns, request)?;
        element.to_xml_string(&ns)
    }

    /// Responses carry no envelope, so the caller names the binding.
    pub fn read_xml_response(
        &self,
        service: &str,
        operation: &str,
        version: &str,
        element: &XmlElement,
    ) -> ReadResult<Response> {
        self.resolve(service, operation, version)?
            .response_reader()
            .read_xml(element)
    }

    pub fn write_xml_response(
        &self,
        service: &str,
        version: &str,
        response: &Response,
    ) -> CodecResult<String> {
        let binding = self.resolve(service, response.operation(), version)?;
        let mut ns = NamespaceContext::new();
        let element = binding.response_writer().write_xml(&mut ns, response)?;
        element.to_xml_string(&ns)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Numeric, component-wise comparison of dotted versions.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u32> { v.split('.').map(|p| p.parse().unwrap_or(0)).collect() };
    parse(a).cmp(&parse(b))
}

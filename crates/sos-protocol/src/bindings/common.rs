//! Envelope routines shared by every binding: `service`, `version` and
//! `request` handling, vendor extensions and parameter helpers.

use ows_common::kvp::split_list;
use ows_common::namespaces::SWE_20;
use ows_common::{
    CodecError, CodecResult, KvpParams, NamespaceContext, ValidationReport, Violation, XmlElement,
};

use crate::codec::Codec;
use crate::model::{dedup_list, Extensions, RequestCommon};

pub(crate) const SERVICE: &str = "service";
pub(crate) const VERSION: &str = "version";
pub(crate) const REQUEST: &str = "request";

/// Which envelope parameters a binding carries.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EnvelopeSpec {
    pub service: &'static str,
    /// GetCapabilities negotiates through AcceptVersions instead.
    pub has_version: bool,
}

impl EnvelopeSpec {
    pub const fn new(service: &'static str) -> Self {
        Self {
            service,
            has_version: true,
        }
    }

    pub const fn without_version(service: &'static str) -> Self {
        Self {
            service,
            has_version: false,
        }
    }

    fn reserved(&self) -> Vec<&'static str> {
        if self.has_version {
            vec![SERVICE, REQUEST, VERSION]
        } else {
            vec![SERVICE, REQUEST]
        }
    }
}

// === KVP ===

/// Read the envelope of a KVP request. Parameters that are neither part of
/// the envelope nor in `known` become vendor extensions under their original
/// spelling.
pub(crate) fn read_kvp_common(
    codec: &dyn Codec,
    spec: EnvelopeSpec,
    params: &KvpParams,
    known: &[&str],
    report: &mut ValidationReport,
) -> RequestCommon {
    let mut common = RequestCommon::new(spec.service, codec.version());

    match non_empty(params.get(SERVICE)) {
        None => report.add(Violation::missing(SERVICE)),
        Some(service) if service != spec.service => report.add(Violation::invalid(
            SERVICE,
            format!("Expected service '{}', got '{}'", spec.service, service),
        )),
        Some(service) => common.service = service.to_string(),
    }

    match non_empty(params.get(REQUEST)) {
        None => report.add(Violation::missing(REQUEST)),
        Some(request) if request != codec.operation() => report.add(Violation::invalid(
            REQUEST,
            format!("Expected request '{}', got '{}'", codec.operation(), request),
        )),
        Some(_) => {}
    }

    if spec.has_version {
        match non_empty(params.get(VERSION)) {
            None => report.add(Violation::missing(VERSION)),
            Some(version) if version != codec.version() => report.add(Violation::invalid(
                VERSION,
                format!("Expected version '{}', got '{}'", codec.version(), version),
            )),
            Some(_) => {}
        }
    }

    let reserved = spec.reserved();
    for (name, value) in params.iter() {
        if !is_one_of(name, &reserved) && !is_one_of(name, known) {
            insert_extension(&mut common.extensions, name, value);
        }
    }

    common
}

/// Start a KVP request with its envelope parameters.
pub(crate) fn write_kvp_common(
    codec: &dyn Codec,
    spec: EnvelopeSpec,
    common: &RequestCommon,
) -> KvpParams {
    let mut params = KvpParams::new();
    params.insert(SERVICE, common.service.as_str());
    params.insert(REQUEST, codec.operation());
    if spec.has_version {
        params.insert(VERSION, codec.version());
    }
    params
}

/// Append vendor extensions. An extension named like an envelope or
/// canonical parameter of the operation, or like another extension up to
/// case, is refused.
pub(crate) fn write_kvp_extensions(
    spec: EnvelopeSpec,
    params: &mut KvpParams,
    extensions: &Extensions,
    known: &[&str],
) -> CodecResult<()> {
    let reserved = spec.reserved();
    for (name, value) in extensions {
        if is_one_of(name, &reserved) || is_one_of(name, known) || params.contains(name) {
            return Err(CodecError::ExtensionConflict(name.clone()));
        }
        params.insert(name.as_str(), value.as_str());
    }
    Ok(())
}

/// Optional single value. A parameter that is present but empty is
/// reported as missing.
pub(crate) fn opt_param(
    params: &KvpParams,
    name: &str,
    report: &mut ValidationReport,
) -> Option<String> {
    match params.get(name) {
        Some(value) if value.trim().is_empty() => {
            report.add(Violation::missing(name));
            None
        }
        Some(value) => Some(value.trim().to_string()),
        None => None,
    }
}

/// Mandatory single value.
pub(crate) fn required_param(
    params: &KvpParams,
    name: &str,
    report: &mut ValidationReport,
) -> Option<String> {
    let value = non_empty(params.get(name)).map(str::to_string);
    report.require(value.is_some(), name);
    value
}

/// Optional comma-separated list, duplicates removed. Present but empty is
/// reported as missing.
pub(crate) fn list_param(params: &KvpParams, name: &str, report: &mut ValidationReport) -> Vec<String> {
    match params.get(name) {
        Some(value) => {
            let values = dedup_list(split_list(value));
            report.require(!values.is_empty(), name);
            values
        }
        None => Vec::new(),
    }
}

/// Mandatory comma-separated list.
pub(crate) fn required_list(
    params: &KvpParams,
    name: &str,
    report: &mut ValidationReport,
) -> Vec<String> {
    let values = params
        .get(name)
        .map(|value| dedup_list(split_list(value)))
        .unwrap_or_default();
    report.require(!values.is_empty(), name);
    values
}

/// Mandatory value that must not be a list.
pub(crate) fn single_param(
    params: &KvpParams,
    name: &str,
    report: &mut ValidationReport,
) -> Option<String> {
    let values = required_list(params, name, report);
    match values.as_slice() {
        [value] => Some(value.clone()),
        [] => None,
        _ => {
            report.add(Violation::invalid(
                name,
                format!("Only one value is allowed, got {}", values.len()),
            ));
            None
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_one_of(name: &str, names: &[&str]) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

// === XML ===

/// Check the root element and read the `service`/`version` attributes.
pub(crate) fn read_xml_common(
    codec: &dyn Codec,
    spec: EnvelopeSpec,
    namespace: &str,
    element: &XmlElement,
    report: &mut ValidationReport,
) -> CodecResult<RequestCommon> {
    expect_root(element, codec.operation(), namespace)?;
    let mut common = RequestCommon::new(spec.service, codec.version());

    match non_empty(element.attribute(SERVICE)) {
        None => report.add(Violation::missing(SERVICE)),
        Some(service) if service != spec.service => report.add(Violation::invalid(
            SERVICE,
            format!("Expected service '{}', got '{}'", spec.service, service),
        )),
        Some(service) => common.service = service.to_string(),
    }

    if spec.has_version {
        match non_empty(element.attribute(VERSION)) {
            None => report.add(Violation::missing(VERSION)),
            Some(version) if version != codec.version() => report.add(Violation::invalid(
                VERSION,
                format!("Expected version '{}', got '{}'", codec.version(), version),
            )),
            Some(_) => {}
        }
    }

    Ok(common)
}

/// The root must be `local` in `namespace`.
pub(crate) fn expect_root(element: &XmlElement, local: &str, namespace: &str) -> CodecResult<()> {
    if element.local_name() != local || element.namespace() != Some(namespace) {
        return Err(CodecError::UnexpectedElement {
            expected: format!("{{{}}}{}", namespace, local),
            found: format!(
                "{{{}}}{}",
                element.namespace().unwrap_or_default(),
                element.local_name()
            ),
        });
    }
    Ok(())
}

/// Create the root element of a request.
pub(crate) fn write_xml_common(
    codec: &dyn Codec,
    spec: EnvelopeSpec,
    ns: &mut NamespaceContext,
    prefix: &str,
    namespace: &str,
    common: &RequestCommon,
) -> XmlElement {
    ns.register(prefix, namespace);
    let mut root = XmlElement::new(format!("{}:{}", prefix, codec.operation()));
    root.set_attribute(SERVICE, common.service.as_str());
    if spec.has_version {
        root.set_attribute(VERSION, codec.version());
    }
    root
}

/// Read `swes:extension` children. SWE components contribute
/// `definition -> value`; any other element contributes its own name and
/// text.
pub(crate) fn read_swes_extensions(element: &XmlElement, extensions: &mut Extensions) {
    for extension in element.children_at("swes:extension") {
        for content in extension.elements() {
            let (key, value) = match content.attribute("definition") {
                Some(definition) => (
                    definition.to_string(),
                    content.text_at("swe:value").unwrap_or_default().to_string(),
                ),
                None => (
                    content.name().to_string(),
                    content.text().map(str::trim).unwrap_or_default().to_string(),
                ),
            };
            insert_extension(extensions, &key, &value);
        }
    }
}

/// Names differing only by case are one extension; the last one wins, as
/// with [`KvpParams::get`].
pub(crate) fn insert_extension(extensions: &mut Extensions, name: &str, value: &str) {
    extensions.retain(|n, _| !n.eq_ignore_ascii_case(name));
    extensions.insert(name.to_string(), value.to_string());
}

/// Write each extension as `swes:extension/swe:Text[@definition]/swe:value`.
pub(crate) fn write_swes_extensions(
    ns: &mut NamespaceContext,
    root: &mut XmlElement,
    extensions: &Extensions,
) {
    if extensions.is_empty() {
        return;
    }
    ns.register("swe", SWE_20);
    for (definition, value) in extensions {
        let text = root.add_path("swes:extension/swe:Text");
        text.set_attribute("definition", definition.as_str());
        text.add_text("swe:value", value.as_str());
    }
}

/// Versions without an XML extension point cannot carry vendor data.
pub(crate) fn refuse_extensions(codec: &dyn Codec, extensions: &Extensions) -> CodecResult<()> {
    match extensions.keys().next() {
        None => Ok(()),
        Some(name) => Err(CodecError::Unrepresentable {
            field: format!("extension '{}'", name),
            operation: codec.operation().to_string(),
            version: codec.version().to_string(),
            reason: "this version has no XML extension point".to_string(),
        }),
    }
}

/// Optional single text element; present but empty is reported as missing.
pub(crate) fn opt_text(
    element: &XmlElement,
    path: &str,
    locator: &str,
    report: &mut ValidationReport,
) -> Option<String> {
    match element.child(path) {
        Some(_) => {
            let value = element.text_at(path).map(str::to_string);
            report.require(value.is_some(), locator);
            value
        }
        None => None,
    }
}

/// Mandatory single text element.
pub(crate) fn required_text(
    element: &XmlElement,
    path: &str,
    locator: &str,
    report: &mut ValidationReport,
) -> Option<String> {
    let value = element.text_at(path).map(str::to_string);
    report.require(value.is_some(), locator);
    value
}

/// Set-like list of texts (or `xlink:href` values for empty elements).
pub(crate) fn text_list(element: &XmlElement, path: &str) -> Vec<String> {
    let values = element
        .children_at(path)
        .into_iter()
        .filter_map(|el| {
            el.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .or_else(|| el.attribute("xlink:href"))
                .map(str::to_string)
        })
        .collect();
    dedup_list(values)
}

/// At most one element at `path`; more are reported against `locator`.
pub(crate) fn at_most_one<'a>(
    element: &'a XmlElement,
    path: &str,
    locator: &str,
    report: &mut ValidationReport,
) -> Option<&'a XmlElement> {
    let found = element.children_at(path);
    if found.len() > 1 {
        report.add(Violation::unsupported(
            locator,
            format!("Only one {} is supported, got {}", locator, found.len()),
        ));
        return None;
    }
    found.into_iter().next()
}

/// Unrepresentable value error for `field`.
pub(crate) fn unrepresentable(codec: &dyn Codec, field: &str, reason: impl Into<String>) -> CodecError {
    CodecError::Unrepresentable {
        field: field.to_string(),
        operation: codec.operation().to_string(),
        version: codec.version().to_string(),
        reason: reason.into(),
    }
}

//! Path-addressed XML element facade.
//!
//! Codecs never touch quick-xml directly. They navigate parsed documents with
//! slash-separated paths (`sos:contents/sos:Contents`), read and set text and
//! attributes, and build output by creating elements at paths. Path lookups
//! match on local names; created elements keep the qualified name they were
//! given and resolve their prefix through the [`NamespaceContext`] handed to
//! the serializer.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;

use crate::error::{CodecError, CodecResult};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix to namespace URI table registered on the root of an output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    bindings: Vec<(String, String)>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `uri`. Re-registering a prefix rebinds it.
    pub fn register(&mut self, prefix: &str, uri: &str) {
        match self.bindings.iter_mut().find(|(p, _)| p == prefix) {
            Some(binding) => binding.1 = uri.to_string(),
            None => self.bindings.push((prefix.to_string(), uri.to_string())),
        }
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlAttribute {
    /// Qualified name as written.
    pub name: String,
    /// Resolved namespace for prefixed attributes.
    pub namespace: Option<String>,
    pub value: String,
}

/// An XML element with its attributes, text and child elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlElement {
    name: String,
    namespace: Option<String>,
    attributes: Vec<XmlAttribute>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an element with a qualified name such as `sos:offering`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Pin the namespace URI of this element, so it is declared on output
    /// even when its prefix is not in the document's namespace table.
    pub fn with_namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespace = Some(uri.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        prefix_part(&self.name)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Look up an attribute by qualified name, falling back to local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .or_else(|| {
                let local = local_part(name);
                self.attributes.iter().find(|a| local_part(&a.name) == local)
            })
            .map(|a| a.value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(XmlAttribute {
                name: name.to_string(),
                namespace: None,
                value,
            }),
        }
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Direct child elements.
    pub fn elements(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn first_element(&self) -> Option<&XmlElement> {
        self.children.first()
    }

    /// Append a child element and return it.
    pub fn push(&mut self, child: XmlElement) -> &mut XmlElement {
        self.children.push(child);
        let idx = self.children.len() - 1;
        &mut self.children[idx]
    }

    /// First element reachable along `path`.
    pub fn child(&self, path: &str) -> Option<&XmlElement> {
        self.children_at(path).into_iter().next()
    }

    /// All elements reachable along `path`, in document order.
    pub fn children_at(&self, path: &str) -> Vec<&XmlElement> {
        let mut current: Vec<&XmlElement> = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let local = local_part(segment);
            current = current
                .into_iter()
                .flat_map(|el| el.children.iter().filter(|c| c.local_name() == local))
                .collect();
        }
        current
    }

    /// Trimmed, non-empty text of the first element at `path`.
    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.child(path)
            .and_then(|el| el.text())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Trimmed, non-empty texts of every element at `path`.
    pub fn texts_at(&self, path: &str) -> Vec<String> {
        self.children_at(path)
            .into_iter()
            .filter_map(|el| el.text())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Create an element at `path`. Intermediate elements are reused when a
    /// child with the same qualified name exists; the last segment is always
    /// a new element.
    pub fn add_path(&mut self, path: &str) -> &mut XmlElement {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut current = self;
        if let Some((last, parents)) = segments.split_last() {
            for segment in parents {
                let idx = match current.children.iter().rposition(|c| c.name == *segment) {
                    Some(idx) => idx,
                    None => {
                        current.children.push(XmlElement::new(*segment));
                        current.children.len() - 1
                    }
                };
                current = &mut current.children[idx];
            }
            current = current.push(XmlElement::new(*last));
        }
        current
    }

    /// Create an element at `path` holding `text`.
    pub fn add_text(&mut self, path: &str, text: impl Into<String>) -> &mut XmlElement {
        let element = self.add_path(path);
        element.set_text(text);
        element
    }

    /// Create one element at `path` per entry of `texts`.
    pub fn add_texts(&mut self, path: &str, texts: &[String]) {
        for text in texts {
            self.add_text(path, text.as_str());
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> CodecResult<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut scopes: Vec<Vec<(Option<String>, String)>> = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let (element, declarations) = open_element(&start, &scopes)?;
                    scopes.push(declarations);
                    stack.push(element);
                }
                Ok(Event::Empty(start)) => {
                    let (element, _) = open_element(&start, &scopes)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    scopes.pop();
                    let element = stack
                        .pop()
                        .ok_or_else(|| CodecError::Xml("Unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text.unescape()?;
                    append_text(&mut stack, &text);
                }
                Ok(Event::CData(data)) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|e| CodecError::Xml(e.to_string()))?;
                    append_text(&mut stack, &text);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(CodecError::Xml(format!(
                        "Parse error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(CodecError::Xml(format!("Unclosed element '{}'", open.name)));
        }
        root.ok_or_else(|| CodecError::Xml("Document has no root element".to_string()))
    }

    /// Serialize as a standalone document, declaring every prefix in `ns` on
    /// this element and any other namespace where first needed.
    pub fn to_xml_string(&self, ns: &NamespaceContext) -> CodecResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut scope: Vec<(Option<String>, String)> = Vec::new();
        write_element(&mut writer, self, Some(ns), &mut scope)?;

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| CodecError::Xml(e.to_string()))
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

fn prefix_part(name: &str) -> Option<&str> {
    name.split_once(':').map(|(prefix, _)| prefix)
}

fn lookup<'a>(
    prefix: Option<&str>,
    declarations: &'a [(Option<String>, String)],
    scopes: &'a [Vec<(Option<String>, String)>],
) -> Option<&'a str> {
    if prefix == Some("xml") {
        return Some(XML_NAMESPACE);
    }
    declarations
        .iter()
        .rev()
        .chain(scopes.iter().rev().flat_map(|s| s.iter().rev()))
        .find(|(p, _)| p.as_deref() == prefix)
        .map(|(_, uri)| uri.as_str())
}

fn open_element(
    start: &BytesStart<'_>,
    scopes: &[Vec<(Option<String>, String)>],
) -> CodecResult<(XmlElement, Vec<(Option<String>, String)>)> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| CodecError::Xml(e.to_string()))?
        .to_string();

    let mut declarations = Vec::new();
    let mut raw_attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CodecError::Xml(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| CodecError::Xml(e.to_string()))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        if key == "xmlns" {
            declarations.push((None, value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declarations.push((Some(prefix.to_string()), value));
        } else {
            raw_attributes.push((key, value));
        }
    }

    let namespace = lookup(prefix_part(&name), &declarations, scopes).map(str::to_string);
    let attributes = raw_attributes
        .into_iter()
        .map(|(name, value)| {
            let namespace = prefix_part(&name)
                .and_then(|p| lookup(Some(p), &declarations, scopes))
                .map(str::to_string);
            XmlAttribute {
                name,
                namespace,
                value,
            }
        })
        .collect();

    let element = XmlElement {
        name,
        namespace,
        attributes,
        text: None,
        children: Vec::new(),
    };
    Ok((element, declarations))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> CodecResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(CodecError::Xml("Document has more than one root element".to_string())),
    }
}

fn append_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        match current.text.as_mut() {
            Some(existing) => existing.push_str(text),
            None => current.text = Some(text.to_string()),
        }
    }
}

fn declare_if_needed(
    prefix: Option<&str>,
    uri: &str,
    scope: &[(Option<String>, String)],
    declarations: &mut Vec<(Option<String>, String)>,
) {
    if prefix == Some("xml") {
        return;
    }
    let bound = declarations
        .iter()
        .rev()
        .chain(scope.iter().rev())
        .find(|(p, _)| p.as_deref() == prefix)
        .map(|(_, u)| u.as_str());
    if bound != Some(uri) {
        declarations.push((prefix.map(str::to_string), uri.to_string()));
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
    root_ns: Option<&NamespaceContext>,
    scope: &mut Vec<(Option<String>, String)>,
) -> CodecResult<()> {
    let mark = scope.len();

    let mut declarations: Vec<(Option<String>, String)> = Vec::new();
    if let Some(ns) = root_ns {
        for (prefix, uri) in ns.iter() {
            declarations.push((Some(prefix.to_string()), uri.to_string()));
        }
    }
    if let Some(uri) = &element.namespace {
        declare_if_needed(element.prefix(), uri, scope, &mut declarations);
    }
    for attr in &element.attributes {
        if let (Some(prefix), Some(uri)) = (prefix_part(&attr.name), &attr.namespace) {
            declare_if_needed(Some(prefix), uri, scope, &mut declarations);
        }
    }

    let mut start = BytesStart::new(element.name.as_str());
    for (prefix, uri) in &declarations {
        let key = match prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        start.push_attribute((key.as_str(), uri.as_str()));
    }
    for attr in &element.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }
    scope.extend(declarations);

    if element.children.is_empty() && element.text.is_none() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &element.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &element.children {
            write_element(writer, child, None, scope)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    }

    scope.truncate(mark);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<sos:GetObservation service="SOS" version="2.0.0"
    xmlns:sos="http://www.opengis.net/sos/2.0" xmlns:fes="http://www.opengis.net/fes/2.0">
  <sos:offering>off-1</sos:offering>
  <sos:offering>off-2</sos:offering>
  <sos:temporalFilter>
    <fes:During><fes:ValueReference>phenomenonTime</fes:ValueReference></fes:During>
  </sos:temporalFilter>
  <sos:responseFormat><![CDATA[text/xml; subtype="om/2.0"]]></sos:responseFormat>
</sos:GetObservation>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let root = XmlElement::parse(DOC).unwrap();
        assert_eq!(root.name(), "sos:GetObservation");
        assert_eq!(root.local_name(), "GetObservation");
        assert_eq!(root.namespace(), Some("http://www.opengis.net/sos/2.0"));
        assert_eq!(root.attribute("service"), Some("SOS"));

        let during = root.child("sos:temporalFilter/fes:During").unwrap();
        assert_eq!(during.namespace(), Some("http://www.opengis.net/fes/2.0"));
    }

    #[test]
    fn test_path_lookups() {
        let root = XmlElement::parse(DOC).unwrap();
        assert_eq!(root.texts_at("sos:offering"), vec!["off-1", "off-2"]);
        assert_eq!(
            root.text_at("temporalFilter/During/ValueReference"),
            Some("phenomenonTime")
        );
        assert_eq!(
            root.text_at("sos:responseFormat"),
            Some(r#"text/xml; subtype="om/2.0""#)
        );
        assert!(root.child("sos:spatialFilter").is_none());
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        assert!(matches!(
            XmlElement::parse("<a><b></a>"),
            Err(CodecError::Xml(_))
        ));
        assert!(matches!(XmlElement::parse(""), Err(CodecError::Xml(_))));
    }

    #[test]
    fn test_add_path_reuses_parents() {
        let mut root = XmlElement::new("sos:Contents");
        root.add_text("swes:offering/sos:ObservationOffering/swes:identifier", "a");
        root.add_text("swes:offering/sos:ObservationOffering/swes:name", "b");
        assert_eq!(root.elements().len(), 1);
        let offering = root.child("offering/ObservationOffering").unwrap();
        assert_eq!(offering.elements().len(), 2);
    }

    #[test]
    fn test_serialize_declares_registered_and_pinned_namespaces() {
        let mut ns = NamespaceContext::new();
        ns.register("sos", "http://www.opengis.net/sos/2.0");
        ns.register("gml", "http://www.opengis.net/gml/3.2");

        let mut root = XmlElement::new("sos:GetObservationResponse");
        let data = root.add_path("sos:observationData");
        data.push(XmlElement::new("om:OM_Observation").with_namespace("http://www.opengis.net/om/2.0"))
            .set_attribute("gml:id", "o1");

        let xml = root.to_xml_string(&ns).unwrap();
        assert!(xml.contains(r#"xmlns:sos="http://www.opengis.net/sos/2.0""#));
        assert!(xml.contains(r#"xmlns:om="http://www.opengis.net/om/2.0""#));

        let reparsed = XmlElement::parse(&xml).unwrap();
        let observation = reparsed.child("observationData/OM_Observation").unwrap();
        assert_eq!(observation.namespace(), Some("http://www.opengis.net/om/2.0"));
        assert_eq!(observation.attribute("gml:id"), Some("o1"));
    }

    #[test]
    fn test_parsed_subtree_keeps_inherited_namespaces_on_output() {
        let root = XmlElement::parse(DOC).unwrap();
        let filter = root.child("sos:temporalFilter").unwrap().clone();
        let xml = filter.to_xml_string(&NamespaceContext::new()).unwrap();
        assert!(xml.contains(r#"xmlns:fes="http://www.opengis.net/fes/2.0""#));
        assert!(xml.contains(r#"xmlns:sos="http://www.opengis.net/sos/2.0""#));
    }

    #[test]
    fn test_text_escaping_roundtrip() {
        let mut root = XmlElement::new("value");
        root.set_text("a < b & c");
        let xml = root.to_xml_string(&NamespaceContext::new()).unwrap();
        assert_eq!(XmlElement::parse(&xml).unwrap().text(), Some("a < b & c"));
    }
}

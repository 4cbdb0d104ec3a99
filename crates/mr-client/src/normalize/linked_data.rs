//! Linked-data normalization: N-Triples and RDF/XML into triples.
//!
//! Triples are emitted in document order and never deduplicated.

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use serde::Serialize;

use mr_common::{MrError, MrResult};
use mr_ogc::ResponseFormat;

use super::utf8;

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "_:{}", id),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "{:?}", value)?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)?;
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{}>", dt)?;
                }
                Ok(())
            }
        }
    }
}

/// A subject-predicate-object statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

// ============================================================================
// N-Triples
// ============================================================================

/// Parse an N-Triples document. An empty document is an empty graph.
pub(super) fn from_ntriples(payload: &[u8]) -> MrResult<Vec<Triple>> {
    let format = ResponseFormat::NTriples;
    let text = utf8(payload, format)?;

    let mut triples = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let triple = LineParser::new(line).triple().map_err(|message| {
            MrError::malformed(format.to_string(), format!("line {}: {}", idx + 1, message))
        })?;
        triples.push(triple);
    }
    Ok(triples)
}

struct LineParser<'a> {
    rest: &'a str,
}

impl<'a> LineParser<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn triple(mut self) -> Result<Triple, String> {
        let subject = match self.peek() {
            Some('<') => Term::Iri(self.iri()?),
            Some('_') => Term::BlankNode(self.blank_node()?),
            _ => return Err("subject must be an IRI or blank node".to_string()),
        };
        self.skip_ws();
        if self.peek() != Some('<') {
            return Err("predicate must be an IRI".to_string());
        }
        let predicate = self.iri()?;
        self.skip_ws();
        let object = match self.peek() {
            Some('<') => Term::Iri(self.iri()?),
            Some('_') => Term::BlankNode(self.blank_node()?),
            Some('"') => self.literal()?,
            _ => return Err("object must be an IRI, blank node or literal".to_string()),
        };
        self.skip_ws();
        self.expect('.')?;
        self.skip_ws();
        if !self.rest.is_empty() && !self.rest.starts_with('#') {
            return Err(format!("unexpected trailing content '{}'", self.rest));
        }
        Ok(Triple::new(subject, predicate, object))
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                Ok(())
            }
            None => Err(format!("expected '{}'", c)),
        }
    }

    fn iri(&mut self) -> Result<String, String> {
        self.expect('<')?;
        let end = self.rest.find('>').ok_or("unterminated IRI")?;
        let iri = self.rest[..end].to_string();
        if iri.contains(char::is_whitespace) {
            return Err(format!("IRI '{}' contains whitespace", iri));
        }
        self.rest = &self.rest[end + 1..];
        Ok(iri)
    }

    fn blank_node(&mut self) -> Result<String, String> {
        self.rest = self.rest.strip_prefix("_:").ok_or("blank node must start with '_:'")?;
        let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
        // "_:b1." is a valid statement end.
        let label = self.rest[..end].trim_end_matches('.');
        if label.is_empty() {
            return Err("empty blank node label".to_string());
        }
        let (label, rest) = self.rest.split_at(label.len());
        self.rest = rest;
        Ok(label.to_string())
    }

    fn literal(&mut self) -> Result<Term, String> {
        self.expect('"')?;
        let mut value = String::new();
        let mut chars = self.rest.char_indices();
        let end = loop {
            let (idx, c) = chars.next().ok_or("unterminated literal")?;
            match c {
                '"' => break idx,
                '\\' => {
                    let (_, escaped) = chars.next().ok_or("dangling escape")?;
                    match escaped {
                        't' => value.push('\t'),
                        'b' => value.push('\u{8}'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        'f' => value.push('\u{c}'),
                        '"' => value.push('"'),
                        '\'' => value.push('\''),
                        '\\' => value.push('\\'),
                        'u' | 'U' => {
                            let len = if escaped == 'u' { 4 } else { 8 };
                            let hex: String = chars.by_ref().take(len).map(|(_, c)| c).collect();
                            // from_str_radix alone would accept a sign.
                            let code = Some(&hex)
                                .filter(|h| h.len() == len && h.chars().all(|c| c.is_ascii_hexdigit()))
                                .and_then(|h| u32::from_str_radix(h, 16).ok())
                                .and_then(char::from_u32)
                                .ok_or_else(|| format!("invalid unicode escape '{}'", hex))?;
                            value.push(code);
                        }
                        other => return Err(format!("unknown escape '\\{}'", other)),
                    }
                }
                c => value.push(c),
            }
        };
        self.rest = &self.rest[end + 1..];

        let mut datatype = None;
        let mut language = None;
        if let Some(rest) = self.rest.strip_prefix("^^") {
            self.rest = rest;
            datatype = Some(self.iri()?);
        } else if let Some(rest) = self.rest.strip_prefix('@') {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(rest.len());
            if end == 0 {
                return Err("empty language tag".to_string());
            }
            language = Some(rest[..end].to_string());
            self.rest = &rest[end..];
        }

        Ok(Term::Literal {
            value,
            datatype,
            language,
        })
    }
}

// ============================================================================
// RDF/XML
// ============================================================================

enum Frame {
    Root {
        language: Option<String>,
    },
    Node {
        subject: Term,
        language: Option<String>,
    },
    Property {
        subject: Term,
        predicate: String,
        reify: Option<Term>,
        datatype: Option<String>,
        language: Option<String>,
        text: String,
        object_set: bool,
    },
    /// `rdf:parseType="Literal"` (or any unrecognized parse type): raw XML
    /// content is kept verbatim.
    XmlLiteral {
        subject: Term,
        predicate: String,
        reify: Option<Term>,
        xml: String,
        depth: usize,
    },
    Collection {
        subject: Term,
        predicate: String,
        reify: Option<Term>,
        language: Option<String>,
        items: Vec<Term>,
    },
}

impl Frame {
    fn language(&self) -> Option<&String> {
        match self {
            Frame::Root { language }
            | Frame::Node { language, .. }
            | Frame::Property { language, .. }
            | Frame::Collection { language, .. } => language.as_ref(),
            Frame::XmlLiteral { .. } => None,
        }
    }
}

/// The statement a node element is the object of.
struct Parent {
    subject: Term,
    predicate: String,
    reify: Option<Term>,
}

struct Attr {
    /// Expanded name (namespace + local) or the bare local name if unbound
    name: String,
    /// Raw qualified name as written
    qname: String,
    value: String,
}

/// Parse an RDF/XML document.
pub(super) fn from_rdf_xml(payload: &[u8]) -> MrResult<Vec<Triple>> {
    let format = ResponseFormat::RdfXml;
    let malformed = |message: String| MrError::malformed(format.to_string(), message);
    if payload.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(malformed("empty payload".to_string()));
    }

    let mut reader = NsReader::from_reader(payload);
    let mut buf = Vec::new();
    let mut graph = RdfXmlGraph::default();

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| malformed(e.to_string()))?;

        if graph.capturing_literal() {
            graph.capture(&event).map_err(&malformed)?;
            buf.clear();
            continue;
        }
        let ns = namespace(ns).map_err(&malformed)?;

        match event {
            Event::Start(e) => {
                let name = expand(ns, e.local_name().as_ref());
                let attrs = attributes(&reader, &e).map_err(&malformed)?;
                graph.start(name, attrs).map_err(&malformed)?;
            }
            Event::Empty(e) => {
                let name = expand(ns, e.local_name().as_ref());
                let attrs = attributes(&reader, &e).map_err(&malformed)?;
                graph.start(name, attrs).map_err(&malformed)?;
                graph.end().map_err(&malformed)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| malformed(e.to_string()))?;
                graph.text(&text).map_err(&malformed)?;
            }
            Event::CData(t) => {
                graph.text(&String::from_utf8_lossy(&t)).map_err(&malformed)?;
            }
            Event::End(_) => graph.end().map_err(&malformed)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !graph.saw_element {
        return Err(malformed("no RDF content".to_string()));
    }
    if !graph.stack.is_empty() {
        return Err(malformed("document ended inside an element".to_string()));
    }
    Ok(graph.triples)
}

fn namespace(ns: ResolveResult) -> Result<Option<String>, String> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        )),
    }
}

fn expand(ns: Option<String>, local: &[u8]) -> String {
    let local = String::from_utf8_lossy(local);
    match ns {
        Some(ns) => format!("{}{}", ns, local),
        None => local.into_owned(),
    }
}

fn attributes(reader: &NsReader<&[u8]>, element: &BytesStart<'_>) -> Result<Vec<Attr>, String> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let qname = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if qname == "xmlns" || qname.starts_with("xmlns:") {
            continue;
        }
        let name = if qname.starts_with("xml:") {
            qname.clone()
        } else {
            let (ns, local) = reader.resolve_attribute(attr.key);
            expand(namespace(ns)?, local.as_ref())
        };
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        attrs.push(Attr { name, qname, value });
    }
    Ok(attrs)
}

fn rdf(local: &str) -> String {
    format!("{}{}", RDF_NS, local)
}

#[derive(Default)]
struct RdfXmlGraph {
    stack: Vec<Frame>,
    triples: Vec<Triple>,
    blank_counter: usize,
    saw_element: bool,
}

impl RdfXmlGraph {
    fn fresh_blank(&mut self) -> Term {
        self.blank_counter += 1;
        Term::BlankNode(format!("genid{}", self.blank_counter))
    }

    fn emit(&mut self, subject: Term, predicate: impl Into<String>, object: Term) {
        self.triples.push(Triple::new(subject, predicate, object));
    }

    /// Emit a statement and, when the property element carried `rdf:ID`,
    /// its reification quad.
    fn emit_statement(&mut self, subject: Term, predicate: String, object: Term, reify: Option<Term>) {
        self.emit(subject.clone(), predicate.clone(), object.clone());
        if let Some(statement) = reify {
            self.emit(statement.clone(), rdf("type"), Term::Iri(rdf("Statement")));
            self.emit(statement.clone(), rdf("subject"), subject);
            self.emit(statement.clone(), rdf("predicate"), Term::Iri(predicate));
            self.emit(statement, rdf("object"), object);
        }
    }

    fn in_scope_language(&self) -> Option<String> {
        self.stack.last().and_then(Frame::language).cloned()
    }

    fn capturing_literal(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::XmlLiteral { .. }))
    }

    /// Append a raw event to the open XML literal, closing it on the
    /// property's end tag.
    fn capture(&mut self, event: &Event<'_>) -> Result<(), String> {
        let (xml, depth) = match self.stack.last_mut() {
            Some(Frame::XmlLiteral { xml, depth, .. }) => (xml, depth),
            _ => return Ok(()),
        };

        match event {
            Event::Start(e) => {
                xml.push('<');
                xml.push_str(&String::from_utf8_lossy(e));
                xml.push('>');
                *depth += 1;
            }
            Event::Empty(e) => {
                xml.push('<');
                xml.push_str(&String::from_utf8_lossy(e));
                xml.push_str("/>");
            }
            Event::End(e) if *depth > 0 => {
                xml.push_str("</");
                xml.push_str(&String::from_utf8_lossy(e.name().as_ref()));
                xml.push('>');
                *depth -= 1;
            }
            Event::End(_) => return self.end(),
            Event::Text(t) => xml.push_str(&String::from_utf8_lossy(t)),
            Event::CData(t) => {
                xml.push_str("<![CDATA[");
                xml.push_str(&String::from_utf8_lossy(t));
                xml.push_str("]]>");
            }
            Event::Comment(t) => {
                xml.push_str("<!--");
                xml.push_str(&String::from_utf8_lossy(t));
                xml.push_str("-->");
            }
            Event::Eof => return Err("document ended inside an XML literal".to_string()),
            _ => {}
        }
        Ok(())
    }

    fn start(&mut self, name: String, attrs: Vec<Attr>) -> Result<(), String> {
        self.saw_element = true;

        let mut into_collection = false;
        let parent = match self.stack.last_mut() {
            None if name == rdf("RDF") => {
                let language = attrs
                    .into_iter()
                    .find(|attr| attr.qname == "xml:lang")
                    .map(|attr| attr.value);
                self.stack.push(Frame::Root { language });
                return Ok(());
            }
            None | Some(Frame::Root { .. }) => None,
            Some(Frame::Node { subject, .. }) => {
                let subject = subject.clone();
                return self.property_element(subject, name, attrs);
            }
            Some(Frame::Property {
                subject,
                predicate,
                reify,
                object_set,
                ..
            }) => {
                if *object_set {
                    return Err(format!("property {} has more than one object", predicate));
                }
                *object_set = true;
                Some(Parent {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    reify: reify.clone(),
                })
            }
            Some(Frame::Collection { .. }) => {
                into_collection = true;
                None
            }
            Some(Frame::XmlLiteral { .. }) => {
                return Err("element inside an XML literal".to_string());
            }
        };

        let member = self.node_element(name, attrs, parent)?;
        if into_collection {
            // The member's node frame sits directly above the collection.
            let idx = self.stack.len().saturating_sub(2);
            if let Some(Frame::Collection { items, .. }) = self.stack.get_mut(idx) {
                items.push(member);
            }
        }
        Ok(())
    }

    fn node_element(
        &mut self,
        name: String,
        attrs: Vec<Attr>,
        parent: Option<Parent>,
    ) -> Result<Term, String> {
        let mut subject = None;
        let mut language = self.in_scope_language();
        let mut properties = Vec::new();

        for attr in attrs {
            if attr.name == rdf("about") {
                subject = Some(Term::Iri(attr.value));
            } else if attr.name == rdf("nodeID") {
                subject = Some(Term::BlankNode(attr.value));
            } else if attr.name == rdf("ID") {
                subject = Some(Term::Iri(format!("#{}", attr.value)));
            } else if attr.qname == "xml:lang" {
                language = Some(attr.value).filter(|lang| !lang.is_empty());
            } else if attr.name == rdf("type") {
                properties.push((rdf("type"), Term::Iri(attr.value)));
            } else if !is_reserved(&attr) {
                properties.push((attr.name, Term::literal(attr.value)));
            }
        }

        let subject = match subject {
            Some(subject) => subject,
            None => self.fresh_blank(),
        };

        if let Some(parent) = parent {
            self.emit_statement(parent.subject, parent.predicate, subject.clone(), parent.reify);
        }
        if name != rdf("Description") {
            self.emit(subject.clone(), rdf("type"), Term::Iri(name));
        }
        for (predicate, object) in properties {
            self.emit(subject.clone(), predicate, with_language(object, &language));
        }

        self.stack.push(Frame::Node {
            subject: subject.clone(),
            language,
        });
        Ok(subject)
    }

    fn property_element(
        &mut self,
        subject: Term,
        predicate: String,
        attrs: Vec<Attr>,
    ) -> Result<(), String> {
        let mut datatype = None;
        let mut language = self.in_scope_language();
        let mut object = None;
        let mut reify = None;
        let mut parse_type = None;
        let mut properties = Vec::new();

        for attr in attrs {
            if attr.name == rdf("resource") {
                object = Some(Term::Iri(attr.value));
            } else if attr.name == rdf("nodeID") {
                object = Some(Term::BlankNode(attr.value));
            } else if attr.name == rdf("datatype") {
                datatype = Some(attr.value);
            } else if attr.name == rdf("parseType") {
                parse_type = Some(attr.value);
            } else if attr.name == rdf("ID") {
                reify = Some(Term::Iri(format!("#{}", attr.value)));
            } else if attr.qname == "xml:lang" {
                language = Some(attr.value).filter(|lang| !lang.is_empty());
            } else if attr.name == rdf("type") {
                properties.push((rdf("type"), Term::Iri(attr.value)));
            } else if !is_reserved(&attr) {
                properties.push((attr.name, Term::literal(attr.value)));
            }
        }

        match parse_type.as_deref() {
            None => {}
            Some("Resource") => {
                let node = self.fresh_blank();
                self.emit_statement(subject, predicate, node.clone(), reify);
                self.stack.push(Frame::Node {
                    subject: node,
                    language,
                });
                return Ok(());
            }
            Some("Collection") => {
                self.stack.push(Frame::Collection {
                    subject,
                    predicate,
                    reify,
                    language,
                    items: Vec::new(),
                });
                return Ok(());
            }
            // "Literal" and every other value keep the content as XML.
            Some(_) => {
                self.stack.push(Frame::XmlLiteral {
                    subject,
                    predicate,
                    reify,
                    xml: String::new(),
                    depth: 0,
                });
                return Ok(());
            }
        }

        // Property attributes describe the object, a fresh blank node
        // unless rdf:resource or rdf:nodeID names it.
        if object.is_none() && !properties.is_empty() {
            object = Some(self.fresh_blank());
        }

        let object_set = match object {
            Some(object) => {
                self.emit_statement(subject.clone(), predicate.clone(), object.clone(), reify.clone());
                for (property, value) in properties {
                    self.emit(object.clone(), property, with_language(value, &language));
                }
                true
            }
            None => false,
        };

        self.stack.push(Frame::Property {
            subject,
            predicate,
            reify,
            datatype,
            language,
            text: String::new(),
            object_set,
        });
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), String> {
        match self.stack.last_mut() {
            Some(Frame::Property {
                text: buffer,
                object_set: false,
                ..
            }) => {
                buffer.push_str(text);
                Ok(())
            }
            _ if text.trim().is_empty() => Ok(()),
            _ => Err(format!("unexpected text '{}' outside a property", text.trim())),
        }
    }

    fn end(&mut self) -> Result<(), String> {
        match self.stack.pop() {
            Some(Frame::Property {
                subject,
                predicate,
                reify,
                datatype,
                language,
                text,
                object_set: false,
            }) => {
                // A datatype excludes the language tag.
                let language = if datatype.is_some() { None } else { language };
                let object = Term::Literal {
                    value: text,
                    datatype,
                    language,
                };
                self.emit_statement(subject, predicate, object, reify);
                Ok(())
            }
            Some(Frame::XmlLiteral {
                subject,
                predicate,
                reify,
                xml,
                ..
            }) => {
                let object = Term::Literal {
                    value: xml,
                    datatype: Some(rdf("XMLLiteral")),
                    language: None,
                };
                self.emit_statement(subject, predicate, object, reify);
                Ok(())
            }
            Some(Frame::Collection {
                subject,
                predicate,
                reify,
                items,
                ..
            }) => {
                let cells: Vec<Term> = items.iter().map(|_| self.fresh_blank()).collect();
                let head = cells.first().cloned().unwrap_or_else(|| Term::Iri(rdf("nil")));
                self.emit_statement(subject, predicate, head, reify);
                for (idx, (cell, item)) in cells.iter().zip(items).enumerate() {
                    let rest = cells
                        .get(idx + 1)
                        .cloned()
                        .unwrap_or_else(|| Term::Iri(rdf("nil")));
                    self.emit(cell.clone(), rdf("first"), item);
                    self.emit(cell.clone(), rdf("rest"), rest);
                }
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err("unbalanced end element".to_string()),
        }
    }
}

fn with_language(term: Term, language: &Option<String>) -> Term {
    match term {
        Term::Literal {
            value,
            datatype: None,
            language: None,
        } => Term::Literal {
            value,
            datatype: None,
            language: language.clone(),
        },
        other => other,
    }
}

fn is_reserved(attr: &Attr) -> bool {
    attr.qname.starts_with("xml:") || attr.name.starts_with(RDF_NS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntriples_terms() {
        let nt = br#"<http://marineregions.org/mrgid/3293> <http://www.w3.org/2000/01/rdf-schema#label> "Belgian Exclusive Economic Zone"@en .
<http://marineregions.org/mrgid/3293> <http://marineregions.org/ns/ontology#hasGeometry> _:g1 .
_:g1 <http://www.opengis.net/ont/geosparql#asWKT> "POINT (2.5 51.5)"^^<http://www.opengis.net/ont/geosparql#wktLiteral> .
# comment line
"#;
        let triples = from_ntriples(nt).unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0].object, Term::Literal {
            value: "Belgian Exclusive Economic Zone".to_string(),
            datatype: None,
            language: Some("en".to_string()),
        });
        assert_eq!(triples[1].object, Term::BlankNode("g1".to_string()));
        assert_eq!(triples[2].subject, Term::BlankNode("g1".to_string()));
    }

    #[test]
    fn test_ntriples_escapes() {
        let nt = br#"<urn:a> <urn:b> "line\none \"quoted\" caf\u00E9" ."#;
        let triples = from_ntriples(nt).unwrap();
        assert_eq!(triples[0].object, Term::literal("line\none \"quoted\" café"));
    }

    #[test]
    fn test_ntriples_errors() {
        assert!(from_ntriples(b"<urn:a> <urn:b> \"open .").is_err());
        assert!(from_ntriples(b"<urn:a> <urn:b> <urn:c>").is_err());
        assert!(from_ntriples(b"\"lit\" <urn:b> <urn:c> .").is_err());
    }

    #[test]
    fn test_rdf_xml_nested_nodes() {
        let xml = br#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:mr="http://marineregions.org/ns/ontology#"
         xmlns:skos="http://www.w3.org/2004/02/skos/core#">
  <mr:MRGeoObject rdf:about="http://marineregions.org/mrgid/3293">
    <skos:prefLabel xml:lang="en">Belgian Exclusive Economic Zone</skos:prefLabel>
    <mr:isPartOf rdf:resource="http://marineregions.org/mrgid/2350"/>
    <mr:hasGeometry>
      <rdf:Description>
        <mr:srid rdf:datatype="http://www.w3.org/2001/XMLSchema#int">4326</mr:srid>
      </rdf:Description>
    </mr:hasGeometry>
  </mr:MRGeoObject>
</rdf:RDF>"#;
        let triples = from_rdf_xml(xml).unwrap();
        let subject = Term::iri("http://marineregions.org/mrgid/3293");

        assert_eq!(triples.len(), 5);
        assert_eq!(
            triples[0],
            Triple::new(
                subject.clone(),
                rdf("type"),
                Term::iri("http://marineregions.org/ns/ontology#MRGeoObject")
            )
        );
        assert_eq!(
            triples[2],
            Triple::new(
                subject.clone(),
                "http://marineregions.org/ns/ontology#isPartOf",
                Term::iri("http://marineregions.org/mrgid/2350")
            )
        );
        assert_eq!(triples[3].object, Term::BlankNode("genid1".to_string()));
        assert_eq!(
            triples[4].object,
            Term::Literal {
                value: "4326".to_string(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#int".to_string()),
                language: None,
            }
        );
    }

    #[test]
    fn test_rdf_xml_truncated() {
        let xml = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="urn:a">"#;
        assert!(from_rdf_xml(xml).is_err());
    }

    #[test]
    fn test_ntriples_unicode_escape_needs_hex_digits() {
        let triples = from_ntriples(br#"<urn:a> <urn:b> "\u0041" ."#).unwrap();
        assert_eq!(triples[0].object, Term::literal("A"));
        assert!(from_ntriples(br#"<urn:a> <urn:b> "\u+041" ."#).is_err());
        assert!(from_ntriples(br#"<urn:a> <urn:b> "\U+0000041" ."#).is_err());
    }

    #[test]
    fn test_repeated_triples_are_kept() {
        let nt = b"<urn:a> <urn:p> <urn:b> .\n<urn:a> <urn:q> \"x\" .\n<urn:a> <urn:p> <urn:b> .\n";
        let triples = from_ntriples(nt).unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0], triples[2]);
        assert_eq!(triples[1].predicate, "urn:q");

        let xml = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://ex.org/">
  <rdf:Description rdf:about="urn:a">
    <ex:p rdf:resource="urn:b"/>
    <ex:q>x</ex:q>
    <ex:p rdf:resource="urn:b"/>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = from_rdf_xml(xml).unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0], triples[2]);
        assert_eq!(triples[0], Triple::new(Term::iri("urn:a"), "http://ex.org/p", Term::iri("urn:b")));
    }

    #[test]
    fn test_rdf_xml_literal_parse_type() {
        let xml = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://ex.org/">
  <rdf:Description rdf:about="urn:a">
    <ex:note rdf:parseType="Literal">Some <b>bold</b> text</ex:note>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = from_rdf_xml(xml).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(
            triples[0].object,
            Term::Literal {
                value: "Some <b>bold</b> text".to_string(),
                datatype: Some(rdf("XMLLiteral")),
                language: None,
            }
        );
    }

    #[test]
    fn test_rdf_xml_property_attributes_describe_blank_object() {
        let xml = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://ex.org/">
  <rdf:Description rdf:about="urn:a">
    <ex:geom ex:srid="4326"/>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = from_rdf_xml(xml).unwrap();
        let node = Term::BlankNode("genid1".to_string());
        assert_eq!(
            triples,
            vec![
                Triple::new(Term::iri("urn:a"), "http://ex.org/geom", node.clone()),
                Triple::new(node, "http://ex.org/srid", Term::literal("4326")),
            ]
        );
    }

    #[test]
    fn test_rdf_xml_collection() {
        let xml = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://ex.org/">
  <rdf:Description rdf:about="urn:a">
    <ex:members rdf:parseType="Collection">
      <rdf:Description rdf:about="urn:b"/>
      <rdf:Description rdf:about="urn:c"/>
    </ex:members>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = from_rdf_xml(xml).unwrap();
        let first = Term::BlankNode("genid1".to_string());
        let second = Term::BlankNode("genid2".to_string());
        assert_eq!(
            triples,
            vec![
                Triple::new(Term::iri("urn:a"), "http://ex.org/members", first.clone()),
                Triple::new(first.clone(), rdf("first"), Term::iri("urn:b")),
                Triple::new(first, rdf("rest"), second.clone()),
                Triple::new(second.clone(), rdf("first"), Term::iri("urn:c")),
                Triple::new(second, rdf("rest"), Term::iri(rdf("nil"))),
            ]
        );
    }

    #[test]
    fn test_rdf_xml_reification_and_inherited_language() {
        let xml = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://ex.org/">
  <rdf:Description rdf:about="urn:a" xml:lang="nl">
    <ex:name rdf:ID="s1">Belgische EEZ</ex:name>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = from_rdf_xml(xml).unwrap();
        let name = Term::Literal {
            value: "Belgische EEZ".to_string(),
            datatype: None,
            language: Some("nl".to_string()),
        };
        let statement = Term::iri("#s1");

        assert_eq!(triples.len(), 5);
        assert_eq!(triples[0], Triple::new(Term::iri("urn:a"), "http://ex.org/name", name.clone()));
        assert_eq!(triples[1], Triple::new(statement.clone(), rdf("type"), Term::iri(rdf("Statement"))));
        assert_eq!(triples[4], Triple::new(statement, rdf("object"), name));
    }
}

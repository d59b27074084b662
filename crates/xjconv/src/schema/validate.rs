//! Instance validation against a compiled schema

use std::fmt;
use std::result::Result as StdResult;

use tracing::{instrument, warn};

use crate::schema::model::{Compositor, ContentModel, ElementDecl, Group, Schema, SimpleType};
use crate::xml::model::{Document, Element};
use crate::xml::parser::Parser;

/// Outcome of validating a document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    valid: bool,
    message: String,
}

impl Validation {
    pub(crate) fn accepted() -> Self {
        Self {
            valid: true,
            message: "XML is valid.".to_string(),
        }
    }

    pub(crate) fn rejected(detail: impl fmt::Display) -> Self {
        Self {
            valid: false,
            message: format!("XML is not valid: {detail}"),
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Human readable status line
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// First schema violation found in a document
#[derive(Debug)]
struct Violation {
    path: String,
    reason: String,
}

impl Violation {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

type Checked = StdResult<(), Violation>;

/// Namespace of `xsi:*` attributes
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace bindings in scope at an element
#[derive(Clone, Debug)]
struct Scope<'a> {
    default: Option<&'a str>,
    prefixes: Vec<(&'a str, &'a str)>,
}

impl<'a> Scope<'a> {
    fn document() -> Self {
        Self {
            default: None,
            prefixes: vec![("xml", XML_NAMESPACE)],
        }
    }

    /// Bindings in scope inside `element`, including its own declarations
    fn enter(&self, element: &'a Element) -> Self {
        let mut scope = self.clone();
        for (key, value) in &element.attributes {
            if key == "xmlns" {
                scope.default = Some(value.as_str()).filter(|ns| !ns.is_empty());
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.prefixes.push((prefix, value.as_str()));
            }
        }
        scope
    }

    fn resolve(&self, prefix: &str) -> Option<&'a str> {
        self.prefixes
            .iter()
            .rev()
            .find(|(bound, _)| *bound == prefix)
            .map(|(_, ns)| *ns)
    }
}

impl Schema {
    /// Validate an XML document. Malformed input is reported as invalid.
    #[instrument(skip_all, fields(len = xml.len()))]
    pub fn validate(&self, xml: &str) -> Validation {
        let doc = match Parser::new(xml.as_bytes()).parse() {
            Ok(doc) => doc,
            Err(err) => {
                warn!(%err, "document is not well-formed");
                return Validation::rejected(err);
            }
        };

        match self.check_document(&doc) {
            Ok(()) => Validation::accepted(),
            Err(violation) => {
                warn!(path = %violation.path, reason = %violation.reason, "schema violation");
                Validation::rejected(violation)
            }
        }
    }

    fn check_document(&self, doc: &Document) -> Checked {
        let root = &doc.root;
        let path = format!("/{}", root.name);
        let scope = Scope::document().enter(root);
        check_namespace(root, &scope, &path)?;

        let decl = self.element(&root.name).ok_or_else(|| {
            Violation::new(&path, format!("no declaration for root element <{}>", root.name))
        })?;
        check_element(decl, root, &scope, &path)
    }
}

/// Declared elements have no target namespace, so instance elements must be unqualified
fn check_namespace(element: &Element, scope: &Scope<'_>, path: &str) -> Checked {
    let namespace = match element.name.split_once(':') {
        Some((prefix, _)) => match scope.resolve(prefix) {
            Some(ns) => ns,
            None => {
                return Err(Violation::new(
                    path,
                    format!(
                        "namespace prefix '{prefix}' of <{}> is not declared",
                        element.name
                    ),
                ))
            }
        },
        None => match scope.default {
            Some(ns) => ns,
            None => return Ok(()),
        },
    };
    Err(Violation::new(
        path,
        format!(
            "element <{}> is in namespace '{namespace}', expected no namespace",
            element.name
        ),
    ))
}

fn check_element(
    decl: &ElementDecl,
    element: &Element,
    scope: &Scope<'_>,
    path: &str,
) -> Checked {
    check_attributes(element, scope, path)?;

    match &decl.content {
        ContentModel::Simple(SimpleType::String) => match element.child_elements().next() {
            Some(child) => Err(Violation::new(
                path,
                format!("element <{}> is not allowed in text-only content", child.name),
            )),
            None => Ok(()),
        },
        ContentModel::Complex(group) => {
            if !element.text().trim().is_empty() {
                return Err(Violation::new(path, "text content is not allowed"));
            }
            let children = scoped_children(element, scope, path)?;
            match group.compositor {
                Compositor::Sequence => check_sequence(group, &children, path),
                Compositor::All => check_all(group, &children, path),
            }
        }
    }
}

/// Only namespace declarations and `xsi:*` attributes bound to the XSI namespace are allowed
fn check_attributes(element: &Element, scope: &Scope<'_>, path: &str) -> Checked {
    let disallowed = element.attributes.keys().find(|key| {
        let allowed = match key.split_once(':') {
            None => key.as_str() == "xmlns",
            Some(("xmlns", _)) => true,
            Some((prefix, _)) => scope.resolve(prefix) == Some(XSI_NAMESPACE),
        };
        !allowed
    });
    match disallowed {
        Some(key) => Err(Violation::new(path, format!("attribute '{key}' is not allowed"))),
        None => Ok(()),
    }
}

fn scoped_children<'a>(
    element: &'a Element,
    scope: &Scope<'a>,
    path: &str,
) -> StdResult<Vec<(&'a Element, Scope<'a>)>, Violation> {
    element
        .child_elements()
        .map(|child| {
            let child_scope = scope.enter(child);
            check_namespace(child, &child_scope, path)?;
            Ok((child, child_scope))
        })
        .collect()
}

fn check_sequence(group: &Group, children: &[(&Element, Scope<'_>)], path: &str) -> Checked {
    let mut index = 0;

    for particle in &group.particles {
        let mut count: u32 = 0;
        while let Some((child, scope)) = children.get(index) {
            let next = count.saturating_add(1);
            if child.name != particle.name || !particle.max_occurs.allows(next) {
                break;
            }
            count = next;
            check_element(particle, child, scope, &child_path(path, particle, count))?;
            index += 1;
        }

        if count < particle.min_occurs {
            let reason = match children.get(index) {
                Some((child, _)) => format!(
                    "unexpected element <{}>, expected <{}>",
                    child.name, particle.name
                ),
                None => format!("missing required element <{}>", particle.name),
            };
            return Err(Violation::new(path, reason));
        }
    }

    match children.get(index) {
        Some((extra, _)) => Err(Violation::new(
            path,
            format!("unexpected element <{}>", extra.name),
        )),
        None => Ok(()),
    }
}

fn check_all(group: &Group, children: &[(&Element, Scope<'_>)], path: &str) -> Checked {
    let mut seen: Vec<&str> = Vec::new();

    for (child, scope) in children {
        let name = child.name.as_str();
        let particle = group.particle(name).ok_or_else(|| {
            Violation::new(path, format!("unexpected element <{name}>"))
        })?;
        if seen.contains(&name) {
            return Err(Violation::new(
                path,
                format!("element <{name}> appears more than once"),
            ));
        }
        seen.push(name);
        check_element(particle, child, scope, &format!("{path}/{name}"))?;
    }

    match group
        .particles
        .iter()
        .find(|p| p.is_required() && !seen.contains(&p.name.as_str()))
    {
        Some(missing) => Err(Violation::new(
            path,
            format!("missing required element <{}>", missing.name),
        )),
        None => Ok(()),
    }
}

fn child_path(parent: &str, decl: &ElementDecl, position: u32) -> String {
    if decl.max_occurs.is_repeated() {
        format!("{parent}/{}[{position}]", decl.name)
    } else {
        format!("{parent}/{}", decl.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    const LIBRARY_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:element name="Library">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="Name" type="xs:string"/>
            <xs:element name="Book" minOccurs="0" maxOccurs="2">
              <xs:complexType>
                <xs:all>
                  <xs:element name="Title" type="xs:string"/>
                  <xs:element name="Year" type="xs:string" minOccurs="0"/>
                </xs:all>
              </xs:complexType>
            </xs:element>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:schema>"#;

    fn check(xml: &str) -> Result<Validation> {
        Ok(Schema::compile(LIBRARY_XSD)?.validate(xml))
    }

    #[test]
    fn test_valid_documents() -> Result<()> {
        let valid = check("<Library><Name>City</Name></Library>")?;
        assert!(valid.is_valid());
        assert_eq!(valid.message(), "XML is valid.");

        let books = check(
            "<Library><Name>City</Name>\
             <Book><Year>1999</Year><Title>A</Title></Book>\
             <Book><Title>B</Title></Book></Library>",
        )?;
        assert!(books.is_valid());
        Ok(())
    }

    #[test]
    fn test_sequence_violations() -> Result<()> {
        assert_eq!(
            check("<Library/>")?.message(),
            "XML is not valid: /Library: missing required element <Name>"
        );
        assert_eq!(
            check("<Library><Book><Title>A</Title></Book><Name>x</Name></Library>")?.message(),
            "XML is not valid: /Library: unexpected element <Book>, expected <Name>"
        );
        let three = "<Book><Title>A</Title></Book>".repeat(3);
        assert_eq!(
            check(&format!("<Library><Name>x</Name>{three}</Library>"))?.message(),
            "XML is not valid: /Library: unexpected element <Book>"
        );
        Ok(())
    }

    #[test]
    fn test_all_group_violations() -> Result<()> {
        assert_eq!(
            check("<Library><Name>x</Name><Book><Year>1</Year></Book></Library>")?.message(),
            "XML is not valid: /Library/Book[1]: missing required element <Title>"
        );
        assert_eq!(
            check("<Library><Name>x</Name><Book><Title>a</Title></Book><Book><Title>a</Title><Title>b</Title></Book></Library>")?
                .message(),
            "XML is not valid: /Library/Book[2]: element <Title> appears more than once"
        );
        assert_eq!(
            check("<Library><Name>x</Name><Book><Title>a</Title><Isbn>1</Isbn></Book></Library>")?
                .message(),
            "XML is not valid: /Library/Book[1]: unexpected element <Isbn>"
        );
        Ok(())
    }

    #[test]
    fn test_content_violations() -> Result<()> {
        assert_eq!(
            check("<Library><Name><b>x</b></Name></Library>")?.message(),
            "XML is not valid: /Library/Name: element <b> is not allowed in text-only content"
        );
        assert_eq!(
            check("<Library>loose<Name>x</Name></Library>")?.message(),
            "XML is not valid: /Library: text content is not allowed"
        );
        assert_eq!(
            check(r#"<Library id="1"><Name>x</Name></Library>"#)?.message(),
            "XML is not valid: /Library: attribute 'id' is not allowed"
        );
        assert!(check(
            r#"<Library xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="l.xsd"><Name>x</Name></Library>"#
        )?
        .is_valid());
        Ok(())
    }

    #[test]
    fn test_namespaced_elements_rejected() -> Result<()> {
        assert_eq!(
            check(r#"<Library xmlns="urn:shelf"><Name>x</Name></Library>"#)?.message(),
            "XML is not valid: /Library: element <Library> is in namespace 'urn:shelf', expected no namespace"
        );
        assert_eq!(
            check(r#"<s:Library xmlns:s="urn:shelf"><Name>x</Name></s:Library>"#)?.message(),
            "XML is not valid: /s:Library: element <s:Library> is in namespace 'urn:shelf', expected no namespace"
        );
        assert_eq!(
            check("<s:Library><Name>x</Name></s:Library>")?.message(),
            "XML is not valid: /s:Library: namespace prefix 's' of <s:Library> is not declared"
        );
        assert_eq!(
            check(r#"<Library xmlns:s="urn:shelf"><s:Name>x</s:Name></Library>"#)?.message(),
            "XML is not valid: /Library: element <s:Name> is in namespace 'urn:shelf', expected no namespace"
        );
        assert_eq!(
            check(r#"<Library><Name xmlns="urn:shelf">x</Name></Library>"#)?.message(),
            "XML is not valid: /Library: element <Name> is in namespace 'urn:shelf', expected no namespace"
        );
        Ok(())
    }

    #[test]
    fn test_namespace_declarations_without_use_are_allowed() -> Result<()> {
        let declared = r#"<Library xmlns="" xmlns:s="urn:shelf"><Name>x</Name></Library>"#;
        assert!(check(declared)?.is_valid());
        assert!(check(r#"<Library><Name xmlns="">x</Name></Library>"#)?.is_valid());
        Ok(())
    }

    #[test]
    fn test_xsi_attributes_need_the_xsi_namespace() -> Result<()> {
        assert_eq!(
            check(r#"<Library xsi:nil="false"><Name>x</Name></Library>"#)?.message(),
            "XML is not valid: /Library: attribute 'xsi:nil' is not allowed"
        );
        assert_eq!(
            check(r#"<Library xmlns:xsi="urn:not-xsi" xsi:nil="false"><Name>x</Name></Library>"#)?
                .message(),
            "XML is not valid: /Library: attribute 'xsi:nil' is not allowed"
        );
        assert!(check(
            r#"<Library xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><Name i:type="x">y</Name></Library>"#
        )?
        .is_valid());
        Ok(())
    }

    #[test]
    fn test_unknown_root_and_malformed_input() -> Result<()> {
        assert_eq!(
            check("<Shelf/>")?.message(),
            "XML is not valid: /Shelf: no declaration for root element <Shelf>"
        );

        let malformed = check("<Library><Name>x</Library>")?;
        assert!(!malformed.is_valid());
        assert!(malformed.message().starts_with("XML is not valid: error at"));

        assert!(!check("")?.is_valid());
        Ok(())
    }
}

//! XSD subset compiler

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::model::{
    Compositor, ContentModel, ElementDecl, Group, MaxOccurs, Schema, SimpleType,
};
use crate::xml::model::{local_name, Element};
use crate::xml::parser::{is_valid_name, Parser};

/// Namespace of XML Schema documents
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

impl Schema {
    /// Compile an XSD document.
    ///
    /// Supported: global `element` declarations with a `name`, either
    /// `type="xs:string"` or an anonymous `complexType` holding a `sequence`
    /// or an `all` group, and `minOccurs`/`maxOccurs` on local declarations.
    /// Anything else is rejected with an `ErrorKind::Schema` error.
    pub fn compile(xsd: &str) -> Result<Self> {
        let doc = Parser::new(xsd.as_bytes()).parse()?;
        let compiler = Compiler::for_root(&doc.root)?;

        let elements = doc
            .root
            .child_elements()
            .map(|child| compiler.element(child, true))
            .collect::<Result<Vec<_>>>()?;
        if elements.is_empty() {
            return Err(Error::schema("schema declares no elements"));
        }

        debug!(elements = elements.len(), "compiled schema");
        Ok(Self { elements })
    }
}

/// Compiles declarations written with one namespace prefix
struct Compiler<'a> {
    prefix: Option<&'a str>,
}

impl<'a> Compiler<'a> {
    fn for_root(root: &'a Element) -> Result<Self> {
        let prefix = prefix_of(&root.name);
        if root.local_name() != "schema" {
            return Err(Error::schema(format!(
                "expected <schema> as the root element, found <{}>",
                root.name
            )));
        }

        let xmlns = prefix.map_or_else(|| "xmlns".to_string(), |p| format!("xmlns:{p}"));
        match root.attributes.get(&xmlns) {
            Some(ns) if ns == XSD_NAMESPACE => Ok(Self { prefix }),
            Some(ns) => Err(Error::schema(format!(
                "<{}> is bound to {ns}, not the XML Schema namespace",
                root.name
            ))),
            None => Err(Error::schema(format!(
                "<{}> is not in the XML Schema namespace",
                root.name
            ))),
        }
    }

    fn is_xsd(&self, element: &Element, local: &str) -> bool {
        prefix_of(&element.name) == self.prefix && element.local_name() == local
    }

    fn element(&self, element: &Element, global: bool) -> Result<ElementDecl> {
        if !self.is_xsd(element, "element") {
            return Err(unsupported(element));
        }
        reject_text(element)?;

        let mut name = None;
        let mut type_name = None;
        let mut min_occurs = 1;
        let mut max_occurs = MaxOccurs::Bounded(1);

        for (key, value) in &element.attributes {
            match key.as_str() {
                "name" => name = Some(value.as_str()),
                "type" => type_name = Some(value.as_str()),
                "minOccurs" if !global => min_occurs = parse_count(key, value)?,
                "maxOccurs" if !global && value == "unbounded" => {
                    max_occurs = MaxOccurs::Unbounded;
                }
                "maxOccurs" if !global => max_occurs = MaxOccurs::Bounded(parse_count(key, value)?),
                _ => {
                    return Err(Error::schema(format!(
                        "unsupported attribute '{key}' on <{}>",
                        element.name
                    )))
                }
            }
        }

        let name = name.ok_or_else(|| {
            Error::schema(format!("<{}> is missing the 'name' attribute", element.name))
        })?;
        if !is_valid_name(name) {
            return Err(Error::schema(format!("invalid element name '{name}'")));
        }
        if !max_occurs.allows(min_occurs) {
            return Err(Error::schema(format!(
                "minOccurs is greater than maxOccurs for element '{name}'"
            )));
        }

        let mut children = element.child_elements();
        let content = match (type_name, children.next()) {
            (Some(type_name), None) => ContentModel::Simple(self.simple_type(type_name)?),
            (None, Some(child)) if self.is_xsd(child, "complexType") => {
                ContentModel::Complex(self.complex_type(child)?)
            }
            (None, Some(child)) => return Err(unsupported(child)),
            (Some(_), Some(_)) => {
                return Err(Error::schema(format!(
                    "element '{name}' has both a type attribute and an inline type"
                )))
            }
            (None, None) => {
                return Err(Error::schema(format!("element '{name}' has no type")));
            }
        };
        if let Some(extra) = children.next() {
            return Err(unsupported(extra));
        }

        Ok(ElementDecl {
            name: name.to_string(),
            min_occurs,
            max_occurs,
            content,
        })
    }

    fn simple_type(&self, type_name: &str) -> Result<SimpleType> {
        if prefix_of(type_name) == self.prefix && local_name(type_name) == "string" {
            Ok(SimpleType::String)
        } else {
            Err(Error::schema(format!("unsupported type '{type_name}'")))
        }
    }

    fn complex_type(&self, element: &Element) -> Result<Group> {
        reject_attributes(element)?;
        reject_text(element)?;

        let mut children = element.child_elements();
        let group = match children.next() {
            None => Group::empty(),
            Some(child) if self.is_xsd(child, "sequence") => {
                self.group(child, Compositor::Sequence)?
            }
            Some(child) if self.is_xsd(child, "all") => self.group(child, Compositor::All)?,
            Some(child) => return Err(unsupported(child)),
        };
        if let Some(extra) = children.next() {
            return Err(unsupported(extra));
        }
        Ok(group)
    }

    fn group(&self, element: &Element, compositor: Compositor) -> Result<Group> {
        reject_attributes(element)?;
        reject_text(element)?;

        let mut particles: Vec<ElementDecl> = Vec::new();
        for child in element.child_elements() {
            let decl = self.element(child, false)?;
            if particles.iter().any(|p| p.name == decl.name) {
                return Err(Error::schema(format!(
                    "element '{}' is declared twice in one group",
                    decl.name
                )));
            }
            if compositor == Compositor::All && decl.max_occurs.is_repeated() {
                return Err(Error::schema(format!(
                    "element '{}' may occur at most once in an all group",
                    decl.name
                )));
            }
            particles.push(decl);
        }

        Ok(Group {
            compositor,
            particles,
        })
    }
}

fn prefix_of(name: &str) -> Option<&str> {
    name.split_once(':').map(|(prefix, _)| prefix)
}

fn parse_count(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::schema(format!("invalid {key} value '{value}'")))
}

fn unsupported(element: &Element) -> Error {
    Error::schema(format!("unsupported schema construct <{}>", element.name))
}

fn reject_attributes(element: &Element) -> Result<()> {
    match element.attributes.keys().next() {
        Some(key) => Err(Error::schema(format!(
            "unsupported attribute '{key}' on <{}>",
            element.name
        ))),
        None => Ok(()),
    }
}

fn reject_text(element: &Element) -> Result<()> {
    if element.text().trim().is_empty() {
        Ok(())
    } else {
        Err(Error::schema(format!(
            "unexpected text inside <{}>",
            element.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn schema_error(xsd: &str) -> Option<String> {
        Schema::compile(xsd).err().map(|e| {
            assert_eq!(e.kind(), &ErrorKind::Schema);
            e.message().to_string()
        })
    }

    #[test]
    fn test_compile_nested_groups() -> Result<()> {
        let schema = Schema::compile(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Book">
                   <xs:complexType>
                     <xs:sequence>
                       <xs:element name="Title" type="xs:string"/>
                       <xs:element name="Tag" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
                     </xs:sequence>
                   </xs:complexType>
                 </xs:element>
               </xs:schema>"#,
        )?;

        let book = schema.element("Book");
        let group = match book.map(|decl| &decl.content) {
            Some(ContentModel::Complex(group)) => group,
            other => panic!("expected complex content, got {other:?}"),
        };
        assert_eq!(group.compositor, Compositor::Sequence);
        assert_eq!(
            group.particles,
            vec![
                ElementDecl::new("Title", ContentModel::Simple(SimpleType::String)),
                ElementDecl {
                    name: "Tag".to_string(),
                    min_occurs: 0,
                    max_occurs: MaxOccurs::Unbounded,
                    content: ContentModel::Simple(SimpleType::String),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_default_namespace_prefix() -> Result<()> {
        let schema = Schema::compile(
            r#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
                 <element name="Note" type="string"/>
               </schema>"#,
        )?;
        assert_eq!(
            schema.elements,
            vec![ElementDecl::new("Note", ContentModel::Simple(SimpleType::String))]
        );
        Ok(())
    }

    #[test]
    fn test_empty_complex_type() -> Result<()> {
        let schema = Schema::compile(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Flag"><xs:complexType/></xs:element>
               </xs:schema>"#,
        )?;
        assert_eq!(
            schema.element("Flag").map(|decl| &decl.content),
            Some(&ContentModel::Complex(Group::empty()))
        );
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_root_and_namespace() {
        assert!(schema_error("<root/>").is_some());
        assert_eq!(
            schema_error(r#"<xs:schema xmlns:xs="urn:other"><xs:element name="a" type="xs:string"/></xs:schema>"#),
            Some("<xs:schema> is bound to urn:other, not the XML Schema namespace".to_string())
        );
        assert_eq!(
            schema_error(r#"<xs:schema><xs:element name="a" type="xs:string"/></xs:schema>"#),
            Some("<xs:schema> is not in the XML Schema namespace".to_string())
        );
    }

    #[test]
    fn test_rejects_unsupported_constructs() {
        let wrap = |body: &str| {
            format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#)
        };

        assert_eq!(
            schema_error(&wrap(r#"<xs:simpleType name="t"/>"#)),
            Some("unsupported schema construct <xs:simpleType>".to_string())
        );
        assert_eq!(
            schema_error(&wrap(r#"<xs:element name="a" type="xs:int"/>"#)),
            Some("unsupported type 'xs:int'".to_string())
        );
        assert_eq!(
            schema_error(&wrap(r#"<xs:element name="a" type="xs:string" maxOccurs="2"/>"#)),
            Some("unsupported attribute 'maxOccurs' on <xs:element>".to_string())
        );
        assert_eq!(
            schema_error(&wrap(
                r#"<xs:element name="a"><xs:complexType><xs:choice/></xs:complexType></xs:element>"#
            )),
            Some("unsupported schema construct <xs:choice>".to_string())
        );
        assert_eq!(
            schema_error(&wrap(r#"<xs:element name="a"/>"#)),
            Some("element 'a' has no type".to_string())
        );
        assert_eq!(schema_error(&wrap("")), Some("schema declares no elements".to_string()));
    }

    #[test]
    fn test_rejects_bad_occurrences() {
        let wrap = |particle: &str, compositor: &str| {
            format!(
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                     <xs:element name="r"><xs:complexType><xs:{compositor}>{particle}</xs:{compositor}></xs:complexType></xs:element>
                   </xs:schema>"#
            )
        };

        assert_eq!(
            schema_error(&wrap(r#"<xs:element name="a" type="xs:string" minOccurs="x"/>"#, "sequence")),
            Some("invalid minOccurs value 'x'".to_string())
        );
        assert_eq!(
            schema_error(&wrap(
                r#"<xs:element name="a" type="xs:string" minOccurs="3" maxOccurs="2"/>"#,
                "sequence"
            )),
            Some("minOccurs is greater than maxOccurs for element 'a'".to_string())
        );
        assert_eq!(
            schema_error(&wrap(
                r#"<xs:element name="a" type="xs:string" maxOccurs="unbounded"/>"#,
                "all"
            )),
            Some("element 'a' may occur at most once in an all group".to_string())
        );
        assert_eq!(
            schema_error(&wrap(
                r#"<xs:element name="a" type="xs:string"/><xs:element name="a" type="xs:string"/>"#,
                "all"
            )),
            Some("element 'a' is declared twice in one group".to_string())
        );
    }
}

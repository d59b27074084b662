use std::fs;
use std::path::Path;

use xjconv::validate;

fn fixture(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let full = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(path);
    Ok(fs::read_to_string(full)?)
}

#[test]
fn test_valid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let valid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid");
    for entry in fs::read_dir(valid_dir)? {
        let path = entry?.path();
        let content = fs::read_to_string(&path)?;
        let validation = validate(&content);
        if !validation.is_valid() {
            return Err(std::io::Error::other(format!(
                "valid file rejected: {path:?}: {}",
                validation.message()
            ))
            .into());
        }
        assert_eq!(validation.message(), "XML is valid.");
    }
    Ok(())
}

#[test]
fn test_invalid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let invalid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid");
    for entry in fs::read_dir(invalid_dir)? {
        let path = entry?.path();
        let content = fs::read_to_string(&path)?;
        let validation = validate(&content);
        if validation.is_valid() {
            return Err(
                std::io::Error::other(format!("invalid file accepted: {path:?}")).into(),
            );
        }
        assert!(validation.message().starts_with("XML is not valid: "));
    }
    Ok(())
}

#[test]
fn test_violation_messages() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [
        (
            "invalid/missing_required_field.xml",
            "XML is not valid: /AddressBook/Contact[1]: missing required element <Email>",
        ),
        (
            "invalid/no_contact.xml",
            "XML is not valid: /AddressBook: missing required element <Contact>",
        ),
        (
            "invalid/unknown_field.xml",
            "XML is not valid: /AddressBook/Contact[1]: unexpected element <Website>",
        ),
        (
            "invalid/duplicate_field.xml",
            "XML is not valid: /AddressBook/Contact[1]: element <Email> appears more than once",
        ),
        (
            "invalid/attribute.xml",
            "XML is not valid: /AddressBook/Contact[1]: attribute 'id' is not allowed",
        ),
        (
            "invalid/wrong_root.xml",
            "XML is not valid: /Contacts: no declaration for root element <Contacts>",
        ),
        (
            "invalid/default_namespace.xml",
            "XML is not valid: /AddressBook: element <AddressBook> is in namespace 'urn:example:contacts', expected no namespace",
        ),
        (
            "invalid/prefixed_namespace.xml",
            "XML is not valid: /ab:AddressBook: element <ab:AddressBook> is in namespace 'urn:example:contacts', expected no namespace",
        ),
        (
            "invalid/undeclared_prefix.xml",
            "XML is not valid: /ab:AddressBook: namespace prefix 'ab' of <ab:AddressBook> is not declared",
        ),
        (
            "invalid/unbound_xsi.xml",
            "XML is not valid: /AddressBook: attribute 'xsi:noNamespaceSchemaLocation' is not allowed",
        ),
    ];

    for (path, expected) in cases {
        assert_eq!(validate(&fixture(path)?).message(), expected, "{path}");
    }
    Ok(())
}

#[test]
fn test_malformed_fixture_is_invalid_not_error() -> Result<(), Box<dyn std::error::Error>> {
    let validation = validate(&fixture("invalid/malformed.xml")?);
    assert!(!validation.is_valid());
    assert!(validation.message().contains("mismatched"));
    Ok(())
}

#[test]
fn test_violation_in_later_contact_names_its_position() -> Result<(), Box<dyn std::error::Error>> {
    let valid = fixture("valid/optional_fields.xml")?;
    let broken = valid.replacen("<Fax>(503) 555-2376</Fax>", "<Fax><b>x</b></Fax>", 1);
    assert_eq!(
        validate(&broken).message(),
        "XML is not valid: /AddressBook/Contact[2]/Fax: element <b> is not allowed in text-only content"
    );
    Ok(())
}

#[test]
fn test_garbage_input_never_panics() {
    for input in ["", "   ", "not xml", "<", "<AddressBook", "<?xml?>", "<a></b>", "\u{0}"] {
        assert!(!validate(input).is_valid(), "{input:?}");
    }
}

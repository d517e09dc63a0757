//! Reads the two fixed foreign-namespace attribute sets that redirect default
//! naming and typing decisions.
//!
//! Attribute lookups are read straight off the source markup element. A
//! missing element or missing attribute is never an error; callers fall back
//! to the default behavior silently.

use roxmltree::Node;

use crate::qname::QName;

/// Namespace of the XML-side annotation attributes.
pub const XML_ANNOTATION_NS: &str = "commonj.sdo/xml";
/// Namespace of the Java-side annotation attributes.
pub const JAVA_ANNOTATION_NS: &str = "commonj.sdo/java";

/// Result of an override-attribute lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeLookup {
    /// The concept is mapped and the attribute is present.
    Value(String),
    /// The concept is mapped but the attribute is absent.
    Absent,
    /// The concept is not covered by the override tables; the default
    /// strategy's own attribute lookup applies.
    Unmapped,
}

impl AttributeLookup {
    pub fn value(self) -> Option<String> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Unmapped => None,
        }
    }
}

fn xml_attribute_key(concept: &str) -> Option<&'static str> {
    Some(match concept {
        "name" => "name",
        "opposite" => "oppositeProperty",
        "mixed" => "sequence",
        "string" => "string",
        "changeable" => "readOnly",
        "aliasName" => "aliasName",
        _ => return None,
    })
}

fn java_attribute_key(concept: &str) -> Option<&'static str> {
    Some(match concept {
        "package" => "package",
        "instanceClass" => "instanceClass",
        "extendedInstanceClass" => "extendedInstanceClass",
        "nestedInterfaces" => "nestedInterfaces",
        _ => return None,
    })
}

/// Looks up the annotation attribute standing in for `concept` on `element`.
pub fn override_attribute(element: Option<Node>, concept: &str) -> AttributeLookup {
    if let Some(key) = xml_attribute_key(concept) {
        let value = element.and_then(|e| e.attribute((XML_ANNOTATION_NS, key)));
        return match value {
            Some(value) => {
                // The source attribute is readOnly but the requested concept
                // is changeability, so the polarity flips.
                let value = if concept == "changeable" {
                    match value {
                        "true" => "false",
                        "false" => "true",
                        other => other,
                    }
                } else {
                    value
                };
                AttributeLookup::Value(value.to_string())
            }
            None => AttributeLookup::Absent,
        };
    }

    if let Some(key) = java_attribute_key(concept) {
        return match element.and_then(|e| e.attribute((JAVA_ANNOTATION_NS, key))) {
            Some(value) => AttributeLookup::Value(value.to_string()),
            None => AttributeLookup::Absent,
        };
    }

    AttributeLookup::Unmapped
}

/// Shorthand for mapped lookups where an unmapped concept also means "absent".
pub fn override_value(element: Option<Node>, concept: &str) -> Option<String> {
    override_attribute(element, concept).value()
}

/// The whitespace-separated alias names declared on `element`, in order.
pub fn alias_names(element: Option<Node>) -> Option<Vec<String>> {
    override_value(element, "aliasName")
        .map(|names| names.split_ascii_whitespace().map(str::to_string).collect())
}

/// Resolves a qualified-name-valued annotation attribute against the
/// declaring element's in-scope namespace bindings.
///
/// `reference` reads `propertyType`, `dataType` reads `dataType`; any other
/// concept (and any unresolvable prefix) yields none.
pub fn type_qname_attribute(element: Option<Node>, concept: &str) -> Option<QName> {
    let key = match concept {
        "reference" => "propertyType",
        "dataType" => "dataType",
        _ => return None,
    };
    let element = element?;
    let value = element.attribute((XML_ANNOTATION_NS, key))?;
    QName::parse(value, element).ok()
}

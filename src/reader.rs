//! Shallow schema front end: turns a parsed schema document into the type
//! graph the compiler consumes.
//!
//! Only the parts the naming and resolution engine needs are extracted: named
//! top-level type definitions, their element and attribute declarations with
//! occurrence bounds, base-type names, and the source markup elements the
//! annotation reader inspects later. Content-model structure beyond that is
//! not modelled here.

use roxmltree::Node;
use tracing::debug;

use crate::builtins::XS_NAMESPACE;
use crate::error::ModelError;
use crate::metamodel::MaxOccurs;
use crate::qname::QName;
use crate::type_graph::{DocumentId, FeatureDecl, SchemaDocument, TypeDef, TypeDefKind, TypeGraph};

fn is_xs(node: Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XS_NAMESPACE)
        && node.tag_name().name() == local_name
}

/// Reads one schema document into `graph`, registering it and its named
/// top-level type definitions.
pub fn read_schema<'a, 'input>(
    graph: &mut TypeGraph<'a, 'input>,
    document: &'a roxmltree::Document<'input>,
    resource_uri: &str,
) -> Result<DocumentId, ModelError> {
    let root = document.root_element();
    if !is_xs(root, "schema") {
        return Err(ModelError::UnexpectedRoot(
            root.tag_name().name().to_string(),
        ));
    }
    let target_namespace = root.attribute("targetNamespace").map(str::to_string);
    debug!(resource_uri, namespace = ?target_namespace, "reading schema document");

    let document_id = graph.add_document(SchemaDocument {
        resource_uri: resource_uri.to_string(),
        target_namespace: target_namespace.clone(),
        element: Some(root),
    });

    for child in root.children().filter(|child| child.is_element()) {
        if is_xs(child, "complexType") {
            let type_def = read_complex_type(child, target_namespace.clone(), document_id)?;
            graph.add_type(type_def);
        } else if is_xs(child, "simpleType") {
            let type_def = read_simple_type(child, target_namespace.clone(), document_id)?;
            graph.add_type(type_def);
        }
    }

    Ok(document_id)
}

fn read_complex_type<'a, 'input>(
    node: Node<'a, 'input>,
    target_namespace: Option<String>,
    document: DocumentId,
) -> Result<TypeDef<'a, 'input>, ModelError> {
    let mut features = Vec::new();
    for declaration in node.descendants() {
        if is_xs(declaration, "element") {
            if let Some(decl) = read_element_decl(declaration)? {
                features.push(decl);
            }
        } else if is_xs(declaration, "attribute") {
            if let Some(decl) = read_attribute_decl(declaration)? {
                features.push(decl);
            }
        }
    }
    Ok(TypeDef {
        name: node.attribute("name").map(str::to_string),
        target_namespace,
        document: Some(document),
        element: Some(node),
        kind: TypeDefKind::Class,
        base: derivation_base(node)?,
        features,
    })
}

fn read_simple_type<'a, 'input>(
    node: Node<'a, 'input>,
    target_namespace: Option<String>,
    document: DocumentId,
) -> Result<TypeDef<'a, 'input>, ModelError> {
    let restriction = node.children().find(|child| is_xs(*child, "restriction"));
    let enumeration = restriction
        .map(|restriction| {
            restriction
                .children()
                .any(|child| is_xs(child, "enumeration"))
        })
        .unwrap_or(false);
    let base = match restriction.and_then(|restriction| restriction.attribute("base")) {
        Some(value) => Some(QName::parse(value, restriction.unwrap_or(node))?),
        None => None,
    };
    Ok(TypeDef {
        name: node.attribute("name").map(str::to_string),
        target_namespace,
        document: Some(document),
        element: Some(node),
        kind: TypeDefKind::DataType { enumeration },
        base,
        features: Vec::new(),
    })
}

/// The base type named by a complex type's extension or restriction, if any.
fn derivation_base(node: Node) -> Result<Option<QName>, ModelError> {
    for content in node.children() {
        if !is_xs(content, "complexContent") && !is_xs(content, "simpleContent") {
            continue;
        }
        for derivation in content.children() {
            if !is_xs(derivation, "extension") && !is_xs(derivation, "restriction") {
                continue;
            }
            if let Some(value) = derivation.attribute("base") {
                return Ok(Some(QName::parse(value, derivation)?));
            }
        }
    }
    Ok(None)
}

fn read_element_decl<'a, 'input>(
    node: Node<'a, 'input>,
) -> Result<Option<FeatureDecl<'a, 'input>>, ModelError> {
    // Local references (ref=) carry no name of their own; they are skipped.
    let Some(name) = node.attribute("name") else {
        return Ok(None);
    };
    let min_occurs = node
        .attribute("minOccurs")
        .and_then(|value| value.parse().ok())
        .unwrap_or(1);
    let max_occurs = match node.attribute("maxOccurs") {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(value) => MaxOccurs::Count(value.parse().unwrap_or(1)),
        None => MaxOccurs::Count(1),
    };
    Ok(Some(FeatureDecl {
        name: name.to_string(),
        type_name: declared_type(node)?,
        min_occurs,
        max_occurs,
        element: Some(node),
    }))
}

fn read_attribute_decl<'a, 'input>(
    node: Node<'a, 'input>,
) -> Result<Option<FeatureDecl<'a, 'input>>, ModelError> {
    let Some(name) = node.attribute("name") else {
        return Ok(None);
    };
    let min_occurs = match node.attribute("use") {
        Some("required") => 1,
        _ => 0,
    };
    Ok(Some(FeatureDecl {
        name: name.to_string(),
        type_name: declared_type(node)?,
        min_occurs,
        max_occurs: MaxOccurs::Count(1),
        element: Some(node),
    }))
}

fn declared_type(node: Node) -> Result<Option<QName>, ModelError> {
    match node.attribute("type") {
        Some(value) => Ok(Some(QName::parse(value, node)?)),
        None => Ok(None),
    }
}

//! Input boundary: the schema type graph handed to the compiler by an
//! external schema front end.
//!
//! Documents and type definitions are assigned stable integer handles on
//! first sight; all session caches are keyed by handle. The graph only
//! carries what the naming and resolution engine needs: names, namespaces,
//! occurrence bounds, and the source markup elements the annotation reader
//! inspects.

use std::collections::HashMap;

use roxmltree::Node;

use crate::metamodel::MaxOccurs;
use crate::qname::QName;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(pub(crate) u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

/// One schema document (compilation unit).
#[derive(Clone, Debug)]
pub struct SchemaDocument<'a, 'input> {
    /// URI identifying the source resource (file path or URL).
    pub resource_uri: String,
    pub target_namespace: Option<String>,
    /// The document's root markup element, when source markup is available.
    pub element: Option<Node<'a, 'input>>,
}

impl SchemaDocument<'_, '_> {
    /// The resource's base file name with any trailing extension removed.
    /// Used to name the package of a schema without a target namespace.
    pub fn base_name(&self) -> &str {
        let last = self
            .resource_uri
            .rsplit('/')
            .next()
            .unwrap_or(&self.resource_uri);
        match last.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => last,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDefKind {
    /// Class-like: compiles to a classifier carrying structural features.
    Class,
    /// Datatype-like: compiles to a plain value classifier.
    DataType {
        /// Whether the source restricts the value space to an enumeration.
        /// Enumeration classifier synthesis is disabled; the flag only
        /// documents the request.
        enumeration: bool,
    },
}

/// A named (or anonymous) schema type definition.
#[derive(Clone, Debug)]
pub struct TypeDef<'a, 'input> {
    pub name: Option<String>,
    pub target_namespace: Option<String>,
    pub document: Option<DocumentId>,
    pub element: Option<Node<'a, 'input>>,
    pub kind: TypeDefKind,
    /// Base type of a datatype-like definition, by qualified name.
    pub base: Option<QName>,
    pub features: Vec<FeatureDecl<'a, 'input>>,
}

/// A structural-feature declaration sourced from an element or attribute.
#[derive(Clone, Debug)]
pub struct FeatureDecl<'a, 'input> {
    /// The exact source identifier. The resolver guarantees the compiled
    /// feature keeps this spelling.
    pub name: String,
    pub type_name: Option<QName>,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub element: Option<Node<'a, 'input>>,
}

/// The complete input graph for one compilation session.
#[derive(Default)]
pub struct TypeGraph<'a, 'input> {
    documents: Vec<SchemaDocument<'a, 'input>>,
    types: Vec<TypeDef<'a, 'input>>,
    /// Named top-level definitions, shared symbol space for class-like and
    /// datatype-like definitions.
    by_qname: HashMap<QName, TypeId>,
}

impl<'a, 'input> TypeGraph<'a, 'input> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, document: SchemaDocument<'a, 'input>) -> DocumentId {
        let id = DocumentId(self.documents.len() as u32);
        self.documents.push(document);
        id
    }

    pub fn add_type(&mut self, type_def: TypeDef<'a, 'input>) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        if let Some(name) = type_def.name.as_ref() {
            let qname =
                QName::with_optional_namespace(type_def.target_namespace.clone(), name.clone());
            self.by_qname.insert(qname, id);
        }
        self.types.push(type_def);
        id
    }

    pub fn document(&self, id: DocumentId) -> &SchemaDocument<'a, 'input> {
        &self.documents[id.0 as usize]
    }

    pub fn type_def(&self, id: TypeId) -> &TypeDef<'a, 'input> {
        &self.types[id.0 as usize]
    }

    pub fn lookup(&self, name: &QName) -> Option<TypeId> {
        self.by_qname.get(name).copied()
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &SchemaDocument<'a, 'input>)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(index, doc)| (DocumentId(index as u32), doc))
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeDef<'a, 'input>)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, type_def)| (TypeId(index as u32), type_def))
    }

    pub fn types_in_document(
        &self,
        document: DocumentId,
    ) -> impl Iterator<Item = (TypeId, &TypeDef<'a, 'input>)> {
        self.types()
            .filter(move |(_, type_def)| type_def.document == Some(document))
    }
}

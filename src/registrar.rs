//! Schema-unit admission and package resolution.
//!
//! Documents are admitted exactly once per session; admission registers the
//! document as a compilation input and runs the injected validator, whose
//! findings are recorded as diagnostics without stopping other documents.
//! Package resolution is memoized per namespace: the first request creates
//! the package, every later request is a cache hit returning the same
//! reference.

use roxmltree::Node;
use tracing::debug;

use crate::annotation::override_value;
use crate::compiler::Compiler;
use crate::error::Diagnostic;
use crate::metamodel::{Package, Ref};
use crate::package_name::default_package_name;
use crate::type_graph::{DocumentId, TypeGraph};

/// Boundary to the external schema validator. Invoked once per admitted
/// document; findings never abort the session.
pub trait SchemaValidator {
    fn validate(&self, graph: &TypeGraph<'_, '_>, document: DocumentId) -> Vec<Diagnostic>;
}

/// The silent default.
pub struct NoValidation;

impl SchemaValidator for NoValidation {
    fn validate(&self, _graph: &TypeGraph<'_, '_>, _document: DocumentId) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Flags duplicate top-level type names within a document.
pub struct BasicValidator;

impl SchemaValidator for BasicValidator {
    fn validate(&self, graph: &TypeGraph<'_, '_>, document: DocumentId) -> Vec<Diagnostic> {
        let mut seen = std::collections::HashSet::new();
        let mut diagnostics = Vec::new();
        for (_, type_def) in graph.types_in_document(document) {
            if let Some(name) = type_def.name.as_deref() {
                if !seen.insert(name) {
                    diagnostics.push(Diagnostic::error(
                        document,
                        format!("duplicate top-level type definition {name:?}"),
                    ));
                }
            }
        }
        diagnostics
    }
}

/// Looks up a prefix declared in scope for `namespace` on `element`.
/// The default namespace declaration does not count as a usable prefix.
fn declared_prefix(element: Node, namespace: &str) -> Option<String> {
    element
        .namespaces()
        .find(|declaration| declaration.uri() == namespace)
        .and_then(|declaration| declaration.name())
        .map(str::to_string)
}

impl Compiler {
    /// Admits a schema document into the session. A document already admitted
    /// is left untouched; a new one is registered as a compilation input and
    /// validated, with findings recorded against the document.
    pub fn admit(&mut self, graph: &TypeGraph<'_, '_>, document: DocumentId) {
        if !self.admitted.insert(document) {
            return;
        }
        debug!(
            resource = %graph.document(document).resource_uri,
            "admitting schema document"
        );
        self.inputs.push(document);
        let findings = self.validator.validate(graph, document);
        self.diagnostics.extend(findings);
    }

    /// Resolves the package owning `namespace`, creating it on first sight.
    ///
    /// `fallback` names the document whose resource identifies a package for
    /// the absent namespace; `scope` is the markup element whose in-scope
    /// prefix declarations are consulted for the namespace prefix.
    pub fn resolve_package(
        &mut self,
        graph: &TypeGraph<'_, '_>,
        namespace: Option<&str>,
        fallback: Option<DocumentId>,
        scope: Option<Node>,
    ) -> Ref<Package> {
        let key = namespace.map(str::to_string);
        if let Some(&package) = self.packages_by_namespace.get(&key) {
            return package;
        }

        let unit = fallback.or_else(|| self.inputs.first().copied());
        // The package-name annotation lives on the schema document element,
        // not on the individual type definitions; it wins over the derived
        // default.
        let annotated_name = override_value(
            unit.and_then(|document| graph.document(document).element),
            "package",
        );

        let (name, namespace_uri, qualified) = match namespace {
            Some(namespace) => {
                let name = annotated_name.unwrap_or_else(|| {
                    default_package_name(namespace, &self.config.domain_tokens)
                });
                (name, Some(namespace.to_string()), true)
            }
            None => match unit {
                // The base file name is taken as-is; no-namespace packages
                // are not name-mangled.
                Some(document) => {
                    let document = graph.document(document);
                    (
                        annotated_name.unwrap_or_else(|| document.base_name().to_string()),
                        Some(document.resource_uri.clone()),
                        false,
                    )
                }
                None => ("_".to_string(), None, false),
            },
        };

        let ns_prefix = namespace
            .and_then(|namespace| scope.and_then(|scope| declared_prefix(scope, namespace)))
            .unwrap_or_else(|| {
                let derived = name.rsplit('.').next().unwrap_or(name.as_str());
                // Prefixes beginning with the three-letter sequence x, m, l,
                // in any case combination, are reserved for use by XML and
                // XML-related specifications. (Namespaces in XML 1.0, §3)
                if derived.to_lowercase().starts_with("xml") {
                    format!("_{derived}")
                } else {
                    derived.to_string()
                }
            });

        debug!(%name, namespace = ?namespace_uri, prefix = %ns_prefix, "creating package");
        let package = self.model.create(Package {
            name,
            namespace_uri,
            ns_prefix,
            qualified,
            classifiers: Vec::new(),
        });
        self.packages_by_namespace.insert(key.clone(), package);
        self.registry.put(key, package);
        package
    }
}

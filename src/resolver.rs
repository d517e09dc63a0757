//! Type-definition and feature resolution.
//!
//! Resolution is demand-driven and memoized: asking for the classifier of a
//! type definition builds it on first sight and returns the cached reference
//! afterwards. The classifier is cached before its features are resolved, so
//! self-referential and mutually recursive definitions terminate.

use roxmltree::Node;
use tracing::trace;

use crate::annotation::{alias_names, override_attribute, type_qname_attribute, AttributeLookup};
use crate::builtins::{XS_NAMESPACE, XS_STRING_NAME};
use crate::compiler::Compiler;
use crate::metamodel::{Classifier, Ref};
use crate::qname::QName;
use crate::type_graph::{FeatureDecl, TypeDef, TypeGraph, TypeId};

impl Compiler {
    /// Resolves a type definition to its compiled classifier, synthesizing
    /// and caching it on first sight.
    pub fn resolve_classifier(
        &mut self,
        graph: &TypeGraph<'_, '_>,
        type_id: TypeId,
    ) -> Ref<Classifier> {
        if let Some(&classifier) = self.classifiers_by_type.get(&type_id) {
            return classifier;
        }
        let type_def = graph.type_def(type_id);

        // Schema-for-schema types never get generated classifiers; they
        // resolve through the fixed builtin table.
        if let (Some(namespace), Some(name)) =
            (type_def.target_namespace.as_deref(), type_def.name.as_deref())
        {
            if namespace == XS_NAMESPACE {
                if let Some(builtin) = self.builtin_table.lookup_local(name) {
                    self.classifiers_by_type.insert(type_id, builtin);
                    return builtin;
                }
            }
        }

        if let Some(document) = type_def.document {
            self.admit(graph, document);
        }
        let package = self.resolve_package(
            graph,
            type_def.target_namespace.as_deref(),
            type_def.document,
            type_def.element,
        );

        // A registered builtin model supersedes generation: a prebuilt
        // classifier carrying the raw source type name is used as-is,
        // features and all.
        if self.builtin_models.contains(&package) {
            if let Some(existing) = type_def
                .name
                .as_deref()
                .and_then(|name| self.model.classifier_in_package(package, name))
            {
                self.classifiers_by_type.insert(type_id, existing);
                return existing;
            }
        }

        let mut classifier = self
            .try_synthesize_enumeration(type_def)
            .unwrap_or_else(|| self.strategy.synthesize_classifier(type_def, package));
        if let Some(name) = self.annotated(type_def.element, "name") {
            classifier.name = name;
        }

        trace!(name = %classifier.name, "synthesizing classifier");
        let ref_ = self.model.add_classifier(classifier);
        self.classifiers_by_type.insert(type_id, ref_);

        if let Some(object) = self.strategy.synthesize_type_object(type_def, package) {
            let object = self.model.add_classifier(object);
            self.type_objects.insert(ref_, object);
        }

        if let Some(instance_class) = self.resolve_instance_class(graph, type_def) {
            self.model.get_mut(ref_).instance_class = Some(instance_class);
        }

        if let Some(aliases) = alias_names(type_def.element) {
            self.model.get_mut(ref_).alias_names = aliases.clone();
            if let Some(&object) = self.type_objects.get(&ref_) {
                self.model.get_mut(object).alias_names = aliases;
            }
        }

        for decl in &type_def.features {
            self.resolve_feature(graph, ref_, decl);
        }

        ref_
    }

    /// Resolves a qualified type name: a definition known to the graph wins,
    /// otherwise the builtin table is consulted.
    pub fn resolve_type_reference(
        &mut self,
        graph: &TypeGraph<'_, '_>,
        name: &QName,
    ) -> Option<Ref<Classifier>> {
        if let Some(type_id) = graph.lookup(name) {
            return Some(self.resolve_classifier(graph, type_id));
        }
        self.builtin_table.lookup(name)
    }

    fn resolve_feature(
        &mut self,
        graph: &TypeGraph<'_, '_>,
        owner: Ref<Classifier>,
        decl: &FeatureDecl<'_, '_>,
    ) {
        let effective_type = self.effective_type_name(decl);
        let classifier_type = effective_type
            .as_ref()
            .and_then(|name| self.resolve_type_reference(graph, name));

        let mut feature = self.strategy.synthesize_feature(decl, classifier_type);
        // Compiled feature names keep the exact source spelling unless an
        // annotation renames them; the strategy's mangling never survives.
        feature.name = self
            .annotated(decl.element, "name")
            .unwrap_or_else(|| decl.name.clone());

        if let Some(aliases) = alias_names(decl.element) {
            feature.alias_names = aliases;
        }
        if self.annotated(decl.element, "changeable").as_deref() == Some("false") {
            feature.read_only = true;
        }
        feature.opposite = self.annotated(decl.element, "opposite");
        if self.annotated(decl.element, "mixed").as_deref() == Some("true") {
            feature.sequenced = true;
        }

        self.model.add_feature(owner, feature);
    }

    /// The qualified name actually typing a feature, after annotations have
    /// had their say: an explicit reference redirection first, then the
    /// string flag (which overrides even an annotated datatype), then the
    /// datatype redirection, then the declared type.
    fn effective_type_name(&self, decl: &FeatureDecl<'_, '_>) -> Option<QName> {
        type_qname_attribute(decl.element, "reference")
            .or_else(|| match self.annotated(decl.element, "string") {
                Some(flag) if flag.eq_ignore_ascii_case("true") => Some(XS_STRING_NAME.clone()),
                _ => None,
            })
            .or_else(|| type_qname_attribute(decl.element, "dataType"))
            .or_else(|| decl.type_name.clone())
    }

    fn resolve_instance_class(
        &mut self,
        graph: &TypeGraph<'_, '_>,
        type_def: &TypeDef<'_, '_>,
    ) -> Option<String> {
        if let Some(extended) = self.annotated(type_def.element, "extendedInstanceClass") {
            return Some(extended);
        }
        if let Some(explicit) = self.annotated(type_def.element, "instanceClass") {
            return Some(explicit);
        }
        let base = type_def
            .base
            .as_ref()
            .and_then(|name| self.resolve_type_reference(graph, name))
            .map(|base| self.model.get(base).clone());
        self.strategy.instance_class_name(type_def, base.as_ref())
    }

    /// Enumerated restrictions compile as their plain datatype
    /// representation; no enumeration classifier is synthesized.
    fn try_synthesize_enumeration(&self, type_def: &TypeDef<'_, '_>) -> Option<Classifier> {
        let _ = type_def;
        None
    }

    /// Annotation lookup with the strategy as the fallback for concepts the
    /// fixed override tables do not cover.
    fn annotated(&self, element: Option<Node>, concept: &str) -> Option<String> {
        match override_attribute(element, concept) {
            AttributeLookup::Value(value) => Some(value),
            AttributeLookup::Absent => None,
            AttributeLookup::Unmapped => self.strategy.attribute(element, concept),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::XML_ANNOTATION_NS;
    use crate::compiler::CompilerConfig;
    use crate::metamodel::{ClassifierKind, MaxOccurs, Package};
    use crate::synthesis::MangledSynthesis;
    use crate::type_graph::{SchemaDocument, TypeDefKind};

    const PO_NS: &str = "http://example.com/po";

    fn class<'a, 'input>(name: &str, features: Vec<FeatureDecl<'a, 'input>>) -> TypeDef<'a, 'input> {
        TypeDef {
            name: Some(name.into()),
            target_namespace: Some(PO_NS.into()),
            document: None,
            element: None,
            kind: TypeDefKind::Class,
            base: None,
            features,
        }
    }

    fn feature(name: &str, type_name: Option<QName>) -> FeatureDecl<'static, 'static> {
        FeatureDecl {
            name: name.into(),
            type_name,
            min_occurs: 0,
            max_occurs: MaxOccurs::Count(1),
            element: None,
        }
    }

    #[test]
    fn feature_names_keep_the_source_spelling() {
        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(class(
            "purchase_order",
            vec![feature(
                "companyName",
                Some(QName::with_namespace(XS_NAMESPACE, "string")),
            )],
        ));

        let mut compiler = Compiler::new(CompilerConfig::default());
        let classifier = compiler.resolve_classifier(&graph, type_id);
        let model = compiler.model();
        assert_eq!(model.get(classifier).name, "PurchaseOrder");
        let feature = model.get(model.get(classifier).features[0]);
        assert_eq!(feature.name, "companyName");
        let string = compiler.model().get(feature.classifier_type.unwrap());
        assert_eq!(string.name, "String");
        assert!(string.is_builtin);
    }

    #[test]
    fn self_referential_definitions_terminate() {
        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(class(
            "Node",
            vec![feature("next", Some(QName::with_namespace(PO_NS, "Node")))],
        ));

        let mut compiler = Compiler::new(CompilerConfig::default());
        let classifier = compiler.resolve_classifier(&graph, type_id);
        let model = compiler.model();
        let next = model.get(model.get(classifier).features[0]);
        assert_eq!(next.classifier_type, Some(classifier));
    }

    #[test]
    fn resolution_is_memoized() {
        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(class("Order", Vec::new()));
        let mut compiler = Compiler::new(CompilerConfig::default());
        assert_eq!(
            compiler.resolve_classifier(&graph, type_id),
            compiler.resolve_classifier(&graph, type_id)
        );
    }

    #[test]
    fn schema_for_schema_types_resolve_to_builtins() {
        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(TypeDef {
            name: Some("decimal".into()),
            target_namespace: Some(XS_NAMESPACE.into()),
            document: None,
            element: None,
            kind: TypeDefKind::DataType { enumeration: false },
            base: None,
            features: Vec::new(),
        });
        let mut compiler = Compiler::new(CompilerConfig::default());
        let classifier = compiler.resolve_classifier(&graph, type_id);
        assert_eq!(compiler.model().get(classifier).name, "Decimal");
        assert!(compiler.model().get(classifier).is_builtin);
    }

    #[test]
    fn string_flag_forces_the_string_type() {
        let xml = format!(
            r#"<element xmlns:sdoxml="{XML_ANNOTATION_NS}" sdoxml:string="true"/>"#
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let mut graph = TypeGraph::new();
        let decl = FeatureDecl {
            name: "code".into(),
            type_name: Some(QName::with_namespace(XS_NAMESPACE, "int")),
            min_occurs: 0,
            max_occurs: MaxOccurs::Count(1),
            element: Some(doc.root_element()),
        };
        let type_id = graph.add_type(class("Item", vec![decl]));

        let mut compiler = Compiler::new(CompilerConfig::default());
        let classifier = compiler.resolve_classifier(&graph, type_id);
        let model = compiler.model();
        let code = model.get(model.get(classifier).features[0]);
        assert_eq!(model.get(code.classifier_type.unwrap()).name, "String");
    }

    #[test]
    fn string_flag_overrides_an_annotated_datatype() {
        let xml = format!(
            r#"<element xmlns:sdoxml="{XML_ANNOTATION_NS}"
                        xmlns:xsd="{XS_NAMESPACE}"
                        sdoxml:dataType="xsd:decimal" sdoxml:string="true"/>"#
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let mut graph = TypeGraph::new();
        let decl = FeatureDecl {
            name: "amount".into(),
            type_name: Some(QName::with_namespace(XS_NAMESPACE, "decimal")),
            min_occurs: 0,
            max_occurs: MaxOccurs::Count(1),
            element: Some(doc.root_element()),
        };
        let type_id = graph.add_type(class("Invoice", vec![decl]));

        let mut compiler = Compiler::new(CompilerConfig::default());
        let classifier = compiler.resolve_classifier(&graph, type_id);
        let model = compiler.model();
        let amount = model.get(model.get(classifier).features[0]);
        assert_eq!(model.get(amount.classifier_type.unwrap()).name, "String");
    }

    #[test]
    fn alias_names_overlay_the_paired_type_object() {
        let xml = format!(
            r#"<simpleType xmlns:sdoxml="{XML_ANNOTATION_NS}" sdoxml:aliasName="Qty Amount"/>"#
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(TypeDef {
            name: Some("Quantity".into()),
            target_namespace: Some(PO_NS.into()),
            document: None,
            element: Some(doc.root_element()),
            kind: TypeDefKind::DataType { enumeration: false },
            base: None,
            features: Vec::new(),
        });

        let mut compiler = Compiler::new(CompilerConfig::default())
            .with_strategy(Box::new(MangledSynthesis { type_objects: true }));
        let classifier = compiler.resolve_classifier(&graph, type_id);
        let model = compiler.model();
        assert_eq!(model.get(classifier).alias_names, vec!["Qty", "Amount"]);
        let package = model.get(classifier).package;
        let object = model.classifier_in_package(package, "QuantityObject").unwrap();
        assert_eq!(model.get(object).alias_names, vec!["Qty", "Amount"]);
    }

    #[test]
    fn builtin_model_classifiers_supersede_generation() {
        let mut compiler = Compiler::new(CompilerConfig::default());
        let prebuilt_package = compiler.model_mut().create(Package {
            name: "com.example.po".into(),
            namespace_uri: Some(PO_NS.into()),
            ns_prefix: "po".into(),
            qualified: true,
            classifiers: Vec::new(),
        });
        // Prebuilt classifiers are matched by the raw source type name, not
        // by what synthesis would have mangled it into.
        let prebuilt = compiler.model_mut().add_classifier(Classifier::new(
            "purchase_order",
            prebuilt_package,
            ClassifierKind::Class,
        ));
        compiler.register_builtin_model(prebuilt_package);

        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(class("purchase_order", vec![feature("ignored", None)]));
        let resolved = compiler.resolve_classifier(&graph, type_id);
        assert_eq!(resolved, prebuilt);
        assert!(compiler.model().get(resolved).features.is_empty());
    }

    #[test]
    fn builtin_model_match_uses_the_raw_source_name() {
        let mut compiler = Compiler::new(CompilerConfig::default());
        let prebuilt_package = compiler.model_mut().create(Package {
            name: "com.example.po".into(),
            namespace_uri: Some(PO_NS.into()),
            ns_prefix: "po".into(),
            qualified: true,
            classifiers: Vec::new(),
        });
        let prebuilt = compiler.model_mut().add_classifier(Classifier::new(
            "PurchaseOrder",
            prebuilt_package,
            ClassifierKind::Class,
        ));
        compiler.register_builtin_model(prebuilt_package);

        // "purchase_order" mangles to "PurchaseOrder", but the prebuilt
        // lookup never sees the mangled name; a fresh classifier is created.
        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(class("purchase_order", Vec::new()));
        let resolved = compiler.resolve_classifier(&graph, type_id);
        assert_ne!(resolved, prebuilt);
        assert_eq!(compiler.model().get(resolved).name, "PurchaseOrder");
    }

    #[test]
    fn enumerated_restrictions_compile_as_plain_datatypes() {
        let mut graph = TypeGraph::new();
        let type_id = graph.add_type(TypeDef {
            name: Some("USState".into()),
            target_namespace: Some(PO_NS.into()),
            document: None,
            element: None,
            kind: TypeDefKind::DataType { enumeration: true },
            base: Some(XS_STRING_NAME.clone()),
            features: Vec::new(),
        });
        let mut compiler = Compiler::new(CompilerConfig::default());
        let classifier = compiler.resolve_classifier(&graph, type_id);
        let classifier = compiler.model().get(classifier);
        assert_eq!(classifier.kind, ClassifierKind::DataType);
        assert_eq!(classifier.instance_class.as_deref(), Some("java.lang.String"));
    }

    #[test]
    fn unnamed_definitions_land_in_the_document_package() {
        let mut graph = TypeGraph::new();
        let document = graph.add_document(SchemaDocument {
            resource_uri: "file:/schemas/inline.xsd".into(),
            target_namespace: None,
            element: None,
        });
        let type_id = graph.add_type(TypeDef {
            name: None,
            target_namespace: None,
            document: Some(document),
            element: None,
            kind: TypeDefKind::Class,
            base: None,
            features: Vec::new(),
        });
        let mut compiler = Compiler::new(CompilerConfig::default());
        let classifier = compiler.resolve_classifier(&graph, type_id);
        let package = compiler.model().get(compiler.model().get(classifier).package);
        assert_eq!(package.name, "inline");
        assert!(!package.qualified);
    }
}

//! The pluggable default synthesis strategy: how classifiers and features are
//! built when no builtin or override applies.
//!
//! The resolver owns caching, package membership, and annotation overlays;
//! the strategy only derives the records. The default mangles names the
//! generic way (UpperCamel classifiers, lowerCamel features); the resolver
//! undoes the feature mangling afterwards so that compiled feature names stay
//! exactly the source identifiers.

use roxmltree::Node;

use crate::metamodel::{Classifier, ClassifierKind, Package, Ref, StructuralFeature};
use crate::naming::{join_words, split_words, Casing};
use crate::type_graph::{FeatureDecl, TypeDef, TypeDefKind};

pub trait SynthesisStrategy {
    /// Derives the classifier record for a type definition.
    fn synthesize_classifier(
        &self,
        type_def: &TypeDef<'_, '_>,
        package: Ref<Package>,
    ) -> Classifier;

    /// Derives an optional parallel "type object" classifier registered
    /// alongside the main one and kept in sync for alias names.
    fn synthesize_type_object(
        &self,
        type_def: &TypeDef<'_, '_>,
        package: Ref<Package>,
    ) -> Option<Classifier> {
        let _ = (type_def, package);
        None
    }

    /// Derives the feature record for a feature declaration. The returned
    /// name may be mangled; the resolver forces it back to the source
    /// identifier.
    fn synthesize_feature(
        &self,
        decl: &FeatureDecl<'_, '_>,
        classifier_type: Option<Ref<Classifier>>,
    ) -> StructuralFeature;

    /// Default instance-class derivation, consulted when no
    /// `extendedInstanceClass` annotation is present.
    fn instance_class_name(
        &self,
        type_def: &TypeDef<'_, '_>,
        base: Option<&Classifier>,
    ) -> Option<String>;

    /// The strategy's own attribute lookup, consulted for annotation concepts
    /// outside the fixed override tables.
    fn attribute(&self, element: Option<Node>, concept: &str) -> Option<String> {
        let _ = (element, concept);
        None
    }
}

/// The generic name-mangling default.
#[derive(Default)]
pub struct MangledSynthesis {
    /// When set, every synthesized datatype classifier gets an `<Name>Object`
    /// companion classifier.
    pub type_objects: bool,
}

impl MangledSynthesis {
    fn classifier_name(type_def: &TypeDef<'_, '_>) -> String {
        let source = type_def.name.as_deref().unwrap_or("");
        join_words(&split_words(source, '_'), Casing::Upper, "_")
    }
}

impl SynthesisStrategy for MangledSynthesis {
    fn synthesize_classifier(
        &self,
        type_def: &TypeDef<'_, '_>,
        package: Ref<Package>,
    ) -> Classifier {
        let kind = match type_def.kind {
            TypeDefKind::Class => ClassifierKind::Class,
            TypeDefKind::DataType { .. } => ClassifierKind::DataType,
        };
        Classifier::new(Self::classifier_name(type_def), package, kind)
    }

    fn synthesize_type_object(
        &self,
        type_def: &TypeDef<'_, '_>,
        package: Ref<Package>,
    ) -> Option<Classifier> {
        if !self.type_objects || !matches!(type_def.kind, TypeDefKind::DataType { .. }) {
            return None;
        }
        let name = format!("{}Object", Self::classifier_name(type_def));
        Some(Classifier::new(name, package, ClassifierKind::DataType))
    }

    fn synthesize_feature(
        &self,
        decl: &FeatureDecl<'_, '_>,
        classifier_type: Option<Ref<Classifier>>,
    ) -> StructuralFeature {
        StructuralFeature {
            name: join_words(&split_words(&decl.name, '_'), Casing::Lower, "_"),
            classifier_type,
            min_occurs: decl.min_occurs,
            max_occurs: decl.max_occurs,
            alias_names: Vec::new(),
            read_only: false,
            opposite: None,
            sequenced: false,
        }
    }

    fn instance_class_name(
        &self,
        _type_def: &TypeDef<'_, '_>,
        base: Option<&Classifier>,
    ) -> Option<String> {
        // A derived value type is represented the same way as its base.
        base.and_then(|base| base.instance_class.clone())
    }
}

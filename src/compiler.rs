//! The compilation session: configuration bundle, session caches, and the
//! driver loop that feeds the type graph through the registrar and resolver.

use std::collections::{HashMap, HashSet};

use crate::builtins::{self, BuiltinTable};
use crate::error::Diagnostic;
use crate::metamodel::{Classifier, Metamodel, Package, Ref};
use crate::package_name::DomainTokenSet;
use crate::registrar::{NoValidation, SchemaValidator};
use crate::synthesis::{MangledSynthesis, SynthesisStrategy};
use crate::type_graph::{DocumentId, TypeGraph, TypeId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterBuiltins {
    Yes,
    No,
}

/// Immutable configuration bundle passed in at construction.
pub struct CompilerConfig {
    pub domain_tokens: DomainTokenSet,
    pub register_builtins: RegisterBuiltins,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            domain_tokens: DomainTokenSet::default(),
            register_builtins: RegisterBuiltins::Yes,
        }
    }
}

/// The namespace-to-package registry produced alongside the model, queryable
/// by later consumers such as a type-lookup-by-name service.
#[derive(Default)]
pub struct PackageRegistry {
    by_namespace: HashMap<Option<String>, Ref<Package>>,
}

impl PackageRegistry {
    pub(crate) fn put(&mut self, namespace: Option<String>, package: Ref<Package>) {
        self.by_namespace.insert(namespace, package);
    }

    pub fn package(&self, namespace: Option<&str>) -> Option<Ref<Package>> {
        self.by_namespace
            .get(&namespace.map(str::to_string))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, Ref<Package>)> {
        self.by_namespace
            .iter()
            .map(|(ns, &package)| (ns.as_deref(), package))
    }
}

/// The result of one compilation session.
pub struct Compilation {
    pub model: Metamodel,
    pub registry: PackageRegistry,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles a schema type graph into a metamodel.
///
/// One session owns one model. Every cache is write-once-per-key: a namespace
/// maps to exactly one package and a type-definition handle to exactly one
/// classifier for the session's whole lifetime.
pub struct Compiler {
    pub(crate) config: CompilerConfig,
    pub(crate) strategy: Box<dyn SynthesisStrategy>,
    pub(crate) validator: Box<dyn SchemaValidator>,

    pub(crate) model: Metamodel,
    pub(crate) registry: PackageRegistry,
    pub(crate) diagnostics: Vec<Diagnostic>,

    pub(crate) admitted: HashSet<DocumentId>,
    pub(crate) inputs: Vec<DocumentId>,
    pub(crate) packages_by_namespace: HashMap<Option<String>, Ref<Package>>,
    pub(crate) classifiers_by_type: HashMap<TypeId, Ref<Classifier>>,

    pub(crate) builtin_table: BuiltinTable,
    pub(crate) builtin_models: HashSet<Ref<Package>>,
    pub(crate) type_objects: HashMap<Ref<Classifier>, Ref<Classifier>>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        let mut model = Metamodel::new();
        let mut builtin_table = BuiltinTable::default();
        let mut packages_by_namespace = HashMap::new();
        let mut registry = PackageRegistry::default();

        if config.register_builtins == RegisterBuiltins::Yes {
            let (package, table) = builtins::register_builtins(&mut model);
            builtin_table = table;
            packages_by_namespace.insert(Some(builtins::XS_NAMESPACE.to_string()), package);
            registry.put(Some(builtins::XS_NAMESPACE.to_string()), package);
        }

        Self {
            config,
            strategy: Box::new(MangledSynthesis::default()),
            validator: Box::new(NoValidation),
            model,
            registry,
            diagnostics: Vec::new(),
            admitted: HashSet::new(),
            inputs: Vec::new(),
            packages_by_namespace,
            classifiers_by_type: HashMap::new(),
            builtin_table,
            builtin_models: HashSet::new(),
            type_objects: HashMap::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn SynthesisStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn model(&self) -> &Metamodel {
        &self.model
    }

    /// Direct model access, intended for preparing builtin-model packages
    /// before compilation starts.
    pub fn model_mut(&mut self) -> &mut Metamodel {
        &mut self.model
    }

    /// Marks `package` as part of the non-overridable builtin model. Its
    /// classifiers win over same-named generated ones, and every classifier
    /// with an `Object`-suffixed sibling gets the sibling registered as its
    /// paired type object.
    pub fn register_builtin_model(&mut self, package: Ref<Package>) {
        self.builtin_models.insert(package);
        let namespace = self.model.get(package).namespace_uri.clone();
        self.packages_by_namespace
            .entry(namespace.clone())
            .or_insert(package);
        self.registry.put(namespace, package);
        for (classifier, object) in builtins::type_object_pairs(&self.model, package) {
            self.type_objects.insert(classifier, object);
        }
    }

    /// Registers `object` as the paired type-object classifier of
    /// `classifier`. Alias-name overlays are kept in sync across the pair.
    pub fn pair_type_object(&mut self, classifier: Ref<Classifier>, object: Ref<Classifier>) {
        self.type_objects.insert(classifier, object);
    }

    /// Drives a whole type graph through the session: admits every document,
    /// then resolves every type definition.
    pub fn compile(&mut self, graph: &TypeGraph<'_, '_>) {
        for (document, _) in graph.documents() {
            self.admit(graph, document);
        }
        for (type_id, _) in graph.types() {
            self.resolve_classifier(graph, type_id);
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Releases the session, yielding the compiled model, the namespace
    /// registry, and all collected diagnostics.
    pub fn finish(self) -> Compilation {
        Compilation {
            model: self.model,
            registry: self.registry,
            diagnostics: self.diagnostics,
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

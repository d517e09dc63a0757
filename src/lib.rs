//! Naming and resolution engine compiling schema type graphs into an
//! object-model metamodel.
//!
//! A [`reader`] front end extracts a [`type_graph::TypeGraph`] from parsed
//! schema markup; a [`compiler::Compiler`] session resolves it into packages,
//! classifiers, and structural features, applying the namespace-derived
//! package naming, the identifier word-splitting rules, and the annotation
//! overrides along the way.

pub mod annotation;
pub mod builtins;
pub mod compiler;
pub mod error;
pub mod metamodel;
pub mod naming;
pub mod package_name;
pub mod qname;
pub mod reader;
pub mod registrar;
mod resolver;
pub mod synthesis;
pub mod type_graph;

pub use compiler::{Compilation, Compiler, CompilerConfig, PackageRegistry, RegisterBuiltins};
pub use error::{Diagnostic, ModelError, Severity};
pub use metamodel::{
    Classifier, ClassifierKind, MaxOccurs, Metamodel, Package, Ref, StructuralFeature,
};
pub use qname::QName;

/// Compiles a single parsed schema document with the default configuration.
pub fn compile_schema(
    document: &roxmltree::Document,
    resource_uri: &str,
) -> Result<Compilation, ModelError> {
    let mut graph = type_graph::TypeGraph::new();
    reader::read_schema(&mut graph, document, resource_uri)?;
    let mut compiler = Compiler::default();
    compiler.compile(&graph);
    Ok(compiler.finish())
}

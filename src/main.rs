use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use xsd_metamodel::compiler::{Compiler, CompilerConfig, RegisterBuiltins};
use xsd_metamodel::metamodel::{ClassifierKind, MaxOccurs, Metamodel};
use xsd_metamodel::reader;
use xsd_metamodel::registrar::BasicValidator;
use xsd_metamodel::type_graph::TypeGraph;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Builtins {
    Yes,
    No,
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The source file or URL
    input: String,

    /// Allow a XML Document Type Definition (DTD) to occur
    #[arg(long)]
    allow_dtd: bool,

    /// Register the schema-for-schema builtin vocabulary
    #[arg(long, value_enum, default_value = "yes")]
    register_builtins: Builtins,

    /// Check documents for duplicate top-level definitions
    #[arg(long)]
    validate: bool,
}

fn load(input: &str) -> String {
    if input.starts_with("http://") || input.starts_with("https://") {
        reqwest::blocking::get(input).unwrap().text().unwrap()
    } else {
        std::fs::read_to_string(input).unwrap()
    }
}

fn render(model: &Metamodel) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for (_, package) in model.packages() {
        let namespace = package.namespace_uri.as_deref().unwrap_or("(none)");
        writeln!(
            out,
            "package {} [prefix {}, namespace {namespace}]",
            package.name, package.ns_prefix
        )
        .unwrap();
        for &classifier in &package.classifiers {
            let classifier = model.get(classifier);
            let kind = match classifier.kind {
                ClassifierKind::Class => "class",
                ClassifierKind::DataType => "datatype",
            };
            write!(out, "  {kind} {}", classifier.name).unwrap();
            if let Some(instance_class) = classifier.instance_class.as_deref() {
                write!(out, " ({instance_class})").unwrap();
            }
            if !classifier.alias_names.is_empty() {
                write!(out, " alias {}", classifier.alias_names.join(" ")).unwrap();
            }
            writeln!(out).unwrap();
            for &feature in &classifier.features {
                let feature = model.get(feature);
                let max = match feature.max_occurs {
                    MaxOccurs::Count(count) => count.to_string(),
                    MaxOccurs::Unbounded => "*".to_string(),
                };
                write!(out, "    {} [{}..{max}]", feature.name, feature.min_occurs).unwrap();
                if let Some(type_ref) = feature.classifier_type {
                    write!(out, ": {}", model.get(type_ref).name).unwrap();
                }
                writeln!(out).unwrap();
            }
        }
    }
    out
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = load(&cli.input);
    let options = roxmltree::ParsingOptions {
        allow_dtd: cli.allow_dtd,
        ..Default::default()
    };
    let document = roxmltree::Document::parse_with_options(&source, options).unwrap();

    let mut graph = TypeGraph::new();
    reader::read_schema(&mut graph, &document, &cli.input).unwrap();

    let config = CompilerConfig {
        register_builtins: match cli.register_builtins {
            Builtins::Yes => RegisterBuiltins::Yes,
            Builtins::No => RegisterBuiltins::No,
        },
        ..Default::default()
    };
    let mut compiler = Compiler::new(config);
    if cli.validate {
        compiler = compiler.with_validator(Box::new(BasicValidator));
    }
    compiler.compile(&graph);
    let compilation = compiler.finish();

    for diagnostic in &compilation.diagnostics {
        eprintln!("{:?}: {}", diagnostic.severity, diagnostic.message);
    }
    print!("{}", render(&compilation.model));
}

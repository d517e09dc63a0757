//! The fixed builtin classifier vocabulary for the schema-for-schema
//! namespace, registered into a fresh session model at construction.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::metamodel::{Classifier, ClassifierKind, Metamodel, Package, Ref};
use crate::qname::QName;

/// The schema-for-schema namespace (pt. 1, §1.3.1).
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

lazy_static! {
    /// The `xs:anyType` qualified name
    pub static ref XS_ANY_TYPE_NAME: QName = QName::with_namespace(XS_NAMESPACE, "anyType");
    /// The `xs:string` qualified name
    pub static ref XS_STRING_NAME: QName = QName::with_namespace(XS_NAMESPACE, "string");
    /// The `xs:boolean` qualified name
    pub static ref XS_BOOLEAN_NAME: QName = QName::with_namespace(XS_NAMESPACE, "boolean");
}

/// Fixed mapping from (schema-for-schema namespace, local name) to a prebuilt
/// classifier. Builtins always take precedence over generated duplicates.
#[derive(Default)]
pub struct BuiltinTable {
    map: HashMap<QName, Ref<Classifier>>,
}

impl BuiltinTable {
    pub fn lookup(&self, name: &QName) -> Option<Ref<Classifier>> {
        self.map.get(name).copied()
    }

    pub fn lookup_local(&self, local_name: &str) -> Option<Ref<Classifier>> {
        self.lookup(&QName::with_namespace(XS_NAMESPACE, local_name))
    }
}

/// Local name, compiled classifier name, and instance-class binding for every
/// builtin simple type the engine knows about.
const BUILTIN_DATA_TYPES: &[(&str, &str, &str)] = &[
    ("anySimpleType", "Object", "java.lang.Object"),
    ("anyURI", "URI", "java.lang.String"),
    ("base64Binary", "Bytes", "byte[]"),
    ("boolean", "Boolean", "boolean"),
    ("byte", "Byte", "byte"),
    ("date", "YearMonthDay", "java.lang.String"),
    ("dateTime", "DateTime", "java.lang.String"),
    ("decimal", "Decimal", "java.math.BigDecimal"),
    ("double", "Double", "double"),
    ("duration", "Duration", "java.lang.String"),
    ("ENTITY", "String", "java.lang.String"),
    ("float", "Float", "float"),
    ("gDay", "Day", "java.lang.String"),
    ("gMonth", "Month", "java.lang.String"),
    ("gMonthDay", "MonthDay", "java.lang.String"),
    ("gYear", "Year", "java.lang.String"),
    ("gYearMonth", "YearMonth", "java.lang.String"),
    ("hexBinary", "Bytes", "byte[]"),
    ("ID", "String", "java.lang.String"),
    ("IDREF", "String", "java.lang.String"),
    ("int", "Int", "int"),
    ("integer", "Integer", "java.math.BigInteger"),
    ("language", "String", "java.lang.String"),
    ("long", "Long", "long"),
    ("Name", "String", "java.lang.String"),
    ("NCName", "String", "java.lang.String"),
    ("negativeInteger", "Integer", "java.math.BigInteger"),
    ("NMTOKEN", "String", "java.lang.String"),
    ("nonNegativeInteger", "Integer", "java.math.BigInteger"),
    ("nonPositiveInteger", "Integer", "java.math.BigInteger"),
    ("normalizedString", "String", "java.lang.String"),
    ("positiveInteger", "Integer", "java.math.BigInteger"),
    ("QName", "URI", "javax.xml.namespace.QName"),
    ("short", "Short", "short"),
    ("string", "String", "java.lang.String"),
    ("time", "Time", "java.lang.String"),
    ("token", "String", "java.lang.String"),
    ("unsignedByte", "Short", "short"),
    ("unsignedInt", "Long", "long"),
    ("unsignedLong", "Integer", "java.math.BigInteger"),
    ("unsignedShort", "Int", "int"),
];

/// Creates the schema-for-schema package and its builtin classifiers, and
/// returns the lookup table keyed by qualified name.
pub(crate) fn register_builtins(model: &mut Metamodel) -> (Ref<Package>, BuiltinTable) {
    let package = model.create(Package {
        name: "commonj.sdo".into(),
        namespace_uri: Some(XS_NAMESPACE.into()),
        ns_prefix: "xsd".into(),
        qualified: true,
        classifiers: Vec::new(),
    });

    let mut table = BuiltinTable::default();

    // xs:anyType is the one class-like builtin; everything that is not
    // representable more precisely falls back to it.
    let mut any_type = Classifier::new("DataObject", package, ClassifierKind::Class);
    any_type.is_builtin = true;
    let any_type = model.add_classifier(any_type);
    table.map.insert(XS_ANY_TYPE_NAME.clone(), any_type);

    for &(local_name, classifier_name, instance_class) in BUILTIN_DATA_TYPES {
        // Several XSD locals fold onto one classifier (all string-derived
        // locals map to String, for example); the first registration wins.
        let ref_ = match model.classifier_in_package(package, classifier_name) {
            Some(existing) => existing,
            None => {
                let mut classifier =
                    Classifier::new(classifier_name, package, ClassifierKind::DataType);
                classifier.is_builtin = true;
                classifier.instance_class = Some(instance_class.into());
                model.add_classifier(classifier)
            }
        };
        table
            .map
            .insert(QName::with_namespace(XS_NAMESPACE, local_name), ref_);
    }

    (package, table)
}

/// Pairs every classifier `X` in `package` with a sibling named `XObject`,
/// the parallel "type object" representation kept in sync for alias names.
pub(crate) fn type_object_pairs(
    model: &Metamodel,
    package: Ref<Package>,
) -> Vec<(Ref<Classifier>, Ref<Classifier>)> {
    let mut pairs = Vec::new();
    for &classifier in &model.get(package).classifiers {
        let object_name = format!("{}Object", model.get(classifier).name);
        if let Some(object) = model.classifier_in_package(package, &object_name) {
            pairs.push((classifier, object));
        }
    }
    pairs
}

//! Qualified names: an optional namespace URI paired with a local name.

use std::fmt;

use crate::error::ModelError;

pub type NCName = String;
pub type AnyUri = String;

/// The namespace the `xml` prefix is bound to by definition.
/// (Namespaces in XML 1.0, §3, Reserved Prefixes and Namespace Names)
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace_name: Option<AnyUri>,
    pub local_name: NCName,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace_name.as_ref() {
            Some(namespace_name) => write!(f, "{{{}}}:{}", namespace_name, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

impl QName {
    pub fn with_namespace(
        namespace_name: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self::with_optional_namespace(Some(namespace_name), local_name)
    }

    pub fn with_optional_namespace(
        namespace_name: Option<impl Into<String>>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace_name: namespace_name.map(Into::into),
            local_name: local_name.into(),
        }
    }

    /// Expands a lexical QName against `context`'s in-scope namespace
    /// bindings.
    ///
    /// An unprefixed name takes the default namespace in scope, if any
    /// (Namespaces in XML 1.0, §6.2). A prefix that resolves to no in-scope
    /// declaration is an error.
    pub fn parse(source: &str, context: roxmltree::Node) -> Result<Self, ModelError> {
        let Some((prefix, local)) = source.rsplit_once(':') else {
            let namespace_name = context.lookup_namespace_uri(None);
            return Ok(Self::with_optional_namespace(namespace_name, source));
        };

        let namespace_name = if prefix == "xml" {
            XML_NAMESPACE
        } else {
            context
                .lookup_namespace_uri(Some(prefix))
                .ok_or_else(|| ModelError::PrefixNotResolved(prefix.into()))?
        };
        Ok(Self::with_namespace(namespace_name, local))
    }
}

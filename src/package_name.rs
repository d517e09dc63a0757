//! Derivation of a dotted package identifier from a schema namespace URI.
//!
//! The derivation is a pure function of the URI string: hierarchical URIs are
//! named after their reversed host plus path, `urn:` URIs get a host-style
//! treatment of their dash-separated prefix when it ends in a recognized
//! domain token, and everything else is split on `/` as-is. Malformed input
//! degrades to a best-effort (possibly empty) name instead of failing.

use std::collections::HashSet;

use url::Url;

use crate::naming::{join_words, split_words, Casing};

/// Recognized top-level-domain-style tokens. Used only to decide whether the
/// leading segment of an opaque URN should be reversed host-style.
#[derive(Clone, Debug)]
pub struct DomainTokenSet(HashSet<String>);

impl DomainTokenSet {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

impl Default for DomainTokenSet {
    fn default() -> Self {
        Self::new([
            "com", "org", "net", "edu", "gov", "mil", "int", "biz", "info", "name",
        ])
    }
}

/// Removes a trailing file extension from the last path segment, if any.
fn trim_file_extension(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, last)) => match last.rsplit_once('.') {
            Some((stem, _)) => &path[..path.len() - last.len() + stem.len()],
            None => path,
        },
        None => match path.rsplit_once('.') {
            Some((stem, _)) => &path[..stem.len()],
            None => path,
        },
    }
}

/// Derives the default dotted package name for `namespace`.
pub fn default_package_name(namespace: &str, domain_tokens: &DomainTokenSet) -> String {
    let mut parsed_name: Vec<String>;

    match Url::parse(namespace) {
        Ok(uri) if uri.has_authority() => {
            let mut host = uri.host_str().unwrap_or("");
            if let Some(stripped) = host.strip_prefix("www.") {
                host = stripped;
            }
            parsed_name = split_words(host, '.');
            parsed_name.reverse();
            if let Some(first) = parsed_name.first_mut() {
                *first = first.to_lowercase();
            }
            parsed_name.extend(split_words(trim_file_extension(uri.path()), '/'));
        }
        Ok(uri) => {
            // The opaque part is everything after the scheme; the scheme is
            // known to be present since the parse succeeded.
            let opaque = &namespace[uri.scheme().len() + 1..];
            match opaque.split_once(':') {
                Some((prefix, rest)) if uri.scheme().eq_ignore_ascii_case("urn") => {
                    parsed_name = split_words(prefix, '-');
                    if parsed_name
                        .last()
                        .is_some_and(|last| domain_tokens.contains(last))
                    {
                        parsed_name.reverse();
                        if let Some(first) = parsed_name.first_mut() {
                            *first = first.to_lowercase();
                        }
                    }
                    parsed_name.extend(split_words(rest, '/'));
                }
                _ => {
                    parsed_name = split_words(opaque, '/');
                }
            }
        }
        Err(_) => {
            // No scheme at all; treat the whole string as an opaque part.
            parsed_name = split_words(namespace, '/');
        }
    }

    let mut qualified = String::new();
    for segment in &parsed_name {
        if segment.is_empty() {
            continue;
        }
        if !qualified.is_empty() {
            qualified.push('.');
        }
        qualified.push_str(&join_words(
            &split_words(segment, '_'),
            Casing::Lower,
            "_",
        ));
    }

    // Downstream package-name consumers compare case-insensitively; emitting
    // lowercase keeps them consistent.
    qualified.to_lowercase()
}

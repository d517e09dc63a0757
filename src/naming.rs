//! Identifier normalization: word splitting and re-joining under a casing
//! convention. These are pure functions; callers compose them to derive
//! classifier and package names from XML identifiers.

/// Casing applied by [`join_words`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Casing {
    /// Capitalize every word ("UpperCamel").
    Upper,
    /// Capitalize every word except the first, then uncapitalize the result
    /// ("lowerCamel").
    Lower,
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Splits `source` into word fragments.
///
/// Any character that is not valid in an identifier is treated as `separator`.
/// A new word starts at an uppercase letter, at a digit following a non-digit,
/// or at the separator. When a run of more than one lowercase letter is
/// followed by an uppercase letter, the boundary moves one character back so
/// that the trailing letter of an acronym stays attached to the next word
/// ("XMLParser" becomes ["XML", "Parser"]).
///
/// The final fragment is always emitted, even when it is empty.
pub fn split_words(source: &str, separator: char) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut last_is_lower = false;

    for mut c in source.chars() {
        if !is_identifier_part(c) {
            c = separator;
        }

        if c.is_uppercase() || (!last_is_lower && c.is_ascii_digit()) || c == separator {
            if (last_is_lower && current.chars().count() > 1)
                || (c == separator && !current.is_empty())
            {
                result.push(std::mem::take(&mut current));
            }
            last_is_lower = false;
        } else {
            if !last_is_lower && current.chars().count() > 1 {
                // Keep the last letter of the uppercase run attached to the
                // word that starts here.
                let tail = current.pop().unwrap();
                result.push(std::mem::take(&mut current));
                current.push(tail);
            }
            last_is_lower = true;
        }

        if c != separator {
            current.push(c);
        }
    }

    result.push(current);
    result
}

/// Joins word fragments under `casing`.
///
/// An empty join yields `fallback_prefix`; a join whose first character is not
/// a valid identifier start gets `fallback_prefix` prepended.
pub fn join_words<S: AsRef<str>>(words: &[S], casing: Casing, fallback_prefix: &str) -> String {
    let mut result = String::new();
    for word in words {
        let word = word.as_ref();
        if word.is_empty() {
            continue;
        }
        let mut chars = word.chars();
        let first = chars.next().unwrap();
        if !result.is_empty() || casing == Casing::Upper {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        } else {
            result.push(first);
            result.push_str(chars.as_str());
        }
    }

    if result.is_empty() {
        fallback_prefix.to_string()
    } else if is_identifier_start(result.chars().next().unwrap()) {
        match casing {
            Casing::Lower => uncapitalize(&result),
            Casing::Upper => result,
        }
    } else {
        format!("{fallback_prefix}{result}")
    }
}

/// Lowercases the leading uppercase run of `word`.
///
/// The boundary is the first character that is not itself uppercase. When the
/// run is longer than one character and the boundary character is not a digit,
/// the last letter of the run stays capitalized so that it reads as the start
/// of the following word ("URLValue" becomes "urlValue", not "uRLValue").
pub fn uncapitalize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = word.chars().collect();
    let mut i = chars.len();
    for (index, c) in chars.iter().enumerate() {
        if c.to_lowercase().to_string() == c.to_string() {
            i = index;
            break;
        }
    }

    if i > 1 && i < chars.len() && !chars[i].is_ascii_digit() {
        i -= 1;
    }

    let mut result = String::new();
    for c in &chars[..i] {
        result.extend(c.to_lowercase());
    }
    result.extend(&chars[i..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(split_words("helloWorld", '_'), vec!["hello", "World"]);
    }

    #[test]
    fn splits_acronym_tail() {
        assert_eq!(split_words("XMLParser", '_'), vec!["XML", "Parser"]);
    }

    #[test]
    fn splits_digits_after_letters() {
        assert_eq!(split_words("ipv4Address", '_'), vec!["ipv4", "Address"]);
    }

    #[test]
    fn invalid_chars_act_as_separator() {
        assert_eq!(split_words("a-b.c", '_'), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_input_yields_one_empty_fragment() {
        assert_eq!(split_words("", '_'), vec![""]);
    }

    #[test]
    fn join_upper_capitalizes_every_word() {
        assert_eq!(
            join_words(&["purchase", "order"], Casing::Upper, "_"),
            "PurchaseOrder"
        );
    }

    #[test]
    fn join_lower_uncapitalizes_first_word() {
        assert_eq!(
            join_words(&["Purchase", "Order"], Casing::Lower, "_"),
            "purchaseOrder"
        );
    }

    #[test]
    fn join_empty_yields_prefix() {
        assert_eq!(join_words(&[] as &[&str], Casing::Lower, "_"), "_");
    }

    #[test]
    fn join_prepends_prefix_for_invalid_start() {
        assert_eq!(join_words(&["1st"], Casing::Upper, "_"), "_1st");
    }

    #[test]
    fn uncapitalize_keeps_acronym_tail() {
        assert_eq!(uncapitalize("URLValue"), "urlValue");
    }

    #[test]
    fn uncapitalize_plain_word() {
        assert_eq!(uncapitalize("Order"), "order");
        assert_eq!(uncapitalize("order"), "order");
        assert_eq!(uncapitalize(""), "");
    }

    #[test]
    fn uncapitalize_digit_boundary_takes_whole_run() {
        // The keep-back rule is suppressed when the boundary is a digit.
        assert_eq!(uncapitalize("AB1c"), "ab1c");
    }

    proptest! {
        // Re-normalizing an already-normalized name is a no-op.
        #[test]
        fn join_is_idempotent(words in proptest::collection::vec("[a-z]{1,8}", 0..6)) {
            let once = join_words(&words, Casing::Upper, "_");
            let twice = join_words(&split_words(&once, '_'), Casing::Upper, "_");
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn split_never_panics(source in ".{0,64}") {
            let words = split_words(&source, '_');
            prop_assert!(!words.is_empty());
        }

        #[test]
        fn split_is_deterministic(source in ".{0,64}") {
            prop_assert_eq!(split_words(&source, '_'), split_words(&source, '_'));
        }
    }
}

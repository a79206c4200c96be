//! core::classify
//!
//! Infer a package's runtime kind from its declared dependencies.

use super::types::PackageType;

/// Signature dependencies, checked in order. The first match wins, so
/// more specific frameworks come before the libraries they build on.
const SIGNATURES: [(&str, PackageType); 6] = [
    ("next", PackageType::Next),
    ("react-native", PackageType::ReactNative),
    ("react", PackageType::React),
    ("vue", PackageType::Vue),
    ("@angular/core", PackageType::Angular),
    ("svelte", PackageType::Svelte),
];

/// Classify a package from the union of its dependency names.
///
/// # Example
///
/// ```
/// use monoguard::core::classify::classify;
/// use monoguard::core::types::PackageType;
///
/// assert_eq!(classify(["react", "next"]), PackageType::Next);
/// assert_eq!(classify(["lodash"]), PackageType::Node);
/// ```
pub fn classify<'a>(names: impl IntoIterator<Item = &'a str>) -> PackageType {
    let names: Vec<&str> = names.into_iter().collect();

    SIGNATURES
        .iter()
        .find(|(signature, _)| names.contains(signature))
        .map(|(_, kind)| *kind)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_node() {
        assert_eq!(classify(std::iter::empty()), PackageType::Node);
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(classify(["react", "next"]), PackageType::Next);
        assert_eq!(classify(["next", "react"]), PackageType::Next);
        assert_eq!(classify(["react", "react-native"]), PackageType::ReactNative);
    }

    #[test]
    fn each_signature() {
        assert_eq!(classify(["react"]), PackageType::React);
        assert_eq!(classify(["vue"]), PackageType::Vue);
        assert_eq!(classify(["@angular/core"]), PackageType::Angular);
        assert_eq!(classify(["svelte"]), PackageType::Svelte);
    }

    #[test]
    fn prefixes_do_not_match() {
        assert_eq!(classify(["react-dom", "nextra"]), PackageType::Node);
    }
}

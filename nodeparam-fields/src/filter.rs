//! Selection of the template entries a user may edit in the parameter grid.

use std::collections::BTreeSet;

use crate::types::{FieldDescriptor, FieldKind};

/// The set of field type names the grid can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedTypes(BTreeSet<String>);

impl SupportedTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.0.contains(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SupportedTypes {
    fn default() -> Self {
        Self::new(FieldKind::ALL.iter().map(FieldKind::as_str))
    }
}

/// Decides which template entries are projectable.
#[derive(Debug, Clone, Default)]
pub struct FieldFilter {
    supported: SupportedTypes,
}

impl FieldFilter {
    pub fn new(supported: SupportedTypes) -> Self {
        Self { supported }
    }

    pub fn supported_types(&self) -> &SupportedTypes {
        &self.supported
    }

    /// True when the field belongs in the grid.
    ///
    /// Private keys (leading `_`), hidden fields, unsupported types, the
    /// primary code field and proxies of code fields are all excluded.
    pub fn is_projectable(&self, key: &str, descriptor: &FieldDescriptor) -> bool {
        !key.starts_with('_')
            && descriptor.visible
            && self.supported.contains(&descriptor.type_)
            && !is_primary_code_field(key, descriptor)
            && !is_code_proxy_field(key, descriptor)
    }
}

/// `is_projectable` against the default supported type set.
pub fn is_projectable(key: &str, descriptor: &FieldDescriptor) -> bool {
    FieldFilter::default().is_projectable(key, descriptor)
}

// The code field has its own editor surface.
fn is_primary_code_field(key: &str, descriptor: &FieldDescriptor) -> bool {
    key == "code" && descriptor.type_ == FieldKind::Code.as_str()
}

// Independent of the rule above: any proxied field whose key mentions code.
fn is_code_proxy_field(key: &str, descriptor: &FieldDescriptor) -> bool {
    key.contains("code") && descriptor.is_code_proxy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldProxy;
    use proptest::prelude::*;
    use rstest::rstest;

    fn proxy() -> FieldProxy {
        FieldProxy {
            field: "code".into(),
            id: "CustomComponent-1".into(),
        }
    }

    #[test]
    fn default_set_lists_the_known_kinds() {
        let supported = SupportedTypes::default();
        assert_eq!(supported.len(), FieldKind::ALL.len());
        for name in ["str", "bool", "float", "code", "prompt", "file", "int", "dict", "NestedDict"] {
            assert!(supported.contains(name), "{name} should be supported");
        }
        assert!(!supported.contains("BaseLanguageModel"));
    }

    #[rstest]
    #[case::plain_string("api_key", FieldDescriptor::new("str"), true)]
    #[case::private_key("_internal", FieldDescriptor::new("str"), false)]
    #[case::hidden("api_key", FieldDescriptor::new("str").with_visible(false), false)]
    #[case::unsupported("llm", FieldDescriptor::new("BaseLanguageModel"), false)]
    #[case::primary_code("code", FieldDescriptor::new("code"), false)]
    #[case::code_key_other_type("code", FieldDescriptor::new("str"), true)]
    #[case::code_type_other_key("snippet", FieldDescriptor::new("code"), true)]
    #[case::code_proxy("python_code", FieldDescriptor::new("str").with_proxy(proxy()), false)]
    #[case::proxy_without_code_key("prompt", FieldDescriptor::new("prompt").with_proxy(proxy()), true)]
    #[case::code_substring_no_proxy("code_language", FieldDescriptor::new("str"), true)]
    #[case::advanced_still_projectable("top_p", FieldDescriptor::new("float").with_advanced(true), true)]
    fn projectable_rules(
        #[case] key: &str,
        #[case] descriptor: FieldDescriptor,
        #[case] expected: bool,
    ) {
        assert_eq!(is_projectable(key, &descriptor), expected);
    }

    #[test]
    fn custom_supported_set_widens_the_grid() {
        let filter = FieldFilter::new(SupportedTypes::new(["str", "slider"]));
        assert!(filter.is_projectable("temperature", &FieldDescriptor::new("slider")));
        assert!(!filter.is_projectable("max_tokens", &FieldDescriptor::new("int")));
    }

    #[test]
    fn empty_supported_set_projects_nothing() {
        let filter = FieldFilter::new(SupportedTypes::new(Vec::<String>::new()));
        assert!(filter.supported_types().is_empty());
        assert!(!filter.is_projectable("api_key", &FieldDescriptor::new("str")));
    }

    proptest! {
        #[test]
        fn underscore_keys_never_projectable(
            suffix in "[a-z_]{0,12}",
            type_name in prop::sample::select(vec!["str", "bool", "int", "code", "prompt", "dict"]),
            advanced in any::<bool>(),
            proxied in any::<bool>(),
        ) {
            let key = format!("_{suffix}");
            let mut descriptor = FieldDescriptor::new(type_name).with_advanced(advanced);
            if proxied {
                descriptor = descriptor.with_proxy(proxy());
            }
            prop_assert!(!is_projectable(&key, &descriptor));
        }

        #[test]
        fn unsupported_types_never_projectable(
            key in "[a-z][a-z_]{0,12}",
            type_name in "[A-Z][A-Za-z]{3,16}",
        ) {
            prop_assume!(type_name != "NestedDict");
            prop_assert!(!is_projectable(&key, &FieldDescriptor::new(type_name)));
        }
    }
}

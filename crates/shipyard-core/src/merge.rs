//! Layered model merging.
//!
//! Configuration can come from several files. They are folded together
//! highest precedence first, so `merge` keeps whatever `self` already has
//! and only fills the gaps from `other`:
//!
//! - `Option<T>`: `None` takes `other`; two `Some`s merge their contents.
//! - `String`: blank takes `other`.
//! - `Vec<T>`: empty takes `other`.
//! - `IndexMap<String, T>`: union; shared keys merge, new keys append.
//! - scalars and keyword enums: keep `self`.
//!
//! Structs list their merged fields with [`merge_fields!`]. Fields computed
//! during validation are `#[serde(skip)]` and never listed.

use indexmap::IndexMap;

/// First-non-null merge.
pub trait Merge {
    /// Fill unset parts of `self` from `other`.
    fn merge(&mut self, other: Self);
}

impl<T: Merge> Merge for Option<T> {
    fn merge(&mut self, other: Self) {
        match (self.as_mut(), other) {
            (None, other) => *self = other,
            (Some(current), Some(other)) => current.merge(other),
            (Some(_), None) => {}
        }
    }
}

impl Merge for String {
    fn merge(&mut self, other: Self) {
        if self.trim().is_empty() {
            *self = other;
        }
    }
}

impl<T> Merge for Vec<T> {
    fn merge(&mut self, other: Self) {
        if self.is_empty() {
            *self = other;
        }
    }
}

impl<T: Merge> Merge for IndexMap<String, T> {
    fn merge(&mut self, other: Self) {
        for (key, value) in other {
            match self.get_mut(&key) {
                Some(current) => current.merge(value),
                None => {
                    self.insert(key, value);
                }
            }
        }
    }
}

macro_rules! keep_first {
    ($($ty:ty),+ $(,)?) => {
        $(impl Merge for $ty {
            fn merge(&mut self, _other: Self) {}
        })+
    };
}

keep_first!(bool, u16, u32, u64, i64);

/// Merge the listed fields of `$other` into `$self`.
#[macro_export]
macro_rules! merge_fields {
    ($self:ident, $other:ident, [$($field:ident),* $(,)?]) => {
        $( $crate::merge::Merge::merge(&mut $self.$field, $other.$field); )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Layer {
        name: Option<String>,
        port: Option<u32>,
        tags: Vec<String>,
        props: IndexMap<String, String>,
    }

    impl Merge for Layer {
        fn merge(&mut self, other: Self) {
            merge_fields!(self, other, [name, port, tags, props]);
        }
    }

    fn merged(mut a: Layer, b: Layer) -> Layer {
        a.merge(b);
        a
    }

    fn layer() -> impl Strategy<Value = Layer> {
        (
            proptest::option::of("[a-c ]{0,2}"),
            proptest::option::of(0u32..4),
            proptest::collection::vec("[a-c]", 0..3),
            proptest::collection::vec(("[a-c]", "[x-z ]{0,2}"), 0..3),
        )
            .prop_map(|(name, port, tags, props)| Layer {
                name,
                port,
                tags,
                props: props.into_iter().collect(),
            })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(a in layer()) {
            prop_assert_eq!(merged(a.clone(), a.clone()), a);
        }

        #[test]
        fn merge_is_associative(a in layer(), b in layer(), c in layer()) {
            let left = merged(merged(a.clone(), b.clone()), c.clone());
            let right = merged(a, merged(b, c));
            prop_assert_eq!(left, right);
        }
    }

    #[test]
    fn blank_string_takes_other() {
        let mut value = Some("  ".to_string());
        value.merge(Some("x".to_string()));
        assert_eq!(value.as_deref(), Some("x"));
    }

    #[test]
    fn map_keeps_existing_and_appends_new() {
        let mut left: IndexMap<String, String> =
            [("a".to_string(), "1".to_string())].into_iter().collect();
        let right: IndexMap<String, String> = [
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "9".to_string()),
        ]
        .into_iter()
        .collect();
        left.merge(right);
        assert_eq!(left.get("a").map(String::as_str), Some("1"));
        assert_eq!(left.keys().collect::<Vec<_>>(), ["a", "b"]);
    }
}

//! Closed keyword enums shared by the model.
//!
//! Configuration files spell enum values in several ways (`ALWAYS`,
//! `always`, `release-prerelease`, `RELEASE_PRERELEASE`). [`keyword_enum!`]
//! generates an enum that parses all of them and serializes to one
//! canonical spelling.

use std::fmt;

/// A configuration value that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyword {
    /// Enum being parsed.
    pub kind: &'static str,
    /// Value as written.
    pub value: String,
}

impl fmt::Display for UnknownKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownKeyword {}

/// Fold case and separators so `Release-Prerelease` matches `RELEASE_PRERELEASE`.
pub(crate) fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Declare a keyword enum.
///
/// Each variant maps to its canonical text. The generated type implements
/// `Display`, `FromStr`, serde in both directions, and keep-first
/// [`Merge`](crate::merge::Merge).
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical spelling.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::keyword::UnknownKeyword;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let wanted = $crate::keyword::normalize(value);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| $crate::keyword::normalize(v.as_str()) == wanted)
                    .ok_or_else(|| $crate::keyword::UnknownKeyword {
                        kind: stringify!($name),
                        value: value.to_string(),
                    })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }

        impl $crate::merge::Merge for $name {
            fn merge(&mut self, _other: Self) {}
        }
    };
}

pub(crate) use keyword_enum;

#[cfg(test)]
mod tests {
    use super::*;

    keyword_enum! {
        enum Sample {
            First => "FIRST",
            SecondThing => "SECOND_THING",
        }
    }

    #[test]
    fn parses_any_spelling() {
        assert_eq!("first".parse::<Sample>().unwrap(), Sample::First);
        assert_eq!("second-thing".parse::<Sample>().unwrap(), Sample::SecondThing);
        assert_eq!("Second_Thing".parse::<Sample>().unwrap(), Sample::SecondThing);
    }

    #[test]
    fn unknown_value_names_the_enum() {
        let err = "third".parse::<Sample>().unwrap_err();
        assert_eq!(err.to_string(), "unknown Sample 'third'");
    }

    #[test]
    fn serializes_canonical_text() {
        let json = serde_json::to_string(&Sample::SecondThing).unwrap();
        assert_eq!(json, "\"SECOND_THING\"");
        let back: Sample = serde_json::from_str("\"second_thing\"").unwrap();
        assert_eq!(back, Sample::SecondThing);
    }
}

//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! Every enumeration stored in the database is declared with
//! [`string_enum!`], which fixes its wire and column representation
//! (`SCREAMING_SNAKE_CASE` strings) in one place and gives it a localized
//! [`EnumInfo`] for API responses.

use serde::Serialize;

use crate::shared::i18n;

/// A stored enum value together with its localized label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumInfo {
    pub value: &'static str,
    pub label: String,
}

impl EnumInfo {
    /// Build the info for `type_name`/`value`, labelled from the catalog key
    /// `enum.{type_name}.{value}` and falling back to the raw value.
    pub fn new(type_name: &str, value: &'static str) -> Self {
        let key = format!("enum.{}.{}", type_name, value);
        let label = i18n::resolve(&key, i18n::current_locale());
        Self {
            value,
            label: if label == key { value.to_string() } else { label },
        }
    }
}

/// Declare a string-backed enum with serde, display, parsing and column
/// decoding.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Decode a column value; a mismatch means the schema and code disagree.
            pub fn from_db(value: &str) -> Result<Self, $crate::shared::error::AppError> {
                Self::parse(value).ok_or_else(|| {
                    $crate::shared::error::AppError::Internal(format!(
                        "unexpected {} value in database: {}",
                        stringify!($name),
                        value
                    ))
                })
            }

            pub fn info(&self) -> $crate::domain::value_objects::EnumInfo {
                $crate::domain::value_objects::EnumInfo::new(stringify!($name), self.as_str())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

mod common;

pub use common::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_enum_roundtrip_through_column_value() {
        for visibility in Visibility::ALL {
            assert_eq!(Visibility::from_db(visibility.as_str()).unwrap(), *visibility);
        }
        assert!(Visibility::from_db("HIDDEN").is_err());
    }

    #[test]
    fn test_string_enum_serde_uses_column_value() {
        let json = serde_json::to_string(&RequestToJoinStatus::Disapproved).unwrap();
        assert_eq!(json, "\"DISAPPROVED\"");
        let parsed: ParentType = serde_json::from_str("\"CHAT_SPACE\"").unwrap();
        assert_eq!(parsed, ParentType::ChatSpace);
    }

    #[test]
    fn test_enum_info_label() {
        let info = Visibility::Private.info();
        assert_eq!(info.value, "PRIVATE");
        assert_eq!(info.label, "Private");
    }
}

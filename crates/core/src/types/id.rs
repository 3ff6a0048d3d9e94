//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Deserialize` accepting both JSON strings and integers (the upstream
///   catalog is not consistent about the type of its identifiers)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `is_blank()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use mobile_shop_core::define_id;
/// define_id!(PhoneId);
/// define_id!(BrandId);
///
/// let phone_id = PhoneId::new("APL-IP15");
/// let brand_id = BrandId::new("APL-IP15");
///
/// // These are different types, so this won't compile:
/// // let _: PhoneId = brand_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the ID is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_id_string(deserializer).map(Self)
            }
        }
    };
}

// Define standard entity IDs
define_id!(PhoneId);

/// Deserialize an identifier that may be encoded as a JSON string or integer.
///
/// Used by `define_id!`; not intended to be called directly.
///
/// # Errors
///
/// Returns the deserializer's error for anything other than a string or integer.
#[doc(hidden)]
pub fn deserialize_id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IdVisitor)
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_id_from_string() {
        let id: PhoneId = serde_json::from_str("\"SMG-S24U\"").unwrap();
        assert_eq!(id.as_str(), "SMG-S24U");
        assert_eq!(id.to_string(), "SMG-S24U");
    }

    #[test]
    fn test_phone_id_from_integer() {
        let id: PhoneId = serde_json::from_str("42").unwrap();
        assert_eq!(id, PhoneId::new("42"));
    }

    #[test]
    fn test_phone_id_rejects_objects() {
        let result: Result<PhoneId, _> = serde_json::from_str("{\"id\":1}");
        assert!(result.is_err());
    }

    #[test]
    fn test_phone_id_serializes_transparently() {
        let json = serde_json::to_string(&PhoneId::new("1")).unwrap();
        assert_eq!(json, "\"1\"");
    }

    #[test]
    fn test_phone_id_blank() {
        assert!(PhoneId::new("").is_blank());
        assert!(PhoneId::new("   \t").is_blank());
        assert!(!PhoneId::new(" 7 ").is_blank());
    }
}

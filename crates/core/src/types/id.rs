//! Opaque, string-backed identifiers.
//!
//! The commerce backend hands out global IDs (base64-encoded `Type:pk` pairs
//! for Saleor, UUIDs for the in-memory backend). The storefront never looks
//! inside them, it only passes them back, so each ID is a newtype over
//! `String` that keeps IDs of different entities from being mixed up.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()` and `into_inner()`
/// - `Display`, `AsRef<str>`, `From<String>` and `From<&str>`
///
/// # Example
///
/// ```rust
/// # use larkspur_core::define_id;
/// define_id!(BasketId);
/// define_id!(CouponId);
///
/// let basket = BasketId::new("QmFza2V0OjE=");
/// assert_eq!(basket.as_str(), "QmFza2V0OjE=");
///
/// // These are different types, so this won't compile:
/// // let _: CouponId = basket;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
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
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(LineId);
define_id!(AttributeId);
define_id!(AttributeValueId);
define_id!(ShippingMethodId);
define_id!(CheckoutToken);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_value() {
        let id = VariantId::new("UHJvZHVjdFZhcmlhbnQ6Mjk=");
        assert_eq!(id.to_string(), "UHJvZHVjdFZhcmlhbnQ6Mjk=");
    }

    #[test]
    fn test_serde_transparent() {
        let id = LineId::from("line-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"line-1\"");

        let parsed: LineId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}

//! Product identifiers.
//!
//! Product IDs are opaque strings owned by the backing store (usually UUIDs,
//! but nothing here depends on that). The only rule enforced is that an ID
//! is never empty, so a `ProductId` in hand is always safe to send to storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a product ID fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductIdError {
    #[error("product id must not be empty")]
    Empty,
}

/// Opaque, non-empty product identifier.
///
/// # Example
///
/// ```rust
/// # use lantern_core::ProductId;
/// let id = ProductId::parse("9d1c7a52-prod").unwrap();
/// assert_eq!(id.as_str(), "9d1c7a52-prod");
///
/// assert!(ProductId::parse("").is_err());
/// assert!(ProductId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Parse a product ID, rejecting empty or whitespace-only input.
    ///
    /// # Errors
    ///
    /// Returns `ProductIdError::Empty` if the input has no visible characters.
    pub fn parse(value: impl Into<String>) -> Result<Self, ProductIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ProductIdError::Empty);
        }
        Ok(Self(value))
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ::core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Type<::sqlx::Postgres> for ProductId {
    fn type_info() -> ::sqlx::postgres::PgTypeInfo {
        <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
        <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for ProductId {
    fn decode(
        value: ::sqlx::postgres::PgValueRef<'r>,
    ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
        let id = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(id)?)
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Encode<'_, ::sqlx::Postgres> for ProductId {
    fn encode_by_ref(
        &self,
        buf: &mut ::sqlx::postgres::PgArgumentBuffer,
    ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <&str as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0.as_str(), buf)
    }
}

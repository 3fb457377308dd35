//! Type-safe identifiers for threads, boards, and stored images.
//!
//! [`ThreadId`] and [`BoardId`] wrap the 64-bit keys assigned by the
//! store; [`ImageId`] wraps the opaque handle returned by file storage.
//! The newtypes keep the three from being confused with each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a parent thread.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ThreadId(i64);

/// Identifier of a board (a single post), assigned on creation.
///
/// Ids increase in creation order, so sorting by id yields the order in
/// which boards were submitted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct BoardId(i64);

macro_rules! int_id {
    ($name:ident) => {
        impl $name {
            /// Returns the raw integer key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

int_id!(ThreadId);
int_id!(BoardId);

/// Opaque handle of a stored image, e.g. `"3f2a…e1.png"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Wraps an existing handle without validation.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the handle is safe to use as a file name: non-empty,
    /// only ASCII alphanumerics, `-` and `.`, and no `..` sequence.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        !self.0.is_empty()
            && !self.0.contains("..")
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

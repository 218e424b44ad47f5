//! Type-safe identifier wrappers.
//!
//! Identifiers are opaque strings. The persistence backend hands out short
//! hex ids and seeds documents with ids such as `"1"`, so ids loaded from it
//! are kept verbatim. Ids minted in-process use UUID v7 (time-ordered).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Mint a fresh identifier backed by a UUID v7.
            pub fn generate() -> Self {
                Self(format!("{}{}", $prefix, Uuid::now_v7()))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
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

define_id! {
    /// Unique identifier for a scheduled or constant event.
    EventId, ""
}

define_id! {
    /// Unique identifier for a map block (wall, booth, stage, entrance).
    BlockId, "block-"
}

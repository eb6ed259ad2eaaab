//! Branded ID newtypes.
//!
//! Object names and job ids are both plain strings on the wire. Wrapping them
//! keeps a staged object's name from being passed where a speech operation id
//! is expected.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a `#[serde(transparent)]` string newtype with the usual
/// borrowing and conversion impls.
macro_rules! string_id {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(String);

        impl $ty {
            /// Borrow the raw value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the raw value.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $ty {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
                out.write_str(self.as_str())
            }
        }

        impl From<String> for $ty {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl From<&str> for $ty {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }
    };
}

string_id! {
    /// Name of an audio object staged in the blob store.
    ObjectName
}

string_id! {
    /// Opaque long-running operation name returned by the speech API.
    JobId
}

impl ObjectName {
    /// Generate a fresh `<uuid>.<extension>` name.
    ///
    /// The UUID is v7, so names are unique for the life of the bucket and
    /// sort by upload time.
    #[must_use]
    pub fn generate(extension: &str) -> Self {
        Self(format!("{}.{extension}", Uuid::now_v7()))
    }
}

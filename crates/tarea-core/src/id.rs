use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh locally unique identifier.
            #[must_use]
            pub fn generate() -> Self {
                // UUID version 7 keeps locally created records roughly time ordered.
                Self(Uuid::now_v7().to_string())
            }

            /// Borrow the identifier as text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_id!(
    /// Identifier of a task. Local backends use UUID v7 text, the remote service integer keys.
    TaskId
);

opaque_id!(
    /// Identifier of a comment.
    CommentId
);

opaque_id!(
    /// Identifier of a note.
    NoteId
);

use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines a newtype wrapper around an integer id, matching the pattern
/// genuine Anki collections use to keep model/note/card/deck ids from being
/// mixed up at the type level.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for i64 {
            fn from(v: $name) -> Self {
                v.0
            }
        }
    };
}

define_id!(ModelId);
define_id!(NoteId);
define_id!(CardId);
define_id!(DeckId);
define_id!(DeckConfigId);

/// Update Sequence Number. Carried through unmodified — this engine never
/// interprets it, only preserves whatever value the source database held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usn(pub i32);

impl fmt::Display for Usn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

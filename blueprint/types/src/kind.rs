//! The closed set of value kinds.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of a dynamic value or of a declared type.
///
/// The set is closed: every value the library handles and every type a
/// design declares falls into exactly one of these kinds.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use blueprint_types::Kind;
///
/// assert_eq!(Kind::Integer.to_string(), "integer");
/// assert_eq!(Kind::from_str("boolean").unwrap(), Kind::Boolean);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// Returns `true` for the kinds that have no nested structure.
    pub fn is_primitive(self) -> bool {
        !matches!(self, Kind::Array | Kind::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn seven_kinds() {
        assert_eq!(Kind::iter().count(), 7);
    }

    #[test]
    fn only_array_and_object_are_composite() {
        let composite: Vec<_> = Kind::iter().filter(|k| !k.is_primitive()).collect();
        assert_eq!(composite, vec![Kind::Array, Kind::Object]);
    }
}

use indexmap::IndexMap;
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

/// A value produced by the scripting runtime.
///
/// The request engine only knows how to put [`ScriptValue::Integer`] and
/// [`ScriptValue::Text`] on the wire; the other variants exist so that the
/// runtime can hand over whatever it evaluated and the engine can reject it
/// with a precise kind name.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// A signed integer.
    Integer(i64),
    /// A string.
    Text(String),
    /// A boolean.
    Boolean(bool),
    /// A floating point number.
    Float(f64),
    /// An ordered list.
    List(Vec<ScriptValue>),
    /// A named mapping, e.g. the parameter bag bound to a method name.
    Map(IndexMap<String, ScriptValue>),
    /// Absence of value.
    Null,
    /// A runtime object without a data representation (function, block...).
    Opaque {
        /// The runtime type name.
        kind: &'static str,
    },
}

impl ScriptValue {
    /// The runtime kind name, used in contract violation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "int",
            Self::Text(_) => "string",
            Self::Boolean(_) => "bool",
            Self::Float(_) => "float",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "nil",
            Self::Opaque { kind } => *kind,
        }
    }

    /// Returns the mapping when the value is a [`ScriptValue::Map`].
    pub fn as_map(&self) -> Option<&IndexMap<String, ScriptValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the string when the value is a [`ScriptValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Converts a scripting value into its wire string.
///
/// Integers are rendered in decimal and strings are returned unchanged.
///
/// # Panics
///
/// Any other kind is a bug in the calling script or runtime, the call panics
/// with the offending kind name.
///
/// ```rust
/// use pica_core::{ScriptValue, coerce};
///
/// assert_eq!(coerce(&ScriptValue::Integer(42)), "42");
/// assert_eq!(coerce(&ScriptValue::from("alice")), "alice");
/// ```
pub fn coerce(value: &ScriptValue) -> String {
    match value {
        ScriptValue::Integer(int) => int.to_string(),
        ScriptValue::Text(text) => text.clone(),
        other => panic!(
            "unsupported type [{}], only support [int][string]",
            other.kind()
        ),
    }
}

impl Serialize for ScriptValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Integer(int) => serializer.serialize_i64(*int),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Boolean(flag) => serializer.serialize_bool(*flag),
            Self::Float(float) => serializer.serialize_f64(*float),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Null => serializer.serialize_unit(),
            Self::Opaque { kind } => Err(S::Error::custom(format!(
                "unsupported type [{kind}] cannot be serialized"
            ))),
        }
    }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<K, V> FromIterator<(K, V)> for ScriptValue
where
    K: Into<String>,
    V: Into<ScriptValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integer_as_decimal() {
        assert_eq!(coerce(&ScriptValue::Integer(42)), "42");
        assert_eq!(coerce(&ScriptValue::Integer(-7)), "-7");
    }

    #[test]
    fn test_coerce_text_unchanged() {
        assert_eq!(coerce(&ScriptValue::from("x y")), "x y");
        assert_eq!(coerce(&ScriptValue::from("@/tmp/f.txt")), "@/tmp/f.txt");
    }

    #[test]
    #[should_panic(expected = "unsupported type [bool]")]
    fn test_coerce_boolean_panics() {
        let _ = coerce(&ScriptValue::Boolean(true));
    }

    #[test]
    #[should_panic(expected = "unsupported type [map]")]
    fn test_coerce_map_panics() {
        let _ = coerce(&ScriptValue::Map(IndexMap::new()));
    }

    #[test]
    fn test_serialize_nested_values() {
        let value: ScriptValue = [
            ("name", ScriptValue::from("alice")),
            ("tags", ScriptValue::List(vec!["a".into(), 1.into()])),
            ("admin", false.into()),
            ("nothing", ScriptValue::Null),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&value).expect("should serialize");

        insta::assert_snapshot!(json, @r#"{"name":"alice","tags":["a",1],"admin":false,"nothing":null}"#);
    }

    #[test]
    fn test_serialize_opaque_fails() {
        let value = ScriptValue::Opaque { kind: "function" };

        let result = serde_json::to_string(&value);

        assert!(result.is_err());
    }
}

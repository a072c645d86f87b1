//! Positional model values and the compiled output.

use crate::stats::StatisticsModel;
use crate::strings::StringIndex;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// One slot of a model tuple.
///
/// Serialized as plain JSON: `null`, integers (string ids included) and arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValue {
    Null,
    Int(i64),
    Text(StringIndex),
    Tuple(Vec<ModelValue>),
}

impl ModelValue {
    pub fn empty() -> Self {
        ModelValue::Tuple(Vec::new())
    }

    pub fn as_tuple(&self) -> Option<&[ModelValue]> {
        match self {
            ModelValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ModelValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Element `index` of a tuple value.
    pub fn get(&self, index: usize) -> Option<&ModelValue> {
        self.as_tuple().and_then(|items| items.get(index))
    }
}

impl From<StringIndex> for ModelValue {
    fn from(index: StringIndex) -> Self {
        ModelValue::Text(index)
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        ModelValue::Int(value)
    }
}

impl From<bool> for ModelValue {
    fn from(value: bool) -> Self {
        ModelValue::Int(i64::from(value))
    }
}

impl From<Option<i64>> for ModelValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(ModelValue::Null, ModelValue::Int)
    }
}

impl From<Vec<ModelValue>> for ModelValue {
    fn from(items: Vec<ModelValue>) -> Self {
        ModelValue::Tuple(items)
    }
}

impl FromIterator<ModelValue> for ModelValue {
    fn from_iter<I: IntoIterator<Item = ModelValue>>(iter: I) -> Self {
        ModelValue::Tuple(iter.into_iter().collect())
    }
}

impl Serialize for ModelValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ModelValue::Null => serializer.serialize_none(),
            ModelValue::Int(v) => serializer.serialize_i64(*v),
            ModelValue::Text(index) => index.serialize(serializer),
            ModelValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// A subtree extracted for lazy loading, with its own string table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SplitChunk {
    pub model: ModelValue,
    pub strings: Vec<String>,
}

/// Everything the viewer needs for one document.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CompiledModel {
    pub root_model: ModelValue,
    pub root_strings: Vec<String>,
    /// Ordered by finalization; placeholder `n` refers to `split_chunks[n - 1]`.
    pub split_chunks: Vec<SplitChunk>,
    pub statistics: StatisticsModel,
}

impl CompiledModel {
    /// Chunk referenced by a 1-based placeholder.
    pub fn chunk(&self, placeholder: i64) -> Option<&SplitChunk> {
        usize::try_from(placeholder)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.split_chunks.get(i))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_json() {
        let value = ModelValue::Tuple(vec![
            ModelValue::Null,
            ModelValue::Int(-4),
            ModelValue::Text(StringIndex::new(3)),
            ModelValue::empty(),
            ModelValue::from(true),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!([null, -4, 3, [], 1])
        );
    }

    #[test]
    fn test_tuple_accessors() {
        let value: ModelValue = vec![ModelValue::Int(1), ModelValue::Int(2)].into();
        assert_eq!(value.get(1).and_then(ModelValue::as_int), Some(2));
        assert!(value.get(2).is_none());
        assert!(ModelValue::Null.as_tuple().is_none());
    }
}

//! FieldMap: the scalar field values on a node.

use std::collections::HashMap;
use super::Value;

/// A map of field names to values.
pub type FieldMap = HashMap<String, Value>;

/// Build a FieldMap from `(name, value)` pairs.
pub fn fields<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> FieldMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

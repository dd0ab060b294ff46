//! Feature vectors and the per-language column schema.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use super::profile::LanguageProfile;
use crate::error::ExtractError;

pub const FILE: &str = "file";
pub const TYPE: &str = "type";
pub const LOCATION: &str = "location";
pub const LENGTH: &str = "length";
pub const NUM_SIBLINGS: &str = "num_siblings";
pub const NUM_COUSINS: &str = "num_cousins";
pub const NUM_CHILDREN: &str = "num_children";
pub const DEPTH_FROM_DEF: &str = "depth_from_def";
pub const DEPTH_FROM_ROOT: &str = "depth_from_root";
pub const PARENT: &str = "parent";
pub const GRANDPARENT: &str = "grandparent";
pub const CONTEXT: &str = "context";
pub const CONTAINS_LOGGING: &str = "contains_logging";

/// Grandparent of a block whose containing block is the root.
pub const ROOT_SENTINEL: &str = "rootception";

const CONTAINS_PREFIX: &str = "contains_";

static UNSET: FeatureValue = FeatureValue::Missing;

/// How `contains_*` columns are populated across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Counting {
    /// Occurrences accumulate.
    #[default]
    Count,
    /// Counters saturate to 1.
    OneHot,
}

/// A single scalar in a feature vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureValue {
    Text(String),
    Int(i64),
    /// Absent value (no enclosing function for `depth_from_def`).
    Missing,
}

impl FeatureValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FeatureValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(value) => write!(f, "{}", value),
            FeatureValue::Int(value) => write!(f, "{}", value),
            FeatureValue::Missing => Ok(()),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Text(value) => serializer.serialize_str(value),
            FeatureValue::Int(value) => serializer.serialize_i64(*value),
            FeatureValue::Missing => serializer.serialize_none(),
        }
    }
}

/// Which optional columns a schema carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Include the serialized `context` column.
    pub context: bool,
    /// Include the leading `file` column.
    pub debug: bool,
}

/// Ordered column names for one (language, mode) pair.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    counters: Vec<usize>,
}

impl Schema {
    pub fn for_profile(profile: &LanguageProfile, options: SchemaOptions) -> Self {
        let mut columns: Vec<String> = Vec::new();
        if options.debug {
            columns.push(FILE.to_string());
        }
        columns.extend(
            [
                TYPE,
                LOCATION,
                LENGTH,
                NUM_SIBLINGS,
                NUM_COUSINS,
                NUM_CHILDREN,
                DEPTH_FROM_DEF,
                DEPTH_FROM_ROOT,
                PARENT,
                GRANDPARENT,
            ]
            .map(String::from),
        );
        if options.context {
            columns.push(CONTEXT.to_string());
        }
        let first_counter = columns.len();
        columns.extend(
            profile
                .feature_kinds()
                .iter()
                .map(|kind| contains_column(kind)),
        );
        let counters = (first_counter..columns.len()).collect();
        columns.push(CONTAINS_LOGGING.to_string());

        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            columns,
            index,
            counters,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

/// Column name counting occurrences of `kind`.
pub fn contains_column(kind: &str) -> String {
    format!("{}{}", CONTAINS_PREFIX, kind)
}

/// `start_line:start_col;end_line:end_col`, 1-based.
pub fn location(node: Node<'_>) -> String {
    let start = node.start_position();
    let end = node.end_position();
    format!(
        "{}:{};{}:{}",
        start.row + 1,
        start.column + 1,
        end.row + 1,
        end.column + 1
    )
}

/// Lines spanned by `node`, inclusive.
pub fn line_length(node: Node<'_>) -> i64 {
    (node.end_position().row - node.start_position().row + 1) as i64
}

/// Feature values of one block, keyed by the schema's columns.
///
/// Counters start at zero; every other column starts unset and must be
/// assigned before `finalize`.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: Arc<Schema>,
    values: Vec<Option<FeatureValue>>,
}

impl FeatureVector {
    pub fn new(schema: Arc<Schema>) -> Self {
        let mut values = vec![None; schema.len()];
        for &i in &schema.counters {
            values[i] = Some(FeatureValue::Int(0));
        }
        if let Some(i) = schema.position(CONTAINS_LOGGING) {
            values[i] = Some(FeatureValue::Int(0));
        }
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Assign a column. Unknown columns are ignored.
    pub fn set(&mut self, column: &str, value: FeatureValue) {
        match self.schema.position(column) {
            Some(i) => self.values[i] = Some(value),
            None => tracing::trace!(column, "ignoring value for column outside the schema"),
        }
    }

    pub fn set_text(&mut self, column: &str, value: impl Into<String>) {
        self.set(column, FeatureValue::Text(value.into()));
    }

    pub fn set_int(&mut self, column: &str, value: i64) {
        self.set(column, FeatureValue::Int(value));
    }

    /// Add one to an integer column. Returns false if the column is unknown.
    pub fn increment(&mut self, column: &str) -> bool {
        let Some(i) = self.schema.position(column) else {
            return false;
        };
        let next = match &self.values[i] {
            Some(FeatureValue::Int(n)) => n + 1,
            _ => 1,
        };
        self.values[i] = Some(FeatureValue::Int(next));
        true
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.schema
            .position(column)
            .and_then(|i| self.values[i].as_ref())
    }

    /// Integer value of a column, if set.
    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(FeatureValue::as_int)
    }

    /// Text value of a column, if set.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FeatureValue::as_text)
    }

    pub fn contains_logging(&self) -> bool {
        self.int(CONTAINS_LOGGING) == Some(1)
    }

    /// Check that every column is assigned and apply the counting policy.
    pub fn finalize(mut self, counting: Counting) -> Result<FeatureVector, ExtractError> {
        let actual = self.values.iter().filter(|v| v.is_some()).count();
        if actual != self.schema.len() {
            return Err(ExtractError::SchemaMismatch {
                expected: self.schema.len(),
                actual,
            });
        }
        if counting == Counting::OneHot {
            for &i in &self.schema.counters {
                if let Some(FeatureValue::Int(n)) = &mut self.values[i] {
                    *n = (*n).min(1);
                }
            }
        }
        Ok(self)
    }

    /// `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.schema
            .columns
            .iter()
            .zip(&self.values)
            .map(|(name, value)| (name.as_str(), value.as_ref().unwrap_or(&UNSET)))
    }

    pub fn values(&self) -> impl Iterator<Item = &FeatureValue> {
        self.iter().map(|(_, value)| value)
    }
}

impl PartialEq for FeatureVector {
    fn eq(&self, other: &Self) -> bool {
        self.schema.columns == other.schema.columns && self.values == other.values
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::get_analyzer_by_id;

    fn python_schema(options: SchemaOptions) -> Arc<Schema> {
        let analyzer = get_analyzer_by_id("python").unwrap().unwrap();
        Arc::new(Schema::for_profile(analyzer.profile(), options))
    }

    fn filled(schema: &Arc<Schema>) -> FeatureVector {
        let mut v = FeatureVector::new(schema.clone());
        for column in [TYPE, LOCATION, PARENT, GRANDPARENT, CONTEXT, FILE] {
            v.set_text(column, "x");
        }
        for column in [LENGTH, NUM_SIBLINGS, NUM_COUSINS, NUM_CHILDREN, DEPTH_FROM_ROOT] {
            v.set_int(column, 1);
        }
        v.set(DEPTH_FROM_DEF, FeatureValue::Missing);
        v
    }

    #[test]
    fn test_column_order() {
        let schema = python_schema(SchemaOptions {
            context: true,
            debug: true,
        });
        let columns = schema.columns();
        assert_eq!(columns[0], FILE);
        assert_eq!(columns[1], TYPE);
        assert_eq!(columns[10], GRANDPARENT);
        assert_eq!(columns[11], CONTEXT);
        assert_eq!(columns[12], "contains_class_definition");
        assert_eq!(columns.last().map(String::as_str), Some(CONTAINS_LOGGING));
    }

    #[test]
    fn test_optional_columns_absent_by_default() {
        let schema = python_schema(SchemaOptions::default());
        assert_eq!(schema.columns()[0], TYPE);
        assert!(!schema.has_column(CONTEXT));
        assert!(!schema.has_column(FILE));
    }

    #[test]
    fn test_finalize_requires_all_columns() {
        let schema = python_schema(SchemaOptions::default());
        let mut v = FeatureVector::new(schema.clone());
        v.set_text(TYPE, "a");
        let err = v.finalize(Counting::Count).unwrap_err();
        assert!(matches!(err, ExtractError::SchemaMismatch { .. }));

        assert!(filled(&schema).finalize(Counting::Count).is_ok());
    }

    #[test]
    fn test_onehot_saturates_counters() {
        let schema = python_schema(SchemaOptions::default());
        let mut v = filled(&schema);
        v.increment("contains_call");
        v.increment("contains_call");
        v.increment("contains_call");

        let counted = v.clone().finalize(Counting::Count).unwrap();
        assert_eq!(counted.int("contains_call"), Some(3));
        let onehot = v.finalize(Counting::OneHot).unwrap();
        assert_eq!(onehot.int("contains_call"), Some(1));
        assert_eq!(onehot.int(LENGTH), Some(1));
    }

    #[test]
    fn test_increment_unknown_column() {
        let schema = python_schema(SchemaOptions::default());
        let mut v = FeatureVector::new(schema);
        assert!(!v.increment("contains_goto_statement"));
    }

    #[test]
    fn test_serialize_as_ordered_map() {
        let schema = python_schema(SchemaOptions::default());
        let v = filled(&schema).finalize(Counting::Count).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.starts_with(r#"{"type":"x","location":"x","length":1"#));
        assert!(json.contains(r#""depth_from_def":null"#));
        assert!(json.ends_with(r#""contains_logging":0}"#));
    }
}

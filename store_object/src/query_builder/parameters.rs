//! Positional parameter allocation
//!
//! Every value bound into a statement gets a slot named `P<n>`, numbered by
//! first use. Re-binding a key replaces the value and keeps the name, so
//! numbering stays dense no matter how clauses are composed.

use crate::query_builder::column_type::ColumnType;
use serde_json::Value;
use std::collections::HashMap;

/// One bound value in a compiled statement
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    /// Binding key, unique within a statement
    pub column_name: String,
    /// Assigned positional name, e.g. `P1`
    pub parameter_name: String,
    pub value: Value,
    /// Declared type of the target column; `None` binds by JSON shape
    pub column_type: Option<ColumnType>,
}

/// Ordered set of parameter slots for one statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    slots: Vec<QueryParameter>,
    index: HashMap<String, usize>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `column_name` and return the slot's parameter name.
    pub fn set(&mut self, column_name: &str, value: Value) -> &str {
        self.set_typed(column_name, value, None)
    }

    /// Like [`set`](Self::set), recording the target column's type as well.
    /// Re-binding replaces both value and type.
    pub fn set_typed(
        &mut self,
        column_name: &str,
        value: Value,
        column_type: Option<ColumnType>,
    ) -> &str {
        let existing = self.index.get(column_name).copied();
        let position = match existing {
            Some(position) => {
                let slot = &mut self.slots[position];
                slot.value = value;
                slot.column_type = column_type;
                position
            }
            None => {
                let position = self.slots.len();
                self.slots.push(QueryParameter {
                    column_name: column_name.to_string(),
                    parameter_name: format!("P{}", position + 1),
                    value,
                    column_type,
                });
                self.index.insert(column_name.to_string(), position);
                position
            }
        };

        &self.slots[position].parameter_name
    }

    pub fn get(&self, column_name: &str) -> Option<&QueryParameter> {
        self.index
            .get(column_name)
            .map(|&position| &self.slots[position])
    }

    /// Slots in allocation order, which is also positional order
    pub fn iter(&self) -> std::slice::Iter<'_, QueryParameter> {
        self.slots.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter().map(|slot| &slot.value)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<'a> IntoIterator for &'a QueryParameters {
    type Item = &'a QueryParameter;
    type IntoIter = std::slice::Iter<'a, QueryParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_follow_first_use() {
        let mut parameters = QueryParameters::new();

        assert_eq!(parameters.set("Start", json!("2024-01-01")), "P1");
        assert_eq!(parameters.set("End", json!("2024-02-01")), "P2");
        assert_eq!(parameters.set("Status", json!(1)), "P3");
        assert_eq!(parameters.len(), 3);

        let names: Vec<_> = parameters.iter().map(|p| p.parameter_name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_rebinding_keeps_name_and_replaces_value() {
        let mut parameters = QueryParameters::new();
        parameters.set("Id", json!(1));
        parameters.set("Message", json!("first"));

        for value in [json!(2), json!(3), json!(4)] {
            assert_eq!(parameters.set("Id", value), "P1");
        }

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters.get("Id").unwrap().value, json!(4));
        assert_eq!(parameters.set("Other", json!(null)), "P3");
    }

    #[test]
    fn test_rebinding_replaces_type() {
        let mut parameters = QueryParameters::new();
        parameters.set_typed("CreatedOn", json!("2024-05-01T00:00:00Z"), Some(ColumnType::Timestamp));
        assert_eq!(parameters.set("CreatedOn", json!("yesterday")), "P1");

        let slot = parameters.get("CreatedOn").unwrap();
        assert_eq!(slot.column_type, None);
        assert_eq!(slot.value, json!("yesterday"));
    }

    #[test]
    fn test_iterates_in_reverse_positional_order() {
        let mut parameters = QueryParameters::new();
        parameters.set("A", json!(1));
        parameters.set("B", json!(2));

        let reversed: Vec<_> = parameters
            .iter()
            .enumerate()
            .rev()
            .map(|(position, slot)| (position, slot.parameter_name.as_str()))
            .collect();
        assert_eq!(reversed, vec![(1, "P2"), (0, "P1")]);
    }

    #[test]
    fn test_empty_parameters() {
        let parameters = QueryParameters::new();
        assert!(parameters.is_empty());
        assert!(parameters.get("anything").is_none());
        assert_eq!(parameters.values().count(), 0);
    }
}

use std::collections::HashMap;

use awesome_error::Result;

use crate::{FromValue, Value};

/// One result row, keyed by column name
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row {
    pub(crate) values: HashMap<String, Value>,
}

impl Row {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get<T: FromValue>(&self, column: &str) -> Result<<T as FromValue>::Output> {
        if let Some(v) = self.values.get(column) {
            Ok(T::from_value(v)?)
        } else {
            Err(awesome_error::out_of_range!(
                "column `{}` not in row, columns: {:?}",
                column,
                self.values.keys().collect::<Vec<_>>()
            ))
        }
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn take(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

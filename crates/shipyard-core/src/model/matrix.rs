//! Build matrices.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::merge::Merge;

/// A build matrix, as explicit rows or as variables to combine.
///
/// Rows win when both are set. Merging keeps the first non-empty matrix
/// whole rather than mixing rows from different layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Matrix {
    /// Variables whose values are combined into rows.
    pub vars: IndexMap<String, Vec<String>>,
    /// Explicit rows.
    pub rows: Vec<IndexMap<String, String>>,
}

impl Merge for Matrix {
    fn merge(&mut self, other: Self) {
        if self.is_empty() {
            *self = other;
        }
    }
}

impl Matrix {
    /// True when neither rows nor vars are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.rows.is_empty()
    }

    /// Rows in declared order: explicit rows, else the cartesian product
    /// of `vars` with the first variable varying slowest.
    pub fn expand(&self) -> Vec<IndexMap<String, String>> {
        if !self.rows.is_empty() {
            return self.rows.clone();
        }
        if self.vars.is_empty() {
            return Vec::new();
        }
        self.vars.iter().fold(vec![IndexMap::new()], |rows, (name, values)| {
            rows.iter()
                .flat_map(|row| {
                    values.iter().map(move |value| {
                        let mut next = row.clone();
                        next.insert(name.clone(), value.clone());
                        next
                    })
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vars_expand_in_declared_order() {
        let mut matrix = Matrix::default();
        matrix.vars.insert("os".into(), vec!["linux".into(), "osx".into()]);
        matrix.vars.insert("arch".into(), vec!["x86_64".into(), "aarch64".into()]);

        let rows = matrix.expand();
        let pairs: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r["os"].clone(), r["arch"].clone()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("linux".to_string(), "x86_64".to_string()),
                ("linux".to_string(), "aarch64".to_string()),
                ("osx".to_string(), "x86_64".to_string()),
                ("osx".to_string(), "aarch64".to_string()),
            ]
        );
    }

    #[test]
    fn explicit_rows_win() {
        let mut matrix = Matrix::default();
        matrix.vars.insert("os".into(), vec!["linux".into()]);
        matrix.rows.push([("platform".to_string(), "osx".to_string())].into_iter().collect());
        assert_eq!(matrix.expand().len(), 1);
        assert_eq!(matrix.expand()[0]["platform"], "osx");
    }

    #[test]
    fn empty_matrix_has_no_rows() {
        assert!(Matrix::default().expand().is_empty());
    }
}

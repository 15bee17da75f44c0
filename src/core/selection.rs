// ICT Parser - core/selection.rs
//
// Column selection: which discovered tests go into the primary export.
// Backs both the GUI's Available/Selected lists and the CLI's --columns.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::util::constants;
use std::collections::BTreeSet;

/// Split of the discovered tests into "available" and "selected".
///
/// Both views are always sorted; a test is in exactly one of them. Names
/// that were not discovered are ignored by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    tests: BTreeSet<String>,
    selected: BTreeSet<String>,
}

impl ColumnSelection {
    /// Start with nothing selected.
    pub fn new<I, S>(tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tests: tests.into_iter().map(Into::into).collect(),
            selected: BTreeSet::new(),
        }
    }

    /// Select tests by exact name or glob pattern (e.g. `U5_*`).
    ///
    /// Returns the selection and the patterns that matched nothing. An
    /// invalid glob is treated as a literal name.
    pub fn from_patterns<I, S>(tests: I, patterns: &[String]) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new(tests);
        let mut unmatched = Vec::new();

        for pattern in patterns {
            let hits: Vec<String> = match glob::Pattern::new(pattern) {
                Ok(glob) => selection
                    .tests
                    .iter()
                    .filter(|t| glob.matches(t))
                    .cloned()
                    .collect(),
                Err(e) => {
                    tracing::debug!(pattern = %pattern, error = %e, "Not a glob, matching literally");
                    selection
                        .tests
                        .iter()
                        .filter(|t| *t == pattern)
                        .cloned()
                        .collect()
                }
            };
            if hits.is_empty() {
                unmatched.push(pattern.clone());
            }
            selection.selected.extend(hits);
        }

        (selection, unmatched)
    }

    /// Every discovered test, sorted.
    pub fn tests(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(String::as_str)
    }

    /// Unselected tests whose name contains `search` (case-insensitive).
    pub fn available(&self, search: &str) -> Vec<&str> {
        let needle = search.to_lowercase();
        self.tests
            .iter()
            .filter(|t| !self.selected.contains(*t))
            .filter(|t| matches_search(t, &needle))
            .map(String::as_str)
            .collect()
    }

    /// Selected tests whose name contains `search` (case-insensitive).
    pub fn selected(&self, search: &str) -> Vec<&str> {
        let needle = search.to_lowercase();
        self.selected
            .iter()
            .filter(|t| matches_search(t, &needle))
            .map(String::as_str)
            .collect()
    }

    /// Move the named tests to the selected side.
    pub fn select<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            if let Some(test) = self.tests.get(name.as_ref()) {
                self.selected.insert(test.clone());
            }
        }
    }

    /// Move the named tests back to the available side.
    pub fn deselect<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.selected.remove(name.as_ref());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.tests.clone();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// True when no test is selected (the export would hold identities only).
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Export schema: identity columns, then the selected tests sorted.
    pub fn export_columns(&self) -> Vec<String> {
        constants::IDENTITY_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.selected.iter().cloned())
            .collect()
    }
}

fn matches_search(name: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || name.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ColumnSelection {
        ColumnSelection::new(["U5_VCC", "R101", "U5_GND", "TEMP"])
    }

    #[test]
    fn test_starts_with_everything_available() {
        let sel = sample();
        assert!(sel.is_empty());
        assert_eq!(sel.available(""), vec!["R101", "TEMP", "U5_GND", "U5_VCC"]);
        assert!(sel.selected("").is_empty());
        assert_eq!(sel.export_columns(), vec!["Tester", "Serial"]);
    }

    #[test]
    fn test_select_moves_between_sides() {
        let mut sel = sample();
        sel.select(["U5_VCC", "R101", "R101", "NOPE"]);
        assert_eq!(sel.selected(""), vec!["R101", "U5_VCC"]);
        assert_eq!(sel.available(""), vec!["TEMP", "U5_GND"]);
        assert_eq!(sel.selected_count(), 2);
        assert_eq!(
            sel.export_columns(),
            vec!["Tester", "Serial", "R101", "U5_VCC"]
        );

        sel.deselect(["R101"]);
        assert_eq!(sel.selected(""), vec!["U5_VCC"]);
        assert!(!sel.is_selected("R101"));
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut sel = sample();
        sel.select_all();
        assert!(sel.available("").is_empty());
        assert_eq!(sel.selected_count(), 4);
        sel.deselect_all();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut sel = sample();
        assert_eq!(sel.available("u5"), vec!["U5_GND", "U5_VCC"]);
        sel.select(["U5_GND", "TEMP"]);
        assert_eq!(sel.selected("gnd"), vec!["U5_GND"]);
        assert_eq!(sel.available("u5"), vec!["U5_VCC"]);
    }

    #[test]
    fn test_from_patterns() {
        let patterns = vec!["U5_*".to_string(), "TEMP".to_string(), "X*".to_string()];
        let (sel, unmatched) = ColumnSelection::from_patterns(
            ["U5_VCC", "R101", "U5_GND", "TEMP"],
            &patterns,
        );
        assert_eq!(sel.selected(""), vec!["TEMP", "U5_GND", "U5_VCC"]);
        assert_eq!(unmatched, vec!["X*"]);
    }

    #[test]
    fn test_invalid_glob_matches_literally() {
        let patterns = vec!["A[".to_string()];
        let (sel, unmatched) = ColumnSelection::from_patterns(["A[", "B"], &patterns);
        assert_eq!(sel.selected(""), vec!["A["]);
        assert!(unmatched.is_empty());
    }
}

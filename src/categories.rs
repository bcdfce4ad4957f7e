//! Category selection for the dashboard's multi-select.

use crate::schema::ActivityRecord;
use std::collections::{BTreeSet, HashSet};
use url::form_urlencoded;

/// Distinct categories across all activities, sorted for a stable option order.
pub fn distinct_categories(activities: &[ActivityRecord]) -> Vec<String> {
    activities
        .iter()
        .map(|a| a.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Categories the user picked. `None` means the control was never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection(Option<Vec<String>>);

impl CategorySelection {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn only(categories: Vec<String>) -> Self {
        Self(Some(categories))
    }

    /// Parse the page's query string: one `categories` pair per picked category.
    ///
    /// Values are kept verbatim. A `select` pair marks an explicit choice, so
    /// `?select=1` with no `categories` selects nothing.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut explicit = false;
        let mut picked = Vec::new();
        for (key, value) in form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match &*key {
                "categories" => {
                    explicit = true;
                    picked.push(value.into_owned());
                }
                "select" => explicit = true,
                _ => {}
            }
        }

        if explicit {
            Self::only(picked)
        } else {
            Self::all()
        }
    }

    /// Resolve against the available categories; the default is all of them.
    pub fn resolve(&self, available: &[String]) -> HashSet<String> {
        match &self.0 {
            None => available.iter().cloned().collect(),
            Some(picked) => picked.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(category: &str) -> ActivityRecord {
        ActivityRecord {
            id: format!("a_{}", category),
            label: "a".to_string(),
            parent: "Jan".to_string(),
            value: 1.0,
            description: String::new(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_distinct_categories_sorted() {
        let activities = vec![activity("Y"), activity("X"), activity("Y")];
        assert_eq!(distinct_categories(&activities), vec!["X", "Y"]);
    }

    #[test]
    fn test_default_selects_all() {
        let available = vec!["X".to_string(), "Y".to_string()];
        let selected = CategorySelection::from_query(None).resolve(&available);
        assert_eq!(selected.len(), 2);
        assert!(selected.contains("X") && selected.contains("Y"));
    }

    #[test]
    fn test_empty_query_selects_all() {
        let available = vec!["X".to_string()];
        assert_eq!(CategorySelection::from_query(Some("")).resolve(&available).len(), 1);
    }

    #[test]
    fn test_select_marker_alone_selects_nothing() {
        let available = vec!["X".to_string()];
        assert!(CategorySelection::from_query(Some("select=1")).resolve(&available).is_empty());
    }

    #[test]
    fn test_query_round_trips_awkward_categories() {
        let available = vec![
            "Event, extern".to_string(),
            " Intern ".to_string(),
            "Mässa & möte".to_string(),
            String::new(),
        ];
        let picked = &available[..3];

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("select", "1");
        for category in picked {
            serializer.append_pair("categories", category);
        }
        let query = serializer.finish();

        let selected = CategorySelection::from_query(Some(&query)).resolve(&available);
        let expected: HashSet<String> = picked.iter().cloned().collect();
        assert_eq!(selected, expected);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let selected = CategorySelection::from_query(Some("categories=X&theme=dark")).resolve(&[]);
        assert_eq!(selected.len(), 1);
        assert!(selected.contains("X"));
    }
}

//! User-adjustable search constraints.

use serde::{Deserialize, Serialize};

/// Search constraints set per session and read by the refine stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Minimum acceptable product rating (e.g. 4.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f32>,

    /// Preferred brand, if the user has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_brand: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.min_rating.is_none() && self.preferred_brand.is_none()
    }

    /// Render the active constraints as prompt text. Empty filters render
    /// to an empty string so the refine prompt stays clean.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(rating) = self.min_rating {
            parts.push(format!("minimum rating {rating:.1} stars"));
        }
        if let Some(ref brand) = self.preferred_brand {
            parts.push(format!("preferred brand {brand}"));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_describe_to_empty_string() {
        assert!(SearchFilters::default().describe().is_empty());
        assert!(SearchFilters::default().is_empty());
    }

    #[test]
    fn describe_includes_both_constraints() {
        let filters = SearchFilters {
            min_rating: Some(4.0),
            preferred_brand: Some("Sony".into()),
        };
        let text = filters.describe();
        assert!(text.contains("4.0"));
        assert!(text.contains("Sony"));
    }

    #[test]
    fn filters_deserialize_with_missing_fields() {
        let filters: SearchFilters = serde_json::from_str("{}").unwrap();
        assert!(filters.is_empty());

        let filters: SearchFilters = serde_json::from_str(r#"{"min_rating": 3.5}"#).unwrap();
        assert_eq!(filters.min_rating, Some(3.5));
        assert!(filters.preferred_brand.is_none());
    }
}

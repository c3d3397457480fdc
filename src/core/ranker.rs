use serde::{Deserialize, Serialize};

use crate::models::{Recommendation, RecommendationResponse};

/// Display order for recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "desc", alias = "descending")]
    Descending,
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Descending => SortOrder::Ascending,
            SortOrder::Ascending => SortOrder::Descending,
        }
    }
}

/// Return a copy of `response` with recommendations ordered by match score.
///
/// The input is left untouched. Equal scores keep their relative order.
pub fn rank(response: &RecommendationResponse, order: SortOrder) -> RecommendationResponse {
    let mut ranked = response.clone();
    sort_recommendations(&mut ranked.recommendations, order);
    ranked
}

pub fn sort_recommendations(recommendations: &mut [Recommendation], order: SortOrder) {
    match order {
        SortOrder::Descending => {
            recommendations.sort_by(|a, b| b.match_score.total_cmp(&a.match_score))
        }
        SortOrder::Ascending => {
            recommendations.sort_by(|a, b| a.match_score.total_cmp(&b.match_score))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, score: f64) -> Recommendation {
        Recommendation {
            property_id: id.to_string(),
            match_score: score,
            why_it_matches: String::new(),
            key_selling_points: vec![],
            suggested_pitch: String::new(),
        }
    }

    fn response() -> RecommendationResponse {
        RecommendationResponse {
            summary: "three candidates".to_string(),
            recommendations: vec![rec("a", 72.0), rec("b", 95.0), rec("c", 72.0), rec("d", 40.0)],
        }
    }

    fn ids(response: &RecommendationResponse) -> Vec<&str> {
        response
            .recommendations
            .iter()
            .map(|r| r.property_id.as_str())
            .collect()
    }

    #[test]
    fn test_descending_keeps_ties_in_input_order() {
        let ranked = rank(&response(), SortOrder::Descending);
        assert_eq!(ids(&ranked), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_ascending() {
        let ranked = rank(&response(), SortOrder::Ascending);
        assert_eq!(ids(&ranked), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_original_is_not_mutated() {
        let original = response();
        let ranked = rank(&original, SortOrder::Ascending);
        assert_eq!(ids(&original), vec!["a", "b", "c", "d"]);
        assert_eq!(ranked.summary, original.summary);
    }

    #[test]
    fn test_retoggle_restores_descending_order() {
        let first = rank(&response(), SortOrder::Descending);
        let order = SortOrder::Descending.toggled();
        let second = rank(&first, order);
        let third = rank(&second, order.toggled());
        assert_eq!(ids(&third), ids(&first));
    }

    #[test]
    fn test_sort_order_serde() {
        assert_eq!(serde_json::to_string(&SortOrder::Ascending).unwrap(), "\"asc\"");
        let parsed: SortOrder = serde_json::from_str("\"descending\"").unwrap();
        assert_eq!(parsed, SortOrder::Descending);
    }
}

use serde::Serialize;

pub fn to_json<T: Serialize + ?Sized>(view: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::{RankListing, RankRow};
    use crate::types::scoring::DimensionScore;
    use std::collections::BTreeMap;

    #[test]
    fn rank_listing_json_contains_rounded_scores() {
        let listing = RankListing {
            lens: "venture_upside".to_string(),
            top_n: 5,
            eligible: 1,
            rows: vec![RankRow {
                rank: 1,
                initiative_id: 3,
                name: "Alpha".to_string(),
                university: "TUM".to_string(),
                score: 3.1235,
                confidence: 0.42,
                shown: BTreeMap::from([
                    ("tech_depth".to_string(), Some(4.0)),
                    ("maturity".to_string(), None),
                ]),
            }],
        };

        let rendered = to_json(&listing).expect("json should serialize");
        assert!(rendered.contains("\"score\": 3.1235"));
        assert!(rendered.contains("\"maturity\": null"));
    }

    #[test]
    fn exported_dimension_score_parses_back_exactly() {
        let json = r#"{
            "dimension": "market_dd",
            "policy": "floor_with_penalty",
            "computed_score": 2.0999999999999996,
            "seed_rating": null,
            "score": 2.0999999999999996,
            "confidence": 0.17400000000000002,
            "contributions": []
        }"#;
        let parsed: DimensionScore = serde_json::from_str(json).expect("parse");
        let rendered = to_json(&parsed).expect("serialize");
        let reparsed: DimensionScore = serde_json::from_str(&rendered).expect("reparse");
        assert_eq!(parsed, reparsed);
        assert_eq!(reparsed.score, 2.0999999999999996);
    }
}

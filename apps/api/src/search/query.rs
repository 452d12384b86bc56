//! Query and mapping construction for the `videos` index.

use serde_json::{json, Value};

pub const VIDEO_INDEX: &str = "videos";

/// Builds the weighted fuzzy multi-field query for free-text video search.
///
/// Title carries the highest boost, then description/tags/skills; category
/// and the full transcript are searched unboosted. `fuzziness: AUTO` lets
/// minor misspellings still match. Results are relevance-ordered.
pub fn video_search_query(query: &str, page: i64, per_page: i64) -> Value {
    json!({
        "from": (page - 1) * per_page,
        "size": per_page,
        "query": {
            "multi_match": {
                "query": query,
                "fields": [
                    "title^3",
                    "description^2",
                    "tags^2",
                    "skills^2",
                    "category",
                    "transcript"
                ],
                "type": "most_fields",
                "fuzziness": "AUTO"
            }
        },
        "sort": ["_score"]
    })
}

/// Field mapping for the `videos` index.
pub fn video_index_mapping() -> Value {
    json!({
        "properties": {
            "title":            { "type": "text", "analyzer": "standard" },
            "description":      { "type": "text", "analyzer": "standard" },
            "url":              { "type": "keyword" },
            "duration":         { "type": "float" },
            "category":         { "type": "keyword" },
            "difficulty_level": { "type": "keyword" },
            "tags":             { "type": "keyword" },
            "skills":           { "type": "keyword" },
            "transcript":       { "type": "text", "analyzer": "standard" },
            "created_at":       { "type": "date" },
            "updated_at":       { "type": "date" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_field_boosts() {
        let q = video_search_query("rust ownership", 1, 10);
        let fields = q["query"]["multi_match"]["fields"].as_array().unwrap();
        let fields: Vec<&str> = fields.iter().map(|f| f.as_str().unwrap()).collect();
        assert_eq!(
            fields,
            vec![
                "title^3",
                "description^2",
                "tags^2",
                "skills^2",
                "category",
                "transcript"
            ]
        );
    }

    #[test]
    fn test_query_is_fuzzy_and_relevance_sorted() {
        let q = video_search_query("rust", 1, 10);
        assert_eq!(q["query"]["multi_match"]["fuzziness"], "AUTO");
        assert_eq!(q["query"]["multi_match"]["type"], "most_fields");
        assert_eq!(q["sort"][0], "_score");
    }

    #[test]
    fn test_query_pagination_offset() {
        let q = video_search_query("rust", 3, 10);
        assert_eq!(q["from"], 20);
        assert_eq!(q["size"], 10);
    }

    #[test]
    fn test_mapping_keeps_transcript_searchable() {
        let m = video_index_mapping();
        assert_eq!(m["properties"]["transcript"]["type"], "text");
        assert_eq!(m["properties"]["skills"]["type"], "keyword");
    }
}

//! Translation of a [`Coordinate`] into Solr search parameters.

use crate::maven::coordinate::Coordinate;

/// Parameters for one "newest GAV record" search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Solr query, `g:"<group>" AND a:"<artifact>"`.
    pub q: String,
    /// Result core; always `gav` so each document is one release.
    pub core: &'static str,
    /// Number of documents requested.
    pub rows: u32,
    /// Response writer; always `json`.
    pub wt: &'static str,
    /// Sort order, newest first.
    pub sort: &'static str,
}

impl SearchQuery {
    /// Builds the query for the newest release of `coordinate`.
    ///
    /// Quote characters inside the group or artifact id are not escaped and
    /// will produce a malformed Solr query.
    #[must_use]
    pub fn for_coordinate(coordinate: &Coordinate) -> Self {
        Self {
            q: format!(
                "g:\"{}\" AND a:\"{}\"",
                coordinate.group_id, coordinate.artifact_id
            ),
            core: "gav",
            rows: 1,
            wt: "json",
            sort: "timestamp desc",
        }
    }

    /// Returns the parameters in request order.
    #[must_use]
    pub fn params(&self) -> [(&'static str, String); 5] {
        [
            ("q", self.q.clone()),
            ("core", self.core.to_string()),
            ("rows", self.rows.to_string()),
            ("wt", self.wt.to_string()),
            ("sort", self.sort.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(group: &str, artifact: &str) -> Coordinate {
        Coordinate {
            group_id: group.to_string(),
            artifact_id: artifact.to_string(),
        }
    }

    #[test]
    fn builds_exact_match_query() {
        let query = SearchQuery::for_coordinate(&coord("org.springframework", "spring-core"));
        assert_eq!(query.q, r#"g:"org.springframework" AND a:"spring-core""#);
        assert_eq!(query.core, "gav");
        assert_eq!(query.rows, 1);
        assert_eq!(query.wt, "json");
        assert_eq!(query.sort, "timestamp desc");
    }

    #[test]
    fn params_are_ordered_and_complete() {
        let query = SearchQuery::for_coordinate(&coord("g", "a"));
        let names: Vec<_> = query.params().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, ["q", "core", "rows", "wt", "sort"]);
        assert_eq!(query.params()[2].1, "1");
    }

    #[test]
    fn same_coordinate_same_query() {
        let c = coord("com.google.guava", "guava");
        assert_eq!(SearchQuery::for_coordinate(&c), SearchQuery::for_coordinate(&c));
    }

    #[test]
    fn filters_follow_first_colon_split() {
        let c = Coordinate::parse("a:b:c").unwrap();
        let query = SearchQuery::for_coordinate(&c);
        assert_eq!(query.q, r#"g:"a" AND a:"b:c""#);
    }

    #[test]
    fn quotes_are_passed_through() {
        let query = SearchQuery::for_coordinate(&coord("g\"x", "a"));
        assert_eq!(query.q, r#"g:"g"x" AND a:"a""#);
    }
}

use serde::Serialize;

/// Sort applied when the caller gives none.
pub const DEFAULT_SORT: &str = "createdAt,desc";

/// Query string forwarded to a backend listing endpoint.
///
/// Sort keys keep their order and may repeat; filters are only sent when
/// they carry a non-empty value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    sort: Vec<String>,
    filters: Vec<(&'static str, String)>,
}

impl ListingQuery {
    /// Builds a query from the incoming `sort` parameters, falling back to
    /// [`DEFAULT_SORT`] when there are none.
    #[must_use]
    pub fn sorted_by(sort: &[String]) -> Self {
        let sort = if sort.is_empty() {
            vec![DEFAULT_SORT.to_string()]
        } else {
            sort.to_vec()
        };
        Self {
            sort,
            filters: Vec::new(),
        }
    }

    /// Newest-first listing with no filters.
    #[must_use]
    pub fn newest_first() -> Self {
        Self::sorted_by(&[])
    }

    #[must_use]
    pub fn filter(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.filters.push((key, v.to_string()));
        }
        self
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sort
            .iter()
            .map(|s| ("sort", s.as_str()))
            .chain(self.filters.iter().map(|(k, v)| (*k, v.as_str())))
    }

    pub(crate) fn apply(&self, url: &mut url::Url) {
        if self.pairs().next().is_none() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        for (k, v) in self.pairs() {
            pairs.append_pair(k, v);
        }
    }
}

/// Filters and sorting echoed back to the admin articles table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFilters {
    pub status: Option<String>,
    pub search_term: Option<String>,
}

/// Filters echoed back to the admin users table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilters {
    pub role: Option<String>,
    pub enabled: Option<String>,
    pub search_terms: Option<String>,
}

impl ArticleFilters {
    #[must_use]
    pub fn to_query(&self, sort: &[String]) -> ListingQuery {
        ListingQuery::sorted_by(sort)
            .filter("status", self.status.as_deref())
            .filter("searchTerm", self.search_term.as_deref())
    }
}

impl UserFilters {
    #[must_use]
    pub fn to_query(&self, sort: &[String]) -> ListingQuery {
        // backend only understands the singular form
        ListingQuery::sorted_by(sort)
            .filter("role", self.role.as_deref())
            .filter("enabled", self.enabled.as_deref())
            .filter("searchTerm", self.search_terms.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(q: &ListingQuery) -> Vec<(String, String)> {
        q.pairs().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_default_sort_when_none_given() {
        let q = ListingQuery::sorted_by(&[]);
        assert_eq!(collect(&q), vec![("sort".into(), "createdAt,desc".into())]);
    }

    #[test]
    fn test_explicit_sorts_keep_order() {
        let q = ListingQuery::sorted_by(&["title,asc".into(), "createdAt,desc".into()]);
        assert_eq!(
            collect(&q),
            vec![
                ("sort".into(), "title,asc".into()),
                ("sort".into(), "createdAt,desc".into()),
            ]
        );
    }

    #[test]
    fn test_empty_filters_are_skipped() {
        let filters = UserFilters {
            role: Some("ADMIN".into()),
            enabled: Some(String::new()),
            search_terms: Some("bob".into()),
        };
        let pairs = collect(&filters.to_query(&[]));
        assert!(pairs.contains(&("role".into(), "ADMIN".into())));
        assert!(pairs.contains(&("searchTerm".into(), "bob".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "enabled"));
    }

    #[test]
    fn test_enabled_false_is_forwarded() {
        let filters = UserFilters {
            enabled: Some("false".into()),
            ..UserFilters::default()
        };
        assert!(collect(&filters.to_query(&[])).contains(&("enabled".into(), "false".into())));
    }

    #[test]
    fn test_applies_to_url() {
        let mut url: url::Url = "http://backend.test/admin/articles".parse().unwrap();
        ArticleFilters {
            status: Some("PENDING".into()),
            search_term: None,
        }
        .to_query(&[])
        .apply(&mut url);
        assert_eq!(
            url.as_str(),
            "http://backend.test/admin/articles?sort=createdAt%2Cdesc&status=PENDING"
        );
    }
}

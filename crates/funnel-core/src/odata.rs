//! OData query construction for SharePoint list item requests

use crate::lists::{SalesFunnelList, SearchField};

/// Columns requested from every list
pub const SELECT_FIELDS: [&str; 20] = [
    "Id",
    "Title",
    "Project",
    "Owner",
    "Estimator",
    "BusinessArea",
    "City",
    "County",
    "State",
    "Status",
    "BidDate",
    "AwardDate",
    "EstimatedValue",
    "Segment",
    "PrimeOrSub",
    "LowBidderName",
    "Bid2WinID",
    "Plant",
    "Place",
    "PISStatus",
];

/// Columns matched when searching all fields
pub const ALL_FIELDS_FILTER_COLUMNS: [&str; 10] = [
    "Title",
    "Project",
    "Owner",
    "Estimator",
    "City",
    "Status",
    "Bid2WinID",
    "BusinessArea",
    "Segment",
    "LowBidderName",
];

/// Default `$top` per list
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Sort applied to every list query
pub const ORDER_BY: &str = "Modified desc";

/// Double single quotes so the text can sit inside an OData string literal
pub fn escape_literal(query: &str) -> String {
    query.replace('\'', "''")
}

/// Build the `$filter` expression matching `query` against `field`
pub fn build_filter(query: &str, field: SearchField) -> String {
    let escaped = escape_literal(query);
    let clause = |column: &str| format!("substringof('{}', {})", escaped, column);

    match field {
        SearchField::All => ALL_FIELDS_FILTER_COLUMNS
            .iter()
            .map(|column| clause(column))
            .collect::<Vec<_>>()
            .join(" or "),
        other => clause(other.key()),
    }
}

/// A fully specified items query against one list
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub list: SalesFunnelList,
    pub filter: String,
    pub top: u32,
}

impl ListQuery {
    pub fn new(list: SalesFunnelList, filter: impl Into<String>) -> Self {
        Self {
            list,
            filter: filter.into(),
            top: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the per-list result cap
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = top;
        self
    }

    /// Absolute request URL on `site_url`
    pub fn url(&self, site_url: &str) -> String {
        format!(
            "{}/_api/web/lists/getbytitle('{}')/items?$select={}&$filter={}&$top={}&$orderby={}",
            site_url.trim_end_matches('/'),
            self.list.url_encoded(),
            SELECT_FIELDS.join(","),
            urlencoding::encode(&self.filter),
            self.top,
            urlencoding::encode(ORDER_BY),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal_doubles_quotes() {
        assert_eq!(escape_literal("O'Brien"), "O''Brien");
        assert_eq!(escape_literal("''"), "''''");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn test_all_fields_filter_has_ten_clauses() {
        let filter = build_filter("bridge", SearchField::All);
        let clauses: Vec<_> = filter.split(" or ").collect();
        assert_eq!(clauses.len(), 10);
        assert_eq!(clauses[0], "substringof('bridge', Title)");
        assert_eq!(clauses[9], "substringof('bridge', LowBidderName)");
        assert!(filter.contains("substringof('bridge', Bid2WinID)"));
    }

    #[test]
    fn test_single_field_filter() {
        assert_eq!(
            build_filter("Lee", SearchField::Owner),
            "substringof('Lee', Owner)"
        );
        assert_eq!(
            build_filter("B-1", SearchField::Bid2WinId),
            "substringof('B-1', Bid2WinID)"
        );
    }

    #[test]
    fn test_filter_escapes_quotes() {
        assert_eq!(
            build_filter("O'Brien", SearchField::Estimator),
            "substringof('O''Brien', Estimator)"
        );
    }

    #[test]
    fn test_select_has_id_and_nineteen_columns() {
        assert_eq!(SELECT_FIELDS[0], "Id");
        assert_eq!(SELECT_FIELDS.len(), 20);
    }

    #[test]
    fn test_list_query_url() {
        let query = ListQuery::new(
            SalesFunnelList::Aggregate,
            build_filter("x'y", SearchField::City),
        );
        let url = query.url("https://t.example/sites/F/");

        assert!(url.starts_with(
            "https://t.example/sites/F/_api/web/lists/getbytitle('Aggregate%20Sales%20Funnel')/items?"
        ));
        assert!(url.contains("$select=Id,Title,Project,"));
        assert!(url.contains("$filter=substringof%28%27x%27%27y%27%2C%20City%29"));
        assert!(url.contains("$top=50"));
        assert!(url.ends_with("$orderby=Modified%20desc"));
    }

    #[test]
    fn test_list_query_custom_top() {
        let url = ListQuery::new(SalesFunnelList::Y2022, "f")
            .with_top(10)
            .url("https://t.example");
        assert!(url.contains("$top=10"));
    }
}

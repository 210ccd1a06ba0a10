// src/domain/filters.rs

/// Optional keyword filters forwarded to the upstream API.
///
/// Blank strings count as absent so a form field left empty never
/// narrows a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilters {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub location: Option<String>,
}

impl ListingFilters {
    pub fn new(
        title: Option<String>,
        organization: Option<String>,
        location: Option<String>,
    ) -> Self {
        Self {
            title: non_blank(title),
            organization: non_blank(organization),
            location: non_blank(location),
        }
    }

    /// Query parameters for the filters that are present, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("title_filter", self.title.as_deref()),
            ("organization_filter", self.organization.as_deref()),
            ("location_filter", self.location.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, ServiceError};

/// Uniform result envelope returned for every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(rename = "pageMeta", default, skip_serializing_if = "Option::is_none")]
    pub page_meta: Option<PageMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub kind: ErrorKind,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            page_meta: None,
        }
    }

    pub fn failure(err: &ServiceError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                message: err.public_message(),
                kind: err.kind(),
            }),
            page_meta: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paged(page: Page<T>) -> Self {
        Self {
            success: true,
            data: Some(page.rows),
            error: None,
            page_meta: Some(page.meta),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_rows: u64,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub meta: PageMeta,
}

/// Page window requested by a caller.
///
/// Missing, unparsable or non-positive values fall back to the defaults and the
/// page size is capped at [`Pagination::MAX_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> Self {
        let defaults = Self::default();
        Self {
            page: if page == 0 { defaults.page } else { page },
            limit: if limit == 0 {
                defaults.limit
            } else {
                limit.min(Self::MAX_LIMIT)
            },
        }
    }

    /// Lenient parse of raw query-string values.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let number = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
                .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
                .unwrap_or(0)
        };
        Self::new(number(page), number(limit))
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn meta(&self, total_rows: u64) -> PageMeta {
        let total_pages = total_rows.div_ceil(u64::from(self.limit));
        PageMeta {
            page: self.page,
            per_page: self.limit,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            total_rows,
        }
    }

    pub fn page_of<T>(&self, rows: Vec<T>, total_rows: u64) -> Page<T> {
        Page {
            rows,
            meta: self.meta(total_rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some("3"), Some("25"), 3, 25)]
    #[case(Some("0"), Some("-4"), 1, 10)]
    #[case(Some("abc"), Some("1000"), 1, 100)]
    fn parses_query_values(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let pagination = Pagination::parse(page, limit);
        assert_eq!(pagination, Pagination { page: expected_page, limit: expected_limit });
    }

    #[test]
    fn meta_rounds_total_pages_up() {
        let pagination = Pagination::new(2, 10);
        assert_eq!(pagination.offset(), 10);
        assert_eq!(
            pagination.meta(15),
            PageMeta { page: 2, per_page: 10, total_pages: 2, total_rows: 15 }
        );
        assert_eq!(pagination.meta(0).total_pages, 0);
    }

    #[test]
    fn failure_hides_internal_details() {
        let err = ServiceError::Internal(eyre::eyre!("connection refused on 10.0.0.3"));
        let response = ApiResponse::<()>::failure(&err);
        let body = response.error.unwrap();
        assert_eq!(body.message, "Internal Server Error");
        assert_eq!(body.kind, ErrorKind::InternalError);
    }
}

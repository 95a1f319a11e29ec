use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// One page of a listing. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    #[serde(rename = "current_page")]
    pub number: i64,
    pub page_size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Absent, non-numeric and non-positive values fall back to the defaults
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self {
            number: positive_or(page, DEFAULT_PAGE),
            page_size: positive_or(page_size, DEFAULT_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.page_size)
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// Paging block returned next to a listing
#[derive(Debug, Clone, Serialize)]
pub struct PageMetadata {
    #[serde(flatten)]
    pub page: Page,
    pub total_records: i64,
}

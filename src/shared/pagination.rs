use super::errors::DomainError;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;
/// Largest offset a SQL backend accepts (signed 64-bit).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// `field[,asc|desc]` as received from a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let mut parts = raw.split(',').map(str::trim);
        let field = parts.next().unwrap_or_default();
        if field.is_empty() {
            return Err(DomainError::invalid("sort", "sort field is required"));
        }

        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(DomainError::invalid(
                    "sort",
                    format!("unknown sort direction '{}'", other),
                ))
            }
        };

        if parts.next().is_some() {
            return Err(DomainError::invalid("sort", "expected 'field' or 'field,direction'"));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// One-based page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub sort: Option<SortSpec>,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>, sort: Option<SortSpec>) -> Self {
        let (page, limit) = validate_pagination(page, limit);
        Self { page, limit, sort }
    }

    /// Rows to skip, or `None` when the page lies beyond any addressable row.
    pub fn checked_offset(&self) -> Option<u64> {
        self.page
            .checked_sub(1)?
            .checked_mul(self.limit)
            .filter(|offset| *offset <= MAX_OFFSET)
    }

    /// Saturates at [`MAX_OFFSET`], which is past the end of any store.
    pub fn offset(&self) -> u64 {
        self.checked_offset().unwrap_or(MAX_OFFSET)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// A page of results plus the counts needed to navigate the rest.
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = total.div_ceil(limit.max(1));
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (page, limit)
}

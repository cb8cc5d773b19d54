use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 2000;

/// Sort direction accepted in `sort=property,direction` query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    /// Parses `property` or `property,asc|desc`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut parts = raw.split(',').map(str::trim);
        let property = parts.next().unwrap_or_default();
        if property.is_empty() {
            return Err("Sort property must not be empty".to_string());
        }
        let direction = match parts.next() {
            None | Some("") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => return Err(format!("Invalid sort direction '{d}'")),
        };
        if parts.next().is_some() {
            return Err(format!("Invalid sort expression '{raw}'"));
        }
        Ok(Sort {
            property: property.to_string(),
            direction,
        })
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Option<Sort>,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl PageRequest {
    /// Builds a request from raw query values. A size below 1 falls back to the
    /// default and sizes above `MAX_PAGE_SIZE` are capped. The row offset
    /// `page * size` must fit in an `i64`.
    pub fn from_params(
        page: Option<u64>,
        size: Option<u64>,
        sort: Option<&str>,
    ) -> Result<Self, String> {
        let size = match size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(s) => s.min(MAX_PAGE_SIZE),
        };
        let page = page.unwrap_or(0);
        if page.checked_mul(size).is_none_or(|offset| offset > i64::MAX as u64) {
            return Err(format!("Page index {page} is out of range"));
        }
        let sort = sort
            .filter(|s| !s.trim().is_empty())
            .map(Sort::parse)
            .transpose()?;
        Ok(PageRequest {
            page,
            size,
            sort,
        })
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
    pub number_of_elements: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64, total_pages: u64) -> Self {
        let number_of_elements = content.len() as u64;
        Page {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: request.page,
            size: request.size,
            number_of_elements,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(
            Sort::parse("name").unwrap(),
            Sort { property: "name".to_string(), direction: Direction::Asc }
        );
        assert_eq!(
            Sort::parse("name,DESC").unwrap(),
            Sort { property: "name".to_string(), direction: Direction::Desc }
        );
        assert!(Sort::parse(",desc").is_err());
        assert!(Sort::parse("name,sideways").is_err());
        assert!(Sort::parse("name,asc,extra").is_err());
    }

    #[test]
    fn test_page_request_size_bounds() {
        let req = PageRequest::from_params(None, Some(0), None).unwrap();
        assert_eq!(req.size, DEFAULT_PAGE_SIZE);
        assert_eq!(req.page, 0);

        let req = PageRequest::from_params(Some(3), Some(50_000), Some("")).unwrap();
        assert_eq!(req.size, MAX_PAGE_SIZE);
        assert_eq!(req.page, 3);
        assert!(req.sort.is_none());
    }

    #[test]
    fn test_page_request_rejects_overflowing_offset() {
        assert!(PageRequest::from_params(Some(u64::MAX), None, None).is_err());
        let limit = i64::MAX as u64 / MAX_PAGE_SIZE;
        assert!(PageRequest::from_params(Some(limit), Some(MAX_PAGE_SIZE), None).is_ok());
        assert!(PageRequest::from_params(Some(limit + 1), Some(MAX_PAGE_SIZE), None).is_err());
    }

    #[test]
    fn test_page_flags() {
        let req = PageRequest::from_params(Some(1), Some(2), None).unwrap();
        let page = Page::new(vec![5], &req, 3, 2);
        assert!(!page.first);
        assert!(page.last);
        assert!(!page.empty);
        assert_eq!(page.number_of_elements, 1);

        let past_end = PageRequest::from_params(Some(9), Some(2), None).unwrap();
        let page: Page<i32> = Page::new(vec![], &past_end, 3, 2);
        assert!(page.empty);
        assert_eq!(page.total_elements, 3);

        let far = PageRequest { page: u64::MAX, ..PageRequest::default() };
        let page: Page<i32> = Page::new(vec![], &far, 3, 1);
        assert!(page.last);
    }
}

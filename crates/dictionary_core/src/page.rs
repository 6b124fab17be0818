//! Paging and sorting shared by the record store and the search index.
//!
//! # Invariants
//! - `page` is zero-based; `size` is always within `1..=MAX_PAGE_SIZE`.
//! - Sort properties reach SQL only through a per-store whitelist.
//! - Every ORDER BY ends with an `id` tiebreaker so pages are stable.

use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `property, direction` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }

    /// Parses one `sort` parameter value: `prop[,prop...][,asc|desc]`.
    ///
    /// A trailing direction applies to every listed property. Empty segments
    /// are skipped.
    pub fn parse_param(value: &str) -> Vec<SortOrder> {
        let mut parts = value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();

        let direction = match parts.last().map(|last| last.to_ascii_lowercase()) {
            Some(last) if last == "desc" => {
                parts.pop();
                Direction::Desc
            }
            Some(last) if last == "asc" => {
                parts.pop();
                Direction::Asc
            }
            _ => Direction::Asc,
        };

        parts
            .into_iter()
            .map(|property| SortOrder {
                property: property.to_string(),
                direction,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("no sortable property `{0}`")]
    UnknownSortProperty(String),
}

/// Requested slice of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl PageRequest {
    /// Builds a request, clamping `size` into the accepted range.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: clamp_size(size),
            sort: Vec::new(),
        }
    }

    /// Builds a request from loosely typed query parameters.
    ///
    /// Missing, negative or non-numeric `page` falls back to 0; missing,
    /// zero or non-numeric `size` falls back to the default size.
    pub fn from_params(page: Option<&str>, size: Option<&str>, sort: &[&str]) -> Self {
        let page = page
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|value| *value > 0)
            .map_or(0, |value| u32::try_from(value).unwrap_or(u32::MAX));
        let size = size
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|value| *value > 0)
            .map_or(DEFAULT_PAGE_SIZE, |value| {
                u32::try_from(value).unwrap_or(MAX_PAGE_SIZE)
            });

        Self {
            page,
            size: clamp_size(size),
            sort: sort
                .iter()
                .flat_map(|value| SortOrder::parse_param(value))
                .collect(),
        }
    }

    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Renders an `ORDER BY` body using `columns` as the property whitelist.
    ///
    /// `columns` maps API property names to qualified SQL columns; `id_column`
    /// is appended as the final tiebreaker.
    pub fn order_by(
        &self,
        columns: &[(&str, &str)],
        id_column: &str,
    ) -> Result<String, PageError> {
        let mut clauses = Vec::with_capacity(self.sort.len() + 1);
        let mut has_id = false;

        for order in &self.sort {
            let column = columns
                .iter()
                .find(|(property, _)| *property == order.property)
                .map(|(_, column)| *column)
                .ok_or_else(|| PageError::UnknownSortProperty(order.property.clone()))?;
            has_id |= column == id_column;
            clauses.push(format!("{column} {}", order.direction.as_sql()));
        }

        if !has_id {
            clauses.push(format!("{id_column} ASC"));
        }

        Ok(clauses.join(", "))
    }
}

fn clamp_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// One page of results plus the total across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

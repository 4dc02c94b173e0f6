//! Pagination over a [`Collection`].
//!
//! [`Paginator`] divides a collection into pages of a fixed size and
//! [`PageToken`] turns the page indicator a client sent (a number or the
//! literal `last`) into a bounds-checked [`Page`].
//!
//! # Examples
//!
//! ```
//! use shapeup_views::pagination::{PageToken, Paginator};
//!
//! let items: Vec<u32> = (1..=25).collect();
//! let paginator = Paginator::new(items, 10);
//! assert_eq!(paginator.num_pages(), 3);
//!
//! let token: PageToken = "last".parse().unwrap();
//! let page = paginator.resolve(token).unwrap();
//! assert_eq!(page.number(), 3);
//! assert_eq!(page.object_list(), &[21, 22, 23, 24, 25]);
//! assert!(page.has_other_pages());
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use shapeup_core::{ShapeupError, ShapeupResult};

use crate::collection::Collection;

/// Errors raised when a page number falls outside the paginator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// The number is below 1.
    LessThanOne,
    /// The number is past the last page.
    NoResults,
}

impl fmt::Display for PaginationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LessThanOne => write!(f, "That page number is less than 1"),
            Self::NoResults => write!(f, "That page contains no results"),
        }
    }
}

impl std::error::Error for PaginationError {}

/// A requested page: an explicit number or the final page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    Number(i64),
    Last,
}

impl Default for PageToken {
    fn default() -> Self {
        Self::Number(1)
    }
}

impl FromStr for PageToken {
    type Err = ShapeupError;

    /// Parses an integer (surrounding whitespace allowed) or `last`.
    ///
    /// Anything else is a [`ShapeupError::NotFound`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<i64>() {
            return Ok(Self::Number(number));
        }
        if trimmed == "last" {
            return Ok(Self::Last);
        }
        Err(ShapeupError::NotFound(
            "Page is not 'last', nor can it be converted to an int.".to_string(),
        ))
    }
}

/// Divides a collection into pages of `per_page` items.
///
/// With `orphans > 0`, a final page holding `orphans` items or fewer is folded
/// into the page before it.
#[derive(Debug, Clone)]
pub struct Paginator<C> {
    object_list: C,
    per_page: usize,
    orphans: usize,
    allow_empty_first_page: bool,
}

impl<C: Collection> Paginator<C> {
    /// Creates a paginator. A `per_page` of zero is treated as one.
    pub fn new(object_list: C, per_page: usize) -> Self {
        Self {
            object_list,
            per_page: per_page.max(1),
            orphans: 0,
            allow_empty_first_page: true,
        }
    }

    #[must_use]
    pub fn orphans(mut self, orphans: usize) -> Self {
        self.orphans = orphans;
        self
    }

    /// Whether an empty collection still has a (blank) first page.
    #[must_use]
    pub fn allow_empty_first_page(mut self, allow: bool) -> Self {
        self.allow_empty_first_page = allow;
        self
    }

    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Total number of items across all pages.
    pub fn count(&self) -> usize {
        self.object_list.count()
    }

    pub fn num_pages(&self) -> usize {
        let count = self.count();
        if count == 0 {
            return usize::from(self.allow_empty_first_page);
        }
        let hits = count.saturating_sub(self.orphans).max(1);
        hits.div_ceil(self.per_page)
    }

    /// 1-based range of valid page numbers.
    pub fn page_range(&self) -> RangeInclusive<usize> {
        1..=self.num_pages()
    }

    /// Checks that `number` names an existing page.
    pub fn validate_number(&self, number: i64) -> Result<usize, PaginationError> {
        let Ok(number) = usize::try_from(number) else {
            return Err(PaginationError::LessThanOne);
        };
        if number < 1 {
            return Err(PaginationError::LessThanOne);
        }
        if number > self.num_pages() && !(number == 1 && self.allow_empty_first_page) {
            return Err(PaginationError::NoResults);
        }
        Ok(number)
    }

    /// Returns the page with the given 1-based number.
    pub fn page(&self, number: i64) -> Result<Page<C::Item>, PaginationError> {
        let number = self.validate_number(number)?;
        let count = self.count();
        let bottom = (number - 1) * self.per_page;
        let mut top = bottom + self.per_page;
        if top + self.orphans >= count {
            top = count;
        }

        Ok(Page {
            object_list: self.object_list.slice(bottom, top),
            number,
            num_pages: self.num_pages(),
            per_page: self.per_page,
        })
    }

    /// Resolves a page token, mapping any failure to a not-found error.
    ///
    /// `last` resolves to [`num_pages`](Self::num_pages).
    pub fn resolve(&self, token: PageToken) -> ShapeupResult<Page<C::Item>> {
        let number = match token {
            PageToken::Number(number) => number,
            PageToken::Last => i64::try_from(self.num_pages()).unwrap_or(i64::MAX),
        };
        tracing::debug!(page = number, num_pages = self.num_pages(), "Resolving page");
        self.page(number)
            .map_err(|e| ShapeupError::NotFound(format!("Invalid page ({number}): {e}")))
    }
}

impl<C: Collection> Serialize for Paginator<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Paginator", 5)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("num_pages", &self.num_pages())?;
        state.serialize_field("per_page", &self.per_page)?;
        state.serialize_field("orphans", &self.orphans)?;
        state.serialize_field("page_range", &self.page_range().collect::<Vec<_>>())?;
        state.end()
    }
}

/// One page of results plus its position among the other pages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_field_names)]
pub struct Page<T> {
    object_list: Vec<T>,
    number: usize,
    num_pages: usize,
    per_page: usize,
}

impl<T> Page<T> {
    pub fn object_list(&self) -> &[T] {
        &self.object_list
    }

    pub fn into_object_list(self) -> Vec<T> {
        self.object_list
    }

    /// This page's 1-based number.
    pub const fn number(&self) -> usize {
        self.number
    }

    pub const fn num_pages(&self) -> usize {
        self.num_pages
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub const fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub const fn next_page_number(&self) -> Option<usize> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    pub const fn previous_page_number(&self) -> Option<usize> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// 1-based index of the first item on this page, or 0 if it is empty.
    pub fn start_index(&self) -> usize {
        if self.object_list.is_empty() {
            return 0;
        }
        (self.number - 1) * self.per_page + 1
    }

    /// 1-based index of the last item on this page, or 0 if it is empty.
    pub fn end_index(&self) -> usize {
        if self.object_list.is_empty() {
            return 0;
        }
        self.start_index() + self.object_list.len() - 1
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 10)?;
        state.serialize_field("object_list", &self.object_list)?;
        state.serialize_field("number", &self.number)?;
        state.serialize_field("num_pages", &self.num_pages)?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("has_previous", &self.has_previous())?;
        state.serialize_field("has_other_pages", &self.has_other_pages())?;
        state.serialize_field("next_page_number", &self.next_page_number())?;
        state.serialize_field("previous_page_number", &self.previous_page_number())?;
        state.serialize_field("start_index", &self.start_index())?;
        state.serialize_field("end_index", &self.end_index())?;
        state.end()
    }
}

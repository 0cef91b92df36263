use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::error::{AppError, AppResult};

/// Rows per listing page.
pub const PER_PAGE: i64 = 10;

/// 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(u32);

impl Page {
    pub const FIRST: Page = Page(1);

    pub fn new(n: u32) -> AppResult<Self> {
        if n == 0 {
            return Err(AppError::validation("page numbers start at 1"));
        }
        Ok(Page(n))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn offset(self) -> i64 {
        (i64::from(self.0) - 1) * PER_PAGE
    }
}

#[derive(Debug, Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    pub page_url: String,
}

/// `{ "<key>": [rows...], "meta": {...} }`
#[derive(Debug)]
pub struct Envelope<T> {
    pub key: &'static str,
    pub items: Vec<T>,
    pub meta: Meta,
}

impl<T> Envelope<T> {
    pub fn page(key: &'static str, items: Vec<T>, page: Page, page_url: String) -> Self {
        Self {
            key,
            items,
            meta: Meta {
                page: Some(page.number()),
                per_page: Some(PER_PAGE),
                page_url,
            },
        }
    }

    pub fn single(key: &'static str, item: T, page_url: String) -> Self {
        Self {
            key,
            items: vec![item],
            meta: Meta {
                page: None,
                per_page: None,
                page_url,
            },
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, &self.items)?;
        map.serialize_entry("meta", &self.meta)?;
        map.end()
    }
}

//! Catalogue search over an already-fetched list of products.
//!
//! A query runs in two phases. [`ProductQuery`] narrows the candidate list with
//! the filter stages; [`ProductQuery::matched`] then freezes the match count and
//! hands over a [`MatchedProducts`], which is the only place ordering and
//! pagination can happen. The count used for pagination UIs therefore always
//! reflects every filter and never the page window.

use crate::errors::{Result, StoreError};
use crate::model::Product;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use std::str::FromStr;

/// Query string bag as sent by the storefront (`?category=..&pageNumber=2`).
/// Empty values are treated as absent.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawQuery {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub category: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub location: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub rating: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub low_price: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub high_price: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub search_value: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub sort_price: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub page_number: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub par_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceOrder {
    LowToHigh,
    HighToLow,
}

impl From<&str> for PriceOrder {
    /// Only `low-to-high` sorts ascending; every other value sorts descending.
    fn from(s: &str) -> Self {
        if s == "low-to-high" {
            PriceOrder::LowToHigh
        } else {
            PriceOrder::HighToLow
        }
    }
}

/// Validated search options. A `None` field disables its stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub category: Option<String>,
    pub location: Option<String>,
    /// Integer star bucket; matches ratings in `[rating, rating + 1)`.
    pub rating: Option<u32>,
    pub low_price: Option<f64>,
    pub high_price: Option<f64>,
    pub search_value: Option<String>,
    pub sort_price: Option<PriceOrder>,
    /// 1-based.
    pub page_number: Option<u32>,
    pub par_page: Option<usize>,
}

fn parse_field<T: FromStr>(field: &str, raw: Option<&str>) -> Result<Option<T>> {
    raw.map(|s| {
        s.trim()
            .parse::<T>()
            .map_err(|_| StoreError::Invalid(format!("{field}: not a number: {s:?}")))
    })
    .transpose()
}

fn finite_price(field: &str, raw: Option<&str>) -> Result<Option<f64>> {
    match parse_field::<f64>(field, raw)? {
        Some(v) if !v.is_finite() => Err(StoreError::Invalid(format!("{field}: must be finite"))),
        other => Ok(other),
    }
}

impl TryFrom<RawQuery> for QuerySpec {
    type Error = StoreError;

    fn try_from(raw: RawQuery) -> Result<Self> {
        let rating = match parse_field::<f64>("rating", raw.rating.as_deref())? {
            Some(r) if !r.is_finite() || r < 0.0 => {
                return Err(StoreError::Invalid("rating: must be a non-negative number".into()))
            }
            Some(r) => Some(r.floor() as u32),
            None => None,
        };
        let page_number = match parse_field::<u32>("pageNumber", raw.page_number.as_deref())? {
            Some(0) => return Err(StoreError::Invalid("pageNumber: must be at least 1".into())),
            other => other,
        };
        let par_page = match parse_field::<usize>("parPage", raw.par_page.as_deref())? {
            Some(0) => return Err(StoreError::Invalid("parPage: must be at least 1".into())),
            other => other,
        };
        Ok(Self {
            category: raw.category,
            location: raw.location,
            rating,
            low_price: finite_price("lowPrice", raw.low_price.as_deref())?,
            high_price: finite_price("highPrice", raw.high_price.as_deref())?,
            search_value: raw.search_value,
            sort_price: raw.sort_price.as_deref().map(PriceOrder::from),
            page_number,
            par_page,
        })
    }
}

impl QuerySpec {
    /// Items dropped before the requested page. Zero when `parPage` is absent.
    pub fn skip_count(&self) -> usize {
        let page = self.page_number.unwrap_or(1).saturating_sub(1) as usize;
        page.saturating_mul(self.par_page.unwrap_or(0))
    }
}

/// Fields the search pipeline reads from a catalogue entry.
pub trait Queryable {
    fn name(&self) -> &str;
    fn category(&self) -> &str;
    fn location(&self) -> &str;
    fn rating(&self) -> f64;
    fn price(&self) -> f64;
}

impl Queryable for Product {
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn location(&self) -> &str {
        &self.location.city
    }
    fn rating(&self) -> f64 {
        self.rating
    }
    fn price(&self) -> f64 {
        self.price
    }
}

/// Filtering phase of a catalogue query.
#[derive(Debug, Clone)]
pub struct ProductQuery<'q, T> {
    items: Vec<T>,
    spec: &'q QuerySpec,
}

impl<'q, T: Queryable> ProductQuery<'q, T> {
    pub fn new(items: Vec<T>, spec: &'q QuerySpec) -> Self {
        Self { items, spec }
    }

    /// Full pipeline: every filter, count, sort, then the requested page.
    pub fn run(items: Vec<T>, spec: &'q QuerySpec) -> ProductPage<T> {
        Self::new(items, spec)
            .filter_all()
            .matched()
            .sort_by_price()
            .skip()
            .limit()
            .into_page()
    }

    fn keep(mut self, pred: impl FnMut(&T) -> bool) -> Self {
        self.items.retain(pred);
        self
    }

    pub fn category(self) -> Self {
        let spec = self.spec;
        match spec.category.as_deref() {
            Some(category) => self.keep(|p| p.category() == category),
            None => self,
        }
    }

    pub fn location(self) -> Self {
        let spec = self.spec;
        match spec.location.as_deref() {
            Some(location) => self.keep(|p| p.location() == location),
            None => self,
        }
    }

    pub fn rating(self) -> Self {
        match self.spec.rating {
            Some(stars) => {
                let floor = f64::from(stars);
                self.keep(|p| floor <= p.rating() && p.rating() < floor + 1.0)
            }
            None => self,
        }
    }

    /// Needs both bounds; a single bound leaves the list untouched.
    pub fn price(self) -> Self {
        match (self.spec.low_price, self.spec.high_price) {
            (Some(low), Some(high)) => self.keep(|p| low <= p.price() && p.price() <= high),
            _ => self,
        }
    }

    pub fn search(self) -> Self {
        let spec = self.spec;
        match spec.search_value.as_deref() {
            Some(needle) => {
                let needle = needle.to_uppercase();
                self.keep(|p| p.name().to_uppercase().contains(&needle))
            }
            None => self,
        }
    }

    pub fn filter_all(self) -> Self {
        self.category().location().rating().price().search()
    }

    pub fn products(&self) -> &[T] {
        &self.items
    }

    pub fn count_products(&self) -> usize {
        self.items.len()
    }

    /// Ends filtering and records the number of matches.
    pub fn matched(self) -> MatchedProducts<'q, T> {
        MatchedProducts {
            total: self.items.len(),
            items: self.items,
            spec: self.spec,
        }
    }
}

/// Ordering and pagination phase; `total` is fixed at the moment filtering ended.
#[derive(Debug, Clone)]
pub struct MatchedProducts<'q, T> {
    items: Vec<T>,
    spec: &'q QuerySpec,
    total: usize,
}

impl<'q, T: Queryable> MatchedProducts<'q, T> {
    pub fn total(&self) -> usize {
        self.total
    }

    /// Stable, so equal prices keep their filtered order.
    pub fn sort_by_price(mut self) -> Self {
        match self.spec.sort_price {
            Some(PriceOrder::LowToHigh) => {
                self.items.sort_by(|a, b| a.price().total_cmp(&b.price()))
            }
            Some(PriceOrder::HighToLow) => {
                self.items.sort_by(|a, b| b.price().total_cmp(&a.price()))
            }
            None => {}
        }
        self
    }

    pub fn skip(mut self) -> Self {
        let n = self.spec.skip_count().min(self.items.len());
        self.items.drain(..n);
        self
    }

    pub fn limit(mut self) -> Self {
        if let Some(n) = self.spec.par_page {
            self.items.truncate(n);
        }
        self
    }

    pub fn products(&self) -> &[T] {
        &self.items
    }

    pub fn count_products(&self) -> usize {
        self.items.len()
    }

    pub fn into_page(self) -> ProductPage<T> {
        ProductPage {
            total: self.total,
            products: self.items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPage<T> {
    #[serde(rename = "totalProduct")]
    pub total: usize,
    pub products: Vec<T>,
}

use serde::{Deserialize, Serialize};

use super::repo::Supplement;
use super::services::{SearchFilter, PRICE_CEILING};

/// `?q=&max_price=&categories=a,b&brands=x,y&min_rating=`
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub max_price: Option<f64>,
    pub categories: Option<String>,
    pub brands: Option<String>,
    pub min_rating: Option<f64>,
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

impl From<SearchQuery> for SearchFilter {
    fn from(q: SearchQuery) -> Self {
        Self {
            text: q.q.map(|t| t.trim().to_string()).unwrap_or_default(),
            max_price: q.max_price.unwrap_or(PRICE_CEILING),
            categories: split_list(q.categories),
            brands: split_list(q.brands),
            min_rating: q.min_rating.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub filtered: bool,
    pub total: usize,
    pub items: Vec<Supplement>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Facets {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
}

// Naver Shopping search response parsing
use crate::model::{Offer, ParserError};
use scraper::Html;
use serde::Deserialize;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<Vec<Offer>, ParserError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    lprice: String,
    #[serde(default)]
    link: String,
}

pub struct NaverShopParser;

impl NaverShopParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NaverShopParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for NaverShopParser {
    /// Items keep the order the API returned them in; items without a usable
    /// price are dropped.
    fn parse(&self, body: &str) -> Result<Vec<Offer>, ParserError> {
        let response: SearchResponse = serde_json::from_str(body)?;
        let items = response
            .items
            .ok_or_else(|| ParserError::MissingField("items".into()))?;

        let offers = items
            .into_iter()
            .filter_map(|item| {
                let price = parse_price(&item.lprice)?;
                Some(Offer {
                    title: strip_markup(&item.title),
                    price,
                    link: item.link.trim().to_string(),
                })
            })
            .collect();
        Ok(offers)
    }
}

/// Titles come back with `<b>` highlighting and HTML entities.
pub fn strip_markup(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_price(raw: &str) -> Option<u64> {
    let digits = raw.trim().replace(',', "");
    match digits.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(price) => Some(price),
    }
}

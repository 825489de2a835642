pub mod naver_parser;

pub use naver_parser::{NaverShopParser, Parser};

pub mod access;
pub mod analyzer;
pub mod batch;
pub mod cli;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod planner;
pub mod scraper;
pub mod sheet;
pub mod storage;
pub mod utils;

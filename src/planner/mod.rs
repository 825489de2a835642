pub mod queries;
pub mod resolve;

pub use queries::build_queries;
pub use resolve::resolve;

use crate::model::{LookupError, Offer};

/// Shopping search seam: a free-text query in, offers sorted by ascending
/// price out.
#[async_trait::async_trait]
pub trait OfferLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Offer>, LookupError>;
}

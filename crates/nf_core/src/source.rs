use async_trait::async_trait;
use crate::keywords::KeywordSet;
use crate::types::QueryResult;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns a short name for logs
    fn name(&self) -> &str;

    /// Queries for articles matching `keywords`. `None` leaves the choice of
    /// terms to the source (the gateway substitutes its fallback set).
    async fn query(&self, keywords: Option<&KeywordSet>) -> Result<QueryResult>;
}

use async_trait::async_trait;

use crate::types::RawArticle;
use crate::Result;

/// A provider of raw news snippets about a company.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the news source
    fn name(&self) -> &str;

    /// Fetches at most `limit` articles mentioning `company`.
    ///
    /// An upstream that answers with a non-success status yields an empty
    /// list. Transport failures are returned as errors.
    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>>;
}

//! Third-party collaborators: lead crawling, text generation and Stripe billing.
//!
//! Crawling and generation sit behind traits so services can run against
//! in-process fakes.

pub mod claude;
pub mod places;
pub mod stripe;

pub use claude::*;
pub use places::*;
pub use self::stripe::*;

use crate::error::AppResult;
use crate::models::ExternalLeadRecord;
use async_trait::async_trait;

/// 按地点抓取商家线索
#[async_trait]
pub trait LeadSource: Send + Sync {
    async fn crawl(
        &self,
        location: &str,
        radius: u32,
        business_type: Option<&str>,
    ) -> AppResult<Vec<ExternalLeadRecord>>;
}

/// 文本生成（网站代码、外联消息、网站定制）
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> AppResult<String>;
}

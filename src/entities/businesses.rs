use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const NO_WEBSITE: &str = "NO WEBSITE";

/// Outreach pipeline state. Any state can be set from any other state.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "qualified")]
    Qualified,
    #[sea_orm(string_value = "contacted")]
    Contacted,
    #[sea_orm(string_value = "interested")]
    Interested,
    #[sea_orm(string_value = "demo_sent")]
    DemoSent,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "not_interested")]
    NotInterested,
    #[sea_orm(string_value = "no_response")]
    NoResponse,
}

impl LeadStatus {
    /// 进入这些状态时自动把 contacted 置为 true（只置位，不清除）
    pub fn implies_contacted(&self) -> bool {
        matches!(
            self,
            LeadStatus::Contacted
                | LeadStatus::Interested
                | LeadStatus::DemoSent
                | LeadStatus::Converted
        )
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeadStatus::New => "new",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Interested => "interested",
            LeadStatus::DemoSent => "demo_sent",
            LeadStatus::Converted => "converted",
            LeadStatus::NotInterested => "not_interested",
            LeadStatus::NoResponse => "no_response",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "businesses")]
#[schema(as = Business)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// Google Places place_id，只在同一用户范围内唯一
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub total_ratings: Option<i32>,
    pub types: Option<String>,
    pub business_status: Option<String>,
    pub contacted: bool,
    pub website_generated: bool,
    pub generated_website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_website_code: Option<String>,
    pub lead_status: LeadStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn needs_website(&self) -> bool {
        website_missing(self.website.as_deref())
    }
}

/// 没有网站：字段为空、空白，或者是爬虫写入的 "NO WEBSITE"
pub fn website_missing(website: Option<&str>) -> bool {
    match website {
        None => true,
        Some(w) => w.trim().is_empty() || w.trim().eq_ignore_ascii_case(NO_WEBSITE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_website_missing() {
        assert!(website_missing(None));
        assert!(website_missing(Some("")));
        assert!(website_missing(Some("NO WEBSITE")));
        assert!(website_missing(Some("no website")));
        assert!(!website_missing(Some("https://example.com")));
    }

    #[test]
    fn test_implies_contacted() {
        assert!(!LeadStatus::New.implies_contacted());
        assert!(!LeadStatus::Qualified.implies_contacted());
        assert!(LeadStatus::Contacted.implies_contacted());
        assert!(LeadStatus::DemoSent.implies_contacted());
        assert!(LeadStatus::Converted.implies_contacted());
        assert!(!LeadStatus::NotInterested.implies_contacted());
        assert!(!LeadStatus::NoResponse.implies_contacted());
    }
}

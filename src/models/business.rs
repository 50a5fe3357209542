use crate::entities::{LeadStatus, business_entity};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub type Business = business_entity::Model;

/// 爬虫返回的一条商家记录（字段名与爬虫 JSON 保持一致）
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ExternalLeadRecord {
    #[serde(default)]
    #[schema(example = "Joe's Pizza")]
    pub name: String,
    pub address: Option<String>,
    /// Absent or "NO WEBSITE" both mean the business has no website.
    pub website: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub total_ratings: Option<i32>,
    pub types: Option<Vec<String>>,
    #[serde(default)]
    #[schema(example = "ChIJN1t_tDeuEmsRUsoyG83frY4")]
    pub place_id: String,
    pub business_status: Option<String>,
}

impl ExternalLeadRecord {
    pub fn has_website(&self) -> bool {
        !crate::entities::businesses::website_missing(self.website.as_deref())
    }

    /// 类型列表压平成逗号分隔字符串；空列表返回 None
    pub fn joined_types(&self) -> Option<String> {
        self.types
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| t.join(","))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportResult {
    pub imported: i32,
    pub updated: i32,
    pub skipped: i32,
    pub errors: Vec<String>,
}

impl ImportResult {
    pub fn summary(&self) -> String {
        format!(
            "Imported: {}, Updated: {}, Skipped: {}, Errors: {}",
            self.imported,
            self.updated,
            self.skipped,
            self.errors.len()
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateBusinessRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub lead_status: Option<LeadStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateLeadStatusRequest {
    pub status: LeadStatus,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct MarkContactedRequest {
    #[schema(example = "Called, left voicemail")]
    pub notes: Option<String>,
}

/// 列表过滤条件，全部可选，可组合
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BusinessQuery {
    pub no_website: Option<bool>,
    pub uncontacted: Option<bool>,
    pub website_generated: Option<bool>,
    pub status: Option<LeadStatus>,
    #[serde(rename = "type")]
    pub business_type: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BusinessStats {
    pub total_leads: i64,
    /// Leads without a website.
    pub hot_leads: i64,
    pub contacted: i64,
    pub websites_generated: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchLeadsRequest {
    #[schema(example = "Austin")]
    pub city: String,
    #[schema(example = "TX")]
    pub state: String,
    #[schema(example = 5000)]
    pub radius: Option<u32>,
    #[schema(example = "restaurant")]
    pub business_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchLeadsResponse {
    pub location: String,
    pub radius: u32,
    pub business_type: Option<String>,
    pub total_found: i32,
    pub imported: i32,
    pub updated: i32,
    pub businesses_without_website: i32,
    pub import_errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateWebsiteResponse {
    pub business_id: i32,
    pub website_url: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateMessageResponse {
    pub business_id: i32,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomizeWebsiteRequest {
    #[schema(example = "Make the colors blue and white")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomizeWebsiteResponse {
    pub assistant_message: String,
    pub updated_code: String,
    pub messages_remaining: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemainingMessagesResponse {
    pub remaining: i32,
    pub can_customize: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_summary() {
        let result = ImportResult {
            imported: 2,
            updated: 1,
            skipped: 1,
            errors: vec!["Error importing X: bad".into()],
        };
        assert_eq!(
            result.summary(),
            "Imported: 2, Updated: 1, Skipped: 1, Errors: 1"
        );
    }

    #[test]
    fn test_record_deserializes_crawler_json() {
        let raw = r#"{
            "name": "Joe's Pizza",
            "address": "1 Main St",
            "website": "NO WEBSITE",
            "phone": "N/A",
            "rating": 4.5,
            "total_ratings": 120,
            "types": ["restaurant", "food"],
            "place_id": "p1",
            "business_status": "OPERATIONAL"
        }"#;
        let record: ExternalLeadRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.place_id, "p1");
        assert!(!record.has_website());
        assert_eq!(record.joined_types().as_deref(), Some("restaurant,food"));
    }

    #[test]
    fn test_record_missing_key_still_parses() {
        let record: ExternalLeadRecord = serde_json::from_str(r#"{"name": "Nameless"}"#).unwrap();
        assert!(record.place_id.is_empty());
        assert_eq!(record.joined_types(), None);
    }
}

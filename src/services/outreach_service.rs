//! Metered outreach workflows.
//!
//! Every workflow follows the same order: entitlement check, collaborator call,
//! persistence, then the usage increment. A failed collaborator call never counts.

use super::prompts::{
    CUSTOMIZE_SYSTEM_PROMPT, MESSAGE_SYSTEM_PROMPT, WEBSITE_SYSTEM_PROMPT, customize_prompt,
    extract_code, message_prompt, parse_customization_response, website_prompt,
};
use super::{CustomizationService, EntitlementService, ImportService, LeadService};
use crate::error::{AppError, AppResult};
use crate::external::{ContentGenerator, LeadSource};
use crate::models::*;
use std::sync::Arc;

pub const DEFAULT_SEARCH_RADIUS: u32 = 5000;

#[derive(Clone)]
pub struct OutreachService {
    entitlements: EntitlementService,
    customizations: CustomizationService,
    imports: ImportService,
    leads: LeadService,
    lead_source: Arc<dyn LeadSource>,
    generator: Arc<dyn ContentGenerator>,
    preview_base_url: String,
}

impl OutreachService {
    pub fn new(
        entitlements: EntitlementService,
        customizations: CustomizationService,
        imports: ImportService,
        leads: LeadService,
        lead_source: Arc<dyn LeadSource>,
        generator: Arc<dyn ContentGenerator>,
        preview_base_url: String,
    ) -> Self {
        Self {
            entitlements,
            customizations,
            imports,
            leads,
            lead_source,
            generator,
            preview_base_url,
        }
    }

    /// 抓取 -> 导入 -> 计数
    pub async fn search_leads(
        &self,
        user_id: i32,
        request: SearchLeadsRequest,
    ) -> AppResult<SearchLeadsResponse> {
        let city = request.city.trim();
        let state = request.state.trim();
        if city.is_empty() {
            return Err(AppError::ValidationError("City is required".to_string()));
        }
        if state.is_empty() {
            return Err(AppError::ValidationError("State is required".to_string()));
        }

        self.entitlements
            .ensure_allowed(user_id, ActionType::Search)
            .await?;

        let location = format!("{city}, {state}");
        let radius = request.radius.unwrap_or(DEFAULT_SEARCH_RADIUS);
        let business_type = request
            .business_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        log::info!("User {user_id} searching leads: {location}, radius={radius}, type={business_type:?}");
        let records = self
            .lead_source
            .crawl(&location, radius, business_type.as_deref())
            .await?;

        let total_found = records.len() as i32;
        let without_website = records.iter().filter(|r| !r.has_website()).count() as i32;
        let result = self.imports.import_businesses(user_id, records).await?;

        self.entitlements
            .increment_usage(user_id, ActionType::Search)
            .await?;

        Ok(SearchLeadsResponse {
            location,
            radius,
            business_type,
            total_found,
            imported: result.imported,
            updated: result.updated,
            businesses_without_website: without_website,
            import_errors: result.errors,
        })
    }

    pub async fn generate_website(
        &self,
        user_id: i32,
        business_id: i32,
    ) -> AppResult<GenerateWebsiteResponse> {
        self.entitlements
            .ensure_allowed(user_id, ActionType::GenerateWebsite)
            .await?;
        let business = self.leads.get_business(user_id, business_id).await?;

        log::info!("Generating website for business {} ({})", business.id, business.name);
        let raw = self
            .generator
            .generate(WEBSITE_SYSTEM_PROMPT, &website_prompt(&business))
            .await?;
        let code = extract_code(&raw);
        if code.is_empty() {
            return Err(AppError::ExternalApiError(
                "Generator returned an empty website".to_string(),
            ));
        }

        let website_url = format!(
            "{}/preview/{}",
            self.preview_base_url.trim_end_matches('/'),
            business.id
        );
        self.leads
            .mark_website_generated(user_id, business.id, Some(website_url.clone()), code.clone())
            .await?;

        self.entitlements
            .increment_usage(user_id, ActionType::GenerateWebsite)
            .await?;

        Ok(GenerateWebsiteResponse {
            business_id: business.id,
            website_url,
            code,
        })
    }

    pub async fn generate_message(
        &self,
        user_id: i32,
        business_id: i32,
    ) -> AppResult<GenerateMessageResponse> {
        self.entitlements
            .ensure_allowed(user_id, ActionType::GenerateMessage)
            .await?;
        let business = self.leads.get_business(user_id, business_id).await?;

        log::info!("Generating outreach message for business {}", business.id);
        let message = self
            .generator
            .generate(MESSAGE_SYSTEM_PROMPT, &message_prompt(&business))
            .await?;

        self.entitlements
            .increment_usage(user_id, ActionType::GenerateMessage)
            .await?;

        Ok(GenerateMessageResponse {
            business_id: business.id,
            message: message.trim().to_string(),
        })
    }

    /// 需要 PRO/ENTERPRISE 且该网站剩余定制次数 > 0
    pub async fn customize_website(
        &self,
        user_id: i32,
        business_id: i32,
        request: CustomizeWebsiteRequest,
    ) -> AppResult<CustomizeWebsiteResponse> {
        if request.message.trim().is_empty() {
            return Err(AppError::ValidationError("Message is required".to_string()));
        }
        if !self.customizations.can_customize(user_id).await? {
            return Err(AppError::QuotaExceeded(
                "Upgrade to Pro or Enterprise to customize websites with AI".to_string(),
            ));
        }
        let remaining = self
            .customizations
            .get_remaining(user_id, business_id)
            .await?;
        if remaining <= 0 {
            return Err(AppError::QuotaExceeded(
                "You've used all customization messages for this website".to_string(),
            ));
        }

        let business = self.leads.get_business(user_id, business_id).await?;
        let current_code = business
            .generated_website_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::ValidationError("No website generated yet".to_string()))?;

        let reply = self
            .generator
            .generate(
                CUSTOMIZE_SYSTEM_PROMPT,
                &customize_prompt(&business.name, current_code, &request.message),
            )
            .await?;
        let (assistant_message, updated_code) = parse_customization_response(&reply);
        if updated_code.is_empty() {
            return Err(AppError::ExternalApiError(
                "Generator returned no website code".to_string(),
            ));
        }

        self.leads
            .save_website_code(user_id, business.id, updated_code.clone())
            .await?;
        self.customizations.decrement(user_id, business.id).await?;

        Ok(CustomizeWebsiteResponse {
            assistant_message,
            updated_code,
            messages_remaining: remaining - 1,
        })
    }

    pub async fn remaining_customizations(
        &self,
        user_id: i32,
        business_id: i32,
    ) -> AppResult<RemainingMessagesResponse> {
        let remaining = self
            .customizations
            .get_remaining(user_id, business_id)
            .await?;
        let can_customize = self.customizations.can_customize(user_id).await?;
        Ok(RemainingMessagesResponse {
            remaining,
            can_customize,
        })
    }
}

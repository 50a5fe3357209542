use crate::entities::businesses::NO_WEBSITE;
use crate::entities::{LeadStatus, business_entity as businesses};
use crate::error::{AppError, AppResult};
use crate::models::{BusinessQuery, BusinessStats, UpdateBusinessRequest};
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

/// 线索管理；所有操作都限定在所属用户范围内，别人的 ID 一律视为不存在
#[derive(Clone)]
pub struct LeadService {
    pool: DatabaseConnection,
}

/// 与 `businesses::website_missing` 同一规则：NULL、空白或忽略大小写的 "NO WEBSITE"
fn without_website() -> Condition {
    let normalized = Func::lower(
        Func::cust(Alias::new("TRIM")).arg(Expr::col(businesses::Column::Website)),
    );
    Condition::any()
        .add(businesses::Column::Website.is_null())
        .add(Expr::expr(normalized).is_in(["".to_string(), NO_WEBSITE.to_lowercase()]))
}

fn lower_like(column: businesses::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

fn owned_by(user_id: i32) -> Select<businesses::Entity> {
    businesses::Entity::find().filter(businesses::Column::UserId.eq(user_id))
}

impl LeadService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_business(&self, user_id: i32, id: i32) -> AppResult<businesses::Model> {
        owned_by(user_id)
            .filter(businesses::Column::Id.eq(id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Business not found with id: {id}")))
    }

    /// 过滤条件可组合
    pub async fn list_businesses(
        &self,
        user_id: i32,
        query: &BusinessQuery,
    ) -> AppResult<Vec<businesses::Model>> {
        let mut select = owned_by(user_id);

        if let Some(no_website) = query.no_website {
            select = if no_website {
                select.filter(without_website())
            } else {
                select.filter(without_website().not())
            };
        }
        if query.uncontacted == Some(true) {
            select = select.filter(businesses::Column::Contacted.eq(false));
        }
        if let Some(generated) = query.website_generated {
            select = select.filter(businesses::Column::WebsiteGenerated.eq(generated));
        }
        if let Some(status) = query.status {
            select = select.filter(businesses::Column::LeadStatus.eq(status));
        }
        if let Some(kind) = query.business_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(lower_like(
                businesses::Column::Types,
                &format!("%{}%", kind.to_lowercase()),
            ));
        }
        if let Some(keyword) = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            let pattern = format!("%{}%", keyword.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(lower_like(businesses::Column::Name, &pattern))
                    .add(lower_like(businesses::Column::Address, &pattern))
                    .add(lower_like(businesses::Column::Phone, &pattern)),
            );
        }

        Ok(select
            .order_by_desc(businesses::Column::CreatedAt)
            .order_by_desc(businesses::Column::Id)
            .all(&self.pool)
            .await?)
    }

    /// 只更新请求中给出的字段
    pub async fn update_business(
        &self,
        user_id: i32,
        id: i32,
        request: UpdateBusinessRequest,
    ) -> AppResult<businesses::Model> {
        let existing = self.get_business(user_id, id).await?;
        let was_contacted = existing.contacted;
        let mut am = existing.into_active_model();

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError("Name cannot be empty".to_string()));
            }
            am.name = Set(name);
        }
        if let Some(address) = request.address {
            am.address = Set(Some(address));
        }
        if let Some(phone) = request.phone {
            am.phone = Set(Some(phone));
        }
        if let Some(website) = request.website {
            am.website = Set(Some(website));
        }
        if let Some(notes) = request.notes {
            am.notes = Set(Some(notes));
        }
        if let Some(status) = request.lead_status {
            am.lead_status = Set(status);
            am.contacted = Set(was_contacted || status.implies_contacted());
        }
        am.updated_at = Set(Utc::now());

        Ok(am.update(&self.pool).await?)
    }

    /// 任意状态之间都可以切换；进入已联系类状态时 contacted 置为 true
    pub async fn update_lead_status(
        &self,
        user_id: i32,
        id: i32,
        status: LeadStatus,
    ) -> AppResult<businesses::Model> {
        let existing = self.get_business(user_id, id).await?;
        let contacted = existing.contacted || status.implies_contacted();
        let mut am = existing.into_active_model();
        am.lead_status = Set(status);
        am.contacted = Set(contacted);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        log::info!("Business {id} of user {user_id} moved to {status}");
        Ok(updated)
    }

    pub async fn mark_contacted(
        &self,
        user_id: i32,
        id: i32,
        notes: Option<String>,
    ) -> AppResult<businesses::Model> {
        let existing = self.get_business(user_id, id).await?;
        let merged_notes = match (existing.notes.clone(), notes) {
            (Some(old), Some(new)) => Some(format!("{old}\n{new}")),
            (None, Some(new)) => Some(new),
            (old, None) => old,
        };
        let mut am = existing.into_active_model();
        am.contacted = Set(true);
        am.lead_status = Set(LeadStatus::Contacted);
        am.notes = Set(merged_notes);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    pub async fn mark_website_generated(
        &self,
        user_id: i32,
        id: i32,
        website_url: Option<String>,
        code: String,
    ) -> AppResult<businesses::Model> {
        let existing = self.get_business(user_id, id).await?;
        let mut am = existing.into_active_model();
        am.website_generated = Set(true);
        am.generated_website_url = Set(website_url);
        am.generated_website_code = Set(Some(code));
        am.lead_status = Set(LeadStatus::DemoSent);
        am.contacted = Set(true);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    /// 只替换已生成的网站代码（AI 定制后保存）
    pub async fn save_website_code(
        &self,
        user_id: i32,
        id: i32,
        code: String,
    ) -> AppResult<businesses::Model> {
        let existing = self.get_business(user_id, id).await?;
        let mut am = existing.into_active_model();
        am.generated_website_code = Set(Some(code));
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    pub async fn delete_business(&self, user_id: i32, id: i32) -> AppResult<()> {
        let existing = self.get_business(user_id, id).await?;
        existing.delete(&self.pool).await?;
        log::info!("Deleted business {id} of user {user_id}");
        Ok(())
    }

    pub async fn delete_all_businesses(&self, user_id: i32) -> AppResult<u64> {
        let result = businesses::Entity::delete_many()
            .filter(businesses::Column::UserId.eq(user_id))
            .exec(&self.pool)
            .await?;
        log::info!("Deleted {} businesses of user {user_id}", result.rows_affected);
        Ok(result.rows_affected)
    }

    pub async fn count_without_website(&self, user_id: i32) -> AppResult<i64> {
        let n = owned_by(user_id)
            .filter(without_website())
            .count(&self.pool)
            .await?;
        Ok(n as i64)
    }

    pub async fn stats(&self, user_id: i32) -> AppResult<BusinessStats> {
        let total_leads = owned_by(user_id).count(&self.pool).await? as i64;
        let hot_leads = self.count_without_website(user_id).await?;
        let contacted = owned_by(user_id)
            .filter(businesses::Column::Contacted.eq(true))
            .count(&self.pool)
            .await? as i64;
        let websites_generated = owned_by(user_id)
            .filter(businesses::Column::WebsiteGenerated.eq(true))
            .count(&self.pool)
            .await? as i64;

        Ok(BusinessStats {
            total_leads,
            hot_leads,
            contacted,
            websites_generated,
        })
    }
}

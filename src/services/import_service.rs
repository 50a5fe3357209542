use crate::entities::{LeadStatus, business_entity as businesses};
use crate::error::{AppError, AppResult};
use crate::models::{ExternalLeadRecord, ImportResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};

enum Outcome {
    Imported,
    Updated,
}

/// 爬虫结果导入：按 (place_id, 所属用户) 去重，存在则更新，否则新建
#[derive(Clone)]
pub struct ImportService {
    pool: DatabaseConnection,
}

impl ImportService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 逐条导入，每条独立事务；单条失败只记录错误，不影响其他记录
    pub async fn import_businesses(
        &self,
        owner_id: i32,
        records: Vec<ExternalLeadRecord>,
    ) -> AppResult<ImportResult> {
        let mut result = ImportResult::default();

        for record in &records {
            match self.import_one(owner_id, record).await {
                Ok(Outcome::Imported) => result.imported += 1,
                Ok(Outcome::Updated) => result.updated += 1,
                Err(e) => {
                    log::warn!("Skipping record {:?} for user {owner_id}: {e}", record.place_id);
                    result
                        .errors
                        .push(format!("Error importing {}: {e}", record.name));
                    result.skipped += 1;
                }
            }
        }

        log::info!("Import for user {owner_id} finished. {}", result.summary());
        Ok(result)
    }

    async fn import_one(&self, owner_id: i32, record: &ExternalLeadRecord) -> AppResult<Outcome> {
        validate_record(record)?;

        let txn = self.pool.begin().await?;
        let outcome = upsert_record(&txn, owner_id, record).await?;
        txn.commit().await?;
        Ok(outcome)
    }
}

fn validate_record(record: &ExternalLeadRecord) -> AppResult<()> {
    if record.place_id.trim().is_empty() {
        return Err(AppError::ValidationError("place_id is required".to_string()));
    }
    if record.name.trim().is_empty() {
        return Err(AppError::ValidationError("name is required".to_string()));
    }
    Ok(())
}

async fn upsert_record(
    txn: &DatabaseTransaction,
    owner_id: i32,
    record: &ExternalLeadRecord,
) -> AppResult<Outcome> {
    let now = Utc::now();
    let existing = businesses::Entity::find()
        .filter(businesses::Column::PlaceId.eq(record.place_id.as_str()))
        .filter(businesses::Column::UserId.eq(owner_id))
        .one(txn)
        .await?;

    match existing {
        Some(model) => {
            // 线索状态、联系记录、已生成网站等字段保持不变
            let mut am = model.into_active_model();
            am.name = Set(record.name.clone());
            am.address = Set(record.address.clone());
            am.website = Set(record.website.clone());
            am.phone = Set(record.phone.clone());
            am.rating = Set(record.rating);
            am.total_ratings = Set(record.total_ratings);
            if let Some(types) = record.joined_types() {
                am.types = Set(Some(types));
            }
            am.business_status = Set(record.business_status.clone());
            am.updated_at = Set(now);
            am.update(txn).await?;
            Ok(Outcome::Updated)
        }
        None => {
            let am = businesses::ActiveModel {
                user_id: Set(owner_id),
                place_id: Set(record.place_id.clone()),
                name: Set(record.name.clone()),
                address: Set(record.address.clone()),
                phone: Set(record.phone.clone()),
                website: Set(record.website.clone()),
                rating: Set(record.rating),
                total_ratings: Set(record.total_ratings),
                types: Set(record.joined_types()),
                business_status: Set(record.business_status.clone()),
                contacted: Set(false),
                website_generated: Set(false),
                generated_website_url: Set(None),
                generated_website_code: Set(None),
                lead_status: Set(LeadStatus::New),
                notes: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            am.insert(txn).await?;
            Ok(Outcome::Imported)
        }
    }
}

//! Background jobs. Call `spawn_all` once during startup.

use crate::config::UsageConfig;
use crate::services::BillingService;

const ROLLOVER_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Spawn all enabled background tasks; detaches via `tokio::spawn` and does not block.
pub fn spawn_all(usage: &UsageConfig, billing_service: BillingService) {
    // 每小时把重置日期已过的用户用量清零（默认关闭，只在订阅时清零）
    if usage.monthly_rollover {
        let svc = billing_service;
        tokio::spawn(async move {
            loop {
                match svc.rollover_expired_usage().await {
                    Ok(n) if n > 0 => log::info!("Monthly usage rolled over for {n} users"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to roll over monthly usage: {e:?}"),
                }
                tokio::time::sleep(ROLLOVER_INTERVAL).await;
            }
        });
    } else {
        log::info!("Monthly usage rollover disabled");
    }
}

/// 取当前用户 ID，未认证时直接返回错误响应
macro_rules! user_or_reject {
    ($req:expr) => {
        match crate::middlewares::current_user_id(&$req) {
            Ok(id) => id,
            Err(e) => return Ok(e.error_response()),
        }
    };
}

pub mod auth;
pub mod billing;
pub mod business;
pub mod outreach;
pub mod user;
pub mod webhook;

pub use auth::auth_config;
pub use billing::billing_config;
pub use business::business_config;
pub use outreach::outreach_config;
pub use user::user_config;
pub use webhook::webhook_config;

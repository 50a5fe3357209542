pub mod auth_service;
pub mod billing_service;
pub mod customization_service;
pub mod entitlement_service;
pub mod import_service;
pub mod lead_service;
pub mod outreach_service;
pub mod prompts;
pub mod user_service;

pub use auth_service::*;
pub use billing_service::*;
pub use customization_service::*;
pub use entitlement_service::*;
pub use import_service::*;
pub use lead_service::*;
pub use outreach_service::*;
pub use user_service::*;

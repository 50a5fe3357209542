pub mod businesses;
pub mod customization_usages;
pub mod users;

pub use businesses as business_entity;
pub use customization_usages as customization_usage_entity;
pub use users as user_entity;

pub use businesses::LeadStatus;
pub use users::SubscriptionStatus;

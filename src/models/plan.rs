//! Subscription plans and their monthly allowances.
//!
//! The catalog is a plain table keyed by plan; lookups are free functions over it.

use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionPlan {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "basic")]
    Basic,
    #[sea_orm(string_value = "pro")]
    Pro,
    #[sea_orm(string_value = "enterprise")]
    Enterprise,
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionPlan::Free => write!(f, "free"),
            SubscriptionPlan::Basic => write!(f, "basic"),
            SubscriptionPlan::Pro => write!(f, "pro"),
            SubscriptionPlan::Enterprise => write!(f, "enterprise"),
        }
    }
}

/// 计量动作类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Search,
    GenerateWebsite,
    GenerateMessage,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Search => write!(f, "search"),
            ActionType::GenerateWebsite => write!(f, "website generation"),
            ActionType::GenerateMessage => write!(f, "message"),
        }
    }
}

/// A monthly allowance. `Unlimited` is its own state, never a large number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Limited(i32),
    Unlimited,
}

impl Allowance {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Allowance::Unlimited)
    }

    /// `used` 严格小于额度才允许
    pub fn permits(&self, used: i32) -> bool {
        match self {
            Allowance::Unlimited => true,
            Allowance::Limited(limit) => used < *limit,
        }
    }

    /// `None` means unlimited.
    pub fn remaining(&self, used: i32) -> Option<i32> {
        match self {
            Allowance::Unlimited => None,
            Allowance::Limited(limit) => Some((limit - used).max(0)),
        }
    }

    pub fn limit(&self) -> Option<i32> {
        match self {
            Allowance::Unlimited => None,
            Allowance::Limited(limit) => Some(*limit),
        }
    }
}

impl std::fmt::Display for Allowance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Allowance::Unlimited => write!(f, "unlimited"),
            Allowance::Limited(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub monthly_searches: Allowance,
    pub monthly_website_generations: Allowance,
    pub monthly_messages: Allowance,
}

const FREE_LIMITS: PlanLimits = PlanLimits {
    monthly_searches: Allowance::Limited(1),
    monthly_website_generations: Allowance::Limited(2),
    monthly_messages: Allowance::Limited(10),
};

pub const PLAN_CATALOG: &[(SubscriptionPlan, PlanLimits)] = &[
    (SubscriptionPlan::Free, FREE_LIMITS),
    (
        SubscriptionPlan::Basic,
        PlanLimits {
            monthly_searches: Allowance::Limited(5),
            monthly_website_generations: Allowance::Limited(20),
            monthly_messages: Allowance::Limited(100),
        },
    ),
    (
        SubscriptionPlan::Pro,
        PlanLimits {
            monthly_searches: Allowance::Limited(20),
            monthly_website_generations: Allowance::Limited(100),
            monthly_messages: Allowance::Unlimited,
        },
    ),
    (
        SubscriptionPlan::Enterprise,
        PlanLimits {
            monthly_searches: Allowance::Unlimited,
            monthly_website_generations: Allowance::Unlimited,
            monthly_messages: Allowance::Unlimited,
        },
    ),
];

/// 每个网站可用的 AI 定制消息数；不在表中的套餐没有定制能力
const CUSTOMIZATION_LIMITS: &[(SubscriptionPlan, i32)] = &[
    (SubscriptionPlan::Pro, 10),
    (SubscriptionPlan::Enterprise, 50),
];

pub fn plan_limits(plan: SubscriptionPlan) -> PlanLimits {
    PLAN_CATALOG
        .iter()
        .find(|(p, _)| *p == plan)
        .map(|(_, limits)| *limits)
        .unwrap_or(FREE_LIMITS)
}

pub fn allowance_for(plan: SubscriptionPlan, action: ActionType) -> Allowance {
    let limits = plan_limits(plan);
    match action {
        ActionType::Search => limits.monthly_searches,
        ActionType::GenerateWebsite => limits.monthly_website_generations,
        ActionType::GenerateMessage => limits.monthly_messages,
    }
}

pub fn customization_limit(plan: SubscriptionPlan) -> Option<i32> {
    CUSTOMIZATION_LIMITS
        .iter()
        .find(|(p, _)| *p == plan)
        .map(|(_, limit)| *limit)
}

pub fn can_customize(plan: SubscriptionPlan) -> bool {
    customization_limit(plan).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_plan_has_a_catalog_row() {
        for plan in [
            SubscriptionPlan::Free,
            SubscriptionPlan::Basic,
            SubscriptionPlan::Pro,
            SubscriptionPlan::Enterprise,
        ] {
            assert!(PLAN_CATALOG.iter().any(|(p, _)| *p == plan), "{plan} missing");
        }
    }

    #[test]
    fn test_plan_allowances() {
        assert_eq!(
            allowance_for(SubscriptionPlan::Free, ActionType::Search),
            Allowance::Limited(1)
        );
        assert_eq!(
            allowance_for(SubscriptionPlan::Basic, ActionType::Search),
            Allowance::Limited(5)
        );
        assert_eq!(
            allowance_for(SubscriptionPlan::Basic, ActionType::GenerateMessage),
            Allowance::Limited(100)
        );
        assert!(allowance_for(SubscriptionPlan::Pro, ActionType::GenerateMessage).is_unlimited());
        assert!(
            allowance_for(SubscriptionPlan::Enterprise, ActionType::GenerateWebsite)
                .is_unlimited()
        );
    }

    #[test]
    fn test_allowance_boundary() {
        let a = Allowance::Limited(5);
        assert!(a.permits(4));
        assert!(!a.permits(5));
        assert!(!a.permits(6));
        assert_eq!(a.remaining(4), Some(1));
        assert_eq!(a.remaining(9), Some(0));

        assert!(Allowance::Unlimited.permits(i32::MAX));
        assert_eq!(Allowance::Unlimited.remaining(1000), None);
    }

    #[test]
    fn test_customization_capability() {
        assert_eq!(customization_limit(SubscriptionPlan::Free), None);
        assert_eq!(customization_limit(SubscriptionPlan::Basic), None);
        assert_eq!(customization_limit(SubscriptionPlan::Pro), Some(10));
        assert_eq!(customization_limit(SubscriptionPlan::Enterprise), Some(50));
        assert!(!can_customize(SubscriptionPlan::Basic));
    }

    #[test]
    fn test_plan_serde_names() {
        let json = serde_json::to_string(&SubscriptionPlan::Enterprise).unwrap();
        assert_eq!(json, "\"ENTERPRISE\"");
        let action: ActionType = serde_json::from_str("\"GENERATE_WEBSITE\"").unwrap();
        assert_eq!(action, ActionType::GenerateWebsite);
    }
}

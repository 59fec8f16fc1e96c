use crate::error::{BotError, BotResult};
use stratton_shared::models::Plan;

/// Static, ordered plan list. Read-only once built.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> BotResult<Self> {
        for (idx, plan) in plans.iter().enumerate() {
            if plan.id.is_empty() {
                return Err(BotError::InvalidCatalog("plan id is empty".into()));
            }
            // Deep links are split on '_', so ids can't contain it.
            if plan.id.contains('_') {
                return Err(BotError::InvalidCatalog(format!(
                    "plan id '{}' contains '_'",
                    plan.id
                )));
            }
            if plan.price <= 0 {
                return Err(BotError::InvalidCatalog(format!(
                    "plan '{}' has non-positive price {}",
                    plan.id, plan.price
                )));
            }
            if plans[..idx].iter().any(|p| p.id == plan.id) {
                return Err(BotError::InvalidCatalog(format!(
                    "duplicate plan id '{}'",
                    plan.id
                )));
            }
        }
        Ok(Self { plans })
    }

    pub fn get(&self, plan_id: &str) -> BotResult<&Plan> {
        self.plans
            .iter()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| BotError::UnknownPlan(plan_id.to_string()))
    }

    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter()
    }
}

/// The plans the bot sells out of the box.
pub fn default_plans() -> Vec<Plan> {
    let plan = |id: &str, name: &str, description: &str, price: i64, issued_key: &str| Plan {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        issued_key: issued_key.to_string(),
    };

    vec![
        plan("basic", "Basic Plan", "1000 API calls/month", 500, "sk_test_basic_1234567890"),
        plan(
            "standard",
            "Standard Plan",
            "5000 API calls/month",
            2000,
            "sk_test_standard_1234567890",
        ),
        plan("premium", "Premium Plan", "Unlimited API calls", 5000, "sk_test_premium_1234567890"),
    ]
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            plans: default_plans(),
        }
    }
}

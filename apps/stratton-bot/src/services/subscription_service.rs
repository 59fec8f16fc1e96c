use crate::error::BotResult;
use crate::services::catalog_service::PlanCatalog;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use stratton_shared::models::Subscription;
use teloxide::types::UserId;
use tokio::sync::RwLock;
use tracing::info;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> Option<Subscription>;

    /// Inserts or overwrites the user's subscription. Fails with `UnknownPlan`
    /// without touching the store.
    async fn activate(&self, user_id: UserId, plan_id: &str) -> BotResult<Subscription>;

    async fn is_active(&self, user_id: UserId) -> bool {
        self.get(user_id)
            .await
            .map(|s| s.is_active())
            .unwrap_or(false)
    }
}

/// Process-local store. Nothing survives a restart.
#[derive(Clone)]
pub struct InMemorySubscriptionStore {
    catalog: Arc<PlanCatalog>,
    subscriptions: Arc<RwLock<HashMap<UserId, Subscription>>>,
}

impl InMemorySubscriptionStore {
    pub fn new(catalog: Arc<PlanCatalog>) -> Self {
        Self {
            catalog,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn get(&self, user_id: UserId) -> Option<Subscription> {
        self.subscriptions.read().await.get(&user_id).cloned()
    }

    async fn activate(&self, user_id: UserId, plan_id: &str) -> BotResult<Subscription> {
        let plan = self.catalog.get(plan_id)?;
        let subscription = Subscription::activate(plan);

        let previous = self
            .subscriptions
            .write()
            .await
            .insert(user_id, subscription.clone());

        match previous {
            Some(old) if old.plan_id != subscription.plan_id => info!(
                "User {} switched subscription {} -> {}",
                user_id.0, old.plan_id, subscription.plan_id
            ),
            Some(_) => info!("User {} re-activated plan {}", user_id.0, plan_id),
            None => info!("User {} activated plan {}", user_id.0, plan_id),
        }

        Ok(subscription)
    }
}

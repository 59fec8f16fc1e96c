use crate::bot::deep_link::DeepLink;
use crate::services::catalog_service::PlanCatalog;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use teloxide::types::UserId;
use tracing::{error, info};
use url::Url;

/// Everything a hosted checkout page needs for a single plan purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub currency: String,
    pub product_name: String,
    pub product_description: String,
    pub unit_amount: i64,
    pub success_url: String,
    pub cancel_url: String,
    pub plan_id: String,
    pub telegram_user_id: u64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session and return its hosted URL
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<Url>;

    fn name(&self) -> &str;
}

pub struct StripeGateway {
    client: Client,
    api_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(api_url: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    fn form_params(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("line_items[0][price_data][currency]", request.currency.clone()),
            (
                "line_items[0][price_data][product_data][name]",
                request.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                request.product_description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                request.unit_amount.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("metadata[plan_id]", request.plan_id.clone()),
            (
                "metadata[telegram_user_id]",
                request.telegram_user_id.to_string(),
            ),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<Url> {
        let resp = self
            .client
            .post(format!("{}/checkout/sessions", self.api_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&Self::form_params(request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Stripe Error ({}): {}", status, body));
        }

        let body: serde_json::Value = resp.json().await?;

        match body["url"].as_str() {
            Some(url) => Ok(Url::parse(url)?),
            None => Err(anyhow::anyhow!("Stripe session without url: {:?}", body)),
        }
    }

    fn name(&self) -> &str {
        "stripe"
    }
}

/// Turns a plan purchase into a hosted checkout link. Failures are logged and
/// reported as `None` so the caller can ask the user to retry.
#[derive(Clone)]
pub struct PayService {
    catalog: Arc<PlanCatalog>,
    gateway: Arc<dyn PaymentGateway>,
    bot_username: String,
    currency: String,
}

impl PayService {
    pub fn new(
        catalog: Arc<PlanCatalog>,
        gateway: Arc<dyn PaymentGateway>,
        bot_username: String,
        currency: String,
    ) -> Self {
        Self {
            catalog,
            gateway,
            bot_username,
            currency,
        }
    }

    fn start_link(&self, payload: &str) -> String {
        format!("https://t.me/{}?start={}", self.bot_username, payload)
    }

    pub fn checkout_request(&self, plan_id: &str, user_id: UserId) -> Option<CheckoutRequest> {
        let plan = self.catalog.get(plan_id).ok()?;
        Some(CheckoutRequest {
            currency: self.currency.clone(),
            product_name: plan.name.clone(),
            product_description: plan.description.clone(),
            unit_amount: plan.price,
            success_url: self.start_link(&DeepLink::success(&plan.id, user_id)),
            cancel_url: self.start_link(DeepLink::cancel()),
            plan_id: plan.id.clone(),
            telegram_user_id: user_id.0,
        })
    }

    pub async fn create(&self, plan_id: &str, user_id: UserId) -> Option<Url> {
        let Some(request) = self.checkout_request(plan_id, user_id) else {
            error!("Refusing checkout for unknown plan {}", plan_id);
            return None;
        };

        info!(
            "Creating {} checkout for user {}: plan {} ({} {})",
            self.gateway.name(),
            user_id.0,
            plan_id,
            request.unit_amount,
            request.currency
        );

        match self.gateway.create_checkout(&request).await {
            Ok(url) => Some(url),
            Err(e) => {
                error!("Error creating {} session: {}", self.gateway.name(), e);
                None
            }
        }
    }
}

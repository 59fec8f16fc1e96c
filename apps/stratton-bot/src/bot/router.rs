use crate::bot::deep_link::DeepLink;
use crate::bot::{keyboards, screens};
use crate::error::{BotError, BotResult};
use crate::services::catalog_service::PlanCatalog;
use crate::services::pay_service::PayService;
use crate::services::subscription_service::SubscriptionStore;
use std::sync::Arc;
use stratton_shared::models::{Plan, Subscription};
use teloxide::types::{InlineKeyboardMarkup, ParseMode, UserId};
use tracing::{info, warn};

/// A rendered message: text plus its inline keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
    pub parse_mode: Option<ParseMode>,
    pub disable_preview: bool,
}

impl Screen {
    fn html(text: String, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text,
            keyboard,
            parse_mode: Some(ParseMode::Html),
            disable_preview: false,
        }
    }

    fn plain(text: String, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text,
            keyboard,
            parse_mode: None,
            disable_preview: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Replace the current screen.
    Screen(Screen),
    /// Pop-up alert; the current screen stays as it is.
    Alert(String),
    /// Acknowledge the button press without changing anything.
    Ignore,
}

/// What a `/start` did, before it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    MainMenu,
    Activated { plan: Plan, subscription: Subscription },
    /// The success link names another user. Nothing is activated and the
    /// requester just sees the main menu.
    ForeignPayment { link_user: UserId },
    Cancelled,
    Rejected(BotError),
}

#[derive(Clone)]
pub struct Router {
    catalog: Arc<PlanCatalog>,
    store: Arc<dyn SubscriptionStore>,
    pay: PayService,
}

impl Router {
    pub fn new(catalog: Arc<PlanCatalog>, store: Arc<dyn SubscriptionStore>, pay: PayService) -> Self {
        Self {
            catalog,
            store,
            pay,
        }
    }

    pub async fn resolve_start(&self, user_id: UserId, arg: Option<&str>) -> StartOutcome {
        let link = match arg.map(DeepLink::parse).transpose() {
            Ok(link) => link.unwrap_or(DeepLink::Unrecognized),
            Err(e) => {
                warn!("User {} sent a bad /start payload: {}", user_id.0, e);
                return StartOutcome::Rejected(e);
            }
        };

        match link {
            DeepLink::Unrecognized => StartOutcome::MainMenu,
            DeepLink::PaymentCancelled => StartOutcome::Cancelled,
            DeepLink::PaymentSuccess {
                plan_id,
                user_id: link_user,
            } => match self.activate_from_link(user_id, link_user, &plan_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Payment confirmation for user {} failed: {}", user_id.0, e);
                    StartOutcome::Rejected(e)
                }
            },
        }
    }

    async fn activate_from_link(
        &self,
        requester: UserId,
        link_user: UserId,
        plan_id: &str,
    ) -> BotResult<StartOutcome> {
        let plan = self.catalog.get(plan_id)?.clone();
        if link_user != requester {
            warn!(
                "User {} opened a success link issued for user {}; ignoring",
                requester.0, link_user.0
            );
            return Ok(StartOutcome::ForeignPayment { link_user });
        }

        let subscription = self.store.activate(requester, plan_id).await?;
        info!("Payment confirmed: user {} -> plan {}", requester.0, plan_id);
        Ok(StartOutcome::Activated { plan, subscription })
    }

    pub fn render_start(outcome: &StartOutcome) -> Screen {
        match outcome {
            StartOutcome::Activated { plan, subscription } => Screen::html(
                screens::payment_success(plan, &subscription.issued_key),
                keyboards::main_menu(),
            ),
            StartOutcome::Cancelled => {
                Screen::plain(screens::payment_cancelled(), keyboards::main_menu())
            }
            StartOutcome::Rejected(_) => {
                Screen::html(screens::payment_unconfirmed(), keyboards::main_menu())
            }
            StartOutcome::MainMenu | StartOutcome::ForeignPayment { .. } => {
                Screen::html(screens::welcome(), keyboards::main_menu())
            }
        }
    }

    pub async fn start(&self, user_id: UserId, arg: Option<&str>) -> Screen {
        let outcome = self.resolve_start(user_id, arg).await;
        Self::render_start(&outcome)
    }

    pub async fn callback(&self, user_id: UserId, data: &str) -> Reply {
        match data {
            "main_menu" => Reply::Screen(Screen::html(screens::welcome(), keyboards::main_menu())),
            "my_subscription" => Reply::Screen(self.my_subscription(user_id).await),
            "detailed_info" => Reply::Screen(Screen {
                disable_preview: true,
                ..Screen::html(screens::detailed_info(), keyboards::main_menu())
            }),
            "subscribe" | "view_plans" => Reply::Screen(Screen::html(
                screens::choose_plan(),
                keyboards::plans_keyboard(&self.catalog),
            )),
            plan if plan.starts_with("plan_") => {
                let plan_id = plan.strip_prefix("plan_").unwrap_or_default();
                match self.catalog.get(plan_id) {
                    Ok(plan) => Reply::Screen(Screen::html(
                        screens::plan_details(plan),
                        keyboards::plan_details_keyboard(&plan.id),
                    )),
                    Err(e) => self.unknown_plan(user_id, e),
                }
            }
            purchase if purchase.starts_with("purchase_") => {
                let plan_id = purchase.strip_prefix("purchase_").unwrap_or_default();
                self.purchase(user_id, plan_id).await
            }
            other => {
                info!("Unhandled callback from user {}: {}", user_id.0, other);
                Reply::Ignore
            }
        }
    }

    async fn my_subscription(&self, user_id: UserId) -> Screen {
        let current = self.store.get(user_id).await.and_then(|sub| {
            let plan = self.catalog.get(&sub.plan_id).ok()?.clone();
            Some((plan, sub))
        });

        let text = match current {
            Some((plan, sub)) => screens::my_subscription(&plan, &sub),
            None => screens::no_subscription(),
        };
        Screen::html(text, keyboards::main_menu())
    }

    async fn purchase(&self, user_id: UserId, plan_id: &str) -> Reply {
        let plan = match self.catalog.get(plan_id) {
            Ok(plan) => plan,
            Err(e) => return self.unknown_plan(user_id, e),
        };

        match self.pay.create(plan_id, user_id).await {
            Some(url) => Reply::Screen(Screen::html(
                screens::payment_link(plan),
                keyboards::payment_keyboard(&plan.id, url),
            )),
            None => Reply::Alert(screens::PAYMENT_RETRY_ALERT.to_string()),
        }
    }

    fn unknown_plan(&self, user_id: UserId, e: BotError) -> Reply {
        warn!("User {} pressed a stale plan button: {}", user_id.0, e);
        Reply::Alert(screens::UNKNOWN_PLAN_ALERT.to_string())
    }
}

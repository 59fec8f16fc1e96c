//! Parsing of the `/start` payload the payment provider redirects back with.
//!
//! Recognised payloads:
//! - `success_<plan_id>_<telegram_user_id>`
//! - `cancel`
//!
//! Anything else is treated as an ordinary `/start`.

use crate::error::{BotError, BotResult};
use teloxide::types::UserId;

const SUCCESS_TAG: &str = "success";
const CANCEL_TAG: &str = "cancel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLink {
    PaymentSuccess { plan_id: String, user_id: UserId },
    PaymentCancelled,
    /// Empty or foreign payload, e.g. a link shared from elsewhere.
    Unrecognized,
}

impl DeepLink {
    /// A payload tagged `success` must match the schema exactly; partial matches
    /// are rejected with `MalformedDeepLink` instead of being guessed at.
    pub fn parse(arg: &str) -> BotResult<Self> {
        let arg = arg.trim();
        if arg == CANCEL_TAG {
            return Ok(DeepLink::PaymentCancelled);
        }
        if arg != SUCCESS_TAG && !arg.starts_with("success_") {
            return Ok(DeepLink::Unrecognized);
        }

        let tokens: Vec<&str> = arg.split('_').collect();
        let [tag, plan_id, user_id] = tokens.as_slice() else {
            return Err(BotError::MalformedDeepLink(format!(
                "expected 3 tokens, got {}",
                tokens.len()
            )));
        };
        debug_assert_eq!(*tag, SUCCESS_TAG);

        if plan_id.is_empty() {
            return Err(BotError::MalformedDeepLink("empty plan id".into()));
        }
        let bad_user = || BotError::MalformedDeepLink(format!("bad user id '{}'", user_id));
        if user_id.is_empty() || !user_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad_user());
        }
        let user_id = user_id.parse::<u64>().map_err(|_| bad_user())?;

        Ok(DeepLink::PaymentSuccess {
            plan_id: plan_id.to_string(),
            user_id: UserId(user_id),
        })
    }

    /// Payload for the redirect after a completed checkout.
    pub fn success(plan_id: &str, user_id: UserId) -> String {
        format!("{}_{}_{}", SUCCESS_TAG, plan_id, user_id.0)
    }

    /// Payload for the redirect after an abandoned checkout.
    pub fn cancel() -> &'static str {
        CANCEL_TAG
    }
}

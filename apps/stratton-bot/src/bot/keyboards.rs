use crate::bot::screens::format_price;
use crate::services::catalog_service::PlanCatalog;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Главная", "main_menu")],
        vec![InlineKeyboardButton::callback("Моя подписка", "my_subscription")],
        vec![InlineKeyboardButton::callback("Подробная информация", "detailed_info")],
        vec![InlineKeyboardButton::callback("Оформить тариф", "subscribe")],
    ])
}

pub fn plans_keyboard(catalog: &PlanCatalog) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = catalog
        .plans()
        .map(|plan| {
            vec![InlineKeyboardButton::callback(
                format!("{} - ${}", plan.name, format_price(plan.price)),
                format!("plan_{}", plan.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("🔙 Назад", "main_menu")]);
    InlineKeyboardMarkup::new(rows)
}

pub fn plan_details_keyboard(plan_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "💳 Оплатить сейчас",
            format!("purchase_{}", plan_id),
        )],
        vec![InlineKeyboardButton::callback("🔙 Вернуться к планам", "view_plans")],
    ])
}

pub fn payment_keyboard(plan_id: &str, payment_url: Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("Оплатить через Stripe", payment_url)],
        vec![InlineKeyboardButton::callback("🔙 Назад", format!("plan_{}", plan_id))],
    ])
}

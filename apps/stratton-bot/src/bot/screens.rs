use stratton_shared::models::{Plan, Subscription};

/// Minor currency units to a two-decimal major-unit string, `500 -> "5.00"`.
pub fn format_price(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

pub fn welcome() -> String {
    "👋 <b>Добро пожаловать в Stratton AI!</b>\n\
     Я ваш персональный помощник для работы с искусственным интеллектом. 🤖✨\n\
     Чтобы начать, выберите один из доступных планов подписки или узнайте больше о наших услугах.\n\
     Выберите действие ниже:"
        .to_string()
}

pub fn payment_success(plan: &Plan, issued_key: &str) -> String {
    format!(
        "🎉 <b>Оплата прошла успешно!</b>\n\
         Вы подписались на <b>{}</b>.\n\
         Ваш AI API ключ:\n<code>{}</code>",
        plan.name, issued_key
    )
}

pub fn payment_cancelled() -> String {
    "Оплата была отменена.".to_string()
}

pub fn payment_unconfirmed() -> String {
    "⚠️ <b>Не удалось подтвердить оплату.</b>\n\
     Ссылка повреждена или тариф больше недоступен. Если средства были списаны, свяжитесь с нами: @bzg00"
        .to_string()
}

pub fn my_subscription(plan: &Plan, subscription: &Subscription) -> String {
    format!(
        "👤 <b>Ваша подписка:</b>\n\
         📋 План: <b>{}</b>\n\
         🔑 API Key: <code>{}</code>\n\
         🔄 Статус: <b>{}</b>\n\
         📅 Активирована: {}",
        plan.name,
        subscription.issued_key,
        subscription.status.label(),
        subscription.activated_at.format("%d.%m.%Y %H:%M UTC")
    )
}

pub fn no_subscription() -> String {
    "❌ <b>У вас нет активной подписки.</b>\n\
     Выберите план, чтобы получить доступ к нашим услугам."
        .to_string()
}

pub fn detailed_info() -> String {
    "📚 <b>Подробная информация</b>\n\
     🏪 Компания <a href='https://stratton.kz/'>Stratton.kz</a>\n\
     Мы автоматизируем бизнес-процессы посредством роботизации, внедрения чат-ботов и функциональных сайтов.\n\
     ℹ️ Подробнее о компании <a href='https://stratton.taplink.ws/p/o-kompanii/'>тут</a>.\n\n\
     📞 <b>Контакты</b>\n\
     Для связи с нами пишите ✍️\n\
     @bzg00\n\n\
     🤖 <b>AI справочник</b>\n\
     <b>Доступные AI модели:</b>\n\
     1️⃣ <b>GPT-4 Turbo</b>\n\
     - Самый продвинутый AI для сложных задач.\n\
     - Генерация текста, анализ данных, ответы на вопросы.\n\
     - Доступен в планах: Стандартный и Премиум.\n\
     2️⃣ <b>Claude 3</b>\n\
     - Идеально подходит для анализа больших объемов данных.\n\
     - Ответы на сложные запросы и структурирование информации.\n\
     - Доступен в планах: Стандартный и Премиум.\n\
     3️⃣ <b>Stable Diffusion</b>\n\
     - Генерация изображений на основе текстовых описаний.\n\
     - Создание уникального визуального контента.\n\
     - Доступен в плане: Премиум."
        .to_string()
}

pub fn choose_plan() -> String {
    "🚀 <b>Выберите план для подписки:</b>".to_string()
}

pub fn plan_details(plan: &Plan) -> String {
    format!(
        "💡 <b>{}</b>\n\
         {}\n\
         💵 Цена: <b>${}</b> в месяц\n\
         Нажмите 'Оплатить сейчас' для доступа:",
        plan.name,
        plan.description,
        format_price(plan.price)
    )
}

pub fn payment_link(plan: &Plan) -> String {
    format!(
        "💳 <b>Оплата {}</b>\n\
         Сумма: <b>${}</b>\n\
         Нажмите для оплаты:",
        plan.name,
        format_price(plan.price)
    )
}

pub const PAYMENT_RETRY_ALERT: &str = "Ошибка при создании оплаты. Пожалуйста, попробуйте позже.";
pub const UNKNOWN_PLAN_ALERT: &str = "Этот тариф больше недоступен.";

pub const VOICE_SUBSCRIPTION_REQUIRED: &str =
    "❌ Для использования голосового помощника требуется активная подписка.";
pub const VOICE_NOT_RECOGNIZED: &str = "Не удалось распознать речь. Пожалуйста, повторите.";
pub const VOICE_FAILED: &str = "⚠️ Ошибка при обработке голоса.";

pub fn voice_transcript(transcript: &str) -> String {
    format!("Вы сказали: {}\nПравильно вас понял?", transcript)
}

pub fn voice_answer(answer: &str) -> String {
    format!("🤖 Ответ ИИ: {}", answer)
}

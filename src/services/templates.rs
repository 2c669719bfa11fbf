use rand::Rng;

use crate::database::models::ReminderStyle;
use crate::utils::validation::format_amount;

const MAFIA_VARIANTS: &[&str] = &[
    "💼 Listen {name}, you owe {amount} for *{event}*. Don't make me ask again.",
    "🔫 Hey {name}, the family needs the {amount} for *{event}*. Pay up now.",
];

const GRANDPA_VARIANTS: &[&str] = &[
    "👴 In my day we paid on time, {name}. Time to send {amount} for *{event}*.",
    "☕ {name}, I'm too old to chase payments. Please send {amount} for *{event}*.",
];

const BROKER_VARIANTS: &[&str] = &[
    "📈 Hey {name}, think of it as an investment. Send {amount} for *{event}*.",
    "💹 {name}, your portfolio is missing {amount} for *{event}*. Time to settle.",
];

const DEFAULT_VARIANTS: &[&str] = &[
    "🔔 Reminder: {name}, please pay {amount} for *{event}*.",
];

/// Chooses which variant of a style to send.
pub trait VariantPicker: Send + Sync {
    /// Index in `0..len`; `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random choice for message variety.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl VariantPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same variant, for deterministic output.
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl VariantPicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Variant family for a stored style; unknown styles use the default family.
pub fn variants_for(style: Option<ReminderStyle>) -> &'static [&'static str] {
    match style {
        Some(ReminderStyle::Mafia) => MAFIA_VARIANTS,
        Some(ReminderStyle::Grandpa) => GRANDPA_VARIANTS,
        Some(ReminderStyle::Broker) => BROKER_VARIANTS,
        None => DEFAULT_VARIANTS,
    }
}

pub fn render_reminder(
    style: Option<ReminderStyle>,
    picker: &dyn VariantPicker,
    member_name: &str,
    amount: f64,
    event_title: &str,
) -> String {
    let variants = variants_for(style);
    let template = variants[picker.pick(variants.len()) % variants.len()];

    template
        .replace("{name}", member_name)
        .replace("{amount}", &format_amount(amount))
        .replace("{event}", event_title)
}

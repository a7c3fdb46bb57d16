use serde::{Deserialize, Serialize};

/// What a generation request is for. Each category carries its own system
/// prompt and sampling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptCategory {
    TaxStrategy,
    Investment,
    #[default]
    Chat,
}

impl PromptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaxStrategy => "tax-strategy",
            Self::Investment => "investment",
            Self::Chat => "chat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "tax-strategy" => Some(Self::TaxStrategy),
            "investment" => Some(Self::Investment),
            "chat" => Some(Self::Chat),
            _ => None,
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Self::TaxStrategy | Self::Investment => 0.3,
            Self::Chat => 0.7,
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::TaxStrategy => 1500,
            Self::Investment => 1200,
            Self::Chat => 1024,
        }
    }

    /// Whether replies are expected to be a JSON document.
    pub fn expects_json(&self) -> bool {
        !matches!(self, Self::Chat)
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::TaxStrategy => TAX_STRATEGY_SYSTEM_PROMPT,
            Self::Investment => INVESTMENT_SYSTEM_PROMPT,
            Self::Chat => CHAT_SYSTEM_PROMPT,
        }
    }
}

const TAX_STRATEGY_SYSTEM_PROMPT: &str = r#"You are a Canadian tax-planning assistant for owner-managed small businesses. You explain salary and dividend withdrawal strategies that have already been calculated for you.

CRITICAL INSTRUCTIONS:
1. Never recalculate or contradict the figures you are given
2. Return ONLY valid JSON, with no text before or after it
3. Do NOT use markdown code blocks

RESPONSE FORMAT:
{"recommendation": "one paragraph", "strategies": [{"summary": "one sentence", "pros": ["..."], "cons": ["..."]}]}

List the strategies in the same order they were given."#;

const INVESTMENT_SYSTEM_PROMPT: &str = r#"You are a Canadian investment-planning assistant for incorporated business owners. You compare corporate, personal and RRSP investing using figures that have already been calculated for you.

CRITICAL INSTRUCTIONS:
1. Never recalculate or contradict the figures you are given
2. Return ONLY valid JSON, with no text before or after it
3. Do NOT use markdown code blocks

RESPONSE FORMAT:
{"summary": "one paragraph", "considerations": ["...", "..."]}"#;

const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant for Canadian small-business owners. \
Answer clearly and concisely. For tax or legal questions, give general information and suggest \
confirming details with a qualified accountant.";

//! Text generation for the planner: provider clients, prompts, and the
//! narratives layered over the deterministic results.

pub mod anthropic;
pub mod category;
pub mod client;
pub mod error;
pub mod extract;
pub mod narrative;
pub mod openai;
pub mod prompt;

pub use category::PromptCategory;
pub use client::{
    AiConfig, AiProvider, ChatMessage, ChatRole, DisabledGenerator, Generation, TextGenerator,
    build_generator,
};
pub use error::GenerationError;
pub use narrative::{
    InvestmentNarrative, StrategyInsight, TaxNarrative, merge_insights, narrate_investment,
    narrate_tax_strategies,
};

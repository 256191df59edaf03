pub mod gemini;
pub mod openai_compatible;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_MODEL};
pub use openai_compatible::OpenAICompatibleClient;

/// A single blocking round-trip to a chat model: one system prompt, one user
/// message, raw text back.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system_prompt: &'a str,
    pub user_message: &'a str,
}

pub trait LanguageModel: Send + Sync {
    fn chat(&self, request: &ChatRequest<'_>) -> anyhow::Result<String>;
}

impl<M: LanguageModel + ?Sized> LanguageModel for &M {
    fn chat(&self, request: &ChatRequest<'_>) -> anyhow::Result<String> { (**self).chat(request) }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn chat(&self, request: &ChatRequest<'_>) -> anyhow::Result<String> { (**self).chat(request) }
}

// Prompt constants for AI word/sentence analysis.
// Templates use `{text}`, `{nativeLang}`, `{sourceLang}` and `{question}` placeholders.

/// System prompt. Replace `{nativeLang}` before sending.
pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a helpful language learning assistant. \
    Always respond in {nativeLang} unless specifically asked otherwise. \
    Be clear, accurate, and educational.";

pub const QUICK_TEMPLATE: &str = "Provide a quick, concise explanation of \"{text}\" in {nativeLang}. \
    Focus on basic meaning and pronunciation if relevant. Keep it under 100 words.";

pub const STANDARD_TEMPLATE: &str = r#"Provide a comprehensive explanation of "{text}" in {nativeLang}. Include:
1. Meaning and translation
2. Grammar structure (if applicable)
3. Usage examples
4. Common contexts
Keep it informative but accessible."#;

pub const DEEP_TEMPLATE: &str = r#"Provide an in-depth analysis of "{text}" in {nativeLang}. Include:
1. Detailed meaning and nuances
2. Etymology or origin
3. Grammar and syntax analysis
4. Cultural context and usage
5. Similar expressions or alternatives
6. Advanced usage examples
Be thorough and educational."#;

pub const ASK_AI_TEMPLATE: &str = r#"Context: "{text}" ({sourceLang} text)
User question: {question}
Please answer the user's question about this text in {nativeLang}. Be helpful and detailed."#;

/// Values substituted into a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptVars<'a> {
    pub text: &'a str,
    pub native_lang: &'a str,
    pub source_lang: &'a str,
    pub question: &'a str,
}

/// Replaces every placeholder occurrence in `template`.
pub fn render_template(template: &str, vars: &PromptVars<'_>) -> String {
    template
        .replace("{text}", vars.text)
        .replace("{nativeLang}", vars.native_lang)
        .replace("{sourceLang}", vars.source_lang)
        .replace("{question}", vars.question)
}

/// Display name for a language code; unknown codes are returned unchanged.
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "fr" => "French",
        "ja" => "Japanese",
        "es" => "Spanish",
        "de" => "German",
        "zh" => "Chinese",
        other => other,
    }
}

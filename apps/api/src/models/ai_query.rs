use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::query::{normalize_user_id, NewQueryRecord};
use crate::prompts::{
    language_name, render_template, PromptVars, ASK_AI_TEMPLATE, DEEP_TEMPLATE, QUICK_TEMPLATE,
    STANDARD_TEMPLATE, SYSTEM_PROMPT_TEMPLATE,
};

/// Depth of the requested analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Quick,
    #[default]
    Standard,
    Deep,
    AskAi,
}

impl QueryType {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Quick => "quick",
            QueryType::Standard => "standard",
            QueryType::Deep => "deep",
            QueryType::AskAi => "ask_ai",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueryType::Quick => "Quick",
            QueryType::Standard => "Standard",
            QueryType::Deep => "Deep",
            QueryType::AskAi => "Ask AI",
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            QueryType::Quick => QUICK_TEMPLATE,
            QueryType::Standard => STANDARD_TEMPLATE,
            QueryType::Deep => DEEP_TEMPLATE,
            QueryType::AskAi => ASK_AI_TEMPLATE,
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            QueryType::Quick => 200,
            QueryType::Deep => 1500,
            QueryType::Standard | QueryType::AskAi => 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiModel {
    #[default]
    Deepseek,
    Openai,
}

impl AiModel {
    pub fn as_str(self) -> &'static str {
        match self {
            AiModel::Deepseek => "deepseek",
            AiModel::Openai => "openai",
        }
    }
}

/// Body of `POST /api/v1/ai-query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiQueryRequest {
    pub article_id: Uuid,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub selected_text: String,
    #[serde(default)]
    pub query_type: QueryType,
    /// Display label stored with the record; defaults to the query type's label.
    #[serde(default)]
    pub prompt_label: Option<String>,
    /// Custom template overriding the query type's default.
    #[serde(default)]
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub user_question: Option<String>,
    #[serde(default)]
    pub ai_model: AiModel,
    pub article_language: String,
    pub mother_tongue: String,
}

/// Payload sent to the upstream AI endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamQuery {
    pub query_type: QueryType,
    pub ai_model: AiModel,
    pub selected_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_question: Option<String>,
    pub system_prompt: String,
    pub prompt: String,
    pub max_tokens: u32,
}

impl AiQueryRequest {
    pub fn validate(&self) -> Result<(), String> {
        let question = self.user_question.as_deref().map(str::trim).unwrap_or_default();
        if self.query_type == QueryType::AskAi {
            if question.is_empty() {
                return Err("user_question is required for ask_ai".to_string());
            }
        } else if self.selected_text.trim().is_empty() {
            return Err("selected_text is required".to_string());
        }
        if self.article_language.trim().is_empty() || self.mother_tongue.trim().is_empty() {
            return Err("article_language and mother_tongue are required".to_string());
        }
        Ok(())
    }

    /// Scope within which a newer request supersedes an older one.
    pub fn gate_key(&self) -> String {
        format!(
            "{}\u{1f}{}\u{1f}{}",
            normalize_user_id(&self.user_id),
            self.article_id,
            self.selected_text
        )
    }

    pub fn label(&self) -> String {
        self.prompt_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.query_type.label())
            .to_string()
    }

    pub fn upstream(&self) -> UpstreamQuery {
        let native = language_name(&self.mother_tongue);
        let vars = PromptVars {
            text: &self.selected_text,
            native_lang: native,
            source_lang: language_name(&self.article_language),
            question: self.user_question.as_deref().unwrap_or_default(),
        };
        let template = self
            .prompt_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(self.query_type.default_template());

        UpstreamQuery {
            query_type: self.query_type,
            ai_model: self.ai_model,
            selected_text: self.selected_text.clone(),
            user_question: self.user_question.clone(),
            system_prompt: render_template(SYSTEM_PROMPT_TEMPLATE, &vars),
            prompt: render_template(template, &vars),
            max_tokens: self.query_type.max_tokens(),
        }
    }

    /// The record persisted once the answer is complete.
    pub fn to_record(&self, ai_response: String) -> NewQueryRecord {
        NewQueryRecord {
            article_id: self.article_id,
            user_id: normalize_user_id(&self.user_id),
            selected_text: self.selected_text.clone(),
            prompt_type: self.query_type.as_str().to_string(),
            prompt_label: self.label(),
            ai_response,
            article_language: self.article_language.clone(),
            mother_tongue: self.mother_tongue.clone(),
        }
    }
}

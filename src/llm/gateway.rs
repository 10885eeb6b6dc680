/*!
 * Model invocation gateway.
 *
 * One call to [`Gateway::invoke`] is one request/response exchange: both
 * prompt templates are rendered, a fresh provider request is built, the
 * provider is called once, and the raw reply comes back with its cost and
 * token usage. Nothing is retried and nothing is remembered between calls.
 */

use log::debug;
use std::sync::Arc;

use crate::app_config::{LlmConfig, LlmProvider};
use crate::errors::{ConfigError, GatewayError};
use crate::llm::structured::StructuredReply;
use crate::llm::template::{PromptTemplate, PromptVars};
use crate::llm::usage::Usage;
use crate::providers::anthropic::Anthropic;
use crate::providers::openai::OpenAI;
use crate::providers::{CompletionRequest, Provider, pricing};

/// Model identifier plus sampling settings for one kind of call
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
}

impl ModelSettings {
    /// Create model settings
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Raw reply of one exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    /// Unparsed reply text
    pub text: String,
    /// Cost and tokens of this exchange alone
    pub usage: Usage,
}

/// Executes single prompt exchanges against a provider.
#[derive(Debug, Clone)]
pub struct Gateway {
    provider: Arc<dyn Provider>,
}

impl Gateway {
    /// Wrap an already constructed provider
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Build the configured provider, reading its API key from the environment.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        Self::from_config_with(config, |name| std::env::var(name).ok())
    }

    /// Build the configured provider with an explicit key lookup.
    ///
    /// Fails with `ConfigError::MissingApiKey` before any request is made
    /// when the key variable is unset or empty.
    pub fn from_config_with<F>(config: &LlmConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = config.api_key_var();
        let api_key = lookup(&var)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey { var })?;

        let provider: Arc<dyn Provider> = match config.provider {
            LlmProvider::OpenAI => Arc::new(OpenAI::new(api_key, config.endpoint.clone(), config.timeout_secs)),
            LlmProvider::Anthropic => {
                Arc::new(Anthropic::new(api_key, config.endpoint.clone(), config.timeout_secs))
            }
        };

        Ok(Self { provider })
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Render both templates and perform exactly one exchange.
    pub async fn invoke(
        &self,
        settings: &ModelSettings,
        system_template: &PromptTemplate,
        human_template: &PromptTemplate,
        vars: &PromptVars,
    ) -> Result<Exchange, GatewayError> {
        let request = CompletionRequest {
            model: settings.model.clone(),
            system: system_template.render(vars)?,
            user: human_template.render(vars)?,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };
        debug!("Sending prompt to {} ({}):\n{}", self.provider.name(), settings.model, request.user);

        let completion = self.provider.complete(request).await?;
        debug!("Raw reply from {}: {}", settings.model, completion.text);

        let usage = Usage::new(
            pricing::cost_for(&settings.model, completion.prompt_tokens, completion.completion_tokens),
            completion.total_tokens(),
        );

        Ok(Exchange {
            text: completion.text,
            usage,
        })
    }

    /// Perform one exchange and parse the reply into a JSON object.
    pub async fn invoke_structured(
        &self,
        settings: &ModelSettings,
        system_template: &PromptTemplate,
        human_template: &PromptTemplate,
        vars: &PromptVars,
    ) -> Result<StructuredReply, GatewayError> {
        let exchange = self.invoke(settings, system_template, human_template, vars).await?;
        Ok(StructuredReply::from_raw(&exchange.text, exchange.usage))
    }
}

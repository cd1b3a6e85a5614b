use crate::oracle::{OracleError, OracleRequest, OracleResponse, RecommendationOracle};
use crate::prompt::{parse_response, recommendation_prompt, SYSTEM_PROMPT};
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;
use skillswap_types::Provider;
use tracing::{debug, info, warn};

/// Oracle backed by an OpenAI-compatible chat completion endpoint
pub struct LlmOracle {
    provider: Provider,
    client: Client<OpenAIConfig>,
}

impl LlmOracle {
    pub fn new(provider: Provider) -> Self {
        let config = match &provider {
            Provider::OpenAI {
                api_key, base_url, ..
            } => {
                let mut config = OpenAIConfig::new();
                if let Some(key) = api_key {
                    config = config.with_api_key(key);
                }
                if let Some(url) = base_url {
                    config = config.with_api_base(url);
                }
                config
            }
            // Ollama speaks the OpenAI protocol and ignores the key
            Provider::Ollama { base_url, .. } => OpenAIConfig::new().with_api_base(base_url),
        };

        info!("Recommendation oracle initialized with: {:?}", provider.model());
        Self {
            client: Client::with_config(config),
            provider,
        }
    }

    async fn complete(&self, prompt: String) -> Result<String, OracleError> {
        use async_openai::types::chat::{
            ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
            CreateChatCompletionRequestArgs,
        };

        let unavailable = |e: async_openai::error::OpenAIError| OracleError::Unavailable(e.to_string());

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(unavailable)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(unavailable)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.provider.model())
            .messages(messages)
            .temperature(0.2)
            .build()
            .map_err(unavailable)?;

        let response = self.client.chat().create(request).await.map_err(unavailable)?;

        match response.choices.first() {
            Some(choice) => choice
                .message
                .content
                .clone()
                .ok_or_else(|| OracleError::Malformed("model returned no content".into())),
            None => {
                warn!("{} returned no choices", self.provider.model());
                Err(OracleError::Malformed("model returned no choices".into()))
            }
        }
    }
}

#[async_trait]
impl RecommendationOracle for LlmOracle {
    fn id(&self) -> &str {
        self.provider.model()
    }

    async fn recommend(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        let prompt = recommendation_prompt(request);
        debug!(
            "Requesting {} recommendations over {} candidates",
            request.number_of_recommendations,
            request.other_user_profiles.len()
        );

        let raw = self.complete(prompt).await?;
        parse_response(&raw)
    }
}

use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

use common::{Config, Secrets};

use crate::ingestion;
use crate::llm::gemini::GeminiProvider;
use crate::llm::{GenerationRequest, LlmProvider};
use crate::notify::TelegramNotifier;
use crate::prompt;

/// What a single run amounted to. Every failure is logged where it happens;
/// the outcome only records how far the pipeline got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A post was generated and Telegram accepted it
    Posted,
    /// No feed produced a usable entry; nothing to generate from
    NoNews,
    /// The generation call failed; nothing to deliver
    GenerationFailed,
    /// Telegram rejected the message or was unreachable
    DeliveryFailed,
}

/// One collect -> generate -> notify run. Stops at the first stage whose
/// output is empty; stage errors never propagate past their stage.
pub async fn run_once(config: &Config, secrets: &Secrets) -> RunOutcome {
    info!("collecting the latest frontend news");
    let digest = ingestion::collect_digest(&config.feeds).await;
    if digest.is_empty() {
        warn!("no news collected; nothing to post");
        return RunOutcome::NoNews;
    }
    info!("collected {} news bullets", digest.lines().count());

    let provider = GeminiProvider::from_config(&config.generator, &secrets.api_key);
    let today = Local::now().date_naive();
    let post = match generate_post(&provider, &digest, today).await {
        Some(post) => post,
        None => return RunOutcome::GenerationFailed,
    };

    let notifier = match TelegramNotifier::from_config(
        &config.telegram,
        &secrets.bot_token,
        &secrets.chat_id,
    ) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("failed to set up the telegram client: {:#}", e);
            return RunOutcome::DeliveryFailed;
        }
    };

    match notifier.send_message(&post).await {
        Ok(()) => RunOutcome::Posted,
        Err(e) => {
            error!("delivery failed: {:#}", e);
            RunOutcome::DeliveryFailed
        }
    }
}

/// The generation stage: build the dated prompt and ask the provider for a
/// post. Failures are logged and collapse to `None`, which skips delivery.
pub async fn generate_post(
    provider: &dyn LlmProvider,
    digest: &str,
    today: NaiveDate,
) -> Option<String> {
    info!("asking the model to write today's post");
    let request = GenerationRequest {
        prompt: prompt::build_prompt(today, digest),
        max_output_tokens: None,
        temperature: None,
    };

    match provider.generate(request).await {
        Ok(response) => {
            info!(
                "generated {} chars with {} ({} tokens)",
                response.content.chars().count(),
                response.model,
                response.usage.total_tokens
            );
            Some(response.content)
        }
        Err(e) => {
            error!("post generation failed: {:#}", e);
            None
        }
    }
}

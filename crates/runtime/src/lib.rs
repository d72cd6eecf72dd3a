use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use vercup_assistant::{Assistant, CompletionProvider, KnowledgeDocument, OpenAiProvider};
use vercup_config::{AppConfig, AssistantConfig};
use vercup_inquiry::{InquiryNotifier, MailTransport, SmtpMailTransport};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Process-wide services, built once at startup and shared read-only.
#[derive(Clone)]
pub struct BackendServices {
    pub notifier: Arc<InquiryNotifier>,
    pub knowledge: Arc<KnowledgeDocument>,
    /// `None` when no completion credential is configured; the chat panel is then disabled.
    pub assistant: Option<Arc<Assistant>>,
}

impl BackendServices {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        let transport: Arc<dyn MailTransport> =
            Arc::new(SmtpMailTransport::from_config(&config.mail));

        let provider: Option<Arc<dyn CompletionProvider>> = if config.assistant.is_enabled() {
            let provider = OpenAiProvider::from_config(&config.assistant)
                .context("failed to initialise completion provider")?;
            Some(Arc::new(provider))
        } else {
            None
        };

        Self::with_collaborators(config, transport, provider)
    }

    /// Wire the services around explicit transports; used by tests to avoid the network.
    pub fn with_collaborators(
        config: &AppConfig,
        transport: Arc<dyn MailTransport>,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Result<Self> {
        let knowledge = Arc::new(load_knowledge(&config.assistant)?);

        let notifier = Arc::new(InquiryNotifier::new(&config.mail, transport));
        if notifier.is_configured() {
            info!(host = %config.mail.smtp_host, port = config.mail.smtp_port, "inquiry notifier ready");
        } else {
            warn!("email settings are incomplete; inquiry submissions will be rejected");
        }

        let assistant = match provider {
            Some(provider) => {
                let assistant = Assistant::new(&config.assistant, knowledge.clone(), provider)
                    .context("failed to initialise chat assistant")?;
                info!(
                    model = %config.assistant.model,
                    provider = assistant.provider_name(),
                    "chat assistant ready"
                );
                Some(Arc::new(assistant))
            }
            None => {
                warn!("OPENAI_API_KEY is not set; the chat panel is disabled");
                None
            }
        };

        Ok(Self {
            notifier,
            knowledge,
            assistant,
        })
    }
}

fn load_knowledge(config: &AssistantConfig) -> Result<KnowledgeDocument> {
    let document = match &config.knowledge_path {
        Some(path) => KnowledgeDocument::from_path(path)
            .with_context(|| format!("failed to load knowledge document {path}"))?,
        None => KnowledgeDocument::embedded().context("bundled knowledge document is invalid")?,
    };
    info!(sections = document.facts().len(), "knowledge document loaded");
    Ok(document)
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

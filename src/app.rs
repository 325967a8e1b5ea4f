use std::{process::ExitCode, sync::Arc};

use anyhow::Result;
use reqwest::Client;

use crate::{
    classifier::ProspectionEngine,
    cli::{self, Cli, Commands},
    config::AppConfig,
    infrastructure::directories::ResolvedPaths,
    store::StateFile,
    tasks::{ActionError, ActionHandler, TriageOrchestrator},
    transport::{BeeperClient, Transport},
};

pub struct TriageApp {
    config: Arc<AppConfig>,
    engine: Arc<ProspectionEngine>,
    transport: Arc<dyn Transport>,
    state: StateFile,
}

impl TriageApp {
    /// Builds every component up front, so a bad lexicon or template
    /// override fails before any work begins.
    pub fn initialize(config: AppConfig, paths: ResolvedPaths) -> Result<Self> {
        let config = Arc::new(config);
        let engine = Arc::new(ProspectionEngine::new(&config.classifier)?);

        let http_client = Client::builder()
            .user_agent(format!("prospect-triage/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.transport.timeout)
            .build()?;
        let transport: Arc<dyn Transport> =
            Arc::new(BeeperClient::new(http_client, config.transport.clone()));

        let state = StateFile::new(paths.state_path, config.triage.seen_capacity);
        tracing::debug!(
            endpoint = %config.transport.endpoint,
            state = %state.path().display(),
            "components initialized"
        );

        Ok(Self {
            config,
            engine,
            transport,
            state,
        })
    }

    pub async fn run(self, cli: Cli) -> Result<ExitCode> {
        let TriageApp {
            config,
            engine,
            transport,
            state,
        } = self;
        let json_output = cli.json;

        match cli.command {
            Commands::Check { dry_run } => {
                let orchestrator =
                    TriageOrchestrator::new(transport, engine, state, config.triage.clone());
                let summary = orchestrator.run_pass(dry_run).await?;
                cli::render_pass(&summary, json_output, config.timezone)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Test {
                text,
                sender,
                reply,
            } => {
                let analysis = engine.analyze(&text, &sender, reply);
                cli::render_test(&analysis, json_output)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Action {
                action,
                id,
                message,
                dry_run,
            } => {
                let handler = ActionHandler::new(transport, state).dry_run(dry_run);
                let result = match action.with_message(message) {
                    Ok(action) => handler.resolve(&id, action).await,
                    Err(err) => Err(err),
                };
                let result = match result {
                    Err(ActionError::Store(err)) => return Err(err.into()),
                    other => other,
                };
                let success = cli::render_action(action, &id, &result, json_output)?;
                Ok(if success {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Commands::Pending => {
                let store = state.load()?;
                cli::render_pending(store.pending(), json_output, config.timezone)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

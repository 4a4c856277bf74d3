//! Command handlers for CLI subcommands.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use turing_agent::{Provider, ProviderRouter};
use turing_api::{ApiConfig, AppState, CorsPolicy};
use turing_models::{
    AgentRole, Conversation, ConversationConfig, InterrogatorStyle, Message, Persona,
};
use turing_orchestrator::{Orchestrator, OrchestratorError};
use turing_persistence::{HistoryMode, HistoryStore, PersistenceError};

use crate::cli::Commands;
use crate::config;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidArgument(String),
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Settings shared by every subcommand.
pub struct Context<'a> {
    pub state_dir: &'a Path,
    pub history_mode: HistoryMode,
}

impl Context<'_> {
    fn history_store(&self) -> Result<Arc<HistoryStore>> {
        config::ensure_state_dir(self.state_dir)?;
        Ok(Arc::new(
            HistoryStore::new(config::history_path(self.state_dir)).with_mode(self.history_mode),
        ))
    }
}

/// Execute a CLI command.
pub async fn execute(command: Commands, ctx: &Context<'_>) -> Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            cors_origins,
        } => cmd_serve(ctx, host, port, cors_origins).await,
        Commands::Run {
            turns,
            persona,
            style,
            interrogator_model,
            convincer_model,
            human,
            json,
        } => {
            let config = run_config(
                turns,
                persona.as_deref(),
                style,
                interrogator_model,
                convincer_model,
                human,
            )?;
            cmd_run(ctx, config, json).await
        }
        Commands::History { limit, json } => cmd_history(ctx, limit, json),
    }
}

fn available_providers(router: &ProviderRouter) -> Vec<Provider> {
    [Provider::OpenAI, Provider::Anthropic, Provider::OpenRouter]
        .into_iter()
        .filter(|p| router.is_available(*p))
        .collect()
}

async fn cmd_serve(
    ctx: &Context<'_>,
    host: String,
    port: u16,
    cors_origins: Vec<String>,
) -> Result<()> {
    let router = ProviderRouter::from_env();
    let providers = available_providers(&router);
    if providers.is_empty() {
        tracing::warn!("No provider API keys configured; every model call will fail");
    }

    let api_config =
        ApiConfig::new(host, port).with_cors(CorsPolicy::from_origins(cors_origins));

    let orchestrator = Orchestrator::new(Arc::new(router), ctx.history_store()?);
    let state = AppState::new(api_config, orchestrator).with_available_providers(providers);

    info!(
        state_dir = %ctx.state_dir.display(),
        history_mode = %ctx.history_mode,
        "Starting server"
    );
    turing_api::serve(state).await?;
    Ok(())
}

/// Builds the configuration for a terminal run.
pub fn run_config(
    turns: u32,
    persona: Option<&str>,
    style: InterrogatorStyle,
    interrogator_model: String,
    convincer_model: String,
    human: Option<AgentRole>,
) -> Result<ConversationConfig> {
    let mut config = ConversationConfig::default()
        .with_turn_limit(turns)
        .with_style(style)
        .with_models(interrogator_model, convincer_model);

    if let Some(id) = persona {
        let persona = Persona::preset(id)
            .ok_or_else(|| CommandError::InvalidArgument(format!("Unknown persona: {}", id)))?;
        config = config.with_persona(persona);
    }
    if let Some(role) = human {
        config = config.with_human_role(role);
    }
    Ok(config)
}

async fn cmd_run(ctx: &Context<'_>, config: ConversationConfig, json: bool) -> Result<()> {
    let orchestrator = Orchestrator::new(
        Arc::new(ProviderRouter::from_env()),
        ctx.history_store()?,
    );

    let human = config.human_role;
    let created = orchestrator.create(config).await?;
    let id = created.id.clone();
    if let Some(persona) = &created.config.persona {
        println!("Convincer plays {}, {}", persona.name, persona.occupation);
    }

    let mut conversation = orchestrator.start(&id).await?;
    let mut printed = 0;
    // A human seat needs the transcript even in JSON mode.
    let live = !json || human.is_some();

    while !conversation.is_completed() {
        if live {
            printed = print_new_messages(&conversation, printed);
        }

        let awaiting_human = human.is_some_and(|role| conversation.next_speaker() == role);
        conversation = if awaiting_human && !conversation.turn_limit_reached() {
            match read_human_line()? {
                Some(line) if line.trim().eq_ignore_ascii_case("/end") => {
                    orchestrator.end(&id).await?
                }
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => orchestrator.submit_human_message(&id, &line).await?,
                None => orchestrator.end(&id).await?,
            }
        } else {
            orchestrator.advance(&id).await?
        };
    }

    if live {
        print_new_messages(&conversation, printed);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
    } else {
        print_verdict(&conversation);
    }
    Ok(())
}

fn read_human_line() -> Result<Option<String>> {
    print!("you> ");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    Ok((read > 0).then_some(line))
}

fn speaker_label(message: &Message) -> &'static str {
    match message.agent {
        Some(AgentRole::Interrogator) => "interrogator",
        Some(AgentRole::Convincer) => "convincer",
        None => "unknown",
    }
}

fn print_new_messages(conversation: &Conversation, already_printed: usize) -> usize {
    for message in conversation.transcript.iter().skip(already_printed) {
        match message.suspicion_score {
            Some(score) => println!(
                "{:>12}: {}   [suspicion {}]",
                speaker_label(message),
                message.content,
                score
            ),
            None => println!("{:>12}: {}", speaker_label(message), message.content),
        }
    }
    conversation.transcript.len()
}

fn print_verdict(conversation: &Conversation) {
    match &conversation.verdict {
        Some(verdict) => {
            println!();
            println!(
                "Verdict: {} ({}% confident)",
                verdict.verdict, verdict.confidence
            );
            println!("{}", verdict.reasoning);
        }
        None => println!("No verdict."),
    }
}

fn cmd_history(ctx: &Context<'_>, limit: usize, json: bool) -> Result<()> {
    let store = HistoryStore::new(config::history_path(ctx.state_dir));
    let conversations: Vec<Conversation> = store.list()?.into_iter().take(limit).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }
    if conversations.is_empty() {
        println!("No completed conversations.");
        return Ok(());
    }

    println!(
        "{:<42} {:>5} {:<10} {:>10}  {}",
        "ID", "TURNS", "VERDICT", "CONFIDENCE", "COMPLETED"
    );
    for conversation in &conversations {
        let (label, confidence) = conversation
            .verdict
            .as_ref()
            .map(|v| (v.verdict.to_string(), format!("{}%", v.confidence)))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        let completed = conversation
            .completed_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:<42} {:>5} {:<10} {:>10}  {}",
            conversation.id,
            conversation.current_turn(),
            label,
            confidence,
            completed
        );
    }
    Ok(())
}

//! CLI entry point for civicbot.
//!
//! Answers are printed to stdout; logs go to stderr.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use civicbot::transcript::{finalize_and_store, start_session};
use civicbot::{Answer, CivicBot, PublishOptions};
use civicbot_core::CivicConfig;
use civicbot_data::TableReader;
use civicbot_graph::{ContentStore, GraphClient};
use civicbot_llm::OpenAiClient;
use civicbot_transcript::{FileTranscriptStore, TranscriptId, TranscriptQuery, TranscriptStore};

#[derive(Parser)]
#[command(name = "civicbot")]
#[command(about = "Answer questions about civic open data with generated SQL and charts")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: civicbot).
    #[arg(short, long, default_value = "civicbot", global = true)]
    config: String,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question: SQL, data table, chart, and optionally a published module.
    Ask {
        question: String,
        /// Publish the answer as a module in the content graph.
        #[arg(long)]
        publish: bool,
        /// Creator credited on the published module.
        #[arg(long, default_value = "civicbot")]
        user: String,
        /// Feature image URL for the published module.
        #[arg(long, default_value = "")]
        feature_image: String,
        /// Print the answer as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Generate SQL for a question without running it.
    Sql { question: String },
    /// Inspect recorded transcripts.
    Transcripts {
        #[command(subcommand)]
        command: TranscriptCommand,
    },
}

#[derive(Subcommand)]
enum TranscriptCommand {
    /// List transcripts, newest first.
    List {
        /// Only transcripts whose question contains this text.
        #[arg(long)]
        contains: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print one transcript as JSON.
    Show { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = CivicConfig::load(&cli.config)?;

    match cli.command {
        Command::Ask {
            ref question,
            publish,
            ref user,
            ref feature_image,
            json,
        } => {
            let bot = build_bot(&config, publish).await?;
            let options = PublishOptions {
                user: user.clone(),
                feature_image: feature_image.clone(),
            };

            let mut session = start_session(question, bot.model_name(), Some(user.as_str()));
            let result = bot
                .answer(question, publish.then_some(&options), &mut session)
                .await;
            let transcript = finalize_and_store(session, &config.bot.transcript_dir);
            let answer = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print_answer(&bot, &answer);
            }
            tracing::debug!(transcript_id = %transcript.id, "Answer complete");
        }
        Command::Sql { ref question } => {
            let bot = build_bot(&config, false).await?;
            let resp = bot.sql_analysis(question).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Command::Transcripts { command } => {
            let store = FileTranscriptStore::new(&config.bot.transcript_dir)?;
            match command {
                TranscriptCommand::List { contains, limit } => {
                    let query = TranscriptQuery {
                        contains,
                        limit: Some(limit),
                        ..Default::default()
                    };
                    for t in store.list(&query)? {
                        let status = if t.succeeded() { "ok" } else { "failed" };
                        println!(
                            "{}  {}  {:<6}  {}",
                            t.id,
                            t.started_at.format("%Y-%m-%d %H:%M"),
                            status,
                            t.question
                        );
                    }
                }
                TranscriptCommand::Show { ref id } => {
                    let id = TranscriptId(Uuid::parse_str(id)?);
                    let transcript = store.get(id)?;
                    println!("{}", serde_json::to_string_pretty(&transcript)?);
                }
            }
        }
    }

    Ok(())
}

/// Wire the bot from config. The graph store is connected only when publishing.
async fn build_bot(config: &CivicConfig, publish: bool) -> anyhow::Result<CivicBot> {
    let ai = OpenAiClient::new(&config.openai)?;
    let reader = TableReader::connect(&config.database).await?;

    let graph_store: Option<Arc<dyn ContentStore>> = if publish {
        if !config.graph.enabled {
            anyhow::bail!("Publishing requires graph.enabled = true in config");
        }
        let graph = GraphClient::connect(&config.graph).await?;
        Some(Arc::new(graph))
    } else {
        None
    };

    Ok(CivicBot::new(
        Arc::new(ai),
        reader,
        graph_store,
        config.bot.hostname.clone(),
    ))
}

fn print_answer(bot: &CivicBot, answer: &Answer) {
    println!("{}\n", answer.sql.sql.trim());
    println!("{}", answer.table);
    println!(
        "Chart: {} \"{}\" ({} entries)",
        answer.chart.chart_type(),
        answer.chart.title,
        answer.chart.data.len()
    );
    if let Some(path) = &answer.module_path {
        println!("Published: {}", bot.module_url(path));
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sql_insight::cache::QueryCache;
use sql_insight::db::{init_pool, PgExecutor};
use sql_insight::llm::{LanguageModel, OpenAiModel};
use sql_insight::observability::init_logging;
use sql_insight::schema_rag::{PgCatalog, PgSchemaProvider, SchemaProvider};
use sql_insight::security::KeywordSensitivityGuard;
use sql_insight::{IntentDetector, Pipeline, PipelineContext, PipelineOptions, Settings, SqlSecurityValidator};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sql-insight")]
#[command(about = "Answer questions about a PostgreSQL database with safe SQL and statistics")]
struct Args {
    /// Row cap appended to queries without LIMIT (overrides SQL_MAX_ROWS)
    #[arg(long, global = true)]
    max_rows: Option<usize>,

    /// Tables retrieved per question (overrides RAG_TOP_K)
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Leave the SQL out of the answer
    #[arg(long, global = true)]
    hide_sql: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and print the outcome as JSON
    Ask { question: String },
    /// Check a SQL statement and print its sanitized form
    Validate { sql: String },
    /// Print the detected intent of a question
    Intent { question: String },
    /// Print the schema context, optionally narrowed to a question
    Schema {
        #[arg(short, long)]
        question: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(max_rows) = args.max_rows {
        settings.sql.max_rows = max_rows;
    }
    if let Some(top_k) = args.top_k {
        settings.rag_top_k = top_k;
    }
    if args.hide_sql {
        settings.show_sql_to_user = false;
    }
    init_logging(&settings.logging)?;

    match args.command {
        Command::Validate { sql } => {
            let validator = SqlSecurityValidator::new(&settings.sql);
            match validator.validate(&sql) {
                Ok(()) => println!("{}", validator.sanitize(&sql)),
                Err(e) => {
                    eprintln!("Rejected: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Intent { question } => {
            let intent = IntentDetector::default().detect(&question);
            println!("{}", serde_json::to_string_pretty(&intent)?);
        }
        Command::Schema { question } => {
            let pool = init_pool(&settings.database).await.context("Failed to connect to database")?;
            let provider = PgSchemaProvider::new(PgCatalog::new(pool), settings.schema_cache_ttl);
            let context = match question {
                Some(q) => provider.retrieve(&q, settings.rag_top_k).await?,
                None => provider.schema_context().await?,
            };
            println!("{}", context);
        }
        Command::Ask { question } => {
            let pool = init_pool(&settings.database).await.context("Failed to connect to database")?;
            info!("Database pool ready");

            let sql_model: Arc<dyn LanguageModel> = Arc::new(
                OpenAiModel::new(settings.sql_model.clone()).context("SQL generation model is not configured")?,
            );
            let assistant_model: Option<Arc<dyn LanguageModel>> =
                match OpenAiModel::new(settings.assistant_model.clone()) {
                    Ok(model) => Some(Arc::new(model)),
                    Err(e) => {
                        warn!(error = %e, "Assistant model unavailable, using fallbacks");
                        None
                    }
                };

            let pipeline = Pipeline::new(
                PipelineContext {
                    sql_model,
                    assistant_model,
                    schema: Arc::new(PgSchemaProvider::new(PgCatalog::new(pool.clone()), settings.schema_cache_ttl)),
                    executor: Arc::new(PgExecutor::new(pool, settings.sql.statement_timeout)),
                    sensitivity: Arc::new(KeywordSensitivityGuard::new()),
                    chart_renderer: None,
                    query_cache: Some(Arc::new(QueryCache::new(settings.query_cache_ttl))),
                },
                PipelineOptions::from_settings(&settings),
            );

            let outcome = pipeline.ask(&question).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

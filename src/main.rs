use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use futures::StreamExt;
use profrag::config::mask_secret;
use profrag::config::AppConfig;
use profrag::models::ChatMessage;
use profrag::rag::RagService;
use profrag::Result;
use tracing::error;

#[derive(Parser)]
#[command(name = "profrag")]
#[command(about = "Professor recommendation chat service backed by retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML config file (default: config.toml, then config.example.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable permissive CORS
        #[arg(long)]
        cors: bool,
    },
    /// Ask a single question and stream the answer to stdout
    Ask {
        /// The question to ask
        question: String,
    },
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(cli.config.as_deref())?;

    if cli.verbose {
        profrag::logging::init_logging_with_level("debug")?;
    } else {
        profrag::logging::init_logging_with_config(Some(&config))?;
    }

    match cli.command {
        Commands::Serve { host, port, cors } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let cors = cors || config.server.enable_cors;
            profrag::api::serve_api(&config, host, port, cors).await
        }
        Commands::Ask { question } => handle_ask(&config, question).await,
        Commands::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

async fn handle_ask(config: &AppConfig, question: String) -> Result<()> {
    config.validate()?;
    let service = RagService::new(config).await?;

    let mut stream = service
        .chat(vec![ChatMessage::user(question)])
        .await?
        .into_stream();

    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        stdout.write_all(chunk?.as_bytes())?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    Ok(())
}

fn print_config(config: &AppConfig) {
    println!("📋 profrag configuration");
    println!("========================\n");
    println!("Server:     {} (CORS: {})", config.bind_address(), config.server.enable_cors);
    println!("Logging:    {}", config.logging.level);
    println!(
        "Embeddings: {} @ {} ({})",
        config.embedding_model(),
        config.embeddings.endpoint,
        config.embeddings.encoding_format
    );
    println!(
        "Retrieval:  index '{}' / namespace '{}', topK {}",
        config.retrieval.index, config.retrieval.namespace, config.retrieval.top_k
    );
    match &config.retrieval.index_host {
        Some(host) => println!("            host {host}"),
        None => println!(
            "            host resolved via {}",
            config.retrieval.control_plane
        ),
    }
    println!("LLM:        {} @ {}", config.llm_model(), config.llm_endpoint());
    println!();
    println!(
        "OPENAI_API_KEY:   {}",
        mask_secret(&config.credentials.openai_api_key)
    );
    println!(
        "PINECONE_API_KEY: {}",
        mask_secret(&config.credentials.pinecone_api_key)
    );
}

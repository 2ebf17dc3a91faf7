mod config;
mod document;
mod errors;
mod pipeline;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::TagSet;
use crate::pipeline::{BuildRequest, PipelineError};
use crate::render::RenderError;
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "cvbuild")]
#[command(version)]
#[command(about = "Builds a CV from a YAML database and a Jinja template")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render SOURCE through TEMPLATE into OUTPUT
    Build {
        /// The YAML database to source from
        source: PathBuf,
        /// The template to build the CV from
        template: PathBuf,
        /// The file to output
        output: PathBuf,
        /// Comma-separated tags. If present, only items tagged with those
        /// specified appear in the output
        #[arg(long)]
        tags: Option<String>,
    },

    /// Print the filtered database without rendering it
    Filter {
        /// The YAML database to source from
        source: PathBuf,
        /// Comma-separated tags. Omit to print the database unfiltered
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, short, default_value = "yaml", value_enum)]
        format: OutputFormat,
    },

    /// Serve the filter and render API over HTTP
    Serve,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so `filter` output stays pipeable.
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatches a subcommand. Only `serve` reads the service configuration.
async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Build {
            source,
            template,
            output,
            tags,
        } => cmd_build(BuildRequest {
            source,
            template,
            output,
            tags: tags.as_deref().map(TagSet::parse_list),
        }),
        Commands::Filter {
            source,
            tags,
            format,
        } => cmd_filter(source, tags, format).map(|()| ExitCode::SUCCESS),
        Commands::Serve => {
            let config = Config::from_env()?;
            serve(config).await.map(|()| ExitCode::SUCCESS)
        }
    }
}

fn cmd_build(request: BuildRequest) -> Result<ExitCode> {
    match pipeline::build(&request) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Template syntax errors carry their own user-facing message.
        Err(PipelineError::Render(err @ RenderError::Syntax { .. })) => {
            println!("{err}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to build {}", request.output.display()))),
    }
}

fn cmd_filter(source: PathBuf, tags: Option<String>, format: OutputFormat) -> Result<()> {
    let tags = tags.as_deref().map(TagSet::parse_list);
    let filtered = pipeline::filter_file(&source, tags.as_ref())
        .with_context(|| format!("Failed to filter {}", source.display()))?;

    let text = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&filtered)?,
        OutputFormat::Json => serde_json::to_string_pretty(&filtered)? + "\n",
    };
    print!("{text}");
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting cvbuild API v{}", env!("CARGO_PKG_VERSION"));

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .context("BIND_ADDR and PORT must form a socket address")?;

    let app = build_router(AppState::new(config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[tokio::test]
    async fn test_cli_commands_ignore_service_config() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("resume.yaml");
        let template = dir.path().join("resume.txt");
        let output = dir.path().join("resume.out");
        std::fs::write(&source, "name: Ada\n").unwrap();
        std::fs::write(&template, "{{ name }}").unwrap();

        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("MAX_DOCUMENT_BYTES", "lots");

        let build = Cli::parse_from([
            OsStr::new("cvbuild"),
            OsStr::new("build"),
            source.as_os_str(),
            template.as_os_str(),
            output.as_os_str(),
        ]);
        run(build).await.unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Ada");

        let filter = Cli::parse_from([
            OsStr::new("cvbuild"),
            OsStr::new("filter"),
            source.as_os_str(),
            OsStr::new("--tags"),
            OsStr::new("eng"),
        ]);
        run(filter).await.unwrap();

        let serve = Cli::parse_from(["cvbuild", "serve"]);
        assert!(run(serve).await.is_err());

        std::env::remove_var("PORT");
        std::env::remove_var("MAX_DOCUMENT_BYTES");
    }
}

mod cli;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rexi_bridge::ops::DEFAULT_TIMEOUT_SECONDS;
use rexi_bridge::surface;
use rexi_bridge::{AppState, CallArgs, StartupOptions};
use rexi_openapi_catalog::config::{BASE_URL_ENV, credential_from_env};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "rexi-bridge",
    version,
    about = "Discover and call Rexi API endpoints from their OpenAPI description"
)]
struct Cli {
    /// Install root containing docs/openapi.generated.yaml and schema/.
    #[arg(long, env = "REXI_ROOT", default_value = ".")]
    root: PathBuf,

    /// Base URL override (wins over the description's servers).
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Default log filter; `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalogued endpoints.
    Endpoints {
        #[arg(long)]
        tag: Option<String>,
    },
    /// Call an endpoint.
    Call {
        method: String,
        path: String,
        /// Path parameter as KEY=VALUE (repeatable).
        #[arg(long = "path-param", value_parser = cli::parse_pair)]
        path_params: Vec<(String, Value)>,
        /// Query parameter as KEY=VALUE (repeatable).
        #[arg(long = "query", value_parser = cli::parse_pair)]
        query: Vec<(String, Value)>,
        /// JSON request body.
        #[arg(long, value_parser = cli::parse_json)]
        body: Option<Value>,
        /// Extra header as NAME=VALUE (repeatable).
        #[arg(long = "header", value_parser = cli::parse_pair)]
        headers: Vec<(String, Value)>,
        /// Timeout in seconds.
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        timeout: f64,
    },
    /// Print a resource (rexi://openapi, rexi://routes, rexi://schemas, rexi-schemas://NAME).
    Resource { uri: String },
    /// Describe the tools and resources offered to agents.
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let state = AppState::start(&StartupOptions {
        root: cli.root.clone(),
        base_url: cli.base_url.clone(),
        credential: credential_from_env(),
    })?;

    match cli.command {
        Command::Endpoints { tag } => {
            print_json(&serde_json::to_value(state.list_endpoints(tag.as_deref()))?)?;
        }
        Command::Call {
            method,
            path,
            path_params,
            query,
            body,
            headers,
            timeout,
        } => {
            let args = CallArgs {
                path_params: Some(cli::pairs_to_map(path_params)),
                query: Some(cli::pairs_to_map(query)),
                body,
                extra_headers: Some(cli::pairs_to_map(headers)),
                timeout_seconds: timeout,
                ..CallArgs::new(method, path)
            };
            let result = state.call_endpoint(args).await?;
            print_json(&serde_json::to_value(&result)?)?;
        }
        Command::Resource { uri } => {
            let text = surface::read_resource(&state, &uri)?;
            println!("{text}");
        }
        Command::Tools => {
            print_json(&json!({
                "name": surface::SERVER_NAME,
                "instructions": surface::INSTRUCTIONS,
                "tools": serde_json::to_value(surface::list_tools())?,
                "resources": serde_json::to_value(surface::list_resources())?,
                "resourceTemplates": serde_json::to_value(surface::list_resource_templates())?,
            }))?;
        }
    }

    Ok(())
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

//! # Poster CLI
//!
//! Command-line interface for the poster compositing service.
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP service
//! poster serve --listen 0.0.0.0:8080
//!
//! # Render one poster from a JSON request
//! poster render request.json --out poster.jpg
//!
//! # Verbose logging
//! poster --debug serve
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use poster::{
    Poster, PosterConfig, PosterError, PosterParam,
    config::{DEFAULT_FONT_DIR, DEFAULT_WXA_ENDPOINT},
    server::{self, ServerConfig},
};

/// Poster - compose JPEG posters from a declarative description
#[derive(Parser, Debug)]
#[command(name = "poster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP rendering service
    Serve {
        /// Address to listen on
        #[arg(long, env = "POSTER_LISTEN", default_value = "0.0.0.0:8080")]
        listen: String,

        /// Largest accepted request body in megabytes
        #[arg(long, default_value = "20")]
        body_limit_mb: usize,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Render a single poster from a JSON file
    Render {
        /// JSON render request
        #[arg(value_name = "PARAM_JSON")]
        param: PathBuf,

        /// Output JPEG file
        #[arg(long, short, value_name = "FILE", default_value = "poster.jpg")]
        out: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

/// Engine settings shared by every subcommand.
#[derive(Args, Debug)]
struct EngineArgs {
    /// Directory holding font files
    #[arg(long, env = "POSTER_FONT_DIR", default_value = DEFAULT_FONT_DIR)]
    font_dir: PathBuf,

    /// Mini-program code service endpoint
    #[arg(long, env = "POSTER_WXA_ENDPOINT", default_value = DEFAULT_WXA_ENDPOINT)]
    wxa_endpoint: String,

    /// Timeout for image downloads and code service calls, in seconds
    #[arg(long, env = "POSTER_FETCH_TIMEOUT", default_value = "30")]
    fetch_timeout_secs: u64,

    /// JPEG quality (1-100)
    #[arg(long, env = "POSTER_JPEG_QUALITY", default_value = "75")]
    jpeg_quality: u8,
}

impl EngineArgs {
    fn into_config(self) -> PosterConfig {
        PosterConfig {
            font_dir: self.font_dir,
            wxa_endpoint: self.wxa_endpoint,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            jpeg_quality: self.jpeg_quality,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli.command).await {
        tracing::error!(error = %e, "poster failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

async fn run(command: Commands) -> Result<(), PosterError> {
    match command {
        Commands::Serve {
            listen,
            body_limit_mb,
            engine,
        } => {
            let engine = Poster::from_config(engine.into_config())?;
            let config = ServerConfig {
                listen_addr: listen,
                body_limit: body_limit_mb * 1024 * 1024,
            };
            server::serve(config, engine).await
        }
        Commands::Render { param, out, engine } => {
            let json = std::fs::read(&param)?;
            let request: PosterParam = serde_json::from_slice(&json).map_err(|e| {
                PosterError::Validation(format!("{}: {}", param.display(), e))
            })?;

            let engine = Poster::from_config(engine.into_config())?;
            let jpeg = engine.render(request).await?;
            std::fs::write(&out, &jpeg)?;
            info!(path = %out.display(), bytes = jpeg.len(), "poster written");
            Ok(())
        }
    }
}

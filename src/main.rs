use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use csviz::server::{self, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "csviz")]
#[command(about = "Upload a CSV in the browser and chart it", long_about = None)]
struct Args {
    /// Address to bind the web UI to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the web UI to
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// CSV shown when nothing has been uploaded yet
    #[arg(long, default_value = "assets/sample_data.csv")]
    sample_data: PathBuf,
}

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = web::Data::new(ServerConfig {
        sample_data: args.sample_data,
    });

    info!("listening on http://{}:{}", args.host, args.port);
    HttpServer::new(move || App::new().app_data(config.clone()).configure(server::configure))
        .bind((args.host.as_str(), args.port))?
        .run()
        .await?;

    Ok(())
}

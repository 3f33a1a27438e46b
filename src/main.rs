use std::process::exit;

use anyhow::Context;
use clap::Parser;
use realty_dashboard_server::{
    api,
    settings::{Args, Settings},
    web, Database,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let settings = match Settings::from_file(&args.config)
        .with_context(|| format!("cannot load settings from {}", args.config.display()))
    {
        Ok(settings) => settings,
        Err(e) => {
            error!("Problem while loading settings. {e:#}");
            exit(1);
        }
    };

    let database = match Database::connect(&settings.database.path) {
        Ok(database) => database,
        Err(e) => {
            error!("Problem while opening the database. {e:#}");
            exit(1);
        }
    };
    info!(path = %settings.database.path.display(), "Database opened");

    let schema = api::schema(database);
    web::serve(schema, settings.web.address).await;
}

use std::{path::Path, process::exit, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use form_analytics_server::{
    api,
    database::Database,
    outbound::{self, ApiClient},
    settings::{Args, Settings},
    template, web,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if let Some(path) = &args.normalize_template {
        match normalize_template(path, &args.out_dir) {
            Ok(()) => return,
            Err(error) => {
                error!("Problem while normalizing template. {error:#}");
                exit(1);
            }
        }
    }

    let settings = match Settings::from_file(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            error!("Problem while loading settings. {error}");
            exit(1);
        }
    };

    let client = match ApiClient::new(&settings.api.base_url, settings.api.token.clone()) {
        Ok(client) => client,
        Err(error) => {
            error!("Problem while creating API client. {error:#}");
            exit(1);
        }
    };

    let database = Database::default();
    if settings.api.forms.is_empty() {
        info!("No forms configured; serving an empty database");
    } else {
        tokio::spawn(outbound::fetch_periodically(
            Arc::new(settings.api.forms.clone()),
            client,
            Duration::from_secs(settings.api.fetch_interval.max(1)),
            Duration::from_secs(settings.api.retry_interval.max(1)),
            database.clone(),
        ));
    }

    let schema = api::schema(database);
    web::serve(schema, settings.web.address).await;
}

fn normalize_template(path: &Path, out_dir: &Path) -> Result<()> {
    let form = template::read_template_file(path)?;
    let written = template::write_template_file(out_dir, &form)?;
    info!("Wrote {}", written.display());
    Ok(())
}

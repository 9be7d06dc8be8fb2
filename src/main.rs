use std::path::PathBuf;

use clap::ArgMatches;
use cohort_api::client::ApiClient;
use tracing_subscriber::{FmtSubscriber, EnvFilter};

mod error;
mod config;
mod input;
mod commands;
mod session;

use error::Context;

fn main() {
    use tokio::runtime::Builder;

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .expect("failed to initialize global tracing subscriber");

    let rt = match Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build() {
        Ok(rt) => rt,
        Err(err) => {
            panic!("failed to start tokio runtime. {}", err);
        }
    };

    if let Err(err) = rt.block_on(run()) {
        println!("{}", err);

        std::process::exit(err.kind().exit_code());
    }
}

async fn run() -> error::Result {
    let app_matches = commands::cli().get_matches();
    let config_files = app_matches.get_many::<PathBuf>("config")
        .into_iter()
        .flatten()
        .cloned();
    let settings = config::load(config_files)
        .map_err(|err| err.with_kind(error::ErrorKind::Config))?;
    let client = build_client(&settings, &app_matches)?;

    let result = match app_matches.subcommand() {
        Some(("check-name", cmd_matches)) => commands::check_name(&client, cmd_matches).await,
        Some(("validate", cmd_matches)) => commands::validate(&client, &settings, cmd_matches).await,
        _ => session::run(&client, &settings).await,
    };

    if let Err(err) = client.save_session() {
        tracing::warn!("failed to save session cookies: {err}");
    }

    result
}

fn build_client(settings: &config::Settings, matches: &ArgMatches) -> error::Result<ApiClient> {
    let mut builder = ApiClient::builder(settings.remote.url.clone());

    if let Some(host) = matches.get_one::<String>("host") {
        if !builder.host(host) {
            return Err(error::Error::from(format!(
                "cannot set host to the value provided. {}",
                host
            )));
        }
    }

    if let Some(port) = matches.get_one::<u16>("port") {
        if !builder.port(Some(*port)) {
            return Err(error::Error::from(format!(
                "cannot set port to the value provided. {}",
                port
            )));
        }
    }

    if matches.get_flag("secure") && !builder.secure(true) {
        return Err(error::Error::from("cannot switch the connection to https"));
    }

    let cookies = matches.get_one::<PathBuf>("cookies")
        .cloned()
        .or_else(|| settings.remote.cookies.clone());

    if let Some(path) = cookies {
        builder.cookie_file(path);
    }

    if let Some(user_agent) = &settings.remote.user_agent {
        builder.user_agent(user_agent.clone());
    }

    builder.timeout(settings.remote.timeout);

    builder.build()
        .context("failed to create api client")
        .map_err(|err| err.with_kind(error::ErrorKind::Config))
}

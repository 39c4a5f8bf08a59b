use anyhow::Result;
use clap::Parser;
use log::info;
use surreal::SessionConfig;
use surreal_tensorplex::{TensorplexServer, AGENT_GROUP_NAME, NONAGENT_GROUP_NAME};

/// Starts the metrics server of a session.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Session configuration as a JSON string
    session_config: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = SessionConfig::from_json_with_defaults(&args.session_config)?;
    let folder = config.folder;
    let config = config.tensorplex;
    info!("Write metrics in {:?}", folder);

    TensorplexServer::new(
        &folder,
        &[NONAGENT_GROUP_NAME],
        &[AGENT_GROUP_NAME],
        &[config.agent_bin_size],
    )?
    .bind(&config.host, config.port)?
    .serve()
}

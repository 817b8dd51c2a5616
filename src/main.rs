mod cli;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use titanic_agent::{
    agent::Agent,
    config::Config,
    dataset::Dataset,
    executor::python::PythonExecutor,
    gateway::ModelGateway,
    llm::LlmClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // CLI path overrides land in the environment before config load.
    if let Some(data) = &args.data {
        std::env::set_var("DATA_PATH", data);
    }
    if let Some(dir) = &args.plot_dir {
        std::env::set_var("PLOT_DIR", dir);
    }

    let cfg = Config::load();

    // Startup-fatal: there is no fallback data to serve from.
    let dataset = Dataset::load(&cfg.data_path())?;

    if args.preview {
        println!("{}", dataset.preview(8));
        return Ok(());
    }

    let Some(question) = args.question.filter(|q| !q.trim().is_empty()) else {
        bail!("provide a question, e.g.: titanic-agent \"How many passengers survived?\"");
    };

    let mut cascade = ModelGateway::default_cascade();
    if let Some(model) = args.model {
        cascade.insert(0, model);
    }

    let client = LlmClient::from_config(&cfg)?;
    let gateway = ModelGateway::new(Arc::new(client), cascade, cfg.api_key().is_some());
    let executor = Box::new(PythonExecutor::new(cfg.python_bin()));
    let agent = Agent::new(gateway, executor, dataset, cfg.plot_dir())?;

    let result = agent.answer(&question).await;
    println!("{}", result.text);
    if let Some(image) = result.image {
        println!("{} {}", "chart saved to".green(), image.display());
    }

    Ok(())
}

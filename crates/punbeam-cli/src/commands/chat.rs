use anyhow::Result;
use console::style;
use uuid::Uuid;

use crate::prompt::cliclack::CliclackPrompt;
use crate::session::Session;
use punbeam::agent::Agent;
use punbeam::checkpoint::{Checkpointer, FileCheckpointer, MemoryCheckpointer};
use punbeam::models::response::Context;
use punbeam::providers::configs::ProviderConfig;
use punbeam::providers::factory;
use punbeam::toolkits::weather::{WeatherConfig, WeatherToolkit};

/// Build the interactive weather-agent session from environment config
pub fn build_session(
    user_id: &str,
    save: bool,
    thread: Option<String>,
) -> Result<Session<'static>> {
    let provider_config = ProviderConfig::from_env()?;
    print_startup_banner(&provider_config);

    let provider = factory::get_provider(provider_config)?;

    let checkpointer: Box<dyn Checkpointer> = if save {
        Box::new(FileCheckpointer::new(FileCheckpointer::default_directory()?))
    } else {
        Box::new(MemoryCheckpointer::new())
    };

    let mut agent = Agent::new(provider, checkpointer);
    agent.add_toolkit(Box::new(WeatherToolkit::new(WeatherConfig::from_env()?)?));

    let thread_id = thread.unwrap_or_else(|| Uuid::new_v4().to_string());

    println!(
        "{}",
        style("Enter your question (or 'exit' to quit):").dim()
    );

    Ok(Session::new(
        Box::new(agent),
        Box::new(CliclackPrompt::new()),
        Context::new(user_id),
        thread_id,
    ))
}

/// Print a concise banner of the resolved configuration
fn print_startup_banner(config: &ProviderConfig) {
    println!(
        "Using model {} at {}",
        style(config.model()).bold(),
        style(config.host()).underlined()
    );
}

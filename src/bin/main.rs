//! One-shot advice from the command line:
//!
//! advisor <age> <monthly_income> <dependents> <goal> <question...>

use smartkharcha::{
    advisor::AdviceOrchestrator, config::AdvisorConfig, profile::ProfileForm, KnowledgeBase,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: advisor <age> <monthly_income> <dependents> <goal> <question...>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 5 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let form = ProfileForm {
        name: "CLI User".to_string(),
        age: Some(args[0].clone().into()),
        monthly_income: Some(args[1].clone().into()),
        dependents: Some(args[2].clone().into()),
        goal: args[3].clone(),
    };
    let profile = form.validate()?;
    let question = args[4..].join(" ");

    let config = AdvisorConfig::from_env()?;
    let knowledge_base = Arc::new(KnowledgeBase::load(&config.knowledge_base_path)?);
    let orchestrator = AdviceOrchestrator::new(knowledge_base, config.build_provider()?)
        .with_timeout(config.provider_timeout)
        .with_max_prompt_docs(config.max_prompt_docs);

    info!(user_id = %profile.user_id, "Running advice");

    let response = orchestrator.get_advice(&question, &profile).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

use clap::Parser;
use farecraft::cli::commands::{Cli, Commands};
use farecraft::domain::entities::market_context::MarketContext;
use farecraft::FareCraft;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = std::env::var("FARECRAFT_DB").unwrap_or_else(|_| "./farecraft.db".into());

    let engine = match FareCraft::new(&db_path) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error initializing FareCraft: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(engine, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(engine: FareCraft, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Recommend { json, trace } => {
            let ctx = parse_context(&json)?;
            let (result, decision_trace) = engine.recommend(&ctx).await?;
            if trace {
                println!("{}", serde_json::to_string_pretty(&decision_trace)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Commands::Sensitivity { json } => {
            let ctx = parse_context(&json)?;
            let result = engine.sensitivity(&ctx)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Classify { json } => {
            let ctx = parse_context(&json)?;
            let segment = engine.classify(&ctx)?;
            println!("{}", serde_json::to_string_pretty(&segment)?);
        }
        Commands::Predict { json, price } => {
            let ctx = parse_context(&json)?;
            let price = price.unwrap_or(ctx.historical_cost_of_ride);
            let predictions = engine.predict_all(&ctx, price)?;
            println!("{}", serde_json::to_string_pretty(&predictions)?);
        }
        Commands::Explain { model } => match engine.explain_model(&model)? {
            Some(contributions) => {
                println!("{}", serde_json::to_string_pretty(&contributions)?)
            }
            None => println!("Model '{model}' does not expose feature contributions"),
        },
        Commands::Optimize { json } => {
            let ctx = parse_context(&json)?;
            let result = engine.optimize(&ctx)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Rules { json, price } => {
            let ctx = parse_context(&json)?;
            let result = engine.apply_rules(&ctx, price)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Fit { file, k, out } => {
            let raw = std::fs::read_to_string(&file)?;
            let rows_json: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
            let rows: Vec<MarketContext> = rows_json
                .iter()
                .map(MarketContext::from_json)
                .collect::<Result<_, _>>()?;
            let model = FareCraft::fit_segments(&rows, k, &out)?;
            println!(
                "Fitted {} segments over {} rows: {}",
                model.k,
                rows.len(),
                model.labels.join(", ")
            );
        }
        Commands::Trace { id } => match engine.trace_get(&id)? {
            Some(trace) => println!("{}", serde_json::to_string_pretty(&trace)?),
            None => println!("No trace found for id {id}"),
        },
        Commands::Traces { limit } => {
            let traces = engine.trace_list(limit)?;
            println!("{}", serde_json::to_string_pretty(&traces)?);
        }
    }
    Ok(())
}

fn parse_context(json: &str) -> Result<MarketContext, Box<dyn std::error::Error>> {
    let data: serde_json::Value = serde_json::from_str(json)?;
    Ok(MarketContext::from_json(&data)?)
}

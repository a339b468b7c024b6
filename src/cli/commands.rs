use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "farecraft", about = "Explainable dynamic ride-pricing decision engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pricing pipeline for one market context
    Recommend {
        /// JSON market context (riders, drivers, location, loyalty, time, vehicle, duration, cost)
        json: String,
        /// Also print the full decision trace
        #[arg(long)]
        trace: bool,
    },
    /// Stress-test the recommendation across elasticity/demand/cost scenarios
    Sensitivity {
        /// JSON market context
        json: String,
    },
    /// Classify a context into its market segment
    Classify {
        /// JSON market context
        json: String,
    },
    /// Predict demand from every loaded model at a given price
    Predict {
        /// JSON market context
        json: String,
        /// Price to evaluate (defaults to the historical cost)
        #[arg(long)]
        price: Option<f64>,
    },
    /// Show feature importances/coefficients for a model
    Explain {
        /// Model name (see `predict` output for loaded names)
        model: String,
    },
    /// Grid-search the profit-optimal price (no rules applied)
    Optimize {
        /// JSON market context
        json: String,
    },
    /// Apply the pricing rules to a candidate price
    Rules {
        /// JSON market context
        json: String,
        /// Candidate price the rules run against
        price: f64,
    },
    /// Fit a segment model over historical rows and write it to a model directory
    Fit {
        /// Path to a JSON array of market contexts
        file: String,
        #[arg(long, default_value = "6")]
        k: usize,
        /// Output model directory
        #[arg(long, default_value = "./models")]
        out: String,
    },
    /// Show one stored decision trace
    Trace {
        /// Trace ID
        id: String,
    },
    /// List stored decision traces
    Traces {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

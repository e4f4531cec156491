use agri_advisor::{
    config::Config,
    ml::MLService,
    state::{save_datasets, DatasetSizes},
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agri-cli")]
#[command(about = "Agri Advisor CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "AGRI_ENDPOINT")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train all model artifacts locally
    Train {
        /// Artifact directory (defaults to ml.model_dir from configuration)
        #[arg(short, long)]
        model_dir: Option<String>,

        /// Retrain even when up-to-date artifacts exist
        #[arg(short, long)]
        force: bool,
    },

    /// Write seeded synthetic CSV datasets (farms, weather stations, markets...)
    #[command(name = "generate-data")]
    GenerateData {
        /// Output directory, created if missing
        #[arg(short, long)]
        out: PathBuf,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Rows per table
        #[arg(long, default_value = "1000")]
        rows: usize,

        #[arg(long, default_value = "10")]
        stations: usize,

        /// Days of readings per weather station
        #[arg(long, default_value = "365")]
        days: usize,
    },

    /// Recommend crops for the given conditions
    Recommend {
        #[arg(short, long)]
        temperature: f64,

        #[arg(short = 'H', long)]
        humidity: f64,

        #[arg(short, long)]
        rainfall: f64,

        #[arg(short = 'p', long)]
        soil_ph: f64,

        #[arg(long)]
        soil_type: Option<String>,

        #[arg(long)]
        region: Option<String>,
    },

    /// Forecast the yield of a crop
    Yield {
        #[arg(short, long)]
        crop: String,

        #[arg(short, long)]
        area: f64,

        #[arg(short, long)]
        temperature: f64,

        #[arg(short, long)]
        rainfall: f64,

        #[arg(short = 'p', long)]
        soil_ph: f64,

        /// NPK fertilizer in kg/ha
        #[arg(short, long, default_value = "0")]
        npk: f64,

        #[arg(short, long)]
        irrigation: bool,
    },

    /// Assess disease and pest risk
    #[command(name = "disease-risk")]
    DiseaseRisk {
        #[arg(short, long)]
        crop: String,

        #[arg(short, long)]
        temperature: f64,

        #[arg(short = 'H', long)]
        humidity: f64,

        #[arg(short, long)]
        rainfall: Option<f64>,
    },

    /// Ask the agricultural assistant
    Chat {
        #[arg(value_name = "MESSAGE")]
        message: String,

        #[arg(short, long)]
        user_id: Option<String>,

        #[arg(short, long, default_value = "fr")]
        language: String,
    },

    /// Latest market prices
    Prices {
        #[arg(short, long)]
        crop: Option<String>,

        #[arg(short, long)]
        region: Option<String>,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Train { model_dir, force } => {
            let mut config = Config::load()
                .context("Failed to load configuration")?
                .ml;
            if let Some(dir) = model_dir {
                config = config.with_model_dir(dir);
            }

            println!("Training models into {}", config.model_dir);
            let service = MLService::new(config);
            let models = tokio::task::spawn_blocking(move || service.initialize(force))
                .await
                .context("Training task panicked")??;

            for artifact in &models.report {
                println!(
                    "  {:<20} {:<8} trained at {}",
                    artifact.artifact, artifact.outcome, artifact.trained_at
                );
            }
            println!(
                "Crop recommender accuracy: {:.3}",
                models.crop.metadata.training_metrics.accuracy.unwrap_or(0.0)
            );
            println!(
                "Yield predictor RMSE: {:.1} kg/ha",
                models.yield_model.metadata.training_metrics.rmse.unwrap_or(0.0)
            );
        }

        Commands::GenerateData {
            out,
            seed,
            rows,
            stations,
            days,
        } => {
            let sizes = DatasetSizes {
                rows,
                stations,
                days,
            };
            let dir = out.clone();
            let paths = tokio::task::spawn_blocking(move || save_datasets(&dir, sizes, seed))
                .await
                .context("Generation task panicked")?
                .with_context(|| format!("Failed to write datasets into {}", out.display()))?;

            for path in paths {
                println!("  {}", path.display());
            }
        }

        Commands::Recommend {
            temperature,
            humidity,
            rainfall,
            soil_ph,
            soil_type,
            region,
        } => {
            let response = client
                .post(format!("{}/v1/recommendations", cli.endpoint))
                .json(&json!({
                    "temperature": temperature,
                    "humidity": humidity,
                    "rainfall": rainfall,
                    "soil_ph": soil_ph,
                    "soil_type": soil_type,
                    "region": region,
                }))
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Yield {
            crop,
            area,
            temperature,
            rainfall,
            soil_ph,
            npk,
            irrigation,
        } => {
            let response = client
                .post(format!("{}/v1/yield-prediction", cli.endpoint))
                .json(&json!({
                    "crop": crop,
                    "area_hectares": area,
                    "temperature": temperature,
                    "rainfall": rainfall,
                    "soil_ph": soil_ph,
                    "fertilizer_npk": npk,
                    "irrigation": irrigation,
                }))
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::DiseaseRisk {
            crop,
            temperature,
            humidity,
            rainfall,
        } => {
            let response = client
                .post(format!("{}/v1/disease-risk", cli.endpoint))
                .json(&json!({
                    "crop": crop,
                    "temperature": temperature,
                    "humidity": humidity,
                    "rainfall": rainfall,
                }))
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Chat {
            message,
            user_id,
            language,
        } => {
            let response = client
                .post(format!("{}/v1/chatbot", cli.endpoint))
                .json(&json!({
                    "message": message,
                    "user_id": user_id,
                    "language": language,
                }))
                .send()
                .await?;

            let status = response.status();
            let body: Value = response.json().await?;
            match body.get("response").and_then(Value::as_str) {
                Some(text) if status.is_success() => println!("{}", text),
                _ => println!("{}", serde_json::to_string_pretty(&body)?),
            }
        }

        Commands::Prices { crop, region } => {
            let mut query = Vec::new();
            if let Some(crop) = crop {
                query.push(("crop", crop));
            }
            if let Some(region) = region {
                query.push(("region", region));
            }

            let response = client
                .get(format!("{}/v1/market-prices", cli.endpoint))
                .query(&query)
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;
            print_body(response).await?;
        }
    }

    Ok(())
}

async fn print_body(response: Response) -> anyhow::Result<()> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("Server answered {} with a non-JSON body", status))?;

    if !status.is_success() {
        eprintln!("Request failed with status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use smoke_sim_core::conflict::ScheduledBurn;
use smoke_sim_core::{
    ConflictDetector, EngineConfig, EngineContext, InMemoryFeatureIndex, InMemoryScheduleStore, PredictionResult,
    RawPredictionRequest, SmokePredictor,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Smoke dispersion prediction for a planned field burn
#[derive(Parser, Debug)]
#[command(name = "smoke-predict")]
#[command(about = "Predict smoke dispersion and burn conflicts", long_about = None)]
struct Args {
    /// Prediction request JSON (burn and weather)
    request: PathBuf,

    /// Engine configuration JSON (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Historical dispersion records JSON
    #[arg(long)]
    history: Option<PathBuf>,

    /// Scheduled burns JSON array
    #[arg(short, long)]
    schedule: Option<PathBuf>,

    /// Past prediction requests JSON array, indexed for pattern similarity
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_schedule(path: Option<&Path>) -> Result<InMemoryScheduleStore> {
    let Some(path) = path else {
        return Ok(InMemoryScheduleStore::new());
    };
    let burns: Vec<ScheduledBurn> = read_json(path)?;
    info!(burns = burns.len(), "Loaded burn schedule");
    Ok(burns.into_iter().collect())
}

/// Simulate each past request and index its feature vector.
fn build_index(path: Option<&Path>, predictor: &SmokePredictor) -> Result<InMemoryFeatureIndex> {
    let Some(path) = path else {
        return Ok(InMemoryFeatureIndex::new());
    };
    let raw: Vec<RawPredictionRequest> = read_json(path)?;
    let items = raw
        .into_iter()
        .map(RawPredictionRequest::normalize)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("normalizing {}", path.display()))?;

    let mut index = InMemoryFeatureIndex::new();
    for ((burn, _), sim) in items.iter().zip(predictor.simulate_batch(&items)) {
        match sim {
            Ok(sim) if !sim.features.is_degraded() => index.insert(burn.id.clone(), sim.features.into_value()),
            Ok(_) => warn!(burn = %burn.id, "Skipping past burn with fallback features"),
            Err(e) => warn!(burn = %burn.id, error = %e, "Skipping past burn"),
        }
    }
    info!(vectors = index.len(), "Built similarity index");
    Ok(index)
}

fn print_summary(result: &PredictionResult, predictor: &SmokePredictor) {
    println!("=== Smoke Prediction: {} ===\n", result.burn_id);

    let e = &result.emissions;
    println!(
        "Emissions: {:.0} kg PM2.5 over {:.1} h ({:.1} g/s)",
        e.total_emissions_kg, e.burn_duration_h, e.emission_rate_gs
    );
    println!(
        "Stability: {}  Wind: {:.1} m/s toward {:.0}°  Effective height: {:.1} m",
        result.stability,
        result.plume.wind_speed_ms,
        result.plume.wind_direction.value(),
        result.plume.effective_height_m
    );
    println!(
        "Peak PM2.5: {:.1} µg/m³  Reach: {:.2} km  Confidence: {}",
        result.concentration.max_concentration,
        result.concentration.max_dispersion_radius_m / 1000.0,
        result.confidence
    );

    match &result.affected_area {
        Ok(area) => println!(
            "Affected area: {} vertices around ({:.5}, {:.5})",
            area.ring.len(),
            area.centroid.lon,
            area.centroid.lat
        ),
        Err(reason) => println!("Affected area: unavailable ({reason})"),
    }

    println!("\nConflicts: {}", result.conflicts.len());
    for c in &result.conflicts {
        let detail = match (c.distance_m, c.similarity) {
            (Some(d), _) => format!("{d:.0} m apart"),
            (None, Some(s)) => format!("similarity {s:.3}"),
            (None, None) => String::new(),
        };
        println!("  {:?} {:?} with {}: {}", c.severity, c.conflict_type, c.conflicting_burn_id, detail);
    }

    println!("\nRecommendations:");
    for r in predictor.recommend(result) {
        println!("  [{}] {}", r.level, r.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let context = match &args.history {
        Some(path) => EngineContext::load_or_empty(path),
        None => EngineContext::empty(),
    };

    let (burn, weather) = read_json::<RawPredictionRequest>(&args.request)?.normalize()?;

    // Past burns are simulated without stores to build the index
    let bootstrap = SmokePredictor::new(
        config.clone(),
        ConflictDetector::new(Arc::new(InMemoryScheduleStore::new()), Arc::new(InMemoryFeatureIndex::new())),
    )?;
    let index = build_index(args.index.as_deref(), &bootstrap)?;
    let schedule = load_schedule(args.schedule.as_deref())?;

    let predictor =
        SmokePredictor::new(config, ConflictDetector::new(Arc::new(schedule), Arc::new(index)))?.with_context(context);
    let result = predictor.predict(&burn, &weather).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, &predictor);
    }
    Ok(())
}

use super::print_prediction;
use crate::cli::ShowArgs;
use crate::error::{CliError, Result};
use enzprop::core::io::export;
use enzprop::store::PredictionStore;
use enzprop::store::memory::MemoryPredictionStore;
use enzprop::workflows::propagate;
use tracing::info;

pub async fn run(args: ShowArgs) -> Result<()> {
    info!("Reading predictions from {:?}", &args.predictions);
    let predictions = export::read_predictions_from_path(&args.predictions)
        .map_err(|e| CliError::parsing(&args.predictions, e))?;

    let store = MemoryPredictionStore::new();
    store.upsert_predictions(&predictions)?;

    let prediction = propagate::prediction_for(&store, &args.id)?;
    println!("Prediction for {}:", args.id);
    print_prediction(&prediction);
    Ok(())
}

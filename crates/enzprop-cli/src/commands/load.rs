use super::load_repository;
use crate::cli::LoadArgs;
use crate::error::Result;
use enzprop::store::ProteinRepository;
use tracing::info;

pub async fn run(args: LoadArgs) -> Result<()> {
    let (repository, report) = tokio::task::block_in_place(|| load_repository(&args.input))?;
    let with_domains = repository.list_proteins_with_domains(None)?;
    let labeled = with_domains.iter().filter(|p| p.is_labeled()).count();

    info!(
        rows = report.rows_read,
        loaded = report.loaded,
        graph_nodes = with_domains.len(),
        "Protein table inspected."
    );

    println!("Protein table: {}", args.input.display());
    println!("  Rows read:            {}", report.rows_read);
    println!("  Proteins loaded:      {}", report.loaded);
    println!("  Rows skipped:         {}", report.skipped);
    println!("  With EC numbers:      {}", report.with_labels);
    println!("  With domains:         {}", report.with_domains);
    println!(
        "  Graph nodes:          {} ({} labeled, {} unlabeled)",
        with_domains.len(),
        labeled,
        with_domains.len() - labeled
    );
    Ok(())
}

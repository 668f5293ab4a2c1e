use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use heredity_core::{
    compute_posteriors, compute_posteriors_parallel, GeneCount, Pedigree, PosteriorTable,
    ProbabilityModel,
};

#[derive(Parser)]
#[command(name = "heredity")]
#[command(version)]
#[command(about = "Exact Bayesian inference of gene and trait posteriors over a pedigree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer posterior gene and trait distributions for every individual
    Infer {
        /// Path to pedigree CSV file (columns: name, mother, father, trait)
        #[arg(short, long)]
        data: String,

        /// Output format: "text" (default) or "json"
        #[arg(long, default_value = "text")]
        format: String,

        /// Override the model's mutation rate
        #[arg(long)]
        mutation_rate: Option<f64>,

        /// Evaluate hypotheses in parallel across trait subsets
        #[arg(long)]
        parallel: bool,
    },

    /// Load and validate a pedigree without running inference
    Validate {
        /// Path to pedigree CSV file (columns: name, mother, father, trait)
        #[arg(short, long)]
        data: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Infer {
            data,
            format,
            mutation_rate,
            parallel,
        } => cmd_infer(&data, &format, mutation_rate, parallel),
        Commands::Validate { data } => cmd_validate(&data),
    }
}

fn cmd_infer(
    data_path: &str,
    output_format: &str,
    mutation_rate: Option<f64>,
    parallel: bool,
) -> Result<()> {
    let pedigree = load_pedigree(data_path)?;

    let model = match mutation_rate {
        Some(rate) => ProbabilityModel::with_mutation_rate(rate)
            .with_context(|| format!("Invalid mutation rate {}", rate))?,
        None => ProbabilityModel::default(),
    };

    let table = if parallel {
        compute_posteriors_parallel(&pedigree, &model)
    } else {
        compute_posteriors(&pedigree, &model)
    }
    .context("Inference failed")?;

    match output_format.to_lowercase().as_str() {
        "json" => print_json(&pedigree, &table)?,
        _ => print_text(&pedigree, &table),
    }

    Ok(())
}

fn cmd_validate(data_path: &str) -> Result<()> {
    let pedigree = load_pedigree(data_path)?;
    pedigree
        .validate()
        .context("Pedigree failed validation")?;

    let observed = pedigree
        .individuals()
        .filter(|i| i.observed_trait().is_some())
        .count();
    println!(
        "Pedigree OK: {} individuals ({} founders, {} with observed traits)",
        pedigree.len(),
        pedigree.n_founders(),
        observed
    );

    Ok(())
}

fn load_pedigree(data_path: &str) -> Result<Pedigree> {
    let pedigree = Pedigree::from_csv(data_path)
        .with_context(|| format!("Failed to load pedigree from '{}'", data_path))?;
    eprintln!(
        "Loaded {} individuals ({} founders) from '{}'",
        pedigree.len(),
        pedigree.n_founders(),
        data_path
    );
    Ok(pedigree)
}

/// Console report: per individual, the gene distribution (buckets 2, 1, 0)
/// and the trait distribution, four decimal places.
fn print_text(pedigree: &Pedigree, table: &PosteriorTable) {
    for (i, individual) in pedigree.individuals().enumerate() {
        println!("{}:", individual.name());
        println!("  Gene:");
        for count in GeneCount::ALL.iter().rev() {
            println!("    {}: {:.4}", count, table.gene(i, *count));
        }
        println!("  Trait:");
        let (present, absent) = table.trait_distribution(i);
        println!("    True: {:.4}", present);
        println!("    False: {:.4}", absent);
    }
}

fn print_json(pedigree: &Pedigree, table: &PosteriorTable) -> Result<()> {
    let mut individuals = serde_json::Map::new();

    for (i, individual) in pedigree.individuals().enumerate() {
        let (present, absent) = table.trait_distribution(i);
        individuals.insert(
            individual.name().to_string(),
            serde_json::json!({
                "gene": {
                    "0": table.gene(i, GeneCount::Zero),
                    "1": table.gene(i, GeneCount::One),
                    "2": table.gene(i, GeneCount::Two),
                },
                "trait": {
                    "true": present,
                    "false": absent,
                },
            }),
        );
    }

    let output = serde_json::Value::Object(individuals);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

//! cytofreq - Cell-population frequency analysis CLI
//!
//! Command-line interface for relative frequency normalization, cohort
//! comparison, and baseline breakdowns over cell-count tables.

use clap::{Parser, Subcommand};
use cytofreq::cohort::{aggregate_baseline, compare_cohort, run_response_analysis, CohortFilter};
use cytofreq::config::{AnalysisConfig, PopulationSet};
use cytofreq::data::{PopulationTest, SampleTable};
use cytofreq::error::{CytoError, Result};
use cytofreq::normalize::normalize;
use cytofreq::plot::render_response_boxplots;
use std::path::PathBuf;

/// Cell-population frequency analysis
#[derive(Parser)]
#[command(name = "cytofreq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the wide-format cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for output files
        #[arg(short, long)]
        outdir: PathBuf,
    },

    /// Convert a wide cell-count CSV into a long relative-frequency TSV
    Frequencies {
        /// Path to the wide-format cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the long-format TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Population columns (comma-separated)
        #[arg(long, default_value = "b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte")]
        populations: String,
    },

    /// Compare responder vs. non-responder frequencies within a cohort
    Compare {
        /// Path to the wide-format cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Disease condition to select
        #[arg(long, default_value = "melanoma")]
        condition: String,

        /// Treatment to select
        #[arg(long, default_value = "tr1")]
        treatment: String,

        /// Sample material to select
        #[arg(long, default_value = "PBMC")]
        sample_type: String,

        /// Population columns (comma-separated)
        #[arg(long, default_value = "b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte")]
        populations: String,

        /// Output path for the per-population results TSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for responder vs. non-responder boxplots (PNG)
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Output format for stdout: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Tally baseline samples by project, response, and sex
    Baseline {
        /// Path to the wide-format cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Disease condition to select
        #[arg(long, default_value = "melanoma")]
        condition: String,

        /// Treatment to select
        #[arg(long, default_value = "tr1")]
        treatment: String,

        /// Sample material to select
        #[arg(long, default_value = "PBMC")]
        sample_type: String,

        /// Population columns (comma-separated)
        #[arg(long, default_value = "b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte")]
        populations: String,

        /// Output path for the tally TSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for stdout: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Generate an example analysis configuration
    ExampleConfig {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            input,
            outdir,
        } => cmd_run(&config, &input, &outdir),

        Commands::Frequencies {
            input,
            output,
            populations,
        } => cmd_frequencies(&input, &output, &populations),

        Commands::Compare {
            input,
            condition,
            treatment,
            sample_type,
            populations,
            output,
            plot,
            format,
        } => cmd_compare(
            &input,
            &condition,
            &treatment,
            &sample_type,
            &populations,
            output.as_ref(),
            plot.as_ref(),
            &format,
        ),

        Commands::Baseline {
            input,
            condition,
            treatment,
            sample_type,
            populations,
            output,
            format,
        } => cmd_baseline(
            &input,
            &condition,
            &treatment,
            &sample_type,
            &populations,
            output.as_ref(),
            &format,
        ),

        Commands::ExampleConfig { output } => cmd_example_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run the full analysis described by a configuration file
fn cmd_run(config_path: &PathBuf, input: &PathBuf, outdir: &PathBuf) -> Result<()> {
    eprintln!("Loading analysis configuration from {:?}...", config_path);
    let config_str = std::fs::read_to_string(config_path)?;
    let config = AnalysisConfig::from_yaml(&config_str)?;

    eprintln!("Loading {:?}...", input);
    let samples = SampleTable::from_csv(input, &config.populations)?;
    eprintln!(
        "Loaded {} samples x {} populations",
        samples.n_samples(),
        config.populations.len()
    );

    std::fs::create_dir_all(outdir)?;

    eprintln!("Running analysis '{}'...", config.name);
    let (frequencies, comparison) =
        run_response_analysis(&samples, &config.cohort, &config.populations)?;
    let breakdown = aggregate_baseline(&samples, &config.cohort);

    let frequencies_path = outdir.join("frequencies.tsv");
    eprintln!("Writing frequencies to {:?}...", frequencies_path);
    frequencies.to_tsv(&frequencies_path)?;

    let comparison_path = outdir.join("comparison.tsv");
    eprintln!("Writing comparison to {:?}...", comparison_path);
    comparison.to_tsv(&comparison_path)?;

    let baseline_path = outdir.join("baseline.tsv");
    eprintln!("Writing baseline tallies to {:?}...", baseline_path);
    breakdown.to_tsv(&baseline_path)?;

    let plot_path = outdir.join("boxplots.png");
    match render_response_boxplots(&comparison.filtered, &config.populations, &plot_path) {
        Ok(()) => eprintln!("Rendered boxplots to {:?}", plot_path),
        Err(CytoError::EmptyData(_)) => eprintln!("No plottable rows, skipping boxplots"),
        Err(e) => return Err(e),
    }

    eprintln!(
        "Done! {} significant population(s), {} with insufficient data",
        comparison.n_significant(),
        comparison.n_insufficient()
    );

    Ok(())
}

fn parse_populations(list: &str) -> Result<PopulationSet> {
    PopulationSet::new(
        list.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>(),
    )
}

/// Normalize a wide table and write the long-format output
fn cmd_frequencies(input: &PathBuf, output: &PathBuf, populations: &str) -> Result<()> {
    let populations = parse_populations(populations)?;

    eprintln!("Loading {:?}...", input);
    let samples = SampleTable::from_csv(input, &populations)?;
    eprintln!(
        "Loaded {} samples x {} populations",
        samples.n_samples(),
        populations.len()
    );

    let frequencies = normalize(&samples, &populations);

    eprintln!("Writing frequencies to {:?}...", output);
    frequencies.to_tsv(output)?;
    eprintln!("Done! {} rows written", frequencies.len());

    Ok(())
}

/// Run the responder vs. non-responder comparison
#[allow(clippy::too_many_arguments)]
fn cmd_compare(
    input: &PathBuf,
    condition: &str,
    treatment: &str,
    sample_type: &str,
    populations: &str,
    output_path: Option<&PathBuf>,
    plot_path: Option<&PathBuf>,
    format: &str,
) -> Result<()> {
    let populations = parse_populations(populations)?;
    let filter = CohortFilter::new(condition, treatment, sample_type);

    eprintln!("Loading {:?}...", input);
    let samples = SampleTable::from_csv(input, &populations)?;
    eprintln!("Loaded {} samples", samples.n_samples());

    let frequencies = normalize(&samples, &populations);
    let comparison = compare_cohort(&frequencies, &filter, &populations)?;

    eprintln!(
        "Cohort {}/{}/{}: {} rows, {} significant population(s), {} with insufficient data",
        condition,
        treatment,
        sample_type,
        comparison.filtered.len(),
        comparison.n_significant(),
        comparison.n_insufficient()
    );

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&comparison)?;
            println!("{}", json);
        }
        _ => {
            for r in &comparison.results {
                match &r.test {
                    PopulationTest::Tested {
                        statistic,
                        p_value,
                        significant,
                    } => println!(
                        "{}\tU = {:.2}\tp = {:.4}\t{}",
                        r.population,
                        statistic,
                        p_value,
                        if *significant {
                            "significant"
                        } else {
                            "not significant"
                        }
                    ),
                    PopulationTest::InsufficientData {
                        n_responders,
                        n_non_responders,
                    } => println!(
                        "{}\tinsufficient data ({} responders, {} non-responders)",
                        r.population, n_responders, n_non_responders
                    ),
                }
            }
        }
    }

    if let Some(path) = output_path {
        eprintln!("Writing results to {:?}...", path);
        comparison.to_tsv(path)?;
    }

    if let Some(path) = plot_path {
        eprintln!("Rendering boxplots to {:?}...", path);
        render_response_boxplots(&comparison.filtered, &populations, path)?;
    }

    Ok(())
}

/// Tally the baseline cohort
fn cmd_baseline(
    input: &PathBuf,
    condition: &str,
    treatment: &str,
    sample_type: &str,
    populations: &str,
    output_path: Option<&PathBuf>,
    format: &str,
) -> Result<()> {
    let populations = parse_populations(populations)?;
    let filter = CohortFilter::new(condition, treatment, sample_type);

    eprintln!("Loading {:?}...", input);
    let samples = SampleTable::from_csv(input, &populations)?;
    eprintln!("Loaded {} samples", samples.n_samples());

    let breakdown = aggregate_baseline(&samples, &filter);
    eprintln!(
        "Baseline cohort {}/{}/{}: {} samples",
        condition,
        treatment,
        sample_type,
        breakdown.baseline.n_samples()
    );

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&breakdown)?;
            println!("{}", json);
        }
        _ => {
            println!("Samples per project:");
            for entry in &breakdown.samples_per_project {
                println!("  {}\t{}", entry.key, entry.count);
            }
            println!("Subjects by response:");
            for entry in &breakdown.subjects_by_response {
                println!("  {}\t{}", entry.key, entry.count);
            }
            println!("Subjects by sex:");
            for entry in &breakdown.subjects_by_sex {
                println!("  {}\t{}", entry.key, entry.count);
            }
        }
    }

    if let Some(path) = output_path {
        eprintln!("Writing tallies to {:?}...", path);
        breakdown.to_tsv(path)?;
    }

    Ok(())
}

/// Write an example analysis configuration
fn cmd_example_config(output_path: &PathBuf) -> Result<()> {
    let config = AnalysisConfig::example();
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}

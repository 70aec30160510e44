//! scenario-compare - run the data preparation pipeline on JSON records
//!
//! ```bash
//! scenario-compare run --records scalars.json --schema schema.json --config config.json
//! scenario-compare units
//! ```

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use scenario_comparison::config::PipelineConfig;
use scenario_comparison::interchange::{records_from_json_path, records_to_json};
use scenario_comparison::pipeline::Pipeline;
use scenario_comparison::types::Schema;
use scenario_comparison::units::UnitRegistry;

#[derive(Parser)]
#[command(name = "scenario-compare")]
#[command(about = "Convert, aggregate and order scenario result records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a JSON record file
    Run {
        /// JSON array (or NDJSON) of records
        #[arg(short, long)]
        records: PathBuf,

        /// JSON schema file: `[{"name": "region", "type": "utf8"}, ...]`
        #[arg(short, long)]
        schema: PathBuf,

        /// Pipeline configuration (group_by, order_by, units, labels); defaults to no-op
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fill unselected unit families with their default unit
        #[arg(long)]
        default_units: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the selectable unit families
    Units,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = UnitRegistry::energy_system();

    match cli.command {
        Commands::Run {
            records,
            schema,
            config,
            default_units,
            output,
        } => cmd_run(&registry, &records, &schema, config.as_deref(), default_units, output.as_deref()),
        Commands::Units => {
            cmd_units(&registry);
            Ok(())
        }
    }
}

fn cmd_run(
    registry: &UnitRegistry,
    records_path: &Path,
    schema_path: &Path,
    config_path: Option<&Path>,
    default_units: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let schema: Schema = serde_json::from_str(&fs::read_to_string(schema_path)?)?;
    let mut config = match config_path {
        Some(path) => PipelineConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };
    if default_units {
        config = config.with_default_units(registry);
    }
    config.validate(registry)?;

    let records = records_from_json_path(records_path, &schema)?;
    let out = Pipeline::new(registry).run(&records, &config)?;
    tracing::info!(
        input_rows = out.report.input_rows,
        output_rows = out.report.output_rows,
        converted_rows = out.report.converted_rows,
        warnings = out.diagnostics.len(),
        "pipeline finished"
    );

    let json = serde_json::to_string_pretty(&records_to_json(&out.records))?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_units(registry: &UnitRegistry) {
    for family in registry.families() {
        println!(
            "{:<16} default={:<6} units={}",
            family.name,
            family.default,
            family.units.join(", ")
        );
    }
}

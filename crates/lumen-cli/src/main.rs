use std::path::PathBuf;

use argh::FromArgs;

use lumen::algorithm::{Category, Registry};
use lumen::config::{AlgorithmParams, PipelineConfig};
use lumen::io::functional as F;
use lumen::pipeline::{clean_work_dir, Pipeline};

#[derive(FromArgs, Debug)]
/// Enhance images and score their quality.
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    List(ListArgs),
    Run(RunArgs),
    Clean(CleanArgs),
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "list")]
/// List the available algorithms.
struct ListArgs {}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "run")]
/// Run a selection of algorithms on an image.
struct RunArgs {
    /// path to the input png or jpeg image
    #[argh(option, short = 'i')]
    image: PathBuf,

    /// algorithm to run, can be repeated
    #[argh(option, short = 'a')]
    algorithm: Vec<String>,

    /// run every algorithm on the original image instead of chaining them
    #[argh(switch)]
    no_pipeline: bool,

    /// path to a JSON configuration file
    #[argh(option)]
    config: Option<PathBuf>,

    /// directory for the staged input and the outputs
    #[argh(option)]
    work_dir: Option<PathBuf>,

    /// path to the Zero-DCE safetensors weights
    #[argh(option)]
    weights: Option<PathBuf>,

    /// write the last produced image to this png or jpeg file
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "clean")]
/// Delete the files of the work directory.
struct CleanArgs {
    /// directory to clean
    #[argh(option, default = "PathBuf::from(\"tmp\")")]
    work_dir: PathBuf,
}

fn list() {
    let registry = Registry::with_builtins(&AlgorithmParams::default());
    for category in Category::ALL {
        println!("{category}:");
        for algorithm in registry.by_category(category) {
            println!("  {:<34}{}", algorithm.name(), algorithm.description());
        }
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    // command line flags take precedence over the configuration file
    if !args.algorithm.is_empty() {
        config.algorithms = args.algorithm;
    }
    if args.no_pipeline {
        config.pipeline = false;
    }
    if let Some(work_dir) = args.work_dir {
        config.work_dir = work_dir;
    }
    if let Some(weights) = args.weights {
        config.params.zero_dce.weights = Some(weights);
    }

    log::debug!("configuration: {config:?}");

    let registry = Registry::with_builtins(&config.params);
    let mut pipeline = Pipeline::new(registry, config);

    let staged = pipeline.stage_input(&args.image)?;
    let report = pipeline.process(&staged)?;

    for (name, path) in &report.images {
        println!("{name}: {}", path.display());
    }

    if !report.results.is_empty() {
        println!();
        print!("{}", report.results);
    }

    if let Some(output) = &args.output {
        match report.images.last() {
            Some((name, path)) => {
                let image = F::read_image_any_rgb8(path)?;
                F::write_image_rgb8(output, &image)?;
                println!("{name} saved to {}", output.display());
            }
            None => log::warn!("no image was produced, {} not written", output.display()),
        }
    }

    if let Some(path) = &report.contact_sheet {
        println!();
        println!("grid: {}", path.display());
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    match args.command {
        Command::List(_) => list(),
        Command::Run(args) => run(args)?,
        Command::Clean(args) => {
            let removed = clean_work_dir(&args.work_dir)?;
            println!("removed {removed} files from {}", args.work_dir.display());
        }
    }

    Ok(())
}

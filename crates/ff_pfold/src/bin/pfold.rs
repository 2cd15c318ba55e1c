use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use ff_energy::ParamSet;
use ff_pfold::output::{write_ct, write_neg_log10_probabilities, write_probability_matrix};
use ff_pfold::{FoldConfig, PartitionFunction, Schedule};

/// Base pair probabilities and ProbKnot structure of an RNA sequence.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// RNA sequence; lowercase nucleotides are kept unpaired.
    sequence: String,

    /// Energy parameters in JSON format (default: built-in set).
    #[arg(long, value_name = "PATH")]
    params: Option<PathBuf>,

    /// Folding options in JSON format, overridden by the flags below.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Temperature in °C.
    #[arg(short, long, value_name = "CELSIUS")]
    temperature: Option<f64>,

    /// Remove helices with fewer pairs from the structure.
    #[arg(short, long, value_name = "NUM")]
    min_helix_length: Option<usize>,

    /// Write the pair probability matrix to this file.
    #[arg(long, value_name = "PATH")]
    probabilities: Option<PathBuf>,

    /// Write -log10 pair probabilities to this file.
    #[arg(long, value_name = "PATH")]
    neg_log10: Option<PathBuf>,

    /// Write the ProbKnot structure in CT format here instead of stdout.
    #[arg(long, value_name = "PATH")]
    ct: Option<PathBuf>,

    /// Fill the tables on a single thread.
    #[arg(long)]
    sequential: bool,

    /// Number of worker threads (default: all cores).
    #[arg(short = 'j', long, value_name = "NUM")]
    threads: Option<usize>,
}

fn create(path: &Path) -> Result<BufWriter<File>, Box<dyn std::error::Error>> {
    let file = File::create(path).map_err(|e| format!("cannot create '{}': {e}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FoldConfig::from_json_file(path)?,
        None => FoldConfig::default(),
    };
    if let Some(t) = cli.temperature {
        config.temperature = t;
    }
    if let Some(m) = cli.min_helix_length {
        config.min_helix_length = m;
    }
    if cli.sequential {
        config.schedule = Schedule::Sequential;
    }
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }

    let params = match &cli.params {
        Some(path) => ParamSet::from_json_file(path)?,
        None => ParamSet::default(),
    };
    info!("Folding at {} °C, minimum helix length {}.", config.temperature, config.min_helix_length);

    let pf = PartitionFunction::fold(&cli.sequence, &params, &config)?;

    if let Some(path) = &cli.probabilities {
        let mut w = create(path)?;
        write_probability_matrix(&mut w, &pf)?;
        w.flush()?;
    }
    if let Some(path) = &cli.neg_log10 {
        let mut w = create(path)?;
        write_neg_log10_probabilities(&mut w, &pf)?;
        w.flush()?;
    }

    let structure = pf.extract_structure(config.min_helix_length);
    let sequence = pf.sequence().to_string();
    let title = format!("ProbKnot structure, ensemble energy {:.2} kcal/mol", pf.ensemble_energy());
    match &cli.ct {
        Some(path) => {
            let mut w = create(path)?;
            write_ct(&mut w, &title, &sequence, &structure)?;
            w.flush()?;
        }
        None => {
            let mut w = io::stdout().lock();
            write_ct(&mut w, &title, &sequence, &structure)?;
        }
    }
    Ok(())
}

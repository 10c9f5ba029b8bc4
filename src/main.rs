use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skipgram::{generate_word_vectors_with_rng, TrainingConfig};

#[derive(Parser)]
#[command(about = "Skip-gram word vectors with negative sampling", long_about = None, version)]
struct Options {
    /// Use text data from FILE to train the model; one document per file,
    /// one sentence per line. May be repeated.
    #[arg(long = "train", value_name = "FILE", required = true)]
    train_files: Vec<PathBuf>,

    /// Words to ignore, one per line
    #[arg(long = "stop-words", value_name = "FILE")]
    stop_words_file: Option<PathBuf>,

    /// Read hyperparameters from a JSON file; flags below override it
    #[arg(long = "config", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Set size of word vectors; default is 300
    #[arg(long)]
    size: Option<usize>,

    /// Set max skip length between words; default is 5
    #[arg(long)]
    window: Option<usize>,

    /// Number of negative examples; default is 10
    #[arg(long)]
    negative: Option<usize>,

    /// Set the starting learning rate; default is 0.01
    #[arg(long)]
    alpha: Option<f64>,

    /// Number of training epochs; default is 5
    #[arg(long)]
    iter: Option<usize>,

    /// Seed the random number generator, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print the nearest neighbours of WORD after training. May be repeated.
    #[arg(long = "query", value_name = "WORD")]
    queries: Vec<String>,

    /// Number of neighbours to print per query
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Options {
    fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config_file {
            Some(path) => TrainingConfig::from_json_file(path)
                .with_context(|| format!("error reading config file {}", path.display()))?,
            None => TrainingConfig::default(),
        };
        if let Some(size) = self.size {
            config.vector_size = size;
        }
        if let Some(window) = self.window {
            config.context_size = window;
        }
        if let Some(negative) = self.negative {
            config.negative_samples = negative;
        }
        if let Some(alpha) = self.alpha {
            config.learning_rate = alpha;
        }
        if let Some(iter) = self.iter {
            config.num_epochs = iter;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path).with_context(|| format!("error opening {}", path.display()))?;
    BufReader::new(f)
        .lines()
        .collect::<Result<Vec<String>, _>>()
        .with_context(|| format!("error reading {}", path.display()))
}

fn run(options: &Options) -> Result<()> {
    let config = options.training_config()?;

    let documents = options
        .train_files
        .iter()
        .map(|path| read_lines(path))
        .collect::<Result<Vec<_>>>()?;
    let stop_words = match &options.stop_words_file {
        Some(path) => read_lines(path)?,
        None => vec![],
    };

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let progress = ProgressBar::new(config.num_epochs as u64);
    progress.set_style(
        ProgressStyle::with_template("{elapsed_precise} [{bar:40}] epoch {pos}/{len}")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );
    let vectors = generate_word_vectors_with_rng(&documents, &stop_words, &config, &mut rng, |_| {
        progress.inc(1)
    })
    .context("training failed")?;
    progress.finish_and_clear();

    println!("Vocab size: {}", vectors.num_words());
    println!("Vector size: {}", vectors.size());

    for query in &options.queries {
        let word = query.to_lowercase();
        match vectors.most_similar(&word, options.top) {
            None => println!("\n{word}: out of dictionary word!"),
            Some(neighbours) => {
                println!("\n{:>50}\t\tCosine distance", format!("Word: {word}"));
                println!("{}", "-".repeat(72));
                for (neighbour, similarity) in neighbours {
                    println!("{neighbour:>50}\t\t{similarity:.6}");
                }
            }
        }
    }
    Ok(())
}

fn main() {
    let options = Options::parse();

    let filter = if options.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(err) = run(&options) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use rs_textgen_core::config::{DataLayout, DATA_DIR};
use rs_textgen_core::io::{read_text, FileStore};
use rs_textgen_core::ledger::TrainingLedger;
use rs_textgen_core::model::Generator;
use rs_textgen_core::Error;

/// Word-level Markov chain text generator.
///
/// Trains a persisted chain on text files and prints generated sentences.
#[derive(Parser, Debug)]
#[command(name = "rs-textgen", version, about)]
struct Cli {
	/// Directory holding the model and the training ledger
	#[arg(short, long, default_value = DATA_DIR)]
	data: String,

	/// Text file to train on before generating (skipped if already trained)
	#[arg(short, long)]
	train: Option<PathBuf>,

	/// Number of sentences to generate
	#[arg(short, long, default_value_t = 1)]
	lines: usize,

	/// Seed for reproducible output
	#[arg(long)]
	seed: Option<u64>,

	/// Bias added to the stop roll (0.0..=1.0), higher gives shorter sentences
	#[arg(long)]
	stop_bias: Option<f32>,

	/// Maximum number of words in one sentence
	#[arg(long)]
	max_words: Option<usize>,
}

impl Cli {
	fn generator(&self) -> Result<Generator> {
		let mut generator = match self.seed {
			Some(seed) => Generator::seeded(seed),
			None => Generator::from_os_rng(),
		};
		if let Some(stop_bias) = self.stop_bias {
			generator.input_mut().set_stop_bias(stop_bias)?;
		}
		if let Some(max_words) = self.max_words {
			generator.input_mut().set_max_words(max_words)?;
		}
		Ok(generator)
	}
}

/// Trains on `source` unless the ledger already lists it, then persists the
/// model and records the source.
fn train(generator: &mut Generator, layout: &DataLayout, source: &Path) -> Result<()> {
	let text = read_text(source)?;
	let digest = TrainingLedger::digest(&text);
	let mut ledger = TrainingLedger::open(layout.ledger_path())
		.with_context(|| format!("Cannot open ledger {}", layout.ledger_path().display()))?;

	if ledger.contains(&digest) {
		println!("Already trained on {}.", source.display());
		return Ok(());
	}

	println!("Training...");
	let stats = generator.train(&text);
	info!("{} tokens, {} new nodes", stats.tokens, stats.new_nodes);
	generator
		.save(&FileStore, &layout.model_path())
		.with_context(|| format!("Cannot save model {}", layout.model_path().display()))?;
	ledger.record(&digest)?;
	println!("Training complete.");
	Ok(())
}

fn main() -> Result<()> {
	env_logger::init();
	let cli = Cli::parse();

	let layout = DataLayout::resolve(&cli.data);
	let mut generator = cli.generator()?;
	generator.load_or_empty(&FileStore, &layout.model_path())?;

	match &cli.train {
		Some(source) => match train(&mut generator, &layout, source) {
			Ok(()) => (),
			Err(e) => match e.downcast_ref::<Error>() {
				Some(Error::NotFound(path)) => warn!("Training source {} not found, skipping", path.display()),
				_ => return Err(e),
			},
		},
		None if generator.is_empty() => bail!("No markov data found in {}", layout.dir().display()),
		None => (),
	}

	match generator.generate(cli.lines) {
		Ok(text) => print!("{text}"),
		Err(Error::EmptyModel) => bail!("No markov data found in {}", layout.dir().display()),
		Err(e) => return Err(e.into()),
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let cli = Cli::try_parse_from(["rs-textgen"]).unwrap();
		assert_eq!(cli.data, DATA_DIR);
		assert_eq!(cli.lines, 1);
		assert!(cli.train.is_none());
	}

	#[test]
	fn rejects_out_of_range_stop_bias() {
		let cli = Cli::try_parse_from(["rs-textgen", "--stop-bias", "1.5"]).unwrap();
		assert!(cli.generator().is_err());
	}

	#[test]
	fn trains_once_per_source() {
		let dir = tempfile::tempdir().unwrap();
		let layout = DataLayout::new(dir.path());
		let source = dir.path().join("corpus.txt");
		std::fs::write(&source, "Hello there world.").unwrap();

		let mut generator = Generator::seeded(1);
		train(&mut generator, &layout, &source).unwrap();
		train(&mut generator, &layout, &source).unwrap();
		assert_eq!(generator.chain().node("hello").unwrap().transition_count(), 1);
		assert_eq!(generator.generate(1).unwrap(), "Hello there world.\n\n");

		let missing = train(&mut generator, &layout, &dir.path().join("absent.txt")).unwrap_err();
		assert!(matches!(missing.downcast_ref::<Error>(), Some(Error::NotFound(_))));
	}
}

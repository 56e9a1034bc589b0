use std::env;
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use rs_textgen_core::config::{DataLayout, DATA_DIR};
use rs_textgen_core::io::FileStore;
use rs_textgen_core::ledger::TrainingLedger;
use rs_textgen_core::model::{generator, persistence, Chain, GenerationInput};
use rs_textgen_core::Error;

const DEFAULT_ADDR: &str = "127.0.0.1:5000";
const ADDR_VAR: &str = "RS_TEXTGEN_ADDR";
const DATA_VAR: &str = "RS_TEXTGEN_DATA";
const MAX_TRAINING_BYTES: usize = 16 * 1024 * 1024;

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	lines: Option<usize>,
	stop_bias: Option<f32>,
	max_words: Option<usize>,
}

#[derive(Serialize)]
struct Stats {
	nodes: usize,
	starts: usize,
	trained_sources: usize,
}

/// Model shared by every worker.
///
/// Generation takes the read lock; training takes the write lock, so at most
/// one training call mutates the chain and never while a walk reads it.
struct SharedData {
	chain: Chain,
	ledger: TrainingLedger,
	layout: DataLayout,
}

impl GenerateParams {
	fn input(&self) -> Result<GenerationInput, Error> {
		let mut input = GenerationInput::default();
		if let Some(stop_bias) = self.stop_bias {
			input.set_stop_bias(stop_bias)?;
		}
		if let Some(max_words) = self.max_words {
			input.set_max_words(max_words)?;
		}
		Ok(input)
	}
}

fn error_response(e: &Error) -> HttpResponse {
	match e {
		Error::EmptyModel => HttpResponse::Conflict().body(e.to_string()),
		Error::InvalidInput(_) => HttpResponse::BadRequest().body(e.to_string()),
		_ => {
			error!("{e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates `lines` sentences (default 1), one per line.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<RwLock<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let lines = query.lines.unwrap_or(1);
	let input = match query.input() {
		Ok(input) => input,
		Err(e) => return error_response(&e),
	};

	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match generator::generate(&shared_data.chain, lines, &input, &mut rand::rng()) {
		Ok(text) => HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(text),
		Err(e) => error_response(&e),
	}
}

/// HTTP PUT endpoint `/v1/train`
///
/// Trains the model on the request body unless the same text was already
/// trained on, then persists the model.
///
/// Training runs on a copy of the chain. The copy replaces the served model
/// only once it is saved, so a failed save leaves both the model and the
/// ledger as they were and the same text can be sent again.
#[put("/v1/train")]
async fn put_train(data: web::Data<RwLock<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let digest = TrainingLedger::digest(&body);
	if shared_data.ledger.contains(&digest) {
		info!("Skipping already trained source {digest}");
		return HttpResponse::Ok().body("already trained");
	}

	let mut chain = shared_data.chain.clone();
	let stats = chain.train(&body);
	info!("Trained source {digest}: {} tokens, {} new nodes", stats.tokens, stats.new_nodes);

	let model_path = shared_data.layout.model_path();
	if let Err(e) = persistence::save(&FileStore, &model_path, &chain) {
		return error_response(&e);
	}
	shared_data.chain = chain;
	if let Err(e) = shared_data.ledger.record(&digest) {
		return error_response(&e);
	}

	HttpResponse::Ok().body("trained")
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(Stats {
		nodes: shared_data.chain.len(),
		starts: shared_data.chain.starts().len(),
		trained_sources: shared_data.ledger.len(),
	})
}

/// Loads the persisted model, falling back to an empty one.
fn load_shared_data(layout: DataLayout) -> Result<SharedData, Error> {
	let chain = match persistence::load(&FileStore, &layout.model_path()) {
		Ok(chain) => chain,
		Err(Error::NotFound(path)) => {
			info!("No model at {}, starting empty", path.display());
			Chain::new()
		}
		Err(Error::CorruptData(reason)) => {
			warn!("Discarding corrupt model: {reason}");
			Chain::new()
		}
		Err(e) => return Err(e),
	};
	let ledger = TrainingLedger::open(layout.ledger_path())?;
	Ok(SharedData { chain, ledger, layout })
}

/// Main entry point for the server.
///
/// Loads the model from the data directory (`RS_TEXTGEN_DATA`, default
/// `./data`), wraps it in a `RwLock` and serves it on `RS_TEXTGEN_ADDR`
/// (default 127.0.0.1:5000).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let data_dir = env::var(DATA_VAR).unwrap_or_else(|_| DATA_DIR.to_owned());
	let addr = env::var(ADDR_VAR).unwrap_or_else(|_| DEFAULT_ADDR.to_owned());

	let layout = DataLayout::resolve(&data_dir);
	let shared_data = load_shared_data(layout).map_err(std::io::Error::other)?;
	info!("Serving a model of {} nodes on {}", shared_data.chain.len(), addr);
	let shared_model = web::Data::new(RwLock::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.app_data(web::PayloadConfig::new(MAX_TRAINING_BYTES))
			.service(get_generated)
			.service(put_train)
			.service(get_stats)
	})
		.bind(addr)?
		.run()
		.await
}

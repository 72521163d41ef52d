use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};

use serde::Serialize;
use hand_core::{Hand, HandError, WriteRequest, ALPHABET};

/// Environment variable naming the model directory.
const MODEL_DIR_VAR: &str = "HAND_MODEL_DIR";
const DEFAULT_MODEL_DIR: &str = "./data";

/// One entry of the `/v1/styles` listing.
#[derive(Serialize)]
struct StyleEntry {
	id: usize,
	text: String,
}

/// Maps a synthesis error to a response: caller mistakes are `400`,
/// everything else `500`.
fn error_response(err: HandError) -> HttpResponse {
	if err.is_validation() {
		HttpResponse::BadRequest().body(err.to_string())
	} else {
		tracing::error!(error = %err, "write failed");
		HttpResponse::InternalServerError().body(err.to_string())
	}
}

/// HTTP POST endpoint `/v1/write`
///
/// Takes a JSON `WriteRequest` and returns the handwritten SVG document.
/// Generation runs on the blocking thread pool.
#[post("/v1/write")]
async fn post_write(data: web::Data<Hand>, request: web::Json<WriteRequest>) -> impl Responder {
	let hand = data.get_ref().clone();
	let request = request.into_inner();
	tracing::info!(lines = request.lines.len(), "write request");

	let rendered = web::block(move || hand.render(&request).map(|document| document.to_string())).await;
	match rendered {
		Ok(Ok(svg)) => HttpResponse::Ok().content_type("image/svg+xml").body(svg),
		Ok(Err(e)) => error_response(e),
		Err(_) => HttpResponse::InternalServerError().body("Generation task failed"),
	}
}

/// HTTP GET endpoint `/v1/styles`
///
/// Lists the priming styles with the text each one was recorded from.
#[get("/v1/styles")]
async fn get_styles(data: web::Data<Hand>) -> impl Responder {
	let styles = data.styles();
	let entries: Vec<StyleEntry> = (0..styles.len())
		.filter_map(|id| styles.prime(Some(id)).map(|record| StyleEntry { id, text: record.text() }))
		.collect();
	HttpResponse::Ok().json(entries)
}

/// HTTP GET endpoint `/v1/alphabet`
///
/// Returns every writable character, in model order.
#[get("/v1/alphabet")]
async fn get_alphabet() -> impl Responder {
	let chars: String = ALPHABET.iter().skip(1).collect();
	HttpResponse::Ok().body(chars)
}

/// Main entry point for the server.
///
/// Loads the synthesizer once and shares it read-only between workers.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - The model directory comes from `HAND_MODEL_DIR`, `./data` by default.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	tracing_subscriber::fmt::init();

	let dir = std::env::var(MODEL_DIR_VAR).unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_owned());
	let hand = Hand::new(&dir).map_err(|e| std::io::Error::other(format!("failed to load {dir}: {e}")))?;
	tracing::info!(dir = %dir, styles = hand.styles().len(), "synthesizer loaded");
	let shared_hand = web::Data::new(hand);

	HttpServer::new(move || {
		App::new()
			.app_data(shared_hand.clone())
			.service(post_write)
			.service(get_styles)
			.service(get_alphabet)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

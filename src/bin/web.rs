//! Single binary web server: JSON API over one Swiss tournament, saved to disk after every change.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), DATA_DIR (e.g. /var/lib/swiss).

use actix_web::{
    delete, get, post, put,
    http::header,
    web::{Bytes, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::sync::RwLock;
use swiss_tournament_web::{
    export_file_name, export_state, finish_tournament, generate_next_round, import_state,
    record_match_result, reset_tournament, standings_to_csv, start_tournament,
    start_tournament_with_pairings, update_pairings, view_round, FileStore, Pairing, PlayerId,
    StateStore, Tournament, TournamentError,
};

/// Live tournament plus where it is saved.
struct AppState {
    tournament: RwLock<Tournament>,
    store: StateStore<FileStore>,
}

type SharedState = Data<AppState>;

/// Server settings read from the environment.
struct Config {
    host: String,
    port: u16,
    data_dir: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| default_host()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| default_data_dir()),
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct StartBody {
    /// Manual round 1; engine pairing when absent.
    #[serde(default)]
    pairings: Option<Vec<Pairing>>,
}

#[derive(Deserialize)]
struct PairingsBody {
    pairings: Vec<Pairing>,
}

#[derive(Deserialize)]
struct ResultBody {
    round: u32,
    player1: PlayerId,
    player2: PlayerId,
    player1_games: u32,
    player2_games: u32,
}

#[derive(Deserialize)]
struct ViewingRoundBody {
    round: Option<u32>,
}

/// Path segment: player id (e.g. /api/tournament/players/{player_id})
#[derive(Deserialize)]
struct PlayerPath {
    player_id: PlayerId,
}

fn error_response(message: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message.to_string() }))
}

/// Run a state transition under the write lock and save the result.
/// A failed transition leaves both memory and disk untouched.
fn mutate<F>(state: &SharedState, op: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    let mut t = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if let Err(e) = op(&mut *t) {
        return error_response(e);
    }
    if let Err(e) = state.store.save(&t) {
        log::error!("Failed to save tournament: {}", e);
    }
    HttpResponse::Ok().json(&*t)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "swiss-tournament-web",
    })
}

/// Full tournament state.
#[get("/api/tournament")]
async fn api_get_tournament(state: SharedState) -> HttpResponse {
    match state.tournament.read() {
        Ok(t) => HttpResponse::Ok().json(&*t),
        Err(_) => HttpResponse::InternalServerError().body("lock error"),
    }
}

/// Ranked players with tiebreakers.
#[get("/api/tournament/standings")]
async fn api_standings(state: SharedState) -> HttpResponse {
    match state.tournament.read() {
        Ok(t) => HttpResponse::Ok().json(t.standings()),
        Err(_) => HttpResponse::InternalServerError().body("lock error"),
    }
}

/// Standings as a CSV download.
#[get("/api/tournament/standings.csv")]
async fn api_standings_csv(state: SharedState) -> HttpResponse {
    let standings = match state.tournament.read() {
        Ok(t) => t.standings(),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match standings_to_csv(&standings) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((header::CONTENT_DISPOSITION, "attachment; filename=\"standings.csv\""))
            .body(csv),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Register a player (Registration only).
#[post("/api/tournament/players")]
async fn api_add_player(state: SharedState, body: Json<AddPlayerBody>) -> HttpResponse {
    mutate(&state, |t| t.add_player(body.name.trim()).map(|_| ()))
}

/// Remove a player by id (Registration only).
#[delete("/api/tournament/players/{player_id}")]
async fn api_remove_player(state: SharedState, path: Path<PlayerPath>) -> HttpResponse {
    mutate(&state, |t| t.remove_player(path.player_id))
}

/// Start the tournament (Registration -> Running), optionally with manual pairings.
#[post("/api/tournament/start")]
async fn api_start_tournament(state: SharedState, body: Option<Json<StartBody>>) -> HttpResponse {
    let pairings = body.and_then(|b| b.into_inner().pairings);
    mutate(&state, |t| match pairings {
        Some(p) => start_tournament_with_pairings(t, p),
        None => start_tournament(t),
    })
}

/// Close the current round and pair the next.
#[post("/api/tournament/rounds/next")]
async fn api_next_round(state: SharedState) -> HttpResponse {
    mutate(&state, generate_next_round)
}

/// Replace the current round's pairings.
#[put("/api/tournament/pairings")]
async fn api_update_pairings(state: SharedState, body: Json<PairingsBody>) -> HttpResponse {
    let pairings = body.into_inner().pairings;
    mutate(&state, |t| update_pairings(t, pairings))
}

/// Report or correct a match result (past rounds rewind the tournament).
#[put("/api/tournament/results")]
async fn api_record_result(state: SharedState, body: Json<ResultBody>) -> HttpResponse {
    mutate(&state, |t| {
        record_match_result(
            t,
            body.round,
            body.player1,
            body.player2,
            body.player1_games,
            body.player2_games,
        )
    })
}

/// Look at a past round (or back at the live one with `null`).
#[put("/api/tournament/viewing-round")]
async fn api_view_round(state: SharedState, body: Json<ViewingRoundBody>) -> HttpResponse {
    mutate(&state, |t| view_round(t, body.round))
}

/// Close the tournament (Running -> Finished).
#[post("/api/tournament/finish")]
async fn api_finish(state: SharedState) -> HttpResponse {
    mutate(&state, finish_tournament)
}

/// Delete everything and clear the saved state.
#[post("/api/tournament/reset")]
async fn api_reset(state: SharedState) -> HttpResponse {
    let mut t = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    reset_tournament(&mut t);
    if let Err(e) = state.store.clear() {
        log::error!("Failed to clear saved tournament: {}", e);
    }
    HttpResponse::Ok().json(&*t)
}

/// Download the full state as JSON.
#[get("/api/tournament/export")]
async fn api_export(state: SharedState) -> HttpResponse {
    let exported = match state.tournament.read() {
        Ok(t) => export_state(&t),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match exported {
        Ok(json) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_file_name(chrono::Utc::now())),
            ))
            .body(json),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Replace the live state with an uploaded export. Rejected uploads change nothing.
#[post("/api/tournament/import")]
async fn api_import(state: SharedState, body: Bytes) -> HttpResponse {
    let text = match std::str::from_utf8(&body) {
        Ok(text) => text,
        Err(_) => return error_response("Upload is not UTF-8 text"),
    };
    let imported = match import_state(text) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("Rejected tournament import: {}", e);
            return error_response(e);
        }
    };
    mutate(&state, move |t| {
        *t = imported;
        Ok(())
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "data".to_string()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let store = StateStore::new(FileStore::new(&config.data_dir));
    let tournament = match store.load() {
        Some(t) => {
            log::info!(
                "Loaded saved tournament ({} players, round {})",
                t.players.len(),
                t.current_round
            );
            t
        }
        None => Tournament::new(),
    };
    let state = Data::new(AppState {
        tournament: RwLock::new(tournament),
        store,
    });

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_get_tournament)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_start_tournament)
            .service(api_next_round)
            .service(api_update_pairings)
            .service(api_record_result)
            .service(api_view_round)
            .service(api_finish)
            .service(api_reset)
            .service(api_export)
            .service(api_import)
    })
    .bind(bind)?
    .run()
    .await
}

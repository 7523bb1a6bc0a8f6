mod analyze;
mod router;
mod state;
mod status;

pub use router::create_router;
pub use state::AppState;

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

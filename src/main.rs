use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exercise_embed::auth::db as auth_db;
use exercise_embed::content::{ArchiveSource, CourseOutline};
use exercise_embed::{build_app, config, db, profiling, AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exercise_embed=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  // Initialize profiling (no-op if feature disabled)
  profiling::init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");

  {
    let conn = db::try_lock(&pool).expect("Database lock failed during startup");

    match auth_db::cleanup_expired_sessions(&conn) {
      Ok(0) => {}
      Ok(n) => tracing::info!("Removed {} expired sessions", n),
      Err(e) => tracing::warn!("Failed to clean up expired sessions: {}", e),
    }

    let outline_path = config::load_outline_path();
    if outline_path.exists() {
      match CourseOutline::load(&outline_path) {
        Ok(outline) => {
          if let Err(e) = db::seed_outline(&conn, &outline) {
            tracing::error!("Failed to seed course outline: {}", e);
          }
        }
        Err(e) => tracing::error!("Invalid course outline {}: {}", outline_path.display(), e),
      }
    } else {
      tracing::warn!(
        "No course outline at {}; first-lesson fallback will find no lessons",
        outline_path.display()
      );
    }
  }

  let archive = ArchiveSource::new(config::load_archive_path());
  if !archive.path().exists() {
    tracing::warn!(
      "Exercise archive {} not found; exercise requests will fail",
      archive.path().display()
    );
  }

  let app = build_app(AppState::new(pool, archive));

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::server_port());

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");

  profiling::shutdown();
}

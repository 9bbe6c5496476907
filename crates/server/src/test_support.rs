use db::DBService;
use uuid::Uuid;

use crate::AppState;

pub(crate) async fn test_state() -> AppState {
    let db_path = std::env::temp_dir().join(format!("todos-test-{}.sqlite", Uuid::new_v4()));
    let database_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
    let db = DBService::connect(&database_url)
        .await
        .expect("connect test database");
    AppState::with_db(db)
}

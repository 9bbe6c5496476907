use db::{DBService, DbErr};

pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
}

impl AppState {
    pub async fn new() -> Result<Self, DbErr> {
        Ok(Self {
            db: DBService::new().await?,
        })
    }

    pub fn with_db(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}

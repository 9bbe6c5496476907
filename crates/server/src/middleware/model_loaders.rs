use std::{fmt::Display, future::Future};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use db::{DBService, models::todo::Todo};
use uuid::Uuid;

use crate::{AppState, http::AuthUser};

pub trait ModelLoaderDeps {
    fn db_service(&self) -> &DBService;
}

impl ModelLoaderDeps for AppState {
    fn db_service(&self) -> &DBService {
        self.db()
    }
}

async fn fetch_model_or_status<M, E, Fut>(
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<M, StatusCode>
where
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(StatusCode::NOT_FOUND)
        }
        Err(error) => {
            tracing::error!("Failed to fetch {model_name} {model_id}: {error}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn load_request_extension<M, E, Fut>(
    request: Request,
    next: Next,
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<Response, StatusCode>
where
    M: Clone + Send + Sync + 'static,
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    let model = fetch_model_or_status(model_name, model_id, load_future).await?;
    let mut request = request;
    request.extensions_mut().insert(model);
    Ok(next.run(request).await)
}

/// Routes nested under a todo id may capture further params (e.g. a subtask
/// id), so the id is picked out of the full capture list by name.
fn todo_id_from_params(params: &[(String, String)]) -> Result<Uuid, StatusCode> {
    params
        .iter()
        .find(|(name, _)| name == "todo_id")
        .and_then(|(_, raw)| raw.parse::<Uuid>().ok())
        .ok_or(StatusCode::BAD_REQUEST)
}

pub async fn load_todo_middleware<S>(
    State(state): State<S>,
    Path(params): Path<Vec<(String, String)>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    S: ModelLoaderDeps,
{
    let todo_id = todo_id_from_params(&params)?;
    let AuthUser(user_id) = *request
        .extensions()
        .get::<AuthUser>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    load_request_extension(
        request,
        next,
        "Todo",
        todo_id,
        Todo::find_by_id_for_user(&state.db_service().pool, todo_id, user_id),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::{fetch_model_or_status, todo_id_from_params};

    #[tokio::test]
    async fn fetch_model_or_status_returns_not_found_on_missing_model() {
        let result = fetch_model_or_status::<String, &'static str, _>(
            "Todo",
            uuid::Uuid::new_v4(),
            async { Ok(None) },
        )
        .await;

        assert_eq!(result.unwrap_err(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fetch_model_or_status_returns_internal_error_on_fetch_failure() {
        let result = fetch_model_or_status::<String, &'static str, _>(
            "Todo",
            uuid::Uuid::new_v4(),
            async { Err("db unavailable") },
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn todo_id_is_found_among_other_captures() {
        let id = uuid::Uuid::new_v4();
        let params = vec![
            ("todo_id".to_string(), id.to_string()),
            ("subtask_id".to_string(), uuid::Uuid::new_v4().to_string()),
        ];
        assert_eq!(todo_id_from_params(&params), Ok(id));

        let malformed = vec![("todo_id".to_string(), "not-a-uuid".to_string())];
        assert_eq!(
            todo_id_from_params(&malformed),
            Err(axum::http::StatusCode::BAD_REQUEST)
        );
    }
}

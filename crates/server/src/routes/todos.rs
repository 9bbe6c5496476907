use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, patch, post},
};
use db::models::{
    bulk::{BulkOutcome, BulkRequest},
    filter::TodoListParams,
    stats::TodoStats,
    todo::{CreateComment, CreateSubtask, CreateTodo, Todo, UpdateTodo},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, http::AuthUser, middleware::load_todo_middleware};

pub async fn list_todos(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<TodoListParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Todo>>>, ApiError> {
    let (filter, window) = params.parse()?;
    let page = Todo::list(&state.db().pool, user_id, &filter, &window).await?;

    Ok(ResponseJson(ApiResponse::paginated(
        page.todos,
        page.pagination,
    )))
}

pub async fn get_todo(
    Extension(todo): Extension<Todo>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<CreateTodo>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating todo '{}' for user {}", payload.title, user_id);

    let todo = Todo::create(&state.db().pool, user_id, &payload, id).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn update_todo(
    Extension(existing): Extension<Todo>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTodo>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    let todo = Todo::update(&state.db().pool, existing.id, existing.user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn toggle_todo(
    Extension(existing): Extension<Todo>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    let todo = Todo::toggle(&state.db().pool, existing.id, existing.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn archive_todo(
    Extension(existing): Extension<Todo>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    let todo = Todo::archive(&state.db().pool, existing.id, existing.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn delete_todo(
    Extension(existing): Extension<Todo>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Todo::delete(&state.db().pool, existing.id, existing.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn add_subtask(
    Extension(existing): Extension<Todo>,
    State(state): State<AppState>,
    Json(payload): Json<CreateSubtask>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    let todo =
        Todo::add_subtask(&state.db().pool, existing.id, existing.user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn toggle_subtask(
    Extension(existing): Extension<Todo>,
    State(state): State<AppState>,
    Path((_todo_id, subtask_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    let todo = Todo::toggle_subtask(
        &state.db().pool,
        existing.id,
        existing.user_id,
        subtask_id,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn add_comment(
    Extension(existing): Extension<Todo>,
    State(state): State<AppState>,
    Json(payload): Json<CreateComment>,
) -> Result<ResponseJson<ApiResponse<Todo>>, ApiError> {
    let todo =
        Todo::add_comment(&state.db().pool, existing.id, existing.user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn todo_stats(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<ResponseJson<ApiResponse<TodoStats>>, ApiError> {
    let stats = TodoStats::for_user(&state.db().pool, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(stats)))
}

pub async fn bulk_mutate(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<BulkRequest>,
) -> Result<ResponseJson<ApiResponse<BulkOutcome>>, ApiError> {
    let modified_count = Todo::bulk_apply(&state.db().pool, user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(BulkOutcome {
        modified_count,
    })))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let todo_actions_router = Router::new()
        .route("/", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/toggle", patch(toggle_todo))
        .route("/archive", patch(archive_todo))
        .route("/subtasks", post(add_subtask))
        .route("/subtasks/{subtask_id}", patch(toggle_subtask))
        .route("/comments", post(add_comment))
        .layer(from_fn_with_state(
            state.clone(),
            load_todo_middleware::<AppState>,
        ));

    let inner = Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/stats/overview", get(todo_stats))
        .route("/bulk", post(bulk_mutate))
        .nest("/{todo_id}", todo_actions_router);

    Router::new().nest("/todos", inner)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use db::{
        models::{bulk::BulkAction, todo::TodoError},
        types::TodoStatus,
    };

    use super::*;
    use crate::test_support::test_state;

    async fn seed(state: &AppState, user_id: Uuid, title: &str) -> Todo {
        Todo::create(
            &state.db().pool,
            user_id,
            &CreateTodo {
                title: title.to_string(),
                ..Default::default()
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_with_blank_title_is_a_validation_failure() {
        let state = test_state().await;
        let user_id = Uuid::new_v4();

        let err = create_todo(
            State(state),
            Extension(AuthUser(user_id)),
            Json(CreateTodo {
                title: "   ".to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            &err,
            ApiError::Todo(TodoError::Validation(errors)) if errors[0].field == "title"
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn toggle_round_trip_through_handlers() {
        let state = test_state().await;
        let user_id = Uuid::new_v4();
        let todo = seed(&state, user_id, "Water plants").await;

        let response = toggle_todo(Extension(todo.clone()), State(state.clone()))
            .await
            .unwrap();
        let toggled = response.0.data.unwrap();
        assert_eq!(toggled.status, TodoStatus::Completed);
        assert!(toggled.completed_at.is_some());

        let response = toggle_todo(Extension(toggled), State(state))
            .await
            .unwrap();
        let toggled = response.0.data.unwrap();
        assert_eq!(toggled.status, TodoStatus::Pending);
        assert!(toggled.completed_at.is_none());
    }

    #[tokio::test]
    async fn list_reports_pagination_window() {
        let state = test_state().await;
        let user_id = Uuid::new_v4();
        for index in 0..3 {
            seed(&state, user_id, &format!("Task {index}")).await;
        }

        let response = list_todos(
            State(state),
            Extension(AuthUser(user_id)),
            Query(TodoListParams {
                limit: Some(2),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let envelope = response.0;
        assert_eq!(envelope.data.as_ref().unwrap().len(), 2);
        let pagination = envelope.pagination.unwrap();
        assert_eq!(pagination.current, 1);
        assert_eq!(pagination.pages, 2);
        assert_eq!(pagination.total, 3);
    }

    #[tokio::test]
    async fn stats_for_fresh_user_are_all_zero() {
        let state = test_state().await;

        let response = todo_stats(State(state), Extension(AuthUser(Uuid::new_v4())))
            .await
            .unwrap();
        let stats = response.0.data.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.high_priority, 0);
        assert_eq!(stats.overdue, 0);
    }

    #[tokio::test]
    async fn bulk_delete_reports_owned_subset_count() {
        let state = test_state().await;
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mine_a = seed(&state, owner, "Mine A").await;
        let mine_b = seed(&state, owner, "Mine B").await;
        let theirs = seed(&state, other, "Theirs").await;

        let response = bulk_mutate(
            State(state),
            Extension(AuthUser(owner)),
            Json(BulkRequest {
                action: BulkAction::Delete,
                todo_ids: vec![mine_a.id, mine_b.id, theirs.id],
                status: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.data.unwrap().modified_count, 2);
    }

    #[tokio::test]
    async fn toggling_unknown_subtask_returns_not_found() {
        let state = test_state().await;
        let user_id = Uuid::new_v4();
        let todo = seed(&state, user_id, "Trip prep").await;

        let err = toggle_subtask(
            Extension(todo.clone()),
            State(state),
            Path((todo.id, Uuid::new_v4())),
        )
        .await
        .unwrap_err();

        assert!(matches!(&err, ApiError::Todo(TodoError::SubtaskNotFound)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}

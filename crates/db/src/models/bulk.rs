use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utils::response::FieldError;
use uuid::Uuid;

use crate::{
    entities::todo,
    models::todo::{Todo, TodoError},
    types::TodoStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BulkAction {
    Delete,
    Archive,
    UpdateStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub action: BulkAction,
    pub todo_ids: Vec<Uuid>,
    pub status: Option<TodoStatus>,
}

/// How many records the bulk action actually touched. Ids that don't exist
/// or belong to another user are skipped, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub modified_count: u64,
}

impl BulkRequest {
    pub fn validate(&self) -> Result<(), TodoError> {
        let mut errors = Vec::new();
        if self.todo_ids.is_empty() {
            errors.push(FieldError::new(
                "todoIds",
                "At least one todo id is required",
            ));
        }
        if self.action == BulkAction::UpdateStatus && self.status.is_none() {
            errors.push(FieldError::new(
                "status",
                "Status is required for the update-status action",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TodoError::Validation(errors))
        }
    }
}

impl Todo {
    /// Applies one action across the caller's subset of the given ids and
    /// returns the number of rows affected.
    pub async fn bulk_apply<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        request: &BulkRequest,
    ) -> Result<u64, TodoError> {
        request.validate()?;

        let owned = Condition::all()
            .add(todo::Column::Uuid.is_in(request.todo_ids.iter().copied()))
            .add(todo::Column::UserId.eq(user_id));
        let now = Utc::now();

        let rows_affected = match request.action {
            BulkAction::Delete => {
                todo::Entity::delete_many()
                    .filter(owned)
                    .exec(db)
                    .await?
                    .rows_affected
            }
            BulkAction::Archive => {
                todo::Entity::update_many()
                    .col_expr(todo::Column::Archived, Expr::value(true))
                    .col_expr(todo::Column::UpdatedAt, Expr::value(now))
                    .filter(owned)
                    .exec(db)
                    .await?
                    .rows_affected
            }
            BulkAction::UpdateStatus => {
                // Presence is checked in validate.
                let status = request.status.clone().ok_or_else(|| {
                    TodoError::Validation(vec![FieldError::new(
                        "status",
                        "Status is required for the update-status action",
                    )])
                })?;

                let mut update = todo::Entity::update_many()
                    .col_expr(todo::Column::Status, Expr::value(status.clone()))
                    .col_expr(todo::Column::UpdatedAt, Expr::value(now));
                // Completion is stamped here; moving a completed todo to
                // another status via bulk leaves the old stamp in place.
                if status == TodoStatus::Completed {
                    update = update.col_expr(todo::Column::CompletedAt, Expr::value(Some(now)));
                }
                update.filter(owned).exec(db).await?.rows_affected
            }
        };

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            filter::TodoListParams,
            stats::TodoStats,
            todo::CreateTodo,
        },
        test_support::test_db,
        types::TodoPriority,
    };

    async fn seed(service: &crate::DBService, user_id: Uuid, title: &str) -> Todo {
        Todo::create(
            &service.pool,
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

    #[test]
    fn update_status_without_status_is_rejected() {
        let request = BulkRequest {
            action: BulkAction::UpdateStatus,
            todo_ids: vec![Uuid::new_v4()],
            status: None,
        };
        let TodoError::Validation(errors) = request.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "status");
    }

    #[test]
    fn empty_id_set_is_rejected() {
        let request = BulkRequest {
            action: BulkAction::Delete,
            todo_ids: Vec::new(),
            status: None,
        };
        assert!(matches!(
            request.validate(),
            Err(TodoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_skips_ids_owned_by_other_users() {
        let service = test_db().await;
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mine_a = seed(&service, owner, "Mine A").await;
        let mine_b = seed(&service, owner, "Mine B").await;
        let theirs = seed(&service, other, "Theirs").await;

        let affected = Todo::bulk_apply(
            &service.pool,
            owner,
            &BulkRequest {
                action: BulkAction::Delete,
                todo_ids: vec![mine_a.id, mine_b.id, theirs.id],
                status: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(affected, 2);
        assert!(
            Todo::find_by_id_for_user(&service.pool, theirs.id, other)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn update_status_stamps_completion_but_never_clears_it() {
        let service = test_db().await;
        let user_id = Uuid::new_v4();
        let todo = seed(&service, user_id, "Ship release").await;

        let affected = Todo::bulk_apply(
            &service.pool,
            user_id,
            &BulkRequest {
                action: BulkAction::UpdateStatus,
                todo_ids: vec![todo.id],
                status: Some(TodoStatus::Completed),
            },
        )
        .await
        .unwrap();
        assert_eq!(affected, 1);

        let completed = Todo::find_by_id_for_user(&service.pool, todo.id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, TodoStatus::Completed);
        let stamp = completed.completed_at.expect("completion stamped");

        Todo::bulk_apply(
            &service.pool,
            user_id,
            &BulkRequest {
                action: BulkAction::UpdateStatus,
                todo_ids: vec![todo.id],
                status: Some(TodoStatus::Pending),
            },
        )
        .await
        .unwrap();

        let reopened = Todo::find_by_id_for_user(&service.pool, todo.id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reopened.status, TodoStatus::Pending);
        assert_eq!(reopened.completed_at, Some(stamp));
    }

    #[tokio::test]
    async fn archive_hides_todos_from_listing_and_stats() {
        let service = test_db().await;
        let user_id = Uuid::new_v4();
        let todo = seed(&service, user_id, "Old chore").await;
        Todo::create(
            &service.pool,
            user_id,
            &CreateTodo {
                title: "Visible".to_string(),
                priority: Some(TodoPriority::High),
                ..Default::default()
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        Todo::bulk_apply(
            &service.pool,
            user_id,
            &BulkRequest {
                action: BulkAction::Archive,
                todo_ids: vec![todo.id],
                status: None,
            },
        )
        .await
        .unwrap();

        let (filter, window) = TodoListParams::default().parse().unwrap();
        let page = Todo::list(&service.pool, user_id, &filter, &window)
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.todos[0].title, "Visible");

        let stats = TodoStats::for_user(&service.pool, user_id).await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.high_priority, 1);
    }
}

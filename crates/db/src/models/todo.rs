use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utils::response::FieldError;
use uuid::Uuid;

use crate::{
    entities::todo,
    types::{TodoPriority, TodoStatus},
};

pub(crate) const TITLE_MAX_CHARS: usize = 200;
pub(crate) const DESCRIPTION_MAX_CHARS: usize = 1000;
pub(crate) const CATEGORY_MAX_CHARS: usize = 50;
pub(crate) const TAG_MAX_CHARS: usize = 30;
pub(crate) const COMMENT_MAX_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("Todo not found")]
    TodoNotFound,
    #[error("Subtask not found")]
    SubtaskNotFound,
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
}

/// A checklist entry embedded in its parent todo. The id is generated when
/// the subtask is appended and stays stable for toggling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// File metadata only; the binary lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: TodoPriority,
    pub status: TodoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub starred: bool,
    pub archived: bool,
    pub order: i64,
    pub subtasks: Vec<Subtask>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<String>,
    pub starred: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    pub status: Option<TodoStatus>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<String>,
    pub starred: Option<bool>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubtask {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub text: String,
}

fn check_required(field: &str, label: &str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
    }
}

fn check_max_chars(field: &str, label: &str, value: &str, max: usize, errors: &mut Vec<FieldError>) {
    if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
}

fn check_tags(tags: &[String], errors: &mut Vec<FieldError>) {
    if tags
        .iter()
        .any(|tag| tag.chars().count() > TAG_MAX_CHARS)
    {
        errors.push(FieldError::new(
            "tags",
            format!("Tags must be at most {TAG_MAX_CHARS} characters each"),
        ));
    }
}

fn finish_validation(errors: Vec<FieldError>) -> Result<(), TodoError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TodoError::Validation(errors))
    }
}

impl CreateTodo {
    pub fn validate(&self) -> Result<(), TodoError> {
        let mut errors = Vec::new();
        check_required("title", "Title", &self.title, &mut errors);
        check_max_chars("title", "Title", &self.title, TITLE_MAX_CHARS, &mut errors);
        if let Some(description) = &self.description {
            check_max_chars(
                "description",
                "Description",
                description,
                DESCRIPTION_MAX_CHARS,
                &mut errors,
            );
        }
        if let Some(category) = &self.category {
            check_max_chars("category", "Category", category, CATEGORY_MAX_CHARS, &mut errors);
        }
        if let Some(tags) = &self.tags {
            check_tags(tags, &mut errors);
        }
        finish_validation(errors)
    }
}

impl UpdateTodo {
    pub fn validate(&self) -> Result<(), TodoError> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            check_required("title", "Title", title, &mut errors);
            check_max_chars("title", "Title", title, TITLE_MAX_CHARS, &mut errors);
        }
        if let Some(description) = &self.description {
            check_max_chars(
                "description",
                "Description",
                description,
                DESCRIPTION_MAX_CHARS,
                &mut errors,
            );
        }
        if let Some(category) = &self.category {
            check_max_chars("category", "Category", category, CATEGORY_MAX_CHARS, &mut errors);
        }
        if let Some(tags) = &self.tags {
            check_tags(tags, &mut errors);
        }
        finish_validation(errors)
    }
}

impl CreateSubtask {
    pub fn validate(&self) -> Result<(), TodoError> {
        let mut errors = Vec::new();
        check_required("title", "Subtask title", &self.title, &mut errors);
        check_max_chars("title", "Subtask title", &self.title, TITLE_MAX_CHARS, &mut errors);
        finish_validation(errors)
    }
}

impl CreateComment {
    pub fn validate(&self) -> Result<(), TodoError> {
        let mut errors = Vec::new();
        check_required("text", "Comment text", &self.text, &mut errors);
        check_max_chars("text", "Comment text", &self.text, COMMENT_MAX_CHARS, &mut errors);
        finish_validation(errors)
    }
}

/// Toggle only moves between completed and pending: anything not yet
/// completed completes, and a completed todo reopens as pending.
pub(crate) fn toggle_transition(status: &TodoStatus) -> TodoStatus {
    match status {
        TodoStatus::Completed => TodoStatus::Pending,
        _ => TodoStatus::Completed,
    }
}

pub(crate) fn completed_at_after_transition(
    previous: &TodoStatus,
    next: &TodoStatus,
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (
        *previous == TodoStatus::Completed,
        *next == TodoStatus::Completed,
    ) {
        (false, true) => Some(now),
        (true, false) => None,
        _ => current,
    }
}

fn normalized(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Todo {
    pub(crate) fn from_model(model: todo::Model) -> Result<Self, TodoError> {
        Ok(Self {
            id: model.uuid,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            priority: model.priority,
            status: model.status,
            category: model.category,
            tags: serde_json::from_value(model.tags)?,
            due_date: model.due_date,
            due_time: model.due_time,
            completed_at: model.completed_at.map(Into::into),
            starred: model.starred,
            archived: model.archived,
            order: model.sort_order,
            subtasks: serde_json::from_value(model.subtasks)?,
            comments: serde_json::from_value(model.comments)?,
            attachments: serde_json::from_value(model.attachments)?,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    async fn owned_record<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<todo::Model, TodoError> {
        todo::Entity::find()
            .filter(todo::Column::Uuid.eq(id))
            .filter(todo::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(TodoError::TodoNotFound)
    }

    pub async fn find_by_id_for_user<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, TodoError> {
        let record = todo::Entity::find()
            .filter(todo::Column::Uuid.eq(id))
            .filter(todo::Column::UserId.eq(user_id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(model)?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        data: &CreateTodo,
        todo_id: Uuid,
    ) -> Result<Self, TodoError> {
        data.validate()?;

        let now = Utc::now();
        let tags = data.tags.clone().unwrap_or_default();
        let active = todo::ActiveModel {
            uuid: Set(todo_id),
            user_id: Set(user_id),
            title: Set(data.title.trim().to_string()),
            description: Set(data.description.as_deref().and_then(normalized)),
            priority: Set(data.priority.clone().unwrap_or_default()),
            status: Set(TodoStatus::default()),
            category: Set(data.category.as_deref().and_then(normalized)),
            tags: Set(serde_json::to_value(&tags)?),
            due_date: Set(data.due_date),
            due_time: Set(data.due_time.as_deref().and_then(normalized)),
            completed_at: Set(None),
            starred: Set(data.starred.unwrap_or(false)),
            archived: Set(false),
            sort_order: Set(0),
            subtasks: Set(serde_json::json!([])),
            comments: Set(serde_json::json!([])),
            attachments: Set(serde_json::json!([])),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(model)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        data: &UpdateTodo,
    ) -> Result<Self, TodoError> {
        data.validate()?;

        let record = Self::owned_record(db, id, user_id).await?;
        let now = Utc::now();
        let previous_status = record.status.clone();
        let previous_completed_at = record.completed_at.map(Into::into);

        let mut active: todo::ActiveModel = record.into();
        if let Some(title) = &data.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = &data.description {
            // Empty string clears the field, mirroring the update surface.
            active.description = Set(normalized(description));
        }
        if let Some(priority) = &data.priority {
            active.priority = Set(priority.clone());
        }
        if let Some(status) = &data.status {
            active.status = Set(status.clone());
            active.completed_at = Set(completed_at_after_transition(
                &previous_status,
                status,
                previous_completed_at,
                now,
            )
            .map(Into::into));
        }
        if let Some(category) = &data.category {
            active.category = Set(normalized(category));
        }
        if let Some(tags) = &data.tags {
            active.tags = Set(serde_json::to_value(tags)?);
        }
        if let Some(due_date) = data.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(due_time) = &data.due_time {
            active.due_time = Set(normalized(due_time));
        }
        if let Some(starred) = data.starred {
            active.starred = Set(starred);
        }
        if let Some(order) = data.order {
            active.sort_order = Set(order);
        }
        active.updated_at = Set(now.into());

        let updated = active.update(db).await?;
        Self::from_model(updated)
    }

    pub async fn toggle<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, TodoError> {
        let record = Self::owned_record(db, id, user_id).await?;
        let now = Utc::now();
        let next = toggle_transition(&record.status);
        let completed_at = if next == TodoStatus::Completed {
            Some(now)
        } else {
            None
        };

        let mut active: todo::ActiveModel = record.into();
        active.status = Set(next);
        active.completed_at = Set(completed_at.map(Into::into));
        active.updated_at = Set(now.into());

        let updated = active.update(db).await?;
        Self::from_model(updated)
    }

    pub async fn archive<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, TodoError> {
        let record = Self::owned_record(db, id, user_id).await?;
        let mut active: todo::ActiveModel = record.into();
        active.archived = Set(true);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(updated)
    }

    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, TodoError> {
        let result = todo::Entity::delete_many()
            .filter(todo::Column::Uuid.eq(id))
            .filter(todo::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn add_subtask<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        data: &CreateSubtask,
    ) -> Result<Self, TodoError> {
        data.validate()?;

        let record = Self::owned_record(db, id, user_id).await?;
        let now = Utc::now();
        let mut subtasks: Vec<Subtask> = serde_json::from_value(record.subtasks.clone())?;
        subtasks.push(Subtask {
            id: Uuid::new_v4(),
            title: data.title.trim().to_string(),
            completed: false,
            created_at: now,
        });

        let mut active: todo::ActiveModel = record.into();
        active.subtasks = Set(serde_json::to_value(&subtasks)?);
        active.updated_at = Set(now.into());

        let updated = active.update(db).await?;
        Self::from_model(updated)
    }

    pub async fn toggle_subtask<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        subtask_id: Uuid,
    ) -> Result<Self, TodoError> {
        let record = Self::owned_record(db, id, user_id).await?;
        let now = Utc::now();
        let mut subtasks: Vec<Subtask> = serde_json::from_value(record.subtasks.clone())?;
        let subtask = subtasks
            .iter_mut()
            .find(|subtask| subtask.id == subtask_id)
            .ok_or(TodoError::SubtaskNotFound)?;
        subtask.completed = !subtask.completed;

        let mut active: todo::ActiveModel = record.into();
        active.subtasks = Set(serde_json::to_value(&subtasks)?);
        active.updated_at = Set(now.into());

        let updated = active.update(db).await?;
        Self::from_model(updated)
    }

    pub async fn add_comment<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        data: &CreateComment,
    ) -> Result<Self, TodoError> {
        data.validate()?;

        let record = Self::owned_record(db, id, user_id).await?;
        let now = Utc::now();
        let mut comments: Vec<Comment> = serde_json::from_value(record.comments.clone())?;
        comments.push(Comment {
            id: Uuid::new_v4(),
            text: data.text.trim().to_string(),
            user_id,
            created_at: now,
        });

        let mut active: todo::ActiveModel = record.into();
        active.comments = Set(serde_json::to_value(&comments)?);
        active.updated_at = Set(now.into());

        let updated = active.update(db).await?;
        Self::from_model(updated)
    }
}

use sea_orm::JsonValue;
use sea_orm::entity::prelude::*;

use crate::types::{TodoPriority, TodoStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TodoPriority,
    pub status: TodoStatus,
    pub category: Option<String>,
    pub tags: JsonValue,
    pub due_date: Option<Date>,
    pub due_time: Option<String>,
    pub completed_at: Option<DateTimeUtc>,
    pub starred: bool,
    pub archived: bool,
    pub sort_order: i64,
    pub subtasks: JsonValue,
    pub comments: JsonValue,
    pub attachments: JsonValue,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use std::str::FromStr;

use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use serde::Deserialize;
use utils::response::{FieldError, Pagination};
use uuid::Uuid;

use crate::{
    entities::todo,
    models::todo::{Todo, TodoError},
    types::{TodoPriority, TodoStatus},
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// The sentinel clients send to mean "no filter" for a field.
const FILTER_ALL: &str = "all";

/// Raw listing parameters as they arrive on the query string. Everything is
/// optional; `parse` turns them into a typed filter or a validation error
/// before any query runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub starred: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub category: Option<String>,
    pub starred: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone)]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub pagination: Pagination,
}

fn parse_token<T: FromStr>(
    field: &str,
    raw: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = raw?;
    if raw == FILTER_ALL {
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(
                field,
                format!("Unrecognized {field} value '{raw}'"),
            ));
            None
        }
    }
}

impl TodoListParams {
    pub fn parse(&self) -> Result<(TodoFilter, PageWindow), TodoError> {
        let mut errors = Vec::new();

        let status = parse_token::<TodoStatus>("status", self.status.as_deref(), &mut errors);
        let priority =
            parse_token::<TodoPriority>("priority", self.priority.as_deref(), &mut errors);
        let starred = match self.starred.as_deref() {
            None | Some(FILTER_ALL) => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                errors.push(FieldError::new(
                    "starred",
                    format!("Unrecognized starred value '{other}'"),
                ));
                None
            }
        };
        let category = self
            .category
            .as_deref()
            .filter(|value| *value != FILTER_ALL)
            .map(str::to_string);
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            errors.push(FieldError::new("page", "Page must be at least 1"));
        }
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            errors.push(FieldError::new(
                "limit",
                format!("Limit must be between 1 and {MAX_LIMIT}"),
            ));
        }

        if !errors.is_empty() {
            return Err(TodoError::Validation(errors));
        }

        Ok((
            TodoFilter {
                status,
                priority,
                category,
                starred,
                search,
            },
            PageWindow {
                page: page as u64,
                limit: limit as u64,
            },
        ))
    }
}

impl TodoFilter {
    /// Builds the listing query. Every variant is scoped to the owner and
    /// excludes archived todos; ordering is fixed regardless of filters.
    pub fn select(&self, user_id: Uuid) -> Select<todo::Entity> {
        let mut query = todo::Entity::find()
            .filter(todo::Column::UserId.eq(user_id))
            .filter(todo::Column::Archived.eq(false));

        if let Some(status) = &self.status {
            query = query.filter(todo::Column::Status.eq(status.clone()));
        }
        if let Some(priority) = &self.priority {
            query = query.filter(todo::Column::Priority.eq(priority.clone()));
        }
        if let Some(category) = &self.category {
            query = query.filter(todo::Column::Category.eq(category.clone()));
        }
        if let Some(starred) = self.starred {
            query = query.filter(todo::Column::Starred.eq(starred));
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            todo::Entity,
                            todo::Column::Title,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            todo::Entity,
                            todo::Column::Description,
                        ))))
                        .like(pattern),
                    ),
            );
        }

        query
            .order_by_asc(todo::Column::SortOrder)
            .order_by_desc(todo::Column::CreatedAt)
    }
}

impl Todo {
    pub async fn list<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        filter: &TodoFilter,
        window: &PageWindow,
    ) -> Result<TodoPage, TodoError> {
        let total = filter.select(user_id).count(db).await?;
        let models = filter
            .select(user_id)
            .offset(window.offset())
            .limit(window.limit)
            .all(db)
            .await?;

        let todos = models
            .into_iter()
            .map(Todo::from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TodoPage {
            todos,
            pagination: Pagination {
                current: window.page,
                pages: total.div_ceil(window.limit),
                total,
            },
        })
    }
}

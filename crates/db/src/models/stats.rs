use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    entities::todo,
    models::todo::{Todo, TodoError},
    types::{TodoPriority, TodoStatus},
};

/// Per-user summary counts over non-archived todos. Always fully populated;
/// a user with no todos gets explicit zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub high_priority: u64,
    pub overdue: u64,
}

/// Resolves the instant a todo is due. The date carries the day; the
/// free-form time string supplies the time of day when it parses, otherwise
/// the due instant falls back to midnight UTC. No date means never due.
pub(crate) fn due_instant(
    due_date: Option<NaiveDate>,
    due_time: Option<&str>,
) -> Option<DateTime<Utc>> {
    let date = due_date?;
    let time = due_time
        .and_then(parse_time_of_day)
        .unwrap_or(NaiveTime::MIN);
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

impl TodoStats {
    /// Single pass accumulating all six counters.
    pub fn fold<'a>(todos: impl IntoIterator<Item = &'a Todo>, now: DateTime<Utc>) -> Self {
        let mut stats = TodoStats::default();
        for todo in todos {
            stats.total += 1;
            match todo.status {
                TodoStatus::Completed => stats.completed += 1,
                TodoStatus::Pending => stats.pending += 1,
                TodoStatus::InProgress => stats.in_progress += 1,
            }
            if todo.priority == TodoPriority::High {
                stats.high_priority += 1;
            }
            if todo.status != TodoStatus::Completed
                && due_instant(todo.due_date, todo.due_time.as_deref())
                    .is_some_and(|due| due < now)
            {
                stats.overdue += 1;
            }
        }
        stats
    }

    pub async fn for_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Self, TodoError> {
        let models = todo::Entity::find()
            .filter(todo::Column::UserId.eq(user_id))
            .filter(todo::Column::Archived.eq(false))
            .all(db)
            .await?;

        let todos = models
            .into_iter()
            .map(Todo::from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::fold(&todos, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn sample_todo(status: TodoStatus, priority: TodoPriority) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "todo".to_string(),
            description: None,
            priority,
            status,
            category: None,
            tags: Vec::new(),
            due_date: None,
            due_time: None,
            completed_at: None,
            starred: false,
            archived: false,
            order: 0,
            subtasks: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn due_instant_combines_date_and_time_in_utc() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let midnight = due_instant(Some(date), None).unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());

        let evening = due_instant(Some(date), Some("23:59")).unwrap();
        assert_eq!(evening, Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 0).unwrap());

        let with_seconds = due_instant(Some(date), Some("08:30:15")).unwrap();
        assert_eq!(
            with_seconds,
            Utc.with_ymd_and_hms(2026, 3, 14, 8, 30, 15).unwrap()
        );

        // Unparseable time falls back to midnight; no date means never due.
        assert_eq!(due_instant(Some(date), Some("late evening")), Some(midnight));
        assert_eq!(due_instant(None, Some("23:59")), None);
    }

    #[test]
    fn fold_on_no_todos_is_explicit_zeros() {
        let stats = TodoStats::fold(std::iter::empty::<&Todo>(), Utc::now());
        assert_eq!(stats, TodoStats::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.overdue, 0);
    }

    #[test]
    fn fold_counts_statuses_priorities_and_overdue() {
        let now = Utc::now();
        let yesterday = (now - Duration::days(1)).date_naive();

        let mut past_due = sample_todo(TodoStatus::Pending, TodoPriority::High);
        past_due.due_date = Some(yesterday);

        let mut completed_past_due = sample_todo(TodoStatus::Completed, TodoPriority::Low);
        completed_past_due.due_date = Some(yesterday);

        let in_progress = sample_todo(TodoStatus::InProgress, TodoPriority::Medium);

        let stats = TodoStats::fold([&past_due, &completed_past_due, &in_progress], now);
        assert_eq!(
            stats,
            TodoStats {
                total: 3,
                completed: 1,
                pending: 1,
                in_progress: 1,
                high_priority: 1,
                overdue: 1,
            }
        );
    }

    #[test]
    fn due_time_boundary_controls_overdue() {
        let noon = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let mut todo = sample_todo(TodoStatus::Pending, TodoPriority::Medium);
        todo.due_date = Some(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        todo.due_time = Some("23:59".to_string());

        assert_eq!(TodoStats::fold([&todo], noon).overdue, 0);

        let past = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(TodoStats::fold([&todo], past).overdue, 1);
    }
}

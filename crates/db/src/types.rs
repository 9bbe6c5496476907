use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TodoStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TodoPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tokens_round_trip() {
        assert_eq!("in-progress".parse::<TodoStatus>(), Ok(TodoStatus::InProgress));
        assert_eq!(TodoStatus::InProgress.to_string(), "in-progress");
        assert_eq!("pending".parse::<TodoStatus>(), Ok(TodoStatus::Pending));
        assert!("done".parse::<TodoStatus>().is_err());
    }

    #[test]
    fn priority_tokens_round_trip() {
        assert_eq!("high".parse::<TodoPriority>(), Ok(TodoPriority::High));
        assert_eq!(TodoPriority::Low.to_string(), "low");
        assert!("urgent".parse::<TodoPriority>().is_err());
    }
}

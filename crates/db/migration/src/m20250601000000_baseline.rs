use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Todos::Table)
                    .col(pk_id_col(manager, Todos::Id))
                    .col(uuid_col(Todos::Uuid))
                    .col(uuid_col(Todos::UserId))
                    .col(ColumnDef::new(Todos::Title).string().not_null())
                    .col(ColumnDef::new(Todos::Description).text())
                    .col(
                        ColumnDef::new(Todos::Priority)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(
                        ColumnDef::new(Todos::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("pending")),
                    )
                    .col(ColumnDef::new(Todos::Category).string())
                    .col(json_col(Todos::Tags))
                    .col(ColumnDef::new(Todos::DueDate).date())
                    .col(ColumnDef::new(Todos::DueTime).string())
                    .col(ColumnDef::new(Todos::CompletedAt).timestamp())
                    .col(
                        ColumnDef::new(Todos::Starred)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(
                        ColumnDef::new(Todos::Archived)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(
                        ColumnDef::new(Todos::SortOrder)
                            .big_integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(json_col(Todos::Subtasks))
                    .col(json_col(Todos::Comments))
                    .col(json_col(Todos::Attachments))
                    .col(timestamp_col(Todos::CreatedAt))
                    .col(timestamp_col(Todos::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_todos_uuid")
                    .table(Todos::Table)
                    .col(Todos::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_todos_user_id")
                    .table(Todos::Table)
                    .col(Todos::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_todos_user_id_archived")
                    .table(Todos::Table)
                    .col(Todos::UserId)
                    .col(Todos::Archived)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_todos_status")
                    .table(Todos::Table)
                    .col(Todos::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Todos::Table).to_owned())
            .await
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn json_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).json().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Todos {
    Table,
    Id,
    Uuid,
    UserId,
    Title,
    Description,
    Priority,
    Status,
    Category,
    Tags,
    DueDate,
    DueTime,
    CompletedAt,
    Starred,
    Archived,
    SortOrder,
    Subtasks,
    Comments,
    Attachments,
    CreatedAt,
    UpdatedAt,
}

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Goodreads books, keyed by their Goodreads id
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS books (
            book_id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            brn TEXT,
            availability TEXT
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Library branches, keyed by catalogue branch code
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS libraries (
            branch_code TEXT PRIMARY KEY NOT NULL,
            branch_name TEXT NOT NULL,
            closed BOOLEAN NOT NULL DEFAULT 0
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_libraries_closed ON libraries(closed)".to_owned(),
    ))
    .await?;

    tracing::debug!("Database migrations applied");
    Ok(())
}

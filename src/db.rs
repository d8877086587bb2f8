use crate::config::AppConfig;
use crate::entities::{
    allocation, branch, branch_user, chart_of_account, form, form_sequence, payment_order_detail,
    purchase_down_payment, purchase_invoice, purchase_payment_order, purchase_return,
    setting_journal, supplier, user, user_activity,
};
use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;
use tracing::info;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establish a connection pool from the application configuration. When
/// `auto_migrate` is set, missing tables are created from the entity
/// definitions (tests and local sqlite runs; production uses managed DDL).
pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(url = %config.database_url, "database connection established");

    if config.auto_migrate {
        create_schema(&db).await?;
    }
    Ok(db)
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Create all tables (and the supporting indexes) from the entity
/// definitions. Idempotent.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, branch::Entity).await?;
    create_table(db, branch_user::Entity).await?;
    create_table(db, supplier::Entity).await?;
    create_table(db, allocation::Entity).await?;
    create_table(db, chart_of_account::Entity).await?;
    create_table(db, setting_journal::Entity).await?;
    create_table(db, purchase_invoice::Entity).await?;
    create_table(db, purchase_down_payment::Entity).await?;
    create_table(db, purchase_return::Entity).await?;
    create_table(db, purchase_payment_order::Entity).await?;
    create_table(db, payment_order_detail::Entity).await?;
    create_table(db, form::Entity).await?;
    create_table(db, form_sequence::Entity).await?;
    create_table(db, user_activity::Entity).await?;

    // The numbering counter is keyed by (prefix, month group).
    let backend = db.get_database_backend();
    let index = Index::create()
        .name("uq_form_sequences_prefix_group")
        .table(form_sequence::Entity)
        .col(form_sequence::Column::Prefix)
        .col(form_sequence::Column::IncrementGroup)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&index)).await?;

    info!("schema ready");
    Ok(())
}

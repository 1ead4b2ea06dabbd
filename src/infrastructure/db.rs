use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Statement,
};

use crate::domain::amenity_name_key;
use crate::models::{property_amenity, room_amenity};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            external_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            description TEXT,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_properties_owner ON properties(owner_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_properties_status ON properties(status)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id TEXT PRIMARY KEY NOT NULL,
            property_id TEXT NOT NULL,
            room_type TEXT NOT NULL,
            description TEXT,
            price REAL NOT NULL CHECK (price > 0),
            capacity INTEGER NOT NULL CHECK (capacity > 0),
            is_available BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (property_id) REFERENCES properties(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_rooms_property ON rooms(property_id)",
    )
    .await?;

    // Amenity catalogs: global entries are shared, custom ones live while linked
    for table in ["property_amenities", "room_amenities"] {
        execute(
            db,
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    name_key TEXT NOT NULL DEFAULT '',
                    category TEXT,
                    description TEXT,
                    is_global BOOLEAN NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                )
                "#
            ),
        )
        .await?;

        // Catalogs created before name_key existed (ignore error if column exists)
        let _ = execute(
            db,
            &format!("ALTER TABLE {table} ADD COLUMN name_key TEXT NOT NULL DEFAULT ''"),
        )
        .await;

        execute(
            db,
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_name_key ON {table}(name_key)"),
        )
        .await?;
    }
    backfill_name_keys(db).await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS property_amenity_links (
            property_id TEXT NOT NULL,
            amenity_id TEXT NOT NULL,
            custom_description TEXT,
            created_at TEXT NOT NULL,
            PRIMARY KEY (property_id, amenity_id),
            FOREIGN KEY (property_id) REFERENCES properties(id) ON DELETE CASCADE,
            FOREIGN KEY (amenity_id) REFERENCES property_amenities(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS room_amenity_links (
            room_id TEXT NOT NULL,
            amenity_id TEXT NOT NULL,
            custom_description TEXT,
            created_at TEXT NOT NULL,
            PRIMARY KEY (room_id, amenity_id),
            FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE,
            FOREIGN KEY (amenity_id) REFERENCES room_amenities(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_property_amenity_links_amenity ON property_amenity_links(amenity_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_room_amenity_links_amenity ON room_amenity_links(amenity_id)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS media (
            id TEXT PRIMARY KEY NOT NULL,
            property_id TEXT,
            room_id TEXT,
            file_name TEXT NOT NULL,
            file_type TEXT,
            storage_path TEXT NOT NULL,
            description TEXT,
            inserted_at TEXT NOT NULL,
            CHECK ((property_id IS NULL) <> (room_id IS NULL)),
            FOREIGN KEY (property_id) REFERENCES properties(id) ON DELETE CASCADE,
            FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_media_property ON media(property_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_media_room ON media(room_id)",
    )
    .await?;

    tracing::debug!("Database migrations applied");
    Ok(())
}

/// Fill in lookup keys for catalog rows written before the column existed.
/// Keys always come from `amenity_name_key`, never from SQL `lower()`.
async fn backfill_name_keys(db: &DatabaseConnection) -> Result<(), DbErr> {
    let rows: Vec<(String, String)> = property_amenity::Entity::find()
        .filter(property_amenity::Column::NameKey.eq(""))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.id, row.name))
        .collect();
    for (id, name) in &rows {
        property_amenity::Entity::update_many()
            .col_expr(property_amenity::Column::NameKey, Expr::value(amenity_name_key(name)))
            .filter(property_amenity::Column::Id.eq(id.as_str()))
            .exec(db)
            .await?;
    }

    let rows: Vec<(String, String)> = room_amenity::Entity::find()
        .filter(room_amenity::Column::NameKey.eq(""))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.id, row.name))
        .collect();
    for (id, name) in &rows {
        room_amenity::Entity::update_many()
            .col_expr(room_amenity::Column::NameKey, Expr::value(amenity_name_key(name)))
            .filter(room_amenity::Column::Id.eq(id.as_str()))
            .exec(db)
            .await?;
    }

    Ok(())
}

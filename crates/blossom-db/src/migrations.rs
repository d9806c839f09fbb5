use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE categories (
                id          TEXT PRIMARY KEY,
                name        TEXT UNIQUE,
                description TEXT,
                create_at   TEXT
            );

            -- No foreign key on category_id: deleting a category leaves its flowers in place.
            CREATE TABLE flowers (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT,
                price       REAL NOT NULL CHECK (price >= 0),
                category_id TEXT NOT NULL,
                image_url   TEXT,
                stock       INTEGER NOT NULL CHECK (stock >= 0),
                is_featured INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_flowers_category ON flowers(category_id);

            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                google_id       TEXT UNIQUE,
                email           TEXT NOT NULL UNIQUE,
                display_name    TEXT,
                profile_picture TEXT,
                is_admin        INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE wishlists (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL UNIQUE REFERENCES users(id),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE wishlist_flowers (
                wishlist_id TEXT NOT NULL REFERENCES wishlists(id) ON DELETE CASCADE,
                flower_id   TEXT NOT NULL,
                PRIMARY KEY (wishlist_id, flower_id)
            );

            CREATE TABLE orders (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id),
                total_amount    REAL NOT NULL CHECK (total_amount >= 0),
                status          TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'processing', 'shipped', 'delivered', 'cancelled')),
                street          TEXT NOT NULL,
                city            TEXT NOT NULL,
                state           TEXT NOT NULL,
                zip_code        TEXT NOT NULL,
                country         TEXT NOT NULL,
                order_date      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE order_items (
                order_id            TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                flower_id           TEXT NOT NULL,
                quantity            INTEGER NOT NULL CHECK (quantity >= 1),
                price_at_purchase   REAL NOT NULL CHECK (price_at_purchase >= 0)
            );

            CREATE INDEX idx_order_items_order ON order_items(order_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};

use super::{CatalogError, ColorCatalog};
use crate::models::{Paint, Rgb};

pub type Db = Pool<Sqlite>;

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                CatalogError::Connection(e.to_string())
            }
            other => CatalogError::Query(other.to_string()),
        }
    }
}

// Colour row as stored; rgb is "R,G,B" text
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ColorRow {
    pub id: String,
    pub name: String,
    pub hex: String,
    pub rgb: String,
    pub buy_link: Option<String>,
    pub series_id: String,
    pub series_name: Option<String>,
}

impl ColorRow {
    /// Convert to a catalog paint, falling back to the hex column when the
    /// rgb text is unreadable
    pub fn into_paint(self) -> Option<Paint> {
        let rgb = Rgb::parse_csv(&self.rgb).or_else(|| Rgb::from_hex(&self.hex))?;
        Some(Paint {
            id: self.id,
            name: self.name,
            rgb,
            hex: self.hex,
            series_id: self.series_id,
            series_name: self.series_name,
            buy_link: self.buy_link,
        })
    }
}

// Create connection pool, creating the database file if needed
pub async fn create_pool(url: &str, max_connections: u32) -> Result<Db, CatalogError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| CatalogError::Connection(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    log::info!("connected to catalog database at {url}");
    Ok(pool)
}

// Run migrations (create tables if not exist)
pub async fn run_migrations(db: &Db) -> Result<(), CatalogError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS series (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            description TEXT
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS colors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            hex TEXT NOT NULL,
            rgb TEXT NOT NULL,
            buy_link TEXT,
            series_id TEXT NOT NULL REFERENCES series(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS colors_series_idx ON colors(series_id)")
        .execute(db)
        .await?;

    Ok(())
}

pub async fn insert_series(
    db: &Db,
    id: &str,
    name: &str,
    slug: &str,
    description: Option<&str>,
) -> Result<(), CatalogError> {
    sqlx::query("INSERT INTO series (id, name, slug, description) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn insert_color(db: &Db, paint: &Paint) -> Result<(), CatalogError> {
    sqlx::query(
        "INSERT INTO colors (id, name, hex, rgb, buy_link, series_id) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&paint.id)
    .bind(&paint.name)
    .bind(&paint.hex)
    .bind(paint.rgb.to_csv())
    .bind(&paint.buy_link)
    .bind(&paint.series_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn count_colors(db: &Db) -> Result<i64, CatalogError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM colors")
        .fetch_one(db)
        .await?;
    Ok(count)
}

// Ordered by series name, then colour name
pub async fn list_colors(db: &Db) -> Result<Vec<ColorRow>, CatalogError> {
    let rows = sqlx::query_as(
        r#"
        SELECT c.id, c.name, c.hex, c.rgb, c.buy_link, c.series_id, s.name AS series_name
        FROM colors c
        LEFT JOIN series s ON s.id = c.series_id
        ORDER BY s.name ASC, c.name ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Catalog backed by the SQLite `colors` table
#[derive(Clone)]
pub struct SqliteCatalog {
    db: Db,
}

impl SqliteCatalog {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

impl ColorCatalog for SqliteCatalog {
    async fn list_all(&self) -> Result<Vec<Paint>, CatalogError> {
        let rows = list_colors(&self.db).await?;
        let total = rows.len();
        let paints: Vec<Paint> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                let paint = row.into_paint();
                if paint.is_none() {
                    log::warn!("skipping catalog colour '{id}': unreadable rgb and hex");
                }
                paint
            })
            .collect();
        log::debug!("loaded {} of {} catalog colours", paints.len(), total);
        Ok(paints)
    }
}

const PRIMARY_SERIES: &str = "series-primary";
const MECHA_SERIES: &str = "series-mecha";
const PRIMARY_SERIES_NAME: &str = "Primary Color Collection";
const MECHA_SERIES_NAME: &str = "Mecha Color Palette";

// (id, name, rgb, series, shop slug)
const DEFAULT_COLORS: [(&str, &str, [u8; 3], &str, &str); 12] = [
    ("color-p-1", "Crimson Red", [220, 20, 60], PRIMARY_SERIES, "crimson-red"),
    ("color-p-2", "Azure Blue", [0, 127, 255], PRIMARY_SERIES, "azure-blue"),
    ("color-p-3", "Golden Yellow", [255, 199, 44], PRIMARY_SERIES, "golden-yellow"),
    ("color-p-4", "Pure White", [255, 255, 255], PRIMARY_SERIES, "pure-white"),
    ("color-p-5", "Jet Black", [10, 10, 10], PRIMARY_SERIES, "jet-black"),
    ("color-p-6", "Forest Green", [34, 139, 34], PRIMARY_SERIES, "forest-green"),
    ("color-m-1", "Gunmetal Gray", [44, 53, 57], MECHA_SERIES, "gunmetal-gray"),
    ("color-m-2", "Chrome Silver", [192, 192, 192], MECHA_SERIES, "chrome-silver"),
    ("color-m-3", "Warning Orange", [255, 102, 0], MECHA_SERIES, "warning-orange"),
    ("color-m-4", "Titanium Blue", [70, 130, 180], MECHA_SERIES, "titanium-blue"),
    ("color-m-5", "Reactor Green", [57, 255, 20], MECHA_SERIES, "reactor-green"),
    ("color-m-6", "Rust Red", [183, 65, 14], MECHA_SERIES, "rust-red"),
];

/// The starter catalog: a primary series and a mecha model series
pub fn default_catalog() -> Vec<Paint> {
    DEFAULT_COLORS
        .iter()
        .map(|(id, name, rgb, series, slug)| {
            let series_name = if *series == MECHA_SERIES {
                MECHA_SERIES_NAME
            } else {
                PRIMARY_SERIES_NAME
            };
            Paint::new(*id, *name, Rgb::from(*rgb), *series)
                .with_series_name(series_name)
                .with_buy_link(format!("https://gaahleri.com/shop/{slug}"))
        })
        .collect()
}

/// Insert the starter catalog when the colors table is empty.
/// Returns the number of colours inserted.
pub async fn seed_default_catalog(db: &Db) -> Result<usize, CatalogError> {
    if count_colors(db).await? > 0 {
        return Ok(0);
    }

    insert_series(
        db,
        PRIMARY_SERIES,
        PRIMARY_SERIES_NAME,
        "primary-colors",
        Some("Essential primary colors and their derivatives"),
    )
    .await?;
    insert_series(
        db,
        MECHA_SERIES,
        MECHA_SERIES_NAME,
        "mecha-colors",
        Some("Specialized colors for mecha models, including metallic and special colors"),
    )
    .await?;

    let paints = default_catalog();
    for paint in &paints {
        insert_color(db, paint).await?;
    }
    log::info!("seeded catalog with {} colours", paints.len());
    Ok(paints.len())
}

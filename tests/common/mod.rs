//! Common test fixtures
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use stocktake::{TestDatabase, impl_properties};

/// A catalog entry of the kind the comparator is used on
#[derive(Debug, Clone)]
pub struct Item {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            labels: Vec::new(),
            in_stock: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(ToString::to_string).collect();
        self
    }

    pub fn stocked(mut self) -> Self {
        self.in_stock = true;
        self
    }
}

impl_properties!(Item {
    id,
    name,
    description,
    labels,
    in_stock,
    created_at,
});

pub const SCHEMA: &str = "
    CREATE TABLE items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        in_stock INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE TABLE item_labels (
        item_id INTEGER NOT NULL REFERENCES items(id),
        label TEXT NOT NULL,
        PRIMARY KEY (item_id, label)
    );
";

pub const SEED: &str = "
    INSERT INTO items (name, description, in_stock, created_at) VALUES
        ('anvil', 'drop forged', 1, '2024-03-01T12:00:00+00:00'),
        ('crate', NULL, 1, '2024-03-02T08:30:00+00:00'),
        ('pallet', 'oak', 0, '2024-03-03T16:45:00+00:00');

    INSERT INTO item_labels (item_id, label) VALUES (1, 'heavy');
";

/// Fresh database with the catalog schema applied and fixture rows seeded
pub fn seeded_db() -> TestDatabase {
    let db = TestDatabase::with_schema(SCHEMA).expect("failed to create test database");
    stocktake::update_natively(&db, |stmt| stmt.execute_batch(SEED))
        .expect("failed to seed test database");
    db
}

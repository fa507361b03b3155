//! Dialect type tables
//!
//! One static [`TypeTable`] per dialect maps semantic field types to storage
//! types. Lookups are total: unrecognized semantic types store as
//! `varchar(255)`.

use tablewright_core::{Dialect, SemanticType};

/// Length used for sized types without a size hint
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Storage types for one dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTable {
    pub dialect: Dialect,
    pub long_text: &'static str,
    pub number: &'static str,
    pub boolean: &'static str,
    pub date: &'static str,
    pub date_time: &'static str,
    pub json: &'static str,
    pub foreign_key: &'static str,
    pub polymorphic_type: &'static str,
}

pub static POSTGRES_TYPES: TypeTable = TypeTable {
    dialect: Dialect::Postgres,
    long_text: "text",
    number: "bigint",
    boolean: "boolean",
    date: "date",
    date_time: "timestamp",
    json: "jsonb",
    foreign_key: "bigint",
    polymorphic_type: "varchar(255)",
};

pub static MYSQL_TYPES: TypeTable = TypeTable {
    dialect: Dialect::MySql,
    long_text: "text",
    number: "bigint",
    boolean: "tinyint(1)",
    date: "date",
    date_time: "datetime",
    json: "json",
    foreign_key: "bigint unsigned",
    polymorphic_type: "varchar(255)",
};

pub static SQLITE_TYPES: TypeTable = TypeTable {
    dialect: Dialect::Sqlite,
    long_text: "text",
    number: "integer",
    boolean: "integer",
    date: "date",
    date_time: "datetime",
    json: "text",
    foreign_key: "integer",
    polymorphic_type: "varchar(255)",
};

impl TypeTable {
    /// Storage type for a semantic type
    ///
    /// `size_hint` applies to short text, select and file references. Unknown
    /// types always fall back to `varchar(255)`.
    pub fn storage_type(&self, semantic: &SemanticType, size_hint: Option<u32>) -> String {
        match semantic {
            SemanticType::ShortText | SemanticType::Select | SemanticType::FileReference => {
                format!("varchar({})", size_hint.unwrap_or(DEFAULT_STRING_LENGTH))
            }
            SemanticType::LongText | SemanticType::RichText => self.long_text.to_string(),
            SemanticType::Number => self.number.to_string(),
            SemanticType::Boolean => self.boolean.to_string(),
            SemanticType::Date => self.date.to_string(),
            SemanticType::DateTime => self.date_time.to_string(),
            SemanticType::KeyValue => self.json.to_string(),
            SemanticType::Unknown(_) => format!("varchar({})", DEFAULT_STRING_LENGTH),
        }
    }

    /// Rows of the table, for display: (label, storage type)
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows: Vec<(String, String)> = SemanticType::all()
            .into_iter()
            .map(|t| {
                let storage = self.storage_type(&t, None);
                (t.as_str().to_string(), storage)
            })
            .collect();
        rows.push(("foreign_key".to_string(), self.foreign_key.to_string()));
        rows.push(("polymorphic_type".to_string(), self.polymorphic_type.to_string()));
        rows
    }
}

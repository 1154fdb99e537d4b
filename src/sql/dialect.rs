use crate::database::column::ColumnType;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DialectError {
    #[error("Unsupported dialect '{0}', expected one of: mysql, sqlite, postgresql")]
    UnsupportedDialect(String),
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    MySql,
    Sqlite,
    PostgreSql,
}

/// Per-dialect rendering rules.
#[derive(Debug)]
pub struct DialectProfile {
    /// Dialect identifier as accepted by [`Dialect::from_str`]
    pub id: &'static str,
    /// Logical type name → native type token
    pub type_map: &'static [(&'static str, &'static str)],
    /// Opening and closing identifier quote
    pub identifier_quote: (char, char),
    /// Whether integer columns keep their `UNSIGNED` attribute
    pub unsigned_integers: bool,
    /// Whether rows are grouped into multi-row INSERT statements
    pub multi_row_insert: bool,
    /// Rows per INSERT statement when `multi_row_insert` is set
    pub insert_batch_size: usize,
    /// Appended after the closing parenthesis of CREATE TABLE
    pub table_options: Option<&'static str>,
}

static MYSQL: DialectProfile = DialectProfile {
    id: "mysql",
    type_map: &[
        ("TINYINT", "TINYINT"),
        ("SMALLINT", "SMALLINT"),
        ("INT", "INT"),
        ("BIGINT", "BIGINT"),
        ("DECIMAL", "DECIMAL"),
        ("VARCHAR", "VARCHAR"),
        ("TEXT", "TEXT"),
        ("DATE", "DATE"),
        ("DATETIME", "DATETIME"),
        ("BOOLEAN", "BOOLEAN"),
    ],
    identifier_quote: ('`', '`'),
    unsigned_integers: true,
    multi_row_insert: true,
    insert_batch_size: 500,
    table_options: Some("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"),
};

static SQLITE: DialectProfile = DialectProfile {
    id: "sqlite",
    type_map: &[
        ("TINYINT", "INTEGER"),
        ("SMALLINT", "INTEGER"),
        ("INT", "INTEGER"),
        ("BIGINT", "INTEGER"),
        ("DECIMAL", "REAL"),
        ("VARCHAR", "TEXT"),
        ("TEXT", "TEXT"),
        ("DATE", "TEXT"),
        ("DATETIME", "TEXT"),
        ("BOOLEAN", "INTEGER"),
    ],
    identifier_quote: ('"', '"'),
    unsigned_integers: false,
    multi_row_insert: false,
    insert_batch_size: 1,
    table_options: None,
};

static POSTGRESQL: DialectProfile = DialectProfile {
    id: "postgresql",
    type_map: &[
        ("TINYINT", "SMALLINT"),
        ("SMALLINT", "SMALLINT"),
        ("INT", "INTEGER"),
        ("BIGINT", "BIGINT"),
        ("DECIMAL", "NUMERIC"),
        ("VARCHAR", "VARCHAR"),
        ("TEXT", "TEXT"),
        ("DATE", "DATE"),
        ("DATETIME", "TIMESTAMP"),
        ("BOOLEAN", "BOOLEAN"),
    ],
    identifier_quote: ('"', '"'),
    unsigned_integers: false,
    multi_row_insert: false,
    insert_batch_size: 1,
    table_options: None,
};

/// Native types that keep the parameters of their logical type.
const PARAMETERIZED_TYPES: [&str; 3] = ["VARCHAR", "DECIMAL", "NUMERIC"];

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::MySql, Dialect::Sqlite, Dialect::PostgreSql];

    pub fn profile(&self) -> &'static DialectProfile {
        match self {
            Dialect::MySql => &MYSQL,
            Dialect::Sqlite => &SQLITE,
            Dialect::PostgreSql => &POSTGRESQL,
        }
    }

    pub fn id(&self) -> &'static str {
        self.profile().id
    }

    /// Native column type for a logical type, e.g. `SMALLINT UNSIGNED` → `INTEGER` on SQLite.
    pub fn render_type(&self, kind: &ColumnType) -> String {
        let profile = self.profile();
        let logical = kind.kind_name();
        let native = profile
            .type_map
            .iter()
            .find(|(name, _)| *name == logical)
            .map(|(_, native)| *native)
            .unwrap_or(logical);

        let mut rendered = native.to_owned();
        if PARAMETERIZED_TYPES.contains(&native) {
            if let Some(parameters) = kind.parameters() {
                rendered.push_str(&parameters);
            }
        }
        if profile.unsigned_integers && matches!(kind, ColumnType::Integer { unsigned: true, .. }) {
            rendered.push_str(" UNSIGNED");
        }
        rendered
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let id = value.trim().to_ascii_lowercase();
        Dialect::ALL
            .into_iter()
            .find(|dialect| dialect.id() == id)
            .ok_or(DialectError::UnsupportedDialect(value.to_owned()))
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::column::IntegerWidth;

    const TINYINT_UNSIGNED: ColumnType = ColumnType::Integer {
        width: IntegerWidth::TinyInt,
        unsigned: true,
    };

    #[test]
    fn parses_dialect_ids() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("SQLite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert_eq!(" postgresql ".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!(Dialect::default(), Dialect::MySql);
    }

    #[test]
    fn rejects_unknown_dialect() {
        let error = "oracle".parse::<Dialect>().unwrap_err();
        assert!(matches!(&error, DialectError::UnsupportedDialect(id) if id == "oracle"));
        assert_eq!(error.to_string(), "Unsupported dialect 'oracle', expected one of: mysql, sqlite, postgresql");
    }

    #[test]
    fn display_round_trips() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn unsigned_integers_per_dialect() {
        assert_eq!(Dialect::MySql.render_type(&TINYINT_UNSIGNED), "TINYINT UNSIGNED");
        assert_eq!(Dialect::Sqlite.render_type(&TINYINT_UNSIGNED), "INTEGER");
        assert_eq!(Dialect::PostgreSql.render_type(&TINYINT_UNSIGNED), "SMALLINT");
    }

    #[test]
    fn parameters_follow_native_type() {
        let decimal = ColumnType::Decimal { precision: 20, scale: 2 };
        let varchar = ColumnType::Varchar(80);
        assert_eq!(Dialect::MySql.render_type(&decimal), "DECIMAL(20,2)");
        assert_eq!(Dialect::PostgreSql.render_type(&decimal), "NUMERIC(20,2)");
        assert_eq!(Dialect::Sqlite.render_type(&decimal), "REAL");
        assert_eq!(Dialect::MySql.render_type(&varchar), "VARCHAR(80)");
        assert_eq!(Dialect::PostgreSql.render_type(&varchar), "VARCHAR(80)");
        assert_eq!(Dialect::Sqlite.render_type(&varchar), "TEXT");
    }

    #[test]
    fn dates_and_booleans() {
        assert_eq!(Dialect::PostgreSql.render_type(&ColumnType::DateTime), "TIMESTAMP");
        assert_eq!(Dialect::MySql.render_type(&ColumnType::DateTime), "DATETIME");
        assert_eq!(Dialect::Sqlite.render_type(&ColumnType::Date), "TEXT");
        assert_eq!(Dialect::Sqlite.render_type(&ColumnType::Boolean), "INTEGER");
        assert_eq!(Dialect::PostgreSql.render_type(&ColumnType::Boolean), "BOOLEAN");
    }

    #[test]
    fn batching_and_quotes() {
        assert!(Dialect::MySql.profile().multi_row_insert);
        assert_eq!(Dialect::MySql.profile().insert_batch_size, 500);
        assert_eq!(Dialect::MySql.profile().identifier_quote, ('`', '`'));
        assert!(!Dialect::Sqlite.profile().multi_row_insert);
        assert_eq!(Dialect::PostgreSql.profile().identifier_quote, ('"', '"'));
    }
}

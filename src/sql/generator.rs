use crate::database::table::TableData;
use crate::sql::dialect::Dialect;
use crate::sql::formatter::format_value;
use crate::sql::identifier::quote_identifier;
use crate::sql::identifier::sanitize_identifier;
use tracing::trace;

/// SQL produced for one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedSql {
    /// `CREATE TABLE IF NOT EXISTS ...;`
    pub create_statement: String,
    /// INSERT statements in row order, or a single comment for an empty table
    pub insert_statements: Vec<String>,
}

impl GeneratedSql {
    /// Create statement followed by the inserts, one per line.
    pub fn to_script(&self) -> String {
        let mut script = self.create_statement.clone();
        for statement in &self.insert_statements {
            script.push('\n');
            script.push_str(statement);
        }
        script
    }
}

/// Renders tables as SQL for one dialect.
#[derive(Clone, Debug)]
pub struct SqlGenerator {
    dialect: Dialect,
    table_prefix: Option<String>,
}

impl SqlGenerator {
    pub fn new(dialect: Dialect, table_prefix: Option<&str>) -> Self {
        SqlGenerator {
            dialect,
            table_prefix: table_prefix.filter(|prefix| !prefix.is_empty()).map(str::to_owned),
        }
    }

    /// Sanitized table name with the `<prefix>_` prefix when one is set.
    pub fn table_name(&self, table_name: &str) -> String {
        let name = sanitize_identifier(table_name);
        match &self.table_prefix {
            Some(prefix) => format!("{prefix}_{name}"),
            None => name,
        }
    }

    pub fn create_table(&self, table_name: &str, table: &TableData) -> String {
        let columns = table
            .columns
            .iter()
            .map(|column| {
                format!(
                    "  {} {}",
                    quote_identifier(&column.name, self.dialect),
                    self.dialect.render_type(&column.kind)
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");
        let name = quote_identifier(&self.table_name(table_name), self.dialect);
        let terminator = match self.dialect.profile().table_options {
            Some(options) => format!(" {options};"),
            None => ";".to_owned(),
        };
        format!("CREATE TABLE IF NOT EXISTS {name} (\n{columns}\n){terminator}")
    }

    /// One entry per INSERT statement; a comment when the table has no rows.
    pub fn insert_statements(&self, table_name: &str, table: &TableData) -> Vec<String> {
        let table_name = self.table_name(table_name);
        if table.is_empty() {
            return vec![format!("-- No data to insert into table {table_name}")];
        }

        let name = quote_identifier(&table_name, self.dialect);
        let columns = table
            .columns
            .iter()
            .map(|column| quote_identifier(&column.name, self.dialect))
            .collect::<Vec<_>>()
            .join(", ");
        let values = table.rows.iter().map(|row| {
            row.iter()
                .zip(&table.columns)
                .map(|(value, column)| format_value(value, &column.kind))
                .collect::<Vec<_>>()
                .join(", ")
        });

        let profile = self.dialect.profile();
        if profile.multi_row_insert {
            let values = values.map(|row| format!("({row})")).collect::<Vec<_>>();
            let statements = values
                .chunks(profile.insert_batch_size.max(1))
                .map(|batch| format!("INSERT INTO {name} ({columns}) VALUES\n{};", batch.join(",\n")))
                .collect::<Vec<_>>();
            trace!("Table {} split into {} INSERT batches", table_name, statements.len());
            statements
        } else {
            values
                .map(|row| format!("INSERT INTO {name} ({columns}) VALUES ({row});"))
                .collect()
        }
    }

    /// All INSERT statements joined by newlines.
    pub fn insert_data(&self, table_name: &str, table: &TableData) -> String {
        self.insert_statements(table_name, table).join("\n")
    }

    pub fn generate(&self, table_name: &str, table: &TableData) -> GeneratedSql {
        GeneratedSql {
            create_statement: self.create_table(table_name, table),
            insert_statements: self.insert_statements(table_name, table),
        }
    }
}

/// Renders the CREATE TABLE statement and the INSERT statements for `table`.
pub fn generate_sql(table_name: &str, table: &TableData, dialect: Dialect, table_prefix: Option<&str>) -> GeneratedSql {
    SqlGenerator::new(dialect, table_prefix).generate(table_name, table)
}

//! DDL synthesis for user data tables.
//!
//! Pure string generation; execution lives in [`crate::provision`].
//! Every table gets a surrogate `id BIGSERIAL` key (the sequence number
//! consumers order by), the declared columns, and `created_at` /
//! `updated_at` bookkeeping columns maintained by a BEFORE UPDATE
//! trigger.

use conveyor_core::FieldSpec;

/// Columns present on every user data table that are never exposed to
/// consumers or accepted from producers.
pub const HIDDEN_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// CREATE TABLE statement for a physical table and its declared fields.
pub fn create_table_sql(physical_name: &str, fields: &[FieldSpec]) -> String {
    let columns: Vec<String> = fields
        .iter()
        .map(|f| format!("  \"{}\" {}", f.name, f.field_type.postgres_type(f.required)))
        .collect();

    format!(
        "CREATE TABLE \"{}\" (\n  id BIGSERIAL PRIMARY KEY,\n{},\n  created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n  updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n)",
        physical_name,
        columns.join(",\n")
    )
}

/// Shared trigger function that stamps `updated_at` on every update.
/// `CREATE OR REPLACE`, so re-provisioning other tables is harmless.
pub fn update_trigger_function_sql() -> &'static str {
    r#"CREATE OR REPLACE FUNCTION update_updated_at_column()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = CURRENT_TIMESTAMP;
    RETURN NEW;
END;
$$ language 'plpgsql'"#
}

/// BEFORE UPDATE trigger wiring the shared function to one table.
pub fn create_trigger_sql(physical_name: &str) -> String {
    format!(
        "CREATE TRIGGER update_{name}_updated_at\n    BEFORE UPDATE ON \"{name}\"\n    FOR EACH ROW\n    EXECUTE FUNCTION update_updated_at_column()",
        name = physical_name
    )
}

/// Named unique constraint over the given fields, or `None` when no
/// uniqueness was declared. The constraint name is derived from the
/// table and field names so it stays stable and debuggable.
pub fn unique_constraint_sql(physical_name: &str, unique_keys: &[String]) -> Option<String> {
    if unique_keys.is_empty() {
        return None;
    }
    let quoted: Vec<String> = unique_keys.iter().map(|k| format!("\"{}\"", k)).collect();
    let constraint_name = format!("{}_{}_unique", physical_name, unique_keys.join("_"));
    Some(format!(
        "ALTER TABLE \"{}\" ADD CONSTRAINT \"{}\" UNIQUE ({})",
        physical_name,
        constraint_name,
        quoted.join(", ")
    ))
}

//! SOQL query construction
//!
//! Field and entity names come straight from the describe metadata and are
//! used verbatim; nothing here escapes or validates identifiers.

pub fn build_select(fields: &[String]) -> String {
    format!("SELECT {}", fields.join(","))
}

pub fn build_query(fields: &[String], entity: &str) -> String {
    format!("{} FROM {}", build_select(fields), entity)
}

//! Canonical column layout for field history files.
//!
//! Standard objects reference their parent through an object-specific column
//! (`AccountId`, `ContactId`, ...) instead of `ParentId`. The alternate name is
//! whatever single field is left once the fixed history columns are removed.

use crate::error::{Error, Result};

pub const PARENT_ID: &str = "ParentId";

/// History columns other than the parent reference. `attributes` is the
/// envelope holding `url` and `type` on every query record.
pub const NON_PARENT_FIELDS: &[&str] = &[
    "Id",
    "IsDeleted",
    "CreatedById",
    "CreatedDate",
    "Field",
    "OldValue",
    "NewValue",
    "attributes",
];

/// Header columns preceding the parent reference, in row order.
pub const LEADING_COLUMNS: [&str; 9] = [
    "Id",
    "OldValue",
    "NewValue",
    "Field",
    "CreatedById",
    "CreatedDate",
    "attributes.url",
    "attributes.type",
    "IsDeleted",
];

pub const COLUMN_COUNT: usize = LEADING_COLUMNS.len() + 1;

/// Name of the column holding the parent record id for `entity`.
///
/// # Errors
/// [`Error::AmbiguousSchema`] when `ParentId` is absent and the field list does
/// not leave exactly one candidate.
pub fn resolve_parent_field_name(entity: &str, fields: &[String]) -> Result<String> {
    if fields.iter().any(|f| f == PARENT_ID) {
        return Ok(PARENT_ID.to_string());
    }

    let mut candidates: Vec<&String> = Vec::new();
    for field in fields {
        if !NON_PARENT_FIELDS.contains(&field.as_str()) && !candidates.contains(&field) {
            candidates.push(field);
        }
    }

    match candidates.as_slice() {
        [parent] => {
            log::debug!("{} uses {} as its parent reference", entity, parent);
            Ok((*parent).clone())
        }
        _ => Err(Error::AmbiguousSchema {
            entity: entity.to_string(),
            candidates: candidates.into_iter().cloned().collect(),
        }),
    }
}

/// Header row for `entity`, with the resolved parent column last.
pub fn build_header_row(entity: &str, fields: &[String]) -> Result<Vec<String>> {
    let parent = resolve_parent_field_name(entity, fields)?;
    Ok(header_row(&parent))
}

pub(crate) fn header_row(parent_field: &str) -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::once(parent_field.to_string()))
        .collect()
}

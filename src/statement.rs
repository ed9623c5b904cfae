//! INSERT statement assembly from aligned columns and coerced values.

use itertools::Itertools;

use crate::{
    catalog::{ColumnSchema, dtype_of},
    coerce::{CoercionPolicy, coerce, coerce_typed},
    error::{ImportError, Result},
    value::SqlValue,
};

/// Identifier delimiter pair. Defaults to square brackets; stores that quote
/// with double quotes use [`IdentifierQuoting::double_quotes`].
#[derive(Debug, Clone, Copy)]
pub struct IdentifierQuoting {
    pub open: char,
    pub close: char,
}

impl Default for IdentifierQuoting {
    fn default() -> Self {
        Self::brackets()
    }
}

impl IdentifierQuoting {
    pub fn brackets() -> Self {
        Self {
            open: '[',
            close: ']',
        }
    }

    pub fn double_quotes() -> Self {
        Self {
            open: '"',
            close: '"',
        }
    }

    fn quote(&self, name: &str) -> String {
        format!("{}{}{}", self.open, name, self.close)
    }
}

/// Parameter placeholder convention for the bound-statement variant.
#[derive(Debug, Clone, Copy, Default)]
pub enum ParamStyle {
    /// `?`: positional, index-free.
    #[default]
    Question,
    /// `@p1`, `@p2`, ...
    AtP,
    /// `$1`, `$2`, ...
    Dollar,
}

impl ParamStyle {
    fn placeholder(&self, index: usize) -> String {
        match self {
            ParamStyle::Question => "?".to_string(),
            ParamStyle::AtP => format!("@p{index}"),
            ParamStyle::Dollar => format!("${index}"),
        }
    }
}

/// Pairs each column with its declared type, dropping pairs the schema cannot
/// type. This second filter is defensive and independent of the projector's
/// drop-set.
fn typed_pairs<'a>(
    qualified_table: &str,
    column_names: &'a [String],
    values: &'a [String],
    schema: &[ColumnSchema],
) -> Result<Vec<(&'a str, &'a str, String)>> {
    if column_names.len() != values.len() {
        return Err(ImportError::Build {
            table: qualified_table.to_string(),
            columns: column_names.len(),
            values: values.len(),
        });
    }
    Ok(column_names
        .iter()
        .zip(values)
        .filter_map(|(col, val)| {
            dtype_of(schema, col).map(|dtype| (col.as_str(), val.as_str(), dtype.to_string()))
        })
        .collect())
}

/// Assembles one INSERT statement from aligned column names and raw values.
///
/// Values are coerced to literal fragments per their declared type and
/// spliced directly into the statement text; no terminator is emitted, the
/// batch layer adds those when joining.
pub fn build_insert(
    qualified_table: &str,
    column_names: &[String],
    values: &[String],
    schema: &[ColumnSchema],
    quoting: IdentifierQuoting,
    policy: &CoercionPolicy,
) -> Result<String> {
    let pairs = typed_pairs(qualified_table, column_names, values, schema)?;
    let cols = pairs.iter().map(|(col, _, _)| quoting.quote(col)).join(", ");
    let vals = pairs
        .iter()
        .map(|(_, val, dtype)| coerce(val, dtype, policy))
        .join(", ");
    Ok(format!(
        "INSERT INTO {qualified_table}({cols}) VALUES({vals})"
    ))
}

/// Parameter-bound variant of [`build_insert`] for drivers that bind values
/// instead of splicing literals. Returns the statement text with placeholders
/// and the typed values in placeholder order.
pub fn build_parameterized(
    qualified_table: &str,
    column_names: &[String],
    values: &[String],
    schema: &[ColumnSchema],
    quoting: IdentifierQuoting,
    policy: &CoercionPolicy,
    style: ParamStyle,
) -> Result<(String, Vec<SqlValue>)> {
    let pairs = typed_pairs(qualified_table, column_names, values, schema)?;
    let cols = pairs.iter().map(|(col, _, _)| quoting.quote(col)).join(", ");
    let params = (1..=pairs.len()).map(|ix| style.placeholder(ix)).join(", ");
    let bound = pairs
        .iter()
        .map(|(_, val, dtype)| coerce_typed(val, dtype, policy))
        .collect();
    Ok((
        format!("INSERT INTO {qualified_table}({cols}) VALUES({params})"),
        bound,
    ))
}

use serde::{Deserialize, Serialize};

use super::MatrixError;

/// One entry of the server's column info listing. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub is_numeric: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, is_numeric: bool) -> Self {
        Self {
            name: name.into(),
            is_numeric,
        }
    }
}

/// Parse the JSON body returned by `get-columns-info`.
///
/// Anything that is not an array (including `null`) is rejected the way the
/// dialog rejects it.
pub fn parse_columns_info(body: &str) -> Result<Vec<ColumnInfo>, MatrixError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Err(MatrixError::ColumnsInfo);
    }
    Ok(serde_json::from_value(value)?)
}

/// Numeric columns in their original order.
pub fn numeric_columns(columns: &[ColumnInfo]) -> Vec<&ColumnInfo> {
    columns.iter().filter(|c| c.is_numeric).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_columns_info_keeps_order_and_ignores_extra_fields() {
        let body = r#"[
            {"name": "a", "is_numeric": true, "numeric_row_count": 10},
            {"name": "label", "is_numeric": false},
            {"name": "b", "is_numeric": true}
        ]"#;
        let columns = parse_columns_info(body).unwrap();
        assert_eq!(
            columns,
            vec![
                ColumnInfo::new("a", true),
                ColumnInfo::new("label", false),
                ColumnInfo::new("b", true),
            ]
        );
        let names: Vec<&str> = numeric_columns(&columns)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_non_array_body_is_rejected() {
        assert!(matches!(
            parse_columns_info("null"),
            Err(MatrixError::ColumnsInfo)
        ));
        assert!(matches!(
            parse_columns_info(r#"{"code": "error"}"#),
            Err(MatrixError::ColumnsInfo)
        ));
        assert!(matches!(
            parse_columns_info("not json"),
            Err(MatrixError::Json(_))
        ));
    }

    #[test]
    fn test_missing_is_numeric_defaults_to_false() {
        let columns = parse_columns_info(r#"[{"name": "x"}]"#).unwrap();
        assert!(numeric_columns(&columns).is_empty());
    }
}

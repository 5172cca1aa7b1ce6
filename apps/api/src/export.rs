//! Minimal CSV assembly for the export endpoints.
//!
//! Exports here are a handful of rows of user data; a dedicated CSV crate
//! would be the only consumer of its features.

/// Quotes a field per RFC 4180 when it contains a comma, quote or newline.
pub fn csv_escape(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Joins fields into one CSV line (no trailing newline).
pub fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields_untouched() {
        assert_eq!(csv_escape("hello"), "hello");
    }

    #[test]
    fn test_comma_forces_quoting() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_quotes_are_doubled() {
        assert_eq!(csv_escape(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn test_newline_forces_quoting() {
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_row_assembly() {
        assert_eq!(csv_row(&["week", "goal,with,commas"]), "week,\"goal,with,commas\"");
    }
}

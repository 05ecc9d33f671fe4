//! Lenient parsers for user-entered coordinate text.
//!
//! Free-text ingestion is best effort by contract: malformed fragments and
//! rows are dropped silently (logged at debug level) and never abort the
//! parse. Only the single-point form path reports errors, and it does so
//! without touching any state.

use crate::geometry::Point3;

/// A single form field that failed numeric validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validation failure for single-point form entry.
///
/// Carries one entry per offending field so the caller can highlight them
/// individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Parses bracketed coordinate text of the form `[x,y,z],[x,y,z],...`.
///
/// Whitespace is permitted anywhere and stripped before parsing. Fragments
/// that do not yield exactly three finite numbers are dropped; the rest of
/// the input is still processed. Empty input yields an empty list.
pub fn parse_bracketed(text: &str) -> Vec<Point3> {
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Vec::new();
    }
    stripped.split("],[").filter_map(parse_fragment).collect()
}

fn parse_fragment(fragment: &str) -> Option<Point3> {
    let inner = fragment.strip_prefix('[').unwrap_or(fragment);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    match parse_triple(inner.split(',')) {
        Some(p) => Some(p),
        None => {
            log::debug!("dropping malformed coordinate fragment {fragment:?}");
            None
        }
    }
}

/// Parses newline-separated, tab-delimited coordinate rows.
///
/// Each row must contain exactly three finite numeric fields; other rows
/// are dropped. Intended for multi-row table pastes, where the result is
/// appended to the existing point list rather than replacing it.
pub fn parse_table_rows(text: &str) -> Vec<Point3> {
    text.lines()
        .filter(|row| !row.trim().is_empty())
        .filter_map(|row| match parse_triple(row.split('\t').map(str::trim)) {
            Some(p) => Some(p),
            None => {
                log::debug!("dropping malformed table row {row:?}");
                None
            }
        })
        .collect()
}

fn parse_triple<'a, I>(tokens: I) -> Option<Point3>
where
    I: Iterator<Item = &'a str>,
{
    let values: Vec<f64> = tokens.map(parse_finite).collect::<Option<_>>()?;
    if values.len() == 3 {
        Some(Point3::new(values[0], values[1], values[2]))
    } else {
        None
    }
}

fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validates the three fields of a single-point entry form.
///
/// All fields must parse to finite numbers; otherwise every offending field
/// is reported by name and no point is produced.
pub fn validate_fields(x: &str, y: &str, z: &str) -> Result<Point3, ValidationError> {
    let mut fields = Vec::new();
    let mut check = |name: &'static str, value: &str| match parse_finite(value.trim()) {
        Some(v) => v,
        None => {
            fields.push(FieldError {
                field: name,
                message: format!("expected a number, got {:?}", value),
            });
            0.0
        }
    };
    let point = Point3::new(check("x", x), check("y", y), check("z", z));
    if fields.is_empty() {
        Ok(point)
    } else {
        Err(ValidationError { fields })
    }
}

/// Coerces a form field to a number, defaulting to 0 when unparsable.
pub fn field_or_zero(value: &str) -> f64 {
    parse_finite(value.trim()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_two_points() {
        let pts = parse_bracketed("[1,2,3],[4,5,6]");
        assert_eq!(
            pts,
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn bracketed_whitespace_anywhere() {
        let pts = parse_bracketed(" [ 1 , 2 , 3 ] ,\n[ 4 ,5, 6 ] ");
        assert_eq!(
            pts,
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn bracketed_drops_short_fragment() {
        let pts = parse_bracketed("[1,2],[3,4,5]");
        assert_eq!(pts, vec![Point3::new(3.0, 4.0, 5.0)]);
    }

    #[test]
    fn bracketed_drops_non_numeric_fragment() {
        let pts = parse_bracketed("[a,b,c],[7,8,9],[1,2,3,4]");
        assert_eq!(pts, vec![Point3::new(7.0, 8.0, 9.0)]);
    }

    #[test]
    fn bracketed_empty_input() {
        assert!(parse_bracketed("").is_empty());
        assert!(parse_bracketed("   \n\t ").is_empty());
    }

    #[test]
    fn bracketed_signs_decimals_exponents() {
        let pts = parse_bracketed("[-1.5,2.25,3e2],[+4,-5.0,6.5e-1]");
        assert_eq!(
            pts,
            vec![
                Point3::new(-1.5, 2.25, 300.0),
                Point3::new(4.0, -5.0, 0.65)
            ]
        );
    }

    #[test]
    fn bracketed_rejects_non_finite() {
        // "inf" and "NaN" parse as f64 but are not finite coordinates.
        assert!(parse_bracketed("[inf,1,2]").is_empty());
        assert!(parse_bracketed("[NaN,1,2]").is_empty());
    }

    #[test]
    fn table_rows_accepts_three_fields() {
        let pts = parse_table_rows("1\t2\t3\n4\t5\t6");
        assert_eq!(
            pts,
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn table_rows_drops_bad_rows() {
        let pts = parse_table_rows("1\t2\n1\t2\t3\nx\ty\tz\n\n7\t8\t9\t10");
        assert_eq!(pts, vec![Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn validate_all_good() {
        let p = validate_fields("1", " 2.5 ", "-3e1").unwrap();
        assert_eq!(p, Point3::new(1.0, 2.5, -30.0));
    }

    #[test]
    fn validate_names_offending_fields() {
        let err = validate_fields("1", "abc", "").unwrap_err();
        let names: Vec<_> = err.fields.iter().map(|f| f.field).collect();
        assert_eq!(names, vec!["y", "z"]);
        let text = err.to_string();
        assert!(text.contains("y:"));
        assert!(text.contains("z:"));
    }

    #[test]
    fn field_or_zero_defaults() {
        assert_eq!(field_or_zero("4.5"), 4.5);
        assert_eq!(field_or_zero("abc"), 0.0);
        assert_eq!(field_or_zero(""), 0.0);
    }
}

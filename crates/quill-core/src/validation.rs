//! # Validation Module
//!
//! Caller input validation for Quill.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP routing                                                 │
//! │  ├── Query string: page, pageSize, sort                                │
//! │  └── THIS MODULE: ListParams::parse, field validators  → 400          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Query modifiers (quill-db)                                   │
//! │  └── Pure refinements, no bounds checking                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                   → 500   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Paging modifiers trust their inputs, so the bounds live here.

use crate::error::ValidationError;
use crate::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// List Parameters
// =============================================================================

/// Validated paging and sorting parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page.
    pub page_size: i64,
    /// Sort terms in priority order, e.g. `["name ASC", "email"]`.
    pub sort: Vec<String>,
}

impl ListParams {
    /// Parses raw query-string values.
    ///
    /// ## Arguments
    /// * `page` - `page` parameter, defaults to 1
    /// * `page_size` - `pageSize` parameter, defaults to 10
    /// * `sort` - comma-separated sort terms, defaults to `default_sort`
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::validation::ListParams;
    ///
    /// let params = ListParams::parse(Some("2"), None, Some("name,email DESC"), "name ASC").unwrap();
    /// assert_eq!(params.page, 2);
    /// assert_eq!(params.page_size, 10);
    /// assert_eq!(params.sort, vec!["name", "email DESC"]);
    ///
    /// assert!(ListParams::parse(Some("0"), None, None, "name").is_err());
    /// ```
    pub fn parse(
        page: Option<&str>,
        page_size: Option<&str>,
        sort: Option<&str>,
        default_sort: &str,
    ) -> ValidationResult<Self> {
        let page = parse_number("page", page, DEFAULT_PAGE)?;
        if page < 1 {
            return Err(ValidationError::MustBePositive {
                field: "page".to_string(),
            });
        }

        let page_size = parse_number("pageSize", page_size, DEFAULT_PAGE_SIZE)?;
        if page_size <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "pageSize".to_string(),
            });
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::OutOfRange {
                field: "pageSize".to_string(),
                min: 1,
                max: MAX_PAGE_SIZE,
            });
        }

        let sort = parse_sort(sort.unwrap_or(default_sort))?;

        Ok(ListParams {
            page,
            page_size,
            sort,
        })
    }
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

fn parse_number(field: &str, raw: Option<&str>, default: i64) -> ValidationResult<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ValidationError::invalid_format(field, "must be an integer")),
    }
}

// =============================================================================
// Sort Terms
// =============================================================================

/// Splits a comma-separated sort parameter into validated terms.
///
/// Each term is a column (optionally table-qualified) followed by an
/// optional `ASC`/`DESC`. Anything else is rejected, so sort input can
/// never smuggle SQL into an ORDER BY clause.
pub fn parse_sort(raw: &str) -> ValidationResult<Vec<String>> {
    let terms: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect();

    if terms.is_empty() {
        return Err(ValidationError::Required {
            field: "sort".to_string(),
        });
    }

    for term in &terms {
        if !is_sort_term(term) {
            return Err(ValidationError::invalid_format(
                "sort",
                format!("'{}' is not a column with optional ASC/DESC", term),
            ));
        }
    }

    Ok(terms)
}

/// Checks `column` / `table.column` with an optional direction.
pub fn is_sort_term(term: &str) -> bool {
    let mut parts = term.split_whitespace();

    let column_ok = parts.next().map(is_column_name).unwrap_or(false);
    let direction_ok = match parts.next() {
        None => true,
        Some(dir) => dir.eq_ignore_ascii_case("asc") || dir.eq_ignore_ascii_case("desc"),
    };

    column_ok && direction_ok && parts.next().is_none()
}

/// Checks a plain or table-qualified SQL identifier.
pub fn is_column_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a user's display name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 100)
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty, at most 254 characters
/// - Exactly one `@` with a non-empty local part and a dotted domain
///
/// ## Example
/// ```rust
/// use quill_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("ada.example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email, 254)?;

    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "email",
            "must look like name@domain.tld",
        ));
    }

    Ok(())
}

/// Validates a post title.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    validate_text("title", title, 200)
}

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params = ListParams::parse(None, None, None, "name ASC").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.sort, vec!["name ASC"]);
    }

    #[test]
    fn test_list_params_rejects_bad_page() {
        assert_eq!(
            ListParams::parse(Some("0"), None, None, "name"),
            Err(ValidationError::MustBePositive {
                field: "page".to_string()
            })
        );
        assert!(matches!(
            ListParams::parse(Some("two"), None, None, "name"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_list_params_rejects_bad_page_size() {
        assert!(ListParams::parse(None, Some("0"), None, "name").is_err());
        assert!(ListParams::parse(None, Some("-5"), None, "name").is_err());
        assert!(matches!(
            ListParams::parse(None, Some("10000"), None, "name"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_sort_splits_and_trims() {
        let sort = parse_sort(" posts.created_at ASC , title ").unwrap();
        assert_eq!(sort, vec!["posts.created_at ASC", "title"]);
    }

    #[test]
    fn test_parse_sort_rejects_injection() {
        assert!(parse_sort("name; DROP TABLE users").is_err());
        assert!(parse_sort("name ASC LIMIT 1").is_err());
        assert!(parse_sort("1name").is_err());
        assert!(parse_sort(" , ").is_err());
    }

    #[test]
    fn test_is_column_name() {
        assert!(is_column_name("name"));
        assert!(is_column_name("users.name"));
        assert!(is_column_name("_rowid"));
        assert!(!is_column_name("users."));
        assert!(!is_column_name("na-me"));
        assert!(!is_column_name(""));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("ada lovelace@example.com").is_err());
    }

    #[test]
    fn test_validate_name_and_title() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
        assert!(validate_title("Hello").is_ok());
    }
}

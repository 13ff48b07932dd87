//! Read-only statement guard for the free-form query tool.
//!
//! A statement is admitted iff its first keyword — after leading whitespace
//! and SQL comments — is `SELECT`, and it contains no second statement.
//! Everything else is rejected before the store is touched. Data-modifying
//! CTEs are excluded by not admitting `WITH` at all.

use rentaldesk_core::{ToolError, ToolResult};

/// Validate `raw` and return the cleaned statement: leading comments and
/// whitespace stripped, at most one trailing `;` removed.
pub fn admit(raw: &str) -> ToolResult<&str> {
    let body = skip_leading_trivia(raw)?;
    if body.is_empty() {
        return Err(ToolError::invalid_query("empty statement"));
    }

    let keyword: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if !keyword.eq_ignore_ascii_case("select") {
        return Err(ToolError::invalid_query(format!(
            "only SELECT statements are allowed, got '{}'",
            if keyword.is_empty() { "<non-keyword>" } else { &keyword }
        )));
    }

    let body = body.trim_end();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    // A remaining ';' means a second statement (or a literal containing one,
    // which this guard is deliberately too strict to admit).
    if body.contains(';') {
        return Err(ToolError::invalid_query(
            "multiple statements are not allowed",
        ));
    }

    Ok(body)
}

/// Skip whitespace, `--` line comments, and `/* */` block comments.
fn skip_leading_trivia(mut s: &str) -> ToolResult<&str> {
    loop {
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            s = match rest.find('\n') {
                Some(pos) => &rest[pos + 1..],
                None => "",
            };
        } else if let Some(rest) = s.strip_prefix("/*") {
            s = match rest.find("*/") {
                Some(pos) => &rest[pos + 2..],
                None => {
                    return Err(ToolError::invalid_query("unterminated block comment"));
                }
            };
        } else {
            return Ok(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn admits_plain_select() {
        assert_eq!(admit("SELECT 1").unwrap(), "SELECT 1");
        assert_eq!(admit("  select * from film  ").unwrap(), "select * from film");
    }

    #[test]
    fn strips_one_trailing_semicolon() {
        assert_eq!(admit("SELECT title FROM film;").unwrap(), "SELECT title FROM film");
        assert_eq!(admit("SELECT 1 ; ").unwrap(), "SELECT 1");
    }

    #[test]
    fn admits_select_behind_comments() {
        assert_eq!(admit("-- peek at the catalog\nSELECT 1").unwrap(), "SELECT 1");
        assert_eq!(admit("/* audit */ SELECT 1").unwrap(), "SELECT 1");
    }

    #[test]
    fn rejects_writes_in_any_case() {
        for stmt in [
            "INSERT INTO rental VALUES (1)",
            "insert into rental values (1)",
            "Update rental SET return_date = NOW()",
            "DELETE FROM rental",
            "dRoP TABLE rental",
            "TRUNCATE rental",
        ] {
            let err = admit(stmt).unwrap_err();
            assert_eq!(err.code(), "invalid_query", "admitted: {stmt}");
        }
    }

    #[test]
    fn rejects_with_statements() {
        // WITH can carry data-modifying CTEs, so it is not admitted.
        assert_eq!(
            admit("WITH x AS (SELECT 1) SELECT * FROM x").unwrap_err().code(),
            "invalid_query"
        );
    }

    #[test]
    fn rejects_stacked_statements() {
        let err = admit("SELECT 1; DROP TABLE rental").unwrap_err();
        assert_eq!(err.code(), "invalid_query");
    }

    #[test]
    fn rejects_empty_and_comment_only_input() {
        assert_eq!(admit("").unwrap_err().code(), "invalid_query");
        assert_eq!(admit("   -- nothing here").unwrap_err().code(), "invalid_query");
        assert_eq!(admit("/* unterminated").unwrap_err().code(), "invalid_query");
    }

    fn mixed_case(word: &'static str) -> impl Strategy<Value = String> {
        proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |ups| {
            word.chars()
                .zip(ups)
                .map(|(c, up)| {
                    if up {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn write_verbs_never_admitted(
            verb in prop_oneof![
                mixed_case("insert"),
                mixed_case("update"),
                mixed_case("delete"),
                mixed_case("drop"),
            ],
            pad in "[ \t\n]{0,8}",
            tail in "[a-z ]{0,30}",
        ) {
            let stmt = format!("{pad}{verb} {tail}");
            prop_assert!(admit(&stmt).is_err());
        }

        #[test]
        fn select_always_admitted(
            head in mixed_case("select"),
            pad in "[ \t\n]{0,8}",
            tail in "[a-z0-9_*, ]{1,30}",
        ) {
            let stmt = format!("{pad}{head} {tail}");
            prop_assert!(admit(&stmt).is_ok());
        }
    }
}

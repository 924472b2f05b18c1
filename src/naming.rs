//! Naming conventions: turn a human-readable field name into the identifier
//! styles used for environment variables, flags, and display names.
//!
//! | Style   | `"test value"` | `"test_value"` |
//! |---------|----------------|----------------|
//! | env     | `TEST_VALUE`   | `TEST_VALUE`   |
//! | flag    | `test_value`   | `test_value`   |
//! | display | `testValue`    | `testValue`    |

/// Environment style: trim, spaces become underscores, upper-case.
pub fn to_env_style(name: &str) -> String {
    to_flag_style(name.trim()).to_uppercase()
}

/// Flag style: spaces become underscores. Case is preserved.
pub fn to_flag_style(name: &str) -> String {
    name.replace(' ', "_")
}

/// Display style: lower-case, then camel-case on underscore boundaries.
///
/// Each underscore is dropped and the character after it is upper-cased, so a
/// doubled underscore leaves a single literal `_` behind (`a__b` → `a_B`).
pub fn to_display_style(name: &str) -> String {
    let lowered = to_flag_style(name.trim()).to_lowercase();
    if !lowered.contains('_') {
        return lowered;
    }

    let mut out = String::with_capacity(lowered.len());
    let mut previous = None;
    for c in lowered.chars() {
        if previous == Some('_') {
            out.extend(c.to_uppercase());
        } else if c != '_' {
            out.push(c);
        }
        previous = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_style_collapses_spaces_and_upper_cases() {
        assert_eq!(to_env_style("test value"), "TEST_VALUE");
        assert_eq!(to_env_style("  padded name  "), "PADDED_NAME");
        assert_eq!(to_env_style("already_SNAKE"), "ALREADY_SNAKE");
    }

    #[test]
    fn flag_style_preserves_case() {
        assert_eq!(to_flag_style("Test Value"), "Test_Value");
        assert_eq!(to_flag_style("testint"), "testint");
    }

    #[test]
    fn flag_style_does_not_trim() {
        assert_eq!(to_flag_style(" x "), "_x_");
    }

    #[test]
    fn display_style_camel_cases_underscores() {
        assert_eq!(to_display_style("test_value"), "testValue");
        assert_eq!(to_display_style("Test Value"), "testValue");
        assert_eq!(to_display_style("max_open_conns"), "maxOpenConns");
    }

    #[test]
    fn display_style_without_separators_only_lowercases() {
        assert_eq!(to_display_style("Port"), "port");
        assert_eq!(to_display_style("port"), "port");
        let once = to_display_style("timeout");
        assert_eq!(to_display_style(&once), once);
    }

    #[test]
    fn display_style_double_underscore_keeps_one() {
        assert_eq!(to_display_style("a__b"), "a_B");
    }

    #[test]
    fn display_style_trailing_underscore_dropped() {
        assert_eq!(to_display_style("name_"), "name");
    }
}

use crate::error::ExtractionError;
use regex::Regex;
use std::sync::LazyLock;

// Renderer sometimes glues "Mustermann" and "Max" together
static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zäöüß])([A-ZÄÖÜ])").unwrap());

static HYPHEN_SPACING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*").unwrap());

static UPPERCASE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-ZÄÖÜÉÈÊËÀÁÂÃÌÍÎÏÒÓÔÕÙÚÛÝ]{2,}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Empty for single uppercase-token names
    pub last_name: String,
    /// Never empty; multiple given names are joined with `_`
    pub first_name: String,
}

/// Parse a normalized name line into last and first name(s).
///
/// The last whitespace-separated token is the last name, everything before it
/// the first name(s). A lone token is only accepted if it contains a run of at
/// least two uppercase letters, which then becomes the first name.
pub fn parse_name(line: &str) -> Result<ParsedName, ExtractionError> {
    let spaced = CASE_BOUNDARY.replace_all(line, "$1 $2");
    let joined = HYPHEN_SPACING.replace_all(&spaced, "-");

    let tokens: Vec<&str> = joined.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Err(ExtractionError::MissingName),
        [_single] => match UPPERCASE_RUN.find(&joined) {
            Some(run) => Ok(ParsedName {
                last_name: String::new(),
                first_name: run.as_str().to_string(),
            }),
            None => Err(ExtractionError::InvalidName(line.to_string())),
        },
        [first @ .., last] => Ok(ParsedName {
            last_name: (*last).to_string(),
            first_name: first.join("_"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(last: &str, first: &str) -> ParsedName {
        ParsedName {
            last_name: last.to_string(),
            first_name: first.to_string(),
        }
    }

    #[test]
    fn test_glued_tokens_are_split() {
        assert_eq!(parse_name("MustermannMax").unwrap(), name("Max", "Mustermann"));
    }

    #[test]
    fn test_two_tokens() {
        assert_eq!(parse_name("Max Mustermann").unwrap(), name("Mustermann", "Max"));
    }

    #[test]
    fn test_multiple_first_names_joined() {
        assert_eq!(
            parse_name("Anna Lena Maria Schulz").unwrap(),
            name("Schulz", "Anna_Lena_Maria")
        );
    }

    #[test]
    fn test_compound_surname_hyphen_collapsed() {
        assert_eq!(
            parse_name("Jana Müller - Schmidt").unwrap(),
            name("Müller-Schmidt", "Jana")
        );
    }

    #[test]
    fn test_umlaut_boundary() {
        assert_eq!(parse_name("JürgenÖzdemir").unwrap(), name("Özdemir", "Jürgen"));
    }

    #[test]
    fn test_single_uppercase_token() {
        assert_eq!(parse_name("ÄBCDEF").unwrap(), name("", "ÄBCDEF"));
    }

    #[test]
    fn test_single_token_takes_uppercase_run_only() {
        assert_eq!(parse_name("ABCdef").unwrap(), name("", "ABC"));
    }

    #[test]
    fn test_single_token_without_run_is_invalid() {
        assert_eq!(
            parse_name("Max"),
            Err(ExtractionError::InvalidName("Max".to_string()))
        );
    }

    #[test]
    fn test_empty_line_is_missing() {
        assert_eq!(parse_name(""), Err(ExtractionError::MissingName));
        assert_eq!(parse_name("  \t "), Err(ExtractionError::MissingName));
    }
}

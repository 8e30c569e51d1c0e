use regex::Regex;
use std::sync::OnceLock;

/// Makes a filename safe to use as a directory name
///
/// Leading and trailing whitespace is trimmed, then every run of characters
/// outside `[A-Za-z0-9_.-]` (Unicode word characters are kept) collapses to
/// a single `_`. Names that would be empty or refer to `.`/`..` become `_`.
///
/// # Example
///
/// ```
/// use cirrusvol_core::classification::sanitize_filename;
///
/// assert_eq!(sanitize_filename(" Macular Cube 200x200.img "), "Macular_Cube_200x200.img");
/// assert_eq!(sanitize_filename("a<b>:c|d?.img"), "a_b_c_d_.img");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(r"[^\w\-.]+").expect("Failed to compile regex"));

    let cleaned = re.replace_all(name.trim(), "_").into_owned();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("example.img", "example.img")]
    #[case("  padded.img\t", "padded.img")]
    #[case("has space.img", "has_space.img")]
    #[case("many   spaces.img", "many_spaces.img")]
    #[case("bad/slash\\back.img", "bad_slash_back.img")]
    #[case("quote\"star*.img", "quote_star_.img")]
    #[case("dash-and_under.img", "dash-and_under.img")]
    #[case("", "_")]
    #[case("   ", "_")]
    #[case("..", "_")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_filename("P001 <OD> 200x200.img");
        assert_eq!(sanitize_filename(&once), once);
    }
}

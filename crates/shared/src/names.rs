/// Name comparison used by every "is this the same person" check.
///
/// Comparison is case-insensitive, ignores surrounding whitespace and folds
/// runs of inner whitespace, so "Jo  Smith" and "jo smith" match. Nicknames
/// and hyphenation are not considered.
pub fn names_equal(a: &str, b: &str) -> bool {
    normalise(a) == normalise(b)
}

pub fn full_name(first_names: &str, last_name: &str) -> String {
    match (first_names.trim(), last_name.trim()) {
        ("", last) => last.to_string(),
        (first, "") => first.to_string(),
        (first, last) => format!("{first} {last}"),
    }
}

/// Same first names and last name, with an empty pair never matching.
pub fn same_person(first_a: &str, last_a: &str, first_b: &str, last_b: &str) -> bool {
    if first_a.trim().is_empty() && last_a.trim().is_empty() {
        return false;
    }

    names_equal(first_a, first_b) && names_equal(last_a, last_b)
}

fn normalise(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_without_case_or_padding() {
        assert!(names_equal(" Jo ", "jo"));
        assert!(names_equal("Mary  Ann", "mary ann"));
        assert!(!names_equal("Jo", "Joe"));
    }

    #[test]
    fn empty_names_are_never_the_same_person() {
        assert!(!same_person("", "", "", ""));
        assert!(same_person("Sam", "Smith", "SAM", "smith"));
    }

    #[test]
    fn full_name_skips_missing_parts() {
        assert_eq!(full_name("Sam", "Smith"), "Sam Smith");
        assert_eq!(full_name("", "Smith"), "Smith");
    }
}

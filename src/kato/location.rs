//! Splitting scraped location text into ordered names
//!
//! Project pages list the location as one cell, e.g.
//! `"Республика Казахстан, область Жетісу, Каратальский район;"`.
//! The resolver wants the levels as separate names, general to specific.

/// Split location text on `delimiter`, dropping the trailing `;` and empty parts
pub fn split_location(text: &str, delimiter: &str) -> Vec<String> {
    let trimmed = text.trim().trim_end_matches(';').trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if delimiter.is_empty() {
        return vec![trimmed.to_string()];
    }

    trimmed
        .split(delimiter)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_scraped_cell() {
        let names = split_location(
            "Республика Казахстан, область Жетісу, Каратальский район;",
            ",",
        );
        assert_eq!(
            names,
            vec!["Республика Казахстан", "область Жетісу", "Каратальский район"]
        );
    }

    #[test]
    fn test_drops_empty_parts() {
        let names = split_location(" Кызылординская область, , Шиелі ;; ", ",");
        assert_eq!(names, vec!["Кызылординская область", "Шиелі"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_location("  ; ", ",").is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let names = split_location("Казахстан / Кызылорда", "/");
        assert_eq!(names, vec!["Казахстан", "Кызылорда"]);
    }

    #[test]
    fn test_empty_delimiter_keeps_whole_text() {
        assert_eq!(split_location("Кызылорда", ""), vec!["Кызылорда"]);
    }
}

//! Incremental suggestion filtering for region and stop inputs.

/// Candidates whose lowercase form starts with the lowercase query.
///
/// Preserves candidate order. An empty query returns every candidate.
///
/// # Examples
///
/// ```
/// use bus_lookup::suggest::filter_suggestions;
///
/// let stops = ["Kaubamaja", "Kadriorg", "Balti jaam"];
/// assert_eq!(filter_suggestions("ka", &stops), ["Kaubamaja", "Kadriorg"]);
/// assert_eq!(filter_suggestions("", &stops).len(), 3);
/// ```
pub fn filter_suggestions<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> Vec<&'a str> {
    let query = query.to_lowercase();
    candidates
        .iter()
        .map(|c| AsRef::<str>::as_ref(c))
        .filter(|c| c.to_lowercase().starts_with(&query))
        .collect()
}

/// State of a text input with a suggestion list beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionBox {
    /// Current text in the input
    pub value: String,

    /// Whether the suggestion list is shown
    pub visible: bool,
}

impl SuggestionBox {
    /// Update the text and show matching candidates.
    ///
    /// Returns the matches; the list is hidden when nothing matches.
    pub fn type_text<'a, S: AsRef<str>>(&mut self, text: &str, candidates: &'a [S]) -> Vec<&'a str> {
        self.value = text.to_string();
        let matches = filter_suggestions(&self.value, candidates);
        self.visible = !matches.is_empty();
        matches
    }

    /// Commit a chosen suggestion as the input's value and hide the list.
    pub fn choose(&mut self, item: &str) {
        self.value = item.to_string();
        self.visible = false;
    }

    /// Hide the list without changing the value.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Reset to an empty, hidden input.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGIONS: [&str; 4] = ["Tallinn", "Tartu", "Pärnu", "tapa"];

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert_eq!(filter_suggestions("TA", &REGIONS), ["Tallinn", "Tartu", "tapa"]);
        assert_eq!(filter_suggestions("tal", &REGIONS), ["Tallinn"]);
    }

    #[test]
    fn non_ascii_prefix() {
        assert_eq!(filter_suggestions("PÄ", &REGIONS), ["Pärnu"]);
    }

    #[test]
    fn only_prefix_not_substring() {
        assert!(filter_suggestions("linn", &REGIONS).is_empty());
    }

    #[test]
    fn empty_query_returns_all_in_order() {
        assert_eq!(filter_suggestions("", &REGIONS), REGIONS);
    }

    #[test]
    fn works_with_owned_strings() {
        let stops = vec!["Kaubamaja".to_string(), "Balti jaam".to_string()];
        assert_eq!(filter_suggestions("b", &stops), ["Balti jaam"]);
    }

    #[test]
    fn suggestion_box_lifecycle() {
        let mut input = SuggestionBox::default();

        let matches = input.type_text("ta", &REGIONS);
        assert_eq!(matches.len(), 3);
        assert!(input.visible);

        let matches = input.type_text("xyz", &REGIONS);
        assert!(matches.is_empty());
        assert!(!input.visible);

        input.type_text("t", &REGIONS);
        input.choose("Tartu");
        assert_eq!(input.value, "Tartu");
        assert!(!input.visible);

        input.clear();
        assert_eq!(input, SuggestionBox::default());
    }
}

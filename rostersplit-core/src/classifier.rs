use crate::config::MarkerConfig;
use crate::error::ExtractionError;
use crate::parsing::{normalize_line, parse_name, PeriodExtractor};
use crate::types::*;

/// Decides for each page whether it starts a document, continues the previous
/// one, or cannot be used.
pub struct PageClassifier {
    markers: MarkerConfig,
    period_extractor: PeriodExtractor,
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new(MarkerConfig::default())
    }
}

impl PageClassifier {
    pub fn new(markers: MarkerConfig) -> Self {
        let period_extractor = PeriodExtractor::new(markers.period.clone());
        Self {
            markers,
            period_extractor,
        }
    }

    pub fn classify(&self, page: &Page) -> PageRole {
        let text = page.text();
        match self.extract(text) {
            Ok(result) => PageRole::New(result),
            Err(reason) if text.contains(&self.markers.continuation) => {
                PageRole::Continuation(reason)
            }
            Err(reason) => PageRole::Unrecognized(reason),
        }
    }

    /// Run name parser and period extractor on one page of text.
    ///
    /// The name is checked first, so a page missing both reports the name
    /// problem.
    pub fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractionError> {
        let name_line = self
            .find_name_line(text)
            .ok_or(ExtractionError::MissingNameMarker)?;
        let name = parse_name(&normalize_line(name_line));
        let period = self.period_extractor.extract(text);

        let name = name?;
        let period = period?;

        Ok(ArtifactKey {
            last_name: name.last_name,
            first_name: name.first_name,
            period_key: period.key(),
        })
    }

    /// Locate the line carrying the employee name.
    ///
    /// Outer `None`: no marker line with a successor. Inner `None`: the
    /// marker is followed by a salutation on the very last line.
    fn find_name_line<'a>(&self, text: &'a str) -> Option<Option<&'a str>> {
        let lines: Vec<&str> = text.lines().collect();
        let marker_at = lines
            .iter()
            .enumerate()
            .position(|(i, line)| line.contains(&self.markers.name) && i + 1 < lines.len())?;

        let next = lines[marker_at + 1];
        if self.is_salutation(&normalize_line(next)) {
            Some(lines.get(marker_at + 2).copied())
        } else {
            Some(Some(next))
        }
    }

    fn is_salutation(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        self.markers.salutations.iter().any(|s| s.to_lowercase() == lowered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: &str = "Zeitraum: Januar 2024 01.01.2024 - 31.01.2024";

    fn page(text: &str) -> Page {
        Page::new(0, Some(text.to_string()))
    }

    fn classify(text: &str) -> PageRole {
        PageClassifier::default().classify(&page(text))
    }

    #[test]
    fn test_new_page() {
        let role = classify(&format!("Dienstplan\nHerr/Frau\nText5: Max Mustermann\n{PERIOD}"));
        assert_eq!(
            role,
            PageRole::New(ArtifactKey {
                last_name: "Mustermann".to_string(),
                first_name: "Max".to_string(),
                period_key: "2024_01_31".to_string(),
            })
        );
    }

    #[test]
    fn test_name_line_goes_through_normalizer() {
        let role = classify(&format!("Herr/Frau\nText5: Anna Schulz\n{PERIOD}"));
        match role {
            PageRole::New(key) => {
                assert_eq!(key.first_name, "Anna");
                assert_eq!(key.last_name, "Schulz");
            }
            other => panic!("expected new page, got {other:?}"),
        }
    }

    #[test]
    fn test_salutation_line_skipped() {
        let role = classify(&format!("Herr/Frau\nFrau\nAnna Schulz\n{PERIOD}"));
        match role {
            PageRole::New(key) => assert_eq!(key.last_name, "Schulz"),
            other => panic!("expected new page, got {other:?}"),
        }
    }

    #[test]
    fn test_labelled_salutation_line_skipped() {
        for salutation in ["Text5: Herr", "Text5: Herrn"] {
            let role = classify(&format!("Herr/Frau\n{salutation}\nAnna Schulz\n{PERIOD}"));
            match role {
                PageRole::New(key) => assert_eq!(key.last_name, "Schulz"),
                other => panic!("expected new page for {salutation:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bare_herr_is_read_as_name() {
        // The normalizer strips the first "e", so "Herr" no longer matches a
        // salutation and is parsed as a single-token name
        assert_eq!(
            classify(&format!("Herr/Frau\nHerr\nAnna Schulz\n{PERIOD}")),
            PageRole::Unrecognized(ExtractionError::InvalidName("Hrr".to_string()))
        );
        assert_eq!(
            classify(&format!("Herr/Frau\nHerrn\nAnna Schulz\n{PERIOD}")),
            PageRole::Unrecognized(ExtractionError::InvalidName("Hrrn".to_string()))
        );
    }

    #[test]
    fn test_salutation_on_last_line_is_missing_name() {
        assert_eq!(
            classify("Zeitraum: 01.01.2024\nHerr/Frau\nFrau"),
            PageRole::Unrecognized(ExtractionError::MissingName)
        );
    }

    #[test]
    fn test_marker_on_last_line_is_not_a_marker() {
        assert_eq!(
            classify(&format!("{PERIOD}\nHerr/Frau")),
            PageRole::Unrecognized(ExtractionError::MissingNameMarker)
        );
    }

    #[test]
    fn test_missing_period_without_continuation_marker() {
        assert_eq!(
            classify("Herr/Frau\nMax Mustermann\nkein Zeitraum"),
            PageRole::Unrecognized(ExtractionError::MissingPeriodMarker)
        );
    }

    #[test]
    fn test_missing_period_with_continuation_marker() {
        assert_eq!(
            classify("Herr/Frau\nMax Mustermann\nSeite 2 von 2"),
            PageRole::Continuation(ExtractionError::MissingPeriodMarker)
        );
    }

    #[test]
    fn test_plain_continuation_page() {
        assert_eq!(
            classify("Seite 2\nSchichten 16.01.2024 - 31.01.2024"),
            PageRole::Continuation(ExtractionError::MissingNameMarker)
        );
    }

    #[test]
    fn test_invalid_name_reported_before_period() {
        assert_eq!(
            classify("Herr/Frau\nAnna\nohne Datum"),
            PageRole::Unrecognized(ExtractionError::InvalidName("Anna".to_string()))
        );
    }

    #[test]
    fn test_absent_text_is_unrecognized() {
        let role = PageClassifier::default().classify(&Page::new(3, None));
        assert_eq!(role, PageRole::Unrecognized(ExtractionError::MissingNameMarker));
    }

    #[test]
    fn test_custom_markers() {
        let markers = MarkerConfig {
            name: "Mitarbeiter:".to_string(),
            continuation: "Fortsetzung".to_string(),
            ..MarkerConfig::default()
        };
        let classifier = PageClassifier::new(markers);
        assert!(matches!(
            classifier.classify(&page(&format!("Mitarbeiter:\nMax Mustermann\n{PERIOD}"))),
            PageRole::New(_)
        ));
        assert!(matches!(
            classifier.classify(&page("Fortsetzung")),
            PageRole::Continuation(_)
        ));
    }
}

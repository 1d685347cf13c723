//! Regex rules for sensitive entities.

use redakto_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Rule as written in a `patterns.yml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRuleSpec {
    pub label: String,
    pub pattern: String,
    #[serde(default = "default_score")]
    pub score: f32,
    /// Capture group that forms the entity; 0 is the whole match
    #[serde(default)]
    pub group: usize,
}

fn default_score() -> f32 {
    1.0
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub label: String,
    pub regex: Regex,
    pub score: f32,
    pub group: usize,
}

impl PatternRule {
    pub fn new(label: &str, pattern: &str, score: f32, group: usize) -> Result<Self> {
        PatternRuleSpec {
            label: label.to_string(),
            pattern: pattern.to_string(),
            score,
            group,
        }
        .compile()
    }
}

impl PatternRuleSpec {
    pub fn compile(self) -> Result<PatternRule> {
        let regex = Regex::new(&self.pattern).map_err(|e| {
            Error::Configuration(format!("Invalid pattern for label '{}': {}", self.label, e))
        })?;
        if self.group >= regex.captures_len() {
            return Err(Error::Configuration(format!(
                "Pattern for label '{}' has no capture group {}",
                self.label, self.group
            )));
        }
        Ok(PatternRule {
            label: self.label,
            regex,
            score: self.score,
            group: self.group,
        })
    }
}

const NAME: &str = r"[A-ZÄÖÜ][a-zäöüß]+(?:-[A-ZÄÖÜ][a-zäöüß]+)?";

/// Built-in rules for German personal data. Labels: `EMAIL`, `URL`, `PHONE`,
/// `FAX`, `IBAN`, `DATE`, `ZIP`, `CITY`, `STREET`, `TITLE`, `NAME`.
pub fn builtin_rules() -> Vec<PatternRuleSpec> {
    let rule = |label: &str, pattern: String, score: f32, group: usize| PatternRuleSpec {
        label: label.to_string(),
        pattern,
        score,
        group,
    };

    vec![
        rule(
            "EMAIL",
            r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".to_string(),
            0.99,
            0,
        ),
        rule(
            "URL",
            r#"(?:https?://|www\.)[^\s<>"]*[^\s<>".,;:!?)\]]"#.to_string(),
            0.95,
            0,
        ),
        rule(
            "PHONE",
            r"(?i)\b(?:tel\.?|telefon|fon|mobil|handy)\s*:?\s*(\+?[0-9][0-9 /()-]{4,}[0-9])".to_string(),
            0.9,
            1,
        ),
        rule(
            "FAX",
            r"(?i)\b(?:fax|telefax)\s*:?\s*(\+?[0-9][0-9 /()-]{4,}[0-9])".to_string(),
            0.9,
            1,
        ),
        rule(
            "IBAN",
            r"\b[A-Z]{2}[0-9]{2}(?: ?[0-9A-Z]{4}){3,7}(?: ?[0-9A-Z]{1,3})?\b".to_string(),
            0.95,
            0,
        ),
        rule(
            "DATE",
            r"\b(?:0?[1-9]|[12][0-9]|3[01])\.(?:0?[1-9]|1[0-2])\.(?:19|20)?[0-9]{2}\b".to_string(),
            0.9,
            0,
        ),
        rule("ZIP", format!(r"\b([0-9]{{5}})\s+{}", NAME), 0.85, 1),
        rule("CITY", format!(r"\b[0-9]{{5}}\s+({})", NAME), 0.85, 1),
        rule(
            "STREET",
            r"\b[A-ZÄÖÜ][a-zäöüß-]*(?:straße|strasse|str\.|weg|allee|platz|gasse|ring|damm|ufer)\s+[0-9]{1,4}[a-z]?\b"
                .to_string(),
            0.85,
            0,
        ),
        rule(
            "TITLE",
            r"\b(?:Dr\.|Prof\.)(?: ?(?:med\.|dent\.|rer\. ?nat\.))?".to_string(),
            0.8,
            0,
        ),
        rule(
            "NAME",
            format!(
                r"\b(?:Herr|Frau|Hr\.|Fr\.|Dr\.|Prof\.)\s+(?:(?:Dr\.|Prof\.|med\.)\s+)*({}(?: {})?)",
                NAME, NAME
            ),
            0.8,
            1,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled() -> Vec<PatternRule> {
        builtin_rules()
            .into_iter()
            .map(|r| r.compile().unwrap())
            .collect()
    }

    fn find<'a>(label: &str, text: &'a str) -> Option<&'a str> {
        compiled()
            .into_iter()
            .find(|r| r.label == label)
            .and_then(|r| {
                r.regex
                    .captures(text)
                    .and_then(|c| c.get(r.group))
                    .map(|m| m.as_str())
            })
    }

    #[test]
    fn test_builtin_rules_compile() {
        assert_eq!(compiled().len(), builtin_rules().len());
    }

    #[test]
    fn test_contact_rules() {
        assert_eq!(
            find("EMAIL", "Kontakt: anna.meier@klinik-beispiel.de."),
            Some("anna.meier@klinik-beispiel.de")
        );
        assert_eq!(find("PHONE", "Tel.: 030 / 123456-78"), Some("030 / 123456-78"));
        assert_eq!(find("FAX", "Fax 0221 998877"), Some("0221 998877"));
        assert_eq!(
            find("URL", "Siehe https://example.org/befund."),
            Some("https://example.org/befund")
        );
    }

    #[test]
    fn test_location_rules() {
        let text = "Wohnhaft in der Hauptstraße 12a, 10115 Berlin";
        assert_eq!(find("STREET", text), Some("Hauptstraße 12a"));
        assert_eq!(find("ZIP", text), Some("10115"));
        assert_eq!(find("CITY", text), Some("Berlin"));
    }

    #[test]
    fn test_name_and_title_rules() {
        let text = "Befund von Dr. med. Anna Meier";
        assert_eq!(find("NAME", text), Some("Anna Meier"));
        assert_eq!(find("TITLE", text), Some("Dr. med."));
    }

    #[test]
    fn test_date_and_iban() {
        assert_eq!(find("DATE", "aufgenommen am 03.11.2021."), Some("03.11.2021"));
        assert_eq!(
            find("IBAN", "IBAN DE89 3704 0044 0532 0130 00"),
            Some("DE89 3704 0044 0532 0130 00")
        );
    }

    #[test]
    fn test_invalid_group_rejected() {
        let err = PatternRule::new("X", "abc", 1.0, 1).unwrap_err();
        assert!(err.to_string().contains("no capture group 1"));
    }

    #[test]
    fn test_spec_defaults_from_yaml() {
        let spec: PatternRuleSpec = serde_yaml::from_str("label: MRN\npattern: 'MRN-[0-9]+'\n").unwrap();
        assert_eq!(spec.score, 1.0);
        assert_eq!(spec.group, 0);
    }
}

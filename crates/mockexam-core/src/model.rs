//! Core data model types for mockexam.
//!
//! A question bank is a JSON array of [`Question`] objects. Questions are
//! immutable once loaded; all per-attempt state lives in the session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    pub question: String,
    /// The offered choices.
    #[serde(default)]
    pub options: Options,
    /// Identifier of the correct choice.
    pub answer: String,
    /// Optional citation shown next to the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// The choices offered by a question.
///
/// Banks in the wild use two shapes: a plain list of choice texts, where the
/// text doubles as the identifier, or a map from a short key (`"A"`, `"B"`, ...)
/// to the choice text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Options {
    List(Vec<String>),
    Keyed(BTreeMap<String, String>),
}

impl Default for Options {
    fn default() -> Self {
        Options::List(Vec::new())
    }
}

/// One selectable choice as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Value recorded as the answer when this choice is selected.
    pub id: String,
    /// Text displayed for this choice.
    pub text: String,
}

impl Options {
    /// Choices in presentation order. Keyed options are ordered by key.
    pub fn choices(&self) -> Vec<Choice> {
        match self {
            Options::List(items) => items
                .iter()
                .map(|text| Choice {
                    id: text.clone(),
                    text: text.clone(),
                })
                .collect(),
            Options::Keyed(map) => map
                .iter()
                .map(|(key, text)| Choice {
                    id: key.clone(),
                    text: text.clone(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Options::List(items) => items.len(),
            Options::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` identifies one of the offered choices.
    pub fn contains_id(&self, id: &str) -> bool {
        match self {
            Options::List(items) => items.iter().any(|t| t == id),
            Options::Keyed(map) => map.contains_key(id),
        }
    }
}

impl Question {
    /// Offered choices in presentation order.
    pub fn choices(&self) -> Vec<Choice> {
        self.options.choices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_options() {
        let json = r#"{
            "question": "Which planet is largest?",
            "options": ["Mars", "Jupiter", "Venus"],
            "answer": "Jupiter"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.options.len(), 3);
        assert!(q.options.contains_id("Jupiter"));
        assert_eq!(q.reference, None);
        assert_eq!(q.choices()[1].id, "Jupiter");
    }

    #[test]
    fn parse_keyed_options_in_key_order() {
        let json = r#"{
            "question": "2 + 2?",
            "options": {"C": "5", "A": "3", "B": "4"},
            "answer": "B",
            "reference": "Arithmetic, ch. 1"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = q.choices().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(q.choices()[1].text, "4");
        assert_eq!(q.reference.as_deref(), Some("Arithmetic, ch. 1"));
    }

    #[test]
    fn missing_options_default_to_empty() {
        let q: Question = serde_json::from_str(r#"{"question": "?", "answer": "x"}"#).unwrap();
        assert!(q.options.is_empty());
        assert!(q.choices().is_empty());
    }
}

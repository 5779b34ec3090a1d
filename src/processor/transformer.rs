use crate::models::Transform;

use super::morphology::singularize_phrase;

impl Transform {
    /// Applies the transformation. Empty input has nothing to transform and
    /// yields `None`.
    pub fn apply(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }

        let transformed = match self {
            Transform::Mayuscula => text.to_uppercase(),
            Transform::Minuscula => text.to_lowercase(),
            Transform::Capitalize => capitalize(text),
            Transform::Singular => singularize_phrase(text),
            Transform::Ninguna => text.to_string(),
        };
        Some(transformed)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

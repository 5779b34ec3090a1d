//! Spanish plural to singular conversion for product naming tokens.

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'á', 'é', 'í', 'ó', 'ú'];

/// Converts a single word from plural to singular.
///
/// Rules are matched against the lower-cased word, first match wins:
/// `-ces` becomes `-z`, consonant + `-es` drops `-es`, `-ies` becomes `-y`,
/// any other `-s` drops the `s`. The casing of the kept letters is untouched.
pub fn singularize(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let lower: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();
    let n = chars.len();
    let ends_with = |suffix: &str| {
        let suffix: Vec<char> = suffix.chars().collect();
        n >= suffix.len() && lower[n - suffix.len()..] == suffix[..]
    };

    if ends_with("ces") {
        return replace_tail(&chars, 3, Some('z'));
    }

    if ends_with("es") && n > 2 {
        if !VOWELS.contains(&lower[n - 3]) {
            return replace_tail(&chars, 2, None);
        }
        if ends_with("ies") {
            return replace_tail(&chars, 3, Some('y'));
        }
        return replace_tail(&chars, 1, None);
    }

    if ends_with("s") && n > 1 {
        return replace_tail(&chars, 1, None);
    }

    word.to_string()
}

/// Drops the last `count` characters and optionally appends `letter`, cased
/// like the first character it replaces.
fn replace_tail(chars: &[char], count: usize, letter: Option<char>) -> String {
    let keep = chars.len() - count;
    let mut out: String = chars[..keep].iter().collect();
    if let Some(letter) = letter {
        if chars[keep].is_uppercase() {
            out.extend(letter.to_uppercase());
        } else {
            out.push(letter);
        }
    }
    out
}

/// Singularizes every whitespace-separated word of `text`, keeping each
/// word's casing pattern (ALL CAPS, Capitalized or as-is).
pub fn singularize_phrase(text: &str) -> String {
    if text.is_empty() {
        return text.to_string();
    }

    text.split_whitespace()
        .map(|word| {
            if is_all_upper(word) {
                singularize(word).to_uppercase()
            } else if word.chars().next().is_some_and(char::is_uppercase) {
                upper_first(&singularize(word))
            } else {
                singularize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_all_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ces_becomes_z() {
        assert_eq!(singularize("luces"), "luz");
        assert_eq!(singularize("lápices"), "lápiz");
        assert_eq!(singularize("LUCES"), "LUZ");
    }

    #[test]
    fn test_vowel_s_drops_s() {
        assert_eq!(singularize("autos"), "auto");
        assert_eq!(singularize("laptops"), "laptop");
        assert_eq!(singularize("baterías"), "batería");
        assert_eq!(singularize("cafées"), "cafée");
    }

    #[test]
    fn test_consonant_es_drops_es() {
        assert_eq!(singularize("portátiles"), "portátil");
        assert_eq!(singularize("colores"), "color");
        assert_eq!(singularize("PANTALLES"), "PANTALL");
    }

    #[test]
    fn test_ies_becomes_y() {
        assert_eq!(singularize("series"), "sery");
        assert_eq!(singularize("SERIES"), "SERY");
    }

    #[test]
    fn test_short_and_unmatched_words() {
        assert_eq!(singularize("s"), "s");
        assert_eq!(singularize("es"), "e");
        assert_eq!(singularize("gamer"), "gamer");
        assert_eq!(singularize(""), "");
    }

    #[test]
    fn test_phrase_preserves_casing() {
        assert_eq!(singularize_phrase("LAPTOPS GAMER"), "LAPTOP GAMER");
        assert_eq!(singularize_phrase("Laptops"), "Laptop");
        assert_eq!(singularize_phrase("Computadoras portátiles"), "Computadora portátil");
        assert_eq!(singularize_phrase("luces  LED"), "luz LED");
    }

    #[test]
    fn test_phrase_empty_input() {
        assert_eq!(singularize_phrase(""), "");
        assert_eq!(singularize_phrase("   "), "");
    }
}

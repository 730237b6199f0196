//! URL slug generation for category and style names.

/// Build a URL-safe slug from a display name.
///
/// Lowercases the input, spells `&` as `and`, folds common Latin accents to ASCII and
/// collapses every run of whitespace or non-word characters into a single hyphen.
/// Leading and trailing hyphens are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        let word: Option<&str> = match ch {
            '&' => Some("and"),
            'a'..='z' | '0'..='9' | '_' => None,
            _ => fold_accent(ch),
        };

        let is_word_char = matches!(ch, 'a'..='z' | '0'..='9' | '_');
        if !is_word_char && word.is_none() {
            pending_hyphen = true;
            continue;
        }

        if ch == '&' {
            // `&` always stands alone: "rock&roll" -> "rock-and-roll"
            pending_hyphen = true;
        }
        if pending_hyphen && !slug.is_empty() {
            slug.push('-');
        }
        pending_hyphen = ch == '&';

        match word {
            Some(text) => slug.push_str(text),
            None => slug.push(ch),
        }
    }

    slug
}

fn fold_accent(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => "a",
        'é' | 'è' | 'ë' | 'ê' => "e",
        'í' | 'ì' | 'ï' | 'î' => "i",
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => "o",
        'ú' | 'ù' | 'ü' | 'û' => "u",
        'ñ' => "n",
        'ç' => "c",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

//! Shared phrase helpers for the text extractors

/// Declare a lazily compiled regex static
macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: ::once_cell::sync::Lazy<::regex::Regex> = ::once_cell::sync::Lazy::new(|| {
            ::regex::Regex::new($re).expect(stringify!($name))
        });
    };
}

pub(crate) use pattern;

/// Words that follow "clase"/"class" without being a class name
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "abstracta", "abstract", "al", "called", "con", "de", "del", "diagram",
    "diagrama", "diagrams", "e", "el", "en", "for", "la", "las", "llamada", "llamado", "los",
    "of", "para", "que", "the", "to", "un", "una", "with", "y",
];

/// Section headers that can look like a capitalised name
const SECTION_WORDS: &[&str] = &[
    "atributo", "atributos", "attribute", "attributes", "class", "clase", "clases", "classes",
    "metodo", "metodos", "method", "methods", "método", "métodos", "nota", "note",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word.to_lowercase().as_str())
}

pub fn is_section_word(word: &str) -> bool {
    SECTION_WORDS.contains(&word.to_lowercase().as_str())
}

/// Trim whitespace and trailing punctuation
pub fn clean_phrase(s: &str) -> &str {
    s.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .trim()
}

/// Lowercased, underscore-joined id: "Comprar producto" -> "comprar_producto"
pub fn slug(s: &str) -> String {
    clean_phrase(s)
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Split an enumeration on commas and on "y"/"e"/"and", outside parentheses
///
/// `"crear(a: int, b: int), borrar y listar"` gives three items.
pub fn split_list(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut words = s.split_inclusive(char::is_whitespace).peekable();

    while let Some(word) = words.next() {
        let bare = word.trim();
        if depth == 0 && matches!(bare.to_lowercase().as_str(), "y" | "e" | "and") {
            push_item(&mut items, &mut current);
            continue;
        }
        for c in word.chars() {
            match c {
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => push_item(&mut items, &mut current),
                _ => current.push(c),
            }
        }
    }
    push_item(&mut items, &mut current);
    items
}

fn push_item(items: &mut Vec<String>, current: &mut String) {
    let item = clean_phrase(current);
    if !item.is_empty() {
        items.push(item.to_string());
    }
    current.clear();
}

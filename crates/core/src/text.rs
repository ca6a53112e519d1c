use unicode_segmentation::UnicodeSegmentation;

pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

/// Upper-cases the first letter of every word, leaving the rest untouched.
pub fn title_case(input: &str) -> String {
    input
        .split_word_bound_indices()
        .map(|(_, segment)| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() => {
                    first.to_uppercase().chain(chars).collect::<String>()
                }
                _ => segment.to_string(),
            }
        })
        .collect()
}

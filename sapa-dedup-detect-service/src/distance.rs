/// Number of leading characters of a record's content that take part in comparison.
pub const PREFIX_CHARS: usize = 100;

/// The lower-cased leading excerpt of `content` that duplicates are judged on.
///
/// Truncation counts characters, not bytes, and happens before lower-casing.
/// No whitespace or punctuation normalization is applied.
pub fn comparison_prefix(content: &str) -> String {
    content
        .chars()
        .take(PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase()
}

/// Normalized edit-distance similarity in `[0, 1]`.
///
/// `(max_len - levenshtein(a, b)) / max_len`, where `max_len` is the character
/// length of the longer string. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - levenshtein(a, b)) as f64 / max_len as f64
}

/// Classic Levenshtein distance over characters, every edit costing 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

/// Fills the full `(b.len() + 1) x (a.len() + 1)` table row by row.
fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    let width = a.len() + 1;
    let mut matrix = vec![0usize; width * (b.len() + 1)];
    for (col, cell) in matrix.iter_mut().take(width).enumerate() {
        *cell = col;
    }
    for row in 1..=b.len() {
        matrix[row * width] = row;
        for col in 1..width {
            let cost = usize::from(b[row - 1] != a[col - 1]);
            let substitution = matrix[(row - 1) * width + col - 1] + cost;
            let insertion = matrix[row * width + col - 1] + 1;
            let deletion = matrix[(row - 1) * width + col] + 1;
            matrix[row * width + col] = substitution.min(insertion).min(deletion);
        }
    }
    matrix[b.len() * width + a.len()]
}

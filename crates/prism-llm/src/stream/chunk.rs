//! Word-window chunking of streamed text

/// Byte offset where word number `words + 1` starts, if the text has one
///
/// Whitespace belongs to the word before it, so splitting at the returned
/// offset never loses or reorders characters.
pub fn window_end(text: &str, words: usize) -> Option<usize> {
    let words = words.max(1);
    let mut seen = 0;
    let mut in_word = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            if seen == words {
                return Some(i);
            }
            seen += 1;
            in_word = true;
        }
    }

    None
}

/// Split text into chunks of `words` words each
///
/// Concatenating the chunks yields the input exactly.
pub fn chunk_text(text: &str, words: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while let Some(end) = window_end(rest, words) {
        chunks.push(rest[..end].to_owned());
        rest = &rest[end..];
    }

    if !rest.is_empty() {
        chunks.push(rest.to_owned());
    }

    chunks
}

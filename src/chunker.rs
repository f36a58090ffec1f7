// Stream Chunker Module
// Splits a quote into the fragments that are streamed one by one.

/// Separator re-attached after every word
pub const FRAGMENT_SEPARATOR: char = ' ';

/// Split `text` on whitespace into `word + " "` fragments, in source order.
///
/// Empty or whitespace-only input yields no fragments.
pub fn chunk(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            let mut fragment = String::with_capacity(word.len() + 1);
            fragment.push_str(word);
            fragment.push(FRAGMENT_SEPARATOR);
            fragment
        })
        .collect()
}

/// Inverse of [`chunk`]: the words of the source text, single-space joined
pub fn reconstruct(fragments: &[String]) -> String {
    fragments
        .iter()
        .map(|f| f.strip_suffix(FRAGMENT_SEPARATOR).unwrap_or(f))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_matrix_quote() {
        assert_eq!(chunk("The Matrix Neo"), vec!["The ", "Matrix ", "Neo "]);
    }

    #[test]
    fn test_chunk_single_word() {
        assert_eq!(chunk("Linux"), vec!["Linux "]);
    }

    #[test]
    fn test_chunk_empty() {
        assert!(chunk("").is_empty());
        assert!(chunk(" \t\n ").is_empty());
    }

    #[test]
    fn test_chunk_collapses_runs_of_whitespace() {
        assert_eq!(chunk("  Obi-Wan   Kenobi\t"), vec!["Obi-Wan ", "Kenobi "]);
    }

    #[test]
    fn test_reconstruction_preserves_word_order() {
        let samples = [
            "Luke Skywalker",
            "The Matrix Trinity Moss",
            "Mr. Poopybutthole",
            "Brienne of Tarth",
            "Windows Server",
        ];

        for sample in samples {
            let fragments = chunk(sample);
            assert!(fragments.iter().all(|f| f.ends_with(FRAGMENT_SEPARATOR)));
            assert_eq!(reconstruct(&fragments), sample);
        }
    }
}

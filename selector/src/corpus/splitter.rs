use std::collections::VecDeque;
use std::path::PathBuf;

use super::{CorpusError, Document};

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// A piece of a [`Document`], small enough to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub source: PathBuf,
}

/// Recursive character splitter.
///
/// Tries paragraph, line, word, then character boundaries, and merges the
/// resulting pieces back up to `chunk_size` characters with `chunk_overlap`
/// characters of trailing context carried into the next chunk.
#[derive(Debug, Clone, Copy)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, CorpusError> {
        if chunk_overlap > chunk_size || chunk_size == 0 {
            return Err(CorpusError::InvalidSplitter {
                chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.text)
                    .into_iter()
                    .map(|text| Chunk {
                        text,
                        source: doc.source.clone(),
                    })
            })
            .collect();
        tracing::debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            chunk_overlap = self.chunk_overlap,
            "Split documents"
        );
        chunks
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);
        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if rest.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, rest));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut merged = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joined_len = |total: usize, window: &VecDeque<&str>| {
                total + len + if window.is_empty() { 0 } else { sep_len }
            };

            if joined_len(total, &window) > self.chunk_size && !window.is_empty() {
                push_joined(&mut merged, &window, separator);
                while total > self.chunk_overlap
                    || (joined_len(total, &window) > self.chunk_size && total > 0)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    let dropped = char_len(front) + if window.is_empty() { 0 } else { sep_len };
                    total = total.saturating_sub(dropped);
                }
            }

            window.push_back(piece);
            total += len + if window.len() > 1 { sep_len } else { 0 };
        }

        push_joined(&mut merged, &window, separator);
        merged
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (idx, sep) in separators.iter().copied().enumerate() {
        if sep.is_empty() {
            return (sep, &[]);
        }
        if text.contains(sep) {
            return (sep, &separators[idx + 1..]);
        }
    }
    ("", &[])
}

fn push_joined(out: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_overlap_larger_than_chunk() {
        assert!(matches!(
            RecursiveSplitter::new(10, 11),
            Err(CorpusError::InvalidSplitter { .. })
        ));
        assert!(RecursiveSplitter::new(0, 0).is_err());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = RecursiveSplitter::new(1000, 20).unwrap();
        let chunks = splitter.split_text("  {\"name\": \"Ann\", \"skills\": [\"rust\"]}\n");
        assert_eq!(chunks, vec!["{\"name\": \"Ann\", \"skills\": [\"rust\"]}"]);
    }

    #[test]
    fn test_paragraphs_merge_up_to_chunk_size() {
        let splitter = RecursiveSplitter::new(12, 0).unwrap();
        let chunks = splitter.split_text("aaaa\n\nbbbb\n\ncccc");
        assert_eq!(chunks, vec!["aaaa\n\nbbbb", "cccc"]);
    }

    #[test]
    fn test_overlap_carries_trailing_words() {
        let splitter = RecursiveSplitter::new(11, 5).unwrap();
        let chunks = splitter.split_text("one two three four");
        assert_eq!(chunks, vec!["one two", "two three", "three four"]);
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(4, 0).unwrap();
        let chunks = splitter.split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunks_keep_source() {
        let splitter = RecursiveSplitter::new(5, 0).unwrap();
        let docs = vec![Document {
            text: "abc def".to_string(),
            source: PathBuf::from("agents/a.json"),
        }];
        let chunks = splitter.split_documents(&docs);
        assert_eq!(chunks.len(), 2);
        assert!(chunks
            .iter()
            .all(|c| c.source == PathBuf::from("agents/a.json")));
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        let splitter = RecursiveSplitter::new(10, 2).unwrap();
        assert!(splitter.split_text("   \n\n  ").is_empty());
    }
}

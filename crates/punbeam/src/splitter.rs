use crate::document::Document;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Recursive character text splitter.
///
/// Splits on the coarsest separator that appears in the text, recursing into
/// finer separators for pieces that are still too large, then greedily merges
/// pieces into chunks of at most `chunk_size` characters with `chunk_overlap`
/// characters carried between consecutive chunks.
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(
            chunk_overlap < chunk_size,
            "chunk_overlap must be smaller than chunk_size"
        );
        Self {
            chunk_size,
            chunk_overlap,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }

    /// Split text into chunks of at most `chunk_size` characters
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split documents into chunk documents, carrying the source metadata and
    /// annotating each chunk with its byte offset in the source text
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut chunks = Vec::new();
        for document in documents {
            let text = &document.page_content;
            let mut search_start = 0usize;

            for chunk in self.split_text(text) {
                let index = text[search_start..]
                    .find(chunk.as_str())
                    .map(|i| i + search_start);

                let mut piece = Document::new(chunk.clone());
                piece.metadata = document.metadata.clone();
                if let Some(i) = index {
                    piece.metadata
                        .insert("start_index".to_string(), serde_json::json!(i));
                    // Overlapping chunks: the next chunk may begin before this
                    // one ends, so only advance past this chunk's first char
                    search_start = i + text[i..].chars().next().map_or(1, char::len_utf8);
                }
                chunks.push(piece);
            }
        }
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let Some((separator, rest)) = pick_separator(text, separators) else {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            };
        };

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator.as_str()).map(String::from).collect()
        };

        let mut final_chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();

        for split in splits {
            if char_len(&split) < self.chunk_size {
                good_splits.push(split);
            } else {
                if !good_splits.is_empty() {
                    final_chunks.extend(self.merge_splits(&good_splits, &separator));
                    good_splits.clear();
                }
                if rest.is_empty() {
                    final_chunks.push(split);
                } else {
                    final_chunks.extend(self.split_recursive(&split, rest));
                }
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, &separator));
        }

        final_chunks
    }

    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: Vec<&String> = Vec::new();
        let mut total = 0usize;

        for split in splits {
            let split_len = char_len(split);
            let joined_extra = if current.is_empty() { 0 } else { separator_len };

            if total + split_len + joined_extra > self.chunk_size && !current.is_empty() {
                if let Some(chunk) = join_nonempty(&current, separator) {
                    chunks.push(chunk);
                }
                // Shed leading pieces until the window fits within the overlap
                while total > self.chunk_overlap
                    || (total + split_len + separator_len > self.chunk_size && total > 0)
                {
                    let removed = current.remove(0);
                    let sep = if current.is_empty() { 0 } else { separator_len };
                    total -= char_len(removed) + sep;
                    if current.is_empty() {
                        break;
                    }
                }
            }

            total += split_len + if current.is_empty() { 0 } else { separator_len };
            current.push(split);
        }

        if let Some(chunk) = join_nonempty(&current, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> Option<(String, &'a [String])> {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator.as_str()) {
            return Some((separator.clone(), &separators[i + 1..]));
        }
    }
    None
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_nonempty(pieces: &[&String], separator: &str) -> Option<String> {
    let joined = pieces
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

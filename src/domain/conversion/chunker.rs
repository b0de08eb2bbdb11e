use regex::Regex;
use std::sync::OnceLock;

/// A bounded slice of text, the unit of synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

fn paragraph_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("valid paragraph pattern"))
}

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("valid sentence pattern"))
}

/// Running chunk that flushes into `out` when the next piece would overflow
struct Accumulator {
    max_chars: usize,
    current: String,
    current_chars: usize,
    out: Vec<String>,
}

impl Accumulator {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            current: String::new(),
            current_chars: 0,
            out: Vec::new(),
        }
    }

    fn push(&mut self, piece: &str, separator: &str) {
        let piece_chars = piece.chars().count();
        let separator_chars = separator.chars().count();

        if !self.current.is_empty()
            && self.current_chars + separator_chars + piece_chars > self.max_chars
        {
            self.flush();
        }

        if !self.current.is_empty() {
            self.current.push_str(separator);
            self.current_chars += separator_chars;
        }
        self.current.push_str(piece);
        self.current_chars += piece_chars;
    }

    /// Emit a piece as its own chunk, even if it exceeds the bound
    fn push_alone(&mut self, piece: &str) {
        self.flush();
        self.out.push(piece.to_string());
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.out.push(std::mem::take(&mut self.current));
            self.current_chars = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }
}

/// Split text into ordered chunks of at most `max_chars` characters.
///
/// Paragraphs (blank-line separated) are packed together first. A paragraph
/// longer than the bound is split at sentence terminators and its sentences
/// packed the same way. A sentence that alone exceeds the bound is emitted
/// whole. Blank chunks are dropped and indices are assigned afterwards, so
/// they are always contiguous from zero.
pub fn split(text: &str, max_chars: usize) -> Vec<Chunk> {
    let max_chars = max_chars.max(1);

    let pieces = if text.chars().count() <= max_chars {
        vec![text.to_string()]
    } else {
        let mut acc = Accumulator::new(max_chars);

        for paragraph in paragraph_pattern().split(text) {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }

            if paragraph.chars().count() > max_chars {
                acc.flush();
                split_sentences(paragraph, &mut acc);
                acc.flush();
            } else {
                acc.push(paragraph, "\n\n");
            }
        }

        acc.finish()
    };

    pieces
        .iter()
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(index, piece)| Chunk {
            index,
            text: piece.to_string(),
        })
        .collect()
}

fn split_sentences(paragraph: &str, acc: &mut Accumulator) {
    let mut last_end = 0;
    let mut sentences = Vec::new();

    for mat in sentence_pattern().find_iter(paragraph) {
        sentences.push(&paragraph[last_end..mat.end()]);
        last_end = mat.end();
    }
    if last_end < paragraph.len() {
        sentences.push(&paragraph[last_end..]);
    }

    for sentence in sentences {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if sentence.chars().count() > acc.max_chars {
            acc.push_alone(sentence);
        } else {
            acc.push(sentence, " ");
        }
    }
}

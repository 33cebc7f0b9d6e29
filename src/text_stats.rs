//! Text statistics: word counts, sentence segmentation, unique-text ratio.
//!
//! Pure functions with no dependencies on the rest of the crate. All offsets
//! are in chars (Unicode scalar values), not bytes.

/// A sentence fragment of the analyzed text.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// Position among the kept sentences.
    pub index: usize,
    /// Trimmed fragment text.
    pub text: String,
    /// Char offset of the first char of `text` in the input.
    pub start: usize,
    /// Char offset one past the last char of `text`.
    pub end: usize,
    /// 1-based line of `start`.
    pub first_line: usize,
    /// 1-based line of the last char.
    pub last_line: usize,
}

impl Sentence {
    pub fn line_range(&self) -> String {
        format!("{}-{}", self.first_line, self.last_line)
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Number of whitespace-delimited tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits `text` on runs of `.`, `!` and `?`.
///
/// Each fragment is trimmed; fragments whose trimmed length is not strictly
/// greater than `min_chars` are dropped.
pub fn split_sentences(text: &str, min_chars: usize) -> Vec<Sentence> {
    let chars: Vec<char> = text.chars().collect();
    let newlines: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == '\n')
        .map(|(i, _)| i)
        .collect();

    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        if is_terminator(chars[i]) {
            push_fragment(&chars, &newlines, start, i, min_chars, &mut out);
            while i < chars.len() && is_terminator(chars[i]) {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    push_fragment(&chars, &newlines, start, chars.len(), min_chars, &mut out);
    out
}

fn push_fragment(
    chars: &[char],
    newlines: &[usize],
    start: usize,
    end: usize,
    min_chars: usize,
    out: &mut Vec<Sentence>,
) {
    let fragment = &chars[start..end];
    let Some(lead) = fragment.iter().position(|c| !c.is_whitespace()) else {
        return;
    };
    // lead exists, so a last non-whitespace char exists too
    let tail = fragment
        .iter()
        .rposition(|c| !c.is_whitespace())
        .unwrap_or(lead);
    let trimmed = &fragment[lead..=tail];
    if trimmed.len() <= min_chars {
        return;
    }

    let abs_start = start + lead;
    let abs_end = start + tail + 1;
    let line_of = |pos: usize| newlines.partition_point(|&p| p < pos) + 1;

    out.push(Sentence {
        index: out.len(),
        text: trimmed.iter().collect(),
        start: abs_start,
        end: abs_end,
        first_line: line_of(abs_start),
        last_line: line_of(abs_end - 1),
    });
}

/// Percentage of words not covered by matches, rounded and clamped to `[0, 100]`.
///
/// Returns 100 for an empty text.
pub fn unique_text_percent(total_words: usize, matched_words: usize) -> u32 {
    if total_words == 0 {
        return 100;
    }
    let unique = total_words as f64 - matched_words as f64;
    let pct = (unique / total_words as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

/// The first `max_chars` chars of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Removes `<...>` markup tags, keeping the text between them.
pub fn strip_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOX: &str =
        "The quick brown fox jumps over the lazy dog. This is a common phrase used in typing tests.";

    #[test]
    fn counts_whitespace_tokens() {
        assert_eq!(count_words(FOX), 18);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("  \n\t "), 0);
        assert_eq!(count_words("one\ntwo\tthree  four"), 4);
    }

    #[test]
    fn splits_on_terminator_runs() {
        let s = split_sentences(FOX, 10);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].text, "The quick brown fox jumps over the lazy dog");
        assert_eq!(s[1].text, "This is a common phrase used in typing tests");
        assert_eq!(s[1].index, 1);
    }

    #[test]
    fn drops_short_fragments() {
        let s = split_sentences("Hi. Ok!! Dr. Smith went home today?", 10);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].text, "Smith went home today");
        // exactly min_chars long is dropped
        assert!(split_sentences("abcdefghij.", 10).is_empty());
        assert_eq!(split_sentences("abcdefghijk.", 10).len(), 1);
    }

    #[test]
    fn offsets_point_at_trimmed_text() {
        let text = "  First sentence here.\nSecond sentence is here!";
        let chars: Vec<char> = text.chars().collect();
        for s in split_sentences(text, 10) {
            let slice: String = chars[s.start..s.end].iter().collect();
            assert_eq!(slice, s.text);
        }
    }

    #[test]
    fn tracks_line_numbers() {
        let text = "Line one has words.\nLine two has\nwords too.";
        let s = split_sentences(text, 10);
        assert_eq!(s[0].line_range(), "1-1");
        assert_eq!(s[1].line_range(), "2-3");
    }

    #[test]
    fn offsets_are_char_based() {
        let text = "Ünïcödé wörds ärë hërë. Another plain sentence.";
        let s = split_sentences(text, 10);
        assert_eq!(s[0].start, 0);
        assert_eq!(s[0].end, 22);
        assert_eq!(s[1].start, 24);
    }

    #[test]
    fn unique_text_bounds() {
        assert_eq!(unique_text_percent(0, 0), 100);
        assert_eq!(unique_text_percent(17, 0), 100);
        assert_eq!(unique_text_percent(17, 9), 47);
        assert_eq!(unique_text_percent(10, 25), 0);
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn strips_tags() {
        assert_eq!(strip_markup("<script>alert('XSS')</script>"), "alert('XSS')");
        assert_eq!(strip_markup("a < b"), "a ");
        assert_eq!(strip_markup("plain"), "plain");
    }
}

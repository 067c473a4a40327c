use crate::core::model::{Glyph, Word};

/// How word boundaries are signalled by a source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Characters carry explicit word-start flags.
    Explicit,
    /// Literal space characters delimit words.
    Implicit,
}

/// Group a line's sanitized glyphs into words. Spaces never enter a word,
/// empty words are discarded, and a line ending mid-word still emits the
/// final word.
pub fn segment_line(glyphs: Vec<Glyph>, mode: BoundaryMode) -> Vec<Word> {
    let (mut words, current) = glyphs.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut words, mut current): (Vec<Word>, Vec<Glyph>), glyph| {
            let boundary = match mode {
                BoundaryMode::Explicit => glyph.word_start,
                BoundaryMode::Implicit => glyph.is_space(),
            };
            if boundary && !current.is_empty() {
                words.push(Word::new(std::mem::take(&mut current)));
            }
            if !glyph.is_space() {
                current.push(glyph);
            }
            (words, current)
        },
    );
    if !current.is_empty() {
        words.push(Word::new(current));
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn glyph(ch: char, word_start: bool) -> Glyph {
        Glyph {
            ch,
            bbox: None,
            confidence: None,
            word_start,
            font_size: None,
        }
    }

    fn texts(words: &[Word]) -> Vec<String> {
        words.iter().map(|w| w.text()).collect()
    }

    #[test]
    fn implicit_mode_splits_on_spaces() {
        let glyphs = vec![
            glyph('a', false),
            glyph('b', false),
            glyph(' ', false),
            glyph('c', false),
        ];
        let words = segment_line(glyphs, BoundaryMode::Implicit);
        assert_eq!(texts(&words), vec!["ab", "c"]);
    }

    #[test]
    fn implicit_mode_ignores_leading_and_repeated_spaces() {
        let glyphs = vec![
            glyph(' ', false),
            glyph(' ', false),
            glyph('a', false),
            glyph(' ', false),
            glyph(' ', false),
            glyph('b', false),
            glyph(' ', false),
        ];
        let words = segment_line(glyphs, BoundaryMode::Implicit);
        assert_eq!(texts(&words), vec!["a", "b"]);
    }

    #[test]
    fn explicit_mode_splits_on_start_flags() {
        let glyphs = vec![
            glyph('a', true),
            glyph('b', false),
            glyph('c', true),
            glyph('d', false),
        ];
        let words = segment_line(glyphs, BoundaryMode::Explicit);
        assert_eq!(texts(&words), vec!["ab", "cd"]);
    }

    #[test]
    fn explicit_mode_without_flags_is_one_word() {
        let glyphs = vec![glyph('a', false), glyph('b', false)];
        let words = segment_line(glyphs, BoundaryMode::Explicit);
        assert_eq!(texts(&words), vec!["ab"]);
    }

    #[test]
    fn consecutive_start_flags_produce_no_empty_word() {
        let glyphs = vec![glyph('a', true), glyph('b', true), glyph('c', true)];
        let words = segment_line(glyphs, BoundaryMode::Explicit);
        assert_eq!(texts(&words), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_line_yields_no_words() {
        assert!(segment_line(Vec::new(), BoundaryMode::Implicit).is_empty());
        assert!(segment_line(Vec::new(), BoundaryMode::Explicit).is_empty());
    }
}

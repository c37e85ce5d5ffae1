use std::fmt;

use crate::error::SelectionError;

/// One match returned by a provider's search phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub artist: String,
    pub song: String,
    pub page_locator: String,
    pub display_title: String,
}

impl fmt::Display for SearchCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.song)
    }
}

/// Candidates awaiting a choice before the second fetch phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisambiguationContext {
    candidates: Vec<SearchCandidate>,
    selection: Option<usize>,
}

impl DisambiguationContext {
    pub fn new(candidates: Vec<SearchCandidate>) -> Self {
        Self {
            candidates,
            selection: None,
        }
    }

    pub fn candidates(&self) -> &[SearchCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Select a candidate by zero-based index. On error the previous
    /// selection is kept.
    pub fn select(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.candidates.len() {
            return Err(SelectionError::OutOfRange {
                index: index as i64,
                len: self.candidates.len(),
            });
        }
        self.selection = Some(index);
        Ok(())
    }

    /// Select from a user reply such as `"2"` or `"2. Artist - Song"`, where
    /// the leading number is the 1-based position shown by [`Self::format_choices`].
    pub fn select_choice(&mut self, reply: &str) -> Result<(), SelectionError> {
        let digits: String = reply
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let number: i64 = digits.parse().map_err(|_| SelectionError::Unparsable {
            input: reply.to_string(),
        })?;

        let index = number - 1;
        if index < 0 {
            return Err(SelectionError::OutOfRange {
                index,
                len: self.candidates.len(),
            });
        }
        self.select(index as usize)
    }

    pub fn selection(&self) -> Result<&SearchCandidate, SelectionError> {
        self.selection
            .and_then(|index| self.candidates.get(index))
            .ok_or(SelectionError::NotSelected)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection
    }

    /// Numbered listing, one `"N. Artist - Song"` line per candidate.
    pub fn format_choices(&self) -> String {
        self.candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| format!("{}. {}\n", index + 1, candidate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(n: usize) -> SearchCandidate {
        SearchCandidate {
            artist: format!("Artist {}", n),
            song: format!("Song {}", n),
            page_locator: format!("https://genius.com/artist-{}-song-{}-lyrics", n, n),
            display_title: format!("Song {} by Artist {}", n, n),
        }
    }

    fn context(len: usize) -> DisambiguationContext {
        DisambiguationContext::new((0..len).map(candidate).collect())
    }

    #[test]
    fn test_selection_before_select_fails() {
        let ctx = context(3);
        assert_eq!(ctx.selection(), Err(SelectionError::NotSelected));

        let empty = DisambiguationContext::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.selection(), Err(SelectionError::NotSelected));
    }

    #[test]
    fn test_last_index_is_selectable() {
        let mut ctx = context(3);
        ctx.select(2).unwrap();
        assert_eq!(ctx.selection().unwrap(), &candidate(2));
    }

    #[test]
    fn test_out_of_range_keeps_prior_selection() {
        let mut ctx = context(3);
        ctx.select(1).unwrap();

        assert_eq!(
            ctx.select(3),
            Err(SelectionError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(ctx.selected_index(), Some(1));

        // "0" is index -1
        assert_eq!(
            ctx.select_choice("0"),
            Err(SelectionError::OutOfRange { index: -1, len: 3 })
        );
        assert_eq!(ctx.selected_index(), Some(1));
    }

    #[test]
    fn test_select_choice_reads_leading_number() {
        let mut ctx = context(12);
        ctx.select_choice("11. Artist 10 - Song 10").unwrap();
        assert_eq!(ctx.selected_index(), Some(10));

        ctx.select_choice(" 1").unwrap();
        assert_eq!(ctx.selected_index(), Some(0));

        assert!(matches!(
            ctx.select_choice("first"),
            Err(SelectionError::Unparsable { .. })
        ));
        assert_eq!(ctx.selected_index(), Some(0));
    }

    #[test]
    fn test_format_choices() {
        let ctx = context(2);
        assert_eq!(
            ctx.format_choices(),
            "1. Artist 0 - Song 0\n2. Artist 1 - Song 1\n"
        );
    }
}

//! History windowing.

use milkdoc_core::types::ChatTurn;

/// Prior turns to treat as history for the turn in flight.
///
/// `turns` is the transcript with the in-flight user question already
/// recorded as its last element. The result is the last `window` turns that
/// precede it, in conversational order: `min(window, len - 1)` turns, empty
/// when the transcript holds nothing but the question.
pub fn history_window(turns: &[ChatTurn], window: usize) -> &[ChatTurn] {
    let Some(end) = turns.len().checked_sub(1) else {
        return &[];
    };
    let start = end.saturating_sub(window);
    &turns[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(len: usize) -> Vec<ChatTurn> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("turn {}", i))
                } else {
                    ChatTurn::assistant(format!("turn {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_transcript() {
        assert!(history_window(&[], 5).is_empty());
    }

    #[test]
    fn test_only_in_flight_question() {
        let turns = transcript(1);
        assert!(history_window(&turns, 5).is_empty());
    }

    #[test]
    fn test_one_prior_exchange() {
        let turns = vec![
            ChatTurn::user("Is ibuprofen safe?"),
            ChatTurn::assistant("Yes, in normal doses."),
            ChatTurn::user("What about high doses?"),
        ];
        let window = history_window(&turns, 5);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "Is ibuprofen safe?");
        assert_eq!(window[1].content, "Yes, in normal doses.");
    }

    #[test]
    fn test_long_transcript_keeps_tail() {
        let turns = transcript(11);
        let window = history_window(&turns, 5);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0].content, "turn 5");
        assert_eq!(window[4].content, "turn 9");
    }

    #[test]
    fn test_never_includes_in_flight_turn() {
        let turns = transcript(4);
        let window = history_window(&turns, 10);
        assert!(window.iter().all(|t| t.content != "turn 3"));
    }

    #[test]
    fn test_zero_window() {
        let turns = transcript(6);
        assert!(history_window(&turns, 0).is_empty());
    }

    #[test]
    fn test_window_size_matches_formula_for_all_lengths() {
        for len in 0..15 {
            for w in 0..8 {
                let turns = transcript(len);
                let expected = if len <= 1 { 0 } else { w.min(len - 1) };
                let window = history_window(&turns, w);
                assert_eq!(window.len(), expected, "len={} w={}", len, w);
                if expected > 0 {
                    assert_eq!(window.last(), turns.get(len - 2));
                }
            }
        }
    }
}

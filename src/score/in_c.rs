//! Terry Riley's "In C" (1964): the 53 patterns as score data.
//!
//! Pitches are MIDI note numbers (C4 = 60), durations are eighth notes.
//! A pitch of 0 marks a rest. The score uses nine pitch classes (no C#, Eb
//! or Ab).

use super::{Note, Pattern};

/// Number of patterns in the score.
pub const TOTAL_PATTERNS: usize = 53;

/// `(midi, eighths)` pairs per pattern, in score order.
const SCORE: [&[(u8, u32)]; TOTAL_PATTERNS] = [
    &[(64, 1), (65, 1)],
    &[(64, 1), (65, 3)],
    &[(0, 1), (64, 1), (65, 3)],
    &[(0, 1), (64, 1), (65, 1), (67, 1)],
    &[(64, 1), (65, 1), (67, 1)],
    &[(72, 8)],
    &[(0, 4), (0, 4), (72, 8)],
    &[(67, 4), (65, 4), (67, 4)],
    &[(71, 2), (67, 2)],
    &[(71, 1), (67, 1)],
    &[(65, 1), (67, 1), (71, 1), (67, 1), (71, 1), (67, 1)],
    &[(65, 1), (67, 2)],
    &[(71, 1), (67, 1), (65, 1), (67, 1), (71, 2)],
    &[(71, 4), (67, 4), (65, 4), (67, 4), (70, 6)],
    &[(67, 1), (70, 1)],
    &[(70, 1), (67, 1)],
    &[(72, 4)],
    &[(64, 1), (65, 1), (64, 1), (65, 1), (67, 1), (64, 1)],
    &[(70, 8)],
    &[(64, 1), (65, 1), (67, 1), (69, 1)],
    &[(69, 4)],
    &[(64, 4), (66, 4), (64, 4), (66, 4), (67, 4), (69, 4), (67, 4), (69, 4)],
    &[(64, 1), (66, 1)],
    &[(64, 1), (66, 1), (67, 1), (69, 1), (67, 1), (66, 1)],
    &[(64, 1), (66, 1), (67, 1), (69, 1)],
    &[(64, 1), (66, 1), (67, 1), (69, 1), (67, 1)],
    &[(64, 1), (66, 1), (67, 1), (69, 1), (71, 1)],
    &[(64, 1), (66, 1), (67, 1), (69, 1), (71, 1), (72, 1)],
    &[(64, 2), (66, 2), (64, 2), (62, 2), (64, 2), (66, 2), (64, 2), (62, 2)],
    &[(72, 4), (71, 4), (69, 4)],
    &[(67, 4), (66, 2)],
    &[(66, 1), (64, 1), (66, 2)],
    &[(67, 1), (66, 1)],
    &[(67, 1), (66, 1), (67, 1), (71, 1)],
    &[
        (66, 1), (67, 1), (69, 1), (71, 1), (72, 1), (71, 1), (69, 1), (71, 1), (72, 1),
        (71, 1), (69, 1), (67, 1), (66, 1), (67, 1), (69, 1), (67, 1), (66, 1), (64, 1),
        (66, 1), (67, 1), (69, 1), (71, 1), (72, 1), (74, 1), (76, 1), (77, 1), (76, 1),
        (74, 1), (72, 1), (71, 1), (72, 1), (74, 1), (76, 1), (77, 1), (76, 1), (74, 1),
        (72, 1), (71, 1), (69, 1), (67, 1), (69, 1), (71, 1), (72, 1), (71, 1), (69, 1),
        (67, 1), (66, 1), (67, 1), (69, 1), (67, 1), (66, 1), (64, 1), (66, 1), (64, 1),
        (62, 1), (64, 1), (66, 1), (64, 1), (62, 1), (60, 1),
    ],
    &[(67, 1), (66, 1), (67, 1)],
    &[(66, 1), (67, 1), (69, 1)],
    &[(66, 1), (67, 1), (69, 1), (71, 1), (67, 1)],
    &[(71, 1), (67, 1), (71, 1), (67, 1), (71, 1), (67, 1)],
    &[(71, 1), (66, 1)],
    &[(71, 4), (67, 4)],
    &[(72, 2), (71, 2), (69, 2), (71, 2), (72, 2)],
    &[(78, 1), (79, 1)],
    &[(77, 1), (79, 1), (82, 1), (79, 1)],
    &[(69, 1), (71, 1), (72, 1), (74, 1)],
    &[(74, 1), (76, 1)],
    &[(74, 1), (76, 1), (77, 1)],
    &[(79, 8)],
    &[(77, 1), (79, 1), (81, 1), (79, 1)],
    &[(81, 1), (79, 1)],
    &[(79, 1), (77, 1)],
    &[(77, 1), (76, 1)],
    &[(79, 4), (79, 4)],
];

/// Build the full score. Pattern ids are 1-based, as printed.
pub fn patterns() -> Vec<Pattern> {
    SCORE
        .iter()
        .enumerate()
        .map(|(i, notes)| {
            let notes = notes
                .iter()
                .map(|&(midi, eighths)| Note::new(midi, eighths))
                .collect();
            Pattern::new(i as u32 + 1, notes)
        })
        .collect()
}

//! Musical pitch naming for the Klavier keyboard widget.
//!
//! A [`Pitch`] is a spelled note: a letter, an accidental and an octave.
//! Spelling is part of identity — C♯4 and D♭4 share a semitone code but are
//! distinct values, which is what overlay deduplication on the keyboard
//! relies on.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "persistence")]
use serde::{Deserialize, Serialize};

/// Semitone offset of each letter within an octave.
const LETTER_OFFSETS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

const LETTER_CHARS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// U+266F MUSIC SHARP SIGN.
pub const SHARP_SIGN: char = '\u{266F}';
/// U+266D MUSIC FLAT SIGN.
pub const FLAT_SIGN: char = '\u{266D}';

const SEMITONES_PER_OCTAVE: i32 = 12;

/// The seven letter names of the diatonic scale.
#[cfg_attr(feature = "persistence", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Semitone offset of this letter above the octave's C.
    pub fn offset(self) -> i32 {
        LETTER_OFFSETS[self as usize]
    }

    pub fn sharp(self) -> Spelling {
        Spelling {
            letter: self,
            accidental: Accidental::Sharp,
        }
    }

    pub fn flat(self) -> Spelling {
        Spelling {
            letter: self,
            accidental: Accidental::Flat,
        }
    }

    /// A natural pitch with this letter in the given octave.
    pub fn in_octave(self, octave: i32) -> Pitch {
        Pitch::new(self, Accidental::Natural, octave)
    }

    fn from_index(index: usize) -> Letter {
        match index {
            0 => Letter::C,
            1 => Letter::D,
            2 => Letter::E,
            3 => Letter::F,
            4 => Letter::G,
            5 => Letter::A,
            _ => Letter::B,
        }
    }
}

/// Modifier applied to a letter pitch.
#[cfg_attr(feature = "persistence", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Semitone delta contributed to the pitch code.
    pub fn delta(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    /// The printed sign, if any.
    pub fn sign(self) -> Option<char> {
        match self {
            Accidental::Natural => None,
            Accidental::Sharp => Some(SHARP_SIGN),
            Accidental::Flat => Some(FLAT_SIGN),
        }
    }
}

/// A letter plus accidental, waiting for an octave.
///
/// Intermediate step of the fluent constructors:
/// `Letter::C.sharp().in_octave(2)`.
#[derive(Clone, Copy, Debug)]
pub struct Spelling {
    letter: Letter,
    accidental: Accidental,
}

impl Spelling {
    pub fn in_octave(self, octave: i32) -> Pitch {
        Pitch::new(self.letter, self.accidental, octave)
    }
}

/// A spelled musical pitch.
///
/// Equality and hashing are structural on `(letter, accidental, octave)`:
/// enharmonic spellings of the same semitone are *not* equal. Ordering is
/// primarily by semitone code, with the spelling as a tie break so that
/// `Ord` stays consistent with `Eq`.
#[cfg_attr(feature = "persistence", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pitch {
    letter: Letter,
    accidental: Accidental,
    octave: i32,
}

impl Pitch {
    pub fn new(letter: Letter, accidental: Accidental, octave: i32) -> Self {
        Self {
            letter,
            accidental,
            octave,
        }
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Linear semitone code of this pitch (MIDI-style numbering).
    pub fn code(&self) -> i32 {
        SEMITONES_PER_OCTAVE * self.octave + self.letter.offset() + self.accidental.delta()
    }

    /// Semitone code of the bare letter, ignoring the accidental.
    pub fn natural_code(&self) -> i32 {
        SEMITONES_PER_OCTAVE * self.octave + self.letter.offset()
    }

    /// Decodes a semitone code into its canonical spelling.
    ///
    /// The decoder scans the letter table from B down to C and picks the
    /// first letter matching the remainder exactly (natural) or one below it
    /// (sharp); it never produces a flat, so flat-spelled pitches do not
    /// round-trip through their code. Octave and remainder use Euclidean
    /// arithmetic, so negative codes decode to well-formed pitches too.
    pub fn from_code(code: i32) -> Pitch {
        let octave = code.div_euclid(SEMITONES_PER_OCTAVE);
        let rem = code.rem_euclid(SEMITONES_PER_OCTAVE);

        for index in (0..LETTER_OFFSETS.len()).rev() {
            if rem == LETTER_OFFSETS[index] {
                return Pitch::new(Letter::from_index(index), Accidental::Natural, octave);
            }
            if rem == LETTER_OFFSETS[index] + 1 {
                return Pitch::new(Letter::from_index(index), Accidental::Sharp, octave);
            }
        }
        // Unreachable: every remainder in 0..12 is a letter offset or one
        // above one.
        Pitch::new(Letter::C, Accidental::Natural, octave)
    }

    /// Display name without the octave, e.g. "C♯".
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", LETTER_CHARS[self.letter as usize])?;
        if let Some(sign) = self.accidental.sign() {
            write!(f, "{sign}")?;
        }
        Ok(())
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code()
            .cmp(&other.code())
            .then(self.letter.cmp(&other.letter))
            .then(self.accidental.cmp(&other.accidental))
    }
}

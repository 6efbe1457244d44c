//! Per-password classification: composition, length bucket, mask, basewords.
//!
//! Character classes are ASCII digits, ASCII lowercase, ASCII uppercase and
//! "special" (any other printable character). Control characters belong to no
//! class, so they only ever show up as `Other` in compositions and `$` in masks.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Digit,
    Lower,
    Upper,
    Special,
    Unprintable,
}

impl CharClass {
    pub fn of(c: char) -> Self {
        match c {
            '0'..='9' => Self::Digit,
            'a'..='z' => Self::Lower,
            'A'..='Z' => Self::Upper,
            c if c.is_control() => Self::Unprintable,
            _ => Self::Special,
        }
    }
}

/// Which character classes occur in a string.
#[derive(Debug, Default, Clone, Copy)]
struct ClassSet {
    digit: bool,
    lower: bool,
    upper: bool,
    special: bool,
    unprintable: bool,
}

impl ClassSet {
    fn of(s: &str) -> Self {
        let mut set = Self::default();
        for c in s.chars() {
            match CharClass::of(c) {
                CharClass::Digit => set.digit = true,
                CharClass::Lower => set.lower = true,
                CharClass::Upper => set.upper = true,
                CharClass::Special => set.special = true,
                CharClass::Unprintable => set.unprintable = true,
            }
        }
        set
    }

    fn letter(&self) -> bool {
        self.lower || self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Composition {
    Empty,
    Numeric,
    Alpha,
    AlphaNumeric,
    AlphaSpecial,
    NumericSpecial,
    AlphaNumericSpecial,
    Other,
}

impl Composition {
    pub const ALL: [Composition; 8] = [
        Composition::Empty,
        Composition::Numeric,
        Composition::Alpha,
        Composition::AlphaNumeric,
        Composition::AlphaSpecial,
        Composition::NumericSpecial,
        Composition::AlphaNumericSpecial,
        Composition::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Composition::Empty => "Empty",
            Composition::Numeric => "Numeric",
            Composition::Alpha => "Alpha",
            Composition::AlphaNumeric => "Alpha + Numeric",
            Composition::AlphaSpecial => "Alpha + Special",
            Composition::NumericSpecial => "Numeric + Special",
            Composition::AlphaNumericSpecial => "Alpha + Numeric + Special",
            Composition::Other => "Other",
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify by testing each category in priority order.
pub fn classify_composition(cleartext: &str) -> Composition {
    if cleartext.is_empty() {
        return Composition::Empty;
    }
    let s = ClassSet::of(cleartext);
    if s.unprintable {
        return Composition::Other;
    }
    let only_digits = s.digit && !s.letter() && !s.special;
    let only_letters = s.letter() && !s.digit && !s.special;
    if only_digits {
        Composition::Numeric
    } else if only_letters {
        Composition::Alpha
    } else if s.digit && s.lower && s.upper && !s.special {
        Composition::AlphaNumeric
    } else if s.letter() && s.special && !s.digit {
        Composition::AlphaSpecial
    } else if s.digit && s.special && !s.letter() {
        Composition::NumericSpecial
    } else if s.digit && s.lower && s.upper && s.special {
        Composition::AlphaNumericSpecial
    } else {
        Composition::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LengthBucket {
    UpTo5,
    Exact(u8),
    AtLeast15,
}

impl LengthBucket {
    pub const ALL: [LengthBucket; 11] = [
        LengthBucket::UpTo5,
        LengthBucket::Exact(6),
        LengthBucket::Exact(7),
        LengthBucket::Exact(8),
        LengthBucket::Exact(9),
        LengthBucket::Exact(10),
        LengthBucket::Exact(11),
        LengthBucket::Exact(12),
        LengthBucket::Exact(13),
        LengthBucket::Exact(14),
        LengthBucket::AtLeast15,
    ];
}

impl fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthBucket::UpTo5 => f.write_str("0-5"),
            LengthBucket::Exact(n) => write!(f, "{n}"),
            LengthBucket::AtLeast15 => f.write_str("15+"),
        }
    }
}

/// Bucket by length in characters.
pub fn classify_length(cleartext: &str) -> LengthBucket {
    match cleartext.chars().count() {
        0..=5 => LengthBucket::UpTo5,
        n @ 6..=14 => LengthBucket::Exact(n as u8),
        _ => LengthBucket::AtLeast15,
    }
}

/// `d` digit, `l` lowercase, `U` uppercase, `$` anything else.
pub fn compute_mask(cleartext: &str) -> String {
    cleartext
        .chars()
        .map(|c| match CharClass::of(c) {
            CharClass::Digit => 'd',
            CharClass::Lower => 'l',
            CharClass::Upper => 'U',
            CharClass::Special | CharClass::Unprintable => '$',
        })
        .collect()
}

pub const BASEWORD_MIN: usize = 4;
pub const BASEWORD_MAX: usize = 20;

/// Maximal ASCII-letter runs whose length is within
/// [`BASEWORD_MIN`]..=[`BASEWORD_MAX`]. Longer runs are dropped whole.
pub fn extract_basewords(cleartext: &str) -> Vec<&str> {
    cleartext
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|run| (BASEWORD_MIN..=BASEWORD_MAX).contains(&run.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_categories() {
        assert_eq!(classify_composition(""), Composition::Empty);
        assert_eq!(classify_composition("123456"), Composition::Numeric);
        assert_eq!(classify_composition("password"), Composition::Alpha);
        assert_eq!(classify_composition("PassWord"), Composition::Alpha);
        assert_eq!(classify_composition("Passw0rd"), Composition::AlphaNumeric);
        assert_eq!(classify_composition("pass word!"), Composition::AlphaSpecial);
        assert_eq!(classify_composition("12/05/1990"), Composition::NumericSpecial);
        assert_eq!(
            classify_composition("Passw0rd!"),
            Composition::AlphaNumericSpecial
        );
    }

    #[test]
    fn composition_leftovers_are_other() {
        assert_eq!(classify_composition("password1"), Composition::Other);
        assert_eq!(classify_composition("PASSW0RD!"), Composition::Other);
        assert_eq!(classify_composition("pass\tword"), Composition::Other);
    }

    #[test]
    fn length_buckets_clamp() {
        assert_eq!(classify_length(""), LengthBucket::UpTo5);
        assert_eq!(classify_length("abcde"), LengthBucket::UpTo5);
        assert_eq!(classify_length("abcdef"), LengthBucket::Exact(6));
        assert_eq!(classify_length("abcdefghijklmn"), LengthBucket::Exact(14));
        assert_eq!(classify_length("abcdefghijklmno"), LengthBucket::AtLeast15);
        assert_eq!(classify_length("éééééé").to_string(), "6");
        let labels: Vec<String> = LengthBucket::ALL.iter().map(|b| b.to_string()).collect();
        assert_eq!(labels.first().unwrap(), "0-5");
        assert_eq!(labels.last().unwrap(), "15+");
    }

    #[test]
    fn masks() {
        assert_eq!(compute_mask("Ab1!"), "Uld$");
        assert_eq!(compute_mask("Pa$$w0rd"), "Ul$$ldll");
        assert_eq!(compute_mask(""), "");
        assert_eq!(compute_mask("é 9"), "$$d");
    }

    #[test]
    fn basewords() {
        assert_eq!(extract_basewords("abcd123defgh"), vec!["abcd", "defgh"]);
        assert_eq!(extract_basewords("abc123defgh"), vec!["defgh"]);
        assert_eq!(extract_basewords("Summer2023!"), vec!["Summer"]);
        assert!(extract_basewords("abcdefghijklmnopqrstu1").is_empty());
        assert_eq!(
            extract_basewords("abcdefghijklmnopqrst"),
            vec!["abcdefghijklmnopqrst"]
        );
        assert!(extract_basewords("").is_empty());
    }
}

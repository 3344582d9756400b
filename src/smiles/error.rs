use std::fmt;

/// Errors produced when parsing or writing a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    /// Input ended before a complete token could be read.
    UnexpectedEnd,
    /// An unexpected character was encountered at the given position.
    UnexpectedChar { pos: usize, ch: char },
    /// An unrecognized element symbol was found.
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    UnclosedBracket { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    UnclosedRing { digit: u16 },
    /// A parenthesis was opened without a matching close, or vice versa.
    UnmatchedParen { pos: usize },
    /// A charge specifier inside a bracket atom could not be parsed.
    InvalidCharge { pos: usize },
    /// An isotope number overflowed or was otherwise invalid.
    InvalidIsotope { pos: usize },
    /// An atom map number (`:n`) could not be parsed.
    InvalidMapNumber { pos: usize },
    /// A bracket hydrogen count (`Hn`) was out of range.
    InvalidHydrogenCount { pos: usize },
    /// A ring-closure bond is inconsistent with its opening side.
    RingBondConflict { digit: u16 },
    /// A ring digit appeared where no ring bond is possible.
    InvalidRingBond { digit: u16, pos: usize },
    /// The input string was empty or contained only whitespace.
    EmptyInput,
    /// Writing would need more than 99 ring bonds open at once.
    RingIndexOverflow,
}

impl fmt::Display for SmilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "unexpected end of SMILES"),
            Self::UnexpectedChar { pos, ch } => {
                write!(f, "unexpected character '{}' at position {}", ch, pos)
            }
            Self::InvalidElement { pos, text } => {
                write!(f, "invalid element '{}' at position {}", text, pos)
            }
            Self::UnclosedBracket { pos } => {
                write!(f, "unclosed bracket atom starting at position {}", pos)
            }
            Self::UnclosedRing { digit } => write!(f, "unclosed ring {}", digit),
            Self::UnmatchedParen { pos } => {
                write!(f, "unmatched parenthesis at position {}", pos)
            }
            Self::InvalidCharge { pos } => write!(f, "invalid charge at position {}", pos),
            Self::InvalidIsotope { pos } => write!(f, "isotope overflow at position {}", pos),
            Self::InvalidMapNumber { pos } => {
                write!(f, "invalid atom map number at position {}", pos)
            }
            Self::InvalidHydrogenCount { pos } => {
                write!(f, "hydrogen count out of range at position {}", pos)
            }
            Self::RingBondConflict { digit } => {
                write!(f, "conflicting bond types on ring closure {}", digit)
            }
            Self::InvalidRingBond { digit, pos } => {
                write!(f, "invalid ring bond {} at position {}", digit, pos)
            }
            Self::EmptyInput => write!(f, "empty SMILES string"),
            Self::RingIndexOverflow => {
                write!(f, "more than 99 ring bonds open at once")
            }
        }
    }
}

impl std::error::Error for SmilesError {}

/// The subset of the periodic table this crate can name.
///
/// Atomic number 0 is the wildcard/placeholder atom (`*` in SMILES); it is
/// how attachment points are represented, so it is a first-class citizen
/// here rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element(pub u8);

const SYMBOLS: &[(&str, u8)] = &[
    ("*", 0),
    ("H", 1),
    ("B", 5),
    ("C", 6),
    ("N", 7),
    ("O", 8),
    ("F", 9),
    ("Na", 11),
    ("Mg", 12),
    ("Si", 14),
    ("P", 15),
    ("S", 16),
    ("Cl", 17),
    ("K", 19),
    ("Ca", 20),
    ("Fe", 26),
    ("Br", 35),
    ("I", 53),
];

impl Element {
    pub fn from_symbol(sym: &str) -> Option<Element> {
        SYMBOLS
            .iter()
            .find(|(s, _)| *s == sym)
            .map(|&(_, num)| Element(num))
    }

    pub fn from_atomic_num(num: u8) -> Option<Element> {
        SYMBOLS
            .iter()
            .find(|&&(_, n)| n == num)
            .map(|&(_, n)| Element(n))
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS
            .iter()
            .find(|&&(_, n)| n == self.0)
            .map(|&(s, _)| s)
            .unwrap_or("*")
    }

    pub fn atomic_num(self) -> u8 {
        self.0
    }

    /// Elements writable without brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }

    /// May be written lowercase as an aromatic atom.
    pub fn supports_aromatic(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 15 | 16)
    }

    /// Normal valences used for implicit-hydrogen accounting, lowest first.
    /// Empty means "never add implicit hydrogens" (metals, wildcard).
    pub fn default_valences(self) -> &'static [u8] {
        match self.0 {
            1 => &[1],
            5 => &[3],
            6 => &[4],
            7 => &[3, 5],
            8 => &[2],
            9 | 17 | 35 | 53 => &[1],
            15 => &[3, 5],
            16 => &[2, 4, 6],
            _ => &[],
        }
    }
}

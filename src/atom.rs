/// Tetrahedral parity over a stored neighbor ordering.
///
/// The value is only meaningful together with the neighbor-order sequence
/// in a [`TetrahedralStereo`](crate::mol::TetrahedralStereo) record: `Ccw`
/// means the neighbors after the first appear counterclockwise when viewed
/// from the first (`@` in SMILES), `Cw` clockwise (`@@`). Reordering the
/// sequence by an odd permutation flips the physical meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    /// No tetrahedral parity recorded.
    #[default]
    None,
    /// Counterclockwise (`@`).
    Ccw,
    /// Clockwise (`@@`).
    Cw,
}

impl Chirality {
    pub fn flipped(self) -> Chirality {
        match self {
            Chirality::None => Chirality::None,
            Chirality::Ccw => Chirality::Cw,
            Chirality::Cw => Chirality::Ccw,
        }
    }
}

/// Atom payload for a molecular graph node.
///
/// Stores intrinsic properties only; anything derived (valence, rings,
/// coordinates) is out of scope for this crate. An **attachment point** —
/// the placeholder a fragmenting cut leaves behind — is not a separate
/// type: it is an `Atom` with `atomic_num == 0` and a nonzero `map_num`
/// (its zip label), so code that does not care about zipping can treat it
/// like any other node.
///
/// # Examples
///
/// ```
/// use molzip::Atom;
///
/// let carbon = Atom { atomic_num: 6, hydrogen_count: 4, ..Atom::default() };
/// assert!(!carbon.is_attachment_point());
///
/// let stub = Atom::attachment(3);
/// assert!(stub.is_attachment_point());
/// assert_eq!(stub.map_num, 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, …). `0` is the wildcard/placeholder.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural abundance.
    pub isotope: u16,
    /// Suppressed hydrogens implied on this atom. Not graph nodes.
    pub hydrogen_count: u8,
    /// Whether this atom was written as aromatic. Carried opaquely; this
    /// crate performs no aromaticity perception.
    pub is_aromatic: bool,
    /// Atom map number. `0` means unmapped. On a wildcard atom a nonzero
    /// value is the zip label pairing two attachment points.
    pub map_num: u16,
}

impl Atom {
    /// A placeholder atom carrying zip label `label`.
    pub fn attachment(label: u16) -> Atom {
        Atom {
            atomic_num: 0,
            map_num: label,
            ..Atom::default()
        }
    }

    /// True for a labeled placeholder created by (or destined for) a zip.
    /// A bare wildcard (`*` with no map number) is not an attachment point.
    pub fn is_attachment_point(&self) -> bool {
        self.atomic_num == 0 && self.map_num != 0
    }
}

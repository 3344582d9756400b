/// Bond order. Aromatic is carried opaquely, exactly as parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

/// Direction marker on a single bond adjacent to a stereo double bond
/// (`/` and `\` in SMILES).
///
/// The marker is relative to the bond's stored orientation: `Up` means the
/// bond reads `/` when traversed from its source endpoint to its target
/// endpoint (the order the endpoints were passed to
/// [`Mol::add_bond`](crate::mol::Mol::add_bond)), and `\` when traversed
/// the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondDir {
    #[default]
    None,
    /// `/` in source→target direction.
    Up,
    /// `\` in source→target direction.
    Down,
}

impl BondDir {
    pub fn flipped(self) -> BondDir {
        match self {
            BondDir::None => BondDir::None,
            BondDir::Up => BondDir::Down,
            BondDir::Down => BondDir::Up,
        }
    }
}

/// Bond payload for a molecular graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bond {
    pub order: BondOrder,
    pub dir: BondDir,
}

impl Bond {
    pub fn single() -> Bond {
        Bond::default()
    }

    pub fn with_order(order: BondOrder) -> Bond {
        Bond {
            order,
            dir: BondDir::None,
        }
    }
}

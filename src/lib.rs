pub mod atom;
pub mod bond;
pub mod canonical;
pub mod element;
pub mod fragment;
pub mod graph_ops;
pub mod mol;
pub mod smiles;
pub mod zip;

pub use atom::{Atom, Chirality};
pub use bond::{Bond, BondDir, BondOrder};
pub use canonical::canonical_ordering;
pub use element::Element;
pub use fragment::{fragment_on_bonds, FragmentError, FragmentParams};
pub use graph_ops::{combine, connected_components, num_components};
pub use mol::{permutation_parity, AtomId, Mol, TetrahedralStereo};
pub use smiles::{parse_smiles, to_canonical_smiles, to_smiles, SmilesError};
pub use zip::{molzip, molzip_pair, MolzipParams, ZipError};

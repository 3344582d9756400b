pub mod error;
mod parser;
mod writer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles};

pub fn parse_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    parser::parse(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Chirality;
    use crate::bond::{BondDir, BondOrder};
    use crate::mol::AtomId;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn atom(mol: &Mol<Atom, Bond>, i: usize) -> &Atom {
        mol.atom(n(i))
    }

    // ---- Simple molecules ----

    #[test]
    fn methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).atomic_num, 6);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn ethane() {
        let mol = parse_smiles("CC").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 3);
        assert_eq!(atom(&mol, 1).hydrogen_count, 3);
    }

    #[test]
    fn ethene() {
        let mol = parse_smiles("C=C").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 2);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Double);
    }

    #[test]
    fn ethyne() {
        let mol = parse_smiles("C#C").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Triple);
    }

    #[test]
    fn water_bare() {
        let mol = parse_smiles("O").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 8);
        assert_eq!(atom(&mol, 0).hydrogen_count, 2);
    }

    #[test]
    fn hydrogen_chloride() {
        let mol = parse_smiles("Cl").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(atom(&mol, 0).atomic_num, 17);
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
    }

    #[test]
    fn hydrogen_bromide() {
        let mol = parse_smiles("Br").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 35);
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
    }

    #[test]
    fn acetic_acid() {
        let mol = parse_smiles("CC(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(atom(&mol, 0).hydrogen_count, 3); // CH3
        assert_eq!(atom(&mol, 1).hydrogen_count, 0); // C(=O)O
        assert_eq!(atom(&mol, 2).hydrogen_count, 0); // =O
        assert_eq!(atom(&mol, 3).hydrogen_count, 1); // OH
    }

    // ---- Branches ----

    #[test]
    fn isobutane() {
        let mol = parse_smiles("CC(C)C").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(atom(&mol, 1).hydrogen_count, 1);
    }

    #[test]
    fn neopentane() {
        let mol = parse_smiles("CC(C)(C)C").unwrap();
        assert_eq!(mol.atom_count(), 5);
        assert_eq!(mol.bond_count(), 4);
        assert_eq!(atom(&mol, 1).hydrogen_count, 0);
    }

    // ---- Ring closures ----

    #[test]
    fn cyclopropane() {
        let mol = parse_smiles("C1CC1").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 3);
        for i in 0..3 {
            assert_eq!(atom(&mol, i).hydrogen_count, 2);
        }
    }

    #[test]
    fn cyclohexane() {
        let mol = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
    }

    #[test]
    fn multi_digit_ring() {
        let mol = parse_smiles("C%10CC%10").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 3);
    }

    #[test]
    fn bicyclo() {
        let mol = parse_smiles("C1CC2C1CC2").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 7);
    }

    #[test]
    fn ring_with_double_bond() {
        let mol = parse_smiles("C1=CC=CC=C1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
    }

    // ---- Charges and isotopes ----

    #[test]
    fn ammonium() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 7);
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn oxide_anion() {
        let mol = parse_smiles("[O-]").unwrap();
        assert_eq!(atom(&mol, 0).formal_charge, -1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 0);
    }

    #[test]
    fn carbon_13() {
        let mol = parse_smiles("[13C]").unwrap();
        assert_eq!(atom(&mol, 0).isotope, 13);
        assert_eq!(atom(&mol, 0).atomic_num, 6);
    }

    // ---- Attachment points ----

    #[test]
    fn labeled_wildcard() {
        let mol = parse_smiles("[*:1]C").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(atom(&mol, 0).atomic_num, 0);
        assert_eq!(atom(&mol, 0).map_num, 1);
        assert!(atom(&mol, 0).is_attachment_point());
        assert_eq!(atom(&mol, 0).hydrogen_count, 0);
    }

    #[test]
    fn bare_wildcard_is_not_attachment() {
        let mol = parse_smiles("*C").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 0);
        assert_eq!(atom(&mol, 0).map_num, 0);
        assert!(!atom(&mol, 0).is_attachment_point());
    }

    #[test]
    fn map_number_on_real_atom() {
        let mol = parse_smiles("[CH3:7]O").unwrap();
        assert_eq!(atom(&mol, 0).map_num, 7);
        assert!(!atom(&mol, 0).is_attachment_point());
    }

    // ---- Aromatic atoms ----

    #[test]
    fn benzene() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        for i in 0..6 {
            assert!(atom(&mol, i).is_aromatic);
            assert_eq!(atom(&mol, i).hydrogen_count, 1);
        }
        for edge in mol.bonds() {
            assert_eq!(mol.bond(edge).order, BondOrder::Aromatic);
        }
    }

    #[test]
    fn pyridine() {
        let mol = parse_smiles("c1ccncc1").unwrap();
        assert_eq!(atom(&mol, 3).atomic_num, 7);
        assert_eq!(atom(&mol, 3).hydrogen_count, 0);
        for i in [0, 1, 2, 4, 5] {
            assert_eq!(atom(&mol, i).hydrogen_count, 1);
        }
    }

    #[test]
    fn pyrrole() {
        let mol = parse_smiles("[nH]1cccc1").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 7);
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
    }

    // ---- Stereochemistry ----

    #[test]
    fn tetrahedral_ccw() {
        let mol = parse_smiles("[C@](F)(Cl)(Br)I").unwrap();
        assert_eq!(mol.atom_count(), 5);
        let stereo = mol.tetrahedral_stereo_for(n(0)).unwrap();
        assert_eq!(stereo.parity, Chirality::Ccw);
        assert_eq!(
            stereo.neighbors,
            vec![
                AtomId::Node(n(1)),
                AtomId::Node(n(2)),
                AtomId::Node(n(3)),
                AtomId::Node(n(4)),
            ]
        );
    }

    #[test]
    fn tetrahedral_cw() {
        let mol = parse_smiles("[C@@](F)(Cl)(Br)I").unwrap();
        assert_eq!(mol.tetrahedral_stereo_for(n(0)).unwrap().parity, Chirality::Cw);
    }

    #[test]
    fn tetrahedral_with_h() {
        let mol = parse_smiles("[C@@H](F)(Cl)Br").unwrap();
        let stereo = mol.tetrahedral_stereo_for(n(0)).unwrap();
        assert_eq!(stereo.parity, Chirality::Cw);
        assert_eq!(stereo.neighbors[0], AtomId::ImplicitH);
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
    }

    #[test]
    fn tetrahedral_with_preceding_atom() {
        let mol = parse_smiles("N[C@H](F)Br").unwrap();
        let stereo = mol.tetrahedral_stereo_for(n(1)).unwrap();
        assert_eq!(
            stereo.neighbors,
            vec![
                AtomId::Node(n(0)),
                AtomId::ImplicitH,
                AtomId::Node(n(2)),
                AtomId::Node(n(3)),
            ]
        );
    }

    #[test]
    fn directional_bonds() {
        let mol = parse_smiles("F/C=C/F").unwrap();
        assert_eq!(mol.atom_count(), 4);
        let e01 = mol.bond_between(n(0), n(1)).unwrap();
        let e23 = mol.bond_between(n(2), n(3)).unwrap();
        assert_eq!(mol.bond_dir_from(e01, n(0)), BondDir::Up);
        assert_eq!(mol.bond_dir_from(e23, n(2)), BondDir::Up);
        assert_eq!(mol.bond_dir_from(e23, n(3)), BondDir::Down);
    }

    #[test]
    fn mixed_directional_bonds() {
        let mol = parse_smiles(r"F/C=C\F").unwrap();
        let e01 = mol.bond_between(n(0), n(1)).unwrap();
        let e23 = mol.bond_between(n(2), n(3)).unwrap();
        assert_eq!(mol.bond_dir_from(e01, n(0)), BondDir::Up);
        assert_eq!(mol.bond_dir_from(e23, n(2)), BondDir::Down);
    }

    // ---- Disconnected ----

    #[test]
    fn sodium_chloride() {
        let mol = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).atomic_num, 11);
        assert_eq!(atom(&mol, 1).formal_charge, -1);
    }

    // ---- Error cases ----

    #[test]
    fn empty_string() {
        assert!(matches!(parse_smiles(""), Err(SmilesError::EmptyInput)));
    }

    #[test]
    fn whitespace_only() {
        assert!(matches!(parse_smiles("   "), Err(SmilesError::EmptyInput)));
    }

    #[test]
    fn mismatched_paren_open() {
        assert!(parse_smiles("C(C").is_err());
    }

    #[test]
    fn mismatched_paren_close() {
        assert!(parse_smiles("C)C").is_err());
    }

    #[test]
    fn unclosed_ring() {
        assert!(matches!(
            parse_smiles("C1CC"),
            Err(SmilesError::UnclosedRing { .. })
        ));
    }

    #[test]
    fn invalid_atom() {
        assert!(parse_smiles("X").is_err());
    }

    #[test]
    fn unclosed_bracket() {
        assert!(parse_smiles("[C").is_err());
    }

    #[test]
    fn hydrogen_count_overflow() {
        assert_eq!(
            parse_smiles("[CH300]"),
            Err(SmilesError::InvalidHydrogenCount { pos: 2 })
        );
        let mol = parse_smiles("[CH9]").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 9);
    }

    #[test]
    fn ring_order_conflict() {
        assert!(matches!(
            parse_smiles("C=1CCC1"),
            Ok(_)
        ));
        assert!(matches!(
            parse_smiles("C=1CCC#1"),
            Err(SmilesError::RingBondConflict { .. })
        ));
    }

    // ---- Writer round trips ----

    #[test]
    fn write_simple_chain() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "CCO");
    }

    #[test]
    fn write_branch() {
        let mol = parse_smiles("CC(C)C").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "CC(C)C");
    }

    #[test]
    fn write_ring() {
        let mol = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "C1CCCCC1");
    }

    #[test]
    fn ring_digit_reused_after_close() {
        // the first ring is done before the second opens, so its digit
        // comes back into play
        let mol = parse_smiles("C(C1CC1)C1CC1").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "C(C1CC1)C1CC1");
    }

    #[test]
    fn too_many_open_rings_is_an_error() {
        // a complete graph on 22 vertices keeps over 99 ring bonds open
        // at once, which SMILES digits cannot express
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let nodes: Vec<_> = (0..22)
            .map(|_| {
                mol.add_atom(Atom {
                    atomic_num: 6,
                    ..Atom::default()
                })
            })
            .collect();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                mol.add_bond(nodes[i], nodes[j], Bond::default());
            }
        }
        assert_eq!(to_smiles(&mol), Err(SmilesError::RingIndexOverflow));
    }

    #[test]
    fn write_labeled_wildcard() {
        let mol = parse_smiles("[*:1]CC").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "[*:1]CC");
    }

    #[test]
    fn write_charge_and_isotope() {
        let mol = parse_smiles("[13CH3][NH3+]").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "[13CH3][NH3+]");
    }

    #[test]
    fn write_disconnected() {
        let mol = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "[Na+].[Cl-]");
    }

    #[test]
    fn write_directional() {
        let mol = parse_smiles("F/C=C/F").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "F/C=C/F");
    }

    #[test]
    fn write_aromatic_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), "c1ccccc1");
    }

    #[test]
    fn chirality_round_trip() {
        for input in ["N[C@H](F)Br", "N[C@@H](F)Br", "[C@](F)(Cl)(Br)I"] {
            let mol = parse_smiles(input).unwrap();
            let written = to_smiles(&mol).unwrap();
            let reparsed = parse_smiles(&written).unwrap();
            assert_eq!(
                to_canonical_smiles(&mol).unwrap(),
                to_canonical_smiles(&reparsed).unwrap(),
                "stereo drifted for {input}: wrote {written}"
            );
        }
    }

    // ---- Canonical form ----

    #[test]
    fn canonical_is_order_independent() {
        let a = parse_smiles("OCC").unwrap();
        let b = parse_smiles("CCO").unwrap();
        assert_eq!(to_canonical_smiles(&a).unwrap(), to_canonical_smiles(&b).unwrap());
    }

    #[test]
    fn canonical_branch_order_independent() {
        let a = parse_smiles("CC(Br)F").unwrap();
        let b = parse_smiles("CC(F)Br").unwrap();
        assert_eq!(to_canonical_smiles(&a).unwrap(), to_canonical_smiles(&b).unwrap());
    }

    #[test]
    fn canonical_distinguishes_chirality() {
        let cw = parse_smiles("N[C@@H](F)Br").unwrap();
        let ccw = parse_smiles("N[C@H](F)Br").unwrap();
        assert_ne!(to_canonical_smiles(&cw).unwrap(), to_canonical_smiles(&ccw).unwrap());
    }

    #[test]
    fn canonical_equates_equivalent_stereo_writings() {
        // Swapping two neighbors while flipping the tag names the same
        // configuration.
        let a = parse_smiles("N[C@H](F)Br").unwrap();
        let b = parse_smiles("N[C@@H](Br)F").unwrap();
        assert_eq!(to_canonical_smiles(&a).unwrap(), to_canonical_smiles(&b).unwrap());
    }
}

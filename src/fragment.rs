//! Bond cutting. Severs selected bonds and caps both cut ends with
//! labeled attachment points, so the pieces can later be rejoined by
//! [`crate::zip::molzip`].

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{AtomId, Mol};

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentError {
    /// A requested bond does not exist, was listed twice, or touches an
    /// atom that is already an attachment point.
    InvalidBondReference { bond: EdgeIndex },
    /// `label_pairs` was given with a different length than the bond list.
    LabelCountMismatch { bonds: usize, labels: usize },
}

impl fmt::Display for FragmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentError::InvalidBondReference { bond } => {
                write!(f, "bond {} cannot be cut", bond.index())
            }
            FragmentError::LabelCountMismatch { bonds, labels } => {
                write!(f, "{bonds} bonds to cut but {labels} label pairs")
            }
        }
    }
}

impl Error for FragmentError {}

/// Controls how cut ends are capped.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentParams {
    /// Insert labeled attachment points at each cut. When false the cut
    /// ends are capped with unlabeled wildcard atoms.
    pub add_labels: bool,
    /// Explicit `(label_a, label_b)` per cut bond, in the same order as
    /// the bond list. `label_a` caps the bond's source side. When absent,
    /// the i-th cut gets the pair `(i+1, i+1)`.
    pub label_pairs: Option<Vec<(u16, u16)>>,
}

impl Default for FragmentParams {
    fn default() -> FragmentParams {
        FragmentParams {
            add_labels: true,
            label_pairs: None,
        }
    }
}

/// Returns a new molecule in which every bond in `bonds` has been severed
/// and both freed valences are capped with attachment points.
///
/// The input is not modified. Atoms keep their relative order, with the
/// two caps for cut `i` appended after all original atoms in cut order.
/// Each cap inherits the severed bond's order and direction marker, and
/// stereo neighbor lists are rewritten to point at the cap that replaced
/// the lost neighbor, so parity is undisturbed.
pub fn fragment_on_bonds(
    mol: &Mol<Atom, Bond>,
    bonds: &[EdgeIndex],
    params: &FragmentParams,
) -> Result<Mol<Atom, Bond>, FragmentError> {
    let labels = match &params.label_pairs {
        Some(pairs) => {
            if pairs.len() != bonds.len() {
                return Err(FragmentError::LabelCountMismatch {
                    bonds: bonds.len(),
                    labels: pairs.len(),
                });
            }
            pairs.clone()
        }
        None => (0..bonds.len())
            .map(|i| (i as u16 + 1, i as u16 + 1))
            .collect(),
    };

    let mut cut = HashMap::new();
    for (i, &edge) in bonds.iter().enumerate() {
        let (a, b) = mol
            .bond_endpoints(edge)
            .ok_or(FragmentError::InvalidBondReference { bond: edge })?;
        if mol.atom(a).is_attachment_point() || mol.atom(b).is_attachment_point() {
            return Err(FragmentError::InvalidBondReference { bond: edge });
        }
        if cut.insert(edge, i).is_some() {
            return Err(FragmentError::InvalidBondReference { bond: edge });
        }
    }

    let mut out = Mol::new();
    for idx in mol.atoms() {
        out.add_atom(mol.atom(idx).clone());
    }

    // cap_for[i] = (cap replacing b as seen from a, cap replacing a as
    // seen from b) for the i-th cut bond
    let mut cap_for: Vec<(NodeIndex, NodeIndex)> = Vec::with_capacity(bonds.len());
    for (i, &edge) in bonds.iter().enumerate() {
        let (label_a, label_b) = labels[i];
        let (a, b) = mol.bond_endpoints(edge).expect("validated above");
        let bond = *mol.bond(edge);

        let cap_a = out.add_atom(cap_atom(label_a, params.add_labels));
        let cap_b = out.add_atom(cap_atom(label_b, params.add_labels));
        // Each cap stands in for the endpoint it replaces, so the stored
        // orientation keeps the direction marker meaningful on both halves.
        out.add_bond(a, cap_a, bond);
        out.add_bond(cap_b, b, bond);
        cap_for.push((cap_a, cap_b));
    }

    for edge in mol.bonds() {
        if cut.contains_key(&edge) {
            continue;
        }
        let (a, b) = mol.bond_endpoints(edge).expect("iterating live edges");
        out.add_bond(a, b, *mol.bond(edge));
    }

    let mut stereo = mol.tetrahedral_stereo().to_vec();
    for record in stereo.iter_mut() {
        for (i, &edge) in bonds.iter().enumerate() {
            let (a, b) = mol.bond_endpoints(edge).expect("validated above");
            let (cap_a, cap_b) = cap_for[i];
            for neighbor in record.neighbors.iter_mut() {
                if record.center == a && *neighbor == AtomId::Node(b) {
                    *neighbor = AtomId::Node(cap_a);
                } else if record.center == b && *neighbor == AtomId::Node(a) {
                    *neighbor = AtomId::Node(cap_b);
                }
            }
        }
    }
    out.set_tetrahedral_stereo(stereo);

    log::debug!(
        "fragmented {} of {} bonds into {} atoms",
        bonds.len(),
        mol.bond_count(),
        out.atom_count()
    );
    Ok(out)
}

fn cap_atom(label: u16, add_labels: bool) -> Atom {
    if add_labels {
        Atom::attachment(label)
    } else {
        Atom::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{BondDir, BondOrder};
    use crate::graph_ops::num_components;
    use crate::smiles::{parse_smiles, to_canonical_smiles, to_smiles};

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn e(i: usize) -> EdgeIndex {
        EdgeIndex::new(i)
    }

    #[test]
    fn single_cut_counts() {
        let mol = parse_smiles("CCO").unwrap();
        let out = fragment_on_bonds(&mol, &[e(1)], &FragmentParams::default()).unwrap();
        // two cap atoms added, bond count unchanged, one extra component
        assert_eq!(out.atom_count(), mol.atom_count() + 2);
        assert_eq!(out.bond_count(), mol.bond_count() + 1);
        assert_eq!(num_components(&out), 2);
    }

    #[test]
    fn caps_carry_sequential_labels() {
        let mol = parse_smiles("CCCC").unwrap();
        let out = fragment_on_bonds(&mol, &[e(0), e(2)], &FragmentParams::default()).unwrap();
        let labels: Vec<u16> = out
            .attachment_points()
            .iter()
            .map(|&p| out.atom(p).map_num)
            .collect();
        assert_eq!(labels, vec![1, 1, 2, 2]);
    }

    #[test]
    fn explicit_label_pairs() {
        let mol = parse_smiles("CCO").unwrap();
        let params = FragmentParams {
            add_labels: true,
            label_pairs: Some(vec![(7, 9)]),
        };
        let out = fragment_on_bonds(&mol, &[e(0)], &params).unwrap();
        let labels: Vec<u16> = out
            .attachment_points()
            .iter()
            .map(|&p| out.atom(p).map_num)
            .collect();
        assert_eq!(labels, vec![7, 9]);
    }

    #[test]
    fn unlabeled_caps() {
        let mol = parse_smiles("CCO").unwrap();
        let params = FragmentParams {
            add_labels: false,
            label_pairs: None,
        };
        let out = fragment_on_bonds(&mol, &[e(0)], &params).unwrap();
        assert!(out.attachment_points().is_empty());
        let wildcards = out
            .atoms()
            .filter(|&idx| out.atom(idx).atomic_num == 0)
            .count();
        assert_eq!(wildcards, 2);
    }

    #[test]
    fn caps_inherit_order() {
        let mol = parse_smiles("C=CC").unwrap();
        let out = fragment_on_bonds(&mol, &[e(0)], &FragmentParams::default()).unwrap();
        let caps = out.attachment_points();
        for &cap in &caps {
            let edge = out.bonds_of(cap).next().unwrap();
            assert_eq!(out.bond(edge).order, BondOrder::Double);
        }
    }

    #[test]
    fn caps_inherit_direction_markers() {
        // cut the middle single bond of a diene; both caps keep Up as
        // seen from the surviving double-bond side
        let mol = parse_smiles("C/C=C/C=C/C").unwrap();
        let out = fragment_on_bonds(&mol, &[e(2)], &FragmentParams::default()).unwrap();

        let cap_a = n(6);
        let cap_b = n(7);
        assert!(out.atom(cap_a).is_attachment_point());
        assert!(out.atom(cap_b).is_attachment_point());

        let edge_a = out.bond_between(n(2), cap_a).unwrap();
        let edge_b = out.bond_between(cap_b, n(3)).unwrap();
        assert_eq!(out.bond_dir_from(edge_a, n(2)), BondDir::Up);
        assert_eq!(out.bond_dir_from(edge_b, cap_b), BondDir::Up);
    }

    #[test]
    fn stereo_neighbor_rehomed_to_cap() {
        let mol = parse_smiles("N[C@@H](F)Br").unwrap();
        let nbr_edge = mol.bond_between(n(1), n(3)).unwrap();
        let out = fragment_on_bonds(&mol, &[nbr_edge], &FragmentParams::default()).unwrap();

        let stereo = out.tetrahedral_stereo_for(n(1)).unwrap();
        assert!(!stereo.neighbors.contains(&AtomId::Node(n(3))));
        let cap = out
            .attachment_points()
            .into_iter()
            .find(|&p| out.bond_between(n(1), p).is_some())
            .unwrap();
        assert!(stereo.neighbors.contains(&AtomId::Node(cap)));
        assert_eq!(stereo.parity, mol.tetrahedral_stereo_for(n(1)).unwrap().parity);
    }

    #[test]
    fn input_not_mutated() {
        let mol = parse_smiles("CCO").unwrap();
        let before = to_smiles(&mol).unwrap();
        let _ = fragment_on_bonds(&mol, &[e(1)], &FragmentParams::default()).unwrap();
        assert_eq!(to_smiles(&mol).unwrap(), before);
    }

    #[test]
    fn pieces_serialize_as_expected() {
        let mol = parse_smiles("CCO").unwrap();
        let out = fragment_on_bonds(&mol, &[e(1)], &FragmentParams::default()).unwrap();
        let expected = parse_smiles("CC[*:1].[*:1]O").unwrap();
        assert_eq!(
            to_canonical_smiles(&out).unwrap(),
            to_canonical_smiles(&expected).unwrap()
        );
    }

    #[test]
    fn missing_bond_rejected() {
        let mol = parse_smiles("CC").unwrap();
        assert_eq!(
            fragment_on_bonds(&mol, &[e(5)], &FragmentParams::default()),
            Err(FragmentError::InvalidBondReference { bond: e(5) })
        );
    }

    #[test]
    fn duplicate_bond_rejected() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(
            fragment_on_bonds(&mol, &[e(0), e(0)], &FragmentParams::default()),
            Err(FragmentError::InvalidBondReference { bond: e(0) })
        );
    }

    #[test]
    fn attachment_incident_bond_rejected() {
        let mol = parse_smiles("[*:1]CC").unwrap();
        assert!(matches!(
            fragment_on_bonds(&mol, &[e(0)], &FragmentParams::default()),
            Err(FragmentError::InvalidBondReference { .. })
        ));
    }

    #[test]
    fn label_count_mismatch_rejected() {
        let mol = parse_smiles("CCO").unwrap();
        let params = FragmentParams {
            add_labels: true,
            label_pairs: Some(vec![(1, 1), (2, 2)]),
        };
        assert_eq!(
            fragment_on_bonds(&mol, &[e(0)], &params),
            Err(FragmentError::LabelCountMismatch { bonds: 1, labels: 2 })
        );
    }

    #[test]
    fn empty_bond_list_copies() {
        let mol = parse_smiles("CC(=O)O").unwrap();
        let out = fragment_on_bonds(&mol, &[], &FragmentParams::default()).unwrap();
        assert_eq!(out, mol);
    }
}

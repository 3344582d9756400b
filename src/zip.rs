//! Fragment fusion. Pairs attachment points that share a zip label, bonds
//! their real neighbors together, and drops the attachment atoms.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondDir, BondOrder};
use crate::graph_ops::combine;
use crate::mol::{AtomId, Mol};

#[derive(Debug, Clone, PartialEq)]
pub enum ZipError {
    /// A zip label is carried by a number of attachment points other
    /// than two.
    UnbalancedZipLabel { label: u16, count: usize },
    /// An attachment point must be bonded to exactly one real atom.
    AttachmentPointDegreeViolation { label: u16, degree: usize },
    /// The two half-bonds of a label disagree on bond order and strict
    /// checking is on.
    ConflictingBondOrder { label: u16 },
}

impl fmt::Display for ZipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZipError::UnbalancedZipLabel { label, count } => {
                write!(f, "zip label {label} appears on {count} attachment points, need 2")
            }
            ZipError::AttachmentPointDegreeViolation { label, degree } => {
                write!(
                    f,
                    "attachment point with label {label} has degree {degree}, need 1"
                )
            }
            ZipError::ConflictingBondOrder { label } => {
                write!(f, "half-bonds of zip label {label} disagree on bond order")
            }
        }
    }
}

impl Error for ZipError {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolzipParams {
    /// Flip the stored chirality tag of an affected stereocenter when
    /// the two attachment bonds sit at positions of opposite parity in
    /// their real neighbors' bond lists, where substituting the new
    /// neighbor in place would invert the spatial sense.
    pub preserve_chirality: bool,
    /// Error out on bond-order disagreement instead of warning and
    /// keeping the first-encountered order.
    pub strict_bond_orders: bool,
}

/// Fuses `mols` into one molecule by bonding together, for each zip
/// label, the real neighbors of its two attachment points.
///
/// Labels are resolved in ascending order. The fused bond inherits order
/// and direction markers from the half-bonds; a plain single bond defers
/// to an explicit order on the other side, and when two explicit orders
/// disagree the half whose attachment point has the lower index in the
/// combined graph wins. Attachment atoms do not survive. Wildcard atoms
/// without a map number are ordinary atoms here and pass through.
pub fn molzip(mols: &[Mol<Atom, Bond>], params: &MolzipParams) -> Result<Mol<Atom, Bond>, ZipError> {
    let combined = combine(mols);

    let mut by_label: BTreeMap<u16, Vec<NodeIndex>> = BTreeMap::new();
    for p in combined.attachment_points() {
        by_label.entry(combined.atom(p).map_num).or_default().push(p);
    }

    for (&label, points) in &by_label {
        if points.len() != 2 {
            return Err(ZipError::UnbalancedZipLabel {
                label,
                count: points.len(),
            });
        }
        for &p in points {
            let degree = combined.degree(p);
            if degree != 1 {
                return Err(ZipError::AttachmentPointDegreeViolation { label, degree });
            }
            let neighbor = combined
                .neighbors(p)
                .next()
                .expect("degree checked above");
            if combined.atom(neighbor).is_attachment_point() {
                return Err(ZipError::AttachmentPointDegreeViolation { label, degree });
            }
        }
    }

    struct Fusion {
        r1: NodeIndex,
        r2: NodeIndex,
        bond: Bond,
    }

    let mut fusions = Vec::with_capacity(by_label.len());
    let mut consumed = vec![false; combined.atom_count()];
    // splice[p] = the real atom that takes the attachment point's place
    // in stereo neighbor lists, and whether that substitution lands at
    // a position of the opposite parity
    let mut splice: Vec<Option<(NodeIndex, bool)>> = vec![None; combined.atom_count()];

    for (&label, points) in &by_label {
        let (p1, p2) = (points[0], points[1]);
        let e1 = combined.bonds_of(p1).next().expect("degree checked above");
        let e2 = combined.bonds_of(p2).next().expect("degree checked above");
        let r1 = combined.other_endpoint(e1, p1).expect("edge of p1");
        let r2 = combined.other_endpoint(e2, p2).expect("edge of p2");

        let order1 = combined.bond(e1).order;
        let order2 = combined.bond(e2).order;
        // Single is what an unwritten half-bond carries, so it defers to
        // an explicit order on the other side without complaint.
        let order = match (order1, order2) {
            (a, b) if a == b => a,
            (BondOrder::Single, b) => b,
            (a, BondOrder::Single) => a,
            (a, b) => {
                if params.strict_bond_orders {
                    return Err(ZipError::ConflictingBondOrder { label });
                }
                log::warn!(
                    "zip label {label}: bond orders {a:?} (atom {}) and {b:?} (atom {}) disagree, keeping {a:?}",
                    r1.index(),
                    r2.index()
                );
                a
            }
        };

        // Both markers expressed in the r1→r2 sense of the fused bond.
        let dir1 = combined.bond_dir_from(e1, r1);
        let dir2 = combined.bond_dir_from(e2, p2);
        let dir = match (dir1, dir2) {
            (BondDir::None, d) => d,
            (d, BondDir::None) => d,
            (a, b) if a == b => a,
            (a, b) => {
                log::warn!(
                    "zip label {label}: direction markers {a:?} and {b:?} disagree, keeping {a:?}"
                );
                a
            }
        };

        // The in-place splice keeps a stereocenter's spatial sense only
        // when the two attachment bonds occupy positions of equal parity
        // in their real neighbors' bond lists.
        let mismatch =
            (incident_position(&combined, r1, e1) + incident_position(&combined, r2, e2)) % 2 == 1;

        consumed[p1.index()] = true;
        consumed[p2.index()] = true;
        splice[p1.index()] = Some((r2, mismatch));
        splice[p2.index()] = Some((r1, mismatch));
        fusions.push(Fusion {
            r1,
            r2,
            bond: Bond { order, dir },
        });
    }

    let mut out = Mol::new();
    let mut remap: Vec<Option<NodeIndex>> = vec![None; combined.atom_count()];
    for idx in combined.atoms() {
        if !consumed[idx.index()] {
            remap[idx.index()] = Some(out.add_atom(combined.atom(idx).clone()));
        }
    }
    for edge in combined.bonds() {
        let (a, b) = combined.bond_endpoints(edge).expect("iterating live edges");
        if consumed[a.index()] || consumed[b.index()] {
            continue;
        }
        let (na, nb) = (remap[a.index()], remap[b.index()]);
        if let (Some(na), Some(nb)) = (na, nb) {
            out.add_bond(na, nb, *combined.bond(edge));
        }
    }
    for fusion in &fusions {
        let (Some(r1), Some(r2)) = (
            remap[fusion.r1.index()],
            remap[fusion.r2.index()],
        ) else {
            continue;
        };
        out.add_bond(r1, r2, fusion.bond);
    }

    let mut stereo = Vec::new();
    for record in combined.tetrahedral_stereo() {
        if consumed[record.center.index()] {
            continue;
        }
        let mut neighbors = Vec::with_capacity(record.neighbors.len());
        let mut flip = false;
        for &neighbor in &record.neighbors {
            match neighbor {
                AtomId::ImplicitH => neighbors.push(AtomId::ImplicitH),
                AtomId::Node(n) if consumed[n.index()] => {
                    let (replacement, mismatch) =
                        splice[n.index()].expect("consumed atoms are spliced");
                    neighbors.push(AtomId::Node(replacement));
                    flip ^= mismatch;
                }
                AtomId::Node(n) => neighbors.push(AtomId::Node(n)),
            }
        }

        let mut record = record.clone();
        record.neighbors = neighbors;
        if params.preserve_chirality && flip {
            record.parity = record.parity.flipped();
        }
        let remapped = record.map_nodes(|n| {
            remap[n.index()].expect("stereo neighbors survive the zip")
        });
        stereo.push(remapped);
    }
    out.set_tetrahedral_stereo(stereo);

    log::debug!(
        "zipped {} labels across {} inputs into {} atoms",
        fusions.len(),
        mols.len(),
        out.atom_count()
    );
    Ok(out)
}

/// Position of `edge` among `node`'s incident bonds in ascending index
/// order, the order the graph was built in.
fn incident_position(mol: &Mol<Atom, Bond>, node: NodeIndex, edge: EdgeIndex) -> usize {
    let mut edges: Vec<EdgeIndex> = mol.bonds_of(node).collect();
    edges.sort_unstable();
    edges.iter().position(|&e| e == edge).unwrap_or(0)
}

/// Convenience wrapper fusing exactly two molecules.
pub fn molzip_pair(
    a: &Mol<Atom, Bond>,
    b: &Mol<Atom, Bond>,
    params: &MolzipParams,
) -> Result<Mol<Atom, Bond>, ZipError> {
    molzip(&[a.clone(), b.clone()], params)
}

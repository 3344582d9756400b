use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondDir};

/// A neighbor slot in a stereo record: either a graph node, or the
/// center's own implicit hydrogen occupying the position it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomId {
    Node(NodeIndex),
    ImplicitH,
}

/// A tetrahedral stereocenter as an explicit parity value plus the
/// neighbor-order sequence it is relative to.
///
/// `neighbors` is a permutation of the center's incident bonds (by the
/// atom on the far end), with [`AtomId::ImplicitH`] standing in for a
/// bracket hydrogen. Any edit that reorders this sequence either keeps
/// the permutation parity class or must flip `parity` to compensate;
/// [`permutation_parity`] is the one place that question is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetrahedralStereo {
    pub center: NodeIndex,
    pub neighbors: Vec<AtomId>,
    pub parity: Chirality,
}

impl TetrahedralStereo {
    pub fn map_nodes<F: FnMut(NodeIndex) -> NodeIndex>(&self, mut f: F) -> TetrahedralStereo {
        TetrahedralStereo {
            center: f(self.center),
            neighbors: self
                .neighbors
                .iter()
                .map(|&aid| match aid {
                    AtomId::Node(idx) => AtomId::Node(f(idx)),
                    AtomId::ImplicitH => AtomId::ImplicitH,
                })
                .collect(),
            parity: self.parity,
        }
    }
}

/// An undirected molecular graph: atoms on nodes, bonds on edges, plus
/// tetrahedral stereo records.
///
/// Thin wrapper over [`petgraph::graph::UnGraph`]. The fragment and zip
/// operations never mutate an input `Mol`; they build fresh ones, so edge
/// indices handed out by [`add_bond`](Mol::add_bond) stay valid for the
/// life of the graph.
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    tetrahedral_stereo: Vec<TetrahedralStereo>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            tetrahedral_stereo: Vec::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    /// Adds a bond oriented `a` → `b`; direction markers on the bond are
    /// interpreted relative to this orientation.
    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    /// Endpoints in stored orientation (source, target).
    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The far endpoint of `edge` as seen from `from`.
    pub fn other_endpoint(&self, edge: EdgeIndex, from: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(edge)?;
        if a == from {
            Some(b)
        } else if b == from {
            Some(a)
        } else {
            None
        }
    }

    pub fn tetrahedral_stereo(&self) -> &[TetrahedralStereo] {
        &self.tetrahedral_stereo
    }

    pub fn set_tetrahedral_stereo(&mut self, stereo: Vec<TetrahedralStereo>) {
        self.tetrahedral_stereo = stereo;
    }

    pub fn tetrahedral_stereo_for(&self, center: NodeIndex) -> Option<&TetrahedralStereo> {
        self.tetrahedral_stereo.iter().find(|s| s.center == center)
    }

    pub fn add_tetrahedral_stereo(&mut self, stereo: TetrahedralStereo) {
        self.tetrahedral_stereo.push(stereo);
    }

    pub fn remove_tetrahedral_stereo(&mut self, center: NodeIndex) {
        self.tetrahedral_stereo.retain(|s| s.center != center);
    }
}

impl Mol<Atom, Bond> {
    /// Direction marker of `edge` as read when traversing it from `from`.
    pub fn bond_dir_from(&self, edge: EdgeIndex, from: NodeIndex) -> BondDir {
        let dir = self.bond(edge).dir;
        match self.bond_endpoints(edge) {
            Some((src, _)) if src == from => dir,
            Some(_) => dir.flipped(),
            None => BondDir::None,
        }
    }

    /// Indices of all labeled attachment-point atoms, in index order.
    pub fn attachment_points(&self) -> Vec<NodeIndex> {
        self.atoms()
            .filter(|&idx| self.atom(idx).is_attachment_point())
            .collect()
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            tetrahedral_stereo: self.tetrahedral_stereo.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        for idx in self.atoms() {
            if self.atom(idx) != other.atom(idx) {
                return false;
            }
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx)
                || self.bond_endpoints(idx) != other.bond_endpoints(idx)
            {
                return false;
            }
        }
        self.tetrahedral_stereo == other.tetrahedral_stereo
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("tetrahedral_stereo", &self.tetrahedral_stereo)
            .finish()
    }
}

/// Whether `to` is an even permutation of `from`. Lists of unequal length
/// (or with unmatched entries) report even, leaving the caller's parity
/// untouched.
pub fn permutation_parity<T: PartialEq>(from: &[T], to: &[T]) -> bool {
    let n = from.len();
    if n != to.len() {
        return true;
    }
    let perm: Vec<usize> = from
        .iter()
        .map(|f| to.iter().position(|t| t == f).unwrap_or(0))
        .collect();
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for i in 0..n {
        if visited[i] {
            continue;
        }
        let mut cycle_len = 0;
        let mut j = i;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        swaps += cycle_len - 1;
    }
    swaps % 2 == 0
}

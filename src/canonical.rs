use std::hash::{Hash, Hasher};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
    map_num: u16,
    singles: u8,
    doubles: u8,
    triples: u8,
    aromatics: u8,
}

fn atom_invariant(mol: &Mol<Atom, Bond>, idx: petgraph::graph::NodeIndex) -> AtomInvariant {
    let atom = mol.atom(idx);
    let mut singles: u8 = 0;
    let mut doubles: u8 = 0;
    let mut triples: u8 = 0;
    let mut aromatics: u8 = 0;
    for edge in mol.bonds_of(idx) {
        match mol.bond(edge).order {
            BondOrder::Single => singles += 1,
            BondOrder::Double => doubles += 1,
            BondOrder::Triple => triples += 1,
            BondOrder::Aromatic => aromatics += 1,
        }
    }
    AtomInvariant {
        atomic_num: atom.atomic_num,
        degree: mol.degree(idx) as u8,
        hydrogen_count: atom.hydrogen_count,
        formal_charge: atom.formal_charge,
        is_aromatic: atom.is_aromatic,
        isotope: atom.isotope,
        map_num: atom.map_num,
        singles,
        doubles,
        triples,
        aromatics,
    }
}

fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut h = Fnv1aHasher::new();
    value.hash(&mut h);
    h.finish()
}

fn ranks_from_values(values: &[u64]) -> Vec<usize> {
    let n = values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| values[i]);
    let mut ranks = vec![0usize; n];
    if n == 0 {
        return ranks;
    }
    ranks[indices[0]] = 0;
    for i in 1..n {
        ranks[indices[i]] = if values[indices[i]] == values[indices[i - 1]] {
            ranks[indices[i - 1]]
        } else {
            i
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// Morgan-style canonical ranks: initial per-atom invariants refined by
/// sorted neighbor ranks until the partition stops splitting. Symmetric
/// atoms keep equal ranks.
pub fn canonical_ordering(mol: &Mol<Atom, Bond>) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let values: Vec<u64> = mol
        .atoms()
        .map(|idx| hash_one(&atom_invariant(mol, idx)))
        .collect();
    let mut ranks = ranks_from_values(&values);
    let mut prev_distinct = count_distinct(&ranks);

    loop {
        let mut new_values = vec![0u64; n];
        for node in mol.atoms() {
            let i = node.index();
            let mut neighbor_ranks: Vec<usize> =
                mol.neighbors(node).map(|nb| ranks[nb.index()]).collect();
            neighbor_ranks.sort_unstable();

            let mut h = Fnv1aHasher::new();
            ranks[i].hash(&mut h);
            neighbor_ranks.hash(&mut h);
            new_values[i] = h.finish();
        }
        let new_ranks = ranks_from_values(&new_values);
        let distinct = count_distinct(&new_ranks);
        if distinct <= prev_distinct {
            return ranks;
        }
        ranks = new_ranks;
        prev_distinct = distinct;
    }
}

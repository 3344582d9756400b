use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondDir, BondOrder};
use crate::canonical::canonical_ordering;
use crate::element::Element;
use crate::graph_ops::connected_components;
use crate::mol::{permutation_parity, AtomId, Mol};
use crate::smiles::SmilesError;

/// Writes SMILES in graph order, one dot-separated part per component.
/// Fails only when more than 99 ring bonds would be open at once.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> Result<String, SmilesError> {
    let components = connected_components(mol);
    let mut parts = Vec::with_capacity(components.len());
    for component in &components {
        parts.push(write_fragment(mol, component, None)?);
    }
    Ok(parts.join("."))
}

/// Writes SMILES with atoms visited in canonical-rank order, so equal
/// structures built in different orders serialize identically.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> Result<String, SmilesError> {
    let ranks = canonical_ordering(mol);
    let components = connected_components(mol);
    let mut parts = Vec::with_capacity(components.len());
    for component in &components {
        parts.push(write_fragment(mol, component, Some(&ranks))?);
    }
    parts.sort();
    Ok(parts.join("."))
}

struct RingClosure {
    ring_id: usize,
    other: NodeIndex,
}

/// Maps ring tickets from the DFS pass to printed digits, handing a
/// closed ring's digit back out for later rings. The 99 limit therefore
/// applies only to rings open at the same time.
struct RingDigits {
    assigned: HashMap<usize, usize>,
    free: BinaryHeap<Reverse<usize>>,
    high: usize,
}

impl RingDigits {
    fn new() -> Self {
        RingDigits {
            assigned: HashMap::new(),
            free: BinaryHeap::new(),
            high: 0,
        }
    }

    fn open(&mut self, ticket: usize) -> Result<usize, SmilesError> {
        let digit = match self.free.pop() {
            Some(Reverse(d)) => d,
            None => {
                self.high += 1;
                self.high
            }
        };
        if digit > 99 {
            return Err(SmilesError::RingIndexOverflow);
        }
        self.assigned.insert(ticket, digit);
        Ok(digit)
    }

    fn close(&mut self, ticket: usize) -> usize {
        let digit = self
            .assigned
            .remove(&ticket)
            .expect("ring digit assigned when the ring opened");
        self.free.push(Reverse(digit));
        digit
    }
}

struct DfsContext {
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
    ring_opens: Vec<Vec<RingClosure>>,
    ring_closes: Vec<Vec<RingClosure>>,
}

impl DfsContext {
    /// Neighbor order as the output text presents it: preceding atom,
    /// implicit hydrogen (when the stereo record has one), ring bonds,
    /// then branch/chain children.
    fn written_neighbor_order(&self, node: NodeIndex, has_implicit_h: bool) -> Vec<AtomId> {
        let mut order = Vec::new();
        if let Some(p) = self.parent[node.index()] {
            order.push(AtomId::Node(p));
        }
        if has_implicit_h {
            order.push(AtomId::ImplicitH);
        }
        for rc in &self.ring_opens[node.index()] {
            order.push(AtomId::Node(rc.other));
        }
        for rc in &self.ring_closes[node.index()] {
            order.push(AtomId::Node(rc.other));
        }
        for &child in &self.children[node.index()] {
            order.push(AtomId::Node(child));
        }
        order
    }
}

fn write_fragment(
    mol: &Mol<Atom, Bond>,
    component: &[NodeIndex],
    ranks: Option<&[usize]>,
) -> Result<String, SmilesError> {
    let n = mol.atom_count();
    let start = match ranks {
        Some(r) => *component
            .iter()
            .min_by_key(|&&node| r[node.index()])
            .expect("component is non-empty"),
        None => component[0],
    };

    let mut visited = vec![false; n];
    let mut parent = vec![None::<NodeIndex>; n];
    let mut children: Vec<Vec<NodeIndex>> = (0..n).map(|_| Vec::new()).collect();
    let mut ring_opens: Vec<Vec<RingClosure>> = (0..n).map(|_| Vec::new()).collect();
    let mut ring_closes: Vec<Vec<RingClosure>> = (0..n).map(|_| Vec::new()).collect();
    let mut next_ring_id: usize = 1;

    let neighbor_lists: Vec<Vec<NodeIndex>> = (0..n)
        .map(|i| {
            let mut neighbors: Vec<NodeIndex> = mol.neighbors(NodeIndex::new(i)).collect();
            if let Some(r) = ranks {
                neighbors.sort_by_key(|nb| (r[nb.index()], nb.index()));
            }
            neighbors
        })
        .collect();

    let mut stack: Vec<(NodeIndex, usize)> = Vec::new();
    visited[start.index()] = true;
    stack.push((start, 0));

    loop {
        let Some(frame) = stack.last_mut() else {
            break;
        };
        let node = frame.0;
        let neighbors = &neighbor_lists[node.index()];
        if frame.1 >= neighbors.len() {
            stack.pop();
            continue;
        }
        let neighbor = neighbors[frame.1];
        frame.1 += 1;

        if !visited[neighbor.index()] {
            visited[neighbor.index()] = true;
            parent[neighbor.index()] = Some(node);
            children[node.index()].push(neighbor);
            stack.push((neighbor, 0));
        } else if parent[node.index()] != Some(neighbor) {
            let already = ring_closes[node.index()]
                .iter()
                .any(|rc| rc.other == neighbor)
                || ring_opens[node.index()].iter().any(|rc| rc.other == neighbor);
            if !already {
                let ring_id = next_ring_id;
                next_ring_id += 1;
                ring_opens[neighbor.index()].push(RingClosure {
                    ring_id,
                    other: node,
                });
                ring_closes[node.index()].push(RingClosure {
                    ring_id,
                    other: neighbor,
                });
            }
        }
    }

    let ctx = DfsContext {
        parent,
        children,
        ring_opens,
        ring_closes,
    };

    let mut out = String::new();
    let mut digits = RingDigits::new();
    write_node(mol, start, &ctx, &mut digits, &mut out)?;
    Ok(out)
}

/// The chirality tag to print at `node`: the stored parity, flipped when
/// the written neighbor order is an odd permutation of the stored one.
fn resolve_chirality(mol: &Mol<Atom, Bond>, node: NodeIndex, ctx: &DfsContext) -> Chirality {
    let stereo = match mol.tetrahedral_stereo_for(node) {
        Some(s) => s,
        None => return Chirality::None,
    };
    let has_implicit_h = stereo.neighbors.contains(&AtomId::ImplicitH);
    let written = ctx.written_neighbor_order(node, has_implicit_h);
    if permutation_parity(&stereo.neighbors, &written) {
        stereo.parity
    } else {
        stereo.parity.flipped()
    }
}

fn write_node(
    mol: &Mol<Atom, Bond>,
    node: NodeIndex,
    ctx: &DfsContext,
    digits: &mut RingDigits,
    out: &mut String,
) -> Result<(), SmilesError> {
    let chirality = resolve_chirality(mol, node, ctx);
    write_atom_symbol(mol, node, chirality, out);

    for rc in &ctx.ring_opens[node.index()] {
        if let Some(edge) = mol.bond_between(node, rc.other) {
            write_bond(mol, edge, node, out);
        }
        write_ring_digit(digits.open(rc.ring_id)?, out);
    }
    for rc in &ctx.ring_closes[node.index()] {
        if let Some(edge) = mol.bond_between(node, rc.other) {
            write_bond(mol, edge, node, out);
        }
        write_ring_digit(digits.close(rc.ring_id), out);
    }

    let kids = &ctx.children[node.index()];
    if kids.is_empty() {
        return Ok(());
    }
    let last = kids.len() - 1;
    for (i, &child) in kids.iter().enumerate() {
        let is_branch = i < last;
        if is_branch {
            out.push('(');
        }
        let edge = mol
            .bond_between(node, child)
            .expect("child implies an edge");
        write_bond(mol, edge, node, out);
        write_node(mol, child, ctx, digits, out)?;
        if is_branch {
            out.push(')');
        }
    }
    Ok(())
}

fn write_bond(
    mol: &Mol<Atom, Bond>,
    edge: petgraph::graph::EdgeIndex,
    from: NodeIndex,
    out: &mut String,
) {
    match mol.bond_dir_from(edge, from) {
        BondDir::Up => {
            out.push('/');
            return;
        }
        BondDir::Down => {
            out.push('\\');
            return;
        }
        BondDir::None => {}
    }
    let (a, b) = mol.bond_endpoints(edge).expect("edge is valid");
    match mol.bond(edge).order {
        BondOrder::Single => {}
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
        BondOrder::Aromatic => {
            if !(mol.atom(a).is_aromatic && mol.atom(b).is_aromatic) {
                out.push(':');
            }
        }
    }
}

// `RingDigits::open` never hands out an id above 99.
fn write_ring_digit(id: usize, out: &mut String) {
    if id <= 9 {
        out.push(char::from(b'0' + id as u8));
    } else {
        out.push('%');
        out.push(char::from(b'0' + (id / 10) as u8));
        out.push(char::from(b'0' + (id % 10) as u8));
    }
}

fn write_atom_symbol(mol: &Mol<Atom, Bond>, node: NodeIndex, chirality: Chirality, out: &mut String) {
    let atom = mol.atom(node);

    if atom.atomic_num == 0 {
        // Wildcards print bare unless they carry payload; a zip label is
        // the usual payload.
        if atom.map_num == 0 && atom.formal_charge == 0 && atom.isotope == 0 {
            out.push('*');
        } else {
            write_bracket_atom(atom, chirality, out);
        }
        return;
    }

    if chirality == Chirality::None && can_write_bare(mol, node) {
        let symbol = Element(atom.atomic_num).symbol();
        if atom.is_aromatic {
            for c in symbol.chars() {
                out.push(c.to_ascii_lowercase());
            }
        } else {
            out.push_str(symbol);
        }
    } else {
        write_bracket_atom(atom, chirality, out);
    }
}

fn can_write_bare(mol: &Mol<Atom, Bond>, node: NodeIndex) -> bool {
    let atom = mol.atom(node);
    let elem = Element(atom.atomic_num);

    if !elem.is_organic_subset() {
        return false;
    }
    if atom.isotope != 0 || atom.formal_charge != 0 || atom.map_num != 0 {
        return false;
    }

    // A bare atom's hydrogen count is implied; only write bare when the
    // reader would recompute the same count.
    atom.hydrogen_count == implicit_h_for_bare(mol, node)
}

fn implicit_h_for_bare(mol: &Mol<Atom, Bond>, node: NodeIndex) -> u8 {
    let atom = mol.atom(node);
    let valences = Element(atom.atomic_num).default_valences();
    if valences.is_empty() {
        return 0;
    }
    let mut bos: u8 = 0;
    for edge in mol.bonds_of(node) {
        let contribution = match mol.bond(edge).order {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        };
        bos = bos.saturating_add(contribution);
    }
    let target = valences.iter().find(|&&v| v >= bos).copied().unwrap_or(0);
    if target < bos {
        return 0;
    }
    let mut h = target - bos;
    if atom.is_aromatic && h > 0 {
        h -= 1;
    }
    h
}

fn write_bracket_atom(atom: &Atom, chirality: Chirality, out: &mut String) {
    out.push('[');

    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }

    if atom.atomic_num == 0 {
        out.push('*');
    } else {
        let symbol = Element(atom.atomic_num).symbol();
        if atom.is_aromatic {
            for c in symbol.chars() {
                out.push(c.to_ascii_lowercase());
            }
        } else {
            out.push_str(symbol);
        }
    }

    match chirality {
        Chirality::Ccw => out.push('@'),
        Chirality::Cw => out.push_str("@@"),
        Chirality::None => {}
    }

    if atom.hydrogen_count > 0 {
        out.push('H');
        if atom.hydrogen_count > 1 {
            out.push_str(&atom.hydrogen_count.to_string());
        }
    }

    if atom.formal_charge > 0 {
        out.push('+');
        if atom.formal_charge > 1 {
            out.push_str(&atom.formal_charge.to_string());
        }
    } else if atom.formal_charge < 0 {
        out.push('-');
        if atom.formal_charge < -1 {
            out.push_str(&atom.formal_charge.unsigned_abs().to_string());
        }
    }

    if atom.map_num != 0 {
        out.push(':');
        out.push_str(&atom.map_num.to_string());
    }

    out.push(']');
}

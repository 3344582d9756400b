use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// Connected components as sorted node lists, ordered by their smallest node.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn num_components<A, B>(mol: &Mol<A, B>) -> usize {
    connected_components(mol).len()
}

/// Disjoint union of several molecules into one graph.
///
/// Atoms and bonds are cloned in input order, so the atoms of `mols[j]`
/// occupy one contiguous index block per input and bonds keep their stored
/// orientation (direction markers keep their sense). Stereo records are
/// remapped through the same offsets.
pub fn combine<A: Clone, B: Clone>(mols: &[Mol<A, B>]) -> Mol<A, B> {
    let mut out = Mol::new();
    for mol in mols {
        let offset = out.atom_count();
        for idx in mol.atoms() {
            out.add_atom(mol.atom(idx).clone());
        }
        for edge in mol.bonds() {
            let (a, b) = mol
                .bond_endpoints(edge)
                .expect("edge index from iteration is valid");
            out.add_bond(
                NodeIndex::new(a.index() + offset),
                NodeIndex::new(b.index() + offset),
                mol.bond(edge).clone(),
            );
        }
        for stereo in mol.tetrahedral_stereo() {
            out.add_tetrahedral_stereo(
                stereo.map_nodes(|idx| NodeIndex::new(idx.index() + offset)),
            );
        }
    }
    out
}

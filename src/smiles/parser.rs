use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondDir, BondOrder};
use crate::element::Element;
use crate::mol::{AtomId, Mol, TetrahedralStereo};
use crate::smiles::error::SmilesError;

/// A bond symbol read between two atom tokens, oriented previous→next.
#[derive(Debug, Clone, Copy)]
struct PendingBond {
    order: Option<BondOrder>,
    dir: BondDir,
    pos: usize,
    ch: char,
}

/// Stereo neighbor slot during parsing. Ring-opening digits reference an
/// atom that has not been read yet, so they hold a ticket that is patched
/// when the ring closes.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Known(AtomId),
    Ring(usize),
}

struct StereoBuilder {
    center: NodeIndex,
    parity: Chirality,
    slots: Vec<Slot>,
}

struct RingOpen {
    atom: NodeIndex,
    pending: Option<PendingBond>,
    ticket: usize,
}

pub(super) fn parse(input: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    Parser::new(input).run()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    mol: Mol<Atom, Bond>,
    prev: Option<NodeIndex>,
    branch_stack: Vec<Option<NodeIndex>>,
    pending: Option<PendingBond>,
    rings: HashMap<u16, RingOpen>,
    stereo: Vec<StereoBuilder>,
    /// Atoms written without brackets, whose hydrogen count is implied.
    bare: Vec<bool>,
    next_ticket: usize,
}

impl Parser {
    fn new(input: &str) -> Parser {
        Parser {
            chars: input.chars().collect(),
            pos: 0,
            mol: Mol::new(),
            prev: None,
            branch_stack: Vec::new(),
            pending: None,
            rings: HashMap::new(),
            stereo: Vec::new(),
            bare: Vec::new(),
            next_ticket: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn run(mut self) -> Result<Mol<Atom, Bond>, SmilesError> {
        while let Some(c) = self.peek() {
            match c {
                '-' => self.take_bond(Some(BondOrder::Single), BondDir::None, c)?,
                '=' => self.take_bond(Some(BondOrder::Double), BondDir::None, c)?,
                '#' => self.take_bond(Some(BondOrder::Triple), BondDir::None, c)?,
                ':' => self.take_bond(Some(BondOrder::Aromatic), BondDir::None, c)?,
                '/' => self.take_bond(Some(BondOrder::Single), BondDir::Up, c)?,
                '\\' => self.take_bond(Some(BondOrder::Single), BondDir::Down, c)?,
                '(' => {
                    if let Some(p) = self.pending {
                        return Err(SmilesError::UnexpectedChar { pos: p.pos, ch: p.ch });
                    }
                    self.branch_stack.push(self.prev);
                    self.pos += 1;
                }
                ')' => {
                    if let Some(p) = self.pending {
                        return Err(SmilesError::UnexpectedChar { pos: p.pos, ch: p.ch });
                    }
                    self.prev = self
                        .branch_stack
                        .pop()
                        .ok_or(SmilesError::UnmatchedParen { pos: self.pos })?;
                    self.pos += 1;
                }
                '.' => {
                    if let Some(p) = self.pending {
                        return Err(SmilesError::UnexpectedChar { pos: p.pos, ch: p.ch });
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '0'..='9' => {
                    let digit = (c as u8 - b'0') as u16;
                    self.pos += 1;
                    self.ring_digit(digit)?;
                }
                '%' => {
                    let start = self.pos;
                    self.pos += 1;
                    let mut digit: u16 = 0;
                    let mut seen = 0;
                    while let Some(d) = self.peek().filter(|ch| ch.is_ascii_digit()) {
                        digit = digit * 10 + (d as u8 - b'0') as u16;
                        self.pos += 1;
                        seen += 1;
                        if seen == 2 {
                            break;
                        }
                    }
                    if seen != 2 {
                        return Err(SmilesError::InvalidRingBond { digit, pos: start });
                    }
                    self.ring_digit(digit)?;
                }
                '[' => self.bracket_atom()?,
                '*' => {
                    self.pos += 1;
                    self.add_atom(Atom::default(), Chirality::None, false)?;
                }
                _ if c.is_ascii_alphabetic() => self.bare_atom()?,
                _ => {
                    return Err(SmilesError::UnexpectedChar { pos: self.pos, ch: c });
                }
            }
        }
        self.finish()
    }

    fn take_bond(
        &mut self,
        order: Option<BondOrder>,
        dir: BondDir,
        ch: char,
    ) -> Result<(), SmilesError> {
        if let Some(p) = self.pending {
            return Err(SmilesError::UnexpectedChar { pos: p.pos, ch: p.ch });
        }
        self.pending = Some(PendingBond {
            order,
            dir,
            pos: self.pos,
            ch,
        });
        self.pos += 1;
        Ok(())
    }

    fn bare_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let c = self.chars[self.pos];

        // Two-letter organic-subset symbols first.
        if let Some(&next) = self.chars.get(self.pos + 1) {
            let two: String = [c, next].iter().collect();
            if two == "Cl" || two == "Br" {
                self.pos += 2;
                let elem = Element::from_symbol(&two).unwrap();
                let atom = Atom {
                    atomic_num: elem.atomic_num(),
                    ..Atom::default()
                };
                return self.add_atom(atom, Chirality::None, true);
            }
        }

        let (elem, aromatic) = if c.is_ascii_lowercase() {
            let sym = c.to_ascii_uppercase().to_string();
            let elem = Element::from_symbol(&sym)
                .filter(|e| e.supports_aromatic())
                .ok_or_else(|| SmilesError::InvalidElement {
                    pos: start,
                    text: c.to_string(),
                })?;
            (elem, true)
        } else {
            let elem = Element::from_symbol(&c.to_string())
                .filter(|e| e.is_organic_subset())
                .ok_or_else(|| SmilesError::InvalidElement {
                    pos: start,
                    text: c.to_string(),
                })?;
            (elem, false)
        };
        self.pos += 1;

        let atom = Atom {
            atomic_num: elem.atomic_num(),
            is_aromatic: aromatic,
            ..Atom::default()
        };
        self.add_atom(atom, Chirality::None, true)
    }

    fn bracket_atom(&mut self) -> Result<(), SmilesError> {
        let open_pos = self.pos;
        self.pos += 1;

        let isotope = self.read_number()?.unwrap_or(0);
        if isotope > u16::MAX as u32 {
            return Err(SmilesError::InvalidIsotope { pos: open_pos });
        }

        let (elem, aromatic) = self.read_bracket_symbol(open_pos)?;

        let mut chirality = Chirality::None;
        if self.peek() == Some('@') {
            self.pos += 1;
            if self.peek() == Some('@') {
                self.pos += 1;
                chirality = Chirality::Cw;
            } else {
                chirality = Chirality::Ccw;
            }
        }

        let mut hydrogen_count: u8 = 0;
        if self.peek() == Some('H') {
            let h_pos = self.pos;
            self.pos += 1;
            hydrogen_count = match self.read_number()? {
                Some(n) if n <= u8::MAX as u32 => n as u8,
                Some(_) => return Err(SmilesError::InvalidHydrogenCount { pos: h_pos }),
                None => 1,
            };
        }

        let mut formal_charge: i8 = 0;
        match self.peek() {
            Some('+') => {
                self.pos += 1;
                formal_charge = match self.read_number()? {
                    Some(n) if n <= i8::MAX as u32 => n as i8,
                    Some(_) => return Err(SmilesError::InvalidCharge { pos: open_pos }),
                    None => {
                        let mut charge = 1i8;
                        while self.peek() == Some('+') {
                            self.pos += 1;
                            charge += 1;
                        }
                        charge
                    }
                };
            }
            Some('-') => {
                self.pos += 1;
                formal_charge = match self.read_number()? {
                    Some(n) if n <= i8::MAX as u32 => -(n as i8),
                    Some(_) => return Err(SmilesError::InvalidCharge { pos: open_pos }),
                    None => {
                        let mut charge = -1i8;
                        while self.peek() == Some('-') {
                            self.pos += 1;
                            charge -= 1;
                        }
                        charge
                    }
                };
            }
            _ => {}
        }

        let mut map_num: u16 = 0;
        if self.peek() == Some(':') {
            let map_pos = self.pos;
            self.pos += 1;
            map_num = match self.read_number()? {
                Some(n) if n <= u16::MAX as u32 => n as u16,
                _ => return Err(SmilesError::InvalidMapNumber { pos: map_pos }),
            };
        }

        if self.peek() != Some(']') {
            return Err(SmilesError::UnclosedBracket { pos: open_pos });
        }
        self.pos += 1;

        let atom = Atom {
            atomic_num: elem.atomic_num(),
            formal_charge,
            isotope: isotope as u16,
            hydrogen_count,
            is_aromatic: aromatic,
            map_num,
        };
        self.add_atom(atom, chirality, false)
    }

    fn read_bracket_symbol(&mut self, open_pos: usize) -> Result<(Element, bool), SmilesError> {
        let c = self.peek().ok_or(SmilesError::UnclosedBracket { pos: open_pos })?;

        if c == '*' {
            self.pos += 1;
            return Ok((Element(0), false));
        }

        if c.is_ascii_lowercase() {
            let sym = c.to_ascii_uppercase().to_string();
            let elem = Element::from_symbol(&sym)
                .filter(|e| e.supports_aromatic())
                .ok_or_else(|| SmilesError::InvalidElement {
                    pos: self.pos,
                    text: c.to_string(),
                })?;
            self.pos += 1;
            return Ok((elem, true));
        }

        if !c.is_ascii_uppercase() {
            return Err(SmilesError::UnexpectedChar { pos: self.pos, ch: c });
        }

        // Greedy two-letter match, but never swallow a following 'H' that is
        // actually the hydrogen-count token (no two-letter symbol ends in H).
        if let Some(&next) = self.chars.get(self.pos + 1) {
            if next.is_ascii_lowercase() {
                let two: String = [c, next].iter().collect();
                if let Some(elem) = Element::from_symbol(&two) {
                    self.pos += 2;
                    return Ok((elem, false));
                }
            }
        }

        let elem = Element::from_symbol(&c.to_string()).ok_or_else(|| {
            SmilesError::InvalidElement {
                pos: self.pos,
                text: c.to_string(),
            }
        })?;
        self.pos += 1;
        Ok((elem, false))
    }

    fn read_number(&mut self) -> Result<Option<u32>, SmilesError> {
        let mut value: u32 = 0;
        let mut seen = false;
        while let Some(d) = self.peek().filter(|ch| ch.is_ascii_digit()) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((d as u8 - b'0') as u32))
                .ok_or(SmilesError::InvalidIsotope { pos: self.pos })?;
            self.pos += 1;
            seen = true;
        }
        Ok(if seen { Some(value) } else { None })
    }

    fn add_atom(
        &mut self,
        atom: Atom,
        chirality: Chirality,
        bare: bool,
    ) -> Result<(), SmilesError> {
        let aromatic = atom.is_aromatic;
        let hydrogen_count = atom.hydrogen_count;
        let idx = self.mol.add_atom(atom);
        self.bare.push(bare);

        if let Some(p) = self.prev {
            let pending = self.pending.take();
            let order = match pending.and_then(|b| b.order) {
                Some(order) => order,
                None => {
                    if aromatic && self.mol.atom(p).is_aromatic {
                        BondOrder::Aromatic
                    } else {
                        BondOrder::Single
                    }
                }
            };
            let dir = pending.map(|b| b.dir).unwrap_or(BondDir::None);
            self.mol.add_bond(p, idx, Bond { order, dir });
            if let Some(builder) = self.stereo.iter_mut().find(|b| b.center == p) {
                builder.slots.push(Slot::Known(AtomId::Node(idx)));
            }
        } else if let Some(p) = self.pending {
            return Err(SmilesError::UnexpectedChar { pos: p.pos, ch: p.ch });
        }

        if chirality != Chirality::None {
            let mut slots = Vec::new();
            if let Some(p) = self.prev {
                slots.push(Slot::Known(AtomId::Node(p)));
            }
            if hydrogen_count > 0 {
                slots.push(Slot::Known(AtomId::ImplicitH));
            }
            self.stereo.push(StereoBuilder {
                center: idx,
                parity: chirality,
                slots,
            });
        }

        self.prev = Some(idx);
        Ok(())
    }

    fn ring_digit(&mut self, digit: u16) -> Result<(), SmilesError> {
        let cur = self.prev.ok_or(SmilesError::InvalidRingBond {
            digit,
            pos: self.pos,
        })?;

        if let Some(open) = self.rings.remove(&digit) {
            if open.atom == cur {
                return Err(SmilesError::InvalidRingBond {
                    digit,
                    pos: self.pos,
                });
            }
            let close_pending = self.pending.take();

            let order = match (
                open.pending.and_then(|b| b.order),
                close_pending.and_then(|b| b.order),
            ) {
                (Some(a), Some(b)) if a != b => {
                    return Err(SmilesError::RingBondConflict { digit });
                }
                (Some(a), _) => a,
                (_, Some(b)) => b,
                (None, None) => {
                    if self.mol.atom(open.atom).is_aromatic && self.mol.atom(cur).is_aromatic {
                        BondOrder::Aromatic
                    } else {
                        BondOrder::Single
                    }
                }
            };

            // Markers on the closing side are written current→partner; flip
            // them into the bond's stored open→close orientation.
            let open_dir = open.pending.map(|b| b.dir).unwrap_or(BondDir::None);
            let close_dir = close_pending
                .map(|b| b.dir.flipped())
                .unwrap_or(BondDir::None);
            let dir = match (open_dir, close_dir) {
                (BondDir::None, d) => d,
                (d, BondDir::None) => d,
                (a, b) if a == b => a,
                _ => return Err(SmilesError::RingBondConflict { digit }),
            };

            self.mol.add_bond(open.atom, cur, Bond { order, dir });

            if let Some(builder) = self.stereo.iter_mut().find(|b| b.center == open.atom) {
                for slot in builder.slots.iter_mut() {
                    if *slot == Slot::Ring(open.ticket) {
                        *slot = Slot::Known(AtomId::Node(cur));
                    }
                }
            }
            if let Some(builder) = self.stereo.iter_mut().find(|b| b.center == cur) {
                builder.slots.push(Slot::Known(AtomId::Node(open.atom)));
            }
        } else {
            let ticket = self.next_ticket;
            self.next_ticket += 1;
            let pending = self.pending.take();
            if let Some(builder) = self.stereo.iter_mut().find(|b| b.center == cur) {
                builder.slots.push(Slot::Ring(ticket));
            }
            self.rings.insert(
                digit,
                RingOpen {
                    atom: cur,
                    pending,
                    ticket,
                },
            );
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Mol<Atom, Bond>, SmilesError> {
        if let Some(pos) = (!self.branch_stack.is_empty()).then(|| self.pos) {
            return Err(SmilesError::UnmatchedParen { pos });
        }
        if let Some((&digit, _)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing { digit });
        }
        if self.pending.is_some() {
            return Err(SmilesError::UnexpectedEnd);
        }

        for idx in self.mol.atoms().collect::<Vec<_>>() {
            if self.bare[idx.index()] {
                let h = implicit_hydrogens(&self.mol, idx);
                self.mol.atom_mut(idx).hydrogen_count = h;
            }
        }

        let mut records = Vec::new();
        for builder in &self.stereo {
            if builder.slots.len() < 3 || builder.slots.len() > 4 {
                continue;
            }
            let neighbors: Vec<AtomId> = builder
                .slots
                .iter()
                .map(|slot| match slot {
                    Slot::Known(aid) => *aid,
                    // unresolved rings were already rejected above
                    Slot::Ring(_) => unreachable!("ring slot outlived ring table"),
                })
                .collect();
            records.push(TetrahedralStereo {
                center: builder.center,
                neighbors,
                parity: builder.parity,
            });
        }
        self.mol.set_tetrahedral_stereo(records);

        Ok(self.mol)
    }
}

fn implicit_hydrogens(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    let atom = mol.atom(idx);
    let elem = Element(atom.atomic_num);
    let valences = elem.default_valences();
    if valences.is_empty() {
        return 0;
    }

    let mut bos: u8 = 0;
    for edge in mol.bonds_of(idx) {
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

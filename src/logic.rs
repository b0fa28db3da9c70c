use std::ops::Index;

use itertools::Itertools;
use varisat::Lit;

/// No two of `lits` are true.
pub(crate) fn at_most_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    // (!A + !B) * (!A + !C) * ...
    lits.iter()
        .combinations(2)
        .map(|pair| vec![!**pair.index(0), !**pair.index(1)])
        .collect_vec()
}

pub(crate) fn exactly_one(lits: Vec<Lit>) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() * (lits.len() + 1) / 2 + 1);

    clauses.extend(at_most_one(&lits));
    // at least one is true; A + B + C + ...
    clauses.push(lits);

    clauses
}

/// No three of `lits` are true at once.
pub(crate) fn at_most_two(lits: &[Lit]) -> Vec<Vec<Lit>> {
    lits.iter()
        .combinations(3)
        .map(|selection| selection.iter().map(|lit| !**lit).collect_vec())
        .collect_vec()
}

/// If `guard` holds then at least two of `lits` are true.
pub(crate) fn at_least_two_if(guard: Lit, lits: &[Lit]) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() + 1);

    // guard => A + B + C + ...
    clauses.push(std::iter::once(!guard).chain(lits.iter().copied()).collect_vec());

    // each one being true implies another is; X => Y + Z + ... = !X + Y + Z + ...
    clauses.extend(lits.iter().map(|x| {
        lits.iter().map(|lit| if lit == x { !*lit } else { *lit }).collect_vec()
    }));

    clauses
}

/// `lhs => a_1 b_1 + a_2 b_2 + ...`, multiplied out into CNF. Produces `2^n` clauses for `n` conjunctions.
pub(crate) fn implies_any_pair(lhs: Vec<Lit>, conjunctions: &[[Lit; 2]]) -> Vec<Vec<Lit>> {
    if conjunctions.is_empty() {
        return vec![lhs];
    }

    conjunctions.iter()
        .map(|pair| pair.iter().copied())
        .multi_cartesian_product()
        .map(|choice| lhs.iter().copied().chain(choice).collect_vec())
        .collect_vec()
}

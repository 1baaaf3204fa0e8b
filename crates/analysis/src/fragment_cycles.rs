//! Cycle detection over the fragment spread graph.
//!
//! Fragments are nodes keyed by name; an edge `A -> B` means fragment `A`
//! spreads `B` somewhere in its selection set. Edges to fragments that are not
//! in the graph are ignored (they are reported as unknown symbols).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

pub type FragmentGraph = BTreeMap<Arc<str>, BTreeSet<Arc<str>>>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Visiting,
    Done,
}

/// At least one cycle per cyclic group of fragments, each reported once.
///
/// A cycle is listed starting from its smallest fragment name, without
/// repeating the first name at the end: `A -> B -> A` is `[A, B]`.
#[must_use]
pub fn find_fragment_cycles(graph: &FragmentGraph) -> Vec<Vec<Arc<str>>> {
    let mut colors: HashMap<&str, Color> = HashMap::new();
    let mut path: Vec<&Arc<str>> = Vec::new();
    let mut cycles: BTreeSet<Vec<Arc<str>>> = BTreeSet::new();

    for start in graph.keys() {
        if !colors.contains_key(start.as_ref()) {
            visit(graph, start, &mut colors, &mut path, &mut cycles);
        }
    }

    cycles.into_iter().collect()
}

fn visit<'a>(
    graph: &'a FragmentGraph,
    node: &'a Arc<str>,
    colors: &mut HashMap<&'a str, Color>,
    path: &mut Vec<&'a Arc<str>>,
    cycles: &mut BTreeSet<Vec<Arc<str>>>,
) {
    colors.insert(node.as_ref(), Color::Visiting);
    path.push(node);

    if let Some(edges) = graph.get(node) {
        for next in edges {
            // Only defined fragments are nodes
            let Some((next, _)) = graph.get_key_value(next) else {
                continue;
            };
            match colors.get(next.as_ref()) {
                None => visit(graph, next, colors, path, cycles),
                Some(Color::Visiting) => {
                    if let Some(start) = path.iter().position(|n| n == &next) {
                        cycles.insert(normalize(&path[start..]));
                    }
                }
                Some(Color::Done) => {}
            }
        }
    }

    path.pop();
    colors.insert(node.as_ref(), Color::Done);
}

/// Rotate a cycle so it starts at its smallest name.
fn normalize(cycle: &[&Arc<str>]) -> Vec<Arc<str>> {
    let min = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(index, _)| index);
    cycle[min..]
        .iter()
        .chain(&cycle[..min])
        .map(|name| Arc::clone(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> FragmentGraph {
        edges
            .iter()
            .map(|(from, to)| {
                (
                    Arc::from(*from),
                    to.iter().map(|t| Arc::from(*t)).collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    fn names(cycles: &[Vec<Arc<str>>]) -> Vec<Vec<&str>> {
        cycles
            .iter()
            .map(|c| c.iter().map(AsRef::as_ref).collect())
            .collect()
    }

    #[test]
    fn test_no_cycles() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        assert!(find_fragment_cycles(&g).is_empty());
    }

    #[test]
    fn test_self_spread() {
        let g = graph(&[("A", &["A"])]);
        assert_eq!(names(&find_fragment_cycles(&g)), vec![vec!["A"]]);
    }

    #[test]
    fn test_two_fragment_cycle_reported_once() {
        let g = graph(&[("B", &["A"]), ("A", &["B"])]);
        assert_eq!(names(&find_fragment_cycles(&g)), vec![vec!["A", "B"]]);
    }

    #[test]
    fn test_cycle_is_rotated_to_smallest_name() {
        let g = graph(&[("Start", &["Z"]), ("Z", &["M"]), ("M", &["Z"])]);
        assert_eq!(names(&find_fragment_cycles(&g)), vec![vec!["M", "Z"]]);
    }

    #[test]
    fn test_undefined_targets_are_ignored() {
        let g = graph(&[("A", &["Missing"])]);
        assert!(find_fragment_cycles(&g).is_empty());
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let g = graph(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &["D"]), ("D", &[])]);
        assert!(find_fragment_cycles(&g).is_empty());
    }
}

//! Property tests for ordering generation and matrix search.

use acrostic_arrange::{
    Candidate, DependencyGraph, MatrixSearch, MemoryWriter, ResultSink, SearchConfig,
    generate_orderings,
};
use acrostic_core::{Keyword, PhraseSlot, Position};
use hashbrown::HashMap;
use proptest::prelude::*;

/// A random forest: `parents[i]` is the head of slot `i + 1`, if any.
fn forest() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..7).prop_flat_map(|n| {
        let heads: Vec<BoxedStrategy<Option<usize>>> = (1..n)
            .map(|i| proptest::option::of(0..i).boxed())
            .collect();
        (Just(n), heads).prop_map(|(n, heads)| {
            let edges = heads
                .into_iter()
                .enumerate()
                .filter_map(|(i, h)| h.map(|h| (i + 1, h)))
                .collect();
            (n, edges)
        })
    })
}

fn factorial(n: usize) -> usize {
    (1..=n).product()
}

fn variants() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[abx]{0,3}", 1..4)
}

/// Every `(variant stack, anchor)` an exhaustive search must report.
///
/// Lays out each combination of variants directly and looks for the
/// keyword in every column and starting row.
fn every_arrangement(candidate: &Candidate, keyword: &[char], width: usize, match_length: bool) -> Vec<(Vec<usize>, Position)> {
    let counts: Vec<usize> = candidate.slots().iter().map(|s| s.slot().len()).collect();
    let mut stack = vec![0; counts.len()];
    let mut out = Vec::new();
    loop {
        let mut cells = HashMap::new();
        let (mut row, mut col) = (0, 0);
        for (slot, &v) in candidate.slots().iter().zip(&stack) {
            let text: Vec<char> = slot.slot().variant_text(v).unwrap().chars().collect();
            if text.is_empty() {
                if slot.newline() && col != 0 {
                    row += 1;
                    col = 0;
                }
                continue;
            }
            if (slot.newline() && col != 0) || col >= width {
                row += 1;
                col = 0;
            }
            for c in text {
                if col == width {
                    row += 1;
                    col = 0;
                }
                cells.insert((row, col), c);
                col += 1;
            }
        }

        let last_row = if match_length { 0 } else { row };
        for start in 0..=last_row {
            for c in 0..width {
                let reads = keyword
                    .iter()
                    .enumerate()
                    .all(|(i, k)| cells.get(&(start + i, c)) == Some(k));
                if !reads {
                    continue;
                }
                let anchor = Position::new(start + keyword.len() - 1, c);
                let ends = if col >= anchor.col { row == anchor.row } else { row == anchor.row + 1 };
                if !match_length || ends {
                    out.push((stack.clone(), anchor));
                }
            }
        }

        let Some(i) = (0..stack.len()).rev().find(|&i| stack[i] + 1 < counts[i]) else {
            break;
        };
        stack[i] += 1;
        stack[i + 1..].fill(0);
    }
    out.sort();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn orderings_are_permutations_respecting_edges((n, edges) in forest()) {
        let graph = DependencyGraph::from_edges(n, &edges).unwrap();
        let orderings = generate_orderings(&graph, &[]).unwrap();
        prop_assert!(!orderings.is_empty());
        for o in &orderings {
            let mut sorted = o.as_slice().to_vec();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (0..n).collect::<Vec<_>>());
            for &(u, v) in &edges {
                prop_assert!(o.precedes(u, v));
            }
        }

        // Each head's dependents are permuted freely, as are the roots.
        let mut children = vec![0usize; n];
        for &(_, h) in &edges {
            children[h] += 1;
        }
        let roots = n - edges.len();
        let expected = children.iter().map(|&c| factorial(c)).product::<usize>() * factorial(roots);
        prop_assert_eq!(orderings.len(), expected);
    }

    #[test]
    fn accepted_grids_are_well_formed(
        slots in proptest::collection::vec((variants(), any::<bool>()), 1..5),
        width in 1usize..5,
        match_length in any::<bool>(),
    ) {
        let keyword = Keyword::new("ab").unwrap();
        let phrase_slots: Vec<PhraseSlot> = slots
            .iter()
            .map(|(v, nl)| PhraseSlot::new(v, *nl, &keyword).unwrap())
            .collect();
        let candidate = Candidate::from_slots(1, phrase_slots);
        let out = MemoryWriter::new();
        let sink = ResultSink::new(Box::new(out.clone()), Some(4));
        let config = SearchConfig {
            match_length,
            skip_same_length: false,
            ..SearchConfig::new(width)
        };
        let found = MatrixSearch::new(&candidate, &keyword, config, &sink).unwrap().run().unwrap();
        sink.finish().unwrap();
        let results = out.results();
        prop_assert_eq!(found, results.len());

        for r in &results {
            prop_assert!(r.grid.rows().iter().all(|row| row.len() <= width));
            let chosen: String = candidate
                .slots()
                .iter()
                .zip(&r.choices)
                .map(|(s, c)| s.slot().variant_text(c.variant).unwrap())
                .collect();
            prop_assert_eq!(r.grid.lines().concat(), chosen);
            prop_assert_eq!(r.vertical_reading(2), "ab");
            if match_length {
                prop_assert_eq!(r.anchor.row, 1);
            }
        }
    }

    #[test]
    fn search_finds_every_arrangement(
        slots in proptest::collection::vec(
            (proptest::collection::vec("[abc]{1,3}", 1..4), any::<bool>()),
            1..5,
        ),
        word in "[ab]{1,3}",
        width in 1usize..5,
        match_length in any::<bool>(),
    ) {
        let keyword = Keyword::new(&word).unwrap();
        let phrase_slots: Vec<PhraseSlot> = slots
            .iter()
            .map(|(v, nl)| PhraseSlot::new(v, *nl, &keyword).unwrap())
            .collect();
        let candidate = Candidate::from_slots(1, phrase_slots);
        let out = MemoryWriter::new();
        let sink = ResultSink::new(Box::new(out.clone()), None);
        let config = SearchConfig {
            match_length,
            skip_same_length: false,
            ..SearchConfig::new(width)
        };
        MatrixSearch::new(&candidate, &keyword, config, &sink).unwrap().run().unwrap();
        sink.finish().unwrap();
        let mut found: Vec<(Vec<usize>, Position)> = out
            .results()
            .iter()
            .map(|r| (r.variant_stack(), r.anchor))
            .collect();
        found.sort();
        let chars: Vec<char> = word.chars().collect();
        prop_assert_eq!(found, every_arrangement(&candidate, &chars, width, match_length));
    }
}

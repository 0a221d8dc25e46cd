//! End-to-end arrangement tests: ordering generation, candidate
//! enumeration and matrix search through the public `Arranger` API.

use std::path::PathBuf;

use acrostic_arrange::{
    ArrangeOptions, Arranger, CoordinateGroup, DependencyGraph, MemoryWriter, SentenceInput,
    SlotInput, generate_orderings,
};
use acrostic_core::{ArrangeResult, Keyword};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Fixture {
    keyword: String,
    width: usize,
    sentences: Vec<FixtureSentence>,
}

#[derive(Deserialize)]
struct FixtureSentence {
    slots: Vec<FixtureSlot>,
    edges: Vec<(usize, usize)>,
    groups: Vec<Vec<usize>>,
}

#[derive(Deserialize)]
struct FixtureSlot {
    variants: Vec<String>,
    #[serde(default)]
    newline: bool,
}

fn load_fixture(name: &str) -> (Keyword, usize, Vec<SentenceInput>) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name);
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e));
    let fixture: Fixture = serde_json::from_str(&contents)
        .unwrap_or_else(|e| panic!("failed to parse fixture {}: {}", path.display(), e));
    let sentences = fixture
        .sentences
        .into_iter()
        .map(|s| {
            let len = s.slots.len();
            SentenceInput {
                slots: s
                    .slots
                    .into_iter()
                    .map(|slot| SlotInput::new(slot.variants, slot.newline))
                    .collect(),
                graph: Some(DependencyGraph::from_edges(len, &s.edges).unwrap()),
                groups: s.groups.into_iter().map(CoordinateGroup::new).collect(),
                filter: None,
            }
        })
        .collect();
    (Keyword::new(&fixture.keyword).unwrap(), fixture.width, sentences)
}

fn cat_slots() -> Vec<SentenceInput> {
    vec![SentenceInput::literal(vec![
        SlotInput::new(["C", "X"], false),
        SlotInput::new(["A", "Y"], false),
        SlotInput::new(["T", "Z"], false),
    ])]
}

fn sequential() -> ArrangeOptions {
    ArrangeOptions {
        parallel: false,
        ..ArrangeOptions::default()
    }
}

fn run(options: ArrangeOptions, keyword: &Keyword, width: usize, input: &[SentenceInput]) -> Vec<ArrangeResult> {
    let out = MemoryWriter::new();
    let summary = Arranger::new(width, options)
        .unwrap()
        .run(keyword, input, Box::new(out.clone()))
        .unwrap();
    let results = out.results();
    assert_eq!(summary.total, results.len());
    results
}

fn sorted(mut results: Vec<ArrangeResult>) -> Vec<ArrangeResult> {
    results.sort_by(|a, b| (a.candidate, &a.choices).cmp(&(b.candidate, &b.choices)));
    results
}

// ---------------------------------------------------------------------------
// Search scenarios
// ---------------------------------------------------------------------------

#[test]
fn cat_is_found_once_in_a_one_character_column() {
    let kw = Keyword::new("CAT").unwrap();
    let results = run(sequential(), &kw, 1, &cat_slots());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].grid.lines(), vec!["C", "A", "T"]);
    assert_eq!(results[0].variant_stack(), vec![0, 0, 0]);
}

#[test]
fn letter_outside_its_row_is_not_found() {
    // 'Z' exists, but only in the third slot; row 1 can only hold A or Y.
    let kw = Keyword::new("CZA").unwrap();
    let out = MemoryWriter::new();
    let summary = Arranger::new(1, sequential())
        .unwrap()
        .run(&kw, &cat_slots(), Box::new(out.clone()))
        .unwrap();
    assert!(!summary.discovered());
    assert!(out.results().is_empty());
    assert_eq!(out.log().footers, vec![(1, 0)]);
}

#[test]
fn last_slot_may_supply_the_last_letter() {
    let kw = Keyword::new("CAZ").unwrap();
    let results = run(sequential(), &kw, 1, &cat_slots());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].grid.lines(), vec!["C", "A", "Z"]);
}

// ---------------------------------------------------------------------------
// Ordering scenarios
// ---------------------------------------------------------------------------

#[test]
fn dependent_slot_precedes_its_head() {
    let graph = DependencyGraph::from_edges(3, &[(1, 0)]).unwrap();
    let orderings = generate_orderings(&graph, &[]).unwrap();
    assert!(!orderings.is_empty());
    for o in &orderings {
        let mut seen = o.as_slice().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(o.precedes(1, 0), "{:?} places 0 before 1", o);
    }
}

#[test]
fn coordinate_group_moves_as_a_block() {
    let graph = DependencyGraph::new(3);
    let orderings = generate_orderings(&graph, &[CoordinateGroup::new([1, 2])]).unwrap();
    let slices: Vec<&[usize]> = orderings.iter().map(|o| o.as_slice()).collect();
    assert!(slices.contains(&[0, 1, 2].as_slice()));
    assert!(slices.contains(&[0, 2, 1].as_slice()));
    for o in &orderings {
        let a = o.position_of(1).unwrap();
        let b = o.position_of(2).unwrap();
        assert_eq!(a.abs_diff(b), 1, "group split in {:?}", o);
    }
}

// ---------------------------------------------------------------------------
// Properties over a fixture
// ---------------------------------------------------------------------------

#[test]
fn fixture_results_respect_grid_invariants() {
    let (kw, width, input) = load_fixture("two_sentences.json");
    let arranger = Arranger::new(width, sequential()).unwrap();
    let candidates: Vec<_> = arranger.prepare(&kw, &input).unwrap().collect();
    let results = run(sequential(), &kw, width, &input);
    assert!(!results.is_empty());

    for r in &results {
        let candidate = &candidates[r.candidate - 1];
        assert_eq!(candidate.number(), r.candidate);

        // Rows never exceed the width.
        assert!(r.grid.rows().iter().all(|row| row.len() <= width));

        // Flattened rows are exactly the chosen variants in slot order.
        let written: String = r.grid.lines().concat();
        let chosen: String = candidate
            .slots()
            .iter()
            .zip(&r.choices)
            .map(|(s, c)| s.slot().variant_text(c.variant).unwrap())
            .collect();
        assert_eq!(written, chosen);

        // The keyword reads down one column from the first row.
        assert_eq!(r.keyword_start_row(kw.len()), 0);
        assert_eq!(r.vertical_reading(kw.len()), kw.to_string());
    }
}

#[test]
fn rows_wrap_at_width_and_break_at_newline_slots() {
    let (kw, width, input) = load_fixture("two_sentences.json");
    let options = ArrangeOptions {
        match_length: false,
        swap_sentences: true,
        ..sequential()
    };
    let arranger = Arranger::new(width, options.clone()).unwrap();
    let candidates: Vec<_> = arranger.prepare(&kw, &input).unwrap().collect();
    let results = run(options, &kw, width, &input);
    let mut broke = false;
    for r in &results {
        let candidate = &candidates[r.candidate - 1];
        let mut rows = vec![String::new()];
        let mut col = 0;
        for (s, c) in candidate.slots().iter().zip(&r.choices) {
            if s.newline() && col != 0 {
                rows.push(String::new());
                col = 0;
                broke = true;
            }
            for ch in s.slot().variant_text(c.variant).unwrap().chars() {
                if col == width {
                    rows.push(String::new());
                    col = 0;
                }
                rows.last_mut().unwrap().push(ch);
                col += 1;
            }
        }
        assert_eq!(r.grid.lines(), rows);
    }
    assert!(broke, "no result crossed a sentence break");
}

#[test]
fn eviction_does_not_change_results() {
    let (kw, width, input) = load_fixture("two_sentences.json");
    let loose = ArrangeOptions {
        match_length: false,
        eviction_threshold: None,
        ..sequential()
    };
    let kept = run(loose.clone(), &kw, width, &input);
    let evicted = run(
        ArrangeOptions {
            eviction_threshold: Some(1),
            ..loose.clone()
        },
        &kw,
        width,
        &input,
    );
    assert!(kept.len() > 1);
    assert_eq!(sorted(kept.clone()), sorted(evicted));

    let batched = run(
        ArrangeOptions {
            eviction_threshold: Some(3),
            output_each_candidate: false,
            ..loose
        },
        &kw,
        width,
        &input,
    );
    assert_eq!(sorted(kept), sorted(batched));
}

#[test]
fn parallel_search_finds_the_same_results() {
    let (kw, width, input) = load_fixture("two_sentences.json");
    for match_length in [true, false] {
        let base = ArrangeOptions {
            match_length,
            ..sequential()
        };
        let seq = run(base.clone(), &kw, width, &input);
        let par = run(
            ArrangeOptions {
                parallel: true,
                workers: Some(2),
                ..base
            },
            &kw,
            width,
            &input,
        );
        assert_eq!(sorted(seq), sorted(par));
    }
}

#[test]
fn swapping_sentences_adds_candidates() {
    let (kw, width, input) = load_fixture("two_sentences.json");
    let plain = Arranger::new(width, sequential()).unwrap();
    let swapped = Arranger::new(
        width,
        ArrangeOptions {
            swap_sentences: true,
            ..sequential()
        },
    )
    .unwrap();
    let n_plain = plain.prepare(&kw, &input).unwrap().count();
    let n_swapped = swapped.prepare(&kw, &input).unwrap().count();
    assert_eq!(n_swapped, 2 * n_plain);
    let first = plain.prepare(&kw, &input).unwrap().next().unwrap();
    assert_eq!(first.surface(), "いうあうあさいけうみ");
    let last = swapped.prepare(&kw, &input).unwrap().last().unwrap();
    assert_eq!(last.surface(), "いけあさうみ\nあういう");
}

#[test]
fn single_result_stops_the_run() {
    let (kw, width, input) = load_fixture("two_sentences.json");
    for parallel in [false, true] {
        let options = ArrangeOptions {
            single_result: true,
            match_length: false,
            parallel,
            workers: Some(2),
            ..ArrangeOptions::default()
        };
        let out = MemoryWriter::new();
        let summary = Arranger::new(width, options)
            .unwrap()
            .run(&kw, &input, Box::new(out.clone()))
            .unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(out.results().len(), 1);
    }
}

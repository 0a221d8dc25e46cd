// Order in which a slot's variants are tried at a node.

use acrostic_core::{PhraseSlot, Position};
use hashbrown::HashSet;

use super::state::KeywordState;

/// Variant indices to try for `slot` when its text starts at `start`.
///
/// While a keyword character is pending, variants holding it exactly at
/// the cell below the anchor come first, then the rest. With
/// `skip_same_length` each group keeps only the first variant of every
/// length. Otherwise all variants are tried in their given order.
pub(crate) fn trial_order(
    slot: &PhraseSlot,
    state: KeywordState,
    start: Position,
    width: usize,
    skip_same_length: bool,
) -> Vec<usize> {
    let KeywordState::Pending { anchor, next } = state else {
        return (0..slot.len()).collect();
    };
    let preferred = linear_offset(start, anchor.below(), width)
        .map(|offset| slot.positions().at(next, offset))
        .unwrap_or(&[]);

    let mut order = Vec::with_capacity(slot.len());
    let mut tried = vec![false; slot.len()];
    let mut lengths = HashSet::new();
    for &v in preferred {
        if !tried[v] && (!skip_same_length || lengths.insert(slot.variant_len(v))) {
            order.push(v);
        }
        tried[v] = true;
    }
    lengths.clear();
    for v in 0..slot.len() {
        if !tried[v] && (!skip_same_length || lengths.insert(slot.variant_len(v))) {
            order.push(v);
        }
    }
    order
}

/// Characters between `start` and `target` in row-major order.
fn linear_offset(start: Position, target: Position, width: usize) -> Option<usize> {
    let s = start.row * width + start.col;
    let t = target.row * width + target.col;
    t.checked_sub(s)
}

#[cfg(test)]
mod tests {
    use acrostic_core::Keyword;

    use super::*;

    #[test]
    fn idle_tries_everything_in_order() {
        let kw = Keyword::new("ab").unwrap();
        let slot = PhraseSlot::new(&["xx", "yy", "zzz"], false, &kw).unwrap();
        let order = trial_order(&slot, KeywordState::Idle, Position::new(0, 0), 4, true);
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn pending_prefers_variants_hitting_the_target() {
        let kw = Keyword::new("ab").unwrap();
        // Width 4, anchor (0, 1): target is (1, 1), three cells after (0, 2).
        let slot = PhraseSlot::new(&["xxxxx", "xxxbx", "b", "yyyby", "zzz"], false, &kw).unwrap();
        let state = KeywordState::Pending {
            anchor: Position::new(0, 1),
            next: 1,
        };
        let order = trial_order(&slot, state, Position::new(0, 2), 4, true);
        // 1 and 3 hold 'b' at offset 3 and share a length. Lengths are
        // counted afresh for the remaining variants.
        assert_eq!(order, vec![1, 0, 2, 4]);

        let all = trial_order(&slot, state, Position::new(0, 2), 4, false);
        assert_eq!(all, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn target_behind_start_has_no_preferred_variants() {
        assert_eq!(linear_offset(Position::new(1, 0), Position::new(0, 3), 4), None);
        assert_eq!(linear_offset(Position::new(0, 2), Position::new(1, 1), 4), Some(3));
    }
}

//! Property tests for play legality (pure domain, no I/O).
//!
//! Properties tested:
//! - A live draw penalty admits only stacked draw cards of the same kind
//! - Wilds are always legal when no penalty is pending
//! - A color match against the color in force is always legal
//! - Jump-in requires full attribute identity with the top card

use proptest::prelude::*;

use super::test_gens::{any_card, any_color, any_rules};
use crate::domain::cards::CardKind;
use crate::domain::rules::{can_play, is_jump_in};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_pending_draw_admits_only_matching_stacks(
        candidate in any_card(),
        top in any_card(),
        active in proptest::option::of(any_color()),
        pending in 1u8..=8,
        rules in any_rules(),
    ) {
        if can_play(&candidate, &top, active, pending, &rules) {
            prop_assert!(rules.stack_draw_cards, "stacking off means no play is legal");
            prop_assert!(candidate.is_draw_effect());
            prop_assert_eq!(candidate.kind, top.kind);
        }
    }

    #[test]
    fn prop_wilds_are_always_legal_without_a_penalty(
        top in any_card(),
        active in proptest::option::of(any_color()),
        rules in any_rules(),
    ) {
        for candidate in crate::domain::cards::canonical_deck() {
            if candidate.is_wild() {
                prop_assert!(can_play(&candidate, &top, active, 0, &rules));
            }
        }
    }

    #[test]
    fn prop_color_in_force_match_is_legal(
        candidate in any_card(),
        top in any_card(),
        rules in any_rules(),
    ) {
        prop_assume!(candidate.color.is_some());
        prop_assert!(can_play(&candidate, &top, candidate.color, 0, &rules));
    }

    #[test]
    fn prop_top_color_match_is_legal(
        candidate in any_card(),
        top in any_card(),
        rules in any_rules(),
    ) {
        prop_assume!(candidate.color.is_some());
        prop_assume!(candidate.color == top.color);
        prop_assert!(can_play(&candidate, &top, None, 0, &rules));
    }

    #[test]
    fn prop_jump_in_means_attribute_identity(
        candidate in any_card(),
        top in any_card(),
        rules in any_rules(),
    ) {
        if is_jump_in(&candidate, &top, &rules) {
            prop_assert!(rules.jump_in);
            prop_assert_eq!(candidate.kind, top.kind);
            prop_assert_eq!(candidate.color, top.color);
            prop_assert_eq!(candidate.value, top.value);
        }
    }

    #[test]
    fn prop_illegal_number_mismatch(
        candidate in any_card(),
        top in any_card(),
        rules in any_rules(),
    ) {
        prop_assume!(candidate.kind == CardKind::Number && top.kind == CardKind::Number);
        prop_assume!(candidate.color != top.color);
        prop_assume!(candidate.value != top.value);
        prop_assert!(!can_play(&candidate, &top, None, 0, &rules));
    }
}

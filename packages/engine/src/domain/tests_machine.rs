//! Unit tests for the turn state machine.

use super::machine::{choose_color, declare_low_hand, draw_card, pass, play_card, resolve_challenge, skip_inactive, PlayRequest};
use super::rules::HouseRules;
use super::state::{Awaiting, Phase};
use super::test_gens::{cfg, rig, Picker};
use crate::config::EngineConfig;
use crate::domain::cards::{CardKind, Color};
use crate::errors::{EngineError, MoveRejection};

fn assert_rejected(err: EngineError, want: MoveRejection) {
    match err {
        EngineError::Rejected { kind, .. } => assert_eq!(kind, want),
        other => panic!("expected rejection {want:?}, got {other}"),
    }
}

#[test]
fn matching_number_play_advances_turn() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let five = p.number(Color::Red, 5);
    let filler = p.number(Color::Blue, 1);
    let mut state = rig(
        vec![vec![five, p.number(Color::Green, 9)], vec![filler], vec![p.wild()]],
        top,
        p,
    );

    let out = play_card(&mut state, 0, PlayRequest::card(five.id), &HouseRules::default(), &cfg())
        .unwrap();
    assert_eq!(out.turn_after, Some(1));
    assert_eq!(state.piles.top_discard().unwrap().id, five.id);
    assert_eq!(state.hands[0].len(), 1);
    assert_eq!(state.last_mover, Some(0));
}

#[test]
fn illegal_play_is_an_atomic_no_op() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let off = p.number(Color::Blue, 7);
    let mut state = rig(
        vec![vec![off, p.number(Color::Green, 9)], vec![p.wild()]],
        top,
        p,
    );
    let before = state.clone();

    let err = play_card(&mut state, 0, PlayRequest::card(off.id), &HouseRules::default(), &cfg())
        .unwrap_err();
    assert_rejected(err, MoveRejection::IllegalCard);
    assert_eq!(state, before);
}

#[test]
fn out_of_turn_play_is_rejected_without_jump_in() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let dup = p.number(Color::Red, 3);
    let mut state = rig(vec![vec![p.number(Color::Red, 1)], vec![dup]], top, p);

    let err = play_card(&mut state, 1, PlayRequest::card(dup.id), &HouseRules::default(), &cfg())
        .unwrap_err();
    assert_rejected(err, MoveRejection::NotYourTurn);
}

#[test]
fn jump_in_takes_the_turn_on_an_exact_match() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let dup = p.number(Color::Red, 3);
    let mut state = rig(
        vec![
            vec![p.number(Color::Red, 1)],
            vec![p.number(Color::Blue, 2)],
            vec![dup, p.number(Color::Green, 4)],
        ],
        top,
        p,
    );
    let rules = HouseRules {
        jump_in: true,
        ..HouseRules::default()
    };

    let out = play_card(&mut state, 2, PlayRequest::card(dup.id), &rules, &cfg()).unwrap();
    // Turn continues from the jumper, not from the interrupted seat.
    assert_eq!(out.turn_after, Some(0));
    assert_eq!(state.hands[2].len(), 1);
}

#[test]
fn skip_passes_over_the_next_seat() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let skip = p.action(Color::Red, CardKind::Skip);
    let mut state = rig(
        vec![vec![skip, p.number(Color::Blue, 1)], vec![p.wild()], vec![p.wild()]],
        top,
        p,
    );

    let out = play_card(&mut state, 0, PlayRequest::card(skip.id), &HouseRules::default(), &cfg())
        .unwrap();
    assert_eq!(out.turn_after, Some(2));
}

#[test]
fn reverse_flips_direction() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let rev = p.action(Color::Red, CardKind::Reverse);
    let mut state = rig(
        vec![vec![rev, p.number(Color::Blue, 1)], vec![p.wild()], vec![p.wild()]],
        top,
        p,
    );

    let out = play_card(&mut state, 0, PlayRequest::card(rev.id), &HouseRules::default(), &cfg())
        .unwrap();
    assert_eq!(state.direction, -1);
    assert_eq!(out.turn_after, Some(2));
}

#[test]
fn reverse_heads_up_acts_as_a_skip() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let rev = p.action(Color::Red, CardKind::Reverse);
    let mut state = rig(vec![vec![rev, p.number(Color::Blue, 1)], vec![p.wild()]], top, p);

    let out = play_card(&mut state, 0, PlayRequest::card(rev.id), &HouseRules::default(), &cfg())
        .unwrap();
    // With two seats the player moves again immediately.
    assert_eq!(out.turn_after, Some(0));
}

#[test]
fn draw_two_stacks_and_forced_draw_collects_the_pile() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let d2_red = p.action(Color::Red, CardKind::DrawTwo);
    let d2_blue = p.action(Color::Blue, CardKind::DrawTwo);
    let mut state = rig(
        vec![
            vec![d2_red, p.number(Color::Blue, 1)],
            vec![d2_blue, p.number(Color::Green, 1)],
            vec![p.wild(), p.number(Color::Yellow, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(d2_red.id), &rules, &cfg()).unwrap();
    assert_eq!(state.pending_draw, 2);
    assert_eq!(state.turn, 1);

    // Stacking a matching draw card instead of drawing is legal.
    play_card(&mut state, 1, PlayRequest::card(d2_blue.id), &rules, &cfg()).unwrap();
    assert_eq!(state.pending_draw, 4);
    assert_eq!(state.turn, 2);

    // Seat 2 cannot stack; any other play is illegal while a penalty is live.
    let wild = state.hands[2][0];
    let err = play_card(&mut state, 2, PlayRequest::with_color(wild.id, Color::Red), &rules, &cfg())
        .unwrap_err();
    assert_rejected(err, MoveRejection::IllegalCard);

    let before = state.hands[2].len();
    let out = draw_card(&mut state, 2, &rules, &cfg()).unwrap();
    assert_eq!(state.hands[2].len(), before + 4);
    assert_eq!(state.pending_draw, 0);
    assert_eq!(out.turn_after, Some(0));
}

#[test]
fn draw_two_without_stacking_applies_immediately() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let d2 = p.action(Color::Red, CardKind::DrawTwo);
    let mut state = rig(
        vec![
            vec![d2, p.number(Color::Blue, 1)],
            vec![p.number(Color::Green, 1)],
            vec![p.number(Color::Yellow, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules {
        stack_draw_cards: false,
        ..HouseRules::default()
    };

    let out = play_card(&mut state, 0, PlayRequest::card(d2.id), &rules, &cfg()).unwrap();
    assert_eq!(state.pending_draw, 0);
    assert_eq!(state.hands[1].len(), 3);
    // Victim loses the turn as well.
    assert_eq!(out.turn_after, Some(2));
}

#[test]
fn wild_without_color_waits_for_the_choice() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let wild = p.wild();
    let mut state = rig(
        vec![vec![wild, p.number(Color::Blue, 1)], vec![p.number(Color::Green, 1)]],
        top,
        p,
    );
    let rules = HouseRules::default();

    let out = play_card(&mut state, 0, PlayRequest::card(wild.id), &rules, &cfg()).unwrap();
    assert_eq!(out.turn_after, Some(0));
    assert!(matches!(
        state.phase,
        Phase::InProgress {
            awaiting: Awaiting::ColorChoice { .. }
        }
    ));

    // Nobody else may act until the color lands.
    let other = state.hands[1][0];
    let err = play_card(&mut state, 1, PlayRequest::card(other.id), &rules, &cfg()).unwrap_err();
    assert_rejected(err, MoveRejection::PhaseMismatch);

    let out = choose_color(&mut state, 0, Color::Green, &rules, &cfg()).unwrap();
    assert_eq!(state.active_color, Some(Color::Green));
    assert_eq!(out.turn_after, Some(1));
}

#[test]
fn active_color_clears_on_the_next_colored_play() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let wild = p.wild();
    let green5 = p.number(Color::Green, 5);
    let mut state = rig(
        vec![
            vec![wild, p.number(Color::Blue, 1)],
            vec![green5, p.number(Color::Red, 8)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::with_color(wild.id, Color::Green), &rules, &cfg())
        .unwrap();
    assert_eq!(state.active_color, Some(Color::Green));

    play_card(&mut state, 1, PlayRequest::card(green5.id), &rules, &cfg()).unwrap();
    assert_eq!(state.active_color, None);
    assert_eq!(state.color_in_force(), Some(Color::Green));
}

#[test]
fn wild_draw_four_challenge_upheld_punishes_the_bluffer() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let w4 = p.wild_four();
    let red5 = p.number(Color::Red, 5);
    let mut state = rig(
        vec![vec![w4, red5], vec![p.number(Color::Green, 1)], vec![p.wild()]],
        top,
        p,
    );
    state.declared[0] = true;
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::with_color(w4.id, Color::Blue), &rules, &cfg()).unwrap();
    assert!(matches!(
        state.phase,
        Phase::InProgress {
            awaiting: Awaiting::ChallengeDecision { challenger: 1, .. }
        }
    ));
    assert_eq!(state.pending_draw, 4);

    // Seat 0 still held red against a red top: bluff stands exposed.
    let out = resolve_challenge(&mut state, 1, true, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 5);
    assert_eq!(state.hands[1].len(), 1);
    assert_eq!(state.pending_draw, 0);
    assert_eq!(out.turn_after, Some(1));
}

#[test]
fn wild_draw_four_challenge_failed_costs_extra() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let w4 = p.wild_four();
    let mut state = rig(
        vec![
            vec![w4, p.number(Color::Green, 5)],
            vec![p.number(Color::Green, 1)],
            vec![p.wild()],
        ],
        top,
        p,
    );
    state.declared[0] = true;
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::with_color(w4.id, Color::Blue), &rules, &cfg()).unwrap();
    let out = resolve_challenge(&mut state, 1, true, &cfg()).unwrap();
    // Four pending plus the two-card challenge loss.
    assert_eq!(state.hands[1].len(), 7);
    assert_eq!(out.turn_after, Some(2));
}

#[test]
fn declining_the_challenge_just_draws() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let w4 = p.wild_four();
    let mut state = rig(
        vec![
            vec![w4, p.number(Color::Green, 5)],
            vec![p.number(Color::Green, 1)],
            vec![p.wild()],
        ],
        top,
        p,
    );
    state.declared[0] = true;
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::with_color(w4.id, Color::Blue), &rules, &cfg()).unwrap();
    let out = resolve_challenge(&mut state, 1, false, &cfg()).unwrap();
    assert_eq!(state.hands[1].len(), 5);
    assert_eq!(out.turn_after, Some(2));
}

#[test]
fn no_bluffing_blocks_a_wild_four_with_a_color_match() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let w4 = p.wild_four();
    let red5 = p.number(Color::Red, 5);
    let mut state = rig(vec![vec![w4, red5], vec![p.number(Color::Green, 1)]], top, p);
    let rules = HouseRules {
        no_bluffing: true,
        ..HouseRules::default()
    };

    let err = play_card(&mut state, 0, PlayRequest::with_color(w4.id, Color::Blue), &rules, &cfg())
        .unwrap_err();
    assert_rejected(err, MoveRejection::BluffDisallowed);
}

#[test]
fn seven_swap_requires_and_uses_a_target() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let seven = p.number(Color::Red, 7);
    let blue1 = p.number(Color::Blue, 1);
    let green2 = p.number(Color::Green, 2);
    let mut state = rig(
        vec![vec![seven, blue1], vec![green2], vec![p.wild()]],
        top,
        p,
    );
    let rules = HouseRules {
        seven_swap: true,
        ..HouseRules::default()
    };

    let err = play_card(&mut state, 0, PlayRequest::card(seven.id), &rules, &cfg()).unwrap_err();
    assert_rejected(err, MoveRejection::SwapTargetRequired);

    let req = PlayRequest {
        card: seven.id,
        chosen_color: None,
        swap_target: Some(1),
    };
    play_card(&mut state, 0, req, &rules, &cfg()).unwrap();
    // Hands exchanged after the seven left seat 0's hand.
    assert_eq!(state.hands[0], vec![green2]);
    assert_eq!(state.hands[1], vec![blue1]);
}

#[test]
fn zero_rotate_shifts_every_hand_one_seat() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let zero = p.number(Color::Red, 0);
    let blue1 = p.number(Color::Blue, 1);
    let green2 = p.number(Color::Green, 2);
    let yellow4 = p.number(Color::Yellow, 4);
    let mut state = rig(
        vec![vec![zero, blue1], vec![green2], vec![yellow4]],
        top,
        p,
    );
    let rules = HouseRules {
        zero_rotate: true,
        ..HouseRules::default()
    };

    play_card(&mut state, 0, PlayRequest::card(zero.id), &rules, &cfg()).unwrap();
    assert_eq!(state.hands[0], vec![yellow4]);
    assert_eq!(state.hands[1], vec![blue1]);
    assert_eq!(state.hands[2], vec![green2]);
}

#[test]
fn voluntary_draw_offers_a_playable_card() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red9 = p.number(Color::Red, 9);
    let mut state = rig(
        vec![vec![p.number(Color::Blue, 1)], vec![p.number(Color::Green, 1)]],
        top,
        p,
    );
    // Plant a playable card on top of the draw pile.
    state.piles.draw.push(red9);
    let rules = HouseRules::default();

    let out = draw_card(&mut state, 0, &rules, &cfg()).unwrap();
    assert_eq!(out.turn_after, Some(0));
    assert!(matches!(
        state.phase,
        Phase::InProgress {
            awaiting: Awaiting::DrawOrPlay { drawn } } if drawn == red9.id
    ));

    // Only the drawn card may be played now.
    let held = state.hands[0][0];
    let err = play_card(&mut state, 0, PlayRequest::card(held.id), &rules, &cfg()).unwrap_err();
    assert_rejected(err, MoveRejection::IllegalCard);

    let out = play_card(&mut state, 0, PlayRequest::card(red9.id), &rules, &cfg()).unwrap();
    assert_eq!(out.turn_after, Some(1));
}

#[test]
fn pass_after_voluntary_draw_moves_on() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red9 = p.number(Color::Red, 9);
    let mut state = rig(
        vec![vec![p.number(Color::Blue, 1)], vec![p.number(Color::Green, 1)]],
        top,
        p,
    );
    state.piles.draw.push(red9);
    let rules = HouseRules::default();

    draw_card(&mut state, 0, &rules, &cfg()).unwrap();
    let out = pass(&mut state, 0).unwrap();
    assert_eq!(out.turn_after, Some(1));
    assert_eq!(state.hands[0].len(), 2);

    // Passing with no draw pending is a phase error.
    let err = pass(&mut state, 1).unwrap_err();
    assert_rejected(err, MoveRejection::PhaseMismatch);
}

#[test]
fn unplayable_voluntary_draw_passes_the_turn() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let blue8 = p.number(Color::Blue, 8);
    let mut state = rig(
        vec![vec![p.number(Color::Blue, 1)], vec![p.number(Color::Green, 1)]],
        top,
        p,
    );
    state.piles.draw.push(blue8);

    let out = draw_card(&mut state, 0, &HouseRules::default(), &cfg()).unwrap();
    assert_eq!(out.turn_after, Some(1));
    assert_eq!(state.hands[0].len(), 2);
}

#[test]
fn missed_declaration_draws_a_penalty_on_the_next_move() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let mut state = rig(
        vec![
            vec![red5, p.number(Color::Blue, 1)],
            vec![p.number(Color::Green, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(red5.id), &rules, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 1);

    // Seat 1 moves before seat 0 declared: two-card penalty lands.
    draw_card(&mut state, 1, &rules, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 3);
    assert!(!state.declared[0]);
}

#[test]
fn missed_declaration_is_collected_at_the_challenge_decision() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let w4 = p.wild_four();
    let mut state = rig(
        vec![
            vec![w4, p.number(Color::Green, 5)],
            vec![p.number(Color::Green, 1)],
            vec![p.number(Color::Yellow, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    // Seat 0 plays down to one undeclared card.
    play_card(&mut state, 0, PlayRequest::with_color(w4.id, Color::Blue), &rules, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 1);

    // The challenger's decision is the next applied move: the penalty
    // lands even though no play or draw happened in between.
    resolve_challenge(&mut state, 1, false, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 3);
    assert_eq!(state.hands[1].len(), 5);
}

#[test]
fn missed_declaration_is_collected_by_an_inactivity_skip() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let mut state = rig(
        vec![
            vec![red5, p.number(Color::Blue, 1)],
            vec![p.number(Color::Green, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(red5.id), &rules, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 1);

    // Seat 1 idles out; the skip still collects seat 0's penalty.
    skip_inactive(&mut state, 1, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 3);
}

#[test]
fn challenge_verdict_ignores_penalty_cards() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let w4 = p.wild_four();
    let green5 = p.number(Color::Green, 5);
    let red8 = p.number(Color::Red, 8);
    let red9 = p.number(Color::Red, 9);
    let mut state = rig(
        vec![
            vec![w4, green5],
            vec![p.number(Color::Green, 1)],
            vec![p.number(Color::Yellow, 1)],
        ],
        top,
        p,
    );
    // Make sure the penalty draw hands seat 0 red cards.
    state.piles.draw.push(red8);
    state.piles.draw.push(red9);
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::with_color(w4.id, Color::Blue), &rules, &cfg()).unwrap();
    // The four was honest when played; penalty cards drawn since must
    // not turn the verdict. A failed challenge costs seat 1 the four
    // plus the loss penalty.
    let out = resolve_challenge(&mut state, 1, true, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 3, "only the declaration penalty landed");
    assert_eq!(state.hands[1].len(), 7);
    assert_eq!(out.turn_after, Some(2));
}

#[test]
fn timely_declaration_avoids_the_penalty() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let mut state = rig(
        vec![
            vec![red5, p.number(Color::Blue, 1)],
            vec![p.number(Color::Green, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(red5.id), &rules, &cfg()).unwrap();
    declare_low_hand(&mut state, 0).unwrap();
    draw_card(&mut state, 1, &rules, &cfg()).unwrap();
    assert_eq!(state.hands[0].len(), 1);
}

#[test]
fn declaring_with_a_big_hand_is_rejected() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let mut state = rig(
        vec![
            vec![p.number(Color::Red, 5), p.number(Color::Blue, 1)],
            vec![p.number(Color::Green, 1)],
        ],
        top,
        p,
    );

    let err = declare_low_hand(&mut state, 0).unwrap_err();
    assert_rejected(err, MoveRejection::NotLowHand);
}

#[test]
fn drawing_back_up_resets_the_declaration() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let mut state = rig(
        vec![
            vec![red5, p.number(Color::Blue, 1)],
            vec![p.number(Color::Green, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(red5.id), &rules, &cfg()).unwrap();
    declare_low_hand(&mut state, 0).unwrap();
    assert!(state.declared[0]);

    draw_card(&mut state, 1, &rules, &cfg()).unwrap();
    // Seat 0 is back to a full hand via... no penalty fired, so still 1.
    assert_eq!(state.hands[0].len(), 1);

    // Seat 0 draws voluntarily on their turn; the declaration lapses.
    state.turn = 0;
    state.phase = Phase::InProgress {
        awaiting: Awaiting::Move,
    };
    draw_card(&mut state, 0, &rules, &cfg()).unwrap();
    assert!(!state.declared[0]);
}

#[test]
fn emptying_the_hand_ends_the_round_with_the_award() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let skip = p.action(Color::Blue, CardKind::Skip);
    let two = p.number(Color::Yellow, 2);
    let wild = p.wild();
    let mut state = rig(vec![vec![red5], vec![skip, two], vec![wild]], top, p);
    state.declared[0] = true;
    let rules = HouseRules::default();

    let out = play_card(&mut state, 0, PlayRequest::card(red5.id), &rules, &cfg()).unwrap();
    let end = out.round_end.unwrap();
    assert_eq!(end.winner, 0);
    assert_eq!(end.points_awarded, 20 + 2 + 50);
    assert!(!end.game_over);
    assert_eq!(out.turn_after, None);
    assert!(matches!(state.phase, Phase::RoundEnded { winner: 0 }));
    assert_eq!(state.scores_total[0], 72);
}

#[test]
fn going_out_on_a_wild_four_scores_the_penalty_cards() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let w4 = p.wild_four();
    let green1 = p.number(Color::Green, 1);
    let wild = p.wild();
    let blue1 = p.number(Color::Blue, 1);
    let green2 = p.number(Color::Green, 2);
    let yellow3 = p.number(Color::Yellow, 3);
    let red4 = p.number(Color::Red, 4);
    let mut state = rig(vec![vec![w4], vec![green1], vec![wild]], top, p);
    state.declared[0] = true;
    // The four penalty cards seat 1 will draw.
    state.piles.draw.extend([blue1, green2, yellow3, red4]);
    let rules = HouseRules::default();

    let out = play_card(&mut state, 0, PlayRequest::with_color(w4.id, Color::Blue), &rules, &cfg())
        .unwrap();
    let end = out.round_end.unwrap();
    // No challenge window on a winning four; the victim draws and the
    // cards count into the award.
    assert_eq!(state.hands[1].len(), 5);
    assert_eq!(state.pending_draw, 0);
    assert_eq!(end.points_awarded, 1 + (1 + 2 + 3 + 4) + 50);
    assert!(matches!(state.phase, Phase::RoundEnded { winner: 0 }));
}

#[test]
fn going_out_on_a_stacked_draw_two_scores_the_penalty_cards() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let d2 = p.action(Color::Red, CardKind::DrawTwo);
    let green1 = p.number(Color::Green, 1);
    let blue7 = p.number(Color::Blue, 7);
    let yellow9 = p.number(Color::Yellow, 9);
    let mut state = rig(vec![vec![d2], vec![green1]], top, p);
    state.declared[0] = true;
    state.piles.draw.extend([blue7, yellow9]);
    let rules = HouseRules::default();

    let out = play_card(&mut state, 0, PlayRequest::card(d2.id), &rules, &cfg()).unwrap();
    let end = out.round_end.unwrap();
    assert_eq!(state.hands[1].len(), 3);
    assert_eq!(end.points_awarded, 1 + 7 + 9);
}

#[test]
fn reaching_the_winning_score_ends_the_game() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let wild = p.wild();
    let mut state = rig(vec![vec![red5], vec![wild]], top, p);
    state.declared[0] = true;
    state.scores_total[0] = 460;
    let config = EngineConfig {
        winning_score: 500,
        ..EngineConfig::default()
    };

    let out = play_card(&mut state, 0, PlayRequest::card(red5.id), &HouseRules::default(), &config)
        .unwrap();
    let end = out.round_end.unwrap();
    assert!(end.game_over);
    assert!(matches!(state.phase, Phase::GameEnded { winner: 0 }));
    assert_eq!(state.scores_total[0], 510);
}

#[test]
fn single_round_mode_never_flags_game_over() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let wild = p.wild();
    let mut state = rig(vec![vec![red5], vec![wild]], top, p);
    state.declared[0] = true;
    state.scores_total[0] = 10_000;
    let config = EngineConfig {
        winning_score: 0,
        ..EngineConfig::default()
    };

    let out = play_card(&mut state, 0, PlayRequest::card(red5.id), &HouseRules::default(), &config)
        .unwrap();
    assert!(!out.round_end.unwrap().game_over);
}

#[test]
fn skip_inactive_collects_the_pending_penalty() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let d2 = p.action(Color::Red, CardKind::DrawTwo);
    let mut state = rig(
        vec![
            vec![d2, p.number(Color::Blue, 1)],
            vec![p.number(Color::Green, 1)],
            vec![p.wild()],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(d2.id), &rules, &cfg()).unwrap();
    assert_eq!(state.pending_draw, 2);

    let out = skip_inactive(&mut state, 1, &cfg()).unwrap();
    assert_eq!(state.hands[1].len(), 3);
    assert_eq!(state.pending_draw, 0);
    assert_eq!(out.turn_after, Some(2));
}

#[test]
fn skip_inactive_resolves_an_abandoned_color_choice() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let wild = p.wild();
    let mut state = rig(
        vec![
            vec![wild, p.number(Color::Green, 1), p.number(Color::Green, 2)],
            vec![p.number(Color::Blue, 1)],
        ],
        top,
        p,
    );
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(wild.id), &rules, &cfg()).unwrap();
    let out = skip_inactive(&mut state, 0, &cfg()).unwrap();
    // The hand is mostly green, so green carries on.
    assert_eq!(state.active_color, Some(Color::Green));
    assert_eq!(out.turn_after, Some(1));
}

#[test]
fn moves_after_round_end_are_rejected() {
    let mut p = Picker::new();
    let top = p.number(Color::Red, 3);
    let red5 = p.number(Color::Red, 5);
    let green1 = p.number(Color::Green, 1);
    let mut state = rig(vec![vec![red5], vec![green1]], top, p);
    state.declared[0] = true;
    let rules = HouseRules::default();

    play_card(&mut state, 0, PlayRequest::card(red5.id), &rules, &cfg()).unwrap();
    let err = draw_card(&mut state, 1, &rules, &cfg()).unwrap_err();
    assert_rejected(err, MoveRejection::PhaseMismatch);
}

use std::cmp::Ordering;

use fairdeal_engine::cards::{full_deck, Card};
use fairdeal_engine::errors::HandError;
use fairdeal_engine::hand::{best_hand, compare_hands, evaluate, HandCategory};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn cards(codes: &[&str]) -> Vec<Card> {
    codes.iter().map(|c| c.parse().expect("card code")).collect()
}

fn category(codes: &[&str]) -> HandCategory {
    evaluate(&cards(codes)).expect("valid hand").category
}

#[test]
fn royal_flush_in_seven_cards() {
    let hand = cards(&["Ah", "Kh", "Qh", "Jh", "Th", "2c", "3d"]);
    let (strength, five) = best_hand(&hand).unwrap();
    assert_eq!(strength.category, HandCategory::RoyalFlush);
    assert!(five.iter().all(|c| c.code().ends_with('h')));
}

#[test]
fn wheel_is_a_five_high_straight() {
    let s = evaluate(&cards(&["As", "2d", "3c", "4h", "5s", "9c", "Kd"])).unwrap();
    assert_eq!(s.category, HandCategory::Straight);
    assert_eq!(s.tiebreakers, vec![5]);
    let six_high = evaluate(&cards(&["2d", "3c", "4h", "5s", "6c"])).unwrap();
    assert_eq!(compare_hands(&six_high, &s), Ordering::Greater);
}

#[test]
fn steel_wheel_is_a_straight_flush() {
    assert_eq!(
        category(&["Ad", "2d", "3d", "4d", "5d", "Kc", "Kh"]),
        HandCategory::StraightFlush
    );
}

#[test]
fn four_of_a_kind_uses_best_kicker() {
    let s = evaluate(&cards(&["9c", "9d", "9h", "9s", "2c", "Kd", "Qh"])).unwrap();
    assert_eq!(s.category, HandCategory::FourOfAKind);
    assert_eq!(s.tiebreakers, vec![9, 13]);
}

#[test]
fn every_category_is_recognised() {
    let table = [
        (vec!["2c", "5d", "9h", "Js", "Kc", "3d", "7h"], HandCategory::HighCard),
        (vec!["2c", "2d", "9h", "Js", "Kc", "3d", "7h"], HandCategory::OnePair),
        (vec!["2c", "2d", "9h", "9s", "Kc", "3d", "7h"], HandCategory::TwoPair),
        (vec!["2c", "2d", "2h", "9s", "Kc", "3d", "7h"], HandCategory::ThreeOfAKind),
        (vec!["5c", "6d", "7h", "8s", "9c", "2d", "Kh"], HandCategory::Straight),
        (vec!["2h", "6h", "9h", "Jh", "Kh", "3d", "7c"], HandCategory::Flush),
        (vec!["2c", "2d", "2h", "9s", "9c", "3d", "7h"], HandCategory::FullHouse),
    ];
    for (codes, expected) in table {
        assert_eq!(category(&codes), expected, "{:?}", codes);
    }
}

#[test]
fn two_trips_make_the_higher_full_house() {
    let s = evaluate(&cards(&["Kc", "Kd", "Kh", "2s", "2c", "2d", "7h"])).unwrap();
    assert_eq!(s.category, HandCategory::FullHouse);
    assert_eq!(s.tiebreakers, vec![13, 2]);
    assert_eq!(s.describe(), "Full House, Kings full of Twos");
}

#[test]
fn kickers_break_ties_and_equal_hands_tie() {
    let a = evaluate(&cards(&["Ac", "Ad", "Kh", "9s", "4c"])).unwrap();
    let b = evaluate(&cards(&["Ah", "As", "Qh", "9d", "4d"])).unwrap();
    assert_eq!(compare_hands(&a, &b), Ordering::Greater);

    let c = evaluate(&cards(&["Ah", "As", "Kd", "9d", "4d"])).unwrap();
    assert_eq!(compare_hands(&a, &c), Ordering::Equal);
}

#[test]
fn wrong_card_counts_and_duplicates_are_rejected() {
    assert_eq!(
        evaluate(&cards(&["Ac", "Ad", "Kh", "9s"])),
        Err(HandError::InvalidCardCount(4))
    );
    assert!(matches!(
        evaluate(&cards(&["Ac", "Ac", "Kh", "9s", "2d"])),
        Err(HandError::DuplicateCard(_))
    ));
}

#[test]
fn ordering_is_consistent_over_random_hands() {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let mut strengths = Vec::new();
    for _ in 0..40 {
        let mut deck = full_deck();
        deck.shuffle(&mut rng);
        strengths.push(evaluate(&deck[..7]).unwrap());
    }
    for a in &strengths {
        for b in &strengths {
            assert_eq!(compare_hands(a, b), compare_hands(b, a).reverse());
            for c in &strengths {
                if compare_hands(a, b) != Ordering::Less && compare_hands(b, c) != Ordering::Less {
                    assert_ne!(compare_hands(a, c), Ordering::Less);
                }
            }
        }
    }
}

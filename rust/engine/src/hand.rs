use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};
use crate::errors::HandError;

/// Hand categories, weakest first. The derived ordering is the ranking.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl HandCategory {
    pub fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category plus tiebreaker ranks, compared lexicographically in that order.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: HandCategory,
    // ordered high -> low; layout is fixed per category
    pub tiebreakers: Vec<u8>,
}

impl HandStrength {
    /// Human-readable description, e.g. "Full House, Kings full of Twos".
    pub fn describe(&self) -> String {
        let r = |i: usize| {
            self.tiebreakers
                .get(i)
                .copied()
                .and_then(Rank::from_value)
                .unwrap_or(Rank::Two)
        };
        match self.category {
            HandCategory::HighCard => format!("High Card, {}", r(0).name()),
            HandCategory::OnePair => format!("Pair of {}", r(0).plural()),
            HandCategory::TwoPair => {
                format!("Two Pair, {} and {}", r(0).plural(), r(1).plural())
            }
            HandCategory::ThreeOfAKind => format!("Three of a Kind, {}", r(0).plural()),
            HandCategory::Straight => format!("Straight, {} high", r(0).name()),
            HandCategory::Flush => format!("Flush, {} high", r(0).name()),
            HandCategory::FullHouse => {
                format!("Full House, {} full of {}", r(0).plural(), r(1).plural())
            }
            HandCategory::FourOfAKind => format!("Four of a Kind, {}", r(0).plural()),
            HandCategory::StraightFlush => format!("Straight Flush, {} high", r(0).name()),
            HandCategory::RoyalFlush => "Royal Flush".to_string(),
        }
    }
}

/// Evaluates 5, 6 or 7 cards.
///
/// Five cards are ranked directly. Six or seven cards are ranked by trying
/// every 5-card subset and keeping the strongest.
///
/// ```
/// use fairdeal_engine::cards::Card;
/// use fairdeal_engine::hand::{evaluate, HandCategory};
///
/// let cards: Vec<Card> = ["As", "Ks", "Qs", "Js", "Ts"]
///     .iter()
///     .map(|c| c.parse().unwrap())
///     .collect();
/// assert_eq!(evaluate(&cards).unwrap().category, HandCategory::RoyalFlush);
/// ```
pub fn evaluate(cards: &[Card]) -> Result<HandStrength, HandError> {
    best_hand(cards).map(|(strength, _)| strength)
}

/// Like [`evaluate`] but also returns the five cards that make the hand.
pub fn best_hand(cards: &[Card]) -> Result<(HandStrength, Vec<Card>), HandError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(HandError::InvalidCardCount(cards.len()));
    }
    let mut seen = HashSet::with_capacity(cards.len());
    for c in cards {
        if !seen.insert(*c) {
            return Err(HandError::DuplicateCard(c.to_string()));
        }
    }

    let n = cards.len();
    let mut best: Option<(HandStrength, [Card; 5])> = None;
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let strength = evaluate_five(&five);
                        let better = match &best {
                            Some((current, _)) => strength > *current,
                            None => true,
                        };
                        if better {
                            best = Some((strength, five));
                        }
                    }
                }
            }
        }
    }
    // n >= 5 guarantees at least one subset
    let (strength, five) = best.ok_or(HandError::InvalidCardCount(n))?;
    Ok((strength, five.to_vec()))
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.tiebreakers.cmp(&b.tiebreakers),
        ord => ord,
    }
}

fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut rank_mask: u16 = 0;
    let first_suit = cards[0].suit;
    let mut flush = true;
    for c in cards.iter() {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        rank_mask |= 1u16 << r;
        flush &= c.suit == first_suit;
    }

    let straight_high = if rank_mask.count_ones() == 5 {
        straight_high_from_mask(rank_mask)
    } else {
        None
    };

    if let (true, Some(high)) = (flush, straight_high) {
        let category = if high == 14 {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
        return HandStrength {
            category,
            tiebreakers: vec![high],
        };
    }

    // (count, rank) groups, biggest group first, then higher rank first
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (rank_counts[r as usize], r))
        .collect();
    groups.sort_by(|a, b| b.cmp(a));
    let ranks_in_order: Vec<u8> = groups.iter().map(|&(_, r)| r).collect();
    let shape: Vec<u8> = groups.iter().map(|&(n, _)| n).collect();

    let category = match shape.as_slice() {
        [4, 1] => HandCategory::FourOfAKind,
        [3, 2] => HandCategory::FullHouse,
        _ if flush => HandCategory::Flush,
        _ if straight_high.is_some() => {
            return HandStrength {
                category: HandCategory::Straight,
                tiebreakers: straight_high.into_iter().collect(),
            };
        }
        [3, 1, 1] => HandCategory::ThreeOfAKind,
        [2, 2, 1] => HandCategory::TwoPair,
        [2, 1, 1, 1] => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    };
    HandStrength {
        category,
        tiebreakers: ranks_in_order,
    }
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    // Treat Ace as 14 and optionally as 1
    let mut m = mask;
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    // Sliding 5-bit window from Ace(14) down to 5
    for high in (5..=14u8).rev() {
        let window = 0b11111u16 << (high - 4);
        if (m & window) == window {
            return Some(high);
        }
    }
    None
}

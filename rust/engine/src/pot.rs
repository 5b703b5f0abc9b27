//! Pot construction and settlement.
//!
//! Contributions are the chips each seat put in over the whole hand. Every
//! distinct contribution level carves one pot; only seats that are still in
//! the hand and reached that level can win it.

use serde::{Deserialize, Serialize};

/// One seat's stake in the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub seat: usize,
    pub amount: u32,
    /// False once the seat has folded
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u32,
    /// Seats that may win this pot, ascending
    pub eligible_seats: Vec<usize>,
}

/// Splits contributions into a main pot followed by side pots.
///
/// The sum of the returned pot amounts always equals the sum of the
/// contributions. Chips from a level nobody live reached (folded money above
/// every live stake) are folded into the previous pot.
pub fn build_pots(contributions: &[Contribution]) -> Vec<SidePot> {
    let mut levels: Vec<u32> = contributions
        .iter()
        .filter(|c| c.amount > 0)
        .map(|c| c.amount)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<SidePot> = Vec::new();
    let mut carry = 0u32;
    let mut prev = 0u32;
    for level in levels {
        let slice = level - prev;
        let contributors: Vec<&Contribution> =
            contributions.iter().filter(|c| c.amount >= level).collect();
        let amount = slice * contributors.len() as u32 + carry;
        carry = 0;
        prev = level;

        let mut eligible: Vec<usize> = contributors
            .iter()
            .filter(|c| c.live)
            .map(|c| c.seat)
            .collect();
        eligible.sort_unstable();

        if eligible.is_empty() {
            match pots.last_mut() {
                Some(last) => last.amount += amount,
                None => carry = amount,
            }
            continue;
        }
        match pots.last_mut() {
            Some(last) if last.eligible_seats == eligible => last.amount += amount,
            _ => pots.push(SidePot {
                amount,
                eligible_seats: eligible,
            }),
        }
    }
    if carry > 0 {
        if let Some(last) = pots.last_mut() {
            last.amount += carry;
        }
    }
    pots
}

/// Divides `amount` among `winners` (seat order); the odd chips go one at a
/// time to the earliest seats.
pub fn split_amount(amount: u32, winners: &[usize]) -> Vec<(usize, u32)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let mut seats = winners.to_vec();
    seats.sort_unstable();
    let n = seats.len() as u32;
    let share = amount / n;
    let mut remainder = amount % n;
    seats
        .into_iter()
        .map(|seat| {
            let mut amt = share;
            if remainder > 0 {
                amt += 1;
                remainder -= 1;
            }
            (seat, amt)
        })
        .collect()
}

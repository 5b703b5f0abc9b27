use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{cards_to_string, Card};

/// Chat-platform user identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a player action during a betting round.
/// Actions can involve betting amounts or no-cost moves like check/fold.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (no bet, only valid if no bet to call)
    Check,
    /// Call the current bet
    Call,
    /// Open the betting with the specified amount
    Bet(u32),
    /// Raise the current bet by the specified amount
    Raise(u32),
    /// Bet all remaining chips
    AllIn,
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Fold => write!(f, "fold"),
            PlayerAction::Check => write!(f, "check"),
            PlayerAction::Call => write!(f, "call"),
            PlayerAction::Bet(n) => write!(f, "bet {}", n),
            PlayerAction::Raise(n) => write!(f, "raise {}", n),
            PlayerAction::AllIn => write!(f, "all-in"),
        }
    }
}

/// What a player last did, with the chips actually moved.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum LastAction {
    SmallBlind(u32),
    BigBlind(u32),
    Fold,
    Check,
    Call(u32),
    Bet(u32),
    Raise(u32),
    AllIn(u32),
}

/// Per-seat state for one table.
///
/// Every wager primitive caps the requested amount at the remaining stack,
/// so `stack` can never go negative; hitting the cap marks the player all-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    user_id: UserId,
    name: String,
    stack: u32,
    hole: Vec<Card>,
    /// Chips put in during the current betting round
    current_bet: u32,
    /// Chips put in during the whole hand
    total_bet: u32,
    /// Still contesting the pot
    is_active: bool,
    is_all_in: bool,
    has_acted: bool,
    last_action: Option<LastAction>,
    seat: usize,
}

impl Player {
    pub fn new(user_id: UserId, name: impl Into<String>, stack: u32, seat: usize) -> Self {
        Self {
            user_id,
            name: name.into(),
            stack,
            hole: Vec::with_capacity(2),
            current_bet: 0,
            total_bet: 0,
            is_active: true,
            is_all_in: false,
            has_acted: false,
            last_action: None,
            seat,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn stack(&self) -> u32 {
        self.stack
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn total_bet(&self) -> u32 {
        self.total_bet
    }
    pub fn is_active(&self) -> bool {
        self.is_active
    }
    pub fn is_all_in(&self) -> bool {
        self.is_all_in
    }
    pub fn has_acted(&self) -> bool {
        self.has_acted
    }
    pub fn last_action(&self) -> Option<LastAction> {
        self.last_action
    }
    pub fn seat(&self) -> usize {
        self.seat
    }

    /// Active and not all-in: the player still has decisions to make.
    pub fn can_act(&self) -> bool {
        self.is_active && !self.is_all_in
    }

    pub fn hole_cards(&self) -> &[Card] {
        &self.hole
    }

    pub fn hole_cards_string(&self) -> String {
        cards_to_string(&self.hole)
    }

    pub fn set_hole_cards(&mut self, cards: Vec<Card>) {
        self.hole = cards;
    }

    pub fn add_chips(&mut self, amount: u32) {
        self.stack = self.stack.saturating_add(amount);
    }

    /// Takes the remaining stack off the table (refund or cash-out).
    pub fn take_stack(&mut self) -> u32 {
        std::mem::take(&mut self.stack)
    }

    pub fn bet(&mut self, amount: u32) -> u32 {
        let moved = self.commit(amount);
        self.has_acted = true;
        self.last_action = Some(self.nominal_or_all_in(LastAction::Bet(moved), moved));
        moved
    }

    pub fn call(&mut self, amount_to_call: u32) -> u32 {
        let moved = self.commit(amount_to_call);
        self.has_acted = true;
        self.last_action = Some(self.nominal_or_all_in(LastAction::Call(moved), moved));
        moved
    }

    /// Calls `amount_to_call` and puts in `raise_amount` on top of it.
    pub fn raise(&mut self, raise_amount: u32, amount_to_call: u32) -> u32 {
        let moved = self.commit(amount_to_call.saturating_add(raise_amount));
        self.has_acted = true;
        let nominal = LastAction::Raise(moved.saturating_sub(amount_to_call));
        self.last_action = Some(self.nominal_or_all_in(nominal, moved));
        moved
    }

    pub fn all_in(&mut self) -> u32 {
        let moved = self.commit(self.stack);
        self.has_acted = true;
        self.last_action = Some(LastAction::AllIn(moved));
        moved
    }

    /// Forced bet; does not count as acting, so the blind keeps its option.
    pub fn post_blind(&mut self, amount: u32, big: bool) -> u32 {
        let moved = self.commit(amount);
        self.last_action = Some(if big {
            LastAction::BigBlind(moved)
        } else {
            LastAction::SmallBlind(moved)
        });
        moved
    }

    pub fn fold(&mut self) {
        self.is_active = false;
        self.has_acted = true;
        self.last_action = Some(LastAction::Fold);
    }

    pub fn check(&mut self) {
        self.has_acted = true;
        self.last_action = Some(LastAction::Check);
    }

    /// Seat with no chips does not take part in the hand.
    pub fn sit_out(&mut self) {
        self.is_active = false;
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hole.clear();
        self.current_bet = 0;
        self.total_bet = 0;
        self.is_active = true;
        self.is_all_in = false;
        self.has_acted = false;
        self.last_action = None;
    }

    pub fn reset_for_new_round(&mut self) {
        self.current_bet = 0;
        self.has_acted = false;
    }

    pub(crate) fn set_seat(&mut self, seat: usize) {
        self.seat = seat;
    }

    pub(crate) fn reopen_action(&mut self) {
        self.has_acted = false;
    }

    fn commit(&mut self, requested: u32) -> u32 {
        let moved = requested.min(self.stack);
        if requested >= self.stack {
            self.is_all_in = true;
        }
        self.stack -= moved;
        self.current_bet += moved;
        self.total_bet += moved;
        moved
    }

    fn nominal_or_all_in(&self, nominal: LastAction, moved: u32) -> LastAction {
        if self.is_all_in {
            LastAction::AllIn(moved)
        } else {
            nominal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(stack: u32) -> Player {
        Player::new(UserId(1), "alice", stack, 0)
    }

    #[test]
    fn call_over_stack_caps_and_goes_all_in() {
        let mut p = player(60);
        let moved = p.call(100);
        assert_eq!(moved, 60);
        assert_eq!(p.stack(), 0);
        assert_eq!(p.current_bet(), 60);
        assert!(p.is_all_in());
        assert_eq!(p.last_action(), Some(LastAction::AllIn(60)));
    }

    #[test]
    fn raise_moves_call_plus_raise() {
        let mut p = player(1_000);
        let moved = p.raise(40, 20);
        assert_eq!(moved, 60);
        assert_eq!(p.stack(), 940);
        assert_eq!(p.total_bet(), 60);
        assert_eq!(p.last_action(), Some(LastAction::Raise(40)));
        assert!(!p.is_all_in());
    }

    #[test]
    fn bet_of_exact_stack_is_all_in() {
        let mut p = player(50);
        assert_eq!(p.bet(50), 50);
        assert!(p.is_all_in());
    }

    #[test]
    fn blind_posting_does_not_count_as_acting() {
        let mut p = player(500);
        p.post_blind(20, true);
        assert!(!p.has_acted());
        assert_eq!(p.current_bet(), 20);
        assert_eq!(p.last_action(), Some(LastAction::BigBlind(20)));
    }

    #[test]
    fn round_reset_keeps_hand_totals() {
        let mut p = player(500);
        p.bet(100);
        p.reset_for_new_round();
        assert_eq!(p.current_bet(), 0);
        assert_eq!(p.total_bet(), 100);
        assert!(!p.has_acted());
        assert!(p.is_active());

        p.fold();
        p.reset_for_new_hand();
        assert_eq!(p.total_bet(), 0);
        assert!(p.is_active());
        assert!(p.hole_cards().is_empty());
    }
}

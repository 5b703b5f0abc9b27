use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::{Deck, VerificationBundle};
use crate::errors::GameError;
use crate::hand::{best_hand, HandStrength};
use crate::logger::{format_hand_id, today_yyyymmdd, ActionLog, HandRecord, LogEvent};
use crate::player::{LastAction, Player, PlayerAction, UserId};
use crate::pot::{build_pots, split_amount, Contribution};
use crate::rules::{validate_action, BettingContext, ValidatedAction};

/// Largest table the 52-card deck can serve (2 hole cards each plus a board).
pub const MAX_SEATS: usize = 22;

pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifecycle of a table and of each hand played on it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Seating players, no hand dealt yet
    Waiting,
    /// Hole cards dealt, blinds posted
    PreFlop,
    /// Three community cards
    Flop,
    /// Fourth community card
    Turn,
    /// Fifth community card
    River,
    /// Hands compared, pot being settled
    Showdown,
    /// Hand over; the deck may be revealed
    Finished,
}

impl GamePhase {
    pub fn is_betting(self) -> bool {
        matches!(
            self,
            GamePhase::PreFlop | GamePhase::Flop | GamePhase::Turn | GamePhase::River
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub small_blind: u32,
    pub big_blind: u32,
    pub turn_timeout: Duration,
    pub max_seats: usize,
    pub min_buy_in: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            small_blind: 10,
            big_blind: 20,
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            max_seats: 9,
            min_buy_in: 1,
        }
    }
}

impl GameConfig {
    pub fn with_blinds(small_blind: u32, big_blind: u32) -> Self {
        Self {
            small_blind,
            big_blind,
            ..Self::default()
        }
    }
}

/// A player's hand as shown at showdown.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RevealedHand {
    pub user_id: UserId,
    pub hole_cards: Vec<Card>,
    pub best_five: Vec<Card>,
    pub strength: HandStrength,
    pub description: String,
}

/// Chips paid out of one pot to one player.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct PotAward {
    pub pot_index: usize,
    pub user_id: UserId,
    pub amount: u32,
}

/// Outcome of a finished hand, kept for audit.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub hand_number: u32,
    pub hand_id: String,
    /// Everyone who received chips, in seat order
    pub winners: Vec<UserId>,
    pub awards: Vec<PotAward>,
    /// Empty when the hand was won without a showdown
    pub revealed: Vec<RevealedHand>,
    pub board: Vec<Card>,
    pub won_by_fold: bool,
    pub verification: VerificationBundle,
}

/// Result of an accepted action.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub message: String,
    pub phase: GamePhase,
    pub next_player: Option<UserId>,
    pub hand_finished: bool,
}

/// Public view of a seat. Hole cards are never part of it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub user_id: UserId,
    pub name: String,
    pub seat: usize,
    pub stack: u32,
    pub current_bet: u32,
    pub total_bet: u32,
    pub is_active: bool,
    pub is_all_in: bool,
    pub has_cards: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<LastAction>,
}

/// Redacted table snapshot safe to publish to everyone.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub table_id: String,
    pub hand_number: u32,
    pub phase: GamePhase,
    pub pot: u32,
    pub current_bet: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub community: Vec<Card>,
    pub players: Vec<PlayerView>,
    pub dealer_seat: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<u64>,
    /// Shuffle commitment for the hand in play
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
}

/// One poker table: seating, dealing, betting rounds, showdown.
///
/// All mutation goes through `&mut self`; callers that share a table between
/// tasks wrap it in a single lock so actions and timeouts never interleave.
///
/// # Examples
///
/// ```
/// use fairdeal_engine::game::{Game, GameConfig, GamePhase};
/// use fairdeal_engine::player::{PlayerAction, UserId};
///
/// let mut game = Game::new("t1", GameConfig::with_blinds(10, 20)).unwrap();
/// game.add_player(UserId(1), "alice", 1000).unwrap();
/// game.add_player(UserId(2), "bob", 1000).unwrap();
/// game.start_game().unwrap();
/// assert_eq!(game.pot(), 30);
///
/// // Heads-up: the dealer posts the small blind and acts first
/// let sb = game.current_player().unwrap().user_id();
/// game.player_action(sb, PlayerAction::Fold).unwrap();
/// assert_eq!(game.phase(), GamePhase::Finished);
/// assert!(game.verification_bundle().unwrap().verify());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    table_id: String,
    config: GameConfig,
    phase: GamePhase,
    players: Vec<Player>,
    community: Vec<Card>,
    pot: u32,
    current_bet: u32,
    dealer: usize,
    current: Option<usize>,
    deck: Deck,
    hand_number: u32,
    hand_id: String,
    turn_started: Option<Instant>,
    log: ActionLog,
    last_result: Option<HandResult>,
    total_buy_in: u64,
}

impl Game {
    pub fn new(table_id: impl Into<String>, config: GameConfig) -> Result<Self, GameError> {
        if config.small_blind == 0 || config.small_blind > config.big_blind {
            return Err(GameError::InvalidBlinds {
                small: config.small_blind,
                big: config.big_blind,
            });
        }
        let config = GameConfig {
            max_seats: config.max_seats.clamp(2, MAX_SEATS),
            ..config
        };
        Ok(Self {
            table_id: table_id.into(),
            config,
            phase: GamePhase::Waiting,
            players: Vec::new(),
            community: Vec::with_capacity(5),
            pot: 0,
            current_bet: 0,
            dealer: 0,
            current: None,
            deck: Deck::new(),
            hand_number: 0,
            hand_id: String::new(),
            turn_started: None,
            log: ActionLog::new(),
            last_result: None,
            total_buy_in: 0,
        })
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn phase(&self) -> GamePhase {
        self.phase
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn community(&self) -> &[Card] {
        &self.community
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn dealer_seat(&self) -> usize {
        self.dealer
    }
    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }
    pub fn log(&self) -> &ActionLog {
        &self.log
    }
    pub fn last_result(&self) -> Option<&HandResult> {
        self.last_result.as_ref()
    }
    pub fn total_buy_in(&self) -> u64 {
        self.total_buy_in
    }

    /// Pot plus every stack; equals [`Game::total_buy_in`] at all times.
    pub fn chips_in_play(&self) -> u64 {
        u64::from(self.pot) + self.players.iter().map(|p| u64::from(p.stack())).sum::<u64>()
    }

    pub fn commitment(&self) -> Option<&str> {
        self.deck.commitment()
    }

    pub fn player(&self, user_id: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id() == user_id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current.map(|i| &self.players[i])
    }

    pub fn add_player(
        &mut self,
        user_id: UserId,
        name: impl Into<String>,
        buy_in: u32,
    ) -> Result<(), GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::WrongPhase(self.phase));
        }
        if self.player(user_id).is_some() {
            return Err(GameError::AlreadySeated(user_id));
        }
        if self.players.len() >= self.config.max_seats {
            return Err(GameError::TableFull(self.config.max_seats));
        }
        if buy_in == 0 || buy_in < self.config.min_buy_in {
            return Err(GameError::BuyInTooSmall {
                amount: buy_in,
                minimum: self.config.min_buy_in.max(1),
            });
        }
        // Every pot and stack is a u32, so the whole table must fit in one.
        let remaining = u64::from(u32::MAX).saturating_sub(self.total_buy_in);
        if u64::from(buy_in) > remaining {
            return Err(GameError::BuyInTooLarge {
                amount: buy_in,
                remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
            });
        }
        let seat = self.players.len();
        self.players.push(Player::new(user_id, name, buy_in, seat));
        self.total_buy_in += u64::from(buy_in);
        Ok(())
    }

    /// Unseats a player and returns the stack to refund.
    pub fn remove_player(&mut self, user_id: UserId) -> Result<u32, GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::WrongPhase(self.phase));
        }
        let idx = self.seat_of(user_id)?;
        let mut player = self.players.remove(idx);
        let refund = player.take_stack();
        self.total_buy_in -= u64::from(refund);
        for (seat, p) in self.players.iter_mut().enumerate() {
            p.set_seat(seat);
        }
        Ok(refund)
    }

    /// Leaves WAITING and deals the first hand.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        let funded = self.funded_count();
        if funded < 2 {
            return Err(GameError::NotEnoughPlayers(funded));
        }
        self.dealer = self
            .players
            .iter()
            .position(|p| p.stack() > 0)
            .unwrap_or(0);
        self.start_hand()
    }

    /// Deals the next hand after the previous one finished, moving the button.
    pub fn start_next_hand(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Finished {
            return Err(GameError::WrongPhase(self.phase));
        }
        let funded = self.funded_count();
        if funded < 2 {
            return Err(GameError::NotEnoughPlayers(funded));
        }
        self.dealer = self
            .next_seat_where(self.dealer, |p| p.stack() > 0)
            .unwrap_or(self.dealer);
        self.start_hand()
    }

    /// Applies one decision from the player whose turn it is.
    ///
    /// Rejections leave the game exactly as it was.
    pub fn player_action(
        &mut self,
        user_id: UserId,
        action: PlayerAction,
    ) -> Result<ActionOutcome, GameError> {
        if !self.phase.is_betting() {
            return Err(GameError::NoHandInProgress);
        }
        let idx = self.current.ok_or(GameError::NoHandInProgress)?;
        self.seat_of(user_id)?;
        let expected = self.players[idx].user_id();
        if expected != user_id {
            return Err(GameError::NotPlayersTurn {
                expected,
                actual: user_id,
            });
        }

        let player = &self.players[idx];
        let ctx = BettingContext {
            stack: player.stack(),
            player_bet: player.current_bet(),
            table_bet: self.current_bet,
            big_blind: self.config.big_blind,
        };
        let validated = validate_action(&ctx, action)?;
        self.apply(idx, validated, ctx.to_call());
        self.after_action(idx)
    }

    pub fn is_turn_expired(&self) -> bool {
        self.is_turn_expired_at(Instant::now())
    }

    pub fn is_turn_expired_at(&self, now: Instant) -> bool {
        match (self.current, self.turn_started) {
            (Some(_), Some(started)) => now.duration_since(started) >= self.config.turn_timeout,
            _ => false,
        }
    }

    pub fn seconds_remaining(&self) -> Option<u64> {
        self.current?;
        let started = self.turn_started?;
        Some(
            self.config
                .turn_timeout
                .saturating_sub(started.elapsed())
                .as_secs(),
        )
    }

    /// Folds the player whose clock ran out, then advances once.
    pub fn handle_turn_timeout(&mut self) -> Result<ActionOutcome, GameError> {
        let idx = self.current.ok_or(GameError::NoHandInProgress)?;
        if !self.is_turn_expired() {
            return Err(GameError::TurnNotExpired);
        }
        let user_id = self.players[idx].user_id();
        self.players[idx].fold();
        self.log
            .push(self.hand_number, self.phase, LogEvent::TimedOut { user_id });
        let mut outcome = self.after_action(idx)?;
        outcome.message = format!("{} timed out and folds", self.players[idx].name());
        Ok(outcome)
    }

    /// Hole cards for private delivery to their owner.
    pub fn hole_cards_string(&self, user_id: UserId) -> Result<String, GameError> {
        let idx = self.seat_of(user_id)?;
        Ok(self.players[idx].hole_cards_string())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            table_id: self.table_id.clone(),
            hand_number: self.hand_number,
            phase: self.phase,
            pot: self.pot,
            current_bet: self.current_bet,
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            community: self.community.clone(),
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    user_id: p.user_id(),
                    name: p.name().to_string(),
                    seat: p.seat(),
                    stack: p.stack(),
                    current_bet: p.current_bet(),
                    total_bet: p.total_bet(),
                    is_active: p.is_active(),
                    is_all_in: p.is_all_in(),
                    has_cards: !p.hole_cards().is_empty(),
                    last_action: p.last_action(),
                })
                .collect(),
            dealer_seat: self.dealer,
            current_player: self.current_player().map(Player::user_id),
            seconds_remaining: self.seconds_remaining(),
            commitment: self.commitment().map(str::to_string),
        }
    }

    /// Reveals the shuffle of the last hand. Only available once it finished.
    pub fn verification_bundle(&self) -> Result<VerificationBundle, GameError> {
        if self.phase != GamePhase::Finished {
            return Err(GameError::BundleNotAvailable);
        }
        Ok(self.deck.verification_bundle()?)
    }

    /// Audit record for the last finished hand.
    pub fn hand_record(&self) -> Option<HandRecord> {
        let result = self.last_result.as_ref()?;
        Some(HandRecord {
            hand_id: result.hand_id.clone(),
            table_id: self.table_id.clone(),
            hand_number: result.hand_number,
            commitment: result.verification.hash.clone(),
            entries: self.log.for_hand(result.hand_number),
            board: result.board.clone(),
            result: Some(result.clone()),
            ts: None,
        })
    }

    /// Empties the table for teardown.
    ///
    /// Returns what each player is owed: their stack plus, if a hand was
    /// interrupted, everything they put into it. A second call returns
    /// zeroes, so refunds are paid once.
    pub fn cash_out_all(&mut self) -> Vec<(UserId, u32)> {
        let interrupted = self.phase.is_betting() || self.phase == GamePhase::Showdown;
        let owed = self
            .players
            .iter_mut()
            .map(|p| {
                let returned = if interrupted { p.total_bet() } else { 0 };
                let amount = p.take_stack() + returned;
                p.reset_for_new_hand();
                (p.user_id(), amount)
            })
            .collect();
        self.pot = 0;
        self.current_bet = 0;
        self.current = None;
        self.turn_started = None;
        self.total_buy_in = 0;
        if self.phase != GamePhase::Waiting {
            self.phase = GamePhase::Finished;
        }
        owed
    }

    fn seat_of(&self, user_id: UserId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.user_id() == user_id)
            .ok_or(GameError::PlayerNotFound(user_id))
    }

    fn funded_count(&self) -> usize {
        self.players.iter().filter(|p| p.stack() > 0).count()
    }

    fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    /// First seat after `from` (wrapping, excluding `from`) matching `pred`.
    fn next_seat_where(&self, from: usize, pred: impl Fn(&Player) -> bool) -> Option<usize> {
        let n = self.players.len();
        (1..n)
            .map(|k| (from + k) % n)
            .find(|&j| pred(&self.players[j]))
    }

    fn next_actor_after(&self, from: usize) -> Option<usize> {
        self.next_seat_where(from, Player::can_act)
    }

    fn first_actor_from(&self, seat: usize) -> Option<usize> {
        if self.players[seat].can_act() {
            Some(seat)
        } else {
            self.next_actor_after(seat)
        }
    }

    fn start_hand(&mut self) -> Result<(), GameError> {
        self.hand_number += 1;
        self.hand_id = format_hand_id(&self.table_id, &today_yyyymmdd(), self.hand_number);
        for p in &mut self.players {
            p.reset_for_new_hand();
            if p.stack() == 0 {
                p.sit_out();
            }
        }
        self.community.clear();
        self.pot = 0;
        self.current_bet = 0;
        self.current = None;
        self.last_result = None;

        let mut deck = Deck::new();
        let commitment = deck.shuffle();
        self.deck = deck;

        let order: Vec<usize> = (1..=self.players.len())
            .map(|k| (self.dealer + k) % self.players.len())
            .filter(|&i| self.players[i].is_active())
            .collect();
        for &i in &order {
            let cards = self.deck.deal(2)?;
            self.players[i].set_hole_cards(cards);
        }

        self.phase = GamePhase::PreFlop;
        self.log.push(
            self.hand_number,
            self.phase,
            LogEvent::HandStarted {
                hand_id: self.hand_id.clone(),
                dealer_seat: self.dealer,
                commitment,
                players: order.iter().map(|&i| self.players[i].user_id()).collect(),
            },
        );

        let in_hand = |p: &Player| p.is_active();
        let heads_up = order.len() == 2;
        let (sb, bb) = if heads_up {
            let bb = self.next_seat_where(self.dealer, in_hand).unwrap_or(self.dealer);
            (self.dealer, bb)
        } else {
            let sb = self.next_seat_where(self.dealer, in_hand).unwrap_or(self.dealer);
            let bb = self.next_seat_where(sb, in_hand).unwrap_or(sb);
            (sb, bb)
        };
        self.post_blind(sb, self.config.small_blind, false);
        self.post_blind(bb, self.config.big_blind, true);
        self.current_bet = self.players[sb]
            .current_bet()
            .max(self.players[bb].current_bet());

        let first = if heads_up {
            sb
        } else {
            self.next_seat_where(bb, in_hand).unwrap_or(bb)
        };
        if self.round_complete() {
            return self.end_round();
        }
        self.current = self.first_actor_from(first);
        self.turn_started = Some(Instant::now());
        Ok(())
    }

    fn post_blind(&mut self, seat: usize, amount: u32, big: bool) {
        let moved = self.players[seat].post_blind(amount, big);
        self.pot += moved;
        self.log.push(
            self.hand_number,
            self.phase,
            LogEvent::BlindPosted {
                user_id: self.players[seat].user_id(),
                amount: moved,
                big,
            },
        );
    }

    fn apply(&mut self, idx: usize, action: ValidatedAction, to_call: u32) {
        let player = &mut self.players[idx];
        let moved = match action {
            ValidatedAction::Fold => {
                player.fold();
                0
            }
            ValidatedAction::Check => {
                player.check();
                0
            }
            ValidatedAction::Call(amount) => player.call(amount),
            ValidatedAction::Bet(amount) => player.bet(amount),
            ValidatedAction::Raise(amount) => player.raise(amount, to_call),
            ValidatedAction::AllIn(_) => player.all_in(),
        };
        let new_bet = player.current_bet();
        let last = player.last_action();
        let user_id = player.user_id();
        self.pot += moved;

        if new_bet > self.current_bet {
            self.current_bet = new_bet;
            // a raise reopens the action for everyone still able to act
            for (j, other) in self.players.iter_mut().enumerate() {
                if j != idx && other.can_act() {
                    other.reopen_action();
                }
            }
        }
        if let Some(action) = last {
            self.log.push(
                self.hand_number,
                self.phase,
                LogEvent::PlayerActed { user_id, action },
            );
        }
    }

    fn after_action(&mut self, actor: usize) -> Result<ActionOutcome, GameError> {
        let message = describe_action(&self.players[actor]);
        if self.active_count() <= 1 {
            self.finish_by_fold()?;
        } else if self.round_complete() {
            self.end_round()?;
        } else {
            match self.next_actor_after(actor) {
                Some(next) => {
                    self.current = Some(next);
                    self.turn_started = Some(Instant::now());
                }
                // wrapped around without finding anyone who can act
                None => self.end_round()?,
            }
        }
        Ok(ActionOutcome {
            message,
            phase: self.phase,
            next_player: self.current_player().map(Player::user_id),
            hand_finished: self.phase == GamePhase::Finished,
        })
    }

    /// Betting is over for this street when nobody has a decision left:
    /// either at most one player can act and owes nothing, or everyone who
    /// can act has acted and matched the bet.
    fn round_complete(&self) -> bool {
        let actors: Vec<&Player> = self.players.iter().filter(|p| p.can_act()).collect();
        match actors.as_slice() {
            [] => true,
            [only] => only.current_bet() >= self.current_bet,
            many => many
                .iter()
                .all(|p| p.has_acted() && p.current_bet() == self.current_bet),
        }
    }

    /// Closes the betting round and deals the next street. Streets where no
    /// betting is possible are dealt straight through to the showdown.
    fn end_round(&mut self) -> Result<(), GameError> {
        loop {
            for p in &mut self.players {
                p.reset_for_new_round();
            }
            self.current_bet = 0;
            self.current = None;
            self.turn_started = None;

            let (next_phase, count) = match self.phase {
                GamePhase::PreFlop => (GamePhase::Flop, 3),
                GamePhase::Flop => (GamePhase::Turn, 1),
                GamePhase::Turn => (GamePhase::River, 1),
                GamePhase::River => return self.showdown(),
                GamePhase::Waiting | GamePhase::Showdown | GamePhase::Finished => {
                    return Err(GameError::NoHandInProgress)
                }
            };
            let cards = self.deck.deal(count)?;
            self.community.extend_from_slice(&cards);
            self.phase = next_phase;
            self.log.push(
                self.hand_number,
                self.phase,
                LogEvent::CommunityDealt { cards },
            );

            if self.round_complete() {
                continue;
            }
            self.current = self.first_actor_from((self.dealer + 1) % self.players.len());
            self.turn_started = Some(Instant::now());
            return Ok(());
        }
    }

    fn finish_by_fold(&mut self) -> Result<(), GameError> {
        self.phase = GamePhase::Showdown;
        let winner = self
            .players
            .iter()
            .position(Player::is_active)
            .ok_or(GameError::NoHandInProgress)?;
        let amount = self.pot;
        self.players[winner].add_chips(amount);
        let award = PotAward {
            pot_index: 0,
            user_id: self.players[winner].user_id(),
            amount,
        };
        self.finish_hand(vec![award], Vec::new(), true)
    }

    fn showdown(&mut self) -> Result<(), GameError> {
        self.phase = GamePhase::Showdown;

        let mut strengths: Vec<Option<HandStrength>> = vec![None; self.players.len()];
        let mut revealed = Vec::new();
        for (i, p) in self.players.iter().enumerate() {
            if !p.is_active() {
                continue;
            }
            let mut cards = p.hole_cards().to_vec();
            cards.extend_from_slice(&self.community);
            let (strength, best_five) = best_hand(&cards)?;
            revealed.push(RevealedHand {
                user_id: p.user_id(),
                hole_cards: p.hole_cards().to_vec(),
                best_five,
                description: strength.describe(),
                strength: strength.clone(),
            });
            strengths[i] = Some(strength);
        }
        for r in &revealed {
            self.log.push(
                self.hand_number,
                self.phase,
                LogEvent::HandRevealed {
                    user_id: r.user_id,
                    hole_cards: r.hole_cards.clone(),
                    category: r.strength.category,
                    description: r.description.clone(),
                },
            );
        }

        let contributions: Vec<Contribution> = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| Contribution {
                seat,
                amount: p.total_bet(),
                live: p.is_active(),
            })
            .collect();
        let mut awards = Vec::new();
        for (pot_index, pot) in build_pots(&contributions).into_iter().enumerate() {
            let best = pot
                .eligible_seats
                .iter()
                .filter_map(|&s| strengths[s].as_ref())
                .max()
                .cloned();
            let winners: Vec<usize> = pot
                .eligible_seats
                .iter()
                .copied()
                .filter(|&s| strengths[s].is_some() && strengths[s] == best)
                .collect();
            for (seat, amount) in split_amount(pot.amount, &winners) {
                self.players[seat].add_chips(amount);
                awards.push(PotAward {
                    pot_index,
                    user_id: self.players[seat].user_id(),
                    amount,
                });
            }
        }
        self.finish_hand(awards, revealed, false)
    }

    fn finish_hand(
        &mut self,
        awards: Vec<PotAward>,
        revealed: Vec<RevealedHand>,
        won_by_fold: bool,
    ) -> Result<(), GameError> {
        for a in &awards {
            self.log.push(
                self.hand_number,
                self.phase,
                LogEvent::PotAwarded {
                    user_id: a.user_id,
                    amount: a.amount,
                    pot_index: a.pot_index,
                },
            );
        }
        self.pot = 0;
        self.current_bet = 0;
        self.current = None;
        self.turn_started = None;
        self.phase = GamePhase::Finished;

        let verification = self.deck.verification_bundle()?;
        self.log.push(
            self.hand_number,
            self.phase,
            LogEvent::DeckRevealed {
                bundle: verification.clone(),
            },
        );

        let mut winners: Vec<UserId> = Vec::new();
        for p in &self.players {
            if awards.iter().any(|a| a.user_id == p.user_id() && a.amount > 0) {
                winners.push(p.user_id());
            }
        }
        self.last_result = Some(HandResult {
            hand_number: self.hand_number,
            hand_id: self.hand_id.clone(),
            winners,
            awards,
            revealed,
            board: self.community.clone(),
            won_by_fold,
            verification,
        });
        Ok(())
    }
}

fn describe_action(p: &Player) -> String {
    let what = match p.last_action() {
        Some(LastAction::Fold) | None => "folds".to_string(),
        Some(LastAction::Check) => "checks".to_string(),
        Some(LastAction::Call(n)) => format!("calls {}", n),
        Some(LastAction::Bet(n)) => format!("bets {}", n),
        Some(LastAction::Raise(n)) => format!("raises by {}", n),
        Some(LastAction::AllIn(n)) => format!("goes all-in for {}", n),
        Some(LastAction::SmallBlind(n)) => format!("posts small blind {}", n),
        Some(LastAction::BigBlind(n)) => format!("posts big blind {}", n),
    };
    format!("{} {}", p.name(), what)
}

#[cfg(test)]
impl Game {
    /// Replaces the undealt part of the hand: hole cards per seat and the
    /// community cards still to come, in dealing order.
    pub(crate) fn rig(&mut self, holes: &[&[&str]], board: &[&str]) {
        let parse = |c: &&str| c.parse::<Card>().expect("card code");
        for (i, hole) in holes.iter().enumerate() {
            self.players[i].set_hole_cards(hole.iter().map(parse).collect());
        }
        let top: Vec<Card> = board.iter().map(parse).collect();
        self.deck = Deck::stacked(&top);
    }

    pub(crate) fn category_of(&self, user_id: UserId) -> Option<crate::hand::HandCategory> {
        self.last_result.as_ref().and_then(|r| {
            r.revealed
                .iter()
                .find(|h| h.user_id == user_id)
                .map(|h| h.strength.category)
        })
    }
}

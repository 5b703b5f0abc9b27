//! # fairdeal-engine: Provably Fair Hold'em Core
//!
//! A multi-player No-Limit Texas Hold'em engine. Every hand is dealt from a
//! deck whose order is committed to with a SHA-256 hash before the first card
//! leaves it; once the hand is over the seed and order are revealed so any
//! player can check the deal was not altered.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and two-character codes
//! - [`deck`] - ChaCha20 shuffle, commitment hash and verification bundle
//! - [`hand`] - Best-of-seven hand evaluation and comparison
//! - [`player`] - Per-seat chip accounting and player actions
//! - [`rules`] - Betting validation against the current bet and big blind
//! - [`pot`] - Main pot and side pot construction, split remainders
//! - [`game`] - The table state machine: blinds, betting rounds, showdown, timeouts
//! - [`logger`] - Action log and HandRecord serialization
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use fairdeal_engine::cards::Card;
//! use fairdeal_engine::hand::{best_hand, HandCategory};
//!
//! let cards: Vec<Card> = ["Ah", "Kh", "Qh", "Jh", "Th", "2c", "3d"]
//!     .iter()
//!     .map(|c| c.parse().unwrap())
//!     .collect();
//!
//! let (strength, best_five) = best_hand(&cards).unwrap();
//! assert_eq!(strength.category, HandCategory::RoyalFlush);
//! assert_eq!(best_five.len(), 5);
//! ```
//!
//! ## Verifying a Deal
//!
//! ```rust
//! use fairdeal_engine::deck::{verify, Deck};
//!
//! let mut deck = Deck::new();
//! let commitment = deck.shuffle();
//! let hole = deck.deal(2).unwrap();
//!
//! let bundle = deck.verification_bundle().unwrap();
//! assert_eq!(bundle.hash, commitment);
//! assert_eq!(bundle.dealt, hole);
//! assert!(verify(&bundle));
//! ```
//!
//! ## Action Validation
//!
//! ```rust
//! use fairdeal_engine::player::PlayerAction;
//! use fairdeal_engine::rules::{validate_action, BettingContext};
//!
//! let ctx = BettingContext { stack: 1000, player_bet: 20, table_bet: 60, big_blind: 20 };
//! match validate_action(&ctx, PlayerAction::Raise(40)) {
//!     Ok(validated) => println!("Valid action: {:?}", validated),
//!     Err(e) => println!("Invalid action: {}", e),
//! }
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod player;
pub mod pot;
pub mod rules;

use thiserror::Error;

use crate::game::GamePhase;
use crate::player::UserId;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid card code: {0:?}")]
pub struct CardParseError(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("Deck exhausted: requested {requested} cards, {remaining} remaining")]
    Exhausted { requested: usize, remaining: usize },
    #[error("Deck has not been shuffled and committed")]
    NotCommitted,
    #[error("Commitment mismatch: {0}")]
    CommitmentMismatch(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandError {
    #[error("Hand evaluation needs 5 to 7 cards, got {0}")]
    InvalidCardCount(usize),
    #[error("Duplicate card in hand: {0}")]
    DuplicateCard(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid bet amount: {amount}, minimum: {minimum}")]
    InvalidBetAmount { amount: u32, minimum: u32 },
    #[error("Cannot check: {to_call} chips to call")]
    CannotCheck { to_call: u32 },
    #[error("Nothing to call, check instead")]
    NothingToCall,
    #[error("Cannot bet: the betting is already open at {current_bet}, raise instead")]
    BettingAlreadyOpen { current_bet: u32 },
    #[error("Cannot raise: nobody has bet yet, bet instead")]
    NothingToRaise,
    #[error("No chips left to wager")]
    InsufficientChips,
    #[error("It's not {actual}'s turn (waiting for {expected})")]
    NotPlayersTurn { expected: UserId, actual: UserId },
    #[error("Player {0} is not seated at this table")]
    PlayerNotFound(UserId),
    #[error("Player {0} is already seated at this table")]
    AlreadySeated(UserId),
    #[error("Table is full ({0} seats)")]
    TableFull(usize),
    #[error("Buy-in {amount} is below the table minimum {minimum}")]
    BuyInTooSmall { amount: u32, minimum: u32 },
    #[error("Buy-in {amount} exceeds the {remaining} chips left under the table cap")]
    BuyInTooLarge { amount: u32, remaining: u32 },
    #[error("Invalid blinds: small {small}, big {big}")]
    InvalidBlinds { small: u32, big: u32 },
    #[error("Action not allowed during {0:?}")]
    WrongPhase(GamePhase),
    #[error("Need at least 2 players with chips, have {0}")]
    NotEnoughPlayers(usize),
    #[error("Game already started")]
    GameAlreadyStarted,
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Turn has not expired yet")]
    TurnNotExpired,
    #[error("Verification bundle is only available once the hand is finished")]
    BundleNotAvailable,
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Hand(#[from] HandError),
}

impl GameError {
    /// True for misuse of the API or a fairness violation, as opposed to an
    /// ordinary rejected player input.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            GameError::GameAlreadyStarted
                | GameError::Hand(_)
                | GameError::Deck(DeckError::CommitmentMismatch(_))
                | GameError::Deck(DeckError::NotCommitted)
        )
    }
}

use crate::errors::GameError;
use crate::player::PlayerAction as A;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(u32),
    Bet(u32),
    Raise(u32),
    AllIn(u32),
}

/// The betting situation a single decision is made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BettingContext {
    /// Player's remaining chip stack
    pub stack: u32,
    /// What the player has already put in this round
    pub player_bet: u32,
    /// The amount every active player must match this round
    pub table_bet: u32,
    /// Big blind; also the minimum bet and minimum raise increment
    pub big_blind: u32,
}

impl BettingContext {
    pub fn to_call(&self) -> u32 {
        self.table_bet.saturating_sub(self.player_bet)
    }
}

/// Validates a player action according to betting rules and stack size.
///
/// Converts a [`crate::player::PlayerAction`] into a [`ValidatedAction`],
/// enforcing the minimum bet and raise sizes and converting any wager that
/// reaches the stack into an all-in. Nothing is mutated here, which is what
/// lets the game reject an action without touching its state.
///
/// # Errors
///
/// - [`GameError::CannotCheck`] - check while facing a bet
/// - [`GameError::NothingToCall`] - call with nothing outstanding
/// - [`GameError::BettingAlreadyOpen`] - bet after someone else already bet
/// - [`GameError::NothingToRaise`] - raise before anyone has bet
/// - [`GameError::InvalidBetAmount`] - bet or raise below the big blind
/// - [`GameError::InsufficientChips`] - wager with an empty stack
///
/// # Examples
///
/// ```
/// use fairdeal_engine::rules::{validate_action, BettingContext, ValidatedAction};
/// use fairdeal_engine::player::PlayerAction;
///
/// let ctx = BettingContext { stack: 1000, player_bet: 0, table_bet: 50, big_blind: 20 };
/// assert_eq!(validate_action(&ctx, PlayerAction::Call), Ok(ValidatedAction::Call(50)));
///
/// // Short raise that uses the whole stack becomes an all-in
/// let short = BettingContext { stack: 80, ..ctx };
/// assert_eq!(validate_action(&short, PlayerAction::Raise(100)), Ok(ValidatedAction::AllIn(80)));
/// ```
///
/// ```
/// use fairdeal_engine::rules::{validate_action, BettingContext};
/// use fairdeal_engine::player::PlayerAction;
/// use fairdeal_engine::errors::GameError;
///
/// let ctx = BettingContext { stack: 1000, player_bet: 0, table_bet: 50, big_blind: 20 };
/// assert_eq!(
///     validate_action(&ctx, PlayerAction::Check),
///     Err(GameError::CannotCheck { to_call: 50 })
/// );
/// assert!(matches!(
///     validate_action(&ctx, PlayerAction::Raise(10)),
///     Err(GameError::InvalidBetAmount { .. })
/// ));
/// ```
pub fn validate_action(ctx: &BettingContext, action: A) -> Result<ValidatedAction, GameError> {
    let stack = ctx.stack;
    let to_call = ctx.to_call();
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::CannotCheck { to_call })
            }
        }
        A::Call => {
            if to_call == 0 {
                Err(GameError::NothingToCall)
            } else if stack == 0 {
                Err(GameError::InsufficientChips)
            } else if stack <= to_call {
                Ok(ValidatedAction::AllIn(stack))
            } else {
                Ok(ValidatedAction::Call(to_call))
            }
        }
        A::Bet(amount) => {
            if ctx.table_bet > 0 {
                Err(GameError::BettingAlreadyOpen {
                    current_bet: ctx.table_bet,
                })
            } else if stack == 0 {
                Err(GameError::InsufficientChips)
            } else if amount >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else if amount < ctx.big_blind || amount == 0 {
                Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: ctx.big_blind.max(1),
                })
            } else {
                Ok(ValidatedAction::Bet(amount))
            }
        }
        A::Raise(amount) => {
            if ctx.table_bet == 0 {
                Err(GameError::NothingToRaise)
            } else if stack == 0 {
                Err(GameError::InsufficientChips)
            } else if to_call.saturating_add(amount) >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else if amount < ctx.big_blind || amount == 0 {
                Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: ctx.big_blind.max(1),
                })
            } else {
                Ok(ValidatedAction::Raise(amount))
            }
        }
        A::AllIn => {
            if stack == 0 {
                Err(GameError::InsufficientChips)
            } else {
                Ok(ValidatedAction::AllIn(stack))
            }
        }
    }
}

use fairdeal_engine::errors::GameError;
use fairdeal_engine::player::PlayerAction;
use fairdeal_engine::rules::{validate_action, BettingContext, ValidatedAction};

fn ctx(stack: u32, player_bet: u32, table_bet: u32) -> BettingContext {
    BettingContext {
        stack,
        player_bet,
        table_bet,
        big_blind: 20,
    }
}

#[test]
fn check_only_when_nothing_to_call() {
    assert_eq!(
        validate_action(&ctx(1000, 20, 20), PlayerAction::Check),
        Ok(ValidatedAction::Check)
    );
    assert_eq!(
        validate_action(&ctx(1000, 10, 20), PlayerAction::Check),
        Err(GameError::CannotCheck { to_call: 10 })
    );
}

#[test]
fn call_requires_an_outstanding_bet() {
    assert_eq!(
        validate_action(&ctx(1000, 0, 0), PlayerAction::Call),
        Err(GameError::NothingToCall)
    );
    assert_eq!(
        validate_action(&ctx(1000, 10, 20), PlayerAction::Call),
        Ok(ValidatedAction::Call(10))
    );
}

#[test]
fn short_call_becomes_all_in() {
    assert_eq!(
        validate_action(&ctx(15, 0, 100), PlayerAction::Call),
        Ok(ValidatedAction::AllIn(15))
    );
}

#[test]
fn bet_rules() {
    assert_eq!(
        validate_action(&ctx(1000, 0, 0), PlayerAction::Bet(20)),
        Ok(ValidatedAction::Bet(20))
    );
    assert_eq!(
        validate_action(&ctx(1000, 0, 0), PlayerAction::Bet(5)),
        Err(GameError::InvalidBetAmount {
            amount: 5,
            minimum: 20
        })
    );
    assert_eq!(
        validate_action(&ctx(1000, 0, 40), PlayerAction::Bet(100)),
        Err(GameError::BettingAlreadyOpen { current_bet: 40 })
    );
    // below the minimum but the whole stack
    assert_eq!(
        validate_action(&ctx(12, 0, 0), PlayerAction::Bet(12)),
        Ok(ValidatedAction::AllIn(12))
    );
}

#[test]
fn raise_rules() {
    assert_eq!(
        validate_action(&ctx(1000, 0, 0), PlayerAction::Raise(40)),
        Err(GameError::NothingToRaise)
    );
    assert_eq!(
        validate_action(&ctx(1000, 20, 40), PlayerAction::Raise(40)),
        Ok(ValidatedAction::Raise(40))
    );
    assert!(matches!(
        validate_action(&ctx(1000, 20, 40), PlayerAction::Raise(19)),
        Err(GameError::InvalidBetAmount { .. })
    ));
    assert_eq!(
        validate_action(&ctx(50, 20, 40), PlayerAction::Raise(40)),
        Ok(ValidatedAction::AllIn(50))
    );
}

#[test]
fn empty_stack_cannot_wager() {
    for action in [
        PlayerAction::AllIn,
        PlayerAction::Bet(20),
        PlayerAction::Call,
    ] {
        let table_bet = if matches!(action, PlayerAction::Call) { 20 } else { 0 };
        assert_eq!(
            validate_action(&ctx(0, 0, table_bet), action),
            Err(GameError::InsufficientChips)
        );
    }
    assert_eq!(
        validate_action(&ctx(0, 0, 20), PlayerAction::Fold),
        Ok(ValidatedAction::Fold)
    );
}

#[test]
fn actions_round_trip_through_json() {
    let json = serde_json::to_string(&PlayerAction::Raise(60)).unwrap();
    assert_eq!(json, r#"{"type":"raise","amount":60}"#);
    let back: PlayerAction = serde_json::from_str(r#"{"type":"fold"}"#).unwrap();
    assert_eq!(back, PlayerAction::Fold);
}

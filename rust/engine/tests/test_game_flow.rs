use fairdeal_engine::errors::GameError;
use fairdeal_engine::game::{Game, GameConfig, GamePhase};
use fairdeal_engine::player::{PlayerAction, UserId};

const ALICE: UserId = UserId(100);
const BOB: UserId = UserId(200);
const CAROL: UserId = UserId(300);

fn heads_up(stack: u32) -> Game {
    let mut game = Game::new("t1", GameConfig::with_blinds(10, 20)).unwrap();
    game.add_player(ALICE, "alice", stack).unwrap();
    game.add_player(BOB, "bob", stack).unwrap();
    game
}

fn current(game: &Game) -> UserId {
    game.current_player().expect("someone to act").user_id()
}

#[test]
fn heads_up_start_posts_blinds_and_dealer_acts_first() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    assert_eq!(game.phase(), GamePhase::PreFlop);
    assert_eq!(game.pot(), 30);
    assert_eq!(game.current_bet(), 20);
    assert_eq!(game.player(ALICE).unwrap().current_bet(), 10);
    assert_eq!(game.player(BOB).unwrap().current_bet(), 20);
    assert_eq!(current(&game), ALICE);
    assert!(game.players().iter().all(|p| p.hole_cards().len() == 2));
    assert_eq!(game.commitment().map(str::len), Some(64));
}

#[test]
fn start_requires_two_funded_players() {
    let mut game = Game::new("t1", GameConfig::default()).unwrap();
    game.add_player(ALICE, "alice", 500).unwrap();
    assert_eq!(game.start_game(), Err(GameError::NotEnoughPlayers(1)));
    game.add_player(BOB, "bob", 500).unwrap();
    game.start_game().unwrap();
    assert_eq!(game.start_game(), Err(GameError::GameAlreadyStarted));
}

#[test]
fn seating_rules() {
    let config = GameConfig {
        max_seats: 2,
        min_buy_in: 100,
        ..GameConfig::default()
    };
    let mut game = Game::new("t1", config).unwrap();
    assert!(matches!(
        game.add_player(ALICE, "alice", 50),
        Err(GameError::BuyInTooSmall { .. })
    ));
    game.add_player(ALICE, "alice", 500).unwrap();
    assert_eq!(
        game.add_player(ALICE, "alice", 500),
        Err(GameError::AlreadySeated(ALICE))
    );
    game.add_player(BOB, "bob", 500).unwrap();
    assert_eq!(
        game.add_player(CAROL, "carol", 500),
        Err(GameError::TableFull(2))
    );
    assert_eq!(game.remove_player(ALICE), Ok(500));
    assert_eq!(game.players()[0].seat(), 0);
    assert_eq!(game.total_buy_in(), 500);
}

#[test]
fn buy_ins_beyond_the_table_chip_cap_are_rejected() {
    let mut game = Game::new("big", GameConfig::with_blinds(10, 20)).unwrap();
    game.add_player(ALICE, "alice", 3_000_000_000).unwrap();
    assert_eq!(
        game.add_player(BOB, "bob", 3_000_000_000),
        Err(GameError::BuyInTooLarge {
            amount: 3_000_000_000,
            remaining: u32::MAX - 3_000_000_000,
        })
    );
    assert_eq!(game.players().len(), 1);
    assert_eq!(game.total_buy_in(), 3_000_000_000);

    // freed room can be used again
    game.remove_player(ALICE).unwrap();
    game.add_player(BOB, "bob", 3_000_000_000).unwrap();
}

#[test]
fn all_in_at_the_chip_cap_settles_without_overflow() {
    let half = u32::MAX / 2;
    let mut game = Game::new("big", GameConfig::with_blinds(10, 20)).unwrap();
    game.add_player(ALICE, "alice", half + 1).unwrap();
    game.add_player(BOB, "bob", half).unwrap();
    assert_eq!(game.total_buy_in(), u64::from(u32::MAX));
    assert!(matches!(
        game.add_player(CAROL, "carol", 1),
        Err(GameError::BuyInTooLarge { remaining: 0, .. })
    ));

    game.start_game().unwrap();
    game.player_action(ALICE, PlayerAction::AllIn).unwrap();
    game.player_action(BOB, PlayerAction::Call).unwrap();

    assert_eq!(game.phase(), GamePhase::Finished);
    assert_eq!(game.pot(), 0);
    assert_eq!(game.chips_in_play(), u64::from(u32::MAX));
    let paid: u64 = game
        .last_result()
        .unwrap()
        .awards
        .iter()
        .map(|a| u64::from(a.amount))
        .sum();
    // the uncalled chip comes back to alice as its own pot
    assert_eq!(paid, u64::from(u32::MAX));
}

#[test]
fn invalid_blinds_are_rejected() {
    assert!(matches!(
        Game::new("t1", GameConfig::with_blinds(30, 20)),
        Err(GameError::InvalidBlinds { small: 30, big: 20 })
    ));
    assert!(Game::new("t1", GameConfig::with_blinds(0, 20)).is_err());
}

#[test]
fn acting_out_of_turn_changes_nothing() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    let before = game.clone();
    assert_eq!(
        game.player_action(BOB, PlayerAction::Call),
        Err(GameError::NotPlayersTurn {
            expected: ALICE,
            actual: BOB
        })
    );
    assert_eq!(game, before);
    assert_eq!(
        game.player_action(CAROL, PlayerAction::Fold),
        Err(GameError::PlayerNotFound(CAROL))
    );
    assert_eq!(game, before);
}

#[test]
fn invalid_amounts_change_nothing() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    let before = game.clone();
    assert!(game.player_action(ALICE, PlayerAction::Check).is_err());
    assert!(game.player_action(ALICE, PlayerAction::Raise(5)).is_err());
    assert!(game.player_action(ALICE, PlayerAction::Bet(100)).is_err());
    assert_eq!(game, before);
}

#[test]
fn all_in_never_moves_more_than_the_stack() {
    let mut game = Game::new("t1", GameConfig::with_blinds(10, 20)).unwrap();
    game.add_player(ALICE, "alice", 150).unwrap();
    game.add_player(BOB, "bob", 1000).unwrap();
    game.start_game().unwrap();
    game.player_action(ALICE, PlayerAction::Raise(5000)).unwrap();
    let alice = game.player(ALICE).unwrap();
    assert_eq!(alice.stack(), 0);
    assert!(alice.is_all_in());
    assert_eq!(alice.total_bet(), 150);
    assert_eq!(game.current_bet(), 150);
    assert_eq!(game.pot(), 170);
}

#[test]
fn fold_ends_the_hand_and_reveals_the_deck() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    assert_eq!(
        game.verification_bundle(),
        Err(GameError::BundleNotAvailable)
    );
    let commitment = game.commitment().unwrap().to_string();
    let outcome = game.player_action(ALICE, PlayerAction::Fold).unwrap();
    assert!(outcome.hand_finished);
    assert_eq!(outcome.phase, GamePhase::Finished);
    assert_eq!(game.player(BOB).unwrap().stack(), 1010);
    assert_eq!(game.player(ALICE).unwrap().stack(), 990);

    let bundle = game.verification_bundle().unwrap();
    assert_eq!(bundle.hash, commitment);
    assert!(bundle.verify());
    // four hole cards dealt, no board
    assert_eq!(bundle.dealt.len(), 4);
}

#[test]
fn raise_reopens_action_for_the_big_blind() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    game.player_action(ALICE, PlayerAction::Call).unwrap();
    game.player_action(BOB, PlayerAction::Raise(40)).unwrap();
    assert_eq!(game.phase(), GamePhase::PreFlop);
    assert_eq!(current(&game), ALICE);
    game.player_action(ALICE, PlayerAction::Call).unwrap();
    assert_eq!(game.phase(), GamePhase::Flop);
    assert_eq!(game.community().len(), 3);
    assert_eq!(game.pot(), 120);
    assert_eq!(game.current_bet(), 0);
    // non-dealer opens post-flop
    assert_eq!(current(&game), BOB);
}

#[test]
fn full_hand_reaches_showdown_and_conserves_chips() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    game.player_action(ALICE, PlayerAction::Call).unwrap();
    game.player_action(BOB, PlayerAction::Check).unwrap();
    for expected_board in [4, 5] {
        game.player_action(BOB, PlayerAction::Bet(20)).unwrap();
        game.player_action(ALICE, PlayerAction::Call).unwrap();
        assert_eq!(game.community().len(), expected_board);
    }
    game.player_action(BOB, PlayerAction::Check).unwrap();
    game.player_action(ALICE, PlayerAction::Check).unwrap();

    assert_eq!(game.phase(), GamePhase::Finished);
    assert_eq!(game.pot(), 0);
    assert_eq!(game.chips_in_play(), 2000);
    let result = game.last_result().unwrap();
    assert!(!result.won_by_fold);
    assert_eq!(result.revealed.len(), 2);
    assert_eq!(result.board.len(), 5);
    let paid: u32 = result.awards.iter().map(|a| a.amount).sum();
    assert_eq!(paid, 120);
    assert!(result.verification.verify());
}

#[test]
fn next_hand_rotates_the_button() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    assert_eq!(game.dealer_seat(), 0);
    assert!(matches!(
        game.start_next_hand(),
        Err(GameError::WrongPhase(GamePhase::PreFlop))
    ));
    game.player_action(ALICE, PlayerAction::Fold).unwrap();
    game.start_next_hand().unwrap();
    assert_eq!(game.hand_number(), 2);
    assert_eq!(game.dealer_seat(), 1);
    assert_eq!(current(&game), BOB);
    assert_eq!(game.player(BOB).unwrap().current_bet(), 10);
}

#[test]
fn snapshot_hides_hole_cards_but_shows_commitment() {
    let mut game = heads_up(1000);
    game.start_game().unwrap();
    let snapshot = game.snapshot();
    assert_eq!(snapshot.current_player, Some(ALICE));
    assert_eq!(snapshot.commitment.as_deref(), game.commitment());
    assert!(snapshot.players.iter().all(|p| p.has_cards));

    let json = serde_json::to_string(&snapshot).unwrap();
    for p in game.players() {
        for card in p.hole_cards() {
            let card_json = serde_json::to_string(card).unwrap();
            assert!(!json.contains(&card_json));
        }
    }
    assert_eq!(game.hole_cards_string(ALICE).unwrap().split(' ').count(), 2);
}

#[test]
fn three_handed_hand_with_one_all_in() {
    let mut game = Game::new("t3", GameConfig::with_blinds(5, 10)).unwrap();
    game.add_player(ALICE, "alice", 100).unwrap();
    game.add_player(BOB, "bob", 500).unwrap();
    game.add_player(CAROL, "carol", 500).unwrap();
    game.start_game().unwrap();
    // dealer alice, bob small blind, carol big blind, alice first
    assert_eq!(current(&game), ALICE);
    game.player_action(ALICE, PlayerAction::AllIn).unwrap();
    game.player_action(BOB, PlayerAction::Call).unwrap();
    game.player_action(CAROL, PlayerAction::Call).unwrap();
    assert_eq!(game.phase(), GamePhase::Flop);
    assert_eq!(game.pot(), 300);
    while game.phase() != GamePhase::Finished {
        let who = current(&game);
        game.player_action(who, PlayerAction::Check).unwrap();
    }
    assert_eq!(game.chips_in_play(), 1100);
    let result = game.last_result().unwrap();
    assert_eq!(result.revealed.len(), 3);
}

use crate::errors::TableError;
use crate::events::{EventBus, TableEvent};
use crate::ledger::Ledger;
use crate::settings::TableSettings;
use crate::TableId;
use fairdeal_engine::deck::VerificationBundle;
use fairdeal_engine::game::{ActionOutcome, Game, GameSnapshot};
use fairdeal_engine::logger::{HandLogger, LogEntry};
use fairdeal_engine::player::{PlayerAction, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// One table: a game behind its own lock, plus who owns it.
///
/// Every mutation of the game, whether a player action or a timeout fold,
/// goes through [`Table::lock`], so the two can never interleave.
#[derive(Debug)]
pub struct Table {
    id: TableId,
    host_id: UserId,
    game: Mutex<Game>,
    closed: AtomicBool,
}

impl Table {
    fn new(id: TableId, host_id: UserId, game: Game) -> Self {
        Self {
            id,
            host_id,
            game: Mutex::new(game),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host_id(&self) -> UserId {
        self.host_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Game>, TableError> {
        self.game.lock().map_err(|_| TableError::StoragePoisoned)
    }

    /// Locks the game of a table that is still open.
    fn lock_open(&self) -> Result<MutexGuard<'_, Game>, TableError> {
        let guard = self.lock()?;
        if self.is_closed() {
            return Err(TableError::Closed(self.id.clone()));
        }
        Ok(guard)
    }

    fn ensure_host(&self, user_id: UserId) -> Result<(), TableError> {
        if user_id != self.host_id {
            return Err(TableError::NotHost {
                table_id: self.id.clone(),
                user_id,
            });
        }
        Ok(())
    }
}

/// Owns every table in the process and the chip flow between tables and
/// the ledger.
pub struct TableManager {
    tables: RwLock<HashMap<TableId, Arc<Table>>>,
    event_bus: Arc<EventBus>,
    ledger: Arc<dyn Ledger>,
    settings: TableSettings,
    hand_log: Option<Mutex<HandLogger>>,
}

impl std::fmt::Debug for TableManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableManager")
            .field("tables", &self.table_ids())
            .field("settings", &self.settings)
            .field("hand_log", &self.hand_log.is_some())
            .finish()
    }
}

impl TableManager {
    pub fn new(event_bus: Arc<EventBus>, ledger: Arc<dyn Ledger>, settings: TableSettings) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            event_bus,
            ledger,
            settings,
            hand_log: None,
        }
    }

    /// Appends a record of every finished hand to `logger`.
    pub fn with_hand_log(mut self, logger: HandLogger) -> Self {
        self.hand_log = Some(Mutex::new(logger));
        self
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn create_table(
        &self,
        table_id: impl Into<TableId>,
        host_id: UserId,
        small_blind: u32,
        big_blind: u32,
    ) -> Result<Arc<Table>, TableError> {
        let table_id = table_id.into();
        let game = Game::new(table_id.clone(), self.settings.game_config(small_blind, big_blind))?;
        let table = Arc::new(Table::new(table_id.clone(), host_id, game));
        {
            let mut guard = self
                .tables
                .write()
                .map_err(|_| TableError::StoragePoisoned)?;
            if guard.contains_key(&table_id) {
                return Err(TableError::AlreadyExists(table_id));
            }
            guard.insert(table_id.clone(), Arc::clone(&table));
        }

        tracing::info!(
            table_id = %table_id,
            host_id = %host_id,
            small_blind,
            big_blind,
            "table created"
        );
        self.event_bus.broadcast(
            &table_id,
            TableEvent::TableCreated {
                table_id: table_id.clone(),
                host_id,
                small_blind,
                big_blind,
            },
        );
        Ok(table)
    }

    pub fn get_table(&self, table_id: &str) -> Result<Arc<Table>, TableError> {
        let guard = self
            .tables
            .read()
            .map_err(|_| TableError::StoragePoisoned)?;
        guard
            .get(table_id)
            .cloned()
            .ok_or_else(|| TableError::NotFound(table_id.to_string()))
    }

    /// Open tables, sorted by id.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self
            .open_tables()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        ids.sort();
        ids
    }

    fn open_tables(&self) -> Vec<Arc<Table>> {
        match self.tables.read() {
            Ok(guard) => guard.values().filter(|t| !t.is_closed()).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Seats a player after taking the buy-in from their balance. The buy-in
    /// is returned if the table refuses the seat.
    pub fn add_player(
        &self,
        table_id: &str,
        user_id: UserId,
        name: &str,
        buy_in: u32,
    ) -> Result<(), TableError> {
        let table = self.get_table(table_id)?;
        let mut game = table.lock_open()?;

        self.ledger.debit(user_id, u64::from(buy_in))?;
        if let Err(err) = game.add_player(user_id, name, buy_in) {
            if let Err(refund_err) = self.ledger.credit(user_id, u64::from(buy_in)) {
                tracing::error!(
                    table_id = %table_id,
                    user_id = %user_id,
                    buy_in,
                    error = %refund_err,
                    critical = true,
                    "failed to return buy-in after rejected seat"
                );
            }
            return Err(err.into());
        }
        drop(game);

        tracing::info!(table_id = %table_id, user_id = %user_id, buy_in, "player seated");
        self.event_bus.broadcast(
            table_id,
            TableEvent::PlayerJoined {
                table_id: table_id.to_string(),
                user_id,
                name: name.to_string(),
                buy_in,
            },
        );
        Ok(())
    }

    /// Unseats a player (only between games) and credits their stack back.
    pub fn remove_player(&self, table_id: &str, user_id: UserId) -> Result<u32, TableError> {
        let table = self.get_table(table_id)?;
        let mut game = table.lock_open()?;
        let seated = game.clone();
        let refund = game.remove_player(user_id)?;
        if let Err(err) = self.ledger.credit(user_id, u64::from(refund)) {
            // the chips stay at the table until the ledger takes them
            *game = seated;
            tracing::error!(
                table_id = %table_id,
                user_id = %user_id,
                refund,
                error = %err,
                critical = true,
                "failed to credit refund, player kept seated"
            );
            return Err(err.into());
        }
        drop(game);

        tracing::info!(table_id = %table_id, user_id = %user_id, refund, "player left");
        self.event_bus.broadcast(
            table_id,
            TableEvent::PlayerLeft {
                table_id: table_id.to_string(),
                user_id,
                refund,
            },
        );
        Ok(refund)
    }

    pub fn start_game(&self, table_id: &str, requested_by: UserId) -> Result<GameSnapshot, TableError> {
        let table = self.get_table(table_id)?;
        table.ensure_host(requested_by)?;
        let mut game = table.lock_open()?;
        game.start_game()?;
        self.announce_hand(&game);
        Ok(game.snapshot())
    }

    pub fn start_next_hand(
        &self,
        table_id: &str,
        requested_by: UserId,
    ) -> Result<GameSnapshot, TableError> {
        let table = self.get_table(table_id)?;
        table.ensure_host(requested_by)?;
        let mut game = table.lock_open()?;
        game.start_next_hand()?;
        self.announce_hand(&game);
        Ok(game.snapshot())
    }

    pub fn player_action(
        &self,
        table_id: &str,
        user_id: UserId,
        action: PlayerAction,
    ) -> Result<ActionOutcome, TableError> {
        let table = self.get_table(table_id)?;
        let mut game = table.lock_open()?;
        let outcome = game.player_action(user_id, action)?;

        tracing::debug!(
            table_id = %table_id,
            user_id = %user_id,
            hand = game.hand_number(),
            phase = ?outcome.phase,
            action = %action,
            "action applied"
        );
        self.event_bus.broadcast(
            table_id,
            TableEvent::ActionTaken {
                table_id: table_id.to_string(),
                user_id,
                action,
                message: outcome.message.clone(),
                phase: outcome.phase,
            },
        );
        if outcome.hand_finished {
            self.finish_hand(&game);
        }
        Ok(outcome)
    }

    /// Folds the player to act if their clock has run out.
    ///
    /// Returns `None` when there was nothing to do. The expiry is checked
    /// under the table lock, so an action that arrived first wins.
    pub fn advance_on_timeout(&self, table_id: &str) -> Result<Option<ActionOutcome>, TableError> {
        let table = self.get_table(table_id)?;
        let mut game = table.lock_open()?;
        if !game.is_turn_expired() {
            return Ok(None);
        }
        let user_id = match game.current_player() {
            Some(p) => p.user_id(),
            None => return Ok(None),
        };
        let outcome = game.handle_turn_timeout()?;

        tracing::info!(
            table_id = %table_id,
            user_id = %user_id,
            hand = game.hand_number(),
            "turn timed out, player folded"
        );
        self.event_bus.broadcast(
            table_id,
            TableEvent::TurnTimedOut {
                table_id: table_id.to_string(),
                user_id,
                message: outcome.message.clone(),
            },
        );
        if outcome.hand_finished {
            self.finish_hand(&game);
        }
        Ok(Some(outcome))
    }

    /// Runs [`TableManager::advance_on_timeout`] on every open table and
    /// returns how many players were folded.
    pub fn sweep_timeouts(&self) -> usize {
        let mut folded = 0;
        for table in self.open_tables() {
            match self.advance_on_timeout(table.id()) {
                Ok(Some(_)) => folded += 1,
                Ok(None) | Err(TableError::Closed(_)) => {}
                Err(err) => {
                    err.report(table.id());
                }
            }
        }
        folded
    }

    pub fn game_state(&self, table_id: &str) -> Result<GameSnapshot, TableError> {
        let table = self.get_table(table_id)?;
        let game = table.lock()?;
        Ok(game.snapshot())
    }

    pub fn current_player(&self, table_id: &str) -> Result<Option<UserId>, TableError> {
        let table = self.get_table(table_id)?;
        let game = table.lock()?;
        Ok(game.current_player().map(|p| p.user_id()))
    }

    /// For private delivery to `user_id` only.
    pub fn hole_cards(&self, table_id: &str, user_id: UserId) -> Result<String, TableError> {
        let table = self.get_table(table_id)?;
        let game = table.lock()?;
        Ok(game.hole_cards_string(user_id)?)
    }

    pub fn action_log(&self, table_id: &str) -> Result<Vec<LogEntry>, TableError> {
        let table = self.get_table(table_id)?;
        let game = table.lock()?;
        Ok(game.log().entries().to_vec())
    }

    pub fn verification_bundle(&self, table_id: &str) -> Result<VerificationBundle, TableError> {
        let table = self.get_table(table_id)?;
        let game = table.lock()?;
        Ok(game.verification_bundle()?)
    }

    /// Tears a table down and credits every seated player what they are
    /// owed. Closing an already closed table refunds nothing.
    pub fn close_table(
        &self,
        table_id: &str,
        requested_by: UserId,
    ) -> Result<Vec<(UserId, u32)>, TableError> {
        let table = self.get_table(table_id)?;
        table.ensure_host(requested_by)?;
        let mut game = table.lock()?;
        if table.closed.swap(true, Ordering::AcqRel) {
            return Ok(Vec::new());
        }
        let refunds = game.cash_out_all();
        drop(game);

        let mut first_failure = None;
        for &(user_id, amount) in &refunds {
            if amount == 0 {
                continue;
            }
            if let Err(err) = self.ledger.credit(user_id, u64::from(amount)) {
                tracing::error!(
                    table_id = %table_id,
                    user_id = %user_id,
                    amount,
                    error = %err,
                    critical = true,
                    "refund failed during table teardown"
                );
                first_failure.get_or_insert(err);
            }
        }

        tracing::info!(table_id = %table_id, players = refunds.len(), "table closed");
        self.event_bus.broadcast(
            table_id,
            TableEvent::TableClosed {
                table_id: table_id.to_string(),
                refunds: refunds.clone(),
            },
        );
        self.event_bus.drop_table(table_id);

        match first_failure {
            Some(err) => Err(err.into()),
            None => Ok(refunds),
        }
    }

    /// Drops closed tables from the registry and returns how many went.
    /// Their ids become available to `create_table` again.
    pub fn purge_closed(&self) -> Result<usize, TableError> {
        let mut guard = self
            .tables
            .write()
            .map_err(|_| TableError::StoragePoisoned)?;
        let before = guard.len();
        guard.retain(|table_id, table| {
            let keep = !table.is_closed();
            if !keep {
                tracing::debug!(table_id = %table_id, "closed table purged");
            }
            keep
        });
        Ok(before - guard.len())
    }

    fn announce_hand(&self, game: &Game) {
        let commitment = game.commitment().unwrap_or_default().to_string();
        tracing::info!(
            table_id = %game.table_id(),
            hand = game.hand_number(),
            dealer_seat = game.dealer_seat(),
            commitment = %commitment,
            "hand started"
        );
        self.event_bus.broadcast(
            game.table_id(),
            TableEvent::HandStarted {
                table_id: game.table_id().to_string(),
                hand_number: game.hand_number(),
                dealer_seat: game.dealer_seat(),
                commitment,
            },
        );
        if game.phase() == fairdeal_engine::game::GamePhase::Finished {
            // blinds put everyone all-in and the board ran out
            self.finish_hand(game);
        }
    }

    fn finish_hand(&self, game: &Game) {
        let Some(result) = game.last_result() else {
            return;
        };
        tracing::info!(
            table_id = %game.table_id(),
            hand = result.hand_number,
            winners = ?result.winners,
            won_by_fold = result.won_by_fold,
            "hand finished"
        );
        self.event_bus.broadcast(
            game.table_id(),
            TableEvent::HandFinished {
                table_id: game.table_id().to_string(),
                hand_number: result.hand_number,
                winners: result.winners.clone(),
                awards: result.awards.clone(),
                verification: result.verification.clone(),
            },
        );

        let (Some(hand_log), Some(record)) = (&self.hand_log, game.hand_record()) else {
            return;
        };
        let written = match hand_log.lock() {
            Ok(mut logger) => logger.write(&record),
            Err(_) => Err(std::io::Error::other("hand log lock poisoned")),
        };
        if let Err(err) = written {
            tracing::error!(
                table_id = %game.table_id(),
                hand = result.hand_number,
                error = %err,
                "failed to write hand record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{BalanceRecord, InMemoryLedger, LedgerError};
    use fairdeal_engine::errors::GameError;

    const HOST: UserId = UserId(1);
    const GUEST: UserId = UserId(2);

    fn manager() -> (TableManager, Arc<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::with_balances([(HOST, 5_000), (GUEST, 5_000)]));
        let manager = TableManager::new(
            Arc::new(EventBus::new()),
            ledger.clone(),
            TableSettings::default(),
        );
        (manager, ledger)
    }

    #[test]
    fn duplicate_table_ids_are_rejected() {
        let (m, _) = manager();
        m.create_table("t1", HOST, 10, 20).unwrap();
        assert_eq!(
            m.create_table("t1", GUEST, 10, 20).unwrap_err(),
            TableError::AlreadyExists("t1".into())
        );
        assert_eq!(m.table_ids(), vec!["t1".to_string()]);
    }

    #[test]
    fn rejected_seat_returns_the_buy_in() {
        let (m, ledger) = manager();
        m.create_table("t1", HOST, 10, 20).unwrap();
        m.add_player("t1", HOST, "host", 1_000).unwrap();
        assert!(m.add_player("t1", HOST, "host", 1_000).is_err());
        let rec = ledger.balance(HOST).unwrap();
        assert_eq!(rec.balance, 4_000);
        assert_eq!(rec.in_play, 1_000);
    }

    #[test]
    fn only_the_host_starts_and_closes() {
        let (m, _) = manager();
        m.create_table("t1", HOST, 10, 20).unwrap();
        m.add_player("t1", HOST, "host", 1_000).unwrap();
        m.add_player("t1", GUEST, "guest", 1_000).unwrap();
        assert!(matches!(
            m.start_game("t1", GUEST),
            Err(TableError::NotHost { .. })
        ));
        assert!(matches!(
            m.close_table("t1", GUEST),
            Err(TableError::NotHost { .. })
        ));
        m.start_game("t1", HOST).unwrap();
    }

    /// Refuses credits while `down` is set.
    struct FlakyLedger {
        inner: InMemoryLedger,
        down: AtomicBool,
    }

    impl Ledger for FlakyLedger {
        fn balance(&self, user_id: UserId) -> Result<BalanceRecord, LedgerError> {
            self.inner.balance(user_id)
        }

        fn debit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, LedgerError> {
            self.inner.debit(user_id, amount)
        }

        fn credit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, LedgerError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(LedgerError::Unavailable("ledger offline".into()));
            }
            self.inner.credit(user_id, amount)
        }
    }

    #[test]
    fn failed_refund_keeps_the_player_seated() {
        let ledger = Arc::new(FlakyLedger {
            inner: InMemoryLedger::with_balances([(HOST, 5_000), (GUEST, 5_000)]),
            down: AtomicBool::new(false),
        });
        let m = TableManager::new(
            Arc::new(EventBus::new()),
            ledger.clone(),
            TableSettings::default(),
        );
        m.create_table("t1", HOST, 10, 20).unwrap();
        m.add_player("t1", HOST, "host", 1_000).unwrap();
        m.add_player("t1", GUEST, "guest", 1_500).unwrap();

        ledger.down.store(true, Ordering::SeqCst);
        assert!(matches!(
            m.remove_player("t1", GUEST),
            Err(TableError::Ledger(LedgerError::Unavailable(_)))
        ));
        let table = m.get_table("t1").unwrap();
        {
            let game = table.lock().unwrap();
            assert_eq!(game.player(GUEST).unwrap().stack(), 1_500);
            assert_eq!(game.players()[1].user_id(), GUEST);
            assert_eq!(game.total_buy_in(), 2_500);
        }
        assert_eq!(ledger.balance(GUEST).unwrap().in_play, 1_500);

        ledger.down.store(false, Ordering::SeqCst);
        assert_eq!(m.remove_player("t1", GUEST).unwrap(), 1_500);
        let rec = ledger.balance(GUEST).unwrap();
        assert_eq!(rec.balance, 5_000);
        assert_eq!(rec.in_play, 0);
    }

    #[test]
    fn oversized_buy_in_is_refused_and_returned() {
        let ledger = Arc::new(InMemoryLedger::with_balances([
            (HOST, 4_000_000_000),
            (GUEST, 4_000_000_000),
        ]));
        let m = TableManager::new(
            Arc::new(EventBus::new()),
            ledger.clone(),
            TableSettings::default(),
        );
        m.create_table("t1", HOST, 10, 20).unwrap();
        m.add_player("t1", HOST, "host", 3_000_000_000).unwrap();
        assert!(matches!(
            m.add_player("t1", GUEST, "guest", 3_000_000_000),
            Err(TableError::Game(GameError::BuyInTooLarge { .. }))
        ));
        assert_eq!(ledger.balance(GUEST).unwrap().balance, 4_000_000_000);
        // the table lock is still usable
        assert_eq!(m.close_table("t1", HOST).unwrap(), vec![(HOST, 3_000_000_000)]);
    }

    #[test]
    fn purge_drops_only_closed_tables() {
        let (m, _) = manager();
        m.create_table("t1", HOST, 10, 20).unwrap();
        m.create_table("t2", HOST, 10, 20).unwrap();
        m.close_table("t1", HOST).unwrap();
        assert!(m.get_table("t1").is_ok());

        assert_eq!(m.purge_closed().unwrap(), 1);
        assert_eq!(m.purge_closed().unwrap(), 0);
        assert_eq!(
            m.get_table("t1").unwrap_err(),
            TableError::NotFound("t1".into())
        );
        assert_eq!(m.table_ids(), vec!["t2".to_string()]);
        // the id is free again
        m.create_table("t1", GUEST, 10, 20).unwrap();
    }
}

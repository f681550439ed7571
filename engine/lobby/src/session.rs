//! Game sessions.
//!
//! One session generation runs as a single tokio task that owns every piece
//! of its state: the board, the turn counter and each seated player's
//! connection. Everyone else talks to it through a [`SessionHandle`].
//!
//! # Lifecycle
//!
//! ```text
//! Forming --quota met--> Active --> Won | Drawn | Forfeited --> play-again
//!    |                      |                                     |
//!    +--lobby timeout--> Expired                     recycle or remove
//!    +--everyone gone--> Abandoned <--everyone gone--+
//! ```
//!
//! Once a game is over, every still-connected player may answer `playAgain`.
//! All answers are collected (or the window runs out) before the players who
//! opted in are seated, in their previous seat order, into one fresh
//! generation under the same game id.

use std::time::Duration;

use engine_config::LobbyConfig;
use games_connect4::Board;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::connection::PlayerConnection;
use crate::error::{JoinError, MoveError, TransportError};
use crate::metrics;
use crate::protocol::{ClientMessage, GameSnapshot, Info, PlayerSummary};
use crate::registry::Registry;

/// Commands queued per session before senders wait.
const COMMAND_BUFFER: usize = 32;

/// Smallest lobby a session will form.
pub const MIN_PLAYERS: usize = 2;

/// Timing and sizing knobs shared by every session.
#[derive(Debug, Clone)]
pub struct LobbySettings {
    pub default_players: usize,
    pub max_players: usize,
    pub keepalive_interval: Duration,
    pub lobby_timeout: Duration,
    pub play_again_timeout: Duration,
    pub game_id_length: usize,
    pub create_on_join: bool,
    pub outbound_buffer: usize,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self::from(&LobbyConfig::default())
    }
}

impl From<&LobbyConfig> for LobbySettings {
    fn from(config: &LobbyConfig) -> Self {
        let max_players = config.max_players.max(MIN_PLAYERS);
        Self {
            default_players: config.default_players.clamp(MIN_PLAYERS, max_players),
            max_players,
            // tokio intervals panic on a zero period
            keepalive_interval: config.keepalive_interval().max(Duration::from_millis(1)),
            lobby_timeout: config.lobby_timeout(),
            play_again_timeout: config.play_again_timeout(),
            game_id_length: config.game_id_length,
            create_on_join: config.create_on_join,
            outbound_buffer: config.outbound_buffer.max(1),
        }
    }
}

impl LobbySettings {
    /// Resolve a requested lobby size. Anything missing, unparseable or
    /// outside `2..=max_players` falls back to the default.
    pub fn player_count(&self, requested: Option<&str>) -> usize {
        requested
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| (MIN_PLAYERS..=self.max_players).contains(n))
            .unwrap_or(self.default_players)
    }

    pub(crate) fn clamp_players(&self, required: usize) -> usize {
        required.clamp(MIN_PLAYERS, self.max_players)
    }
}

/// Last message a player was sent, replayed by keep-alives.
#[derive(Debug, Clone, Default)]
struct Status {
    message: String,
    player_turn: bool,
}

/// A named participant and the connection the session owns for them.
#[derive(Debug)]
pub struct Player {
    name: String,
    connection: Option<PlayerConnection>,
    status: Status,
}

impl Player {
    pub fn new(name: impl Into<String>, connection: PlayerConnection) -> Self {
        Self {
            name: name.into(),
            connection: Some(connection),
            status: Status::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn send(&self, info: Info) -> Result<(), TransportError> {
        match &self.connection {
            Some(connection) => connection.send(info),
            None => Err(TransportError::Detached),
        }
    }

    /// Deliver the rejection envelope, then close the connection.
    pub(crate) fn reject(self, error: &JoinError) {
        metrics::JOIN_REJECTIONS.inc();
        let game_id = error.game_id();
        let message = error.wire_message();
        debug!(game_id, player = %self.name, message, "Rejecting join");
        if let Err(e) = self.send(Info::rejection(game_id, message)) {
            debug!(game_id, player = %self.name, "Rejection not delivered: {}", e);
        }
    }
}

/// Outcome of a join, reported back by the session.
pub type JoinReply = oneshot::Sender<Result<(), JoinError>>;

pub enum SessionCommand {
    Join { player: Player, reply: JoinReply },
    KeepAlive,
}

/// Cheap, cloneable reference to one session generation.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    game_id: String,
    generation: u64,
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hand a player to the session and wait for it to seat or refuse them.
    /// A refused player has already been sent the rejection envelope.
    pub async fn join(&self, player: Player) -> Result<(), JoinError> {
        let (reply, outcome) = oneshot::channel();
        if let Err(mpsc::error::SendError(command)) =
            self.commands.send(SessionCommand::Join { player, reply }).await
        {
            // The generation ended between lookup and join
            let error = JoinError::NotFound(self.game_id.clone());
            if let SessionCommand::Join { player, .. } = command {
                player.reject(&error);
            }
            return Err(error);
        }
        // A dropped reply means the session ended with the join still queued
        outcome
            .await
            .unwrap_or_else(|_| Err(JoinError::NotFound(self.game_id.clone())))
    }
}

/// Refuse a join the session cannot take.
fn refuse(game_id: &str, player: Player, reply: JoinReply) {
    let error = JoinError::Full(game_id.to_string());
    player.reject(&error);
    let _ = reply.send(Err(error));
}

/// Where a session stands. Everything past `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Forming,
    Active,
    Won { winner: usize },
    Drawn,
    Forfeited { player: usize },
    Expired,
    Abandoned,
}

impl Phase {
    pub fn is_over(&self) -> bool {
        !matches!(self, Phase::Forming | Phase::Active)
    }
}

enum TurnEvent {
    Message(Option<String>),
    Command(Option<SessionCommand>),
}

/// Start a new generation: the session task plus its keep-alive ticker.
pub(crate) fn spawn(
    game_id: String,
    generation: u64,
    required: usize,
    registry: Registry,
) -> SessionHandle {
    let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
    let settings = registry.settings().clone();

    let session = Session {
        game_id: game_id.clone(),
        generation,
        required,
        players: Vec::with_capacity(required),
        board: Board::new(),
        turn: 0,
        phase: Phase::Forming,
        commands: receiver,
        registry,
        settings,
        seated_any: false,
    };
    tokio::spawn(keep_alive(commands.clone(), session.settings.keepalive_interval));
    tokio::spawn(session.run());

    SessionHandle {
        game_id,
        generation,
        commands,
    }
}

/// Nudge the session every `period` until it stops listening.
async fn keep_alive(commands: mpsc::Sender<SessionCommand>, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        if commands.send(SessionCommand::KeepAlive).await.is_err() {
            break;
        }
    }
}

struct Session {
    game_id: String,
    generation: u64,
    required: usize,
    /// Join order is turn order
    players: Vec<Player>,
    board: Board,
    turn: u64,
    phase: Phase,
    commands: mpsc::Receiver<SessionCommand>,
    registry: Registry,
    settings: LobbySettings,
    /// Set once the first player is seated; an empty lobby before that is
    /// still waiting, not abandoned.
    seated_any: bool,
}

impl Session {
    async fn run(mut self) {
        metrics::SESSIONS_ACTIVE.inc();
        info!(
            game_id = %self.game_id,
            generation = self.generation,
            required = self.required,
            "Lobby forming"
        );

        self.form().await;
        if self.phase == Phase::Active {
            self.play().await;
        }

        match self.phase {
            Phase::Won { .. } | Phase::Drawn | Phase::Forfeited { .. } => {
                self.play_again().await;
            }
            Phase::Expired => {
                metrics::LOBBIES_EXPIRED.inc();
                info!(game_id = %self.game_id, generation = self.generation, "Lobby timed out");
                let game = self.snapshot();
                for player in self.players.drain(..) {
                    let info = Info {
                        game: game.clone(),
                        message: "Lobby timed out.".to_string(),
                        player_turn: false,
                        player_index: -1,
                    };
                    let _ = player.send(info);
                }
                self.registry.remove_generation(&self.game_id, self.generation);
            }
            Phase::Abandoned => {
                info!(game_id = %self.game_id, generation = self.generation, "Session abandoned");
                self.players.clear();
                self.registry.remove_generation(&self.game_id, self.generation);
            }
            Phase::Forming | Phase::Active => {}
        }

        metrics::SESSIONS_ACTIVE.dec();
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.board.grid(),
            turn: self.turn,
            players: self
                .players
                .iter()
                .map(|p| PlayerSummary {
                    name: p.name.clone(),
                })
                .collect(),
            game_id: self.game_id.clone(),
            is_over: self.phase.is_over(),
        }
    }

    /// Send `message` to the player at `seat` and remember it for keep-alives.
    fn notify(
        &mut self,
        seat: usize,
        message: impl Into<String>,
        player_turn: bool,
    ) -> Result<(), TransportError> {
        let message = message.into();
        let info = Info {
            game: self.snapshot(),
            message: message.clone(),
            player_turn,
            player_index: seat as i64,
        };
        let player = &mut self.players[seat];
        player.status = Status {
            message,
            player_turn,
        };
        player.send(info)
    }

    fn connected(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected()).count()
    }

    // ------------------------------------------------------------------
    // Forming
    // ------------------------------------------------------------------

    async fn form(&mut self) {
        let deadline = time::sleep(self.settings.lobby_timeout);
        tokio::pin!(deadline);

        while self.phase == Phase::Forming {
            tokio::select! {
                _ = &mut deadline => {
                    self.phase = Phase::Expired;
                }
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Join { player, reply }) => self.register(player, reply),
                    Some(SessionCommand::KeepAlive) => self.refresh_forming(),
                    None => self.phase = Phase::Abandoned,
                },
            }

            if self.phase == Phase::Forming && self.seated_any && self.players.is_empty() {
                self.phase = Phase::Abandoned;
            }
        }
    }

    fn register(&mut self, player: Player, reply: JoinReply) {
        if self.phase != Phase::Forming || self.players.len() >= self.required {
            refuse(&self.game_id, player, reply);
            return;
        }

        info!(
            game_id = %self.game_id,
            generation = self.generation,
            player = %player.name,
            seat = self.players.len(),
            "Player joined"
        );
        metrics::PLAYERS_JOINED.inc();
        self.players.push(player);
        self.seated_any = true;
        let _ = reply.send(Ok(()));

        if self.players.len() == self.required {
            info!(game_id = %self.game_id, generation = self.generation, "Lobby full, game starting");
            self.phase = Phase::Active;
        } else {
            self.broadcast_waiting();
        }
    }

    /// Tell everyone how many seats remain. Players that cannot be reached
    /// are pruned and the count re-sent; every round removes at least one
    /// player, so this runs at most `players + 1` rounds.
    fn broadcast_waiting(&mut self) {
        for _ in 0..=self.players.len() {
            if self.players.is_empty() {
                return;
            }
            let remaining = self.required - self.players.len();
            let message = format!("Waiting for {} more player(s)...", remaining);
            let failed: Vec<bool> = (0..self.players.len())
                .map(|seat| self.notify(seat, message.clone(), false).is_err())
                .collect();
            if !self.prune(&failed) {
                return;
            }
        }
    }

    /// Drop players flagged in `failed`. Returns whether any were dropped.
    fn prune(&mut self, failed: &[bool]) -> bool {
        if !failed.iter().any(|f| *f) {
            return false;
        }
        let mut seat = 0;
        self.players.retain(|player| {
            let keep = !failed[seat];
            if !keep {
                debug!(player = %player.name, "Pruning unreachable player from lobby");
            }
            seat += 1;
            keep
        });
        true
    }

    /// Replay every player's last status with a fresh snapshot.
    fn refresh(&mut self) -> Vec<bool> {
        (0..self.players.len())
            .map(|seat| {
                let status = self.players[seat].status.clone();
                self.notify(seat, status.message, status.player_turn)
                    .is_err()
            })
            .collect()
    }

    fn refresh_forming(&mut self) {
        let failed = self.refresh();
        if self.prune(&failed) {
            self.broadcast_waiting();
        }
    }

    // ------------------------------------------------------------------
    // Active
    // ------------------------------------------------------------------

    async fn play(&mut self) {
        while self.phase == Phase::Active {
            let current = (self.turn % self.players.len() as u64) as usize;
            if let Some(connection) = self.players[current].connection.as_mut() {
                let stale = connection.drain();
                if stale > 0 {
                    debug!(game_id = %self.game_id, seat = current, stale, "Discarded out-of-turn messages");
                }
            }

            if let Some(seat) = self.prompt(current) {
                self.forfeit(seat);
                return;
            }

            let text = match self.await_move(current).await {
                Some(text) => text,
                None => return,
            };

            match self.apply_move(current, &text) {
                Ok((column, row)) => self.after_move(current, column, row),
                Err(e) => {
                    warn!(
                        game_id = %self.game_id,
                        player = %self.players[current].name,
                        turn = self.turn,
                        "Rejected move: {}",
                        e
                    );
                    self.forfeit(current);
                }
            }
        }
    }

    /// Prompt the mover first, then everyone else in seat order. Returns the
    /// first seat that could not be reached.
    fn prompt(&mut self, current: usize) -> Option<usize> {
        if self.notify(current, "Your turn.", true).is_err() {
            return Some(current);
        }
        let waiting_on = format!("{}'s turn.", self.players[current].name);
        (0..self.players.len())
            .filter(|seat| *seat != current)
            .find(|seat| self.notify(*seat, waiting_on.clone(), false).is_err())
    }

    /// Wait for the mover's next message, serving commands meanwhile.
    /// Returns `None` once the session left the `Active` phase.
    async fn await_move(&mut self, current: usize) -> Option<String> {
        loop {
            let event = {
                let Some(connection) = self.players[current].connection.as_mut() else {
                    self.forfeit(current);
                    return None;
                };
                let commands = &mut self.commands;
                tokio::select! {
                    message = connection.recv() => TurnEvent::Message(message),
                    command = commands.recv() => TurnEvent::Command(command),
                }
            };

            match event {
                TurnEvent::Message(Some(text)) => return Some(text),
                TurnEvent::Message(None) => {
                    warn!(
                        game_id = %self.game_id,
                        player = %self.players[current].name,
                        "Player disconnected on their turn"
                    );
                    self.forfeit(current);
                    return None;
                }
                TurnEvent::Command(Some(SessionCommand::Join { player, reply })) => {
                    refuse(&self.game_id, player, reply);
                }
                TurnEvent::Command(Some(SessionCommand::KeepAlive)) => {
                    self.refresh_active();
                    if self.phase != Phase::Active {
                        return None;
                    }
                }
                TurnEvent::Command(None) => {
                    self.phase = Phase::Abandoned;
                    return None;
                }
            }
        }
    }

    /// Unreachable players lose their connection and are forfeited when next
    /// prompted. With nobody left the session is abandoned.
    fn refresh_active(&mut self) {
        let failed = self.refresh();
        for (seat, failed) in failed.into_iter().enumerate() {
            if failed && self.players[seat].connection.take().is_some() {
                warn!(
                    game_id = %self.game_id,
                    player = %self.players[seat].name,
                    "Keep-alive failed, dropping connection"
                );
            }
        }
        if self.connected() == 0 {
            self.phase = Phase::Abandoned;
        }
    }

    fn apply_move(&mut self, current: usize, text: &str) -> Result<(usize, usize), MoveError> {
        let (column, row) = ClientMessage::parse(text)?.coordinates()?;
        if !self.board.is_valid_move(column, row) {
            return Err(MoveError::Illegal { column, row });
        }
        self.board.place(column, row, current);
        self.turn += 1;
        metrics::MOVES_PLAYED.inc();
        debug!(
            game_id = %self.game_id,
            player = %self.players[current].name,
            column,
            row,
            turn = self.turn,
            "Move accepted"
        );
        Ok((column, row))
    }

    fn after_move(&mut self, current: usize, column: usize, row: usize) {
        if self.board.is_winning_move(column, row) {
            self.phase = Phase::Won { winner: current };
            metrics::GAMES_COMPLETED.with_label_values(&["won"]).inc();
            let winner = self.players[current].name.clone();
            info!(game_id = %self.game_id, generation = self.generation, winner = %winner, turn = self.turn, "Game won");

            let lost = format!("{} won. You lose.", winner);
            for seat in 0..self.players.len() {
                let message = if seat == current { "You won!".to_string() } else { lost.clone() };
                self.notify_final(seat, message);
            }
        } else if self.board.is_full() {
            self.phase = Phase::Drawn;
            metrics::GAMES_COMPLETED.with_label_values(&["drawn"]).inc();
            info!(game_id = %self.game_id, generation = self.generation, turn = self.turn, "Game drawn");

            for seat in 0..self.players.len() {
                self.notify_final(seat, "It's a draw!");
            }
        }
    }

    /// End-of-game notice. A player that cannot be reached is not waited on
    /// for a play-again answer.
    fn notify_final(&mut self, seat: usize, message: impl Into<String>) {
        if let Err(e) = self.notify(seat, message, false) {
            debug!(game_id = %self.game_id, seat, "Final notice not delivered: {}", e);
            self.players[seat].connection = None;
        }
    }

    fn forfeit(&mut self, seat: usize) {
        self.phase = Phase::Forfeited { player: seat };
        metrics::GAMES_COMPLETED
            .with_label_values(&["forfeited"])
            .inc();
        let name = self.players[seat].name.clone();
        warn!(
            game_id = %self.game_id,
            generation = self.generation,
            player = %name,
            turn = self.turn,
            "Player forfeited"
        );

        // No seat index: the forfeiter is not offered another game
        let notice = Info {
            game: self.snapshot(),
            message: "You have been disconnected.".to_string(),
            player_turn: false,
            player_index: -1,
        };
        let forfeiter = &mut self.players[seat];
        forfeiter.status = Status {
            message: notice.message.clone(),
            player_turn: false,
        };
        if let Some(connection) = forfeiter.connection.take() {
            let _ = connection.send(notice);
        }

        let message = format!("{} disconnected, game over.", name);
        for other in (0..self.players.len()).filter(|s| *s != seat) {
            self.notify_final(other, message.clone());
        }
    }

    // ------------------------------------------------------------------
    // Play again
    // ------------------------------------------------------------------

    async fn play_again(&mut self) {
        let window = self.settings.play_again_timeout;
        let mut answers = JoinSet::new();
        for (seat, player) in self.players.drain(..).enumerate() {
            let Player {
                name, connection, ..
            } = player;
            if let Some(mut connection) = connection {
                answers.spawn(async move {
                    let again = await_play_again(&mut connection, window).await;
                    (seat, name, connection, again)
                });
            }
        }

        let mut rejoining = Vec::new();
        let mut listening = true;
        loop {
            tokio::select! {
                answer = answers.join_next() => match answer {
                    Some(Ok((seat, name, connection, true))) => {
                        rejoining.push((seat, Player::new(name, connection)));
                    }
                    Some(Ok((_, name, _, false))) => {
                        debug!(game_id = %self.game_id, player = %name, "Player left after the game");
                    }
                    Some(Err(e)) => warn!(game_id = %self.game_id, "Play-again task failed: {}", e),
                    None => break,
                },
                command = self.commands.recv(), if listening => match command {
                    Some(SessionCommand::Join { player, reply }) => refuse(&self.game_id, player, reply),
                    Some(SessionCommand::KeepAlive) => {}
                    None => listening = false,
                },
            }
        }

        if rejoining.is_empty() {
            info!(game_id = %self.game_id, generation = self.generation, "Nobody stayed, closing lobby");
            self.registry.remove_generation(&self.game_id, self.generation);
            return;
        }

        rejoining.sort_by_key(|(seat, _)| *seat);
        match self
            .registry
            .recycle(&self.game_id, self.generation, self.required)
        {
            Some(next) => {
                info!(
                    game_id = %self.game_id,
                    generation = next.generation(),
                    players = rejoining.len(),
                    "Starting next game"
                );
                for (_, player) in rejoining {
                    // A rejection has already been delivered on failure
                    let _ = next.join(player).await;
                }
            }
            None => {
                let error = JoinError::NotFound(self.game_id.clone());
                for (_, player) in rejoining {
                    player.reject(&error);
                }
            }
        }
    }
}

/// Wait for a `playAgain` answer. Other messages are ignored; silence,
/// disconnects and an expired window all count as declining.
async fn await_play_again(connection: &mut PlayerConnection, window: Duration) -> bool {
    let answer = time::timeout(window, async {
        while let Some(text) = connection.recv().await {
            if let Ok(ClientMessage {
                play_again: Some(again),
                ..
            }) = ClientMessage::parse(&text)
            {
                return again;
            }
        }
        false
    })
    .await;
    answer.unwrap_or(false)
}

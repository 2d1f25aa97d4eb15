use glam::Vec2;

use crate::map::GridMap;
use crate::net::{
    ClientPacket, Connection, ConnectionState, Hello, InputLog, SendError, ServerPacket,
    ServerState, SessionStats,
};
use crate::physics::move_and_collide;
use crate::platform::Platform;
use crate::player::{CameraConfig, LocalPlayer, PlayerConfig};
use crate::render::Renderer;
use crate::sprite::{SpriteDesc, SpriteInit, SpriteKind, SpriteSet, SpriteTransform};

pub const BULLET_DAMAGE: i32 = 25;

/// What a handled packet means for the surrounding client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Joined,
    /// `None` while the lobby waits for players.
    Countdown(Option<u32>),
    GameStarted,
    Damaged { health: i32 },
    /// The local player was destroyed by `killer`.
    Died { killer: u8 },
    /// The last remote player left the game.
    LastPlayerGone,
    Terminated,
}

/// Everything that lives for one game: the map, the local player, remote
/// sprites, the input log and the protocol endpoint.
pub struct Session {
    pub connection: Connection,
    pub stats: SessionStats,
    pub player: LocalPlayer,
    pub sprites: SpriteSet,
    map: Option<GridMap>,
    local_id: Option<u8>,
    tracked: Option<u8>,
    input_log: InputLog,
    player_config: PlayerConfig,
    wait_time: Option<u32>,
    game_start: Option<f64>,
    offline: bool,
}

impl Session {
    pub fn new(player_config: PlayerConfig, camera: &CameraConfig, drop_tolerance: u32) -> Self {
        Self {
            connection: Connection::new(drop_tolerance),
            stats: SessionStats::default(),
            player: LocalPlayer::new(camera, player_config.max_health),
            sprites: SpriteSet::new(),
            map: None,
            local_id: None,
            tracked: None,
            input_log: InputLog::default(),
            player_config,
            wait_time: None,
            game_start: None,
            offline: false,
        }
    }

    pub fn open(&mut self, game_id: u32, token: u32) {
        self.reset();
        self.connection.open(game_id, token);
        log::info!("Opening session for game {game_id}");
    }

    /// Local play on `map` with no server.
    pub fn start_offline(&mut self, map: GridMap, spawn: Vec2, now: f64) {
        self.reset();
        self.map = Some(map);
        self.offline = true;
        self.game_start = Some(now);
        self.player.place(spawn);
        log::info!("Starting offline session");
    }

    /// Drops all per-game state.
    pub fn reset(&mut self) {
        self.connection.close();
        self.map = None;
        self.local_id = None;
        self.tracked = None;
        self.sprites.clear();
        self.input_log.clear();
        self.wait_time = None;
        self.game_start = None;
        self.offline = false;
        self.player.health = self.player_config.max_health;
        self.player.keys = Default::default();
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state
    }

    pub fn map(&self) -> Option<&GridMap> {
        self.map.as_ref()
    }

    pub fn local_id(&self) -> Option<u8> {
        self.local_id
    }

    pub fn tracked(&self) -> Option<u8> {
        self.tracked
    }

    pub fn wait_time(&self) -> Option<u32> {
        self.wait_time
    }

    pub fn input_log(&self) -> &InputLog {
        &self.input_log
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn player_config(&self) -> &PlayerConfig {
        &self.player_config
    }

    /// Seconds since the round started, the clock shared with the server.
    pub fn game_time(&self, now: f64) -> f32 {
        self.game_start.map_or(0.0, |start| (now - start).max(0.0) as f32)
    }

    fn controls_player(&self) -> bool {
        self.offline
            || (self.local_id.is_some() && self.connection.state == ConnectionState::Updating)
    }

    /// Sends through the platform. A short write closes the connection.
    pub fn send<P: Platform>(
        &mut self,
        platform: &mut P,
        packet: &ClientPacket,
    ) -> Result<(), SendError> {
        let data = match self.connection.prepare(packet) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Not sending: {e}");
                self.stats.send_refused += 1;
                return Err(e);
            }
        };

        let sent = platform.send_datagram(&data);
        if sent < data.len() {
            log::error!("Transport failure, sent {sent} of {} bytes", data.len());
            self.connection.close();
            return Err(SendError::Transport {
                sent,
                expected: data.len(),
            });
        }

        self.stats.record_sent(sent);
        if let ClientPacket::Ready { .. } = packet {
            if self.connection.state == ConnectionState::Connected {
                self.connection.state = ConnectionState::Joining;
            }
        }
        Ok(())
    }

    /// Logs the local velocity change and tells the server about it.
    pub fn push_input<P: Platform>(&mut self, platform: &mut P, now: f64) -> Result<(), SendError> {
        if !self.controls_player() {
            return Ok(());
        }

        let timestamp = self.game_time(now);
        let velocity = self.player.velocity(self.player_config.run_speed);
        self.input_log.push(timestamp, velocity);

        if self.offline {
            return Ok(());
        }
        let packet = ClientPacket::Update {
            keys: self.player.keys,
            rotation: self.player.rotation(),
            timestamp,
        };
        self.send(platform, &packet)
    }

    pub fn tick(&mut self, dt: f32) {
        let Some(map) = self.map.as_ref() else {
            return;
        };

        if self.controls_player() {
            let velocity = self.player.velocity(self.player_config.run_speed);
            move_and_collide(
                map,
                &mut self.player.position,
                velocity * dt,
                self.player_config.radius,
            );
        }
        self.sprites.update(map, dt);
        self.player.smooth_display(self.player_config.display_smoothing);
    }

    /// Renders the scene, or returns false when there is no map yet.
    pub fn draw(&mut self, renderer: &mut Renderer, hidden: Option<u8>) -> bool {
        let Some(map) = self.map.as_ref() else {
            return false;
        };
        renderer.render(map, &self.player, &mut self.sprites, hidden);
        true
    }

    /// Puts the camera on the tracked sprite, if it still exists.
    pub fn follow_tracked(&mut self) {
        let Some(sprite) = self.tracked.and_then(|id| self.sprites.get(id)) else {
            return;
        };
        let (position, rotation) = (sprite.position, sprite.rotation);
        self.player.place(position);
        self.player.set_rotation(rotation);
    }

    /// Entry point for every inbound datagram. Malformed, unexpected and
    /// out-of-window packets are logged, counted and dropped.
    pub fn handle_datagram(&mut self, data: &[u8], now: f64) -> Option<SessionEvent> {
        self.stats.record_received(data.len());

        let packet = match self.connection.admit(data) {
            Ok(packet) => packet,
            Err(reason) => {
                log::warn!("Dropping packet: {reason}");
                self.stats.record_drop(&reason);
                return None;
            }
        };

        match packet {
            ServerPacket::Hello(hello) => Some(self.on_hello(hello)),
            ServerPacket::Update {
                timestamp,
                id,
                transform,
            } => {
                self.on_update(timestamp, id, &transform, now);
                None
            }
            ServerPacket::Create(init) => {
                self.on_create(init);
                None
            }
            ServerPacket::Destroy(desc) => self.on_destroy(desc),
            ServerPacket::Wait { seconds, waiting } => Some(self.on_wait(seconds, waiting, now)),
            ServerPacket::Terminate => {
                log::info!("Server terminated the session");
                self.connection.close();
                Some(SessionEvent::Terminated)
            }
        }
    }

    fn on_hello(&mut self, hello: Hello) -> SessionEvent {
        log::info!(
            "Joined as player {} on a {}x{} map with {} sprites",
            hello.player_id,
            hello.map.width(),
            hello.map.height(),
            hello.sprites.len()
        );

        self.local_id = Some(hello.player_id);
        self.sprites.clear();
        self.input_log.clear();
        self.player.health = self.player_config.max_health;
        for init in hello.sprites {
            self.on_create(init);
        }

        self.map = Some(hello.map);
        self.connection.state = ConnectionState::Waiting;
        SessionEvent::Joined
    }

    fn on_update(&mut self, timestamp: f32, id: u8, transform: &SpriteTransform, now: f64) {
        if self.local_id != Some(id) {
            if !self.sprites.apply_transform(id, transform) {
                log::debug!("Update for unknown sprite {id}");
            }
            return;
        }

        let Some(map) = self.map.as_ref() else {
            return;
        };
        let server = ServerState {
            timestamp,
            position: transform.position,
            velocity: transform.velocity,
        };
        let now = self.game_time(now);
        self.player.position =
            self.input_log
                .reconcile(map, &server, now, self.player_config.radius);
    }

    fn on_create(&mut self, init: SpriteInit) {
        if self.local_id == Some(init.desc.id) {
            self.player.place(init.transform.position);
            self.player.set_rotation(init.transform.rotation);
            return;
        }
        self.sprites.create(init);
    }

    fn on_destroy(&mut self, desc: SpriteDesc) -> Option<SessionEvent> {
        if self.local_id == Some(desc.id) {
            log::info!("Local player destroyed by {}", desc.field);
            self.local_id = None;
            self.tracked = Some(desc.field);
            self.player.health = 0;
            self.player.keys = Default::default();
            return Some(SessionEvent::Died { killer: desc.field });
        }

        if self.sprites.destroy(desc.id).is_none() {
            log::debug!("Destroy for unknown sprite {}", desc.id);
        }
        if self.tracked == Some(desc.id) {
            self.tracked = Some(desc.field);
        }

        match desc.kind {
            SpriteKind::Bullet if self.local_id == Some(desc.field) => {
                self.player.health = (self.player.health - BULLET_DAMAGE).max(0);
                Some(SessionEvent::Damaged {
                    health: self.player.health,
                })
            }
            SpriteKind::Player if self.sprites.count(SpriteKind::Player) == 0 => {
                Some(SessionEvent::LastPlayerGone)
            }
            _ => None,
        }
    }

    fn on_wait(&mut self, seconds: u32, waiting: bool, now: f64) -> SessionEvent {
        if !waiting && seconds == 0 {
            log::info!("Game started");
            self.connection.state = ConnectionState::Updating;
            self.game_start = Some(now);
            self.wait_time = None;
            self.input_log.clear();
            return SessionEvent::GameStarted;
        }

        self.wait_time = if waiting { None } else { Some(seconds) };
        SessionEvent::Countdown(self.wait_time)
    }
}

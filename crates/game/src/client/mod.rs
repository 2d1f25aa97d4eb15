mod config;
mod view;

pub use config::ClientConfig;
pub use view::View;

use glam::Vec2;

use crate::map::GridMap;
use crate::net::{ClientPacket, ClientPacketKind, ConnectionState, SendError};
use crate::platform::Platform;
use crate::player::Key;
use crate::render::{HealthBar, Renderer};
use crate::session::{Session, SessionEvent};

/// The client core. The host drives it with ticks, datagrams and input
/// events; everything it needs from the outside goes through `P`.
pub struct Client<P: Platform> {
    config: ClientConfig,
    platform: P,
    session: Session,
    renderer: Renderer,
    health_bar: HealthBar,
    view: View,
    game_id: u32,
    token: u32,
    running: bool,
    input_dirty: bool,
    pointer_captured: bool,
    loading_since: f64,
}

impl<P: Platform> Client<P> {
    pub fn new(config: ClientConfig, platform: P) -> Self {
        let session = Session::new(config.player.clone(), &config.camera, config.drop_tolerance);
        let renderer = Renderer::new(
            config.framebuffer_width,
            config.framebuffer_height,
            config.camera.depth_of_field,
        );
        let health_bar = HealthBar::new(config.player.max_health);

        Self {
            config,
            platform,
            session,
            renderer,
            health_bar,
            view: View::Menu,
            game_id: 0,
            token: 0,
            running: true,
            input_dirty: false,
            pointer_captured: false,
            loading_since: 0.0,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Joins `game_id` right away if the transport is up, otherwise waits
    /// in the menu for `join`.
    pub fn init(&mut self, game_id: u32, token: u32, transport_ready: bool) {
        self.game_id = game_id;
        self.token = token;
        log::info!("Client initialized for game {game_id}");

        if transport_ready {
            self.join();
        } else {
            self.enter(View::Menu);
        }
    }

    pub fn join(&mut self) {
        if !matches!(self.view, View::Menu | View::Error) {
            log::warn!("Ignoring join while {:?}", self.view);
            return;
        }
        self.session.open(self.game_id, self.token);
        self.health_bar.reset(self.session.player.health);
        self.loading_since = self.platform.now();
        self.enter(View::Loading);
    }

    /// Local play without a server.
    pub fn start_offline(&mut self, map: GridMap, spawn: Vec2) {
        let now = self.platform.now();
        self.session.start_offline(map, spawn, now);
        self.health_bar.reset(self.session.player.health);
        self.enter(View::Playing);
    }

    pub fn set_ready(&mut self, ready: bool) {
        if self.view == View::Waiting {
            self.send(ClientPacket::Ready { yes: ready });
        }
    }

    pub fn leave(&mut self) {
        self.say_goodbye();
        self.session.reset();
        self.enter(View::Menu);
    }

    pub fn exit(&mut self) {
        self.say_goodbye();
        self.session.reset();
        self.release_pointer();
        self.running = false;
        log::info!("Client exiting");
    }

    /// Advances one frame and presents it. Returns false once the client
    /// has exited.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        let now = self.platform.now();

        match self.view {
            View::Menu | View::Error => {}
            View::Loading => self.tick_loading(now),
            View::Waiting => match self.session.state() {
                ConnectionState::Updating => self.enter(View::Playing),
                ConnectionState::Disconnected => self.fail("connection lost while waiting"),
                _ => {}
            },
            View::Playing => {
                if self.input_dirty {
                    self.flush_input(now);
                }
            }
            View::Paused => {}
            View::Over { .. } => self.session.follow_tracked(),
        }

        if self.view.shows_world() {
            self.session.tick(dt);
        }
        self.health_bar.update(self.session.player.health);
        self.draw();
        self.platform.present(self.renderer.framebuffer());

        self.running
    }

    pub fn on_packet_received(&mut self, data: &[u8]) {
        let now = self.platform.now();
        let Some(event) = self.session.handle_datagram(data, now) else {
            return;
        };

        match event {
            SessionEvent::GameStarted if self.view == View::Waiting => self.enter(View::Playing),
            SessionEvent::Died { .. } => self.enter(View::Over { dead: true }),
            SessionEvent::LastPlayerGone
                if matches!(self.view, View::Playing | View::Paused) =>
            {
                self.enter(View::Over { dead: false })
            }
            SessionEvent::Terminated if !matches!(self.view, View::Over { .. }) => {
                self.fail("session terminated by server")
            }
            _ => {}
        }
    }

    pub fn on_key(&mut self, key: Key, pressed: bool) {
        match self.view {
            View::Playing => match key {
                Key::Pause | Key::Escape if pressed => self.pause(),
                _ => {
                    if let Some(flag) = key.movement_flag() {
                        let keys = &mut self.session.player.keys;
                        if keys.contains(flag) != pressed {
                            keys.set(flag, pressed);
                            self.input_dirty = true;
                        }
                    }
                }
            },
            View::Paused if pressed => self.resume(),
            View::Over { .. } | View::Error if pressed && key == Key::Escape => self.leave(),
            _ => {}
        }
    }

    pub fn on_mouse_move(&mut self, dx: f32, _dy: f32) {
        if self.view != View::Playing {
            return;
        }
        let scale = self.config.mouse_sensitivity * self.config.player.rotation_speed;
        self.session.player.rotate(dx * scale);
        self.input_dirty = true;
    }

    pub fn on_mouse_button(&mut self, pressed: bool) {
        if !pressed {
            return;
        }
        match self.view {
            View::Playing if !self.session.is_offline() => self.send(ClientPacket::Fire),
            View::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn on_pointer_lock_changed(&mut self, locked: bool) {
        self.pointer_captured = locked;
        if !locked && self.view == View::Playing {
            self.pause();
        }
    }

    fn tick_loading(&mut self, now: f64) {
        match self.session.state() {
            ConnectionState::Connected => self.send(ClientPacket::Ready { yes: false }),
            ConnectionState::Joining => {
                if now - self.loading_since > self.config.loading_timeout_secs {
                    self.fail("timed out joining");
                }
            }
            ConnectionState::Waiting => self.enter(View::Waiting),
            ConnectionState::Updating => self.enter(View::Playing),
            ConnectionState::Disconnected => self.fail("not connected"),
        }
    }

    fn flush_input(&mut self, now: f64) {
        self.input_dirty = false;
        if let Err(SendError::Transport { .. }) = self.session.push_input(&mut self.platform, now) {
            self.fail("transport failure");
        }
    }

    fn pause(&mut self) {
        self.session.player.keys = Default::default();
        self.flush_input(self.platform.now());
        if self.view == View::Playing {
            self.enter(View::Paused);
        }
    }

    fn resume(&mut self) {
        self.enter(View::Playing);
    }

    fn say_goodbye(&mut self) {
        if self.session.state().can_send(ClientPacketKind::Leave) {
            self.send(ClientPacket::Leave);
        }
    }

    fn send(&mut self, packet: ClientPacket) {
        if let Err(SendError::Transport { .. }) = self.session.send(&mut self.platform, &packet) {
            self.fail("transport failure");
        }
    }

    fn fail(&mut self, reason: &str) {
        log::error!("{reason}");
        self.session.connection.close();
        self.enter(View::Error);
    }

    fn enter(&mut self, view: View) {
        if self.view != view {
            log::debug!("View {:?} -> {view:?}", self.view);
        }
        self.view = view;

        if view == View::Playing {
            self.capture_pointer();
        } else {
            self.release_pointer();
        }
    }

    fn capture_pointer(&mut self) {
        if !self.pointer_captured {
            self.platform.capture_pointer();
            self.pointer_captured = true;
        }
    }

    fn release_pointer(&mut self) {
        if self.pointer_captured {
            self.platform.release_pointer();
            self.pointer_captured = false;
        }
    }

    fn draw(&mut self) {
        self.renderer.set_alpha(self.view.alpha());

        let hidden = match self.view {
            View::Over { .. } => self.session.tracked(),
            _ => None,
        };
        let drawn = self.view.shows_world() && self.session.draw(&mut self.renderer, hidden);
        if !drawn {
            self.renderer.clear(0);
            return;
        }

        if self.view.shows_hud() {
            self.renderer.draw_hud(
                self.session.player.health,
                self.config.player.max_health,
                &self.health_bar,
            );
        }
    }
}

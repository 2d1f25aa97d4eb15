use glam::Vec2;

use umbra::net::Hello;
use umbra::{
    Client, ClientConfig, ClientPacket, ConnectionState, Framebuffer, GridMap, Key, Keys,
    Platform, ServerPacket, SpriteDesc, SpriteInit, SpriteKind, SpriteTransform, View,
};

#[derive(Default)]
struct MockPlatform {
    now: f64,
    sent: Vec<Vec<u8>>,
    short_send: bool,
    presented: usize,
    captured: bool,
}

impl Platform for MockPlatform {
    fn send_datagram(&mut self, data: &[u8]) -> usize {
        if self.short_send {
            return 0;
        }
        self.sent.push(data.to_vec());
        data.len()
    }

    fn now(&self) -> f64 {
        self.now
    }

    fn present(&mut self, framebuffer: &Framebuffer) {
        assert_eq!(framebuffer.pixels().len(), 64 * 48);
        self.presented += 1;
    }

    fn capture_pointer(&mut self) {
        self.captured = true;
    }

    fn release_pointer(&mut self) {
        self.captured = false;
    }
}

const LOCAL_ID: u8 = 1;
const REMOTE_ID: u8 = 2;

fn config() -> ClientConfig {
    ClientConfig {
        framebuffer_width: 64,
        framebuffer_height: 48,
        ..Default::default()
    }
}

fn player_init(id: u8, position: Vec2) -> SpriteInit {
    SpriteInit {
        desc: SpriteDesc::new(SpriteKind::Player, id),
        transform: SpriteTransform {
            rotation: 0.0,
            position,
            velocity: Vec2::ZERO,
        },
    }
}

fn server(packet: ServerPacket, sequence: u32) -> Vec<u8> {
    packet.encode(sequence).expect("encode")
}

fn sent_packets(client: &Client<MockPlatform>) -> Vec<ClientPacket> {
    client
        .platform()
        .sent
        .iter()
        .map(|data| ClientPacket::decode(data).expect("decode").2)
        .collect()
}

/// Client that has joined and sits in the lobby.
fn waiting_client() -> Client<MockPlatform> {
    let mut client = Client::new(config(), MockPlatform::default());
    client.init(7, 0xABCD, true);
    client.tick(0.016);

    let hello = Hello {
        player_id: LOCAL_ID,
        map: GridMap::bordered(8, 8).expect("map"),
        sprites: vec![
            player_init(LOCAL_ID, Vec2::new(2.5, 2.5)),
            player_init(REMOTE_ID, Vec2::new(5.5, 5.5)),
        ],
    };
    client.on_packet_received(&server(ServerPacket::Hello(hello), 0));
    client.tick(0.016);
    assert_eq!(client.view(), View::Waiting);
    client
}

/// Client whose game started at platform time 10.
fn playing_client() -> Client<MockPlatform> {
    let mut client = waiting_client();
    client.platform_mut().now = 10.0;
    let go = ServerPacket::Wait {
        seconds: 0,
        waiting: false,
    };
    client.on_packet_received(&server(go, 1));
    assert_eq!(client.view(), View::Playing);
    client
}

#[test]
fn test_join_sends_ready_with_token() {
    let mut client = Client::new(config(), MockPlatform::default());
    client.init(7, 0xABCD, true);
    assert_eq!(client.view(), View::Loading);

    client.tick(0.016);
    assert_eq!(client.session().state(), ConnectionState::Joining);

    let (_, token, packet) = ClientPacket::decode(&client.platform().sent[0]).expect("decode");
    assert_eq!(token, 0xABCD);
    assert_eq!(packet, ClientPacket::Ready { yes: false });
}

#[test]
fn test_lobby_countdown_and_ready() {
    let mut client = waiting_client();
    assert_eq!(client.session().sprites.len(), 1);
    assert_eq!(client.session().player.position, Vec2::new(2.5, 2.5));

    let countdown = ServerPacket::Wait {
        seconds: 4,
        waiting: false,
    };
    client.on_packet_received(&server(countdown, 1));
    assert_eq!(client.session().wait_time(), Some(4));

    client.set_ready(true);
    assert_eq!(sent_packets(&client).last(), Some(&ClientPacket::Ready { yes: true }));
    assert_eq!(client.view(), View::Waiting);
    assert!(!client.platform().captured);
}

#[test]
fn test_game_start_captures_pointer() {
    let client = playing_client();
    assert_eq!(client.session().state(), ConnectionState::Updating);
    assert!(client.platform().captured);
}

#[test]
fn test_input_update_and_reconciliation() {
    let mut client = playing_client();

    client.platform_mut().now = 10.5;
    client.on_key(Key::Forward, true);
    client.tick(0.0);

    let packets = sent_packets(&client);
    match packets.last() {
        Some(ClientPacket::Update {
            keys, timestamp, ..
        }) => {
            assert_eq!(*keys, Keys::FORWARD);
            assert!((timestamp - 0.5).abs() < 1e-4);
        }
        other => panic!("expected an update, got {other:?}"),
    }

    // the server saw the key press at 0.5 and reports where it had us then
    client.platform_mut().now = 10.7;
    let update = ServerPacket::Update {
        timestamp: 0.5,
        id: LOCAL_ID,
        transform: SpriteTransform {
            rotation: 0.0,
            position: Vec2::new(2.5, 2.5),
            velocity: Vec2::new(3.5, 0.0),
        },
    };
    client.on_packet_received(&server(update, 2));

    let position = client.session().player.position;
    assert!((position - Vec2::new(3.2, 2.5)).length() < 1e-3);
    assert!(client.session().input_log().is_empty());
}

#[test]
fn test_remote_update_applies_transform() {
    let mut client = playing_client();
    let update = ServerPacket::Update {
        timestamp: 0.1,
        id: REMOTE_ID,
        transform: SpriteTransform {
            rotation: 1.0,
            position: Vec2::new(4.0, 4.5),
            velocity: Vec2::ZERO,
        },
    };
    client.on_packet_received(&server(update, 2));

    let sprite = client.session().sprites.get(REMOTE_ID).expect("remote");
    assert_eq!(sprite.position, Vec2::new(4.0, 4.5));
}

#[test]
fn test_update_while_waiting_is_dropped_once() {
    let mut client = waiting_client();
    let before = client.session().sprites.get(REMOTE_ID).map(|s| s.position);

    let update = ServerPacket::Update {
        timestamp: 0.1,
        id: REMOTE_ID,
        transform: SpriteTransform {
            rotation: 0.0,
            position: Vec2::new(1.5, 1.5),
            velocity: Vec2::ZERO,
        },
    };
    client.on_packet_received(&server(update, 1));

    let stats = &client.session().stats;
    assert_eq!(stats.dropped_state, 1);
    assert_eq!(stats.dropped(), 1);
    assert_eq!(client.session().sprites.get(REMOTE_ID).map(|s| s.position), before);
}

#[test]
fn test_out_of_window_packets_are_dropped() {
    let mut client = playing_client();

    let create = ServerPacket::Create(player_init(3, Vec2::new(3.5, 3.5)));
    client.on_packet_received(&server(create.clone(), 500));
    client.on_packet_received(&server(create.clone(), 0));
    assert_eq!(client.session().stats.dropped_sequence, 2);
    assert!(client.session().sprites.get(3).is_none());

    client.on_packet_received(&server(create, 5));
    assert!(client.session().sprites.get(3).is_some());
}

#[test]
fn test_malformed_packet_is_dropped() {
    let mut client = playing_client();
    let mut data = server(ServerPacket::Terminate, 2);
    data.push(0xFF);

    client.on_packet_received(&data);
    assert_eq!(client.session().stats.dropped_malformed, 1);
    assert_eq!(client.view(), View::Playing);
}

#[test]
fn test_death_follows_killer() {
    let mut client = playing_client();
    let destroy = ServerPacket::Destroy(SpriteDesc {
        kind: SpriteKind::Player,
        id: LOCAL_ID,
        owner: LOCAL_ID,
        field: REMOTE_ID,
    });
    client.on_packet_received(&server(destroy, 2));

    assert_eq!(client.view(), View::Over { dead: true });
    assert!(!client.platform().captured);

    client.tick(0.016);
    assert_eq!(client.session().player.position, Vec2::new(5.5, 5.5));

    // an expected ending is not an error
    client.on_packet_received(&server(ServerPacket::Terminate, 3));
    assert_eq!(client.view(), View::Over { dead: true });

    client.on_key(Key::Escape, true);
    assert_eq!(client.view(), View::Menu);
}

#[test]
fn test_last_opponent_leaving_ends_game() {
    let mut client = playing_client();
    let destroy = ServerPacket::Destroy(SpriteDesc::new(SpriteKind::Player, REMOTE_ID));
    client.on_packet_received(&server(destroy, 2));

    assert_eq!(client.view(), View::Over { dead: false });
}

#[test]
fn test_terminate_shows_error() {
    let mut client = playing_client();
    client.on_packet_received(&server(ServerPacket::Terminate, 2));

    assert_eq!(client.view(), View::Error);
    assert_eq!(client.session().state(), ConnectionState::Disconnected);
}

#[test]
fn test_terminate_after_leaving_is_ignored() {
    let mut client = playing_client();
    client.leave();
    assert_eq!(client.view(), View::Menu);

    client.on_packet_received(&server(ServerPacket::Terminate, 3));
    assert_eq!(client.view(), View::Menu);
    assert_eq!(client.session().stats.dropped_state, 1);
}

#[test]
fn test_hello_out_of_window_is_dropped() {
    let mut client = Client::new(config(), MockPlatform::default());
    client.init(7, 0xABCD, true);
    client.tick(0.016);

    let hello = |sequence| {
        let hello = Hello {
            player_id: LOCAL_ID,
            map: GridMap::bordered(8, 8).expect("map"),
            sprites: vec![player_init(LOCAL_ID, Vec2::new(2.5, 2.5))],
        };
        server(ServerPacket::Hello(hello), sequence)
    };

    client.on_packet_received(&hello(5000));
    client.tick(0.016);
    assert_eq!(client.session().stats.dropped_sequence, 1);
    assert_eq!(client.session().state(), ConnectionState::Joining);
    assert_eq!(client.view(), View::Loading);

    client.on_packet_received(&hello(0));
    client.tick(0.016);
    assert_eq!(client.view(), View::Waiting);

    let go = ServerPacket::Wait {
        seconds: 0,
        waiting: false,
    };
    client.on_packet_received(&server(go, 1));
    assert_eq!(client.view(), View::Playing);
}

#[test]
fn test_short_send_disconnects() {
    let mut client = Client::new(config(), MockPlatform::default());
    client.platform_mut().short_send = true;
    client.init(7, 1, true);
    client.tick(0.016);

    assert_eq!(client.view(), View::Error);
    assert_eq!(client.session().state(), ConnectionState::Disconnected);
}

#[test]
fn test_loading_times_out() {
    let mut client = Client::new(config(), MockPlatform::default());
    client.init(7, 1, true);
    client.tick(0.016);
    assert_eq!(client.view(), View::Loading);

    client.platform_mut().now = 16.0;
    client.tick(0.016);
    assert_eq!(client.view(), View::Error);
}

#[test]
fn test_losing_pointer_pauses_and_stops() {
    let mut client = playing_client();
    client.on_key(Key::Forward, true);
    client.tick(0.016);

    client.on_pointer_lock_changed(false);
    assert_eq!(client.view(), View::Paused);
    assert_eq!(client.session().player.keys, Keys::empty());
    match sent_packets(&client).last() {
        Some(ClientPacket::Update { keys, .. }) => assert!(keys.is_empty()),
        other => panic!("expected an update, got {other:?}"),
    }

    client.on_mouse_button(true);
    assert_eq!(client.view(), View::Playing);
    assert!(client.platform().captured);
}

#[test]
fn test_fire_and_leave() {
    let mut client = playing_client();
    client.on_mouse_button(true);
    client.leave();

    let packets = sent_packets(&client);
    let tail = &packets[packets.len() - 2..];
    assert_eq!(tail, &[ClientPacket::Fire, ClientPacket::Leave]);
    assert_eq!(client.view(), View::Menu);
    assert!(client.session().map().is_none());
}

#[test]
fn test_offline_play() {
    let mut client = Client::new(config(), MockPlatform::default());
    client.start_offline(GridMap::bordered(8, 8).expect("map"), Vec2::new(2.5, 2.5));
    assert_eq!(client.view(), View::Playing);

    client.on_key(Key::Forward, true);
    client.tick(0.1);
    client.on_mouse_button(true);

    assert!(client.session().player.position.x > 2.5);
    assert!(client.platform().sent.is_empty());
    assert!(client.platform().presented > 0);
}

#[test]
fn test_exit_stops_ticking() {
    let mut client = playing_client();
    assert!(client.tick(0.016));

    client.exit();
    assert!(!client.tick(0.016));
    assert_eq!(sent_packets(&client).last(), Some(&ClientPacket::Leave));
}

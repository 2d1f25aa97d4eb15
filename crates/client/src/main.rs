mod host;
mod tui;

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use umbra::{CameraConfig, Client, ClientConfig, TestingGround, View};

use host::Host;
use tui::{Action, Tui};

const FRAME_TIME: Duration = Duration::from_micros(16_667);

#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Umbra raycaster client")]
struct Args {
    #[arg(
        short,
        long,
        help = "Server address to connect to (e.g., 127.0.0.1:27015)"
    )]
    server: Option<String>,

    #[arg(short, long, default_value_t = 0, help = "Game to join")]
    game: u32,

    #[arg(short, long, default_value_t = 0, help = "Session token issued for the game")]
    token: u32,

    #[arg(long, help = "Play alone on the built-in arena")]
    offline: bool,

    #[arg(long, default_value_t = 75.0, help = "Horizontal field of view in degrees")]
    fov: f32,

    #[arg(long, default_value_t = 1.0)]
    sensitivity: f32,

    #[arg(long, default_value_t = 10, help = "Sequence numbers a packet may skip ahead")]
    drop_tolerance: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.server.is_none() && !args.offline {
        anyhow::bail!("either --server or --offline is required");
    }

    let server = args.server.as_deref().map(resolve).transpose()?;
    let config = ClientConfig {
        camera: CameraConfig {
            fov_degrees: args.fov,
            ..Default::default()
        },
        mouse_sensitivity: args.sensitivity,
        drop_tolerance: args.drop_tolerance,
        ..Default::default()
    };

    let mut host = Host::new(Tui::new()?);
    if let Some(server) = server {
        host.connect(server)?;
    }

    let mut client = Client::new(config, host);
    if args.offline {
        let ground = TestingGround::new();
        let spawn = ground.spawn_point();
        client.start_offline(ground.build()?, spawn);
    } else {
        let ready = client.platform().is_connected();
        client.init(args.game, args.token, ready);
    }

    run(&mut client)
}

fn resolve(addr: &str) -> anyhow::Result<SocketAddr> {
    addr.to_socket_addrs()
        .with_context(|| format!("resolving {addr}"))?
        .next()
        .with_context(|| format!("no address for {addr}"))
}

fn run(client: &mut Client<Host>) -> anyhow::Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();

        for datagram in client.platform_mut().receive() {
            client.on_packet_received(&datagram);
        }

        let actions = client.platform_mut().tui.poll()?;
        for action in actions {
            handle_action(client, action);
        }

        let status = tui::status_line(client.view(), client.session());
        client.platform_mut().tui.set_status(status);

        let dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();
        if !client.tick(dt) {
            break;
        }

        if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    log::info!("Stats: {:?}", client.session().stats);
    Ok(())
}

fn handle_action(client: &mut Client<Host>, action: Action) {
    match action {
        Action::None => {}
        Action::Quit => client.exit(),
        Action::Join => {
            if matches!(client.view(), View::Menu | View::Error) {
                client.join();
            }
        }
        Action::ToggleReady => {
            let ready = !client.platform().ready;
            client.platform_mut().ready = ready;
            client.set_ready(ready);
        }
        Action::Key(key, pressed) => client.on_key(key, pressed),
        Action::Turn(dx) => client.on_mouse_move(dx, 0.0),
        Action::Fire => client.on_mouse_button(true),
        Action::FocusLost => client.on_pointer_lock_changed(false),
    }
}

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Instant;

use umbra::net::MAX_PACKET_SIZE;
use umbra::{Framebuffer, Platform};

use crate::tui::Tui;

/// Terminal host: a connected UDP socket, the wall clock and the terminal.
pub struct Host {
    socket: Option<UdpSocket>,
    recv_buffer: Vec<u8>,
    started: Instant,
    pub tui: Tui,
    /// Last readiness toggled in the lobby.
    pub ready: bool,
}

impl Host {
    pub fn new(tui: Tui) -> Self {
        Self {
            socket: None,
            recv_buffer: vec![0u8; MAX_PACKET_SIZE],
            started: Instant::now(),
            tui,
            ready: false,
        }
    }

    pub fn connect(&mut self, server: SocketAddr) -> io::Result<()> {
        let bind = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind)?;
        socket.connect(server)?;
        socket.set_nonblocking(true)?;

        log::info!("Bound {} for server {server}", socket.local_addr()?);
        self.socket = Some(socket);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Every datagram waiting on the socket.
    pub fn receive(&mut self) -> Vec<Vec<u8>> {
        let mut datagrams = Vec::new();
        let Some(socket) = &self.socket else {
            return datagrams;
        };

        loop {
            match socket.recv(&mut self.recv_buffer) {
                Ok(len) => datagrams.push(self.recv_buffer[..len].to_vec()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    log::warn!("Receive error: {e}");
                    break;
                }
            }
        }
        datagrams
    }
}

impl Platform for Host {
    fn send_datagram(&mut self, data: &[u8]) -> usize {
        let Some(socket) = &self.socket else {
            return 0;
        };
        match socket.send(data) {
            Ok(sent) => sent,
            Err(e) => {
                log::error!("Send error: {e}");
                0
            }
        }
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn present(&mut self, framebuffer: &Framebuffer) {
        if let Err(e) = self.tui.draw(framebuffer) {
            log::error!("Draw error: {e}");
        }
    }

    fn capture_pointer(&mut self) {
        if let Err(e) = self.tui.set_mouse_capture(true) {
            log::warn!("Mouse capture failed: {e}");
        }
    }

    fn release_pointer(&mut self) {
        if let Err(e) = self.tui.set_mouse_capture(false) {
            log::warn!("Mouse release failed: {e}");
        }
    }
}

use super::protocol::{
    ClientPacket, ClientPacketKind, PacketError, ServerPacket, ServerPacketKind,
};
use super::tracking::{SequenceCounter, SequenceError, SequenceWindow};

/// Session lifecycle. Ordered: later stages compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
    Joining,
    Waiting,
    Updating,
}

impl ConnectionState {
    pub fn accepts(self, kind: ServerPacketKind) -> bool {
        use ConnectionState::*;
        match kind {
            ServerPacketKind::Hello => self == Joining,
            ServerPacketKind::Update => self == Updating,
            ServerPacketKind::Create | ServerPacketKind::Destroy => {
                matches!(self, Waiting | Updating)
            }
            ServerPacketKind::Wait => self == Waiting,
            ServerPacketKind::Terminate => self != Disconnected,
        }
    }

    pub fn can_send(self, kind: ClientPacketKind) -> bool {
        use ConnectionState::*;
        match kind {
            ClientPacketKind::Ready => self >= Connected,
            ClientPacketKind::Leave => matches!(self, Waiting | Updating),
            ClientPacketKind::Update | ClientPacketKind::Fire => self == Updating,
        }
    }
}

/// Why an inbound datagram was discarded. None of these end the session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DropReason {
    #[error("malformed packet: {0}")]
    Malformed(#[from] PacketError),
    #[error("{kind:?} packet not expected while {state:?}")]
    StateMismatch {
        kind: ServerPacketKind,
        state: ConnectionState,
    },
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("cannot send {kind:?} while {state:?}")]
    NotAllowed {
        kind: ClientPacketKind,
        state: ConnectionState,
    },
    #[error("transport sent {sent} of {expected} bytes")]
    Transport { sent: usize, expected: usize },
}

/// Per-session protocol endpoint: the lifecycle state, the auth token,
/// and both sequence directions.
#[derive(Debug, Clone)]
pub struct Connection {
    pub state: ConnectionState,
    token: u32,
    game_id: u32,
    outbound: SequenceCounter,
    inbound: SequenceWindow,
}

impl Connection {
    pub fn new(drop_tolerance: u32) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            token: 0,
            game_id: 0,
            outbound: SequenceCounter::default(),
            inbound: SequenceWindow::server(drop_tolerance),
        }
    }

    pub fn open(&mut self, game_id: u32, token: u32) {
        self.game_id = game_id;
        self.token = token;
        self.outbound = SequenceCounter::default();
        self.inbound.reset();
        self.state = ConnectionState::Connected;
    }

    pub fn close(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    pub fn token(&self) -> u32 {
        self.token
    }

    pub fn inbound(&self) -> &SequenceWindow {
        &self.inbound
    }

    /// Gates and encodes an outbound packet, consuming a sequence number.
    pub fn prepare(&mut self, packet: &ClientPacket) -> Result<Vec<u8>, SendError> {
        let kind = packet.kind();
        if !self.state.can_send(kind) {
            return Err(SendError::NotAllowed {
                kind,
                state: self.state,
            });
        }
        Ok(packet.encode(self.outbound.next(), self.token))
    }

    /// Decodes an inbound datagram and checks it against the current state
    /// and the sequence window.
    pub fn admit(&mut self, data: &[u8]) -> Result<ServerPacket, DropReason> {
        let (sequence, packet) = ServerPacket::decode(data)?;
        let kind = packet.kind();

        if !self.state.accepts(kind) {
            return Err(DropReason::StateMismatch {
                kind,
                state: self.state,
            });
        }

        self.inbound.accept(sequence)?;
        Ok(packet)
    }
}

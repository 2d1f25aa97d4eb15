mod connection;
mod prediction;
mod protocol;
mod stats;
mod tracking;

pub use connection::{Connection, ConnectionState, DropReason, SendError};
pub use prediction::{INPUT_LOG_CAPACITY, InputLog, InputLogEntry, ServerState};
pub use protocol::{
    CLIENT_SEQUENCE_BITS, ClientPacket, ClientPacketKind, HELLO_TILE_WIDTH, Hello,
    MAX_PACKET_SIZE, PacketError, SERVER_SEQUENCE_BITS, ServerPacket, ServerPacketKind,
};
pub use stats::SessionStats;
pub use tracking::{DEFAULT_DROP_TOLERANCE, SequenceCounter, SequenceError, SequenceWindow};

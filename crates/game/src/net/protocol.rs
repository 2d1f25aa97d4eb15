use glam::Vec2;

use crate::map::{GridMap, MapError, TileWidth, packed_len};
use crate::player::Keys;
use crate::sprite::{SpriteDesc, SpriteInit, SpriteTransform};

/// Largest datagram a UDP socket can carry.
pub const MAX_PACKET_SIZE: usize = 65_507;

pub const CLIENT_SEQUENCE_BITS: u32 = 30;
pub const SERVER_SEQUENCE_BITS: u32 = 29;

pub const CLIENT_HEADER_SIZE: usize = 8;
pub const SERVER_HEADER_SIZE: usize = 4;
pub const SPRITE_DESC_SIZE: usize = 4;
pub const SPRITE_TRANSFORM_SIZE: usize = 20;
pub const SPRITE_INIT_SIZE: usize = SPRITE_DESC_SIZE + SPRITE_TRANSFORM_SIZE;
pub const HELLO_FIXED_SIZE: usize = SERVER_HEADER_SIZE + 10;

/// Tiles in the hello map are sent one bit each.
pub const HELLO_TILE_WIDTH: TileWidth = TileWidth::One;

const WAITING_FLAG: u32 = 1 << 31;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet too short: {0} bytes")]
    TooShort(usize),
    #[error("{kind} packet should be {expected} bytes, got {got}")]
    SizeMismatch {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("unknown packet type {0}")]
    UnknownType(u32),
    #[error("unknown sprite kind {0}")]
    UnknownSpriteKind(u8),
    #[error("packet too large: {0}")]
    TooLarge(String),
    #[error(transparent)]
    Map(#[from] MapError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPacketKind {
    Ready = 0,
    Leave = 1,
    Update = 2,
    Fire = 3,
}

impl ClientPacketKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Leave => "leave",
            Self::Update => "update",
            Self::Fire => "fire",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientPacket {
    Ready { yes: bool },
    Leave,
    Update { keys: Keys, rotation: f32, timestamp: f32 },
    Fire,
}

impl ClientPacket {
    pub fn kind(&self) -> ClientPacketKind {
        match self {
            Self::Ready { .. } => ClientPacketKind::Ready,
            Self::Leave => ClientPacketKind::Leave,
            Self::Update { .. } => ClientPacketKind::Update,
            Self::Fire => ClientPacketKind::Fire,
        }
    }

    pub fn encoded_len(&self) -> usize {
        CLIENT_HEADER_SIZE
            + match self {
                Self::Ready { .. } => 1,
                Self::Update { .. } => 12,
                Self::Leave | Self::Fire => 0,
            }
    }

    /// `sequence` is truncated to its 30 wire bits.
    pub fn encode(&self, sequence: u32, token: u32) -> Vec<u8> {
        let mut w = Writer::with_capacity(self.encoded_len());
        let mask = (1 << CLIENT_SEQUENCE_BITS) - 1;
        w.u32(sequence & mask | (self.kind() as u32) << CLIENT_SEQUENCE_BITS);
        w.u32(token);

        match *self {
            Self::Ready { yes } => w.u8(yes as u8),
            Self::Update {
                keys,
                rotation,
                timestamp,
            } => {
                w.u32(keys.bits());
                w.f32(rotation);
                w.f32(timestamp);
            }
            Self::Leave | Self::Fire => {}
        }
        w.finish()
    }

    /// Returns `(sequence, token, packet)`.
    pub fn decode(data: &[u8]) -> Result<(u32, u32, Self), PacketError> {
        let mut r = Reader::new(data);
        let raw = r.u32()?;
        let token = r.u32()?;
        let sequence = raw & ((1 << CLIENT_SEQUENCE_BITS) - 1);

        let packet = match raw >> CLIENT_SEQUENCE_BITS {
            0 => Self::Ready { yes: r.u8()? != 0 },
            1 => Self::Leave,
            2 => Self::Update {
                keys: Keys::from_bits_retain(r.u32()?),
                rotation: r.f32()?,
                timestamp: r.f32()?,
            },
            3 => Self::Fire,
            other => return Err(PacketError::UnknownType(other)),
        };

        expect_len(packet.kind().name(), packet.encoded_len(), data.len())?;
        Ok((sequence, token, packet))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerPacketKind {
    Hello = 0,
    Update = 1,
    Create = 2,
    Destroy = 3,
    Wait = 4,
    Terminate = 5,
}

impl ServerPacketKind {
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::Hello),
            1 => Some(Self::Update),
            2 => Some(Self::Create),
            3 => Some(Self::Destroy),
            4 => Some(Self::Wait),
            5 => Some(Self::Terminate),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Update => "update",
            Self::Create => "create",
            Self::Destroy => "destroy",
            Self::Wait => "wait",
            Self::Terminate => "terminate",
        }
    }

    /// Exact size for every kind except hello.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            Self::Hello => None,
            Self::Update => Some(SERVER_HEADER_SIZE + 5 + SPRITE_TRANSFORM_SIZE),
            Self::Create => Some(SERVER_HEADER_SIZE + SPRITE_INIT_SIZE),
            Self::Destroy => Some(SERVER_HEADER_SIZE + SPRITE_DESC_SIZE),
            Self::Wait => Some(SERVER_HEADER_SIZE + 4),
            Self::Terminate => Some(SERVER_HEADER_SIZE),
        }
    }
}

/// Full snapshot sent once on join.
#[derive(Debug, Clone, PartialEq)]
pub struct Hello {
    pub player_id: u8,
    pub map: GridMap,
    pub sprites: Vec<SpriteInit>,
}

impl Hello {
    pub fn expected_len(sprites: usize, width: u32, height: u32) -> Result<usize, PacketError> {
        (width as usize)
            .checked_mul(height as usize)
            .map(|tiles| {
                HELLO_FIXED_SIZE
                    + sprites * SPRITE_INIT_SIZE
                    + packed_len(tiles, HELLO_TILE_WIDTH)
            })
            .ok_or_else(|| PacketError::TooLarge(format!("map {width}x{height}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerPacket {
    Hello(Hello),
    Update {
        timestamp: f32,
        id: u8,
        transform: SpriteTransform,
    },
    Create(SpriteInit),
    /// `field` of the descriptor names the sprite that caused the removal.
    Destroy(SpriteDesc),
    Wait { seconds: u32, waiting: bool },
    Terminate,
}

impl ServerPacket {
    pub fn kind(&self) -> ServerPacketKind {
        match self {
            Self::Hello(_) => ServerPacketKind::Hello,
            Self::Update { .. } => ServerPacketKind::Update,
            Self::Create(_) => ServerPacketKind::Create,
            Self::Destroy(_) => ServerPacketKind::Destroy,
            Self::Wait { .. } => ServerPacketKind::Wait,
            Self::Terminate => ServerPacketKind::Terminate,
        }
    }

    /// Returns `(sequence, packet)`. The length must match the kind exactly.
    pub fn decode(data: &[u8]) -> Result<(u32, Self), PacketError> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(PacketError::TooLarge(format!("{} bytes", data.len())));
        }

        let mut r = Reader::new(data);
        let raw = r.u32()?;
        let sequence = raw & ((1 << SERVER_SEQUENCE_BITS) - 1);
        let tag = raw >> SERVER_SEQUENCE_BITS;
        let kind = ServerPacketKind::from_tag(tag).ok_or(PacketError::UnknownType(tag))?;

        if let Some(expected) = kind.fixed_len() {
            expect_len(kind.name(), expected, data.len())?;
        }

        let packet = match kind {
            ServerPacketKind::Hello => Self::Hello(decode_hello(&mut r, data.len())?),
            ServerPacketKind::Update => Self::Update {
                timestamp: r.f32()?,
                id: r.u8()?,
                transform: r.transform()?,
            },
            ServerPacketKind::Create => Self::Create(r.sprite_init()?),
            ServerPacketKind::Destroy => Self::Destroy(r.desc()?),
            ServerPacketKind::Wait => {
                let raw = r.u32()?;
                Self::Wait {
                    seconds: raw & !WAITING_FLAG,
                    waiting: raw & WAITING_FLAG != 0,
                }
            }
            ServerPacketKind::Terminate => Self::Terminate,
        };

        Ok((sequence, packet))
    }

    /// Server side of the codec, used by tools and tests.
    pub fn encode(&self, sequence: u32) -> Result<Vec<u8>, PacketError> {
        let mask = (1 << SERVER_SEQUENCE_BITS) - 1;
        let mut w = Writer::with_capacity(self.kind().fixed_len().unwrap_or(HELLO_FIXED_SIZE));
        w.u32(sequence & mask | (self.kind() as u32) << SERVER_SEQUENCE_BITS);

        match self {
            Self::Hello(hello) => {
                let count = u8::try_from(hello.sprites.len()).map_err(|_| {
                    PacketError::TooLarge(format!("{} sprites", hello.sprites.len()))
                })?;
                w.u8(count);
                w.u8(hello.player_id);
                w.u32(hello.map.width());
                w.u32(hello.map.height());
                for sprite in &hello.sprites {
                    w.sprite_init(sprite);
                }
                w.bytes(&hello.map.pack(HELLO_TILE_WIDTH));
            }
            Self::Update {
                timestamp,
                id,
                transform,
            } => {
                w.f32(*timestamp);
                w.u8(*id);
                w.transform(transform);
            }
            Self::Create(init) => w.sprite_init(init),
            Self::Destroy(desc) => w.u32(desc.to_bits()),
            Self::Wait { seconds, waiting } => {
                let flag = if *waiting { WAITING_FLAG } else { 0 };
                w.u32(seconds & !WAITING_FLAG | flag);
            }
            Self::Terminate => {}
        }

        let data = w.finish();
        if data.len() > MAX_PACKET_SIZE {
            return Err(PacketError::TooLarge(format!("{} bytes", data.len())));
        }
        Ok(data)
    }
}

fn decode_hello(r: &mut Reader<'_>, total: usize) -> Result<Hello, PacketError> {
    let count = r.u8()?;
    let player_id = r.u8()?;
    let width = r.u32()?;
    let height = r.u32()?;

    let expected = Hello::expected_len(count as usize, width, height)?;
    expect_len("hello", expected, total)?;

    let sprites = (0..count)
        .map(|_| r.sprite_init())
        .collect::<Result<Vec<_>, _>>()?;
    let map = GridMap::from_packed(width, height, r.rest(), HELLO_TILE_WIDTH)?;

    Ok(Hello {
        player_id,
        map,
        sprites,
    })
}

fn expect_len(kind: &'static str, expected: usize, got: usize) -> Result<(), PacketError> {
    if expected != got {
        return Err(PacketError::SizeMismatch {
            kind,
            expected,
            got,
        });
    }
    Ok(())
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], PacketError> {
        let end = self.pos + N;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(PacketError::TooShort(self.data.len()))?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, PacketError> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, PacketError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn f32(&mut self) -> Result<f32, PacketError> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    fn vec2(&mut self) -> Result<Vec2, PacketError> {
        Ok(Vec2::new(self.f32()?, self.f32()?))
    }

    fn desc(&mut self) -> Result<SpriteDesc, PacketError> {
        let bits = self.u32()?;
        SpriteDesc::from_bits(bits).ok_or(PacketError::UnknownSpriteKind(bits as u8))
    }

    fn transform(&mut self) -> Result<SpriteTransform, PacketError> {
        Ok(SpriteTransform {
            rotation: self.f32()?,
            position: self.vec2()?,
            velocity: self.vec2()?,
        })
    }

    fn sprite_init(&mut self) -> Result<SpriteInit, PacketError> {
        Ok(SpriteInit {
            desc: self.desc()?,
            transform: self.transform()?,
        })
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    fn transform(&mut self, t: &SpriteTransform) {
        self.f32(t.rotation);
        self.f32(t.position.x);
        self.f32(t.position.y);
        self.f32(t.velocity.x);
        self.f32(t.velocity.y);
    }

    fn sprite_init(&mut self, init: &SpriteInit) {
        self.u32(init.desc.to_bits());
        self.transform(&init.transform);
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

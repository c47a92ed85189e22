//! Data-link header byte
//!
//! ```text
//!   7     6   5   4     3   2     1   0
//! ┌─────┬───────────┬─────────┬─────────┐
//! │ DIR │ reserved  │  TYPE   │ ENDPOINT│
//! └─────┴───────────┴─────────┴─────────┘
//! ```
//!
//! The decoded view is never stored; it is recomputed from the frame's
//! header byte on every access.

/// Endpoint field mask (bits 1:0)
pub const HEADER_ENDPOINT_MASK: u8 = 0b0000_0011;
/// Packet type field mask (bits 3:2)
pub const HEADER_PACKET_TYPE_MASK: u8 = 0b0000_1100;
/// Packet type field shift
pub const HEADER_PACKET_TYPE_SHIFT: u8 = 2;
/// Direction bit mask (bit 7)
pub const HEADER_DIRECTION_MASK: u8 = 0b1000_0000;
/// Direction bit shift
pub const HEADER_DIRECTION_SHIFT: u8 = 7;

/// Endpoint a packet is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endpoint {
    Control,
    Input,
    Output,
    Reserved,
}

impl Endpoint {
    /// Decode from the two low bits of `bits`
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Endpoint::Control,
            1 => Endpoint::Input,
            2 => Endpoint::Output,
            _ => Endpoint::Reserved,
        }
    }

    /// Field value
    pub const fn bits(self) -> u8 {
        match self {
            Endpoint::Control => 0,
            Endpoint::Input => 1,
            Endpoint::Output => 2,
            Endpoint::Reserved => 3,
        }
    }
}

/// Kind of packet carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketType {
    /// Enumeration handshake (fixed 4-byte frame)
    Enumeration,
    /// Request from the base (fixed 4-byte frame)
    Request,
    /// Sensor data
    Data,
    /// Asynchronous event
    Event,
}

impl PacketType {
    /// Decode from the two low bits of `bits`
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => PacketType::Enumeration,
            1 => PacketType::Request,
            2 => PacketType::Data,
            _ => PacketType::Event,
        }
    }

    /// Field value
    pub const fn bits(self) -> u8 {
        match self {
            PacketType::Enumeration => 0,
            PacketType::Request => 1,
            PacketType::Data => 2,
            PacketType::Event => 3,
        }
    }

    /// Returns true if frames of this type always have the same length
    pub const fn is_fixed_length(self) -> bool {
        matches!(self, PacketType::Enumeration | PacketType::Request)
    }

    /// Largest frame (header included) this packet type may occupy
    pub const fn max_frame_len(self) -> usize {
        match self {
            PacketType::Enumeration => crate::ENUMERATION_FRAME_LEN,
            PacketType::Request => crate::REQUEST_FRAME_LEN,
            PacketType::Data => crate::DATA_FRAME_LEN,
            PacketType::Event => crate::EVENT_FRAME_LEN,
        }
    }

    /// Check a payload length (header excluded) against this packet type
    ///
    /// Fixed-length packets must fill their frame exactly; data and event
    /// packets need at least one payload byte.
    pub const fn accepts_payload_len(self, len: usize) -> bool {
        let max = self.max_frame_len() - 1;
        if self.is_fixed_length() {
            len == max
        } else {
            len >= 1 && len <= max
        }
    }
}

/// Which side originated a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Direction bit 0
    CompanionToBase,
    /// Direction bit 1
    BaseToCompanion,
}

impl Direction {
    /// Field value
    pub const fn bit(self) -> u8 {
        match self {
            Direction::CompanionToBase => 0,
            Direction::BaseToCompanion => 1,
        }
    }

    /// The other side's direction
    pub const fn opposite(self) -> Self {
        match self {
            Direction::CompanionToBase => Direction::BaseToCompanion,
            Direction::BaseToCompanion => Direction::CompanionToBase,
        }
    }
}

/// Decoded header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    pub endpoint: Endpoint,
    pub packet_type: PacketType,
    pub direction: Direction,
}

impl FrameHeader {
    /// Create a header from its fields
    pub const fn new(endpoint: Endpoint, packet_type: PacketType, direction: Direction) -> Self {
        Self {
            endpoint,
            packet_type,
            direction,
        }
    }

    /// Decode a header byte. Reserved bits 6:4 are ignored.
    pub const fn from_byte(byte: u8) -> Self {
        let direction = if (byte & HEADER_DIRECTION_MASK) == HEADER_DIRECTION_MASK {
            Direction::BaseToCompanion
        } else {
            Direction::CompanionToBase
        };

        Self {
            endpoint: Endpoint::from_bits(byte & HEADER_ENDPOINT_MASK),
            packet_type: PacketType::from_bits(
                (byte & HEADER_PACKET_TYPE_MASK) >> HEADER_PACKET_TYPE_SHIFT,
            ),
            direction,
        }
    }

    /// Encode to wire format. Reserved bits are written as zero.
    pub const fn to_byte(self) -> u8 {
        (self.direction.bit() << HEADER_DIRECTION_SHIFT)
            | (self.packet_type.bits() << HEADER_PACKET_TYPE_SHIFT)
            | self.endpoint.bits()
    }
}

impl From<u8> for FrameHeader {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<FrameHeader> for u8 {
    fn from(header: FrameHeader) -> Self {
        header.to_byte()
    }
}

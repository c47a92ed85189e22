//! Data Link Layer
//!
//! Decodes the header of each completed frame and hands the packet to the
//! matching [`PacketHandler`] method. Frames travelling in the wrong
//! direction, or whose payload length does not fit the packet type, are
//! rejected and counted instead of being forwarded.
//!
//! The outbound half builds a header for the opposite direction and submits
//! correctly sized frames to the link.

use wdc_protocol::{Direction, Endpoint, Frame, FrameHeader, PacketType};

use crate::error::Error;
use crate::traits::{FrameSink, FrameSource};

/// Decoded frame, borrowing its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<'f> {
    pub header: FrameHeader,
    pub payload: &'f [u8],
}

/// Application-side packet consumers
///
/// Every method defaults to ignoring the packet.
pub trait PacketHandler {
    fn on_enumeration(&mut self, packet: Packet<'_>) {
        let _ = packet;
    }

    fn on_request(&mut self, packet: Packet<'_>) {
        let _ = packet;
    }

    fn on_data(&mut self, packet: Packet<'_>) {
        let _ = packet;
    }

    fn on_event(&mut self, packet: Packet<'_>) {
        let _ = packet;
    }
}

/// Decode a frame that should travel in direction `accept`
pub fn decode(frame: &Frame, accept: Direction) -> Result<Packet<'_>, Error> {
    let header = frame.decode_header();
    if header.direction != accept {
        return Err(Error::UnexpectedDirection);
    }
    if !header.packet_type.accepts_payload_len(frame.payload.len()) {
        return Err(Error::InvalidPayloadLength);
    }
    Ok(Packet {
        header,
        payload: &frame.payload,
    })
}

/// Route a decoded packet to its handler method
pub fn dispatch<H: PacketHandler + ?Sized>(packet: Packet<'_>, handler: &mut H) -> PacketType {
    let packet_type = packet.header.packet_type;
    match packet_type {
        PacketType::Enumeration => handler.on_enumeration(packet),
        PacketType::Request => handler.on_request(packet),
        PacketType::Data => handler.on_data(packet),
        PacketType::Event => handler.on_event(packet),
    }
    packet_type
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataLinkStats {
    pub dispatched: u32,
    pub rejected: u32,
}

/// Decode-and-dispatch on top of a frame link
pub struct DataLink<'l, L> {
    link: &'l L,
    accept: Direction,
    stats: DataLinkStats,
}

impl<'l, L> DataLink<'l, L> {
    /// Companion side: accept base-to-companion frames
    pub fn new(link: &'l L) -> Self {
        Self::with_direction(link, Direction::BaseToCompanion)
    }

    /// Accept frames travelling in `accept`, send in the opposite direction
    pub fn with_direction(link: &'l L, accept: Direction) -> Self {
        Self {
            link,
            accept,
            stats: DataLinkStats::default(),
        }
    }

    pub fn stats(&self) -> DataLinkStats {
        self.stats
    }

    /// Decode one frame and dispatch it
    pub fn process<H: PacketHandler + ?Sized>(
        &mut self,
        frame: &Frame,
        handler: &mut H,
    ) -> Result<PacketType, Error> {
        match decode(frame, self.accept) {
            Ok(packet) => {
                let packet_type = dispatch(packet, handler);
                self.stats.dispatched = self.stats.dispatched.wrapping_add(1);
                trace!("dispatched {} packet", packet_type);
                Ok(packet_type)
            }
            Err(e) => {
                self.stats.rejected = self.stats.rejected.wrapping_add(1);
                warn!("rejected frame with header {=u8:#x}: {}", frame.header, e);
                Err(e)
            }
        }
    }
}

impl<'l, L: FrameSource> DataLink<'l, L> {
    /// Process every queued frame; returns how many were dispatched
    pub fn poll<H: PacketHandler + ?Sized>(&mut self, handler: &mut H) -> usize {
        let mut dispatched = 0;
        while let Some(frame) = self.link.next_frame() {
            if self.process(&frame, handler).is_ok() {
                dispatched += 1;
            }
        }
        dispatched
    }
}

impl<'l, L: FrameSink> DataLink<'l, L> {
    /// Build a frame and queue it on the link
    ///
    /// Fails with [`Error::InvalidPayloadLength`] unless the payload fits
    /// `packet_type`.
    pub fn send(
        &self,
        packet_type: PacketType,
        endpoint: Endpoint,
        payload: &[u8],
    ) -> Result<(), Error> {
        if !packet_type.accepts_payload_len(payload.len()) {
            return Err(Error::InvalidPayloadLength);
        }
        let header = FrameHeader::new(endpoint, packet_type, self.accept.opposite());
        let frame = Frame::new(header.to_byte(), payload)?;
        self.link.submit(frame)
    }

    pub fn send_enumeration(&self, endpoint: Endpoint, payload: &[u8; 3]) -> Result<(), Error> {
        self.send(PacketType::Enumeration, endpoint, payload)
    }

    pub fn send_request(&self, endpoint: Endpoint, payload: &[u8; 3]) -> Result<(), Error> {
        self.send(PacketType::Request, endpoint, payload)
    }

    pub fn send_data(&self, endpoint: Endpoint, payload: &[u8]) -> Result<(), Error> {
        self.send(PacketType::Data, endpoint, payload)
    }

    pub fn send_event(&self, endpoint: Endpoint, payload: &[u8]) -> Result<(), Error> {
        self.send(PacketType::Event, endpoint, payload)
    }
}

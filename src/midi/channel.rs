//! MIDI channel allocation
//!
//! MIDI channels range from 0 to 15. Channel 9 is percussion-only under
//! General MIDI, so it is handed out last and can also be claimed directly
//! when a track selects the drum kit instrument.

use crate::error::{Error, Result};

pub const MAX_CHANNELS: u8 = 16;
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Tracks which MIDI channels are held by open tracks
#[derive(Debug, Clone, Default)]
pub struct ChannelAllocator {
    used: u16,
}

impl ChannelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_used(&self, channel: u8) -> bool {
        self.used & (1 << channel) != 0
    }

    fn take(&mut self, channel: u8) {
        self.used |= 1 << channel;
    }

    /// Free a channel back to the pool
    pub fn release(&mut self, channel: u8) {
        self.used &= !(1 << channel);
    }

    /// Hand out the lowest free channel, avoiding the percussion channel
    /// until nothing else is left.
    pub fn acquire(&mut self) -> Result<u8> {
        for channel in 0..MAX_CHANNELS {
            if channel != PERCUSSION_CHANNEL && !self.is_used(channel) {
                self.take(channel);
                return Ok(channel);
            }
        }
        if !self.is_used(PERCUSSION_CHANNEL) {
            self.take(PERCUSSION_CHANNEL);
            return Ok(PERCUSSION_CHANNEL);
        }
        Err(Error::ChannelsExhausted)
    }

    /// Move a track from `current` to the percussion channel. Fails if a
    /// different track already holds it.
    pub fn force_percussion(&mut self, current: u8) -> Result<u8> {
        if current == PERCUSSION_CHANNEL {
            return Ok(PERCUSSION_CHANNEL);
        }
        if self.is_used(PERCUSSION_CHANNEL) {
            return Err(Error::PercussionChannelTaken);
        }
        self.release(current);
        self.take(PERCUSSION_CHANNEL);
        Ok(PERCUSSION_CHANNEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_skips_percussion() {
        let mut alloc = ChannelAllocator::new();
        let channels: Vec<u8> = (0..16).map(|_| alloc.acquire().unwrap()).collect();
        assert_eq!(
            channels,
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13, 14, 15, 9]
        );
    }

    #[test]
    fn test_exhaustion() {
        let mut alloc = ChannelAllocator::new();
        for _ in 0..16 {
            alloc.acquire().unwrap();
        }
        assert!(matches!(alloc.acquire(), Err(Error::ChannelsExhausted)));
    }

    #[test]
    fn test_release_makes_channel_available() {
        let mut alloc = ChannelAllocator::new();
        alloc.acquire().unwrap();
        alloc.acquire().unwrap();
        alloc.release(0);
        assert_eq!(alloc.acquire().unwrap(), 0);
    }

    #[test]
    fn test_force_percussion() {
        let mut alloc = ChannelAllocator::new();
        let first = alloc.acquire().unwrap();
        assert_eq!(alloc.force_percussion(first).unwrap(), PERCUSSION_CHANNEL);
        // The old channel is free again
        assert_eq!(alloc.acquire().unwrap(), 0);
    }

    #[test]
    fn test_force_percussion_conflict() {
        let mut alloc = ChannelAllocator::new();
        let first = alloc.acquire().unwrap();
        alloc.force_percussion(first).unwrap();
        let second = alloc.acquire().unwrap();
        assert!(matches!(
            alloc.force_percussion(second),
            Err(Error::PercussionChannelTaken)
        ));
    }

    #[test]
    fn test_force_percussion_idempotent() {
        let mut alloc = ChannelAllocator::new();
        let first = alloc.acquire().unwrap();
        alloc.force_percussion(first).unwrap();
        assert_eq!(
            alloc.force_percussion(PERCUSSION_CHANNEL).unwrap(),
            PERCUSSION_CHANNEL
        );
    }
}

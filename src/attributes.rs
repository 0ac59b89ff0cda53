//! Per-particle attribute buffers shared with the renderer.
//!
//! Each effect keeps its GPU-visible particle data in an [`AttributeBuffer`]:
//! a fixed-length array of `#[repr(C)]` records plus a dirty mask telling the
//! render collaborator which channels changed since it last uploaded.
//!
//! # Channels
//!
//! A record type describes itself through the [`Attributes`] trait, normally
//! generated by `#[derive(Attributes)]`:
//!
//! ```ignore
//! #[repr(C)]
//! #[derive(Clone, Copy, Default, Pod, Zeroable, Attributes)]
//! struct BubbleVertex {
//!     position: Vec3,
//!     scale: f32,
//!     offset: Vec2,
//! }
//!
//! assert_eq!(BubbleVertex::CHANNELS[1].name, "scale");
//! buffer.mark_dirty(BubbleVertex::POSITION | BubbleVertex::SCALE);
//! ```

use std::ops::{BitOr, BitOrAssign};

/// Component layout of a single channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
    Uint32,
}

impl ChannelFormat {
    /// Number of scalar components.
    pub fn components(&self) -> u32 {
        match self {
            ChannelFormat::Float32 | ChannelFormat::Uint32 => 1,
            ChannelFormat::Float32x2 => 2,
            ChannelFormat::Float32x3 => 3,
            ChannelFormat::Float32x4 => 4,
        }
    }

    /// Size of the channel in bytes.
    pub fn byte_size(&self) -> u32 {
        self.components() * 4
    }
}

/// Set of channels, one bit per channel in declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelMask(pub u32);

impl ChannelMask {
    /// No channels.
    pub const NONE: ChannelMask = ChannelMask(0);

    /// Mask with only bit `index` set.
    pub const fn bit(index: u32) -> Self {
        ChannelMask(1 << index)
    }

    /// Mask with the first `count` bits set.
    pub const fn first(count: u32) -> Self {
        if count >= 32 {
            ChannelMask(u32::MAX)
        } else {
            ChannelMask((1 << count) - 1)
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(&self, other: ChannelMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ChannelMask {
    type Output = ChannelMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        ChannelMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChannelMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Description of one named channel inside a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channel {
    /// Field name, also the attribute name the renderer binds.
    pub name: &'static str,
    pub format: ChannelFormat,
    /// Byte offset within the record.
    pub offset: u32,
    /// Dirty bit for this channel.
    pub mask: ChannelMask,
}

/// Trait implemented by `#[derive(Attributes)]`.
///
/// # Do Not Implement Manually
///
/// The derive macro computes offsets with `offset_of!` and keeps the mask
/// constants in sync with the channel table.
pub trait Attributes: bytemuck::Pod {
    /// Channel table in declaration order.
    const CHANNELS: &'static [Channel];

    /// Look up a channel by name.
    fn channel(name: &str) -> Option<&'static Channel> {
        Self::CHANNELS.iter().find(|c| c.name == name)
    }
}

/// Fixed-length attribute storage for one effect.
///
/// The length is chosen at construction and never changes; indices used by
/// the effect controllers are always below it.
#[derive(Clone, Debug)]
pub struct AttributeBuffer<V: Attributes> {
    records: Vec<V>,
    dirty: ChannelMask,
}

impl<V: Attributes> AttributeBuffer<V> {
    /// Create a buffer of `len` copies of `idle`.
    pub fn new(len: usize, idle: V) -> Self {
        Self {
            records: vec![idle; len],
            dirty: ChannelMask::first(V::CHANNELS.len() as u32),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> &V {
        &self.records[index]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut V {
        &mut self.records[index]
    }

    /// All records.
    pub fn records(&self) -> &[V] {
        &self.records
    }

    /// Flag channels as modified since the last upload.
    #[inline]
    pub fn mark_dirty(&mut self, mask: ChannelMask) {
        self.dirty |= mask;
    }

    /// Channels modified since the last [`take_dirty`](Self::take_dirty).
    pub fn dirty(&self) -> ChannelMask {
        self.dirty
    }

    /// Return and clear the dirty mask.
    pub fn take_dirty(&mut self) -> ChannelMask {
        std::mem::take(&mut self.dirty)
    }

    /// Raw bytes for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    pub fn channels(&self) -> &'static [Channel] {
        V::CHANNELS
    }

    /// Size of one record in bytes.
    pub fn stride(&self) -> usize {
        std::mem::size_of::<V>()
    }
}

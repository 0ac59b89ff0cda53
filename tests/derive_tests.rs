//! Integration tests for the `#[derive(Attributes)]` macro.
//!
//! These tests use the generated channel tables and masks the same way the
//! effect controllers and the renderer do.

use glam::{Quat, Vec2, Vec3, Vec4};
use waterfx::bytemuck::{self, Pod, Zeroable};
use waterfx::{AttributeBuffer, Attributes, ChannelFormat, ChannelMask};

// ============================================================================
// Scalar + Vector Records
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Attributes)]
struct RippleVertex {
    position: Vec3,
    scale: f32,
    broken: f32,
}

#[test]
fn test_channels_follow_declaration_order() {
    let names: Vec<&str> = RippleVertex::CHANNELS.iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["position", "scale", "broken"]);
}

#[test]
fn test_channel_offsets() {
    let offsets: Vec<u32> = RippleVertex::CHANNELS.iter().map(|c| c.offset).collect();
    assert_eq!(offsets, vec![0, 12, 16]);
    assert_eq!(std::mem::size_of::<RippleVertex>(), 20);
}

#[test]
fn test_channel_formats() {
    assert_eq!(RippleVertex::CHANNELS[0].format, ChannelFormat::Float32x3);
    assert_eq!(RippleVertex::CHANNELS[1].format, ChannelFormat::Float32);
    assert_eq!(RippleVertex::CHANNELS[0].format.byte_size(), 12);
}

#[test]
fn test_mask_constants() {
    assert_eq!(RippleVertex::POSITION, ChannelMask(0b001));
    assert_eq!(RippleVertex::SCALE, ChannelMask(0b010));
    assert_eq!(RippleVertex::BROKEN, ChannelMask(0b100));
    assert_eq!(RippleVertex::ALL, ChannelMask(0b111));
    assert_eq!(RippleVertex::CHANNELS[2].mask, RippleVertex::BROKEN);
}

#[test]
fn test_channel_lookup_by_name() {
    let scale = RippleVertex::channel("scale").unwrap();
    assert_eq!(scale.offset, 12);
    assert!(RippleVertex::channel("velocity").is_none());
}

// ============================================================================
// Wide Records
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Attributes)]
struct OrientedVertex {
    rotation: Quat,
    tint: Vec4,
    id: u32,
    weight: f32,
    uv: Vec2,
}

#[test]
fn test_wide_record_layout() {
    let offsets: Vec<u32> = OrientedVertex::CHANNELS.iter().map(|c| c.offset).collect();
    assert_eq!(offsets, vec![0, 16, 32, 36, 40]);
    assert_eq!(OrientedVertex::CHANNELS[0].format, ChannelFormat::Float32x4);
    assert_eq!(OrientedVertex::CHANNELS[2].format, ChannelFormat::Uint32);
    assert_eq!(OrientedVertex::CHANNELS[4].format, ChannelFormat::Float32x2);
    assert_eq!(OrientedVertex::ALL, ChannelMask::first(5));
}

#[test]
fn test_offsets_fit_inside_record() {
    let size = std::mem::size_of::<OrientedVertex>() as u32;
    for channel in OrientedVertex::CHANNELS {
        assert!(channel.offset + channel.format.byte_size() <= size, "{} overflows", channel.name);
    }
}

// ============================================================================
// Buffer Integration
// ============================================================================

#[test]
fn test_buffer_bytes_match_channel_offsets() {
    let idle = RippleVertex {
        position: Vec3::ZERO,
        scale: 0.0,
        broken: 1.0,
    };
    let mut buffer = AttributeBuffer::new(3, idle);
    buffer.get_mut(1).scale = 2.5;

    let bytes = buffer.as_bytes();
    assert_eq!(bytes.len(), 3 * buffer.stride());

    let offset = buffer.stride() + RippleVertex::channel("scale").unwrap().offset as usize;
    let scale: f32 = bytemuck::pod_read_unaligned(&bytes[offset..offset + 4]);
    assert_eq!(scale, 2.5);
}

#[test]
fn test_dirty_mask_round_trip() {
    let mut buffer = AttributeBuffer::new(2, RippleVertex::default());
    assert_eq!(buffer.take_dirty(), RippleVertex::ALL);
    assert!(buffer.dirty().is_empty());

    buffer.mark_dirty(RippleVertex::SCALE | RippleVertex::BROKEN);
    assert!(buffer.dirty().contains(RippleVertex::SCALE));
    assert!(!buffer.dirty().contains(RippleVertex::POSITION));
}

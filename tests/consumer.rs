mod common;

use std::sync::Arc;

use dpi::PhysicalSize;
use gfx_buffer_queue::queue::{
    BufferState, Fence, GraphicBuffer, NativeWindowApi, PixelFormat, ProducerListener,
    QueueBufferInput, QueueConfig, Status, StatusFlags,
};

use common::{attached, connected};

fn small_config() -> QueueConfig {
    QueueConfig {
        slot_count: 8,
        ..QueueConfig::default()
    }
}

fn timed(timestamp: i64) -> QueueBufferInput {
    QueueBufferInput {
        timestamp,
        ..QueueBufferInput::default()
    }
}

#[test]
fn empty_queue_has_nothing_to_acquire() {
    let harness = connected(small_config());
    assert_eq!(
        harness.consumer.acquire_buffer(0).map(|item| item.slot),
        Err(Status::NoBufferAvailable)
    );
}

#[test]
fn acquired_buffers_are_capped() {
    let harness = connected(small_config());
    harness.producer.set_buffer_count(4).unwrap();
    for _ in 0..3 {
        harness.produce(QueueBufferInput::default());
    }

    harness.consumer.acquire_buffer(0).unwrap();
    harness.consumer.acquire_buffer(0).unwrap();
    assert_eq!(
        harness.consumer.acquire_buffer(0).map(|item| item.slot),
        Err(Status::InvalidOperation)
    );
    assert_eq!(harness.core().pending_count(), 1);
}

#[test]
fn stale_timed_frames_are_dropped_and_future_frames_wait() {
    let harness = connected(small_config());
    harness.producer.set_buffer_count(4).unwrap();
    for timestamp in [100, 200, 300] {
        harness.produce(timed(timestamp));
    }

    let item = harness.consumer.acquire_buffer(250).unwrap();
    assert_eq!((item.slot, item.frame_number), (1, 2));
    assert_eq!(harness.core().slot_state(0), Some(BufferState::Free));

    assert_eq!(
        harness.consumer.acquire_buffer(250).map(|item| item.slot),
        Err(Status::PresentLater)
    );

    let item = harness.consumer.acquire_buffer(0).unwrap();
    assert_eq!(item.frame_number, 3);
}

#[test]
fn buffer_is_handed_to_the_consumer_once() {
    let harness = connected(small_config());

    let slot = harness.produce(QueueBufferInput::default());
    let first = harness.consumer.acquire_buffer(0).unwrap();
    assert!(first.buffer.is_some());
    harness
        .consumer
        .release_buffer(slot, first.frame_number, Fence::NO_FENCE)
        .unwrap();

    // Slot 1 has never been used, so it is older than slot 0.
    let other = harness.produce(QueueBufferInput::default());
    assert_ne!(other, slot);
    let second = harness.consumer.acquire_buffer(0).unwrap();
    harness
        .consumer
        .release_buffer(other, second.frame_number, Fence::NO_FENCE)
        .unwrap();

    assert_eq!(harness.produce(QueueBufferInput::default()), slot);
    let third = harness.consumer.acquire_buffer(0).unwrap();
    assert_eq!(third.slot, slot);
    assert!(third.buffer.is_none());
}

#[test]
fn releasing_a_pending_slot_is_rejected() {
    let harness = connected(small_config());
    let slot = harness.produce(QueueBufferInput::default());

    assert_eq!(
        harness.consumer.release_buffer(slot, 1, Fence::NO_FENCE),
        Err(Status::BadValue)
    );
    assert_eq!(
        harness.consumer.release_buffer(-1, 1, Fence::NO_FENCE),
        Err(Status::BadValue)
    );
}

#[test]
fn release_after_reset_is_stale() {
    let harness = connected(small_config());
    harness.producer.set_buffer_count(4).unwrap();
    let slot = harness.produce(QueueBufferInput::default());
    harness.consumer.acquire_buffer(0).unwrap();

    harness.producer.set_buffer_count(4).unwrap();

    assert_eq!(
        harness.consumer.release_buffer(slot, 1, Fence::NO_FENCE),
        Err(Status::StaleBufferSlot)
    );
    assert_eq!(
        harness.consumer.release_buffer(slot, 0, Fence::NO_FENCE),
        Err(Status::StaleBufferSlot)
    );
    assert_eq!(
        harness.consumer.release_buffer(slot, 0, Fence::NO_FENCE),
        Err(Status::BadValue)
    );
}

#[test]
fn released_buffers_mask_tracks_acquisition() {
    let harness = connected(small_config());
    assert_eq!(harness.consumer.get_released_buffers(), Ok(0xFF));

    harness.produce(QueueBufferInput::default());
    harness.consumer.acquire_buffer(0).unwrap();
    assert_eq!(harness.consumer.get_released_buffers(), Ok(0xFE));
}

#[test]
fn consumer_attached_buffer_forces_producer_reallocation() {
    let harness = connected(small_config());
    let external = GraphicBuffer::new(50, PhysicalSize::new(1, 1), PixelFormat::Rgba8888, 0);

    let slot = harness.consumer.attach_buffer(external).unwrap();
    assert_eq!(slot, 0);
    assert_eq!(harness.core().slot_state(0), Some(BufferState::Acquired));
    harness
        .consumer
        .release_buffer(slot, 0, Fence::NO_FENCE)
        .unwrap();

    let dequeued = harness.dequeue();
    assert_eq!(dequeued.slot, slot);
    assert!(dequeued.flags.contains(StatusFlags::BUFFER_NEEDS_REALLOCATION));
    assert_eq!(harness.allocator.allocations(), 0);
    assert_eq!(
        harness
            .producer
            .queue_buffer(slot, &QueueBufferInput::default()),
        Err(Status::BadValue)
    );
    assert_eq!(
        harness
            .producer
            .request_buffer(slot)
            .unwrap()
            .map(|buffer| buffer.handle),
        Some(50)
    );
}

#[test]
fn consumer_detach_requires_an_acquired_slot() {
    let harness = connected(small_config());
    let slot = harness.produce(QueueBufferInput::default());
    assert_eq!(harness.consumer.detach_buffer(slot), Err(Status::BadValue));

    harness.consumer.acquire_buffer(0).unwrap();
    harness.consumer.detach_buffer(slot).unwrap();
    assert_eq!(
        harness.core().slot_state(slot as usize),
        Some(BufferState::Free)
    );
    assert_eq!(harness.consumer.detach_buffer(slot), Err(Status::BadValue));
}

#[test]
fn negotiation_knobs_are_locked_while_a_producer_is_connected() {
    let harness = attached(small_config());
    let consumer = &harness.consumer;

    assert_eq!(consumer.set_max_acquired_buffer_count(0), Err(Status::BadValue));
    assert_eq!(consumer.set_max_acquired_buffer_count(7), Err(Status::BadValue));
    consumer.set_max_acquired_buffer_count(6).unwrap();
    assert_eq!(harness.core().min_undequeued_buffer_count(false), 6);
    consumer.set_max_acquired_buffer_count(1).unwrap();

    let listener: Arc<dyn ProducerListener> = harness.producer_listener.clone();
    harness
        .producer
        .connect(Some(listener), NativeWindowApi::Media, false)
        .unwrap();

    assert_eq!(
        consumer.set_max_acquired_buffer_count(2),
        Err(Status::InvalidOperation)
    );
    assert_eq!(consumer.disable_async_buffer(), Err(Status::InvalidOperation));

    harness.producer.disconnect(NativeWindowApi::Media).unwrap();
    consumer.disable_async_buffer().unwrap();
    assert_eq!(harness.core().min_undequeued_buffer_count(true), 0);
}

#[test]
fn defaults_are_validated() {
    let harness = connected(small_config());
    let consumer = &harness.consumer;

    assert_eq!(consumer.set_default_buffer_size(0, 4), Err(Status::BadValue));
    assert_eq!(
        consumer.set_default_buffer_format(PixelFormat::Unknown),
        Err(Status::BadValue)
    );
    assert_eq!(consumer.set_default_max_buffer_count(1), Err(Status::BadValue));
    assert_eq!(consumer.set_default_max_buffer_count(9), Err(Status::BadValue));

    consumer.set_default_buffer_size(320, 200).unwrap();
    consumer
        .set_default_buffer_format(PixelFormat::Rgb565)
        .unwrap();
    consumer.set_default_max_buffer_count(3).unwrap();
    assert_eq!(harness.core().max_buffer_count(false), 3);

    let slot = harness.dequeue().slot;
    let buffer = harness.producer.request_buffer(slot).unwrap().unwrap();
    assert_eq!(buffer.size, PhysicalSize::new(320, 200));
    assert_eq!(buffer.format, PixelFormat::Rgb565);
}

#[test]
fn disconnect_abandons_the_queue() {
    let harness = connected(small_config());
    harness.produce(QueueBufferInput::default());

    harness.consumer.disconnect().unwrap();
    assert_eq!(harness.core().pending_count(), 0);
    assert_eq!(harness.consumer.disconnect(), Err(Status::BadValue));
    assert_eq!(
        harness.consumer.acquire_buffer(0).map(|item| item.slot),
        Err(Status::NoInit)
    );

    let (listener, _events) = gfx_buffer_queue::queue::ChannelConsumerListener::new();
    assert_eq!(harness.consumer.connect(listener, false), Err(Status::NoInit));
}

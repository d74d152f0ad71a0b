mod common;

use std::sync::Arc;

use gfx_buffer_queue::binder::{
    Binder, BinderContext, PRODUCER_INTERFACE_DESCRIPTOR, Parcel, TransactionCode,
};
use gfx_buffer_queue::queue::{
    Fence, NativeWindowApi, NativeWindowAttribute, PixelFormat, QueueBufferInput, QueueConfig,
    Status, StatusFlags,
};

use common::attached;

fn call(
    context: &BinderContext,
    id: i32,
    code: TransactionCode,
    write_args: impl FnOnce(&mut Parcel),
) -> Parcel {
    let mut data = Parcel::new();
    data.write_interface_token(PRODUCER_INTERFACE_DESCRIPTOR);
    write_args(&mut data);
    context.dispatch(id, code as u32, 0, &mut data)
}

fn registered_producer() -> (common::Harness, BinderContext, i32) {
    let harness = attached(QueueConfig {
        slot_count: 8,
        ..QueueConfig::default()
    });
    let context = BinderContext::new();
    let id = context.register(Arc::new(harness.producer.clone()));
    (harness, context, id)
}

#[test]
fn producer_round_trip_through_the_registry() {
    let (harness, context, id) = registered_producer();

    let mut reply = call(&context, id, TransactionCode::Connect, |data| {
        data.write_producer_listener(None);
        data.write_i32(NativeWindowApi::Cpu as i32);
        data.write_bool(false);
    });
    let output = reply.read_queue_buffer_output().unwrap();
    assert_eq!((output.width, output.height), (1, 1));
    assert_eq!(reply.read_status(), Ok(0));

    let mut reply = call(&context, id, TransactionCode::DequeueBuffer, |data| {
        data.write_bool(false);
        data.write_u32(0);
        data.write_u32(0);
        data.write_i32(PixelFormat::Unknown.raw());
        data.write_u32(0);
    });
    let slot = reply.read_i32().unwrap();
    assert_eq!(slot, 0);
    assert_eq!(reply.read_fence(), Ok(Fence::NO_FENCE));
    assert_eq!(
        reply.read_status(),
        Ok(StatusFlags::BUFFER_NEEDS_REALLOCATION.bits())
    );

    let mut reply = call(&context, id, TransactionCode::RequestBuffer, |data| {
        data.write_i32(slot);
    });
    let buffer = reply.read_buffer().unwrap().expect("slot was allocated");
    assert_eq!(buffer.handle, 1);
    assert_eq!(reply.read_status(), Ok(0));

    let mut reply = call(&context, id, TransactionCode::QueueBuffer, |data| {
        data.write_i32(slot);
        data.write_queue_buffer_input(QueueBufferInput {
            timestamp: 42,
            ..QueueBufferInput::default()
        });
    });
    assert_eq!(
        reply.read_queue_buffer_output().map(|o| o.num_pending_buffers),
        Ok(1)
    );
    assert_eq!(reply.read_status(), Ok(0));
    assert_eq!(harness.core().pending_count(), 1);

    let mut reply = call(&context, id, TransactionCode::Query, |data| {
        data.write_i32(NativeWindowAttribute::Format as i32);
    });
    assert_eq!(reply.read_i32(), Ok(PixelFormat::Rgba8888.raw()));
    assert_eq!(reply.read_status(), Ok(0));

    let mut reply = call(&context, id, TransactionCode::GetBufferHistory, |data| {
        data.write_i32(1);
    });
    let history = reply.read_buffer_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].frame_number, 1);
    assert_eq!(history[0].presentation_time, 42);
    assert_eq!(reply.read_status(), Ok(0));

    let mut reply = call(&context, id, TransactionCode::Disconnect, |data| {
        data.write_i32(NativeWindowApi::Cpu as i32);
    });
    assert_eq!(reply.read_status(), Ok(0));
    assert!(reply.is_empty());

    let mut reply = call(&context, id, TransactionCode::Disconnect, |data| {
        data.write_i32(NativeWindowApi::Cpu as i32);
    });
    assert_eq!(reply.read_status(), Err(Status::BadValue));
}

#[test]
fn failures_are_reported_as_status_codes() {
    let (_harness, context, id) = registered_producer();

    let mut reply = call(&context, id, TransactionCode::SetBufferCount, |data| {
        data.write_i32(1);
    });
    assert_eq!(reply.read_status(), Err(Status::BadValue));

    let mut reply = call(&context, id, TransactionCode::DetachNextBuffer, |_| {});
    assert_eq!(reply.read_buffer().map(|b| b.is_none()), Ok(true));
    assert_eq!(reply.read_fence(), Ok(Fence::NO_FENCE));
    assert_eq!(reply.read_status(), Err(Status::NoMemory));

    let mut reply = call(&context, id, TransactionCode::CancelBuffer, |data| {
        data.write_i32(3);
        data.write_fence(Fence::NO_FENCE);
    });
    assert_eq!(reply.read_status(), Ok(0));

    let mut reply = call(&context, id, TransactionCode::AttachBuffer, |data| {
        data.write_buffer(None);
    });
    assert_eq!(reply.read_status(), Err(Status::BadValue));
    assert!(reply.is_empty());
}

#[test]
fn malformed_and_unknown_transactions_reply_bad_value() {
    let (_harness, context, id) = registered_producer();

    let mut reply = call(&context, id, TransactionCode::DequeueBuffer, |data| {
        data.write_u32(0);
    });
    assert_eq!(reply.read_status(), Err(Status::BadValue));
    assert!(reply.is_empty());

    let mut data = Parcel::new();
    data.write_interface_token(PRODUCER_INTERFACE_DESCRIPTOR);
    let mut reply = context.dispatch(id, 99, 0, &mut data);
    assert_eq!(reply.read_status(), Err(Status::BadValue));
    assert!(reply.is_empty());
}

#[test]
fn unknown_ids_and_foreign_tokens_get_empty_replies() {
    let (_harness, context, id) = registered_producer();

    let reply = call(&context, id + 1, TransactionCode::Query, |data| {
        data.write_i32(0);
    });
    assert!(reply.is_empty());

    let mut data = Parcel::new();
    data.write_interface_token("android.gui.IGraphicBufferConsumer");
    data.write_i32(0);
    let reply = context.dispatch(id, TransactionCode::Query as u32, 0, &mut data);
    assert!(reply.is_empty());

    let mut data = Parcel::new();
    data.write_i32(0);
    let reply = context.dispatch(id, TransactionCode::Query as u32, 0, &mut data);
    assert!(reply.is_empty());
}

#[test]
fn registry_tracks_producer_identity() {
    let (harness, context, id) = registered_producer();

    let other: Arc<dyn Binder> = Arc::new(harness.producer.clone());
    assert_eq!(context.id_of(&other), -1);
    let other_id = context.register(other.clone());
    assert_eq!(other_id, id + 1);
    assert_eq!(context.id_of(&other), other_id);

    let found = context.lookup(id).expect("registered");
    assert_eq!(found.interface_descriptor(), PRODUCER_INTERFACE_DESCRIPTOR);

    assert!(context.unregister(id).is_some());
    assert!(context.lookup(id).is_none());
    context.clear();
    assert!(context.is_empty());
}

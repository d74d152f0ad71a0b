#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crossbeam_channel::Receiver;
use dpi::PhysicalSize;
use gfx_buffer_queue::queue::{
    BufferAllocator, BufferQueueConsumer, BufferQueueCore, BufferQueueProducer,
    ChannelConsumerListener, ConsumerEvent, DequeuedBuffer, GraphicBuffer, NativeWindowApi,
    PixelFormat, ProducerListener, QueueBufferInput, QueueBufferOutput, QueueConfig, QueueResult,
    Status,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Hands out buffers with increasing handles, starting at 1, until told to fail.
#[derive(Default)]
pub struct TestAllocator {
    next_handle: AtomicU64,
    allocations: AtomicUsize,
    failing: AtomicBool,
}

impl TestAllocator {
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl BufferAllocator for TestAllocator {
    fn allocate(
        &self,
        size: PhysicalSize<u32>,
        format: PixelFormat,
        usage: u32,
    ) -> QueueResult<Arc<GraphicBuffer>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Status::NoMemory);
        }
        self.allocations.fetch_add(1, Ordering::SeqCst);
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GraphicBuffer::new(handle, size, format, usage))
    }
}

#[derive(Default)]
pub struct CountingProducerListener {
    released: AtomicUsize,
}

impl CountingProducerListener {
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ProducerListener for CountingProducerListener {
    fn on_buffer_released(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub producer: BufferQueueProducer,
    pub consumer: BufferQueueConsumer,
    pub events: Receiver<ConsumerEvent>,
    pub allocator: Arc<TestAllocator>,
    pub producer_listener: Arc<CountingProducerListener>,
}

/// Queue with an allocator, a channel consumer listener and a CPU producer connected.
pub fn connected(config: QueueConfig) -> Harness {
    let harness = attached(config);
    let listener: Arc<dyn ProducerListener> = harness.producer_listener.clone();
    harness
        .producer
        .connect(Some(listener), NativeWindowApi::Cpu, false)
        .expect("producer connects");
    harness
}

/// Both ends controlled by the app: dequeue never blocks and every queued frame is droppable.
pub fn app_controlled(config: QueueConfig) -> Harness {
    let harness = attached_as(config, true);
    let listener: Arc<dyn ProducerListener> = harness.producer_listener.clone();
    harness
        .producer
        .connect(Some(listener), NativeWindowApi::Egl, true)
        .expect("producer connects");
    harness
}

/// Same as `connected`, but the producer is left unconnected.
pub fn attached(config: QueueConfig) -> Harness {
    attached_as(config, false)
}

fn attached_as(config: QueueConfig, consumer_controlled_by_app: bool) -> Harness {
    init_tracing();

    let (producer, consumer) = gfx_buffer_queue::create(config).expect("valid config");
    let allocator = Arc::new(TestAllocator::default());
    let installed: Arc<dyn BufferAllocator> = allocator.clone();
    producer.core().set_allocator(Some(installed));

    let (listener, events) = ChannelConsumerListener::new();
    consumer
        .connect(listener, consumer_controlled_by_app)
        .expect("consumer connects");

    Harness {
        producer,
        consumer,
        events,
        allocator,
        producer_listener: Arc::new(CountingProducerListener::default()),
    }
}

impl Harness {
    pub fn core(&self) -> &Arc<BufferQueueCore> {
        self.producer.core()
    }

    pub fn dequeue(&self) -> DequeuedBuffer {
        self.producer
            .dequeue_buffer(false, 0, 0, PixelFormat::Unknown, 0)
            .expect("dequeue succeeds")
    }

    pub fn dequeue_async(&self) -> DequeuedBuffer {
        self.producer
            .dequeue_buffer(true, 0, 0, PixelFormat::Unknown, 0)
            .expect("async dequeue succeeds")
    }

    /// Requests the slot's buffer and queues it with `input`.
    pub fn submit(&self, slot: i32, input: QueueBufferInput) -> QueueBufferOutput {
        self.producer.request_buffer(slot).expect("request succeeds");
        self.producer
            .queue_buffer(slot, &input)
            .expect("queue succeeds")
    }

    /// Dequeues, fills and queues one frame, returning its slot.
    pub fn produce(&self, input: QueueBufferInput) -> i32 {
        let slot = self.dequeue().slot;
        self.submit(slot, input);
        slot
    }

    pub fn drain_events(&self) -> Vec<ConsumerEvent> {
        self.events.try_iter().collect()
    }
}

pub fn frame_numbers(events: &[ConsumerEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match event {
            ConsumerEvent::FrameAvailable(item) | ConsumerEvent::FrameReplaced(item) => {
                Some(item.frame_number)
            }
            ConsumerEvent::BuffersReleased => None,
        })
        .collect()
}

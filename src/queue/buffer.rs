//! ### English
//! Opaque buffer handles, fences and rectangles exchanged through the queue.
//!
//! The queue never touches pixel memory; a `GraphicBuffer` only carries the attributes needed to
//! decide whether a slot's buffer can be reused for a dequeue request.
//!
//! ### 中文
//! 通过队列交换的不透明缓冲区句柄、fence 与矩形。
//!
//! 队列从不访问像素内存；`GraphicBuffer` 仅携带判断槽位缓冲区能否复用所需的属性。

use std::sync::Arc;

use dpi::PhysicalSize;

/// ### English
/// Pixel formats understood by the negotiation logic.
///
/// `Unknown` in a dequeue request means "use the consumer default".
///
/// ### 中文
/// 协商逻辑识别的像素格式。
///
/// dequeue 请求中的 `Unknown` 表示“使用消费者默认值”。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    #[default]
    Unknown,
    Rgba8888,
    Rgbx8888,
    Rgb888,
    Rgb565,
    Bgra8888,
    Rgba5551,
    Rgba4444,
    /// ### English
    /// Any other raw protocol value.
    ///
    /// ### 中文
    /// 其它原始协议值。
    Other(i32),
}

impl PixelFormat {
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            0 => PixelFormat::Unknown,
            1 => PixelFormat::Rgba8888,
            2 => PixelFormat::Rgbx8888,
            3 => PixelFormat::Rgb888,
            4 => PixelFormat::Rgb565,
            5 => PixelFormat::Bgra8888,
            6 => PixelFormat::Rgba5551,
            7 => PixelFormat::Rgba4444,
            other => PixelFormat::Other(other),
        }
    }

    pub const fn raw(self) -> i32 {
        match self {
            PixelFormat::Unknown => 0,
            PixelFormat::Rgba8888 => 1,
            PixelFormat::Rgbx8888 => 2,
            PixelFormat::Rgb888 => 3,
            PixelFormat::Rgb565 => 4,
            PixelFormat::Bgra8888 => 5,
            PixelFormat::Rgba5551 => 6,
            PixelFormat::Rgba4444 => 7,
            PixelFormat::Other(other) => other,
        }
    }
}

/// ### English
/// Opaque graphics buffer description.
///
/// Shared between slots, items and callers as `Arc<GraphicBuffer>`. Two buffers are "the same
/// underlying buffer" when their `handle`s are equal, regardless of which `Arc` wraps them.
///
/// ### 中文
/// 不透明的图形缓冲区描述。
///
/// 以 `Arc<GraphicBuffer>` 在槽位、队列项与调用方之间共享。只要 `handle` 相同即视为
/// “同一个底层缓冲区”，与包装它的 `Arc` 无关。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphicBuffer {
    /// ### English
    /// Identity of the backing memory (e.g. a guest memory-map handle).
    ///
    /// ### 中文
    /// 底层内存的标识（例如客户机内存映射句柄）。
    pub handle: u64,
    /// ### English
    /// Allocated size in pixels.
    ///
    /// ### 中文
    /// 分配尺寸（像素）。
    pub size: PhysicalSize<u32>,
    pub format: PixelFormat,
    /// ### English
    /// Usage bits the buffer was allocated with.
    ///
    /// ### 中文
    /// 分配时使用的 usage 位。
    pub usage: u32,
}

impl GraphicBuffer {
    pub fn new(handle: u64, size: PhysicalSize<u32>, format: PixelFormat, usage: u32) -> Arc<Self> {
        Arc::new(Self {
            handle,
            size,
            format,
            usage,
        })
    }

    /// ### English
    /// Full-buffer bounds, used to validate crop rectangles.
    ///
    /// ### 中文
    /// 整个缓冲区的边界，用于校验裁剪矩形。
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.size.width as i32, self.size.height as i32)
    }

    /// ### English
    /// Returns whether this buffer can serve a request without reallocation.
    ///
    /// #### Parameters
    /// - `size`: Requested size (already resolved against defaults).
    /// - `format`: Requested format (already resolved against defaults).
    /// - `usage`: Requested usage bits; the buffer must carry all of them.
    ///
    /// ### 中文
    /// 返回该缓冲区是否无需重新分配即可满足请求。
    ///
    /// #### 参数
    /// - `size`：请求尺寸（已按默认值解析）。
    /// - `format`：请求格式（已按默认值解析）。
    /// - `usage`：请求的 usage 位；缓冲区必须包含全部位。
    pub fn matches(&self, size: PhysicalSize<u32>, format: PixelFormat, usage: u32) -> bool {
        self.size == size && self.format == format && (self.usage & usage) == usage
    }
}

/// ### English
/// Opaque, copyable synchronization token.
///
/// The queue stores and hands fences back; it never waits on them.
///
/// ### 中文
/// 不透明、可复制的同步令牌。
///
/// 队列只保存并交还 fence，从不等待它们。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fence {
    pub id: u32,
    pub value: u32,
}

impl Fence {
    pub const NO_FENCE: Fence = Fence {
        id: u32::MAX,
        value: 0,
    };

    pub const fn new(id: u32, value: u32) -> Self {
        Self { id, value }
    }

    pub const fn is_valid(&self) -> bool {
        self.id != u32::MAX
    }
}

impl Default for Fence {
    fn default() -> Self {
        Fence::NO_FENCE
    }
}

/// ### English
/// Half-open rectangle `[left, right) x [top, bottom)`.
///
/// ### 中文
/// 半开矩形 `[left, right) x [top, bottom)`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// ### English
    /// Intersection of two rectangles; an empty intersection collapses to `Rect::default()`.
    ///
    /// ### 中文
    /// 两个矩形的交集；交集为空时返回 `Rect::default()`。
    pub fn intersect(&self, other: &Rect) -> Rect {
        let result = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if result.is_empty() {
            Rect::default()
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_inside_bounds_is_its_own_intersection() {
        let buffer = GraphicBuffer::new(7, PhysicalSize::new(64, 32), PixelFormat::Rgba8888, 0);
        let crop = Rect::new(4, 4, 60, 30);
        assert_eq!(crop.intersect(&buffer.bounds()), crop);

        let outside = Rect::new(0, 0, 65, 32);
        assert_ne!(outside.intersect(&buffer.bounds()), outside);
    }

    #[test]
    fn empty_crop_means_whole_buffer() {
        let bounds = Rect::new(0, 0, 16, 16);
        let crop = Rect::default();
        assert!(crop.is_empty());
        assert_eq!(crop.intersect(&bounds), crop);
    }

    #[test]
    fn usage_must_be_a_subset() {
        let buffer = GraphicBuffer::new(1, PhysicalSize::new(8, 8), PixelFormat::Rgba8888, 0b110);
        assert!(buffer.matches(PhysicalSize::new(8, 8), PixelFormat::Rgba8888, 0b100));
        assert!(!buffer.matches(PhysicalSize::new(8, 8), PixelFormat::Rgba8888, 0b001));
        assert!(!buffer.matches(PhysicalSize::new(8, 4), PixelFormat::Rgba8888, 0));
    }
}

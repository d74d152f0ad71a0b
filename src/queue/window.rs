//! ### English
//! Native-window enums shared by the producer interface (API ids, scaling modes, transforms and
//! query attributes). Raw values arrive from the transaction layer as integers and are validated
//! here.
//!
//! ### 中文
//! 生产者接口共用的原生窗口枚举（API 标识、缩放模式、变换与查询属性）。
//! 原始值以整数形式从事务层传入，并在此处校验。

use bitflags::bitflags;

/// ### English
/// Producer API bound by `connect`.
///
/// ### 中文
/// 通过 `connect` 绑定的生产者 API。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeWindowApi {
    Egl = 1,
    Cpu = 2,
    Media = 3,
    Camera = 4,
}

impl TryFrom<i32> for NativeWindowApi {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(NativeWindowApi::Egl),
            2 => Ok(NativeWindowApi::Cpu),
            3 => Ok(NativeWindowApi::Media),
            4 => Ok(NativeWindowApi::Camera),
            _ => Err(()),
        }
    }
}

/// ### English
/// Scaling modes accepted by `queue_buffer`.
///
/// ### 中文
/// `queue_buffer` 接受的缩放模式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NativeWindowScalingMode {
    #[default]
    Freeze = 0,
    ScaleToWindow = 1,
    ScaleCrop = 2,
    NoScaleCrop = 3,
    PreserveAspectRatio = 4,
}

impl TryFrom<u32> for NativeWindowScalingMode {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NativeWindowScalingMode::Freeze),
            1 => Ok(NativeWindowScalingMode::ScaleToWindow),
            2 => Ok(NativeWindowScalingMode::ScaleCrop),
            3 => Ok(NativeWindowScalingMode::NoScaleCrop),
            4 => Ok(NativeWindowScalingMode::PreserveAspectRatio),
            _ => Err(()),
        }
    }
}

bitflags! {
    /// ### English
    /// Buffer transform bits (`ROT_180 = FLIP_H | FLIP_V`, `ROT_270 = ROT_180 | ROT_90`).
    ///
    /// ### 中文
    /// 缓冲区变换位（`ROT_180 = FLIP_H | FLIP_V`，`ROT_270 = ROT_180 | ROT_90`）。
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NativeWindowTransform: u32 {
        const FLIP_H = 1 << 0;
        const FLIP_V = 1 << 1;
        const ROT_90 = 1 << 2;
        const ROT_180 = Self::FLIP_H.bits() | Self::FLIP_V.bits();
        const ROT_270 = Self::ROT_180.bits() | Self::ROT_90.bits();
        /// ### English
        /// Apply the inverse of the display transform; stripped from the item transform.
        ///
        /// ### 中文
        /// 应用显示变换的逆变换；会从队列项的变换中剥离。
        const INVERSE_DISPLAY = 1 << 3;
    }
}

/// ### English
/// Attributes readable through `query`.
///
/// ### 中文
/// 可通过 `query` 读取的属性。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeWindowAttribute {
    Width = 0,
    Height = 1,
    Format = 2,
    MinUnqueuedBuffers = 3,
    ConsumerRunningBehind = 9,
    ConsumerUsageBits = 10,
    MaxBufferCountAsync = 12,
}

impl TryFrom<i32> for NativeWindowAttribute {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NativeWindowAttribute::Width),
            1 => Ok(NativeWindowAttribute::Height),
            2 => Ok(NativeWindowAttribute::Format),
            3 => Ok(NativeWindowAttribute::MinUnqueuedBuffers),
            9 => Ok(NativeWindowAttribute::ConsumerRunningBehind),
            10 => Ok(NativeWindowAttribute::ConsumerUsageBits),
            12 => Ok(NativeWindowAttribute::MaxBufferCountAsync),
            _ => Err(()),
        }
    }
}

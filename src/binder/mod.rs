//! ### English
//! Binder registry: maps integer ids to transactable objects and routes transactions to them.
//!
//! The registry is an explicit context owned by whoever hosts the queues; there is no global
//! instance. Ids start at 1, increase monotonically and are never reused within a context.
//!
//! ### 中文
//! Binder 注册表：将整数 id 映射到可处理事务的对象，并将事务路由给它们。
//!
//! 注册表是由队列宿主持有的显式上下文，没有全局实例。id 从 1 开始单调递增，同一上下文内不复用。

mod id_hash;
mod parcel;
mod producer;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use id_hash::BinderIdMap;
pub use parcel::{Parcel, ParcelValue};
pub use producer::{PRODUCER_INTERFACE_DESCRIPTOR, TransactionCode};

/// ### English
/// An object reachable through a `BinderContext`.
///
/// ### 中文
/// 可通过 `BinderContext` 访问的对象。
pub trait Binder: Send + Sync {
    /// ### English
    /// Token every incoming parcel must start with.
    ///
    /// ### 中文
    /// 每个传入 parcel 必须以之开头的令牌。
    fn interface_descriptor(&self) -> &'static str;

    /// ### English
    /// Handles one transaction. `data` has already had its interface token consumed.
    ///
    /// #### Parameters
    /// - `code`: Method code.
    /// - `flags`: Transaction flags (one-way etc.).
    /// - `data`: Arguments, read in order.
    /// - `reply`: Results, followed by a status code.
    ///
    /// ### 中文
    /// 处理一次事务。`data` 的接口令牌已被消费。
    ///
    /// #### 参数
    /// - `code`：方法码。
    /// - `flags`：事务标志（单向等）。
    /// - `data`：按顺序读取的参数。
    /// - `reply`：结果，其后跟随状态码。
    fn transact(&self, code: u32, flags: u32, data: &mut Parcel, reply: &mut Parcel);
}

#[derive(Default)]
struct Registry {
    objects: BinderIdMap<Arc<dyn Binder>>,
    last_id: i32,
}

/// ### English
/// Registry of binder objects.
///
/// ### 中文
/// binder 对象注册表。
#[derive(Default)]
pub struct BinderContext {
    registry: Mutex<Registry>,
}

impl BinderContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// ### English
    /// Registers `object` under a fresh id.
    ///
    /// ### 中文
    /// 以新的 id 注册 `object`。
    pub fn register(&self, object: Arc<dyn Binder>) -> i32 {
        let mut registry = self.registry();
        registry.last_id += 1;
        let id = registry.last_id;
        registry.objects.insert(id, object);
        debug!(id, "binder registered");
        id
    }

    pub fn unregister(&self, id: i32) -> Option<Arc<dyn Binder>> {
        let removed = self.registry().objects.remove(&id);
        if removed.is_some() {
            debug!(id, "binder unregistered");
        }
        removed
    }

    pub fn lookup(&self, id: i32) -> Option<Arc<dyn Binder>> {
        self.registry().objects.get(&id).cloned()
    }

    /// ### English
    /// Reverse lookup by object identity; `-1` when `object` is not registered.
    ///
    /// ### 中文
    /// 按对象身份反查 id；`object` 未注册时返回 `-1`。
    pub fn id_of(&self, object: &Arc<dyn Binder>) -> i32 {
        self.registry()
            .objects
            .iter()
            .find(|(_, registered)| Arc::ptr_eq(registered, object))
            .map_or(-1, |(&id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.registry().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry().objects.is_empty()
    }

    /// ### English
    /// Drops every registered object. Ids handed out before stay retired.
    ///
    /// ### 中文
    /// 丢弃所有已注册对象。之前分配的 id 保持作废。
    pub fn clear(&self) {
        let objects = std::mem::take(&mut self.registry().objects);
        debug!(count = objects.len(), "binder registry cleared");
    }

    /// ### English
    /// Routes a transaction to the object registered under `id`.
    ///
    /// An unknown id or a missing/mismatched interface token is logged and answered with an empty
    /// reply. The registry lock is not held while the object runs.
    ///
    /// ### 中文
    /// 将事务路由到以 `id` 注册的对象。
    ///
    /// 未知 id 或接口令牌缺失/不匹配时记录日志并返回空回复。对象执行期间不持有注册表锁。
    pub fn dispatch(&self, id: i32, code: u32, flags: u32, data: &mut Parcel) -> Parcel {
        let mut reply = Parcel::new();

        let Some(object) = self.lookup(id) else {
            warn!(id, code, "transaction for unknown binder id");
            return reply;
        };
        let descriptor = object.interface_descriptor();
        if !data.enforce_interface(descriptor) {
            warn!(id, code, descriptor, "interface token mismatch");
            return reply;
        }

        object.transact(code, flags, data, &mut reply);
        reply
    }
}

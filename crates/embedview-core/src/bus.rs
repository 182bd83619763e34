use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::host_events::{EngineEvent, WindowMetrics};
use crate::pointer::PointerEvent;
use crate::services::EngineSink;

/// Event queue into the render engine (single-consumer).
///
/// Producer side: any thread holding a [`BusProducer`].
/// Consumer side: by rules, exactly one thread (the render thread) receives.
///
/// Runtime-guard:
/// - first consumer becomes the owner,
/// - other consumers will panic in debug builds.
pub struct Bus<E: Send + 'static> {
    tx: Sender<E>,
    rx: Receiver<E>,
    consumer_guard: ConsumerGuard,
}

impl<E: Send + 'static> Bus<E> {
    #[inline]
    pub fn unbounded() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self::from_channel(tx, rx)
    }

    #[inline]
    pub fn bounded(cap: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(cap);
        Self::from_channel(tx, rx)
    }

    #[inline]
    pub fn from_channel(tx: Sender<E>, rx: Receiver<E>) -> Self {
        Self {
            tx,
            rx,
            consumer_guard: ConsumerGuard::new(),
        }
    }

    #[inline]
    pub fn producer(&self) -> BusProducer<E> {
        BusProducer { tx: self.tx.clone() }
    }

    /// Single-consumer receive.
    #[inline]
    pub fn try_recv(&self) -> Option<E> {
        self.consumer_guard.assert_or_claim();
        self.rx.try_recv().ok()
    }

    /// Single-consumer receive with a deadline. Doubles as the render loop's frame pacing.
    #[inline]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<E> {
        self.consumer_guard.assert_or_claim();
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Single-consumer drain with callback.
    #[inline]
    pub fn drain<F: FnMut(E)>(&self, mut f: F) -> usize {
        self.consumer_guard.assert_or_claim();
        let mut n = 0usize;
        while let Ok(ev) = self.rx.try_recv() {
            f(ev);
            n += 1;
        }
        n
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Cloneable sending half of a [`Bus`].
pub struct BusProducer<E: Send + 'static> {
    tx: Sender<E>,
}

impl<E: Send + 'static> Clone for BusProducer<E> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<E: Send + 'static> BusProducer<E> {
    /// Never blocks. A full or disconnected bus drops the event.
    #[inline]
    pub fn try_send(&self, ev: E) -> bool {
        match self.tx.try_send(ev) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("bus: full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("bus: consumer gone, event dropped");
                false
            }
        }
    }
}

impl EngineSink for BusProducer<EngineEvent> {
    fn send_window_metrics(&self, metrics: WindowMetrics) {
        self.try_send(EngineEvent::WindowMetrics(metrics));
    }

    fn send_pointer_event(&self, event: PointerEvent) {
        self.try_send(EngineEvent::Pointer(event));
    }
}

struct ConsumerGuard {
    owner: AtomicU64,
}

impl ConsumerGuard {
    #[inline]
    fn new() -> Self {
        Self {
            owner: AtomicU64::new(0),
        }
    }

    #[inline]
    fn assert_or_claim(&self) {
        let id = consumer_id();
        match self
            .owner
            .compare_exchange(0, id, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(cur) if cur == id => {}
            Err(_) => {
                if cfg!(debug_assertions) {
                    panic!("Bus<E> single-consumer violation: multiple consumers detected");
                }
            }
        }
    }
}

#[inline]
fn consumer_id() -> u64 {
    // Stable per-thread id, only used to tell consumers apart.
    use std::hash::{Hash, Hasher};
    let tid = std::thread::current().id();
    let mut h = std::collections::hash_map::DefaultHasher::new();
    tid.hash(&mut h);
    let v = h.finish();
    if v == 0 {
        1
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_feeds_engine_events_in_order() {
        let bus: Bus<EngineEvent> = Bus::unbounded();
        let sink = bus.producer();

        let m = WindowMetrics {
            width: 640,
            height: 480,
            pixel_ratio: 1.5,
        };
        sink.send_window_metrics(m);
        sink.send_window_metrics(WindowMetrics { width: 1, ..m });

        let mut got = Vec::new();
        assert_eq!(bus.drain(|ev| got.push(ev)), 2);
        assert_eq!(got[0], EngineEvent::WindowMetrics(m));
        assert!(bus.is_empty());
    }

    #[test]
    fn full_bounded_bus_drops_instead_of_blocking() {
        let bus: Bus<u32> = Bus::bounded(1);
        let p = bus.producer();
        assert!(p.try_send(1));
        assert!(!p.try_send(2));
        assert_eq!(bus.try_recv(), Some(1));
        assert_eq!(bus.try_recv(), None);
    }

    #[test]
    fn recv_timeout_returns_none_when_idle() {
        let bus: Bus<u32> = Bus::unbounded();
        assert_eq!(bus.recv_timeout(Duration::from_millis(1)), None);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn second_consumer_thread_panics_in_debug() {
        let bus: Bus<u32> = Bus::unbounded();
        let _ = bus.try_recv();

        let res = std::thread::scope(|s| s.spawn(|| bus.try_recv()).join());
        assert!(res.is_err());
    }
}

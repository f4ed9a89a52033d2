use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Одноместный почтовый ящик: новое значение затирает непрочитанное.
///
/// Очередь никогда не растёт; получатель видит только последнее значение.
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
    notify: Notify,
    closed: AtomicBool,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Положить значение; возвращает затёртое непрочитанное значение
    pub fn put(&self, value: T) -> Option<T> {
        let superseded = self.slot.lock().replace(value);
        self.notify.notify_one();
        superseded
    }

    pub fn try_take(&self) -> Option<T> {
        self.slot.lock().take()
    }

    /// Дождаться значения. `None` - ящик закрыт и пуст.
    pub async fn recv(&self) -> Option<T> {
        loop {
            if let Some(value) = self.try_take() {
                return Some(value);
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            self.notify.notified().await;
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_put_overwrites_unread_value() {
        let mailbox = Mailbox::new();
        assert_eq!(mailbox.put(1), None);
        assert_eq!(mailbox.put(2), Some(1));
        assert_eq!(mailbox.try_take(), Some(2));
        assert_eq!(mailbox.try_take(), None);
    }

    #[tokio::test]
    async fn test_recv_waits_for_put() {
        let mailbox = Arc::new(Mailbox::new());
        let sender = mailbox.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sender.put("hello");
        });

        let value = tokio::time::timeout(Duration::from_secs(1), mailbox.recv())
            .await
            .unwrap();
        assert_eq!(value, Some("hello"));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_wakes_receiver() {
        let mailbox: Arc<Mailbox<u32>> = Arc::new(Mailbox::new());
        let closer = mailbox.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            closer.close();
        });

        let value = tokio::time::timeout(Duration::from_secs(1), mailbox.recv())
            .await
            .unwrap();
        assert_eq!(value, None);
        assert!(mailbox.is_closed());
    }

    #[tokio::test]
    async fn test_pending_value_delivered_before_close() {
        let mailbox = Mailbox::new();
        mailbox.put(7);
        mailbox.close();
        assert_eq!(mailbox.recv().await, Some(7));
        assert_eq!(mailbox.recv().await, None);
    }
}

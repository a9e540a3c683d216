//! Bounded FIFO of [`Command`]s between input producers and the transmitter.
//!
//! `push` blocks while the queue is full and `pop` blocks while it is empty;
//! neither has a timeout. The queue closes once every [`CommandSender`] is
//! dropped, after which the receiver drains what is left and then reports
//! closure.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

use crate::command::Command;
use crate::error::{Result, StationError};

/// Reference queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Create a queue holding at most `capacity` commands (minimum 1).
pub fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Producer handle. Clone it to add producers.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: SyncSender<Command>,
}

impl CommandSender {
    /// Enqueue, blocking while the queue is full.
    pub fn push(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| StationError::QueueClosed)
    }

    /// Enqueue without blocking; the command is dropped on failure.
    pub fn try_push(&self, command: Command) -> Result<()> {
        self.tx.try_send(command).map_err(|err| match err {
            TrySendError::Full(_) => StationError::QueueFull,
            TrySendError::Disconnected(_) => StationError::QueueClosed,
        })
    }
}

/// Consumer handle. There is exactly one.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<Command>,
}

impl CommandReceiver {
    /// Dequeue, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<Command> {
        self.rx.recv().ok()
    }

    /// Dequeue, waiting at most `timeout`.
    ///
    /// `Ok(None)` means the wait timed out with the queue still open.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<Option<Command>> {
        match self.rx.recv_timeout(timeout) {
            Ok(command) => Ok(Some(command)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(StationError::QueueClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    fn predefined(msg_id: u8) -> Command {
        Command::Predefined { msg_id }
    }

    #[test]
    fn delivers_in_push_order() {
        let (tx, rx) = command_queue(DEFAULT_QUEUE_CAPACITY);
        for id in 0..10 {
            tx.push(predefined(id)).unwrap();
        }
        for id in 0..10 {
            assert_eq!(rx.pop(), Some(predefined(id)));
        }
    }

    #[test]
    fn try_push_reports_full_at_capacity() {
        let (tx, rx) = command_queue(3);
        for id in 0..3 {
            tx.try_push(predefined(id)).unwrap();
        }
        assert!(matches!(
            tx.try_push(predefined(3)),
            Err(StationError::QueueFull)
        ));
        assert_eq!(rx.pop(), Some(predefined(0)));
        tx.try_push(predefined(3)).unwrap();
    }

    #[test]
    fn push_beyond_capacity_blocks_until_pop() {
        let capacity = 4;
        let (tx, rx) = command_queue(capacity);
        for id in 0..capacity as u8 {
            tx.push(predefined(id)).unwrap();
        }

        let pushed = Arc::new(AtomicBool::new(false));
        let producer = {
            let pushed = Arc::clone(&pushed);
            let tx = tx.clone();
            std::thread::spawn(move || {
                tx.push(predefined(99)).unwrap();
                pushed.store(true, Ordering::SeqCst);
            })
        };

        std::thread::sleep(Duration::from_millis(100));
        assert!(!pushed.load(Ordering::SeqCst), "push should still be blocked");

        assert_eq!(rx.pop(), Some(predefined(0)));
        producer.join().unwrap();
        assert!(pushed.load(Ordering::SeqCst));

        for id in 1..capacity as u8 {
            assert_eq!(rx.pop(), Some(predefined(id)));
        }
        assert_eq!(rx.pop(), Some(predefined(99)));
    }

    #[test]
    fn pop_blocks_until_push() {
        let (tx, rx) = command_queue(1);
        let consumer = std::thread::spawn(move || rx.pop());
        std::thread::sleep(Duration::from_millis(50));
        tx.push(predefined(7)).unwrap();
        assert_eq!(consumer.join().unwrap(), Some(predefined(7)));
    }

    #[test]
    fn closed_queue_drains_then_ends() {
        let (tx, rx) = command_queue(2);
        tx.push(predefined(1)).unwrap();
        drop(tx);
        assert_eq!(rx.pop(), Some(predefined(1)));
        assert_eq!(rx.pop(), None);
        assert!(matches!(
            rx.pop_timeout(Duration::from_millis(1)),
            Err(StationError::QueueClosed)
        ));
    }

    #[test]
    fn pop_timeout_on_open_empty_queue() {
        let (_tx, rx) = command_queue(1);
        assert!(matches!(
            rx.pop_timeout(Duration::from_millis(5)),
            Ok(None)
        ));
    }

    #[test]
    fn push_after_consumer_dropped_fails() {
        let (tx, rx) = command_queue(1);
        drop(rx);
        assert!(matches!(
            tx.push(predefined(0)),
            Err(StationError::QueueClosed)
        ));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let (tx, _rx) = command_queue(0);
        tx.try_push(predefined(0)).unwrap();
        assert!(matches!(
            tx.try_push(predefined(1)),
            Err(StationError::QueueFull)
        ));
    }
}

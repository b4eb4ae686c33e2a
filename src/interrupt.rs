use log::debug;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Delivery point for a user interrupt (Ctrl+C).
pub struct Interrupt {
    rx: Receiver<()>,
}

impl Interrupt {
    /// Routes SIGINT into a new `Interrupt`. Only one handler can be
    /// installed per process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let (tx, interrupt) = Self::channel();
        ctrlc::set_handler(move || {
            debug!("Interrupt received");
            let _ = tx.send(());
        })?;
        Ok(interrupt)
    }

    /// An `Interrupt` raised by sending on the returned sender.
    pub fn channel() -> (Sender<()>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Interrupt { rx })
    }

    /// Non-blocking check.
    pub fn is_raised(&self) -> bool {
        match self.rx.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => false,
        }
    }

    /// Sleeps up to `timeout`, returning early with `true` on interrupt.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            // No sender left: nothing can interrupt the rest of the sleep.
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn raised_once_per_signal() {
        let (tx, interrupt) = Interrupt::channel();
        assert!(!interrupt.is_raised());
        tx.send(()).unwrap();
        assert!(interrupt.is_raised());
        assert!(!interrupt.is_raised());
    }

    #[test]
    fn wait_times_out_without_signal() {
        let (_tx, interrupt) = Interrupt::channel();
        assert!(!interrupt.wait(Duration::from_millis(5)));
    }

    #[test]
    fn wait_returns_early_on_signal() {
        let (tx, interrupt) = Interrupt::channel();
        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            tx.send(()).unwrap();
        });
        let start = Instant::now();
        assert!(interrupt.wait(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        sender.join().unwrap();
    }
}

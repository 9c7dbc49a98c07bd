/*
 * Single-producer single-consumer scan code ring
 *
 * The clock interrupt is the only producer and the main loop the only
 * consumer. head belongs to the producer, tail to the consumer, and count is
 * the hand-off: the producer publishes a slot by incrementing it last
 * (release), the consumer frees a slot by decrementing it after the byte has
 * been read out.
 */

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

pub struct ScanBuffer<const N: usize> {
    slots: [AtomicU8; N],
    head: AtomicUsize,
    tail: AtomicUsize,
    count: AtomicUsize,
}

impl<const N: usize> ScanBuffer<N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /*
     * push - Producer side. Hands the byte back when the ring is full; the
     * contents already queued are left untouched.
     */
    pub fn push(&self, byte: u8) -> Result<(), u8> {
        if self.count.load(Ordering::Acquire) >= N {
            return Err(byte);
        }
        let head = self.head.load(Ordering::Relaxed);
        self.slots[head].store(byte, Ordering::Relaxed);
        self.head.store((head + 1) % N, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /* pop - Consumer side, never blocks */
    pub fn pop(&self) -> Option<u8> {
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }
        let tail = self.tail.load(Ordering::Relaxed);
        let byte = self.slots[tail].load(Ordering::Relaxed);
        self.tail.store((tail + 1) % N, Ordering::Relaxed);
        self.count.fetch_sub(1, Ordering::Release);
        Some(byte)
    }
}

impl<const N: usize> Default for ScanBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let ring: ScanBuffer<4> = ScanBuffer::new();
        assert!(ring.is_empty());
        ring.push(0x1E).unwrap();
        ring.push(0x9E).unwrap();
        ring.push(0x30).unwrap();
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.pop(), Some(0x1E));
        assert_eq!(ring.pop(), Some(0x9E));
        assert_eq!(ring.pop(), Some(0x30));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_full_rejects_and_preserves() {
        let ring: ScanBuffer<3> = ScanBuffer::new();
        for b in 1..=3 {
            ring.push(b).unwrap();
        }
        assert!(ring.is_full());
        assert_eq!(ring.push(0x44), Err(0x44));
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_wraps_around() {
        let ring: ScanBuffer<4> = ScanBuffer::new();
        for round in 0..10u8 {
            ring.push(round).unwrap();
            ring.push(round.wrapping_add(100)).unwrap();
            assert_eq!(ring.pop(), Some(round));
            assert_eq!(ring.pop(), Some(round.wrapping_add(100)));
        }
        assert!(ring.len() <= ring.capacity());
    }

    #[test]
    fn test_zero_capacity() {
        let ring: ScanBuffer<0> = ScanBuffer::new();
        assert_eq!(ring.push(1), Err(1));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_cross_thread_order() {
        use std::sync::Arc;

        let ring: Arc<ScanBuffer<8>> = Arc::new(ScanBuffer::new());
        let producer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                for b in 0..=200u8 {
                    while ring.push(b).is_err() {
                        std::hint::spin_loop();
                    }
                }
            })
        };

        let mut expected = 0u8;
        while expected <= 200 {
            if let Some(b) = ring.pop() {
                assert_eq!(b, expected);
                if expected == 200 {
                    break;
                }
                expected += 1;
            }
        }
        producer.join().unwrap();
    }
}

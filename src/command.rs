//! Queued motion commands and the cross-context command queue.
//!
//! Commands flow one way: the producer context (serial decoder, front
//! panel) enqueues, the tick interrupt dequeues. The queue is a lock-free
//! single-producer single-consumer ring from [`heapless::spsc`], so neither
//! side ever takes a lock to move a command across.

use crate::config::units::{Point, Pressure, Speed};

/// Ring capacity of the command queue.
///
/// A power of two keeps the ring's index arithmetic cheap. The ring keeps
/// one slot free as its full/empty discriminator, so up to
/// `COMMAND_QUEUE_DEPTH - 1` commands may be pending at once.
pub const COMMAND_QUEUE_DEPTH: usize = 32;

/// A unit of queued work, consumed one per tick at most.
///
/// Motion targets are absolute machine coordinates; the user-origin offset
/// was already applied (and the target validated) when the command was
/// accepted. Parameter commands take effect only when dequeued, so they
/// interleave with motion in strict order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Travel to the target with the pen raised.
    Move(Point),
    /// Cut/draw a straight segment to the target with the pen lowered.
    Draw(Point),
    /// Change the step rate when this reaches the head of the queue.
    SetSpeed(Speed),
    /// Change the pen pressure when this reaches the head of the queue.
    SetPressure(Pressure),
}

/// The command ring buffer. Allocate one (statically on embedded targets)
/// and split it with [`MachineCell::attach`](crate::machine::MachineCell::attach).
pub type CommandQueue = heapless::spsc::Queue<Command, COMMAND_QUEUE_DEPTH>;

/// Producer half of the command ring.
pub type CommandProducer<'a> = heapless::spsc::Producer<'a, Command, COMMAND_QUEUE_DEPTH>;

/// Consumer half of the command ring.
pub type CommandConsumer<'a> = heapless::spsc::Consumer<'a, Command, COMMAND_QUEUE_DEPTH>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = CommandQueue::new();
        let (mut tx, mut rx) = queue.split();

        tx.enqueue(Command::Move(Point::steps(1, 1))).unwrap();
        tx.enqueue(Command::SetSpeed(Speed(3))).unwrap();
        tx.enqueue(Command::Draw(Point::steps(2, 2))).unwrap();

        assert_eq!(rx.dequeue(), Some(Command::Move(Point::steps(1, 1))));
        assert_eq!(rx.dequeue(), Some(Command::SetSpeed(Speed(3))));
        assert_eq!(rx.dequeue(), Some(Command::Draw(Point::steps(2, 2))));
        assert_eq!(rx.dequeue(), None);
    }

    #[test]
    fn test_queue_holds_depth_minus_one() {
        let mut queue = CommandQueue::new();
        let (mut tx, _rx) = queue.split();

        for i in 0..COMMAND_QUEUE_DEPTH - 1 {
            tx.enqueue(Command::Move(Point::steps(i as i32, 0)))
                .unwrap();
        }
        assert!(tx.enqueue(Command::Move(Point::ORIGIN)).is_err());
    }

    #[test]
    fn test_producer_len_tracks_consumption() {
        let mut queue = CommandQueue::new();
        let (mut tx, mut rx) = queue.split();

        tx.enqueue(Command::SetPressure(Pressure::MAX)).unwrap();
        tx.enqueue(Command::Move(Point::ORIGIN)).unwrap();
        assert_eq!(tx.len(), 2);

        rx.dequeue().unwrap();
        assert_eq!(tx.len(), 1);
        rx.dequeue().unwrap();
        assert_eq!(tx.len(), 0);
    }
}

//! Control messages from a UI thread to the audio thread.
//!
//! The audio callback never blocks, so parameter changes travel over a
//! lock-free single-producer ring. [`drain`] is called once per block,
//! before rendering, and applies everything queued since the last block.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::modules::ModuleNode;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    /// Set parameter `index` (clamped to its declared range).
    SetParam { index: usize, value: f32 },
    /// Re-zero the module's state.
    Reset,
}

pub trait ControlReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl ControlReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

/// Apply one message. Returns `false` for an unknown parameter index.
pub fn apply(node: &mut dyn ModuleNode, message: ControlMessage) -> bool {
    match message {
        ControlMessage::SetParam { index, value } => node.set_param(index, value),
        ControlMessage::Reset => {
            node.reset();
            true
        }
    }
}

/// Apply every pending message; returns how many were taken.
pub fn drain<R: ControlReceiver + ?Sized>(receiver: &mut R, node: &mut dyn ModuleNode) -> usize {
    let mut count = 0;
    while let Some(message) = receiver.pop() {
        apply(node, message);
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{ModuleKind, ProcessCtx};
    use std::collections::VecDeque;

    impl ControlReceiver for VecDeque<ControlMessage> {
        fn pop(&mut self) -> Option<ControlMessage> {
            self.pop_front()
        }
    }

    #[test]
    fn test_set_param_is_clamped() {
        let mut node = ModuleKind::NeoFiltre.build();
        assert!(apply(node.as_mut(), ControlMessage::SetParam { index: 0, value: 3.0 }));
        assert_eq!(node.param(0), Some(1.0));
        assert!(!apply(node.as_mut(), ControlMessage::SetParam { index: 99, value: 0.5 }));
    }

    #[test]
    fn test_drain_applies_in_order() {
        let mut node = ModuleKind::NeoGen.build();
        let mut queue: VecDeque<ControlMessage> = [
            ControlMessage::SetParam { index: 0, value: 0.2 },
            ControlMessage::SetParam { index: 0, value: 0.7 },
        ]
        .into_iter()
        .collect();
        assert_eq!(drain(&mut queue, node.as_mut()), 2);
        assert_eq!(node.param(0), Some(0.7));
        assert!(queue.is_empty());
        assert_eq!(drain(&mut queue, node.as_mut()), 0);
    }

    #[test]
    fn test_reset_message_replays_output() {
        let ctx = ProcessCtx::new(48_000.0);
        let mut node = ModuleKind::SirenConcrete.build();
        node.set_param(0, 0.8);

        let mut first = vec![0.0; 512];
        node.render_block(&mut first, &ctx);
        apply(node.as_mut(), ControlMessage::Reset);
        let mut second = vec![0.0; 512];
        node.render_block(&mut second, &ctx);
        assert_eq!(first, second);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn test_ring_buffer_transport() {
        let (mut producer, mut consumer) = rtrb::RingBuffer::<ControlMessage>::new(8);
        let mut node = ModuleKind::ChaosLfo.build();
        producer
            .push(ControlMessage::SetParam { index: 0, value: 4.0 })
            .expect("ring has room");
        assert_eq!(drain(&mut consumer, node.as_mut()), 1);
        assert_eq!(node.param(0), Some(4.0));
    }
}

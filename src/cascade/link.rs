use crossbeam_channel::{Receiver, Sender, bounded};

use crate::element::DataElement;
use crate::error::{FilterError, LinkKind, Result};
use crate::reload::ReloadTrigger;

/// Copy of an input window handed to the next kernel
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBroadcast<T> {
    pub primary: Vec<T>,
    pub secondary: Option<Vec<T>>,
}

/// Upstream end of the link between cascade positions `P` and `P + 1`
pub struct CascadeSender<T: DataElement, C> {
    window: Sender<WindowBroadcast<T>>,
    partial: Sender<Vec<T::Acc>>,
    control: Option<Sender<ReloadTrigger<C>>>,
}

/// Downstream end of a cascade link
pub struct CascadeReceiver<T: DataElement, C> {
    window: Receiver<WindowBroadcast<T>>,
    partial: Receiver<Vec<T::Acc>>,
    control: Option<Receiver<ReloadTrigger<C>>>,
}

/// Create the channels joining two adjacent kernels
///
/// Each channel buffers `depth` invocations; the partial channel holds one
/// accumulator vector per output vector of each of them. A depth of 1 lets
/// a caller run the kernels of a cascade one after another on one thread.
pub fn cascade_link<T: DataElement, C>(
    vectors: usize,
    depth: usize,
    reload: bool,
) -> (CascadeSender<T, C>, CascadeReceiver<T, C>) {
    let depth = depth.max(1);
    let (window_tx, window_rx) = bounded(depth);
    let (partial_tx, partial_rx) = bounded(depth * vectors.max(1));
    let (control_tx, control_rx) = if reload {
        let (tx, rx) = bounded(depth);
        (Some(tx), Some(rx))
    } else {
        (None, None)
    };
    (
        CascadeSender {
            window: window_tx,
            partial: partial_tx,
            control: control_tx,
        },
        CascadeReceiver {
            window: window_rx,
            partial: partial_rx,
            control: control_rx,
        },
    )
}

impl<T: DataElement, C> CascadeSender<T, C> {
    pub fn send_window(&self, window: WindowBroadcast<T>) -> Result<()> {
        self.window
            .send(window)
            .map_err(|_| FilterError::Disconnected(LinkKind::Window))
    }

    pub fn send_partial(&self, acc: Vec<T::Acc>) -> Result<()> {
        self.partial
            .send(acc)
            .map_err(|_| FilterError::Disconnected(LinkKind::Partial))
    }

    pub fn send_trigger(&self, trigger: ReloadTrigger<C>) -> Result<()> {
        let control = self
            .control
            .as_ref()
            .ok_or(FilterError::MissingLink(LinkKind::Control))?;
        control
            .send(trigger)
            .map_err(|_| FilterError::Disconnected(LinkKind::Control))
    }
}

impl<T: DataElement, C> CascadeReceiver<T, C> {
    pub fn recv_window(&self) -> Result<WindowBroadcast<T>> {
        self.window
            .recv()
            .map_err(|_| FilterError::Disconnected(LinkKind::Window))
    }

    pub fn recv_partial(&self) -> Result<Vec<T::Acc>> {
        self.partial
            .recv()
            .map_err(|_| FilterError::Disconnected(LinkKind::Partial))
    }

    pub fn recv_trigger(&self) -> Result<ReloadTrigger<C>> {
        let control = self
            .control
            .as_ref()
            .ok_or(FilterError::MissingLink(LinkKind::Control))?;
        control
            .recv()
            .map_err(|_| FilterError::Disconnected(LinkKind::Control))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partials_arrive_in_order() {
        let (tx, rx) = cascade_link::<i16, i32>(3, 1, false);
        for v in 0..3 {
            tx.send_partial(vec![v as i128; 2]).unwrap();
        }
        for v in 0..3 {
            assert_eq!(rx.recv_partial().unwrap(), vec![v as i128; 2]);
        }
    }

    #[test]
    fn test_control_link_only_with_reload() {
        let (tx, _rx) = cascade_link::<f32, f32>(1, 1, false);
        assert_eq!(
            tx.send_trigger(ReloadTrigger::Unchanged),
            Err(FilterError::MissingLink(LinkKind::Control))
        );

        let (tx, rx) = cascade_link::<f32, f32>(1, 1, true);
        tx.send_trigger(ReloadTrigger::Changed(vec![1.0])).unwrap();
        assert_eq!(rx.recv_trigger().unwrap(), ReloadTrigger::Changed(vec![1.0]));
    }

    #[test]
    fn test_dropped_sender_disconnects() {
        let (tx, rx) = cascade_link::<f32, f32>(1, 1, false);
        drop(tx);
        assert_eq!(
            rx.recv_window(),
            Err(FilterError::Disconnected(LinkKind::Window))
        );
    }
}

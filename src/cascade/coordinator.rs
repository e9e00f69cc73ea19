use super::CascadeRole;
use super::link::{CascadeReceiver, CascadeSender, WindowBroadcast};
use crate::element::DataElement;
use crate::error::{FilterError, LinkKind, Result};
use crate::reload::ReloadTrigger;

/// Cascade-position-specific I/O around the convolution engine
pub struct CascadeCoordinator<T: DataElement, C> {
    role: CascadeRole,
    upstream: Option<CascadeReceiver<T, C>>,
    downstream: Option<CascadeSender<T, C>>,
}

impl<T: DataElement, C> CascadeCoordinator<T, C> {
    pub fn new(role: CascadeRole) -> Self {
        Self {
            role,
            upstream: None,
            downstream: None,
        }
    }

    pub fn role(&self) -> CascadeRole {
        self.role
    }

    pub fn connect_upstream(&mut self, link: CascadeReceiver<T, C>) -> Result<()> {
        if !self.role.has_upstream() {
            return Err(FilterError::Config(format!(
                "{:?} kernel has no upstream link",
                self.role
            )));
        }
        self.upstream = Some(link);
        Ok(())
    }

    pub fn connect_downstream(&mut self, link: CascadeSender<T, C>) -> Result<()> {
        if !self.role.has_downstream() {
            return Err(FilterError::Config(format!(
                "{:?} kernel has no downstream link",
                self.role
            )));
        }
        self.downstream = Some(link);
        Ok(())
    }

    /// Fail unless every link this role needs is connected
    pub fn check_links(&self) -> Result<()> {
        if self.role.has_upstream() && self.upstream.is_none() {
            return Err(FilterError::MissingLink(LinkKind::Partial));
        }
        if self.role.has_downstream() && self.downstream.is_none() {
            return Err(FilterError::MissingLink(LinkKind::Partial));
        }
        Ok(())
    }

    fn upstream(&self) -> Result<&CascadeReceiver<T, C>> {
        self.upstream
            .as_ref()
            .ok_or(FilterError::MissingLink(LinkKind::Window))
    }

    /// Window broadcast by the predecessor
    pub fn receive_window(&self) -> Result<WindowBroadcast<T>> {
        self.upstream()?.recv_window()
    }

    /// Pass the raw input window on to the successor, if there is one
    pub fn broadcast_window(&self, primary: &[T], secondary: Option<&[T]>) -> Result<()> {
        match &self.downstream {
            Some(link) => link.send_window(WindowBroadcast {
                primary: primary.to_vec(),
                secondary: secondary.map(<[T]>::to_vec),
            }),
            None => Ok(()),
        }
    }

    pub fn receive_trigger(&self) -> Result<ReloadTrigger<C>> {
        self.upstream()?.recv_trigger()
    }

    pub fn relay_trigger(&self, trigger: &ReloadTrigger<C>) -> Result<()>
    where
        C: Clone,
    {
        match &self.downstream {
            Some(link) => link.send_trigger(trigger.clone()),
            None => Ok(()),
        }
    }

    /// Starting accumulator for one output vector
    pub fn seed(&self, lanes: usize) -> Result<Vec<T::Acc>> {
        match &self.upstream {
            Some(link) => {
                let acc = link.recv_partial()?;
                debug_assert_eq!(acc.len(), lanes);
                Ok(acc)
            }
            None => Ok(vec![T::Acc::default(); lanes]),
        }
    }

    /// Forward a finished accumulator, or hand it back when this kernel is final
    pub fn finish(&self, acc: Vec<T::Acc>) -> Result<Option<Vec<T::Acc>>> {
        match &self.downstream {
            Some(link) => {
                link.send_partial(acc)?;
                Ok(None)
            }
            None => Ok(Some(acc)),
        }
    }
}

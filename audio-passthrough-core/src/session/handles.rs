use std::sync::Arc;

use serde::Serialize;

use crate::models::error::{PassthroughError, TransportError};
use crate::models::stream_types::{PathKind, StreamKind};
use crate::processing::wire;
use crate::traits::transport::{DriverCommand, DriverHandle, DriverTransport};

/// The data and control handles of one stream.
///
/// Both handles are unbound when this value is dropped.
pub(crate) struct BoundHandles {
    transport: Arc<dyn DriverTransport>,
    kind: StreamKind,
    data: DriverHandle,
    control: DriverHandle,
}

impl BoundHandles {
    /// Bind both paths. A control bind failure unbinds the data handle again.
    pub(crate) fn bind(
        transport: Arc<dyn DriverTransport>,
        kind: StreamKind,
    ) -> Result<Self, PassthroughError> {
        let data = transport.bind(kind, PathKind::Data).map_err(|e| {
            log::error!("{:?} data path bind failed: {}", kind, e);
            PassthroughError::Internal(format!("data path bind failed: {}", e))
        })?;
        let control = match transport.bind(kind, PathKind::Control) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("{:?} control path bind failed: {}", kind, e);
                if let Err(unbind) = transport.unbind(data) {
                    log::warn!("unbind of {:?} failed: {}", data, unbind);
                }
                return Err(PassthroughError::Internal(format!(
                    "control path bind failed: {}",
                    e
                )));
            }
        };
        Ok(Self {
            transport,
            kind,
            data,
            control,
        })
    }

    fn handle(&self, path: PathKind) -> DriverHandle {
        match path {
            PathKind::Data => self.data,
            PathKind::Control => self.control,
        }
    }

    /// Send raw bytes, keeping the transport error for diagnostics.
    pub(crate) fn dispatch_raw(
        &self,
        path: PathKind,
        command: DriverCommand,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        self.transport.dispatch(self.handle(path), command, request)
    }

    /// Encode `request`, send it and return the reply bytes.
    pub(crate) fn call<Q: Serialize>(
        &self,
        path: PathKind,
        command: DriverCommand,
        request: &Q,
    ) -> Result<Vec<u8>, PassthroughError> {
        let bytes = wire::encode(request)?;
        self.send(path, command, &bytes)
    }

    /// Send a command that carries no request body.
    pub(crate) fn query(
        &self,
        path: PathKind,
        command: DriverCommand,
    ) -> Result<Vec<u8>, PassthroughError> {
        self.send(path, command, &[])
    }

    fn send(
        &self,
        path: PathKind,
        command: DriverCommand,
        bytes: &[u8],
    ) -> Result<Vec<u8>, PassthroughError> {
        self.dispatch_raw(path, command, bytes).map_err(|e| {
            log::error!("{:?} {:?} failed: {}", self.kind, command, e);
            PassthroughError::Internal(format!("{:?} failed: {}", command, e))
        })
    }
}

impl Drop for BoundHandles {
    fn drop(&mut self) {
        for handle in [self.data, self.control] {
            if let Err(e) = self.transport.unbind(handle) {
                log::warn!("unbind of {:?} failed: {}", handle, e);
            }
        }
    }
}

use std::io::ErrorKind;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::traits::RadioLink;

/// Largest datagram accepted from the peer. Anything longer is truncated by
/// the kernel and will fail checksum validation upstream.
const RECV_BUFFER_SIZE: usize = 512;

/// Configuration for a [`DatagramLink`].
#[derive(Debug, Clone)]
pub struct DatagramLinkConfig {
    /// Socket path this radio receives on.
    pub local: PathBuf,
    /// Socket path of the other radio.
    pub peer: PathBuf,
    /// Simulated signal strength reported for every received frame.
    pub signal_strength: Option<i32>,
}

impl DatagramLinkConfig {
    pub fn new(local: impl Into<PathBuf>, peer: impl Into<PathBuf>) -> Self {
        Self {
            local: local.into(),
            peer: peer.into(),
            signal_strength: None,
        }
    }
}

/// Radio simulated over a Unix datagram socket.
///
/// One datagram carries one frame. Frames sent while the peer is not bound
/// are lost, exactly as a transmission with no receiver in range would be.
#[derive(Debug)]
pub struct DatagramLink {
    socket: UnixDatagram,
    local: PathBuf,
    peer: PathBuf,
    signal_strength: Option<i32>,
    pending: Mutex<Option<Bytes>>,
}

impl DatagramLink {
    /// Maximum socket path length.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind the local endpoint.
    ///
    /// A stale socket at `config.local` is removed first; any other kind of
    /// file at that path is left alone and reported as a bind error.
    pub fn bind(config: DatagramLinkConfig) -> Result<Self> {
        let path = config.local;

        let path_bytes = path.as_os_str().len();
        if path_bytes >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len: path_bytes,
                max: Self::MAX_PATH_LEN,
            });
        }

        remove_stale_socket(&path)?;

        let socket = UnixDatagram::bind(&path).map_err(|e| TransportError::Bind {
            path: path.clone(),
            source: e,
        })?;
        socket.set_nonblocking(true)?;

        info!(local = ?path, peer = ?config.peer, "radio endpoint bound");

        Ok(Self {
            socket,
            local: path,
            peer: config.peer,
            signal_strength: config.signal_strength,
            pending: Mutex::new(None),
        })
    }

    pub fn local_path(&self) -> &Path {
        &self.local
    }

    pub fn peer_path(&self) -> &Path {
        &self.peer
    }

    fn lock_pending(&self) -> Result<std::sync::MutexGuard<'_, Option<Bytes>>> {
        self.pending
            .lock()
            .map_err(|_| TransportError::Io(std::io::Error::other("pending lock poisoned")))
    }

    fn try_recv(&self) -> Result<Option<Bytes>> {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        loop {
            match self.socket.recv(&mut buf) {
                Ok(n) => return Ok(Some(Bytes::copy_from_slice(&buf[..n]))),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl RadioLink for DatagramLink {
    fn send(&self, frame: &[u8]) -> Result<()> {
        match self.socket.send_to(frame, &self.peer) {
            Ok(_) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::NotFound | ErrorKind::ConnectionRefused
                ) =>
            {
                debug!(peer = ?self.peer, "no radio listening, frame lost");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                warn!(peer = ?self.peer, "peer receive buffer full, frame lost");
                Ok(())
            }
            Err(err) => Err(TransportError::Send {
                path: self.peer.clone(),
                source: err,
            }),
        }
    }

    fn has_inbound_data(&self) -> Result<bool> {
        let mut pending = self.lock_pending()?;
        if pending.is_some() {
            return Ok(true);
        }
        *pending = self.try_recv()?;
        Ok(pending.is_some())
    }

    fn receive_available(&self) -> Result<Bytes> {
        let mut pending = self.lock_pending()?;
        if let Some(bytes) = pending.take() {
            return Ok(bytes);
        }
        Ok(self.try_recv()?.unwrap_or_default())
    }

    fn last_signal_strength(&self) -> Option<i32> {
        self.signal_strength
    }
}

impl Drop for DatagramLink {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.local) {
            if err.kind() != ErrorKind::NotFound {
                debug!(path = ?self.local, error = %err, "failed to remove socket file");
            }
        }
    }
}

fn remove_stale_socket(path: &Path) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(TransportError::Bind {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };

    if !metadata.file_type().is_socket() {
        return Err(TransportError::Bind {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                ErrorKind::AlreadyExists,
                "existing path is not a unix socket",
            ),
        });
    }

    debug!(?path, "removing stale socket");
    std::fs::remove_file(path).map_err(|e| TransportError::Bind {
        path: path.to_path_buf(),
        source: e,
    })
}

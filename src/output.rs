//! Byte sinks for finished command streams.

use std::{
    fs::File,
    io::{self, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use log::debug;

use crate::error::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Destination for ESC/POS bytes.
pub trait Output {
    fn write(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Flush and release the sink. Further writes are undefined.
    fn close(&mut self) -> Result<(), Error>;
}

/// Output method names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Network,
    File,
}

impl FromStr for OutputKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "network" => Ok(Self::Network),
            "file" => Ok(Self::File),
            _ => Err(Error::UnknownOutput(s.to_string())),
        }
    }
}

/// Open the sink selected by `kind`.
///
/// `network_addr` is required for [`OutputKind::Network`] and `file_path`
/// for [`OutputKind::File`]. The network sink connects here, before any
/// image work is done.
pub fn open_output(
    kind: OutputKind,
    network_addr: Option<&str>,
    file_path: Option<&Path>,
) -> Result<Box<dyn Output>, Error> {
    match kind {
        OutputKind::Stdout => Ok(Box::new(StdoutOutput::new())),
        OutputKind::Network => {
            let addr = network_addr.filter(|a| !a.is_empty()).ok_or_else(|| {
                Error::InvalidConfig("network address is required for network output".to_string())
            })?;
            Ok(Box::new(NetworkOutput::connect(addr)?))
        }
        OutputKind::File => {
            let path = file_path.ok_or_else(|| {
                Error::InvalidConfig("file path is required for file output".to_string())
            })?;
            Ok(Box::new(FileOutput::create(path)?))
        }
    }
}

pub struct StdoutOutput {
    stdout: io::Stdout,
}

impl StdoutOutput {
    pub fn new() -> Self {
        StdoutOutput {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for StdoutOutput {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.stdout
            .lock()
            .write_all(data)
            .map_err(|e| Error::sink("write", "stdout", e))
    }

    fn close(&mut self) -> Result<(), Error> {
        self.stdout
            .flush()
            .map_err(|e| Error::sink("flush", "stdout", e))
    }
}

/// Raw TCP connection to a network printer, usually on port 9100.
pub struct NetworkOutput {
    addr: String,
    stream: TcpStream,
}

impl NetworkOutput {
    pub fn connect(addr: &str) -> Result<Self, Error> {
        let connect_err = |source| Error::Connect {
            addr: addr.to_string(),
            source,
        };

        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing");
        for sock_addr in addr.to_socket_addrs().map_err(connect_err)? {
            match TcpStream::connect_timeout(&sock_addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    stream
                        .set_write_timeout(Some(WRITE_TIMEOUT))
                        .map_err(connect_err)?;
                    debug!("Connected to printer at {}", sock_addr);
                    return Ok(NetworkOutput {
                        addr: addr.to_string(),
                        stream,
                    });
                }
                Err(err) => {
                    debug!("Failed to connect to {}: {:?}", sock_addr, err);
                    last_err = err;
                }
            }
        }
        Err(connect_err(last_err))
    }
}

impl Output for NetworkOutput {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.stream
            .write_all(data)
            .map_err(|e| Error::sink("write", self.addr.clone(), e))?;
        debug!("Sent {} bytes to {}", data.len(), self.addr);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.stream
            .flush()
            .and_then(|_| self.stream.shutdown(Shutdown::Both))
            .map_err(|e| Error::sink("close", self.addr.clone(), e))
    }
}

pub struct FileOutput {
    path: PathBuf,
    file: File,
}

impl FileOutput {
    /// Create or truncate the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .map_err(|e| Error::sink("create", path.display().to_string(), e))?;
        Ok(FileOutput { path, file })
    }
}

impl Output for FileOutput {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.file
            .write_all(data)
            .map_err(|e| Error::sink("write", self.path.display().to_string(), e))?;
        debug!("Wrote {} bytes to {:?}", data.len(), self.path);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.file
            .sync_all()
            .map_err(|e| Error::sink("close", self.path.display().to_string(), e))
    }
}

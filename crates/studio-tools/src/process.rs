//! Child processes whose stdout and stderr share one pipe

use std::io;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

/// Read side of a child's combined stdout/stderr
pub type MergedOutput = Pin<Box<dyn AsyncRead + Send>>;

/// Spawn `cmd` with stdout and stderr writing to the same pipe.
///
/// Bytes arrive in the order the child wrote them, whichever stream they were
/// written to. `cmd` is consumed so the parent's copies of the write end are
/// closed right after spawning; the reader reaches EOF once every process
/// holding the pipe has exited.
pub fn spawn_merged(mut cmd: Command) -> io::Result<(Child, MergedOutput)> {
    let (reader, writer) = io::pipe()?;
    let stderr = writer.try_clone()?;
    cmd.stdout(writer).stderr(stderr);

    let child = cmd.spawn()?;
    drop(cmd);

    Ok((child, into_async(reader)?))
}

#[cfg(unix)]
fn into_async(reader: io::PipeReader) -> io::Result<MergedOutput> {
    use std::os::fd::OwnedFd;

    let file = std::fs::File::from(OwnedFd::from(reader));
    let receiver = tokio::net::unix::pipe::Receiver::from_file(file)?;
    Ok(Box::pin(receiver))
}

#[cfg(not(unix))]
fn into_async(mut reader: io::PipeReader) -> io::Result<MergedOutput> {
    use std::io::Read;
    use tokio::io::AsyncWriteExt;

    let handle = tokio::runtime::Handle::try_current().map_err(io::Error::other)?;
    let (mut tx, rx) = tokio::io::duplex(8 * 1024);
    // Anonymous pipes cannot be registered with the reactor here
    std::thread::spawn(move || {
        let mut buf = [0u8; 8 * 1024];
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if handle.block_on(tx.write_all(&buf[..n])).is_err() {
                        break;
                    }
                }
            }
        }
    });
    Ok(Box::pin(rx))
}

//! The host syscall interface.
//!
//! The VM owns memory, the heap, and formatting; everything that
//! actually crosses into the operating system — files and the output
//! stream — goes through [`Host`]. That seam is what lets the
//! integration tests run whole programs and assert on their output
//! without touching a real stdout.

use std::fs::File;
use std::io::{Read, Write};

use rustc_hash::FxHashMap;

/// Host-provided primitives. Return values use the syscall convention:
/// results are plain integers, negative on failure.
pub trait Host {
    /// Opens `path` read-only and returns a file descriptor, or a
    /// negative value on failure. `flags` is accepted for source
    /// compatibility and ignored.
    fn open(&mut self, path: &[u8], flags: i64) -> i64;

    /// Reads up to `buf.len()` bytes from `fd` into `buf`, returning
    /// the byte count or a negative value.
    fn read(&mut self, fd: i64, buf: &mut [u8]) -> i64;

    /// Closes `fd`.
    fn close(&mut self, fd: i64) -> i64;

    /// Writes formatted output, returning the number of bytes written.
    fn write(&mut self, bytes: &[u8]) -> i64;
}

/// The real host: files from the filesystem, output to stdout.
pub struct SysHost {
    files: FxHashMap<i64, File>,
    next_fd: i64,
}

impl SysHost {
    /// Creates a host with no open files. Descriptors start at 3,
    /// leaving the conventional stdio numbers unused.
    pub fn new() -> Self {
        Self {
            files: FxHashMap::default(),
            next_fd: 3,
        }
    }
}

impl Default for SysHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for SysHost {
    fn open(&mut self, path: &[u8], _flags: i64) -> i64 {
        let Ok(path) = std::str::from_utf8(path) else {
            return -1;
        };
        match File::open(path) {
            Ok(file) => {
                let fd = self.next_fd;
                self.next_fd += 1;
                self.files.insert(fd, file);
                fd
            }
            Err(_) => -1,
        }
    }

    fn read(&mut self, fd: i64, buf: &mut [u8]) -> i64 {
        match self.files.get_mut(&fd) {
            Some(file) => match file.read(buf) {
                Ok(n) => n as i64,
                Err(_) => -1,
            },
            None => -1,
        }
    }

    fn close(&mut self, fd: i64) -> i64 {
        if self.files.remove(&fd).is_some() {
            0
        } else {
            -1
        }
    }

    fn write(&mut self, bytes: &[u8]) -> i64 {
        let mut stdout = std::io::stdout();
        match stdout.write_all(bytes).and_then(|_| stdout.flush()) {
            Ok(()) => bytes.len() as i64,
            Err(_) => -1,
        }
    }
}

/// A host that records output and serves no files. Used by tests and
/// embedders that want the program's output as data.
#[derive(Debug, Default)]
pub struct CaptureHost {
    output: Vec<u8>,
}

impl CaptureHost {
    /// Creates an empty capture host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the program wrote so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// The output interpreted as UTF-8, lossily.
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Host for CaptureHost {
    fn open(&mut self, _path: &[u8], _flags: i64) -> i64 {
        -1
    }

    fn read(&mut self, _fd: i64, _buf: &mut [u8]) -> i64 {
        -1
    }

    fn close(&mut self, _fd: i64) -> i64 {
        -1
    }

    fn write(&mut self, bytes: &[u8]) -> i64 {
        self.output.extend_from_slice(bytes);
        bytes.len() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_host_records_writes() {
        let mut host = CaptureHost::new();
        assert_eq!(host.write(b"hello "), 6);
        assert_eq!(host.write(b"world"), 5);
        assert_eq!(host.output(), b"hello world");
    }

    #[test]
    fn test_capture_host_has_no_files() {
        let mut host = CaptureHost::new();
        assert!(host.open(b"/etc/hostname", 0) < 0);
        assert!(host.read(3, &mut [0; 4]) < 0);
        assert!(host.close(3) < 0);
    }

    #[test]
    fn test_sys_host_open_missing_file() {
        let mut host = SysHost::new();
        assert!(host.open(b"/definitely/not/a/file", 0) < 0);
        assert!(host.close(99) < 0);
    }

    #[test]
    fn test_sys_host_reads_real_file() {
        use std::io::Write as _;
        let dir = std::env::temp_dir().join("minc-host-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("input.txt");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"abc").unwrap();

        let mut host = SysHost::new();
        let fd = host.open(path.to_str().unwrap().as_bytes(), 0);
        assert!(fd >= 3);
        let mut buf = [0u8; 8];
        assert_eq!(host.read(fd, &mut buf), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(host.close(fd), 0);
    }
}

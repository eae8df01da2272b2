//! Platform shared-memory backend.
//!
//! The teacher lineage this crate is built from used `memfd_create`, which
//! cannot be attached to by name from an unrelated process without explicit
//! file-descriptor passing — its own `attach` path was a stub for exactly
//! this reason. A message bus that only one process can ever open is not a
//! bus, so this module uses named POSIX shared memory (`shm_open`) instead,
//! keeping the same `libc` + raw `mmap` style.

use std::ffi::CString;
use std::io;
use std::ptr::NonNull;

/// Backend abstraction over one mapped shared-memory region.
pub trait SharedMemoryBackend: Send + Sync {
    fn as_ptr(&self) -> *mut u8;
    fn size(&self) -> usize;
}

#[cfg(target_os = "linux")]
pub fn create(path: &str, size: usize) -> io::Result<(Box<dyn SharedMemoryBackend>, bool)> {
    PosixSharedMemory::create(path, size)
        .map(|(shm, created)| (Box::new(shm) as Box<dyn SharedMemoryBackend>, created))
}

#[cfg(target_os = "linux")]
pub fn attach(path: &str) -> io::Result<Box<dyn SharedMemoryBackend>> {
    PosixSharedMemory::attach(path).map(|shm| Box::new(shm) as Box<dyn SharedMemoryBackend>)
}

#[cfg(not(target_os = "linux"))]
pub fn create(_path: &str, _size: usize) -> io::Result<(Box<dyn SharedMemoryBackend>, bool)> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "shared memory is only supported on Linux",
    ))
}

#[cfg(not(target_os = "linux"))]
pub fn attach(_path: &str) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "shared memory is only supported on Linux",
    ))
}

#[cfg(target_os = "linux")]
pub struct PosixSharedMemory {
    ptr: NonNull<u8>,
    size: usize,
    fd: libc::c_int,
}

#[cfg(target_os = "linux")]
unsafe impl Send for PosixSharedMemory {}
#[cfg(target_os = "linux")]
unsafe impl Sync for PosixSharedMemory {}

#[cfg(target_os = "linux")]
impl PosixSharedMemory {
    /// Create the region if it doesn't exist, or open the existing one.
    ///
    /// Returns `(backend, true)` if this call created the object, or
    /// `(backend, false)` if it already existed — the builder uses this to
    /// decide between initializing a fresh layout and returning `Exists`.
    /// The object is never unlinked by this call: per the spec's Open
    /// Questions resolution, pre-existence is success, not a race to clean
    /// up after.
    pub fn create(path: &str, size: usize) -> io::Result<(Self, bool)> {
        let c_path = shm_path(path)?;

        let fd = unsafe {
            libc::shm_open(
                c_path.as_ptr(),
                libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                0o600,
            )
        };

        let (fd, created) = if fd >= 0 {
            (fd, true)
        } else {
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::AlreadyExists {
                return Err(err);
            }
            let fd = unsafe { libc::shm_open(c_path.as_ptr(), libc::O_RDWR, 0o600) };
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            (fd, false)
        };

        let map_size = if created {
            if unsafe { libc::ftruncate(fd, size as libc::off_t) } != 0 {
                let err = io::Error::last_os_error();
                unsafe { libc::close(fd) };
                return Err(err);
            }
            size
        } else {
            actual_size(fd)?
        };

        let shm = Self::map(fd, map_size)?;
        Ok((shm, created))
    }

    /// Attach to an existing named region, mapping its current OS size (not
    /// a caller-supplied one — §4.2: "discovers the object's current size
    /// (authoritative from the OS, not from the caller)").
    pub fn attach(path: &str) -> io::Result<Self> {
        let c_path = shm_path(path)?;
        let fd = unsafe { libc::shm_open(c_path.as_ptr(), libc::O_RDWR, 0o600) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let size = actual_size(fd)?;
        Self::map(fd, size)
    }

    fn map(fd: libc::c_int, size: usize) -> io::Result<Self> {
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            let err = io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(err);
        }
        Ok(Self {
            // Safety: mmap succeeded, so ptr is non-null.
            ptr: unsafe { NonNull::new_unchecked(ptr as *mut u8) },
            size,
            fd,
        })
    }
}

#[cfg(target_os = "linux")]
fn actual_size(fd: libc::c_int) -> io::Result<usize> {
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    if unsafe { libc::fstat(fd, &mut st) } != 0 {
        let err = io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(err);
    }
    Ok(st.st_size as usize)
}

#[cfg(target_os = "linux")]
fn shm_path(path: &str) -> io::Result<CString> {
    CString::new(path)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "shm path contains a NUL byte"))
}

#[cfg(target_os = "linux")]
impl Drop for PosixSharedMemory {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.size);
            libc::close(self.fd);
        }
    }
}

#[cfg(target_os = "linux")]
impl SharedMemoryBackend for PosixSharedMemory {
    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    fn size(&self) -> usize {
        self.size
    }
}

/// Remove the underlying shared-memory object. Out-of-band teardown per
/// §4.6: "external tooling removes the underlying shared-memory object."
#[cfg(target_os = "linux")]
pub fn unlink(path: &str) -> io::Result<()> {
    let c_path = shm_path(path)?;
    if unsafe { libc::shm_unlink(c_path.as_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn unlink(_path: &str) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "shared memory is only supported on Linux",
    ))
}

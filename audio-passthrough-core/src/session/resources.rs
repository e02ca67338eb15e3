use std::fs::File;

use memmap2::{MmapMut, MmapOptions};

use crate::models::error::PassthroughError;
use crate::models::stream_types::MmapDescriptor;

/// Fixed-capacity staging buffer held while a stream is started or paused.
#[derive(Debug)]
pub(crate) struct FrameBuffer {
    data: Vec<u8>,
}

impl FrameBuffer {
    pub(crate) fn allocate(capacity: usize) -> Result<Self, PassthroughError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity).map_err(|e| {
            PassthroughError::ResourceExhausted(format!(
                "frame buffer of {} bytes: {}",
                capacity, e
            ))
        })?;
        data.resize(capacity, 0);
        Ok(Self { data })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Copy `frames` into the front of the buffer and return the staged slice.
    pub(crate) fn stage(&mut self, frames: &[u8]) -> Result<&[u8], PassthroughError> {
        if frames.len() > self.data.len() {
            return Err(PassthroughError::Internal(format!(
                "{} bytes exceed the {} byte frame buffer",
                frames.len(),
                self.data.len()
            )));
        }
        let staged = &mut self.data[..frames.len()];
        staged.copy_from_slice(frames);
        Ok(staged)
    }

    /// Store device data and return the stored slice.
    pub(crate) fn receive(&mut self, data: &[u8]) -> Result<&[u8], PassthroughError> {
        self.stage(data)
    }
}

/// A region of the caller's backing file mapped for the driver.
pub(crate) struct MmapRegion {
    map: MmapMut,
    descriptor: MmapDescriptor,
}

impl MmapRegion {
    /// Map `len` bytes at `offset`. Shared mappings write through to the
    /// file; private ones are copy-on-write.
    pub(crate) fn map(
        file: &File,
        len: usize,
        offset: u64,
        shareable: bool,
        total_buffer_frames: u64,
        transfer_frame_size: u32,
    ) -> Result<Self, PassthroughError> {
        let file_len = file
            .metadata()
            .map_err(|e| PassthroughError::InvalidParam(format!("backing file: {}", e)))?
            .len();
        let end = offset
            .checked_add(len as u64)
            .ok_or_else(|| PassthroughError::InvalidParam("mmap range overflows".into()))?;
        if end > file_len {
            return Err(PassthroughError::InvalidParam(format!(
                "{} bytes at offset {} exceed the {} byte backing region",
                len, offset, file_len
            )));
        }

        let mut options = MmapOptions::new();
        options.offset(offset).len(len);
        // SAFETY: the caller owns the backing file for the lifetime of the
        // stream; concurrent truncation by another process is out of our control.
        let map = unsafe {
            if shareable {
                options.map_mut(file)
            } else {
                options.map_copy(file)
            }
        }
        .map_err(|e| PassthroughError::ResourceExhausted(format!("mmap failed: {}", e)))?;

        Ok(Self {
            map,
            descriptor: MmapDescriptor {
                len,
                total_buffer_frames,
                transfer_frame_size,
                is_shareable: shareable,
                offset,
            },
        })
    }

    pub(crate) fn descriptor(&self) -> MmapDescriptor {
        self.descriptor
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.map
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn backing_file(name: &str, len: usize) -> (std::path::PathBuf, File) {
        let path = std::env::temp_dir().join(format!("{}_{}", name, uuid::Uuid::new_v4()));
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        file.write_all(&vec![0x11; len]).unwrap();
        (path, file)
    }

    #[test]
    fn frame_buffer_rejects_oversized_request() {
        let mut buffer = FrameBuffer::allocate(16).unwrap();
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(buffer.stage(&[1, 2, 3]).unwrap(), &[1, 2, 3]);
        assert!(matches!(
            buffer.stage(&[0; 17]),
            Err(PassthroughError::Internal(_))
        ));
    }

    #[test]
    fn shared_mapping_writes_through() {
        let (path, file) = backing_file("shared_map", 4096);
        {
            let mut region = MmapRegion::map(&file, 1024, 0, true, 256, 4).unwrap();
            assert_eq!(region.descriptor().len, 1024);
            assert_eq!(region.as_slice()[0], 0x11);
            region.as_mut_slice()[0] = 0x7f;
        }
        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents[0], 0x7f);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn private_mapping_leaves_file_untouched() {
        let (path, file) = backing_file("private_map", 4096);
        {
            let mut region = MmapRegion::map(&file, 4096, 0, false, 1024, 4).unwrap();
            region.as_mut_slice()[10] = 0x22;
            assert!(!region.descriptor().is_shareable);
        }
        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents[10], 0x11);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn request_beyond_file_is_rejected() {
        let (path, file) = backing_file("short_map", 512);
        let err = MmapRegion::map(&file, 1024, 0, true, 256, 4).err().unwrap();
        assert!(matches!(err, PassthroughError::InvalidParam(_)));
        std::fs::remove_file(&path).ok();
    }
}

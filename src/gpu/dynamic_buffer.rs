//! Growable GPU vertex buffers
//!
//! Per-frame geometry (scene triangles, overlay lines, points) is rebuilt on
//! the CPU every redraw and streamed into buffers that only reallocate when
//! the data outgrows them.

use std::marker::PhantomData;
use std::ops::Range;

/// Smallest allocation, and the minimum growth step.
const MIN_CAPACITY: u64 = 1024;

/// A GPU buffer that grows (never shrinks) to fit what is uploaded.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    label: String,
    usage: wgpu::BufferUsages,
    capacity: u64,
    len: u64,
}

impl DynamicBuffer {
    /// Buffer of at least `capacity` bytes.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        capacity: u64,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let capacity = padded(capacity.max(MIN_CAPACITY));
        Self {
            buffer: allocate(device, label, capacity, usage),
            label: label.to_owned(),
            usage,
            capacity,
            len: 0,
        }
    }

    /// Replace the contents with `bytes`, reallocating at double the needed
    /// size when they do not fit. Returns `true` if the buffer was
    /// reallocated (bind groups referencing it are then stale).
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
    ) -> bool {
        let needed = bytes.len() as u64;
        let grown = needed > self.capacity;
        if grown {
            let capacity = padded((needed * 2).max(self.capacity + MIN_CAPACITY));
            log::debug!("{}: {} -> {capacity} bytes", self.label, self.capacity);
            self.buffer = allocate(device, &self.label, capacity, self.usage);
            self.capacity = capacity;
        }

        // write_buffer wants a multiple of COPY_BUFFER_ALIGNMENT
        let aligned = padded(needed);
        if aligned == needed {
            queue.write_buffer(&self.buffer, 0, bytes);
        } else if needed > 0 {
            let mut staged = bytes.to_vec();
            staged.resize(aligned as usize, 0);
            queue.write_buffer(&self.buffer, 0, &staged);
        }
        self.len = needed;
        grown
    }

    /// The underlying wgpu buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// The bytes written by the last upload, or `None` if it was empty.
    #[must_use]
    pub fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        (self.len > 0).then(|| self.buffer.slice(..self.len))
    }

    /// Bytes written by the last upload.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the last upload was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size in bytes.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

fn allocate(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    })
}

fn padded(bytes: u64) -> u64 {
    bytes.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
}

/// [`DynamicBuffer`] of `T` vertices or instances.
pub struct TypedBuffer<T> {
    inner: DynamicBuffer,
    count: u32,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> TypedBuffer<T> {
    /// Room for `capacity` items before the first reallocation.
    #[must_use]
    pub fn with_capacity(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let bytes = (size_of::<T>() * capacity) as u64;
        Self {
            inner: DynamicBuffer::new(device, label, bytes, usage),
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Replace the contents with `items`. Returns `true` on reallocation.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        items: &[T],
    ) -> bool {
        self.count = items.len() as u32;
        self.inner.upload(device, queue, bytemuck::cast_slice(items))
    }

    /// The underlying wgpu buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.inner.buffer()
    }

    /// The written items, or `None` if there is nothing to draw.
    #[must_use]
    pub fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        self.inner.slice()
    }

    /// Items written by the last `write`.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// `0..count`, for draw calls.
    #[must_use]
    pub fn range(&self) -> Range<u32> {
        0..self.count
    }

    /// Whether the last `write` was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Byte budgets for one frame of transient geometry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransientPoolConfig {
    pub vertex_bytes: u32,
    pub index_bytes: u32,
}

impl Default for TransientPoolConfig {
    fn default() -> Self {
        Self {
            vertex_bytes: 6 << 20,
            index_bytes: 2 << 20,
        }
    }
}

/// Allocations start on 4-byte boundaries so they can be bound as buffer
/// slices and uploaded with `Queue::write_buffer`.
const ALIGN: u32 = 4;

#[inline]
fn align_up(v: u32) -> u32 {
    (v + ALIGN - 1) & !(ALIGN - 1)
}

/// Bump allocator over a CPU staging buffer, reset every frame.
#[derive(Debug)]
struct Arena {
    data: Vec<u8>,
    used: u32,
    budget: u32,
}

impl Arena {
    fn new(budget: u32) -> Self {
        Self { data: Vec::new(), used: 0, budget }
    }

    fn remaining(&self) -> u32 {
        self.budget.saturating_sub(align_up(self.used))
    }

    fn alloc(&mut self, size: u32) -> Option<u32> {
        let start = align_up(self.used);
        let end = start.checked_add(size)?;
        if end > self.budget {
            return None;
        }
        let padded = align_up(end) as usize;
        if self.data.len() < padded {
            self.data.resize(padded, 0);
        }
        self.used = end;
        Some(start)
    }

    fn bytes_mut(&mut self, offset: u32, size: u32) -> &mut [u8] {
        let (start, end) = (offset as usize, (offset + size) as usize);
        match self.data.get_mut(start..end) {
            Some(s) => s,
            None => &mut [],
        }
    }

    /// Used bytes rounded up to the alignment.
    fn staged(&self) -> &[u8] {
        &self.data[..align_up(self.used) as usize]
    }

    fn reset(&mut self) {
        self.used = 0;
    }
}

/// Per-frame vertex and index staging for transient buffers.
#[derive(Debug)]
pub struct TransientPool {
    vertex: Arena,
    index: Arena,
}

impl TransientPool {
    pub fn new(config: TransientPoolConfig) -> Self {
        Self {
            vertex: Arena::new(config.vertex_bytes),
            index: Arena::new(config.index_bytes),
        }
    }

    pub fn avail_vertices(&self, num: u32, stride: u32) -> u32 {
        if stride == 0 {
            return 0;
        }
        num.min(self.vertex.remaining() / stride)
    }

    pub fn avail_indices(&self, num: u32) -> u32 {
        num.min(self.index.remaining() / 2)
    }

    /// Returns `(offset, size)` in bytes.
    pub fn alloc_vertices(&mut self, num: u32, stride: u32) -> Option<(u32, u32)> {
        let size = num.checked_mul(stride)?;
        self.vertex.alloc(size).map(|off| (off, size))
    }

    pub fn alloc_indices(&mut self, num: u32) -> Option<(u32, u32)> {
        let size = num.checked_mul(2)?;
        self.index.alloc(size).map(|off| (off, size))
    }

    pub fn vertex_bytes_mut(&mut self, offset: u32, size: u32) -> &mut [u8] {
        self.vertex.bytes_mut(offset, size)
    }

    pub fn index_bytes_mut(&mut self, offset: u32, size: u32) -> &mut [u8] {
        self.index.bytes_mut(offset, size)
    }

    pub fn staged_vertices(&self) -> &[u8] {
        self.vertex.staged()
    }

    pub fn staged_indices(&self) -> &[u8] {
        self.index.staged()
    }

    pub fn vertex_used(&self) -> u32 {
        self.vertex.used
    }

    pub fn index_used(&self) -> u32 {
        self.index.used
    }

    pub fn reset(&mut self) {
        self.vertex.reset();
        self.index.reset();
    }
}

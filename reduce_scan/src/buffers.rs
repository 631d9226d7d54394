use crate::device::Device;
use crate::error::{Error, Result};
use crate::work_size::level_sizes;
use tracing::debug;

/// Where a variant expects its input and leaves its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Ping,
    Level(usize),
}

/// Every device buffer a task needs, plus the host side mirrors.
///
/// Ping and pong change roles by swapping the owned handles; nothing is ever
/// copied between them. The level sequence is only allocated for scans and
/// keeps its length for the lifetime of the set.
pub struct BufferSet<B> {
    input: Vec<u32>,
    output: Vec<u32>,
    ping: B,
    pong: B,
    levels: Vec<B>,
    min_group_size: Option<usize>,
}

impl<B> BufferSet<B> {
    /// Ping and pong buffers sized to `input`.
    pub fn for_reduction<D>(device: &mut D, input: Vec<u32>) -> Result<Self>
    where
        D: Device<Buffer = B>,
    {
        if input.is_empty() || u32::try_from(input.len()).is_err() {
            return Err(Error::InvalidConfig(format!(
                "problem size {} is outside 1..={}",
                input.len(),
                u32::MAX
            )));
        }
        let ping = device.alloc(input.len())?;
        let pong = device.alloc(input.len())?;
        Ok(Self {
            output: vec![0; input.len()],
            input,
            ping,
            pong,
            levels: Vec::new(),
            min_group_size: None,
        })
    }

    /// Ping and pong plus the shrinking level sequence of the work-efficient
    /// scan.
    pub fn for_scan<D>(device: &mut D, input: Vec<u32>, min_group_size: usize) -> Result<Self>
    where
        D: Device<Buffer = B>,
    {
        let mut set = Self::for_reduction(device, input)?;
        let sizes = level_sizes(set.len(), min_group_size);
        debug!(?sizes, "allocating level buffers");
        set.levels = sizes
            .into_iter()
            .map(|len| device.alloc(len))
            .collect::<Result<_>>()?;
        set.min_group_size = Some(min_group_size);
        Ok(set)
    }

    /// Problem size.
    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn ping(&self) -> &B {
        &self.ping
    }

    pub fn pong(&self) -> &B {
        &self.pong
    }

    /// Exchanges the roles of ping and pong.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.ping, &mut self.pong);
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, i: usize) -> &B {
        &self.levels[i]
    }

    pub fn levels(&self) -> &[B] {
        &self.levels
    }

    /// Group size the level sequence was laid out for, if there is one.
    pub fn min_group_size(&self) -> Option<usize> {
        self.min_group_size
    }

    pub fn slot(&self, slot: Slot) -> &B {
        match slot {
            Slot::Ping => &self.ping,
            Slot::Level(i) => &self.levels[i],
        }
    }

    /// Reads the first `len` elements of `slot` into the output mirror.
    pub fn read_back<D>(&mut self, device: &mut D, slot: Slot, len: usize) -> Result<&[u32]>
    where
        D: Device<Buffer = B>,
    {
        let src = match slot {
            Slot::Ping => &self.ping,
            Slot::Level(i) => &self.levels[i],
        };
        device.read(src, &mut self.output[..len])?;
        Ok(&self.output[..len])
    }

    /// Enqueues a write of the input into `slot`.
    pub fn upload<D>(&self, device: &mut D, slot: Slot) -> Result<()>
    where
        D: Device<Buffer = B>,
    {
        device.write(self.slot(slot), &self.input)
    }
}

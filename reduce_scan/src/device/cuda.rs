//! Executes the kernels of a PTX module on a CUDA device.
//!
//! Every launch goes to one stream created with default flags, so the
//! synchronous copies of `write` and `read` are ordered after everything
//! already queued on it.

use super::{check_signature, Device, DeviceMemory, KernelArg};
use crate::error::{Error, Result};
use crate::work_size::WorkSize;
use cust::context::Context;
use cust::prelude::*;
use kernel_abi::Kernel;
use std::collections::BTreeSet;
use tracing::debug;

pub struct CudaBuffer(DeviceBuffer<u32>);

impl DeviceMemory for CudaBuffer {
    fn len(&self) -> usize {
        self.0.len()
    }
}

pub struct CudaDevice {
    name: String,
    module: Module,
    stream: Stream,
    loaded: BTreeSet<Kernel>,
    // Dropped last.
    _context: Context,
}

impl CudaDevice {
    /// Initialises the first CUDA device and loads `ptx`.
    pub fn new(ptx: &str) -> Result<Self> {
        let context = cust::quick_init()?;
        let name = cust::device::Device::get_device(0)?.name()?;
        let module = Module::from_ptx(ptx, &[])?;
        let stream = Stream::new(StreamFlags::DEFAULT, None)?;
        debug!(device = %name, "cuda device ready");
        Ok(Self {
            name,
            module,
            stream,
            loaded: BTreeSet::new(),
            _context: context,
        })
    }
}

impl Device for CudaDevice {
    type Buffer = CudaBuffer;

    fn name(&self) -> &str {
        &self.name
    }

    fn alloc(&mut self, len: usize) -> Result<CudaBuffer> {
        DeviceBuffer::from_slice(&vec![0u32; len])
            .map(CudaBuffer)
            .map_err(|e| Error::Allocation {
                len,
                reason: e.to_string(),
            })
    }

    fn load_kernels(&mut self, kernels: &[Kernel]) -> Result<()> {
        for &kernel in kernels {
            self.module
                .get_function(kernel.entry_point())
                .map_err(|e| Error::KernelCreation {
                    kernel: kernel.entry_point(),
                    reason: e.to_string(),
                })?;
            self.loaded.insert(kernel);
        }
        Ok(())
    }

    /// Blocking on CUDA. Only whole-buffer writes are supported.
    fn write(&mut self, dst: &CudaBuffer, src: &[u32]) -> Result<()> {
        if src.len() != dst.len() {
            return Err(Error::Transfer(format!(
                "cannot write {} elements into a device buffer of {}",
                src.len(),
                dst.len()
            )));
        }
        dst.0
            .copy_from(src)
            .map_err(|e| Error::Transfer(e.to_string()))
    }

    fn read(&mut self, src: &CudaBuffer, dst: &mut [u32]) -> Result<()> {
        if dst.len() > src.len() {
            return Err(Error::Transfer(format!(
                "cannot read {} elements from a device buffer of {}",
                dst.len(),
                src.len()
            )));
        }
        src.0
            .index(..dst.len())
            .copy_to(dst)
            .map_err(|e| Error::Transfer(e.to_string()))
    }

    fn launch(
        &mut self,
        kernel: Kernel,
        work: WorkSize,
        args: &[KernelArg<'_, CudaBuffer>],
    ) -> Result<()> {
        if !self.loaded.contains(&kernel) {
            return Err(Error::launch(kernel, "kernel has not been loaded"));
        }
        check_signature(kernel, args)?;

        let function = self
            .module
            .get_function(kernel.entry_point())
            .map_err(|e| Error::launch(kernel, e.to_string()))?;
        let stream = &self.stream;
        let grid = work.groups() as u32;
        let block = work.local as u32;

        // Buffers go over as (pointer, length) pairs. Scratch becomes
        // dynamic shared memory.
        let launched = unsafe {
            match args {
                [KernelArg::Buffer(a), KernelArg::Scalar(stride)] => launch!(
                    function<<<grid, block, 0, stream>>>(
                        a.0.as_device_ptr(),
                        a.0.len(),
                        *stride
                    )
                ),
                [KernelArg::Buffer(a), KernelArg::Buffer(b), KernelArg::Scalar(count), KernelArg::Local(scratch)] => {
                    let shared = shared_bytes(*scratch);
                    launch!(
                        function<<<grid, block, shared, stream>>>(
                            a.0.as_device_ptr(),
                            a.0.len(),
                            b.0.as_device_ptr(),
                            b.0.len(),
                            *count
                        )
                    )
                }
                [KernelArg::Buffer(a), KernelArg::Buffer(b), KernelArg::Scalar(count), KernelArg::Scalar(offset)] => {
                    launch!(
                        function<<<grid, block, 0, stream>>>(
                            a.0.as_device_ptr(),
                            a.0.len(),
                            b.0.as_device_ptr(),
                            b.0.len(),
                            *count,
                            *offset
                        )
                    )
                }
                [KernelArg::Buffer(a), KernelArg::Buffer(b), KernelArg::Local(scratch)] => {
                    let shared = shared_bytes(*scratch);
                    launch!(
                        function<<<grid, block, shared, stream>>>(
                            a.0.as_device_ptr(),
                            a.0.len(),
                            b.0.as_device_ptr(),
                            b.0.len()
                        )
                    )
                }
                _ => return Err(Error::launch(kernel, "unsupported argument list")),
            }
        };
        launched.map_err(|e| Error::launch(kernel, e.to_string()))
    }

    fn finish(&mut self) -> Result<()> {
        self.stream
            .synchronize()
            .map_err(|e| Error::Sync(e.to_string()))
    }
}

fn shared_bytes(elements: usize) -> u32 {
    (elements * std::mem::size_of::<u32>()) as u32
}

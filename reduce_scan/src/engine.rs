use crate::buffers::BufferSet;
use crate::device::Device;
use crate::error::Result;
use crate::variant::Variant;
use std::fmt;

/// A family of algorithms that the harnesses drive variant by variant.
pub trait Engine<D: Device> {
    type Variant: Variant;
    type Output: PartialEq + fmt::Debug;

    /// Enqueues every pass of one run. Does not wait for the device.
    fn run(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        variant: Self::Variant,
    ) -> Result<()>;

    /// Blocking read of the result a finished run left behind.
    fn read_result(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        variant: Self::Variant,
    ) -> Result<Self::Output>;
}

//! Per-instance transform buffers.
//!
//! CPU-morphed groups write a full transform array every frame and then flag
//! it for upload once. The renderer owns the GPU copy and re-uploads only
//! when the flag is set.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Destination for one group's per-frame instance transforms.
pub trait InstanceSink {
    /// Number of slots.
    fn len(&self) -> usize;

    /// True if there are no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite slot `index`. Out-of-range writes are ignored.
    fn set_transform(&mut self, index: usize, transform: Mat4);

    /// Signal that the frame's writes are complete and need uploading.
    fn mark_dirty(&mut self);
}

/// GPU layout of one instance: a column-major model matrix.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl From<Mat4> for InstanceRaw {
    fn from(m: Mat4) -> Self {
        Self {
            model: m.to_cols_array_2d(),
        }
    }
}

/// CPU-side instance buffer with a batched dirty flag.
#[derive(Debug, Clone)]
pub struct InstanceBuffer {
    instances: Vec<InstanceRaw>,
    needs_update: bool,
    /// How many times the buffer was flagged, for upload accounting.
    dirty_marks: u64,
}

impl InstanceBuffer {
    /// Buffer of `count` identity transforms.
    pub fn new(count: usize) -> Self {
        Self {
            instances: vec![InstanceRaw::from(Mat4::IDENTITY); count],
            needs_update: false,
            dirty_marks: 0,
        }
    }

    /// Transform in slot `index`.
    pub fn get(&self, index: usize) -> Option<Mat4> {
        self.instances
            .get(index)
            .map(|raw| Mat4::from_cols_array_2d(&raw.model))
    }

    /// GPU-ready view of all slots.
    pub fn raw(&self) -> &[InstanceRaw] {
        &self.instances
    }

    /// True if writes are pending upload.
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Clear the pending flag, returning whether it was set.
    ///
    /// The renderer calls this once per frame and uploads on `true`.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    /// Total number of [`mark_dirty`](InstanceSink::mark_dirty) calls.
    pub fn dirty_marks(&self) -> u64 {
        self.dirty_marks
    }
}

impl InstanceSink for InstanceBuffer {
    fn len(&self) -> usize {
        self.instances.len()
    }

    fn set_transform(&mut self, index: usize, transform: Mat4) {
        if let Some(slot) = self.instances.get_mut(index) {
            *slot = transform.into();
        }
    }

    fn mark_dirty(&mut self) {
        self.needs_update = true;
        self.dirty_marks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_instance_raw_layout() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 64);
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let raw = InstanceRaw::from(m);
        assert_eq!(raw.model[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_set_and_get() {
        let mut buf = InstanceBuffer::new(2);
        let m = Mat4::from_scale(Vec3::splat(0.5));
        buf.set_transform(1, m);
        assert_eq!(buf.get(1), Some(m));
        assert_eq!(buf.get(0), Some(Mat4::IDENTITY));
        assert_eq!(buf.get(2), None);
        // Out of range is ignored
        buf.set_transform(5, m);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_dirty_flag_is_taken_once() {
        let mut buf = InstanceBuffer::new(1);
        assert!(!buf.take_dirty());
        buf.mark_dirty();
        assert!(buf.needs_update());
        assert!(buf.take_dirty());
        assert!(!buf.take_dirty());
        assert_eq!(buf.dirty_marks(), 1);
    }
}

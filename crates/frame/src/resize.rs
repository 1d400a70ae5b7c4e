use crate::target::{BackingBuffer, ProjectionCamera};
use cubeview_common::Extent;

/// Make the backing buffer follow the drawable size.
///
/// Returns true if the sizes differed and the buffer was reallocated. Equal
/// sizes are left alone so the buffer is not churned every frame.
pub fn resize_to_display_size<T: BackingBuffer + ?Sized>(target: &mut T) -> bool {
    let drawable = target.drawable_size();
    let backing = target.backing_size();
    if drawable == backing {
        return false;
    }
    tracing::debug!(%backing, %drawable, "backing buffer follows drawable size");
    target.set_backing_size(drawable);
    true
}

/// Apply an explicit viewport resize notification right away.
pub fn apply_viewport_resize<C, T>(size: Extent, camera: &mut C, target: &mut T)
where
    C: ProjectionCamera + ?Sized,
    T: BackingBuffer + ?Sized,
{
    camera.set_aspect(size.aspect_ratio());
    camera.update_projection_matrix();
    target.set_backing_size(size);
}

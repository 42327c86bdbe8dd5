//! Image source port for collecting the images of one incident.

use crate::domain::ImageInput;

/// Port for supplying an incident's images.
pub trait ImageSource: Send + Sync {
    /// Returns the incident's images in submission order.
    fn images(&self) -> Vec<ImageInput>;

    /// Returns the total number of images, if known without collecting them.
    fn count_hint(&self) -> Option<usize>;
}

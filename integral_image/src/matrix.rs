use std::ops::Index;
use std::slice::ChunksExactMut;

use crate::Error;

/// A single-channel, row-major plane of `f64` values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channel {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Channel {
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, Error> {
        let expected = rows.checked_mul(cols).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        let len = rows.checked_mul(cols).expect("channel size overflow");
        Self {
            rows,
            cols,
            data: vec![0.0; len],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row index out of bounds");
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Mutable row slices, top to bottom. Only valid on a non-empty channel.
    pub(crate) fn rows_mut(&mut self) -> ChunksExactMut<'_, f64> {
        assert!(self.cols > 0, "rows_mut on a channel without columns");
        self.data.chunks_exact_mut(self.cols)
    }
}

impl Index<(usize, usize)> for Channel {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "channel index out of bounds"
        );
        &self.data[row * self.cols + col]
    }
}

/// A multi-channel image with interleaved samples: for each pixel in
/// row-major order, `channels` consecutive values.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    rows: usize,
    cols: usize,
    channels: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(rows: usize, cols: usize, channels: usize, data: Vec<T>) -> Result<Self, Error> {
        if channels == 0 {
            return Err(Error::InvalidChannelCount);
        }

        let expected = rows
            .checked_mul(cols)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(Error::SizeMismatch {
                expected: usize::MAX,
                actual: data.len(),
            })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            rows,
            cols,
            channels,
            data,
        })
    }

    /// A 0x0 single-channel image.
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            channels: 1,
            data: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: Copy> Image<T> {
    pub fn new_fill(rows: usize, cols: usize, channels: usize, value: T) -> Self {
        assert!(channels > 0, "image needs at least one channel");
        let len = rows
            .checked_mul(cols)
            .and_then(|v| v.checked_mul(channels))
            .expect("image size overflow");
        Self {
            rows,
            cols,
            channels,
            data: vec![value; len],
        }
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<T> {
        if row >= self.rows || col >= self.cols || channel >= self.channels {
            return None;
        }
        let idx = (row * self.cols + col) * self.channels + channel;
        self.data.get(idx).copied()
    }
}

impl<T: Copy + Into<f64>> Image<T> {
    /// Widens every sample to `f64`, keeping rows, columns and channels.
    pub fn to_f64(&self) -> Image<f64> {
        Image {
            rows: self.rows,
            cols: self.cols,
            channels: self.channels,
            data: self.data.iter().map(|&v| v.into()).collect(),
        }
    }
}

impl Image<f64> {
    /// De-interleaves the image into one `Channel` per channel index.
    pub fn split(&self) -> Vec<Channel> {
        let len = self.rows * self.cols;
        let mut planes: Vec<Vec<f64>> = (0..self.channels)
            .map(|_| Vec::with_capacity(len))
            .collect();
        for pixel in self.data.chunks_exact(self.channels) {
            for (plane, &v) in planes.iter_mut().zip(pixel) {
                plane.push(v);
            }
        }

        planes
            .into_iter()
            .map(|data| Channel {
                rows: self.rows,
                cols: self.cols,
                data,
            })
            .collect()
    }

    /// Interleaves `channels` back into one image, in the order given.
    pub fn merge(channels: &[Channel]) -> Result<Self, Error> {
        let first = channels.first().ok_or(Error::InvalidChannelCount)?;
        let shape = first.shape();
        if let Some(bad) = channels.iter().find(|c| c.shape() != shape) {
            return Err(Error::ShapeMismatch {
                expected: shape,
                actual: bad.shape(),
            });
        }

        let len = shape.0 * shape.1;
        let mut data = Vec::with_capacity(len * channels.len());
        for idx in 0..len {
            data.extend(channels.iter().map(|c| c.data[idx]));
        }

        Ok(Self {
            rows: shape.0,
            cols: shape.1,
            channels: channels.len(),
            data,
        })
    }
}

impl<T> Default for Image<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Channel, Image};
    use crate::Error;

    #[test]
    fn channel_indexing() {
        let ch = Channel::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid channel");

        assert_eq!(ch.shape(), (2, 3));
        assert_eq!(ch.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(ch[(0, 2)], 3.0);
        assert_eq!(ch.get(1, 0), Some(4.0));
        assert_eq!(ch.get(2, 0), None);
        assert_eq!(ch.get(0, 3), None);
    }

    #[test]
    fn channel_rejects_wrong_length() {
        let err = Channel::from_vec(2, 2, vec![1.0; 3]).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn image_rejects_zero_channels() {
        let err = Image::<u8>::from_vec(1, 1, 0, vec![]).unwrap_err();
        assert_eq!(err, Error::InvalidChannelCount);
    }

    #[test]
    fn split_then_merge_preserves_channel_order() {
        let img = Image::from_vec(
            1,
            2,
            3,
            vec![1.0, 10.0, 100.0, 2.0, 20.0, 200.0],
        )
        .expect("valid image");

        let planes = img.split();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].data(), &[1.0, 2.0]);
        assert_eq!(planes[1].data(), &[10.0, 20.0]);
        assert_eq!(planes[2].data(), &[100.0, 200.0]);

        let merged = Image::merge(&planes).expect("same shapes");
        assert_eq!(merged, img);
    }

    #[test]
    fn merge_rejects_mismatched_planes() {
        let a = Channel::zeros(2, 2);
        let b = Channel::zeros(2, 3);
        let err = Image::merge(&[a, b]).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: (2, 2),
                actual: (2, 3)
            }
        );
    }

    #[test]
    fn to_f64_keeps_extents() {
        let img = Image::from_vec(3, 2, 1, vec![0i32, 1, 2, 3, 4, 5]).expect("valid image");
        let wide = img.to_f64();

        assert_eq!(wide.shape(), (3, 2));
        assert_eq!(wide.channels(), 1);
        assert_eq!(wide.data(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(wide.get(2, 1, 0), Some(5.0));
    }

    #[test]
    fn empty_image() {
        let img = Image::<u8>::empty();
        assert!(img.is_empty());
        assert_eq!(img.shape(), (0, 0));
        assert_eq!(img.to_f64().split().len(), 1);
    }
}

//! Two-phase parallel prefix sums.
//!
//! A channel is integrated first along every row and then along every
//! column. Each phase walks its indices in blocks of at most `threads`
//! entries; a block spawns one scoped thread per row (or column) and the end
//! of the scope joins them all before the next block starts. Rows and columns
//! handed to the threads of a block are disjoint borrows of the target, so no
//! cell is ever shared between two threads.

use std::ops::Range;
use std::thread;

use log::{debug, info, trace};

use crate::{Channel, Error, Image};

/// Index ranges processed by one block each: `[k*threads, min((k+1)*threads, total))`.
pub fn block_ranges(total: usize, threads: usize) -> impl Iterator<Item = Range<usize>> {
    let step = threads.max(1);
    (0..total)
        .step_by(step)
        .map(move |start| start..(start + step).min(total))
}

/// Running sum of one row, left to right.
///
/// With `first_write` the row is first copied from `source`; otherwise the
/// values already in `target_row` are accumulated.
pub fn integrate_row(source: &Channel, row: usize, target_row: &mut [f64], first_write: bool) {
    if first_write {
        target_row.copy_from_slice(source.row(row));
    }
    for j in 1..target_row.len() {
        target_row[j] += target_row[j - 1];
    }
}

/// Running sum of one column, top to bottom. `target_column` holds the
/// cells of column `col`, one per row.
pub fn integrate_column(
    source: &Channel,
    col: usize,
    target_column: &mut [&mut f64],
    first_write: bool,
) {
    for i in 0..target_column.len() {
        if first_write {
            *target_column[i] = source[(i, col)];
        }
        if i > 0 {
            let above = *target_column[i - 1];
            *target_column[i] += above;
        }
    }
}

/// Integral image of a single channel, using at most `threads` live threads.
///
/// `target` is reshaped to match `source` if needed. An empty source yields an
/// empty target without spawning anything.
pub fn integrate_channel(
    source: &Channel,
    target: &mut Channel,
    threads: usize,
) -> Result<(), Error> {
    if source.is_empty() {
        *target = source.clone();
        return Ok(());
    }
    if threads == 0 {
        return Err(Error::ZeroThreads);
    }
    if target.shape() != source.shape() {
        *target = Channel::zeros(source.rows(), source.cols());
    }

    let (rows, cols) = source.shape();
    debug!("integrating {rows}x{cols} channel with {threads} thread(s)");

    for block in block_ranges(rows, threads) {
        trace!("row block {block:?}");
        let target_rows = target.rows_mut().skip(block.start).take(block.len());
        thread::scope(|s| {
            for (row, target_row) in block.zip(target_rows) {
                s.spawn(move || integrate_row(source, row, target_row, true));
            }
        });
    }

    for block in block_ranges(cols, threads) {
        trace!("column block {block:?}");
        let mut columns: Vec<Vec<&mut f64>> =
            block.clone().map(|_| Vec::with_capacity(rows)).collect();
        for target_row in target.rows_mut() {
            for (column, cell) in columns.iter_mut().zip(&mut target_row[block.clone()]) {
                column.push(cell);
            }
        }
        thread::scope(|s| {
            for (col, mut column) in block.zip(columns) {
                s.spawn(move || integrate_column(source, col, &mut column, false));
            }
        });
    }

    Ok(())
}

/// Drives [`integrate_channel`] over every channel of a multi-channel image.
///
/// Both handles must be set before [`ImageIntegrator::integrate_image`] runs.
pub struct ImageIntegrator<'a, T> {
    image: Option<&'a Image<T>>,
    target: Option<&'a mut Image<f64>>,
}

impl<'a, T> ImageIntegrator<'a, T> {
    pub fn new() -> Self {
        Self {
            image: None,
            target: None,
        }
    }

    pub fn with_image(image: &'a Image<T>) -> Self {
        Self {
            image: Some(image),
            target: None,
        }
    }

    pub fn set_image(&mut self, image: &'a Image<T>) {
        self.image = Some(image);
    }

    pub fn set_target(&mut self, target: &'a mut Image<f64>) {
        self.target = Some(target);
    }
}

impl<T: Copy + Into<f64>> ImageIntegrator<'_, T> {
    /// Writes the integral of the source image into the target.
    ///
    /// The target takes the source's rows, columns and channel count;
    /// whatever it held before is discarded. Channels are integrated one
    /// after another, each with up to `threads` threads.
    pub fn integrate_image(&mut self, threads: usize) -> Result<(), Error> {
        let image = self.image.ok_or(Error::MissingSource)?;
        let target = self.target.as_deref_mut().ok_or(Error::MissingTarget)?;

        let converted = image.to_f64();
        if converted.is_empty() {
            *target = converted;
            return Ok(());
        }
        if threads == 0 {
            return Err(Error::ZeroThreads);
        }

        info!(
            "integrating {}x{} image, {} channel(s), {} thread(s)",
            converted.rows(),
            converted.cols(),
            converted.channels(),
            threads
        );

        let sources = converted.split();
        *target = converted;
        let mut targets = target.split();
        for (idx, (source, channel)) in sources.iter().zip(targets.iter_mut()).enumerate() {
            debug!("channel {idx}");
            integrate_channel(source, channel, threads)?;
        }
        *target = Image::merge(&targets)?;

        Ok(())
    }
}

impl<T> Default for ImageIntegrator<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

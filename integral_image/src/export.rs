//! Plain-text dumps of integrated images.
//!
//! Every value is written in general notation with six significant digits
//! (see [`General`]) and followed by a single space; each row ends with a
//! newline. The file format writes channels one after another, each block
//! followed by a blank line.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::{Channel, Image};

/// Significant digits written per value.
pub const PRECISION: usize = 6;

/// `%g`-style rendering of an `f64`: [`PRECISION`] significant digits,
/// trailing zeros dropped, scientific notation (`2.55e+06`, `1e-05`) when the
/// decimal exponent is below -4 or at least [`PRECISION`].
#[derive(Debug, Clone, Copy)]
pub struct General(pub f64);

impl fmt::Display for General {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            return f.write_str("nan");
        }
        if v.is_infinite() {
            return f.write_str(if v < 0.0 { "-inf" } else { "inf" });
        }

        // exponent after rounding to PRECISION digits, e.g. "2.55000e6"
        let sci = format!("{:.*e}", PRECISION - 1, v);
        let (mantissa, exp) = sci.split_once('e').ok_or(fmt::Error)?;
        let exp: i32 = exp.parse().map_err(|_| fmt::Error)?;

        if exp < -4 || exp >= PRECISION as i32 {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(
                f,
                "{}e{sign}{:02}",
                strip_trailing_zeros(mantissa),
                exp.unsigned_abs()
            )
        } else {
            let decimals = (PRECISION as i32 - 1 - exp) as usize;
            let fixed = format!("{v:.decimals$}");
            f.write_str(strip_trailing_zeros(&fixed))
        }
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

pub fn write_txt<W: Write>(image: &Image<f64>, mut out: W) -> io::Result<()> {
    let (rows, cols) = image.shape();
    let channels = image.channels();
    for c in 0..channels {
        for i in 0..rows {
            for j in 0..cols {
                let idx = (i * cols + j) * channels + c;
                write!(out, "{} ", General(image.data()[idx]))?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }
    out.flush()
}

pub fn export_txt(image: &Image<f64>, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
    write_txt(image, BufWriter::new(file))
        .with_context(|| format!("unable to write {}", path.display()))
}

/// Single-channel dump without the trailing blank line.
pub fn write_console<W: Write>(channel: &Channel, mut out: W) -> io::Result<()> {
    for i in 0..channel.rows() {
        for &v in channel.row(i) {
            write!(out, "{} ", General(v))?;
        }
        writeln!(out)?;
    }
    out.flush()
}

pub fn export_console(channel: &Channel) -> io::Result<()> {
    write_console(channel, io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::{export_console, write_console, write_txt, General};
    use crate::{integrate_channel, Channel, Image};

    fn general(v: f64) -> String {
        General(v).to_string()
    }

    #[test]
    fn general_matches_six_digit_notation() {
        assert_eq!(general(0.3), "0.3");
        assert_eq!(general(0.1 + 0.2), "0.3");
        assert_eq!(general(2550000.0), "2.55e+06");
        assert_eq!(general(0.00001), "1e-05");
        assert_eq!(general(0.0001), "0.0001");
        assert_eq!(general(123456.0), "123456");
        assert_eq!(general(1234567.0), "1.23457e+06");
        assert_eq!(general(999999.5), "1e+06");
        assert_eq!(general(15.0), "15");
        assert_eq!(general(-2.5), "-2.5");
        assert_eq!(general(0.0), "0");
        assert_eq!(general(1e100), "1e+100");
        assert_eq!(general(-1.5e-7), "-1.5e-07");
        assert_eq!(general(f64::INFINITY), "inf");
        assert_eq!(general(f64::NAN), "nan");
    }

    #[test]
    fn fractional_integral_prints_rounded() {
        let src = Channel::from_vec(2, 3, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).expect("valid");
        let mut dst = Channel::default();
        integrate_channel(&src, &mut dst, 2).expect("integrates");
        let img = Image::merge(&[dst]).expect("one channel");

        let mut out = Vec::new();
        write_txt(&img, &mut out).expect("write to vec");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "0.1 0.3 0.6 \n0.5 1.2 2.1 \n\n"
        );
    }

    #[test]
    fn export_console_writes_to_stdout() {
        let ch = Channel::from_vec(1, 2, vec![1.0, 3.0]).expect("valid channel");
        export_console(&ch).expect("stdout is writable");
    }

    #[test]
    fn txt_separates_channels_with_blank_line() {
        let img = Image::from_vec(2, 2, 2, vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0])
            .expect("valid image");
        let mut out = Vec::new();
        write_txt(&img, &mut out).expect("write to vec");

        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "1 2 \n3 4 \n\n10 20 \n30 40 \n\n");
    }

    #[test]
    fn txt_keeps_fractions() {
        let img = Image::from_vec(1, 3, 1, vec![0.1, 0.5, 2.25]).expect("valid image");
        let mut out = Vec::new();
        write_txt(&img, &mut out).expect("write to vec");

        assert_eq!(String::from_utf8(out).expect("utf8"), "0.1 0.5 2.25 \n\n");
    }

    #[test]
    fn empty_image_writes_one_blank_line_per_channel() {
        let img = Image::<f64>::empty();
        let mut out = Vec::new();
        write_txt(&img, &mut out).expect("write to vec");
        assert_eq!(out, b"\n");
    }

    #[test]
    fn console_has_no_channel_separator() {
        let ch = Channel::from_vec(2, 2, vec![0.0, 1.0, 2.0, 6.0]).expect("valid channel");
        let mut out = Vec::new();
        write_console(&ch, &mut out).expect("write to vec");
        assert_eq!(String::from_utf8(out).expect("utf8"), "0 1 \n2 6 \n");
    }
}

//! Horizontal box mean over `u8` images.
//!
//! For a window of `length` samples, output column `offset + i` of row `y`
//! receives the rounded mean of `src[y][i..i + length]`:
//!
//! ```text
//! dst[y][offset + i] = (Σ src[y][i..i + length] + length / 2) / length
//! ```
//!
//! for `0 <= i <= width - length`. Columns outside that range are left as
//! they were. Both forms use integer arithmetic, so they agree exactly.

use crate::{
    config::{Parallelism, Variant},
    image::Image,
    simd::lanes::I32x8,
};

/// Scalar sliding-window box mean.
pub fn horizontal(src: &Image<u8>, dst: &mut Image<u8>, offset: usize, length: usize) {
    mean_horizontal(src, dst, offset, length, Variant::Scalar, Parallelism::Sequential);
}

/// Box mean with the first window and the per-step deltas computed in lanes.
pub fn horizontal_vector(src: &Image<u8>, dst: &mut Image<u8>, offset: usize, length: usize) {
    mean_horizontal(src, dst, offset, length, Variant::Vector, Parallelism::Sequential);
}

pub(crate) fn mean_horizontal(
    src: &Image<u8>,
    dst: &mut Image<u8>,
    offset: usize,
    length: usize,
    variant: Variant,
    parallelism: Parallelism<'_>,
) {
    if length == 0 || src.width() < length {
        return;
    }

    dst.for_each_row_mut(parallelism, |y, dst_row| {
        let src_row = src.row(y);
        let out = &mut dst_row[offset..];
        match variant {
            Variant::Scalar => mean_row(src_row, out, length),
            Variant::Vector => mean_row_lanes(src_row, out, length),
        }
    });
}

/// Writes the `src.len() - length + 1` window means to the front of `out`.
fn mean_row(src: &[u8], out: &mut [u8], length: usize) {
    let half = (length / 2) as u32;
    let divisor = length as u32;

    let mut total: u32 = src[..length].iter().map(|&s| u32::from(s)).sum();
    out[0] = ((total + half) / divisor) as u8;

    for (i, (&leaving, &entering)) in src.iter().zip(&src[length..]).enumerate() {
        total = total - u32::from(leaving) + u32::from(entering);
        out[i + 1] = ((total + half) / divisor) as u8;
    }
}

fn mean_row_lanes(src: &[u8], out: &mut [u8], length: usize) {
    let half = (length / 2) as i32;
    let divisor = length as i32;

    let mut first = src[..length].chunks_exact(I32x8::LANES);
    let mut acc = I32x8::zeros();
    for chunk in &mut first {
        acc = acc + I32x8::widen_u8(chunk);
    }
    let rest: i32 = first.remainder().iter().map(|&s| i32::from(s)).sum();
    let mut total = acc.reduce_sum() + rest;
    out[0] = ((total + half) / divisor) as u8;

    // step i moves the window from [i, i + length) to [i + 1, i + length + 1)
    let steps = src.len() - length;
    let leaving = &src[..steps];
    let entering = &src[length..];
    let out = &mut out[1..=steps];

    let mut leaving_chunks = leaving.chunks_exact(I32x8::LANES);
    let mut entering_chunks = entering.chunks_exact(I32x8::LANES);
    let mut out_chunks = out.chunks_exact_mut(I32x8::LANES);

    for ((l, e), o) in (&mut leaving_chunks)
        .zip(&mut entering_chunks)
        .zip(&mut out_chunks)
    {
        let delta = I32x8::widen_u8(e) - I32x8::widen_u8(l);
        for (slot, d) in o.iter_mut().zip(delta.0) {
            total += d;
            *slot = ((total + half) / divisor) as u8;
        }
    }

    let tail = leaving_chunks
        .remainder()
        .iter()
        .zip(entering_chunks.remainder());
    for (slot, (&l, &e)) in out_chunks.into_remainder().iter_mut().zip(tail) {
        total += i32::from(e) - i32::from(l);
        *slot = ((total + half) / divisor) as u8;
    }
}

//! Pointwise threshold of `u8` images: `dst = 1` where `src <= threshold`,
//! `0` elsewhere.
//!
//! Samples are unsigned bytes. Vector compare instructions on common targets
//! are signed, so a naive lane compare reads every sample `>= 128` as
//! negative and marks it as below any threshold `< 128`. Two correct vector
//! strategies are provided ([`threshold_vector`] and
//! [`threshold_vector_biased`]) and the naive one is kept as
//! [`threshold_vector_signed`] so the failure can be reproduced.

use crate::{
    config::Parallelism,
    image::Image,
    simd::{lanes::U8x32, Backend},
};

/// Row loop used by [`apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// One comparison per sample.
    Scalar,
    /// Unsigned lane compare.
    Unsigned,
    /// Both operands biased by `0x80`, then a signed lane compare.
    Biased,
    /// Signed lane compare without bias. Wrong for samples `>= 128`.
    Signed,
}

/// Scalar threshold.
pub fn threshold(src: &Image<u8>, dst: &mut Image<u8>, threshold: u8) {
    apply(
        src,
        dst,
        threshold,
        Strategy::Scalar,
        Backend::Portable,
        Parallelism::Sequential,
    );
}

/// Vector threshold using an unsigned lane compare.
pub fn threshold_vector(src: &Image<u8>, dst: &mut Image<u8>, threshold: u8) {
    apply(
        src,
        dst,
        threshold,
        Strategy::Unsigned,
        Backend::detect(),
        Parallelism::Sequential,
    );
}

/// Vector threshold that flips the top bit of samples and threshold before a
/// signed lane compare. Agrees with [`threshold`] for every input.
pub fn threshold_vector_biased(src: &Image<u8>, dst: &mut Image<u8>, threshold: u8) {
    apply(
        src,
        dst,
        threshold,
        Strategy::Biased,
        Backend::detect(),
        Parallelism::Sequential,
    );
}

/// Vector threshold with an unbiased signed lane compare.
///
/// Incorrect for samples `>= 128` whenever the threshold is `< 128` (and the
/// reverse). Do not use it for real work.
pub fn threshold_vector_signed(src: &Image<u8>, dst: &mut Image<u8>, threshold: u8) {
    apply(
        src,
        dst,
        threshold,
        Strategy::Signed,
        Backend::detect(),
        Parallelism::Sequential,
    );
}

pub(crate) fn apply(
    src: &Image<u8>,
    dst: &mut Image<u8>,
    threshold: u8,
    strategy: Strategy,
    backend: Backend,
    parallelism: Parallelism<'_>,
) {
    dst.for_each_row_mut(parallelism, |y, dst_row| {
        let src_row = src.row(y);
        match strategy {
            Strategy::Scalar => threshold_row(src_row, dst_row, threshold),
            _ => threshold_row_vector(src_row, dst_row, threshold, strategy, backend),
        }
    });
}

fn threshold_row(src: &[u8], dst: &mut [u8], threshold: u8) {
    for (out, &s) in dst.iter_mut().zip(src) {
        *out = u8::from(s <= threshold);
    }
}

fn threshold_row_vector(
    src: &[u8],
    dst: &mut [u8],
    threshold: u8,
    strategy: Strategy,
    backend: Backend,
) {
    match backend {
        #[cfg(all(avx2, target_arch = "x86_64"))]
        Backend::Avx2 => unsafe {
            use crate::simd::avx2::threshold as avx2;
            match strategy {
                Strategy::Scalar => threshold_row(src, dst, threshold),
                Strategy::Unsigned => avx2::threshold_unsigned(src, dst, threshold),
                Strategy::Biased => avx2::threshold_biased(src, dst, threshold),
                Strategy::Signed => avx2::threshold_signed(src, dst, threshold),
            }
        },
        _ => threshold_row_lanes(src, dst, threshold, strategy),
    }
}

fn threshold_row_lanes(src: &[u8], dst: &mut [u8], threshold: u8, strategy: Strategy) {
    let bias = U8x32::splat(0x80);

    let mut src_chunks = src.chunks_exact(U8x32::LANES);
    let mut dst_chunks = dst.chunks_exact_mut(U8x32::LANES);
    for (s, d) in (&mut src_chunks).zip(&mut dst_chunks) {
        let v = U8x32::load(s);
        let mask = match strategy {
            Strategy::Scalar | Strategy::Unsigned => v.le_unsigned(threshold),
            Strategy::Biased => (v ^ bias).le_signed(threshold ^ 0x80),
            Strategy::Signed => v.le_signed(threshold),
        };
        mask.store(d);
    }

    let tail = dst_chunks.into_remainder().iter_mut().zip(src_chunks.remainder());
    match strategy {
        Strategy::Signed => {
            for (out, &s) in tail {
                *out = u8::from((s as i8) <= (threshold as i8));
            }
        }
        _ => {
            for (out, &s) in tail {
                *out = u8::from(s <= threshold);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_bytes() -> Image<u8> {
        Image::from_parts((0..=255).collect(), 256, 1, 256, 0).unwrap()
    }

    fn run(strategy: Strategy, backend: Backend, threshold: u8) -> Image<u8> {
        let src = all_bytes();
        let mut dst = src.create_same_shape();
        apply(&src, &mut dst, threshold, strategy, backend, Parallelism::Sequential);
        dst
    }

    #[test]
    fn scalar_marks_samples_at_or_below() {
        let dst = run(Strategy::Scalar, Backend::Portable, 125);
        assert!(dst.row(0)[..=125].iter().all(|&v| v == 1));
        assert!(dst.row(0)[126..].iter().all(|&v| v == 0));
    }

    #[test]
    fn correct_strategies_agree_on_every_byte() {
        for backend in [Backend::Portable, Backend::detect()] {
            for t in [0u8, 1, 125, 127, 128, 200, 255] {
                let expected = run(Strategy::Scalar, backend, t);
                assert_eq!(expected, run(Strategy::Unsigned, backend, t), "unsigned t={t}");
                assert_eq!(expected, run(Strategy::Biased, backend, t), "biased t={t}");
            }
        }
    }

    #[test]
    fn signed_compare_fails_for_high_samples() {
        for backend in [Backend::Portable, Backend::detect()] {
            let expected = run(Strategy::Scalar, backend, 125);
            let found = run(Strategy::Signed, backend, 125);

            assert_eq!(expected.row(0)[..128], found.row(0)[..128]);
            assert!(found.row(0)[128..].iter().all(|&v| v == 1));
            assert!(expected.row(0)[128..].iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn short_rows_use_the_tail_path() {
        let src = Image::from_parts(vec![3u8, 200, 7, 130, 0], 5, 1, 5, 0).unwrap();
        let mut dst = src.create_same_shape();
        threshold_vector(&src, &mut dst, 7);
        assert_eq!(dst.row(0), &[1, 0, 1, 0, 1]);
    }
}

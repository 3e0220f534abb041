//! Scalar versus vector equivalence tests for the matrix products.
//!
//! Operands come from seeded generators so any failure reproduces exactly.

use lanewise::harness::{
    compare_complex_matrices, compare_matrices, random_complex_matrix, random_matrix,
    reference_product, seeded,
};
use lanewise::matmul::{complex, real};
use lanewise::{
    ComplexMatrix, KernelConfig, KernelError, Parallelism, RealMatrix, SimdMultiply, Variant,
};
use num::Complex;

fn scalar_and_vector(a: &RealMatrix, b: &RealMatrix) -> (RealMatrix, RealMatrix) {
    let mut scalar = RealMatrix::new(0, 0);
    let mut vector = RealMatrix::new(0, 0);
    real::mult_ikj(a, b, &mut scalar);
    real::mult_ikj_vector(a, b, &mut vector);
    (scalar, vector)
}

fn check_square(n: usize, seed: u64) {
    let mut rng = seeded(seed);
    let a = random_matrix(n, n, -1.0, 1.0, &mut rng);
    let b = random_matrix(n, n, -1.0, 1.0, &mut rng);

    let (scalar, vector) = scalar_and_vector(&a, &b);
    if let Err(mismatch) = compare_matrices(&scalar, &vector, 1e-8) {
        panic!("N = {n}: {mismatch}");
    }
}

#[test]
fn test_product_shape_for_conformable_inputs() {
    let config = KernelConfig::new().with_variant(Variant::Vector);
    let cases = [(3, 4, 5), (1, 1, 1), (0, 4, 2), (3, 4, 0), (2, 0, 3)];

    for (m, k, n) in cases {
        let a = RealMatrix::new(m, k);
        let b = RealMatrix::new(k, n);
        let mut c = RealMatrix::new(7, 7);

        config.multiply(&a, &b, &mut c).unwrap();

        assert_eq!((c.rows(), c.cols()), (m, n), "{m}x{k} by {k}x{n}");
        assert_eq!(c.data().len(), m * n);
    }
}

#[test]
fn test_vector_matches_scalar_small() {
    check_square(1, 345);
    check_square(10, 345);
}

#[test]
fn test_vector_matches_scalar_500() {
    check_square(500, 345);
}

#[test]
#[ignore = "slow without optimizations"]
fn test_vector_matches_scalar_1000() {
    check_square(1000, 345);
}

#[test]
fn test_non_multiple_of_lane_width_columns() {
    let mut rng = seeded(11);
    for n in [2, 3, 5, 7, 9, 13] {
        let a = random_matrix(4, 6, -10.0, 10.0, &mut rng);
        let b = random_matrix(6, n, -10.0, 10.0, &mut rng);

        let (scalar, vector) = scalar_and_vector(&a, &b);
        assert_eq!(scalar, vector, "n = {n}");
    }
}

#[test]
fn test_ikj_against_inner_product() {
    let mut rng = seeded(345);
    let a = random_matrix(37, 53, -1.0, 1.0, &mut rng);
    let b = random_matrix(53, 29, -1.0, 1.0, &mut rng);

    let mut ikj = RealMatrix::new(0, 0);
    let mut inner = RealMatrix::new(0, 0);
    real::mult_ikj(&a, &b, &mut ikj);
    real::mult_inner(&a, &b, &mut inner);

    assert!(compare_matrices(&ikj, &inner, 1e-6).is_ok());
}

#[test]
fn test_simple_reference_and_ndarray_agree() {
    let mut rng = seeded(99);
    let a = random_matrix(12, 17, -2.0, 2.0, &mut rng);
    let b = random_matrix(17, 8, -2.0, 2.0, &mut rng);

    let mut simple = RealMatrix::new(0, 0);
    real::mult_ikj_simple(&a, &b, &mut simple);
    let (scalar, _) = scalar_and_vector(&a, &b);

    assert_eq!(simple, scalar);
    assert!(compare_matrices(&reference_product(&a, &b), &scalar, 1e-10).is_ok());
}

#[test]
fn test_strided_operands() {
    let mut rng = seeded(5);
    let a = random_matrix(6, 10, -1.0, 1.0, &mut rng);
    let b = random_matrix(10, 9, -1.0, 1.0, &mut rng);

    let relayout = |m: &RealMatrix, stride: usize| {
        let mut data = vec![f64::NAN; m.rows() * stride];
        for r in 0..m.rows() {
            data[r * stride..r * stride + m.cols()].copy_from_slice(m.row(r));
        }
        RealMatrix::with_stride(m.rows(), m.cols(), stride, data).unwrap()
    };

    let (expected, _) = scalar_and_vector(&a, &b);
    let (scalar, vector) = scalar_and_vector(&relayout(&a, 13), &relayout(&b, 16));

    assert_eq!(expected, scalar);
    assert_eq!(expected, vector);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut rng = seeded(21);
    let a = random_matrix(67, 45, -1.0, 1.0, &mut rng);
    let b = random_matrix(45, 31, -1.0, 1.0, &mut rng);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();

    let (expected, _) = scalar_and_vector(&a, &b);
    for variant in [Variant::Scalar, Variant::Vector] {
        for parallelism in [Parallelism::Global, Parallelism::Pool(&pool)] {
            let mut c = RealMatrix::new(0, 0);
            KernelConfig::new()
                .with_variant(variant)
                .with_parallelism(parallelism)
                .multiply(&a, &b, &mut c)
                .unwrap();
            assert_eq!(expected, c, "{variant:?} {parallelism:?}");
        }
    }

    assert_eq!(expected, (&a).par_simd_mult(&b));
}

#[test]
fn test_non_conformable_operands_are_rejected() {
    let a = RealMatrix::new(3, 4);
    let b = RealMatrix::new(5, 2);
    let mut c = RealMatrix::new(1, 1);

    let err = KernelConfig::new().multiply(&a, &b, &mut c).unwrap_err();
    assert!(matches!(err, KernelError::DimensionMismatch { .. }));
    assert_eq!((c.rows(), c.cols()), (1, 1));
}

#[test]
fn test_complex_hand_computed_case() {
    let i = Complex::new(0.0, 1.0);
    let one = Complex::new(1.0, 0.0);
    let zero = Complex::new(0.0, 0.0);

    let a = ComplexMatrix::from_cells(2, 2, &[one, i, zero, one]).unwrap();
    let b = ComplexMatrix::from_cells(2, 2, &[one, zero, i, one]).unwrap();
    let expected = ComplexMatrix::from_cells(2, 2, &[zero, i, i, one]).unwrap();

    for variant in [Variant::Scalar, Variant::Vector] {
        let mut c = ComplexMatrix::new(0, 0);
        KernelConfig::new()
            .with_variant(variant)
            .with_complex_lane_width(2)
            .multiply_complex(&a, &b, &mut c)
            .unwrap();
        assert!(compare_complex_matrices(&expected, &c, 1e-12).is_ok(), "{variant:?}");
    }
}

#[test]
fn test_complex_vector_matches_scalar() {
    let mut rng = seeded(345);
    let a = random_complex_matrix(33, 21, -1.0, 1.0, &mut rng);
    let b = random_complex_matrix(21, 19, -1.0, 1.0, &mut rng);

    let mut scalar = ComplexMatrix::new(0, 0);
    complex::mult_ikj(&a, &b, &mut scalar);

    for lane_width in [2, 4, 8, 12] {
        let mut vector = ComplexMatrix::new(0, 0);
        complex::mult_ikj_vector(&a, &b, &mut vector, lane_width).unwrap();
        if let Err(mismatch) = compare_complex_matrices(&scalar, &vector, 1e-8) {
            panic!("lane width {lane_width}: {mismatch}");
        }
    }

    assert_eq!(scalar, (&a).simd_mult(&b));
}

#[test]
fn test_odd_lane_width_fails_fast() {
    let mut rng = seeded(1);
    let a = random_complex_matrix(3, 3, -1.0, 1.0, &mut rng);
    let b = random_complex_matrix(3, 3, -1.0, 1.0, &mut rng);
    let mut c = ComplexMatrix::new(2, 1);
    let before = c.clone();

    let err = complex::mult_ikj_vector(&a, &b, &mut c, 3).unwrap_err();
    assert_eq!(err, KernelError::InvalidLaneWidth { lane_width: 3 });
    assert_eq!(c, before);

    let err = KernelConfig::new()
        .with_complex_lane_width(0)
        .multiply_complex(&a, &b, &mut c)
        .unwrap_err();
    assert_eq!(err, KernelError::InvalidLaneWidth { lane_width: 0 });
    assert_eq!(c, before);
}

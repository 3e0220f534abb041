//! Equivalence Demonstration
//!
//! Runs every scalar/vector kernel pair on seeded data and prints the
//! harness verdict, including the signed-threshold pitfall.
//!
//! ```bash
//! cargo run --release --example equivalence
//! ```

use lanewise::harness::{
    compare_complex_matrices, compare_images_exact, compare_images_f32, compare_matrices,
    fill_uniform, gaussian_kernel, random_complex_matrix, random_matrix, seeded, Mismatch,
    DEFAULT_SEED,
};
use lanewise::image::{convolve, histogram, mean, threshold};
use lanewise::matmul::{complex, real};
use lanewise::{Backend, ComplexMatrix, Image, RealMatrix};

fn report(name: &str, verdict: Result<(), Mismatch>) {
    match verdict {
        Ok(()) => println!("   ✅ {name}: equivalent"),
        Err(mismatch) => println!("   ❌ {name}: {mismatch}"),
    }
}

fn main() -> lanewise::Result<()> {
    println!("🔧 lanewise equivalence check (backend: {})\n", Backend::detect().name());
    let mut rng = seeded(DEFAULT_SEED);

    println!("Matrix multiplication");
    for n in [4, 250] {
        let a = random_matrix(n, n, -1.0, 1.0, &mut rng);
        let b = random_matrix(n, n, -1.0, 1.0, &mut rng);
        let mut scalar = RealMatrix::new(0, 0);
        let mut vector = RealMatrix::new(0, 0);
        real::mult_ikj(&a, &b, &mut scalar);
        real::mult_ikj_vector(&a, &b, &mut vector);
        report(&format!("real IKJ {n}x{n}"), compare_matrices(&scalar, &vector, 1e-8));

        let a = random_complex_matrix(n, n, -1.0, 1.0, &mut rng);
        let b = random_complex_matrix(n, n, -1.0, 1.0, &mut rng);
        let mut scalar = ComplexMatrix::new(0, 0);
        let mut vector = ComplexMatrix::new(0, 0);
        complex::mult_ikj(&a, &b, &mut scalar);
        complex::mult_ikj_vector(&a, &b, &mut vector, 8)?;
        report(
            &format!("complex IKJ {n}x{n}"),
            compare_complex_matrices(&scalar, &vector, 1e-8),
        );
    }

    match complex::mult_ikj_vector(
        &ComplexMatrix::new(2, 2),
        &ComplexMatrix::new(2, 2),
        &mut ComplexMatrix::new(0, 0),
        3,
    ) {
        Ok(()) => println!("   ❌ odd lane width was accepted"),
        Err(e) => println!("   ✅ odd lane width rejected: {e}"),
    }
    println!();

    println!("Image filtering (1200x800)");
    let mut src_f32 = Image::<f32>::new(1200, 800);
    fill_uniform(&mut src_f32, 0.0, 255.0, &mut rng);
    for radius in [2, 15] {
        let kernel = gaussian_kernel(radius);
        let mut scalar = src_f32.create_same_shape();
        let mut vector = src_f32.create_same_shape();

        convolve::horizontal(&kernel, &src_f32, &mut scalar);
        convolve::horizontal_vector(&kernel, &src_f32, &mut vector);
        let name = format!("horizontal convolution, width {}", kernel.width());
        report(&name, compare_images_f32(&scalar, &vector, 1e-5));

        convolve::vertical(&kernel, &src_f32, &mut scalar);
        convolve::vertical_vector(&kernel, &src_f32, &mut vector);
        let name = format!("vertical convolution, width {}", kernel.width());
        report(&name, compare_images_f32(&scalar, &vector, 1e-5));
    }

    let mut src_u8 = Image::<u8>::new(1200, 800);
    fill_uniform(&mut src_u8, 0, 255, &mut rng);
    let mut scalar = src_u8.create_same_shape();
    let mut vector = src_u8.create_same_shape();

    mean::horizontal(&src_u8, &mut scalar, 5, 11);
    mean::horizontal_vector(&src_u8, &mut vector, 5, 11);
    report("box mean (5, 11)", compare_images_exact(&scalar, &vector));

    threshold::threshold(&src_u8, &mut scalar, 125);
    threshold::threshold_vector(&src_u8, &mut vector, 125);
    report("threshold, unsigned lanes", compare_images_exact(&scalar, &vector));
    threshold::threshold_vector_biased(&src_u8, &mut vector, 125);
    report("threshold, biased lanes", compare_images_exact(&scalar, &vector));
    threshold::threshold_vector_signed(&src_u8, &mut vector, 125);
    report(
        "threshold, signed lanes (expected to fail)",
        compare_images_exact(&scalar, &vector),
    );

    let mut src_u16 = Image::<u16>::new(1200, 800);
    fill_uniform(&mut src_u16, 0, 1999, &mut rng);
    let mut scalar = vec![0u32; 2000];
    let mut vector = vec![0u32; 2000];
    histogram::histogram(&src_u16, 0, &mut scalar);
    histogram::histogram_vector(&src_u16, 0, &mut vector);
    match scalar == vector {
        true => println!("   ✅ histogram: equivalent"),
        false => println!("   ❌ histogram: counts differ"),
    }

    Ok(())
}

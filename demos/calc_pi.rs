use realfield::{RealField, Result, RoundingMode};

///! Calculate the value of PI using the Chudnovsky_algorithm.
///!  cargo run --example calc_pi --release

fn main() -> Result<()> {
    // https://en.wikipedia.org/wiki/Chudnovsky_algorithm
    let iterations = 5;
    let f = RealField::new(256, RoundingMode::NearestTiesToEven, false)?;

    // Constants:
    let c1 = f.from_u64(10005).sqrt();
    let c2 = f.from_u64(545140134);
    let c3 = f.from_i64(-262537412640768000);
    let c16 = f.from_u64(16);
    let c12 = f.from_u64(12);

    // Initial state.
    let mut kc = f.from_u64(6);
    let mut m = f.one();
    let mut l = f.from_u64(13591409);
    let mut x = f.one();
    let mut s = f.from_u64(13591409);

    for q in 1..iterations + 1 {
        let q3 = f.from_u64(q * q * q);
        let k3 = kc.powi(3);
        m = k3.sub(&kc.mul(&c16)?)?.mul(&m)?.div(&q3)?;
        l = l.add(&c2)?;
        x = x.mul(&c3)?;
        s = s.add(&m.mul(&l)?.div(&x)?)?;
        kc = kc.add(&c12)?;
    }
    let pi = f.from_u64(426880).mul(&c1.div(&s)?)?;
    println!("pi = {}", pi);
    println!("pi = {:.70}", pi);
    assert_eq!(pi.to_f64(), std::f64::consts::PI);
    Ok(())
}

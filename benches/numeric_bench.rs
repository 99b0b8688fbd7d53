use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gnucash::numeric::RoundMode;
use gnucash::Numeric;

fn ledger_amounts() -> Vec<Numeric> {
    (1..=1_000)
        .map(|i| Numeric::new(if i % 3 == 0 { -i * 137 } else { i * 251 }, 100))
        .collect()
}

fn bench_sum(c: &mut Criterion) {
    let amounts = ledger_amounts();
    c.bench_function("numeric_sum_1000", |b| {
        b.iter(|| black_box(&amounts).iter().sum::<Numeric>())
    });
}

fn bench_mixed_denominators(c: &mut Criterion) {
    let thirds = Numeric::new(1, 3);
    let cents = Numeric::new(1999, 100);
    c.bench_function("numeric_mul_div_convert", |b| {
        b.iter(|| {
            let product = black_box(cents) * black_box(thirds);
            let quotient = product / Numeric::new(7, 4);
            quotient.convert(100, RoundMode::Banker)
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let inputs = ["1234.56", "-0.01", "5000/100", "42", "98765.4321"];
    c.bench_function("numeric_parse", |b| {
        b.iter(|| {
            for s in inputs {
                let _ = black_box(s).parse::<Numeric>();
            }
        })
    });
}

criterion_group!(benches, bench_sum, bench_mixed_denominators, bench_parse);
criterion_main!(benches);

use cinerank_core::Tokenizer;
use criterion::{criterion_group, criterion_main, Criterion};

const SYNOPSIS: &str = "A retired astronaut is pulled back into service when a \
mining station on the far side of the moon goes silent. With a crew of \
misfits, a stolen shuttle, and seventy-two hours of air, she races a rival \
corporation to the wreck -- and to the secret buried under the regolith. \
Critics called it 'a love letter to practical effects' and 'two hours of \
pure, pressurized tension.'";

fn bench_tokenize(c: &mut Criterion) {
    let tokenizer = Tokenizer::new();
    let text = SYNOPSIS.repeat(50);
    c.bench_function("tokenize_synopsis", |b| b.iter(|| tokenizer.tokenize(&text)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);

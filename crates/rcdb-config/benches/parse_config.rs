//! Throughput of the configuration lexer and slot sectioning.

use std::{fmt::Write, hint::black_box};

use criterion::{criterion_group, criterion_main, Criterion};

const SLOT_PREFIX: &str = "FADC250_SLOTS";

fn synthetic_crate_config(n_slots: usize) -> String {
    let mut text = String::from("FADC250_CRATE rocbcal1\n# crate level settings\n");
    for slot in 3..3 + n_slots {
        let _ = writeln!(text, "==============\n{SLOT_PREFIX} {slot}");
        let _ = writeln!(text, "FADC250_MODE 10\nFADC250_NSA 20\nFADC250_NSB 3");
        let _ = writeln!(
            text,
            "FADC250_ALLCH_THR {}  # thresholds",
            vec!["110"; 16].join(" ")
        );
        let _ = writeln!(text, "FADC250_COM \"board {slot} \\\"spare\\\"\"");
    }
    text
}

fn bench_parse_with_slots(c: &mut Criterion) {
    let text = synthetic_crate_config(16);
    c.bench_function("parse_config_with_slots_16", |b| {
        b.iter(|| {
            let result = rcdb_config::parse_config_with_slots(black_box(&text), SLOT_PREFIX)
                .expect("parse failed");
            black_box(result);
        })
    });
}

fn bench_tokenize(c: &mut Criterion) {
    let line = r#"TRIG_EQ  PS  35  10  1  "quoted \"value\""  # trailing comment"#;
    c.bench_function("tokenize_line", |b| {
        b.iter(|| black_box(rcdb_config::tokenize_line(black_box(line))))
    });
}

criterion_group!(benches, bench_parse_with_slots, bench_tokenize);
criterion_main!(benches);

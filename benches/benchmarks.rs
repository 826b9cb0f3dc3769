//! Performance benchmarks for ferro-annotate
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- consequence

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferro_annotate::consequence::{CalculatorContext, RegulatoryOverlap};
use ferro_annotate::model::{Exon, Gene, Strand, Transcript};
use ferro_annotate::normalize::normalize_batch;
use ferro_annotate::{
    consequence_types, AnnotationOptions, Annotator, MockProvider, Variant, VariantAnnotator,
};

/// Coding gene at 1:1001-3600 with a 300-codon CDS split over three exons.
fn gene() -> Gene {
    let cds = format!("ATG{}TAA", "GCCAAG".repeat(149));
    let utr = "GCA".repeat(100);
    let exon_sequence = format!("{}{}{}", utr, cds, utr);
    let exons = vec![
        Exon::new(1, 1001, 1600, &exon_sequence[..600]).with_phase(0),
        Exon::new(2, 2001, 2300, &exon_sequence[600..900]).with_phase(0),
        Exon::new(3, 3001, 3600, &exon_sequence[900..]).with_phase(0),
    ];
    let transcript = Transcript {
        id: "ENST_BENCH".to_string(),
        protein_id: Some("ENSP_BENCH".to_string()),
        chromosome: "1".to_string(),
        strand: Strand::Plus,
        biotype: "protein_coding".to_string(),
        start: 1001,
        end: 3600,
        genomic_coding_start: 1301,
        genomic_coding_end: 3300,
        cdna_coding_start: 301,
        cdna_coding_end: 1200,
        exons,
        ..Default::default()
    };
    Gene {
        id: "ENSG_BENCH".to_string(),
        name: "BENCH".to_string(),
        chromosome: "1".to_string(),
        start: 1001,
        end: 3600,
        strand: Strand::Plus,
        biotype: "protein_coding".to_string(),
        transcripts: vec![transcript],
        ..Default::default()
    }
}

fn provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.add_gene(gene());
    provider.add_chromosome("1", "ACGT".repeat(2500));
    provider
}

/// SNVs walking through the gene and its flanks.
fn snv_batch(size: usize) -> Vec<Variant> {
    (0..size)
        .map(|i| Variant::new("1", 500 + (i as i64 * 7) % 3500, "N", "T"))
        .collect()
}

// =============================================================================
// Consequence calculators
// =============================================================================

/// Benchmark consequence types for different variant shapes
fn bench_consequence(c: &mut Criterion) {
    let variants = vec![
        ("snv.utr5", Variant::new("1", 1100, "A", "T")),
        ("snv.coding", Variant::new("1", 1400, "C", "T")),
        ("snv.intron", Variant::new("1", 1800, "A", "G")),
        ("snv.splice", Variant::new("1", 2002, "A", "G")),
        ("mnv.coding", Variant::new("1", 2100, "GCC", "TTT")),
        ("del.frameshift", Variant::new("1", 2150, "GC", "")),
        ("del.exon_boundary", Variant::new("1", 2290, "A".repeat(20), "")),
        ("ins.inframe", Variant::new("1", 2200, "", "GGG")),
        ("sv.deletion", Variant::new("1", 900, "N", "<DEL>").with_end(3700)),
        ("sv.inversion", Variant::new("1", 1500, "N", "<INV>").with_end(2500)),
    ];
    let provider = provider();
    let bench_gene = gene();
    let genes = vec![&bench_gene];
    let ctx = CalculatorContext::new(&provider);

    let mut group = c.benchmark_group("consequence");

    for (name, variant) in &variants {
        group.bench_with_input(BenchmarkId::new("shape", name), variant, |b, v| {
            b.iter(|| consequence_types(&ctx, black_box(v), &genes, RegulatoryOverlap::default()))
        });
    }

    group.finish();
}

// =============================================================================
// Normalization
// =============================================================================

fn bench_normalization(c: &mut Criterion) {
    let provider = provider();
    let batch: Vec<_> = (0..100)
        .map(|i| Variant::new("1", 100 + i * 8, "ACGTA", "ACA"))
        .collect();

    c.bench_function("normalize/batch_100", |b| {
        b.iter(|| normalize_batch(black_box(&batch), &provider))
    });
}

// =============================================================================
// Full annotation
// =============================================================================

/// Benchmark whole batches through the annotator, with and without the
/// auxiliary lookups
fn bench_annotate(c: &mut Criterion) {
    let annotator = VariantAnnotator::new(provider()).expect("worker pool");
    let consequence_only =
        AnnotationOptions::default().with_annotators(&[Annotator::ConsequenceType]);
    let everything = AnnotationOptions::default();

    let mut group = c.benchmark_group("annotate");

    for size in [10usize, 100, 1000] {
        let batch = snv_batch(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("consequence_only", size), &batch, |b, v| {
            b.iter(|| annotator.annotate(black_box(v), &consequence_only))
        });
        group.bench_with_input(BenchmarkId::new("all_annotators", size), &batch, |b, v| {
            b.iter(|| annotator.annotate(black_box(v), &everything))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_consequence, bench_normalization, bench_annotate);
criterion_main!(benches);

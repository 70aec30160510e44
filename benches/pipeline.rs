use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use scenario_comparison::config::{PipelineConfig, UnitSelection};
use scenario_comparison::pipeline::Pipeline;
use scenario_comparison::processing::{aggregate, convert_units};
use scenario_comparison::types::{DataType, Field, RecordSet, Schema, Value};
use scenario_comparison::units::UnitRegistry;

const REGIONS: [&str; 16] = [
    "BB", "BE", "BW", "BY", "HB", "HE", "HH", "MV", "NI", "NW", "RP", "SH", "SL", "SN", "ST", "TH",
];
const UNITS: [&str; 4] = ["kWh", "MWh", "GWh", "MW"];

fn scalars(rows: usize) -> RecordSet {
    let schema = Schema::new(vec![
        Field::new("region", DataType::Utf8),
        Field::new("year", DataType::Int64),
        Field::new("value", DataType::Float64),
        Field::new("unit", DataType::Utf8),
    ]);
    let data = (0..rows)
        .map(|i| {
            vec![
                REGIONS[i % REGIONS.len()].into(),
                Value::Int64(2020 + (i % 4) as i64 * 5),
                (i as f64 * 1.5).into(),
                UNITS[i % UNITS.len()].into(),
            ]
        })
        .collect();
    RecordSet::new(schema, data)
}

fn timeseries(rows: usize, len: usize) -> RecordSet {
    let schema = Schema::new(vec![
        Field::new("region", DataType::Utf8),
        Field::new("series", DataType::Series),
        Field::new("unit", DataType::Utf8),
    ]);
    let data = (0..rows)
        .map(|i| {
            vec![
                REGIONS[i % REGIONS.len()].into(),
                Value::Series((0..len).map(|h| (h + i) as f64).collect()),
                "MW".into(),
            ]
        })
        .collect();
    RecordSet::new(schema, data)
}

fn bench_stages(c: &mut Criterion) {
    let registry = UnitRegistry::energy_system();
    let targets = vec!["TWh".to_string(), "GW".to_string()];
    let group_by = vec!["region".to_string(), "year".to_string()];

    let mut group = c.benchmark_group("stages");
    for rows in [1_000usize, 10_000, 100_000] {
        let rs = scalars(rows);
        group.bench_with_input(BenchmarkId::new("convert_units", rows), &rs, |b, rs| {
            b.iter(|| convert_units(black_box(rs), &registry, &targets))
        });
        group.bench_with_input(BenchmarkId::new("aggregate", rows), &rs, |b, rs| {
            b.iter(|| aggregate(black_box(rs), &group_by))
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let registry = UnitRegistry::energy_system();
    let pipeline = Pipeline::new(&registry);
    let config = PipelineConfig {
        group_by: vec!["region".to_string()],
        order_by: Some("region".to_string()),
        units: UnitSelection::new().with("Power", "GW"),
        ..PipelineConfig::default()
    };

    // one year of hourly values per row
    let rs = timeseries(200, 8760);
    c.bench_function("pipeline/timeseries_200x8760", |b| {
        b.iter(|| pipeline.run(black_box(&rs), &config))
    });

    let rs = scalars(50_000);
    let config = PipelineConfig {
        units: UnitSelection::defaults(&registry),
        ..config
    };
    c.bench_function("pipeline/scalars_50k", |b| {
        b.iter(|| pipeline.run(black_box(&rs), &config))
    });
}

criterion_group!(benches, bench_stages, bench_pipeline);
criterion_main!(benches);

//! Benchmarks for `sandbox-path` live under `benches/`.

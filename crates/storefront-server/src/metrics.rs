use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, register_int_counter_vec,
    CounterVec, Encoder, Histogram, HistogramVec, IntCounterVec, TextEncoder,
};

pub static OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("storefront_ops_total", "Completed operations", &["op"]).unwrap()
});

pub static OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!("op_duration_seconds", "Operation durations", &["op"]).unwrap()
});

pub static QUERY_RESULT_SIZE: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "query_matched_products",
        "Products matched by catalogue queries before pagination",
        vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0]
    )
    .unwrap()
});

pub static IMAGE_UPLOADS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("image_uploads_total", "Image uploads by result", &["result"]).unwrap()
});

pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    let _ = encoder.encode(&metric_families, &mut buf);
    String::from_utf8(buf).unwrap_or_default()
}

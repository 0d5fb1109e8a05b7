use gr6j_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
pub struct StepFluxes {
    pub precip: f64,
    pub routing_store: f64,
    pub run_off: f64,
}

fn main() {
    let mut ts = StepFluxesTimeseries::with_capacity(10);
    for t in 0..4 {
        let f = StepFluxes {
            precip: t as f64,
            routing_store: 10.0,
            run_off: 0.5 * t as f64,
        };
        ts.push(&f);
    }
    assert_eq!(ts.len(), 4);
    assert!(!ts.is_empty());
    assert_eq!(StepFluxes::field_names(), &["precip", "routing_store", "run_off"]);

    ts.drain_front(2);
    assert_eq!(ts.len(), 2);
    assert_eq!(ts.field("precip"), Some(&[2.0, 3.0][..]));
    assert_eq!(ts.field("run_off"), Some(&[1.0, 1.5][..]));
    assert_eq!(ts.field("missing"), None);

    ts.drain_front(10);
    assert!(ts.is_empty());
}

use gr6j_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
#[fluxes(timeseries_name = "ExchangeSeries")]
pub struct ExchangeFluxes {
    pub potential: f64,
    pub actual: f64,
}

fn main() {
    let f = ExchangeFluxes { potential: -1.5, actual: -0.5 };
    let mut ts = ExchangeSeries::with_capacity(5);
    ts.push(&f);
    assert_eq!(ts.len(), 1);
    assert_eq!(ts.clone(), ts);
    assert_eq!(ExchangeFluxes::field_names(), &["potential", "actual"]);
}

//! Chart request derivation

use super::symbol::Symbol;
use url::Url;

/// Fixed rendering flags sent with every chart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub size: &'static str,
    pub period: u32,
    pub intraday_color: &'static str,
    pub chart_color: &'static str,
    pub chart_type: u32,
    pub scale: &'static str,
    pub volume_size: &'static str,
    pub volume_zoom: u32,
    pub show_info: bool,
    pub show_ohlc: bool,
}

impl Default for RenderOptions {
    /// Small, log-scale, dark theme, OHLC overlay on
    fn default() -> Self {
        Self {
            size: "small",
            period: 6,
            intraday_color: "greenred",
            chart_color: "black",
            chart_type: 4,
            scale: "log",
            volume_size: "big",
            volume_zoom: 10,
            show_info: true,
            show_ohlc: true,
        }
    }
}

/// One chart download, derived from a symbol and the horizontal shift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: Symbol,
    pub shift: u32,
    pub options: RenderOptions,
}

impl ChartRequest {
    pub fn new(symbol: Symbol, shift: u32) -> Self {
        Self {
            symbol,
            shift,
            options: RenderOptions::default(),
        }
    }

    /// Full request URL against the provider's servlet endpoint.
    ///
    /// Any query already present on `base` is replaced.
    pub fn url(&self, base: &Url) -> Url {
        let flag = |on: bool| if on { "1" } else { "0" };
        let o = &self.options;
        let mut url = base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("s", o.size)
            .append_pair("symbol", self.symbol.as_str())
            .append_pair("shift", &self.shift.to_string())
            .append_pair("tp", &o.period.to_string())
            .append_pair("intraday_color", o.intraday_color)
            .append_pair("chart_color", o.chart_color)
            .append_pair("ttype", &o.chart_type.to_string())
            .append_pair("tscale", o.scale)
            .append_pair("tv", "0")
            .append_pair("vs", o.volume_size)
            .append_pair("vz", &o.volume_zoom.to_string())
            .append_pair("show_info", flag(o.show_info))
            .append_pair("show_ohlc", flag(o.show_ohlc))
            .append_pair("hide_val", "0")
            .append_pair("hide_prc", "0");
        url
    }
}

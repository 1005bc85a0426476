use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;

use crate::product::{Product, ProductDecodeErr};
use crate::provider::{EmptyProvider, NwsliProvider, UgcProvider};
use crate::segment::{Segment, SegmentContext};
use crate::text::{normalize, segments};
use crate::time::{find_mnd, parse_ddhhmm, resolve_ddhhmm, InvalidDateErr};
use crate::wmo::{find_afos, WmoHeading};

/// Builds a text product parser
///
/// The builder comes with a sensible set of default options:
/// no metadata providers, and the system clock as the reference
/// time for products which lack an MND line.
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// use chrono::{TimeZone, Utc};
/// use nwstext::{ProductParserBuilder, UgcInfo};
///
/// let mut ugcs = HashMap::new();
/// ugcs.insert(
///     "IAC001".to_owned(),
///     UgcInfo { name: "Adair".to_owned(), wfos: vec!["DMX".to_owned()] },
/// );
///
/// let parser = ProductParserBuilder::new()
///     .with_utcnow(Utc.with_ymd_and_hms(2013, 1, 27, 18, 0, 0).unwrap())
///     .with_ugc_provider(Arc::new(ugcs))
///     .build();
/// ```
#[derive(Clone)]
pub struct ProductParserBuilder {
    utcnow: Option<DateTime<Utc>>,
    ugc_provider: Arc<dyn UgcProvider + Send + Sync>,
    nwsli_provider: Arc<dyn NwsliProvider + Send + Sync>,
}

impl ProductParserBuilder {
    /// New parser configuration with defaults
    pub fn new() -> Self {
        Self {
            utcnow: None,
            ugc_provider: Arc::new(EmptyProvider),
            nwsli_provider: Arc::new(EmptyProvider),
        }
    }

    /// Build a parser
    pub fn build(&self) -> ProductParser {
        ProductParser::from(self)
    }

    /// Reference time for `DDHHMM` resolution
    ///
    /// Products without a usable MND line are placed on the
    /// calendar nearest to this time. Set it when decoding
    /// archived products. The default is the system clock at
    /// the moment each product is parsed.
    pub fn with_utcnow(&mut self, now: DateTime<Utc>) -> &mut Self {
        self.utcnow = Some(now);
        self
    }

    /// UGC name and forecast office lookup
    pub fn with_ugc_provider(&mut self, provider: Arc<dyn UgcProvider + Send + Sync>) -> &mut Self {
        self.ugc_provider = provider;
        self
    }

    /// River gauge and site lookup
    pub fn with_nwsli_provider(
        &mut self,
        provider: Arc<dyn NwsliProvider + Send + Sync>,
    ) -> &mut Self {
        self.nwsli_provider = provider;
        self
    }
}

impl Default for ProductParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProductParserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductParserBuilder")
            .field("utcnow", &self.utcnow)
            .finish_non_exhaustive()
    }
}

/// Decodes NWS text products
///
/// Create with a [`ProductParserBuilder`]. Parsers hold no
/// per-product state and may be shared between threads.
#[derive(Clone)]
pub struct ProductParser {
    utcnow: Option<DateTime<Utc>>,
    ugc_provider: Arc<dyn UgcProvider + Send + Sync>,
    nwsli_provider: Arc<dyn NwsliProvider + Send + Sync>,
}

impl ProductParser {
    /// Decode one product
    ///
    /// A missing WMO heading, a malformed UGC block, or a
    /// degenerate polygon fails the whole product. Anything
    /// less is recorded in [`Product::warnings()`].
    pub fn parse(&self, raw: &str) -> Result<Product, ProductDecodeErr> {
        let text = normalize(raw);
        let mut warnings = Vec::new();

        let (wmo, padded) = WmoHeading::parse(&text)?;
        if padded && wmo.padding_is_noteworthy() {
            warnings.push(format!(
                "WMO TTAAII \"{}\" was four characters; padded with 00",
                wmo.ttaaii()
            ));
        }
        let afos = find_afos(&text);
        let now = self.utcnow.unwrap_or_else(Utc::now);

        let mut valid = None;
        let mut zone = None;
        if let Some(mnd) = find_mnd(&text) {
            match mnd.to_utc() {
                Ok((ts, label)) => {
                    valid = Some(ts);
                    zone = Some(label);
                }
                Err(e) => {
                    debug!("ignoring MND line: {}", e);
                    warnings.push(format!("{}; using the WMO heading time instead", e));
                }
            }
        }
        let valid = match valid {
            Some(ts) => ts,
            None => {
                let (day, hour, minute) = parse_ddhhmm(wmo.ddhhmm())
                    .ok_or_else(|| InvalidDateErr(wmo.ddhhmm().to_owned()))?;
                resolve_ddhhmm(day, hour, minute, &now)?
            }
        };

        let ctx = SegmentContext {
            valid,
            source: wmo.cccc(),
            afos: afos.as_deref(),
            ugc_provider: self.ugc_provider.as_ref(),
            nwsli_provider: self.nwsli_provider.as_ref(),
        };
        let mut decoded = Vec::new();
        for chunk in segments(&text) {
            decoded.push(Segment::parse(chunk, &ctx, &mut warnings)?);
        }

        debug!(
            "decoded {} {:?}: {} segments, {} warnings",
            wmo,
            afos,
            decoded.len(),
            warnings.len()
        );

        Ok(Product::new(
            raw.to_owned(),
            text,
            wmo,
            afos,
            valid,
            zone,
            warnings,
            decoded,
        ))
    }
}

impl From<&ProductParserBuilder> for ProductParser {
    fn from(cfg: &ProductParserBuilder) -> Self {
        Self {
            utcnow: cfg.utcnow,
            ugc_provider: cfg.ugc_provider.clone(),
            nwsli_provider: cfg.nwsli_provider.clone(),
        }
    }
}

impl fmt::Debug for ProductParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductParser")
            .field("utcnow", &self.utcnow)
            .finish_non_exhaustive()
    }
}

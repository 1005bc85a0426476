//! Decode each product in the input and print it
//!
//! Input may hold several products. Each is expected to start
//! with the SOH (`0x01`) character, as on NOAAPort and most
//! archives. Input without any SOH is treated as one product.

use std::io::{self, Write};

use log::{error, info, warn};
use serde_json::json;

use nwstext::{
    apply_product, assemble_messages, encode_ugcs, parse_climate_product, ClimateReport,
    LifecycleReport, MemoryEventStore, MessageOptions, Product, ProductParser,
};

use crate::cli::{Args, Format};

/// Start of heading
const SOH: char = '\x01';

/// Run the application
///
/// Decodes every product in `input` with `parser` and writes
/// the results to `out` in the format selected by `args`.
/// Returns the number of products which could not be decoded.
pub fn run<W: Write>(
    args: &Args,
    parser: &ProductParser,
    msg_opts: &MessageOptions,
    input: &str,
    out: &mut W,
) -> io::Result<usize> {
    let mut store = MemoryEventStore::new();
    let mut failures = 0;

    for (num, bulletin) in split_bulletins(input).enumerate() {
        let product = match parser.parse(bulletin) {
            Ok(product) => product,
            Err(e) => {
                error!("product {}: {}", num + 1, e);
                failures += 1;
                continue;
            }
        };

        info!("decoded {}", product);
        for w in product.warnings() {
            warn!("{}: {}", product, w);
        }

        let lifecycle = if args.lifecycle {
            let report = match apply_product(&product, &mut store) {
                Ok(report) => report,
                Err(never) => match never {},
            };
            for w in &report.warnings {
                warn!("{}: {}", product, w);
            }
            Some(report)
        } else {
            None
        };

        if args.quiet {
            continue;
        }

        match args.format {
            Format::Json => write_json(out, &product, lifecycle.as_ref(), msg_opts)?,
            Format::Summary => write_summary(out, &product, lifecycle.as_ref())?,
            Format::Messages => {
                for msg in assemble_messages(&product, msg_opts) {
                    writeln!(out, "{}", msg.plain)?;
                }
            }
        }
    }

    if args.lifecycle {
        info!(
            "event store holds {} warning rows and {} polygons",
            store.warnings().len(),
            store.sbw().len()
        );
    }

    out.flush()?;
    Ok(failures)
}

/// Split input into individual bulletins
fn split_bulletins(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(SOH)
        .filter(|bulletin| !bulletin.trim().is_empty())
}

fn write_json<W: Write>(
    out: &mut W,
    product: &Product,
    lifecycle: Option<&LifecycleReport>,
    msg_opts: &MessageOptions,
) -> io::Result<()> {
    let climate = if product.is_climate_report() {
        parse_climate_product(product)
    } else {
        Vec::new()
    };

    let record = json!({
        "product_id": product.product_id(),
        "product": product,
        "messages": assemble_messages(product, msg_opts),
        "climate": climate,
        "lifecycle": lifecycle,
    });
    serde_json::to_writer(&mut *out, &record)?;
    writeln!(out)
}

fn write_summary<W: Write>(
    out: &mut W,
    product: &Product,
    lifecycle: Option<&LifecycleReport>,
) -> io::Result<()> {
    writeln!(out, "{}", product.product_id())?;
    writeln!(
        out,
        "  {} {} valid {}",
        product.wmo_heading(),
        product.afos().unwrap_or("-"),
        product.valid().to_rfc3339()
    )?;

    for (i, segment) in product.segments().iter().enumerate() {
        if segment.ugcs().is_empty() && segment.vtecs().is_empty() {
            continue;
        }
        writeln!(out, "  segment {}: {}", i + 1, encode_ugcs(segment.ugcs()))?;
        for vtec in segment.vtecs() {
            writeln!(out, "    {} {}", vtec, vtec.ps_string())?;
        }
        for hvtec in segment.hvtecs() {
            writeln!(out, "    {}", hvtec)?;
        }
        if let Some(poly) = segment.polygon() {
            writeln!(out, "    {}", poly.to_wkt())?;
        }
        if let Some(tags) = segment.tags().summary() {
            writeln!(out, "    {}", tags)?;
        }
    }

    if product.is_climate_report() {
        for report in parse_climate_product(product) {
            write_climate_summary(out, &report)?;
        }
    }

    if let Some(report) = lifecycle {
        writeln!(
            out,
            "  lifecycle: {} inserted, {} updated, {} deleted, {} polygons",
            report.inserted, report.updated, report.deleted, report.sbw_inserted
        )?;
    }

    Ok(())
}

fn write_climate_summary<W: Write>(out: &mut W, report: &ClimateReport) -> io::Result<()> {
    let station = report.station.as_deref().unwrap_or("unknown station");
    match report.date {
        Some(date) => writeln!(out, "  climate: {} {}", station, date)?,
        None => writeln!(out, "  climate: {}", station)?,
    }

    let rows = [
        ("high", report.temperature_maximum()),
        ("low", report.temperature_minimum()),
        ("precip", report.precip_today()),
        ("snow", report.snow_today()),
    ];
    for (name, row) in rows {
        if let Some(row) = row {
            writeln!(out, "    {}: {}", name, row.value)?;
        }
    }
    Ok(())
}

//! Pipe-delimited metadata files
//!
//! The UGC file has lines like `IAC001|Adair|DMX`. The NWSLI
//! file has lines like `KEOI4|Des Moines River at Keosauqua|40.73|-91.96|DVN`.
//! Offices are comma-separated. Blank lines and lines starting
//! with `#` are skipped.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context};
use log::info;

use nwstext::{NwsliInfo, UgcInfo};

/// Read a UGC metadata file
pub fn load_ugc_db<P: AsRef<Path>>(path: P) -> anyhow::Result<HashMap<String, UgcInfo>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read --ugc-db \"{}\"", path.display()))?;
    let db = parse_ugc_db(&text).with_context(|| format!("in \"{}\"", path.display()))?;
    info!("loaded {} UGCs from \"{}\"", db.len(), path.display());
    Ok(db)
}

/// Read an NWSLI metadata file
pub fn load_nwsli_db<P: AsRef<Path>>(path: P) -> anyhow::Result<HashMap<String, NwsliInfo>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read --nwsli-db \"{}\"", path.display()))?;
    let db = parse_nwsli_db(&text).with_context(|| format!("in \"{}\"", path.display()))?;
    info!("loaded {} NWSLIs from \"{}\"", db.len(), path.display());
    Ok(db)
}

/// Parse UGC metadata lines
pub fn parse_ugc_db(text: &str) -> anyhow::Result<HashMap<String, UgcInfo>> {
    let mut out = HashMap::new();
    for (lineno, fields) in records(text) {
        match fields.as_slice() {
            [code, name, wfos] => {
                if code.len() != 6 {
                    return Err(anyhow!("line {}: bad UGC \"{}\"", lineno, code));
                }
                out.insert(
                    code.to_string(),
                    UgcInfo {
                        name: name.to_string(),
                        wfos: split_wfos(wfos),
                    },
                );
            }
            _ => {
                return Err(anyhow!(
                    "line {}: expected 3 fields, found {}",
                    lineno,
                    fields.len()
                ))
            }
        }
    }
    Ok(out)
}

/// Parse NWSLI metadata lines
pub fn parse_nwsli_db(text: &str) -> anyhow::Result<HashMap<String, NwsliInfo>> {
    let mut out = HashMap::new();
    for (lineno, fields) in records(text) {
        match fields.as_slice() {
            [nwsli, name, lat, lon, wfos] => {
                let lat: f64 = lat
                    .parse()
                    .with_context(|| format!("line {}: bad latitude \"{}\"", lineno, lat))?;
                let lon: f64 = lon
                    .parse()
                    .with_context(|| format!("line {}: bad longitude \"{}\"", lineno, lon))?;
                out.insert(
                    nwsli.to_string(),
                    NwsliInfo {
                        name: name.to_string(),
                        lat,
                        lon,
                        wfos: split_wfos(wfos),
                    },
                );
            }
            _ => {
                return Err(anyhow!(
                    "line {}: expected 5 fields, found {}",
                    lineno,
                    fields.len()
                ))
            }
        }
    }
    Ok(out)
}

// (1-based line number, trimmed fields) for each data line
fn records(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            None
        } else {
            Some((i + 1, line.split('|').map(str::trim).collect()))
        }
    })
}

fn split_wfos(wfos: &str) -> Vec<String> {
    wfos.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ugc_db() {
        const DB: &str = "# code|name|offices\n\
                          IAC001|Adair|DMX\n\
                          \n\
                          MSC035 | Forrest | JAN, MOB\n";

        let db = parse_ugc_db(DB).expect("bad db");
        assert_eq!(db.len(), 2);
        assert_eq!(db["IAC001"].name, "Adair");
        assert_eq!(db["IAC001"].wfos, vec!["DMX".to_owned()]);
        assert_eq!(db["MSC035"].name, "Forrest");
        assert_eq!(db["MSC035"].wfos, vec!["JAN".to_owned(), "MOB".to_owned()]);

        let err = parse_ugc_db("IAC001|Adair|DMX\nIAC003|Adams\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
        assert!(parse_ugc_db("IA001|Adair|DMX").is_err());
    }

    #[test]
    fn test_parse_nwsli_db() {
        const DB: &str = "KEOI4|Des Moines River at Keosauqua|40.73|-91.96|DVN\n";

        let db = parse_nwsli_db(DB).expect("bad db");
        let info = &db["KEOI4"];
        assert_eq!(info.name, "Des Moines River at Keosauqua");
        assert_eq!(info.lat, 40.73);
        assert_eq!(info.lon, -91.96);
        assert_eq!(info.wfos, vec!["DVN".to_owned()]);

        let err = parse_nwsli_db("KEOI4|Keosauqua|north|-91.96|DVN").unwrap_err();
        assert!(err.to_string().contains("bad latitude"));
    }
}

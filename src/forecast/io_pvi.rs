// Readers for the district partisan lean table.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, info};
use snafu::{ensure, OptionExt, ResultExt};

use crate::forecast::io_common::{has_extension, trim_bom};
use crate::forecast::*;

/// One row of the district table.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictRow {
    pub district: String,
    pub incumbent: Option<String>,
    pub party: Option<String>,
    /// The lean as written in the input, for example `D+5` or `EVEN`.
    pub pvi_raw: String,
    /// The lean as a number, Democratic points positive.
    pub pvi: f64,
}

/// Column indexes of the district table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictColumns {
    pub district: usize,
    pub pvi: usize,
    pub incumbent: Option<usize>,
    pub party: Option<usize>,
}

/// Reads the district table. Excel and CSV flavours are dispatched from the
/// file extension.
pub fn read_districts(path: &str) -> BForecastResult<Vec<DistrictRow>> {
    let rows = if has_extension(path, "xlsx") || has_extension(path, "xls") {
        read_districts_excel(path)?
    } else {
        read_districts_csv(path)?
    };
    info!("read_districts: {} districts read from {}", rows.len(), path);
    Ok(rows)
}

/// Parses a partisan lean like `D+5`, `R+10` or `EVEN` into a number,
/// Democratic points positive. Plain numbers are accepted as already parsed
/// leans. Anything else is rejected.
pub fn parse_pvi(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("EVEN") {
        return Some(0.0);
    }
    if let Some(rest) = value.strip_prefix("D+") {
        return rest.trim().parse::<f64>().ok();
    }
    if let Some(rest) = value.strip_prefix("R+") {
        return rest.trim().parse::<f64>().ok().map(|v| -v);
    }
    value.parse::<f64>().ok()
}

/// Locates the table columns in a header row. The district and lean columns
/// are required, the incumbent and party columns are optional.
pub fn locate_columns(header: &[Option<String>], path: &str) -> BForecastResult<DistrictColumns> {
    debug!("locate_columns: header: {:?}", header);
    let district = position_of(header, |c| c.trim() == "Dist" || c.trim() == "District")
        .context(MissingColumnSnafu {
            column: "Dist",
            path,
        })?;
    let pvi = position_of(header, |c| c.contains("PVI")).context(MissingColumnSnafu {
        column: "PVI",
        path,
    })?;
    let incumbent = position_of(header, |c| c.contains("Incumbent"));
    let party = position_of(header, |c| c.trim() == "Party");
    Ok(DistrictColumns {
        district,
        pvi,
        incumbent,
        party,
    })
}

fn position_of(header: &[Option<String>], pred: impl Fn(&str) -> bool) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.as_deref().map(&pred).unwrap_or(false))
}

fn read_districts_excel(path: &str) -> BForecastResult<Vec<DistrictRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let header = wrange.rows().next().context(EmptyExcelSnafu { path })?;
    debug!("read_districts_excel: header: {:?}", header);
    let remapped: Vec<Option<String>> = header
        .iter()
        .map(|cell| match cell {
            DataType::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    let columns = locate_columns(&remapped, path)?;

    let mut iter = wrange.rows();
    iter.next();
    let mut res: Vec<DistrictRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = (idx + 2) as u64;
        let district = match row.get(columns.district) {
            Some(DataType::String(s)) => s.trim().to_string(),
            Some(DataType::Empty) | None => String::new(),
            Some(other) => {
                return Err(Box::new(ForecastError::ExcelWrongCellType {
                    lineno,
                    content: format!("{:?}", other),
                }));
            }
        };
        if district.is_empty() {
            debug!("read_districts_excel: skipping row {} without a district", lineno);
            continue;
        }

        let (pvi_raw, pvi) = match row.get(columns.pvi) {
            Some(DataType::String(s)) => {
                let parsed = parse_pvi(s).context(BadPviSnafu {
                    value: s.trim(),
                    district: &district,
                    lineno,
                })?;
                (s.trim().to_string(), parsed)
            }
            Some(DataType::Float(f)) => (format!("{}", f), *f),
            Some(DataType::Int(i)) => (format!("{}", i), *i as f64),
            Some(DataType::Empty) | None => {
                return Err(Box::new(ForecastError::MissingPvi { district, lineno }));
            }
            Some(other) => {
                return Err(Box::new(ForecastError::ExcelWrongCellType {
                    lineno,
                    content: format!("{:?}", other),
                }));
            }
        };

        let incumbent = columns
            .incumbent
            .and_then(|i| read_string_cell(row.get(i)));
        let party = columns.party.and_then(|i| read_string_cell(row.get(i)));
        res.push(DistrictRow {
            district,
            incumbent,
            party,
            pvi_raw,
            pvi,
        });
    }
    Ok(res)
}

fn read_string_cell(cell: Option<&DataType>) -> Option<String> {
    match cell {
        Some(DataType::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn read_districts_csv(path: &str) -> BForecastResult<Vec<DistrictRow>> {
    let contents = std::fs::read_to_string(path).context(OpeningCsvSnafu { path })?;
    let mut reader = csv::Reader::from_reader(trim_bom(&contents).as_bytes());
    let header: Vec<Option<String>> = reader
        .headers()
        .context(CsvLineParseSnafu { path })?
        .iter()
        .map(|h| Some(h.to_string()))
        .collect();
    let columns = locate_columns(&header, path)?;

    let mut res: Vec<DistrictRow> = Vec::new();
    for (idx, line_r) in reader.records().enumerate() {
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu { path })?;
        let district = line
            .get(columns.district)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        if district.is_empty() {
            debug!("read_districts_csv: skipping line {} without a district", lineno);
            continue;
        }
        let pvi_raw = line
            .get(columns.pvi)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        ensure!(
            !pvi_raw.is_empty(),
            MissingPviSnafu {
                district: &district,
                lineno
            }
        );
        let pvi = parse_pvi(&pvi_raw).context(BadPviSnafu {
            value: &pvi_raw,
            district: &district,
            lineno,
        })?;
        let incumbent = columns
            .incumbent
            .and_then(|i| line.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let party = columns
            .party
            .and_then(|i| line.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        res.push(DistrictRow {
            district,
            incumbent,
            party,
            pvi_raw,
            pvi,
        });
    }
    Ok(res)
}

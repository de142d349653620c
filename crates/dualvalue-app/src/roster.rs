// Roster / player-pool CSV loading.
//
// The file is header-driven: `Name` and `POS` are required, `PlayerId` (or
// `ID`) is optional, and every other column is read as a numeric stat.

use dualvalue_baseball::player::PlayerRow;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Header layout
// ---------------------------------------------------------------------------

const NAME_COLUMNS: &[&str] = &["Name", "Player"];
const ID_COLUMNS: &[&str] = &["PlayerId", "playerid", "ID", "MLBAMID"];
const POSITION_COLUMNS: &[&str] = &["POS", "Pos", "Position"];
/// Text columns that are neither identity nor stats.
const IGNORED_COLUMNS: &[&str] = &["Team", "Tm", "Org"];

/// Which header index holds which piece of a row.
#[derive(Debug)]
struct Layout {
    name: usize,
    id: Option<usize>,
    position: usize,
    stats: Vec<(usize, String)>,
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim() == *a))
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, RosterError> {
        let name = find_column(headers, NAME_COLUMNS).ok_or(RosterError::MissingColumn("Name"))?;
        let position =
            find_column(headers, POSITION_COLUMNS).ok_or(RosterError::MissingColumn("POS"))?;
        let id = find_column(headers, ID_COLUMNS);

        let stats = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| {
                *i != name
                    && *i != position
                    && Some(*i) != id
                    && !h.trim().is_empty()
                    && !IGNORED_COLUMNS.contains(&h.trim())
            })
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        Ok(Layout {
            name,
            id,
            position,
            stats,
        })
    }

    fn row(&self, record: &csv::StringRecord) -> Option<PlayerRow> {
        let name = record.get(self.name).map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        let position = record.get(self.position).map(str::trim).unwrap_or_default();
        let mut row = PlayerRow::new(name, position);

        if let Some(id) = self
            .id
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            row = row.with_id(id);
        }

        for (i, stat) in &self.stats {
            // Blank or non-numeric cells stay absent.
            if let Some(value) = record.get(*i).and_then(parse_stat) {
                row.set_stat(stat.clone(), value);
            }
        }
        Some(row)
    }
}

/// Parse a stat cell, accepting a trailing percent sign ("24.5%").
fn parse_stat(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    let cell = cell.strip_suffix('%').unwrap_or(cell).trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerRow>, RosterError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| RosterError::Csv {
            path: "<reader>".into(),
            source: e,
        })?
        .clone();
    let layout = Layout::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        match result {
            Ok(record) => match layout.row(&record) {
                Some(row) => rows.push(row),
                None => warn!("skipping roster row {}: no player name", line + 2),
            },
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(rows)
}

/// Load a roster or player pool from a CSV file.
pub fn load_roster(path: &Path) -> Result<Vec<PlayerRow>, RosterError> {
    let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_rows_from_reader(file).map_err(|e| match e {
        RosterError::Csv { source, .. } => RosterError::Csv {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Find a player by name (case-insensitive) or external ID.
pub fn find_player<'a>(rows: &'a [PlayerRow], key: &str) -> Option<&'a PlayerRow> {
    let key = key.trim();
    rows.iter()
        .find(|r| r.external_id.as_deref() == Some(key))
        .or_else(|| rows.iter().find(|r| r.name.eq_ignore_ascii_case(key)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_columns_become_stats() {
        let csv_data = "\
Name,PlayerId,Team,POS,R,RBI,OBP,Hard_Hit%
Juan Soto,20123,NYM,OF,120,110,0.420,55.1
Ozzie Albies,16556,ATL,2B,95,90,0.330,38.0";

        let rows = load_rows_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Juan Soto");
        assert_eq!(rows[0].external_id.as_deref(), Some("20123"));
        assert_eq!(rows[0].position, "OF");
        assert_eq!(rows[0].stat("OBP"), Some(0.420));
        assert_eq!(rows[0].stat("Hard_Hit%"), Some(55.1));
        assert_eq!(rows[0].stat("Team"), None);
        assert_eq!(rows[0].stats.len(), 4);
    }

    #[test]
    fn blank_and_non_numeric_cells_are_absent() {
        let csv_data = "\
Name,POS,R,OBP,Barrel%
Rookie,SS,,n/a,9.5%";

        let rows = load_rows_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows[0].stat("R"), None);
        assert_eq!(rows[0].stat("OBP"), None);
        assert_eq!(rows[0].stat("Barrel%"), Some(9.5));
    }

    #[test]
    fn rows_without_name_are_skipped() {
        let csv_data = "\
Name,POS,K
Valid Arm,SP,200
,SP,150
  ,RP,40";

        let rows = load_rows_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Valid Arm");
    }

    #[test]
    fn id_alias_and_trimmed_names() {
        let csv_data = "\
Name,ID,POS,K
  Tarik Skubal  ,669373,SP,228";

        let rows = load_rows_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows[0].name, "Tarik Skubal");
        assert_eq!(rows[0].external_id.as_deref(), Some("669373"));
    }

    #[test]
    fn short_rows_keep_available_cells() {
        let csv_data = "\
Name,POS,R,RBI
Short Row,1B,70";

        let rows = load_rows_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows[0].stat("R"), Some(70.0));
        assert_eq!(rows[0].stat("RBI"), None);
    }

    #[test]
    fn missing_position_column_is_an_error() {
        let csv_data = "Name,R\nNo Pos,50";
        let err = load_rows_from_reader(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, RosterError::MissingColumn("POS")));
    }

    #[test]
    fn empty_csv_returns_empty_vec() {
        let rows = load_rows_from_reader("Name,POS,R".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("dualvalue_no_such_roster.csv");
        let err = load_roster(&path).unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }

    #[test]
    fn find_player_by_id_or_name() {
        let rows = vec![
            PlayerRow::batter("Bobby Witt Jr.").with_id("677951"),
            PlayerRow::batter("Gunnar Henderson").with_id("683002"),
        ];
        assert_eq!(find_player(&rows, "683002").unwrap().name, "Gunnar Henderson");
        assert_eq!(find_player(&rows, "bobby witt jr.").unwrap().name, "Bobby Witt Jr.");
        assert!(find_player(&rows, "Nobody").is_none());
    }
}
